use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use std::io::{Read, Write};
use std::thread;

use bytepipe::{
    BufferPoolConfig, BytePipe, PipeConfig, PipeReadStream, PipeWriteStream, SegmentChain,
};

const DATA_LEN: usize = 1024 * 1024;
const CHUNK_SIZE: usize = 4 * 1024;

fn source_data() -> Vec<u8> {
    (0..DATA_LEN).map(|i| (i % 251) as u8).collect()
}

fn pipe_config() -> PipeConfig {
    PipeConfig::new().with_pool(
        BufferPoolConfig::new()
            .with_chunk_size(CHUNK_SIZE)
            .with_initial_count(DATA_LEN / CHUNK_SIZE),
    )
}

fn benchmark_contiguous_copy(c: &mut Criterion) {
    let data = source_data();
    let mut destination = vec![0u8; DATA_LEN];

    let mut group = c.benchmark_group("Copy_Baseline");
    group.throughput(Throughput::Bytes(DATA_LEN as u64));

    group.bench_function("copy_memory", |b| {
        b.iter(|| destination.copy_from_slice(&data));
    });

    group.bench_function("copy_memory_chunks", |b| {
        b.iter(|| {
            for position in (0..DATA_LEN).step_by(CHUNK_SIZE) {
                destination[position..position + CHUNK_SIZE]
                    .copy_from_slice(&data[position..position + CHUNK_SIZE]);
            }
        });
    });

    group.finish();
}

fn benchmark_sequence_reassembly(c: &mut Criterion) {
    let data = source_data();
    let mut destination = vec![0u8; DATA_LEN];
    let pool = bytepipe::BufferPool::new(
        BufferPoolConfig::new()
            .with_chunk_size(CHUNK_SIZE)
            .with_initial_count(DATA_LEN / CHUNK_SIZE),
    )
    .unwrap();

    let mut group = c.benchmark_group("Copy_Sequence");
    group.throughput(Throughput::Bytes(DATA_LEN as u64));

    // Chunked copy staged through pooled buffers, reassembled through a
    // zero-copy sequence view rather than concatenation.
    group.bench_function("copy_chunks_as_sequence", |b| {
        b.iter(|| {
            let buffers: Vec<_> = data
                .chunks(CHUNK_SIZE)
                .map(|chunk| {
                    let mut buffer = pool.acquire().unwrap();
                    buffer.spare_mut()[..chunk.len()].copy_from_slice(chunk);
                    buffer.advance(chunk.len()).unwrap();
                    buffer.freeze()
                })
                .collect();

            let view = SegmentChain::build(buffers.iter().cloned());
            view.copy_to(&mut destination).unwrap();

            drop(view);
            for frozen in buffers {
                let buffer = std::sync::Arc::try_unwrap(frozen).unwrap();
                pool.release(buffer).unwrap();
            }
        });
    });

    group.finish();
}

fn benchmark_pipe_copy(c: &mut Criterion) {
    let data = source_data();

    let mut group = c.benchmark_group("Copy_Pipe");
    group.throughput(Throughput::Bytes(DATA_LEN as u64));
    group.sample_size(20);

    group.bench_function("copy_pipe", |b| {
        b.iter(|| {
            let (mut writer, mut reader) = BytePipe::new(pipe_config()).unwrap().split();
            let payload = data.clone();

            let producer = thread::spawn(move || {
                for chunk in payload.chunks(CHUNK_SIZE) {
                    let span = writer.reserve(chunk.len()).unwrap();
                    span[..chunk.len()].copy_from_slice(chunk);
                    writer.commit(chunk.len()).unwrap();
                }
                writer.flush().unwrap();
                writer.complete(None).unwrap();
            });

            let mut destination = vec![0u8; DATA_LEN];
            let mut position = 0usize;
            loop {
                let result = reader.read().unwrap();
                for slice in result.view.iter() {
                    destination[position..position + slice.len()].copy_from_slice(slice);
                    position += slice.len();
                }
                let end = result.view.end_position();
                let completed = result.completed;
                drop(result);
                reader.advance_to(end, end).unwrap();
                if completed && position == DATA_LEN {
                    break;
                }
            }
            producer.join().unwrap();
            destination
        });
    });

    group.bench_function("copy_pipe_as_stream", |b| {
        b.iter(|| {
            let (writer, reader) = BytePipe::new(pipe_config()).unwrap().split();
            let payload = data.clone();

            let producer = thread::spawn(move || {
                let mut stream = PipeWriteStream::new(writer);
                stream.write_all(&payload).unwrap();
                stream.complete().unwrap();
            });

            let mut stream = PipeReadStream::new(reader);
            let mut destination = Vec::with_capacity(DATA_LEN);
            stream.read_to_end(&mut destination).unwrap();
            producer.join().unwrap();
            destination
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_contiguous_copy,
    benchmark_sequence_reassembly,
    benchmark_pipe_copy
);
criterion_main!(benches);
