//! Tests for segment chains and sequence views

use std::sync::Arc;

use bytepipe::{Buffer, BufferPool, BufferPoolConfig, PipeError, SegmentChain};

fn frozen(pool: &BufferPool, bytes: &[u8]) -> Arc<Buffer> {
    let mut buffer = pool.acquire().unwrap();
    buffer.spare_mut()[..bytes.len()].copy_from_slice(bytes);
    buffer.advance(bytes.len()).unwrap();
    buffer.freeze()
}

fn pool(chunk_size: usize) -> BufferPool {
    BufferPool::new(BufferPoolConfig::new().with_chunk_size(chunk_size)).unwrap()
}

#[test]
fn test_single_partially_filled_buffer() {
    let pool = pool(64);
    let view = SegmentChain::build(vec![frozen(&pool, b"hello")]);

    assert_eq!(view.len(), 5);
    assert_eq!(view.segments().len(), 1);
    assert_eq!(view.segments()[0].running_index(), 0);

    let mut out = [0u8; 5];
    assert_eq!(view.copy_to(&mut out).unwrap(), 5);
    assert_eq!(&out, b"hello");
}

#[test]
fn test_copy_to_reconstructs_two_buffers() {
    let pool = pool(8);
    let view = SegmentChain::build(vec![frozen(&pool, b"ab"), frozen(&pool, b"cdef")]);

    let mut out = vec![0u8; view.len()];
    view.copy_to(&mut out).unwrap();
    assert_eq!(out, b"abcdef");
}

#[test]
fn test_copy_to_reconstructs_many_buffers_of_unequal_fill() {
    let pool = pool(32);
    let chunks: Vec<&[u8]> = vec![b"a", b"bcdefgh", b"ij", b"klmnopqrstuvwxyz", b"0123"];
    let expected: Vec<u8> = chunks.concat();

    let buffers: Vec<Arc<Buffer>> = chunks.iter().map(|c| frozen(&pool, c)).collect();
    let view = SegmentChain::build(buffers);

    assert_eq!(view.len(), expected.len());
    let mut out = vec![0u8; expected.len()];
    view.copy_to(&mut out).unwrap();
    assert_eq!(out, expected);

    // Segments are contiguous: no gaps, no overlaps.
    for pair in view.segments().windows(2) {
        assert_eq!(pair[0].end_index(), pair[1].running_index());
    }
}

#[test]
fn test_byte_at_is_deterministic_across_boundaries() {
    let pool = pool(8);
    let view = SegmentChain::build(vec![
        frozen(&pool, b"ab"),
        frozen(&pool, b"cde"),
        frozen(&pool, b"f"),
    ]);

    let expected = b"abcdef";
    for (i, &byte) in expected.iter().enumerate() {
        assert_eq!(view.byte_at(i as u64), Some(byte));
        // Resolving the same offset twice yields the same source byte.
        assert_eq!(view.byte_at(i as u64), view.byte_at(i as u64));
    }
    assert_eq!(view.byte_at(6), None);
}

#[test]
fn test_copy_to_rejects_small_destination() {
    let pool = pool(8);
    let view = SegmentChain::build(vec![frozen(&pool, b"abcdef")]);

    let mut out = [0u8; 4];
    let err = view.copy_to(&mut out).unwrap_err();
    assert_eq!(
        err,
        PipeError::DestinationTooSmall {
            required: 6,
            available: 4,
        }
    );
}

#[test]
fn test_empty_chain_yields_empty_view() {
    let view = SegmentChain::build(Vec::<Arc<Buffer>>::new());
    assert!(view.is_empty());
    assert_eq!(view.start_position(), view.end_position());
    assert_eq!(view.copy_to(&mut []).unwrap(), 0);
    assert_eq!(view.iter().count(), 0);
}
