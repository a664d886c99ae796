/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use net_bitstream::prelude::*;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::error::Error;

#[test]
fn test_nibbles() {
    let mut stream = BitStream::new();
    stream.write_bits(&[0b1010], 4, true);
    stream.write_bits(&[0b0101], 4, true);
    assert_eq!(stream.as_bytes(), [0b1010_0101]);
    assert_eq!(bitify(stream.as_bytes(), stream.written_bits()), "10100101");
}

#[test]
fn test_growth_preserves_content() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let alloc = CountingAlloc::new();
    {
        let mut stream = BitStream::new_in(StreamConfig::new(&alloc));
        let mut r = SmallRng::seed_from_u64(0);
        let mut expected = vec![];
        // Odd lengths keep the write position unaligned
        while stream.written_bytes() < 4 * INLINE_BYTES {
            let len = r.random_range(1..20);
            let bits: Vec<bool> = (0..len).map(|_| r.random()).collect();
            for &bit in &bits {
                stream.write_bit(bit);
            }
            let byte: u8 = r.random();
            stream.write_value(byte);
            expected.push((bits, byte));
        }
        assert_eq!(stream.storage_kind(), StorageKind::Owned);
        assert_eq!(alloc.allocations(), 1);
        assert!(alloc.reallocations() >= 1);

        for (bits, byte) in &expected {
            for &bit in bits {
                assert_eq!(stream.read_bit(), bit);
            }
            assert_eq!(stream.read_value::<u8>(), *byte);
        }
        stream.assert_consumed();
    }
    assert_eq!(alloc.live(), 0);
    assert_eq!(alloc.releases(), 1);
    Ok(())
}

#[test]
fn test_growth_policy() {
    let mut stream = BitStream::new();
    assert_eq!(stream.capacity_bits(), INLINE_BYTES * 8);
    stream.write_bytes(&[0xAA; INLINE_BYTES]);
    assert_eq!(stream.storage_kind(), StorageKind::Inline);
    stream.write_bit_one();
    // doubling of the required size, rounded up to whole bytes
    assert_eq!(
        stream.capacity_bits(),
        ((INLINE_BYTES * 8 + 1) * 2).div_ceil(8) * 8
    );
    assert!(stream.as_bytes()[..INLINE_BYTES].iter().all(|&b| b == 0xAA));

    let mut large = BitStream::with_capacity(GROWTH_STEP_BYTES);
    large.write_bytes(&vec![1; GROWTH_STEP_BYTES]);
    assert_eq!(large.capacity_bits(), GROWTH_STEP_BYTES * 8);
    large.write_value(0xFFFF_u16);
    // additive growth past the threshold
    assert_eq!(large.capacity_bits(), GROWTH_STEP_BYTES * 8 * 2 + 16);
    assert_eq!(large.written_bytes(), GROWTH_STEP_BYTES + 2);
}

#[test]
fn test_transfer() {
    let mut a = BitStream::new();
    a.write_bits(&[0b1011_0011], 8, true);
    let mut b = BitStream::new();
    assert_eq!(b.write_stream(&mut a, 8), 8);
    assert_eq!(b.as_bytes(), a.as_bytes());
    assert_eq!(a.read_bit_pos(), 8);
    a.assert_consumed();
}

#[test]
fn test_unaligned_transfer() -> Result<(), Box<dyn Error + Send + Sync + 'static>> {
    let mut r = SmallRng::seed_from_u64(1);
    for _ in 0..200 {
        let mut source = BitStream::new();
        let bits: Vec<bool> = (0..r.random_range(1..300)).map(|_| r.random()).collect();
        for &bit in &bits {
            source.write_bit(bit);
        }
        let skip = r.random_range(0..bits.len());
        source.skip_bits(skip);
        let mut target = BitStream::new();
        let prefix = r.random_range(0..10);
        for _ in 0..prefix {
            target.write_bit_one();
        }
        let n = r.random_range(0..=bits.len() - skip);
        target.write_stream(&mut source, n);
        assert_eq!(source.read_bit_pos(), skip + n);
        assert_eq!(target.written_bits(), prefix + n);
        target.skip_bits(prefix);
        for &bit in &bits[skip..skip + n] {
            assert_eq!(target.read_bit(), bit);
        }
        // partial bytes are masked
        if target.written_bits() % 8 != 0 {
            let last = *target.as_bytes().last().unwrap();
            assert_eq!(last & (0xFF >> (target.written_bits() % 8)), 0);
        }
    }
    Ok(())
}

#[test]
fn test_view_never_allocates() {
    let alloc = CountingAlloc::new();
    let datagram = [0x12, 0x34, 0x56];
    {
        let mut view = BitStream::wrap_in(&datagram, false, StreamConfig::new(&alloc));
        assert!(view.is_read_only());
        assert_eq!(view.written_bits(), 24);
        assert_eq!(view.read_value::<u16>(), 0x1234);
        assert_eq!(view.as_bytes(), datagram);
    }
    assert_eq!(alloc.allocations(), 0);
    assert_eq!(alloc.releases(), 0);
}

#[test]
#[should_panic]
fn test_write_to_view() {
    let datagram = [0; 4];
    let mut view = BitStream::view(&datagram);
    view.write_bit_zero();
}

#[test]
fn test_copy_is_writable() {
    let datagram = [0x12, 0x34];
    let mut copy = BitStream::wrap(&datagram, true);
    assert!(!copy.is_read_only());
    assert_eq!(copy.storage_kind(), StorageKind::Inline);
    copy.write_value(0x56_u8);
    assert_eq!(copy.as_bytes(), [0x12, 0x34, 0x56]);
    assert_eq!(copy.read_value::<u8>(), 0x12);

    let big = vec![7; INLINE_BYTES * 2];
    let copy = BitStream::from_bytes(&big);
    assert_eq!(copy.storage_kind(), StorageKind::Owned);
    assert_eq!(copy.to_vec(), big);
}

#[test]
fn test_reset_keeps_capacity() {
    let alloc = CountingAlloc::new();
    let mut stream = BitStream::new_in(StreamConfig::new(&alloc));
    stream.write_bytes(&[3; 1000]);
    let capacity = stream.capacity_bits();
    let calls = alloc.allocations() + alloc.reallocations();
    stream.reset();
    stream.reset();
    assert_eq!(stream.written_bits(), 0);
    assert_eq!(stream.payload_bits(), 0);
    stream.write_bytes(&[4; 1000]);
    assert_eq!(stream.capacity_bits(), capacity);
    assert_eq!(alloc.allocations() + alloc.reallocations(), calls);
    assert!(stream.as_bytes().iter().all(|&b| b == 4));
}

#[test]
fn test_clone() {
    let mut stream = BitStream::with_capacity(1000);
    stream.write_value(0xDEAD_BEEF_u32);
    stream.write_bit_one();
    let mut clone = stream.clone();
    assert_eq!(clone.as_bytes(), stream.as_bytes());
    clone.write_bit_one();
    assert_eq!(stream.written_bits(), 33);
    assert_eq!(clone.read_value::<u32>(), 0xDEAD_BEEF);

    let datagram = [1, 2];
    let view = BitStream::view(&datagram);
    assert!(view.clone().is_read_only());
}

#[test]
fn test_bytes() {
    let mut stream = BitStream::new();
    stream.write_bit_one();
    stream.write_bytes(&[0xF0, 0x0F]);
    stream.write_aligned_bytes(&[0x11, 0x22]);
    stream.write_bounded_bytes(&[1, 2, 3, 4, 5], 3);
    stream.write_bounded_bytes(&[], 3);
    stream.pad_zero_to(16);
    assert_eq!(stream.written_bytes(), 16);

    assert!(stream.read_bit());
    let mut two = [0; 2];
    stream.read_bytes(&mut two);
    assert_eq!(two, [0xF0, 0x0F]);
    stream.read_aligned_bytes(&mut two);
    assert_eq!(two, [0x11, 0x22]);
    assert_eq!(stream.read_bounded_bytes(3), [1, 2, 3]);
    assert_eq!(stream.read_bounded_bytes(3), Vec::<u8>::new());
    stream.align_read();
    let left = stream.payload_bits() / 8;
    stream.skip_read_bytes(left);
    stream.assert_consumed();
}

#[test]
#[should_panic]
fn test_bounded_bytes_overflow() {
    let mut stream = BitStream::new();
    stream.write_bounded_bytes(&[1, 2, 3, 4], 4);
    stream.read_bounded_bytes(3);
}

#[test]
#[should_panic]
fn test_read_past_end() {
    let mut stream = BitStream::new();
    stream.write_value(1_u16);
    stream.read_value::<u32>();
}

#[test]
fn test_debug() {
    let mut stream = BitStream::new();
    stream.write_value(0xAB_u8);
    stream.write_bit_one();
    let dump = format!("{:?}", stream);
    assert!(dump.contains("ab 80"), "{}", dump);
    assert!(dump.contains("Inline"), "{}", dump);
}
