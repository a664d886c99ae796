/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Ranged integer codes.
//!
//! A value known to lie in [`min` . . `max`] is written as its offset from
//! `min` using exactly as many bits as needed to represent `max - min`.
//! The offset is laid out least significant byte first, with the bits of
//! the most significant byte right-aligned.
//!
//! Optionally, values outside the range can be escaped: a zero bit is then
//! written before in-range offsets, while out-of-range values are written
//! as a one bit followed by their [mini code](crate::codes::mini).

#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

use crate::traits::*;

/// Returns the number of leading zeros of the lowest `width` bits of `x`,
/// where `width` is 8, 16, 32 or 64.
///
/// The count is computed by binary search: at each step, if the upper half
/// of the current window is nonzero the search moves to it, discounting
/// the lower half from the count.
#[must_use]
pub fn leading_zero_count(x: u64, width: usize) -> usize {
    assert!(
        matches!(width, 8 | 16 | 32 | 64),
        "Unsupported width {}",
        width
    );
    let mut x = if width == 64 { x } else { x & ((1 << width) - 1) };
    let mut n = width;
    let mut half = width / 2;
    while half >= 2 {
        let upper = x >> half;
        if upper != 0 {
            n -= half;
            x = upper;
        }
        half /= 2;
    }
    if x >> 1 != 0 { n - 2 } else { n - x as usize }
}

/// Returns the number of bits needed to write offsets in [`min` . . `max`].
///
/// Panics if `max < min`.
#[must_use]
pub fn len_integer_range<T: WireInt>(min: T, max: T) -> usize {
    ensure_range(min, max);
    T::BITS - leading_zero_count(max.wrapping_sub(&min).to_raw(), T::BITS)
}

#[inline(always)]
fn ensure_range<T: WireInt>(min: T, max: T) {
    assert!(min <= max, "min = {:?} > max = {:?}", min, max);
}

/// A range of integers together with the number of bits needed to write
/// offsets within it.
///
/// Build it once per range and reuse it with
/// [`RangeWrite::write_ranged`] and [`RangeRead::read_ranged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
pub struct IntegerRange<T> {
    min: T,
    max: T,
    required_bits: usize,
}

impl<T: WireInt> IntegerRange<T> {
    /// Panics if `max < min`.
    pub fn new(min: T, max: T) -> Self {
        Self {
            min,
            max,
            required_bits: len_integer_range(min, max),
        }
    }

    /// Returns the lower end of the range.
    #[inline(always)]
    pub fn min(&self) -> T {
        self.min
    }

    /// Returns the upper end of the range.
    #[inline(always)]
    pub fn max(&self) -> T {
        self.max
    }

    /// Returns the number of bits of an in-range offset.
    #[inline(always)]
    pub fn required_bits(&self) -> usize {
        self.required_bits
    }

    /// Returns whether `value` lies in [`min` . . `max`].
    #[inline(always)]
    pub fn contains(&self, value: T) -> bool {
        self.min <= value && value <= self.max
    }
}

/// Trait for writing ranged integer codes.
///
/// This is the trait you should usually pull in scope to write ranged
/// integer codes.
pub trait RangeWrite: BitWrite {
    /// Writes `value`, which must lie in [`min` . . `max`] unless
    /// `allow_outside_range` is true.
    #[inline]
    fn write_integer_range<T: WireInt + MiniEncodable>(
        &mut self,
        value: T,
        min: T,
        max: T,
        allow_outside_range: bool,
    ) -> usize {
        self.write_ranged(value, &IntegerRange::new(min, max), allow_outside_range)
    }

    /// Like [`RangeWrite::write_integer_range`], with a precomputed range.
    fn write_ranged<T: WireInt + MiniEncodable>(
        &mut self,
        value: T,
        range: &IntegerRange<T>,
        allow_outside_range: bool,
    ) -> usize {
        let mut written = 0;
        if allow_outside_range {
            if !range.contains(value) {
                return self.write_bit_one() + value.encode_mini(self);
            }
            written += self.write_bit_zero();
        } else {
            assert!(
                range.contains(value),
                "{:?} is outside [{:?} . . {:?}]",
                value,
                range.min,
                range.max
            );
        }

        if range.required_bits == 0 {
            return written;
        }
        let order = self.byte_order();
        let mut image = order.image(value.wrapping_sub(&range.min));
        order.reorder(image.as_mut(), ByteOrder::Little);
        written + self.write_bits(image.as_ref(), range.required_bits, true)
    }
}

impl<W: BitWrite + ?Sized> RangeWrite for W {}

/// Trait for reading ranged integer codes.
///
/// This is the trait you should usually pull in scope to read ranged
/// integer codes.
pub trait RangeRead: BitRead {
    /// Reads a value written by [`RangeWrite::write_integer_range`] with the
    /// same arguments.
    #[inline]
    fn read_integer_range<T: WireInt + MiniDecodable>(
        &mut self,
        min: T,
        max: T,
        allow_outside_range: bool,
    ) -> T {
        self.read_ranged(&IntegerRange::new(min, max), allow_outside_range)
    }

    /// Like [`RangeRead::read_integer_range`], with a precomputed range.
    fn read_ranged<T: WireInt + MiniDecodable>(
        &mut self,
        range: &IntegerRange<T>,
        allow_outside_range: bool,
    ) -> T {
        if allow_outside_range && self.read_bit() {
            return T::decode_mini(self);
        }
        if range.required_bits == 0 {
            return range.min;
        }
        let mut image = T::Bytes::default();
        self.read_bits(image.as_mut(), range.required_bits, true);
        let order = self.byte_order();
        ByteOrder::Little.reorder(image.as_mut(), order);
        range.min.wrapping_add(&order.from_image(image))
    }
}

impl<R: BitRead + ?Sized> RangeRead for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::len_mini;
    use crate::impls::BitStream;

    #[test]
    fn test_leading_zero_count() {
        for width in [8, 16, 32, 64] {
            assert_eq!(leading_zero_count(0, width), width);
            assert_eq!(leading_zero_count(1, width), width - 1);
            for shift in 0..width {
                let x = 1_u64 << shift;
                assert_eq!(leading_zero_count(x, width), width - 1 - shift);
                assert_eq!(leading_zero_count(x | (x >> 1), width), width - 1 - shift);
            }
        }
        assert_eq!(leading_zero_count(0x1FF, 8), 0);
    }

    #[test]
    fn test_required_bits() {
        assert_eq!(len_integer_range(100_u8, 120), 5);
        assert_eq!(len_integer_range(0_u32, 0), 0);
        assert_eq!(len_integer_range(0_u32, 1), 1);
        assert_eq!(len_integer_range(i8::MIN, i8::MAX), 8);
        assert_eq!(len_integer_range(-100_i16, 100), 8);
        assert_eq!(len_integer_range(0_u64, u64::MAX), 64);
    }

    #[test]
    fn test_in_range() {
        let mut stream = BitStream::new();
        assert_eq!(stream.write_integer_range(105_u32, 100, 120, false), 5);
        assert_eq!(stream.write_integer_range(105_u32, 100, 120, true), 6);
        assert_eq!(stream.write_integer_range(7_i16, 7, 7, false), 0);
        assert_eq!(stream.read_integer_range(100_u32, 120, false), 105);
        assert_eq!(stream.read_integer_range(100_u32, 120, true), 105);
        assert_eq!(stream.read_integer_range(7_i16, 7, false), 7);
        stream.assert_consumed();
    }

    #[test]
    fn test_escape() {
        let mut stream = BitStream::new();
        let written = stream.write_integer_range(50_u32, 100, 120, true);
        assert_eq!(written, 1 + len_mini(50_u32));
        assert_eq!(stream.read_integer_range(100_u32, 120, true), 50);
    }

    #[test]
    fn test_offset_layout() {
        let range = IntegerRange::new(0_u16, 0xFFF);
        assert_eq!(range.required_bits(), 12);
        let mut stream = BitStream::new();
        stream.write_ranged(0xABC, &range, false);
        assert_eq!(stream.as_bytes(), [0xBC, 0xA0]);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range() {
        BitStream::new().write_integer_range(50_u32, 100, 120, false);
    }

    #[test]
    #[should_panic]
    fn test_inverted_range() {
        IntegerRange::new(10_u8, 9);
    }
}
