/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Full-width codecs.
//!
//! Integers are written with all their bits in network byte order
//! (big-endian), whatever the byte order of the host; booleans take a
//! single bit; floating-point numbers are written as their IEEE 754 bit
//! pattern.

use crate::traits::*;

/// Writes `value` in network byte order.
#[inline]
pub(crate) fn write_int<T: WireInt, W: BitWrite + ?Sized>(writer: &mut W, value: T) -> usize {
    let order = writer.byte_order();
    let mut image = order.image(value);
    order.reorder(image.as_mut(), ByteOrder::NETWORK);
    writer.write_bits(image.as_ref(), T::BITS, true)
}

/// Reads a value written by [`write_int`].
#[inline]
pub(crate) fn read_int<T: WireInt, R: BitRead + ?Sized>(reader: &mut R) -> T {
    let mut image = T::Bytes::default();
    reader.read_bits(image.as_mut(), T::BITS, true);
    let order = reader.byte_order();
    ByteOrder::NETWORK.reorder(image.as_mut(), order);
    order.from_image(image)
}

macro_rules! impl_int_codec {
    ($($ty:ty),*) => {$(
        impl private::Sealed for $ty {}

        impl Encodable for $ty {
            #[inline(always)]
            fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
                write_int(writer, *self)
            }
        }

        impl Decodable for $ty {
            #[inline(always)]
            fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
                read_int(reader)
            }
        }
    )*};
}

impl_int_codec!(u8, u16, u32, u64, i8, i16, i32, i64);

impl private::Sealed for bool {}

/// A boolean is its own change flag: the changed-value forms write the
/// bare bit.
impl Encodable for bool {
    #[inline(always)]
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        writer.write_bit(*self)
    }

    #[inline(always)]
    fn encode_changed<W: BitWrite + ?Sized>(&self, _last: &Self, writer: &mut W) -> usize {
        self.encode(writer)
    }

    #[inline(always)]
    fn encode_changed_unknown<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        self.encode(writer)
    }
}

impl Decodable for bool {
    #[inline(always)]
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        reader.read_bit()
    }

    #[inline(always)]
    fn decode_changed<R: BitRead + ?Sized>(dest: &mut Self, reader: &mut R) -> bool {
        let bit = reader.read_bit();
        let changed = *dest != bit;
        *dest = bit;
        changed
    }
}

impl private::Sealed for f32 {}

impl Encodable for f32 {
    #[inline(always)]
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        write_int(writer, self.to_bits())
    }
}

impl Decodable for f32 {
    #[inline(always)]
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        f32::from_bits(read_int(reader))
    }
}

impl private::Sealed for f64 {}

impl Encodable for f64 {
    #[inline(always)]
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        write_int(writer, self.to_bits())
    }
}

impl Decodable for f64 {
    #[inline(always)]
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        f64::from_bits(read_int(reader))
    }
}

/// Trait for writing values with their full-width representation.
///
/// This is the trait you should usually pull in scope to write values.
pub trait ValueWrite: BitWrite {
    /// Writes the full-width representation of `value`.
    #[inline(always)]
    fn write_value<T: Encodable>(&mut self, value: T) -> usize {
        value.encode(self)
    }

    /// Writes a zero bit if `current` equals `last`, and otherwise a one
    /// bit followed by `current`.
    #[inline(always)]
    fn write_changed<T: Encodable + PartialEq>(&mut self, current: T, last: T) -> usize {
        current.encode_changed(&last, self)
    }

    /// Writes `current` as changed, for when there is no previous value to
    /// compare with.
    #[inline(always)]
    fn write_changed_unknown<T: Encodable>(&mut self, current: T) -> usize {
        current.encode_changed_unknown(self)
    }
}

impl<W: BitWrite + ?Sized> ValueWrite for W {}

/// Trait for reading values with their full-width representation.
///
/// This is the trait you should usually pull in scope to read values.
pub trait ValueRead: BitRead {
    /// Reads a value written by [`ValueWrite::write_value`].
    #[inline(always)]
    fn read_value<T: Decodable>(&mut self) -> T {
        T::decode(self)
    }

    /// Reads a value written by [`ValueWrite::write_changed`] or
    /// [`ValueWrite::write_changed_unknown`], storing it in `dest` only if
    /// it was marked as changed. Returns whether `dest` was updated.
    #[inline(always)]
    fn read_changed<T: Decodable>(&mut self, dest: &mut T) -> bool {
        T::decode_changed(dest, self)
    }
}

impl<R: BitRead + ?Sized> ValueRead for R {}
