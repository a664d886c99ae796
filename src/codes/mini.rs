/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Compressed ("mini") codes.
//!
//! Most integers sent over the wire have many leading zero bytes, or, if
//! negative, many leading `0xFF` bytes. The mini code scans the bytes of a
//! value from the most significant one, writing a one bit for each byte
//! equal to the padding byte (`0x00` for unsigned types, `0xFF` for signed
//! ones); at the first byte that differs it writes a zero bit followed by
//! that byte and all lower bytes, least significant first. If all bytes
//! but the last match, the last byte is written as a one bit and its low
//! nibble when its high nibble matches the padding, and as a zero bit and
//! eight bits otherwise.
//!
//! For example, a `u32` equal to zero takes 8 bits (three one bits, a one
//! bit and a nibble), and `0xFF` takes 12 bits.
//!
//! Floating-point numbers in the interval [-1 . . 1] are compressed by
//! mapping them linearly to a 16-bit (`f32`) or 32-bit (`f64`) unsigned
//! integer, which is then mini-coded. Values outside [-1.01 . . 1.01] are
//! rejected.

use num_traits::Float;

use crate::traits::*;

/// Writes `bytes`, least significant first, with the mini code, and
/// returns the number of bits written.
///
/// `bytes` must not be empty.
pub fn write_mini_bytes<W: BitWrite + ?Sized>(writer: &mut W, bytes: &[u8], signed: bool) -> usize {
    assert!(!bytes.is_empty(), "Cannot compress an empty value");
    let pad = if signed { 0xFF } else { 0x00 };
    let mut written = 0;
    for i in (1..bytes.len()).rev() {
        if bytes[i] == pad {
            written += writer.write_bit_one();
        } else {
            written += writer.write_bit_zero();
            return written + writer.write_bits(&bytes[..=i], (i + 1) * 8, true);
        }
    }

    let last = bytes[0];
    if last & 0xF0 == pad & 0xF0 {
        written += writer.write_bit_one();
        written + writer.write_bits(&[last & 0x0F], 4, true)
    } else {
        written += writer.write_bit_zero();
        written + writer.write_bits(&bytes[..1], 8, true)
    }
}

/// Reads into `dest`, least significant byte first, a value written by
/// [`write_mini_bytes`] with a source of the same length.
pub fn read_mini_bytes<R: BitRead + ?Sized>(reader: &mut R, dest: &mut [u8], signed: bool) {
    assert!(!dest.is_empty(), "Cannot decompress an empty value");
    let pad = if signed { 0xFF } else { 0x00 };
    for i in (1..dest.len()).rev() {
        if reader.read_bit() {
            dest[i] = pad;
        } else {
            reader.read_bits(&mut dest[..=i], (i + 1) * 8, true);
            return;
        }
    }

    if reader.read_bit() {
        let mut nibble = [0];
        reader.read_bits(&mut nibble, 4, true);
        dest[0] = nibble[0] | (pad & 0xF0);
    } else {
        reader.read_bits(&mut dest[..1], 8, true);
    }
}

/// Returns the length in bits of the mini code of `value`.
#[must_use]
pub fn len_mini<T: WireInt>(value: T) -> usize {
    let bytes = value.to_le_image();
    let bytes = bytes.as_ref();
    let pad = if T::SIGNED { 0xFF } else { 0x00 };
    let mut len = 0;
    for i in (1..bytes.len()).rev() {
        len += 1;
        if bytes[i] != pad {
            return len + (i + 1) * 8;
        }
    }
    if bytes[0] & 0xF0 == pad & 0xF0 {
        len + 5
    } else {
        len + 9
    }
}

#[inline]
fn write_mini_int<T: WireInt, W: BitWrite + ?Sized>(writer: &mut W, value: T) -> usize {
    let order = writer.byte_order();
    let mut image = order.image(value);
    order.reorder(image.as_mut(), ByteOrder::Little);
    write_mini_bytes(writer, image.as_ref(), T::SIGNED)
}

#[inline]
fn read_mini_int<T: WireInt, R: BitRead + ?Sized>(reader: &mut R) -> T {
    let mut image = T::Bytes::default();
    read_mini_bytes(reader, image.as_mut(), T::SIGNED);
    let order = reader.byte_order();
    ByteOrder::Little.reorder(image.as_mut(), order);
    order.from_image(image)
}

macro_rules! impl_mini_int {
    ($($ty:ty),*) => {$(
        impl MiniEncodable for $ty {
            #[inline(always)]
            fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
                write_mini_int(writer, *self)
            }
        }

        impl MiniDecodable for $ty {
            #[inline(always)]
            fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
                read_mini_int(reader)
            }
        }
    )*};
}

impl_mini_int!(u8, u16, u32, u64, i8, i16, i32, i64);

impl MiniEncodable for bool {
    #[inline(always)]
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        writer.write_bit(*self)
    }

    #[inline(always)]
    fn encode_mini_changed<W: BitWrite + ?Sized>(&self, _last: &Self, writer: &mut W) -> usize {
        self.encode_mini(writer)
    }
}

impl MiniDecodable for bool {
    #[inline(always)]
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        reader.read_bit()
    }

    #[inline(always)]
    fn decode_mini_changed<R: BitRead + ?Sized>(dest: &mut Self, reader: &mut R) -> bool {
        <bool as Decodable>::decode_changed(dest, reader)
    }
}

const F32_SCALE: f32 = 32767.5;
const F64_SCALE: f64 = 2147483648.0;

#[inline(always)]
fn ensure_unit<F: Float + core::fmt::Debug>(value: F, low: F, high: F) {
    assert!(
        value > low && value < high,
        "{:?} is outside the compressible interval",
        value
    );
}

impl MiniEncodable for f32 {
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        ensure_unit(*self, -1.01, 1.01);
        let clamped = self.clamp(-1.0, 1.0);
        let scaled = Float::round((clamped + 1.0) * F32_SCALE);
        write_mini_int(writer, scaled as u16)
    }
}

impl MiniDecodable for f32 {
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let scaled: u16 = read_mini_int(reader);
        scaled as f32 / F32_SCALE - 1.0
    }
}

impl MiniEncodable for f64 {
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        ensure_unit(*self, -1.01, 1.01);
        let clamped = self.clamp(-1.0, 1.0);
        let scaled = Float::round((clamped + 1.0) * F64_SCALE).min(u32::MAX as f64);
        write_mini_int(writer, scaled as u32)
    }
}

impl MiniDecodable for f64 {
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let scaled: u32 = read_mini_int(reader);
        scaled as f64 / F64_SCALE - 1.0
    }
}

/// Trait for writing mini codes.
///
/// This is the trait you should usually pull in scope to write mini codes.
pub trait MiniWrite: BitWrite {
    /// Writes the mini code of `value`.
    #[inline(always)]
    fn write_mini<T: MiniEncodable>(&mut self, value: T) -> usize {
        value.encode_mini(self)
    }

    /// Writes a zero bit if `current` equals `last`, and otherwise a one
    /// bit followed by the mini code of `current`.
    #[inline(always)]
    fn write_mini_changed<T: MiniEncodable + PartialEq>(&mut self, current: T, last: T) -> usize {
        current.encode_mini_changed(&last, self)
    }
}

impl<W: BitWrite + ?Sized> MiniWrite for W {}

/// Trait for reading mini codes.
///
/// This is the trait you should usually pull in scope to read mini codes.
pub trait MiniRead: BitRead {
    /// Reads a value written by [`MiniWrite::write_mini`].
    #[inline(always)]
    fn read_mini<T: MiniDecodable>(&mut self) -> T {
        T::decode_mini(self)
    }

    /// Inverse of [`MiniWrite::write_mini_changed`]; returns whether `dest`
    /// was updated.
    #[inline(always)]
    fn read_mini_changed<T: MiniDecodable>(&mut self, dest: &mut T) -> bool {
        T::decode_mini_changed(dest, self)
    }
}

impl<R: BitRead + ?Sized> MiniRead for R {}
