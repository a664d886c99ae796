/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Traits for values that can be serialized on a bit stream.
//!
//! The set of serializable types is closed: [`Encodable`] and friends are
//! sealed, and are implemented by this crate for fixed-width integers,
//! booleans, floating-point numbers, [`U24`](crate::codes::U24),
//! [`Guid`](crate::codes::Guid) and socket addresses.

use crate::traits::{BitRead, BitWrite};

pub(crate) mod private {
    /// This is a [SealedTrait](https://predr.ag/blog/definitive-guide-to-sealed-traits-in-rust/).
    pub trait Sealed {}
}

/// A value with a full-width wire representation.
pub trait Encodable: private::Sealed {
    /// Writes `self` and returns the number of bits written.
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize;

    /// Writes a zero bit if `self` equals `last`, and otherwise a one bit
    /// followed by `self`.
    #[inline]
    fn encode_changed<W: BitWrite + ?Sized>(&self, last: &Self, writer: &mut W) -> usize
    where
        Self: PartialEq,
    {
        if self == last {
            writer.write_bit_zero()
        } else {
            writer.write_bit_one() + self.encode(writer)
        }
    }

    /// Writes `self` marked as changed.
    #[inline]
    fn encode_changed_unknown<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        writer.write_bit_one() + self.encode(writer)
    }
}

/// A value that can be read back from its full-width wire representation.
pub trait Decodable: Sized + private::Sealed {
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self;

    /// Inverse of [`Encodable::encode_changed`]: `dest` is overwritten only
    /// if the changed flag is set. Returns whether it was.
    #[inline]
    fn decode_changed<R: BitRead + ?Sized>(dest: &mut Self, reader: &mut R) -> bool {
        if reader.read_bit() {
            *dest = Self::decode(reader);
            true
        } else {
            false
        }
    }
}

/// A value with a compressed ("mini") wire representation.
pub trait MiniEncodable: Encodable {
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize;

    /// Like [`Encodable::encode_changed`], but the value is compressed.
    #[inline]
    fn encode_mini_changed<W: BitWrite + ?Sized>(&self, last: &Self, writer: &mut W) -> usize
    where
        Self: PartialEq,
    {
        if self == last {
            writer.write_bit_zero()
        } else {
            writer.write_bit_one() + self.encode_mini(writer)
        }
    }
}

/// A value that can be read back from its compressed representation.
pub trait MiniDecodable: Decodable {
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self;

    /// Inverse of [`MiniEncodable::encode_mini_changed`].
    #[inline]
    fn decode_mini_changed<R: BitRead + ?Sized>(dest: &mut Self, reader: &mut R) -> bool {
        if reader.read_bit() {
            *dest = Self::decode_mini(reader);
            true
        } else {
            false
        }
    }
}
