/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use core::fmt::Debug;
use num_traits::{PrimInt, WrappingAdd, WrappingSub};

/// Inner private trait used to make implementing [`WireInt`]
/// impossible for other types.
mod private {
    /// This is a [SealedTrait](https://predr.ag/blog/definitive-guide-to-sealed-traits-in-rust/).
    pub trait WireInt {}
}

/// The fixed-width integers that can be put on the wire.
///
/// Besides the arithmetic provided by [`PrimInt`], this trait gives access
/// to the memory image of a value in either byte order and to its bit
/// pattern as an unsigned 64-bit integer.
pub trait WireInt:
    PrimInt + WrappingAdd + WrappingSub + Debug + Default + private::WireInt
{
    /// Width in bits.
    const BITS: usize;
    /// Width in bytes.
    const BYTES: usize;
    /// Whether the type is two's-complement signed.
    const SIGNED: bool;

    /// A byte array of length [`WireInt::BYTES`].
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Copy + Default + Debug + PartialEq;

    fn to_le_image(self) -> Self::Bytes;
    fn to_be_image(self) -> Self::Bytes;
    fn from_le_image(bytes: Self::Bytes) -> Self;
    fn from_be_image(bytes: Self::Bytes) -> Self;

    /// Returns the bit pattern of `self`, zero-extended.
    fn to_raw(self) -> u64;

    /// Returns the value whose bit pattern is given by the lowest
    /// [`WireInt::BITS`] bits of `raw`.
    fn from_raw(raw: u64) -> Self;
}

macro_rules! impl_wire_int {
    ($($ty:ty => $unsigned:ty, $signed:literal);* $(;)?) => {$(
        impl private::WireInt for $ty {}

        impl WireInt for $ty {
            const BITS: usize = <$ty>::BITS as usize;
            const BYTES: usize = core::mem::size_of::<$ty>();
            const SIGNED: bool = $signed;

            type Bytes = [u8; core::mem::size_of::<$ty>()];

            #[inline(always)]
            fn to_le_image(self) -> Self::Bytes {
                self.to_le_bytes()
            }

            #[inline(always)]
            fn to_be_image(self) -> Self::Bytes {
                self.to_be_bytes()
            }

            #[inline(always)]
            fn from_le_image(bytes: Self::Bytes) -> Self {
                <$ty>::from_le_bytes(bytes)
            }

            #[inline(always)]
            fn from_be_image(bytes: Self::Bytes) -> Self {
                <$ty>::from_be_bytes(bytes)
            }

            #[inline(always)]
            fn to_raw(self) -> u64 {
                self as $unsigned as u64
            }

            #[inline(always)]
            fn from_raw(raw: u64) -> Self {
                raw as $unsigned as $ty
            }
        }
    )*};
}

impl_wire_int! {
    u8 => u8, false;
    u16 => u16, false;
    u32 => u32, false;
    u64 => u64, false;
    i8 => u8, true;
    i16 => u16, true;
    i32 => u32, true;
    i64 => u64, true;
}
