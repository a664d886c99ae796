/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

use crate::traits::WireInt;

/// Byte order of a host, used to lay out the in-memory image of integers
/// before they are put on the wire.
///
/// Streams carry a [`ByteOrder`] in their configuration rather than relying
/// on a compile-time assumption, so that the byte-swapping logic needed on
/// big-endian hosts can be exercised on any machine. The wire format does
/// not depend on this choice: typed integers are always in
/// [network order](ByteOrder::NETWORK).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    Little,
    Big,
}

impl ByteOrder {
    /// The order of multi-byte integer fields on the wire.
    pub const NETWORK: ByteOrder = ByteOrder::Big;

    /// Detects the byte order of the running host by probing the memory
    /// layout of a known two-byte value.
    #[must_use]
    #[inline]
    pub fn host() -> Self {
        if 0x0102_u16.to_ne_bytes()[0] == 0x02 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    /// Returns the memory image of `value` on a host with this byte order.
    #[inline(always)]
    pub fn image<T: WireInt>(self, value: T) -> T::Bytes {
        match self {
            ByteOrder::Little => value.to_le_image(),
            ByteOrder::Big => value.to_be_image(),
        }
    }

    /// Rebuilds a value from its memory image on a host with this byte order.
    #[inline(always)]
    pub fn from_image<T: WireInt>(self, image: T::Bytes) -> T {
        match self {
            ByteOrder::Little => T::from_le_image(image),
            ByteOrder::Big => T::from_be_image(image),
        }
    }

    /// Converts in place a memory image laid out in this byte order into
    /// one laid out in `target` order.
    #[inline(always)]
    pub fn reorder(self, image: &mut [u8], target: ByteOrder) {
        if self != target {
            image.reverse();
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::host()
    }
}

impl core::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteOrder::Little => f.write_str("little-endian"),
            ByteOrder::Big => f.write_str("big-endian"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_matches_target() {
        #[cfg(target_endian = "little")]
        assert_eq!(ByteOrder::host(), ByteOrder::Little);
        #[cfg(target_endian = "big")]
        assert_eq!(ByteOrder::host(), ByteOrder::Big);
    }

    #[test]
    fn test_image_round_trip() {
        let value = 0x0102_0304_u32;
        assert_eq!(ByteOrder::Little.image(value), [4, 3, 2, 1]);
        assert_eq!(ByteOrder::Big.image(value), [1, 2, 3, 4]);
        for order in [ByteOrder::Little, ByteOrder::Big] {
            assert_eq!(order.from_image::<u32>(order.image(value)), value);
            let mut image = order.image(value);
            order.reorder(&mut image, ByteOrder::NETWORK);
            assert_eq!(image, value.to_be_bytes());
        }
    }
}
