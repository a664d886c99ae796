/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::ByteOrder;

/// Access to the byte order a bit stream assumes for the host.
///
/// Codecs use it to lay out integers in memory before handing them to
/// [`BitWrite::write_bits`], and to rebuild them after
/// [`BitRead::read_bits`].
pub trait ByteOrdered {
    fn byte_order(&self) -> ByteOrder;
}

/// Sequential, streaming bit-by-bit reads.
///
/// This trait specifies the basic operations over which codes are
/// implemented by traits such as [`crate::codes::MiniRead`]. Bits are
/// stored MSB-first within each byte.
///
/// Reading past the written data is a contract violation and panics.
pub trait BitRead: ByteOrdered {
    /// Reads `n` bits into `dest`.
    ///
    /// Whole bytes fill `dest` from index zero; if `n` is not a multiple of
    /// eight, the last destination byte receives the remaining bits in its
    /// low positions when `align_right` is true, in its high positions
    /// otherwise. Destination bytes past the run are not touched.
    fn read_bits(&mut self, dest: &mut [u8], n: usize, align_right: bool);

    /// Reads a single bit.
    fn read_bit(&mut self) -> bool;

    /// Skips `n` bits.
    fn skip_bits(&mut self, n: usize);

    /// Moves the read position to the next byte boundary.
    fn align_read(&mut self);

    /// Reads `dest.len()` whole bytes, with no byte reordering and no
    /// alignment.
    #[inline]
    fn read_bytes(&mut self, dest: &mut [u8]) {
        if !dest.is_empty() {
            self.read_bits(dest, dest.len() * 8, true);
        }
    }

    /// Aligns the read position and then reads `dest.len()` whole bytes.
    #[inline]
    fn read_aligned_bytes(&mut self, dest: &mut [u8]) {
        self.align_read();
        self.read_bytes(dest);
    }
}

/// Sequential, streaming bit-by-bit writes.
///
/// This trait specifies the basic operations over which codes are
/// implemented by traits such as [`crate::codes::MiniWrite`]. Write
/// methods return the number of bits they appended.
///
/// Writing to a read-only stream is a contract violation and panics.
pub trait BitWrite: ByteOrdered {
    /// Appends `n` bits taken MSB-first from `src`.
    ///
    /// Whole bytes are taken from `src` starting at index zero; if `n` is
    /// not a multiple of eight, the remaining bits are taken from the low
    /// positions of the last source byte when `right_aligned` is true, from
    /// its high positions otherwise.
    fn write_bits(&mut self, src: &[u8], n: usize, right_aligned: bool) -> usize;

    /// Appends a one bit.
    fn write_bit_one(&mut self) -> usize;

    /// Appends a zero bit.
    fn write_bit_zero(&mut self) -> usize;

    /// Pads the stream with zero bits up to the next byte boundary.
    fn align_write(&mut self) -> usize;

    #[inline(always)]
    fn write_bit(&mut self, bit: bool) -> usize {
        if bit {
            self.write_bit_one()
        } else {
            self.write_bit_zero()
        }
    }

    /// Appends the bytes of `src`, with no byte reordering and no
    /// alignment.
    #[inline]
    fn write_bytes(&mut self, src: &[u8]) -> usize {
        if src.is_empty() {
            return 0;
        }
        self.write_bits(src, src.len() * 8, true)
    }

    /// Aligns the write position and then appends the bytes of `src`.
    #[inline]
    fn write_aligned_bytes(&mut self, src: &[u8]) -> usize {
        self.align_write() + self.write_bytes(src)
    }
}
