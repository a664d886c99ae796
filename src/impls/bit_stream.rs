/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A growable, bit-addressed serialization stream.

use alloc::vec::Vec;
use core::mem;

#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

use crate::codes::{MiniRead, MiniWrite};
use crate::traits::*;
use crate::utils::hexlify;

/// Size in bytes of the buffer embedded in every stream.
///
/// Messages that fit in it are serialized without touching the heap.
pub const INLINE_BYTES: usize = 256;

/// Above this many bytes, buffers grow additively by this many bytes
/// instead of doubling.
pub const GROWTH_STEP_BYTES: usize = 1 << 20;

/// Where the bytes of a stream live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
pub enum StorageKind {
    /// The fixed-size buffer embedded in the stream.
    Inline,
    /// A heap buffer owned by the stream.
    Owned,
    /// Memory owned by someone else; the stream is read-only.
    Borrowed,
}

enum Storage<'a> {
    Inline([u8; INLINE_BYTES]),
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl Storage<'_> {
    #[inline(always)]
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Inline(buffer) => buffer,
            Storage::Owned(buffer) => buffer,
            Storage::Borrowed(buffer) => buffer,
        }
    }

    #[inline(always)]
    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Storage::Inline(buffer) => buffer,
            Storage::Owned(buffer) => buffer,
            Storage::Borrowed(_) => panic!("Cannot write to a read-only stream"),
        }
    }

    #[inline(always)]
    fn kind(&self) -> StorageKind {
        match self {
            Storage::Inline(_) => StorageKind::Inline,
            Storage::Owned(_) => StorageKind::Owned,
            Storage::Borrowed(_) => StorageKind::Borrowed,
        }
    }
}

/// A buffer addressed at bit granularity, with independent write and read
/// positions.
///
/// Writes append at the write position, growing the buffer as needed;
/// reads consume from the read position. At all times
/// `read_bit_pos() <= written_bits() <= capacity_bits()`. Bits are packed
/// MSB-first within each byte, and any two streams given the same sequence
/// of writes produce the same bytes, independently of the
/// [byte order](StreamConfig::byte_order) of the host.
///
/// Small messages live in an embedded buffer of [`INLINE_BYTES`] bytes;
/// larger ones are moved to a heap buffer obtained from the allocator in
/// the [configuration](StreamConfig). A stream can also be a read-only
/// [view](BitStream::view) of a received datagram, in which case it
/// never allocates.
///
/// Misuse (reading past the written data, writing to a view, inconsistent
/// positions) panics, as it means that writer and reader disagree on the
/// message layout.
pub struct BitStream<'a, A: BufferAlloc = SystemAlloc> {
    storage: Storage<'a>,
    write_pos: usize,
    read_pos: usize,
    config: StreamConfig<A>,
}

impl<'a> BitStream<'a, SystemAlloc> {
    /// Creates an empty stream using the embedded buffer.
    pub fn new() -> Self {
        Self::new_in(StreamConfig::default())
    }

    /// Creates an empty stream able to hold `bytes` bytes without growing.
    pub fn with_capacity(bytes: usize) -> Self {
        Self::with_capacity_in(bytes, StreamConfig::default())
    }

    /// Creates a writable stream holding a copy of `src`, with the write
    /// position past the copied bytes.
    pub fn from_bytes(src: &[u8]) -> Self {
        Self::from_bytes_in(src, StreamConfig::default())
    }

    /// Creates a read-only stream aliasing `src`, with all of its bytes
    /// available for reading.
    pub fn view(src: &'a [u8]) -> Self {
        Self::view_in(src, StreamConfig::default())
    }

    /// Creates a stream over `src`, either [copying](BitStream::from_bytes)
    /// it or [aliasing](BitStream::view) it.
    pub fn wrap(src: &'a [u8], copy: bool) -> Self {
        Self::wrap_in(src, copy, StreamConfig::default())
    }
}

impl Default for BitStream<'_, SystemAlloc> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, A: BufferAlloc> BitStream<'a, A> {
    /// Like [`BitStream::new`], with the given configuration.
    pub fn new_in(config: StreamConfig<A>) -> Self {
        Self {
            storage: Storage::Inline([0; INLINE_BYTES]),
            write_pos: 0,
            read_pos: 0,
            config,
        }
    }

    /// Like [`BitStream::with_capacity`], with the given configuration.
    pub fn with_capacity_in(bytes: usize, config: StreamConfig<A>) -> Self {
        let storage = if bytes <= INLINE_BYTES {
            Storage::Inline([0; INLINE_BYTES])
        } else {
            Storage::Owned(config.alloc.allocate(bytes))
        };
        Self {
            storage,
            write_pos: 0,
            read_pos: 0,
            config,
        }
    }

    /// Like [`BitStream::from_bytes`], with the given configuration.
    pub fn from_bytes_in(src: &[u8], config: StreamConfig<A>) -> Self {
        let mut stream = Self::with_capacity_in(src.len(), config);
        stream.storage.as_mut_slice()[..src.len()].copy_from_slice(src);
        stream.write_pos = src.len() * 8;
        stream
    }

    /// Like [`BitStream::view`], with the given configuration. The
    /// allocator is never used.
    ///
    /// ```
    /// use net_bitstream::prelude::*;
    ///
    /// let alloc = CountingAlloc::new();
    /// let datagram = [0x80, 0x05];
    /// let mut view = BitStream::view_in(&datagram, StreamConfig::new(&alloc));
    /// assert!(view.read_bit());
    /// view.align_read();
    /// assert_eq!(view.read_value::<u8>(), 5);
    /// drop(view);
    /// assert_eq!(alloc.allocations(), 0);
    /// ```
    pub fn view_in(src: &'a [u8], config: StreamConfig<A>) -> Self {
        Self {
            storage: Storage::Borrowed(src),
            write_pos: src.len() * 8,
            read_pos: 0,
            config,
        }
    }

    /// Like [`BitStream::wrap`], with the given configuration.
    pub fn wrap_in(src: &'a [u8], copy: bool, config: StreamConfig<A>) -> Self {
        if copy {
            Self::from_bytes_in(src, config)
        } else {
            Self::view_in(src, config)
        }
    }

    /// Returns the configuration of the stream.
    pub fn config(&self) -> &StreamConfig<A> {
        &self.config
    }

    /// Returns the number of bits written so far.
    #[inline(always)]
    pub fn written_bits(&self) -> usize {
        self.write_pos
    }

    /// Returns the number of bytes touched by the written bits.
    #[inline(always)]
    pub fn written_bytes(&self) -> usize {
        self.write_pos.div_ceil(8)
    }

    /// Returns the current read position, in bits.
    #[inline(always)]
    pub fn read_bit_pos(&self) -> usize {
        self.read_pos
    }

    /// Returns the number of bits still to be read.
    #[inline(always)]
    pub fn payload_bits(&self) -> usize {
        self.write_pos - self.read_pos
    }

    /// Returns the number of bits the stream can hold without growing.
    #[inline(always)]
    pub fn capacity_bits(&self) -> usize {
        self.storage.as_slice().len() * 8
    }

    /// Returns whether the stream is a view, and thus rejects writes.
    #[inline(always)]
    pub fn is_read_only(&self) -> bool {
        matches!(self.storage, Storage::Borrowed(_))
    }

    /// Returns where the bytes of the stream currently live.
    #[inline(always)]
    pub fn storage_kind(&self) -> StorageKind {
        self.storage.kind()
    }

    /// Returns the written bytes. Bits of the last byte past the write
    /// position are zero, unless the stream is a view.
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.storage.as_slice()[..self.written_bytes()]
    }

    /// Returns a copy of the written bytes.
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Panics if there are bits left to read.
    pub fn assert_consumed(&self) {
        assert_eq!(
            self.payload_bits(),
            0,
            "The stream has {} unread bits",
            self.payload_bits()
        );
    }

    /// Ensures that `additional` more bits can be written without further
    /// allocation.
    ///
    /// Up to [`GROWTH_STEP_BYTES`] the target size is twice the required
    /// one; beyond that, it is the required size plus
    /// [`GROWTH_STEP_BYTES`]. Written data and positions are preserved.
    pub fn reserve_bits(&mut self, additional: usize) {
        assert!(!self.is_read_only(), "Cannot write to a read-only stream");
        let required = self
            .write_pos
            .checked_add(additional)
            .unwrap_or_else(|| panic!("Bit count overflow: {} + {}", self.write_pos, additional));
        if required <= self.capacity_bits() {
            return;
        }

        let target_bits = if required > GROWTH_STEP_BYTES * 8 {
            required + GROWTH_STEP_BYTES * 8
        } else {
            required * 2
        };
        let target_bytes = target_bits.div_ceil(8);
        let used = self.written_bytes();

        let promoted = match &mut self.storage {
            Storage::Inline(inline) => {
                let mut heap = self.config.alloc.allocate(target_bytes);
                heap[..used].copy_from_slice(&inline[..used]);
                tracing::debug!(
                    bytes = target_bytes,
                    written = used,
                    "moving stream to the heap"
                );
                Some(heap)
            }
            Storage::Owned(heap) => {
                tracing::trace!(from = heap.len(), to = target_bytes, "growing stream buffer");
                self.config.alloc.reallocate(heap, target_bytes);
                None
            }
            Storage::Borrowed(_) => unreachable!(),
        };
        if let Some(heap) = promoted {
            self.storage = Storage::Owned(heap);
        }
    }

    /// Sets both positions to zero. The buffer is kept.
    pub fn reset(&mut self) {
        self.write_pos = 0;
        self.read_pos = 0;
    }

    /// Sets the read position to zero.
    pub fn reset_read(&mut self) {
        self.read_pos = 0;
    }

    /// Sets the write position, and thus the read position, to zero.
    pub fn reset_write(&mut self) {
        self.reset();
    }

    /// Moves the read position to `pos`, which must not exceed the write
    /// position.
    pub fn set_read_bit_pos(&mut self, pos: usize) {
        assert!(
            pos <= self.write_pos,
            "Read position {} past the write position {}",
            pos,
            self.write_pos
        );
        self.read_pos = pos;
    }

    /// Moves the write position to `pos`, which must lie between the read
    /// position and the capacity. The bits of the byte containing `pos`
    /// that follow it are cleared.
    pub fn set_write_bit_pos(&mut self, pos: usize) {
        assert!(!self.is_read_only(), "Cannot write to a read-only stream");
        assert!(
            self.read_pos <= pos && pos <= self.capacity_bits(),
            "Write position {} outside [{}..{}]",
            pos,
            self.read_pos,
            self.capacity_bits()
        );
        if pos & 7 != 0 {
            self.storage.as_mut_slice()[pos >> 3] &= 0xFF << (8 - (pos & 7));
        }
        self.write_pos = pos;
    }

    /// Skips `bytes` whole bytes.
    pub fn skip_read_bytes(&mut self, bytes: usize) {
        self.skip_bits(bytes * 8);
    }

    /// Pads the stream with zero bytes, after aligning it, until it is
    /// `bytes` bytes long. Does nothing if the stream is already at least
    /// that long.
    pub fn pad_zero_to(&mut self, bytes: usize) -> usize {
        if self.written_bytes() >= bytes {
            return 0;
        }
        let start = self.write_pos;
        self.align_write();
        let from = self.write_pos >> 3;
        self.reserve_bits((bytes - from) * 8);
        self.storage.as_mut_slice()[from..bytes].fill(0);
        self.write_pos = bytes * 8;
        self.write_pos - start
    }

    /// Transfers `n` bits starting at the read position of `other` to the
    /// end of this stream, advancing both streams.
    ///
    /// Bits up to the next byte boundary of `other` are moved one at a
    /// time; the rest, being left-aligned bytes, is moved in bulk.
    pub fn write_stream<B: BufferAlloc>(&mut self, other: &mut BitStream<'_, B>, n: usize) -> usize {
        assert!(
            n <= other.payload_bits(),
            "Cannot transfer {} bits from a stream holding {}",
            n,
            other.payload_bits()
        );
        self.reserve_bits(n);
        let mut remaining = n;
        while remaining > 0 && other.read_pos & 7 != 0 {
            let bit = other.read_bit();
            self.write_bit(bit);
            remaining -= 1;
        }
        if remaining > 0 {
            let from = other.read_pos >> 3;
            let src = &other.storage.as_slice()[from..from + remaining.div_ceil(8)];
            self.write_bits(src, remaining, false);
            other.read_pos += remaining;
        }
        n
    }

    /// Transfers all unread bits of `other`.
    pub fn write_stream_payload<B: BufferAlloc>(&mut self, other: &mut BitStream<'_, B>) -> usize {
        let n = other.payload_bits();
        self.write_stream(other, n)
    }

    /// Writes the length of `src`, truncated to `max_bytes`, as a mini
    /// `u32`, followed by as many aligned bytes of `src`.
    pub fn write_bounded_bytes(&mut self, src: &[u8], max_bytes: usize) -> usize {
        let len = src.len().min(max_bytes);
        let len32 = u32::try_from(len)
            .unwrap_or_else(|_| panic!("Byte run of length {} does not fit a u32", len));
        let mut written = self.write_mini(len32);
        if len > 0 {
            written += self.write_aligned_bytes(&src[..len]);
        }
        written
    }

    /// Inverse of [`BitStream::write_bounded_bytes`]. A length larger than
    /// `max_bytes` is a contract violation.
    pub fn read_bounded_bytes(&mut self, max_bytes: usize) -> Vec<u8> {
        let len = self.read_mini::<u32>() as usize;
        assert!(
            len <= max_bytes,
            "Byte run of length {} exceeds the bound {}",
            len,
            max_bytes
        );
        let mut bytes = alloc::vec![0; len];
        if len > 0 {
            self.read_aligned_bytes(&mut bytes);
        }
        bytes
    }
}

impl<A: BufferAlloc> ByteOrdered for BitStream<'_, A> {
    #[inline(always)]
    fn byte_order(&self) -> ByteOrder {
        self.config.byte_order
    }
}

impl<A: BufferAlloc> BitWrite for BitStream<'_, A> {
    fn write_bits(&mut self, src: &[u8], n: usize, right_aligned: bool) -> usize {
        assert!(n > 0, "Cannot write zero bits");
        assert!(
            src.len() * 8 >= n,
            "Source of {} bytes is too short for {} bits",
            src.len(),
            n
        );
        self.reserve_bits(n);
        let offset = self.write_pos & 7;
        let buffer = self.storage.as_mut_slice();

        if offset == 0 && n & 7 == 0 {
            let from = self.write_pos >> 3;
            buffer[from..from + (n >> 3)].copy_from_slice(&src[..n >> 3]);
            self.write_pos += n;
            return n;
        }

        let mut remaining = n;
        for &src_byte in src {
            if remaining == 0 {
                break;
            }
            let chunk = remaining.min(8);
            let mut byte = src_byte;
            if chunk < 8 {
                if right_aligned {
                    #[cfg(feature = "checks")]
                    assert!(
                        byte >> chunk == 0,
                        "Unused high bits of a right-aligned source byte are not zero: {:#010b}",
                        byte
                    );
                    byte <<= 8 - chunk;
                }
                byte &= 0xFF << (8 - chunk);
            }

            let at = self.write_pos >> 3;
            if offset == 0 {
                buffer[at] = byte;
            } else {
                buffer[at] |= byte >> offset;
                if chunk > 8 - offset {
                    buffer[at + 1] = byte << (8 - offset);
                }
            }
            self.write_pos += chunk;
            remaining -= chunk;
        }
        n
    }

    #[inline]
    fn write_bit_one(&mut self) -> usize {
        self.reserve_bits(1);
        let offset = self.write_pos & 7;
        let buffer = self.storage.as_mut_slice();
        if offset == 0 {
            buffer[self.write_pos >> 3] = 0x80;
        } else {
            buffer[self.write_pos >> 3] |= 0x80 >> offset;
        }
        self.write_pos += 1;
        1
    }

    #[inline]
    fn write_bit_zero(&mut self) -> usize {
        self.reserve_bits(1);
        if self.write_pos & 7 == 0 {
            self.storage.as_mut_slice()[self.write_pos >> 3] = 0;
        }
        self.write_pos += 1;
        1
    }

    fn align_write(&mut self) -> usize {
        let pad = (8 - (self.write_pos & 7)) & 7;
        if pad != 0 {
            self.reserve_bits(pad);
            self.write_pos += pad;
        }
        pad
    }
}

impl<A: BufferAlloc> BitRead for BitStream<'_, A> {
    fn read_bits(&mut self, dest: &mut [u8], n: usize, align_right: bool) {
        assert!(n > 0, "Cannot read zero bits");
        assert!(
            n <= self.payload_bits(),
            "Cannot read {} bits: only {} left",
            n,
            self.payload_bits()
        );
        assert!(
            dest.len() * 8 >= n,
            "Destination of {} bytes is too short for {} bits",
            dest.len(),
            n
        );
        let offset = self.read_pos & 7;
        let buffer = self.storage.as_slice();

        if offset == 0 && n & 7 == 0 {
            let from = self.read_pos >> 3;
            dest[..n >> 3].copy_from_slice(&buffer[from..from + (n >> 3)]);
            self.read_pos += n;
            return;
        }

        let mut remaining = n;
        for dest_byte in dest.iter_mut() {
            if remaining == 0 {
                break;
            }
            let chunk = remaining.min(8);
            let at = self.read_pos >> 3;
            let mut byte = buffer[at] << offset;
            if offset != 0 && chunk > 8 - offset {
                byte |= buffer[at + 1] >> (8 - offset);
            }
            if chunk < 8 {
                byte &= 0xFF << (8 - chunk);
                if align_right {
                    byte >>= 8 - chunk;
                }
            }
            *dest_byte = byte;
            self.read_pos += chunk;
            remaining -= chunk;
        }
    }

    #[inline]
    fn read_bit(&mut self) -> bool {
        assert!(self.read_pos < self.write_pos, "Cannot read past the end of the stream");
        let bit = self.storage.as_slice()[self.read_pos >> 3] & (0x80 >> (self.read_pos & 7));
        self.read_pos += 1;
        bit != 0
    }

    fn skip_bits(&mut self, n: usize) {
        assert!(
            n <= self.payload_bits(),
            "Cannot skip {} bits: only {} left",
            n,
            self.payload_bits()
        );
        self.read_pos += n;
    }

    fn align_read(&mut self) {
        self.read_pos = ((self.read_pos + 7) & !7).min(self.write_pos);
    }
}

impl<A: BufferAlloc> Drop for BitStream<'_, A> {
    fn drop(&mut self) {
        if let Storage::Owned(heap) = &mut self.storage {
            self.config.alloc.release(mem::take(heap));
        }
    }
}

/// Views stay views; owned buffers are copied through the allocator of
/// the clone.
impl<'a, A: BufferAlloc + Clone> Clone for BitStream<'a, A> {
    fn clone(&self) -> Self {
        let config = self.config.clone();
        let storage = match &self.storage {
            Storage::Inline(inline) => Storage::Inline(*inline),
            Storage::Owned(heap) => {
                let mut copy = config.alloc.allocate(heap.len());
                copy.copy_from_slice(heap);
                Storage::Owned(copy)
            }
            Storage::Borrowed(src) => Storage::Borrowed(*src),
        };
        Self {
            storage,
            write_pos: self.write_pos,
            read_pos: self.read_pos,
            config,
        }
    }
}

impl<A: BufferAlloc> core::fmt::Debug for BitStream<'_, A> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BitStream")
            .field("storage", &self.storage_kind())
            .field("byte_order", &self.config.byte_order)
            .field("write_pos", &self.write_pos)
            .field("read_pos", &self.read_pos)
            .field("capacity_bits", &self.capacity_bits())
            .field("data", &hexlify(self.as_bytes(), self.write_pos))
            .finish()
    }
}
