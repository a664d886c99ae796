/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Allocator capability and stream configuration.
//!
//! Heap buffers of a [`BitStream`](crate::impls::BitStream) are obtained,
//! grown and released through a [`BufferAlloc`], which is passed to the
//! stream at construction time together with the [`ByteOrder`] to use.

use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

use crate::traits::ByteOrder;

/// Source of heap buffers for streams.
///
/// Buffers are plain vectors whose length is the allocated size; all
/// bytes handed out must be zero.
pub trait BufferAlloc {
    /// Returns a zero-filled buffer of `bytes` bytes.
    ///
    /// Allocation failure is fatal.
    fn allocate(&self, bytes: usize) -> Vec<u8>;

    /// Grows `buffer` to `bytes` bytes, preserving its content and
    /// zero-filling the new tail.
    fn reallocate(&self, buffer: &mut Vec<u8>, bytes: usize);

    /// Gives back a buffer obtained from [`BufferAlloc::allocate`]. Called
    /// exactly once per heap buffer.
    #[inline(always)]
    fn release(&self, buffer: Vec<u8>) {
        drop(buffer);
    }
}

impl<A: BufferAlloc + ?Sized> BufferAlloc for &A {
    #[inline(always)]
    fn allocate(&self, bytes: usize) -> Vec<u8> {
        (**self).allocate(bytes)
    }

    #[inline(always)]
    fn reallocate(&self, buffer: &mut Vec<u8>, bytes: usize) {
        (**self).reallocate(buffer, bytes)
    }

    #[inline(always)]
    fn release(&self, buffer: Vec<u8>) {
        (**self).release(buffer)
    }
}

/// The global allocator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SystemAlloc;

impl BufferAlloc for SystemAlloc {
    fn allocate(&self, bytes: usize) -> Vec<u8> {
        let mut buffer = Vec::new();
        if buffer.try_reserve_exact(bytes).is_err() {
            panic!("Cannot allocate a stream buffer of {} bytes", bytes);
        }
        buffer.resize(bytes, 0);
        buffer
    }

    fn reallocate(&self, buffer: &mut Vec<u8>, bytes: usize) {
        let additional = bytes.saturating_sub(buffer.len());
        if buffer.try_reserve_exact(additional).is_err() {
            panic!(
                "Cannot grow a stream buffer from {} to {} bytes",
                buffer.len(),
                bytes
            );
        }
        buffer.resize(bytes, 0);
    }
}

/// A [`SystemAlloc`] keeping track of the number of calls it receives.
///
/// Pass it by reference to a stream to inspect the counters afterwards.
#[derive(Debug, Default)]
pub struct CountingAlloc {
    allocations: AtomicUsize,
    reallocations: AtomicUsize,
    releases: AtomicUsize,
}

impl CountingAlloc {
    /// Creates an allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls to [`BufferAlloc::allocate`].
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    /// Number of calls to [`BufferAlloc::reallocate`].
    pub fn reallocations(&self) -> usize {
        self.reallocations.load(Ordering::Relaxed)
    }

    /// Number of calls to [`BufferAlloc::release`].
    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::Relaxed)
    }

    /// Buffers handed out and not yet released.
    pub fn live(&self) -> usize {
        self.allocations() - self.releases()
    }
}

impl BufferAlloc for CountingAlloc {
    fn allocate(&self, bytes: usize) -> Vec<u8> {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        SystemAlloc.allocate(bytes)
    }

    fn reallocate(&self, buffer: &mut Vec<u8>, bytes: usize) {
        self.reallocations.fetch_add(1, Ordering::Relaxed);
        SystemAlloc.reallocate(buffer, bytes)
    }

    fn release(&self, buffer: Vec<u8>) {
        self.releases.fetch_add(1, Ordering::Relaxed);
        SystemAlloc.release(buffer)
    }
}

/// Construction-time configuration of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamConfig<A = SystemAlloc> {
    /// Byte order of the (possibly simulated) host.
    pub byte_order: ByteOrder,
    /// Source of heap buffers.
    pub alloc: A,
}

impl<A> StreamConfig<A> {
    /// A configuration using `alloc` and the byte order of the running host.
    pub fn new(alloc: A) -> Self {
        Self {
            byte_order: ByteOrder::host(),
            alloc,
        }
    }

    /// Replaces the byte order, e.g., to simulate a big-endian host.
    pub fn with_byte_order(self, byte_order: ByteOrder) -> Self {
        Self { byte_order, ..self }
    }
}

impl Default for StreamConfig<SystemAlloc> {
    fn default() -> Self {
        Self::new(SystemAlloc)
    }
}
