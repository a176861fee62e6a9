//! Shared channel-state storage
//!
//! All per-channel state buffers live in one 16-byte aligned `f32` arena.
//! Buffers never hold pointers into it: layout code walks a [`Storage`]
//! cursor and each buffer keeps the [`BufferRange`] it was handed, which
//! is resolved against the arena slice on every access.

use std::mem::size_of;

use bytemuck::{Pod, Zeroable};

use crate::error::StorageError;

/// Alignment (in bytes) of every buffer inside the shared storage
pub const VECTOR_ALIGNMENT: usize = 16;

const FLOATS_PER_VECTOR: usize = VECTOR_ALIGNMENT / size_of::<f32>();

/// Round a byte count up to [`VECTOR_ALIGNMENT`]
#[inline]
pub const fn align(bytes: usize) -> usize {
    (bytes + VECTOR_ALIGNMENT - 1) & !(VECTOR_ALIGNMENT - 1)
}

/// Round an `f32` element count up to a whole number of vectors
#[inline]
pub const fn align_index(elements: usize) -> usize {
    (elements + FLOATS_PER_VECTOR - 1) & !(FLOATS_PER_VECTOR - 1)
}

/// Engine values that determine how much storage channel states need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StorageFactors {
    pub fft_size: u16,
    pub overlap_factor: u8,
    pub number_of_channels: u8,
    pub sample_rate: u32,
}

impl StorageFactors {
    /// True once every factor has been set
    pub fn complete(&self) -> bool {
        self.fft_size != 0
            && self.overlap_factor != 0
            && self.number_of_channels != 0
            && self.sample_rate != 0
    }

    #[inline]
    pub fn number_of_bins(&self) -> u16 {
        self.fft_size / 2 + 1
    }
}

#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, Default, Pod, Zeroable)]
struct Lane([f32; FLOATS_PER_VECTOR]);

/// The arena backing all channel-state buffers
#[derive(Debug, Default)]
pub struct SharedStorage {
    lanes: Vec<Lane>,
}

impl SharedStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reallocate to hold at least `bytes` bytes; contents are zeroed
    pub fn resize(&mut self, bytes: usize) {
        let lanes = align(bytes) / VECTOR_ALIGNMENT;
        self.lanes.clear();
        self.lanes.resize(lanes, Lane::default());
    }

    /// Size in bytes
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.lanes.len() * VECTOR_ALIGNMENT
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// A layout cursor spanning the whole arena
    pub fn storage(&self) -> Storage {
        Storage::new(self.len_bytes())
    }

    #[inline]
    pub fn as_slice(&self) -> &[f32] {
        bytemuck::cast_slice(&self.lanes)
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        bytemuck::cast_slice_mut(&mut self.lanes)
    }
}

/// Layout cursor over a byte capacity
///
/// Hands out aligned, non-overlapping [`BufferRange`]s in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Storage {
    position: usize,
    capacity: usize,
}

impl Storage {
    pub fn new(capacity: usize) -> Self {
        Self {
            position: 0,
            capacity,
        }
    }

    /// Bytes consumed so far, padding included
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.position
    }

    /// Reserve `bytes` bytes starting at the next aligned position
    pub fn allocate(&mut self, bytes: usize) -> Result<BufferRange, StorageError> {
        let start = align(self.position);
        let end = start + bytes;
        if end > self.capacity {
            return Err(StorageError::Insufficient {
                required: end,
                available: self.capacity,
            });
        }
        self.position = end;

        Ok(BufferRange {
            offset: start / size_of::<f32>(),
            len: bytes.div_ceil(size_of::<f32>()),
        })
    }
}

/// Element range of one buffer inside the shared storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferRange {
    offset: usize,
    len: usize,
}

impl BufferRange {
    /// Offset in `f32` elements
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset in bytes
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.offset * size_of::<f32>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub fn slice<'a>(&self, storage: &'a [f32]) -> &'a [f32] {
        &storage[self.offset..self.end()]
    }

    #[inline]
    pub fn slice_mut<'a>(&self, storage: &'a mut [f32]) -> &'a mut [f32] {
        &mut storage[self.offset..self.end()]
    }
}
