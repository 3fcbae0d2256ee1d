// This file is part of fpga-pipes, a demonstration of accelerator kernels relaying events and timer ticks through FPGA pipes.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// fpga-pipes is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// fpga-pipes is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Device memory owned by the run that allocated it.
//!
//! A [`DeviceBuffer`] is released when it is dropped, whichever path the run takes, and the
//! [`DeviceMemory`] accounting of the device it came from is updated accordingly. Kernels that
//! write a buffer take ownership of it for the duration of the launch, so the host cannot
//! observe the contents until the kernel has completed and handed the buffer back.

use crate::error::PipesError;
use log::debug;
use std::mem::size_of;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Allocation bookkeeping for a single device.
#[derive(Debug, Default)]
pub struct DeviceMemory {
    bytes_in_use: AtomicUsize,
    live_buffers: AtomicUsize,
}

impl DeviceMemory {
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use.load(Ordering::Acquire)
    }

    pub fn live_buffers(&self) -> usize {
        self.live_buffers.load(Ordering::Acquire)
    }

    fn claim(&self, bytes: usize) {
        self.bytes_in_use.fetch_add(bytes, Ordering::AcqRel);
        self.live_buffers.fetch_add(1, Ordering::AcqRel);
    }

    fn release(&self, bytes: usize) {
        self.bytes_in_use.fetch_sub(bytes, Ordering::AcqRel);
        self.live_buffers.fetch_sub(1, Ordering::AcqRel);
    }
}

#[derive(Debug)]
pub struct DeviceBuffer<T> {
    data: Box<[T]>,
    memory: Arc<DeviceMemory>,
}

impl<T: Copy + Default> DeviceBuffer<T> {
    /// Allocate `len` zero-initialised elements against `memory`.
    ///
    /// # Returns: `Result<DeviceBuffer<T>, PipesError>`
    /// * `Ok(DeviceBuffer<T>)` - The new buffer
    /// * `Err(PipesError::Argument)` - `len` is zero
    pub(crate) fn zeroed(memory: Arc<DeviceMemory>, len: usize) -> Result<Self, PipesError> {
        if len == 0 {
            return Err(PipesError::Argument(
                "Cannot allocate an empty device buffer".into(),
            ));
        }
        let data = vec![T::default(); len].into_boxed_slice();
        let bytes = len * size_of::<T>();
        memory.claim(bytes);
        debug!("Allocated {bytes} bytes of device memory");
        Ok(DeviceBuffer { data, memory })
    }

    pub fn write(&mut self, index: usize, value: T) -> Result<(), PipesError> {
        let len = self.data.len();
        let slot = self
            .data
            .get_mut(index)
            .ok_or(PipesError::OutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }
}

impl<T> DeviceBuffer<T> {
    pub fn size_bytes(&self) -> usize {
        self.data.len() * size_of::<T>()
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Drop for DeviceBuffer<T> {
    fn drop(&mut self) {
        let bytes = self.size_bytes();
        self.memory.release(bytes);
        debug!("Freed {bytes} bytes of device memory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use googletest::prelude::*;

    #[gtest]
    fn allocation_is_zeroed_and_accounted() {
        let memory = Arc::new(DeviceMemory::default());
        let buffer = DeviceBuffer::<u64>::zeroed(memory.clone(), 8).unwrap();
        assert_eq!(buffer.as_slice(), &[0u64; 8]);
        assert_eq!(memory.bytes_in_use(), 64);
        assert_eq!(memory.live_buffers(), 1);

        drop(buffer);
        assert_eq!(memory.bytes_in_use(), 0);
        assert_eq!(memory.live_buffers(), 0);
    }

    #[gtest]
    fn empty_allocation_is_rejected() {
        let memory = Arc::new(DeviceMemory::default());
        let err = DeviceBuffer::<u64>::zeroed(memory.clone(), 0).unwrap_err();
        expect_that!(err.to_string(), starts_with("PipesError::Argument"));
        assert_eq!(memory.live_buffers(), 0);
    }

    #[gtest]
    fn out_of_bounds_access_is_an_error() {
        let memory = Arc::new(DeviceMemory::default());
        let mut buffer = DeviceBuffer::<u64>::zeroed(memory, 8).unwrap();
        buffer.write(7, 3).unwrap();

        let err = buffer.write(8, 1).unwrap_err();
        expect_that!(
            err.to_string(),
            contains_substring("Index 8 is outside of a 8-entry device buffer")
        );
        assert_eq!(buffer.as_slice(), &[0, 0, 0, 0, 0, 0, 0, 3]);
    }
}
