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

//! Kernel submission and completion events.
//!
//! Every kernel gets its own execution context on tokio's blocking pool, so kernels may spin,
//! poll pipes and block on pipes without stalling the async host loop or each other. The
//! host only ever blocks on an [`Event`], which resolves to whatever the kernel returned.

use crate::device::Device;
use crate::device::memory::DeviceBuffer;
use crate::error::PipesError;
use log::debug;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::task::JoinHandle;

/// A unit of work executed entirely inside the device.
///
/// `run` consumes the kernel, so everything it needs (pipe ends, counter handles, buffers)
/// moves in at launch. Whatever the host needs back after completion goes in `Output`.
pub trait Kernel: Send + 'static {
    type Output: Send + 'static;

    /// Name used in logs and in `KernelFailed` errors.
    const NAME: &'static str;

    fn run(self) -> Result<Self::Output, PipesError>;
}

/// In-order submission queue bound to one device.
#[derive(Debug)]
pub struct Queue {
    device: Device,
    submitted: AtomicUsize,
}

impl Queue {
    pub fn new(device: Device) -> Queue {
        Queue {
            device,
            submitted: AtomicUsize::new(0),
        }
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Number of kernels launched through this queue so far.
    pub fn submitted(&self) -> usize {
        self.submitted.load(Ordering::Acquire)
    }

    /// Launch `kernel` asynchronously. Must be called from within the tokio runtime.
    pub fn submit<K: Kernel>(&self, kernel: K) -> Event<K::Output> {
        let launch = self.submitted.fetch_add(1, Ordering::AcqRel);
        debug!(
            "Submitting kernel {} (launch #{launch}) to {}",
            K::NAME,
            self.device.name()
        );
        let handle = tokio::task::spawn_blocking(move || {
            let result = kernel.run();
            debug!("Kernel {} finished", K::NAME);
            result
        });
        Event {
            kernel: K::NAME,
            handle,
        }
    }

    /// Allocate a zero-initialised buffer of `len` elements in device memory.
    pub fn malloc_device<T: Copy + Default>(
        &self,
        len: usize,
    ) -> Result<DeviceBuffer<T>, PipesError> {
        DeviceBuffer::zeroed(self.device.memory(), len)
    }

    /// Copy a device buffer back into host memory.
    pub fn memcpy_to_host<T: Copy>(&self, buffer: &DeviceBuffer<T>) -> Vec<T> {
        debug!(
            "Copying {} bytes from {} to host",
            buffer.size_bytes(),
            self.device.name()
        );
        buffer.as_slice().to_vec()
    }
}

/// Completion handle of a submitted kernel.
#[derive(Debug)]
pub struct Event<T> {
    kernel: &'static str,
    handle: JoinHandle<Result<T, PipesError>>,
}

impl<T> Event<T> {
    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the kernel to complete and take its output.
    ///
    /// # Returns: `Result<T, PipesError>`
    /// * `Ok(T)` - The kernel ran to completion
    /// * `Err(PipesError)` - The kernel returned an error
    /// * `Err(PipesError::KernelFailed)` - The kernel panicked or its task was cancelled
    pub async fn wait(self) -> Result<T, PipesError> {
        match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(PipesError::KernelFailed {
                kernel: self.kernel,
                reason: if e.is_panic() {
                    "kernel panicked".to_string()
                } else {
                    e.to_string()
                },
            }),
        }
    }
}
