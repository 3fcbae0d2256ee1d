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

//! Accelerator selection.
//!
//! Two selectors exist:
//! - **emulator**: kernels execute on host threads, one blocking task per kernel.
//! - **fpga**: looks for a programmed board under the Linux FPGA subsystem. See [`fpga`].
//!
//! The default selector is the emulator when the `fpga-emulator` cargo feature is enabled
//! (the default) and the board otherwise.

pub mod fpga;
pub mod memory;
pub mod queue;

use crate::config;
use crate::device::memory::DeviceMemory;
use crate::error::PipesError;
use log::info;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DeviceSelector {
    Emulator,
    Fpga,
}

impl Default for DeviceSelector {
    fn default() -> Self {
        if cfg!(feature = "fpga-emulator") {
            DeviceSelector::Emulator
        } else {
            DeviceSelector::Fpga
        }
    }
}

impl DeviceSelector {
    /// Pick a device, probing the standard fpga_manager directory for boards.
    pub fn select(self) -> Result<Device, PipesError> {
        self.select_in(Path::new(config::FPGA_MANAGERS_DIR))
    }

    pub(crate) fn select_in(self, fpga_managers_dir: &Path) -> Result<Device, PipesError> {
        let device = match self {
            DeviceSelector::Emulator => Device::emulator(),
            DeviceSelector::Fpga => fpga::select_fpga(fpga_managers_dir)?,
        };
        info!("Running on device: {}", device.name());
        Ok(device)
    }
}

/// A selected accelerator and its memory bookkeeping. Cloning shares the bookkeeping.
#[derive(Debug, Clone)]
pub struct Device {
    name: String,
    memory: Arc<DeviceMemory>,
}

impl Device {
    pub fn emulator() -> Device {
        Device {
            name: "fpga emulator".to_string(),
            memory: Arc::new(DeviceMemory::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bytes_in_use(&self) -> usize {
        self.memory.bytes_in_use()
    }

    pub fn live_buffers(&self) -> usize {
        self.memory.live_buffers()
    }

    pub(crate) fn memory(&self) -> Arc<DeviceMemory> {
        self.memory.clone()
    }
}
