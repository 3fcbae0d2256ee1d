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

//! Board discovery through the Linux FPGA subsystem.
//!
//! Each board appears as `/sys/class/fpga_manager/<handle>` with a `state` file. A board is
//! usable once its state reads `operating`, i.e. a bitstream has been programmed:
//! ```text
//! /sys/class/fpga_manager/fpga0
//! ├── flags
//! ├── name
//! ├── state
//! └── ...
//! ```
//! Only the emulator has a kernel backend, so finding an operating board is reported as
//! `Unsupported` rather than silently falling back to host threads.

use crate::error::PipesError;
use crate::system_io::{list_handles, read_attribute};
use log::{info, warn};
use std::path::Path;

/// Find the first board whose state is `operating`.
///
/// # Returns: `Result<String, PipesError>`
/// * `Ok(String)` - Handle of the board, e.g. `fpga0`
/// * `Err(PipesError::DeviceNotFound)` - No manager directory, no boards, or none operating
pub(crate) fn find_operating_fpga(fpga_managers_dir: &Path) -> Result<String, PipesError> {
    let handles = list_handles(fpga_managers_dir)
        .map_err(|e| PipesError::DeviceNotFound(format!("no FPGA subsystem: {e}")))?;

    for handle in handles {
        match read_attribute(fpga_managers_dir, &handle, "state") {
            Ok(state) if state == "operating" => {
                info!("{handle}'s state is 'operating'");
                return Ok(handle);
            }
            Ok(state) => warn!("Skipping {handle}: state is '{state}'"),
            Err(e) => warn!("Skipping {handle}: {e}"),
        }
    }

    Err(PipesError::DeviceNotFound(format!(
        "no operating FPGA under {fpga_managers_dir:?}"
    )))
}

pub(crate) fn select_fpga(fpga_managers_dir: &Path) -> Result<super::Device, PipesError> {
    let handle = find_operating_fpga(fpga_managers_dir)?;
    Err(PipesError::Unsupported(format!(
        "{handle} is programmed, but kernels can only be launched on the emulator"
    )))
}
