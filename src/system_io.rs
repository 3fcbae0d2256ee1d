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

//! Sysfs helpers for the board probe.
//!
//! The Linux FPGA subsystem exposes one directory per board and one small text file per
//! attribute. Errors keep the offending path so a failed probe can be traced back to the
//! file that could not be read.

use crate::error::PipesError;
use log::trace;
use std::path::Path;

/// Read `<class_dir>/<handle>/<attribute>` without its trailing newline.
///
/// # Returns: `Result<String, PipesError>`
/// * `Ok(String)` - The attribute value, e.g. `operating` for `state`
/// * `Err(PipesError::IORead)` - The attribute file cannot be read
pub fn read_attribute(
    class_dir: &Path,
    handle: &str,
    attribute: &str,
) -> Result<String, PipesError> {
    let file = class_dir.join(handle).join(attribute);
    match std::fs::read_to_string(&file) {
        Ok(value) => {
            let value = value.trim_end_matches('\n').to_string();
            trace!("{file:?} reads '{value}'");
            Ok(value)
        }
        Err(e) => Err(PipesError::IORead { file, e }),
    }
}

/// List the device handles under a sysfs class directory, sorted so that the first board
/// found is stable between runs. Entries that cannot be read are skipped.
///
/// # Returns: `Result<Vec<String>, PipesError>`
/// * `Ok(Vec<String>)` - Handles such as `fpga0`
/// * `Err(PipesError::IOReadDir)` - The class directory cannot be read
pub fn list_handles(class_dir: &Path) -> Result<Vec<String>, PipesError> {
    let entries = std::fs::read_dir(class_dir).map_err(|e| PipesError::IOReadDir {
        dir: class_dir.to_owned(),
        e,
    })?;
    let mut handles: Vec<String> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    handles.sort();
    trace!("{class_dir:?} lists {handles:?}");
    Ok(handles)
}
