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

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PipesError {
    #[error("PipesError::DeviceNotFound: No accelerator matched the selector: {0}")]
    DeviceNotFound(String),
    #[error("PipesError::Unsupported: {0}")]
    Unsupported(String),
    #[error("PipesError::Argument: {0}")]
    Argument(String),
    #[error("PipesError::PipeClosed: The other end of the {pipe} pipe was dropped")]
    PipeClosed { pipe: &'static str },
    #[error("PipesError::OutOfBounds: Index {index} is outside of a {len}-entry device buffer")]
    OutOfBounds { index: usize, len: usize },
    #[error("PipesError::KernelFailed: Kernel {kernel} did not run to completion: {reason}")]
    KernelFailed {
        kernel: &'static str,
        reason: String,
    },
    #[error("PipesError::IORead: An IO error occurred when reading from {file:?}: {e}")]
    IORead { file: PathBuf, e: std::io::Error },
    #[error("PipesError::IOReadDir: An IO error occurred when reading directory {dir:?}: {e}")]
    IOReadDir { dir: PathBuf, e: std::io::Error },
    #[error("PipesError::Output: Failed to write progress output: {0}")]
    Output(#[from] std::io::Error),
}

impl PipesError {
    /// Whether the runtime could not find an accelerator at all, in which case the user is
    /// most likely missing a board or meant to run on the emulator.
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, PipesError::DeviceNotFound(..))
    }
}
