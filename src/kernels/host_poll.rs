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

use crate::device::queue::Kernel;
use crate::error::PipesError;
use crate::pipe::{HostTick, PipeReader};

/// Blocks for exactly one host tick, then hands the pipe end back for the next launch.
pub struct HostPollKernel {
    pub host: PipeReader<HostTick>,
}

impl Kernel for HostPollKernel {
    type Output = PipeReader<HostTick>;
    const NAME: &'static str = "host-poll";

    fn run(mut self) -> Result<PipeReader<HostTick>, PipesError> {
        self.host.read()?;
        Ok(self.host)
    }
}
