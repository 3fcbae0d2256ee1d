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

/// The driver-decided location of fpga_manager objects. Typically `/sys/class/fpga_manager/`.
pub static FPGA_MANAGERS_DIR: &str = "/sys/class/fpga_manager/";

/// Frequency multiplier used when none is given on the command line.
pub const DEFAULT_FMAX: f64 = 100.0;

/// Busy-wait increments per unit of the frequency multiplier, i.e. one multiplier unit is one
/// MHz worth of spins.
pub const SPINS_PER_FMAX_UNIT: f64 = 1_000_000.0;

/// Number of ticks the timer kernel emits, and so the number of host-poll round trips.
pub const TICK_COUNT: usize = 10;

/// Number of timer snapshots the persistent kernel can record.
pub const RESULT_SLOTS: usize = 8;

/// Capacity of every pipe, matching the depth the kernels were synthesized with.
pub const PIPE_DEPTH: usize = 4;
