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

//! The timer kernel: a fixed number of busy-wait intervals, each ending in a counter bump
//! and a tick on the timer pipe.

use crate::config::SPINS_PER_FMAX_UNIT;
use crate::counter::CounterWriter;
use crate::device::queue::Kernel;
use crate::error::PipesError;
use crate::pipe::{PipeWriter, TimerTick};
use log::trace;
use std::hint::black_box;

/// Number of busy-wait increments per tick for a frequency multiplier.
///
/// `fmax` must be finite and non-negative. The product is rounded to the nearest spin.
pub fn spins_for_fmax(fmax: f64) -> u64 {
    (fmax * SPINS_PER_FMAX_UNIT).round() as u64
}

/// Count from zero to `spins`. `black_box` keeps the loop from being folded away.
fn busy_wait(spins: u64) {
    let mut i: u64 = 0;
    while black_box(i) < spins {
        i += 1;
    }
}

pub struct TimerKernel {
    pub counter: CounterWriter,
    pub timer: PipeWriter<TimerTick>,
    pub spins: u64,
    pub ticks: usize,
}

impl Kernel for TimerKernel {
    /// Number of ticks emitted.
    type Output = usize;
    const NAME: &'static str = "timer";

    fn run(mut self) -> Result<usize, PipesError> {
        self.counter.reset();
        for tick in 0..self.ticks {
            busy_wait(self.spins);
            let value = self.counter.increment();
            trace!("Timer tick {tick}, counter now {value}");
            self.timer.write(TimerTick)?;
        }
        Ok(self.ticks)
    }
}
