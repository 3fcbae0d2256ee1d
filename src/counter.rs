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

//! The timer counter shared between the timer kernel and the persistent kernel.
//!
//! [`timer_counter`] hands out exactly one [`CounterWriter`] and one [`CounterReader`]; neither
//! is `Clone`. Writes publish with `Release` and reads observe with `Acquire`, so anything the
//! timer kernel did before bumping the counter is visible to whoever reads the new value.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub fn timer_counter() -> (CounterWriter, CounterReader) {
    let value = Arc::new(AtomicU64::new(0));
    (
        CounterWriter {
            value: value.clone(),
        },
        CounterReader { value },
    )
}

#[derive(Debug)]
pub struct CounterWriter {
    value: Arc<AtomicU64>,
}

impl CounterWriter {
    pub fn reset(&mut self) {
        self.value.store(0, Ordering::Release);
    }

    /// Bump the counter by one and return the new value.
    pub fn increment(&mut self) -> u64 {
        // single writer, so a plain load/store pair cannot lose an update
        let next = self.value.load(Ordering::Relaxed) + 1;
        self.value.store(next, Ordering::Release);
        next
    }
}

#[derive(Debug)]
pub struct CounterReader {
    value: Arc<AtomicU64>,
}

impl CounterReader {
    pub fn snapshot(&self) -> u64 {
        self.value.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn increment_then_reset() {
        let (mut writer, reader) = timer_counter();
        assert_eq!(reader.snapshot(), 0);
        assert_eq!(writer.increment(), 1);
        assert_eq!(writer.increment(), 2);
        assert_eq!(reader.snapshot(), 2);
        writer.reset();
        assert_eq!(reader.snapshot(), 0);
    }

    #[test]
    fn reader_sees_monotonic_values_across_threads() {
        let (mut writer, reader) = timer_counter();
        let producer = thread::spawn(move || {
            for _ in 0..10_000 {
                writer.increment();
            }
        });

        let mut last = 0;
        while last < 10_000 {
            let now = reader.snapshot();
            assert!(now >= last, "counter went backwards: {now} < {last}");
            last = now;
        }
        producer.join().unwrap();
        assert_eq!(reader.snapshot(), 10_000);
    }
}
