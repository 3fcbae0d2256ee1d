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

//! The persistent relay kernel.
//!
//! Every iteration of its loop:
//! 1. polls the event pipe; a `Record(slot)` stores the current timer counter in the results
//!    buffer, a `Shutdown` stores the final counter in slot 0 and ends the loop
//! 2. polls the timer pipe; a tick is forwarded to the host pipe
//!
//! Neither poll blocks. The kernel owns the results buffer until it returns it in its
//! [`PersistentReport`], so the host cannot read the snapshots while they are still being
//! written.

use crate::counter::CounterReader;
use crate::device::memory::DeviceBuffer;
use crate::device::queue::Kernel;
use crate::error::PipesError;
use crate::pipe::{EventMessage, HostTick, PipeReader, PipeWriter, TimerTick};
use log::{debug, warn};

/// Slot receiving the timer value at shutdown.
const SHUTDOWN_SLOT: usize = 0;

pub struct PersistentKernel {
    pub events: PipeReader<EventMessage>,
    pub timer: PipeReader<TimerTick>,
    pub host: PipeWriter<HostTick>,
    pub counter: CounterReader,
    pub results: DeviceBuffer<u64>,
}

/// What the persistent kernel hands back to the host after shutdown.
#[derive(Debug)]
pub struct PersistentReport {
    pub results: DeviceBuffer<u64>,
    pub snapshots_recorded: usize,
    pub events_discarded: usize,
    pub ticks_forwarded: usize,
}

impl Kernel for PersistentKernel {
    type Output = PersistentReport;
    const NAME: &'static str = "persistent";

    fn run(self) -> Result<PersistentReport, PipesError> {
        let PersistentKernel {
            mut events,
            timer,
            host,
            counter,
            mut results,
        } = self;
        let mut timer = Some(timer);
        let mut snapshots_recorded = 0;
        let mut events_discarded = 0;
        let mut ticks_forwarded = 0;

        loop {
            match events.try_read()? {
                Some(EventMessage::Shutdown) => {
                    let snapshot = counter.snapshot();
                    results.write(SHUTDOWN_SLOT, snapshot)?;
                    snapshots_recorded += 1;
                    debug!("Persistent kernel received shutdown, final timer value {snapshot}");
                    break;
                }
                Some(EventMessage::Record(slot)) => {
                    let snapshot = counter.snapshot();
                    match results.write(slot, snapshot) {
                        Ok(()) => {
                            debug!("Recorded timer value {snapshot} in slot {slot}");
                            snapshots_recorded += 1;
                        }
                        Err(e) => {
                            warn!("Discarding event: {e}");
                            events_discarded += 1;
                        }
                    }
                }
                None => {}
            }

            if let Some(rx) = timer.as_mut() {
                match rx.try_read() {
                    Ok(Some(TimerTick)) => {
                        host.write(HostTick)?;
                        ticks_forwarded += 1;
                    }
                    Ok(None) => {}
                    // the timer kernel finished and every tick it sent has been forwarded
                    Err(PipesError::PipeClosed { .. }) => {
                        debug!("Timer pipe drained after {ticks_forwarded} ticks");
                        timer = None;
                    }
                    Err(e) => return Err(e),
                }
            }

            std::hint::spin_loop();
        }

        Ok(PersistentReport {
            results,
            snapshots_recorded,
            events_discarded,
            ticks_forwarded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PIPE_DEPTH, RESULT_SLOTS, TICK_COUNT};
    use crate::counter::{CounterWriter, timer_counter};
    use crate::kernels::timer::TimerKernel;
    use crate::device::Device;
    use crate::device::queue::{Event, Queue};
    use crate::pipe::pipe;
    use googletest::prelude::*;
    use std::time::Duration;

    struct Harness {
        queue: Queue,
        events: PipeWriter<EventMessage>,
        timer: PipeWriter<TimerTick>,
        host: PipeReader<HostTick>,
        counter: CounterWriter,
        kernel: Event<PersistentReport>,
    }

    fn launch() -> Harness {
        let queue = Queue::new(Device::emulator());
        let (events, event_rx) = pipe("event", PIPE_DEPTH);
        let (timer, timer_rx) = pipe("timer", PIPE_DEPTH);
        let (host_tx, host) = pipe("host", PIPE_DEPTH);
        let (counter, counter_rx) = timer_counter();
        let results = queue.malloc_device::<u64>(RESULT_SLOTS).unwrap();
        let kernel = queue.submit(PersistentKernel {
            events: event_rx,
            timer: timer_rx,
            host: host_tx,
            counter: counter_rx,
            results,
        });
        Harness {
            queue,
            events,
            timer,
            host,
            counter,
            kernel,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn records_snapshot_at_event_index() {
        let mut h = launch();
        h.counter.increment();
        h.counter.increment();
        h.counter.increment();
        h.events.try_write(EventMessage::Record(5)).unwrap();
        settle().await;
        expect_false!(h.kernel.is_complete());

        h.events.try_write(EventMessage::Shutdown).unwrap();
        let report = h.kernel.wait().await.unwrap();
        assert_eq!(report.snapshots_recorded, 2);
        assert_eq!(
            h.queue.memcpy_to_host(&report.results),
            vec![3, 0, 0, 0, 0, 3, 0, 0]
        );
    }

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn records_live_timer_values_between_ticks() {
        let h = launch();
        let timer = h.queue.submit(TimerKernel {
            counter: h.counter,
            timer: h.timer,
            spins: 20_000,
            ticks: TICK_COUNT,
        });

        let events = h.events;
        let mut host = h.host;
        // slot `tick` is requested right after the host saw that tick
        tokio::task::spawn_blocking(move || {
            for tick in 1..=TICK_COUNT {
                host.read().unwrap();
                if tick < RESULT_SLOTS {
                    events.write(EventMessage::Record(tick)).unwrap();
                }
            }
            events.write(EventMessage::Shutdown).unwrap();
        })
        .await
        .unwrap();

        let report = h.kernel.wait().await.unwrap();
        assert_eq!(timer.wait().await.unwrap(), TICK_COUNT);
        assert_eq!(report.ticks_forwarded, TICK_COUNT);
        assert_eq!(report.snapshots_recorded, RESULT_SLOTS);

        let values = h.queue.memcpy_to_host(&report.results);
        assert_eq!(values[0], TICK_COUNT as u64);
        let recorded = &values[1..];
        for (slot, value) in (1..).zip(recorded) {
            // the counter is bumped before each tick leaves the timer kernel
            assert!(
                (slot..=TICK_COUNT as u64).contains(value),
                "slot {slot} holds {value}"
            );
        }
        assert!(recorded.windows(2).all(|w| w[0] <= w[1]), "{recorded:?}");
    }

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn keeps_running_on_empty_polls_and_records() {
        let h = launch();
        settle().await;
        expect_false!(h.kernel.is_complete());

        h.events.try_write(EventMessage::Record(1)).unwrap();
        settle().await;
        expect_false!(h.kernel.is_complete());

        h.events.try_write(EventMessage::Shutdown).unwrap();
        expect_that!(h.kernel.wait().await, ok(anything()));
    }

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn out_of_range_slot_is_discarded() {
        let h = launch();
        h.events
            .try_write(EventMessage::Record(RESULT_SLOTS))
            .unwrap();
        h.events.try_write(EventMessage::Shutdown).unwrap();
        let report = h.kernel.wait().await.unwrap();
        assert_eq!(report.events_discarded, 1);
        // only the shutdown snapshot
        assert_eq!(report.snapshots_recorded, 1);
        assert_eq!(h.queue.memcpy_to_host(&report.results), vec![0; RESULT_SLOTS]);
    }

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn forwards_every_timer_tick_to_host() {
        let h = launch();
        for _ in 0..3 {
            h.timer.try_write(TimerTick).unwrap();
        }
        drop(h.timer);

        let mut host = h.host;
        let host = tokio::task::spawn_blocking(move || {
            for _ in 0..3 {
                host.read().unwrap();
            }
            host
        })
        .await
        .unwrap();

        // a closed timer pipe is not a reason to stop
        settle().await;
        expect_false!(h.kernel.is_complete());

        h.events.try_write(EventMessage::Shutdown).unwrap();
        let report = h.kernel.wait().await.unwrap();
        assert_eq!(report.ticks_forwarded, 3);
        drop(host);
        assert_eq!(h.queue.device().live_buffers(), 1);
        drop(report);
        assert_eq!(h.queue.device().live_buffers(), 0);
    }

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn dropped_event_pipe_ends_kernel_and_frees_results() {
        let h = launch();
        drop(h.events);
        let err = h.kernel.wait().await.unwrap_err();
        expect_that!(err.to_string(), contains_substring("event pipe"));
        assert_eq!(h.queue.device().bytes_in_use(), 0);
    }
}
