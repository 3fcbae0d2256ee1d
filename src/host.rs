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

//! The host control loop.
//!
//! A run walks through a fixed sequence of [`HostState`]s:
//!
//! ```text
//! Init → LaunchPersistent → LaunchTimer → PollLoop(×ticks) → SendShutdown
//!      → AwaitPersistentExit → ReadResults → Report → Done
//! ```
//!
//! The only points where the host waits are kernel completion events. Progress lines go to
//! the writer handed in by the caller (stdout for the binary); diagnostics go to the log.
//!
//! Every allocation made here is owned by a value scoped to the run. If a stage fails, the
//! function returns early and dropping the remaining pipe ends unwinds the kernels still
//! running: the persistent kernel sees its event pipe close and exits, freeing the results
//! buffer, which in turn closes the pipes the timer and host-poll kernels are using.

use crate::config::{PIPE_DEPTH, RESULT_SLOTS, TICK_COUNT};
use crate::counter::timer_counter;
use crate::device::queue::Queue;
use crate::device::{Device, DeviceSelector};
use crate::error::PipesError;
use crate::kernels::event::EventKernel;
use crate::kernels::host_poll::HostPollKernel;
use crate::kernels::persistent::{PersistentKernel, PersistentReport};
use crate::kernels::timer::{TimerKernel, spins_for_fmax};
use crate::pipe::{EventMessage, pipe};
use log::{debug, info};
use std::fmt;
use std::io::Write;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostState {
    Init,
    LaunchPersistent,
    LaunchTimer,
    PollLoop,
    SendShutdown,
    AwaitPersistentExit,
    ReadResults,
    Report,
    Done,
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub fmax: f64,
    pub selector: DeviceSelector,
    pub ticks: usize,
}

impl RunConfig {
    pub fn new(fmax: f64, selector: DeviceSelector) -> RunConfig {
        RunConfig {
            fmax,
            selector,
            ticks: TICK_COUNT,
        }
    }
}

#[derive(Debug)]
pub struct RunReport {
    /// Host-measured wall-clock time between consecutive host-poll completions.
    pub intervals: Vec<Duration>,
    /// Results buffer contents, copied back after the persistent kernel exited.
    pub snapshots: Vec<u64>,
    pub ticks_emitted: usize,
    pub ticks_forwarded: usize,
    pub kernels_submitted: usize,
    pub states: Vec<HostState>,
}

struct StateTrace(Vec<HostState>);

impl StateTrace {
    fn enter(&mut self, state: HostState) {
        if let Some(prev) = self.0.last() {
            debug!("host: {prev} -> {state}");
        }
        self.0.push(state);
    }
}

/// Select the device, then run the relay on it.
pub async fn run<W: Write>(config: &RunConfig, out: &mut W) -> Result<RunReport, PipesError> {
    writeln!(out, "fmax: {}", config.fmax)?;
    let device = config.selector.select()?;
    run_on(device, config, out).await
}

/// Run the relay on an already selected device.
pub async fn run_on<W: Write>(
    device: Device,
    config: &RunConfig,
    out: &mut W,
) -> Result<RunReport, PipesError> {
    let mut states = StateTrace(vec![HostState::Init]);
    let queue = Queue::new(device);

    let results = queue.malloc_device::<u64>(RESULT_SLOTS)?;
    let (event_tx, event_rx) = pipe("event", PIPE_DEPTH);
    let (timer_tx, timer_rx) = pipe("timer", PIPE_DEPTH);
    let (host_tx, mut host_rx) = pipe("host", PIPE_DEPTH);
    let (counter_tx, counter_rx) = timer_counter();

    states.enter(HostState::LaunchPersistent);
    let persistent = queue.submit(PersistentKernel {
        events: event_rx,
        timer: timer_rx,
        host: host_tx,
        counter: counter_rx,
        results,
    });

    states.enter(HostState::LaunchTimer);
    let spins = spins_for_fmax(config.fmax);
    writeln!(out, "fmax_sec: {spins}")?;
    let timer = queue.submit(TimerKernel {
        counter: counter_tx,
        timer: timer_tx,
        spins,
        ticks: config.ticks,
    });

    states.enter(HostState::PollLoop);
    let mut intervals = Vec::with_capacity(config.ticks);
    let mut start = Instant::now();
    for tick in 0..config.ticks {
        host_rx = queue
            .submit(HostPollKernel { host: host_rx })
            .wait()
            .await?;
        let end = Instant::now();
        let elapsed = end - start;
        writeln!(out, "{tick}: {}", elapsed.as_secs_f64())?;
        intervals.push(elapsed);
        start = end;
    }

    states.enter(HostState::SendShutdown);
    writeln!(out, "Sending shutdown message to persistent kernel")?;
    let shutdown = queue.submit(EventKernel {
        events: event_tx,
        value: EventMessage::Shutdown.to_raw(),
    });

    states.enter(HostState::AwaitPersistentExit);
    writeln!(out, "Waiting for persistent kernel shutdown")?;
    let PersistentReport {
        results,
        snapshots_recorded,
        events_discarded,
        ticks_forwarded,
    } = persistent.wait().await?;
    writeln!(out, "Persistent kernel shutdown")?;
    debug!("{snapshots_recorded} snapshots recorded, {events_discarded} events discarded");
    shutdown.wait().await?;
    let ticks_emitted = timer.wait().await?;

    states.enter(HostState::ReadResults);
    let snapshots = queue.memcpy_to_host(&results);

    states.enter(HostState::Report);
    for value in &snapshots {
        writeln!(out, "{value}")?;
    }
    writeln!(out, "Freeing memory")?;
    drop(results);
    drop(host_rx);
    let device = queue.device();
    debug!(
        "{} bytes of device memory left in {} buffers",
        device.bytes_in_use(),
        device.live_buffers()
    );
    writeln!(out, "Success")?;

    states.enter(HostState::Done);
    info!(
        "Relayed {ticks_forwarded} of {ticks_emitted} ticks through {} kernel launches",
        queue.submitted()
    );
    Ok(RunReport {
        intervals,
        snapshots,
        ticks_emitted,
        ticks_forwarded,
        kernels_submitted: queue.submitted(),
        states: states.0,
    })
}
