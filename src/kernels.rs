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

//! The kernels making up the relay.
//!
//! ```text
//!                 event pipe                    host pipe
//!  EventKernel ──────────────► PersistentKernel ──────────► HostPollKernel (x10)
//!                                   ▲     │
//!                    timer pipe     │     │ snapshots
//!  TimerKernel ─────────────────────┘     ▼
//!       │                            results buffer
//!       └── timer counter ──► (read by PersistentKernel)
//! ```
//!
//! - [`persistent::PersistentKernel`] runs for the whole program and only ever polls.
//! - [`timer::TimerKernel`] emits a fixed number of ticks and exits.
//! - [`host_poll::HostPollKernel`] blocks for one host tick per launch.
//! - [`event::EventKernel`] writes one event message.

pub mod event;
pub mod host_poll;
pub mod persistent;
pub mod timer;
