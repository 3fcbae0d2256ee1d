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

//! pipes - persistent, timer and host-poll kernels relaying through FPGA pipes.
//!
//! The program launches a persistent kernel and a timer kernel on the selected accelerator,
//! then times ten host round trips through the pipes connecting them:
//! - the timer kernel ticks ten times, busy-waiting `fmax * 1000000` spins per tick
//! - the persistent kernel forwards each tick to the host and records timer snapshots
//! - the host launches one host-poll kernel per tick and prints the time between them
//!
//! Once all ticks arrived the host sends the shutdown event, waits for the persistent kernel
//! to exit and prints the snapshots it recorded. See the [`host`] module for the sequence and
//! [`kernels`] for what each kernel does.
//!
//! # Exit status
//!
//! - `0` after a complete run, ending in `Success`
//! - `1` for `-h`/`--help`
//! - `2` if the frequency multiplier could not be parsed
//! - abort if the device or a kernel fails
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`, `error`
//!   or `off`). Defaults to `info`. Logs go to stderr, progress goes to stdout.
//!
//! # Examples
//!
//! ```bash
//! # Run on the emulator with the default multiplier of 100
//! pipes
//!
//! # Shorter ticks, with kernel lifecycle logging
//! RUST_LOG=debug pipes 10
//! ```

use clap::Parser;
use log::{debug, error, info};
use std::time::Duration;

mod cli;
mod config;
mod counter;
mod device;
mod error;
mod host;
mod kernels;
mod pipe;
mod system_io;

use crate::cli::{Cli, USAGE, help_requested};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if help_requested(std::env::args_os()) {
        usage();
    }
    let cli = Cli::parse();
    debug!("parsed cli command with {cli:?}");

    if cli.help {
        usage();
    }

    let config = cli.run_config();
    match host::run(&config, &mut std::io::stdout()).await {
        Ok(report) => {
            let total: Duration = report.intervals.iter().sum();
            info!(
                "{} of {} ticks relayed in {total:?} using {} kernel launches; {} snapshots read back",
                report.ticks_forwarded,
                report.ticks_emitted,
                report.kernels_submitted,
                report.snapshots.len()
            );
            debug!("host states: {:?}", report.states);
        }
        Err(e) => {
            error!("{e}");
            println!("Caught a device runtime exception:\n{e}");
            if e.is_device_not_found() {
                println!(
                    "If you are targeting an FPGA, please ensure that your system has a correctly configured FPGA board."
                );
                println!("If you are targeting the FPGA emulator, run with --device emulator.");
            }
            std::process::abort();
        }
    }
}

fn usage() -> ! {
    print!("{USAGE}");
    std::process::exit(1);
}
