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

use crate::config::DEFAULT_FMAX;
use crate::device::DeviceSelector;
use crate::host::RunConfig;
use clap::{ArgAction, Parser};
use std::ffi::OsStr;

/// Printed for `-h`/`--help`, which exits with status 1.
pub const USAGE: &str = "Usage: \npipes [--device <emulator|fpga>] [fmax]\n\nFAILED\n";

#[derive(Parser, Debug)]
#[command(name = "pipes")]
#[command(bin_name = "pipes")]
#[command(disable_help_flag = true)]
pub struct Cli {
    #[arg(short = 'h', long = "help", action = ArgAction::SetTrue)]
    pub help: bool,
    #[arg(
        long = "device",
        value_enum,
        default_value_t = DeviceSelector::default(),
        help = "accelerator to run the kernels on"
    )]
    pub device: DeviceSelector,
    #[arg(
        value_parser = parse_fmax,
        allow_negative_numbers = true,
        help = r#"frequency multiplier; each timer tick busy-waits fmax * 1000000 spins.
Defaults to 100."#
    )]
    pub fmax: Option<f64>,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig::new(self.fmax.unwrap_or(DEFAULT_FMAX), self.device)
    }
}

/// Whether the first argument after the program name is `-h` or `--help`.
///
/// Checked before parsing, so that a help request is honoured even when the arguments
/// following it would not parse.
pub fn help_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .nth(1)
        .is_some_and(|arg| arg.as_ref() == "-h" || arg.as_ref() == "--help")
}

fn parse_fmax(arg: &str) -> Result<f64, String> {
    let fmax: f64 = arg
        .parse()
        .map_err(|e| format!("'{arg}' is not a frequency multiplier: {e}"))?;
    if !fmax.is_finite() || fmax < 0.0 {
        return Err(format!(
            "'{arg}' is not a frequency multiplier: must be finite and non-negative"
        ));
    }
    Ok(fmax)
}
