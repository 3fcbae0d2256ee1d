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

use googletest::prelude::*;
use rstest::*;
use std::process::{Command, Output};

fn pipes(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pipes"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .unwrap_or_else(|e| panic!("pipes: failed to execute with {args:?}: {e}"))
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[gtest]
#[rstest]
#[case::short(&["-h"])]
#[case::long(&["--help"])]
#[case::before_bad_fmax(&["--help", "fast"])]
#[case::after_fmax(&["20", "-h"])]
fn help_prints_usage_and_exits_1(#[case] args: &[&str]) {
    let output = pipes(args);
    assert_eq!(output.status.code(), Some(1));
    let stdout = stdout_of(&output);
    expect_that!(stdout.as_str(), starts_with("Usage: \n"));
    expect_that!(stdout.as_str(), contains_substring("FAILED"));
    // nothing was launched
    expect_that!(stdout.as_str(), not(contains_substring("fmax:")));
}

#[gtest]
#[rstest]
#[case::word("fast")]
#[case::negative("-1")]
fn bad_fmax_does_not_succeed(#[case] arg: &str) {
    let output = pipes(&[arg]);
    expect_false!(output.status.success());
    expect_that!(
        String::from_utf8_lossy(&output.stderr).into_owned(),
        contains_substring(arg)
    );
    expect_that!(stdout_of(&output), not(contains_substring("Success")));
}

#[gtest]
fn emulator_run_reports_snapshots_and_succeeds() {
    let output = pipes(&["--device", "emulator", "0.001"]);
    assert!(output.status.success(), "run failed: {output:?}");

    let stdout = stdout_of(&output);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.first(), Some(&"fmax: 0.001"));
    assert_eq!(lines.last(), Some(&"Success"));

    let timing: Vec<&str> = lines
        .iter()
        .filter_map(|l| l.split_once(": ").map(|(index, _)| index))
        .filter(|index| index.chars().all(|c| c.is_ascii_digit()))
        .collect();
    let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    assert_eq!(timing, expected);

    let shutdown = lines
        .iter()
        .position(|l| *l == "Persistent kernel shutdown")
        .expect("no shutdown line");
    let snapshots = &lines[shutdown + 1..shutdown + 9];
    // final timer value, stored when the persistent kernel shuts down
    assert_eq!(snapshots[0], "10");
    for value in snapshots {
        assert!(value.parse::<u64>().is_ok(), "not a snapshot: {value}");
    }
    assert_eq!(lines[shutdown + 9], "Freeing memory");
}

#[gtest]
fn missing_board_aborts() {
    let output = pipes(&["--device", "fpga", "1"]);
    expect_false!(output.status.success());
    // abort, not a regular exit
    assert_eq!(output.status.code(), None);
    let stdout = stdout_of(&output);
    expect_that!(
        stdout.as_str(),
        contains_substring("Caught a device runtime exception")
    );
    expect_that!(stdout.as_str(), not(contains_substring("Success")));
}
