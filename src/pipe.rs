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

//! Fixed-depth, typed, unidirectional pipes connecting two kernel contexts.
//!
//! A pipe is created as a ([`PipeWriter`], [`PipeReader`]) pair. Neither end is `Clone`, so a
//! pipe always has exactly one producer and one consumer. Ownership of an end moves into the
//! kernel that uses it, and a kernel that is launched repeatedly (like the host-poll kernel)
//! hands its end back when it completes.
//!
//! Reads come in two flavours which kernels must not mix up:
//! - [`PipeReader::try_read`] never blocks, for kernels that poll several pipes in a loop.
//! - [`PipeReader::read`] blocks until a value arrives, for kernels that exist only to wait.
//!
//! Blocking operations park the calling thread, so they may only be used from a kernel
//! context (a blocking task), never from inside the async host loop.

use crate::error::PipesError;
use log::trace;
use tokio::sync::mpsc::{self, error::TryRecvError};

/// Payload-free notification that one timer interval elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerTick;

/// Payload-free notification relayed to the host once per timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostTick;

/// Message carried by the event pipe into the persistent kernel.
///
/// On the wire the event is a single integer where 0 is the shutdown sentinel and any other
/// value names a results slot. Slot 0 is not addressable by `Record`; the persistent kernel
/// stores its final timer snapshot there when it shuts down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventMessage {
    Shutdown,
    Record(usize),
}

impl EventMessage {
    pub fn from_raw(raw: u32) -> EventMessage {
        match raw {
            0 => EventMessage::Shutdown,
            slot => EventMessage::Record(slot as usize),
        }
    }

    pub fn to_raw(self) -> u32 {
        match self {
            EventMessage::Shutdown => 0,
            EventMessage::Record(slot) => slot as u32,
        }
    }
}

/// Create a pipe of the given depth. `name` shows up in logs and in `PipeClosed` errors.
pub fn pipe<T>(name: &'static str, depth: usize) -> (PipeWriter<T>, PipeReader<T>) {
    let (tx, rx) = mpsc::channel(depth);
    (PipeWriter { name, tx }, PipeReader { name, rx })
}

#[derive(Debug)]
pub struct PipeWriter<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
}

impl<T> PipeWriter<T> {
    /// Blocking write; waits while the pipe is full.
    ///
    /// # Returns: `Result<(), PipesError>`
    /// * `Ok(())` - The value is queued
    /// * `Err(PipesError::PipeClosed)` - The reader was dropped
    pub fn write(&self, value: T) -> Result<(), PipesError> {
        trace!("write to {} pipe", self.name);
        self.tx
            .blocking_send(value)
            .map_err(|_| PipesError::PipeClosed { pipe: self.name })
    }

    /// Non-blocking write.
    ///
    /// # Returns: `Result<bool, PipesError>`
    /// * `Ok(true)` - The value is queued
    /// * `Ok(false)` - The pipe is full and the value was dropped
    /// * `Err(PipesError::PipeClosed)` - The reader was dropped
    #[cfg(test)]
    pub fn try_write(&self, value: T) -> Result<bool, PipesError> {
        match self.tx.try_send(value) {
            Ok(()) => Ok(true),
            Err(mpsc::error::TrySendError::Full(_)) => Ok(false),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(PipesError::PipeClosed { pipe: self.name }),
        }
    }
}

#[derive(Debug)]
pub struct PipeReader<T> {
    name: &'static str,
    rx: mpsc::Receiver<T>,
}

impl<T> PipeReader<T> {
    /// Non-blocking read.
    ///
    /// Values written before the writer was dropped are still delivered; `PipeClosed` is only
    /// reported once the pipe is both empty and writer-less.
    ///
    /// # Returns: `Result<Option<T>, PipesError>`
    /// * `Ok(Some(T))` - A value was waiting
    /// * `Ok(None)` - The pipe is empty
    /// * `Err(PipesError::PipeClosed)` - The pipe is empty and the writer was dropped
    pub fn try_read(&mut self) -> Result<Option<T>, PipesError> {
        match self.rx.try_recv() {
            Ok(value) => {
                trace!("read from {} pipe", self.name);
                Ok(Some(value))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(PipesError::PipeClosed { pipe: self.name }),
        }
    }

    /// Blocking read; waits until a value arrives.
    ///
    /// # Returns: `Result<T, PipesError>`
    /// * `Ok(T)` - The next value
    /// * `Err(PipesError::PipeClosed)` - The writer was dropped and nothing is left to read
    pub fn read(&mut self) -> Result<T, PipesError> {
        let value = self
            .rx
            .blocking_recv()
            .ok_or(PipesError::PipeClosed { pipe: self.name })?;
        trace!("read from {} pipe", self.name);
        Ok(value)
    }
}
