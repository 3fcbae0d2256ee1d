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

use crate::device::queue::Kernel;
use crate::error::PipesError;
use crate::pipe::{EventMessage, PipeWriter};
use log::debug;

/// Writes one raw event value into the event pipe and returns the pipe end to the host.
pub struct EventKernel {
    pub events: PipeWriter<EventMessage>,
    pub value: u32,
}

impl Kernel for EventKernel {
    type Output = PipeWriter<EventMessage>;
    const NAME: &'static str = "event";

    fn run(self) -> Result<PipeWriter<EventMessage>, PipesError> {
        let message = EventMessage::from_raw(self.value);
        debug!("Sending event {} ({message:?})", self.value);
        self.events.write(message)?;
        Ok(self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PIPE_DEPTH;
    use crate::device::Device;
    use crate::device::queue::Queue;
    use crate::pipe::pipe;
    use googletest::prelude::*;

    #[gtest]
    #[tokio::test(flavor = "multi_thread")]
    async fn delivers_message_in_order() {
        let queue = Queue::new(Device::emulator());
        let (tx, mut rx) = pipe("event", PIPE_DEPTH);

        let tx = queue
            .submit(EventKernel {
                events: tx,
                value: 2,
            })
            .wait()
            .await
            .unwrap();
        queue
            .submit(EventKernel {
                events: tx,
                value: 0,
            })
            .wait()
            .await
            .unwrap();

        assert_eq!(rx.try_read().unwrap(), Some(EventMessage::Record(2)));
        assert_eq!(rx.try_read().unwrap(), Some(EventMessage::Shutdown));
        expect_true!(rx.try_read().is_err());
    }
}
