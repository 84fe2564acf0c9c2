// SPDX-License-Identifier: GPL-3.0-or-later
// src/domain/resizer/scheduler.rs
//
// Pending redraw requests, drained once per animation frame.

use std::collections::VecDeque;

/// One scheduled redraw-then-notify request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub seq: u64,
}

/// FIFO of redraw requests.
///
/// Requests are not coalesced: every region update gets its own frame.
#[derive(Debug, Default)]
pub struct FrameQueue {
    pending: VecDeque<FrameRequest>,
    next_seq: u64,
}

impl FrameQueue {
    pub fn schedule(&mut self) -> FrameRequest {
        let request = FrameRequest { seq: self.next_seq };
        self.next_seq += 1;
        self.pending.push_back(request);
        request
    }

    /// Take everything queued so far. Requests scheduled afterwards wait for
    /// the next frame.
    pub fn take_due(&mut self) -> Vec<FrameRequest> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
