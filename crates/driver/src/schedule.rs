//! Frame scheduling.
//!
//! A scheduler hands out [`FrameToken`]s for requested frames and later
//! reports them as due. Cancelling a token only removes it from the queue; a
//! token that was already handed out is still delivered, which is why the
//! driver compares every due token against the one it is waiting for.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use tracing::trace;

/// Identifies one requested frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameToken(u64);

impl FrameToken {
    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait FrameScheduler {
    /// Ask for one frame callback.
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a request. Unknown tokens are ignored.
    fn cancel_frame(&mut self, token: FrameToken);

    /// Tokens whose frame is due now, oldest first.
    fn take_due(&mut self) -> Vec<FrameToken>;

    /// Requests not yet handed out.
    fn pending(&self) -> usize;
}

/// Manually driven queue: every queued request is due on the next
/// [`take_due`](FrameScheduler::take_due).
#[derive(Debug, Default)]
pub struct FrameQueue {
    last: u64,
    queued: VecDeque<FrameToken>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_queued(&self, token: FrameToken) -> bool {
        self.queued.contains(&token)
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&mut self) -> FrameToken {
        self.last += 1;
        let token = FrameToken(self.last);
        self.queued.push_back(token);
        trace!(token = token.0, "frame requested");
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.queued.retain(|t| *t != token);
    }

    fn take_due(&mut self) -> Vec<FrameToken> {
        self.queued.drain(..).collect()
    }

    fn pending(&self) -> usize {
        self.queued.len()
    }
}

/// A [`FrameQueue`] that blocks in `take_due` until the next frame deadline,
/// pacing the loop at a fixed rate.
#[derive(Debug)]
pub struct PacedScheduler {
    queue: FrameQueue,
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl PacedScheduler {
    /// Pace at `fps` frames per second. A non-positive rate disables pacing.
    pub fn new(fps: f64) -> Self {
        let interval = if fps.is_finite() && fps > 0.0 {
            Duration::from_secs_f64(1.0 / fps)
        } else {
            Duration::ZERO
        };
        Self {
            queue: FrameQueue::new(),
            interval,
            next_deadline: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl FrameScheduler for PacedScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.queue.request_frame()
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        self.queue.cancel_frame(token);
    }

    fn take_due(&mut self) -> Vec<FrameToken> {
        if self.queue.pending() == 0 {
            return Vec::new();
        }
        let now = Instant::now();
        let deadline = self.next_deadline.unwrap_or(now);
        if deadline > now {
            thread::sleep(deadline - now);
        }
        // Late frames do not accumulate debt.
        self.next_deadline = Some(deadline.max(now) + self.interval);
        self.queue.take_due()
    }

    fn pending(&self) -> usize {
        self.queue.pending()
    }
}
