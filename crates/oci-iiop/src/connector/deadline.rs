// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deadline-bounded socket establishment.
//!
//! The socket-open operation runs on its own thread while the caller waits
//! on a condition variable for at most the given budget. Completion and
//! expiry are decided under a single mutex, so exactly one of them wins:
//!
//! ```text
//!   Idle --start()--> Connecting --+-- open() returns first ----> Completed
//!                                  |
//!                                  +-- budget elapses first ----> TimedOut
//! ```
//!
//! A socket produced after `TimedOut` is closed by the worker and never
//! handed out. The OS-level connect itself is not cancelled.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::transport::byte_stream::close_quietly;
use crate::transport::BoxedByteStream;

/// Lifecycle of a [`ConnectDeadline`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeadlineState {
    Idle,
    Connecting,
    Completed,
    TimedOut,
}

struct Slot {
    state: DeadlineState,
    outcome: Option<io::Result<BoxedByteStream>>,
}

struct Shared {
    slot: Mutex<Slot>,
    done: Condvar,
}

/// One-shot race between a socket-open operation and a deadline.
pub struct ConnectDeadline {
    shared: Arc<Shared>,
}

impl ConnectDeadline {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    state: DeadlineState::Idle,
                    outcome: None,
                }),
                done: Condvar::new(),
            }),
        }
    }

    pub fn state(&self) -> DeadlineState {
        self.shared.slot.lock().state
    }

    /// Start `open` on a worker thread.
    ///
    /// Fails if this deadline was already started or the thread cannot be
    /// spawned.
    pub fn start<F>(&self, open: F) -> io::Result<()>
    where
        F: FnOnce() -> io::Result<BoxedByteStream> + Send + 'static,
    {
        {
            let mut slot = self.shared.slot.lock();
            if slot.state != DeadlineState::Idle {
                return Err(io::Error::other("connect deadline already started"));
            }
            slot.state = DeadlineState::Connecting;
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("oci-iiop-connect".into())
            .spawn(move || Self::run_worker(&shared, open));

        if let Err(e) = spawned {
            self.shared.slot.lock().state = DeadlineState::Idle;
            return Err(e);
        }
        Ok(())
    }

    fn run_worker<F>(shared: &Shared, open: F)
    where
        F: FnOnce() -> io::Result<BoxedByteStream>,
    {
        let result = open();

        let mut slot = shared.slot.lock();
        if slot.state == DeadlineState::TimedOut {
            drop(slot);
            match result {
                Ok(stream) => {
                    log::debug!("socket connected after deadline, closing it");
                    close_quietly(stream);
                }
                Err(e) => log::debug!("connect failed after deadline: {}", e),
            }
            return;
        }

        if let Err(e) = &result {
            log::debug!("socket creation error: {}", e);
        }
        slot.state = DeadlineState::Completed;
        slot.outcome = Some(result);
        shared.done.notify_all();
    }

    /// Wait up to `budget` for the worker.
    ///
    /// Returns `Ok(None)` on a deadline miss, otherwise the worker's outcome.
    pub fn wait(&self, budget: Duration) -> io::Result<Option<BoxedByteStream>> {
        let deadline = Instant::now().checked_add(budget);
        let mut slot = self.shared.slot.lock();

        while slot.state == DeadlineState::Connecting {
            let expired = match deadline {
                Some(at) => self.shared.done.wait_until(&mut slot, at).timed_out(),
                None => {
                    self.shared.done.wait(&mut slot);
                    false
                }
            };

            // Completion may have landed right at expiry; re-check under the lock
            if expired && slot.state == DeadlineState::Connecting {
                slot.state = DeadlineState::TimedOut;
                log::debug!("connect deadline of {:?} expired", budget);
                return Ok(None);
            }
        }

        match slot.state {
            DeadlineState::Completed => match slot.outcome.take() {
                Some(outcome) => outcome.map(Some),
                None => Err(io::Error::other("connect outcome already taken")),
            },
            DeadlineState::TimedOut => Ok(None),
            DeadlineState::Idle | DeadlineState::Connecting => {
                Err(io::Error::other("connect deadline not started"))
            }
        }
    }

    /// `start` followed by `wait`.
    pub fn run<F>(&self, open: F, budget: Duration) -> io::Result<Option<BoxedByteStream>>
    where
        F: FnOnce() -> io::Result<BoxedByteStream> + Send + 'static,
    {
        self.start(open)?;
        self.wait(budget)
    }
}

impl Default for ConnectDeadline {
    fn default() -> Self {
        Self::new()
    }
}
