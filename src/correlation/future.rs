//! One-shot message futures
//!
//! A [`MessageFuture`] stands for an in-flight request awaiting its
//! reply. It is satisfied exactly once; later attempts are refused and
//! reported to the caller by the `bool` return. Waiting is
//! uninterruptible: [`MessageFuture::wait`] blocks until satisfaction,
//! and the timed variant reports a timeout without disturbing the
//! future, which may still be satisfied later.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::trace;

use crate::protocol::error::Error;
use crate::protocol::message::Message;

/// How a future was (or was not yet) satisfied.
#[derive(Debug, Clone)]
pub enum FutureResult {
    /// The reply arrived.
    Success(Message),
    /// The request completed without a reply message, as flow mods do
    /// once a barrier confirms them.
    SuccessNoReply,
    /// The switch answered with an error message.
    ErrorReply(Message),
    /// A local failure ended the request.
    Failed(Arc<Error>),
    /// A timed wait expired. Never stored; the future stays
    /// unsatisfied and may complete later.
    TimedOut,
}

impl FutureResult {
    /// True for the two success outcomes.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_) | Self::SuccessNoReply)
    }
}

enum State {
    Unsatisfied,
    Satisfied(FutureResult),
}

struct Inner {
    request: Message,
    state: Mutex<State>,
    cond: Condvar,
}

/// A future for the reply to a sent request. Cloning yields another
/// handle to the same future.
#[derive(Clone)]
pub struct MessageFuture {
    inner: Arc<Inner>,
}

impl MessageFuture {
    /// A future for the given request.
    #[must_use]
    pub fn new(request: Message) -> Self {
        Self {
            inner: Arc::new(Inner {
                request,
                state: Mutex::new(State::Unsatisfied),
                cond: Condvar::new(),
            }),
        }
    }

    /// The request this future waits on.
    #[must_use]
    pub fn request(&self) -> &Message {
        &self.inner.request
    }

    /// The request's transaction id, the correlation key.
    #[must_use]
    pub fn xid(&self) -> u32 {
        self.inner.request.xid()
    }

    /// True once the future has been satisfied.
    #[must_use]
    pub fn is_satisfied(&self) -> bool {
        matches!(*self.lock(), State::Satisfied(_))
    }

    /// The result, if the future is already satisfied.
    #[must_use]
    pub fn result(&self) -> Option<FutureResult> {
        match &*self.lock() {
            State::Satisfied(r) => Some(r.clone()),
            State::Unsatisfied => None,
        }
    }

    /// Satisfy with a reply. Returns false if already satisfied.
    pub fn set_success(&self, reply: Message) -> bool {
        self.satisfy(FutureResult::Success(reply))
    }

    /// Satisfy without a reply message. Returns false if already
    /// satisfied.
    pub fn set_success_no_reply(&self) -> bool {
        self.satisfy(FutureResult::SuccessNoReply)
    }

    /// Satisfy with an error message from the switch. Returns false if
    /// already satisfied.
    pub fn set_error_reply(&self, error: Message) -> bool {
        self.satisfy(FutureResult::ErrorReply(error))
    }

    /// Satisfy with a local failure. Returns false if already
    /// satisfied.
    pub fn fail(&self, err: Error) -> bool {
        self.satisfy(FutureResult::Failed(Arc::new(err)))
    }

    fn satisfy(&self, result: FutureResult) -> bool {
        let mut state = self.lock();
        match *state {
            State::Satisfied(_) => false,
            State::Unsatisfied => {
                trace!(xid = self.xid(), "future satisfied");
                *state = State::Satisfied(result);
                self.inner.cond.notify_all();
                true
            }
        }
    }

    /// Block until the future is satisfied.
    pub fn wait(&self) -> FutureResult {
        let mut state = self.lock();
        loop {
            if let State::Satisfied(r) = &*state {
                return r.clone();
            }
            state = self
                .inner
                .cond
                .wait(state)
                .expect("future state lock poisoned");
        }
    }

    /// Block until the future is satisfied or the timeout elapses. On
    /// timeout the future is left unsatisfied and
    /// [`FutureResult::TimedOut`] is returned.
    pub fn wait_for(&self, timeout: Duration) -> FutureResult {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        loop {
            if let State::Satisfied(r) = &*state {
                return r.clone();
            }
            let now = Instant::now();
            if now >= deadline {
                return FutureResult::TimedOut;
            }
            let (guard, _timed_out) = self
                .inner
                .cond
                .wait_timeout(state, deadline - now)
                .expect("future state lock poisoned");
            state = guard;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.inner.state.lock().expect("future state lock poisoned")
    }
}

impl std::fmt::Debug for MessageFuture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageFuture")
            .field("xid", &self.xid())
            .field("satisfied", &self.is_satisfied())
            .finish()
    }
}
