//! Aggregating over sets of futures
//!
//! A [`FutureBag`] collects the futures of a related group of requests
//! and waits on them as one. The first wait seals the bag; futures can
//! no longer be added, so the aggregate verdict is computed over a
//! fixed membership.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use super::future::{FutureResult, MessageFuture};

/// The aggregate verdict over a bag of futures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagResult {
    /// Every member succeeded.
    Success,
    /// At least one member succeeded and at least one did not.
    SuccessWithExceptions,
    /// No member succeeded and at least one failed locally.
    Exception,
    /// No member succeeded; the switch answered only with errors.
    ErrorReply,
    /// At least one member was still unsatisfied when the time budget
    /// ran out.
    TimedOut,
}

/// A sealable collection of [`MessageFuture`]s with an aggregate wait.
#[derive(Debug, Default)]
pub struct FutureBag {
    futures: Mutex<Vec<MessageFuture>>,
    sealed: AtomicBool,
}

impl FutureBag {
    /// An empty, open bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a future. Returns false if the bag is sealed.
    pub fn add(&self, future: MessageFuture) -> bool {
        if self.sealed.load(Ordering::Acquire) {
            return false;
        }
        self.lock().push(future);
        true
    }

    /// Number of member futures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if the bag holds no futures.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True once a wait has sealed the bag.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Snapshot of the member futures.
    #[must_use]
    pub fn futures(&self) -> Vec<MessageFuture> {
        self.lock().clone()
    }

    /// Members that ended in an error reply or local failure.
    #[must_use]
    pub fn failed_futures(&self) -> Vec<MessageFuture> {
        self.lock()
            .iter()
            .filter(|f| {
                matches!(
                    f.result(),
                    Some(FutureResult::ErrorReply(_) | FutureResult::Failed(_))
                )
            })
            .cloned()
            .collect()
    }

    /// Seal the bag and wait for every member in turn, without a time
    /// limit.
    pub fn wait(&self) -> BagResult {
        self.sealed.store(true, Ordering::Release);
        let futures = self.futures();
        let results: Vec<FutureResult> = futures.iter().map(MessageFuture::wait).collect();
        aggregate(&results)
    }

    /// Seal the bag and wait for every member within one shared time
    /// budget. Members are waited on sequentially; each gets whatever
    /// remains of the budget.
    pub fn wait_for(&self, timeout: Duration) -> BagResult {
        self.sealed.store(true, Ordering::Release);
        let deadline = Instant::now() + timeout;
        let futures = self.futures();
        let mut results = Vec::with_capacity(futures.len());
        for f in &futures {
            // an exhausted budget still polls the member; one already
            // satisfied hands back its result instead of a timeout
            let remaining = deadline.saturating_duration_since(Instant::now());
            results.push(f.wait_for(remaining));
        }
        aggregate(&results)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MessageFuture>> {
        self.futures.lock().expect("future bag lock poisoned")
    }
}

// Any timeout trumps everything: the verdict would be speculative with
// members still in flight. Otherwise a success prefix applies iff at
// least one member succeeded, and with no successes a local failure
// outranks an error reply.
fn aggregate(results: &[FutureResult]) -> BagResult {
    let mut successes = 0usize;
    let mut failures = 0usize;
    let mut error_replies = 0usize;
    for r in results {
        match r {
            FutureResult::TimedOut => return BagResult::TimedOut,
            FutureResult::Success(_) | FutureResult::SuccessNoReply => successes += 1,
            FutureResult::Failed(_) => failures += 1,
            FutureResult::ErrorReply(_) => error_replies += 1,
        }
    }
    if failures == 0 && error_replies == 0 {
        BagResult::Success
    } else if successes > 0 {
        BagResult::SuccessWithExceptions
    } else if failures > 0 {
        BagResult::Exception
    } else {
        BagResult::ErrorReply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder::EchoBuilder;
    use crate::protocol::error::Error;
    use crate::protocol::factory::assign_xid;
    use crate::protocol::version::ProtocolVersion::V1_3;

    fn future() -> MessageFuture {
        let mut m = EchoBuilder::request(V1_3).finish().unwrap();
        assign_xid(&mut m);
        MessageFuture::new(m)
    }

    #[test]
    fn test_all_success() {
        let bag = FutureBag::new();
        for _ in 0..3 {
            let f = future();
            f.set_success_no_reply();
            assert!(bag.add(f));
        }
        assert_eq!(bag.wait(), BagResult::Success);
        assert!(bag.is_sealed());
        // sealed bags refuse new members
        assert!(!bag.add(future()));
    }

    #[test]
    fn test_mixed_results_keep_success_prefix() {
        let bag = FutureBag::new();
        let ok = future();
        ok.set_success_no_reply();
        let err = future();
        err.set_error_reply(EchoBuilder::reply(V1_3).finish().unwrap());
        let failed = future();
        failed.fail(Error::IncompleteMessage { what: "lost" });
        bag.add(ok);
        bag.add(err);
        bag.add(failed);
        assert_eq!(bag.wait(), BagResult::SuccessWithExceptions);
        assert_eq!(bag.failed_futures().len(), 2);
    }

    #[test]
    fn test_exception_outranks_error_reply() {
        let bag = FutureBag::new();
        let err = future();
        err.set_error_reply(EchoBuilder::reply(V1_3).finish().unwrap());
        let failed = future();
        failed.fail(Error::IncompleteMessage { what: "lost" });
        bag.add(err);
        bag.add(failed);
        assert_eq!(bag.wait(), BagResult::Exception);

        let bag = FutureBag::new();
        let err = future();
        err.set_error_reply(EchoBuilder::reply(V1_3).finish().unwrap());
        bag.add(err);
        assert_eq!(bag.wait(), BagResult::ErrorReply);
    }

    #[test]
    fn test_any_timeout_wins() {
        let bag = FutureBag::new();
        let ok = future();
        ok.set_success_no_reply();
        bag.add(ok);
        bag.add(future()); // never satisfied
        assert_eq!(bag.wait_for(Duration::from_millis(10)), BagResult::TimedOut);
    }

    #[test]
    fn test_exhausted_budget_still_reads_satisfied_members() {
        let bag = FutureBag::new();
        for _ in 0..2 {
            let f = future();
            f.set_success_no_reply();
            bag.add(f);
        }
        assert_eq!(bag.wait_for(Duration::ZERO), BagResult::Success);
    }

    #[test]
    fn test_empty_bag_is_success() {
        let bag = FutureBag::new();
        assert_eq!(bag.wait(), BagResult::Success);
    }
}
