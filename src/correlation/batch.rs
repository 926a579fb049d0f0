//! Flow-mod batches confirmed by a barrier
//!
//! Flow mods get no reply on success, so a batch is confirmed by
//! sending a barrier request after them: when the barrier reply
//! arrives, every flow mod the switch did not complain about is known
//! to have been processed. [`MessageBatchFuture`] holds one future per
//! flow mod plus the synthesized barrier future, and reconciles the
//! members once the barrier resolves.

use super::bag::{BagResult, FutureBag};
use super::future::{FutureResult, MessageFuture};
use crate::protocol::builder::header_only;
use crate::protocol::error::{Error, Result};
use crate::protocol::factory::assign_xid;
use crate::protocol::header::MessageType;
use crate::protocol::message::Message;
use std::time::Duration;

/// Futures for a batch of flow mods and its confirming barrier.
#[derive(Debug)]
pub struct MessageBatchFuture {
    flow_futures: Vec<MessageFuture>,
    barrier: MessageFuture,
}

impl MessageBatchFuture {
    /// Build a batch from flow mods. Each is stamped with a fresh xid,
    /// and a barrier request in the same version is synthesized after
    /// them.
    pub fn new(mut flow_mods: Vec<Message>) -> Result<Self> {
        let Some(first) = flow_mods.first() else {
            return Err(Error::IncompleteMessage { what: "empty batch" });
        };
        let pv = first.version();
        for m in &flow_mods {
            if m.message_type() != MessageType::FlowMod {
                return Err(Error::IncompleteMessage { what: "batch member not a flow mod" });
            }
            if m.version() != pv {
                return Err(Error::VersionMismatch { what: "batch", version: m.version() });
            }
        }
        for m in &mut flow_mods {
            assign_xid(m);
        }
        let mut barrier_req = header_only(pv, MessageType::BarrierRequest)?;
        assign_xid(&mut barrier_req);

        Ok(Self {
            flow_futures: flow_mods.into_iter().map(MessageFuture::new).collect(),
            barrier: MessageFuture::new(barrier_req),
        })
    }

    /// The messages to send, flow mods first, barrier last.
    #[must_use]
    pub fn requests(&self) -> Vec<Message> {
        let mut out: Vec<Message> =
            self.flow_futures.iter().map(|f| f.request().clone()).collect();
        out.push(self.barrier.request().clone());
        out
    }

    /// The per-flow-mod futures.
    #[must_use]
    pub fn flow_futures(&self) -> &[MessageFuture] {
        &self.flow_futures
    }

    /// The synthesized barrier future.
    #[must_use]
    pub fn barrier_future(&self) -> &MessageFuture {
        &self.barrier
    }

    /// Settle the member futures against the barrier outcome: on a
    /// successful barrier, members the switch did not complain about
    /// completed without a reply; on a failed barrier, still-open
    /// members cannot be confirmed and are failed.
    pub fn reconcile(&self) {
        match self.barrier.result() {
            Some(r) if r.is_success() => {
                for f in &self.flow_futures {
                    f.set_success_no_reply();
                }
            }
            Some(_) => {
                for f in &self.flow_futures {
                    f.fail(Error::IncompleteMessage { what: "barrier did not complete" });
                }
            }
            None => {}
        }
    }

    /// Members that ended in an error reply or local failure.
    #[must_use]
    pub fn failed_futures(&self) -> Vec<MessageFuture> {
        self.flow_futures
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

    /// Wait for the barrier, reconcile, and aggregate over the flow-mod
    /// futures.
    pub fn wait(&self) -> BagResult {
        self.barrier.wait();
        self.reconcile();
        self.aggregate()
    }

    /// Timed variant of [`wait`](Self::wait). A barrier timeout leaves
    /// the members open and reports [`BagResult::TimedOut`].
    pub fn wait_for(&self, timeout: Duration) -> BagResult {
        if matches!(self.barrier.wait_for(timeout), FutureResult::TimedOut) {
            return BagResult::TimedOut;
        }
        self.reconcile();
        self.aggregate()
    }

    fn aggregate(&self) -> BagResult {
        let bag = FutureBag::new();
        for f in &self.flow_futures {
            bag.add(f.clone());
        }
        bag.wait()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder::FlowModBuilder;
    use crate::protocol::codes::FlowModCommand;
    use crate::protocol::version::ProtocolVersion::V1_3;

    fn flow_mods(n: usize) -> Vec<Message> {
        (0..n)
            .map(|_| FlowModBuilder::new(V1_3, FlowModCommand::Add).finish().unwrap())
            .collect()
    }

    #[test]
    fn test_batch_synthesizes_barrier() {
        let batch = MessageBatchFuture::new(flow_mods(3)).unwrap();
        let requests = batch.requests();
        assert_eq!(requests.len(), 4);
        assert_eq!(requests[3].message_type(), MessageType::BarrierRequest);
        // every request carries a distinct xid
        let mut xids: Vec<u32> = requests.iter().map(Message::xid).collect();
        xids.sort_unstable();
        xids.dedup();
        assert_eq!(xids.len(), 4);
    }

    #[test]
    fn test_barrier_confirms_silent_members() {
        let batch = MessageBatchFuture::new(flow_mods(2)).unwrap();
        batch.barrier_future().set_success_no_reply();
        assert_eq!(batch.wait(), BagResult::Success);
        assert!(batch.flow_futures().iter().all(MessageFuture::is_satisfied));
        assert!(batch.failed_futures().is_empty());
    }

    #[test]
    fn test_error_reply_member_survives_reconcile() {
        let batch = MessageBatchFuture::new(flow_mods(2)).unwrap();
        let err_reply = crate::protocol::builder::EchoBuilder::reply(V1_3).finish().unwrap();
        batch.flow_futures()[0].set_error_reply(err_reply);
        batch.barrier_future().set_success_no_reply();
        assert_eq!(batch.wait(), BagResult::SuccessWithExceptions);
        assert_eq!(batch.failed_futures().len(), 1);
    }

    #[test]
    fn test_barrier_timeout_leaves_members_open() {
        let batch = MessageBatchFuture::new(flow_mods(1)).unwrap();
        assert_eq!(batch.wait_for(Duration::from_millis(10)), BagResult::TimedOut);
        assert!(!batch.flow_futures()[0].is_satisfied());
    }

    #[test]
    fn test_rejects_non_flow_mods() {
        let echo = crate::protocol::builder::EchoBuilder::request(V1_3).finish().unwrap();
        assert!(MessageBatchFuture::new(vec![echo]).is_err());
        assert!(MessageBatchFuture::new(Vec::new()).is_err());
    }
}
