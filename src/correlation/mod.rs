//! Request/reply correlation
//!
//! Outgoing requests are tracked as [`MessageFuture`]s keyed by xid.
//! The [`Correlator`] is the routing table: the connection layer
//! registers a future when it sends a request and feeds received
//! messages back through [`Correlator::satisfy`], which classifies them
//! and completes the matching future.

pub mod bag;
pub mod batch;
pub mod future;

pub use bag::{BagResult, FutureBag};
pub use batch::MessageBatchFuture;
pub use future::{FutureResult, MessageFuture};

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, trace};

use crate::protocol::error::Error;
use crate::protocol::header::MessageType;
use crate::protocol::message::{Body, Message};

/// Routes replies to the futures of their requests, by xid.
#[derive(Debug, Default)]
pub struct Correlator {
    pending: Mutex<HashMap<u32, MessageFuture>>,
}

impl Correlator {
    /// An empty correlator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a future. Returns false (and drops nothing) if another
    /// future already waits on the same xid.
    pub fn register(&self, future: MessageFuture) -> bool {
        let mut pending = self.lock();
        match pending.entry(future.xid()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(e) => {
                trace!(xid = future.xid(), "future registered");
                e.insert(future);
                true
            }
        }
    }

    /// Number of requests still awaiting replies.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().len()
    }

    /// Route a received message to its future, completing and removing
    /// it. Returns the future, or `None` if no request waits on the
    /// message's xid (asynchronous switch messages land here).
    ///
    /// Error messages complete the future as an error reply; multipart
    /// replies with REPLY_MORE set leave the future registered until
    /// the final part arrives.
    pub fn satisfy(&self, reply: Message) -> Option<MessageFuture> {
        let xid = reply.xid();
        if let Body::MultipartReply(mp) = &reply.body {
            if mp.has_more() {
                // intermediate part; the caller accumulates, the future
                // resolves on the last part
                return None;
            }
        }
        let future = self.lock().remove(&xid)?;
        if reply.message_type() == MessageType::Error {
            debug!(xid, "request answered with an error");
            future.set_error_reply(reply);
        } else {
            future.set_success(reply);
        }
        Some(future)
    }

    /// Fail every pending future, for connection teardown. Returns how
    /// many were failed.
    pub fn fail_all(&self, what: &'static str) -> usize {
        let drained: Vec<MessageFuture> = {
            let mut pending = self.lock();
            pending.drain().map(|(_, f)| f).collect()
        };
        let n = drained.len();
        for f in &drained {
            f.fail(Error::IncompleteMessage { what });
        }
        if n > 0 {
            debug!(count = n, "pending futures failed");
        }
        n
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<u32, MessageFuture>> {
        self.pending.lock().expect("correlator lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::builder::{EchoBuilder, ErrorBuilder};
    use crate::protocol::codes::ErrorType;
    use crate::protocol::factory::assign_xid;
    use crate::protocol::version::ProtocolVersion::V1_3;

    fn tracked(correlator: &Correlator) -> MessageFuture {
        let mut req = EchoBuilder::request(V1_3).finish().unwrap();
        assign_xid(&mut req);
        let f = MessageFuture::new(req);
        assert!(correlator.register(f.clone()));
        f
    }

    #[test]
    fn test_reply_routed_by_xid() {
        let correlator = Correlator::new();
        let f = tracked(&correlator);
        let mut reply = EchoBuilder::reply(V1_3).finish().unwrap();
        reply.header.xid = f.xid();
        assert!(correlator.satisfy(reply).is_some());
        assert!(matches!(f.result(), Some(FutureResult::Success(_))));
        assert_eq!(correlator.pending_count(), 0);
    }

    #[test]
    fn test_error_completes_as_error_reply() {
        let correlator = Correlator::new();
        let f = tracked(&correlator);
        let mut err = ErrorBuilder::new(V1_3, ErrorType::BadRequest, 1).finish().unwrap();
        err.header.xid = f.xid();
        correlator.satisfy(err);
        assert!(matches!(f.result(), Some(FutureResult::ErrorReply(_))));
    }

    #[test]
    fn test_unmatched_message_ignored() {
        let correlator = Correlator::new();
        let _f = tracked(&correlator);
        let mut stray = EchoBuilder::reply(V1_3).finish().unwrap();
        stray.header.xid = 0xdead_beef;
        assert!(correlator.satisfy(stray).is_none());
        assert_eq!(correlator.pending_count(), 1);
    }

    #[test]
    fn test_duplicate_xid_refused() {
        let correlator = Correlator::new();
        let f = tracked(&correlator);
        let dup = MessageFuture::new(f.request().clone());
        assert!(!correlator.register(dup));
    }

    #[test]
    fn test_fail_all_on_teardown() {
        let correlator = Correlator::new();
        let a = tracked(&correlator);
        let b = tracked(&correlator);
        assert_eq!(correlator.fail_all("connection closed"), 2);
        assert!(matches!(a.result(), Some(FutureResult::Failed(_))));
        assert!(matches!(b.result(), Some(FutureResult::Failed(_))));
        assert_eq!(correlator.pending_count(), 0);
    }
}
