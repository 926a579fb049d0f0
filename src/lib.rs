//! OpenFlow wire protocol library for controller-side use
//!
//! This library implements the message layer of an OpenFlow controller:
//! parsing and encoding of protocol messages across versions 1.0
//! through 1.3, and correlation of controller requests with their
//! asynchronous replies.
//!
//! # Quick Start
//!
//! ```rust
//! use ofwire::{FlowModBuilder, FlowModCommand, ProtocolVersion, encode_message, parse_message};
//! use ofwire::PacketReader;
//!
//! // Compose a flow mod and encode it
//! let mut msg = FlowModBuilder::new(ProtocolVersion::V1_3, FlowModCommand::Add)
//!     .priority(100)
//!     .finish()?;
//! ofwire::assign_xid(&mut msg);
//! let bytes = encode_message(&msg)?;
//!
//! // Parse it back off the wire
//! let mut reader = PacketReader::new(bytes);
//! let parsed = parse_message(&mut reader)?.expect("complete message");
//! assert_eq!(parsed.xid(), msg.xid());
//! # Ok::<(), ofwire::Error>(())
//! ```
//!
//! # Layers
//!
//! - [`protocol`] - versioned codec: header, flag and code tables,
//!   sub-structures, per-message parse and encode, builders
//! - [`correlation`] - xid-keyed futures over sent requests, bags and
//!   flow-mod batches
//!
//! Messages in 1.1 and 1.2 layouts are understood by the codec, but
//! only 1.0 and 1.3 are negotiated; see
//! [`SUPPORTED_VERSIONS`](protocol::SUPPORTED_VERSIONS).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod correlation;
pub mod protocol;

pub use correlation::{BagResult, Correlator, FutureBag, FutureResult, MessageBatchFuture, MessageFuture};
pub use protocol::{
    Body, Error, FlowModBuilder, FlowModCommand, Header, Message, MessageType, PacketReader,
    PacketWriter, ProtocolVersion, Result, assign_xid, encode_message, parse_message,
};
