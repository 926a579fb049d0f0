//! Protocol error types

use thiserror::Error;

use super::version::ProtocolVersion;

/// Errors raised while decoding, encoding, or constructing OpenFlow
/// messages and structures.
#[derive(Error, Debug)]
pub enum Error {
    /// A wire value (type code, reason, command, ...) that no known
    /// constant maps to for the given version.
    #[error("unrecognized {what} code {code:#x} (version {version})")]
    UnknownCode {
        /// What was being decoded
        what: &'static str,
        /// The offending wire value
        code: u32,
        /// Active protocol version
        version: ProtocolVersion,
    },

    /// A field, flag, or message type that exists in the protocol but is
    /// not defined for the active version.
    #[error("{what} is not applicable to version {version}")]
    VersionMismatch {
        /// What was version-gated
        what: &'static str,
        /// Active protocol version
        version: ProtocolVersion,
    },

    /// The declared version is not in the supported set at all. Kept
    /// distinct so connection negotiation can branch on it; hello and
    /// error messages are exempt from this gate.
    #[error("protocol version {version} is not supported")]
    VersionNotSupported {
        /// The unsupported version
        version: ProtocolVersion,
    },

    /// A version byte that maps to no known protocol version.
    #[error("unknown protocol version byte {byte:#x}")]
    UnknownVersion {
        /// The offending wire byte
        byte: u8,
    },

    /// Reserved / undefined bits were set in a bitmap while strict
    /// parsing is in effect.
    #[error("undefined bits {bits:#x} set in {what} bitmap (version {version})")]
    BadBits {
        /// Which bitmap
        what: &'static str,
        /// The undefined bits that were set
        bits: u32,
        /// Active protocol version
        version: ProtocolVersion,
    },

    /// Mutually exclusive flags were combined in one set.
    #[error("conflicting {what} flags in one set")]
    ConflictingFlags {
        /// Which flag family
        what: &'static str,
    },

    /// Fewer bytes available than a read required.
    #[error("buffer underflow: need {needed} bytes, got {got}")]
    BufferUnderflow {
        /// Bytes required
        needed: usize,
        /// Bytes available
        got: usize,
    },

    /// Destination buffer cannot hold the encoded message.
    #[error("buffer overflow: need {needed} bytes, room for {room}")]
    BufferOverflow {
        /// Bytes required
        needed: usize,
        /// Bytes of room remaining
        room: usize,
    },

    /// A structure's declared length does not match the bytes consumed
    /// or produced.
    #[error("{what}: declared length {declared} but {actual} bytes")]
    LengthMismatch {
        /// Which structure
        what: &'static str,
        /// Length declared in the structure header
        declared: usize,
        /// Bytes actually consumed/produced
        actual: usize,
    },

    /// A mandatory message field was left unset before encoding.
    #[error("incomplete message: {what} not set")]
    IncompleteMessage {
        /// The missing field
        what: &'static str,
    },

    /// A mandatory structure field was left unset before encoding.
    #[error("incomplete structure: {what} not set")]
    IncompleteStructure {
        /// The missing field
        what: &'static str,
    },

    /// An invalid port number for the active version.
    #[error("bad port number {port:#x} (version {version})")]
    BadPortNumber {
        /// The offending port number
        port: u64,
        /// Active protocol version
        version: ProtocolVersion,
    },

    /// A body parse failure wrapped with message context (header dump and
    /// a hex snippet of the offending bytes).
    #[error("parse failed: {context}")]
    Parse {
        /// Header dump plus raw hex snippet
        context: String,
        /// The underlying failure
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// True if this error (or the root of a parse wrap) is a
    /// version-support failure.
    #[must_use]
    pub fn is_version_unsupported(&self) -> bool {
        match self {
            Self::VersionNotSupported { .. } => true,
            Self::Parse { source, .. } => source.is_version_unsupported(),
            _ => false,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
