//! OpenFlow message layer: versioned codec and message model

pub mod bitmap;
pub mod buffer;
pub mod builder;
pub mod codes;
pub mod encoder;
pub mod error;
pub mod factory;
pub mod flags;
pub mod header;
pub mod message;
pub mod parser;
pub mod structures;
pub mod subcodec;
pub mod version;

pub use bitmap::{WireBitmap, decode_bitmap, encode_bitmap, set_strict_parsing, strict_parsing};
pub use buffer::{PacketReader, PacketWriter, hex};
pub use builder::{
    EchoBuilder, ErrorBuilder, ExperimenterBuilder, FlowModBuilder, GroupModBuilder, HelloBuilder,
    MeterModBuilder, MultipartRequestBuilder, PacketOutBuilder, PortModBuilder,
    QueueGetConfigRequestBuilder, RoleRequestBuilder, SetAsyncBuilder, SetConfigBuilder,
    TableModBuilder, header_only,
};
pub use codes::{
    ControllerRole, ErrorType, FlowModCommand, FlowRemovedReason, GroupModCommand, GroupType,
    HelloElemType, MeterBandType, MeterModCommand, MultipartType, PacketInReason, PortReason,
    QueuePropType, TableFeaturePropType,
};
pub use encoder::encode_message;
pub use error::{Error, Result};
pub use factory::{
    SUPPORTED_VERSIONS, assign_xid, check_create_allowed, check_version_supported, copy_message,
    exact_copy_message, is_version_supported, next_xid, packet_out_from_packet_in,
    parse_message_for,
};
pub use flags::{
    Capability, ConfigFlag, FlowModFlag, MeterFlag, MultipartReplyFlag, MultipartRequestFlag,
    PortConfig, PortFeature, PortState, SupportedAction, TableConfig,
};
pub use header::{Header, MessageType, OFM_HEADER_LEN};
pub use message::{Body, GROUP_ANY, METER_ALL, Message, NO_BUFFER, TABLE_ALL};
pub use parser::parse_message;
pub use structures::{
    Bucket, HelloElem, MeterBand, Port, PortBuilder, PortNumber, Queue, QueueBuilder, QueueProp,
    TableFeature, TableFeatureProp,
};
pub use subcodec::{Action, Instruction, Match};
pub use version::ProtocolVersion;
