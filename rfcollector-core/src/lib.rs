//! # rfcollector-core
//!
//! LLRP protocol primitives for Impinj RFID readers.
//!
//! This crate provides the wire layer only:
//! - Frame header encoding/decoding
//! - TLV/TV parameter parsing
//! - Outbound requests and inbound message decoding
//! - Tag report, reader event and capability decoding
//! - Message id allocation

pub mod capabilities;
pub mod constants;
pub mod error;
pub mod event;
pub mod frame;
pub mod message;
pub mod message_id;
pub mod message_type;
pub mod param;
pub mod report;
pub mod request;
pub mod status;

pub use error::{Error, Result};
pub use event::{ConnectionAttemptStatus, ReaderEvent, ReaderEventNotification};
pub use frame::{Frame, FrameHeader};
pub use message::{Message, MessageKind, Response};
pub use message_id::MessageIds;
pub use message_type::MessageType;
pub use report::{RoAccessReport, TagReport};
pub use request::Request;
pub use status::{LlrpStatus, StatusCode};

/// Default LLRP port
pub const DEFAULT_PORT: u16 = 5084;
