//! Decoded inbound messages
//!
//! The reader sends responses and unsolicited notifications over the same
//! connection. [`Message::decode`] turns a frame into one typed variant;
//! telling responses from notifications by correlation is left to the
//! session layer.

use bytes::{Buf, Bytes};
use std::fmt;

use crate::capabilities::{ReaderCapabilities, ReaderConfiguration};
use crate::constants::{impinj, params, IMPINJ_VENDOR_ID};
use crate::error::{Error, Result};
use crate::event::ReaderEventNotification;
use crate::frame::Frame;
use crate::message_type::MessageType;
use crate::param::{ensure, ParamReader};
use crate::report::RoAccessReport;
use crate::status::LlrpStatus;

/// Message kind, with vendor custom messages told apart by vendor and subtype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Standard(MessageType),
    Custom { vendor_id: u32, subtype: u8 },
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(ty) => write!(f, "{ty}"),
            Self::Custom { vendor_id, subtype } => {
                write!(f, "CUSTOM_MESSAGE(vendor={vendor_id}, subtype={subtype})")
            }
        }
    }
}

/// Response to a client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub kind: MessageKind,
    pub message_id: u32,
    pub status: LlrpStatus,
    /// Parameters following the status
    pub params: Bytes,
}

impl Response {
    /// Decode the body of a GET_READER_CAPABILITIES_RESPONSE
    pub fn capabilities(&self) -> Result<ReaderCapabilities> {
        self.expect(MessageType::GetReaderCapabilitiesResponse)?;
        ReaderCapabilities::decode(self.params.clone())
    }

    /// Decode the body of a GET_READER_CONFIG_RESPONSE
    pub fn configuration(&self) -> Result<ReaderConfiguration> {
        self.expect(MessageType::GetReaderConfigResponse)?;
        ReaderConfiguration::decode(self.params.clone())
    }

    fn expect(&self, expected: MessageType) -> Result<()> {
        match self.kind {
            MessageKind::Standard(actual) if actual == expected => Ok(()),
            MessageKind::Standard(actual) => Err(Error::UnexpectedMessage { expected, actual }),
            MessageKind::Custom { .. } => Err(Error::UnexpectedMessage {
                expected,
                actual: MessageType::CustomMessage,
            }),
        }
    }
}

/// Vendor custom message this client does not interpret further
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomMessage {
    pub message_id: u32,
    pub vendor_id: u32,
    pub subtype: u8,
    pub data: Bytes,
}

/// Any message received from the reader
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Response(Response),
    RoAccessReport {
        message_id: u32,
        report: RoAccessReport,
    },
    ReaderEventNotification {
        message_id: u32,
        notification: ReaderEventNotification,
    },
    Keepalive {
        message_id: u32,
    },
    /// Reader could not process a request; `message_id` echoes that request
    ErrorMessage {
        message_id: u32,
        status: LlrpStatus,
    },
    Custom(CustomMessage),
    /// Well-formed frame of a type a reader is not expected to send
    Other(Frame),
}

impl Message {
    /// Decode a frame received from the reader
    pub fn decode(frame: Frame) -> Result<Self> {
        let message_id = frame.message_id;
        let ty = frame.message_type;

        if ty.is_response() {
            let (status, params) = split_status(frame.body)?;
            return Ok(Self::Response(Response {
                kind: MessageKind::Standard(ty),
                message_id,
                status,
                params,
            }));
        }

        let message = match ty {
            MessageType::RoAccessReport => Self::RoAccessReport {
                message_id,
                report: RoAccessReport::decode(frame.body)?,
            },
            MessageType::ReaderEventNotification => Self::ReaderEventNotification {
                message_id,
                notification: ReaderEventNotification::decode(frame.body)?,
            },
            MessageType::Keepalive => Self::Keepalive { message_id },
            MessageType::ErrorMessage => Self::ErrorMessage {
                message_id,
                status: split_status(frame.body)?.0,
            },
            MessageType::CustomMessage => decode_custom(message_id, frame.body)?,
            _ => Self::Other(frame),
        };

        Ok(message)
    }

    pub fn message_id(&self) -> u32 {
        match self {
            Self::Response(r) => r.message_id,
            Self::RoAccessReport { message_id, .. }
            | Self::ReaderEventNotification { message_id, .. }
            | Self::Keepalive { message_id }
            | Self::ErrorMessage { message_id, .. } => *message_id,
            Self::Custom(c) => c.message_id,
            Self::Other(frame) => frame.message_id,
        }
    }

    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Response(r) => r.kind,
            Self::RoAccessReport { .. } => MessageKind::Standard(MessageType::RoAccessReport),
            Self::ReaderEventNotification { .. } => {
                MessageKind::Standard(MessageType::ReaderEventNotification)
            }
            Self::Keepalive { .. } => MessageKind::Standard(MessageType::Keepalive),
            Self::ErrorMessage { .. } => MessageKind::Standard(MessageType::ErrorMessage),
            Self::Custom(c) => MessageKind::Custom {
                vendor_id: c.vendor_id,
                subtype: c.subtype,
            },
            Self::Other(frame) => MessageKind::Standard(frame.message_type),
        }
    }
}

/// Split a body into its leading LLRPStatus and the parameters after it
fn split_status(body: Bytes) -> Result<(LlrpStatus, Bytes)> {
    let mut reader = ParamReader::new(body);
    let first = reader
        .next()
        .ok_or(Error::MissingParameter("LLRPStatus"))??;
    if !first.is_tlv(params::LLRP_STATUS) {
        return Err(Error::MissingParameter("LLRPStatus"));
    }
    Ok((LlrpStatus::decode(first.value)?, reader.into_rest()))
}

fn decode_custom(message_id: u32, mut body: Bytes) -> Result<Message> {
    ensure(&body, 5, params::CUSTOM)?;
    let vendor_id = body.get_u32();
    let subtype = body.get_u8();

    if vendor_id == IMPINJ_VENDOR_ID && subtype == impinj::ENABLE_EXTENSIONS_RESPONSE {
        let (status, params) = split_status(body)?;
        return Ok(Message::Response(Response {
            kind: MessageKind::Custom { vendor_id, subtype },
            message_id,
            status,
            params,
        }));
    }

    Ok(Message::Custom(CustomMessage {
        message_id,
        vendor_id,
        subtype,
        data: body,
    }))
}
