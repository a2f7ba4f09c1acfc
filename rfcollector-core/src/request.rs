//! Client requests and their encodings

use bytes::{BufMut, Bytes, BytesMut};

use crate::constants::{impinj, IMPINJ_VENDOR_ID};
use crate::frame::Frame;
use crate::message::MessageKind;
use crate::message_type::MessageType;

/// ROSpec id that addresses every ROSpec on the reader
pub const ALL_ROSPECS: u32 = 0;

/// A request the client sends and the reader answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Turn on Impinj vendor extensions for this connection
    EnableImpinjExtensions,

    /// SET_READER_CONFIG with the ResetToFactoryDefault bit set
    ResetToFactoryDefaults,

    /// Delete one ROSpec, or all of them with [`ALL_ROSPECS`]
    DeleteRoSpec { rospec_id: u32 },

    /// Ask for every capability the reader reports
    GetReaderCapabilities,

    /// Ask for the full current configuration of all antennas and ports
    GetReaderConfig,

    /// SET_READER_CONFIG with a pre-encoded body
    SetReaderConfig { body: Bytes },

    /// ADD_ROSPEC with a pre-encoded ROSpec parameter
    AddRoSpec { body: Bytes },

    EnableRoSpec { rospec_id: u32 },
    StartRoSpec { rospec_id: u32 },
    StopRoSpec { rospec_id: u32 },
    DisableRoSpec { rospec_id: u32 },

    /// Ask the reader to close the connection
    CloseConnection,
}

impl Request {
    /// Frame type of the request
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::EnableImpinjExtensions => MessageType::CustomMessage,
            Self::ResetToFactoryDefaults | Self::SetReaderConfig { .. } => MessageType::SetReaderConfig,
            Self::DeleteRoSpec { .. } => MessageType::DeleteRoSpec,
            Self::GetReaderCapabilities => MessageType::GetReaderCapabilities,
            Self::GetReaderConfig => MessageType::GetReaderConfig,
            Self::AddRoSpec { .. } => MessageType::AddRoSpec,
            Self::EnableRoSpec { .. } => MessageType::EnableRoSpec,
            Self::StartRoSpec { .. } => MessageType::StartRoSpec,
            Self::StopRoSpec { .. } => MessageType::StopRoSpec,
            Self::DisableRoSpec { .. } => MessageType::DisableRoSpec,
            Self::CloseConnection => MessageType::CloseConnection,
        }
    }

    /// Kind of message that answers this request
    pub fn expected_response(&self) -> MessageKind {
        match self {
            Self::EnableImpinjExtensions => MessageKind::Custom {
                vendor_id: IMPINJ_VENDOR_ID,
                subtype: impinj::ENABLE_EXTENSIONS_RESPONSE,
            },
            other => match other.message_type().response_type() {
                Some(response) => MessageKind::Standard(response),
                None => MessageKind::Standard(MessageType::ErrorMessage),
            },
        }
    }

    /// Human readable operation name used in logs and errors
    pub fn operation(&self) -> &'static str {
        match self {
            Self::EnableImpinjExtensions => "Enable Impinj Extensions",
            Self::ResetToFactoryDefaults => "Reset To Factory Defaults",
            Self::DeleteRoSpec { .. } => "Delete RoSpecs",
            Self::GetReaderCapabilities => "Get Reader Capabilities",
            Self::GetReaderConfig => "Get Reader Configuration",
            Self::SetReaderConfig { .. } => "Set Reader Configuration",
            Self::AddRoSpec { .. } => "Add RoSpec",
            Self::EnableRoSpec { .. } => "Enable RoSpec",
            Self::StartRoSpec { .. } => "Start RoSpec",
            Self::StopRoSpec { .. } => "Stop RoSpec",
            Self::DisableRoSpec { .. } => "Disable RoSpec",
            Self::CloseConnection => "Close Connection",
        }
    }

    /// Encode into a frame carrying `message_id`
    pub fn encode(&self, message_id: u32) -> Frame {
        let mut body = BytesMut::new();

        match self {
            Self::EnableImpinjExtensions => {
                body.put_u32(IMPINJ_VENDOR_ID);
                body.put_u8(impinj::ENABLE_EXTENSIONS);
                body.put_u32(0); // reserved
            }
            Self::ResetToFactoryDefaults => {
                body.put_u8(0x80);
            }
            Self::GetReaderCapabilities => {
                body.put_u8(0); // RequestedData = All
            }
            Self::GetReaderConfig => {
                body.put_u16(0); // all antennas
                body.put_u8(0); // RequestedData = All
                body.put_u16(0); // all GPI ports
                body.put_u16(0); // all GPO ports
            }
            Self::SetReaderConfig { body: definition } | Self::AddRoSpec { body: definition } => {
                return Frame::with_body(self.message_type(), message_id, definition.clone());
            }
            Self::DeleteRoSpec { rospec_id }
            | Self::EnableRoSpec { rospec_id }
            | Self::StartRoSpec { rospec_id }
            | Self::StopRoSpec { rospec_id }
            | Self::DisableRoSpec { rospec_id } => {
                body.put_u32(*rospec_id);
            }
            Self::CloseConnection => {}
        }

        Frame::with_body(self.message_type(), message_id, body.freeze())
    }
}
