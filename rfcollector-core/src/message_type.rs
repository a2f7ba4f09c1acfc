//! LLRP message type definitions

use std::fmt;

use crate::error::{Error, Result};

/// Protocol message type codes
///
/// The subset of LLRP 1.0.1 messages a collector client exchanges with a reader.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MessageType {
    // Reader device capabilities and configuration
    GetReaderCapabilities = 1,
    GetReaderConfig = 2,
    SetReaderConfig = 3,
    CloseConnectionResponse = 4,
    GetReaderCapabilitiesResponse = 11,
    GetReaderConfigResponse = 12,
    SetReaderConfigResponse = 13,
    CloseConnection = 14,

    // Reader operation control
    AddRoSpec = 20,
    DeleteRoSpec = 21,
    StartRoSpec = 22,
    StopRoSpec = 23,
    EnableRoSpec = 24,
    DisableRoSpec = 25,
    AddRoSpecResponse = 30,
    DeleteRoSpecResponse = 31,
    StartRoSpecResponse = 32,
    StopRoSpecResponse = 33,
    EnableRoSpecResponse = 34,
    DisableRoSpecResponse = 35,

    // Reports and notifications
    RoAccessReport = 61,
    Keepalive = 62,
    ReaderEventNotification = 63,
    EnableEventsAndReports = 64,
    KeepaliveAck = 72,
    ErrorMessage = 100,

    // Vendor extensions
    CustomMessage = 1023,
}

impl MessageType {
    /// Check if this is a response to a client request
    pub fn is_response(self) -> bool {
        matches!(
            self,
            Self::CloseConnectionResponse
                | Self::GetReaderCapabilitiesResponse
                | Self::GetReaderConfigResponse
                | Self::SetReaderConfigResponse
                | Self::AddRoSpecResponse
                | Self::DeleteRoSpecResponse
                | Self::StartRoSpecResponse
                | Self::StopRoSpecResponse
                | Self::EnableRoSpecResponse
                | Self::DisableRoSpecResponse
        )
    }

    /// Check if the reader sends this without being asked
    pub fn is_notification(self) -> bool {
        matches!(
            self,
            Self::RoAccessReport | Self::Keepalive | Self::ReaderEventNotification
        )
    }

    /// Response type the reader answers this request with
    pub fn response_type(self) -> Option<MessageType> {
        match self {
            Self::GetReaderCapabilities => Some(Self::GetReaderCapabilitiesResponse),
            Self::GetReaderConfig => Some(Self::GetReaderConfigResponse),
            Self::SetReaderConfig => Some(Self::SetReaderConfigResponse),
            Self::CloseConnection => Some(Self::CloseConnectionResponse),
            Self::AddRoSpec => Some(Self::AddRoSpecResponse),
            Self::DeleteRoSpec => Some(Self::DeleteRoSpecResponse),
            Self::StartRoSpec => Some(Self::StartRoSpecResponse),
            Self::StopRoSpec => Some(Self::StopRoSpecResponse),
            Self::EnableRoSpec => Some(Self::EnableRoSpecResponse),
            Self::DisableRoSpec => Some(Self::DisableRoSpecResponse),
            _ => None,
        }
    }

    /// Get message name as written in the LLRP standard
    pub fn name(self) -> &'static str {
        match self {
            Self::GetReaderCapabilities => "GET_READER_CAPABILITIES",
            Self::GetReaderConfig => "GET_READER_CONFIG",
            Self::SetReaderConfig => "SET_READER_CONFIG",
            Self::CloseConnectionResponse => "CLOSE_CONNECTION_RESPONSE",
            Self::GetReaderCapabilitiesResponse => "GET_READER_CAPABILITIES_RESPONSE",
            Self::GetReaderConfigResponse => "GET_READER_CONFIG_RESPONSE",
            Self::SetReaderConfigResponse => "SET_READER_CONFIG_RESPONSE",
            Self::CloseConnection => "CLOSE_CONNECTION",
            Self::AddRoSpec => "ADD_ROSPEC",
            Self::DeleteRoSpec => "DELETE_ROSPEC",
            Self::StartRoSpec => "START_ROSPEC",
            Self::StopRoSpec => "STOP_ROSPEC",
            Self::EnableRoSpec => "ENABLE_ROSPEC",
            Self::DisableRoSpec => "DISABLE_ROSPEC",
            Self::AddRoSpecResponse => "ADD_ROSPEC_RESPONSE",
            Self::DeleteRoSpecResponse => "DELETE_ROSPEC_RESPONSE",
            Self::StartRoSpecResponse => "START_ROSPEC_RESPONSE",
            Self::StopRoSpecResponse => "STOP_ROSPEC_RESPONSE",
            Self::EnableRoSpecResponse => "ENABLE_ROSPEC_RESPONSE",
            Self::DisableRoSpecResponse => "DISABLE_ROSPEC_RESPONSE",
            Self::RoAccessReport => "RO_ACCESS_REPORT",
            Self::Keepalive => "KEEPALIVE",
            Self::ReaderEventNotification => "READER_EVENT_NOTIFICATION",
            Self::EnableEventsAndReports => "ENABLE_EVENTS_AND_REPORTS",
            Self::KeepaliveAck => "KEEPALIVE_ACK",
            Self::ErrorMessage => "ERROR_MESSAGE",
            Self::CustomMessage => "CUSTOM_MESSAGE",
        }
    }
}

impl From<MessageType> for u16 {
    fn from(ty: MessageType) -> u16 {
        ty as u16
    }
}

impl TryFrom<u16> for MessageType {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        match value {
            1 => Ok(Self::GetReaderCapabilities),
            2 => Ok(Self::GetReaderConfig),
            3 => Ok(Self::SetReaderConfig),
            4 => Ok(Self::CloseConnectionResponse),
            11 => Ok(Self::GetReaderCapabilitiesResponse),
            12 => Ok(Self::GetReaderConfigResponse),
            13 => Ok(Self::SetReaderConfigResponse),
            14 => Ok(Self::CloseConnection),
            20 => Ok(Self::AddRoSpec),
            21 => Ok(Self::DeleteRoSpec),
            22 => Ok(Self::StartRoSpec),
            23 => Ok(Self::StopRoSpec),
            24 => Ok(Self::EnableRoSpec),
            25 => Ok(Self::DisableRoSpec),
            30 => Ok(Self::AddRoSpecResponse),
            31 => Ok(Self::DeleteRoSpecResponse),
            32 => Ok(Self::StartRoSpecResponse),
            33 => Ok(Self::StopRoSpecResponse),
            34 => Ok(Self::EnableRoSpecResponse),
            35 => Ok(Self::DisableRoSpecResponse),
            61 => Ok(Self::RoAccessReport),
            62 => Ok(Self::Keepalive),
            63 => Ok(Self::ReaderEventNotification),
            64 => Ok(Self::EnableEventsAndReports),
            72 => Ok(Self::KeepaliveAck),
            100 => Ok(Self::ErrorMessage),
            1023 => Ok(Self::CustomMessage),
            _ => Err(Error::UnknownMessageType(value)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), *self as u16)
    }
}
