//! Error types for rfcollector-core

use crate::message_type::MessageType;

/// Result type alias for protocol operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core protocol errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Frame is too short to hold a header or its declared length
    #[error("Frame too short: expected at least {expected} bytes, got {actual} bytes")]
    FrameTooShort {
        expected: usize,
        actual: usize,
    },

    /// Declared frame length is outside the accepted range
    #[error("Invalid frame length: {length} bytes")]
    InvalidLength {
        length: u32,
    },

    /// Protocol version field is not one we speak
    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// Unknown message type code
    #[error("Unknown message type: {0}")]
    UnknownMessageType(u16),

    /// A parameter header promises more bytes than remain
    #[error("Parameter {param_type} truncated: needs {needed} bytes, {remaining} remain")]
    ParameterTruncated {
        param_type: u16,
        needed: usize,
        remaining: usize,
    },

    /// TV parameter whose size is not known, so the stream cannot continue
    #[error("Unknown TV parameter type: {0}")]
    UnknownTvParameter(u8),

    /// Mandatory parameter absent
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Decoded message has a different type than required
    #[error("Unexpected message: expected {expected}, got {actual}")]
    UnexpectedMessage {
        expected: MessageType,
        actual: MessageType,
    },

    /// The message-id space is used up; ids are never reused
    #[error("Message id space exhausted")]
    MessageIdExhausted,

    /// Body too large to fit in a frame
    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge {
        size: usize,
        max: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Check whether the error came from a malformed byte stream
    ///
    /// Such errors affect one message only: the frame length is still
    /// known, so the stream can continue with the next frame.
    pub fn is_malformed_message(&self) -> bool {
        matches!(
            self,
            Self::UnknownMessageType(_)
                | Self::ParameterTruncated { .. }
                | Self::UnknownTvParameter(_)
                | Self::MissingParameter(_)
                | Self::UnexpectedMessage { .. }
        )
    }

    /// Check if the byte stream lost framing and the connection must be dropped
    pub fn breaks_framing(&self) -> bool {
        matches!(
            self,
            Self::FrameTooShort { .. } | Self::InvalidLength { .. } | Self::UnsupportedVersion(_)
        )
    }
}
