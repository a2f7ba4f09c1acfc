//! LLRP frame structure and header encoding/decoding

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::{
    error::{Error, Result},
    message_type::MessageType,
};

/// Decoded 10-byte frame header
///
/// Split out from [`Frame`] so a stream reader can learn the body length
/// before the body has arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Protocol version (1 = LLRP 1.0.1, 2 = LLRP 1.1)
    pub version: u8,

    /// Raw 10-bit message type
    pub message_type: u16,

    /// Total frame length including the header
    pub length: u32,

    /// Message id chosen by the sender
    pub message_id: u32,
}

impl FrameHeader {
    /// Parse a header from the first [`Frame::HEADER_SIZE`] bytes of `buf`
    pub fn parse(buf: &[u8]) -> Result<Self> {
        if buf.len() < Frame::HEADER_SIZE {
            return Err(Error::FrameTooShort {
                expected: Frame::HEADER_SIZE,
                actual: buf.len(),
            });
        }

        let mut buf = &buf[..Frame::HEADER_SIZE];
        let type_word = buf.get_u16();
        let length = buf.get_u32();
        let message_id = buf.get_u32();

        let version = ((type_word >> 10) & 0x7) as u8;
        if !(1..=2).contains(&version) {
            return Err(Error::UnsupportedVersion(version));
        }

        if (length as usize) < Frame::HEADER_SIZE || length as usize > Frame::MAX_SIZE {
            return Err(Error::InvalidLength { length });
        }

        Ok(Self {
            version,
            message_type: type_word & 0x03FF,
            length,
            message_id,
        })
    }

    /// Number of body bytes following the header
    pub fn body_len(&self) -> usize {
        self.length as usize - Frame::HEADER_SIZE
    }
}

/// LLRP message frame
///
/// # Frame Structure
///
/// ```text
/// ┌───────┬─────────┬──────────────┬─────────────┬─────────────┬─────────────┐
/// │ Rsvd  │ Version │ Message Type │   Length    │ Message ID  │    Body     │
/// │ 3 bit │  3 bit  │    10 bit    │   4 bytes   │   4 bytes   │   N bytes   │
/// └───────┴─────────┴──────────────┴─────────────┴─────────────┴─────────────┘
/// ```
///
/// All multi-byte values are big-endian. `Length` covers the whole frame.
///
/// # Examples
///
/// ```
/// use rfcollector_core::{Frame, MessageType};
///
/// let frame = Frame::new(MessageType::CloseConnection, 7);
/// let encoded = frame.encode();
///
/// let decoded = Frame::decode(encoded).unwrap();
/// assert_eq!(frame.message_type, decoded.message_type);
/// assert_eq!(decoded.message_id, 7);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    /// Message type
    pub message_type: MessageType,

    /// Message id (echoed by the reader in the matching response)
    pub message_id: u32,

    /// Message body (type-specific fields and parameters)
    pub body: Bytes,
}

impl Frame {
    /// Frame header size in bytes
    pub const HEADER_SIZE: usize = 10;

    /// Largest frame this client accepts
    pub const MAX_SIZE: usize = 4 * 1024 * 1024;

    /// Protocol version written into outgoing frames
    pub const VERSION: u8 = 1;

    /// Create a new frame with empty body
    pub fn new(message_type: MessageType, message_id: u32) -> Self {
        Self {
            message_type,
            message_id,
            body: Bytes::new(),
        }
    }

    /// Create a frame with body
    ///
    /// # Examples
    ///
    /// ```
    /// use rfcollector_core::{Frame, MessageType};
    ///
    /// let frame = Frame::with_body(MessageType::StartRoSpec, 3, vec![0, 0, 0, 1]);
    /// assert_eq!(frame.size(), 14);
    /// ```
    pub fn with_body(message_type: MessageType, message_id: u32, body: impl Into<Bytes>) -> Self {
        Self {
            message_type,
            message_id,
            body: body.into(),
        }
    }

    /// Same frame re-stamped with another message id
    pub fn with_message_id(mut self, message_id: u32) -> Self {
        self.message_id = message_id;
        self
    }

    /// Encode frame to bytes
    pub fn encode(&self) -> BytesMut {
        let total_size = self.size();
        let mut buf = BytesMut::with_capacity(total_size);

        let type_word = (u16::from(Self::VERSION) << 10) | (u16::from(self.message_type) & 0x03FF);
        buf.put_u16(type_word);
        buf.put_u32(total_size as u32);
        buf.put_u32(self.message_id);
        buf.put_slice(&self.body);

        buf
    }

    /// Decode one complete frame from bytes
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is shorter than the header or the declared length
    /// - Version or declared length is invalid
    /// - Message type is unknown
    pub fn decode(mut buf: BytesMut) -> Result<Self> {
        let header = FrameHeader::parse(&buf)?;

        if buf.len() < header.length as usize {
            return Err(Error::FrameTooShort {
                expected: header.length as usize,
                actual: buf.len(),
            });
        }

        buf.truncate(header.length as usize);
        buf.advance(Self::HEADER_SIZE);

        Self::from_parts(header, buf.freeze())
    }

    /// Build a frame from an already parsed header and its body
    pub fn from_parts(header: FrameHeader, body: Bytes) -> Result<Self> {
        let message_type = MessageType::try_from(header.message_type)?;

        Ok(Self {
            message_type,
            message_id: header.message_id,
            body,
        })
    }

    /// Get total frame size
    pub fn size(&self) -> usize {
        Self::HEADER_SIZE + self.body.len()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("message_type", &self.message_type)
            .field("message_id", &self.message_id)
            .field("body_len", &self.body.len())
            .field("body_head", &hex::encode(&self.body[..self.body.len().min(16)]))
            .finish()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Frame[{}](id={}, len={})",
            self.message_type,
            self.message_id,
            self.body.len()
        )
    }
}
