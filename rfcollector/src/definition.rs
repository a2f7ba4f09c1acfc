//! Reader configuration and job definitions
//!
//! Definitions are prepared offline and stored as one binary-encoded LLRP
//! message per file, header included. LTK-XML documents are not read; run
//! them through an LTK encoder first. Only the message type and, for jobs,
//! the ROSpec id are looked at; the rest is sent to the reader as is.

use std::path::Path;

use bytes::{Buf, Bytes, BytesMut};
use rfcollector_core::constants::params;
use rfcollector_core::param::ParamReader;
use rfcollector_core::{Frame, MessageType, Request};
use tracing::debug;

use crate::error::{Error, Result};

/// SET_READER_CONFIG body applied during bootstrap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfigDefinition {
    body: Bytes,
}

impl ReaderConfigDefinition {
    /// Use an already extracted message body
    pub fn from_body(body: impl Into<Bytes>) -> Self {
        Self { body: body.into() }
    }

    /// Parse an encoded SET_READER_CONFIG message
    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self> {
        let frame = decode_message(raw.into(), MessageType::SetReaderConfig)?;
        Ok(Self { body: frame.body })
    }

    /// Load an encoded SET_READER_CONFIG message from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading reader configuration from {}", path.display());
        Self::from_bytes(read(path)?)
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn request(&self) -> Request {
        Request::SetReaderConfig {
            body: self.body.clone(),
        }
    }
}

/// ADD_ROSPEC body installed during bootstrap, with its ROSpec id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    rospec_id: u32,
    body: Bytes,
}

impl JobDefinition {
    /// Use an already extracted ADD_ROSPEC body
    pub fn from_body(body: impl Into<Bytes>) -> Result<Self> {
        let body = body.into();
        let rospec_id = rospec_id(&body)?;
        Ok(Self { rospec_id, body })
    }

    /// Parse an encoded ADD_ROSPEC message
    pub fn from_bytes(raw: impl Into<Bytes>) -> Result<Self> {
        let frame = decode_message(raw.into(), MessageType::AddRoSpec)?;
        Self::from_body(frame.body)
    }

    /// Load an encoded ADD_ROSPEC message from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading ROSpec from {}", path.display());
        Self::from_bytes(read(path)?)
    }

    pub fn rospec_id(&self) -> u32 {
        self.rospec_id
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn request(&self) -> Request {
        Request::AddRoSpec {
            body: self.body.clone(),
        }
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| Error::Definition(format!("{}: {}", path.display(), e)))
}

fn decode_message(raw: Bytes, expected: MessageType) -> Result<Frame> {
    if raw.trim_ascii_start().starts_with(b"<") {
        return Err(Error::Definition(format!(
            "expected a binary-encoded {expected} message, found XML"
        )));
    }

    let frame = Frame::decode(BytesMut::from(raw.as_ref()))
        .map_err(|e| Error::Definition(format!("not an LLRP message: {e}")))?;

    if frame.message_type != expected {
        return Err(Error::Definition(format!(
            "expected {}, found {}",
            expected, frame.message_type
        )));
    }
    Ok(frame)
}

/// ROSpecID of the ROSpec parameter leading an ADD_ROSPEC body
fn rospec_id(body: &Bytes) -> Result<u32> {
    let rospec = ParamReader::new(body.clone())
        .next()
        .transpose()
        .map_err(|e| Error::Definition(e.to_string()))?
        .filter(|p| p.is_tlv(params::ROSPEC))
        .ok_or_else(|| Error::Definition("ADD_ROSPEC does not start with a ROSpec".into()))?;

    let mut value = rospec.value;
    if value.len() < 4 {
        return Err(Error::Definition("ROSpec too short for its id".into()));
    }
    match value.get_u32() {
        0 => Err(Error::Definition("ROSpec id 0 is reserved".into())),
        id => Ok(id),
    }
}
