//! LLRPStatus parameter carried by every response

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;

use crate::constants::params;
use crate::error::Result;
use crate::param::{self, ensure};

/// Status code returned by the reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    pub const SUCCESS: Self = Self(0);
    pub const PARAMETER_ERROR: Self = Self(100);
    pub const FIELD_ERROR: Self = Self(101);
    pub const UNEXPECTED_PARAMETER: Self = Self(102);
    pub const MISSING_PARAMETER: Self = Self(103);
    pub const UNSUPPORTED_MESSAGE: Self = Self(109);
    pub const UNSUPPORTED_VERSION: Self = Self(110);
    pub const UNEXPECTED_MESSAGE: Self = Self(112);
    pub const INVALID: Self = Self(300);
    pub const OUT_OF_RANGE: Self = Self(301);
    pub const DEVICE_ERROR: Self = Self(401);

    pub fn is_success(self) -> bool {
        self == Self::SUCCESS
    }

    /// Status name as written in the LLRP standard
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "M_Success",
            100 => "M_ParameterError",
            101 => "M_FieldError",
            102 => "M_UnexpectedParameter",
            103 => "M_MissingParameter",
            104 => "M_DuplicateParameter",
            105 => "M_OverflowParameter",
            106 => "M_OverflowField",
            107 => "M_UnknownParameter",
            108 => "M_UnknownField",
            109 => "M_UnsupportedMessage",
            110 => "M_UnsupportedVersion",
            111 => "M_UnsupportedParameter",
            112 => "M_UnexpectedMessage",
            200 => "P_ParameterError",
            201 => "P_FieldError",
            202 => "P_UnexpectedParameter",
            203 => "P_MissingParameter",
            300 => "A_Invalid",
            301 => "A_OutOfRange",
            401 => "R_DeviceError",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.0)
    }
}

/// Decoded LLRPStatus parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlrpStatus {
    pub code: StatusCode,
    pub description: String,
}

impl LlrpStatus {
    pub fn success() -> Self {
        Self {
            code: StatusCode::SUCCESS,
            description: String::new(),
        }
    }

    pub fn failure(code: StatusCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.code.is_success()
    }

    /// Decode from the value bytes of an LLRPStatus TLV
    ///
    /// Trailing FieldError/ParameterError sub-parameters are ignored.
    pub fn decode(mut value: Bytes) -> Result<Self> {
        ensure(&value, 2, params::LLRP_STATUS)?;
        let code = StatusCode(value.get_u16());
        let description = param::get_utf8(&mut value, params::LLRP_STATUS)?;
        Ok(Self { code, description })
    }

    /// Encode as a complete LLRPStatus TLV
    pub fn encode(&self) -> BytesMut {
        let mut value = BytesMut::with_capacity(4 + self.description.len());
        value.put_u16(self.code.0);
        value.put_u16(self.description.len() as u16);
        value.put_slice(self.description.as_bytes());

        let mut buf = BytesMut::with_capacity(4 + value.len());
        param::put_tlv(&mut buf, params::LLRP_STATUS, &value);
        buf
    }
}

impl fmt::Display for LlrpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{}: {}", self.code, self.description)
        }
    }
}
