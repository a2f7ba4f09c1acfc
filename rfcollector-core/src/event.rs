//! READER_EVENT_NOTIFICATION decoding

use bytes::{Buf, Bytes};
use std::fmt;

use crate::constants::params;
use crate::error::{Error, Result};
use crate::param::{self, ensure, ParamReader};

/// Outcome the reader reports for a connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionAttemptStatus {
    Success,
    ReaderInitiatedConnectionExists,
    ClientInitiatedConnectionExists,
    OtherFailure,
    AnotherConnectionAttempted,
    Unknown(u16),
}

impl ConnectionAttemptStatus {
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl From<u16> for ConnectionAttemptStatus {
    fn from(value: u16) -> Self {
        match value {
            0 => Self::Success,
            1 => Self::ReaderInitiatedConnectionExists,
            2 => Self::ClientInitiatedConnectionExists,
            3 => Self::OtherFailure,
            4 => Self::AnotherConnectionAttempted,
            other => Self::Unknown(other),
        }
    }
}

/// ROSpec lifecycle event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoSpecEventKind {
    Started,
    Ended,
    Preempted,
    Unknown(u8),
}

impl From<u8> for RoSpecEventKind {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Started,
            1 => Self::Ended,
            2 => Self::Preempted,
            other => Self::Unknown(other),
        }
    }
}

/// One event carried by a reader event notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderEvent {
    RoSpec {
        kind: RoSpecEventKind,
        rospec_id: u32,
    },
    BufferLevelWarning {
        fill_percent: u8,
    },
    BufferOverflow,
    ReaderException {
        message: String,
    },
    Antenna {
        antenna_id: u16,
        connected: bool,
    },
    ConnectionAttempt {
        status: ConnectionAttemptStatus,
    },
    ConnectionClose,
    /// Event parameter this client does not interpret
    Other {
        param_type: u16,
    },
}

impl ReaderEvent {
    fn decode(param_type: u16, mut v: Bytes) -> Result<Self> {
        let event = match param_type {
            params::ROSPEC_EVENT => {
                ensure(&v, 5, param_type)?;
                let kind = RoSpecEventKind::from(v.get_u8());
                Self::RoSpec {
                    kind,
                    rospec_id: v.get_u32(),
                }
            }
            params::REPORT_BUFFER_LEVEL_WARNING_EVENT => {
                ensure(&v, 1, param_type)?;
                Self::BufferLevelWarning {
                    fill_percent: v.get_u8(),
                }
            }
            params::REPORT_BUFFER_OVERFLOW_ERROR_EVENT => Self::BufferOverflow,
            params::READER_EXCEPTION_EVENT => Self::ReaderException {
                message: param::get_utf8(&mut v, param_type)?,
            },
            params::ANTENNA_EVENT => {
                ensure(&v, 3, param_type)?;
                let connected = v.get_u8() == 1;
                Self::Antenna {
                    antenna_id: v.get_u16(),
                    connected,
                }
            }
            params::CONNECTION_ATTEMPT_EVENT => {
                ensure(&v, 2, param_type)?;
                Self::ConnectionAttempt {
                    status: ConnectionAttemptStatus::from(v.get_u16()),
                }
            }
            params::CONNECTION_CLOSE_EVENT => Self::ConnectionClose,
            other => Self::Other { param_type: other },
        };
        Ok(event)
    }
}

impl fmt::Display for ReaderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoSpec { kind, rospec_id } => write!(f, "ROSpec {rospec_id} {kind:?}"),
            Self::BufferLevelWarning { fill_percent } => {
                write!(f, "report buffer {fill_percent}% full")
            }
            Self::BufferOverflow => write!(f, "report buffer overflow"),
            Self::ReaderException { message } => write!(f, "reader exception: {message}"),
            Self::Antenna { antenna_id, connected: true } => write!(f, "antenna {antenna_id} connected"),
            Self::Antenna { antenna_id, connected: false } => {
                write!(f, "antenna {antenna_id} disconnected")
            }
            Self::ConnectionAttempt { status } => write!(f, "connection attempt: {status:?}"),
            Self::ConnectionClose => write!(f, "connection closing"),
            Self::Other { param_type } => write!(f, "event parameter {param_type}"),
        }
    }
}

/// Decoded READER_EVENT_NOTIFICATION
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderEventNotification {
    /// Microseconds since the Unix epoch, when the reader has a UTC clock
    pub timestamp_utc: Option<u64>,
    pub events: Vec<ReaderEvent>,
}

impl ReaderEventNotification {
    /// Decode a READER_EVENT_NOTIFICATION body
    pub fn decode(body: Bytes) -> Result<Self> {
        let data = ParamReader::new(body)
            .find(|p| {
                p.as_ref()
                    .map_or(true, |p| p.is_tlv(params::READER_EVENT_NOTIFICATION_DATA))
            })
            .ok_or(Error::MissingParameter("ReaderEventNotificationData"))??;

        let mut notification = Self::default();
        for param in data.children(0)? {
            let param = param?;
            match param.param_type {
                params::UTC_TIMESTAMP => {
                    let mut v = param.value;
                    ensure(&v, 8, params::UTC_TIMESTAMP)?;
                    notification.timestamp_utc = Some(v.get_u64());
                }
                params::UPTIME => {}
                other => notification.events.push(ReaderEvent::decode(other, param.value)?),
            }
        }

        Ok(notification)
    }

    /// Status of the connection attempt, if this notification carries one
    pub fn connection_attempt(&self) -> Option<ConnectionAttemptStatus> {
        self.events.iter().find_map(|e| match e {
            ReaderEvent::ConnectionAttempt { status } => Some(*status),
            _ => None,
        })
    }
}
