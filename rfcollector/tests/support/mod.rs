//! In-process reader that answers requests through the inbound handler

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{BufMut, Bytes, BytesMut};
use parking_lot::Mutex;
use rfcollector::{JobDefinition, ReaderConfigDefinition};
use rfcollector_core::constants::{impinj, params, tv, IMPINJ_VENDOR_ID};
use rfcollector_core::param::{put_tlv, put_tv};
use rfcollector_core::{Frame, LlrpStatus, Message, MessageType, StatusCode};
use rfcollector_transport::{Error, InboundHandler, Result, Transport};

pub const ROSPEC_ID: u32 = 1234;
pub const MODEL: u32 = 2001002;
pub const FIRMWARE: &str = "5.14.0.240";

/// How the fake answers one request type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Success,
    /// Response carrying a failure status
    Fail(StatusCode),
    /// ERROR_MESSAGE echoing the request id
    ErrorMessage(StatusCode),
    /// No answer at all
    Silent,
}

struct Script {
    replies: HashMap<MessageType, Reply>,
    sent: Vec<(MessageType, u32)>,
    vendor_id: u32,
    antennas: u16,
    connection_status: u16,
    connected: bool,
    handler: Option<Arc<dyn InboundHandler>>,
}

/// Fake reader; clones share one script
///
/// One clone goes into the session as its transport, the test keeps another
/// to script replies and inspect traffic.
#[derive(Clone)]
pub struct FakeReader {
    script: Arc<Mutex<Script>>,
}

impl FakeReader {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(Script {
                replies: HashMap::new(),
                sent: Vec::new(),
                vendor_id: IMPINJ_VENDOR_ID,
                antennas: 1,
                connection_status: 0,
                connected: false,
                handler: None,
            })),
        }
    }

    pub fn reply(self, message_type: MessageType, reply: Reply) -> Self {
        self.set_reply(message_type, reply);
        self
    }

    pub fn set_reply(&self, message_type: MessageType, reply: Reply) {
        self.script.lock().replies.insert(message_type, reply);
    }

    pub fn with_vendor(self, vendor_id: u32) -> Self {
        self.script.lock().vendor_id = vendor_id;
        self
    }

    pub fn with_antennas(self, antennas: u16) -> Self {
        self.script.lock().antennas = antennas;
        self
    }

    /// Answer the connection with a failed ConnectionAttemptEvent
    pub fn refusing(self, status: u16) -> Self {
        self.script.lock().connection_status = status;
        self
    }

    pub fn is_open(&self) -> bool {
        self.script.lock().connected
    }

    /// Request types in the order they were sent
    pub fn sent(&self) -> Vec<MessageType> {
        self.script.lock().sent.iter().map(|(ty, _)| *ty).collect()
    }

    pub fn sent_ids(&self) -> Vec<u32> {
        self.script.lock().sent.iter().map(|(_, id)| *id).collect()
    }

    pub fn count(&self, message_type: MessageType) -> usize {
        self.script
            .lock()
            .sent
            .iter()
            .filter(|(ty, _)| *ty == message_type)
            .count()
    }

    /// Emit an RO_ACCESS_REPORT with one record per EPC, in order
    pub fn push_report(&self, epcs: &[[u8; 12]]) {
        let mut body = BytesMut::new();
        for (index, epc) in epcs.iter().enumerate() {
            let mut record = BytesMut::new();
            put_tv(&mut record, tv::EPC_96, epc);
            put_tv(&mut record, tv::ANTENNA_ID, &1u16.to_be_bytes());
            put_tv(&mut record, tv::CHANNEL_INDEX, &7u16.to_be_bytes());
            let first_seen = 1_700_000_000_000_000u64 + index as u64;
            put_tv(&mut record, tv::FIRST_SEEN_TIMESTAMP_UTC, &first_seen.to_be_bytes());
            put_tlv(&mut body, params::TAG_REPORT_DATA, &record);
        }
        self.deliver(vec![Frame::with_body(MessageType::RoAccessReport, 0, body.freeze())]);
    }

    /// Drop the connection from the reader side
    pub fn drop_connection(&self) {
        let handler = {
            let mut script = self.script.lock();
            script.connected = false;
            script.handler.take()
        };
        if let Some(handler) = handler {
            handler.on_closed(&Error::ConnectionClosed);
        }
    }

    fn deliver(&self, frames: Vec<Frame>) {
        let Some(handler) = self.script.lock().handler.clone() else {
            return;
        };
        for frame in frames {
            // Go through the wire format like a real connection
            let frame = Frame::decode(frame.encode()).expect("fake frame decodes");
            handler.on_message(Message::decode(frame).expect("fake message decodes"));
        }
    }

    fn answer(script: &Script, message_type: MessageType, message_id: u32) -> Option<Frame> {
        let reply = script
            .replies
            .get(&message_type)
            .copied()
            .unwrap_or(Reply::Success);

        let status = match reply {
            Reply::Silent => return None,
            Reply::ErrorMessage(code) => {
                let status = LlrpStatus::failure(code, "unsupported by fake reader");
                return Some(Frame::with_body(
                    MessageType::ErrorMessage,
                    message_id,
                    status.encode().freeze(),
                ));
            }
            Reply::Fail(code) => LlrpStatus::failure(code, "rejected by fake reader"),
            Reply::Success => LlrpStatus::success(),
        };

        let mut body = BytesMut::new();
        if message_type == MessageType::CustomMessage {
            body.put_u32(IMPINJ_VENDOR_ID);
            body.put_u8(impinj::ENABLE_EXTENSIONS_RESPONSE);
        }
        body.put_slice(&status.encode());
        if status.is_success() {
            match message_type {
                MessageType::GetReaderCapabilities => body.put_slice(&capabilities(script.vendor_id)),
                MessageType::GetReaderConfig => body.put_slice(&configuration(script.antennas)),
                _ => {}
            }
        }

        let response_type = match message_type {
            MessageType::CustomMessage => MessageType::CustomMessage,
            other => other.response_type()?,
        };
        Some(Frame::with_body(response_type, message_id, body.freeze()))
    }
}

#[async_trait]
impl Transport for FakeReader {
    async fn connect(&mut self, handler: Arc<dyn InboundHandler>) -> Result<()> {
        let status = {
            let mut script = self.script.lock();
            if script.connected {
                return Err(Error::AlreadyConnected);
            }
            script.connected = true;
            script.handler = Some(handler);
            script.connection_status
        };

        let mut event = BytesMut::new();
        put_tlv(&mut event, params::UTC_TIMESTAMP, &42u64.to_be_bytes());
        put_tlv(&mut event, params::CONNECTION_ATTEMPT_EVENT, &status.to_be_bytes());
        let mut body = BytesMut::new();
        put_tlv(&mut body, params::READER_EVENT_NOTIFICATION_DATA, &event);

        self.deliver(vec![Frame::with_body(
            MessageType::ReaderEventNotification,
            0,
            body.freeze(),
        )]);
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        let mut script = self.script.lock();
        script.connected = false;
        script.handler = None;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.script.lock().connected
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        let reply = {
            let mut script = self.script.lock();
            if !script.connected {
                return Err(Error::ConnectionClosed);
            }
            script.sent.push((frame.message_type, frame.message_id));
            Self::answer(&script, frame.message_type, frame.message_id)
        };

        self.deliver(reply.into_iter().collect());
        Ok(())
    }

    fn remote_addr(&self) -> String {
        "fake-reader:5084".to_string()
    }
}

fn capabilities(vendor_id: u32) -> BytesMut {
    let mut general = BytesMut::new();
    general.put_u16(4);
    general.put_u16(0xC000);
    general.put_u32(vendor_id);
    general.put_u32(MODEL);
    general.put_u16(FIRMWARE.len() as u16);
    general.put_slice(FIRMWARE.as_bytes());

    let mut body = BytesMut::new();
    put_tlv(&mut body, params::GENERAL_DEVICE_CAPABILITIES, &general);
    body
}

fn configuration(antennas: u16) -> BytesMut {
    let mut body = BytesMut::new();
    for antenna_id in 1..=antennas {
        let mut transmitter = BytesMut::new();
        transmitter.put_u16(1); // hop table
        transmitter.put_u16(3); // channel
        transmitter.put_u16(81); // power index

        let mut antenna = BytesMut::new();
        antenna.put_u16(antenna_id);
        put_tlv(&mut antenna, params::RF_TRANSMITTER, &transmitter);
        put_tlv(&mut body, params::ANTENNA_CONFIGURATION, &antenna);
    }
    body
}

pub fn reader_config() -> ReaderConfigDefinition {
    ReaderConfigDefinition::from_body(Bytes::from_static(&[0x00]))
}

pub fn job() -> JobDefinition {
    let mut value = BytesMut::new();
    value.put_u32(ROSPEC_ID);
    value.put_u8(0); // priority
    value.put_u8(0); // current state
    let mut body = BytesMut::new();
    put_tlv(&mut body, params::ROSPEC, &value);
    JobDefinition::from_body(body.freeze()).expect("valid ROSpec")
}

pub fn epc(n: u8) -> [u8; 12] {
    let mut epc = [0xE2; 12];
    epc[11] = n;
    epc
}
