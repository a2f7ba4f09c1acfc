//! Inbound message routing
//!
//! The dispatcher is the single [`InboundHandler`] registered with the
//! transport. Responses that match the pending transaction go to the
//! executor; everything else is a notification. Tag reports are turned into
//! [`TagEvent`]s and handed to the sink in wire order.

use std::sync::Arc;

use parking_lot::Mutex;
use rfcollector_core::report::CustomParam;
use rfcollector_core::{
    ConnectionAttemptStatus, FrameHeader, Message, MessageKind, ReaderEventNotification,
    RoAccessReport, TagReport,
};
use rfcollector_transport::InboundHandler;
use rfcollector_types::TagEvent;
use tokio::sync::oneshot;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::executor::PendingSlot;
use crate::sink::{EventObserver, TagSink};

/// Routes everything the reader sends
pub struct Dispatcher {
    pending: Arc<PendingSlot>,
    sink: Arc<dyn TagSink>,
    observer: Option<Arc<dyn EventObserver>>,
    vendor_id: u32,
    connection_attempt: Mutex<Option<oneshot::Sender<ConnectionAttemptStatus>>>,
}

impl Dispatcher {
    pub fn new(
        pending: Arc<PendingSlot>,
        sink: Arc<dyn TagSink>,
        observer: Option<Arc<dyn EventObserver>>,
        vendor_id: u32,
    ) -> Self {
        Self {
            pending,
            sink,
            observer,
            vendor_id,
            connection_attempt: Mutex::new(None),
        }
    }

    /// Receive the status of the next ConnectionAttemptEvent
    ///
    /// The receiver errors out if the connection closes first.
    pub fn expect_connection_attempt(&self) -> oneshot::Receiver<ConnectionAttemptStatus> {
        let (tx, rx) = oneshot::channel();
        *self.connection_attempt.lock() = Some(tx);
        rx
    }

    fn deliver_report(&self, message_id: u32, report: RoAccessReport) {
        trace!(
            "RO_ACCESS_REPORT id={} with {} tag reports",
            message_id,
            report.tag_reports.len()
        );

        for reason in &report.rejected {
            warn!("Protocol integrity: dropped malformed tag report: {}", reason);
        }
        for custom in &report.customs {
            self.check_vendor(custom);
        }

        for tag in report.tag_reports {
            for custom in &tag.foreign_customs {
                self.check_vendor(custom);
            }
            self.sink.accept(tag_event(tag));
        }
    }

    fn deliver_events(&self, notification: ReaderEventNotification) {
        if let Some(status) = notification.connection_attempt() {
            match self.connection_attempt.lock().take() {
                Some(tx) => {
                    let _ = tx.send(status);
                }
                None => debug!("Connection attempt event outside of open: {:?}", status),
            }
        }

        for event in &notification.events {
            match &self.observer {
                Some(observer) => observer.on_event(event),
                None => debug!("Reader event: {}", event),
            }
        }
    }

    fn check_vendor(&self, custom: &CustomParam) {
        if custom.vendor_id != self.vendor_id {
            warn!(
                "Protocol integrity: custom parameter from vendor {} (expected {}), subtype {}",
                custom.vendor_id, self.vendor_id, custom.subtype
            );
        }
    }
}

impl InboundHandler for Dispatcher {
    fn on_message(&self, message: Message) {
        let message = match message {
            Message::Response(response) => {
                if let Some(response) = self.pending.try_resolve(response) {
                    warn!(
                        "Uncorrelated response {} id={} ({})",
                        response.kind, response.message_id, response.status
                    );
                }
                return;
            }
            Message::ErrorMessage { message_id, status } => {
                let resolved = self.pending.try_fail(message_id, |operation| Error::Status {
                    operation,
                    code: status.code,
                    description: status.description.clone(),
                });
                if !resolved {
                    warn!("ERROR_MESSAGE id={} for no pending request: {}", message_id, status);
                }
                return;
            }
            other => other,
        };

        match message {
            Message::RoAccessReport { message_id, report } => self.deliver_report(message_id, report),
            Message::ReaderEventNotification { notification, .. } => self.deliver_events(notification),
            Message::Keepalive { message_id } => trace!("KEEPALIVE id={}", message_id),
            Message::Custom(custom) if custom.vendor_id != self.vendor_id => warn!(
                "Protocol integrity: custom message from vendor {} (expected {}), subtype {}",
                custom.vendor_id, self.vendor_id, custom.subtype
            ),
            Message::Custom(custom) => debug!("Unhandled custom message subtype {}", custom.subtype),
            other => warn!("Unexpected {} from reader (id={})", other.kind(), other.message_id()),
        }
    }

    fn on_malformed(&self, header: &FrameHeader, error: &rfcollector_core::Error) {
        let answers_pending = self
            .pending
            .expected_kind(header.message_id)
            .is_some_and(|kind| raw_type(kind) == header.message_type);

        if answers_pending {
            let reason = error.to_string();
            self.pending
                .try_fail(header.message_id, |operation| {
                    Error::InvalidResponse(format!("{operation}: {reason}"))
                });
        } else {
            warn!(
                "Protocol integrity: malformed message type={} id={}: {}",
                header.message_type, header.message_id, error
            );
        }
    }

    fn on_closed(&self, reason: &rfcollector_transport::Error) {
        debug!("Inbound stream closed: {}", reason);
        self.connection_attempt.lock().take();
        self.pending
            .fail_any(|operation| Error::Disconnected { operation });
    }
}

fn raw_type(kind: MessageKind) -> u16 {
    match kind {
        MessageKind::Standard(ty) => u16::from(ty),
        MessageKind::Custom { .. } => u16::from(rfcollector_core::MessageType::CustomMessage),
    }
}

/// Normalize one decoded tag report
///
/// The Impinj peak RSSI (dBm x 100) is preferred; the standard whole-dBm
/// field is scaled up when it is all the reader sent.
pub fn tag_event(report: TagReport) -> TagEvent {
    let rssi_raw = report
        .impinj_peak_rssi
        .or_else(|| report.peak_rssi.map(|dbm| i16::from(dbm) * 100));

    TagEvent {
        tag_id: report.epc.to_vec(),
        antenna_id: report.antenna_id,
        channel_index: report.channel_index,
        first_seen_us: report.first_seen_utc,
        last_seen_us: report.last_seen_utc,
        seen_count: report.tag_seen_count,
        rssi_raw,
        doppler_raw: report.doppler_frequency,
        phase_raw: report.phase_angle,
    }
}
