//! Normalized tag observation
//!
//! Values are stored raw, as the reader encodes them, and scaled on access:
//!
//! | field        | raw unit          | scaled                  |
//! |--------------|-------------------|-------------------------|
//! | `rssi_raw`   | dBm x 100         | [`TagEvent::rssi_dbm`]  |
//! | `doppler_raw`| Hz x 16           | [`TagEvent::doppler_hz`]|
//! | `phase_raw`  | 0..4095 per turn  | [`TagEvent::phase_radians`] |

use chrono::{DateTime, Utc};
use std::f64::consts::TAU;
use std::fmt;

/// One detection of one tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEvent {
    /// Tag identifier (EPC) bytes
    pub tag_id: Vec<u8>,
    pub antenna_id: Option<u16>,
    pub channel_index: Option<u16>,
    /// Microseconds since the Unix epoch
    pub first_seen_us: Option<u64>,
    /// Microseconds since the Unix epoch
    pub last_seen_us: Option<u64>,
    pub seen_count: Option<u16>,
    pub rssi_raw: Option<i16>,
    pub doppler_raw: Option<i16>,
    pub phase_raw: Option<u16>,
}

impl TagEvent {
    /// Raw RSSI units per dBm
    pub const RSSI_SCALE: f64 = 100.0;

    /// Raw Doppler units per Hz
    pub const DOPPLER_SCALE: f64 = 16.0;

    /// Raw phase steps per full turn
    pub const PHASE_STEPS: f64 = 4096.0;

    pub fn new(tag_id: impl Into<Vec<u8>>) -> Self {
        Self {
            tag_id: tag_id.into(),
            ..Default::default()
        }
    }

    /// Tag id as lowercase hex
    pub fn tag_id_hex(&self) -> String {
        hex::encode(&self.tag_id)
    }

    pub fn rssi_dbm(&self) -> Option<f64> {
        self.rssi_raw.map(|raw| f64::from(raw) / Self::RSSI_SCALE)
    }

    pub fn doppler_hz(&self) -> Option<f64> {
        self.doppler_raw.map(|raw| f64::from(raw) / Self::DOPPLER_SCALE)
    }

    pub fn phase_radians(&self) -> Option<f64> {
        self.phase_raw
            .map(|raw| f64::from(raw) * TAU / Self::PHASE_STEPS)
    }

    pub fn first_seen(&self) -> Option<DateTime<Utc>> {
        self.first_seen_us.and_then(micros_to_utc)
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen_us.and_then(micros_to_utc)
    }
}

fn micros_to_utc(us: u64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(i64::try_from(us).ok()?)
}

impl fmt::Display for TagEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag[{}", self.tag_id_hex())?;
        if let Some(antenna) = self.antenna_id {
            write!(f, ", antenna: {antenna}")?;
        }
        if let Some(rssi) = self.rssi_dbm() {
            write!(f, ", rssi: {rssi:.2} dBm")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::f64::consts::PI;

    #[test]
    fn test_scaling() {
        let event = TagEvent {
            rssi_raw: Some(-5000),
            phase_raw: Some(2048),
            doppler_raw: Some(160),
            ..TagEvent::new(vec![0xE2, 0x00])
        };

        assert_eq!(event.rssi_dbm(), Some(-50.0));
        assert!((event.phase_radians().unwrap() - PI).abs() < 1e-12);
        assert_eq!(event.doppler_hz(), Some(10.0));
        assert_eq!(event.tag_id_hex(), "e200");
    }

    #[test]
    fn test_missing_fields_scale_to_none() {
        let event = TagEvent::new(vec![1]);
        assert_eq!(event.rssi_dbm(), None);
        assert_eq!(event.phase_radians(), None);
        assert_eq!(event.first_seen(), None);
    }

    #[test]
    fn test_timestamps() {
        let event = TagEvent {
            first_seen_us: Some(1_700_000_000_123_456),
            last_seen_us: Some(u64::MAX),
            ..TagEvent::new(vec![1])
        };

        let first = event.first_seen().unwrap();
        assert_eq!(first.timestamp(), 1_700_000_000);
        assert_eq!(first.timestamp_subsec_micros(), 123_456);
        assert_eq!(event.last_seen(), None);
    }

    #[test]
    fn test_display() {
        let event = TagEvent {
            antenna_id: Some(2),
            rssi_raw: Some(-4525),
            ..TagEvent::new(vec![0xAB])
        };
        assert_eq!(event.to_string(), "Tag[ab, antenna: 2, rssi: -45.25 dBm]");
    }

    proptest! {
        #[test]
        fn prop_phase_within_one_turn(raw in 0u16..4096) {
            let event = TagEvent { phase_raw: Some(raw), ..TagEvent::new(vec![0]) };
            let rad = event.phase_radians().unwrap();
            prop_assert!((0.0..TAU).contains(&rad));
        }

        #[test]
        fn prop_rssi_scale_is_linear(raw in any::<i16>()) {
            let event = TagEvent { rssi_raw: Some(raw), ..TagEvent::new(vec![0]) };
            let dbm = event.rssi_dbm().unwrap();
            prop_assert!((dbm * TagEvent::RSSI_SCALE - f64::from(raw)).abs() < 1e-9);
        }
    }
}
