//! Reader identity learned during bootstrap

use std::fmt;

/// What the reader reported about itself
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReaderInfo {
    /// IANA enterprise number of the manufacturer
    pub manufacturer: u32,

    /// Vendor model number
    pub model: u32,

    /// Firmware version
    pub firmware_version: String,

    /// Number of antenna ports
    pub max_antennas: u16,

    /// Highest transmit power the reader supports, in dBm
    pub max_transmit_power_dbm: Option<f64>,

    /// Hop table of the first configured antenna
    pub hop_table_id: Option<u16>,

    /// Channel of the first configured antenna
    pub channel_index: Option<u16>,
}

impl ReaderInfo {
    pub fn new(manufacturer: u32, model: u32, firmware_version: impl Into<String>) -> Self {
        Self {
            manufacturer,
            model,
            firmware_version: firmware_version.into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for ReaderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Reader[vendor: {}, model: {}, FW: {}]",
            self.manufacturer, self.model, self.firmware_version
        )
    }
}
