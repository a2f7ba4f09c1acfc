//! Protocol constants

/// Default connection timeout (seconds)
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 5;

/// Default timeout for one request/response transaction (seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: u64 = 10;

/// IANA private enterprise number of Impinj
pub const IMPINJ_VENDOR_ID: u32 = 25882;

/// Impinj custom message and parameter subtypes
pub mod impinj {
    /// IMPINJ_ENABLE_EXTENSIONS custom message
    pub const ENABLE_EXTENSIONS: u8 = 21;

    /// IMPINJ_ENABLE_EXTENSIONS_RESPONSE custom message
    pub const ENABLE_EXTENSIONS_RESPONSE: u8 = 22;

    /// ImpinjRFPhaseAngle tag report parameter (0..4095 over one turn)
    pub const RF_PHASE_ANGLE: u32 = 56;

    /// ImpinjPeakRSSI tag report parameter (dBm x 100)
    pub const PEAK_RSSI: u32 = 57;

    /// ImpinjRFDopplerFrequency tag report parameter (Hz x 16)
    pub const RF_DOPPLER_FREQUENCY: u32 = 68;
}

/// TLV parameter type numbers
pub mod params {
    pub const UTC_TIMESTAMP: u16 = 128;
    pub const UPTIME: u16 = 129;
    pub const GENERAL_DEVICE_CAPABILITIES: u16 = 137;
    pub const REGULATORY_CAPABILITIES: u16 = 143;
    pub const UHF_BAND_CAPABILITIES: u16 = 144;
    pub const TRANSMIT_POWER_LEVEL_TABLE_ENTRY: u16 = 145;
    pub const ROSPEC: u16 = 177;
    pub const TAG_REPORT_DATA: u16 = 240;
    pub const EPC_DATA: u16 = 241;
    pub const READER_EVENT_NOTIFICATION_DATA: u16 = 246;
    pub const ROSPEC_EVENT: u16 = 249;
    pub const REPORT_BUFFER_LEVEL_WARNING_EVENT: u16 = 250;
    pub const REPORT_BUFFER_OVERFLOW_ERROR_EVENT: u16 = 251;
    pub const READER_EXCEPTION_EVENT: u16 = 252;
    pub const ANTENNA_EVENT: u16 = 255;
    pub const CONNECTION_ATTEMPT_EVENT: u16 = 256;
    pub const CONNECTION_CLOSE_EVENT: u16 = 257;
    pub const ANTENNA_CONFIGURATION: u16 = 222;
    pub const RF_TRANSMITTER: u16 = 224;
    pub const LLRP_STATUS: u16 = 287;
    pub const CUSTOM: u16 = 1023;
}

/// TV parameter type numbers (value size fixed per type)
pub mod tv {
    pub const ANTENNA_ID: u8 = 1;
    pub const FIRST_SEEN_TIMESTAMP_UTC: u8 = 2;
    pub const FIRST_SEEN_TIMESTAMP_UPTIME: u8 = 3;
    pub const LAST_SEEN_TIMESTAMP_UTC: u8 = 4;
    pub const LAST_SEEN_TIMESTAMP_UPTIME: u8 = 5;
    pub const PEAK_RSSI: u8 = 6;
    pub const CHANNEL_INDEX: u8 = 7;
    pub const TAG_SEEN_COUNT: u8 = 8;
    pub const ROSPEC_ID: u8 = 9;
    pub const INVENTORY_PARAMETER_SPEC_ID: u8 = 10;
    pub const C1G2_CRC: u8 = 11;
    pub const C1G2_PC: u8 = 12;
    pub const EPC_96: u8 = 13;
    pub const SPEC_INDEX: u8 = 14;
    pub const CLIENT_REQUEST_OP_SPEC_RESULT: u8 = 15;
    pub const ACCESS_SPEC_ID: u8 = 16;
    pub const OP_SPEC_ID: u8 = 17;
    pub const C1G2_SINGULATION_DETAILS: u8 = 18;
    pub const C1G2_XPCW1: u8 = 19;
    pub const C1G2_XPCW2: u8 = 20;
}
