//! GET_READER_CAPABILITIES_RESPONSE and GET_READER_CONFIG_RESPONSE decoding

use bitflags::bitflags;
use bytes::{Buf, Bytes};

use crate::constants::params;
use crate::error::Result;
use crate::param::{self, ensure, Param, ParamReader};

bitflags! {
    /// Flag word of GeneralDeviceCapabilities
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeviceCapabilityFlags: u16 {
        const CAN_SET_ANTENNA_PROPERTIES = 0x8000;
        const HAS_UTC_CLOCK = 0x4000;
    }
}

/// GeneralDeviceCapabilities parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralDeviceCapabilities {
    pub max_antennas: u16,
    pub flags: DeviceCapabilityFlags,
    /// IANA enterprise number of the manufacturer
    pub manufacturer: u32,
    pub model: u32,
    pub firmware_version: String,
}

impl GeneralDeviceCapabilities {
    fn decode(mut v: Bytes) -> Result<Self> {
        ensure(&v, 12, params::GENERAL_DEVICE_CAPABILITIES)?;
        let max_antennas = v.get_u16();
        let flags = DeviceCapabilityFlags::from_bits_truncate(v.get_u16());
        let manufacturer = v.get_u32();
        let model = v.get_u32();
        let firmware_version = param::get_utf8(&mut v, params::GENERAL_DEVICE_CAPABILITIES)?;

        Ok(Self {
            max_antennas,
            flags,
            manufacturer,
            model,
            firmware_version,
        })
    }
}

/// Entry of the transmit power table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitPowerLevel {
    pub index: u16,
    /// dBm x 100
    pub value: i16,
}

impl TransmitPowerLevel {
    pub fn dbm(&self) -> f64 {
        f64::from(self.value) / 100.0
    }
}

/// Parameters of a GET_READER_CAPABILITIES_RESPONSE following its status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderCapabilities {
    pub general: Option<GeneralDeviceCapabilities>,
    /// Highest entry of the transmit power table
    pub max_transmit_power: Option<TransmitPowerLevel>,
}

impl ReaderCapabilities {
    pub fn decode(params_body: Bytes) -> Result<Self> {
        let mut caps = Self::default();

        for param in ParamReader::new(params_body) {
            let param = param?;
            match param.param_type {
                params::GENERAL_DEVICE_CAPABILITIES => {
                    caps.general = Some(GeneralDeviceCapabilities::decode(param.value)?);
                }
                params::REGULATORY_CAPABILITIES => {
                    caps.max_transmit_power = last_power_entry(&param)?;
                }
                _ => {}
            }
        }

        Ok(caps)
    }
}

fn last_power_entry(regulatory: &Param) -> Result<Option<TransmitPowerLevel>> {
    // CountryCode u16, CommunicationsStandard u16, then sub-parameters
    let mut last = None;
    for band in regulatory.children(4)? {
        let band = band?;
        if !band.is_tlv(params::UHF_BAND_CAPABILITIES) {
            continue;
        }
        for entry in band.children(0)? {
            let entry = entry?;
            if entry.is_tlv(params::TRANSMIT_POWER_LEVEL_TABLE_ENTRY) {
                let mut v = entry.value;
                ensure(&v, 4, params::TRANSMIT_POWER_LEVEL_TABLE_ENTRY)?;
                last = Some(TransmitPowerLevel {
                    index: v.get_u16(),
                    value: v.get_i16(),
                });
            }
        }
    }
    Ok(last)
}

/// AntennaConfiguration parameter with its RFTransmitter settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntennaConfiguration {
    pub antenna_id: u16,
    pub hop_table_id: Option<u16>,
    pub channel_index: Option<u16>,
    pub transmit_power: Option<u16>,
}

/// Parameters of a GET_READER_CONFIG_RESPONSE following its status
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReaderConfiguration {
    pub antennas: Vec<AntennaConfiguration>,
}

impl ReaderConfiguration {
    pub fn decode(params_body: Bytes) -> Result<Self> {
        let mut config = Self::default();

        for param in ParamReader::new(params_body) {
            let param = param?;
            if !param.is_tlv(params::ANTENNA_CONFIGURATION) {
                continue;
            }

            let mut head = param.value.clone();
            ensure(&head, 2, params::ANTENNA_CONFIGURATION)?;
            let mut antenna = AntennaConfiguration {
                antenna_id: head.get_u16(),
                ..Default::default()
            };

            for child in param.children(2)? {
                let child = child?;
                if child.is_tlv(params::RF_TRANSMITTER) {
                    let mut v = child.value;
                    ensure(&v, 6, params::RF_TRANSMITTER)?;
                    antenna.hop_table_id = Some(v.get_u16());
                    antenna.channel_index = Some(v.get_u16());
                    antenna.transmit_power = Some(v.get_u16());
                }
            }

            config.antennas.push(antenna);
        }

        Ok(config)
    }
}
