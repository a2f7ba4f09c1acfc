//! RO_ACCESS_REPORT and TagReportData decoding

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::constants::{impinj, params, tv, IMPINJ_VENDOR_ID};
use crate::error::{Error, Result};
use crate::param::{ensure, Encoding, Param, ParamReader};

/// Vendor-specific Custom parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomParam {
    pub vendor_id: u32,
    pub subtype: u32,
    pub data: Bytes,
}

impl CustomParam {
    pub fn decode(mut value: Bytes) -> Result<Self> {
        ensure(&value, 8, params::CUSTOM)?;
        let vendor_id = value.get_u32();
        let subtype = value.get_u32();
        Ok(Self {
            vendor_id,
            subtype,
            data: value,
        })
    }
}

/// Raw fields of one TagReportData parameter
///
/// Values are exactly as the reader sent them; which fields are present
/// depends on the report content selected in the ROSpec.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagReport {
    /// EPC bytes
    pub epc: Bytes,
    pub rospec_id: Option<u32>,
    pub antenna_id: Option<u16>,
    /// Standard PeakRSSI in whole dBm
    pub peak_rssi: Option<i8>,
    pub channel_index: Option<u16>,
    /// Microseconds since the Unix epoch
    pub first_seen_utc: Option<u64>,
    /// Microseconds since the Unix epoch
    pub last_seen_utc: Option<u64>,
    pub tag_seen_count: Option<u16>,
    /// Impinj RF phase angle, 0..4095 over one turn
    pub phase_angle: Option<u16>,
    /// Impinj peak RSSI in dBm x 100
    pub impinj_peak_rssi: Option<i16>,
    /// Impinj Doppler frequency in Hz x 16
    pub doppler_frequency: Option<i16>,
    /// Custom parameters from vendors other than Impinj
    pub foreign_customs: Vec<CustomParam>,
}

impl TagReport {
    /// Decode from the value bytes of a TagReportData TLV
    pub fn decode(value: Bytes) -> Result<Self> {
        let mut report = Self::default();
        let mut epc = None;

        for param in ParamReader::new(value) {
            let param = param?;
            let mut v = param.value;

            match param.encoding {
                Encoding::Tv => match param.param_type as u8 {
                    tv::EPC_96 => epc = Some(v),
                    tv::ROSPEC_ID => report.rospec_id = Some(v.get_u32()),
                    tv::ANTENNA_ID => report.antenna_id = Some(v.get_u16()),
                    tv::PEAK_RSSI => report.peak_rssi = Some(v.get_i8()),
                    tv::CHANNEL_INDEX => report.channel_index = Some(v.get_u16()),
                    tv::FIRST_SEEN_TIMESTAMP_UTC => report.first_seen_utc = Some(v.get_u64()),
                    tv::LAST_SEEN_TIMESTAMP_UTC => report.last_seen_utc = Some(v.get_u64()),
                    tv::TAG_SEEN_COUNT => report.tag_seen_count = Some(v.get_u16()),
                    other => trace!("Skipping TV parameter {} in tag report", other),
                },
                Encoding::Tlv => match param.param_type {
                    params::EPC_DATA => {
                        ensure(&v, 2, params::EPC_DATA)?;
                        let bits = v.get_u16() as usize;
                        let len = bits.div_ceil(8);
                        ensure(&v, len, params::EPC_DATA)?;
                        epc = Some(v.split_to(len));
                    }
                    params::CUSTOM => report.apply_custom(CustomParam::decode(v)?)?,
                    other => trace!("Skipping parameter {} in tag report", other),
                },
            }
        }

        report.epc = epc.ok_or(Error::MissingParameter("EPCData"))?;
        Ok(report)
    }

    fn apply_custom(&mut self, custom: CustomParam) -> Result<()> {
        if custom.vendor_id != IMPINJ_VENDOR_ID {
            self.foreign_customs.push(custom);
            return Ok(());
        }

        let mut data = custom.data;
        match custom.subtype {
            impinj::RF_PHASE_ANGLE => {
                ensure(&data, 2, params::CUSTOM)?;
                self.phase_angle = Some(data.get_u16());
            }
            impinj::PEAK_RSSI => {
                ensure(&data, 2, params::CUSTOM)?;
                self.impinj_peak_rssi = Some(data.get_i16());
            }
            impinj::RF_DOPPLER_FREQUENCY => {
                ensure(&data, 2, params::CUSTOM)?;
                self.doppler_frequency = Some(data.get_i16());
            }
            other => trace!("Skipping Impinj custom subtype {} in tag report", other),
        }
        Ok(())
    }

    /// EPC as lowercase hex
    pub fn epc_hex(&self) -> String {
        hex::encode(&self.epc)
    }
}

/// Decoded RO_ACCESS_REPORT
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoAccessReport {
    /// Tag records in wire order
    pub tag_reports: Vec<TagReport>,
    /// Custom parameters at report level
    pub customs: Vec<CustomParam>,
    /// TagReportData parameters that failed to decode
    pub rejected: Vec<String>,
}

impl RoAccessReport {
    /// Decode an RO_ACCESS_REPORT body
    ///
    /// A malformed TagReportData is recorded in `rejected` and skipped, so
    /// one bad record does not hide the good ones around it.
    pub fn decode(body: Bytes) -> Result<Self> {
        let mut report = Self::default();

        for param in ParamReader::new(body) {
            let param: Param = param?;
            if param.is_tlv(params::TAG_REPORT_DATA) {
                match TagReport::decode(param.value) {
                    Ok(tag) => report.tag_reports.push(tag),
                    Err(e) => report.rejected.push(e.to_string()),
                }
            } else if param.is_tlv(params::CUSTOM) {
                report.customs.push(CustomParam::decode(param.value)?);
            } else {
                trace!("Skipping parameter {} in RO_ACCESS_REPORT", param.param_type);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{put_tlv, put_tv};
    use bytes::{BufMut, BytesMut};
    use pretty_assertions::assert_eq;

    fn impinj_custom(buf: &mut BytesMut, subtype: u32, value: &[u8]) {
        let mut v = BytesMut::new();
        v.put_u32(IMPINJ_VENDOR_ID);
        v.put_u32(subtype);
        v.put_slice(value);
        put_tlv(buf, params::CUSTOM, &v);
    }

    fn tag_report_data(epc: &[u8], antenna: u16) -> BytesMut {
        let mut inner = BytesMut::new();
        put_tv(&mut inner, tv::EPC_96, epc);
        put_tv(&mut inner, tv::ANTENNA_ID, &antenna.to_be_bytes());
        put_tv(&mut inner, tv::CHANNEL_INDEX, &7u16.to_be_bytes());
        put_tv(&mut inner, tv::FIRST_SEEN_TIMESTAMP_UTC, &1_700_000_000_000_000u64.to_be_bytes());
        put_tv(&mut inner, tv::TAG_SEEN_COUNT, &3u16.to_be_bytes());
        impinj_custom(&mut inner, impinj::RF_PHASE_ANGLE, &2048u16.to_be_bytes());
        impinj_custom(&mut inner, impinj::PEAK_RSSI, &(-5000i16).to_be_bytes());
        impinj_custom(&mut inner, impinj::RF_DOPPLER_FREQUENCY, &160i16.to_be_bytes());

        let mut outer = BytesMut::new();
        put_tlv(&mut outer, params::TAG_REPORT_DATA, &inner);
        outer
    }

    #[test]
    fn test_decode_tag_report() {
        let epc = [0xE2, 0x00, 0x34, 0x12, 0, 0, 0, 0, 0, 0, 0, 0x01];
        let body = tag_report_data(&epc, 2).freeze();

        let report = RoAccessReport::decode(body).unwrap();
        assert_eq!(report.tag_reports.len(), 1);

        let tag = &report.tag_reports[0];
        assert_eq!(tag.epc.as_ref(), &epc);
        assert_eq!(tag.epc_hex(), "e20034120000000000000001");
        assert_eq!(tag.antenna_id, Some(2));
        assert_eq!(tag.channel_index, Some(7));
        assert_eq!(tag.first_seen_utc, Some(1_700_000_000_000_000));
        assert_eq!(tag.tag_seen_count, Some(3));
        assert_eq!(tag.phase_angle, Some(2048));
        assert_eq!(tag.impinj_peak_rssi, Some(-5000));
        assert_eq!(tag.doppler_frequency, Some(160));
        assert!(tag.foreign_customs.is_empty());
    }

    #[test]
    fn test_epc_data_with_bit_length() {
        let mut inner = BytesMut::new();
        put_tlv(&mut inner, params::EPC_DATA, &[0x00, 0x10, 0xAB, 0xCD]);
        let mut outer = BytesMut::new();
        put_tlv(&mut outer, params::TAG_REPORT_DATA, &inner);

        let report = RoAccessReport::decode(outer.freeze()).unwrap();
        assert_eq!(report.tag_reports[0].epc_hex(), "abcd");
    }

    #[test]
    fn test_records_keep_wire_order() {
        let mut body = tag_report_data(&[1; 12], 1);
        body.extend_from_slice(&tag_report_data(&[2; 12], 2));
        body.extend_from_slice(&tag_report_data(&[3; 12], 3));

        let report = RoAccessReport::decode(body.freeze()).unwrap();
        let antennas: Vec<_> = report.tag_reports.iter().map(|t| t.antenna_id).collect();
        assert_eq!(antennas, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn test_missing_epc_is_rejected_not_fatal() {
        let mut inner = BytesMut::new();
        put_tv(&mut inner, tv::ANTENNA_ID, &[0, 1]);
        let mut body = BytesMut::new();
        put_tlv(&mut body, params::TAG_REPORT_DATA, &inner);
        body.extend_from_slice(&tag_report_data(&[9; 12], 4));

        let report = RoAccessReport::decode(body.freeze()).unwrap();
        assert_eq!(report.tag_reports.len(), 1);
        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].contains("EPCData"));
    }

    #[test]
    fn test_foreign_vendor_custom_kept_aside() {
        let mut inner = BytesMut::new();
        put_tv(&mut inner, tv::EPC_96, &[0; 12]);
        let mut custom = BytesMut::new();
        custom.put_u32(4329);
        custom.put_u32(1);
        put_tlv(&mut inner, params::CUSTOM, &custom);
        let mut body = BytesMut::new();
        put_tlv(&mut body, params::TAG_REPORT_DATA, &inner);

        let report = RoAccessReport::decode(body.freeze()).unwrap();
        assert_eq!(report.tag_reports[0].foreign_customs[0].vendor_id, 4329);
        assert_eq!(report.tag_reports[0].phase_angle, None);
    }

    #[test]
    fn test_unknown_parameters_are_skipped() {
        let mut inner = BytesMut::new();
        put_tv(&mut inner, tv::EPC_96, &[5; 12]);
        put_tv(&mut inner, tv::C1G2_PC, &[0x30, 0x00]);
        put_tlv(&mut inner, 1000, &[1, 2, 3]);
        impinj_custom(&mut inner, 99, &[0xFF]);
        put_tv(&mut inner, tv::ANTENNA_ID, &[0, 2]);
        let mut body = BytesMut::new();
        put_tlv(&mut body, 1001, &[]);
        put_tlv(&mut body, params::TAG_REPORT_DATA, &inner);

        let report = RoAccessReport::decode(body.freeze()).unwrap();
        assert!(report.rejected.is_empty());
        assert!(report.customs.is_empty());
        assert_eq!(report.tag_reports.len(), 1);

        let tag = &report.tag_reports[0];
        assert_eq!(tag.epc.as_ref(), &[5; 12]);
        assert_eq!(tag.antenna_id, Some(2));
        assert_eq!(tag.phase_angle, None);
        assert!(tag.foreign_customs.is_empty());
    }

    #[test]
    fn test_report_level_custom() {
        let mut body = BytesMut::new();
        impinj_custom(&mut body, 99, &[]);

        let report = RoAccessReport::decode(body.freeze()).unwrap();
        assert!(report.tag_reports.is_empty());
        assert_eq!(report.customs.len(), 1);
        assert_eq!(report.customs[0].subtype, 99);
    }
}
