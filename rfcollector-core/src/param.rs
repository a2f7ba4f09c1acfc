//! LLRP parameter encoding
//!
//! Message bodies are sequences of parameters in one of two encodings:
//!
//! ```text
//! TLV:  ┌────────┬────────────┬──────────┬─────────┐
//!       │ 6 rsvd │ 10-bit type│ u16 len  │  value  │   len includes the 4-byte header
//!       └────────┴────────────┴──────────┴─────────┘
//! TV:   ┌───┬────────────┬─────────┐
//!       │ 1 │ 7-bit type │  value  │               value size fixed per type
//!       └───┴────────────┴─────────┘
//! ```

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::constants::tv;
use crate::error::{Error, Result};

/// Parameter encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Tlv,
    Tv,
}

/// One decoded parameter: type and raw value bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub param_type: u16,
    pub encoding: Encoding,
    pub value: Bytes,
}

impl Param {
    /// Check for a TLV parameter of the given type
    pub fn is_tlv(&self, param_type: u16) -> bool {
        self.encoding == Encoding::Tlv && self.param_type == param_type
    }

    /// Check for a TV parameter of the given type
    pub fn is_tv(&self, param_type: u8) -> bool {
        self.encoding == Encoding::Tv && self.param_type == u16::from(param_type)
    }

    /// Iterate over parameters nested inside this one, starting at `offset`
    pub fn children(&self, offset: usize) -> Result<ParamReader> {
        if offset > self.value.len() {
            return Err(Error::ParameterTruncated {
                param_type: self.param_type,
                needed: offset,
                remaining: self.value.len(),
            });
        }
        Ok(ParamReader::new(self.value.slice(offset..)))
    }
}

/// Value size of a TV parameter, `None` for types we cannot size
pub fn tv_value_len(param_type: u8) -> Option<usize> {
    let len = match param_type {
        tv::ANTENNA_ID => 2,
        tv::FIRST_SEEN_TIMESTAMP_UTC
        | tv::FIRST_SEEN_TIMESTAMP_UPTIME
        | tv::LAST_SEEN_TIMESTAMP_UTC
        | tv::LAST_SEEN_TIMESTAMP_UPTIME => 8,
        tv::PEAK_RSSI => 1,
        tv::CHANNEL_INDEX | tv::TAG_SEEN_COUNT => 2,
        tv::ROSPEC_ID => 4,
        tv::INVENTORY_PARAMETER_SPEC_ID | tv::C1G2_CRC | tv::C1G2_PC => 2,
        tv::EPC_96 => 12,
        tv::SPEC_INDEX | tv::CLIENT_REQUEST_OP_SPEC_RESULT => 2,
        tv::ACCESS_SPEC_ID => 4,
        tv::OP_SPEC_ID => 2,
        tv::C1G2_SINGULATION_DETAILS => 4,
        tv::C1G2_XPCW1 | tv::C1G2_XPCW2 => 2,
        _ => return None,
    };
    Some(len)
}

/// Iterator over the parameters of a message body
///
/// Stops after the first error: once a length is wrong the rest of the
/// buffer cannot be interpreted.
#[derive(Debug, Clone)]
pub struct ParamReader {
    buf: Bytes,
}

impl ParamReader {
    pub fn new(buf: Bytes) -> Self {
        Self { buf }
    }

    /// Bytes not consumed yet
    pub fn remaining(&self) -> usize {
        self.buf.len()
    }

    /// Hand back the unread tail
    pub fn into_rest(self) -> Bytes {
        self.buf
    }

    fn read_one(&mut self) -> Result<Param> {
        let first = self.buf[0];

        if first & 0x80 != 0 {
            let param_type = first & 0x7F;
            let len = tv_value_len(param_type).ok_or(Error::UnknownTvParameter(param_type))?;
            if self.buf.len() < 1 + len {
                return Err(Error::ParameterTruncated {
                    param_type: u16::from(param_type),
                    needed: 1 + len,
                    remaining: self.buf.len(),
                });
            }
            self.buf.advance(1);
            return Ok(Param {
                param_type: u16::from(param_type),
                encoding: Encoding::Tv,
                value: self.buf.split_to(len),
            });
        }

        if self.buf.len() < 4 {
            return Err(Error::ParameterTruncated {
                param_type: 0,
                needed: 4,
                remaining: self.buf.len(),
            });
        }

        let mut header = &self.buf[..4];
        let param_type = header.get_u16() & 0x03FF;
        let len = header.get_u16() as usize;
        if len < 4 || len > self.buf.len() {
            return Err(Error::ParameterTruncated {
                param_type,
                needed: len.max(4),
                remaining: self.buf.len(),
            });
        }

        let mut whole = self.buf.split_to(len);
        whole.advance(4);
        Ok(Param {
            param_type,
            encoding: Encoding::Tlv,
            value: whole,
        })
    }
}

impl Iterator for ParamReader {
    type Item = Result<Param>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        let item = self.read_one();
        if item.is_err() {
            self.buf.clear();
        }
        Some(item)
    }
}

/// Append a TLV parameter to `buf`
pub fn put_tlv(buf: &mut BytesMut, param_type: u16, value: &[u8]) {
    buf.put_u16(param_type & 0x03FF);
    buf.put_u16((4 + value.len()) as u16);
    buf.put_slice(value);
}

/// Append a TV parameter to `buf`
pub fn put_tv(buf: &mut BytesMut, param_type: u8, value: &[u8]) {
    buf.put_u8(0x80 | (param_type & 0x7F));
    buf.put_slice(value);
}

/// Read a length-prefixed UTF-8 field (u16 byte count + bytes)
pub(crate) fn get_utf8(buf: &mut Bytes, param_type: u16) -> Result<String> {
    ensure(buf, 2, param_type)?;
    let count = buf.get_u16() as usize;
    ensure(buf, count, param_type)?;
    let raw = buf.split_to(count);
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Fail unless `buf` holds at least `needed` more bytes
pub(crate) fn ensure(buf: &Bytes, needed: usize, param_type: u16) -> Result<()> {
    if buf.len() < needed {
        return Err(Error::ParameterTruncated {
            param_type,
            needed,
            remaining: buf.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_tlv_and_tv() {
        let mut buf = BytesMut::new();
        put_tv(&mut buf, tv::ANTENNA_ID, &[0, 3]);
        put_tlv(&mut buf, 287, &[0, 0, 0, 0]);
        put_tv(&mut buf, tv::PEAK_RSSI, &[0xCE]);

        let params: Vec<Param> = ParamReader::new(buf.freeze())
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(params.len(), 3);
        assert!(params[0].is_tv(tv::ANTENNA_ID));
        assert_eq!(params[0].value.as_ref(), &[0, 3]);
        assert!(params[1].is_tlv(287));
        assert_eq!(params[1].value.len(), 4);
        assert!(params[2].is_tv(tv::PEAK_RSSI));
    }

    #[test]
    fn test_unknown_tv_stops_iteration() {
        let buf = Bytes::from_static(&[0xFF, 1, 2, 3]);
        let mut reader = ParamReader::new(buf);

        assert!(matches!(
            reader.next(),
            Some(Err(Error::UnknownTvParameter(0x7F)))
        ));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_truncated_tlv() {
        // Claims 20 bytes, carries 6
        let buf = Bytes::from_static(&[0x01, 0x1F, 0x00, 0x14, 0, 0]);
        let result: Result<Vec<Param>> = ParamReader::new(buf).collect();

        assert!(matches!(
            result,
            Err(Error::ParameterTruncated { param_type: 287, needed: 20, remaining: 6 })
        ));
    }

    #[test]
    fn test_truncated_tv() {
        let buf = Bytes::from_static(&[0x80 | tv::ROSPEC_ID, 0, 1]);
        let result: Result<Vec<Param>> = ParamReader::new(buf).collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_children() {
        let mut inner = BytesMut::new();
        inner.put_u16(7); // leading field
        put_tv(&mut inner, tv::CHANNEL_INDEX, &[0, 12]);

        let mut outer = BytesMut::new();
        put_tlv(&mut outer, 222, &inner);

        let param = ParamReader::new(outer.freeze()).next().unwrap().unwrap();
        let children: Vec<Param> = param.children(2).unwrap().collect::<Result<_>>().unwrap();

        assert_eq!(children.len(), 1);
        assert!(children[0].is_tv(tv::CHANNEL_INDEX));
        assert!(param.children(10).is_err());
    }

    #[test]
    fn test_get_utf8() {
        let mut buf = Bytes::from_static(&[0, 3, b'a', b'b', b'c', 9]);
        assert_eq!(get_utf8(&mut buf, 1).unwrap(), "abc");
        assert_eq!(buf.len(), 1);

        let mut short = Bytes::from_static(&[0, 5, b'a']);
        assert!(get_utf8(&mut short, 1).is_err());
    }
}
