//! Little-endian base-128 variable-length integers.
//!
//! Unsigned values are written 7 bits at a time, low bits first, with the high bit of each byte
//! set when more bytes follow. Signed values are zig-zag mapped first so that small negative
//! numbers stay short.

use byteorder::ReadBytesExt;

use crate::error::{Error, Result};

/// The longest possible encoding of a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

/// The longest possible encoding of a 32-bit value.
pub const MAX_VARINT32_LEN: usize = 5;

#[inline]
pub fn zigzag(x: i64) -> u64 {
    ((x << 1) ^ (x >> 63)) as u64
}

#[inline]
pub fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

pub fn write_uvarint(buf: &mut Vec<u8>, mut x: u64) {
    while x >= 0x80 {
        buf.push((x as u8) | 0x80);
        x >>= 7;
    }
    buf.push(x as u8);
}

pub fn write_varint(buf: &mut Vec<u8>, x: i64) {
    write_uvarint(buf, zigzag(x))
}

/// Read an unsigned varint, advancing the slice past it.
pub fn read_uvarint(buf: &mut &[u8]) -> Result<u64> {
    read_uvarint_n(buf, MAX_VARINT_LEN)
}

/// Read an unsigned varint that must terminate within `max_len` bytes.
///
/// `max_len` is at most [`MAX_VARINT_LEN`]. Range checks narrower than 64 bits are left to the
/// caller.
pub fn read_uvarint_n(buf: &mut &[u8], max_len: usize) -> Result<u64> {
    let max_len = max_len.min(MAX_VARINT_LEN);
    let mut x = 0u64;
    let mut shift = 0u32;
    for i in 0..max_len {
        let b = buf.read_u8().map_err(|_| Error::LengthTooShort {
            step: "decode uvarint",
            actual: i,
            expected: i + 1,
        })?;
        if b < 0x80 {
            if i == MAX_VARINT_LEN - 1 && b > 1 {
                return Err(Error::BadEncode(String::from(
                    "uvarint overflows a 64-bit integer",
                )));
            }
            return Ok(x | ((b as u64) << shift));
        }
        x |= ((b & 0x7f) as u64) << shift;
        shift += 7;
    }
    Err(Error::BadEncode(format!(
        "uvarint didn't terminate within {} bytes",
        max_len
    )))
}

pub fn read_varint(buf: &mut &[u8]) -> Result<i64> {
    read_uvarint(buf).map(unzigzag)
}

pub fn read_uvarint32(buf: &mut &[u8]) -> Result<u32> {
    let v = read_uvarint_n(buf, MAX_VARINT32_LEN)?;
    u32::try_from(v).map_err(|_| Error::BadEncode(format!("uvarint {} doesn't fit in a u32", v)))
}

pub fn read_varint32(buf: &mut &[u8]) -> Result<i32> {
    let v = unzigzag(read_uvarint_n(buf, MAX_VARINT32_LEN)?);
    i32::try_from(v).map_err(|_| Error::BadEncode(format!("varint {} doesn't fit in an i32", v)))
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;

    fn uvarint_bytes(x: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_uvarint(&mut buf, x);
        buf
    }

    fn varint_bytes(x: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_varint(&mut buf, x);
        buf
    }

    #[test]
    fn wire_unsigned() {
        assert_eq!(uvarint_bytes(0), &[0x00]);
        assert_eq!(uvarint_bytes(1), &[0x01]);
        assert_eq!(uvarint_bytes(127), &[0x7f]);
        assert_eq!(uvarint_bytes(128), &[0x80, 0x01]);
        assert_eq!(uvarint_bytes(300), &[0xac, 0x02]);
        assert_eq!(uvarint_bytes(u64::MAX).len(), MAX_VARINT_LEN);
    }

    #[test]
    fn wire_signed() {
        assert_eq!(varint_bytes(0), &[0x00]);
        assert_eq!(varint_bytes(-1), &[0x01]);
        assert_eq!(varint_bytes(1), &[0x02]);
        assert_eq!(varint_bytes(63), &[0x7e]);
        assert_eq!(varint_bytes(-64), &[0x7f]);
        assert_eq!(varint_bytes(64), &[0x80, 0x01]);
        assert_eq!(varint_bytes(-65), &[0x81, 0x01]);
    }

    #[test]
    fn zigzag_extremes() {
        assert_eq!(zigzag(i64::MAX), u64::MAX - 1);
        assert_eq!(zigzag(i64::MIN), u64::MAX);
        assert_eq!(unzigzag(u64::MAX), i64::MIN);
    }

    #[test]
    fn roundtrip_unsigned_boundaries() {
        let mut cases = vec![0u64, 1, u64::MAX, u64::MAX - 1];
        for s in 1..64 {
            let edge = 1u64 << s;
            cases.extend_from_slice(&[edge - 1, edge, edge + 1]);
        }
        for case in cases {
            let enc = uvarint_bytes(case);
            let mut slice = &enc[..];
            assert_eq!(read_uvarint(&mut slice).unwrap(), case);
            assert!(slice.is_empty(), "{} left trailing bytes", case);
        }
    }

    #[test]
    fn roundtrip_signed_boundaries() {
        let cases = [
            0i64,
            -1,
            1,
            -64,
            63,
            64,
            -65,
            i32::MIN as i64,
            i32::MAX as i64,
            i64::MIN,
            i64::MAX,
        ];
        for &case in cases.iter() {
            let enc = varint_bytes(case);
            let mut slice = &enc[..];
            assert_eq!(read_varint(&mut slice).unwrap(), case);
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn roundtrip_random() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let u: u64 = rng.gen();
            let i: i64 = rng.gen();
            let enc = uvarint_bytes(u);
            assert_eq!(read_uvarint(&mut &enc[..]).unwrap(), u);
            let enc = varint_bytes(i);
            assert_eq!(read_varint(&mut &enc[..]).unwrap(), i);
        }
    }

    #[test]
    fn roundtrip_narrow() {
        for &case in [i32::MIN, -1, 0, 1, i32::MAX].iter() {
            let enc = varint_bytes(case as i64);
            assert_eq!(read_varint32(&mut &enc[..]).unwrap(), case);
        }
        for &case in [0u32, 1, 128, u32::MAX].iter() {
            let enc = uvarint_bytes(case as u64);
            assert_eq!(read_uvarint32(&mut &enc[..]).unwrap(), case);
        }
    }

    #[test]
    fn narrow_overflow() {
        let enc = uvarint_bytes(u32::MAX as u64 + 1);
        assert!(read_uvarint32(&mut &enc[..]).is_err());
        let enc = varint_bytes(i32::MIN as i64 - 1);
        assert!(read_varint32(&mut &enc[..]).is_err());
    }

    #[test]
    fn narrow_never_terminates() {
        let data = [0x80u8, 0x80, 0x80, 0x80, 0x80, 0x80, 0x00];
        match read_uvarint32(&mut &data[..]) {
            Err(Error::BadEncode(_)) => (),
            other => panic!("expected overlong error, got {:?}", other),
        }
        let mut data = vec![0x81u8];
        data.extend_from_slice(&[0x80; 8]);
        data.push(0x00);
        match read_varint32(&mut &data[..]) {
            Err(Error::BadEncode(_)) => (),
            other => panic!("expected overlong error, got {:?}", other),
        }
        // Five bytes is still a valid 32-bit encoding.
        let data = [0x80u8, 0x80, 0x80, 0x80, 0x00];
        assert_eq!(read_uvarint32(&mut &data[..]).unwrap(), 0);
        assert_eq!(uvarint_bytes(u32::MAX as u64).len(), MAX_VARINT32_LEN);
        assert_eq!(varint_bytes(i32::MIN as i64).len(), MAX_VARINT32_LEN);
    }

    #[test]
    fn never_terminates() {
        let data = [0xffu8; 11];
        match read_uvarint(&mut &data[..]) {
            Err(Error::BadEncode(_)) => (),
            other => panic!("expected overflow error, got {:?}", other),
        }
    }

    #[test]
    fn tenth_byte_overflow() {
        let mut data = vec![0xffu8; 9];
        data.push(0x02);
        assert!(read_uvarint(&mut &data[..]).is_err());
        data[9] = 0x01;
        assert_eq!(read_uvarint(&mut &data[..]).unwrap(), u64::MAX);
    }

    #[test]
    fn truncated() {
        let data = [0x80u8, 0x80];
        match read_uvarint(&mut &data[..]) {
            Err(Error::LengthTooShort { actual, .. }) => assert_eq!(actual, 2),
            other => panic!("expected truncation error, got {:?}", other),
        }
        assert!(read_uvarint(&mut &[][..]).is_err());
    }
}
