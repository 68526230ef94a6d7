//! Length-encoded integers and strings.

use bytes::{Buf, BufMut, BytesMut};

/// Marker byte for a NULL cell in a text-protocol row.
pub const NULL_MARKER: u8 = 0xFB;

/// Read a length-encoded integer, advancing `buf`.
pub fn read_int(buf: &mut &[u8]) -> Option<u64> {
    let first = *buf.first()?;
    let width = match first {
        0..=0xFA => {
            buf.advance(1);
            return Some(first as u64);
        }
        0xFC => 2,
        0xFD => 3,
        0xFE => 8,
        _ => return None,
    };
    if buf.len() < 1 + width {
        return None;
    }
    let mut bytes = [0u8; 8];
    bytes[..width].copy_from_slice(&buf[1..1 + width]);
    buf.advance(1 + width);
    Some(u64::from_le_bytes(bytes))
}

/// Read a length-encoded byte string, advancing `buf`.
///
/// Returns `Some(None)` for the NULL marker.
pub fn read_bytes<'a>(buf: &mut &'a [u8]) -> Option<Option<&'a [u8]>> {
    if buf.first() == Some(&NULL_MARKER) {
        buf.advance(1);
        return Some(None);
    }
    let len = usize::try_from(read_int(buf)?).ok()?;
    let slice: &'a [u8] = *buf;
    if slice.len() < len {
        return None;
    }
    let (value, rest) = slice.split_at(len);
    *buf = rest;
    Some(Some(value))
}

/// Write a length-encoded integer
pub fn write_int(buf: &mut BytesMut, value: u64) {
    if value < 251 {
        buf.put_u8(value as u8);
    } else if value < 1 << 16 {
        buf.put_u8(0xFC);
        buf.put_u16_le(value as u16);
    } else if value < 1 << 24 {
        buf.put_u8(0xFD);
        buf.put_u8((value & 0xFF) as u8);
        buf.put_u8(((value >> 8) & 0xFF) as u8);
        buf.put_u8(((value >> 16) & 0xFF) as u8);
    } else {
        buf.put_u8(0xFE);
        buf.put_u64_le(value);
    }
}

/// Write a length-encoded string, or the NULL marker for `None`
pub fn write_bytes(buf: &mut BytesMut, value: Option<&[u8]>) {
    match value {
        Some(bytes) => {
            write_int(buf, bytes.len() as u64);
            buf.extend_from_slice(bytes);
        }
        None => buf.put_u8(NULL_MARKER),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_widths() {
        for value in [0u64, 250, 251, 65_535, 65_536, 16_777_215, 16_777_216, u64::MAX] {
            let mut buf = BytesMut::new();
            write_int(&mut buf, value);
            let mut slice = &buf[..];
            assert_eq!(read_int(&mut slice), Some(value));
            assert!(slice.is_empty());
        }
    }

    #[test]
    fn test_truncated_int() {
        let mut slice: &[u8] = &[0xFC, 0x01];
        assert_eq!(read_int(&mut slice), None);
        let mut slice: &[u8] = &[0xFF];
        assert_eq!(read_int(&mut slice), None);
    }

    #[test]
    fn test_bytes_and_null() {
        let mut buf = BytesMut::new();
        write_bytes(&mut buf, Some(b"Yes"));
        write_bytes(&mut buf, None);
        write_bytes(&mut buf, Some(b""));

        let mut slice = &buf[..];
        assert_eq!(read_bytes(&mut slice), Some(Some(&b"Yes"[..])));
        assert_eq!(read_bytes(&mut slice), Some(None));
        assert_eq!(read_bytes(&mut slice), Some(Some(&b""[..])));
        assert_eq!(read_bytes(&mut slice), None);
    }
}
