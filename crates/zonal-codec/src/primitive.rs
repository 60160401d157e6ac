//! # Primitive Codecs
//!
//! Fixed-width big-endian integers, quantized offsets, and the quarter-hour
//! instant form used by rule-based models.
//!
//! ## Offset Encoding
//!
//! Nearly every UTC offset in the tz database is a multiple of 15 minutes.
//! Such an offset is stored as one signed byte counting quarter hours; any
//! other offset pays an escape byte plus the full `i32`:
//!
//! | Offset | Bytes |
//! |--------|-------|
//! | `+7200` | `08` |
//! | `-18000` | `EC` |
//! | `+12345` | `7F 00 00 30 39` |
//!
//! The quotient `127` collides with the escape byte and therefore also takes
//! the escape path.

use std::io::{Read, Write};

use crate::wire::{INSTANT_ESCAPE, OFFSET_ESCAPE, POSIX_TIME_1825, QUARTERS_IN_24_BITS, QUARTER_HOUR};

// ---------------------------------------------------------------------------
// Fixed-width integers
// ---------------------------------------------------------------------------

pub(crate) fn read_u8<R: Read + ?Sized>(input: &mut R) -> std::io::Result<u8> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub(crate) fn read_i8<R: Read + ?Sized>(input: &mut R) -> std::io::Result<i8> {
    let mut buf = [0u8; 1];
    input.read_exact(&mut buf)?;
    Ok(i8::from_be_bytes(buf))
}

pub(crate) fn read_i32<R: Read + ?Sized>(input: &mut R) -> std::io::Result<i32> {
    let mut buf = [0u8; 4];
    input.read_exact(&mut buf)?;
    Ok(i32::from_be_bytes(buf))
}

pub(crate) fn read_i64<R: Read + ?Sized>(input: &mut R) -> std::io::Result<i64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(i64::from_be_bytes(buf))
}

pub(crate) fn write_u8<W: Write + ?Sized>(out: &mut W, value: u8) -> std::io::Result<()> {
    out.write_all(&[value])
}

pub(crate) fn write_i8<W: Write + ?Sized>(out: &mut W, value: i8) -> std::io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

pub(crate) fn write_i32<W: Write + ?Sized>(out: &mut W, value: i32) -> std::io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

pub(crate) fn write_i64<W: Write + ?Sized>(out: &mut W, value: i64) -> std::io::Result<()> {
    out.write_all(&value.to_be_bytes())
}

// ---------------------------------------------------------------------------
// Offsets
// ---------------------------------------------------------------------------

/// Write an offset in seconds: one byte when quarter-hour aligned, else
/// `0x7F` followed by the `i32`.
pub fn write_offset<W: Write + ?Sized>(out: &mut W, offset: i32) -> std::io::Result<()> {
    if offset % QUARTER_HOUR == 0 {
        if let Ok(quarters) = i8::try_from(offset / QUARTER_HOUR) {
            if quarters != OFFSET_ESCAPE {
                return write_i8(out, quarters);
            }
        }
    }
    write_i8(out, OFFSET_ESCAPE)?;
    write_i32(out, offset)
}

/// Read an offset written by [`write_offset`].
pub fn read_offset<R: Read + ?Sized>(input: &mut R) -> std::io::Result<i32> {
    let quarters = read_i8(input)?;
    if quarters == OFFSET_ESCAPE {
        read_i32(input)
    } else {
        Ok(i32::from(quarters) * QUARTER_HOUR)
    }
}

// ---------------------------------------------------------------------------
// Quarter-hour instants
// ---------------------------------------------------------------------------

/// Write an instant as a 24-bit count of quarter hours since 1825 when it is
/// aligned and in range, else as `0xFF` followed by the `i64`.
pub fn write_quarter_instant<W: Write + ?Sized>(out: &mut W, posix_time: i64) -> std::io::Result<()> {
    let quarter = i64::from(QUARTER_HOUR);
    let since_epoch = posix_time.checked_sub(POSIX_TIME_1825);

    match since_epoch {
        Some(delta) if (0..QUARTERS_IN_24_BITS).contains(&delta) && posix_time % quarter == 0 => {
            let index = delta / quarter;
            out.write_all(&[
                ((index >> 16) & 0xFF) as u8,
                ((index >> 8) & 0xFF) as u8,
                (index & 0xFF) as u8,
            ])
        }
        _ => {
            write_u8(out, INSTANT_ESCAPE)?;
            write_i64(out, posix_time)
        }
    }
}

/// Read an instant written by [`write_quarter_instant`].
pub fn read_quarter_instant<R: Read + ?Sized>(input: &mut R) -> std::io::Result<i64> {
    let high = read_u8(input)?;
    if high == INSTANT_ESCAPE {
        return read_i64(input);
    }
    let mid = read_u8(input)?;
    let low = read_u8(input)?;
    let index = (i64::from(high) << 16) | (i64::from(mid) << 8) | i64::from(low);
    Ok(POSIX_TIME_1825 + index * i64::from(QUARTER_HOUR))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_bytes(offset: i32) -> Vec<u8> {
        let mut out = Vec::new();
        write_offset(&mut out, offset).unwrap();
        out
    }

    fn instant_bytes(posix: i64) -> Vec<u8> {
        let mut out = Vec::new();
        write_quarter_instant(&mut out, posix).unwrap();
        out
    }

    // ---- offsets ----

    #[test]
    fn test_aligned_offset_is_one_byte() {
        assert_eq!(offset_bytes(7200), vec![8]);
        assert_eq!(offset_bytes(0), vec![0]);
        assert_eq!(offset_bytes(-18_000), vec![0xEC]);
        assert_eq!(offset_bytes(19_800), vec![22]); // +05:30
        assert_eq!(offset_bytes(20_700), vec![23]); // +05:45
    }

    #[test]
    fn test_unaligned_offset_is_escaped() {
        assert_eq!(offset_bytes(12_345), vec![0x7F, 0x00, 0x00, 0x30, 0x39]);
        // LMT of Amsterdam: +00:19:32
        assert_eq!(offset_bytes(1172), vec![0x7F, 0x00, 0x00, 0x04, 0x94]);
        assert_eq!(offset_bytes(-1), vec![0x7F, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_quotient_colliding_with_escape() {
        // 127 quarters would read back as the escape byte.
        assert_eq!(offset_bytes(127 * 900).len(), 5);
        assert_eq!(offset_bytes(126 * 900), vec![126]);
        assert_eq!(offset_bytes(-128 * 900), vec![0x80]);
        assert_eq!(offset_bytes(-129 * 900).len(), 5);
    }

    #[test]
    fn test_offset_read_back() {
        for offset in [0, 3600, -3600, 12_345, 127 * 900, -129 * 900, i32::MIN, i32::MAX] {
            let bytes = offset_bytes(offset);
            assert_eq!(read_offset(&mut bytes.as_slice()).unwrap(), offset);
        }
    }

    #[test]
    fn test_truncated_offset_is_io_error() {
        let bytes = [0x7F, 0x00];
        let err = read_offset(&mut &bytes[..]).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }

    // ---- quarter instants ----

    #[test]
    fn test_epoch_is_index_zero() {
        assert_eq!(instant_bytes(POSIX_TIME_1825), vec![0, 0, 0]);
    }

    #[test]
    fn test_unix_epoch_index() {
        // 52960 days * 96 quarters = 5084160 = 0x4D9400
        assert_eq!(instant_bytes(0), vec![0x4D, 0x94, 0x00]);
        assert_eq!(read_quarter_instant(&mut &[0x4D, 0x94, 0x00][..]).unwrap(), 0);
    }

    #[test]
    fn test_instant_escapes() {
        // Before 1825.
        let early = POSIX_TIME_1825 - 900;
        assert_eq!(instant_bytes(early)[0], INSTANT_ESCAPE);
        assert_eq!(instant_bytes(early).len(), 9);
        // Not quarter aligned.
        assert_eq!(instant_bytes(1).len(), 9);
        // Past the 24-bit range.
        assert_eq!(instant_bytes(POSIX_TIME_1825 + QUARTERS_IN_24_BITS + 1).len(), 9);
        // Extremes do not overflow.
        assert_eq!(instant_bytes(i64::MIN).len(), 9);
        assert_eq!(instant_bytes(i64::MAX).len(), 9);
    }

    #[test]
    fn test_last_compact_instant() {
        let last = POSIX_TIME_1825 + (QUARTERS_IN_24_BITS - 1) / 900 * 900;
        let bytes = instant_bytes(last);
        assert_eq!(bytes.len(), 3);
        assert_ne!(bytes[0], INSTANT_ESCAPE);
        assert_eq!(read_quarter_instant(&mut bytes.as_slice()).unwrap(), last);
    }
}
