//! Helpers for explicit little-endian byte-order conversions.
//!
//! Every integer on the packetlink wire is little-endian. Keeping the
//! conversions here gives the frame header and the message codec a single
//! place that states the wire endianness.

/// Serialise a `u16` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::write_wire_u16;
///
/// assert_eq!(write_wire_u16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub const fn write_wire_u16(value: u16) -> [u8; 2] { value.to_le_bytes() }

/// Parse a wire-order `u16`.
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::read_wire_u16;
///
/// assert_eq!(read_wire_u16([0x34, 0x12]), 0x1234);
/// ```
#[must_use]
pub const fn read_wire_u16(bytes: [u8; 2]) -> u16 { u16::from_le_bytes(bytes) }

/// Serialise a `u32` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::write_wire_u32;
///
/// assert_eq!(write_wire_u32(0x1234_5678), [0x78, 0x56, 0x34, 0x12]);
/// ```
#[must_use]
pub const fn write_wire_u32(value: u32) -> [u8; 4] { value.to_le_bytes() }

/// Parse a wire-order `u32`.
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::read_wire_u32;
///
/// assert_eq!(read_wire_u32([0x78, 0x56, 0x34, 0x12]), 0x1234_5678);
/// ```
#[must_use]
pub const fn read_wire_u32(bytes: [u8; 4]) -> u32 { u32::from_le_bytes(bytes) }

/// Serialise a `u64` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::write_wire_u64;
///
/// assert_eq!(
///     write_wire_u64(0x1122_3344_5566_7788),
///     [0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]
/// );
/// ```
#[must_use]
pub const fn write_wire_u64(value: u64) -> [u8; 8] { value.to_le_bytes() }

/// Parse a wire-order `u64`.
///
/// # Examples
///
/// ```
/// use packetlink::byte_order::read_wire_u64;
///
/// assert_eq!(
///     read_wire_u64([0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11]),
///     0x1122_3344_5566_7788
/// );
/// ```
#[must_use]
pub const fn read_wire_u64(bytes: [u8; 8]) -> u64 { u64::from_le_bytes(bytes) }

#[cfg(test)]
mod tests {
    //! Byte-level checks for the wire-order helpers.

    use rstest::rstest;

    use super::{
        read_wire_u16,
        read_wire_u32,
        read_wire_u64,
        write_wire_u16,
        write_wire_u32,
        write_wire_u64,
    };

    /// Each write/read pair agrees on the least-significant-byte-first layout.
    #[rstest]
    #[case::u16(
        0x1234u64,
        &write_wire_u16(0x1234)[..],
        &[0x34, 0x12],
        u64::from(read_wire_u16([0x34, 0x12]))
    )]
    #[case::u32(
        0x1234_5678u64,
        &write_wire_u32(0x1234_5678)[..],
        &[0x78, 0x56, 0x34, 0x12],
        u64::from(read_wire_u32([0x78, 0x56, 0x34, 0x12]))
    )]
    #[case::u64(
        0x1122_3344_5566_7788u64,
        &write_wire_u64(0x1122_3344_5566_7788)[..],
        &[0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11],
        read_wire_u64([0x88, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22, 0x11])
    )]
    fn wire_byte_order_is_little_endian(
        #[case] value: u64,
        #[case] written: &[u8],
        #[case] expected_bytes: &[u8],
        #[case] read_back: u64,
    ) {
        assert_eq!(written, expected_bytes);
        assert_eq!(read_back, value);
    }
}
