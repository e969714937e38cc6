//! Helpers for explicit network byte-order conversions.
//!
//! The classic protocol encodes every multi-byte integer big-endian. These
//! helpers keep Clippy expectations scoped to the conversion points so packet
//! readers and writers stay explicit about wire endianness without repeating
//! lint annotations.

/// Serialise a `u16` in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use classicwire::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x1234), [0x12, 0x34]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use classicwire::byte_order::read_network_u16;
///
/// assert_eq!(read_network_u16([0x12, 0x34]), 0x1234);
/// ```
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    u16::from_be_bytes(bytes)
}

/// Serialise an `i16` in network byte order. Block coordinates and entry
/// counts travel as signed shorts.
///
/// # Examples
///
/// ```
/// use classicwire::byte_order::write_network_i16;
///
/// assert_eq!(write_network_i16(-2), [0xFF, 0xFE]);
/// ```
#[must_use]
pub fn write_network_i16(value: i16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `i16`.
///
/// # Examples
///
/// ```
/// use classicwire::byte_order::read_network_i16;
///
/// assert_eq!(read_network_i16([0xFF, 0xFE]), -2);
/// ```
#[must_use]
pub fn read_network_i16(bytes: [u8; 2]) -> i16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    i16::from_be_bytes(bytes)
}

/// Serialise an `i32` in network byte order.
///
/// # Examples
///
/// ```
/// use classicwire::byte_order::write_network_i32;
///
/// assert_eq!(write_network_i32(0x0102_0304), [0x01, 0x02, 0x03, 0x04]);
/// ```
#[must_use]
pub fn write_network_i32(value: i32) -> [u8; 4] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `i32`.
///
/// # Examples
///
/// ```
/// use classicwire::byte_order::read_network_i32;
///
/// assert_eq!(read_network_i32([0x01, 0x02, 0x03, 0x04]), 0x0102_0304);
/// ```
#[must_use]
pub fn read_network_i32(bytes: [u8; 4]) -> i32 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Network byte order requires big-endian bytes."
    )]
    i32::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    //! Tests for the network byte-order helpers.

    use rstest::rstest;

    use super::{
        read_network_i16,
        read_network_i32,
        read_network_u16,
        write_network_i16,
        write_network_i32,
        write_network_u16,
    };

    #[rstest]
    #[case::u16_max(&write_network_u16(u16::MAX)[..], &[0xFF, 0xFF])]
    #[case::i16_min(&write_network_i16(i16::MIN)[..], &[0x80, 0x00])]
    #[case::i32_negative(&write_network_i32(-1)[..], &[0xFF, 0xFF, 0xFF, 0xFF])]
    fn writes_most_significant_byte_first(#[case] written: &[u8], #[case] expected: &[u8]) {
        assert_eq!(written, expected);
    }

    #[test]
    fn signed_and_unsigned_views_agree_on_bit_pattern() {
        let raw = [0x80, 0x01];
        assert_eq!(read_network_u16(raw), 0x8001);
        assert_eq!(read_network_i16(raw), i16::from_ne_bytes(0x8001u16.to_ne_bytes()));
        assert_eq!(read_network_i32([0x80, 0, 0, 0]), i32::MIN);
    }
}
