/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Wire types of the transport: 24-bit integers, opaque identifiers and
//! socket addresses.
//!
//! A socket address starts with a version byte. IPv4 addresses follow with
//! their four octets bit-inverted, so that address-rewriting middleboxes
//! do not recognize them in the payload, and then the port; IPv6
//! addresses follow with their sixteen octets and the port. Ports are in
//! network byte order.
//!
//! The mini codes of these types compress each field separately: the
//! version byte, the inverted IPv4 address as a `u32` and the port as a
//! `u16`, or the two 64-bit halves of an IPv6 address followed by the
//! port.

use core::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

use crate::codes::fixed::{read_int, write_int};
use crate::codes::{MiniRead, MiniWrite};
use crate::traits::*;

/// An unsigned 24-bit integer, written as three bytes, least significant
/// first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
pub struct U24(u32);

impl U24 {
    /// The largest representable value.
    pub const MAX: U24 = U24(0xFF_FFFF);

    /// Panics if `value` does not fit in 24 bits.
    pub fn new(value: u32) -> Self {
        assert!(value <= Self::MAX.0, "{:#x} does not fit in 24 bits", value);
        Self(value)
    }

    /// Returns the value as a `u32`.
    #[inline(always)]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u16> for U24 {
    fn from(value: u16) -> Self {
        Self(value as u32)
    }
}

impl From<U24> for u32 {
    fn from(value: U24) -> Self {
        value.0
    }
}

impl private::Sealed for U24 {}

impl Encodable for U24 {
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        let order = writer.byte_order();
        let mut image = order.image(self.0);
        order.reorder(&mut image, ByteOrder::Little);
        writer.write_bits(&image[..3], 24, true)
    }
}

impl Decodable for U24 {
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let mut image = [0_u8; 4];
        reader.read_bits(&mut image[..3], 24, true);
        let order = reader.byte_order();
        ByteOrder::Little.reorder(&mut image, order);
        Self(order.from_image(image))
    }
}

impl MiniEncodable for U24 {
    #[inline(always)]
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        writer.write_mini(self.0)
    }
}

impl MiniDecodable for U24 {
    /// Panics if the decoded value does not fit in 24 bits.
    #[inline(always)]
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        U24::new(reader.read_mini())
    }
}

/// A 64-bit opaque identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
pub struct Guid(pub u64);

impl Guid {
    /// The identifier of a peer not yet known.
    pub const UNASSIGNED: Guid = Guid(u64::MAX);
}

impl private::Sealed for Guid {}

impl Encodable for Guid {
    #[inline(always)]
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        write_int(writer, self.0)
    }
}

impl Decodable for Guid {
    #[inline(always)]
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        Guid(read_int(reader))
    }
}

impl MiniEncodable for Guid {
    #[inline(always)]
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        writer.write_mini(self.0)
    }
}

impl MiniDecodable for Guid {
    #[inline(always)]
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        Guid(reader.read_mini())
    }
}

const IPV4_TAG: u8 = 4;
const IPV6_TAG: u8 = 6;

fn write_port<W: BitWrite + ?Sized>(writer: &mut W, port: u16) -> usize {
    writer.write_bits(&port.to_be_bytes(), 16, true)
}

fn read_port<R: BitRead + ?Sized>(reader: &mut R) -> u16 {
    let mut port = [0; 2];
    reader.read_bits(&mut port, 16, true);
    u16::from_be_bytes(port)
}

fn write_v4<W: BitWrite + ?Sized>(writer: &mut W, addr: &SocketAddrV4) -> usize {
    let inverted = addr.ip().octets().map(|octet| !octet);
    write_int(writer, IPV4_TAG)
        + writer.write_bits(&inverted, 32, true)
        + write_port(writer, addr.port())
}

fn read_v4_body<R: BitRead + ?Sized>(reader: &mut R) -> SocketAddrV4 {
    let mut octets = [0; 4];
    reader.read_bits(&mut octets, 32, true);
    let ip = Ipv4Addr::from(octets.map(|octet| !octet));
    SocketAddrV4::new(ip, read_port(reader))
}

fn write_v6<W: BitWrite + ?Sized>(writer: &mut W, addr: &SocketAddrV6) -> usize {
    write_int(writer, IPV6_TAG)
        + writer.write_bits(&addr.ip().octets(), 128, true)
        + write_port(writer, addr.port())
}

fn read_v6_body<R: BitRead + ?Sized>(reader: &mut R) -> SocketAddrV6 {
    let mut octets = [0; 16];
    reader.read_bits(&mut octets, 128, true);
    SocketAddrV6::new(Ipv6Addr::from(octets), read_port(reader), 0, 0)
}

fn write_mini_v4<W: BitWrite + ?Sized>(writer: &mut W, addr: &SocketAddrV4) -> usize {
    writer.write_mini(IPV4_TAG)
        + writer.write_mini(!u32::from(*addr.ip()))
        + writer.write_mini(addr.port())
}

fn read_mini_v4_body<R: BitRead + ?Sized>(reader: &mut R) -> SocketAddrV4 {
    let ip = Ipv4Addr::from(!reader.read_mini::<u32>());
    SocketAddrV4::new(ip, reader.read_mini())
}

fn write_mini_v6<W: BitWrite + ?Sized>(writer: &mut W, addr: &SocketAddrV6) -> usize {
    let ip = u128::from(*addr.ip());
    writer.write_mini(IPV6_TAG)
        + writer.write_mini((ip >> 64) as u64)
        + writer.write_mini(ip as u64)
        + writer.write_mini(addr.port())
}

fn read_mini_v6_body<R: BitRead + ?Sized>(reader: &mut R) -> SocketAddrV6 {
    let high = reader.read_mini::<u64>() as u128;
    let low = reader.read_mini::<u64>() as u128;
    let ip = Ipv6Addr::from((high << 64) | low);
    SocketAddrV6::new(ip, reader.read_mini(), 0, 0)
}

impl private::Sealed for SocketAddrV4 {}

impl Encodable for SocketAddrV4 {
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        write_v4(writer, self)
    }
}

impl Decodable for SocketAddrV4 {
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let tag: u8 = read_int(reader);
        assert_eq!(tag, IPV4_TAG, "Expected an IPv4 address, found version tag {}", tag);
        read_v4_body(reader)
    }
}

impl MiniEncodable for SocketAddrV4 {
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        write_mini_v4(writer, self)
    }
}

impl MiniDecodable for SocketAddrV4 {
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let tag: u8 = reader.read_mini();
        assert_eq!(tag, IPV4_TAG, "Expected an IPv4 address, found version tag {}", tag);
        read_mini_v4_body(reader)
    }
}

impl private::Sealed for SocketAddr {}

/// Flow information and scope identifiers of IPv6 addresses are not
/// transmitted.
impl Encodable for SocketAddr {
    fn encode<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        match self {
            SocketAddr::V4(addr) => write_v4(writer, addr),
            SocketAddr::V6(addr) => write_v6(writer, addr),
        }
    }
}

impl Decodable for SocketAddr {
    fn decode<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let tag: u8 = read_int(reader);
        match tag {
            IPV4_TAG => SocketAddr::V4(read_v4_body(reader)),
            IPV6_TAG => SocketAddr::V6(read_v6_body(reader)),
            _ => panic!("Unknown IP version tag {}", tag),
        }
    }
}

impl MiniEncodable for SocketAddr {
    fn encode_mini<W: BitWrite + ?Sized>(&self, writer: &mut W) -> usize {
        match self {
            SocketAddr::V4(addr) => write_mini_v4(writer, addr),
            SocketAddr::V6(addr) => write_mini_v6(writer, addr),
        }
    }
}

impl MiniDecodable for SocketAddr {
    fn decode_mini<R: BitRead + ?Sized>(reader: &mut R) -> Self {
        let tag: u8 = reader.read_mini();
        match tag {
            IPV4_TAG => SocketAddr::V4(read_mini_v4_body(reader)),
            IPV6_TAG => SocketAddr::V6(read_mini_v6_body(reader)),
            _ => panic!("Unknown IP version tag {}", tag),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{ValueRead, ValueWrite, len_mini};
    use crate::impls::BitStream;

    #[test]
    fn test_u24_layout() {
        for byte_order in [ByteOrder::Little, ByteOrder::Big] {
            let mut stream =
                BitStream::new_in(StreamConfig::default().with_byte_order(byte_order));
            assert_eq!(stream.write_value(U24::new(0x0A_0B_0C)), 24);
            assert_eq!(stream.as_bytes(), [0x0C, 0x0B, 0x0A]);
            assert_eq!(stream.read_value::<U24>(), U24::new(0x0A_0B_0C));
        }
    }

    #[test]
    #[should_panic]
    fn test_u24_overflow() {
        U24::new(1 << 24);
    }

    #[test]
    fn test_inverted_ipv4() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 20), 0x1F90);
        let mut stream = BitStream::new();
        assert_eq!(stream.write_value(addr), 56);
        assert_eq!(stream.as_bytes(), [4, 0x3F, 0x57, 0xFE, 0xEB, 0x1F, 0x90]);
        assert_eq!(stream.read_value::<SocketAddrV4>(), addr);
    }

    #[test]
    fn test_ipv6() {
        let addr: SocketAddr = SocketAddr::V6(SocketAddrV6::new(
            Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1),
            443,
            0,
            0,
        ));
        let mut stream = BitStream::new();
        stream.write_bit_one();
        assert_eq!(stream.write_value(addr), 8 + 128 + 16);
        assert!(stream.read_bit());
        assert_eq!(stream.read_value::<SocketAddr>(), addr);
    }

    #[test]
    fn test_mini_u24_and_guid() {
        let mut stream = BitStream::new();
        assert_eq!(stream.write_mini(U24::new(5)), len_mini(5_u32));
        assert_eq!(stream.write_mini(U24::MAX), len_mini(0xFF_FFFF_u32));
        assert_eq!(stream.write_mini(Guid(0x1234)), len_mini(0x1234_u64));
        assert_eq!(stream.write_mini(Guid::UNASSIGNED), 1 + 64);
        assert_eq!(stream.read_mini::<U24>(), U24::new(5));
        assert_eq!(stream.read_mini::<U24>(), U24::MAX);
        assert_eq!(stream.read_mini::<Guid>(), Guid(0x1234));
        assert_eq!(stream.read_mini::<Guid>(), Guid::UNASSIGNED);
        stream.assert_consumed();
    }

    #[test]
    #[should_panic]
    fn test_mini_u24_overflow() {
        let mut stream = BitStream::new();
        stream.write_mini(1_u32 << 24);
        stream.read_mini::<U24>();
    }

    #[test]
    fn test_mini_addresses() {
        let v4 = SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 20), 8080);
        let v6 = SocketAddr::V6(SocketAddrV6::new(Ipv6Addr::LOCALHOST, 443, 0, 0));
        for byte_order in [ByteOrder::Little, ByteOrder::Big] {
            let mut stream =
                BitStream::new_in(StreamConfig::default().with_byte_order(byte_order));
            let written = stream.write_mini(v4);
            assert_eq!(
                written,
                len_mini(IPV4_TAG) + len_mini(!u32::from(*v4.ip())) + len_mini(8080_u16)
            );
            stream.write_mini(SocketAddr::V4(v4));
            // ::1 has a zero upper half
            assert_eq!(
                stream.write_mini(v6),
                len_mini(IPV6_TAG) + len_mini(0_u64) + len_mini(1_u64) + len_mini(443_u16)
            );
            assert_eq!(stream.read_mini::<SocketAddrV4>(), v4);
            assert_eq!(stream.read_mini::<SocketAddr>(), SocketAddr::V4(v4));
            assert_eq!(stream.read_mini::<SocketAddr>(), v6);
            stream.assert_consumed();
        }
    }

    #[test]
    #[should_panic]
    fn test_unknown_tag() {
        let mut stream = BitStream::from_bytes(&[5, 0, 0, 0, 0, 0, 0]);
        stream.read_value::<SocketAddr>();
    }
}
