/*
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::prelude::*;
use arbitrary::Arbitrary;
use std::net::{Ipv4Addr, SocketAddrV4};

const DEBUG: bool = false;

macro_rules! debug {
    ($($arg:tt)*) => {
        if DEBUG {
            print!($($arg)*);
        }
    };
}

macro_rules! debugln {
    ($($arg:tt)*) => {
        if DEBUG {
            println!($($arg)*);
        }
    };
}

#[derive(Arbitrary, Debug, Clone)]
pub struct FuzzCase {
    commands: Vec<RandomCommand>,
}

#[derive(Arbitrary, Debug, Clone)]
enum RandomCommand {
    Bits(Vec<u8>, usize, bool),
    Bit(bool),
    U16(u16),
    I32(i32),
    U64(u64),
    MiniU32(u32),
    MiniI64(i64),
    Range(u32, u32, u32, bool),
    FloatRange(f32),
    MiniFloat(i16),
    Changed(u32, u32),
    Address([u8; 4], u16),
    Aligned(Vec<u8>),
    Align,
}

fn write_command<W: BitWrite>(stream: &mut W, command: &RandomCommand) -> usize {
    match command {
        RandomCommand::Bits(bytes, n_bits, right_aligned) => {
            stream.write_bits(bytes, *n_bits, *right_aligned)
        }
        RandomCommand::Bit(bit) => stream.write_bit(*bit),
        RandomCommand::U16(value) => stream.write_value(*value),
        RandomCommand::I32(value) => stream.write_value(*value),
        RandomCommand::U64(value) => stream.write_value(*value),
        RandomCommand::MiniU32(value) => stream.write_mini(*value),
        RandomCommand::MiniI64(value) => stream.write_mini(*value),
        RandomCommand::Range(value, min, max, allow) => {
            stream.write_integer_range(*value, *min, *max, *allow)
        }
        RandomCommand::FloatRange(value) => stream.write_float_range(*value, -100.0, 100.0),
        RandomCommand::MiniFloat(value) => stream.write_mini(*value as f32 / 32768.0),
        RandomCommand::Changed(current, last) => stream.write_changed(*current, *last),
        RandomCommand::Address(octets, port) => {
            stream.write_value(SocketAddrV4::new(Ipv4Addr::from(*octets), *port))
        }
        RandomCommand::Aligned(bytes) => stream.write_aligned_bytes(bytes),
        RandomCommand::Align => stream.align_write(),
    }
}

fn check_command<R: BitRead>(stream: &mut R, command: &RandomCommand) {
    match command {
        RandomCommand::Bits(bytes, n_bits, right_aligned) => {
            let mut dest = vec![0; bytes.len()];
            stream.read_bits(&mut dest, *n_bits, *right_aligned);
            assert_eq!(&dest[..], &bytes[..]);
        }
        RandomCommand::Bit(bit) => assert_eq!(stream.read_bit(), *bit),
        RandomCommand::U16(value) => assert_eq!(stream.read_value::<u16>(), *value),
        RandomCommand::I32(value) => assert_eq!(stream.read_value::<i32>(), *value),
        RandomCommand::U64(value) => assert_eq!(stream.read_value::<u64>(), *value),
        RandomCommand::MiniU32(value) => assert_eq!(stream.read_mini::<u32>(), *value),
        RandomCommand::MiniI64(value) => assert_eq!(stream.read_mini::<i64>(), *value),
        RandomCommand::Range(value, min, max, allow) => {
            assert_eq!(stream.read_integer_range(*min, *max, *allow), *value)
        }
        RandomCommand::FloatRange(value) => {
            let decoded = stream.read_float_range(-100.0, 100.0);
            assert!((decoded - value.clamp(-100.0, 100.0)).abs() <= 200.0 / 65535.0 + 1E-3);
        }
        RandomCommand::MiniFloat(value) => {
            let decoded = stream.read_mini::<f32>();
            assert!((decoded - *value as f32 / 32768.0).abs() <= 1.0 / 32767.5 + 1E-6);
        }
        RandomCommand::Changed(current, last) => {
            let mut dest = *last;
            stream.read_changed(&mut dest);
            assert_eq!(dest, *current);
        }
        RandomCommand::Address(octets, port) => assert_eq!(
            stream.read_value::<SocketAddrV4>(),
            SocketAddrV4::new(Ipv4Addr::from(*octets), *port)
        ),
        RandomCommand::Aligned(bytes) => {
            let mut dest = vec![0; bytes.len()];
            stream.read_aligned_bytes(&mut dest);
            assert_eq!(dest, *bytes);
        }
        RandomCommand::Align => stream.align_read(),
    }
}

pub fn harness(data: FuzzCase) {
    let mut data = data;
    for command in &mut data.commands {
        match command {
            RandomCommand::Bits(bytes, n_bits, right_aligned) => {
                if bytes.is_empty() {
                    bytes.push(0);
                }
                bytes.truncate(64);
                *n_bits = 1 + (*n_bits % (bytes.len() * 8));
                bytes.truncate(n_bits.div_ceil(8));
                let partial = *n_bits % 8;
                if partial != 0 {
                    let last = bytes.len() - 1;
                    bytes[last] &= if *right_aligned {
                        (1 << partial) - 1
                    } else {
                        0xFF << (8 - partial)
                    };
                }
            }
            RandomCommand::Range(value, min, max, allow) => {
                if *min > *max {
                    core::mem::swap(min, max);
                }
                if !*allow {
                    *value = (*value).clamp(*min, *max);
                }
            }
            RandomCommand::FloatRange(value) => {
                if !value.is_finite() {
                    *value = 0.0;
                }
            }
            RandomCommand::Aligned(bytes) => {
                bytes.truncate(512);
            }
            _ => {}
        }
    }

    debugln!("{:#4?}", data);

    let little_config = StreamConfig::default().with_byte_order(ByteOrder::Little);
    let big_config = StreamConfig::default().with_byte_order(ByteOrder::Big);
    let mut little = BitStream::new_in(little_config);
    let mut big = BitStream::new_in(big_config);
    let mut positions = vec![];
    // write
    for command in data.commands.iter() {
        let little_bits = write_command(&mut little, command);
        let big_bits = write_command(&mut big, command);
        assert_eq!(little_bits, big_bits);
        positions.push(little.written_bits());
    }
    assert_eq!(little.as_bytes(), big.as_bytes());
    debugln!("{}", hexlify(little.as_bytes(), little.written_bits()));

    // read back from a view, in both byte orders
    let bytes = little.to_vec();
    for config in [little_config, big_config] {
        let mut view = BitStream::view_in(&bytes, config);
        for (command, &pos) in data.commands.iter().zip(&positions) {
            debug!("{:?} ", command);
            check_command(&mut view, command);
            assert_eq!(view.read_bit_pos(), pos);
        }
        debug!("\n");
    }

    // transfer, starting at an arbitrary bit
    if little.written_bits() > 0 {
        let skip = positions.first().copied().unwrap_or(0) % little.written_bits();
        little.set_read_bit_pos(skip);
        let mut copy = BitStream::new();
        copy.write_stream_payload(&mut little);
        let mut reference = BitStream::view(&bytes);
        reference.skip_bits(skip);
        let mut expected = BitStream::new();
        while reference.read_bit_pos() < little.written_bits() {
            let bit = reference.read_bit();
            expected.write_bit(bit);
        }
        assert_eq!(copy.as_bytes(), expected.as_bytes());
        little.assert_consumed();
    }
}
