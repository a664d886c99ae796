/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Textual dumps of bit streams.
//!
//! [`bitify`] and [`hexlify`] render the first `bits` bits of a byte slice
//! as groups of binary or hexadecimal digits, one group per byte,
//! separated by spaces. [`unbitify`] and [`unhexlify`] parse them back.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors returned when parsing a dump.
pub enum DumpError {
    /// A character that is not a digit of the dump base.
    InvalidDigit { pos: usize, found: char },
    /// A group with more digits than fit in a byte.
    GroupTooLong { pos: usize },
    /// A hexadecimal group with an odd number of digits.
    OddGroup { pos: usize },
}

impl core::error::Error for DumpError {}
impl core::fmt::Display for DumpError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DumpError::InvalidDigit { pos, found } => {
                write!(f, "Invalid digit {:?} at position {}", found, pos)
            }
            DumpError::GroupTooLong { pos } => {
                write!(f, "Group starting at position {} does not fit a byte", pos)
            }
            DumpError::OddGroup { pos } => {
                write!(f, "Group starting at position {} has an odd length", pos)
            }
        }
    }
}

/// Renders the first `bits` bits of `bytes` MSB-first, eight digits per
/// group; the last group holds only the remaining bits.
pub fn bitify(bytes: &[u8], bits: usize) -> String {
    let mut out = String::with_capacity(bits + bits / 8);
    for (i, &byte) in bytes.iter().take(bits.div_ceil(8)).enumerate() {
        if i != 0 {
            out.push(' ');
        }
        let len = (bits - i * 8).min(8);
        for j in 0..len {
            out.push(if byte & (0x80 >> j) != 0 { '1' } else { '0' });
        }
    }
    out
}

/// Renders the bytes touched by the first `bits` bits of `bytes` as
/// lowercase hexadecimal pairs.
pub fn hexlify(bytes: &[u8], bits: usize) -> String {
    let mut out = String::with_capacity(bits.div_ceil(8) * 3);
    for (i, byte) in bytes.iter().take(bits.div_ceil(8)).enumerate() {
        if i != 0 {
            out.push(' ');
        }
        let _ = write!(out, "{:02x}", byte);
    }
    out
}

/// Iterates over the whitespace-separated groups of `s` with their starting
/// positions.
fn groups(s: &str) -> impl Iterator<Item = (usize, &str)> {
    s.split(' ')
        .scan(0, |pos, group| {
            let start = *pos;
            *pos += group.len() + 1;
            Some((start, group))
        })
        .filter(|(_, group)| !group.is_empty())
}

/// Parses the output of [`bitify`], returning the bytes and the number of
/// bits. A short group fills the high bits of its byte.
pub fn unbitify(s: &str) -> Result<(Vec<u8>, usize), DumpError> {
    let mut bytes = Vec::new();
    let mut bits = 0;
    for (start, group) in groups(s) {
        if group.len() > 8 {
            return Err(DumpError::GroupTooLong { pos: start });
        }
        let mut byte = 0_u8;
        for (j, c) in group.chars().enumerate() {
            match c {
                '0' => {}
                '1' => byte |= 0x80 >> j,
                found => return Err(DumpError::InvalidDigit { pos: start + j, found }),
            }
        }
        bytes.push(byte);
        bits += group.len();
    }
    Ok((bytes, bits))
}

/// Parses the output of [`hexlify`].
pub fn unhexlify(s: &str) -> Result<Vec<u8>, DumpError> {
    let mut bytes = Vec::new();
    for (start, group) in groups(s) {
        if group.len() % 2 != 0 {
            return Err(DumpError::OddGroup { pos: start });
        }
        let digits: Vec<char> = group.chars().collect();
        for (j, pair) in digits.chunks(2).enumerate() {
            let mut byte = 0_u8;
            for (k, &c) in pair.iter().enumerate() {
                let digit = c.to_digit(16).ok_or(DumpError::InvalidDigit {
                    pos: start + 2 * j + k,
                    found: c,
                })?;
                byte = (byte << 4) | digit as u8;
            }
            bytes.push(byte);
        }
    }
    Ok(bytes)
}
