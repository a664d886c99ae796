/*
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Lossy codes for bounded floating-point values, vectors, unit
//! quaternions and rotation matrices.
//!
//! All codes are built on the [mini code](crate::codes::mini) of 16-bit
//! unsigned integers: a value in a known interval is mapped linearly to
//! [0 . . 65535] and then compressed.

use num_traits::Float;

use crate::codes::{MiniRead, MiniWrite, ValueRead, ValueWrite};
use crate::traits::*;

/// Vectors with a smaller magnitude are written as the zero vector.
pub const MIN_MAGNITUDE: f32 = 0.00001;

const RANGE_STEPS: f32 = 65535.0;
const QUAT_STEPS: f64 = 65535.0;

mod private {
    /// This is a [SealedTrait](https://predr.ag/blog/definitive-guide-to-sealed-traits-in-rust/).
    pub trait WireFloat {}
}

/// The floating-point types accepted by vector, quaternion and matrix
/// codes. Computations happen in double precision.
pub trait WireFloat: Copy + PartialOrd + core::fmt::Debug + private::WireFloat {
    /// Converts to double precision.
    fn widen(self) -> f64;
    /// Converts from double precision, possibly rounding.
    fn narrow(value: f64) -> Self;
}

impl private::WireFloat for f32 {}
impl WireFloat for f32 {
    #[inline(always)]
    fn widen(self) -> f64 {
        self as f64
    }
    #[inline(always)]
    fn narrow(value: f64) -> Self {
        value as f32
    }
}

impl private::WireFloat for f64 {}
impl WireFloat for f64 {
    #[inline(always)]
    fn widen(self) -> f64 {
        self
    }
    #[inline(always)]
    fn narrow(value: f64) -> Self {
        value
    }
}

#[inline(always)]
fn ensure_float_range(min: f32, max: f32) {
    assert!(max > min, "max = {} <= min = {}", max, min);
}

#[inline(always)]
fn ensure_unit_components(components: &[f64]) {
    assert!(
        components.iter().all(|c| (-1.01..=1.01).contains(c)),
        "Components {:?} are not normalized",
        components
    );
}

#[inline(always)]
fn half_root(sum: f64) -> f64 {
    Float::sqrt(sum.max(0.0)) / 2.0
}

/// Trait for writing bounded floating-point codes.
///
/// This is the trait you should usually pull in scope to write
/// floating-point values, vectors, quaternions and rotation matrices.
pub trait FloatWrite: BitWrite {
    /// Writes `value`, clamped to [`min` . . `max`], with a precision of
    /// `(max - min) / 65535`.
    fn write_float_range(&mut self, value: f32, min: f32, max: f32) -> usize {
        ensure_float_range(min, max);
        let scaled = (RANGE_STEPS * (value - min) / (max - min)).clamp(0.0, RANGE_STEPS);
        self.write_mini(scaled as u16)
    }

    /// Writes a vector as its magnitude, at full precision, followed by
    /// its direction.
    fn write_vector<F: WireFloat>(&mut self, x: F, y: F, z: F) -> usize {
        let (x, y, z) = (x.widen(), y.widen(), z.widen());
        let magnitude = Float::sqrt(x * x + y * y + z * z);
        let mut written = self.write_value(magnitude as f32);
        if magnitude as f32 > MIN_MAGNITUDE {
            for component in [x, y, z] {
                written += self.write_float_range((component / magnitude) as f32, -1.0, 1.0);
            }
        }
        written
    }

    /// Writes a vector whose components lie in [-1 . . 1].
    fn write_norm_vector<F: WireFloat>(&mut self, x: F, y: F, z: F) -> usize {
        let components = [x.widen(), y.widen(), z.widen()];
        ensure_unit_components(&components);
        components
            .iter()
            .map(|&c| self.write_float_range(c as f32, -1.0, 1.0))
            .sum()
    }

    /// Writes a unit quaternion as four sign bits followed by the
    /// magnitudes of `x`, `y` and `z`; the magnitude of `w` is implied.
    fn write_norm_quat<F: WireFloat>(&mut self, w: F, x: F, y: F, z: F) -> usize {
        let components = [w.widen(), x.widen(), y.widen(), z.widen()];
        ensure_unit_components(&components);
        let mut written = 0;
        for c in components {
            written += self.write_bit(c < 0.0);
        }
        for c in &components[1..] {
            let scaled = (Float::abs(*c) * QUAT_STEPS).min(QUAT_STEPS);
            written += self.write_mini(scaled as u16);
        }
        written
    }

    /// Writes a rotation matrix, given by rows, as the unit quaternion
    /// representing the same rotation.
    fn write_orth_matrix<F: WireFloat>(&mut self, m: [[F; 3]; 3]) -> usize {
        let m = m.map(|row| row.map(WireFloat::widen));
        let w = half_root(1.0 + m[0][0] + m[1][1] + m[2][2]);
        let x = half_root(1.0 + m[0][0] - m[1][1] - m[2][2]);
        let y = half_root(1.0 - m[0][0] + m[1][1] - m[2][2]);
        let z = half_root(1.0 - m[0][0] - m[1][1] + m[2][2]);
        let x = Float::copysign(x, m[2][1] - m[1][2]);
        let y = Float::copysign(y, m[0][2] - m[2][0]);
        let z = Float::copysign(z, m[1][0] - m[0][1]);
        self.write_norm_quat(w, x, y, z)
    }
}

impl<W: BitWrite + ?Sized> FloatWrite for W {}

/// Trait for reading bounded floating-point codes.
///
/// This is the trait you should usually pull in scope to read
/// floating-point values, vectors, quaternions and rotation matrices.
pub trait FloatRead: BitRead {
    /// Reads a value written by [`FloatWrite::write_float_range`] with the
    /// same bounds.
    fn read_float_range(&mut self, min: f32, max: f32) -> f32 {
        ensure_float_range(min, max);
        let scaled: u16 = self.read_mini();
        (min + (max - min) * (scaled as f32 / RANGE_STEPS)).clamp(min, max)
    }

    /// Reads a vector written by [`FloatWrite::write_vector`], returning
    /// its components `[x, y, z]`.
    fn read_vector<F: WireFloat>(&mut self) -> [F; 3] {
        let magnitude: f32 = self.read_value();
        if magnitude > MIN_MAGNITUDE {
            [(); 3].map(|_| F::narrow((self.read_float_range(-1.0, 1.0) * magnitude) as f64))
        } else {
            [F::narrow(0.0); 3]
        }
    }

    /// Reads a vector written by [`FloatWrite::write_norm_vector`].
    fn read_norm_vector<F: WireFloat>(&mut self) -> [F; 3] {
        [(); 3].map(|_| F::narrow(self.read_float_range(-1.0, 1.0) as f64))
    }

    /// Reads a quaternion written by [`FloatWrite::write_norm_quat`],
    /// returning its components `[w, x, y, z]`.
    ///
    /// The magnitude of `w` is the square root of what `x`, `y` and `z`
    /// leave to reach one, or zero if they exceed it.
    fn read_norm_quat<F: WireFloat>(&mut self) -> [F; 4] {
        let negative = [(); 4].map(|_| self.read_bit());
        let mut q = [0.0_f64; 4];
        for (c, &neg) in q[1..].iter_mut().zip(&negative[1..]) {
            let scaled: u16 = self.read_mini();
            *c = scaled as f64 / QUAT_STEPS;
            if neg {
                *c = -*c;
            }
        }
        q[0] = Float::sqrt((1.0 - q[1] * q[1] - q[2] * q[2] - q[3] * q[3]).max(0.0));
        if negative[0] {
            q[0] = -q[0];
        }
        q.map(F::narrow)
    }

    /// Reads a rotation matrix written by [`FloatWrite::write_orth_matrix`],
    /// returned by rows.
    fn read_orth_matrix<F: WireFloat>(&mut self) -> [[F; 3]; 3] {
        let [w, x, y, z] = self.read_norm_quat::<f64>();
        let (ww, xx, yy, zz) = (w * w, x * x, y * y, z * z);
        let (xy, zw) = (x * y, z * w);
        let (xz, yw) = (x * z, y * w);
        let (yz, xw) = (y * z, x * w);
        [
            [xx - yy - zz + ww, 2.0 * (xy - zw), 2.0 * (xz + yw)],
            [2.0 * (xy + zw), -xx + yy - zz + ww, 2.0 * (yz - xw)],
            [2.0 * (xz - yw), 2.0 * (yz + xw), -xx - yy + zz + ww],
        ]
        .map(|row| row.map(F::narrow))
    }
}

impl<R: BitRead + ?Sized> FloatRead for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::BitStream;

    #[test]
    fn test_float_range() {
        let mut stream = BitStream::new();
        for value in [-10.0_f32, -3.3, 0.0, 7.25, 10.0, 42.0] {
            stream.write_float_range(value, -10.0, 10.0);
            let decoded = stream.read_float_range(-10.0, 10.0);
            assert!((decoded - value.clamp(-10.0, 10.0)).abs() <= 20.0 / 65535.0 + 1E-6);
        }
    }

    #[test]
    fn test_vector() {
        let mut stream = BitStream::new();
        stream.write_vector(3.0_f32, -4.0, 12.0);
        let [x, y, z] = stream.read_vector::<f32>();
        for (decoded, expected) in [(x, 3.0), (y, -4.0), (z, 12.0)] {
            assert!((decoded - expected).abs() < 13.0 * 1E-4);
        }
        assert_eq!(stream.write_vector(0.0_f64, 0.0, 0.0), 32);
        assert_eq!(stream.read_vector::<f64>(), [0.0; 3]);
        stream.assert_consumed();
    }

    #[test]
    fn test_norm_quat() {
        let (s, c) = (0.6_f64, 0.8_f64);
        let mut stream = BitStream::new();
        stream.write_norm_quat(c, 0.0, -s, 0.0);
        let [w, x, y, z] = stream.read_norm_quat::<f64>();
        assert!((w - c).abs() < 1E-4);
        assert!(x.abs() < 1E-4 && z.abs() < 1E-4);
        assert!((y + s).abs() < 1E-4);
    }

    #[test]
    fn test_orth_matrix() {
        let angle = core::f64::consts::PI / 6.0;
        let (s, c) = (angle.sin(), angle.cos());
        let rotation = [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]];
        let mut stream = BitStream::new();
        stream.write_orth_matrix(rotation);
        let decoded = stream.read_orth_matrix::<f64>();
        for (row, expected_row) in decoded.iter().zip(&rotation) {
            for (value, expected) in row.iter().zip(expected_row) {
                assert!((value - expected).abs() < 1E-3, "{:?}", decoded);
            }
        }
    }

    #[test]
    #[should_panic]
    fn test_empty_float_range() {
        BitStream::new().write_float_range(1.0, 2.0, 2.0);
    }
}
