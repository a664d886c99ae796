/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Traits for reading and writing values on bit streams.

Each family of codes is implemented as a pair of extension traits for
reading and writing (e.g., [`MiniRead`] and [`MiniWrite`]). The traits for
reading depend on [`BitRead`](crate::traits::BitRead), whereas the traits
for writing depend on [`BitWrite`](crate::traits::BitWrite), and both are
implemented for every type implementing the latter.

| Code | Writing | Reading | Values |
|------|---------|---------|--------|
| [full width](fixed) | [`ValueWrite`] | [`ValueRead`] | integers, `bool`, floats, [`U24`], [`Guid`], socket addresses |
| [mini](mini) | [`MiniWrite`] | [`MiniRead`] | integers, `bool`, floats in [-1 . . 1] |
| [ranged](range) | [`RangeWrite`] | [`RangeRead`] | integers in a known interval |
| [bounded float](float) | [`FloatWrite`] | [`FloatRead`] | floats in a known interval, vectors, unit quaternions, rotation matrices |

Full-width and mini codes of a value can also be written only when the
value differs from a previous one, at the cost of one bit when it does
not (see, e.g., [`ValueWrite::write_changed`]).

*/

pub mod fixed;
pub use fixed::{ValueRead, ValueWrite};

pub mod mini;
pub use mini::{len_mini, read_mini_bytes, write_mini_bytes, MiniRead, MiniWrite};

pub mod range;
pub use range::{
    leading_zero_count, len_integer_range, IntegerRange, RangeRead, RangeWrite,
};

pub mod float;
pub use float::{FloatRead, FloatWrite, WireFloat};

pub mod net;
pub use net::{Guid, U24};
