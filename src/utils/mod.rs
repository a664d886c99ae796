/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Debug helpers.

[`bitify`] and [`hexlify`] render the content of a stream in binary or
hexadecimal, and [`unbitify`] and [`unhexlify`] parse such renderings back,
which is handy to write expected wire images in tests.

*/

mod dump;
pub use dump::*;
