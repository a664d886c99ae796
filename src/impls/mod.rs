/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Implementations of bit streams.

[`BitStream`] is a growable buffer addressed at bit granularity
implementing both [`BitRead`](crate::traits::BitRead) and
[`BitWrite`](crate::traits::BitWrite). It can be built empty, pre-sized,
as a copy of existing bytes, or as a read-only [view](BitStream::view) of
a received datagram.

*/

mod bit_stream;
pub use bit_stream::*;
