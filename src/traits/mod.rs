/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Traits

*/

mod allocator;
pub use allocator::*;

mod bit_stream;
pub use bit_stream::*;

mod codec;
pub use codec::*;
pub(crate) use codec::private;

mod endianness;
pub use endianness::*;

mod int;
pub use int::*;
