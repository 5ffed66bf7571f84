// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod event;
mod prefix_sum;
mod ring_local;
mod statistics;

pub use event::*;
pub use prefix_sum::*;
pub use ring_local::*;
pub use statistics::*;

pub use puffin;
