// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod batch;
mod bound_n_split;
mod bound_n_split_breadth_first;
mod bound_n_split_cpu;
mod bound_n_split_local;
mod bound_n_split_multipass;
mod config;
mod error;
mod patch;
mod patch_range;
mod patch_store;
mod projection;
mod renderer;

pub use batch::*;
pub use bound_n_split::*;
pub use bound_n_split_breadth_first::*;
pub use bound_n_split_cpu::*;
pub use bound_n_split_local::*;
pub use bound_n_split_multipass::*;
pub use config::*;
pub use error::*;
pub use patch::*;
pub use patch_range::*;
pub use patch_store::*;
pub use projection::*;
pub use renderer::*;

pub use micropolis_core::*;
pub use puffin;
pub use ultraviolet as utv;

#[cfg(test)]
mod test_bound_n_split;
#[cfg(test)]
mod test_patches;
