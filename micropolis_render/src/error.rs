// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundNSplitError {
    #[error("bound&split stack overflow: {live} live ranges, capacity is {capacity}")]
    StackOverflow { live: usize, capacity: usize },
    #[error("patch set handle is not loaded")]
    InvalidPatchHandle,
    #[error("patch buffer holds {len} control points, not a multiple of {stride}")]
    InvalidPatchData { len: usize, stride: usize },
    #[error("batch slot {0} is still referenced after its done signal")]
    BatchInUse(usize),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("rasterizer failed: {0}")]
    Rasterizer(String),
}

pub type BoundNSplitResult<T> = Result<T, BoundNSplitError>;
