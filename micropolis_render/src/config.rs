// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::error::*;

// Upper bound for the per-range sample grid, keeps the sample pad on the stack
pub const MAX_BOUND_SAMPLE_RATE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundNSplitMethod {
    Cpu,
    Multipass,
    BreadthFirst,
    Local,
    Balanced,
}

impl BoundNSplitMethod {
    pub const ALL: [BoundNSplitMethod; 5] = [
        BoundNSplitMethod::Cpu,
        BoundNSplitMethod::Multipass,
        BoundNSplitMethod::BreadthFirst,
        BoundNSplitMethod::Local,
        BoundNSplitMethod::Balanced,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoundNSplitMethod::Cpu => "cpu",
            BoundNSplitMethod::Multipass => "multipass",
            BoundNSplitMethod::BreadthFirst => "breadth_first",
            BoundNSplitMethod::Local => "local",
            BoundNSplitMethod::Balanced => "balanced",
        }
    }
}

impl std::fmt::Display for BoundNSplitMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BoundNSplitMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowercase = s.to_ascii_lowercase();
        match lowercase.as_str() {
            "cpu" => Ok(BoundNSplitMethod::Cpu),
            "multipass" => Ok(BoundNSplitMethod::Multipass),
            "breadth_first" | "breadthfirst" => Ok(BoundNSplitMethod::BreadthFirst),
            "local" => Ok(BoundNSplitMethod::Local),
            "balanced" => Ok(BoundNSplitMethod::Balanced),
            _ => Err(format!(
                "unknown bound&split method \"{}\", expected one of cpu, multipass, breadth_first, local, balanced",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReyesConfig {
    /// Batch capacity handed to the rasterizer per pass.
    pub reyes_patches_per_pass: usize,
    /// Ranges at this depth are never split again.
    pub max_split_depth: u32,
    /// Maximum screen-space extent in pixels of a drawable range.
    pub bound_n_split_limit: f32,
    /// Samples per axis used to bound a range.
    pub bound_sample_rate: usize,
    /// Screen-space cull margin in pixels.
    pub cull_ribbon: f32,
    /// Number of batch slots in flight.
    pub bns_pipeline_length: usize,
    pub bound_n_split_method: BoundNSplitMethod,
    pub local_bns_work_groups: usize,
    pub local_bns_work_group_size: usize,
    /// Produce batches but hand them to the rasterizer empty.
    pub dummy_render: bool,
}

impl Default for ReyesConfig {
    fn default() -> Self {
        Self {
            reyes_patches_per_pass: 2048,
            max_split_depth: 23,
            bound_n_split_limit: 8.0,
            bound_sample_rate: 3,
            cull_ribbon: 16.0,
            bns_pipeline_length: 2,
            bound_n_split_method: BoundNSplitMethod::Multipass,
            local_bns_work_groups: 32,
            local_bns_work_group_size: 64,
            dummy_render: false,
        }
    }
}

impl ReyesConfig {
    pub fn validate(&self) -> BoundNSplitResult<()> {
        if self.reyes_patches_per_pass == 0 {
            return Err(BoundNSplitError::InvalidConfig(
                "reyes_patches_per_pass must be at least 1".to_string(),
            ));
        }
        if self.max_split_depth == 0 {
            return Err(BoundNSplitError::InvalidConfig(
                "max_split_depth must be at least 1".to_string(),
            ));
        }
        if !(self.bound_n_split_limit.is_finite() && self.bound_n_split_limit > 0.0) {
            return Err(BoundNSplitError::InvalidConfig(format!(
                "bound_n_split_limit must be a positive number of pixels, got {}",
                self.bound_n_split_limit
            )));
        }
        if self.bound_sample_rate < 2 || self.bound_sample_rate > MAX_BOUND_SAMPLE_RATE {
            return Err(BoundNSplitError::InvalidConfig(format!(
                "bound_sample_rate must be in 2..={}, got {}",
                MAX_BOUND_SAMPLE_RATE, self.bound_sample_rate
            )));
        }
        if !(self.cull_ribbon.is_finite() && self.cull_ribbon >= 0.0) {
            return Err(BoundNSplitError::InvalidConfig(format!(
                "cull_ribbon must be a non-negative number of pixels, got {}",
                self.cull_ribbon
            )));
        }
        if self.bns_pipeline_length == 0 {
            return Err(BoundNSplitError::InvalidConfig(
                "bns_pipeline_length must be at least 1".to_string(),
            ));
        }
        if self.local_bns_work_groups == 0 || self.local_bns_work_group_size == 0 {
            return Err(BoundNSplitError::InvalidConfig(
                "local bound&split needs at least one work group of at least one item".to_string(),
            ));
        }
        Ok(())
    }

    /// Live range capacity for a traversal of `patch_count` patches.
    pub fn stack_capacity(&self, patch_count: usize) -> usize {
        patch_count + self.reyes_patches_per_pass * (self.max_split_depth as usize)
    }
}
