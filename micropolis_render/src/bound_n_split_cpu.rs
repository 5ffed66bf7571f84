// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use micropolis_core::*;
use ultraviolet::mat::Mat4;

use crate::batch::*;
use crate::bound_n_split::*;
use crate::config::*;
use crate::error::*;
use crate::patch_range::*;
use crate::patch_store::*;
use crate::projection::*;

/// Serial depth-first bound&split over a single stack.
///
/// Each step pops ranges until the stack drains or the batch slot is full.
pub struct BoundNSplitCpu {
    batch_capacity: usize,
    dummy_render: bool,
    ring: BatchRing,
    stack: Vec<PatchRange>,
    traversal: Option<Traversal>,
    config: ReyesConfig,
}

impl BoundNSplitCpu {
    pub fn new(config: &ReyesConfig) -> Self {
        Self {
            batch_capacity: config.reyes_patches_per_pass,
            dummy_render: config.dummy_render,
            ring: BatchRing::new(config.bns_pipeline_length, config.reyes_patches_per_pass),
            stack: Vec::new(),
            traversal: None,
            config: config.clone(),
        }
    }
}

impl BoundNSplit for BoundNSplitCpu {
    fn method(&self) -> BoundNSplitMethod {
        BoundNSplitMethod::Cpu
    }

    fn init(
        &mut self,
        patches: Arc<PatchBuffer>,
        modelview: Mat4,
        projection: &Projection,
        statistics: &mut Statistics,
    ) -> BoundNSplitResult<()> {
        puffin::profile_function!();
        statistics.start_bound_n_split();

        begin_traversal(&patches, statistics);
        self.stack.clear();
        self.stack.extend((0..patches.patch_count() as u32).map(PatchRange::whole));
        self.traversal = Some(Traversal::new(patches, modelview, projection, &self.config));

        statistics.stop_bound_n_split();
        Ok(())
    }

    fn is_drained(&self) -> bool {
        self.stack.is_empty()
    }

    fn step(&mut self, rasterizer_done: &Event, statistics: &mut Statistics) -> BoundNSplitResult<Batch> {
        puffin::profile_function!();

        let traversal = self.traversal.as_ref().ok_or_else(missing_traversal)?;
        let record = self.ring.next_record(rasterizer_done);
        let buffers = record.begin()?;

        statistics.start_bound_n_split();
        statistics.update_max_patches(self.stack.len());

        let mut counts = CompactionCounts::default();
        let mut bounds = 0;
        while let Some(range) = self.stack.pop() {
            bounds += 1;
            match traversal.classify(&range) {
                Classification::Draw => {
                    buffers.push(&range);
                    counts.draws += 1;
                    if buffers.len() >= self.batch_capacity {
                        break;
                    }
                }
                Classification::Split(direction) => {
                    self.stack.extend_from_slice(&range.split(direction));
                    counts.splits += 1;
                }
                Classification::Cull(CullReason::Frustum) => counts.frustum_culls += 1,
                Classification::Cull(CullReason::SplitDepth) => counts.split_depth_culls += 1,
            }
        }
        traversal.check_capacity(self.stack.len())?;

        record.transfer();
        record_round(statistics, bounds, &counts);
        statistics.stop_bound_n_split();

        Ok(record.batch(traversal.patches.clone(), self.dummy_render))
    }

    fn finish(&mut self, rasterizer_done: &Event) {
        self.ring.finish(rasterizer_done);
    }
}
