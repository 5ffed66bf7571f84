// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use micropolis_core::*;
use rayon::prelude::*;
use ultraviolet::mat::Mat4;

use crate::batch::*;
use crate::bound_n_split::*;
use crate::config::*;
use crate::error::*;
use crate::patch_range::*;
use crate::patch_store::*;
use crate::projection::*;

/// Data-parallel bound&split over a shared stack.
///
/// Every pass takes up to one batch worth of ranges off the stack top, bounds them all in
/// parallel and compacts the result: DRAW ranges into the batch, children back on the stack.
pub struct BoundNSplitMultipass {
    batch_size: usize,
    dummy_render: bool,
    ring: BatchRing,
    stack: Vec<PatchRange>,
    pad: Vec<PatchRange>,
    classifications: Vec<Classification>,
    compaction: StreamCompaction,
    traversal: Option<Traversal>,
    config: ReyesConfig,
}

impl BoundNSplitMultipass {
    pub fn new(config: &ReyesConfig) -> Self {
        let batch_size = config.reyes_patches_per_pass;
        Self {
            batch_size,
            dummy_render: config.dummy_render,
            ring: BatchRing::new(config.bns_pipeline_length, batch_size),
            stack: Vec::new(),
            pad: Vec::with_capacity(batch_size),
            classifications: Vec::with_capacity(batch_size),
            compaction: StreamCompaction::new(batch_size),
            traversal: None,
            config: config.clone(),
        }
    }
}

impl BoundNSplit for BoundNSplitMultipass {
    fn method(&self) -> BoundNSplitMethod {
        BoundNSplitMethod::Multipass
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
        let traversal = Traversal::new(patches, modelview, projection, &self.config);

        self.stack.clear();
        self.stack.reserve(traversal.capacity);
        self.stack
            .extend((0..traversal.patch_count() as u32).map(PatchRange::whole));
        self.traversal = Some(traversal);

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

        let batch_size = self.stack.len().min(self.batch_size);
        let stack_height = self.stack.len() - batch_size;
        self.pad.clear();
        self.pad.extend(self.stack.drain(stack_height..));

        {
            puffin::profile_scope!("bound ranges");
            self.pad
                .par_iter()
                .map(|range| traversal.classify(range))
                .collect_into_vec(&mut self.classifications);
        }

        let counts = self
            .compaction
            .compact(&self.pad, &self.classifications, buffers, &mut self.stack);
        traversal.check_capacity(self.stack.len())?;

        record.transfer();
        record_round(statistics, batch_size, &counts);
        statistics.stop_bound_n_split();

        Ok(record.batch(traversal.patches.clone(), self.dummy_render))
    }

    fn finish(&mut self, rasterizer_done: &Event) {
        self.ring.finish(rasterizer_done);
    }
}
