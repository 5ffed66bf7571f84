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

/// Generation by generation bound&split with ping-pong range buffers.
///
/// Passes consume the read generation in batch sized chunks, children land in the write
/// generation. The buffers swap once the read generation is used up.
///
/// A generation is as wide as the tree, so intake is capped by the free live range
/// capacity. Once a read chunk no longer fits, passes pop the newest ranges off the write
/// generation instead and go depth first until the capacity frees up again. Every pass
/// keeps `max_split_depth` ranges of headroom per popped range.
pub struct BoundNSplitBreadthFirst {
    batch_size: usize,
    max_split_depth: usize,
    dummy_render: bool,
    ring: BatchRing,
    read: Vec<PatchRange>,
    write: Vec<PatchRange>,
    read_cursor: usize,
    pad: Vec<PatchRange>,
    generation: u32,
    classifications: Vec<Classification>,
    compaction: StreamCompaction,
    traversal: Option<Traversal>,
    config: ReyesConfig,
}

impl BoundNSplitBreadthFirst {
    pub fn new(config: &ReyesConfig) -> Self {
        let batch_size = config.reyes_patches_per_pass;
        Self {
            batch_size,
            max_split_depth: (config.max_split_depth as usize).max(1),
            dummy_render: config.dummy_render,
            ring: BatchRing::new(config.bns_pipeline_length, batch_size),
            read: Vec::new(),
            write: Vec::new(),
            read_cursor: 0,
            pad: Vec::with_capacity(batch_size),
            generation: 0,
            classifications: Vec::with_capacity(batch_size),
            compaction: StreamCompaction::new(batch_size),
            traversal: None,
            config: config.clone(),
        }
    }
}

impl BoundNSplit for BoundNSplitBreadthFirst {
    fn method(&self) -> BoundNSplitMethod {
        BoundNSplitMethod::BreadthFirst
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

        self.read.clear();
        self.read
            .extend((0..traversal.patch_count() as u32).map(PatchRange::whole));
        self.write.clear();
        self.read_cursor = 0;
        self.generation = 0;
        self.traversal = Some(traversal);

        statistics.stop_bound_n_split();
        Ok(())
    }

    fn is_drained(&self) -> bool {
        self.read_cursor >= self.read.len() && self.write.is_empty()
    }

    fn step(&mut self, rasterizer_done: &Event, statistics: &mut Statistics) -> BoundNSplitResult<Batch> {
        puffin::profile_function!();

        let traversal = self.traversal.as_ref().ok_or_else(missing_traversal)?;
        let record = self.ring.next_record(rasterizer_done);
        let buffers = record.begin()?;

        statistics.start_bound_n_split();

        if self.read_cursor >= self.read.len() {
            std::mem::swap(&mut self.read, &mut self.write);
            self.write.clear();
            self.read_cursor = 0;
            self.generation += 1;
            log::trace!("bound&split generation {}: {} ranges", self.generation, self.read.len());
        }
        let live = (self.read.len() - self.read_cursor) + self.write.len();
        statistics.update_max_patches(live);

        // every bound range adds at most one live range
        let headroom = traversal.capacity.saturating_sub(live);
        let intake = headroom.saturating_sub(self.max_split_depth);
        self.pad.clear();
        if intake > 0 {
            let begin = self.read_cursor;
            let end = (begin + self.batch_size.min(intake)).min(self.read.len());
            self.pad.extend_from_slice(&self.read[begin..end]);
            self.read_cursor = end;
        } else {
            let count = (headroom / self.max_split_depth).min(self.batch_size).max(1);
            log::trace!(
                "bound&split generation {}: {} live ranges, going depth first with {}",
                self.generation,
                live,
                count
            );
            if self.write.is_empty() {
                let begin = self.read.len().saturating_sub(count).max(self.read_cursor);
                self.pad.extend(self.read.drain(begin..));
            } else {
                let begin = self.write.len().saturating_sub(count);
                self.pad.extend(self.write.drain(begin..));
            }
        }

        {
            puffin::profile_scope!("bound ranges");
            self.pad
                .par_iter()
                .map(|range| traversal.classify(range))
                .collect_into_vec(&mut self.classifications);
        }

        let counts = self
            .compaction
            .compact(&self.pad, &self.classifications, buffers, &mut self.write);
        traversal.check_capacity((self.read.len() - self.read_cursor) + self.write.len())?;

        record.transfer();
        record_round(statistics, self.pad.len(), &counts);
        statistics.stop_bound_n_split();

        Ok(record.batch(traversal.patches.clone(), self.dummy_render))
    }

    fn finish(&mut self, rasterizer_done: &Event) {
        self.ring.finish(rasterizer_done);
    }
}
