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

#[derive(Default)]
struct WorkGroup {
    stack: Vec<PatchRange>,
    pad: Vec<PatchRange>,
    classifications: Vec<Classification>,
    draw_slots: Vec<u32>,
    draws: Vec<PatchRange>,
    budget: usize,
    processed: usize,
    counts: CompactionCounts,
}

impl WorkGroup {
    fn reset(&mut self) {
        self.stack.clear();
        self.draws.clear();
        self.budget = 0;
        self.processed = 0;
        self.counts = CompactionCounts::default();
    }

    // Bounds `budget` ranges off the own stack top, keeps DRAW ranges in order
    fn process(&mut self, traversal: &Traversal) {
        let stack_height = self.stack.len() - self.budget;
        self.pad.clear();
        self.pad.extend(self.stack.drain(stack_height..));

        self.classifications.clear();
        self.classifications
            .extend(self.pad.iter().map(|range| traversal.classify(range)));

        self.draw_slots.clear();
        self.draw_slots.extend(
            self.classifications
                .iter()
                .map(|c| (*c == Classification::Draw) as u32),
        );
        let draw_count = exclusive_scan_serial(&mut self.draw_slots) as usize;

        self.draws.clear();
        self.draws.resize(draw_count, PatchRange::whole(0));
        self.counts = CompactionCounts {
            draws: draw_count,
            ..Default::default()
        };
        for (index, (range, classification)) in self.pad.iter().zip(&self.classifications).enumerate() {
            match classification {
                Classification::Draw => self.draws[self.draw_slots[index] as usize] = *range,
                Classification::Split(direction) => {
                    self.stack.extend_from_slice(&range.split(*direction));
                    self.counts.splits += 1;
                }
                Classification::Cull(CullReason::Frustum) => self.counts.frustum_culls += 1,
                Classification::Cull(CullReason::SplitDepth) => self.counts.split_depth_culls += 1,
            }
        }

        self.processed += self.budget;
    }
}

/// Bound&split with one range stack per work group.
///
/// Work groups run in parallel and never touch each other's stacks within a pass. Before a
/// pass each group reserves as many batch entries as it may bound, so the batch never
/// overflows and a group that cannot reserve anything sits the pass out. The balanced
/// variant evens out the stacks between passes.
pub struct BoundNSplitLocal {
    batch_capacity: usize,
    work_group_size: usize,
    balanced: bool,
    dummy_render: bool,
    ring: BatchRing,
    work_groups: Vec<WorkGroup>,
    draw_offsets: Vec<u32>,
    processed: Vec<usize>,
    pool: Vec<PatchRange>,
    traversal: Option<Traversal>,
    config: ReyesConfig,
}

impl BoundNSplitLocal {
    pub fn new(config: &ReyesConfig, balanced: bool) -> Self {
        let work_group_count = config.local_bns_work_groups.max(1);
        Self {
            batch_capacity: config.reyes_patches_per_pass,
            work_group_size: config.local_bns_work_group_size.max(1),
            balanced,
            dummy_render: config.dummy_render,
            ring: BatchRing::new(config.bns_pipeline_length, config.reyes_patches_per_pass),
            work_groups: (0..work_group_count).map(|_| WorkGroup::default()).collect(),
            draw_offsets: Vec::with_capacity(work_group_count),
            processed: Vec::with_capacity(work_group_count),
            pool: Vec::new(),
            traversal: None,
            config: config.clone(),
        }
    }

    pub fn work_group_count(&self) -> usize {
        self.work_groups.len()
    }

    pub fn stack_heights(&self) -> Vec<usize> {
        self.work_groups.iter().map(|group| group.stack.len()).collect()
    }

    fn live_ranges(work_groups: &[WorkGroup]) -> usize {
        work_groups.iter().map(|group| group.stack.len()).sum()
    }

    // Caps every stack at the rounded up mean height, the surplus refills stacks below it
    fn rebalance(work_groups: &mut [WorkGroup], pool: &mut Vec<PatchRange>) {
        puffin::profile_function!();

        let total = Self::live_ranges(work_groups);
        if total == 0 {
            return;
        }
        let target = (total - 1) / work_groups.len() + 1;

        pool.clear();
        for group in work_groups.iter_mut() {
            if group.stack.len() > target {
                pool.extend(group.stack.drain(target..));
            }
        }
        for group in work_groups.iter_mut() {
            while group.stack.len() < target {
                match pool.pop() {
                    Some(range) => group.stack.push(range),
                    None => break,
                }
            }
        }
        debug_assert!(pool.is_empty());
    }
}

impl BoundNSplit for BoundNSplitLocal {
    fn method(&self) -> BoundNSplitMethod {
        if self.balanced {
            BoundNSplitMethod::Balanced
        } else {
            BoundNSplitMethod::Local
        }
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

        for group in self.work_groups.iter_mut() {
            group.reset();
        }
        let work_group_count = self.work_groups.len();
        for patch_id in 0..traversal.patch_count() {
            self.work_groups[patch_id % work_group_count]
                .stack
                .push(PatchRange::whole(patch_id as u32));
        }
        self.traversal = Some(traversal);

        statistics.stop_bound_n_split();
        Ok(())
    }

    fn is_drained(&self) -> bool {
        self.work_groups.iter().all(|group| group.stack.is_empty())
    }

    fn step(&mut self, rasterizer_done: &Event, statistics: &mut Statistics) -> BoundNSplitResult<Batch> {
        puffin::profile_function!();

        let traversal = self.traversal.as_ref().ok_or_else(missing_traversal)?;
        let record = self.ring.next_record(rasterizer_done);
        let buffers = record.begin()?;

        statistics.start_bound_n_split();
        statistics.update_max_patches(Self::live_ranges(&self.work_groups));

        let mut remaining = self.batch_capacity;
        for group in self.work_groups.iter_mut() {
            group.budget = group.stack.len().min(self.work_group_size).min(remaining);
            remaining -= group.budget;
        }
        let bounds = self.batch_capacity - remaining;

        {
            puffin::profile_scope!("bound work groups");
            self.work_groups
                .par_iter_mut()
                .filter(|group| group.budget > 0)
                .for_each(|group| group.process(traversal));
        }

        self.draw_offsets.clear();
        self.draw_offsets
            .extend(self.work_groups.iter().map(|group| group.draws.len() as u32));
        let draw_count = exclusive_scan_serial(&mut self.draw_offsets) as usize;

        buffers.resize(draw_count);
        let mut counts = CompactionCounts::default();
        for (group, offset) in self.work_groups.iter_mut().zip(&self.draw_offsets) {
            if group.budget == 0 {
                continue;
            }
            for (index, range) in group.draws.iter().enumerate() {
                buffers.write(*offset as usize + index, range);
            }
            counts.accumulate(&group.counts);
            group.draws.clear();
            group.budget = 0;
        }

        if self.balanced {
            Self::rebalance(&mut self.work_groups, &mut self.pool);
        }

        self.processed.clear();
        self.processed
            .extend(self.work_groups.iter().map(|group| group.processed));
        statistics.set_bound_n_split_balance(&self.processed);

        traversal.check_capacity(Self::live_ranges(&self.work_groups))?;

        record.transfer();
        record_round(statistics, bounds, &counts);
        statistics.stop_bound_n_split();

        Ok(record.batch(traversal.patches.clone(), self.dummy_render))
    }

    fn finish(&mut self, rasterizer_done: &Event) {
        self.ring.finish(rasterizer_done);
    }
}
