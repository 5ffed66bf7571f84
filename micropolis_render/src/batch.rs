// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use micropolis_core::*;
use ultraviolet::vec::Vec2;

use crate::bound_n_split::*;
use crate::error::*;
use crate::patch_range::*;
use crate::patch_store::*;

/// Backing storage of one batch slot, structure of arrays as the rasterizer reads it.
#[derive(Debug, Default, Clone)]
pub struct BatchBuffers {
    pub patch_ids: Vec<u32>,
    pub uv_mins: Vec<Vec2>,
    pub uv_maxs: Vec<Vec2>,
}

impl BatchBuffers {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            patch_ids: Vec::with_capacity(capacity),
            uv_mins: Vec::with_capacity(capacity),
            uv_maxs: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.patch_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patch_ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.patch_ids.clear();
        self.uv_mins.clear();
        self.uv_maxs.clear();
    }

    pub fn resize(&mut self, len: usize) {
        self.patch_ids.resize(len, 0);
        self.uv_mins.resize(len, Vec2::zero());
        self.uv_maxs.resize(len, Vec2::zero());
    }

    pub fn push(&mut self, range: &PatchRange) {
        self.patch_ids.push(range.patch_id);
        self.uv_mins.push(range.uv_min);
        self.uv_maxs.push(range.uv_max);
    }

    pub fn write(&mut self, slot: usize, range: &PatchRange) {
        self.patch_ids[slot] = range.patch_id;
        self.uv_mins[slot] = range.uv_min;
        self.uv_maxs[slot] = range.uv_max;
    }
}

/// DRAW ranges of one bound&split step, handed to the rasterizer exactly once.
///
/// Readers wait on `ready()` first. A rasterizer that keeps the batch past `draw_batch`
/// must drop it before signalling its done event, the engine reclaims the slot then.
#[derive(Clone)]
pub struct Batch {
    count: usize,
    produced: usize,
    slot: usize,
    patches: Arc<PatchBuffer>,
    buffers: Arc<BatchBuffers>,
    ready: Event,
}

impl std::fmt::Debug for Batch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("count", &self.count)
            .field("produced", &self.produced)
            .field("slot", &self.slot)
            .field("patch_type", &self.patches.patch_type())
            .field("ready", &self.ready)
            .finish()
    }
}

impl Batch {
    /// Number of ranges the rasterizer should process.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Number of ranges bound&split emitted, differs from `count()` in dummy render mode.
    pub fn produced_count(&self) -> usize {
        self.produced
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn patch_buffer(&self) -> &Arc<PatchBuffer> {
        &self.patches
    }

    pub fn patch_type(&self) -> PatchType {
        self.patches.patch_type()
    }

    pub fn patch_ids(&self) -> &[u32] {
        &self.buffers.patch_ids[..self.count]
    }

    pub fn uv_mins(&self) -> &[Vec2] {
        &self.buffers.uv_mins[..self.count]
    }

    pub fn uv_maxs(&self) -> &[Vec2] {
        &self.buffers.uv_maxs[..self.count]
    }

    pub fn ready(&self) -> &Event {
        &self.ready
    }

    pub fn ranges(&self) -> impl Iterator<Item = (u32, Vec2, Vec2)> + '_ {
        self.patch_ids()
            .iter()
            .zip(self.uv_mins())
            .zip(self.uv_maxs())
            .map(|((patch_id, uv_min), uv_max)| (*patch_id, *uv_min, *uv_max))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRecordStatus {
    Inactive,
    /// Written and transferred, not yet taken by the rasterizer.
    SetUp,
    /// Taken by the rasterizer, busy until its done signal fires.
    Accepted,
}

pub struct BatchRecord {
    slot: usize,
    status: BatchRecordStatus,
    buffers: Arc<BatchBuffers>,
    transferred: Event,
    rasterizer_done: Event,
}

impl BatchRecord {
    pub fn new(slot: usize, capacity: usize) -> Self {
        Self {
            slot,
            status: BatchRecordStatus::Inactive,
            buffers: Arc::new(BatchBuffers::with_capacity(capacity)),
            transferred: Event::null(),
            rasterizer_done: Event::null(),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn status(&self) -> BatchRecordStatus {
        self.status
    }

    /// Blocks on whichever signal is outstanding and returns it, the record is inactive after.
    pub fn finish(&mut self) -> Event {
        let waited_for = match self.status {
            BatchRecordStatus::Inactive => return Event::null(),
            BatchRecordStatus::SetUp => self.transferred.clone(),
            BatchRecordStatus::Accepted => self.rasterizer_done.clone(),
        };
        if !waited_for.is_complete() {
            puffin::profile_scope!("wait batch slot");
            log::trace!("batch slot {} waiting on {:?}", self.slot, waited_for.name());
            waited_for.wait();
        }

        self.transferred = Event::null();
        self.rasterizer_done = Event::null();
        self.status = BatchRecordStatus::Inactive;

        waited_for
    }

    /// Reclaims the slot for writing.
    pub fn begin(&mut self) -> BoundNSplitResult<&mut BatchBuffers> {
        self.finish();

        let slot = self.slot;
        let buffers = Arc::get_mut(&mut self.buffers).ok_or_else(|| {
            log::error!("batch slot {} is still referenced by a consumer", slot);
            BoundNSplitError::BatchInUse(slot)
        })?;
        buffers.clear();
        Ok(buffers)
    }

    /// Publishes the written ranges. Host writes are visible as soon as the buffers are
    /// shared, so the ready signal is the already complete null event.
    pub fn transfer(&mut self) {
        self.transferred = Event::null();

        if !self.buffers.is_empty() {
            self.status = BatchRecordStatus::SetUp;
        }
    }

    pub fn accept(&mut self, rasterizer_done: &Event) {
        self.status = BatchRecordStatus::Accepted;
        self.rasterizer_done = rasterizer_done.clone();
    }

    pub fn batch(&self, patches: Arc<PatchBuffer>, dummy_render: bool) -> Batch {
        let produced = self.buffers.len();
        Batch {
            count: if dummy_render { 0 } else { produced },
            produced,
            slot: self.slot,
            patches,
            buffers: self.buffers.clone(),
            ready: self.transferred.clone(),
        }
    }
}

/// Ring of batch records, `bns_pipeline_length` batches may be in flight at once.
pub struct BatchRing {
    records: RingLocal<BatchRecord>,
    capacity: usize,
}

impl BatchRing {
    pub fn new(pipeline_length: usize, capacity: usize) -> Self {
        Self {
            records: RingLocal::new(pipeline_length.max(1), |slot| BatchRecord::new(slot, capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, slot: usize) -> &BatchRecord {
        self.records.get_slot(slot)
    }

    /// Hands `rasterizer_done` to the previous record and moves on to the next slot.
    pub fn next_record(&mut self, rasterizer_done: &Event) -> &mut BatchRecord {
        if let Some(previous) = self.records.current_mut() {
            previous.accept(rasterizer_done);
        }
        self.records.advance()
    }

    pub fn finish(&mut self, rasterizer_done: &Event) {
        puffin::profile_function!();

        if let Some(previous) = self.records.current_mut() {
            previous.accept(rasterizer_done);
        }
        self.records.for_each_mut(|record| {
            record.finish();
        });
        log::trace!("batch ring: {} batches this traversal", self.records.acquisition_count());
        self.records.reset();
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompactionCounts {
    pub draws: usize,
    pub splits: usize,
    pub frustum_culls: usize,
    pub split_depth_culls: usize,
}

impl CompactionCounts {
    pub fn accumulate(&mut self, other: &CompactionCounts) {
        self.draws += other.draws;
        self.splits += other.splits;
        self.frustum_culls += other.frustum_culls;
        self.split_depth_culls += other.split_depth_culls;
    }
}

/// Scan-then-scatter of one round: DRAW ranges go to the batch, SPLIT ranges put both
/// children on the queue, relative order is kept for both.
pub struct StreamCompaction {
    prefix_sum: PrefixSum,
    draw_slots: Vec<u32>,
    split_slots: Vec<u32>,
}

impl StreamCompaction {
    pub fn new(max_input_items: usize) -> Self {
        Self {
            prefix_sum: PrefixSum::new(max_input_items),
            draw_slots: Vec::with_capacity(max_input_items),
            split_slots: Vec::with_capacity(max_input_items),
        }
    }

    pub fn compact(
        &mut self,
        ranges: &[PatchRange],
        classifications: &[Classification],
        draws: &mut BatchBuffers,
        children: &mut Vec<PatchRange>,
    ) -> CompactionCounts {
        puffin::profile_function!();
        debug_assert_eq!(ranges.len(), classifications.len());

        self.draw_slots.clear();
        self.draw_slots
            .extend(classifications.iter().map(|c| (*c == Classification::Draw) as u32));
        self.split_slots.clear();
        self.split_slots
            .extend(classifications.iter().map(|c| matches!(c, Classification::Split(_)) as u32));

        let draw_count = self.prefix_sum.apply_in_place(&mut self.draw_slots) as usize;
        let split_count = self.prefix_sum.apply_in_place(&mut self.split_slots) as usize;

        let draw_base = draws.len();
        draws.resize(draw_base + draw_count);
        let child_base = children.len();
        children.resize(child_base + split_count * 2, PatchRange::whole(0));

        let mut counts = CompactionCounts {
            draws: draw_count,
            splits: split_count,
            ..Default::default()
        };
        for (index, (range, classification)) in ranges.iter().zip(classifications).enumerate() {
            match classification {
                Classification::Draw => {
                    draws.write(draw_base + self.draw_slots[index] as usize, range);
                }
                Classification::Split(direction) => {
                    let slot = child_base + 2 * self.split_slots[index] as usize;
                    let [low, high] = range.split(*direction);
                    children[slot] = low;
                    children[slot + 1] = high;
                }
                Classification::Cull(CullReason::Frustum) => counts.frustum_culls += 1,
                Classification::Cull(CullReason::SplitDepth) => counts.split_depth_culls += 1,
            }
        }
        counts
    }
}
