// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use micropolis_core::*;
use ultraviolet as utv;
use utv::mat::{Mat2, Mat4};
use utv::vec::{Vec2, Vec3};

use crate::batch::*;
use crate::bound_n_split_breadth_first::*;
use crate::bound_n_split_cpu::*;
use crate::bound_n_split_local::*;
use crate::bound_n_split_multipass::*;
use crate::config::*;
use crate::error::*;
use crate::patch::*;
use crate::patch_range::*;
use crate::patch_store::*;
use crate::projection::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullReason {
    Frustum,
    SplitDepth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Cull(CullReason),
    Draw,
    Split(SplitDirection),
}

/// Everything a single range classification reads, fixed for one traversal.
#[derive(Debug, Clone)]
pub struct BoundParameters {
    pub modelview: Mat4,
    pub projection_matrix: Mat4,
    pub screen_matrix: Mat2,
    pub projection: Projection,
    pub split_limit: f32,
    pub sample_rate: usize,
    pub max_split_depth: u32,
}

impl BoundParameters {
    pub fn new(modelview: Mat4, projection: &Projection, config: &ReyesConfig) -> Self {
        Self {
            modelview,
            projection_matrix: projection.calc_projection(),
            screen_matrix: projection.calc_screen_matrix(),
            projection: projection.clone(),
            split_limit: config.bound_n_split_limit,
            sample_rate: config.bound_sample_rate.max(2).min(MAX_BOUND_SAMPLE_RATE),
            max_split_depth: config.max_split_depth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBound {
    /// View-space box around the sample grid.
    pub bbox: BoundingBox,
    /// Longest screen-space polyline along v, over all sample rows.
    pub hlen: f32,
    /// Longest screen-space polyline along u, over all sample columns.
    pub vlen: f32,
}

pub fn bound_patch_range(range: &PatchRange, patches: &PatchBuffer, parameters: &BoundParameters) -> RangeBound {
    let res = parameters.sample_rate;
    let step = 1.0 / ((res - 1) as f32);
    let uv_size = range.uv_size();

    let mut screen_positions = [[Vec2::zero(); MAX_BOUND_SAMPLE_RATE]; MAX_BOUND_SAMPLE_RATE];
    let mut bbox = BoundingBox::empty();
    let mut behind_eye = false;

    for iu in 0..res {
        for iv in 0..res {
            let uv = range.uv_min + uv_size * Vec2::new(iu as f32 * step, iv as f32 * step);
            let view = transform_point4(&parameters.modelview, patches.eval(range.patch_id as usize, uv));
            bbox.add_point(Vec3::new(view.x, view.y, view.z));

            let clip = parameters.projection_matrix * view;
            behind_eye |= clip.w <= 0.0;
            screen_positions[iu][iv] = parameters.screen_matrix * Vec2::new(clip.x / clip.w, clip.y / clip.w);
        }
    }

    if behind_eye {
        // projected lengths are meaningless, treat the range as too large to draw
        return RangeBound {
            bbox,
            hlen: std::f32::INFINITY,
            vlen: std::f32::INFINITY,
        };
    }

    let mut hlen = 0.0f32;
    let mut vlen = 0.0f32;
    for i in 0..res {
        let mut h = 0.0;
        let mut v = 0.0;
        for j in 0..res - 1 {
            h += (screen_positions[i][j + 1] - screen_positions[i][j]).mag();
            v += (screen_positions[j + 1][i] - screen_positions[j][i]).mag();
        }
        hlen = hlen.max(h);
        vlen = vlen.max(v);
    }

    RangeBound { bbox, hlen, vlen }
}

/// Decides what happens to a range. Pure, the same inputs always classify the same way.
pub fn classify(range: &PatchRange, patches: &PatchBuffer, parameters: &BoundParameters) -> Classification {
    let bound = bound_patch_range(range, patches, parameters);
    classify_bound(range, &bound, parameters)
}

pub fn classify_bound(range: &PatchRange, bound: &RangeBound, parameters: &BoundParameters) -> Classification {
    if parameters.projection.bound(&bound.bbox).is_none() {
        return Classification::Cull(CullReason::Frustum);
    }

    // the depth cap wins over every split, including near plane straddling
    let can_split = range.depth < parameters.max_split_depth;

    if bound.bbox.min.z < 0.0 && bound.bbox.max.z > 0.0 {
        if !can_split {
            return Classification::Cull(CullReason::SplitDepth);
        }
        let uv_size = range.uv_size();
        return if uv_size.x < uv_size.y {
            Classification::Split(SplitDirection::Vertical)
        } else {
            Classification::Split(SplitDirection::Horizontal)
        };
    }

    if bound.hlen <= parameters.split_limit && bound.vlen <= parameters.split_limit {
        Classification::Draw
    } else if !can_split {
        Classification::Cull(CullReason::SplitDepth)
    } else if bound.hlen > bound.vlen {
        Classification::Split(SplitDirection::Vertical)
    } else {
        Classification::Split(SplitDirection::Horizontal)
    }
}

/// Adaptive bound&split engine, one implementation per scheduling strategy.
///
/// A traversal starts with `init`, then `step` is called until `is_drained`. Every step
/// produces one batch (possibly empty) in the next ring slot. `rasterizer_done` is the
/// done signal of the batch returned by the previous step, the slot holding that batch
/// is not written again before it fires.
pub trait BoundNSplit: Send {
    fn method(&self) -> BoundNSplitMethod;

    fn init(
        &mut self,
        patches: Arc<PatchBuffer>,
        modelview: Mat4,
        projection: &Projection,
        statistics: &mut Statistics,
    ) -> BoundNSplitResult<()>;

    fn is_drained(&self) -> bool;

    fn step(&mut self, rasterizer_done: &Event, statistics: &mut Statistics) -> BoundNSplitResult<Batch>;

    /// Waits for every batch slot in flight and rewinds the ring, called at frame end.
    fn finish(&mut self, rasterizer_done: &Event);
}

pub fn create_bound_n_split(config: &ReyesConfig) -> BoundNSplitResult<Box<dyn BoundNSplit>> {
    config.validate()?;

    log::info!(
        "bound&split: {}, {} patches per pass, pipeline length {}",
        config.bound_n_split_method,
        config.reyes_patches_per_pass,
        config.bns_pipeline_length
    );

    let bound_n_split: Box<dyn BoundNSplit> = match config.bound_n_split_method {
        BoundNSplitMethod::Cpu => Box::new(BoundNSplitCpu::new(config)),
        BoundNSplitMethod::Multipass => Box::new(BoundNSplitMultipass::new(config)),
        BoundNSplitMethod::BreadthFirst => Box::new(BoundNSplitBreadthFirst::new(config)),
        BoundNSplitMethod::Local => Box::new(BoundNSplitLocal::new(config, false)),
        BoundNSplitMethod::Balanced => Box::new(BoundNSplitLocal::new(config, true)),
    };
    Ok(bound_n_split)
}

/// State shared by every strategy for the patch set currently being traversed.
pub(crate) struct Traversal {
    pub patches: Arc<PatchBuffer>,
    pub parameters: BoundParameters,
    pub capacity: usize,
}

impl Traversal {
    pub fn new(patches: Arc<PatchBuffer>, modelview: Mat4, projection: &Projection, config: &ReyesConfig) -> Self {
        let capacity = config.stack_capacity(patches.patch_count());
        Self {
            patches,
            parameters: BoundParameters::new(modelview, projection, config),
            capacity,
        }
    }

    pub fn patch_count(&self) -> usize {
        self.patches.patch_count()
    }

    pub fn classify(&self, range: &PatchRange) -> Classification {
        classify(range, &self.patches, &self.parameters)
    }

    pub fn check_capacity(&self, live: usize) -> BoundNSplitResult<()> {
        if live > self.capacity {
            log::error!(
                "bound&split stack overflow: {} live ranges, capacity {}, aborting",
                live,
                self.capacity
            );
            return Err(BoundNSplitError::StackOverflow {
                live,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

pub(crate) fn begin_traversal(patches: &PatchBuffer, statistics: &mut Statistics) {
    statistics.add_total_input_patches(patches.patch_count());
    log::trace!(
        "bound&split init: {} {:?} patches",
        patches.patch_count(),
        patches.patch_type()
    );
}

pub(crate) fn record_round(statistics: &mut Statistics, bounds: usize, counts: &CompactionCounts) {
    statistics.add_bounds(bounds);
    statistics.add_patches(counts.draws);
    statistics.add_frustum_culls(counts.frustum_culls);
    statistics.add_split_depth_culls(counts.split_depth_culls);
    statistics.add_batch();
    statistics.inc_pass_count(1);
}

pub(crate) fn missing_traversal() -> BoundNSplitError {
    log::error!("bound&split step called before init");
    BoundNSplitError::InvalidPatchHandle
}
