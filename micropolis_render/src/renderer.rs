// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use micropolis_core::*;
use ultraviolet as utv;
use utv::mat::Mat4;
use utv::vec::Vec4;

use crate::batch::*;
use crate::bound_n_split::*;
use crate::config::*;
use crate::error::*;
use crate::patch_store::*;
use crate::projection::*;

#[derive(Debug, Clone)]
pub struct DrawParameters {
    pub modelview: Mat4,
    pub projection: Projection,
    pub color: Vec4,
}

/// Consumer of DRAW batches: dices, shades and samples the ranges.
pub trait Rasterizer {
    /// Frame start.
    fn prepare(&mut self, projection: &Projection) -> BoundNSplitResult<()>;

    /// Queues `batch` behind `wait_list` and returns the signal fired once the batch is
    /// consumed. Batch arrays must not be read before `wait_list` completes.
    fn draw_batch(
        &mut self,
        batch: &Batch,
        wait_list: &WaitList,
        parameters: &DrawParameters,
    ) -> BoundNSplitResult<Event>;

    /// Frame end, `last_batch` is the done signal of the last batch drawn this frame.
    fn finish(&mut self, last_batch: &Event) -> BoundNSplitResult<()>;
}

/// Per-frame driver: bound&split each drawn patch set and stream the batches to the rasterizer.
///
/// ```ignore
/// renderer.prepare(projection)?;
/// renderer.draw_patches(handle, modelview, color)?;
/// renderer.finish()?;
/// renderer.statistics().print();
/// ```
pub struct Renderer<R: Rasterizer> {
    config: ReyesConfig,
    patch_store: PatchStore,
    bound_n_split: Box<dyn BoundNSplit>,
    rasterizer: R,
    statistics: Statistics,
    projection: Option<Projection>,
    last_batch: Event,
}

impl<R: Rasterizer> Renderer<R> {
    pub fn new(config: ReyesConfig, rasterizer: R) -> BoundNSplitResult<Self> {
        let bound_n_split = create_bound_n_split(&config)?;
        Ok(Self {
            config,
            patch_store: PatchStore::new(),
            bound_n_split,
            rasterizer,
            statistics: Statistics::new(),
            projection: None,
            last_batch: Event::null(),
        })
    }

    pub fn config(&self) -> &ReyesConfig {
        &self.config
    }

    pub fn bound_n_split_method(&self) -> BoundNSplitMethod {
        self.bound_n_split.method()
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    pub fn rasterizer_mut(&mut self) -> &mut R {
        &mut self.rasterizer
    }

    pub fn patch_store(&self) -> &PatchStore {
        &self.patch_store
    }

    pub fn load_patches(&mut self, patches: PatchBuffer) -> PatchSetHandle {
        self.patch_store.load(patches)
    }

    pub fn are_patches_loaded(&self, handle: PatchSetHandle) -> bool {
        self.patch_store.is_loaded(handle)
    }

    pub fn delete_patches(&mut self, handle: PatchSetHandle) -> BoundNSplitResult<()> {
        self.patch_store.delete(handle)
    }

    pub fn prepare(&mut self, projection: Projection) -> BoundNSplitResult<()> {
        puffin::profile_function!();

        self.statistics.start_render();
        self.rasterizer.prepare(&projection)?;
        self.projection = Some(projection);
        Ok(())
    }

    pub fn draw_patches(&mut self, handle: PatchSetHandle, modelview: Mat4, color: Vec4) -> BoundNSplitResult<()> {
        puffin::profile_function!();

        let result = self.bound_n_split_patches(handle, modelview, color);
        if let Err(error) = &result {
            log::error!("frame aborted: {}", error);
            self.bound_n_split.finish(&self.last_batch);
        }
        result
    }

    pub fn finish(&mut self) -> BoundNSplitResult<()> {
        puffin::profile_function!();

        self.bound_n_split.finish(&self.last_batch);
        let result = self.rasterizer.finish(&self.last_batch);

        self.last_batch = Event::null();
        self.projection = None;
        self.statistics.end_render();
        (*puffin::GlobalProfiler::lock()).new_frame();

        result
    }

    fn bound_n_split_patches(
        &mut self,
        handle: PatchSetHandle,
        modelview: Mat4,
        color: Vec4,
    ) -> BoundNSplitResult<()> {
        let projection = self.projection.clone().ok_or_else(|| {
            BoundNSplitError::InvalidConfig("draw_patches called outside of prepare and finish".to_string())
        })?;
        let patches = self.patch_store.get_patch_buffer(handle)?;

        self.bound_n_split
            .init(patches, modelview, &projection, &mut self.statistics)?;

        let parameters = DrawParameters {
            modelview,
            projection,
            color,
        };
        while !self.bound_n_split.is_drained() {
            let batch = self.bound_n_split.step(&self.last_batch, &mut self.statistics)?;
            self.last_batch = self.send_batch(&batch, &parameters)?;
        }
        Ok(())
    }

    fn send_batch(&mut self, batch: &Batch, parameters: &DrawParameters) -> BoundNSplitResult<Event> {
        if batch.is_empty() {
            return Ok(self.last_batch.clone());
        }

        let wait_list = WaitList::from_event(batch.ready()).and(&self.last_batch);
        self.rasterizer.draw_batch(batch, &wait_list, parameters)
    }
}
