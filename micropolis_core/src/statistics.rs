// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::time::{Duration, Instant};

/// Per-frame counters collected by the bound & split engines and the renderer.
///
/// Owned by whoever drives the frame and passed down by reference, the caller
/// decides when to report and reset.
#[derive(Default, Debug, Clone)]
pub struct Statistics {
    pub frames: u64,
    pub total_input_patches: usize,
    pub bounds_per_frame: usize,
    pub patches_per_frame: usize,
    pub batches_per_frame: usize,
    pub pass_count: u64,
    pub max_patches: usize,
    pub split_depth_culls: usize,
    pub frustum_culls: usize,
    pub bound_n_split_balance: Vec<usize>,

    pub bound_n_split_time: Duration,
    pub render_time: Duration,

    render_start: Option<Instant>,
    bound_n_split_start: Option<Instant>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_render(&mut self) {
        self.bounds_per_frame = 0;
        self.patches_per_frame = 0;
        self.batches_per_frame = 0;
        self.pass_count = 0;
        self.max_patches = 0;
        self.split_depth_culls = 0;
        self.frustum_culls = 0;
        self.total_input_patches = 0;
        self.bound_n_split_balance.clear();
        self.bound_n_split_time = Duration::default();
        self.render_time = Duration::default();
        self.render_start = Some(Instant::now());
    }

    pub fn end_render(&mut self) {
        if let Some(start) = self.render_start.take() {
            self.render_time = start.elapsed();
        }
        self.frames += 1;
    }

    pub fn start_bound_n_split(&mut self) {
        self.bound_n_split_start = Some(Instant::now());
    }

    pub fn stop_bound_n_split(&mut self) {
        if let Some(start) = self.bound_n_split_start.take() {
            self.bound_n_split_time += start.elapsed();
        }
    }

    pub fn add_patches(&mut self, patches: usize) {
        self.patches_per_frame += patches;
    }

    pub fn add_bounds(&mut self, bounds: usize) {
        self.bounds_per_frame += bounds;
    }

    pub fn add_batch(&mut self) {
        self.batches_per_frame += 1;
    }

    pub fn inc_pass_count(&mut self, count: u64) {
        self.pass_count += count;
    }

    pub fn update_max_patches(&mut self, current_patches: usize) {
        self.max_patches = self.max_patches.max(current_patches);
    }

    pub fn add_split_depth_culls(&mut self, culls: usize) {
        self.split_depth_culls += culls;
    }

    pub fn add_frustum_culls(&mut self, culls: usize) {
        self.frustum_culls += culls;
    }

    pub fn add_total_input_patches(&mut self, patches: usize) {
        self.total_input_patches += patches;
    }

    pub fn set_bound_n_split_balance(&mut self, processed: &[usize]) {
        self.bound_n_split_balance.clear();
        self.bound_n_split_balance.extend_from_slice(processed);
    }

    pub fn ms_bound_n_split(&self) -> f32 {
        self.bound_n_split_time.as_secs_f32() * 1000.0
    }

    pub fn ms_per_frame(&self) -> f32 {
        self.render_time.as_secs_f32() * 1000.0
    }

    pub fn print(&self) {
        log::info!(
            "frame {}: {:.2} ms, bound&split {:.2} ms, {} input patches, {} bounds, {} patches, {} batches, {} passes, {} max live",
            self.frames,
            self.ms_per_frame(),
            self.ms_bound_n_split(),
            self.total_input_patches,
            self.bounds_per_frame,
            self.patches_per_frame,
            self.batches_per_frame,
            self.pass_count,
            self.max_patches,
        );
        if self.split_depth_culls > 0 {
            log::warn!(
                "split depth limit reached, {} ranges culled this frame",
                self.split_depth_culls
            );
        }
        if !self.bound_n_split_balance.is_empty() {
            let min = self.bound_n_split_balance.iter().min().copied().unwrap_or(0);
            let max = self.bound_n_split_balance.iter().max().copied().unwrap_or(0);
            log::info!(
                "bound&split balance over {} work groups: min {} max {}",
                self.bound_n_split_balance.len(),
                min,
                max
            );
        }
    }
}
