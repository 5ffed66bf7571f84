// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;

use micropolis_render::*;

struct RasterizerJob {
    batch: Batch,
    wait_list: WaitList,
    grid_size: usize,
    done: UserEvent,
}

#[derive(Default)]
struct RasterizerCounters {
    batches: AtomicUsize,
    ranges: AtomicUsize,
    bezier_ranges: AtomicUsize,
    gregory_ranges: AtomicUsize,
    micropolygons: AtomicUsize,
}

/// Stands in for dicing and sampling: a worker thread consumes the batches in order and
/// counts what it would have diced.
pub struct StatisticsRasterizer {
    sender: Option<mpsc::Sender<RasterizerJob>>,
    worker: Option<std::thread::JoinHandle<()>>,
    counters: Arc<RasterizerCounters>,
    dice_grid_size: usize,
}

impl Drop for StatisticsRasterizer {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("rasterizer worker panicked");
            }
        }
    }
}

impl StatisticsRasterizer {
    pub fn new(dice_grid_size: usize) -> Self {
        let (sender, receiver) = mpsc::channel::<RasterizerJob>();
        let counters = Arc::new(RasterizerCounters::default());

        let worker = {
            let counters = counters.clone();
            std::thread::Builder::new()
                .name("rasterizer".to_string())
                .spawn(move || {
                    for job in receiver {
                        puffin::profile_scope!("rasterize batch");
                        job.wait_list.wait();

                        let count = job.batch.count();
                        counters.batches.fetch_add(1, Ordering::Relaxed);
                        counters.ranges.fetch_add(count, Ordering::Relaxed);
                        match job.batch.patch_type() {
                            PatchType::Bezier => counters.bezier_ranges.fetch_add(count, Ordering::Relaxed),
                            PatchType::Gregory => counters.gregory_ranges.fetch_add(count, Ordering::Relaxed),
                        };
                        counters
                            .micropolygons
                            .fetch_add(count * job.grid_size * job.grid_size, Ordering::Relaxed);

                        // the slot is reclaimed by bound&split once done fires
                        drop(job.batch);
                        job.done.signal();
                    }
                })
                .ok()
        };
        if worker.is_none() {
            log::error!("failed to spawn rasterizer worker");
        }

        Self {
            sender: Some(sender),
            worker,
            counters,
            dice_grid_size,
        }
    }

    pub fn report(&self) {
        log::info!(
            "rasterizer: {} batches, {} ranges ({} bezier, {} gregory), {} micropolygons",
            self.counters.batches.load(Ordering::Relaxed),
            self.counters.ranges.load(Ordering::Relaxed),
            self.counters.bezier_ranges.load(Ordering::Relaxed),
            self.counters.gregory_ranges.load(Ordering::Relaxed),
            self.counters.micropolygons.load(Ordering::Relaxed),
        );
    }

    fn reset_counters(&self) {
        self.counters.batches.store(0, Ordering::Relaxed);
        self.counters.ranges.store(0, Ordering::Relaxed);
        self.counters.bezier_ranges.store(0, Ordering::Relaxed);
        self.counters.gregory_ranges.store(0, Ordering::Relaxed);
        self.counters.micropolygons.store(0, Ordering::Relaxed);
    }
}

impl Rasterizer for StatisticsRasterizer {
    fn prepare(&mut self, projection: &Projection) -> BoundNSplitResult<()> {
        log::trace!("rasterizer prepare: viewport {:?}", projection.viewport());
        self.reset_counters();
        Ok(())
    }

    fn draw_batch(
        &mut self,
        batch: &Batch,
        wait_list: &WaitList,
        _parameters: &DrawParameters,
    ) -> BoundNSplitResult<Event> {
        puffin::profile_function!();

        let sender = match (&self.sender, &self.worker) {
            (Some(sender), Some(_)) => sender,
            _ => return Err(BoundNSplitError::Rasterizer("rasterizer worker is not running".to_string())),
        };

        let done = UserEvent::new("rasterizer done");
        let event = done.event();
        sender
            .send(RasterizerJob {
                batch: batch.clone(),
                wait_list: wait_list.clone(),
                grid_size: self.dice_grid_size,
                done,
            })
            .map_err(|error| BoundNSplitError::Rasterizer(error.to_string()))?;

        Ok(event)
    }

    fn finish(&mut self, last_batch: &Event) -> BoundNSplitResult<()> {
        puffin::profile_function!();
        last_batch.wait();
        Ok(())
    }
}
