// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rayon::prelude::*;

// Must be a power of two
pub const PREFIX_SUM_GROUP_SIZE: usize = 128;

/// Hierarchical work-efficient exclusive scan.
///
/// Each group of `PREFIX_SUM_GROUP_SIZE` items is scanned locally (up-sweep, then
/// down-sweep), group totals are scanned recursively one pyramid level up and
/// added back as group offsets. Groups of one level run in parallel.
pub struct PrefixSum {
    buffer_pyramid: Vec<Vec<u32>>,
    max_input_items: usize,
}

impl PrefixSum {
    pub fn new(max_input_items: usize) -> Self {
        let mut prefix_sum = Self {
            buffer_pyramid: Vec::new(),
            max_input_items: 0,
        };
        prefix_sum.resize(max_input_items);
        prefix_sum
    }

    pub fn max_input_items(&self) -> usize {
        self.max_input_items
    }

    pub fn resize(&mut self, new_max_size: usize) {
        if self.max_input_items >= new_max_size {
            return;
        }
        self.max_input_items = new_max_size;

        self.buffer_pyramid.clear();
        let mut level_size = group_count(new_max_size);
        while level_size > 1 {
            self.buffer_pyramid.push(Vec::with_capacity(level_size));
            level_size = group_count(level_size);
        }
    }

    /// Writes the exclusive scan of `input` into `output` and returns the total.
    pub fn apply(&mut self, input: &[u32], output: &mut [u32]) -> u32 {
        assert_eq!(input.len(), output.len(), "prefix sum input and output sizes differ");
        output.copy_from_slice(input);
        self.apply_in_place(output)
    }

    pub fn apply_in_place(&mut self, values: &mut [u32]) -> u32 {
        puffin::profile_function!();

        self.resize(values.len());
        scan_level(values, &mut self.buffer_pyramid)
    }
}

fn group_count(item_count: usize) -> usize {
    if item_count == 0 {
        0
    } else {
        (item_count - 1) / PREFIX_SUM_GROUP_SIZE + 1
    }
}

fn scan_level(values: &mut [u32], pyramid: &mut [Vec<u32>]) -> u32 {
    if values.len() <= PREFIX_SUM_GROUP_SIZE {
        return scan_group(values);
    }

    match pyramid.split_first_mut() {
        Some((reduced, coarser_levels)) => {
            reduced.clear();
            reduced.resize(group_count(values.len()), 0);

            // reduce
            values
                .par_chunks_mut(PREFIX_SUM_GROUP_SIZE)
                .zip(reduced.par_iter_mut())
                .for_each(|(group, group_total)| *group_total = scan_group(group));

            let total = scan_level(reduced, coarser_levels);

            // accumulate
            values
                .par_chunks_mut(PREFIX_SUM_GROUP_SIZE)
                .zip(reduced.par_iter())
                .for_each(|(group, group_offset)| {
                    for value in group {
                        *value += *group_offset;
                    }
                });

            total
        }
        None => {
            log::warn!("prefix sum pyramid too shallow for {} items, scanning serially", values.len());
            exclusive_scan_serial(values)
        }
    }
}

// Exclusive scan of at most one group, returns the group total
fn scan_group(group: &mut [u32]) -> u32 {
    debug_assert!(group.len() <= PREFIX_SUM_GROUP_SIZE);

    let mut pad = [0u32; PREFIX_SUM_GROUP_SIZE];
    pad[..group.len()].copy_from_slice(group);

    // up-sweep
    let mut stride = 1;
    while stride < PREFIX_SUM_GROUP_SIZE {
        let mut bi = 2 * stride - 1;
        while bi < PREFIX_SUM_GROUP_SIZE {
            pad[bi] += pad[bi - stride];
            bi += 2 * stride;
        }
        stride <<= 1;
    }

    let total = pad[PREFIX_SUM_GROUP_SIZE - 1];
    pad[PREFIX_SUM_GROUP_SIZE - 1] = 0;

    // down-sweep
    let mut stride = PREFIX_SUM_GROUP_SIZE / 2;
    while stride >= 1 {
        let mut bi = 2 * stride - 1;
        while bi < PREFIX_SUM_GROUP_SIZE {
            let ai = bi - stride;
            let left = pad[ai];
            pad[ai] = pad[bi];
            pad[bi] += left;
            bi += 2 * stride;
        }
        stride >>= 1;
    }

    group.copy_from_slice(&pad[..group.len()]);
    total
}

/// Exclusive scan over a small slice on the calling thread.
///
/// Used for per-work-group counters where a parallel dispatch costs more than it saves.
pub fn exclusive_scan_serial(values: &mut [u32]) -> u32 {
    let mut total = 0;
    for value in values.iter_mut() {
        let v = *value;
        *value = total;
        total += v;
    }
    total
}
