// Copyright (c) 2020-2021 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// N-way ring of resources, one per in-flight pipeline slot.
///
/// The cursor counts acquisitions, so `current_mut()` is the slot handed out by
/// the most recent `advance()`.
pub struct RingLocal<T> {
    ring_resources: Vec<T>,
    next_slot: usize,
}

impl<T> RingLocal<T> {
    pub fn new<F>(ring_length: usize, mut closure: F) -> Self
    where
        F: FnMut(usize) -> T,
    {
        assert!(ring_length > 0, "ring length must be at least 1");
        Self {
            ring_resources: (0..ring_length).map(|slot| closure(slot)).collect(),
            next_slot: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.ring_resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ring_resources.is_empty()
    }

    pub fn acquisition_count(&self) -> usize {
        self.next_slot
    }

    pub fn advance(&mut self) -> &mut T {
        let slot = self.next_slot % self.ring_resources.len();
        self.next_slot += 1;
        &mut self.ring_resources[slot]
    }

    pub fn current_mut(&mut self) -> Option<&mut T> {
        if self.next_slot == 0 {
            return None;
        }
        let slot = (self.next_slot - 1) % self.ring_resources.len();
        Some(&mut self.ring_resources[slot])
    }

    pub fn get_slot(&self, slot: usize) -> &T {
        &self.ring_resources[slot]
    }

    pub fn reset(&mut self) {
        self.next_slot = 0;
    }

    pub fn for_each_mut<F>(&mut self, mut closure: F)
    where
        F: FnMut(&mut T),
    {
        for resource in &mut self.ring_resources {
            closure(resource);
        }
    }
}
