// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use ultraviolet as utv;
use utv::mat::Mat4;
use utv::vec::{Vec2, Vec3};

use crate::error::*;
use crate::patch::*;
use crate::projection::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchType {
    Bezier,
    Gregory,
}

impl PatchType {
    pub fn control_point_count(self) -> usize {
        match self {
            PatchType::Bezier => BEZIER_CONTROL_POINTS,
            PatchType::Gregory => GREGORY_CONTROL_POINTS,
        }
    }
}

/// Immutable control points of one loaded patch set.
#[derive(Debug, Clone)]
pub struct PatchBuffer {
    patch_type: PatchType,
    control_points: Vec<Vec3>,
}

impl PatchBuffer {
    pub fn new(patch_type: PatchType, control_points: Vec<Vec3>) -> BoundNSplitResult<Self> {
        let stride = patch_type.control_point_count();
        if control_points.len() % stride != 0 {
            return Err(BoundNSplitError::InvalidPatchData {
                len: control_points.len(),
                stride,
            });
        }
        Ok(Self {
            patch_type,
            control_points,
        })
    }

    pub fn from_bezier(patches: &[BezierPatch]) -> Self {
        let mut control_points = Vec::with_capacity(patches.len() * BEZIER_CONTROL_POINTS);
        for patch in patches {
            control_points.extend_from_slice(&patch.control_points);
        }
        Self {
            patch_type: PatchType::Bezier,
            control_points,
        }
    }

    pub fn from_gregory(patches: &[[Vec3; GREGORY_CONTROL_POINTS]]) -> Self {
        let mut control_points = Vec::with_capacity(patches.len() * GREGORY_CONTROL_POINTS);
        for patch in patches {
            control_points.extend_from_slice(patch);
        }
        Self {
            patch_type: PatchType::Gregory,
            control_points,
        }
    }

    pub fn patch_type(&self) -> PatchType {
        self.patch_type
    }

    pub fn patch_count(&self) -> usize {
        self.control_points.len() / self.patch_type.control_point_count()
    }

    pub fn control_points(&self) -> &[Vec3] {
        &self.control_points
    }

    pub fn patch(&self, patch_id: usize) -> &[Vec3] {
        let stride = self.patch_type.control_point_count();
        &self.control_points[patch_id * stride..(patch_id + 1) * stride]
    }

    pub fn eval(&self, patch_id: usize, uv: Vec2) -> Vec3 {
        match self.patch_type {
            PatchType::Bezier => eval_bezier(self.patch(patch_id), uv),
            PatchType::Gregory => eval_gregory(self.patch(patch_id), uv),
        }
    }

    pub fn patch_bbox(&self, patch_id: usize) -> BoundingBox {
        BoundingBox::from_points(self.patch(patch_id).iter())
    }

    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self {
            patch_type: self.patch_type,
            control_points: self
                .control_points
                .iter()
                .map(|point| matrix.transform_point3(*point))
                .collect(),
        }
    }
}

/// Typed identity of a loaded patch set, stale once the set is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatchSetHandle {
    index: u32,
    generation: u32,
}

struct PatchSlot {
    generation: u32,
    buffer: Option<Arc<PatchBuffer>>,
}

#[derive(Default)]
pub struct PatchStore {
    slots: Vec<PatchSlot>,
    free_slots: Vec<u32>,
}

impl PatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(&mut self, buffer: PatchBuffer) -> PatchSetHandle {
        log::info!(
            "loading {} {:?} patches",
            buffer.patch_count(),
            buffer.patch_type()
        );

        let buffer = Some(Arc::new(buffer));
        match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.buffer = buffer;
                PatchSetHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(PatchSlot { generation: 0, buffer });
                PatchSetHandle { index, generation: 0 }
            }
        }
    }

    pub fn is_loaded(&self, handle: PatchSetHandle) -> bool {
        self.slot(handle).is_some()
    }

    pub fn delete(&mut self, handle: PatchSetHandle) -> BoundNSplitResult<()> {
        match self.slots.get_mut(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation && slot.buffer.is_some() => {
                // in-flight batches keep their own reference to the buffer
                slot.buffer = None;
                slot.generation = slot.generation.wrapping_add(1);
                self.free_slots.push(handle.index);
                Ok(())
            }
            _ => Err(BoundNSplitError::InvalidPatchHandle),
        }
    }

    pub fn get_patch_count(&self, handle: PatchSetHandle) -> BoundNSplitResult<usize> {
        Ok(self.get_patch_buffer(handle)?.patch_count())
    }

    pub fn get_patch_type(&self, handle: PatchSetHandle) -> BoundNSplitResult<PatchType> {
        Ok(self.get_patch_buffer(handle)?.patch_type())
    }

    pub fn get_patch_buffer(&self, handle: PatchSetHandle) -> BoundNSplitResult<Arc<PatchBuffer>> {
        self.slot(handle)
            .and_then(|slot| slot.buffer.clone())
            .ok_or(BoundNSplitError::InvalidPatchHandle)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.buffer.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, handle: PatchSetHandle) -> Option<&PatchSlot> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation && slot.buffer.is_some())
    }
}
