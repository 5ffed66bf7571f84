// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ultraviolet::vec::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitDirection {
    /// Bisects the u axis.
    Horizontal,
    /// Bisects the v axis.
    Vertical,
}

/// Parametric sub-rectangle of one patch, the unit of work of bound&split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatchRange {
    pub patch_id: u32,
    pub uv_min: Vec2,
    pub uv_max: Vec2,
    pub depth: u32,
}

impl PatchRange {
    pub fn whole(patch_id: u32) -> Self {
        Self {
            patch_id,
            uv_min: Vec2::new(0.0, 0.0),
            uv_max: Vec2::new(1.0, 1.0),
            depth: 0,
        }
    }

    pub fn uv_size(&self) -> Vec2 {
        self.uv_max - self.uv_min
    }

    pub fn split(&self, direction: SplitDirection) -> [PatchRange; 2] {
        match direction {
            SplitDirection::Horizontal => self.hsplit(),
            SplitDirection::Vertical => self.vsplit(),
        }
    }

    pub fn hsplit(&self) -> [PatchRange; 2] {
        let cx = (self.uv_min.x + self.uv_max.x) * 0.5;
        [
            Self {
                patch_id: self.patch_id,
                uv_min: self.uv_min,
                uv_max: Vec2::new(cx, self.uv_max.y),
                depth: self.depth + 1,
            },
            Self {
                patch_id: self.patch_id,
                uv_min: Vec2::new(cx, self.uv_min.y),
                uv_max: self.uv_max,
                depth: self.depth + 1,
            },
        ]
    }

    pub fn vsplit(&self) -> [PatchRange; 2] {
        let cy = (self.uv_min.y + self.uv_max.y) * 0.5;
        [
            Self {
                patch_id: self.patch_id,
                uv_min: self.uv_min,
                uv_max: Vec2::new(self.uv_max.x, cy),
                depth: self.depth + 1,
            },
            Self {
                patch_id: self.patch_id,
                uv_min: Vec2::new(self.uv_min.x, cy),
                uv_max: self.uv_max,
                depth: self.depth + 1,
            },
        ]
    }
}
