// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ultraviolet as utv;
use utv::mat::{Mat2, Mat4};
use utv::vec::{Vec2, Vec3};

pub const FAR_PLANE: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Vec3::new(std::f32::INFINITY, std::f32::INFINITY, std::f32::INFINITY),
            max: Vec3::new(std::f32::NEG_INFINITY, std::f32::NEG_INFINITY, std::f32::NEG_INFINITY),
        }
    }

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Vec3>,
    {
        let mut bbox = Self::empty();
        for point in points {
            bbox.add_point(*point);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn add_point(&mut self, point: Vec3) {
        self.min = self.min.min_by_component(point);
        self.max = self.max.max_by_component(point);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min: Vec2,
    pub max: Vec2,
}

/// Per-frame camera parameters shared read-only by every bound&split pass.
#[derive(Debug, Clone)]
pub struct Projection {
    fovy: f32,
    near: f32,
    far: f32,
    viewport: [u32; 2],
    cull_ribbon: f32,
}

impl Projection {
    /// `fovy` is the vertical field of view in degrees.
    pub fn new(fovy: f32, near: f32, viewport: [u32; 2], cull_ribbon: f32) -> Self {
        Self {
            fovy,
            near,
            far: FAR_PLANE,
            viewport,
            cull_ribbon,
        }
    }

    pub fn set_viewport(&mut self, viewport: [u32; 2]) {
        self.viewport = viewport;
    }

    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn viewport(&self) -> [u32; 2] {
        self.viewport
    }

    pub fn screen_size(&self) -> Vec2 {
        Vec2::new(self.viewport[0] as f32, self.viewport[1] as f32)
    }

    pub fn cull_ribbon(&self) -> f32 {
        self.cull_ribbon
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport[1] == 0 {
            1.0
        } else {
            self.viewport[0] as f32 / self.viewport[1] as f32
        }
    }

    /// Focal scale factors in pixels: view-space x/y divided by depth times `f` is the
    /// offset from the viewport center.
    pub fn f(&self) -> Vec2 {
        let fy = 1.0 / (self.fovy * std::f32::consts::PI / 360.0).tan();
        let fx = fy / self.aspect();
        let half_viewport = self.screen_size() * 0.5;
        Vec2::new(fx * half_viewport.x, fy * half_viewport.y)
    }

    pub fn calc_projection(&self) -> Mat4 {
        utv::projection::perspective_gl(self.fovy.to_radians(), self.aspect(), self.near, self.far)
    }

    /// Scales normalized device coordinates to pixels.
    pub fn calc_screen_matrix(&self) -> Mat2 {
        let half_viewport = self.screen_size() * 0.5;
        Mat2::new(Vec2::new(half_viewport.x, 0.0), Vec2::new(0.0, half_viewport.y))
    }

    pub fn bound(&self, bbox: &BoundingBox) -> Option<ScreenRect> {
        project_bbox_to_screen(bbox, self)
    }
}

/// Projects a view-space box to a pixel rectangle, `None` when the box is culled.
///
/// Only the nearest and farthest depth of the box are used, each coordinate is divided
/// by whichever of the two pushes it further out. This under-estimates boxes whose corners
/// project asymmetrically, the renderer relies on exactly this approximation.
pub fn project_bbox_to_screen(bbox: &BoundingBox, projection: &Projection) -> Option<ScreenRect> {
    if bbox.is_empty() {
        return None;
    }

    let n = -bbox.max.z;
    let f = -bbox.min.z;

    if f < projection.near || n > projection.far {
        return None;
    }

    let n = n.max(projection.near);
    let scale = projection.f();
    let half_viewport = projection.screen_size() * 0.5;

    let min = Vec2::new(
        bbox.min.x / (if bbox.min.x < 0.0 { n } else { f }) * scale.x + half_viewport.x,
        bbox.min.y / (if bbox.min.y < 0.0 { n } else { f }) * scale.y + half_viewport.y,
    );
    let max = Vec2::new(
        bbox.max.x / (if bbox.max.x > 0.0 { n } else { f }) * scale.x + half_viewport.x,
        bbox.max.y / (if bbox.max.y > 0.0 { n } else { f }) * scale.y + half_viewport.y,
    );

    let screen_size = projection.screen_size();
    let ribbon = projection.cull_ribbon;
    if min.x > screen_size.x - 1.0 + ribbon
        || max.x < -ribbon
        || min.y > screen_size.y - 1.0 + ribbon
        || max.y < -ribbon
    {
        return None;
    }

    Some(ScreenRect { min, max })
}
