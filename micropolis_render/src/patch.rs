// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ultraviolet as utv;
use utv::mat::Mat4;
use utv::vec::{Vec2, Vec3, Vec4};

use crate::projection::*;

pub const BEZIER_CONTROL_POINTS: usize = 16;
pub const GREGORY_CONTROL_POINTS: usize = 20;

/// Bicubic Bézier patch, control point `4 * i + j` is weighted by `B_i(u) * B_j(v)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierPatch {
    pub control_points: [Vec3; BEZIER_CONTROL_POINTS],
}

impl BezierPatch {
    pub fn new(control_points: [Vec3; BEZIER_CONTROL_POINTS]) -> Self {
        Self { control_points }
    }

    /// Flat patch spanning `origin + u * edge_u + v * edge_v`.
    pub fn bilinear(origin: Vec3, edge_u: Vec3, edge_v: Vec3) -> Self {
        let mut control_points = [Vec3::zero(); BEZIER_CONTROL_POINTS];
        for i in 0..4 {
            for j in 0..4 {
                control_points[i * 4 + j] = origin + edge_u * (i as f32 / 3.0) + edge_v * (j as f32 / 3.0);
            }
        }
        Self { control_points }
    }

    pub fn eval(&self, uv: Vec2) -> Vec3 {
        eval_bezier(&self.control_points, uv)
    }

    pub fn transform(&self, matrix: &Mat4) -> Self {
        let mut control_points = self.control_points;
        for point in control_points.iter_mut() {
            *point = matrix.transform_point3(*point);
        }
        Self { control_points }
    }

    /// Bounding box of the control points, which contains the whole surface.
    pub fn bbox(&self) -> BoundingBox {
        BoundingBox::from_points(self.control_points.iter())
    }

    /// Halves the patch at u = 0.5.
    pub fn hsplit(&self) -> (Self, Self) {
        let mut low = [Vec3::zero(); BEZIER_CONTROL_POINTS];
        let mut high = [Vec3::zero(); BEZIER_CONTROL_POINTS];
        for j in 0..4 {
            let curve = [
                self.control_points[j],
                self.control_points[4 + j],
                self.control_points[8 + j],
                self.control_points[12 + j],
            ];
            let (l, h) = de_casteljau_halve(curve);
            for i in 0..4 {
                low[i * 4 + j] = l[i];
                high[i * 4 + j] = h[i];
            }
        }
        (Self::new(low), Self::new(high))
    }

    /// Halves the patch at v = 0.5.
    pub fn vsplit(&self) -> (Self, Self) {
        let mut low = [Vec3::zero(); BEZIER_CONTROL_POINTS];
        let mut high = [Vec3::zero(); BEZIER_CONTROL_POINTS];
        for i in 0..4 {
            let curve = [
                self.control_points[i * 4],
                self.control_points[i * 4 + 1],
                self.control_points[i * 4 + 2],
                self.control_points[i * 4 + 3],
            ];
            let (l, h) = de_casteljau_halve(curve);
            low[i * 4..i * 4 + 4].copy_from_slice(&l);
            high[i * 4..i * 4 + 4].copy_from_slice(&h);
        }
        (Self::new(low), Self::new(high))
    }

    /// Gregory control points describing the same surface.
    pub fn to_gregory(&self) -> [Vec3; GREGORY_CONTROL_POINTS] {
        let b = &self.control_points;
        [
            // corners
            b[0], b[3], b[15], b[12],
            // edges
            b[1], b[7], b[14], b[8], b[4], b[2], b[11], b[13],
            // interior twins
            b[5], b[6], b[10], b[9],
            b[5], b[6], b[10], b[9],
        ]
    }
}

fn de_casteljau_halve(p: [Vec3; 4]) -> ([Vec3; 4], [Vec3; 4]) {
    let p01 = (p[0] + p[1]) * 0.5;
    let p12 = (p[1] + p[2]) * 0.5;
    let p23 = (p[2] + p[3]) * 0.5;
    let p012 = (p01 + p12) * 0.5;
    let p123 = (p12 + p23) * 0.5;
    let mid = (p012 + p123) * 0.5;
    ([p[0], p01, p012, mid], [mid, p123, p23, p[3]])
}

#[inline]
fn bernstein(t: f32) -> [f32; 4] {
    let s = 1.0 - t;
    [s * s * s, 3.0 * t * s * s, 3.0 * t * t * s, t * t * t]
}

/// Evaluates 16 control points in Bernstein form.
pub fn eval_bezier(control_points: &[Vec3], uv: Vec2) -> Vec3 {
    debug_assert!(control_points.len() >= BEZIER_CONTROL_POINTS);

    let bu = bernstein(uv.x);
    let bv = bernstein(uv.y);

    let mut p = Vec3::zero();
    for i in 0..4 {
        let mut row = Vec3::zero();
        for j in 0..4 {
            row += control_points[i * 4 + j] * bv[j];
        }
        p += row * bu[i];
    }
    p
}

/// Evaluates 20 Gregory control points: 4 corners, 8 edge points and 4 pairs of interior
/// points blended rationally towards their edges.
pub fn eval_gregory(control_points: &[Vec3], uv: Vec2) -> Vec3 {
    debug_assert!(control_points.len() >= GREGORY_CONTROL_POINTS);

    let p = control_points;
    let u = uv.x;
    let v = uv.y;

    let f0 = blend_interior(u, p[12], v, p[16]);
    let f1 = blend_interior(1.0 - u, p[17], v, p[13]);
    let f2 = blend_interior(1.0 - u, p[14], 1.0 - v, p[18]);
    let f3 = blend_interior(u, p[19], 1.0 - v, p[15]);

    let bezier = [
        p[0], p[4], p[9], p[1], //
        p[8], f0, f1, p[5], //
        p[7], f3, f2, p[10], //
        p[3], p[11], p[6], p[2],
    ];
    eval_bezier(&bezier, uv)
}

#[inline]
fn blend_interior(wa: f32, a: Vec3, wb: f32, b: Vec3) -> Vec3 {
    let weight = wa + wb;
    if weight.abs() <= std::f32::EPSILON {
        // the blend is singular at the matching corner, both twins have no influence there
        (a + b) * 0.5
    } else {
        (a * wa + b * wb) / weight
    }
}

/// Applies `matrix` to a point, keeping the homogeneous coordinate.
pub fn transform_point4(matrix: &Mat4, point: Vec3) -> Vec4 {
    *matrix * Vec4::new(point.x, point.y, point.z, 1.0)
}
