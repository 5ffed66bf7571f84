// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use micropolis_render::*;

use ultraviolet as utv;
use utv::vec::{Vec3, Vec4};

pub struct SceneObject {
    pub patches: PatchSetHandle,
    pub model: utv::mat::Mat4,
    pub color: Vec4,
}

pub struct SceneParameters {
    pub grid_size: usize,
    pub patch_size: f32,
    pub amplitude: f32,
    pub dome_count: usize,
}

fn terrain_height(x: f32, z: f32, amplitude: f32) -> f32 {
    amplitude * ((x * 0.7).sin() * (z * 0.5).cos() + 0.3 * (x * 1.9 + z * 1.3).sin())
}

// Bicubic patches interpolating the height field on a regular lattice
fn build_terrain(parameters: &SceneParameters) -> Vec<BezierPatch> {
    let grid_size = parameters.grid_size;
    let origin = -0.5 * parameters.patch_size * grid_size as f32;
    let step = parameters.patch_size / 3.0;

    let mut patches = Vec::with_capacity(grid_size * grid_size);
    for pu in 0..grid_size {
        for pv in 0..grid_size {
            let mut control_points = [Vec3::zero(); BEZIER_CONTROL_POINTS];
            for i in 0..4 {
                for j in 0..4 {
                    let x = origin + (pu * 3 + i) as f32 * step;
                    let z = origin + (pv * 3 + j) as f32 * step;
                    control_points[4 * i + j] = Vec3::new(x, terrain_height(x, z, parameters.amplitude), z);
                }
            }
            patches.push(BezierPatch::new(control_points));
        }
    }
    patches
}

// Four bulged quadrants making up a closed-looking cap, converted to Gregory form
fn build_dome(radius: f32) -> Vec<[Vec3; GREGORY_CONTROL_POINTS]> {
    let quadrant = |sign_x: f32, sign_z: f32| {
        let mut patch = BezierPatch::bilinear(
            Vec3::zero(),
            Vec3::new(sign_x * radius, 0.0, 0.0),
            Vec3::new(0.0, 0.0, sign_z * radius),
        );
        for i in 0..4 {
            for j in 0..4 {
                let falloff = (1.0 - i as f32 / 3.0) * (1.0 - j as f32 / 3.0);
                patch.control_points[4 * i + j].y = radius * (0.25 + falloff);
            }
        }
        patch.to_gregory()
    };

    vec![
        quadrant(1.0, 1.0),
        quadrant(-1.0, 1.0),
        quadrant(1.0, -1.0),
        quadrant(-1.0, -1.0),
    ]
}

#[logging_timer::time("info")]
pub fn build_scene<R: Rasterizer>(renderer: &mut Renderer<R>, parameters: &SceneParameters) -> Vec<SceneObject> {
    puffin::profile_function!();

    let terrain = build_terrain(parameters);
    log::info!(
        "terrain: {}x{} bezier patches",
        parameters.grid_size,
        parameters.grid_size
    );

    let mut objects = vec![SceneObject {
        patches: renderer.load_patches(PatchBuffer::from_bezier(&terrain)),
        model: utv::mat::Mat4::identity(),
        color: Vec4::new(0.4, 0.6, 0.3, 1.0),
    }];

    if parameters.dome_count > 0 {
        let dome = renderer.load_patches(PatchBuffer::from_gregory(&build_dome(parameters.patch_size)));
        let ring_radius = 0.25 * parameters.patch_size * parameters.grid_size as f32;
        for index in 0..parameters.dome_count {
            let angle = index as f32 / parameters.dome_count as f32 * std::f32::consts::PI * 2.0;
            let x = angle.cos() * ring_radius;
            let z = angle.sin() * ring_radius;
            objects.push(SceneObject {
                patches: dome,
                model: utv::mat::Mat4::from_translation(Vec3::new(x, terrain_height(x, z, parameters.amplitude), z)),
                color: Vec4::new(0.8, 0.3, 0.2, 1.0),
            });
        }
    }

    objects
}
