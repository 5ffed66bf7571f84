// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ultraviolet as utv;
use utv::mat::Mat4;
use utv::vec::{Vec2, Vec3};

use crate::*;

fn assert_close(a: Vec3, b: Vec3) {
    assert!((a - b).mag() < 1e-4, "{:?} != {:?}", a, b);
}

fn curved_patch() -> BezierPatch {
    let mut control_points = [Vec3::zero(); BEZIER_CONTROL_POINTS];
    for i in 0..4 {
        for j in 0..4 {
            let height = ((i * 7 + j * 3) % 5) as f32 * 0.25;
            control_points[i * 4 + j] = Vec3::new(i as f32, j as f32, height);
        }
    }
    BezierPatch::new(control_points)
}

fn sample_uvs() -> Vec<Vec2> {
    let mut uvs = Vec::new();
    for u in 0..=4 {
        for v in 0..=4 {
            uvs.push(Vec2::new(u as f32 * 0.25, v as f32 * 0.25));
        }
    }
    uvs.push(Vec2::new(0.1, 0.7));
    uvs.push(Vec2::new(0.93, 0.02));
    uvs
}

#[test]
fn test_bezier_corners_interpolate() {
    let patch = curved_patch();
    assert_close(patch.eval(Vec2::new(0.0, 0.0)), patch.control_points[0]);
    assert_close(patch.eval(Vec2::new(0.0, 1.0)), patch.control_points[3]);
    assert_close(patch.eval(Vec2::new(1.0, 0.0)), patch.control_points[12]);
    assert_close(patch.eval(Vec2::new(1.0, 1.0)), patch.control_points[15]);
}

#[test]
fn test_bilinear_patch_is_flat() {
    let origin = Vec3::new(-1.0, -2.0, -3.0);
    let edge_u = Vec3::new(2.0, 0.0, 0.0);
    let edge_v = Vec3::new(0.0, 4.0, 0.0);
    let patch = BezierPatch::bilinear(origin, edge_u, edge_v);

    for uv in sample_uvs() {
        assert_close(patch.eval(uv), origin + edge_u * uv.x + edge_v * uv.y);
    }
}

#[test]
fn test_patch_halving_matches_reparametrization() {
    let patch = curved_patch();
    let (left, right) = patch.hsplit();
    let (bottom, top) = patch.vsplit();

    for uv in sample_uvs() {
        assert_close(left.eval(uv), patch.eval(Vec2::new(uv.x * 0.5, uv.y)));
        assert_close(right.eval(uv), patch.eval(Vec2::new(0.5 + uv.x * 0.5, uv.y)));
        assert_close(bottom.eval(uv), patch.eval(Vec2::new(uv.x, uv.y * 0.5)));
        assert_close(top.eval(uv), patch.eval(Vec2::new(uv.x, 0.5 + uv.y * 0.5)));
    }
}

#[test]
fn test_gregory_from_bezier_is_the_same_surface() {
    let patch = curved_patch();
    let gregory = patch.to_gregory();

    // includes the four corners where the interior blend is singular
    for uv in sample_uvs() {
        assert_close(eval_gregory(&gregory, uv), patch.eval(uv));
    }
}

#[test]
fn test_patch_transform_commutes_with_eval() {
    let patch = curved_patch();
    let matrix = Mat4::from_translation(Vec3::new(1.0, -2.0, 5.0)) * Mat4::from_rotation_y(0.7);
    let transformed = patch.transform(&matrix);

    for uv in sample_uvs() {
        assert_close(transformed.eval(uv), matrix.transform_point3(patch.eval(uv)));
    }
}

#[test]
fn test_control_point_bbox_contains_surface() {
    let patch = curved_patch();
    let bbox = patch.bbox();
    for uv in sample_uvs() {
        let p = patch.eval(uv);
        assert!(p.x >= bbox.min.x - 1e-5 && p.x <= bbox.max.x + 1e-5);
        assert!(p.y >= bbox.min.y - 1e-5 && p.y <= bbox.max.y + 1e-5);
        assert!(p.z >= bbox.min.z - 1e-5 && p.z <= bbox.max.z + 1e-5);
    }
}

#[test]
fn test_patch_buffer_dispatches_on_type() {
    let patch = curved_patch();
    let bezier = PatchBuffer::from_bezier(&[patch, patch]);
    let gregory = PatchBuffer::from_gregory(&[patch.to_gregory()]);

    assert_eq!(bezier.patch_count(), 2);
    assert_eq!(bezier.patch_type(), PatchType::Bezier);
    assert_eq!(gregory.patch_count(), 1);
    assert_eq!(gregory.patch_type(), PatchType::Gregory);

    let uv = Vec2::new(0.3, 0.6);
    assert_close(bezier.eval(1, uv), gregory.eval(0, uv));

    let invalid = PatchBuffer::new(PatchType::Gregory, vec![Vec3::zero(); 16]);
    assert_eq!(
        invalid.err(),
        Some(BoundNSplitError::InvalidPatchData { len: 16, stride: 20 })
    );
}

#[test]
fn test_patch_store_handles() {
    let _ = pretty_env_logger::try_init();

    let patch = curved_patch();
    let mut store = PatchStore::new();

    let first = store.load(PatchBuffer::from_bezier(&[patch]));
    let second = store.load(PatchBuffer::from_bezier(&[patch, patch, patch]));
    assert!(store.is_loaded(first));
    assert_eq!(store.get_patch_count(second), Ok(3));
    assert_eq!(store.get_patch_type(first), Ok(PatchType::Bezier));
    assert_eq!(store.len(), 2);

    let in_flight = store.get_patch_buffer(first).unwrap();
    store.delete(first).unwrap();
    assert!(!store.is_loaded(first));
    assert_eq!(in_flight.patch_count(), 1);
    assert_eq!(store.delete(first), Err(BoundNSplitError::InvalidPatchHandle));
    assert_eq!(
        store.get_patch_buffer(first).err(),
        Some(BoundNSplitError::InvalidPatchHandle)
    );

    // the freed slot is reused, the stale handle stays invalid
    let third = store.load(PatchBuffer::from_gregory(&[patch.to_gregory()]));
    assert_ne!(third, first);
    assert!(!store.is_loaded(first));
    assert_eq!(store.get_patch_type(third), Ok(PatchType::Gregory));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_focal_scale_and_screen_matrix() {
    let projection = Projection::new(90.0, 0.1, [800, 600], 16.0);
    let f = projection.f();
    assert!((f.y - 300.0).abs() < 1e-3);
    assert!((f.x - 300.0).abs() < 1e-3);

    let screen = projection.calc_screen_matrix() * Vec2::new(1.0, -1.0);
    assert!((screen.x - 400.0).abs() < 1e-4);
    assert!((screen.y + 300.0).abs() < 1e-4);
}

#[test]
fn test_project_bbox_to_screen() {
    let projection = Projection::new(90.0, 0.1, [800, 800], 16.0);

    let in_front = BoundingBox::new(Vec3::new(-0.5, -0.5, -1.0), Vec3::new(0.5, 0.5, -1.0));
    let rect = project_bbox_to_screen(&in_front, &projection).unwrap();
    assert!((rect.min.x - 200.0).abs() < 1e-3 && (rect.min.y - 200.0).abs() < 1e-3);
    assert!((rect.max.x - 600.0).abs() < 1e-3 && (rect.max.y - 600.0).abs() < 1e-3);

    let behind_near = BoundingBox::new(Vec3::new(-0.5, -0.5, -0.05), Vec3::new(0.5, 0.5, -0.01));
    assert!(project_bbox_to_screen(&behind_near, &projection).is_none());

    let behind_camera = BoundingBox::new(Vec3::new(-0.5, -0.5, 1.0), Vec3::new(0.5, 0.5, 2.0));
    assert!(projection.bound(&behind_camera).is_none());

    let beyond_far = BoundingBox::new(Vec3::new(-0.5, -0.5, -2000.0), Vec3::new(0.5, 0.5, -1500.0));
    assert!(projection.bound(&beyond_far).is_none());

    // 2.0 / 1.0 * 400 + 400 = 1200 px, well right of the screen
    let off_screen = BoundingBox::new(Vec3::new(2.0, -0.5, -1.0), Vec3::new(3.0, 0.5, -1.0));
    assert!(projection.bound(&off_screen).is_none());

    // starts 10 px right of the last column, inside the 16 px ribbon
    let in_ribbon_x = (799.0 + 10.0 - 400.0) / 400.0;
    let in_ribbon = BoundingBox::new(
        Vec3::new(in_ribbon_x, -0.5, -1.0),
        Vec3::new(in_ribbon_x + 0.5, 0.5, -1.0),
    );
    assert!(projection.bound(&in_ribbon).is_some());

    let nothing = BoundingBox::from_points(std::iter::empty());
    assert!(nothing.is_empty());
    assert!(projection.bound(&nothing).is_none());
    assert!(!in_front.is_empty());
}
