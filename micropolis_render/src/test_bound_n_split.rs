// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ultraviolet as utv;
use utv::mat::Mat4;
use utv::vec::{Vec2, Vec3};

use crate::bound_n_split::Traversal;
use crate::*;

type RangeKey = (u32, u32, u32, u32, u32);

fn range_key(patch_id: u32, uv_min: Vec2, uv_max: Vec2) -> RangeKey {
    (
        patch_id,
        uv_min.x.to_bits(),
        uv_min.y.to_bits(),
        uv_max.x.to_bits(),
        uv_max.y.to_bits(),
    )
}

fn test_projection() -> Projection {
    Projection::new(90.0, 0.1, [800, 800], 16.0)
}

// Facing the camera at z = -1, covers 400x400 pixels of an 800x800 viewport
fn camera_facing_square() -> BezierPatch {
    BezierPatch::bilinear(
        Vec3::new(-0.5, -0.5, -1.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    )
}

// Ground plane reaching from behind the camera to far in front of it
fn near_plane_straddler() -> BezierPatch {
    BezierPatch::bilinear(
        Vec3::new(-2.0, -0.5, 1.0),
        Vec3::new(4.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, -6.0),
    )
}

fn behind_camera_square() -> BezierPatch {
    BezierPatch::bilinear(
        Vec3::new(-0.5, -0.5, 2.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
    )
}

fn mixed_scene() -> Arc<PatchBuffer> {
    let mut wavy = camera_facing_square().transform(&Mat4::from_translation(Vec3::new(0.6, 0.2, -1.5)));
    wavy.control_points[5].z += 0.4;
    wavy.control_points[10].z -= 0.3;

    Arc::new(PatchBuffer::from_bezier(&[
        camera_facing_square(),
        near_plane_straddler(),
        behind_camera_square(),
        wavy,
    ]))
}

fn parameters(config: &ReyesConfig) -> BoundParameters {
    BoundParameters::new(Mat4::identity(), &test_projection(), config)
}

// Plain recursion over the split tree
fn reference_traversal(
    range: PatchRange,
    patches: &PatchBuffer,
    parameters: &BoundParameters,
    draws: &mut Vec<RangeKey>,
    depth_culls: &mut usize,
    max_depth: &mut u32,
) {
    *max_depth = (*max_depth).max(range.depth);
    match classify(&range, patches, parameters) {
        Classification::Draw => draws.push(range_key(range.patch_id, range.uv_min, range.uv_max)),
        Classification::Cull(CullReason::SplitDepth) => *depth_culls += 1,
        Classification::Cull(CullReason::Frustum) => {}
        Classification::Split(direction) => {
            for child in range.split(direction).iter() {
                reference_traversal(*child, patches, parameters, draws, depth_culls, max_depth);
            }
        }
    }
}

// Consumes every batch synchronously, the way a blocking rasterizer would
fn drain(
    bound_n_split: &mut dyn BoundNSplit,
    patches: Arc<PatchBuffer>,
    batch_capacity: usize,
    statistics: &mut Statistics,
) -> Vec<RangeKey> {
    bound_n_split
        .init(patches, Mat4::identity(), &test_projection(), statistics)
        .unwrap();

    let mut draws = Vec::new();
    let mut rasterizer_done = Event::null();
    let mut steps = 0;
    while !bound_n_split.is_drained() {
        let batch = bound_n_split.step(&rasterizer_done, statistics).unwrap();
        assert!(batch.count() <= batch_capacity);

        batch.ready().wait();
        draws.extend(batch.ranges().map(|(patch_id, uv_min, uv_max)| range_key(patch_id, uv_min, uv_max)));

        let consumed = UserEvent::new("test rasterizer");
        drop(batch);
        consumed.signal();
        rasterizer_done = consumed.event();

        steps += 1;
        assert!(steps < 1_000_000, "bound&split does not drain");
    }
    bound_n_split.finish(&rasterizer_done);
    draws
}

fn small_config(method: BoundNSplitMethod) -> ReyesConfig {
    ReyesConfig {
        reyes_patches_per_pass: 512,
        max_split_depth: 12,
        bound_n_split_limit: 16.0,
        bns_pipeline_length: 2,
        bound_n_split_method: method,
        local_bns_work_groups: 4,
        local_bns_work_group_size: 8,
        ..Default::default()
    }
}

#[test]
fn test_large_range_splits_on_tie() {
    let config = small_config(BoundNSplitMethod::Cpu);
    let patches = PatchBuffer::from_bezier(&[camera_facing_square()]);
    let parameters = parameters(&config);

    let bound = bound_patch_range(&PatchRange::whole(0), &patches, &parameters);
    assert!((bound.hlen - 400.0).abs() < 0.01, "hlen {}", bound.hlen);
    assert!((bound.vlen - 400.0).abs() < 0.01, "vlen {}", bound.vlen);

    assert_eq!(
        classify(&PatchRange::whole(0), &patches, &parameters),
        Classification::Split(SplitDirection::Horizontal)
    );
}

#[test]
fn test_split_direction_follows_larger_extent() {
    let config = small_config(BoundNSplitMethod::Cpu);
    let patches = PatchBuffer::from_bezier(&[camera_facing_square()]);
    let parameters = parameters(&config);

    // a u half is 200 px wide along u and 400 px along v
    let [u_half, _] = PatchRange::whole(0).hsplit();
    assert_eq!(
        classify(&u_half, &patches, &parameters),
        Classification::Split(SplitDirection::Vertical)
    );

    let [v_half, _] = PatchRange::whole(0).vsplit();
    assert_eq!(
        classify(&v_half, &patches, &parameters),
        Classification::Split(SplitDirection::Horizontal)
    );
}

#[test]
fn test_draw_threshold_is_inclusive() {
    let mut config = small_config(BoundNSplitMethod::Cpu);
    let patches = PatchBuffer::from_bezier(&[camera_facing_square()]);

    let bound = bound_patch_range(&PatchRange::whole(0), &patches, &parameters(&config));
    config.bound_n_split_limit = bound.hlen.max(bound.vlen);

    let parameters = parameters(&config);
    assert_eq!(bound_patch_range(&PatchRange::whole(0), &patches, &parameters), bound);
    assert_eq!(
        classify(&PatchRange::whole(0), &patches, &parameters),
        Classification::Draw
    );
}

#[test]
fn test_patch_behind_camera_is_culled() {
    let config = small_config(BoundNSplitMethod::Cpu);
    let patches = PatchBuffer::from_bezier(&[behind_camera_square()]);
    let parameters = parameters(&config);

    let bound = bound_patch_range(&PatchRange::whole(0), &patches, &parameters);
    assert!(-bound.bbox.max.z < parameters.projection.near());
    assert_eq!(
        classify(&PatchRange::whole(0), &patches, &parameters),
        Classification::Cull(CullReason::Frustum)
    );
}

#[test]
fn test_near_plane_straddling_splits_longer_uv_axis() {
    let config = small_config(BoundNSplitMethod::Cpu);
    let patches = PatchBuffer::from_bezier(&[near_plane_straddler()]);
    let parameters = parameters(&config);

    let whole = PatchRange::whole(0);
    let bound = bound_patch_range(&whole, &patches, &parameters);
    assert!(bound.bbox.min.z < 0.0 && bound.bbox.max.z > 0.0);
    assert_eq!(
        classify(&whole, &patches, &parameters),
        Classification::Split(SplitDirection::Horizontal)
    );

    let narrow = PatchRange {
        uv_max: Vec2::new(0.25, 1.0),
        ..whole
    };
    assert_eq!(
        classify(&narrow, &patches, &parameters),
        Classification::Split(SplitDirection::Vertical)
    );

    let capped = PatchRange {
        depth: config.max_split_depth,
        ..narrow
    };
    assert_eq!(
        classify(&capped, &patches, &parameters),
        Classification::Cull(CullReason::SplitDepth)
    );
}

#[test]
fn test_depth_cap_forces_cull() {
    let config = small_config(BoundNSplitMethod::Cpu);
    let patches = PatchBuffer::from_bezier(&[camera_facing_square()]);
    let parameters = parameters(&config);

    let shallow = PatchRange {
        depth: config.max_split_depth - 1,
        ..PatchRange::whole(0)
    };
    assert!(matches!(
        classify(&shallow, &patches, &parameters),
        Classification::Split(_)
    ));

    let capped = PatchRange {
        depth: config.max_split_depth,
        ..PatchRange::whole(0)
    };
    assert_eq!(
        classify(&capped, &patches, &parameters),
        Classification::Cull(CullReason::SplitDepth)
    );
}

#[test]
fn test_split_children_cover_parent() {
    let parent = PatchRange {
        patch_id: 7,
        uv_min: Vec2::new(0.25, 0.5),
        uv_max: Vec2::new(0.5, 0.625),
        depth: 5,
    };

    for direction in [SplitDirection::Horizontal, SplitDirection::Vertical].iter() {
        let [low, high] = parent.split(*direction);
        for child in [low, high].iter() {
            assert_eq!(child.patch_id, parent.patch_id);
            assert_eq!(child.depth, parent.depth + 1);
        }
        assert_eq!(low.uv_min, parent.uv_min);
        assert_eq!(high.uv_max, parent.uv_max);

        match direction {
            SplitDirection::Horizontal => {
                assert_eq!(low.uv_max.x, high.uv_min.x);
                assert_eq!(low.uv_max.x, 0.375);
                assert_eq!((low.uv_min.y, low.uv_max.y), (parent.uv_min.y, parent.uv_max.y));
                assert_eq!((high.uv_min.y, high.uv_max.y), (parent.uv_min.y, parent.uv_max.y));
            }
            SplitDirection::Vertical => {
                assert_eq!(low.uv_max.y, high.uv_min.y);
                assert_eq!(low.uv_max.y, 0.5625);
                assert_eq!((low.uv_min.x, low.uv_max.x), (parent.uv_min.x, parent.uv_max.x));
                assert_eq!((high.uv_min.x, high.uv_max.x), (parent.uv_min.x, parent.uv_max.x));
            }
        }
    }
}

#[test]
fn test_classification_is_idempotent() {
    let config = small_config(BoundNSplitMethod::Cpu);
    let patches = mixed_scene();
    let parameters = parameters(&config);

    for patch_id in 0..patches.patch_count() as u32 {
        let mut ranges = vec![PatchRange::whole(patch_id)];
        for _ in 0..4 {
            let mut children = Vec::new();
            for range in &ranges {
                children.extend_from_slice(&range.hsplit());
                children.extend_from_slice(&range.vsplit());
            }
            for range in &children {
                assert_eq!(
                    classify(range, &patches, &parameters),
                    classify(range, &patches, &parameters)
                );
            }
            ranges = children;
        }
    }
}

#[test]
fn test_split_depth_terminates() {
    let config = ReyesConfig {
        bound_n_split_limit: 0.5,
        max_split_depth: 9,
        ..Default::default()
    };
    let patches = mixed_scene();
    let parameters = parameters(&config);

    let mut draws = Vec::new();
    let mut depth_culls = 0;
    let mut max_depth = 0;
    for patch_id in 0..patches.patch_count() as u32 {
        reference_traversal(
            PatchRange::whole(patch_id),
            &patches,
            &parameters,
            &mut draws,
            &mut depth_culls,
            &mut max_depth,
        );
    }
    assert!(max_depth <= config.max_split_depth);
    assert!(depth_culls > 0);
}

// Sorted DRAW ranges and depth culls of a plain recursive traversal
fn expected_draws(patches: &PatchBuffer, config: &ReyesConfig) -> (Vec<RangeKey>, usize) {
    let parameters = parameters(config);

    let mut expected = Vec::new();
    let mut expected_depth_culls = 0;
    let mut max_depth = 0;
    for patch_id in 0..patches.patch_count() as u32 {
        reference_traversal(
            PatchRange::whole(patch_id),
            patches,
            &parameters,
            &mut expected,
            &mut expected_depth_culls,
            &mut max_depth,
        );
    }
    expected.sort();
    (expected, expected_depth_culls)
}

#[test]
fn test_every_strategy_draws_the_same_ranges() {
    let _ = pretty_env_logger::try_init();

    let patches = mixed_scene();
    let (expected, expected_depth_culls) = expected_draws(&patches, &small_config(BoundNSplitMethod::Cpu));
    assert!(!expected.is_empty());
    assert!(expected_depth_culls > 0);

    for method in BoundNSplitMethod::ALL.iter() {
        let config = small_config(*method);
        let mut bound_n_split = create_bound_n_split(&config).unwrap();
        assert_eq!(bound_n_split.method(), *method);

        let mut statistics = Statistics::new();
        let mut draws = drain(
            bound_n_split.as_mut(),
            patches.clone(),
            config.reyes_patches_per_pass,
            &mut statistics,
        );
        draws.sort();

        assert_eq!(draws, expected, "{} draws differ", method);
        assert_eq!(statistics.patches_per_frame, expected.len(), "{}", method);
        assert_eq!(statistics.split_depth_culls, expected_depth_culls, "{}", method);
        assert_eq!(statistics.total_input_patches, patches.patch_count());
        assert!(statistics.frustum_culls > 0);
    }
}

#[test]
fn test_tight_batches_draw_the_same_ranges() {
    let _ = pretty_env_logger::try_init();

    let square = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));
    for patches in [square, mixed_scene()].iter() {
        let (expected, expected_depth_culls) = expected_draws(patches, &small_config(BoundNSplitMethod::Cpu));

        for method in BoundNSplitMethod::ALL.iter() {
            let config = ReyesConfig {
                reyes_patches_per_pass: 16,
                local_bns_work_groups: 4,
                local_bns_work_group_size: 4,
                ..small_config(*method)
            };
            let mut bound_n_split = create_bound_n_split(&config).unwrap();
            let mut statistics = Statistics::new();
            let mut draws = drain(bound_n_split.as_mut(), patches.clone(), 16, &mut statistics);
            draws.sort();

            assert_eq!(draws, expected, "{} draws differ", method);
            assert_eq!(statistics.split_depth_culls, expected_depth_culls, "{}", method);
            assert!(
                statistics.max_patches <= config.stack_capacity(patches.patch_count()),
                "{} peaked at {} live ranges",
                method,
                statistics.max_patches
            );
        }
    }
}

#[test]
fn test_whole_tree_is_bounded_once() {
    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));

    for method in BoundNSplitMethod::ALL.iter() {
        let config = small_config(*method);
        let mut bound_n_split = create_bound_n_split(&config).unwrap();
        let mut statistics = Statistics::new();
        let draws = drain(
            bound_n_split.as_mut(),
            patches.clone(),
            config.reyes_patches_per_pass,
            &mut statistics,
        );

        // 5 splits per axis: a full binary tree with 1024 leaves
        assert_eq!(draws.len(), 1024, "{}", method);
        assert_eq!(statistics.bounds_per_frame, 2047, "{}", method);
        assert_eq!(statistics.split_depth_culls, 0);
        assert_eq!(statistics.frustum_culls, 0);
    }
}

#[test]
fn test_stack_overflow_aborts() {
    let _ = pretty_env_logger::try_init();

    let config = ReyesConfig {
        reyes_patches_per_pass: 1,
        max_split_depth: 3,
        ..Default::default()
    };
    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));
    let traversal = Traversal::new(patches, Mat4::identity(), &test_projection(), &config);
    assert_eq!(traversal.capacity, 4);

    assert_eq!(traversal.check_capacity(4), Ok(()));
    assert_eq!(
        traversal.check_capacity(5),
        Err(BoundNSplitError::StackOverflow { live: 5, capacity: 4 })
    );
}

#[test]
fn test_single_range_passes_stay_within_capacity() {
    let _ = pretty_env_logger::try_init();

    // every range splits down to the depth cap: 8 depth culls, nothing drawn
    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));
    for method in BoundNSplitMethod::ALL.iter() {
        let config = ReyesConfig {
            reyes_patches_per_pass: 1,
            max_split_depth: 3,
            bound_n_split_limit: 1.0,
            bound_n_split_method: *method,
            local_bns_work_groups: 1,
            local_bns_work_group_size: 1,
            ..Default::default()
        };
        let mut bound_n_split = create_bound_n_split(&config).unwrap();
        let mut statistics = Statistics::new();
        let draws = drain(bound_n_split.as_mut(), patches.clone(), 1, &mut statistics);

        assert!(draws.is_empty(), "{}", method);
        assert_eq!(statistics.split_depth_culls, 8, "{}", method);
        assert_eq!(statistics.bounds_per_frame, 15, "{}", method);
        assert!(statistics.max_patches <= 4, "{}", method);
    }
}

#[test]
fn test_batch_slot_waits_for_rasterizer() {
    let config = ReyesConfig {
        reyes_patches_per_pass: 16,
        bns_pipeline_length: 1,
        bound_n_split_limit: 16.0,
        bound_n_split_method: BoundNSplitMethod::Cpu,
        ..Default::default()
    };
    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));
    let mut bound_n_split = create_bound_n_split(&config).unwrap();
    let mut statistics = Statistics::new();
    bound_n_split
        .init(patches, Mat4::identity(), &test_projection(), &mut statistics)
        .unwrap();

    let batch = bound_n_split.step(&Event::null(), &mut statistics).unwrap();
    assert_eq!(batch.count(), 16);

    let rasterizer_done = UserEvent::new("slow rasterizer");
    let done_event = rasterizer_done.event();
    let consumed = Arc::new(AtomicBool::new(false));
    let worker = {
        let consumed = consumed.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(50));
            assert_eq!(batch.patch_ids().len(), 16);
            consumed.store(true, Ordering::SeqCst);
            drop(batch);
            rasterizer_done.signal();
        })
    };

    // single slot: the next step has to wait until the batch above is consumed
    let next = bound_n_split.step(&done_event, &mut statistics).unwrap();
    assert!(consumed.load(Ordering::SeqCst));
    assert_eq!(next.slot(), 0);
    worker.join().unwrap();

    drop(next);
    bound_n_split.finish(&Event::null());
}

#[test]
fn test_retained_batch_is_reported() {
    let config = ReyesConfig {
        reyes_patches_per_pass: 16,
        bns_pipeline_length: 1,
        bound_n_split_limit: 16.0,
        bound_n_split_method: BoundNSplitMethod::Multipass,
        ..Default::default()
    };
    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));
    let mut bound_n_split = create_bound_n_split(&config).unwrap();
    let mut statistics = Statistics::new();
    bound_n_split
        .init(patches, Mat4::identity(), &test_projection(), &mut statistics)
        .unwrap();

    let retained = bound_n_split.step(&Event::null(), &mut statistics).unwrap();
    let result = bound_n_split.step(&Event::null(), &mut statistics);
    assert_eq!(result.err(), Some(BoundNSplitError::BatchInUse(0)));
    drop(retained);
}

#[test]
fn test_batch_record_states() {
    let mut record = BatchRecord::new(3, 8);
    assert_eq!(record.status(), BatchRecordStatus::Inactive);
    assert!(record.finish().is_null());

    record.begin().unwrap();
    record.transfer();
    assert_eq!(record.status(), BatchRecordStatus::Inactive);

    record.begin().unwrap().push(&PatchRange::whole(1));
    record.transfer();
    assert_eq!(record.status(), BatchRecordStatus::SetUp);

    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square(), camera_facing_square()]));
    let batch = record.batch(patches.clone(), false);
    assert_eq!(batch.count(), 1);
    assert_eq!(batch.slot(), 3);
    assert!(batch.ready().is_complete());
    assert!(batch.ready().is_null());
    assert_eq!(batch.patch_ids(), &[1]);

    let dummy = record.batch(patches, true);
    assert_eq!(dummy.count(), 0);
    assert_eq!(dummy.produced_count(), 1);
    assert!(dummy.patch_ids().is_empty());
    drop(batch);
    drop(dummy);

    let rasterizer_done = UserEvent::new("rasterizer");
    record.accept(&rasterizer_done.event());
    assert_eq!(record.status(), BatchRecordStatus::Accepted);

    rasterizer_done.signal();
    let waited_for = record.finish();
    assert!(waited_for.same_signal(&rasterizer_done.event()));
    assert_eq!(record.status(), BatchRecordStatus::Inactive);
}

#[test]
fn test_balanced_work_groups_stay_even() {
    let config = small_config(BoundNSplitMethod::Balanced);
    let mut bound_n_split = BoundNSplitLocal::new(&config, true);
    assert_eq!(bound_n_split.work_group_count(), 4);

    let patches = Arc::new(PatchBuffer::from_bezier(&[camera_facing_square()]));
    let mut statistics = Statistics::new();
    bound_n_split
        .init(patches, Mat4::identity(), &test_projection(), &mut statistics)
        .unwrap();
    assert_eq!(bound_n_split.stack_heights(), vec![1, 0, 0, 0]);

    while !bound_n_split.is_drained() {
        let batch = bound_n_split.step(&Event::null(), &mut statistics).unwrap();
        drop(batch);

        let heights = bound_n_split.stack_heights();
        let total: usize = heights.iter().sum();
        let target = (total + heights.len() - 1) / heights.len();
        assert!(heights.iter().all(|height| *height <= target), "{:?}", heights);
    }
    bound_n_split.finish(&Event::null());

    assert_eq!(statistics.bound_n_split_balance.len(), 4);
    assert_eq!(statistics.bound_n_split_balance.iter().sum::<usize>(), 2047);
    assert!(statistics.bound_n_split_balance.iter().all(|processed| *processed > 0));
}

#[test]
fn test_stream_compaction_keeps_order() {
    let ranges: Vec<PatchRange> = (0..6).map(PatchRange::whole).collect();
    let classifications = [
        Classification::Draw,
        Classification::Split(SplitDirection::Horizontal),
        Classification::Cull(CullReason::Frustum),
        Classification::Draw,
        Classification::Split(SplitDirection::Vertical),
        Classification::Cull(CullReason::SplitDepth),
    ];

    let mut compaction = StreamCompaction::new(4);
    let mut draws = BatchBuffers::with_capacity(8);
    let mut children = vec![PatchRange::whole(42)];
    let counts = compaction.compact(&ranges, &classifications, &mut draws, &mut children);

    assert_eq!(
        counts,
        CompactionCounts {
            draws: 2,
            splits: 2,
            frustum_culls: 1,
            split_depth_culls: 1,
        }
    );
    assert_eq!(draws.patch_ids, vec![0, 3]);
    assert_eq!(
        children.iter().map(|range| range.patch_id).collect::<Vec<_>>(),
        vec![42, 1, 1, 4, 4]
    );
    assert_eq!(children[1].uv_max.x, 0.5);
    assert_eq!(children[3].uv_max.y, 0.5);
}

#[test]
fn test_config_validation() {
    assert!(ReyesConfig::default().validate().is_ok());
    assert_eq!(ReyesConfig::default().bound_n_split_method, BoundNSplitMethod::Multipass);

    let invalid = [
        ReyesConfig {
            reyes_patches_per_pass: 0,
            ..Default::default()
        },
        ReyesConfig {
            bound_sample_rate: 1,
            ..Default::default()
        },
        ReyesConfig {
            bound_sample_rate: MAX_BOUND_SAMPLE_RATE + 1,
            ..Default::default()
        },
        ReyesConfig {
            bound_n_split_limit: -1.0,
            ..Default::default()
        },
        ReyesConfig {
            bns_pipeline_length: 0,
            ..Default::default()
        },
    ];
    for config in invalid.iter() {
        assert!(matches!(
            config.validate(),
            Err(BoundNSplitError::InvalidConfig(_))
        ));
        assert!(create_bound_n_split(config).is_err());
    }

    for method in BoundNSplitMethod::ALL.iter() {
        assert_eq!(method.to_string().parse::<BoundNSplitMethod>(), Ok(*method));
    }
    assert!("depth_first".parse::<BoundNSplitMethod>().is_err());
}
