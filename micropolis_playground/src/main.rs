// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod orbit_camera;
mod scene;
mod statistics_rasterizer;

use micropolis_render::*;

use ultraviolet as utv;

#[derive(Debug, structopt::StructOpt)]
#[structopt(name = "micropolis_playground", about = "Bound & split playground")]
struct CommandLineOptions {
    #[structopt(short = "f", long = "frames", default_value = "60", help = "Number of frames to render")]
    frame_count: usize,

    #[structopt(long = "width", default_value = "1280", help = "Viewport width in pixels")]
    width: u32,

    #[structopt(long = "height", default_value = "720", help = "Viewport height in pixels")]
    height: u32,

    #[structopt(long = "fovy", default_value = "60", help = "Vertical field of view in degrees")]
    fovy: f32,

    #[structopt(long = "near", default_value = "0.1", help = "Near plane distance")]
    near: f32,

    #[structopt(
        short = "m",
        long = "method",
        default_value = "multipass",
        help = "Bound & split strategy: cpu, multipass, breadth_first, local or balanced"
    )]
    bound_n_split_method: BoundNSplitMethod,

    #[structopt(long = "patches_per_pass", default_value = "2048", help = "Batch capacity")]
    reyes_patches_per_pass: usize,

    #[structopt(long = "max_split_depth", default_value = "23", help = "Split depth ceiling")]
    max_split_depth: u32,

    #[structopt(
        long = "split_limit",
        default_value = "8",
        help = "Screen space extent in pixels below which a range is drawn"
    )]
    bound_n_split_limit: f32,

    #[structopt(long = "sample_rate", default_value = "3", help = "Bound samples per uv axis")]
    bound_sample_rate: usize,

    #[structopt(long = "cull_ribbon", default_value = "16", help = "Screen border tolerance in pixels")]
    cull_ribbon: f32,

    #[structopt(long = "pipeline_length", default_value = "2", help = "Batches in flight")]
    bns_pipeline_length: usize,

    #[structopt(long = "work_groups", default_value = "32", help = "Work groups of local strategies")]
    local_bns_work_groups: usize,

    #[structopt(long = "work_group_size", default_value = "64", help = "Ranges per work group and pass")]
    local_bns_work_group_size: usize,

    #[structopt(long = "dummy_render", help = "Runs bound & split without handing batches to the rasterizer")]
    dummy_render: bool,

    #[structopt(long = "grid_size", default_value = "16", help = "Terrain patches per side")]
    grid_size: usize,

    #[structopt(long = "domes", default_value = "6", help = "Number of Gregory domes on the terrain")]
    dome_count: usize,

    #[structopt(long = "dice_grid", default_value = "8", help = "Micropolygon grid size per drawn range")]
    dice_grid_size: usize,

    #[structopt(long = "orbit_speed", default_value = "20", help = "Camera orbit speed in degrees per second")]
    orbit_speed: f32,

    #[structopt(long = "profile", help = "Enables puffin profiler scopes")]
    enable_profiling: bool,
}

impl CommandLineOptions {
    fn reyes_config(&self) -> ReyesConfig {
        ReyesConfig {
            reyes_patches_per_pass: self.reyes_patches_per_pass,
            max_split_depth: self.max_split_depth,
            bound_n_split_limit: self.bound_n_split_limit,
            bound_sample_rate: self.bound_sample_rate,
            cull_ribbon: self.cull_ribbon,
            bns_pipeline_length: self.bns_pipeline_length,
            bound_n_split_method: self.bound_n_split_method,
            local_bns_work_groups: self.local_bns_work_groups,
            local_bns_work_group_size: self.local_bns_work_group_size,
            dummy_render: self.dummy_render,
        }
    }
}

struct Playground {
    renderer: Renderer<statistics_rasterizer::StatisticsRasterizer>,
    camera: orbit_camera::OrbitCamera,
    objects: Vec<scene::SceneObject>,
}

impl Playground {
    fn new(command_line: &CommandLineOptions) -> BoundNSplitResult<Self> {
        let mut renderer = Renderer::new(
            command_line.reyes_config(),
            statistics_rasterizer::StatisticsRasterizer::new(command_line.dice_grid_size),
        )?;

        let scene_parameters = scene::SceneParameters {
            grid_size: command_line.grid_size,
            patch_size: 2.0,
            amplitude: 1.5,
            dome_count: command_line.dome_count,
        };
        let objects = scene::build_scene(&mut renderer, &scene_parameters);

        let projection = Projection::new(
            command_line.fovy,
            command_line.near,
            [command_line.width, command_line.height],
            command_line.cull_ribbon,
        );
        let extent = scene_parameters.patch_size * command_line.grid_size as f32;
        let camera = orbit_camera::OrbitCamera::new(
            projection,
            utv::vec::Vec3::zero(),
            extent * 0.6,
            extent * 0.25,
            command_line.orbit_speed,
        );

        Ok(Self {
            renderer,
            camera,
            objects,
        })
    }

    #[logging_timer::time("info")]
    fn render(&mut self, delta_time: f32) -> BoundNSplitResult<()> {
        puffin::profile_function!();

        self.camera.update(delta_time);
        let view = self.camera.calculate_view();

        self.renderer.prepare(self.camera.get_projection().clone())?;
        let mut result = Ok(());
        for object in &self.objects {
            result = self
                .renderer
                .draw_patches(object.patches, view * object.model, object.color);
            if result.is_err() {
                break;
            }
        }
        // the frame is closed even when a draw aborted it
        self.renderer.finish()?;
        result
    }
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let command_line = {
        use structopt::StructOpt;
        CommandLineOptions::from_args()
    };
    log::info!("command line: {:?}", &command_line);
    puffin::set_scopes_on(command_line.enable_profiling);

    let mut playground = match Playground::new(&command_line) {
        Ok(playground) => playground,
        Err(error) => {
            log::error!("failed to create playground: {}", error);
            std::process::exit(1);
        }
    };

    let delta_time = 1.0 / 60.0;
    for _ in 0..command_line.frame_count {
        if let Err(error) = playground.render(delta_time) {
            log::error!("frame failed: {}", error);
        }
        playground.renderer.statistics().print();
        playground.renderer.rasterizer().report();
    }
}
