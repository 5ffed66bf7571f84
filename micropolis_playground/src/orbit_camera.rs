// Copyright (c) 2020 Kyrylo Bazhenov
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.

use micropolis_render::*;

use ultraviolet as utv;

pub struct OrbitCamera {
    projection: Projection,
    target: utv::vec::Vec3,
    distance: f32,
    height: f32,

    rotation_speed: f32,
    angle: f32,
}

impl OrbitCamera {
    pub fn new(projection: Projection, target: utv::vec::Vec3, distance: f32, height: f32, rotation_speed: f32) -> Self {
        Self {
            projection,
            target,
            distance,
            height,

            rotation_speed,
            angle: 0.0,
        }
    }

    pub fn update(&mut self, delta_time: f32) {
        self.angle = (self.angle + self.rotation_speed * delta_time) % 360.0;
    }

    pub fn get_projection(&self) -> &Projection {
        &self.projection
    }

    pub fn get_position(&self) -> utv::vec::Vec3 {
        let angle = self.angle.to_radians();
        self.target
            + utv::vec::Vec3::new(
                angle.cos() * self.distance,
                self.height,
                angle.sin() * self.distance,
            )
    }

    pub fn calculate_view(&self) -> utv::mat::Mat4 {
        utv::mat::Mat4::look_at(self.get_position(), self.target, utv::vec::Vec3::unit_y())
    }
}
