//! Obstacle Course entry point
//!
//! Native: generates a course, mounts it in a headless physics world and runs
//! the frame loop for a few simulated seconds. The web build is driven from
//! JavaScript through `obstacle_course::web`.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use obstacle_course::consts::{MAX_SUBSTEPS, SIM_DT};
    use obstacle_course::renderer::batch_scene_live;
    use obstacle_course::sim::{HeadlessWorld, Level, PhysicsWorld};
    use obstacle_course::Settings;

    /// Course plus the world it lives in
    struct Runner {
        level: Level,
        world: HeadlessWorld,
        accumulator: f32,
        elapsed: f32,
        last_logged_second: Option<u32>,
    }

    impl Runner {
        fn new(settings: &Settings) -> Self {
            let level = match settings.seed {
                Some(seed) => Level::with_seed(settings.level.clone(), seed),
                None => Level::new(settings.level.clone()),
            };
            log::info!("Course seed: {}", level.seed());
            Self {
                level,
                world: HeadlessWorld::new(),
                accumulator: 0.0,
                elapsed: 0.0,
                last_logged_second: None,
            }
        }

        /// One rendered frame: motion callbacks, then fixed physics substeps
        fn frame(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.elapsed += dt;
            self.level.frame(self.elapsed, &mut self.world);
            self.world.set_frame_interval(dt);

            self.accumulator += dt;
            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.world.step(SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        fn log_poses(&mut self) {
            let second = self.elapsed.floor() as u32;
            if self.last_logged_second == Some(second) {
                return;
            }
            self.last_logged_second = Some(second);

            for block in self.level.blocks() {
                let Some(pose) = block
                    .obstacle
                    .as_ref()
                    .and_then(|o| o.handle())
                    .and_then(|h| self.world.pose(h))
                else {
                    continue;
                };
                let yaw = pose.rotation.to_euler(glam::EulerRot::YXZ).0;
                log::info!(
                    "t={:.2} {:>7} z={:>6.1} pos=({:+.3}, {:+.3}) yaw={:+.3}",
                    self.elapsed,
                    block.kind.as_str(),
                    block.position.z,
                    pose.translation.x,
                    pose.translation.y,
                    yaw
                );
            }
        }
    }

    fn load_settings() -> Settings {
        let loaded = match std::env::args().nth(1) {
            Some(path) => Settings::load_from(&path),
            None => Ok(Settings::load()),
        };
        let settings = loaded.and_then(|s| s.validate().map(|_| s));
        match settings {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Invalid settings ({}), using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn run() {
        let settings = load_settings();
        let mut runner = Runner::new(&settings);

        // First frame lands before the bodies exist
        let frame_dt = 1.0 / settings.frame_rate.max(1.0);
        runner.frame(frame_dt);
        runner.level.sync(&mut runner.world);
        log::info!(
            "Mounted {} bodies, {} colliders, {} meshes",
            runner.world.len(),
            runner.world.collider_count(),
            runner.level.render().mesh_count()
        );

        while runner.elapsed < settings.run_seconds {
            runner.frame(frame_dt);
            if settings.log_poses {
                runner.log_poses();
            }
        }

        let scene = runner.level.render();
        let batches = batch_scene_live(&scene, &runner.world);
        for batch in &batches {
            log::info!("{:?}: {} instances", batch.material, batch.instances.len());
        }

        if settings.print_scene {
            match serde_json::to_string_pretty(&scene) {
                Ok(json) => println!("{json}"),
                Err(e) => log::error!("Failed to serialize scene: {}", e),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Obstacle Course (headless) starting...");
    headless::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is obstacle_course::web, this is just to satisfy the compiler
}
