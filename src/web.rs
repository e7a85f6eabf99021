//! Browser bindings
//!
//! A JavaScript host (renderer + physics engine) builds meshes and bodies from
//! `scene_json()` and, each frame, copies the kinematic poses returned by
//! `frame(t)` onto its own bodies.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::sim::{HeadlessWorld, Level, LevelParams, Pose};
use crate::Settings;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"logger already initialized".into());
    }
    log::info!("Obstacle Course starting...");
}

#[derive(Serialize)]
struct BodyPose {
    handle: u32,
    #[serde(flatten)]
    pose: Pose,
}

/// A mounted course driven by the page's animation loop
#[wasm_bindgen]
pub struct WebCourse {
    settings: Settings,
    level: Level,
    world: HeadlessWorld,
    accumulator: f32,
    last_t: Option<f32>,
}

#[wasm_bindgen]
impl WebCourse {
    /// Course from stored settings; a non-zero `seed` overrides theirs
    #[wasm_bindgen(constructor)]
    pub fn new(count: usize, seed: u64) -> WebCourse {
        let stored = Settings::load();
        let mut settings = stored.with_count(count).unwrap_or_else(|e| {
            log::warn!("Stored settings can't supply {} obstacles ({}), using defaults", count, e);
            Settings {
                level: LevelParams {
                    count,
                    ..LevelParams::default()
                },
                ..Settings::default()
            }
        });
        if seed != 0 {
            settings.seed = Some(seed);
        }

        let level = match settings.seed {
            Some(seed) => Level::with_seed(settings.level.clone(), seed),
            None => Level::new(settings.level.clone()),
        };
        let mut course = WebCourse {
            settings,
            level,
            world: HeadlessWorld::new(),
            accumulator: 0.0,
            last_t: None,
        };
        course.level.sync(&mut course.world);
        course
    }

    pub fn seed(&self) -> u64 {
        self.level.seed()
    }

    /// Regenerate for a new obstacle count and remember it; unchanged counts
    /// keep the course
    pub fn set_count(&mut self, count: usize) -> Result<(), JsValue> {
        let settings = self.settings.with_count(count).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.level.set_count(count);
        self.level.sync(&mut self.world);
        self.settings = settings;
        self.settings.save();
        Ok(())
    }

    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&mut self) -> Result<String, JsValue> {
        serde_json::to_string(&self.level.render()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Run motion callbacks at elapsed time `t` (seconds), step physics at the
    /// fixed rate and return kinematic poses
    pub fn frame(&mut self, t: f32) -> Result<String, JsValue> {
        let dt = self.last_t.map_or(SIM_DT, |last| (t - last).clamp(0.0, 0.1));
        self.last_t = Some(t);

        self.level.frame(t, &mut self.world);
        self.world.set_frame_interval(dt);

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.world.step(SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        let poses: Vec<BodyPose> = self
            .world
            .kinematic_poses()
            .into_iter()
            .map(|(handle, pose)| BodyPose {
                handle: handle.0,
                pose,
            })
            .collect();
        serde_json::to_string(&poses).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
