//! Kitchen demo application
//!
//! Runs the kitchen level headless: builds it (or loads the saved copy from
//! the asset root), saves the manifest and scene, reloads them to check the
//! round trip, then plays a scripted input sequence through the engine.
//!
//! ```text
//! kitchen [engine.toml] [gameplay.toml]
//! ```

mod level;

use scene_engine::assets::AssetError;
use scene_engine::core::{load_optional, ConfigError};
use scene_engine::foundation::logging;
use scene_engine::foundation::time::Timer;
use scene_engine::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

/// Application errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Scene error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Asset error
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Reloaded scene differs from the saved one
    #[error("Scene did not survive the save/load round trip")]
    RoundTrip,
}

/// One step of the scripted session
struct Step {
    key: Option<KeyCode>,
    frames: u32,
    label: &'static str,
}

const SCRIPT: &[Step] = &[
    Step { key: None, frames: 30, label: "idle" },
    Step { key: Some(KeyCode::D), frames: 60, label: "run right" },
    Step { key: Some(KeyCode::Space), frames: 40, label: "jump" },
    Step { key: Some(KeyCode::A), frames: 20, label: "run left" },
    Step { key: Some(KeyCode::D), frames: 120, label: "run for the win line" },
];

const FRAME_DELTA: f32 = 1.0 / 60.0;

struct KitchenApp {
    engine: Engine,
}

impl KitchenApp {
    fn new(config: EngineConfig) -> Result<Self, AppError> {
        Ok(Self {
            engine: Engine::new(config)?,
        })
    }

    /// Load the saved level or build and save a fresh one
    fn prepare_level(&mut self, gameplay: &GameplayConfig) -> Result<(), AppError> {
        let manifest = self.engine.config().manifest_path();
        let scene_path = self.engine.config().scene_path();

        if manifest.exists() && scene_path.exists() {
            log::info!("Loading saved level from {}", scene_path.display());
            let report = self.engine.load_scene(&manifest, &scene_path)?;
            if !report.is_complete() {
                log::warn!("{} assets failed to load", report.failed.len());
            }
            return Ok(());
        }

        log::info!("Building kitchen level");
        let mut scene = Scene::new();
        level::build(&mut scene, self.engine.resources_mut(), gameplay)?;
        self.engine.set_scene(scene)?;

        std::fs::create_dir_all(&self.engine.config().asset_root)?;
        self.engine.save_configured_scene()?;
        self.verify_round_trip()
    }

    /// Reload what was just saved and compare documents
    fn verify_round_trip(&mut self) -> Result<(), AppError> {
        let saved = self.engine.scene().ok_or(EngineError::NoScene)?.to_document()?;
        let reloaded = Scene::load(self.engine.config().scene_path(), self.engine.resources(), self.engine.registry())?;
        if reloaded.to_document()? != saved {
            return Err(AppError::RoundTrip);
        }
        log::info!("Round trip verified ({} objects)", saved.objects.len());
        self.engine.set_scene(reloaded)?;
        Ok(())
    }

    fn run_script(&mut self) -> Result<(), AppError> {
        let mut timer = Timer::new();
        let mut ticks = 0;
        for step in SCRIPT {
            log::info!("Script: {} for {} frames", step.label, step.frames);
            if let Some(key) = step.key {
                self.engine.handle_key(key, true);
            }
            for _ in 0..step.frames {
                ticks += self.engine.tick(FRAME_DELTA)?;
                timer.update();
            }
            if let Some(key) = step.key {
                self.engine.handle_key(key, false);
            }
            self.report();
        }
        log::info!(
            "Script done: {} frames, {ticks} ticks, {:.0} frames/s headless",
            timer.frame_count(),
            timer.average_fps()
        );
        Ok(())
    }

    fn report(&self) {
        let Some(scene) = self.engine.scene() else {
            return;
        };
        let Some(player) = scene.find_by_name("Player") else {
            return;
        };
        let Some(object) = scene.object(player) else {
            return;
        };
        if let Some(movement) = object.get::<CharacterMovement>() {
            let p = object.position();
            log::info!(
                "Player at ({:.2}, {:.2}, {:.2}), lives {}{}{}",
                p.x,
                p.y,
                p.z,
                movement.lives(),
                if movement.has_won() { ", won" } else { "" },
                if movement.has_lost() { ", lost" } else { "" },
            );
        }
        if let Some(turtle) = scene.find_by_name("Turtle").and_then(|id| scene.object(id)) {
            if let Some(patrol) = turtle.get::<EnemyPatrol>() {
                log::debug!("Turtle at x {:.2}, leg {:?}", turtle.position().x, patrol.leg());
            }
        }
    }

    /// Dump the inspector and debug panel to the log
    fn dump_inspector(&mut self) {
        let Some(scene) = self.engine.scene_mut() else {
            return;
        };
        let mut ui = RecordingInspector::new();
        DebugPanel::render(scene, &mut ui);
        scene.render_inspector(&mut ui);
        log::debug!("Inspector:\n{}", ui.text());

        let frame = scene.extract_frame(16.0 / 9.0);
        log::info!(
            "Frame: {} opaque, {} transparent, {} lights, skybox {}",
            frame.opaque.len(),
            frame.transparent.len(),
            frame.lights.len(),
            if frame.skybox.is_some() { "on" } else { "off" }
        );
    }
}

fn run() -> Result<(), AppError> {
    let mut args = std::env::args().skip(1).map(PathBuf::from);
    let engine_path = args.next();
    let gameplay_path = args.next();

    let config: EngineConfig = load_optional(engine_path.as_deref())?;
    logging::init_with_level(config.level_filter());
    let gameplay: GameplayConfig = load_optional(gameplay_path.as_deref())?;

    let mut app = KitchenApp::new(config)?;
    app.prepare_level(&gameplay)?;
    app.dump_inspector();
    app.run_script()?;
    app.dump_inspector();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        log::error!("kitchen: {e}");
        eprintln!("kitchen: {e}");
        std::process::exit(1);
    }
}
