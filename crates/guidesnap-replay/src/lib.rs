//! Replay recorded move gestures against a scene file.
//!
//! A script is a JSON document with an optional engine `config` and a list
//! of gesture `events`. Every move tick produces a [`TickReport`].

use guidesnap_core::{GestureEvent, GuideOverlay, Scene, ShapeId, SnapConfig, SnapEngine, SnapError, TickOutput};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Engine error: {0}")]
    Snap(#[from] SnapError),
}

/// Result type for replay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

/// A recorded gesture session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub config: SnapConfig,
    pub events: Vec<GestureEvent>,
}

impl ReplayScript {
    pub fn from_json(json: &str) -> ReplayResult<Self> {
        let script: ReplayScript = serde_json::from_str(json)?;
        script.config.validate()?;
        Ok(script)
    }
}

/// What one move tick produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    /// Index of the event in the script.
    pub event: usize,
    pub moving: ShapeId,
    pub output: TickOutput,
    pub overlay: GuideOverlay,
    /// Moving shape's position after the tick was applied.
    pub position: Option<Point>,
}

/// Load a scene file.
pub fn load_scene(path: &Path) -> ReplayResult<Scene> {
    let json = fs::read_to_string(path)?;
    Ok(Scene::from_json(&json)?)
}

/// Load a gesture script.
pub fn load_script(path: &Path) -> ReplayResult<ReplayScript> {
    let json = fs::read_to_string(path)?;
    ReplayScript::from_json(&json)
}

/// Drive the engine through every event, mutating the scene as ticks apply.
pub fn replay(scene: &mut Scene, script: &ReplayScript) -> ReplayResult<Vec<TickReport>> {
    let mut engine = SnapEngine::new(script.config.clone())?;
    let mut reports = Vec::new();

    for (i, event) in script.events.iter().enumerate() {
        log::trace!("event {i}: {event:?}");
        let Some(output) = engine.handle_event(scene, event) else {
            continue;
        };
        let GestureEvent::MoveTick { moving, .. } = *event else {
            continue;
        };
        reports.push(TickReport {
            event: i,
            moving,
            output,
            overlay: engine.overlay().clone(),
            position: scene.get(moving).map(|b| b.position),
        });
    }

    log::info!("replayed {} events, {} ticks", script.events.len(), reports.len());
    Ok(reports)
}

/// Write one JSON report per line.
pub fn write_reports(reports: &[TickReport], mut out: impl Write) -> ReplayResult<()> {
    for report in reports {
        serde_json::to_writer(&mut out, report)?;
        writeln!(out)?;
    }
    Ok(())
}
