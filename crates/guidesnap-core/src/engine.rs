//! Gesture-level snapping engine.
//!
//! The engine owns the per-gesture state machine:
//! `Idle -> IndexBuilt` on move-begin, `-> Tracking` on every move tick
//! (the index is never rebuilt mid-gesture), and back to `Idle` on
//! move-end, a layout change, or when snapping is disabled.

use crate::bounds::{BoundaryPointSet, Quantizer};
use crate::collision::{CollisionResult, best_match, detect_collisions};
use crate::config::SnapConfig;
use crate::error::SnapResult;
use crate::guides::{GuideOverlay, nearest_lines};
use crate::index::{Axis, SnapIndex};
use crate::input::{ArrowKeys, GestureEvent};
use crate::labels::distance_labels;
use crate::scene::SceneHost;
use crate::shapes::{CoordinateSpace, ShapeId, SnapShape};
use crate::spacing::{SpacingCandidate, analyze_equal_spacing};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Custom eligibility predicate for candidate shapes.
pub type ShapeFilter = Box<dyn Fn(&dyn SnapShape) -> bool>;

/// The winning alignment on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapOffset {
    pub axis: Axis,
    /// Signed distance from the live point to the line. Subtracting it from
    /// the pointer translation puts the point on the line.
    pub offset: f64,
    pub distance: f64,
    /// Coordinate of the matched line.
    pub line_value: f64,
}

impl SnapOffset {
    fn from_collision(collision: &CollisionResult) -> Self {
        Self {
            axis: collision.axis(),
            offset: collision.offset,
            distance: collision.distance,
            line_value: collision.line.value,
        }
    }
}

/// Result of one move tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickOutput {
    pub snap_x: Option<SnapOffset>,
    pub snap_y: Option<SnapOffset>,
    /// Translation of the selection since the gesture began, snap included.
    pub translation: Vec2,
}

impl TickOutput {
    /// Check if either axis snapped.
    pub fn snapped(&self) -> bool {
        self.snap_x.is_some() || self.snap_y.is_some()
    }
}

/// State captured at move-begin and held for the whole gesture.
#[derive(Debug, Clone)]
pub struct SnapSession {
    index: SnapIndex,
    /// Sibling bounds for equal-spacing analysis (container excluded).
    spacing: Vec<SpacingCandidate>,
    /// Selected shapes and their positions at gesture start.
    originals: Vec<(ShapeId, Point)>,
    /// Union of the selection's root bounds at gesture start.
    start_bounds: Rect,
    /// Accumulated raw pointer delta.
    raw_delta: Vec2,
    /// Last snapped translation.
    translation: Vec2,
}

impl SnapSession {
    pub fn index(&self) -> &SnapIndex {
        &self.index
    }

    pub fn spacing_candidates(&self) -> &[SpacingCandidate] {
        &self.spacing
    }

    /// Selected shape IDs, in selection order.
    pub fn selection(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.originals.iter().map(|(id, _)| *id)
    }

    pub fn translation(&self) -> Vec2 {
        self.translation
    }

    pub fn start_bounds(&self) -> Rect {
        self.start_bounds
    }
}

/// Gesture lifecycle.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Index built at move-begin, no tick yet.
    IndexBuilt(SnapSession),
    /// At least one tick processed.
    Tracking(SnapSession),
}

impl GestureState {
    pub fn session(&self) -> Option<&SnapSession> {
        match self {
            GestureState::Idle => None,
            GestureState::IndexBuilt(session) | GestureState::Tracking(session) => Some(session),
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, GestureState::Idle)
    }
}

/// Snapping engine for one editor.
pub struct SnapEngine {
    config: SnapConfig,
    quantizer: Quantizer,
    filter: Option<ShapeFilter>,
    enabled: bool,
    state: GestureState,
    keys: ArrowKeys,
    overlay: GuideOverlay,
}

impl std::fmt::Debug for SnapEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapEngine")
            .field("config", &self.config)
            .field("has_filter", &self.filter.is_some())
            .field("enabled", &self.enabled)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl SnapEngine {
    /// Create an engine, validating the configuration.
    pub fn new(config: SnapConfig) -> SnapResult<Self> {
        config.validate()?;
        let quantizer = config.quantizer()?;
        Ok(Self {
            config,
            quantizer,
            filter: None,
            enabled: true,
            state: GestureState::Idle,
            keys: ArrowKeys::default(),
            overlay: GuideOverlay::default(),
        })
    }

    /// Only index shapes the predicate accepts.
    pub fn with_filter(mut self, filter: impl Fn(&dyn SnapShape) -> bool + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Guides for the latest tick.
    pub fn overlay(&self) -> &GuideOverlay {
        &self.overlay
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable snapping. Disabling ends the current gesture.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.teardown("disabled");
        }
    }

    /// Check if keyboard nudging is in progress.
    pub fn is_nudging(&self) -> bool {
        self.keys.any_held()
    }

    pub fn key_down(&mut self, key: &str) {
        if self.keys.press(key) {
            log::trace!("arrow key down: {key}");
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if self.keys.release(key) {
            log::trace!("arrow key up: {key}");
        }
    }

    /// Start a gesture: build the static index for the selection.
    ///
    /// Candidates are the siblings of the first selected shape (plus its
    /// container when `snap_to_container` is set), minus the selection,
    /// passed through the filter and optionally culled to the viewport.
    /// Returns false when snapping is disabled or no selected shape exists.
    pub fn begin_move(&mut self, host: &dyn SceneHost, selection: &[ShapeId]) -> bool {
        self.teardown("restart");
        if !self.enabled {
            return false;
        }

        let selected: Vec<&dyn SnapShape> = selection.iter().filter_map(|&id| host.shape(id)).collect();
        let Some(first) = selected.first() else {
            log::warn!("move began with no live shapes in selection {selection:?}");
            return false;
        };

        let container = host.container_of(first.id());
        let excluded: HashSet<ShapeId> = selected.iter().map(|s| s.id()).collect();
        let visible = self.config.viewport_only.then(|| host.viewport().visible_world_rect());

        let siblings: Vec<&dyn SnapShape> = host
            .shapes_under(container)
            .into_iter()
            .filter(|s| !excluded.contains(&s.id()))
            .filter(|s| self.accepts(*s))
            .filter(|s| visible.is_none_or(|v| touches(s.bounds(CoordinateSpace::Root), v)))
            .collect();

        let container_shape = container
            .filter(|_| self.config.snap_to_container)
            .and_then(|id| host.shape(id))
            .filter(|s| self.accepts(*s));

        let index = SnapIndex::build(siblings.iter().copied().chain(container_shape), &self.quantizer);
        let spacing = siblings
            .iter()
            .map(|s| SpacingCandidate::new(s.id(), s.bounds(CoordinateSpace::Root)))
            .collect::<Vec<_>>();

        let originals: Vec<(ShapeId, Point)> = selected.iter().map(|s| (s.id(), s.position())).collect();
        let start_bounds = selected
            .iter()
            .map(|s| s.bounds(CoordinateSpace::Root))
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO);

        log::debug!(
            "move began: {} selected, {} x lines, {} y lines, {} spacing candidates",
            originals.len(),
            index.x_lines.len(),
            index.y_lines.len(),
            spacing.len()
        );

        self.state = GestureState::IndexBuilt(SnapSession {
            index,
            spacing,
            originals,
            start_bounds,
            raw_delta: Vec2::ZERO,
            translation: Vec2::ZERO,
        });
        true
    }

    /// Process one pointer move of `delta` scene units.
    ///
    /// Returns the snapped translation since gesture start. While an arrow
    /// key is held, guides are still computed but no offset is applied.
    /// When idle nothing is tracked and the translation is zero.
    pub fn move_tick(&mut self, host: &dyn SceneHost, moving: ShapeId, delta: Vec2) -> TickOutput {
        let mut session = match std::mem::take(&mut self.state) {
            GestureState::Idle => {
                log::warn!("move tick for {moving} while idle");
                return TickOutput::default();
            }
            GestureState::IndexBuilt(session) | GestureState::Tracking(session) => session,
        };

        let output = self.track(host, &mut session, moving, delta);
        self.state = GestureState::Tracking(session);
        output
    }

    fn track(&mut self, host: &dyn SceneHost, session: &mut SnapSession, moving: ShapeId, delta: Vec2) -> TickOutput {
        self.overlay.clear();
        session.raw_delta += delta;

        if host.shape(moving).is_none() {
            log::warn!("moving shape {moving} no longer exists");
            return unsnapped(session);
        }

        let viewport = host.viewport();
        if let Err(e) = viewport.validate() {
            log::warn!("not snapping {moving}: {e}");
            return unsnapped(session);
        }

        let q = self.quantizer;
        let tolerance = viewport.screen_to_world_distance(self.config.tolerance_px);
        let margin = viewport.screen_to_world_distance(self.config.label_margin_px);
        let live = BoundaryPointSet::from_rect(session.start_bounds + session.raw_delta, &q);

        let x_hits = detect_collisions(Axis::X, &live, &session.index, tolerance, &q);
        let y_hits = detect_collisions(Axis::Y, &live, &session.index, tolerance, &q);

        let nudging = self.keys.any_held();
        let (snap_x, snap_y) = if nudging {
            (None, None)
        } else {
            (
                best_match(&x_hits).map(SnapOffset::from_collision),
                best_match(&y_hits).map(SnapOffset::from_collision),
            )
        };

        let dx = snap_x.map_or(0.0, |s| s.offset);
        let dy = snap_y.map_or(0.0, |s| s.offset);
        session.translation = session.raw_delta - Vec2::new(dx, dy);
        let snapped = live.translated(-dx, -dy, &q);

        for (axis, hits) in [(Axis::X, &x_hits), (Axis::Y, &y_hits)] {
            let active: Vec<&CollisionResult> = hits.iter().filter(|c| c.is_active(&snapped, &q)).collect();
            self.render_axis(axis, &active, &snapped, margin);
        }

        if self.config.show_equal_spacing {
            let candidate = SpacingCandidate::new(moving, snapped.rect());
            let spacings = analyze_equal_spacing(&candidate, &session.spacing, self.config.spacing_tolerance, &q);
            self.overlay.spacings.extend(spacings);
        }

        log::trace!(
            "tick {moving}: raw {:?} -> {:?}, {} x hits, {} y hits, nudging={nudging}",
            session.raw_delta,
            session.translation,
            x_hits.len(),
            y_hits.len()
        );

        TickOutput {
            snap_x,
            snap_y,
            translation: session.translation,
        }
    }

    fn render_axis(&mut self, axis: Axis, active: &[&CollisionResult], snapped: &BoundaryPointSet, margin: f64) {
        let q = self.quantizer;
        for collision in nearest_lines(active, self.config.max_guide_lines) {
            if self.config.show_lines {
                self.overlay.push_line(collision, snapped, &q);
            }
            if self.config.show_points {
                self.overlay.push_points(collision, snapped, &q);
            }
        }
        if self.config.show_distance_labels {
            let labels = distance_labels(axis, snapped, active, margin, &q);
            self.overlay.labels.extend(labels);
        }
    }

    /// Move every selected shape to its start position plus the current
    /// translation. Returns the number of shapes moved.
    pub fn apply(&self, host: &mut dyn SceneHost) -> usize {
        let Some(session) = self.state.session() else {
            return 0;
        };
        let mut moved = 0;
        for &(id, original) in &session.originals {
            if host.move_shape(id, original + session.translation) {
                moved += 1;
            } else {
                log::warn!("selected shape {id} no longer exists");
            }
        }
        moved
    }

    /// End the gesture, returning its final translation.
    pub fn end_move(&mut self) -> Option<Vec2> {
        let translation = self.state.session().map(|s| s.translation);
        self.teardown("move ended");
        translation
    }

    /// The host re-laid out the scene; drop the gesture.
    pub fn layout_changed(&mut self) {
        self.teardown("layout changed");
    }

    fn teardown(&mut self, reason: &str) {
        if !self.state.is_idle() {
            log::debug!("gesture ended: {reason}");
        }
        self.state = GestureState::Idle;
        self.overlay = GuideOverlay::default();
    }

    fn accepts(&self, shape: &dyn SnapShape) -> bool {
        self.filter.as_ref().is_none_or(|f| f(shape))
    }

    /// Dispatch a recorded event. Move ticks are applied to the host.
    pub fn handle_event(&mut self, host: &mut dyn SceneHost, event: &GestureEvent) -> Option<TickOutput> {
        match event {
            GestureEvent::MoveBegin { selection } => {
                self.begin_move(&*host, selection);
                None
            }
            GestureEvent::MoveTick { moving, delta } => {
                if self.state.is_idle() {
                    log::warn!("move tick for {moving} while idle");
                    return None;
                }
                let output = self.move_tick(&*host, *moving, *delta);
                self.apply(host);
                Some(output)
            }
            GestureEvent::MoveEnd => {
                self.end_move();
                None
            }
            GestureEvent::KeyDown { key } => {
                self.key_down(key);
                None
            }
            GestureEvent::KeyUp { key } => {
                self.key_up(key);
                None
            }
            GestureEvent::LayoutChanged => {
                self.layout_changed();
                None
            }
            GestureEvent::SetEnabled { enabled } => {
                self.set_enabled(*enabled);
                None
            }
        }
    }
}

/// Inclusive rectangle overlap; zero-size shapes on the edge still count.
/// Follow the pointer without snapping.
fn unsnapped(session: &mut SnapSession) -> TickOutput {
    session.translation = session.raw_delta;
    TickOutput {
        translation: session.translation,
        ..Default::default()
    }
}

fn touches(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 && b.x0 <= a.x1 && a.y0 <= b.y1 && b.y0 <= a.y1
}
