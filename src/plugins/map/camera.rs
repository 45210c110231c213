//! Map camera: world/screen transforms, pan, zoom, and the animated recenter.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::plugins::core::InputBindings;

// =============================================================================
// Constants
// =============================================================================

pub const ZOOM_MIN: f32 = 0.4;
pub const ZOOM_MAX: f32 = 4.0;
pub const ZOOM_STEP: f32 = 0.1;

/// Recenter animation length.
pub const RECENTER_SECONDS: f32 = 0.5;

// =============================================================================
// Resources
// =============================================================================

/// The view onto world space. Screen space is window space: origin top-left,
/// y down, matching `Window::cursor_position`.
///
/// Inserted on the first successful system fetch, removed when the map view
/// goes away; systems that need it take `Option<Res<MapCamera>>` or run behind
/// `resource_exists`.
#[derive(Resource, Debug, Clone)]
pub struct MapCamera {
    /// World-space point shown at the viewport center.
    pub position: Vec2,
    /// Pixels per world unit, clamped to [ZOOM_MIN, ZOOM_MAX].
    pub scale: f32,
    /// Viewport size in pixels, re-supplied by the host window on resize.
    pub viewport: Vec2,
}

impl MapCamera {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            viewport,
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        self.viewport * 0.5 + (world - self.position) * self.scale
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        self.position + (screen - self.viewport * 0.5) / self.scale
    }

    /// Applies a screen-space pointer delta: the world moves opposite the
    /// cursor, so the focus point moves against the drag.
    pub fn pan(&mut self, delta_screen: Vec2) {
        self.position -= delta_screen / self.scale;
    }

    /// Zoom is anchored at the viewport center, not the cursor; only the
    /// scale changes.
    pub fn zoom_in(&mut self) {
        self.scale = (self.scale + ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn zoom_out(&mut self) {
        self.scale = (self.scale - ZOOM_STEP).clamp(ZOOM_MIN, ZOOM_MAX);
    }

    pub fn set_viewport(&mut self, viewport: Vec2) {
        self.viewport = viewport;
    }

    pub fn zoom_label(&self) -> String {
        format!("{:.2}", self.scale)
    }
}

/// A running recenter animation. Inserting a fresh one replaces any animation
/// already in flight, so at most one drives the camera at a time.
#[derive(Resource)]
pub struct RecenterAnimation {
    start_position: Vec2,
    start_scale: f32,
    timer: Timer,
}

impl RecenterAnimation {
    pub fn from_camera(camera: &MapCamera) -> Self {
        Self {
            start_position: camera.position,
            start_scale: camera.scale,
            timer: Timer::from_seconds(RECENTER_SECONDS, TimerMode::Once),
        }
    }

    /// Linear interpolation toward the home view (origin, scale 1).
    pub fn sample(&self, progress: f32) -> (Vec2, f32) {
        let t = progress.clamp(0.0, 1.0);
        (
            self.start_position + (Vec2::ZERO - self.start_position) * t,
            self.start_scale + (1.0 - self.start_scale) * t,
        )
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Keeps the camera's idea of the viewport in sync with the host window.
pub fn sync_viewport(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut camera: ResMut<MapCamera>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    let size = Vec2::new(window.width(), window.height());
    if camera.viewport != size {
        camera.set_viewport(size);
    }
}

pub fn handle_zoom_wheel(
    mut scroll: MessageReader<MouseWheel>,
    mut camera: ResMut<MapCamera>,
) {
    for event in scroll.read() {
        if event.y > 0.0 {
            camera.zoom_in();
        } else if event.y < 0.0 {
            camera.zoom_out();
        }
    }
}

pub fn handle_zoom_keys(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut camera: ResMut<MapCamera>,
) {
    if input.just_pressed(bindings.zoom_in) {
        camera.zoom_in();
    }
    if input.just_pressed(bindings.zoom_out) {
        camera.zoom_out();
    }
}

pub fn handle_recenter_input(
    mut commands: Commands,
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    camera: Res<MapCamera>,
) {
    if input.just_pressed(bindings.recenter) {
        commands.insert_resource(RecenterAnimation::from_camera(&camera));
    }
}

/// Advances the recenter animation. The final frame snaps to the exact home
/// view so float drift from the lerp never survives the animation.
pub fn tick_recenter(
    mut commands: Commands,
    time: Res<Time>,
    animation: Option<ResMut<RecenterAnimation>>,
    camera: Option<ResMut<MapCamera>>,
) {
    let (Some(mut animation), Some(mut camera)) = (animation, camera) else {
        return;
    };

    animation.timer.tick(time.delta());

    if animation.timer.is_finished() {
        camera.position = Vec2::ZERO;
        camera.scale = 1.0;
        commands.remove_resource::<RecenterAnimation>();
    } else {
        let (position, scale) = animation.sample(animation.timer.fraction());
        camera.position = position;
        camera.scale = scale;
    }
}

// =============================================================================
// Tests
// =============================================================================
