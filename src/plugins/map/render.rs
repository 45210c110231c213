//! Map rendering: grid, crosshairs, waypoint and ship glyphs, labels.
//!
//! Every pass projects the scene through the `MapCamera` into screen space,
//! rebuilding the frame's hit-test index before anything reads it. Gizmos are
//! immediate-mode, so the surface is cleared for free each frame.

use bevy::prelude::*;
use std::collections::HashMap;
use std::path::Path;

use crate::plugins::core::InputBindings;
use crate::universe::{Fleet, StarSystem, WaypointKind};

use super::camera::MapCamera;
use super::interaction::SelectionState;

// =============================================================================
// Constants
// =============================================================================

/// World-space spacing between grid lines.
pub const GRID_SPACING: f32 = 50.0;

/// Screen-space hit radius per glyph, before camera scale is applied.
pub const HIT_RADIUS: f32 = 8.0;

/// Screen-space offset of a ship marker from its waypoint glyph, before scale.
pub const SHIP_OFFSET: Vec2 = Vec2::new(12.0, -12.0);
pub const SHIP_RADIUS: f32 = 4.0;

const CROSSHAIR_ARM: f32 = 12.0;

// =============================================================================
// Resources
// =============================================================================

#[derive(Resource)]
pub struct RenderToggles {
    pub show_grid: bool,
    pub show_labels: bool,
}

impl Default for RenderToggles {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_labels: true,
        }
    }
}

/// What a projected glyph resolves to when hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HitTarget {
    Waypoint(String),
    Ship(String),
}

impl HitTarget {
    pub fn symbol(&self) -> &str {
        match self {
            HitTarget::Waypoint(symbol) | HitTarget::Ship(symbol) => symbol,
        }
    }
}

/// Per-frame record of one drawn glyph, in screen space.
#[derive(Clone, Debug)]
pub struct ProjectedGlyph {
    pub screen_pos: Vec2,
    pub radius: f32,
    pub target: HitTarget,
}

/// The renderer-owned hit-test index. Cleared and rebuilt at the start of
/// every render pass; the generation counter exists so a stale snapshot can
/// never be mistaken for the current frame.
#[derive(Resource, Default)]
pub struct FrameHitIndex {
    pub entries: Vec<ProjectedGlyph>,
    pub generation: u64,
}

impl FrameHitIndex {
    pub fn begin_frame(&mut self) {
        self.entries.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

#[derive(Component)]
pub struct WaypointLabel;

// =============================================================================
// Glyph styling
// =============================================================================

pub fn glyph_radius(kind: WaypointKind) -> f32 {
    match kind {
        WaypointKind::Planet => 7.0,
        WaypointKind::GasGiant => 9.0,
        WaypointKind::Asteroid => 4.0,
        WaypointKind::AsteroidBase => 5.0,
        WaypointKind::EngineeredAsteroid => 5.0,
        WaypointKind::FuelStation => 5.0,
        WaypointKind::JumpGate => 6.0,
        WaypointKind::DebrisField => 6.0,
        WaypointKind::GravityWell => 8.0,
        WaypointKind::Other => 5.0,
    }
}

pub fn waypoint_color(kind: WaypointKind) -> Color {
    match kind {
        WaypointKind::Planet => Color::srgb(0.3, 0.75, 0.4),
        WaypointKind::GasGiant => Color::srgb(0.85, 0.6, 0.25),
        WaypointKind::Asteroid => Color::srgb(0.55, 0.55, 0.6),
        WaypointKind::AsteroidBase => Color::srgb(0.7, 0.65, 0.5),
        WaypointKind::EngineeredAsteroid => Color::srgb(0.4, 0.75, 0.7),
        WaypointKind::FuelStation => Color::srgb(0.9, 0.85, 0.3),
        WaypointKind::JumpGate => Color::srgb(0.65, 0.45, 0.9),
        WaypointKind::DebrisField => Color::srgb(0.6, 0.45, 0.35),
        WaypointKind::GravityWell => Color::srgb(0.35, 0.55, 0.9),
        WaypointKind::Other => Color::srgb(0.85, 0.3, 0.3),
    }
}

pub fn kind_letter(kind: WaypointKind) -> &'static str {
    match kind {
        WaypointKind::Planet => "P",
        WaypointKind::GasGiant => "G",
        WaypointKind::Asteroid => "A",
        WaypointKind::AsteroidBase => "AB",
        WaypointKind::EngineeredAsteroid => "EA",
        WaypointKind::FuelStation => "F",
        WaypointKind::JumpGate => "J",
        WaypointKind::DebrisField => "D",
        WaypointKind::GravityWell => "W",
        WaypointKind::Other => "?",
    }
}

// =============================================================================
// Projection
// =============================================================================

/// Projects the drawable scene into screen-space glyph records. Waypoints come
/// first, ships after, so a reverse hit-test scan finds ships on top. A ship
/// whose waypoint is missing from the scene is silently omitted.
pub fn project_scene(
    system: &StarSystem,
    fleet: Option<&Fleet>,
    camera: &MapCamera,
) -> Vec<ProjectedGlyph> {
    let mut glyphs = Vec::new();

    for waypoint in system.top_level() {
        glyphs.push(ProjectedGlyph {
            screen_pos: camera.world_to_screen(waypoint.position),
            radius: HIT_RADIUS * camera.scale,
            target: HitTarget::Waypoint(waypoint.symbol.clone()),
        });
    }

    let Some(fleet) = fleet else {
        return glyphs;
    };

    // Markers at the same waypoint fan out to the right instead of piling up.
    let mut per_anchor: HashMap<&str, usize> = HashMap::new();

    for ship in &fleet.ships {
        let Some(waypoint) = system.waypoint(&ship.waypoint_symbol) else {
            continue;
        };

        let anchor = if waypoint.is_orbital() {
            // Orbital waypoints aren't drawn; anchor the marker on the parent.
            match waypoint.orbits.as_deref().and_then(|parent| system.waypoint(parent)) {
                Some(parent) => parent,
                None => continue,
            }
        } else {
            waypoint
        };

        let stacked = per_anchor.entry(anchor.symbol.as_str()).or_insert(0);
        let base = camera.world_to_screen(anchor.position);
        let offset = SHIP_OFFSET + Vec2::new(*stacked as f32 * 2.5 * SHIP_RADIUS, 0.0);
        *stacked += 1;

        glyphs.push(ProjectedGlyph {
            screen_pos: base + offset * camera.scale,
            radius: HIT_RADIUS * camera.scale,
            target: HitTarget::Ship(ship.symbol.clone()),
        });
    }

    glyphs
}

/// Screen space (origin top-left, y down) to the fixed 2D camera's draw space
/// (origin at viewport center, y up).
pub fn screen_to_draw(screen: Vec2, viewport: Vec2) -> Vec2 {
    Vec2::new(screen.x - viewport.x * 0.5, viewport.y * 0.5 - screen.y)
}

// =============================================================================
// Systems
// =============================================================================

#[allow(clippy::too_many_arguments)]
pub fn draw_map(
    mut gizmos: Gizmos,
    camera: Res<MapCamera>,
    system: Res<StarSystem>,
    fleet: Option<Res<Fleet>>,
    selection: Res<SelectionState>,
    toggles: Res<RenderToggles>,
    mut index: ResMut<FrameHitIndex>,
) {
    let viewport = camera.viewport;

    if toggles.show_grid {
        draw_grid(&mut gizmos, &camera);
    }

    // Viewport-center reference, fainter than the world-origin one.
    draw_crosshair(
        &mut gizmos,
        Vec2::ZERO,
        Color::srgba(0.7, 0.8, 0.9, 0.18),
    );
    draw_crosshair(
        &mut gizmos,
        screen_to_draw(camera.world_to_screen(Vec2::ZERO), viewport),
        Color::srgba(0.7, 0.8, 0.9, 0.5),
    );

    index.begin_frame();
    let glyphs = project_scene(&system, fleet.as_deref(), &camera);

    let (selected_waypoint, selected_ship, selected_target) = selection_highlights(&selection);

    for glyph in &glyphs {
        let draw_pos = screen_to_draw(glyph.screen_pos, viewport);

        match &glyph.target {
            HitTarget::Waypoint(symbol) => {
                let kind = system
                    .waypoint(symbol)
                    .map(|waypoint| waypoint.kind)
                    .unwrap_or(WaypointKind::Other);
                gizmos.circle_2d(draw_pos, glyph_radius(kind) * camera.scale, waypoint_color(kind));

                if selected_waypoint == Some(symbol.as_str()) {
                    gizmos.circle_2d(draw_pos, glyph.radius + 3.0, Color::srgb(0.9, 0.95, 1.0));
                }
                if selected_target == Some(symbol.as_str()) {
                    gizmos.circle_2d(draw_pos, glyph.radius + 3.0, Color::srgb(0.95, 0.75, 0.3));
                }
            }
            HitTarget::Ship(symbol) => {
                gizmos.circle_2d(
                    draw_pos,
                    SHIP_RADIUS * camera.scale,
                    Color::srgb(0.92, 0.92, 0.98),
                );

                if selected_ship == Some(symbol.as_str()) {
                    gizmos.circle_2d(draw_pos, glyph.radius + 2.0, Color::srgb(0.4, 0.9, 0.9));
                }
            }
        }
    }

    index.entries = glyphs;
}

fn draw_grid(gizmos: &mut Gizmos, camera: &MapCamera) {
    let viewport = camera.viewport;
    let color = Color::srgba(0.35, 0.45, 0.55, 0.08);

    let top_left = camera.screen_to_world(Vec2::ZERO);
    let bottom_right = camera.screen_to_world(viewport);

    let first_column = (top_left.x / GRID_SPACING).floor() as i32;
    let last_column = (bottom_right.x / GRID_SPACING).ceil() as i32;
    for column in first_column..=last_column {
        let screen_x = camera.world_to_screen(Vec2::new(column as f32 * GRID_SPACING, 0.0)).x;
        gizmos.line_2d(
            screen_to_draw(Vec2::new(screen_x, 0.0), viewport),
            screen_to_draw(Vec2::new(screen_x, viewport.y), viewport),
            color,
        );
    }

    let first_row = (top_left.y / GRID_SPACING).floor() as i32;
    let last_row = (bottom_right.y / GRID_SPACING).ceil() as i32;
    for row in first_row..=last_row {
        let screen_y = camera.world_to_screen(Vec2::new(0.0, row as f32 * GRID_SPACING)).y;
        gizmos.line_2d(
            screen_to_draw(Vec2::new(0.0, screen_y), viewport),
            screen_to_draw(Vec2::new(viewport.x, screen_y), viewport),
            color,
        );
    }
}

fn draw_crosshair(gizmos: &mut Gizmos, center: Vec2, color: Color) {
    gizmos.line_2d(
        center - Vec2::new(CROSSHAIR_ARM, 0.0),
        center + Vec2::new(CROSSHAIR_ARM, 0.0),
        color,
    );
    gizmos.line_2d(
        center - Vec2::new(0.0, CROSSHAIR_ARM),
        center + Vec2::new(0.0, CROSSHAIR_ARM),
        color,
    );
}

/// Which symbols the current selection highlights on the map.
pub fn selection_highlights(
    selection: &SelectionState,
) -> (Option<&str>, Option<&str>, Option<&str>) {
    match selection {
        SelectionState::Idle | SelectionState::Dragging { .. } => (None, None, None),
        SelectionState::WaypointSelected { symbol, .. } => (Some(symbol.as_str()), None, None),
        SelectionState::ShipSelected { waypoint, ship } => {
            (Some(waypoint.as_str()), Some(ship.as_str()), None)
        }
        SelectionState::DestinationChosen {
            ship, target, ..
        } => (None, Some(ship.as_str()), Some(target.as_str())),
    }
}

pub fn handle_render_toggles(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut toggles: ResMut<RenderToggles>,
) {
    if input.just_pressed(bindings.toggle_grid) {
        toggles.show_grid = !toggles.show_grid;
        info!("Grid: {}", if toggles.show_grid { "on" } else { "off" });
    }
    if input.just_pressed(bindings.toggle_labels) {
        toggles.show_labels = !toggles.show_labels;
        info!("Labels: {}", if toggles.show_labels { "on" } else { "off" });
    }
}

pub fn update_waypoint_labels(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    toggles: Res<RenderToggles>,
    camera: Res<MapCamera>,
    system: Res<StarSystem>,
    labels: Query<Entity, With<WaypointLabel>>,
) {
    for entity in labels.iter() {
        commands.entity(entity).despawn();
    }

    if !toggles.show_labels {
        return;
    }

    let font_path = "fonts/SpaceMono-Regular.ttf";
    let font_on_disk = Path::new("assets").join(font_path);

    if !font_on_disk.exists() {
        return;
    }

    let font = asset_server.load(font_path);

    for waypoint in system.top_level() {
        let screen = camera.world_to_screen(waypoint.position);
        if screen.x < 0.0
            || screen.y < 0.0
            || screen.x > camera.viewport.x
            || screen.y > camera.viewport.y
        {
            continue;
        }

        let short_symbol = waypoint
            .symbol
            .rsplit('-')
            .next()
            .unwrap_or(waypoint.symbol.as_str());
        let label = format!("{} {}", short_symbol, kind_letter(waypoint.kind));
        let offset = glyph_radius(waypoint.kind) * camera.scale + 4.0;

        commands.spawn((
            WaypointLabel,
            Text::new(label),
            TextFont {
                font: font.clone(),
                font_size: 12.0,
                ..default()
            },
            TextColor(Color::srgba(0.82, 0.9, 0.96, 0.8)),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(screen.x + offset),
                top: Val::Px(screen.y - 6.0),
                ..default()
            },
        ));
    }
}

pub fn despawn_waypoint_labels(
    mut commands: Commands,
    labels: Query<Entity, With<WaypointLabel>>,
) {
    for entity in labels.iter() {
        commands.entity(entity).despawn();
    }
}

// =============================================================================
// Tests
// =============================================================================
