//! The interactive map viewport: camera, renderer, hit-testing, interaction.

pub mod camera;
pub mod hittest;
pub mod interaction;
pub mod render;

use bevy::prelude::*;

use crate::plugins::core::GameState;
use crate::universe::StarSystem;

pub use camera::MapCamera;
pub use interaction::SelectionState;
pub use render::{FrameHitIndex, HitTarget};

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<render::RenderToggles>()
            .init_resource::<FrameHitIndex>()
            .init_resource::<SelectionState>()
            .add_systems(Startup, setup_draw_camera)
            .add_systems(
                Update,
                // One chain per frame: the camera settles first, the renderer
                // rebuilds the hit index, and only then do pointer systems
                // consult it. Stale projections are unobservable by order.
                (
                    camera::sync_viewport,
                    camera::handle_zoom_wheel,
                    camera::handle_zoom_keys,
                    camera::handle_recenter_input,
                    camera::tick_recenter,
                    render::draw_map,
                    interaction::handle_pointer,
                )
                    .chain()
                    .run_if(in_state(GameState::InGame))
                    .run_if(resource_exists::<MapCamera>)
                    .run_if(resource_exists::<StarSystem>),
            )
            .add_systems(
                Update,
                (
                    render::handle_render_toggles,
                    interaction::handle_clear_selection,
                    interaction::apply_waypoint_details,
                )
                    .run_if(in_state(GameState::InGame)),
            )
            .add_systems(
                Update,
                render::update_waypoint_labels
                    .run_if(in_state(GameState::InGame))
                    .run_if(resource_exists::<MapCamera>)
                    .run_if(resource_exists::<StarSystem>),
            )
            .add_systems(
                OnExit(GameState::InGame),
                (teardown_map_view, render::despawn_waypoint_labels),
            );
    }
}

fn setup_draw_camera(mut commands: Commands) {
    // Fixed camera; the MapCamera resource owns all pan/zoom state and the
    // renderer projects into this camera's draw space itself.
    commands.spawn((Camera2d, Name::new("MapViewCamera")));
}

fn teardown_map_view(
    mut commands: Commands,
    mut index: ResMut<FrameHitIndex>,
    mut selection: ResMut<SelectionState>,
) {
    commands.remove_resource::<MapCamera>();
    commands.remove_resource::<camera::RecenterAnimation>();
    index.begin_frame();
    *selection = SelectionState::Idle;
}
