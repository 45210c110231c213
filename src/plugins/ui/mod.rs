//! UI plugin: HUD, selection panel, destination picking, log feed.

mod components;
mod hud;
mod log;
mod waypoints;

use bevy::prelude::*;

use crate::plugins::core::GameState;

pub use components::CandidateItem;

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, hud::setup_hud)
            .add_systems(
                Update,
                (
                    hud::update_agent_panel,
                    hud::update_camera_panel,
                    log::update_log_panel,
                ),
            )
            .add_systems(
                Update,
                (
                    waypoints::update_selection_panel,
                    waypoints::update_candidate_list,
                    waypoints::handle_candidate_clicks,
                    waypoints::update_candidate_item_styles,
                )
                    .run_if(in_state(GameState::InGame)),
            );
    }
}
