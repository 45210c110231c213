//! HUD setup and the agent/camera readouts.

use bevy::prelude::*;
use std::path::Path;

use crate::plugins::map::MapCamera;
use crate::universe::{AgentInfo, StarSystem};

use super::components::{AgentPanelText, CameraPanelText, LogContentText, SelectionPanelText};

// =============================================================================
// Setup
// =============================================================================

pub fn setup_hud(mut commands: Commands, asset_server: Res<AssetServer>) {
    let font_path = "fonts/SpaceMono-Regular.ttf";
    let font_on_disk = Path::new("assets").join(font_path);

    if !font_on_disk.exists() {
        info!("HUD font not found at {}", font_on_disk.display());
        return;
    }

    let font = asset_server.load(font_path);

    // Agent readout (top-left)
    commands.spawn((
        AgentPanelText,
        Text::new("Connecting..."),
        TextFont {
            font: font.clone(),
            font_size: 18.0,
            ..default()
        },
        TextColor(Color::srgb(0.9, 0.9, 0.95)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(10.0),
            ..default()
        },
    ));

    // Camera readout plus key hints
    commands.spawn((
        CameraPanelText,
        Text::new("--"),
        TextFont {
            font: font.clone(),
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.6, 0.65, 0.72)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            top: Val::Px(36.0),
            ..default()
        },
    ));

    // Selection panel (top-right)
    commands.spawn((
        SelectionPanelText,
        Text::new(""),
        TextFont {
            font: font.clone(),
            font_size: 14.0,
            ..default()
        },
        TextColor(Color::srgb(0.82, 0.88, 0.95)),
        Node {
            position_type: PositionType::Absolute,
            right: Val::Px(14.0),
            top: Val::Px(10.0),
            ..default()
        },
    ));

    // Log panel (bottom-left)
    commands.spawn((
        LogContentText,
        Text::new("Awaiting signal..."),
        TextFont {
            font: font.clone(),
            font_size: 13.0,
            ..default()
        },
        TextColor(Color::srgb(0.55, 0.7, 0.7)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(14.0),
            bottom: Val::Px(12.0),
            ..default()
        },
    ));
}

// =============================================================================
// Update systems
// =============================================================================

pub fn update_agent_panel(
    agent: Option<Res<AgentInfo>>,
    system: Option<Res<StarSystem>>,
    mut panel: Query<&mut Text, With<AgentPanelText>>,
) {
    if let Some(mut text) = panel.iter_mut().next() {
        text.0 = format_agent_panel(agent.as_deref(), system.as_deref());
    }
}

pub fn update_camera_panel(
    camera: Option<Res<MapCamera>>,
    mut panel: Query<&mut Text, With<CameraPanelText>>,
) {
    if let Some(mut text) = panel.iter_mut().next() {
        text.0 = format_camera_panel(camera.as_deref());
    }
}

// =============================================================================
// Formatting
// =============================================================================

pub fn format_agent_panel(agent: Option<&AgentInfo>, system: Option<&StarSystem>) -> String {
    let Some(agent) = agent else {
        return "Connecting...".to_string();
    };

    let system_line = match system {
        Some(system) => format!("{} ({})", system.symbol, system.kind),
        None => "charting...".to_string(),
    };

    format!(
        "{} | {} credits | {} ship(s) | {}",
        agent.symbol, agent.credits, agent.ship_count, system_line
    )
}

pub fn format_camera_panel(camera: Option<&MapCamera>) -> String {
    match camera {
        Some(camera) => format!(
            "Zoom {} | Focus ({:.0}, {:.0}) | H home · R refresh · G grid · Y labels",
            camera.zoom_label(),
            camera.position.x,
            camera.position.y
        ),
        None => "--".to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec2;

    #[test]
    fn agent_panel_placeholder_without_agent() {
        assert_eq!(format_agent_panel(None, None), "Connecting...");
    }

    #[test]
    fn agent_panel_shows_credits_and_ships() {
        let agent = AgentInfo {
            symbol: "WANDERER".to_string(),
            headquarters: "X1-GZ7-A1".to_string(),
            credits: 175000,
            ship_count: 2,
        };
        let line = format_agent_panel(Some(&agent), None);
        assert!(line.contains("WANDERER"));
        assert!(line.contains("175000 credits"));
        assert!(line.contains("2 ship(s)"));
        assert!(line.contains("charting..."));
    }

    #[test]
    fn camera_panel_shows_zoom_and_focus() {
        let mut camera = MapCamera::new(Vec2::new(800.0, 600.0));
        camera.position = Vec2::new(42.0, -7.0);
        let line = format_camera_panel(Some(&camera));
        assert!(line.contains("Zoom 1.00"));
        assert!(line.contains("(42, -7)"));
    }
}
