//! Selection panel: waypoint detail, orbitals, and destination candidates.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use std::path::Path;

use crate::plugins::map::render::kind_letter;
use crate::plugins::map::SelectionState;
use crate::plugins::nav::NavigationOrder;
use crate::universe::{Fleet, Waypoint};

use super::components::{candidate_item_color, CandidateItem, SelectionPanelText};

const CANDIDATE_TOP: f32 = 170.0;
const CANDIDATE_ROW_HEIGHT: f32 = 20.0;

// =============================================================================
// Systems
// =============================================================================

pub fn update_selection_panel(
    selection: Res<SelectionState>,
    fleet: Option<Res<Fleet>>,
    mut panel: Query<&mut Text, With<SelectionPanelText>>,
) {
    if let Some(mut text) = panel.iter_mut().next() {
        text.0 = format_selection_panel(&selection, fleet.as_deref());
    }
}

/// Rebuilds the clickable destination rows. The list is small and must track
/// the candidate set as orbital fetches trickle in, so a full rebuild per
/// frame is the simplest correct thing.
pub fn update_candidate_list(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    selection: Res<SelectionState>,
    existing: Query<Entity, With<CandidateItem>>,
) {
    for entity in existing.iter() {
        commands.entity(entity).despawn();
    }

    let SelectionState::DestinationChosen { candidates, .. } = &*selection else {
        return;
    };

    let font_path = "fonts/SpaceMono-Regular.ttf";
    let font_on_disk = Path::new("assets").join(font_path);
    if !font_on_disk.exists() {
        return;
    }
    let font = asset_server.load(font_path);

    for (index, candidate) in candidates.iter().enumerate() {
        commands.spawn((
            CandidateItem {
                symbol: candidate.symbol.clone(),
            },
            Interaction::None,
            Text::new(format_candidate_row(candidate)),
            TextFont {
                font: font.clone(),
                font_size: 13.0,
                ..default()
            },
            TextColor(candidate_item_color(false)),
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(14.0),
                top: Val::Px(CANDIDATE_TOP + index as f32 * CANDIDATE_ROW_HEIGHT),
                ..default()
            },
        ));
    }
}

/// A click on a candidate row is the destination confirmation.
pub fn handle_candidate_clicks(
    selection: Res<SelectionState>,
    items: Query<(&Interaction, &CandidateItem), Changed<Interaction>>,
    mut orders: MessageWriter<NavigationOrder>,
) {
    let SelectionState::DestinationChosen { ship, .. } = &*selection else {
        return;
    };

    for (interaction, item) in items.iter() {
        if matches!(interaction, Interaction::Pressed) {
            orders.write(NavigationOrder {
                ship: ship.clone(),
                destination: item.symbol.clone(),
            });
        }
    }
}

pub fn update_candidate_item_styles(
    mut items: Query<(&Interaction, &mut TextColor), With<CandidateItem>>,
) {
    for (interaction, mut color) in items.iter_mut() {
        let is_hovered = matches!(interaction, Interaction::Hovered);
        color.0 = candidate_item_color(is_hovered);
    }
}

// =============================================================================
// Formatting
// =============================================================================

pub fn format_candidate_row(waypoint: &Waypoint) -> String {
    format!(
        "{} [{}] ({:.0}, {:.0})",
        waypoint.symbol,
        kind_letter(waypoint.kind),
        waypoint.position.x,
        waypoint.position.y
    )
}

pub fn format_selection_panel(selection: &SelectionState, fleet: Option<&Fleet>) -> String {
    match selection {
        SelectionState::Idle | SelectionState::Dragging { .. } => {
            "Click a waypoint to inspect it".to_string()
        }

        SelectionState::WaypointSelected {
            symbol,
            detail,
            orbitals,
        } => {
            let mut lines = vec![format!("Waypoint {}", symbol)];

            match detail {
                Some(detail) => {
                    lines.push(format!(
                        "[{}] at ({:.0}, {:.0})",
                        kind_letter(detail.kind),
                        detail.position.x,
                        detail.position.y
                    ));
                    if !detail.orbitals.is_empty() {
                        lines.push(format!("{} orbital(s):", detail.orbitals.len()));
                    }
                }
                None => lines.push("fetching detail...".to_string()),
            }

            for orbital in orbitals {
                lines.push(format!("  {}", format_candidate_row(orbital)));
            }

            if let Some(fleet) = fleet {
                for ship in fleet.ships_at(symbol) {
                    lines.push(format!(
                        "Ship {} here ({}/{} fuel) - click its marker",
                        ship.symbol, ship.fuel.current, ship.fuel.capacity
                    ));
                }
            }

            lines.join("\n")
        }

        SelectionState::ShipSelected { waypoint, ship } => {
            let fuel_line = fleet
                .and_then(|fleet| fleet.ship(ship))
                .map(|ship| format!("{}/{} fuel", ship.fuel.current, ship.fuel.capacity))
                .unwrap_or_else(|| "fuel unknown".to_string());

            format!(
                "Ship {} at {}\n{}\nClick another waypoint to pick a destination",
                ship, waypoint, fuel_line
            )
        }

        SelectionState::DestinationChosen {
            ship,
            target,
            candidates,
            ..
        } => {
            if candidates.is_empty() {
                format!("Routing {} toward {}\nfetching candidates...", ship, target)
            } else {
                format!(
                    "Routing {} toward {}\nClick a destination to commit:",
                    ship, target
                )
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
