//! Pointer handling and the selection workflow.
//!
//! One resource owns the whole interaction state; pointer systems run after
//! the render pass so they only ever consult the hit index rebuilt this frame.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::plugins::api::{ApiRequest, RequestKind, WaypointDetailFetched};
use crate::plugins::core::{EventLog, InputBindings};
use crate::universe::{Fleet, Waypoint};

use super::camera::MapCamera;
use super::hittest::find_at;
use super::render::{FrameHitIndex, HitTarget};

// =============================================================================
// Resources
// =============================================================================

/// The selection workflow. Exactly one variant at a time; entering `Dragging`
/// replaces, and therefore clears, any waypoint or ship selection.
#[derive(Resource, Debug, Clone, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Dragging {
        /// Cursor position at the previous move, not the drag origin; panning
        /// from the origin would compound the delta every frame.
        last: Vec2,
    },
    WaypointSelected {
        symbol: String,
        detail: Option<Waypoint>,
        orbitals: Vec<Waypoint>,
    },
    ShipSelected {
        waypoint: String,
        ship: String,
    },
    DestinationChosen {
        ship: String,
        origin: String,
        target: String,
        candidates: Vec<Waypoint>,
    },
}

// =============================================================================
// Transitions
// =============================================================================

/// Computes the state a pointer press moves to, plus the waypoint symbols
/// whose details must be fetched as a side effect.
pub fn pointer_down_transition(
    current: &SelectionState,
    hit: Option<&HitTarget>,
    cursor: Vec2,
    fleet: Option<&Fleet>,
) -> (SelectionState, Vec<String>) {
    match hit {
        // Empty space: start a drag. That replaces any selection.
        None => (SelectionState::Dragging { last: cursor }, Vec::new()),

        Some(HitTarget::Waypoint(symbol)) => {
            if let SelectionState::ShipSelected { waypoint, ship } = current {
                if symbol != waypoint {
                    return (
                        SelectionState::DestinationChosen {
                            ship: ship.clone(),
                            origin: waypoint.clone(),
                            target: symbol.clone(),
                            candidates: Vec::new(),
                        },
                        vec![symbol.clone()],
                    );
                }
            }

            (
                SelectionState::WaypointSelected {
                    symbol: symbol.clone(),
                    detail: None,
                    orbitals: Vec::new(),
                },
                vec![symbol.clone()],
            )
        }

        Some(HitTarget::Ship(ship)) => {
            let Some(at) = fleet
                .and_then(|fleet| fleet.ship(ship))
                .map(|ship| ship.waypoint_symbol.clone())
            else {
                // A glyph for a ship the fleet no longer knows: leave things be.
                return (current.clone(), Vec::new());
            };

            if let SelectionState::WaypointSelected { symbol, .. } = current {
                if *symbol == at {
                    return (
                        SelectionState::ShipSelected {
                            waypoint: at,
                            ship: ship.clone(),
                        },
                        Vec::new(),
                    );
                }
            }

            // Outside the select-waypoint-first flow, a ship press acts as a
            // press on its waypoint.
            (
                SelectionState::WaypointSelected {
                    symbol: at.clone(),
                    detail: None,
                    orbitals: Vec::new(),
                },
                vec![at],
            )
        }
    }
}

/// Pans by the delta since the previous move and records the new position.
pub fn drag_step(selection: &mut SelectionState, camera: &mut MapCamera, cursor: Vec2) {
    if let SelectionState::Dragging { last } = selection {
        let delta = cursor - *last;
        camera.pan(delta);
        *last = cursor;
    }
}

/// Adds a fetched waypoint to a destination candidate list, skipping the
/// ship's current waypoint and anything already offered.
pub fn admit_candidate(
    candidates: &mut Vec<Waypoint>,
    waypoint: &Waypoint,
    ship_waypoint: Option<&str>,
) {
    if Some(waypoint.symbol.as_str()) == ship_waypoint {
        return;
    }
    if candidates.iter().any(|known| known.symbol == waypoint.symbol) {
        return;
    }
    candidates.push(waypoint.clone());
}

// =============================================================================
// Systems
// =============================================================================

#[allow(clippy::too_many_arguments)]
pub fn handle_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    index: Res<FrameHitIndex>,
    fleet: Option<Res<Fleet>>,
    mut camera: ResMut<MapCamera>,
    mut selection: ResMut<SelectionState>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
) {
    let Ok(window) = windows.single() else {
        return;
    };

    let Some(cursor) = window.cursor_position() else {
        // Cursor left the window: a drag in progress ends here.
        if matches!(*selection, SelectionState::Dragging { .. }) {
            *selection = SelectionState::Idle;
        }
        return;
    };

    if mouse.just_pressed(MouseButton::Left) {
        let hit = find_at(&index, cursor).map(|glyph| &glyph.target);
        let (next, fetches) =
            pointer_down_transition(&selection, hit, cursor, fleet.as_deref());

        match &next {
            SelectionState::WaypointSelected { symbol, .. } => {
                log.push(format!("Waypoint {} selected", symbol));
            }
            SelectionState::ShipSelected { ship, .. } => {
                log.push(format!("Ship {} selected, pick a destination", ship));
            }
            SelectionState::DestinationChosen { target, .. } => {
                log.push(format!("Destination {}: confirm in panel", target));
            }
            _ => {}
        }

        for symbol in fetches {
            requests.write(ApiRequest {
                kind: RequestKind::FetchWaypointDetail(symbol),
            });
        }

        *selection = next;
    } else if mouse.pressed(MouseButton::Left) {
        drag_step(&mut selection, &mut camera, cursor);
    } else if mouse.just_released(MouseButton::Left)
        && matches!(*selection, SelectionState::Dragging { .. })
    {
        *selection = SelectionState::Idle;
    }
}

pub fn handle_clear_selection(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    mut selection: ResMut<SelectionState>,
) {
    if input.just_pressed(bindings.clear_selection) && *selection != SelectionState::Idle {
        *selection = SelectionState::Idle;
    }
}

/// Routes waypoint-detail replies into the current selection. Each orbital
/// fetch fails or succeeds on its own; one bad orbital never blocks the rest.
pub fn apply_waypoint_details(
    mut messages: MessageReader<WaypointDetailFetched>,
    mut selection: ResMut<SelectionState>,
    fleet: Option<Res<Fleet>>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
) {
    for message in messages.read() {
        let waypoint = match &message.result {
            Ok(waypoint) => waypoint,
            Err(error) => {
                warn!("Waypoint {} detail failed: {}", message.symbol, error);
                log.push(format!("Waypoint {} detail failed: {}", message.symbol, error));
                continue;
            }
        };

        match &mut *selection {
            SelectionState::WaypointSelected {
                symbol,
                detail,
                orbitals,
            } => {
                if waypoint.symbol == *symbol {
                    for orbital in &waypoint.orbitals {
                        requests.write(ApiRequest {
                            kind: RequestKind::FetchWaypointDetail(orbital.clone()),
                        });
                    }
                    *detail = Some(waypoint.clone());
                } else if waypoint.orbits.as_deref() == Some(symbol.as_str())
                    && !orbitals.iter().any(|known| known.symbol == waypoint.symbol)
                {
                    orbitals.push(waypoint.clone());
                }
            }

            SelectionState::DestinationChosen {
                ship,
                target,
                candidates,
                ..
            } => {
                let ship_waypoint = fleet
                    .as_deref()
                    .and_then(|fleet| fleet.ship(ship))
                    .map(|ship| ship.waypoint_symbol.clone());

                if waypoint.symbol == *target {
                    for orbital in &waypoint.orbitals {
                        requests.write(ApiRequest {
                            kind: RequestKind::FetchWaypointDetail(orbital.clone()),
                        });
                    }
                    admit_candidate(candidates, waypoint, ship_waypoint.as_deref());
                } else if waypoint.orbits.as_deref() == Some(target.as_str()) {
                    admit_candidate(candidates, waypoint, ship_waypoint.as_deref());
                }
            }

            // A reply that outlived the selection it was fetched for.
            _ => {}
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
