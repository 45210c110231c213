//! Navigation planning: fuel feasibility and the orbit-then-navigate sequence.

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;

use crate::plugins::api::{ApiRequest, NavigationFinished, RequestKind};
use crate::plugins::core::{EventLog, GameState};
use crate::plugins::map::SelectionState;
use crate::universe::{Fleet, NavStatus, Ship, StarSystem, Waypoint};

pub struct NavPlugin;

impl Plugin for NavPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<NavigationOrder>().add_systems(
            Update,
            (issue_navigation, handle_navigation_finished).run_if(in_state(GameState::InGame)),
        );
    }
}

/// A confirmed destination for a ship, written by the UI.
#[derive(Message)]
pub struct NavigationOrder {
    pub ship: String,
    pub destination: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Feasibility {
    Feasible { distance: f32, orbit_first: bool },
    InsufficientFuel { distance: f32, fuel: u32 },
}

/// Distance is measured from the ship's current route destination, not a live
/// in-transit position; that is what the data offers at decision time, and the
/// approximation is kept deliberately.
pub fn plan_route(ship: &Ship, destination: &Waypoint) -> Feasibility {
    let distance = ship.route_destination.distance(destination.position);

    if (ship.fuel.current as f32) > distance {
        Feasibility::Feasible {
            distance,
            orbit_first: ship.status != NavStatus::InOrbit,
        }
    } else {
        Feasibility::InsufficientFuel {
            distance,
            fuel: ship.fuel.current,
        }
    }
}

/// Resolves a destination symbol against the offered candidates first, then
/// the system at large.
pub fn destination_waypoint<'a>(
    selection: &'a SelectionState,
    system: Option<&'a StarSystem>,
    symbol: &str,
) -> Option<&'a Waypoint> {
    if let SelectionState::DestinationChosen { candidates, .. } = selection {
        if let Some(found) = candidates.iter().find(|candidate| candidate.symbol == symbol) {
            return Some(found);
        }
    }

    system.and_then(|system| system.waypoint(symbol))
}

// =============================================================================
// Systems
// =============================================================================

pub fn issue_navigation(
    mut orders: MessageReader<NavigationOrder>,
    fleet: Option<Res<Fleet>>,
    system: Option<Res<StarSystem>>,
    selection: Res<SelectionState>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
) {
    for order in orders.read() {
        let Some(ship) = fleet.as_deref().and_then(|fleet| fleet.ship(&order.ship)) else {
            warn!("Navigation order for unknown ship {}", order.ship);
            log.push(format!("Ship {} is not in the fleet", order.ship));
            continue;
        };

        let Some(destination) =
            destination_waypoint(&selection, system.as_deref(), &order.destination)
        else {
            log.push(format!("Waypoint {} is not charted", order.destination));
            continue;
        };

        match plan_route(ship, destination) {
            Feasibility::InsufficientFuel { distance, fuel } => {
                // A user-facing condition, not an error; nothing is issued.
                log.push(format!(
                    "Insufficient fuel for {}: needs more than {:.0}, {} aboard",
                    order.destination, distance, fuel
                ));
            }
            Feasibility::Feasible {
                distance,
                orbit_first,
            } => {
                info!(
                    "Navigating {} to {} ({:.0} units, orbit_first: {})",
                    order.ship, order.destination, distance, orbit_first
                );
                log.push(format!(
                    "Navigating {} to {} ({:.0} units)",
                    order.ship, order.destination, distance
                ));
                requests.write(ApiRequest {
                    kind: RequestKind::Navigate {
                        ship: order.ship.clone(),
                        destination: order.destination.clone(),
                        orbit_first,
                    },
                });
            }
        }
    }
}

pub fn handle_navigation_finished(
    mut messages: MessageReader<NavigationFinished>,
    mut selection: ResMut<SelectionState>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
) {
    for message in messages.read() {
        match &message.result {
            Ok(()) => {
                log.push(format!("{} under way", message.ship));
                *selection = SelectionState::Idle;
                requests.write(ApiRequest {
                    kind: RequestKind::FetchShips,
                });
            }
            Err(error) => {
                error!("Navigation failed for {}: {}", message.ship, error);
                log.push(format!("Navigation failed: {}", error));
                // Selection stays as it is so the user can retry or abort.
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::api::ApiError;
    use crate::universe::{ShipFuel, WaypointKind};
    use bevy::ecs::message::Messages;
    use bevy::ecs::system::SystemState;

    fn ship(fuel: u32, status: NavStatus, route_destination: Vec2) -> Ship {
        Ship {
            symbol: "WANDERER-1".to_string(),
            waypoint_symbol: "X1-GZ7-A1".to_string(),
            status,
            route_destination,
            fuel: ShipFuel {
                current: fuel,
                capacity: 400,
            },
        }
    }

    fn waypoint_at(symbol: &str, x: f32, y: f32) -> Waypoint {
        Waypoint {
            symbol: symbol.to_string(),
            kind: WaypointKind::Planet,
            position: Vec2::new(x, y),
            orbits: None,
            orbitals: Vec::new(),
        }
    }

    #[test]
    fn short_on_fuel_is_infeasible() {
        // Fuel 10 against a 12-unit leg.
        let ship = ship(10, NavStatus::InOrbit, Vec2::ZERO);
        let destination = waypoint_at("X1-GZ7-B2", 12.0, 0.0);

        assert_eq!(
            plan_route(&ship, &destination),
            Feasibility::InsufficientFuel {
                distance: 12.0,
                fuel: 10
            }
        );
    }

    #[test]
    fn fuel_equal_to_distance_is_still_infeasible() {
        let ship = ship(12, NavStatus::InOrbit, Vec2::ZERO);
        let destination = waypoint_at("X1-GZ7-B2", 12.0, 0.0);
        assert!(matches!(
            plan_route(&ship, &destination),
            Feasibility::InsufficientFuel { .. }
        ));
    }

    #[test]
    fn docked_ship_orbits_before_navigating() {
        let ship = ship(15, NavStatus::Docked, Vec2::ZERO);
        let destination = waypoint_at("X1-GZ7-B2", 12.0, 0.0);

        assert_eq!(
            plan_route(&ship, &destination),
            Feasibility::Feasible {
                distance: 12.0,
                orbit_first: true
            }
        );
    }

    #[test]
    fn orbiting_ship_skips_the_orbit_command() {
        let ship = ship(15, NavStatus::InOrbit, Vec2::ZERO);
        let destination = waypoint_at("X1-GZ7-B2", 12.0, 0.0);

        assert_eq!(
            plan_route(&ship, &destination),
            Feasibility::Feasible {
                distance: 12.0,
                orbit_first: false
            }
        );
    }

    #[test]
    fn transit_ship_measures_from_route_destination() {
        // The ship reports waypoint A but is bound for (100, 0); the check
        // uses the route destination, so the leg is 12 units, not 112.
        let ship = ship(15, NavStatus::InTransit, Vec2::new(100.0, 0.0));
        let destination = waypoint_at("X1-GZ7-C3", 112.0, 0.0);

        assert_eq!(
            plan_route(&ship, &destination),
            Feasibility::Feasible {
                distance: 12.0,
                orbit_first: true
            }
        );
    }

    #[test]
    fn destination_waypoint_prefers_candidates() {
        let selection = SelectionState::DestinationChosen {
            ship: "WANDERER-1".to_string(),
            origin: "X1-GZ7-A1".to_string(),
            target: "X1-GZ7-B2".to_string(),
            candidates: vec![waypoint_at("X1-GZ7-B2", 30.0, 0.0)],
        };

        let found = destination_waypoint(&selection, None, "X1-GZ7-B2").unwrap();
        assert_eq!(found.position, Vec2::new(30.0, 0.0));
    }

    #[test]
    fn destination_waypoint_falls_back_to_system() {
        let system = StarSystem::new(
            "X1-GZ7".to_string(),
            "RED_STAR".to_string(),
            Vec2::ZERO,
            vec![waypoint_at("X1-GZ7-B2", 30.0, 0.0)],
        );

        let found = destination_waypoint(&SelectionState::Idle, Some(&system), "X1-GZ7-B2");
        assert!(found.is_some());
    }

    fn run_issue_navigation(world: &mut World) {
        let mut system_state: SystemState<(
            MessageReader<NavigationOrder>,
            Option<Res<Fleet>>,
            Option<Res<StarSystem>>,
            Res<SelectionState>,
            MessageWriter<ApiRequest>,
            ResMut<EventLog>,
        )> = SystemState::new(world);
        let (orders, fleet, system, selection, requests, log) = system_state.get_mut(world);
        issue_navigation(orders, fleet, system, selection, requests, log);
        system_state.apply(world);
    }

    fn navigation_world(fuel: u32, status: NavStatus) -> World {
        let mut world = World::default();
        world.init_resource::<Messages<NavigationOrder>>();
        world.init_resource::<Messages<ApiRequest>>();
        world.insert_resource(EventLog::default());
        world.insert_resource(Fleet {
            ships: vec![ship(fuel, status, Vec2::ZERO)],
        });
        world.insert_resource(SelectionState::DestinationChosen {
            ship: "WANDERER-1".to_string(),
            origin: "X1-GZ7-A1".to_string(),
            target: "X1-GZ7-B2".to_string(),
            candidates: vec![waypoint_at("X1-GZ7-B2", 12.0, 0.0)],
        });
        world
            .resource_mut::<Messages<NavigationOrder>>()
            .write(NavigationOrder {
                ship: "WANDERER-1".to_string(),
                destination: "X1-GZ7-B2".to_string(),
            });
        world
    }

    #[test]
    fn infeasible_order_issues_no_command_and_reports() {
        let mut world = navigation_world(10, NavStatus::Docked);
        run_issue_navigation(&mut world);

        let queued: Vec<ApiRequest> = world
            .resource_mut::<Messages<ApiRequest>>()
            .drain()
            .collect();
        assert!(queued.is_empty());

        let log = world.resource::<EventLog>();
        assert!(log
            .entries()
            .iter()
            .any(|entry| entry.contains("Insufficient fuel")));
    }

    #[test]
    fn feasible_docked_order_requests_orbit_then_navigate() {
        let mut world = navigation_world(15, NavStatus::Docked);
        run_issue_navigation(&mut world);

        let queued: Vec<ApiRequest> = world
            .resource_mut::<Messages<ApiRequest>>()
            .drain()
            .collect();
        assert_eq!(queued.len(), 1);
        match &queued[0].kind {
            RequestKind::Navigate {
                ship,
                destination,
                orbit_first,
            } => {
                assert_eq!(ship, "WANDERER-1");
                assert_eq!(destination, "X1-GZ7-B2");
                assert!(orbit_first);
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    fn run_navigation_finished(world: &mut World) {
        let mut system_state: SystemState<(
            MessageReader<NavigationFinished>,
            ResMut<SelectionState>,
            MessageWriter<ApiRequest>,
            ResMut<EventLog>,
        )> = SystemState::new(world);
        let (messages, selection, requests, log) = system_state.get_mut(world);
        handle_navigation_finished(messages, selection, requests, log);
        system_state.apply(world);
    }

    fn finished_world(result: Result<(), ApiError>) -> World {
        let mut world = World::default();
        world.init_resource::<Messages<NavigationFinished>>();
        world.init_resource::<Messages<ApiRequest>>();
        world.insert_resource(EventLog::default());
        world.insert_resource(SelectionState::DestinationChosen {
            ship: "WANDERER-1".to_string(),
            origin: "X1-GZ7-A1".to_string(),
            target: "X1-GZ7-B2".to_string(),
            candidates: Vec::new(),
        });
        world
            .resource_mut::<Messages<NavigationFinished>>()
            .write(NavigationFinished {
                ship: "WANDERER-1".to_string(),
                result,
            });
        world
    }

    #[test]
    fn successful_navigation_returns_to_idle_and_refreshes_ships() {
        let mut world = finished_world(Ok(()));
        run_navigation_finished(&mut world);

        assert_eq!(*world.resource::<SelectionState>(), SelectionState::Idle);

        let queued: Vec<ApiRequest> = world
            .resource_mut::<Messages<ApiRequest>>()
            .drain()
            .collect();
        assert!(matches!(
            queued.as_slice(),
            [ApiRequest {
                kind: RequestKind::FetchShips
            }]
        ));
    }

    #[test]
    fn failed_navigation_keeps_selection_for_retry() {
        let mut world = finished_world(Err(ApiError::Transport("connection reset".to_string())));
        run_navigation_finished(&mut world);

        assert!(matches!(
            *world.resource::<SelectionState>(),
            SelectionState::DestinationChosen { .. }
        ));
        assert!(world
            .resource::<EventLog>()
            .entries()
            .iter()
            .any(|entry| entry.contains("Navigation failed")));
    }
}
