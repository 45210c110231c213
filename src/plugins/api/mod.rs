//! Remote API plugin: request dispatch, background workers, reply delivery.
//!
//! Requests are Bevy messages. Each one is handed to a detached worker thread
//! running the blocking client; replies come back over an mpsc channel and are
//! re-published as typed messages, so every downstream consumer stays on the
//! schedule and no fetch ever blocks rendering or pointer handling.

pub mod client;

use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

pub use client::{ApiClient, ApiError};

use crate::plugins::core::{AppConfig, EventLog, GameState, InputBindings};
use crate::plugins::map::camera::MapCamera;
use crate::universe::{home_system_symbol, AgentInfo, Fleet, Ship, StarSystem, Waypoint};

pub struct ApiPlugin;

impl Plugin for ApiPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ApiRequest>()
            .add_message::<AgentFetched>()
            .add_message::<SystemFetched>()
            .add_message::<WaypointDetailFetched>()
            .add_message::<ShipsFetched>()
            .add_message::<NavigationFinished>()
            .init_resource::<ApiTransport>()
            .add_systems(
                OnEnter(GameState::Loading),
                (setup_client, begin_bootstrap).chain(),
            )
            .add_systems(Update, (dispatch_requests, pump_replies).chain())
            .add_systems(
                Update,
                (handle_agent_fetched, handle_system_fetched, handle_ships_fetched)
                    .after(pump_replies),
            )
            .add_systems(
                Update,
                handle_refresh_input.run_if(in_state(GameState::InGame)),
            );
    }
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Message)]
pub struct ApiRequest {
    pub kind: RequestKind,
}

#[derive(Clone, Debug)]
pub enum RequestKind {
    FetchAgent,
    FetchSystem(String),
    /// Waypoint symbols embed their system symbol, so one string is enough.
    FetchWaypointDetail(String),
    FetchShips,
    Navigate {
        ship: String,
        destination: String,
        orbit_first: bool,
    },
}

#[derive(Message)]
pub struct AgentFetched(pub Result<AgentInfo, ApiError>);

#[derive(Message)]
pub struct SystemFetched(pub Result<StarSystem, ApiError>);

#[derive(Message)]
pub struct WaypointDetailFetched {
    pub symbol: String,
    pub result: Result<Waypoint, ApiError>,
}

#[derive(Message)]
pub struct ShipsFetched(pub Result<Vec<Ship>, ApiError>);

#[derive(Message)]
pub struct NavigationFinished {
    pub ship: String,
    pub result: Result<(), ApiError>,
}

// =============================================================================
// Transport
// =============================================================================

pub enum ApiReply {
    Agent(Result<AgentInfo, ApiError>),
    System(Result<StarSystem, ApiError>),
    WaypointDetail {
        symbol: String,
        result: Result<Waypoint, ApiError>,
    },
    Ships(Result<Vec<Ship>, ApiError>),
    Navigation {
        ship: String,
        result: Result<(), ApiError>,
    },
}

#[derive(Resource)]
pub struct ApiTransport {
    tx: Sender<ApiReply>,
    rx: Mutex<Receiver<ApiReply>>,
}

impl Default for ApiTransport {
    fn default() -> Self {
        let (tx, rx) = channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl ApiTransport {
    pub fn sender(&self) -> Sender<ApiReply> {
        self.tx.clone()
    }
}

#[derive(Resource, Clone)]
pub struct ApiSession(pub ApiClient);

// =============================================================================
// Systems
// =============================================================================

fn setup_client(mut commands: Commands, config: Res<AppConfig>) {
    let token = config.token().unwrap_or_default();
    commands.insert_resource(ApiSession(ApiClient::new(config.api_base.clone(), token)));
}

fn begin_bootstrap(mut requests: MessageWriter<ApiRequest>, mut log: ResMut<EventLog>) {
    log.push("Fetching agent...".to_string());
    requests.write(ApiRequest {
        kind: RequestKind::FetchAgent,
    });
}

fn dispatch_requests(
    mut requests: MessageReader<ApiRequest>,
    session: Option<Res<ApiSession>>,
    transport: Res<ApiTransport>,
) {
    let Some(session) = session else {
        return;
    };

    for request in requests.read() {
        spawn_worker(session.0.clone(), transport.sender(), request.kind.clone());
    }
}

fn spawn_worker(client: ApiClient, tx: Sender<ApiReply>, kind: RequestKind) {
    std::thread::spawn(move || {
        let reply = match kind {
            RequestKind::FetchAgent => ApiReply::Agent(client.fetch_agent()),
            RequestKind::FetchSystem(symbol) => ApiReply::System(client.fetch_system(&symbol)),
            RequestKind::FetchWaypointDetail(symbol) => {
                let system = home_system_symbol(&symbol);
                let result = client.fetch_waypoint(&system, &symbol);
                ApiReply::WaypointDetail { symbol, result }
            }
            RequestKind::FetchShips => ApiReply::Ships(client.fetch_ships()),
            RequestKind::Navigate {
                ship,
                destination,
                orbit_first,
            } => {
                // Sequential: the orbit stage must land before navigate is sent.
                let result = if orbit_first {
                    client
                        .orbit_ship(&ship)
                        .and_then(|_| client.navigate_ship(&ship, &destination))
                } else {
                    client.navigate_ship(&ship, &destination)
                };
                ApiReply::Navigation { ship, result }
            }
        };

        // The receiver only disappears on shutdown; nothing to report then.
        let _ = tx.send(reply);
    });
}

#[allow(clippy::too_many_arguments)]
fn pump_replies(
    transport: Res<ApiTransport>,
    mut agent_out: MessageWriter<AgentFetched>,
    mut system_out: MessageWriter<SystemFetched>,
    mut waypoint_out: MessageWriter<WaypointDetailFetched>,
    mut ships_out: MessageWriter<ShipsFetched>,
    mut nav_out: MessageWriter<NavigationFinished>,
) {
    let Ok(rx) = transport.rx.lock() else {
        return;
    };

    while let Ok(reply) = rx.try_recv() {
        match reply {
            ApiReply::Agent(result) => {
                agent_out.write(AgentFetched(result));
            }
            ApiReply::System(result) => {
                system_out.write(SystemFetched(result));
            }
            ApiReply::WaypointDetail { symbol, result } => {
                waypoint_out.write(WaypointDetailFetched { symbol, result });
            }
            ApiReply::Ships(result) => {
                ships_out.write(ShipsFetched(result));
            }
            ApiReply::Navigation { ship, result } => {
                nav_out.write(NavigationFinished { ship, result });
            }
        }
    }
}

fn handle_agent_fetched(
    mut commands: Commands,
    mut messages: MessageReader<AgentFetched>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
) {
    for AgentFetched(result) in messages.read() {
        match result {
            Ok(agent) => {
                info!("Agent {} at {}", agent.symbol, agent.headquarters);
                log.push(format!("Agent {} · {} credits", agent.symbol, agent.credits));
                let system = agent.home_system_symbol();
                requests.write(ApiRequest {
                    kind: RequestKind::FetchSystem(system),
                });
                commands.insert_resource(agent.clone());
            }
            Err(error) => {
                error!("Agent fetch failed: {}", error);
                log.push(format!("Agent fetch failed: {}", error));
            }
        }
    }
}

fn handle_system_fetched(
    mut commands: Commands,
    mut messages: MessageReader<SystemFetched>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    for SystemFetched(result) in messages.read() {
        match result {
            Ok(system) => {
                log.push(format!(
                    "System {} · {} waypoints",
                    system.symbol,
                    system.waypoints().len()
                ));

                if *state.get() == GameState::Loading {
                    // First successful fetch: the map view comes alive here.
                    let viewport = windows
                        .single()
                        .map(|window| Vec2::new(window.width(), window.height()))
                        .unwrap_or(Vec2::new(1280.0, 720.0));
                    commands.insert_resource(MapCamera::new(viewport));
                    next_state.set(GameState::InGame);
                }

                commands.insert_resource(system.clone());
                requests.write(ApiRequest {
                    kind: RequestKind::FetchShips,
                });
            }
            Err(error) => {
                error!("System fetch failed: {}", error);
                log.push(format!("System fetch failed: {}", error));
            }
        }
    }
}

fn handle_ships_fetched(
    mut commands: Commands,
    mut messages: MessageReader<ShipsFetched>,
    mut log: ResMut<EventLog>,
) {
    for ShipsFetched(result) in messages.read() {
        match result {
            Ok(ships) => {
                log.push(format!("{} ship(s) in fleet", ships.len()));
                commands.insert_resource(Fleet {
                    ships: ships.clone(),
                });
            }
            Err(error) => {
                error!("Ship fetch failed: {}", error);
                log.push(format!("Ship fetch failed: {}", error));
            }
        }
    }
}

fn handle_refresh_input(
    input: Res<ButtonInput<KeyCode>>,
    bindings: Res<InputBindings>,
    system: Option<Res<StarSystem>>,
    mut requests: MessageWriter<ApiRequest>,
    mut log: ResMut<EventLog>,
) {
    if !input.just_pressed(bindings.refresh) {
        return;
    }

    let Some(system) = system else {
        return;
    };

    log.push(format!("Refreshing {}...", system.symbol));
    requests.write(ApiRequest {
        kind: RequestKind::FetchSystem(system.symbol.clone()),
    });
    requests.write(ApiRequest {
        kind: RequestKind::FetchShips,
    });
}
