//! Domain model for the fetched universe: systems, waypoints, ships, agent.

use bevy::prelude::*;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WaypointKind {
    Planet,
    GasGiant,
    Asteroid,
    AsteroidBase,
    EngineeredAsteroid,
    FuelStation,
    JumpGate,
    DebrisField,
    GravityWell,
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Waypoint {
    pub symbol: String,
    pub kind: WaypointKind,
    pub position: Vec2,
    /// Symbol of the waypoint this one orbits, if any.
    pub orbits: Option<String>,
    /// Symbols of waypoints orbiting this one.
    pub orbitals: Vec<String>,
}

impl Waypoint {
    pub fn is_orbital(&self) -> bool {
        self.orbits.is_some()
    }
}

#[derive(Resource, Clone, Debug, Default)]
pub struct StarSystem {
    pub symbol: String,
    pub kind: String,
    pub position: Vec2,
    waypoints: Vec<Waypoint>,
}

impl StarSystem {
    /// Builds a system from a fetched waypoint list. Waypoints are a set keyed
    /// on symbol: a duplicate symbol from the wire is dropped, first wins.
    pub fn new(symbol: String, kind: String, position: Vec2, waypoints: Vec<Waypoint>) -> Self {
        let mut deduped: Vec<Waypoint> = Vec::with_capacity(waypoints.len());
        for waypoint in waypoints {
            if deduped.iter().any(|known| known.symbol == waypoint.symbol) {
                warn!("Duplicate waypoint {} dropped", waypoint.symbol);
                continue;
            }
            deduped.push(waypoint);
        }

        Self {
            symbol,
            kind,
            position,
            waypoints: deduped,
        }
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// The primary drawable set: waypoints that orbit nothing. Orbital
    /// children only appear contextually once their parent is selected.
    pub fn top_level(&self) -> impl Iterator<Item = &Waypoint> {
        self.waypoints.iter().filter(|waypoint| !waypoint.is_orbital())
    }

    pub fn waypoint(&self, symbol: &str) -> Option<&Waypoint> {
        self.waypoints.iter().find(|waypoint| waypoint.symbol == symbol)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavStatus {
    Docked,
    InOrbit,
    InTransit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShipFuel {
    pub current: u32,
    pub capacity: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ship {
    pub symbol: String,
    pub waypoint_symbol: String,
    pub status: NavStatus,
    /// Destination position of the ship's current nav route. Equals the
    /// current waypoint position when the ship is docked or in orbit.
    pub route_destination: Vec2,
    pub fuel: ShipFuel,
}

#[derive(Resource, Clone, Debug, Default)]
pub struct Fleet {
    pub ships: Vec<Ship>,
}

impl Fleet {
    pub fn ship(&self, symbol: &str) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.symbol == symbol)
    }

    pub fn ships_at<'a>(&'a self, waypoint: &'a str) -> impl Iterator<Item = &'a Ship> {
        self.ships
            .iter()
            .filter(move |ship| ship.waypoint_symbol == waypoint)
    }
}

#[derive(Resource, Clone, Debug)]
pub struct AgentInfo {
    pub symbol: String,
    pub headquarters: String,
    pub credits: i64,
    pub ship_count: u32,
}

impl AgentInfo {
    /// Derives the home system symbol from a headquarters waypoint symbol,
    /// e.g. "X1-GZ7-A1" -> "X1-GZ7".
    pub fn home_system_symbol(&self) -> String {
        home_system_symbol(&self.headquarters)
    }
}

pub fn home_system_symbol(waypoint_symbol: &str) -> String {
    waypoint_symbol
        .split('-')
        .take(2)
        .collect::<Vec<_>>()
        .join("-")
}
