//! Blocking SpaceTraders API client and wire DTOs.
//!
//! Every call returns `Result` and is meant to run on a worker thread; the
//! schedule never blocks on the network.

use bevy::math::Vec2;
use serde::de::DeserializeOwned;
use std::fmt;

use crate::universe::{AgentInfo, NavStatus, Ship, ShipFuel, StarSystem, Waypoint, WaypointKind};

#[derive(Debug, Clone)]
pub enum ApiError {
    Transport(String),
    Status { code: u16, endpoint: String },
    Decode(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(message) => write!(f, "transport error: {}", message),
            ApiError::Status { code, endpoint } => {
                write!(f, "HTTP {} from {}", code, endpoint)
            }
            ApiError::Decode(message) => write!(f, "malformed response: {}", message),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Clone)]
pub struct ApiClient {
    base: String,
    token: String,
    http: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(base: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            token: token.into(),
            http: reqwest::blocking::Client::new(),
        }
    }

    pub fn fetch_agent(&self) -> Result<AgentInfo, ApiError> {
        let agent: AgentDto = self.get("/my/agent")?;
        Ok(agent.into())
    }

    pub fn fetch_system(&self, symbol: &str) -> Result<StarSystem, ApiError> {
        let system: SystemDto = self.get(&format!("/systems/{}", symbol))?;
        Ok(system.into())
    }

    pub fn fetch_waypoint(&self, system: &str, waypoint: &str) -> Result<Waypoint, ApiError> {
        let waypoint: WaypointDto =
            self.get(&format!("/systems/{}/waypoints/{}", system, waypoint))?;
        Ok(waypoint.into())
    }

    pub fn fetch_ships(&self) -> Result<Vec<Ship>, ApiError> {
        let ships: Vec<ShipDto> = self.get("/my/ships?page=1&limit=20")?;
        Ok(ships.into_iter().map(Ship::from).collect())
    }

    /// The API treats orbiting an already-orbiting ship as a no-op.
    pub fn orbit_ship(&self, ship: &str) -> Result<(), ApiError> {
        self.post(&format!("/my/ships/{}/orbit", ship), None)
    }

    pub fn navigate_ship(&self, ship: &str, destination: &str) -> Result<(), ApiError> {
        self.post(
            &format!("/my/ships/{}/navigate", ship),
            Some(serde_json::json!({ "waypointSymbol": destination })),
        )
    }

    fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(format!("{}{}", self.base, path))
            .bearer_auth(&self.token)
            .send()
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        response
            .json::<Envelope<T>>()
            .map(|envelope| envelope.data)
            .map_err(|error| ApiError::Decode(error.to_string()))
    }

    fn post(&self, path: &str, body: Option<serde_json::Value>) -> Result<(), ApiError> {
        let mut request = self
            .http
            .post(format!("{}{}", self.base, path))
            .bearer_auth(&self.token);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .map_err(|error| ApiError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                code: status.as_u16(),
                endpoint: path.to_string(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Wire DTOs
// =============================================================================

#[derive(serde::Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub symbol: String,
    pub headquarters: String,
    pub credits: i64,
    #[serde(default)]
    pub ship_count: u32,
}

impl From<AgentDto> for AgentInfo {
    fn from(dto: AgentDto) -> Self {
        AgentInfo {
            symbol: dto.symbol,
            headquarters: dto.headquarters,
            credits: dto.credits,
            ship_count: dto.ship_count,
        }
    }
}

#[derive(serde::Deserialize)]
pub struct SystemDto {
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub waypoints: Vec<WaypointDto>,
}

impl From<SystemDto> for StarSystem {
    fn from(dto: SystemDto) -> Self {
        StarSystem::new(
            dto.symbol,
            dto.kind,
            Vec2::new(dto.x as f32, dto.y as f32),
            dto.waypoints.into_iter().map(Waypoint::from).collect(),
        )
    }
}

#[derive(serde::Deserialize)]
pub struct WaypointDto {
    pub symbol: String,
    #[serde(rename = "type")]
    pub kind: WaypointKind,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub orbitals: Vec<OrbitalDto>,
    #[serde(default)]
    pub orbits: Option<String>,
}

impl From<WaypointDto> for Waypoint {
    fn from(dto: WaypointDto) -> Self {
        Waypoint {
            symbol: dto.symbol,
            kind: dto.kind,
            position: Vec2::new(dto.x as f32, dto.y as f32),
            orbits: dto.orbits,
            orbitals: dto.orbitals.into_iter().map(|orbital| orbital.symbol).collect(),
        }
    }
}

#[derive(serde::Deserialize)]
pub struct OrbitalDto {
    pub symbol: String,
}

#[derive(serde::Deserialize)]
pub struct ShipDto {
    pub symbol: String,
    pub nav: NavDto,
    pub fuel: FuelDto,
}

impl From<ShipDto> for Ship {
    fn from(dto: ShipDto) -> Self {
        Ship {
            symbol: dto.symbol,
            waypoint_symbol: dto.nav.waypoint_symbol,
            status: dto.nav.status.into(),
            route_destination: Vec2::new(
                dto.nav.route.destination.x as f32,
                dto.nav.route.destination.y as f32,
            ),
            fuel: ShipFuel {
                current: dto.fuel.current,
                capacity: dto.fuel.capacity,
            },
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavDto {
    pub waypoint_symbol: String,
    pub status: NavStatusDto,
    pub route: RouteDto,
}

#[derive(serde::Deserialize, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavStatusDto {
    Docked,
    InOrbit,
    InTransit,
}

impl From<NavStatusDto> for NavStatus {
    fn from(dto: NavStatusDto) -> Self {
        match dto {
            NavStatusDto::Docked => NavStatus::Docked,
            NavStatusDto::InOrbit => NavStatus::InOrbit,
            NavStatusDto::InTransit => NavStatus::InTransit,
        }
    }
}

#[derive(serde::Deserialize)]
pub struct RouteDto {
    pub destination: RoutePointDto,
}

#[derive(serde::Deserialize)]
pub struct RoutePointDto {
    pub x: i32,
    pub y: i32,
}

#[derive(serde::Deserialize)]
pub struct FuelDto {
    pub current: u32,
    pub capacity: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_dto_parses_wire_shape() {
        let raw = r#"{
            "data": {
                "accountId": "abc123",
                "symbol": "WANDERER",
                "headquarters": "X1-GZ7-A1",
                "credits": 175000,
                "startingFaction": "COSMIC",
                "shipCount": 2
            }
        }"#;

        let envelope: Envelope<AgentDto> = serde_json::from_str(raw).unwrap();
        let agent: AgentInfo = envelope.data.into();
        assert_eq!(agent.symbol, "WANDERER");
        assert_eq!(agent.credits, 175000);
        assert_eq!(agent.ship_count, 2);
        assert_eq!(agent.home_system_symbol(), "X1-GZ7");
    }

    #[test]
    fn system_dto_parses_waypoints_and_orbits() {
        let raw = r#"{
            "data": {
                "symbol": "X1-GZ7",
                "sectorSymbol": "X1",
                "type": "NEUTRON_STAR",
                "x": -9,
                "y": 44,
                "waypoints": [
                    {
                        "symbol": "X1-GZ7-A1",
                        "type": "PLANET",
                        "x": 7,
                        "y": -14,
                        "orbitals": [{ "symbol": "X1-GZ7-A2" }]
                    },
                    {
                        "symbol": "X1-GZ7-A2",
                        "type": "ORBITAL_STATION",
                        "x": 7,
                        "y": -14,
                        "orbitals": [],
                        "orbits": "X1-GZ7-A1"
                    }
                ]
            }
        }"#;

        let envelope: Envelope<SystemDto> = serde_json::from_str(raw).unwrap();
        let system: StarSystem = envelope.data.into();
        assert_eq!(system.symbol, "X1-GZ7");
        assert_eq!(system.position, Vec2::new(-9.0, 44.0));
        assert_eq!(system.waypoints().len(), 2);

        let planet = system.waypoint("X1-GZ7-A1").unwrap();
        assert_eq!(planet.kind, WaypointKind::Planet);
        assert_eq!(planet.orbitals, vec!["X1-GZ7-A2".to_string()]);

        let station = system.waypoint("X1-GZ7-A2").unwrap();
        assert_eq!(station.kind, WaypointKind::Other);
        assert!(station.is_orbital());
        assert_eq!(system.top_level().count(), 1);
    }

    #[test]
    fn ship_dto_parses_nav_and_fuel() {
        let raw = r#"{
            "symbol": "WANDERER-1",
            "nav": {
                "systemSymbol": "X1-GZ7",
                "waypointSymbol": "X1-GZ7-A1",
                "status": "IN_TRANSIT",
                "flightMode": "CRUISE",
                "route": {
                    "destination": { "symbol": "X1-GZ7-B2", "type": "ASTEROID", "x": 30, "y": -8 },
                    "origin": { "symbol": "X1-GZ7-A1", "type": "PLANET", "x": 7, "y": -14 }
                }
            },
            "fuel": { "current": 370, "capacity": 400 }
        }"#;

        let dto: ShipDto = serde_json::from_str(raw).unwrap();
        let ship: Ship = dto.into();
        assert_eq!(ship.status, NavStatus::InTransit);
        assert_eq!(ship.route_destination, Vec2::new(30.0, -8.0));
        assert_eq!(ship.fuel.current, 370);
        assert_eq!(ship.waypoint_symbol, "X1-GZ7-A1");
    }

    #[test]
    fn nav_status_parses_all_wire_values() {
        let docked: NavStatusDto = serde_json::from_str("\"DOCKED\"").unwrap();
        assert_eq!(NavStatus::from(docked), NavStatus::Docked);
        let in_orbit: NavStatusDto = serde_json::from_str("\"IN_ORBIT\"").unwrap();
        assert_eq!(NavStatus::from(in_orbit), NavStatus::InOrbit);
        let in_transit: NavStatusDto = serde_json::from_str("\"IN_TRANSIT\"").unwrap();
        assert_eq!(NavStatus::from(in_transit), NavStatus::InTransit);
    }

    #[test]
    fn api_error_display_is_human_readable() {
        let status = ApiError::Status {
            code: 401,
            endpoint: "/my/agent".to_string(),
        };
        assert_eq!(status.to_string(), "HTTP 401 from /my/agent");

        let decode = ApiError::Decode("missing field `symbol`".to_string());
        assert!(decode.to_string().contains("malformed response"));
    }
}
