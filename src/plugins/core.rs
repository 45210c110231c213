use bevy::prelude::*;
use std::path::Path;

pub struct CorePlugin;

pub const DEFAULT_API_BASE: &str = "https://api.spacetraders.io/v2";

/// Optional on-disk config, next to the executable.
pub const CONFIG_PATH: &str = "starlane.ron";

/// Environment variable consulted for the bearer token.
pub const TOKEN_ENV_VAR: &str = "STARLANE_TOKEN";

#[derive(Resource, Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_base: String,
    pub token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token: None,
        }
    }
}

impl AppConfig {
    /// Loads the optional config file, then lets the environment override the
    /// token. Credential storage itself stays outside this app; all we hold
    /// is whatever accessor the host environment supplies.
    pub fn load() -> Self {
        let mut config = match std::fs::read_to_string(Path::new(CONFIG_PATH)) {
            Ok(raw) => match ron::from_str::<AppConfig>(&raw) {
                Ok(parsed) => parsed,
                Err(error) => {
                    warn!("Config parse failed, using defaults: {}", error);
                    AppConfig::default()
                }
            },
            Err(_) => AppConfig::default(),
        };

        config.token = resolve_token(config.token.take(), std::env::var(TOKEN_ENV_VAR).ok());
        config
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

/// The environment wins over the config file when both supply a token.
pub fn resolve_token(file_token: Option<String>, env_token: Option<String>) -> Option<String> {
    env_token.filter(|token| !token.is_empty()).or(file_token)
}

#[derive(Resource, Debug)]
pub struct EventLog {
    entries: Vec<String>,
    max_entries: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            max_entries: 8,
        }
    }
}

impl EventLog {
    pub fn push(&mut self, entry: String) {
        self.entries.push(entry);
        if self.entries.len() > self.max_entries {
            let overflow = self.entries.len() - self.max_entries;
            self.entries.drain(0..overflow);
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[derive(Resource, Debug, Clone)]
pub struct InputBindings {
    pub zoom_in: KeyCode,
    pub zoom_out: KeyCode,
    pub recenter: KeyCode,
    pub refresh: KeyCode,
    pub toggle_grid: KeyCode,
    pub toggle_labels: KeyCode,
    pub clear_selection: KeyCode,
}

impl Default for InputBindings {
    fn default() -> Self {
        Self {
            zoom_in: KeyCode::Equal,
            zoom_out: KeyCode::Minus,
            recenter: KeyCode::KeyH,
            refresh: KeyCode::KeyR,
            toggle_grid: KeyCode::KeyG,
            toggle_labels: KeyCode::KeyY,
            clear_selection: KeyCode::Escape,
        }
    }
}

#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum GameState {
    #[default]
    Boot,
    Loading,
    InGame,
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        let config = AppConfig::load();

        if config.token().is_none() {
            warn!(
                "No API token found; set {} or add one to {}",
                TOKEN_ENV_VAR, CONFIG_PATH
            );
        }

        app.init_state::<GameState>()
            .insert_resource(config)
            .init_resource::<InputBindings>()
            .init_resource::<EventLog>()
            .add_systems(
                OnEnter(GameState::Boot),
                (log_enter_boot, transition_to_loading),
            )
            .add_systems(OnEnter(GameState::InGame), log_enter_ingame);
    }
}

fn log_enter_boot(mut log: ResMut<EventLog>) {
    log.push("State: Boot".to_string());
    info!("State: Boot");
}

fn transition_to_loading(mut next_state: ResMut<NextState<GameState>>) {
    next_state.set(GameState::Loading);
}

fn log_enter_ingame(mut log: ResMut<EventLog>) {
    log.push("State: InGame".to_string());
    info!("State: InGame");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_log_push_trims_oldest_entries() {
        let mut log = EventLog::default();
        for index in 0..12 {
            log.push(format!("entry-{}", index));
        }

        let entries = log.entries();
        assert_eq!(entries.len(), 8);
        assert_eq!(entries.first().map(String::as_str), Some("entry-4"));
        assert_eq!(entries.last().map(String::as_str), Some("entry-11"));
    }

    #[test]
    fn config_default_points_at_public_api() {
        let config = AppConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.token().is_none());
    }

    #[test]
    fn config_parses_partial_ron() {
        let config: AppConfig = ron::from_str("(token: Some(\"abc\"))").unwrap();
        assert_eq!(config.token(), Some("abc"));
        assert_eq!(config.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn config_parses_full_ron() {
        let config: AppConfig =
            ron::from_str("(api_base: \"http://localhost:9000/v2\", token: Some(\"abc\"))")
                .unwrap();
        assert_eq!(config.api_base, "http://localhost:9000/v2");
    }

    #[test]
    fn resolve_token_prefers_environment() {
        let token = resolve_token(Some("from-file".to_string()), Some("from-env".to_string()));
        assert_eq!(token.as_deref(), Some("from-env"));
    }

    #[test]
    fn resolve_token_falls_back_to_file() {
        let token = resolve_token(Some("from-file".to_string()), None);
        assert_eq!(token.as_deref(), Some("from-file"));
    }

    #[test]
    fn resolve_token_ignores_empty_environment() {
        let token = resolve_token(Some("from-file".to_string()), Some(String::new()));
        assert_eq!(token.as_deref(), Some("from-file"));
    }

    #[test]
    fn default_bindings_are_distinct() {
        let bindings = InputBindings::default();
        let keys = [
            bindings.zoom_in,
            bindings.zoom_out,
            bindings.recenter,
            bindings.refresh,
            bindings.toggle_grid,
            bindings.toggle_labels,
            bindings.clear_selection,
        ];

        for (index, key) in keys.iter().enumerate() {
            assert!(!keys[index + 1..].contains(key), "{:?} bound twice", key);
        }
    }
}
