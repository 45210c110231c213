//! Log panel update system.

use bevy::prelude::*;

use crate::plugins::core::EventLog;

use super::components::LogContentText;

pub fn update_log_panel(log: Res<EventLog>, mut log_text: Query<&mut Text, With<LogContentText>>) {
    if let Some(mut text) = log_text.iter_mut().next() {
        text.0 = format_log_panel(log.entries());
    }
}

pub fn format_log_panel(entries: &[String]) -> String {
    if entries.is_empty() {
        return "Awaiting signal...".to_string();
    }

    let mut body = String::new();
    for entry in entries {
        body.push_str("> ");
        body.push_str(entry);
        body.push('\n');
    }
    body.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_log_shows_placeholder() {
        assert_eq!(format_log_panel(&[]), "Awaiting signal...");
    }

    #[test]
    fn entries_render_one_per_line() {
        let entries = vec!["first".to_string(), "second".to_string()];
        assert_eq!(format_log_panel(&entries), "> first\n> second");
    }
}
