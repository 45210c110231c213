//! Shared components and helpers for the UI panels.

use bevy::prelude::*;

#[derive(Component)]
pub struct AgentPanelText;

#[derive(Component)]
pub struct CameraPanelText;

#[derive(Component)]
pub struct SelectionPanelText;

#[derive(Component)]
pub struct LogContentText;

/// One clickable destination row.
#[derive(Component)]
pub struct CandidateItem {
    pub symbol: String,
}

pub fn candidate_item_color(is_hovered: bool) -> Color {
    if is_hovered {
        Color::srgb(0.95, 0.85, 0.4)
    } else {
        Color::srgb(0.75, 0.85, 0.9)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hovered_candidate_color_differs() {
        assert_ne!(candidate_item_color(true), candidate_item_color(false));
    }
}
