//! Pointer hit-testing against the frame's projected glyphs.

use bevy::prelude::*;

use super::render::{FrameHitIndex, ProjectedGlyph};

/// Finds the topmost glyph under the pointer. Glyphs are recorded in draw
/// order, so the scan runs back-to-front and the last-drawn circle containing
/// the point wins.
pub fn find_at(index: &FrameHitIndex, pointer: Vec2) -> Option<&ProjectedGlyph> {
    index
        .entries
        .iter()
        .rev()
        .find(|glyph| glyph.screen_pos.distance(pointer) <= glyph.radius)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::map::render::HitTarget;

    fn glyph(x: f32, y: f32, radius: f32, symbol: &str) -> ProjectedGlyph {
        ProjectedGlyph {
            screen_pos: Vec2::new(x, y),
            radius,
            target: HitTarget::Waypoint(symbol.to_string()),
        }
    }

    #[test]
    fn miss_returns_none() {
        let mut index = FrameHitIndex::default();
        index.entries.push(glyph(100.0, 100.0, 8.0, "X1-GZ7-A1"));

        assert!(find_at(&index, Vec2::new(200.0, 200.0)).is_none());
    }

    #[test]
    fn hit_inside_radius_returns_glyph() {
        let mut index = FrameHitIndex::default();
        index.entries.push(glyph(100.0, 100.0, 8.0, "X1-GZ7-A1"));

        let hit = find_at(&index, Vec2::new(103.0, 104.0)).unwrap();
        assert_eq!(hit.target.symbol(), "X1-GZ7-A1");
    }

    #[test]
    fn hit_on_radius_boundary_counts() {
        let mut index = FrameHitIndex::default();
        index.entries.push(glyph(100.0, 100.0, 8.0, "X1-GZ7-A1"));

        assert!(find_at(&index, Vec2::new(108.0, 100.0)).is_some());
        assert!(find_at(&index, Vec2::new(108.5, 100.0)).is_none());
    }

    #[test]
    fn overlapping_glyphs_resolve_to_last_drawn() {
        let mut index = FrameHitIndex::default();
        index.entries.push(glyph(100.0, 100.0, 8.0, "UNDERNEATH"));
        index.entries.push(glyph(102.0, 100.0, 8.0, "ON-TOP"));

        let hit = find_at(&index, Vec2::new(101.0, 100.0)).unwrap();
        assert_eq!(hit.target.symbol(), "ON-TOP");
    }

    #[test]
    fn empty_index_never_hits() {
        let index = FrameHitIndex::default();
        assert!(find_at(&index, Vec2::ZERO).is_none());
    }
}
