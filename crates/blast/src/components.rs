use serde::{Deserialize, Serialize};

/// Number of ordinary tile colors the engine knows about.
/// Every discriminant at or above this value is a bonus kind.
pub const MAX_COLORS: u8 = 5;

/// Defaults matching the legacy scene settings.
pub const DEFAULT_COLORS: u8 = 5;
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;
pub const DEFAULT_MIN_SUPER_GROUP_SIZE: usize = 5;
pub const DEFAULT_SHUFFLES: u32 = 1;
pub const DEFAULT_SWAPS: u32 = 0;
pub const DEFAULT_BOOSTER_RADIUS: u32 = 2;
pub const DEFAULT_BOMB_CHANCE: f64 = 0.01;
pub const DEFAULT_TILE_POINTS: u32 = 10;

/// Tile kind. Ordinary colors come first, bonus kinds follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileKind {
    Blue = 0,
    Green = 1,
    Purple = 2,
    Red = 3,
    Yellow = 4,
    Bomb = 5,            // area clear around the tile
    SuperHorizontal = 6, // clears the row
    SuperVertical = 7,   // clears the column
    SuperAll = 8,        // clears the board
}

impl TileKind {
    pub const COLORS: [TileKind; MAX_COLORS as usize] = [
        TileKind::Blue,
        TileKind::Green,
        TileKind::Purple,
        TileKind::Red,
        TileKind::Yellow,
    ];

    pub const BONUSES: [TileKind; 4] = [
        TileKind::Bomb,
        TileKind::SuperHorizontal,
        TileKind::SuperVertical,
        TileKind::SuperAll,
    ];

    /// Ordinary color for a palette slot. Out-of-range slots wrap.
    pub fn color(slot: u8) -> TileKind {
        Self::COLORS[(slot % MAX_COLORS) as usize]
    }

    #[inline]
    pub fn is_bonus(self) -> bool {
        self as u8 >= MAX_COLORS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bonus_kinds_sit_above_color_ceiling() {
        for kind in TileKind::COLORS {
            assert!(!kind.is_bonus(), "{:?} should be ordinary", kind);
        }
        for kind in TileKind::BONUSES {
            assert!(kind.is_bonus(), "{:?} should be a bonus", kind);
        }
    }

    #[test]
    fn color_slot_wraps() {
        assert_eq!(TileKind::color(0), TileKind::Blue);
        assert_eq!(TileKind::color(4), TileKind::Yellow);
        assert_eq!(TileKind::color(5), TileKind::Blue);
    }
}
