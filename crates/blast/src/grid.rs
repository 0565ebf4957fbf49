use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::components::{TileKind, DEFAULT_TILE_POINTS};

/// A cell coordinate. Row 0 is the top row, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// Squared Euclidean distance to another cell.
    pub fn distance_squared(self, other: Position) -> i32 {
        (IVec2::from(self) - IVec2::from(other)).length_squared()
    }
}

impl From<Position> for IVec2 {
    fn from(p: Position) -> Self {
        IVec2::new(p.x, p.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A single tile on the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    /// Linear slot this tile currently occupies. Kept in sync by the grid.
    pub index: usize,
    pub points: u32,
    /// Set once a bonus effect has fired.
    pub activated: bool,
}

impl Tile {
    pub fn new(kind: TileKind, index: usize) -> Self {
        Tile {
            kind,
            index,
            points: DEFAULT_TILE_POINTS,
            activated: false,
        }
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    #[inline]
    pub fn is_bonus(&self) -> bool {
        self.kind.is_bonus()
    }
}

/// The playing field. Row-major flat storage: `index = x + y * width`.
/// `None` means an empty cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Option<Tile>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            tiles: vec![None; width * height],
        }
    }

    /// Build a fully occupied grid from row-major kinds.
    /// Returns `None` if the slice length does not match the dimensions.
    pub fn from_kinds(width: usize, height: usize, kinds: &[TileKind]) -> Option<Self> {
        if kinds.len() != width * height {
            return None;
        }
        let tiles = kinds
            .iter()
            .enumerate()
            .map(|(i, &kind)| Some(Tile::new(kind, i)))
            .collect();
        Some(Grid {
            width,
            height,
            tiles,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn position_to_index(&self, x: i32, y: i32) -> Option<usize> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(x as usize + y as usize * self.width)
    }

    pub fn index_to_position(&self, index: usize) -> Option<Position> {
        if index >= self.tiles.len() {
            return None;
        }
        Some(Position::new(
            (index % self.width) as i32,
            (index / self.width) as i32,
        ))
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.position_to_index(x, y).and_then(|i| self.get(i))
    }

    pub fn get(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index).and_then(|slot| slot.as_ref())
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(index).and_then(|slot| slot.as_mut())
    }

    /// Remove and return the tile at `index`, leaving the slot empty.
    pub fn take(&mut self, index: usize) -> Option<Tile> {
        self.tiles.get_mut(index).and_then(|slot| slot.take())
    }

    /// Put a tile into `index`, rewriting its cached index.
    /// Returns the previous occupant.
    pub fn place(&mut self, index: usize, mut tile: Tile) -> Option<Tile> {
        let slot = self.tiles.get_mut(index)?;
        tile.index = index;
        slot.replace(tile)
    }

    /// Exchange two slots and resynchronize both cached indices.
    pub fn swap(&mut self, a: usize, b: usize) {
        if a >= self.tiles.len() || b >= self.tiles.len() {
            return;
        }
        self.tiles.swap(a, b);
        self.sync_index(a);
        self.sync_index(b);
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.get(index).is_some()
    }

    /// Iterate over occupied slots.
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().flatten()
    }

    pub fn slots(&self) -> &[Option<Tile>] {
        &self.tiles
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [Option<Tile>] {
        &mut self.tiles
    }

    #[inline]
    fn sync_index(&mut self, index: usize) {
        if let Some(tile) = self.tiles[index].as_mut() {
            tile.index = index;
        }
    }
}
