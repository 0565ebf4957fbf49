use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{TileKind, DEFAULT_BOMB_CHANCE, DEFAULT_COLORS, DEFAULT_TILE_POINTS, MAX_COLORS};
use crate::events::Notifier;
use crate::grid::{Grid, Position, Tile};
use crate::systems::group::{count_groups, find_matching_group};

/// Shuffles tried before the whole field is regenerated during initialization.
const INIT_SHUFFLES_PER_FILL: usize = 32;
/// Regenerations tried before initialization gives up on the guarantee.
const INIT_MAX_FILLS: usize = 64;

/// How fresh tiles are rolled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileGenerator {
    pub colors: u8,
    pub bomb_chance: f64,
    pub points: u32,
}

impl Default for TileGenerator {
    fn default() -> Self {
        TileGenerator {
            colors: DEFAULT_COLORS,
            bomb_chance: DEFAULT_BOMB_CHANCE,
            points: DEFAULT_TILE_POINTS,
        }
    }
}

impl TileGenerator {
    pub fn roll<R: Rng>(&self, rng: &mut R, index: usize) -> Tile {
        let kind = if self.bomb_chance > 0.0 && rng.random_bool(self.bomb_chance.min(1.0)) {
            TileKind::Bomb
        } else {
            let colors = self.colors.clamp(1, MAX_COLORS);
            TileKind::color(rng.random_range(0..colors))
        };
        Tile::new(kind, index).with_points(self.points)
    }

    pub fn roll_bonus<R: Rng>(&self, rng: &mut R, index: usize) -> Tile {
        let kind = TileKind::BONUSES[rng.random_range(0..TileKind::BONUSES.len())];
        Tile::new(kind, index).with_points(self.points)
    }
}

/// The field plus the random source that refills it.
#[derive(Debug, Clone)]
pub struct GameBoard<R> {
    pub grid: Grid,
    pub generator: TileGenerator,
    pub rng: R,
}

impl<R: Rng> GameBoard<R> {
    pub fn new(width: usize, height: usize, generator: TileGenerator, rng: R) -> Self {
        GameBoard {
            grid: Grid::new(width, height),
            generator,
            rng,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.height()
    }

    fn position(&self, index: usize) -> Position {
        // Indices handed around here always come from the grid itself.
        self.grid
            .index_to_position(index)
            .unwrap_or(Position::new(0, 0))
    }

    /// Roll a fresh tile into `index` and announce it.
    pub fn generate_at<N: Notifier>(&mut self, index: usize, from_outside: bool, events: &mut N) {
        let tile = self.generator.roll(&mut self.rng, index);
        self.grid.place(index, tile);
        events.on_generate_tile(self.position(index), from_outside);
    }

    /// Replace whatever sits at `index` with a random bonus tile.
    pub fn spawn_bonus<N: Notifier>(&mut self, index: usize, events: &mut N) -> Option<TileKind> {
        if index >= self.grid.len() {
            return None;
        }
        let tile = self.generator.roll_bonus(&mut self.rng, index);
        let kind = tile.kind;
        self.grid.place(index, tile);
        events.on_generate_tile(self.position(index), false);
        Some(kind)
    }

    /// Fill every empty slot, top-left to bottom-right.
    pub fn fill<N: Notifier>(&mut self, events: &mut N) {
        for index in 0..self.grid.len() {
            if !self.grid.is_occupied(index) {
                self.generate_at(index, true, events);
            }
        }
    }

    /// Remove every tile, announcing each removal.
    pub fn clear<N: Notifier>(&mut self, events: &mut N) {
        for index in 0..self.grid.len() {
            if self.grid.take(index).is_some() {
                events.on_destroy_tile(self.position(index));
            }
        }
    }

    pub fn count_groups(&self, min_size: usize) -> usize {
        count_groups(&self.grid, min_size)
    }

    pub fn group_at(&self, x: i32, y: i32) -> Vec<Position> {
        find_matching_group(&self.grid, Position::new(x, y))
    }

    /// An unfired bomb still on the field.
    pub fn has_bomb(&self) -> bool {
        self.grid
            .tiles()
            .any(|t| t.kind == TileKind::Bomb && !t.activated)
    }

    /// Fill the board and shuffle until it holds at least `min_groups`
    /// matchable groups. Returns the group count of the final field.
    pub fn populate<N: Notifier>(&mut self, min_groups: usize, min_size: usize, events: &mut N) -> usize {
        self.fill(events);

        for fill in 0..INIT_MAX_FILLS {
            if fill > 0 {
                self.clear(events);
                self.fill(events);
            }
            for _ in 0..INIT_SHUFFLES_PER_FILL {
                let groups = self.count_groups(min_size);
                if groups >= min_groups {
                    return groups;
                }
                self.shuffle(events);
            }
        }

        let groups = self.count_groups(min_size);
        if groups < min_groups {
            log::warn!(
                "blast-sim: could not reach {} starting groups, field has {}",
                min_groups,
                groups
            );
        }
        groups
    }

    /// Drop the surviving tiles of column `x` onto the lowest empty slot and
    /// refill the vacated top slots with fresh tiles entering from above.
    ///
    /// Tiles keep their relative order. Moves are announced before generates.
    pub fn resolve_column<N: Notifier>(&mut self, x: usize, events: &mut N) {
        let (width, height) = (self.width(), self.height());
        if x >= width {
            return;
        }
        let idx = |y: usize| x + y * width;

        let Some(lowest_empty) = (0..height).rev().find(|&y| !self.grid.is_occupied(idx(y))) else {
            return;
        };

        // Lift survivors nearest-first so the stack lands in the same order.
        let mut survivors: Vec<(usize, Tile)> = Vec::with_capacity(lowest_empty);
        for y in (0..lowest_empty).rev() {
            if let Some(tile) = self.grid.take(idx(y)) {
                survivors.push((y, tile));
            }
        }

        let mut target = lowest_empty;
        let mut free_slots = lowest_empty + 1;
        for (old_y, tile) in survivors {
            self.grid.place(idx(target), tile);
            events.on_move_tile(
                Position::new(x as i32, old_y as i32),
                Position::new(x as i32, target as i32),
            );
            free_slots -= 1;
            target = target.saturating_sub(1);
        }

        for y in (0..free_slots).rev() {
            self.generate_at(idx(y), true, events);
        }
    }

    pub fn resolve_all_columns<N: Notifier>(&mut self, events: &mut N) {
        for x in 0..self.width() {
            self.resolve_column(x, events);
        }
    }

    /// Fisher-Yates over the whole field, then a single remap notification
    /// covering every tile.
    pub fn shuffle<N: Notifier>(&mut self, events: &mut N) {
        self.grid.slots_mut().shuffle(&mut self.rng);

        let mut from = Vec::with_capacity(self.grid.len());
        let mut to = Vec::with_capacity(self.grid.len());
        for index in 0..self.grid.len() {
            let new_pos = self.position(index);
            let old_index = match self.grid.get_mut(index) {
                Some(tile) => std::mem::replace(&mut tile.index, index),
                None => continue,
            };
            from.push(self.position(old_index));
            to.push(new_pos);
        }

        log::debug!("blast-sim: shuffled {} tiles", from.len());
        events.on_shuffle(&from, &to);
    }

    /// Exchange two slots. Returns false if either index is invalid.
    pub fn swap<N: Notifier>(&mut self, a: usize, b: usize, events: &mut N) -> bool {
        if a >= self.grid.len() || b >= self.grid.len() || a == b {
            return false;
        }
        self.grid.swap(a, b);
        events.on_move_tile(self.position(a), self.position(b));
        true
    }
}
