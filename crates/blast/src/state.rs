use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::components::MAX_COLORS;
use crate::config::{BlastConfig, ConfigError};
use crate::events::Notifier;
use crate::grid::{Grid, Position, Tile};
use crate::systems::board::{GameBoard, TileGenerator};
use crate::systems::bonus::Cleared;

/// Starting-group guarantee used by `restart` until `init_field` is called.
pub const DEFAULT_MIN_START_GROUPS: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum GamePhase {
    Active = 0,
    Won = 1,
    Lost = 2,
}

impl GamePhase {
    pub fn is_terminal(self) -> bool {
        self != GamePhase::Active
    }
}

/// The turn and score controller. Owns the field, the random source and the
/// notifier; every public command runs its whole cascade before returning.
pub struct BlastGame<N, R = StdRng> {
    config: BlastConfig,
    pub(crate) board: GameBoard<R>,
    notifier: N,
    phase: GamePhase,
    turns: u32,
    score: u32,
    swaps: u32,
    min_start_groups: usize,
}

impl<N: Notifier> BlastGame<N, StdRng> {
    /// Engine seeded from the operating system.
    pub fn new(config: BlastConfig, notifier: N) -> Result<Self, ConfigError> {
        Self::with_rng(config, notifier, StdRng::from_os_rng())
    }

    /// Reproducible engine.
    pub fn with_seed(config: BlastConfig, notifier: N, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, notifier, StdRng::seed_from_u64(seed))
    }
}

impl<N: Notifier, R: Rng> BlastGame<N, R> {
    pub fn with_rng(mut config: BlastConfig, notifier: N, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.colors > MAX_COLORS {
            log::warn!(
                "blast-sim: {} colors requested, capping at {}",
                config.colors,
                MAX_COLORS
            );
            config.colors = MAX_COLORS;
        }

        let generator = TileGenerator {
            colors: config.colors,
            bomb_chance: config.bomb_chance,
            points: config.tile_points,
        };
        let board = GameBoard::new(
            config.width as usize,
            config.height as usize,
            generator,
            rng,
        );

        Ok(BlastGame {
            turns: config.turns_number,
            swaps: config.swaps,
            score: 0,
            phase: GamePhase::Active,
            min_start_groups: DEFAULT_MIN_START_GROUPS,
            board,
            notifier,
            config,
        })
    }

    /// Fill the field so it holds at least `min_groups` matchable groups.
    ///
    /// Any tiles already on the field are destroyed first. The guarantee is
    /// capped at what the board can physically hold. Returns the number of
    /// groups on the final field.
    pub fn init_field(&mut self, min_groups: usize) -> usize {
        let min_size = self.config.min_tiles_group_size;
        let capacity = (self.board.grid.len() / min_size).max(1);
        self.min_start_groups = min_groups.min(capacity);

        self.board.clear(&mut self.notifier);
        let groups = self
            .board
            .populate(self.min_start_groups, min_size, &mut self.notifier);

        self.notifier.on_score_changed(self.score);
        self.notifier.on_turns_changed(self.turns);
        self.notifier.on_swaps_changed(self.swaps);

        log::info!(
            "blast-sim: {}x{} field ready with {} groups",
            self.board.width(),
            self.board.height(),
            groups
        );
        groups
    }

    /// Reset turns, score, swap charges and the terminal latch, then deal a new field.
    pub fn restart(&mut self) -> usize {
        self.phase = GamePhase::Active;
        self.turns = self.config.turns_number;
        self.score = 0;
        self.swaps = self.config.swaps;
        self.init_field(self.min_start_groups)
    }

    /// Tap a cell. Returns true if the tap changed the field.
    ///
    /// An unfired bonus tile fires. Otherwise the same-kind group under the
    /// cell is cleared if it is large enough, and a group reaching the super
    /// size leaves a random bonus tile on the tapped cell.
    pub fn tap_at(&mut self, x: i32, y: i32) -> bool {
        if self.is_locked() || self.turns == 0 {
            log::trace!("blast-sim: tap at ({}, {}) ignored, no turns", x, y);
            return false;
        }
        let Some(index) = self.board.grid.position_to_index(x, y) else {
            return false;
        };
        let Some(tile) = self.board.grid.get(index).copied() else {
            return false;
        };

        let radius = self.config.booster_radius;
        let cleared = if tile.is_bonus() && !tile.activated {
            let cleared = self.board.activate(index, radius, &mut self.notifier);
            self.board.resolve_all_columns(&mut self.notifier);
            cleared
        } else {
            let group = self.board.group_at(x, y);
            if group.len() < self.config.min_tiles_group_size {
                log::trace!("blast-sim: group of {} at ({}, {}) too small", group.len(), x, y);
                return false;
            }

            let mut columns: Vec<usize> = group.iter().map(|p| p.x as usize).collect();
            columns.sort_unstable();
            columns.dedup();

            let cleared = if group.len() >= self.config.min_super_tile_group_size {
                self.clear_with_bonus(&group, index)
            } else {
                self.board.destroy_all(&group, radius, &mut self.notifier)
            };

            for column in columns {
                self.board.resolve_column(column, &mut self.notifier);
            }
            cleared
        };

        log::debug!(
            "blast-sim: tap at ({}, {}) cleared {} tiles for {} points",
            x,
            y,
            cleared.tiles,
            cleared.points
        );

        self.add_score(cleared.points);
        self.set_turns(self.turns - 1);
        self.resolve_deadlock();
        true
    }

    /// Clear `group` except the tapped cell, then replace the tapped tile with
    /// a bonus. The tapped tile still scores but is not announced as destroyed.
    fn clear_with_bonus(&mut self, group: &[Position], tapped: usize) -> Cleared {
        let radius = self.config.booster_radius;
        let tapped_pos = self.board.grid.index_to_position(tapped);
        let rest: Vec<Position> = group
            .iter()
            .copied()
            .filter(|p| Some(*p) != tapped_pos)
            .collect();

        let mut cleared = self.board.destroy_all(&rest, radius, &mut self.notifier);
        if let Some(tile) = self.board.grid.get(tapped) {
            cleared.absorb(Cleared {
                tiles: 1,
                points: tile.points,
                activations: 0,
            });
        }
        if let Some(kind) = self.board.spawn_bonus(tapped, &mut self.notifier) {
            log::debug!("blast-sim: spawned {:?} at {:?}", kind, tapped_pos);
        }
        cleared
    }

    /// Exchange two tiles using one swap charge. The cells need not be adjacent.
    pub fn swap(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        if self.is_locked() || self.swaps == 0 {
            log::trace!("blast-sim: swap ignored, no swaps left");
            return false;
        }
        let grid = &self.board.grid;
        let (Some(a), Some(b)) = (grid.position_to_index(x1, y1), grid.position_to_index(x2, y2))
        else {
            return false;
        };
        if !self.board.swap(a, b, &mut self.notifier) {
            return false;
        }

        self.swaps -= 1;
        self.notifier.on_swaps_changed(self.swaps);
        log::debug!(
            "blast-sim: swapped ({}, {}) and ({}, {}), {} swaps left",
            x1,
            y1,
            x2,
            y2,
            self.swaps
        );
        self.resolve_deadlock();
        true
    }

    /// Shuffle a field with no matchable groups. Loses when shuffling fails
    /// and the player has neither a bomb nor a swap charge left.
    fn resolve_deadlock(&mut self) {
        if self.is_locked() || self.turns == 0 {
            return;
        }
        let min_size = self.config.min_tiles_group_size;
        if self.board.count_groups(min_size) > 0 {
            return;
        }

        for attempt in 1..=self.config.shuffles {
            self.board.shuffle(&mut self.notifier);
            if self.board.count_groups(min_size) > 0 {
                log::debug!("blast-sim: deadlock broken after {} shuffles", attempt);
                return;
            }
        }

        if !self.board.has_bomb() && self.swaps == 0 {
            log::debug!("blast-sim: deadlock with no moves left");
            self.lose();
        }
    }

    fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
        self.notifier.on_score_changed(self.score);
        if self.score >= self.config.win_score {
            self.win();
        }
    }

    fn set_turns(&mut self, turns: u32) {
        self.turns = turns;
        self.notifier.on_turns_changed(turns);
        if turns == 0 {
            self.lose();
        }
    }

    fn win(&mut self) {
        if self.is_locked() {
            return;
        }
        self.phase = GamePhase::Won;
        log::info!("blast-sim: won with {} points", self.score);
        self.notifier.on_win();
    }

    fn lose(&mut self) {
        if self.is_locked() {
            return;
        }
        self.phase = GamePhase::Lost;
        log::info!("blast-sim: lost with {} points", self.score);
        self.notifier.on_lose();
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.board.grid.tile_at(x, y)
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.board.grid.in_bounds(x, y)
    }

    pub fn position_to_index(&self, x: i32, y: i32) -> Option<usize> {
        self.board.grid.position_to_index(x, y)
    }

    pub fn index_to_position(&self, index: usize) -> Option<Position> {
        self.board.grid.index_to_position(index)
    }

    /// Deep copy of the field.
    pub fn snapshot(&self) -> Grid {
        self.board.grid.clone()
    }

    pub fn count_groups(&self) -> usize {
        self.board.count_groups(self.config.min_tiles_group_size)
    }

    pub fn width(&self) -> usize {
        self.board.width()
    }

    pub fn height(&self) -> usize {
        self.board.height()
    }

    pub fn config(&self) -> &BlastConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_locked(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn win_score(&self) -> u32 {
        self.config.win_score
    }

    pub fn swaps(&self) -> u32 {
        self.swaps
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn into_notifier(self) -> N {
        self.notifier
    }
}
