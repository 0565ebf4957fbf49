use rand::Rng;

use crate::components::TileKind;
use crate::events::Notifier;
use crate::grid::{Grid, Position};
use crate::systems::board::GameBoard;
use crate::systems::group::find_group;

/// What a run of destruction removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cleared {
    pub tiles: usize,
    pub points: u32,
    /// Bonus tiles that fired along the way, including the first one.
    pub activations: usize,
}

impl Cleared {
    pub fn absorb(&mut self, other: Cleared) {
        self.tiles = self.tiles.saturating_add(other.tiles);
        self.points = self.points.saturating_add(other.points);
        self.activations = self.activations.saturating_add(other.activations);
    }
}

/// Cells hit by a bonus of `kind` sitting at `center`.
pub fn bonus_targets(grid: &Grid, kind: TileKind, center: Position, radius: u32) -> Vec<Position> {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    match kind {
        TileKind::Bomb => {
            let reach = i64::from(radius).pow(2);
            find_group(grid, center, |_, neighbor| {
                grid.index_to_position(neighbor.index)
                    .is_some_and(|p| i64::from(p.distance_squared(center)) <= reach)
            })
        }
        TileKind::SuperHorizontal => (0..width).map(|x| Position::new(x, center.y)).collect(),
        TileKind::SuperVertical => (0..height).map(|y| Position::new(center.x, y)).collect(),
        TileKind::SuperAll => (0..height)
            .flat_map(|y| (0..width).map(move |x| Position::new(x, y)))
            .collect(),
        _ => Vec::new(),
    }
}

impl<R: Rng> GameBoard<R> {
    /// Fire the bonus tile at `index`. Ordinary or already fired tiles are ignored.
    ///
    /// The tile is marked before its targets are destroyed, so it is removed
    /// without firing again when the blast reaches it.
    pub fn activate<N: Notifier>(&mut self, index: usize, radius: u32, events: &mut N) -> Cleared {
        let mut cleared = Cleared::default();
        let Some(tile) = self.grid.get_mut(index) else {
            return cleared;
        };
        if !tile.is_bonus() || tile.activated {
            return cleared;
        }
        tile.activated = true;
        let kind = tile.kind;
        let Some(center) = self.grid.index_to_position(index) else {
            return cleared;
        };

        log::debug!("blast-sim: {:?} fired at {}", kind, center);
        cleared.activations += 1;

        for target in bonus_targets(&self.grid, kind, center, radius) {
            if let Some(i) = self.grid.position_to_index(target.x, target.y) {
                cleared.absorb(self.destroy(i, radius, events));
            }
        }
        cleared
    }

    /// Remove the tile at `index` and announce it. An unfired bonus tile
    /// fires first and is removed by its own effect.
    pub fn destroy<N: Notifier>(&mut self, index: usize, radius: u32, events: &mut N) -> Cleared {
        let Some(tile) = self.grid.get(index) else {
            return Cleared::default();
        };
        if tile.is_bonus() && !tile.activated {
            let mut cleared = self.activate(index, radius, events);
            if self.grid.is_occupied(index) {
                cleared.absorb(self.remove(index, events));
            }
            return cleared;
        }
        self.remove(index, events)
    }

    fn remove<N: Notifier>(&mut self, index: usize, events: &mut N) -> Cleared {
        let Some(tile) = self.grid.take(index) else {
            return Cleared::default();
        };
        if let Some(pos) = self.grid.index_to_position(index) {
            events.on_destroy_tile(pos);
        }
        Cleared {
            tiles: 1,
            points: tile.points,
            activations: 0,
        }
    }

    /// Destroy a list of cells in order.
    pub fn destroy_all<N: Notifier>(&mut self, cells: &[Position], radius: u32, events: &mut N) -> Cleared {
        let mut cleared = Cleared::default();
        for cell in cells {
            if let Some(i) = self.grid.position_to_index(cell.x, cell.y) {
                cleared.absorb(self.destroy(i, radius, events));
            }
        }
        cleared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TileKind::*;
    use crate::events::{EventLog, GameEvent};
    use crate::grid::Tile;
    use crate::systems::board::TileGenerator;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board(width: usize, height: usize, kind: TileKind) -> GameBoard<StdRng> {
        let generator = TileGenerator {
            bomb_chance: 0.0,
            ..TileGenerator::default()
        };
        let mut b = GameBoard::new(width, height, generator, StdRng::seed_from_u64(5));
        b.grid = Grid::from_kinds(width, height, &vec![kind; width * height]).unwrap();
        b
    }

    fn put(b: &mut GameBoard<StdRng>, x: usize, y: usize, kind: TileKind) -> usize {
        let i = x + y * b.width();
        b.grid.place(i, Tile::new(kind, i));
        i
    }

    #[test]
    fn bomb_clears_euclidean_disc() {
        let mut b = board(7, 7, Red);
        let i = put(&mut b, 3, 3, Bomb);
        let mut log = EventLog::new();

        let cleared = b.activate(i, 2, &mut log);

        // Radius 2 disc: 1 + 4 + 4 + 4 = 13 cells.
        assert_eq!(cleared.tiles, 13);
        assert_eq!(cleared.points, 130);
        assert_eq!(cleared.activations, 1);
        for y in 0..7 {
            for x in 0..7 {
                let inside = Position::new(x, y).distance_squared(Position::new(3, 3)) <= 4;
                assert_eq!(b.grid.tile_at(x, y).is_none(), inside, "cell ({}, {})", x, y);
            }
        }
        assert!(log.events.iter().all(|e| matches!(e, GameEvent::Destroy(_))));
    }

    #[test]
    fn huge_radius_clears_whole_board() {
        for radius in [50_000, 70_000, u32::MAX] {
            let mut b = board(3, 3, Red);
            let i = put(&mut b, 1, 1, Bomb);
            let cleared = b.activate(i, radius, &mut EventLog::new());
            assert_eq!(cleared.tiles, 9, "radius {}", radius);
            assert_eq!(cleared.points, 90);
        }
    }

    #[test]
    fn tally_saturates_instead_of_overflowing() {
        let mut b = board(3, 1, Red);
        for i in 0..3 {
            let tile = Tile::new(Red, i).with_points(u32::MAX);
            b.grid.place(i, tile);
        }
        let cells = [Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)];
        let cleared = b.destroy_all(&cells, 2, &mut EventLog::new());
        assert_eq!(cleared.tiles, 3);
        assert_eq!(cleared.points, u32::MAX);
    }

    #[test]
    fn bomb_near_corner_is_clipped() {
        let mut b = board(4, 4, Green);
        let i = put(&mut b, 0, 0, Bomb);
        let cleared = b.activate(i, 1, &mut EventLog::new());
        assert_eq!(cleared.tiles, 3);
    }

    #[test]
    fn row_and_column_clears() {
        let mut b = board(5, 4, Blue);
        let i = put(&mut b, 2, 1, SuperHorizontal);
        let cleared = b.activate(i, 2, &mut EventLog::new());
        assert_eq!(cleared.tiles, 5);
        for x in 0..5 {
            assert!(b.grid.tile_at(x, 1).is_none());
            assert!(b.grid.tile_at(x, 0).is_some());
        }

        let mut b = board(5, 4, Blue);
        let i = put(&mut b, 4, 3, SuperVertical);
        let cleared = b.activate(i, 2, &mut EventLog::new());
        assert_eq!(cleared.tiles, 4);
        for y in 0..4 {
            assert!(b.grid.tile_at(4, y).is_none());
            assert!(b.grid.tile_at(3, y).is_some());
        }
    }

    #[test]
    fn super_all_empties_the_board() {
        let mut b = board(3, 3, Yellow);
        let i = put(&mut b, 1, 1, SuperAll);
        let cleared = b.activate(i, 2, &mut EventLog::new());
        assert_eq!(cleared.tiles, 9);
        assert_eq!(b.grid.tiles().count(), 0);
    }

    #[test]
    fn chained_bonus_fires_exactly_once() {
        // Row clear at (0, 2) catches a column clear at (3, 2),
        // whose column contains a bomb at (3, 0).
        let mut b = board(5, 5, Purple);
        let row = put(&mut b, 0, 2, SuperHorizontal);
        put(&mut b, 3, 2, SuperVertical);
        put(&mut b, 3, 0, Bomb);
        let mut log = EventLog::new();

        let cleared = b.activate(row, 1, &mut log);

        assert_eq!(cleared.activations, 3);
        // Row (5) + rest of column 3 (4) + bomb neighbours (2, 0) and (4, 0).
        assert_eq!(cleared.tiles, 11);
        let destroyed: Vec<Position> = log
            .events
            .iter()
            .filter_map(|e| match e {
                GameEvent::Destroy(p) => Some(*p),
                _ => None,
            })
            .collect();
        let mut unique = destroyed.clone();
        unique.sort_by_key(|p| (p.y, p.x));
        unique.dedup();
        assert_eq!(unique.len(), destroyed.len(), "a cell was destroyed twice");
    }

    #[test]
    fn activating_twice_or_ordinary_tile_does_nothing() {
        let mut b = board(3, 3, Red);
        let mut log = EventLog::new();
        assert_eq!(b.activate(4, 2, &mut log), Cleared::default());
        assert!(log.is_empty());

        let i = put(&mut b, 1, 1, Bomb);
        b.grid.get_mut(i).unwrap().activated = true;
        assert_eq!(b.activate(i, 2, &mut log), Cleared::default());
        assert!(log.is_empty());
    }

    #[test]
    fn destroy_all_skips_empty_cells() {
        let mut b = board(3, 1, Red);
        b.grid.take(1);
        let mut log = EventLog::new();
        let cells = [Position::new(0, 0), Position::new(1, 0), Position::new(2, 0)];
        let cleared = b.destroy_all(&cells, 2, &mut log);
        assert_eq!(cleared.tiles, 2);
        assert_eq!(log.len(), 2);
    }
}
