use std::collections::{HashSet, VecDeque};

use crate::grid::{Grid, Position, Tile};

const NEIGHBORS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Default match rule: neighbor has the same kind.
pub fn same_kind(current: &Tile, neighbor: &Tile) -> bool {
    current.kind == neighbor.kind
}

/// Iterative BFS over 4-connected neighbors starting at `start`.
///
/// A neighbor joins the group when it is in bounds, occupied, not yet visited
/// and `predicate(current, neighbor)` holds. Positions come back in discovery
/// order, the start first. An empty or out-of-bounds start yields nothing.
pub fn find_group<F>(grid: &Grid, start: Position, predicate: F) -> Vec<Position>
where
    F: Fn(&Tile, &Tile) -> bool,
{
    if grid.tile_at(start.x, start.y).is_none() {
        return Vec::new();
    }

    let mut group = Vec::new();
    let mut visited: HashSet<Position> = HashSet::new();
    let mut queue: VecDeque<Position> = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        group.push(pos);
        let Some(current) = grid.tile_at(pos.x, pos.y) else {
            continue;
        };

        for (dx, dy) in NEIGHBORS {
            let next = Position::new(pos.x + dx, pos.y + dy);
            if visited.contains(&next) {
                continue;
            }
            let Some(neighbor) = grid.tile_at(next.x, next.y) else {
                continue;
            };
            if predicate(current, neighbor) {
                visited.insert(next);
                queue.push_back(next);
            }
        }
    }

    group
}

/// Same-kind group containing `start`.
pub fn find_matching_group(grid: &Grid, start: Position) -> Vec<Position> {
    find_group(grid, start, same_kind)
}

/// Number of maximal same-kind groups of ordinary tiles holding at least `min_size` tiles.
pub fn count_groups(grid: &Grid, min_size: usize) -> usize {
    let mut seen: HashSet<Position> = HashSet::new();
    let mut count = 0;

    for tile in grid.tiles() {
        if tile.is_bonus() {
            continue;
        }
        let Some(pos) = grid.index_to_position(tile.index) else {
            continue;
        };
        if seen.contains(&pos) {
            continue;
        }
        let group = find_matching_group(grid, pos);
        if group.len() >= min_size {
            count += 1;
        }
        seen.extend(group);
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::TileKind::{self, *};

    fn grid(width: usize, height: usize, kinds: &[TileKind]) -> Grid {
        Grid::from_kinds(width, height, kinds).unwrap()
    }

    #[test]
    fn finds_four_connected_region_in_bfs_order() {
        // B B G
        // R B G
        // R R B
        let g = grid(3, 3, &[Blue, Blue, Green, Red, Blue, Green, Red, Red, Blue]);
        let group = find_matching_group(&g, Position::new(0, 0));
        assert_eq!(
            group,
            vec![Position::new(0, 0), Position::new(1, 0), Position::new(1, 1)]
        );
    }

    #[test]
    fn diagonals_do_not_connect() {
        // B G
        // G B
        let g = grid(2, 2, &[Blue, Green, Green, Blue]);
        assert_eq!(find_matching_group(&g, Position::new(0, 0)).len(), 1);
    }

    #[test]
    fn edge_cells_are_searched() {
        // Column 0 and row 0 must be reachable.
        let g = grid(3, 2, &[Red, Red, Red, Red, Blue, Blue]);
        let group = find_matching_group(&g, Position::new(2, 0));
        assert_eq!(group.len(), 4);
        assert!(group.contains(&Position::new(0, 1)));
    }

    #[test]
    fn empty_or_out_of_bounds_start_is_empty() {
        let mut g = grid(2, 2, &[Red; 4]);
        assert!(find_matching_group(&g, Position::new(-1, 0)).is_empty());
        assert!(find_matching_group(&g, Position::new(2, 0)).is_empty());
        g.take(0);
        assert!(find_matching_group(&g, Position::new(0, 0)).is_empty());
    }

    #[test]
    fn empty_cells_break_connectivity() {
        let mut g = grid(3, 1, &[Red, Red, Red]);
        g.take(1);
        assert_eq!(find_matching_group(&g, Position::new(0, 0)).len(), 1);
    }

    #[test]
    fn custom_predicate_ignores_color() {
        let g = grid(3, 3, &[Blue, Green, Red, Yellow, Purple, Blue, Green, Red, Yellow]);
        let center = Position::new(1, 1);
        let group = find_group(&g, center, |_, n| {
            g.index_to_position(n.index)
                .map(|p| p.distance_squared(center) <= 1)
                .unwrap_or(false)
        });
        assert_eq!(group.len(), 5);
        assert_eq!(group[0], center);
    }

    #[test]
    fn count_groups_respects_min_size_and_skips_bonuses() {
        // R R G
        // B Y G
        // X X P     X = bomb
        let g = grid(3, 3, &[Red, Red, Green, Blue, Yellow, Green, Bomb, Bomb, Purple]);
        assert_eq!(count_groups(&g, 2), 2);
        assert_eq!(count_groups(&g, 3), 0);
        assert_eq!(count_groups(&g, 1), 5);
    }

    #[test]
    fn checkerboard_has_no_groups() {
        let g = grid(3, 3, &[Red, Blue, Red, Blue, Red, Blue, Red, Blue, Red]);
        assert_eq!(count_groups(&g, 2), 0);
    }
}
