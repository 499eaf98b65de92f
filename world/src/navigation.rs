//! Distance field used to route mobile units towards the opposing edge.

use std::collections::VecDeque;

use lanebreaker_core::CellCoord;

const UNREACHABLE: u16 = u16::MAX;

/// Step counts from every cell to the nearest exit, computed by a
/// breadth-first flood that starts at the exits and walks outwards.
///
/// Blocked and cut-off cells keep [`UNREACHABLE`].
#[derive(Clone, Debug)]
pub(crate) struct NavigationField {
    width: u32,
    height: u32,
    steps: Vec<u16>,
}

impl NavigationField {
    /// Floods the board from `exits`, never entering cells `is_blocked` rejects.
    pub(crate) fn towards<F>(width: u32, height: u32, exits: &[CellCoord], is_blocked: F) -> Self
    where
        F: Fn(CellCoord) -> bool,
    {
        let cells = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut field = Self {
            width,
            height,
            steps: vec![UNREACHABLE; cells],
        };

        let mut frontier: VecDeque<(CellCoord, u16)> = exits
            .iter()
            .copied()
            .filter(|&exit| !is_blocked(exit))
            .filter(|&exit| field.claim(exit, 0))
            .map(|exit| (exit, 0))
            .collect();

        while let Some((cell, steps)) = frontier.pop_front() {
            let next = steps.saturating_add(1);
            if next == UNREACHABLE {
                continue;
            }
            for neighbour in field.neighbours(cell) {
                if !is_blocked(neighbour) && field.claim(neighbour, next) {
                    frontier.push_back((neighbour, next));
                }
            }
        }
        field
    }

    /// Steps from `cell` to the nearest exit; `None` when off the board or cut off.
    #[must_use]
    pub(crate) fn distance(&self, cell: CellCoord) -> Option<u16> {
        let slot = self.slot(cell)?;
        self.steps
            .get(slot)
            .copied()
            .filter(|&steps| steps != UNREACHABLE)
    }

    /// Walks downhill from `start` until an exit is reached.
    ///
    /// The route includes `start` and the exit. It is empty when `start`
    /// cannot reach any exit.
    pub(crate) fn route_from(&self, start: CellCoord) -> Vec<CellCoord> {
        let Some(mut remaining) = self.distance(start) else {
            return Vec::new();
        };

        let mut route = Vec::with_capacity(usize::from(remaining) + 1);
        let mut current = start;
        route.push(current);
        while remaining > 0 {
            let Some((next, steps)) = self
                .neighbours(current)
                .filter_map(|cell| self.distance(cell).map(|steps| (cell, steps)))
                .filter(|&(_, steps)| steps < remaining)
                .min_by_key(|&(_, steps)| steps)
            else {
                break;
            };
            route.push(next);
            current = next;
            remaining = steps;
        }
        route
    }

    fn claim(&mut self, cell: CellCoord, steps: u16) -> bool {
        let Some(slot) = self.slot(cell) else {
            return false;
        };
        if self.steps[slot] <= steps {
            return false;
        }
        self.steps[slot] = steps;
        true
    }

    fn slot(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }
        usize::try_from(u64::from(cell.row()) * u64::from(self.width) + u64::from(cell.column()))
            .ok()
    }

    fn neighbours(&self, cell: CellCoord) -> impl Iterator<Item = CellCoord> {
        let (column, row) = (cell.column(), cell.row());
        let (width, height) = (self.width, self.height);
        [
            row.checked_sub(1).map(|row| CellCoord::new(column, row)),
            Some(column + 1)
                .filter(|&column| column < width)
                .map(|column| CellCoord::new(column, row)),
            Some(row + 1)
                .filter(|&row| row < height)
                .map(|row| CellCoord::new(column, row)),
            column.checked_sub(1).map(|column| CellCoord::new(column, row)),
        ]
        .into_iter()
        .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distances_grow_away_from_the_exit() {
        let field = NavigationField::towards(3, 4, &[CellCoord::new(1, 2)], |_| false);

        assert_eq!(field.distance(CellCoord::new(1, 2)), Some(0));
        assert_eq!(field.distance(CellCoord::new(1, 1)), Some(1));
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(2));
        assert_eq!(field.distance(CellCoord::new(0, 0)), Some(3));
        assert_eq!(field.distance(CellCoord::new(3, 0)), None);
    }

    #[test]
    fn blocked_cells_are_walked_around() {
        let wall = CellCoord::new(1, 1);
        let field = NavigationField::towards(3, 4, &[CellCoord::new(1, 2)], |cell| cell == wall);

        assert_eq!(field.distance(wall), None);
        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(4));
        assert_eq!(field.distance(CellCoord::new(0, 1)), Some(2));
    }

    #[test]
    fn route_descends_to_exit() {
        let field = NavigationField::towards(3, 3, &[CellCoord::new(2, 2)], |_| false);

        let route = field.route_from(CellCoord::new(0, 0));

        assert_eq!(route.first(), Some(&CellCoord::new(0, 0)));
        assert_eq!(route.last(), Some(&CellCoord::new(2, 2)));
        assert_eq!(route.len(), 5);
    }

    #[test]
    fn route_is_empty_when_start_is_cut_off() {
        let blocked = [CellCoord::new(1, 0), CellCoord::new(0, 1)];
        let field =
            NavigationField::towards(3, 3, &[CellCoord::new(2, 2)], |cell| blocked.contains(&cell));

        assert!(field.route_from(CellCoord::new(0, 0)).is_empty());
    }
}
