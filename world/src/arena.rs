//! Diamond-shaped playing field and its deployment edges.

use lanebreaker_core::CellCoord;

/// One of the four diagonal edges bounding the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Edge {
    /// Enemy edge running from the left corner to the top corner.
    TopLeft,
    /// Enemy edge running from the top corner to the right corner.
    TopRight,
    /// Friendly edge running from the left corner to the bottom corner.
    BottomLeft,
    /// Friendly edge running from the bottom corner to the right corner.
    BottomRight,
}

impl Edge {
    /// Edge a unit deployed on `self` travels towards.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }
}

/// Square board whose playable cells form a diamond.
///
/// Rows below the midpoint belong to the friendly side, the rest to the
/// enemy. Mobile units enter on a friendly edge and score by reaching the
/// opposite enemy edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Arena {
    size: u32,
}

impl Default for Arena {
    fn default() -> Self {
        Self::new(28)
    }
}

impl Arena {
    /// Creates an arena spanning `size` columns and rows. Odd sizes round down.
    #[must_use]
    pub const fn new(size: u32) -> Self {
        Self { size: size - size % 2 }
    }

    /// Number of columns (and rows) spanned by the arena.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Index of the first enemy row.
    #[must_use]
    pub const fn half(&self) -> u32 {
        self.size / 2
    }

    /// Reports whether the cell is playable.
    #[must_use]
    pub fn contains(&self, cell: CellCoord) -> bool {
        let half = self.half();
        let (column, row) = (cell.column(), cell.row());
        if column >= self.size || row >= self.size {
            return false;
        }
        if row < half {
            column + row + 1 >= half && column <= half + row
        } else {
            let depth = row - half;
            column >= depth && column < self.size - depth
        }
    }

    /// Reports whether the cell lies on the friendly side of the arena.
    #[must_use]
    pub fn is_friendly_territory(&self, cell: CellCoord) -> bool {
        self.contains(cell) && cell.row() < self.half()
    }

    /// Cells along one edge, ordered from the row nearest the midpoint outwards.
    #[must_use]
    pub fn edge_cells(&self, edge: Edge) -> Vec<CellCoord> {
        let half = self.half();
        (0..half)
            .map(|step| match edge {
                Edge::BottomLeft => CellCoord::new(half - 1 - step, step),
                Edge::BottomRight => CellCoord::new(half + step, step),
                Edge::TopLeft => CellCoord::new(step, half + step),
                Edge::TopRight => CellCoord::new(self.size - 1 - step, half + step),
            })
            .collect()
    }

    /// Edge the cell lies on, preferring the friendly edges at the corners.
    #[must_use]
    pub fn edge_of(&self, cell: CellCoord) -> Option<Edge> {
        [Edge::BottomLeft, Edge::BottomRight, Edge::TopLeft, Edge::TopRight]
            .into_iter()
            .find(|&edge| self.edge_cells(edge).contains(&cell))
    }

    /// Reports whether mobile units may be deployed on the cell.
    #[must_use]
    pub fn is_deploy_site(&self, cell: CellCoord) -> bool {
        matches!(
            self.edge_of(cell),
            Some(Edge::BottomLeft | Edge::BottomRight)
        )
    }
}
