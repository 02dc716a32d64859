use crate::layout::margins::PlotArea;

/// `rows × cols` cells filling a region, row-major.
#[derive(Debug, Clone)]
pub struct GridLayout {
    pub rows: usize,
    pub cols: usize,
    cells: Vec<PlotArea>,
}

impl GridLayout {
    pub fn new(region: PlotArea, rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        let w = region.width / cols as f64;
        let h = region.height / rows as f64;
        let cells = (0..rows * cols)
            .map(|i| PlotArea::manual(region.left + (i % cols) as f64 * w, region.top + (i / cols) as f64 * h, w, h))
            .collect();
        Self { rows, cols, cells }
    }

    /// Cell `index` in row-major order; `None` past the last cell.
    pub fn cell(&self, index: usize) -> Option<&PlotArea> {
        self.cells.get(index)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Smallest near-square grid with at least `n` cells and `cols` columns
/// at most.
pub fn grid_for(n: usize, max_cols: usize) -> (usize, usize) {
    let cols = n.clamp(1, max_cols.max(1));
    (n.max(1).div_ceil(cols), cols)
}
