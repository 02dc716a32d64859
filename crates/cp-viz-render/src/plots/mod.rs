pub mod bins;
pub mod page;
pub mod panel;
pub mod resolution;
pub mod slices;

mod axes_draw;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::{draw_page_header, header_height};
use crate::layout::grid::GridLayout;
use crate::layout::margins::PlotArea;

/// Canvas sized for a `rows × cols` page with its header drawn, and the
/// grid of panel cells below the header.
pub(crate) fn page_canvas(rows: usize, cols: usize, title: &str, config: &VizConfig) -> (Canvas, GridLayout) {
    let rows = rows.max(1);
    let cols = cols.max(1);
    let top = header_height(config, title);
    let width = cols as f64 * config.figure.panel_width;
    let height = top + rows as f64 * config.figure.panel_height;
    let mut canvas = Canvas::new(width, height);
    draw_page_header(&mut canvas, config, title);
    let grid = GridLayout::new(PlotArea::manual(0.0, top, width, height - top), rows, cols);
    (canvas, grid)
}
