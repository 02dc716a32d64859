use cp_viz::page::PageArtifact;

use crate::config::VizConfig;
use crate::plots::page_canvas;
use crate::plots::panel::draw_panel;

pub fn render(artifact: &PageArtifact, config: &VizConfig) -> crate::Result<String> {
    let cells = artifact.rows * artifact.cols;
    if artifact.panels.len() > cells {
        return Err(crate::RenderError::Layout(format!(
            "page '{}' has {} panels for a {}x{} grid",
            artifact.name,
            artifact.panels.len(),
            artifact.rows,
            artifact.cols
        )));
    }
    let (mut canvas, grid) = page_canvas(artifact.rows, artifact.cols, "", config);
    for (panel, cell) in artifact.panels.iter().zip(0..) {
        if let Some(cell) = grid.cell(cell) {
            draw_panel(&mut canvas, cell, panel, config);
        }
    }
    Ok(canvas.finish_svg())
}
