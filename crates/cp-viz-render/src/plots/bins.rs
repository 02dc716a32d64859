use cp_viz::bins::QuantileBinsArtifact;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::header::{draw_page_header, header_height};
use crate::layout::margins::PlotArea;
use crate::plots::axes_draw::draw_axes;
use crate::plots::panel::{draw_series, series_axes};
use crate::primitives::*;

/// Histogram of the values with a vertical line at every quantile edge.
pub fn render(artifact: &QuantileBinsArtifact, config: &VizConfig) -> crate::Result<String> {
    let top = header_height(config, "");
    let mut canvas = Canvas::new(config.figure.width, config.figure.height + top);
    draw_page_header(&mut canvas, config, "");

    let (x_axis, y_axis) = series_axes(std::slice::from_ref(&artifact.histogram), None, None);
    let x_axis = x_axis.with_label(artifact.x_label.as_str());
    let y_axis = y_axis.with_label("Counts");
    let cell = PlotArea::manual(0.0, top, config.figure.width, config.figure.height);
    let area = PlotArea::inside(&cell, &canvas, &y_axis, &x_axis, false, config);
    draw_axes(&mut canvas, &area, &x_axis, &y_axis, config);

    canvas.push_clip(area.left, area.top, area.width, area.height);
    draw_series(&mut canvas, &area, &x_axis, &y_axis, &artifact.histogram, config.colors.data, config);
    let edge_style = LineStyle::dashed(config.colors.data, 0.8);
    for &edge in &artifact.edges {
        let px = x_axis.data_to_pixel(edge, area.left, area.right());
        canvas.line(px, area.top, px, area.bottom(), &edge_style);
    }
    canvas.pop_clip();

    let style = TextStyle::sized(config.font.tick_size).anchored(TextAnchor::End, TextBaseline::Hanging);
    let note = format!("{} values, {} bins", artifact.n_values, artifact.edges.len().saturating_sub(1));
    canvas.text(area.right() - 4.0, area.top + 4.0, &note, &style);
    Ok(canvas.finish_svg())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_line_per_edge() {
        let values: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37) % 10.0).collect();
        let art = QuantileBinsArtifact::build(&values, 4, 20, (0.0, 10.0), "Q^{2}").unwrap();
        let svg = render(&art, &VizConfig::default()).unwrap();
        assert!(svg.contains("200 values, 4 bins"));
        assert!(svg.contains("fill=\"#ffa500\""));
        let dashed_edges = svg.matches(r##"stroke="#000000" stroke-width="0.80" stroke-dasharray="6 3""##).count();
        assert_eq!(dashed_edges, 5);
    }
}
