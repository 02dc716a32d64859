use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::primitives::*;

/// Height reserved above the panels for [`draw_page_header`].
pub fn header_height(config: &VizConfig, title: &str) -> f64 {
    if config.experiment.name.is_empty() && title.is_empty() {
        8.0
    } else {
        config.font.title_size * 1.3 + 14.0
    }
}

/// Draw the page header: **CLAS12** *Preliminary* on the left, the page
/// title centered.
pub fn draw_page_header(canvas: &mut Canvas, config: &VizConfig, title: &str) {
    let y = config.font.title_size * 1.3 + 4.0;
    let x = 12.0;

    if !config.experiment.name.is_empty() {
        let bold_style = TextStyle { size: config.font.title_size * 1.1, bold: true, ..Default::default() };
        canvas.text(x, y, &config.experiment.name, &bold_style);
        let name_w = canvas.measure_text(&config.experiment.name, &bold_style).width;

        if !config.experiment.status.is_empty() {
            let italic_style = TextStyle { size: config.font.title_size * 0.9, italic: true, ..Default::default() };
            canvas.text(x + name_w + 5.0, y, &config.experiment.status, &italic_style);
        }
    }

    if !title.is_empty() {
        let title_style =
            TextStyle::sized(config.font.title_size).anchored(TextAnchor::Middle, TextBaseline::Alphabetic);
        canvas.text(canvas.width / 2.0, y, title, &title_style);
    }
}
