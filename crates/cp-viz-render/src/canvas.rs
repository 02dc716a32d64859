use std::fmt::Write as FmtWrite;

use crate::color::Color;
use crate::primitives::*;
use crate::text::{SCRIPT_SCALE, Shift, TextMetrics, measure_label, parse_label};

const FONT_FAMILY: &str = "DejaVu Sans, Helvetica, Arial, sans-serif";

/// An SVG element stored for deferred rendering.
#[derive(Debug, Clone)]
enum SvgElement {
    Rect { x: f64, y: f64, w: f64, h: f64, style: Style },
    Line { x1: f64, y1: f64, x2: f64, y2: f64, style: LineStyle },
    Polyline { points: Vec<(f64, f64)>, style: LineStyle },
    Polygon { points: Vec<(f64, f64)>, style: Style },
    Text { x: f64, y: f64, content: String, style: TextStyle, rotate: Option<f64> },
    Circle { cx: f64, cy: f64, r: f64, style: Style },
    Group { clip_id: String, children: Vec<SvgElement> },
}

/// Immediate-mode SVG canvas. Coordinates in points (1pt = 1/72").
///
/// Elements drawn between [`Canvas::push_clip`] and [`Canvas::pop_clip`]
/// are grouped under that clip rectangle.
pub struct Canvas {
    pub width: f64,
    pub height: f64,
    elements: Vec<SvgElement>,
    defs: Vec<String>,
    /// Open clip groups, innermost last.
    open: Vec<(String, Vec<SvgElement>)>,
    next_clip_id: usize,
}

impl Canvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, elements: Vec::new(), defs: Vec::new(), open: Vec::new(), next_clip_id: 0 }
    }

    // --- Drawing primitives ---

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: &Style) {
        // Bars drawn top-down may arrive with a negative height.
        let (y, h) = if h < 0.0 { (y + h, -h) } else { (y, h) };
        let (x, w) = if w < 0.0 { (x + w, -w) } else { (x, w) };
        self.push(SvgElement::Rect { x, y, w, h, style: style.clone() });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: &LineStyle) {
        self.push(SvgElement::Line { x1, y1, x2, y2, style: style.clone() });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], style: &LineStyle) {
        if points.len() < 2 {
            return;
        }
        self.push(SvgElement::Polyline { points: points.to_vec(), style: style.clone() });
    }

    pub fn polygon(&mut self, points: &[(f64, f64)], style: &Style) {
        self.push(SvgElement::Polygon { points: points.to_vec(), style: style.clone() });
    }

    /// Draw a label; TLatex/mathtext markup is rendered as styled runs.
    pub fn text(&mut self, x: f64, y: f64, content: &str, style: &TextStyle) {
        if content.is_empty() {
            return;
        }
        self.push(SvgElement::Text { x, y, content: content.to_string(), style: style.clone(), rotate: None });
    }

    pub fn text_rotated(&mut self, x: f64, y: f64, content: &str, style: &TextStyle, angle: f64) {
        if content.is_empty() {
            return;
        }
        self.push(SvgElement::Text {
            x,
            y,
            content: content.to_string(),
            style: style.clone(),
            rotate: Some(angle),
        });
    }

    pub fn circle(&mut self, cx: f64, cy: f64, r: f64, style: &Style) {
        self.push(SvgElement::Circle { cx, cy, r, style: style.clone() });
    }

    /// Error bar: vertical line + optional horizontal caps.
    pub fn error_bar(&mut self, x: f64, y_lo: f64, y_hi: f64, cap_width: f64, style: &LineStyle) {
        self.line(x, y_lo, x, y_hi, style);
        if cap_width > 0.0 {
            let half = cap_width / 2.0;
            self.line(x - half, y_lo, x + half, y_lo, style);
            self.line(x - half, y_hi, x + half, y_hi, style);
        }
    }

    pub fn marker(&mut self, x: f64, y: f64, marker: &MarkerStyle) {
        let style = Style::filled(marker.color);
        match marker.shape {
            MarkerShape::Circle => self.circle(x, y, marker.size, &style),
            MarkerShape::Square => {
                let s = marker.size;
                self.rect(x - s, y - s, 2.0 * s, 2.0 * s, &style);
            }
        }
    }

    // --- Clip paths ---

    pub fn push_clip(&mut self, x: f64, y: f64, w: f64, h: f64) -> String {
        let id = format!("clip{}", self.next_clip_id);
        self.next_clip_id += 1;
        self.defs.push(format!(
            r#"<clipPath id="{id}"><rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" /></clipPath>"#
        ));
        self.open.push((id.clone(), Vec::new()));
        id
    }

    pub fn pop_clip(&mut self) {
        if let Some((clip_id, children)) = self.open.pop() {
            if !children.is_empty() {
                self.push(SvgElement::Group { clip_id, children });
            }
        }
    }

    // --- Text measurement ---

    pub fn measure_text(&self, content: &str, style: &TextStyle) -> TextMetrics {
        let mut m = measure_label(content, style.size);
        if style.bold {
            m.width *= 1.08;
        }
        m
    }

    // --- SVG output ---

    fn push(&mut self, elem: SvgElement) {
        match self.open.last_mut() {
            Some((_, children)) => children.push(elem),
            None => self.elements.push(elem),
        }
    }

    /// Serialize the canvas. Clip groups left open are closed first.
    pub fn finish_svg(mut self) -> String {
        while !self.open.is_empty() {
            self.pop_clip();
        }

        let mut out = String::with_capacity(32 * 1024);
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height,
        );

        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            for d in &self.defs {
                out.push_str(d);
                out.push('\n');
            }
            out.push_str("</defs>\n");
        }

        let _ = writeln!(out, r#"<rect width="{}" height="{}" fill="white" />"#, self.width, self.height);

        for elem in &self.elements {
            render_element(&mut out, elem);
        }

        out.push_str("</svg>\n");
        out
    }
}

fn render_element(out: &mut String, elem: &SvgElement) {
    match elem {
        SvgElement::Rect { x, y, w, h, style } => {
            let _ = write!(out, r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Line { x1, y1, x2, y2, style } => {
            let _ = write!(out, r#"<line x1="{x1:.2}" y1="{y1:.2}" x2="{x2:.2}" y2="{y2:.2}""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polyline { points, style } => {
            out.push_str(r#"<polyline points=""#);
            write_points(out, points);
            out.push_str(r#"" fill="none""#);
            write_line_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Polygon { points, style } => {
            out.push_str(r#"<polygon points=""#);
            write_points(out, points);
            out.push('"');
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Text { x, y, content, style, rotate } => {
            render_text(out, *x, *y, content, style, *rotate);
        }
        SvgElement::Circle { cx, cy, r, style } => {
            let _ = write!(out, r#"<circle cx="{cx:.2}" cy="{cy:.2}" r="{r:.2}""#);
            write_style_attrs(out, style);
            out.push_str(" />\n");
        }
        SvgElement::Group { clip_id, children } => {
            let _ = writeln!(out, r#"<g clip-path="url(#{clip_id})">"#);
            for child in children {
                render_element(out, child);
            }
            out.push_str("</g>\n");
        }
    }
}

fn render_text(out: &mut String, x: f64, y: f64, content: &str, style: &TextStyle, rotate: Option<f64>) {
    let _ = write!(out, r#"<text x="{x:.2}" y="{y:.2}""#);
    let _ = write!(out, r#" font-family="{FONT_FAMILY}" font-size="{:.1}""#, style.size);
    let _ = write!(out, r#" fill="{}""#, style.color.to_svg_fill());
    let _ = write!(out, r#" text-anchor="{}""#, style.anchor.as_str());
    let _ = write!(out, r#" dominant-baseline="{}""#, style.baseline.as_str());
    if style.bold {
        out.push_str(r#" font-weight="bold""#);
    }
    if style.italic {
        out.push_str(r#" font-style="italic""#);
    }
    if let Some(angle) = rotate {
        let _ = write!(out, r#" transform="rotate({angle:.1},{x:.2},{y:.2})""#);
    }
    out.push('>');

    let runs = parse_label(content);
    if let [run] = runs.as_slice()
        && run.shift == Shift::Normal
        && run.color.is_none()
    {
        escape_into(out, &run.text);
    } else {
        for run in &runs {
            out.push_str("<tspan");
            match run.shift {
                Shift::Normal => {}
                Shift::Sub => {
                    let _ = write!(out, r#" baseline-shift="sub" font-size="{:.1}""#, style.size * SCRIPT_SCALE);
                }
                Shift::Super => {
                    let _ = write!(out, r#" baseline-shift="super" font-size="{:.1}""#, style.size * SCRIPT_SCALE);
                }
            }
            if let Some(color) = run.color {
                let _ = write!(out, r#" fill="{}""#, color.to_svg_fill());
            }
            out.push('>');
            escape_into(out, &run.text);
            out.push_str("</tspan>");
        }
    }
    out.push_str("</text>\n");
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
}

fn write_points(out: &mut String, points: &[(f64, f64)]) {
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{x:.2},{y:.2}");
    }
}

fn write_style_attrs(out: &mut String, style: &Style) {
    match &style.fill {
        Some(fill) => {
            let _ = write!(out, r#" fill="{}""#, fill.to_svg_fill());
        }
        None => out.push_str(r#" fill="none""#),
    }
    if let Some(stroke) = &style.stroke {
        let _ = write!(out, r#" stroke="{}" stroke-width="{:.2}""#, stroke.to_svg_fill(), style.stroke_width);
    }
}

fn write_line_attrs(out: &mut String, style: &LineStyle) {
    let _ = write!(out, r#" stroke="{}" stroke-width="{:.2}""#, style.color.to_svg_fill(), style.width);
    if let Some(dash) = style.dash {
        let _ = write!(out, r#" stroke-dasharray="{dash}""#);
    }
}

/// Parse a user color string, falling back to `fallback`.
pub(crate) fn color_or(spec: Option<&str>, fallback: Color) -> Color {
    match spec {
        Some(s) => Color::parse(s).unwrap_or_else(|| {
            log::warn!("unknown color '{s}', using {}", fallback.to_hex());
            fallback
        }),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas() {
        let c = Canvas::new(100.0, 50.0);
        let svg = c.finish_svg();
        assert!(svg.contains("width=\"100\""));
        assert!(svg.contains("height=\"50\""));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn rect_rendering() {
        let mut c = Canvas::new(200.0, 100.0);
        c.rect(10.0, 50.0, 50.0, -30.0, &Style::filled(Color::hex("#ff0000")));
        let svg = c.finish_svg();
        assert!(svg.contains(r##"fill="#ff0000""##));
        assert!(svg.contains(r#"y="20.00""#));
        assert!(svg.contains(r#"height="30.00""#));
    }

    #[test]
    fn plain_text_has_no_tspans() {
        let mut c = Canvas::new(200.0, 100.0);
        c.text(10.0, 20.0, "Sector 1 & 2", &TextStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains(">Sector 1 &amp; 2</text>"));
        assert!(!svg.contains("<tspan"));
    }

    #[test]
    fn scripts_become_tspans() {
        let mut c = Canvas::new(200.0, 100.0);
        c.text(10.0, 20.0, "#theta_{e}", &TextStyle::sized(10.0));
        let svg = c.finish_svg();
        assert!(svg.contains("<tspan>θ</tspan>"));
        assert!(svg.contains(r#"<tspan baseline-shift="sub" font-size="7.0">e</tspan>"#));
    }

    #[test]
    fn clipped_elements_are_grouped() {
        let mut c = Canvas::new(200.0, 100.0);
        let id = c.push_clip(0.0, 0.0, 50.0, 50.0);
        c.line(0.0, 0.0, 100.0, 100.0, &LineStyle::default());
        c.pop_clip();
        c.line(0.0, 100.0, 100.0, 0.0, &LineStyle::default());
        let svg = c.finish_svg();
        assert!(svg.contains(&format!(r#"<g clip-path="url(#{id})">"#)));
        assert_eq!(svg.matches("<line").count(), 2);
        assert!(svg.contains("<clipPath"));
    }
}
