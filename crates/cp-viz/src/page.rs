//! Pages of histogram panels: sector pages, single histograms and overlays.
//!
//! A [`PageSpec`] names histograms by key (or by a `{}` template expanded
//! over the six sectors) and [`PageSpec::build`] looks them up in a
//! [`HistogramMap`] to produce a [`PageArtifact`].

use cp_core::{Error, Histogram, Histogram1D, HistogramMap, Result, format_key, sectors};
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;
use crate::series::{BinnedSeries, HeatMap, SeriesStyle};

/// Colored text drawn inside a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Text (ROOT or matplotlib label syntax).
    pub text: String,
    /// Text color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// What a panel draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelContent {
    /// One or more 1-D series on shared axes.
    Series {
        /// Series in drawing order.
        series: Vec<BinnedSeries>,
        /// Visible x range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        x_range: Option<[f64; 2]>,
        /// Visible y range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y_range: Option<[f64; 2]>,
        /// Draw a legend of the labelled series.
        #[serde(default)]
        legend: bool,
    },
    /// A 2-D histogram as a color map.
    HeatMap {
        /// Values.
        map: HeatMap,
        /// Logarithmic color scale.
        #[serde(default)]
        logz: bool,
        /// Fixed color range.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z_range: Option<[f64; 2]>,
    },
    /// Placeholder for a histogram that could not be drawn.
    Empty {
        /// Why the panel is empty.
        reason: String,
    },
}

/// One panel of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelArtifact {
    /// Title drawn at the top of the panel.
    #[serde(default)]
    pub title: String,
    /// x-axis label.
    #[serde(default)]
    pub x_label: String,
    /// y-axis label.
    #[serde(default)]
    pub y_label: String,
    /// Content.
    pub content: PanelContent,
    /// Text drawn in the upper right corner.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

/// A page of panels on a `rows × cols` grid, filled row by row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageArtifact {
    /// Artifact schema version.
    pub schema_version: String,
    /// Output stem.
    pub name: String,
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Panels.
    pub panels: Vec<PanelArtifact>,
}

/// A histogram of an overlay, by key or sector template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    /// Key, or a `{}` template for sector layouts.
    pub key: String,
    /// Legend label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Line color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Fill color; a filled series is drawn as bars.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

impl SeriesSpec {
    /// Series drawn as an outline in `color`.
    pub fn line(key: impl Into<String>, color: impl Into<String>) -> Self {
        Self { key: key.into(), label: None, color: Some(color.into()), fill: None }
    }

    /// Set the legend label.
    pub fn labelled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the fill color.
    pub fn filled(mut self, fill: impl Into<String>) -> Self {
        self.fill = Some(fill.into());
        self
    }

    fn series(&self, h: &Histogram1D, normalize: bool) -> BinnedSeries {
        let h = if normalize { h.normalized_to_max() } else { h.clone() };
        let mut s = BinnedSeries::from_h1(&h).with_style(SeriesStyle::Step);
        s.label = self.label.clone();
        s.color = self.color.clone();
        if let Some(fill) = &self.fill {
            s = s.with_fill(fill.clone()).with_style(SeriesStyle::Bars);
        }
        s
    }
}

/// Panel arrangement of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLayout {
    /// Six panels from `template` expanded over the sectors.
    Sector {
        /// Key template with a `{}` placeholder.
        template: String,
    },
    /// One histogram on the whole page.
    Single {
        /// Histogram key.
        key: String,
    },
    /// Six panels, each overlaying every template for its sector.
    SectorOverlay {
        /// Overlaid series; keys are templates.
        series: Vec<SeriesSpec>,
    },
    /// One panel overlaying several histograms.
    Overlay {
        /// Overlaid series.
        series: Vec<SeriesSpec>,
    },
}

/// Drawing options shared by every layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageOptions {
    /// Panel title.
    pub title: Option<String>,
    /// x-axis label.
    pub x_label: Option<String>,
    /// y-axis label.
    pub y_label: Option<String>,
    /// Logarithmic color scale for 2-D panels.
    pub logz: bool,
    /// Fixed color range for 2-D panels.
    pub z_range: Option<[f64; 2]>,
    /// Visible x range.
    pub x_range: Option<[f64; 2]>,
    /// Visible y range.
    pub y_range: Option<[f64; 2]>,
    /// Divide every histogram by its number of entries.
    pub scale_by_entries: bool,
    /// Divide every 1-D histogram by its maximum.
    pub normalize: bool,
    /// Fill color of single 1-D histograms.
    pub fill: Option<String>,
    /// Grid as `[rows, cols]`; the caller's default when unset.
    pub grid: Option<[usize; 2]>,
    /// Legend for overlays.
    pub legend: bool,
    /// Text drawn in the upper right corner of overlay panels.
    pub annotations: Vec<Annotation>,
}

/// One page: output name, layout and options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    /// Output stem for pages written to their own file.
    #[serde(default)]
    pub name: String,
    /// Arrangement.
    #[serde(flatten)]
    pub layout: PageLayout,
    /// Drawing options.
    #[serde(flatten)]
    pub options: PageOptions,
}

impl PageSpec {
    /// Page with the given layout and default options.
    pub fn new(name: impl Into<String>, layout: PageLayout) -> Self {
        Self { name: name.into(), layout, options: PageOptions::default() }
    }

    /// Six-panel page of `template`.
    pub fn sector(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::new(name, PageLayout::Sector { template: template.into() })
    }

    /// Single-histogram page.
    pub fn single(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self::new(name, PageLayout::Single { key: key.into() })
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.options.title = Some(title.into());
        self
    }

    /// Set the axis labels; an empty y label is left unset.
    pub fn labels(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.options.x_label = Some(x.into());
        let y = y.into();
        self.options.y_label = (!y.is_empty()).then_some(y);
        self
    }

    /// Mutate the options in place.
    pub fn with(mut self, f: impl FnOnce(&mut PageOptions)) -> Self {
        f(&mut self.options);
        self
    }

    /// Keys this page reads.
    pub fn keys(&self) -> Vec<String> {
        match &self.layout {
            PageLayout::Sector { template } => sectors().map(|s| format_key(template, s)).collect(),
            PageLayout::Single { key } => vec![key.clone()],
            PageLayout::SectorOverlay { series } => {
                sectors().flat_map(|s| series.iter().map(move |t| format_key(&t.key, s))).collect()
            }
            PageLayout::Overlay { series } => series.iter().map(|s| s.key.clone()).collect(),
        }
    }

    /// Look up this page's histograms and assemble the artifact.
    ///
    /// `default_grid` is `(rows, cols)` for six-panel layouts.
    pub fn build(&self, histograms: &HistogramMap, default_grid: (usize, usize)) -> Result<PageArtifact> {
        let (panels, (rows, cols)) = match &self.layout {
            PageLayout::Sector { template } => {
                let panels = sectors()
                    .map(|s| self.histogram_panel(histograms, &format_key(template, s)))
                    .collect::<Result<Vec<_>>>()?;
                (panels, self.grid_or(default_grid))
            }
            PageLayout::Single { key } => (vec![self.histogram_panel(histograms, key)?], (1, 1)),
            PageLayout::SectorOverlay { series } => {
                let panels = sectors()
                    .map(|s| {
                        let keyed: Vec<SeriesSpec> = series
                            .iter()
                            .map(|t| SeriesSpec { key: format_key(&t.key, s), ..t.clone() })
                            .collect();
                        self.overlay_panel(histograms, &keyed)
                    })
                    .collect::<Result<Vec<_>>>()?;
                (panels, self.grid_or(default_grid))
            }
            PageLayout::Overlay { series } => (vec![self.overlay_panel(histograms, series)?], (1, 1)),
        };
        Ok(PageArtifact { schema_version: SCHEMA_VERSION.to_string(), name: self.name.clone(), rows, cols, panels })
    }

    fn grid_or(&self, default_grid: (usize, usize)) -> (usize, usize) {
        self.options.grid.map(|[r, c]| (r, c)).unwrap_or(default_grid)
    }

    fn panel(&self, content: PanelContent, annotations: Vec<Annotation>) -> PanelArtifact {
        let o = &self.options;
        PanelArtifact {
            title: o.title.clone().unwrap_or_default(),
            x_label: o.x_label.clone().unwrap_or_default(),
            y_label: o.y_label.clone().unwrap_or_default(),
            content,
            annotations,
        }
    }

    fn histogram_panel(&self, histograms: &HistogramMap, key: &str) -> Result<PanelArtifact> {
        let o = &self.options;
        let mut h = histograms.get(key)?.clone();
        if o.scale_by_entries {
            scale_by_entries(&mut h)?;
        }
        let content = match h {
            Histogram::H1(h1) => {
                let h1 = if o.normalize { h1.normalized_to_max() } else { h1 };
                let mut s = BinnedSeries::from_h1(&h1);
                s.fill = o.fill.clone();
                PanelContent::Series { series: vec![s], x_range: o.x_range, y_range: o.y_range, legend: false }
            }
            Histogram::H2(h2) => PanelContent::HeatMap { map: HeatMap::from_h2(&h2), logz: o.logz, z_range: o.z_range },
        };
        Ok(self.panel(content, Vec::new()))
    }

    fn overlay_panel(&self, histograms: &HistogramMap, series: &[SeriesSpec]) -> Result<PanelArtifact> {
        let o = &self.options;
        let drawn = series
            .iter()
            .map(|spec| {
                let mut h = histograms.get_h1(&spec.key)?.clone();
                if o.scale_by_entries {
                    scale_h1_by_entries(&mut h)?;
                }
                Ok(spec.series(&h, o.normalize))
            })
            .collect::<Result<Vec<_>>>()?;
        let content = PanelContent::Series { series: drawn, x_range: o.x_range, y_range: o.y_range, legend: o.legend };
        Ok(self.panel(content, o.annotations.clone()))
    }
}

fn scale_h1_by_entries(h: &mut Histogram1D) -> Result<()> {
    if h.entries <= 0.0 {
        return Err(Error::Validation(format!("{} has no entries to scale by", h.name)));
    }
    h.scale(1.0 / h.entries);
    Ok(())
}

/// Divide `h` by its number of entries.
pub fn scale_by_entries(h: &mut Histogram) -> Result<()> {
    let entries = h.entries();
    if entries <= 0.0 {
        return Err(Error::Validation(format!("{} has no entries to scale by", h.name())));
    }
    h.scale(1.0 / entries);
    Ok(())
}

/// Six overlay panels comparing the same sector template across inputs,
/// each histogram normalized to a peak of 1.
pub fn compare_page(
    name: impl Into<String>,
    template: &str,
    x_label: &str,
    inputs: &[(&str, &HistogramMap, &str)],
) -> Result<PageArtifact> {
    let mut panels = Vec::new();
    for sector in sectors() {
        let key = format_key(template, sector);
        let series = inputs
            .iter()
            .map(|&(label, histograms, color)| {
                let h = histograms.get_h1(&key)?.normalized_to_max();
                Ok(BinnedSeries::from_h1(&h).with_label(label).with_color(color).with_style(SeriesStyle::Step))
            })
            .collect::<Result<Vec<_>>>()?;
        panels.push(PanelArtifact {
            title: format!("Sector {sector}"),
            x_label: x_label.to_string(),
            y_label: String::new(),
            content: PanelContent::Series { series, x_range: None, y_range: None, legend: true },
            annotations: Vec::new(),
        });
    }
    Ok(PageArtifact { schema_version: SCHEMA_VERSION.to_string(), name: name.into(), rows: 2, cols: 3, panels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cp_core::{Axis, Histogram2D};

    fn h1(name: &str, contents: &[f64]) -> Histogram1D {
        Histogram1D::from_contents(name, "", Axis::uniform(contents.len(), 0.0, 1.0).unwrap(), contents.to_vec())
            .unwrap()
    }

    fn sector_map(template: &str) -> HistogramMap {
        let mut map = HistogramMap::new();
        for s in sectors() {
            map.insert(h1(&format_key(template, s), &[1.0, s as f64, 2.0]));
        }
        map
    }

    #[test]
    fn sector_page_has_six_panels_in_sector_order() {
        let map = sector_map("histos_w_{}");
        let spec = PageSpec::sector("w", "histos_w_{}").title("Electron (Forward)").labels("W", "");
        let page = spec.build(&map, (3, 2)).unwrap();
        assert_eq!((page.rows, page.cols), (3, 2));
        assert_eq!(page.panels.len(), 6);
        assert_eq!(page.panels[0].title, "Electron (Forward)");
        assert_eq!(page.panels[0].x_label, "W");
        assert!(page.panels[0].y_label.is_empty());
        match &page.panels[4].content {
            PanelContent::Series { series, .. } => assert_eq!(series[0].contents, vec![1.0, 5.0, 2.0]),
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn missing_key_is_reported() {
        let map = sector_map("histos_w_{}");
        let err = PageSpec::sector("vz", "histos_vz_electron_{}").build(&map, (3, 2));
        assert!(matches!(err, Err(Error::KeyNotFound(k)) if k == "histos_vz_electron_1"));
    }

    #[test]
    fn two_d_panels_carry_log_and_range() {
        let mut h = Histogram2D::new(
            "pions_dc1_xy_pip_chi2",
            "",
            Axis::uniform(2, 0.0, 2.0).unwrap(),
            Axis::uniform(2, 0.0, 2.0).unwrap(),
        );
        h.fill(0.5, 0.5);
        h.fill(1.5, 0.5);
        h.fill(1.5, 0.5);
        h.fill(1.5, 1.5);
        let mut map = HistogramMap::new();
        map.insert(h);

        let spec = PageSpec::single("dc1_xy_pip_chi2", "pions_dc1_xy_pip_chi2").with(|o| {
            o.scale_by_entries = true;
            o.z_range = Some([0.0, 2.0]);
            o.logz = true;
        });
        let page = spec.build(&map, (2, 3)).unwrap();
        assert_eq!((page.rows, page.cols), (1, 1));
        match &page.panels[0].content {
            PanelContent::HeatMap { map, logz, z_range } => {
                assert!(*logz);
                assert_eq!(*z_range, Some([0.0, 2.0]));
                assert_relative_eq!(map.z[0][1], 0.5);
                assert_relative_eq!(map.max(), 0.5);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn sector_overlay_expands_every_template() {
        let mut map = sector_map("pions_x_pip_{}");
        for s in sectors() {
            map.insert(h1(&format_key("pions_x_pim_{}", s), &[4.0, 2.0, 1.0]));
        }
        let spec = PageSpec::new(
            "x",
            PageLayout::SectorOverlay {
                series: vec![SeriesSpec::line("pions_x_pip_{}", "99"), SeriesSpec::line("pions_x_pim_{}", "55")],
            },
        );
        assert_eq!(spec.keys().len(), 12);
        let page = spec.build(&map, (2, 3)).unwrap();
        assert_eq!(page.panels.len(), 6);
        match &page.panels[2].content {
            PanelContent::Series { series, .. } => {
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].contents, vec![1.0, 3.0, 2.0]);
                assert_eq!(series[1].color.as_deref(), Some("55"));
                assert_eq!(series[1].style, SeriesStyle::Step);
            }
            other => panic!("unexpected content {other:?}"),
        }
    }

    #[test]
    fn compare_page_normalizes_peaks() {
        let data = sector_map("histos_p_ele_ctof_{}");
        let mut sim = HistogramMap::new();
        for s in sectors() {
            sim.insert(h1(&format_key("histos_p_ele_ctof_{}", s), &[10.0, 40.0, 20.0]));
        }
        let page = compare_page(
            "p_ele_compare",
            "histos_p_ele_ctof_{}",
            "$p_e$",
            &[("Data", &data, "#000000"), ("Sim", &sim, "#ff0000")],
        )
        .unwrap();
        assert_eq!((page.rows, page.cols), (2, 3));
        for panel in &page.panels {
            let PanelContent::Series { series, legend, .. } = &panel.content else {
                panic!("expected series");
            };
            assert!(*legend);
            for s in series {
                assert_relative_eq!(s.contents.iter().copied().fold(0.0, f64::max), 1.0);
            }
        }
    }

    #[test]
    fn page_spec_reads_from_yaml() {
        let yaml = r##"
- kind: sector
  template: "histos_w_q2_{}"
  title: "Electron (Forward)"
  x_label: W
  y_label: "Q^{2}"
  logz: true
- kind: overlay
  name: theta_p
  x_range: [10, 70]
  series:
    - key: histos_theta_p_combined
      color: "1"
    - key: histos_theta_p_ctof
      color: "1"
      fill: "64"
  annotations:
    - text: "#color[64]{CTOF}"
      color: "64"
"##;
        let specs: Vec<PageSpec> = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(specs.len(), 2);
        assert!(matches!(&specs[0].layout, PageLayout::Sector { template } if template == "histos_w_q2_{}"));
        assert!(specs[0].options.logz);
        assert_eq!(specs[0].options.y_label.as_deref(), Some("Q^{2}"));
        assert_eq!(specs[1].name, "theta_p");
        assert_eq!(specs[1].options.x_range, Some([10.0, 70.0]));
        assert_eq!(specs[1].options.annotations.len(), 1);
        assert_eq!(specs[1].options.annotations[0].text, "#color[64]{CTOF}");
        let PageLayout::Overlay { series } = &specs[1].layout else {
            panic!("expected overlay");
        };
        assert_eq!(series[1].fill.as_deref(), Some("64"));
    }
}
