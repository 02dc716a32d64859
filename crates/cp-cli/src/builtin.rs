//! Built-in plot lists and the YAML plots file that overrides them.

use anyhow::{Context, Result};
use cp_viz::{Annotation, PageLayout, PageSpec, ResolutionSpec, SeriesSpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Six-panel data/simulation comparison of one sector template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareSpec {
    pub name: String,
    pub template: String,
    #[serde(default)]
    pub x_label: String,
}

/// Plot lists read from `--plots`; a missing section keeps the built-in list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotsFile {
    pub resolution: Option<Vec<ResolutionSpec>>,
    pub compare: Option<Vec<CompareSpec>>,
    pub monitor: Option<Vec<PageSpec>>,
    pub present: Option<Vec<PageSpec>>,
    pub pions: Option<Vec<PageSpec>>,
}

impl PlotsFile {
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plots file {}", path.display()))?;
        serde_yaml_ng::from_str(&raw).with_context(|| format!("failed to parse plots YAML {}", path.display()))
    }

    pub fn resolution(&self) -> Vec<ResolutionSpec> {
        self.resolution.clone().unwrap_or_else(resolution_specs)
    }

    pub fn compare(&self) -> Vec<CompareSpec> {
        self.compare.clone().unwrap_or_else(compare_specs)
    }

    pub fn monitor(&self) -> Vec<PageSpec> {
        self.monitor.clone().unwrap_or_else(monitor_pages)
    }

    pub fn present(&self) -> Vec<PageSpec> {
        self.present.clone().unwrap_or_else(present_pages)
    }

    pub fn pions(&self) -> Vec<PageSpec> {
        self.pions.clone().unwrap_or_else(pion_pages)
    }
}

#[allow(clippy::too_many_arguments)]
fn resolution(
    name: &str,
    template: &str,
    x_range: (f64, f64),
    step: usize,
    y_range: (f64, f64),
    max_width: f64,
    title: &str,
    x_label: &str,
    y_label: &str,
) -> ResolutionSpec {
    ResolutionSpec {
        name: name.into(),
        template: template.into(),
        x_range,
        step,
        y_range: Some(y_range),
        max_width,
        title: title.into(),
        x_label: x_label.into(),
        y_label: y_label.into(),
    }
}

pub fn resolution_specs() -> Vec<ResolutionSpec> {
    vec![
        resolution(
            "theta_electron_delta_p_electron",
            "histos_theta_electron_delta_p_electron_{}",
            (6.0, 12.0),
            5,
            (-0.8, 0.8),
            0.4,
            "Electron Momentum Resolution (from $\\theta_e$)",
            "$\\theta_e$",
            "$\\Delta P_{e}$",
        ),
        resolution(
            "theta_proton_delta_p_proton",
            "histos_theta_proton_delta_p_proton_{}",
            (40.0, 55.0),
            6,
            (-0.8, 0.8),
            0.8,
            "Proton Momentum Resolution (from $\\theta_e$)",
            "$\\theta_p$",
            "$\\Delta P_{p}$",
        ),
        resolution(
            "p_proton_delta_p_proton",
            "histos_p_proton_delta_p_proton_{}",
            (0.3, 2.5),
            6,
            (-0.8, 0.8),
            0.8,
            "Proton Momentum Resolution (from $\\theta_e$)",
            "$P_p$",
            "$\\Delta P_{p}$",
        ),
        resolution(
            "theta_proton_delta_theta_proton",
            "histos_theta_proton_delta_theta_proton_{}",
            (44.0, 55.0),
            6,
            (-5.0, 5.0),
            3.0,
            "Proton $\\theta$ Resolution (from $\\theta_e$)",
            "$\\theta_p$",
            "$\\Delta \\theta_{p}$",
        ),
        resolution(
            "theta_electron_de_beam",
            "histos_theta_ele_de_beam_{}",
            (6.5, 11.5),
            6,
            (-0.5, 0.5),
            3.0,
            "Beam Energy (from $\\theta_e$, $P_e$)",
            "$\\theta_e$",
            "$\\Delta E_{beam}$",
        ),
    ]
}

pub fn compare_specs() -> Vec<CompareSpec> {
    [
        ("p_ele_compare", "histos_p_ele_ctof_{}", "$p_e$"),
        ("theta_ele_compare", "histos_theta_electron_ctof_{}", "$\\theta_e$"),
        ("theta_pro_compare", "histos_theta_proton_ctof_{}", "$\\theta_p$"),
        ("p_pro_compare", "histos_p_pro_ctof_{}", "$p_p$"),
    ]
    .into_iter()
    .map(|(name, template, x_label)| CompareSpec { name: name.into(), template: template.into(), x_label: x_label.into() })
    .collect()
}

fn sector(template: &str, title: &str, x_label: &str, y_label: &str) -> PageSpec {
    PageSpec::sector(template.trim_end_matches("_{}").trim_end_matches("{}"), template)
        .title(title)
        .labels(x_label, y_label)
}

fn single(key: &str, title: &str, x_label: &str, y_label: &str) -> PageSpec {
    PageSpec::single(key, key).title(title).labels(x_label, y_label)
}

pub fn monitor_pages() -> Vec<PageSpec> {
    const EP: &str = "Electron (Forward) and Positive (CTOF)";
    vec![
        sector("histos_w_{}", EP, "W", ""),
        sector("histos_w_q2_{}", EP, "W", "Q^{2}"),
        single("histos_phi_electron_w", "W vs. #phi_{e}", "#phi_{e}", "W"),
        sector("histos_theta_electron_vz_electron_{}", "v_{z} (e) vs. #theta_{e}", "#theta_{e}", "v_{z} (e)"),
        sector("histos_w_inclusive_{}", "Electron (Forward)", "W", ""),
        sector("histos_w_q2_inclusive_{}", "Electron (Forward)", "W", "Q^{2}"),
        sector("histos_delta_p_electron_{}", "#Delta P_{e} from #theta_{e}", "#Delta P_{e}", ""),
        sector(
            "histos_theta_electron_delta_p_electron_{}",
            "#Delta P_{e} vs #theta_{e} from #theta_{e}",
            "#theta_{e}",
            "#Delta P_{e}",
        ),
        single(
            "histos_phi_electron_delta_p_electron",
            "#Delta P_{e} vs. #phi_{e} from #theta_{e}",
            "#phi_{e}",
            "#Delta P_{e}",
        ),
        sector("histos_delta_p_proton_{}", "#Delta P_{p} from #theta_{e}", "#Delta P_{p}", ""),
        sector(
            "histos_theta_proton_delta_p_proton_{}",
            "#Delta P_{p} vs #theta_{p} from #theta_{e}",
            "#theta_{p}",
            "#Delta P_{p}",
        ),
        sector("histos_p_proton_delta_p_proton_{}", "#Delta P_{p} vs P_{p} from #theta_{e}", "P_{p}", "#Delta P_{p}"),
        sector("histos_delta_theta_proton_{}", "#Delta #theta_{p} from #theta_{e}", "#Delta #theta_{p}", ""),
        sector(
            "histos_theta_electron_delta_theta_proton_{}",
            "#Delta #theta_{p} vs #theta_{e} from #theta_{e}",
            "#theta_{e}",
            "#Delta #theta_{p}",
        ),
        sector(
            "histos_theta_proton_delta_theta_proton_{}",
            "#Delta #theta_{p} vs #theta_{p} from #theta_{e}",
            "#theta_{p}",
            "#Delta #theta_{p}",
        ),
        sector("histos_theta_electron_vz_electron_{}", "v_{z} (e) vs #theta_{e}", "#theta_{e}", "v_{z} (e)"),
        single("histos_phi_electron_vz_electron", "v_{z} (e) vs. #phi_{e}", "#phi_{e}", "v_{z} (e)"),
        sector("histos_vz_electron_{}", "v_{z} (e)", "v_{z} (e)", ""),
        sector("histos_theta_proton_vz_proton_{}", "v_{z} (p) vs #theta_{p}", "#theta_{p}", "v_{z} (p)"),
        single("histos_phi_proton_vz_proton", "v_{z} (p) vs. #phi_{p}", "#phi_{p}", "v_{z} (p)"),
        sector("histos_vz_proton_{}", "v_{z} (p)", "v_{z} (p)", ""),
        single("histos_phi_electron_delta_vz", "#Delta v_{z} vs. #phi_{e}", "#phi_{e}", "#Delta v_{z}"),
        single("histos_phi_proton_delta_vz", "#Delta v_{z} vs. #phi_{p}", "#phi_{p}", "#Delta v_{z}"),
        sector("histos_delta_vz_{}", "#Delta v_{z}", "#Delta v_{z}", ""),
        sector("histos_de_beam_{}", "#Delta E_{beam} from (#theta_{e}, P_{e})", "#Delta E_{beam}", ""),
        sector("histos_de_beam_from_angles{}", "#Delta E_{beam} from (#theta_{e}, #theta_{p})", "#Delta E_{beam}", ""),
        sector(
            "histos_de_beam_de_beam_from_angles{}",
            "#Delta E_{beam}",
            "#Delta E (#theta_{e}, P_{e})",
            "#Delta E (#theta_{e}, #theta_{p})",
        ),
        sector("histos_theta_ele_de_beam_{}", "#Delta E_{beam} vs #theta_{e}", "#theta_{e}", "#Delta E (#theta_{e}, P_{e})"),
    ]
}

pub fn present_pages() -> Vec<PageSpec> {
    let w = PageSpec::new(
        "w_dist",
        PageLayout::Overlay {
            series: vec![SeriesSpec::line("histos_w", "1"), SeriesSpec::line("histos_w_pass_angle_in_ctof", "55")],
        },
    )
    .title("Electrons (forward)")
    .labels("W (GeV/c^{2})", "")
    .with(|o| o.x_range = Some([0.7, 1.3]));

    let theta_p = PageSpec::new(
        "theta_p",
        PageLayout::Overlay {
            series: vec![
                SeriesSpec::line("histos_theta_p_combined", "1"),
                SeriesSpec::line("histos_theta_p_ctof", "1").filled("64"),
                SeriesSpec::line("histos_theta_p_tof_2", "1").filled("55"),
                SeriesSpec::line("histos_theta_p_tof_3", "1").filled("99"),
            ],
        },
    )
    .title("Angular Distribution of Elastic Protons")
    .labels("#theta_{p} (deg)", "")
    .with(|o| {
        o.x_range = Some([10.0, 70.0]);
        o.annotations = [("CTOF", "64"), ("FTOF 1-B", "55"), ("FTOF 2", "99")]
            .into_iter()
            .map(|(text, color)| Annotation { text: text.into(), color: Some(color.into()) })
            .collect();
    });

    let de_beam_2d = PageSpec::sector("de_beam_de_beam_from_angles", "histos_de_beam_de_beam_from_angles{}")
        .title("#Delta E_{beam}")
        .labels("#Delta E_{beam} (#theta_{e}, p_{e})", "#Delta E_{beam} (#theta_{e}, #theta_{p})");

    let de_beam = PageSpec::new(
        "de_beam",
        PageLayout::SectorOverlay {
            series: vec![
                SeriesSpec::line("histos_de_beam_{}", "99"),
                SeriesSpec::line("histos_de_beam_from_angles{}", "55"),
            ],
        },
    );

    vec![w, theta_p, de_beam_2d, de_beam]
}

const HADRONS: [(&str, &str); 2] = [("pip", "99"), ("pim", "55")];

pub fn pion_pages() -> Vec<PageSpec> {
    let mut pages = Vec::new();
    for axis in ["x", "z", "q2", "pt"] {
        let series = HADRONS
            .iter()
            .map(|(had, color)| SeriesSpec::line(format!("pions_{axis}_{had}_{{}}_eid"), *color).labelled(*had))
            .collect();
        pages.push(PageSpec::new(axis, PageLayout::SectorOverlay { series }).labels(axis, ""));
    }
    for axis in ["xq2", "zpt", "beta_p"] {
        for (had, _) in HADRONS {
            pages.push(
                PageSpec::sector(format!("{had}_{axis}"), format!("pions_{axis}_{had}_{{}}_eid")).with(|o| o.logz = true),
            );
        }
    }
    for key in ["pions_dc1_xy_ele_chi2", "pions_dc1_xy_pip_chi2", "pions_dc1_xy_ele_chi2_eid"] {
        let name = key.trim_start_matches("pions_");
        pages.push(PageSpec::single(name, key).with(|o| {
            o.scale_by_entries = true;
            o.z_range = Some([0.0, 2.0]);
        }));
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_match_the_original_scripts() {
        assert_eq!(resolution_specs().len(), 5);
        assert_eq!(compare_specs().len(), 4);
        assert_eq!(monitor_pages().len(), 28);
        assert_eq!(present_pages().len(), 4);
        assert_eq!(pion_pages().len(), 4 + 6 + 3);
    }

    #[test]
    fn sector_page_names_drop_the_placeholder() {
        let pages = monitor_pages();
        assert_eq!(pages[0].name, "histos_w");
        assert_eq!(pages[25].name, "histos_de_beam_from_angles");
        assert_eq!(pages[0].keys()[5], "histos_w_6");
    }

    #[test]
    fn pion_overlays_expand_per_sector() {
        let pages = pion_pages();
        let keys = pages[0].keys();
        assert_eq!(keys.len(), 12);
        assert_eq!(keys[0], "pions_x_pip_1_eid");
        assert_eq!(keys[1], "pions_x_pim_1_eid");
        assert_eq!(pages[4].name, "pip_xq2");
        assert_eq!(pages[12].name, "dc1_xy_ele_chi2_eid");
    }

    #[test]
    fn plots_file_overrides_sections_independently() {
        let yaml = r#"
compare:
  - name: w_compare
    template: "histos_w_{}"
    x_label: W
monitor:
  - kind: single
    name: w
    key: histos_phi_electron_w
    logz: true
"#;
        let plots: PlotsFile = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(plots.compare().len(), 1);
        assert_eq!(plots.compare()[0].template, "histos_w_{}");
        let monitor = plots.monitor();
        assert_eq!(monitor.len(), 1);
        assert!(monitor[0].options.logz);
        assert_eq!(plots.resolution().len(), 5);
    }
}
