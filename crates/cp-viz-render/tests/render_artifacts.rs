use cp_core::{Axis, Histogram1D, Histogram2D, HistogramMap, format_key, sectors};
use cp_fit::{FitWindow, GaussianFitter};
use cp_viz::{PageSpec, ResolutionInput, ResolutionOptions, ResolutionSpec, build_resolution, compare_page};
use cp_viz_render::config::VizConfig;
use cp_viz_render::output::OutputFormat;
use cp_viz_render::{PageBook, RenderError, render_svg, render_to_file};

fn sector_maps() -> (HistogramMap, HistogramMap) {
    let mut data = HistogramMap::new();
    let mut sim = HistogramMap::new();
    for s in sectors() {
        for (map, shift) in [(&mut data, 0.0), (&mut sim, 0.02)] {
            let mut p = Histogram1D::new(format_key("histos_p_ele_ctof_{}", s), "", Axis::uniform(40, 0.0, 10.0).unwrap());
            for i in 0..400 {
                p.fill(2.0 + (i % 37) as f64 * 0.15 + shift);
            }
            map.insert(p);

            let mut h2 = Histogram2D::new(
                format_key("histos_theta_electron_delta_p_electron_{}", s),
                "",
                Axis::uniform(30, 5.0, 13.0).unwrap(),
                Axis::uniform(80, -0.8, 0.8).unwrap(),
            );
            // Every column is a Gaussian of width 0.05 around `shift`.
            let centers = h2.y_axis.centers();
            for ix in 1..=30 {
                for (iy, &y) in centers.iter().enumerate() {
                    let v = (300.0 * (-0.5 * ((y - shift) / 0.05).powi(2)).exp()).round();
                    h2.set_bin_content(ix, iy + 1, v).unwrap();
                }
            }
            map.insert(h2);
        }
    }
    (data, sim)
}

#[test]
fn every_kind_renders_to_svg() {
    let (data, sim) = sector_maps();
    let config = VizConfig::default();
    let dir = tempfile::tempdir().unwrap();

    let compare = compare_page("p_ele_compare", "histos_p_ele_ctof_{}", "$p_e$", &[("Data", &data, "k"), ("Sim", &sim, "r")])
        .unwrap();
    let path = dir.path().join("p_ele_compare.svg");
    render_to_file(&serde_json::to_string(&compare).unwrap(), "page", &path, &config).unwrap();
    let svg = std::fs::read_to_string(&path).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Sector 6"));
    // One outline per series per sector.
    assert_eq!(svg.matches("<polyline").count(), 12);

    let spec = ResolutionSpec {
        name: "theta_electron_delta_p_electron".into(),
        template: "histos_theta_electron_delta_p_electron_{}".into(),
        x_range: (6.0, 12.0),
        step: 5,
        y_range: Some((-0.8, 0.8)),
        max_width: 0.4,
        title: "#Delta P_{e} from #theta_{e}".into(),
        x_label: "#theta_{e}".into(),
        y_label: "#Delta P_{e}".into(),
    };
    let inputs = [ResolutionInput { label: "Data", histograms: &data }, ResolutionInput { label: "Sim", histograms: &sim }];
    let options = ResolutionOptions { window: FitWindow::Full, drop_unconverged: false, keep_slices: true };
    let study = build_resolution(&spec, &inputs, &options, &GaussianFitter::default()).unwrap();
    // Bins 4..=27 of the x axis fall in [6, 12]: five groups of up to five bins.
    assert_eq!(study.artifact.n_points(), 6 * 2 * 5);
    assert_eq!(study.artifact.n_dropped(), 0);
    for panel in &study.artifact.panels {
        for (series, shift) in panel.series.iter().zip([0.0, 0.02]) {
            assert!(series.mean.iter().all(|m| (m - shift).abs() < 5e-3), "{}: {:?}", series.label, series.mean);
            assert!(series.width.iter().all(|w| (w - 0.05).abs() < 5e-3), "{}: {:?}", series.label, series.width);
        }
    }

    let svg = render_svg(&serde_json::to_string(&study.artifact).unwrap(), "resolution", &config).unwrap();
    assert!(svg.contains("Sector 1 (Data)"));
    assert!(svg.contains("Sector 1 (Sim)"));
    // One marker per point plus two legend markers per panel.
    assert_eq!(svg.matches("<circle").count(), 60 + 12);

    let slices = &study.slices[0];
    assert_eq!(slices.panels.len(), 5);
    let svg = render_svg(&serde_json::to_string(slices).unwrap(), "slices", &config).unwrap();
    // Every converged fit draws its curve.
    assert_eq!(svg.matches("<polyline").count(), slices.panels.len());
}

#[test]
fn sector_page_with_heat_maps() {
    let (data, _) = sector_maps();
    let page = PageSpec::sector("delta_p", "histos_theta_electron_delta_p_electron_{}")
        .labels("#theta_{e}", "#Delta P_{e}")
        .with(|o| o.logz = true)
        .build(&data, (3, 2))
        .unwrap();
    let svg = render_svg(&serde_json::to_string(&page).unwrap(), "page", &VizConfig::default()).unwrap();
    assert_eq!(svg.matches("<clipPath").count(), 6);
    assert!(svg.contains(r#"baseline-shift="sub""#));
}

#[test]
fn unknown_kind_is_rejected() {
    let err = render_svg("{}", "pulls", &VizConfig::default()).unwrap_err();
    assert!(matches!(err, RenderError::UnknownKind(k) if k == "pulls"));
    assert!(matches!(render_svg("{", "page", &VizConfig::default()), Err(RenderError::Deserialize(_))));
}

#[test]
fn book_writes_numbered_pages() {
    let (data, _) = sector_maps();
    let dir = tempfile::tempdir().unwrap();
    let config = VizConfig::default();
    let mut book = PageBook::new(dir.path(), "monitor", OutputFormat::Svg);
    for template in ["histos_p_ele_ctof_{}", "histos_theta_electron_delta_p_electron_{}"] {
        let page = PageSpec::sector(template, template).build(&data, (3, 2)).unwrap();
        let svg = cp_viz_render::plots::page::render(&page, &config).unwrap();
        book.add_page(svg).unwrap();
    }
    let files = book.finish();
    assert_eq!(files.len(), 2);
    assert!(dir.path().join("monitor_01.svg").exists());
    assert!(dir.path().join("monitor_02.svg").exists());
}

#[cfg(feature = "pdf")]
#[test]
fn pdf_output_has_pdf_header() {
    let (data, _) = sector_maps();
    let page = PageSpec::single("p", "histos_p_ele_ctof_1").build(&data, (1, 1)).unwrap();
    let bytes =
        cp_viz_render::render_to_bytes(&serde_json::to_string(&page).unwrap(), "page", "pdf", &VizConfig::default()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
