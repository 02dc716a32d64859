use anyhow::{Context, Result};
use cp_core::HistogramMap;
use cp_fit::{FitWindow, GaussianFitter};
use cp_viz::{ResolutionInput, ResolutionOptions, build_resolution, compare_page};
use std::path::PathBuf;

use crate::builtin::PlotsFile;
use crate::render::Renderer;

pub(crate) fn load_map(path: &PathBuf) -> Result<HistogramMap> {
    cp_root::load_histograms(path).with_context(|| format!("failed to load histograms from {}", path.display()))
}

pub struct ResolutionArgs<'a> {
    pub data_file: &'a PathBuf,
    pub sim_file: &'a PathBuf,
    pub output_prefix: &'a str,
    pub slices: bool,
    pub fit_window: Option<f64>,
    pub drop_unconverged: bool,
    pub json: bool,
    pub plots: Option<&'a PathBuf>,
}

pub fn cmd_resolution(args: &ResolutionArgs<'_>, renderer: &Renderer) -> Result<()> {
    let window = match args.fit_window {
        None => FitWindow::Full,
        Some(k) if k > 0.0 && k.is_finite() => FitWindow::StdDevs(k),
        Some(k) => anyhow::bail!("fit window must be a positive number of standard deviations, got {k}"),
    };
    let specs = PlotsFile::load(args.plots)?.resolution();

    let data = load_map(args.data_file)?;
    let sim = load_map(args.sim_file)?;
    let inputs = [ResolutionInput { label: "Data", histograms: &data }, ResolutionInput { label: "Sim", histograms: &sim }];
    let options = ResolutionOptions { window, drop_unconverged: args.drop_unconverged, keep_slices: args.slices };
    let fitter = GaussianFitter::default();

    for spec in &specs {
        let study = build_resolution(spec, &inputs, &options, &fitter)
            .with_context(|| format!("resolution study {} failed", spec.name))?;
        tracing::info!(
            name = %spec.name,
            points = study.artifact.n_points(),
            dropped = study.artifact.n_dropped(),
            "slice fits done"
        );

        let stem = format!("{}_fit_{}", spec.name, args.output_prefix);
        let path = renderer.write(&study.artifact, &stem)?;
        println!("{}", path.display());
        if args.json {
            renderer.write_json(&study.artifact, &stem)?;
        }

        for slices in &study.slices {
            let stem = format!("{}_slices_{}", slices.name, args.output_prefix);
            renderer.write(slices, &stem)?;
            if args.json {
                renderer.write_json(slices, &stem)?;
            }
        }
    }
    Ok(())
}

pub fn cmd_compare(
    data_file: &PathBuf,
    sim_file: &PathBuf,
    output_prefix: &str,
    plots: Option<&PathBuf>,
    renderer: &Renderer,
) -> Result<()> {
    let specs = PlotsFile::load(plots)?.compare();
    let data = load_map(data_file)?;
    let sim = load_map(sim_file)?;
    let data_color = renderer.config.colors.data.to_hex();
    let sim_color = renderer.config.colors.sim.to_hex();
    let inputs = [("Data", &data, data_color.as_str()), ("Sim", &sim, sim_color.as_str())];

    let mut written = 0;
    for spec in &specs {
        let page = match compare_page(spec.name.as_str(), &spec.template, &spec.x_label, &inputs) {
            Ok(page) => page,
            Err(cp_core::Error::KeyNotFound(key)) => {
                tracing::warn!(page = %spec.name, key = %key, "histogram not found; skipping page");
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let path = renderer.write(&page, &format!("{}-{output_prefix}", spec.name))?;
        println!("{}", path.display());
        written += 1;
    }
    if written == 0 {
        anyhow::bail!("no comparison page could be drawn");
    }
    Ok(())
}
