use anyhow::{Context, Result};
use cp_core::stats::parse_values;
use cp_core::{Axis, Histogram1D, HistogramMap};
use cp_root::{Precision, RootFile, RootFileBuilder};
use cp_viz::{PageSpec, QuantileBinsArtifact};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;

use crate::render::Renderer;
use crate::resolution::load_map;
use crate::write_json;

/// Fill a 100-bin Gaussian histogram on `[-5, 5]` and draw it.
pub fn cmd_smoke(output_prefix: &str, entries: usize, seed: Option<u64>, root: bool, renderer: &Renderer) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut hist = Histogram1D::new("hist", "hist", Axis::uniform(100, -5.0, 5.0)?);
    hist.fill_gaussian(entries, 0.0, 1.0, &mut rng)?;
    tracing::info!(entries, mean = hist.mean(), std_dev = hist.std_dev(), "filled");

    let histograms = if root {
        let path = renderer.path(output_prefix).with_extension("root");
        RootFileBuilder::new()
            .add_h1(&hist, Precision::Float)
            .write(&path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("{}", path.display());
        load_map(&path)?
    } else {
        let mut map = HistogramMap::new();
        map.insert(hist);
        map
    };

    let page = PageSpec::single(output_prefix, "hist").build(&histograms, (1, 1))?;
    let path = renderer.write(&page, output_prefix)?;
    println!("{}", path.display());
    Ok(())
}

pub struct BinsArgs<'a> {
    pub input: &'a PathBuf,
    pub n_bins: usize,
    pub display_bins: usize,
    pub range: (f64, f64),
    pub x_label: &'a str,
    pub plot: Option<&'a str>,
    pub output: Option<&'a PathBuf>,
}

/// Quantile bin edges of a whitespace-separated list of values.
pub fn cmd_bins(args: &BinsArgs<'_>, renderer: &Renderer) -> Result<()> {
    if args.n_bins == 0 {
        anyhow::bail!("n-bins must be >= 1");
    }
    let raw = std::fs::read_to_string(args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let values = parse_values(&raw).with_context(|| format!("failed to parse {}", args.input.display()))?;
    if values.is_empty() {
        anyhow::bail!("{} contains no values", args.input.display());
    }

    let artifact = QuantileBinsArtifact::build(&values, args.n_bins, args.display_bins, args.range, args.x_label)?;
    if let Some(stem) = args.plot {
        renderer.write(&artifact, stem)?;
    }
    write_json(
        args.output,
        serde_json::json!({
            "n_values": artifact.n_values,
            "n_bins": args.n_bins,
            "edges": artifact.edges,
        }),
    )
}

/// Histogram mapping of a file: one entry per top-level key.
pub fn cmd_keys(input: &PathBuf, output: Option<&PathBuf>) -> Result<()> {
    let file = RootFile::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let histograms = file.histograms()?;
    let keys: Vec<serde_json::Value> = file
        .list_keys()?
        .into_iter()
        .map(|key| {
            let shape = histograms.get(&key.name).ok().map(|h| h.shape());
            serde_json::json!({
                "name": key.name,
                "class": key.class_name,
                "title": key.title,
                "bins": shape,
            })
        })
        .collect();
    write_json(output, serde_json::Value::Array(keys))
}

pub struct QuickArgs<'a> {
    pub input: &'a PathBuf,
    pub key: &'a str,
    pub y_range: Option<(f64, f64)>,
    pub label: &'a str,
    pub output_prefix: Option<&'a str>,
}

/// One histogram on one page, named after the key without its
/// `histos_` prefix unless a prefix is given.
pub fn cmd_quick(args: &QuickArgs<'_>, renderer: &Renderer) -> Result<()> {
    let histograms = load_map(args.input)?;
    let stem = args.output_prefix.unwrap_or_else(|| args.key.strip_prefix("histos_").unwrap_or(args.key));
    let page = PageSpec::single(stem, args.key)
        .labels(args.label, "")
        .with(|o| o.y_range = args.y_range.map(|(lo, hi)| [lo, hi]))
        .build(&histograms, (1, 1))
        .with_context(|| format!("cannot draw {} from {}", args.key, args.input.display()))?;
    let path = renderer.write(&page, stem)?;
    println!("{}", path.display());
    Ok(())
}

/// Render an artifact JSON written by `--json` (or by hand).
pub fn cmd_render(input: &PathBuf, kind: &str, output: &PathBuf, renderer: &Renderer) -> Result<()> {
    let json = std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    cp_viz_render::render_to_file(&json, kind, output, &renderer.config)
        .with_context(|| format!("failed to render {} as {kind}", input.display()))?;
    println!("{}", output.display());
    Ok(())
}
