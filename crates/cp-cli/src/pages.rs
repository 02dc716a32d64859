use anyhow::Result;
use cp_core::HistogramMap;
use cp_viz::{PageArtifact, PageSpec};
use std::path::PathBuf;

use crate::builtin::PlotsFile;
use crate::render::Renderer;
use crate::resolution::load_map;

/// `rows × cols` of monitoring pages.
const MONITOR_GRID: (usize, usize) = (3, 2);
/// `rows × cols` of presentation and pion pages.
const WIDE_GRID: (usize, usize) = (2, 3);

/// Build a page, or `None` (with a warning) when one of its histograms is
/// missing from the file or cannot be drawn, such as an empty histogram on
/// a page normalized by entries.
fn build_or_skip(spec: &PageSpec, histograms: &HistogramMap, grid: (usize, usize)) -> Result<Option<PageArtifact>> {
    match spec.build(histograms, grid) {
        Ok(page) => Ok(Some(page)),
        Err(cp_core::Error::KeyNotFound(key)) => {
            tracing::warn!(page = %spec.name, key = %key, "histogram not found; skipping page");
            Ok(None)
        }
        Err(cp_core::Error::Validation(reason)) => {
            tracing::warn!(page = %spec.name, %reason, "histogram cannot be drawn; skipping page");
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn stem(name: &str, prefix: Option<&str>) -> String {
    match prefix {
        Some(prefix) => format!("{name}_{prefix}"),
        None => name.to_string(),
    }
}

/// Render every monitoring page into a numbered page book
/// `<prefix>_01.pdf`, `<prefix>_02.pdf`, ...
pub fn cmd_monitor(input: &PathBuf, output_prefix: &str, plots: Option<&PathBuf>, renderer: &Renderer) -> Result<()> {
    let specs = PlotsFile::load(plots)?.monitor();
    let histograms = load_map(input)?;

    let mut book = renderer.book(output_prefix);
    let mut skipped = 0;
    for spec in &specs {
        let Some(page) = build_or_skip(spec, &histograms, MONITOR_GRID)? else {
            skipped += 1;
            continue;
        };
        let svg = cp_viz_render::plots::page::render(&page, &renderer.config)?;
        let path = book.add_page(svg)?;
        tracing::debug!(page = %spec.name, path = %path.display(), "page written");
    }
    tracing::info!(pages = book.len(), skipped, "monitoring book done");
    if book.is_empty() {
        anyhow::bail!("none of the {} monitoring pages could be drawn from {}", specs.len(), input.display());
    }
    for path in book.finish() {
        println!("{}", path.display());
    }
    Ok(())
}

/// Render each page to its own file named after the page.
fn cmd_named_pages(
    specs: &[PageSpec],
    input: &PathBuf,
    output_prefix: Option<&str>,
    renderer: &Renderer,
) -> Result<()> {
    let histograms = load_map(input)?;
    let mut written = 0;
    for spec in specs {
        let Some(page) = build_or_skip(spec, &histograms, WIDE_GRID)? else {
            continue;
        };
        let path = renderer.write(&page, &stem(&spec.name, output_prefix))?;
        println!("{}", path.display());
        written += 1;
    }
    if written == 0 {
        anyhow::bail!("none of the {} pages could be drawn from {}", specs.len(), input.display());
    }
    Ok(())
}

pub fn cmd_present(
    input: &PathBuf,
    output_prefix: Option<&str>,
    plots: Option<&PathBuf>,
    renderer: &Renderer,
) -> Result<()> {
    let specs = PlotsFile::load(plots)?.present();
    cmd_named_pages(&specs, input, output_prefix, renderer)
}

pub fn cmd_pions(input: &PathBuf, output_prefix: Option<&str>, plots: Option<&PathBuf>, renderer: &Renderer) -> Result<()> {
    let specs = PlotsFile::load(plots)?.pions();
    cmd_named_pages(&specs, input, output_prefix, renderer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cp_core::{Axis, Histogram1D, Histogram2D};

    #[test]
    fn missing_histograms_skip_the_page() {
        let mut map = HistogramMap::new();
        map.insert(Histogram1D::new("histos_w", "", Axis::uniform(10, 0.0, 2.0).unwrap()));
        let present = PageSpec::single("w", "histos_w");
        let absent = PageSpec::sector("vz", "histos_vz_electron_{}");
        assert!(build_or_skip(&present, &map, WIDE_GRID).unwrap().is_some());
        assert!(build_or_skip(&absent, &map, WIDE_GRID).unwrap().is_none());
    }

    #[test]
    fn empty_normalized_histogram_skips_the_page() {
        let mut map = HistogramMap::new();
        let axis = || Axis::uniform(10, -1.0, 1.0).unwrap();
        map.insert(Histogram2D::new("pions_dc1_xy_ele_chi2", "", axis(), axis()));
        let mut filled = Histogram2D::new("pions_dc2_xy_ele_chi2", "", axis(), axis());
        filled.fill(0.1, 0.2);
        map.insert(filled);

        let empty = PageSpec::single("dc1_chi2", "pions_dc1_xy_ele_chi2").with(|o| o.scale_by_entries = true);
        let full = PageSpec::single("dc2_chi2", "pions_dc2_xy_ele_chi2").with(|o| o.scale_by_entries = true);
        assert!(build_or_skip(&empty, &map, WIDE_GRID).unwrap().is_none());
        assert!(build_or_skip(&full, &map, WIDE_GRID).unwrap().is_some());
    }

    #[test]
    fn prefix_is_appended_to_the_stem() {
        assert_eq!(stem("de_beam", None), "de_beam");
        assert_eq!(stem("de_beam", Some("run5038")), "de_beam_run5038");
    }
}
