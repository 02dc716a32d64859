//! clasplot CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod builtin;
mod pages;
mod render;
mod resolution;
mod tools;

use render::Renderer;

#[derive(Parser)]
#[command(name = "clasplot")]
#[command(about = "clasplot - CLAS12 histogram plots, slice fits and resolution pages")]
#[command(version)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    /// Style theme (clas12, root, minimal)
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Style config YAML; keys override the theme
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format of plots (pdf, svg). Defaults to the config's.
    #[arg(long, global = true)]
    format: Option<String>,

    /// Directory plots are written to
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Slice-fit data and simulation resolutions, one 3x2 sector page per study
    Resolution {
        /// Data ROOT file
        #[arg(short = 'd', long = "data_file", visible_alias = "data-file")]
        data_file: PathBuf,

        /// Simulation ROOT file
        #[arg(short = 's', long = "sim_file", visible_alias = "sim-file")]
        sim_file: PathBuf,

        /// Suffix of the output names: `<study>_fit_<prefix>.pdf`
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix")]
        output_prefix: String,

        /// Also draw every projection with its fit
        #[arg(long)]
        slices: bool,

        /// Fit only bins within K standard deviations of each projection's mean
        #[arg(long, value_name = "K")]
        fit_window: Option<f64>,

        /// Also drop points whose fit did not converge
        #[arg(long)]
        drop_unconverged: bool,

        /// Write the artifacts as JSON next to the plots
        #[arg(long)]
        json: bool,

        /// YAML plots file replacing the built-in study list
        #[arg(long)]
        plots: Option<PathBuf>,
    },

    /// Data vs simulation shapes per sector, each normalized to its maximum
    Compare {
        /// Data ROOT file
        #[arg(short = 'd', long = "data_file", visible_alias = "data-file")]
        data_file: PathBuf,

        /// Simulation ROOT file
        #[arg(short = 's', long = "sim_file", visible_alias = "sim-file")]
        sim_file: PathBuf,

        /// Suffix of the output names: `<page>-<prefix>.pdf`
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix")]
        output_prefix: String,

        /// YAML plots file replacing the built-in page list
        #[arg(long)]
        plots: Option<PathBuf>,
    },

    /// Monitoring book: sector and single-histogram pages of one file
    Monitor {
        /// Input ROOT file
        #[arg(short = 'i', long = "input_file", visible_alias = "input-file")]
        input_file: PathBuf,

        /// Stem of the numbered pages: `<prefix>_NN.pdf`
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix", default_value = "monitor")]
        output_prefix: String,

        /// YAML plots file replacing the built-in page list
        #[arg(long)]
        plots: Option<PathBuf>,
    },

    /// Presentation pages: overlays and sector pages
    Present {
        /// Input ROOT file
        #[arg(short = 'i', long = "input_file", visible_alias = "input-file")]
        input_file: PathBuf,

        /// Suffix appended to every page name
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix")]
        output_prefix: Option<String>,

        /// YAML plots file replacing the built-in page list
        #[arg(long)]
        plots: Option<PathBuf>,
    },

    /// Pion kinematics: per-sector pi+/pi- overlays, log-z maps and chi2 maps
    Pions {
        /// Input ROOT file
        #[arg(short = 'i', long = "input_file", visible_alias = "input-file")]
        input_file: PathBuf,

        /// Suffix appended to every page name
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix")]
        output_prefix: Option<String>,

        /// YAML plots file replacing the built-in page list
        #[arg(long)]
        plots: Option<PathBuf>,
    },

    /// Equal-population bin edges of a list of values
    Bins {
        /// Text file of whitespace-separated values (trailing commas allowed)
        #[arg(short = 'i', long = "input_file", visible_alias = "input-file")]
        input_file: PathBuf,

        /// Number of quantile bins
        #[arg(long, default_value = "10")]
        n_bins: usize,

        /// Bins of the drawn value histogram
        #[arg(long, default_value = "99")]
        display_bins: usize,

        /// Range of the drawn value histogram
        #[arg(long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true, default_values_t = [0.0, 10.0])]
        range: Vec<f64>,

        /// x-axis label of the drawn histogram
        #[arg(long, default_value = "Q^{2}")]
        x_label: String,

        /// Also draw the histogram with its edges to `<PLOT>.pdf`
        #[arg(long)]
        plot: Option<String>,

        /// Output file for the edges (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// One histogram on one page
    Quick {
        /// Input ROOT file
        #[arg(short = 'i', long = "input_file", visible_alias = "input-file")]
        input_file: PathBuf,

        /// Histogram key
        #[arg(long, default_value = "histos_angle_ep_gen")]
        key: String,

        /// Fixed y range
        #[arg(long, num_args = 2, value_names = ["LO", "HI"], allow_negative_numbers = true)]
        y_range: Option<Vec<f64>>,

        /// x-axis label
        #[arg(long, default_value = "#phi_{ep} (generated)")]
        label: String,

        /// Output name; defaults to the key without `histos_`
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix")]
        output_prefix: Option<String>,
    },

    /// Fill a Gaussian test histogram and draw it
    Smoke {
        /// Output name
        #[arg(short = 'o', long = "output_prefix", visible_alias = "output-prefix", default_value = "test")]
        output_prefix: String,

        /// Number of entries
        #[arg(long, default_value = "1000")]
        entries: usize,

        /// RNG seed (random when omitted)
        #[arg(long)]
        seed: Option<u64>,

        /// Also write the histogram to `<name>.root` and draw it from there
        #[arg(long)]
        root: bool,
    },

    /// List the histograms of a ROOT file (name, class, title, bins)
    Keys {
        /// Input ROOT file
        #[arg(short = 'i', long = "input_file", visible_alias = "input-file")]
        input_file: PathBuf,

        /// Output file (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render an artifact JSON (page, resolution, slices, quantile_bins)
    Render {
        /// Artifact JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Artifact kind
        #[arg(long)]
        kind: String,

        /// Output file; the format follows the extension
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print version
    Version,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let renderer = || {
        Renderer::new(cli.theme.as_deref(), cli.config.as_ref(), cli.format.as_deref(), &cli.output_dir)
    };

    match cli.command {
        Commands::Resolution {
            data_file,
            sim_file,
            output_prefix,
            slices,
            fit_window,
            drop_unconverged,
            json,
            plots,
        } => resolution::cmd_resolution(
            &resolution::ResolutionArgs {
                data_file: &data_file,
                sim_file: &sim_file,
                output_prefix: &output_prefix,
                slices,
                fit_window,
                drop_unconverged,
                json,
                plots: plots.as_ref(),
            },
            &renderer()?,
        ),
        Commands::Compare { data_file, sim_file, output_prefix, plots } => {
            resolution::cmd_compare(&data_file, &sim_file, &output_prefix, plots.as_ref(), &renderer()?)
        }
        Commands::Monitor { input_file, output_prefix, plots } => {
            pages::cmd_monitor(&input_file, &output_prefix, plots.as_ref(), &renderer()?)
        }
        Commands::Present { input_file, output_prefix, plots } => {
            pages::cmd_present(&input_file, output_prefix.as_deref(), plots.as_ref(), &renderer()?)
        }
        Commands::Pions { input_file, output_prefix, plots } => {
            pages::cmd_pions(&input_file, output_prefix.as_deref(), plots.as_ref(), &renderer()?)
        }
        Commands::Bins { input_file, n_bins, display_bins, range, x_label, plot, output } => tools::cmd_bins(
            &tools::BinsArgs {
                input: &input_file,
                n_bins,
                display_bins,
                range: pair(&range, "range")?,
                x_label: &x_label,
                plot: plot.as_deref(),
                output: output.as_ref(),
            },
            &renderer()?,
        ),
        Commands::Quick { input_file, key, y_range, label, output_prefix } => tools::cmd_quick(
            &tools::QuickArgs {
                input: &input_file,
                key: &key,
                y_range: y_range.as_deref().map(|r| pair(r, "y-range")).transpose()?,
                label: &label,
                output_prefix: output_prefix.as_deref(),
            },
            &renderer()?,
        ),
        Commands::Smoke { output_prefix, entries, seed, root } => {
            tools::cmd_smoke(&output_prefix, entries, seed, root, &renderer()?)
        }
        Commands::Render { input, kind, output } => tools::cmd_render(&input, &kind, &output, &renderer()?),
        Commands::Keys { input_file, output } => tools::cmd_keys(&input_file, output.as_ref()),
        Commands::Version => {
            println!("clasplot {}", cp_core::VERSION);
            Ok(())
        }
    }
}

fn pair(values: &[f64], name: &str) -> Result<(f64, f64)> {
    match values {
        &[lo, hi] if lo < hi => Ok((lo, hi)),
        _ => anyhow::bail!("{name} needs LO < HI, got {values:?}"),
    }
}

fn write_json(output: Option<&PathBuf>, value: serde_json::Value) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, serde_json::to_string_pretty(&value)?)?;
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }
    Ok(())
}
