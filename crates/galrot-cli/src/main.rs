//! `galrot` command-line tool.

// External dependencies
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

// Internal dependencies
use galrot::prelude::CorrelationReport;
use galrot_cli::prelude::*;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Adaptive length-scale diagnostics for galaxy rotation curves"
)]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Warnings and errors only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// JSON configuration file; missing keys keep their defaults
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags applied on top of the configuration file.
#[derive(Args)]
struct Overrides {
    /// Data root (inputs and derived outputs)
    #[arg(long, global = true, value_hint = ValueHint::DirPath)]
    data_root: Option<PathBuf>,

    /// Deformation strength of the χ → L_eff mapping
    #[arg(long, global = true)]
    alpha: Option<f64>,

    /// Enable the outer taper of L_eff
    #[arg(long, global = true)]
    taper: bool,

    /// Fail on basis radius mismatch instead of resampling
    #[arg(long, global = true)]
    strict_radii: bool,

    /// Recompute basis curves even when cached on disk
    #[arg(long, global = true)]
    no_reuse: bool,

    /// Write PNG charts next to the tables
    #[arg(long, global = true)]
    plots: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List galaxies with a baseline decomposition
    List,

    /// χ and L_eff tables
    Phase3(Galaxies),

    /// Basis curves around the canonical scale
    Basis(Galaxies),

    /// Adaptive curve and outer stability gate
    Phase4(Galaxies),

    /// χ against ΔV inside the inner region
    Test2(Galaxies),

    /// Inner scatter of baseline and adaptive curves
    Test3(Galaxies),

    /// χ against the baseline residuals
    Residuals(Galaxies),

    /// Rebuild the RAR point table from every baseline
    Rar,

    /// Shape summary of every baseline
    Summarize,

    /// Run phase 3, phase 4, Test 2 and Test 3 over many galaxies
    Fleet(FleetArgs),

    /// Charts from the tables on disk
    Plot(Galaxies),

    /// Write the effective configuration as JSON
    Config {
        /// Destination file
        #[arg(value_hint = ValueHint::FilePath)]
        out: PathBuf,
    },
}

#[derive(Args)]
struct Galaxies {
    /// Galaxy names
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Args)]
struct FleetArgs {
    /// Comma-separated galaxy names
    #[arg(long, value_delimiter = ',', conflicts_with = "all", required_unless_present = "all")]
    galaxies: Vec<String>,

    /// Every galaxy with an observed rotation curve
    #[arg(long)]
    all: bool,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let o = &cli.overrides;
    if let Some(root) = &o.data_root {
        config.paths.data_root = root.clone();
    }
    if let Some(alpha) = o.alpha {
        config.leff.alpha = alpha;
        config.fleet.alpha = alpha;
    }
    if o.taper {
        config.leff.taper = true;
        config.fleet.taper = true;
    }
    config.basis.strict_radii |= o.strict_radii;
    if o.no_reuse {
        config.basis.reuse = false;
    }
    config.plots |= o.plots;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Run `f` for each name; report every failure and fail if any occurred.
fn each(names: &[String], mut f: impl FnMut(&str) -> galrot_cli::error::Result<()>) -> Result<()> {
    let mut failed = 0;
    for name in names {
        if let Err(e) = f(name) {
            tracing::error!(galaxy = %name, error = %e, "failed");
            failed += 1;
        }
    }
    if failed > 0 {
        anyhow::bail!("{failed} of {} galaxies failed", names.len());
    }
    Ok(())
}

/// One-line Test-2 report; ΔV is signed.
fn test2_line(name: &str, t: &CorrelationReport<f64>) -> String {
    format!(
        "{name}: r(chi, dV) = {:.4}  N = {}  max|dV| = {:.3} km/s",
        t.r, t.n, t.max_abs_dv
    )
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(Verbosity::from_counts(cli.verbose, cli.quiet))
        .context("initialising logging")?;

    let config = load_config(&cli)?;

    if let Command::Config { out } = &cli.command {
        config
            .write(out)
            .with_context(|| format!("writing {}", out.display()))?;
        return Ok(());
    }
    if let Command::Fleet(args) = &cli.command {
        let selection = if args.all {
            Selection::All
        } else {
            Selection::Names(args.galaxies.clone())
        };
        let runner = FleetRunner::new(&config)?;
        let records = runner.run(&selection).context("fleet run")?;
        let ok = records.iter().filter(|r| r.status == FleetStatus::Ok).count();
        println!("{ok}/{} galaxies OK", records.len());
        return Ok(());
    }

    let pipeline = Pipeline::new(config)?;
    match &cli.command {
        Command::List => {
            for name in pipeline
                .layout()
                .list_galaxies()
                .context("listing baselines")?
            {
                println!("{name}");
            }
        }
        Command::Phase3(g) => each(&g.names, |name| {
            let out = pipeline.phase3(name)?;
            println!("{}", out.result);
            Ok(())
        })?,
        Command::Basis(g) => each(&g.names, |name| {
            for c in pipeline.basis(name)? {
                let origin = if c.generated { "generated" } else { "cached" };
                println!("{:>10.3} kpc  {:<9}  {}", c.l, origin, c.path.display());
            }
            Ok(())
        })?,
        Command::Phase4(g) => each(&g.names, |name| {
            let out = pipeline.phase4(name)?;
            println!("{}", out.result);
            Ok(())
        })?,
        Command::Test2(g) => each(&g.names, |name| {
            println!("{}", test2_line(name, &pipeline.test2(name)?));
            Ok(())
        })?,
        Command::Test3(g) => each(&g.names, |name| {
            let t = pipeline.test3(name)?;
            println!(
                "{name}: sigma_base = {:.4}  sigma_adaptive = {:.4}  delta = {:+.4} dex  (R < {:.2} kpc, N = {})  {}",
                t.sigma_baseline, t.sigma_adaptive, t.delta_sigma, t.r_cut, t.n, t.verdict
            );
            Ok(())
        })?,
        Command::Residuals(g) => each(&g.names, |name| {
            let out = pipeline.residuals(name)?;
            let v = out.velocity;
            let r = out.rar;
            println!(
                "{name}: velocity N = {}  r_signed = {:.4}  r_abs = {:.4}",
                v.n, v.r_signed, v.r_abs
            );
            println!(
                "{name}: RAR N = {}  r = {:.4}  resid in [{:.4}, {:.4}] dex",
                r.n, r.r, r.resid_range.0, r.resid_range.1
            );
            Ok(())
        })?,
        Command::Rar => {
            let out = pipeline.rar().context("rebuilding RAR points")?;
            println!(
                "{} points from {} galaxies -> {}",
                out.points,
                out.galaxies,
                out.path.display()
            );
        }
        Command::Summarize => {
            let rows = pipeline.summarize().context("summarizing baselines")?;
            for row in rows {
                let s = &row.summary;
                let mafe = row
                    .mafe
                    .map(|m| format!("{m:.4}"))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:<14} mafe={:>8}  K/b={:.3}  inner_excess={:+.2}  kernel_active={}  outer_decay={}",
                    row.galaxy, mafe, s.kernel_to_baryon_ratio, s.inner_excess, s.kernel_active, s.outer_decay
                );
            }
        }
        Command::Plot(g) => each(&g.names, |name| pipeline.plot(name))?,
        Command::Fleet(_) | Command::Config { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_applied() {
        let cli = Cli::parse_from([
            "galrot",
            "--alpha",
            "3.0",
            "--no-reuse",
            "--data-root",
            "/tmp/galrot",
            "phase3",
            "NGC0001",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.leff.alpha, 3.0);
        assert_eq!(config.fleet.alpha, 3.0);
        assert!(!config.basis.reuse);
        assert_eq!(config.paths.data_root, PathBuf::from("/tmp/galrot"));
    }

    #[test]
    fn test_test2_reports_signed_dv() {
        let about = Cli::command()
            .find_subcommand("test2")
            .and_then(|c| c.get_about())
            .map(|a| a.to_string());
        assert_eq!(about.as_deref(), Some("χ against ΔV inside the inner region"));

        let report = CorrelationReport {
            r: -0.5,
            n: 7,
            max_abs_dv: 3.25,
        };
        let line = test2_line("G1", &report);
        assert_eq!(line, "G1: r(chi, dV) = -0.5000  N = 7  max|dV| = 3.250 km/s");
    }

    #[test]
    fn test_fleet_selection_flags() {
        let cli = Cli::parse_from(["galrot", "fleet", "--galaxies", "A,B"]);
        match cli.command {
            Command::Fleet(args) => assert_eq!(args.galaxies, vec!["A", "B"]),
            _ => panic!("expected fleet"),
        }
        assert!(Cli::try_parse_from(["galrot", "fleet"]).is_err());
        assert!(Cli::try_parse_from(["galrot", "fleet", "--all", "--galaxies", "A"]).is_err());
    }
}
