use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use vs_app::{
    AppError, AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, config_service,
    query, run_service,
};
use vs_project::RunConfig;

#[derive(Parser)]
#[command(name = "vortstream")]
#[command(about = "2D periodic vorticity transport solver", long_about = None)]
struct Cli {
    /// Log per-phase wall-clock timing (same as VS_TIMING=1)
    #[arg(long, global = true)]
    timing: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a config file with default parameters
    Init {
        /// Path of the YAML or JSON file to create
        config_path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate config file syntax and parameter ranges
    Validate {
        /// Path to the config file
        config_path: PathBuf,
    },
    /// Integrate a config, or load its cached result
    Run {
        /// Path to the config file
        config_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs stored next to a config
    Runs {
        /// Path to the config file
        config_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the config file
        config_path: PathBuf,
        /// Run ID to display
        run_id: String,
        /// Print circulation, enstrophy and extrema for every frame
        #[arg(long)]
        diagnostics: bool,
    },
    /// Export one vorticity frame as CSV (n rows of n values)
    ExportFrame {
        /// Path to the config file
        config_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Frame index (0-based)
        index: usize,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if cli.timing {
        vs_core::timing::enable_timing();
    }

    match cli.command {
        Commands::Init { config_path, force } => cmd_init(&config_path, force),
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            no_cache,
        } => cmd_run(&config_path, !no_cache),
        Commands::Runs { config_path } => cmd_runs(&config_path),
        Commands::ShowRun {
            config_path,
            run_id,
            diagnostics,
        } => cmd_show_run(&config_path, &run_id, diagnostics),
        Commands::ExportFrame {
            config_path,
            run_id,
            index,
            output,
        } => cmd_export_frame(&config_path, &run_id, index, output.as_deref()),
    }
}

fn cmd_init(config_path: &Path, force: bool) -> AppResult<()> {
    if config_path.exists() && !force {
        return Err(AppError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        )));
    }
    config_service::save_config(config_path, &RunConfig::default())?;
    println!("✓ Wrote default config: {}", config_path.display());
    Ok(())
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating config: {}", config_path.display());
    let config = config_service::load_config(config_path)?;
    config_service::validate_config(&config)?;
    let summary = config_service::summarize_config(&config);
    println!("✓ Config is valid");
    println!(
        "  Grid: {n}x{n}, endpt = {}, delta = {:.4}",
        summary.endpt,
        summary.delta,
        n = summary.n
    );
    println!(
        "  Output times: {}  nu = {}  tol = {:e}",
        summary.time_length, summary.nu, summary.tol
    );
    println!(
        "  Initial condition: {} ({} blobs)",
        summary.blob_source, summary.blob_count
    );
    Ok(())
}

fn cmd_run(config_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running vorticity transport: {}", config_path.display());

    let request = RunRequest {
        config_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_fraction = -1.0f64;
    let mut last_stage: Option<RunStage> = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let fraction = event
                .integration
                .as_ref()
                .map(|p| p.fraction_complete)
                .unwrap_or(-1.0);
            let emit_now = last_stage != Some(event.stage)
                || (fraction >= 0.0 && (fraction - last_fraction).abs() >= 0.005)
                || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                if fraction >= 0.0 {
                    last_fraction = fraction;
                }
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    );
    clear_progress_line();
    let response = response.inspect_err(|e| warn!(error = %e, "run failed"))?;
    info!(
        run_id = %response.run_id,
        cached = response.loaded_from_cache,
        total_s = response.total_time_s,
        "run finished"
    );

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    print_timing_summary(&response);

    let (_manifest, frames) = run_service::load_run(config_path, &response.run_id)?;
    let summary = query::get_run_summary(&frames)?;
    println!("  Frames: {}", summary.frame_count);
    println!("  Grid: {0}x{0}", summary.n);
    println!("  Peak |omega|: {:.4e}", summary.peak_abs_vorticity);

    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (&event.stage, &event.integration) {
        (RunStage::Integrating, Some(p)) => {
            let width = 28usize;
            let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.2}/{:.2}  frames={}  steps={}  rejected={}  elapsed={:.1}s",
                bar,
                p.fraction_complete * 100.0,
                p.sim_time,
                p.t_end,
                p.outputs_emitted,
                p.accepted_steps,
                p.rejected_steps,
                event.elapsed_wall_s
            );
            let _ = io::stdout().flush();
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
            let _ = io::stdout().flush();
        }
    }
}

fn print_timing_summary(response: &vs_app::RunResponse) {
    let timing = &response.timing;
    let total = response.total_time_s.max(1.0e-12);

    println!("\nTiming summary:");
    if response.loaded_from_cache {
        println!("  Cache load: {:.3}s", timing.load_time_s);
    } else {
        println!(
            "  Build:     {:.3}s ({:.1}%)",
            timing.build_time_s,
            100.0 * timing.build_time_s / total
        );
        println!(
            "  Integrate: {:.3}s ({:.1}%)",
            timing.integrate_time_s,
            100.0 * timing.integrate_time_s / total
        );
        println!(
            "  Save:      {:.3}s ({:.1}%)",
            timing.save_time_s,
            100.0 * timing.save_time_s / total
        );
    }
    println!("  Total:     {:.3}s", response.total_time_s);
    println!("  Accepted steps: {}", timing.accepted_steps);
    println!("  Rejected steps: {}", timing.rejected_steps);
    println!("  RHS evaluations: {}", timing.rhs_evals);
}

fn cmd_runs(config_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(config_path)?;

    if runs.is_empty() {
        println!("No cached runs found next to {}", config_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({})  {} n={} frames={}",
                manifest.run_id,
                manifest.timestamp,
                manifest.config_name,
                manifest.n,
                manifest.time_length
            );
        }
    }
    Ok(())
}

fn cmd_show_run(config_path: &Path, run_id: &str, diagnostics: bool) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, frames) = run_service::load_run(config_path, run_id)?;
    let summary = query::get_run_summary(&frames)?;

    println!("\nRun Summary:");
    println!("  Config: {}", manifest.config_name);
    println!("  Solver: {}", manifest.solver_version);
    println!("  Timestamp: {}", manifest.timestamp);
    println!(
        "  Grid: {0}x{0}, endpt = {1}, nu = {2}, tol = {3:e}",
        manifest.n, manifest.endpt, manifest.nu, manifest.tol
    );
    println!("  Frames: {}", summary.frame_count);
    println!(
        "  Time range: {:.3} - {:.3}",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Peak |omega|: {:.4e}", summary.peak_abs_vorticity);
    println!(
        "  Steps: {} accepted, {} rejected, {} RHS evaluations",
        manifest.stats.accepted_steps, manifest.stats.rejected_steps, manifest.stats.rhs_evals
    );

    if diagnostics {
        let delta = 2.0 * manifest.endpt / manifest.n as f64;
        println!(
            "\n  {:>8}  {:>12}  {:>12}  {:>12}  {:>12}",
            "time", "circulation", "enstrophy", "min", "max"
        );
        for d in query::diagnostics_series(&frames, delta)? {
            println!(
                "  {:>8.2}  {:>12.4e}  {:>12.4e}  {:>12.4e}  {:>12.4e}",
                d.time, d.circulation, d.enstrophy, d.min, d.max
            );
        }
    }

    Ok(())
}

fn cmd_export_frame(
    config_path: &Path,
    run_id: &str,
    index: usize,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_manifest, frames) = run_service::load_run(config_path, run_id)?;
    let frame = query::get_frame(&frames, index)?;
    let csv = query::frame_to_csv(frame)?;

    if let Some(output_path) = output {
        std::fs::write(output_path, csv)?;
        println!(
            "✓ Exported frame {} (t = {}) to {}",
            index,
            frame.time,
            output_path.display()
        );
    } else {
        print!("{}", csv);
    }

    Ok(())
}
