//! # CLI Execution Functions
//!
//! Kept out of `main.rs` so the entry point stays a thin clap definition.
//! Each `run_*` function resolves flags against the optional config file,
//! drives one library operation, and prints the result to stdout. Logs go
//! to stderr through `tracing`.

use anyhow::{bail, Result};
use rootquorum::config::{seconds, AnnouncerConfig, Config};
use rootquorum::events::{Event, EventBus};
use rootquorum::parallel;
use rootquorum::progress::Progress;
use rootquorum::search::{self, SearchOptions, DEFAULT_WORKERS};
use rootquorum::stop::Deadline;
use rootquorum::ticker::Ticker;
use rootquorum::{format_list, Polynomial, Preset};
use rug::Integer;
use std::path::Path;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Exit status when a deadline cut a search short.
const EXIT_CANCELLED: u8 = 2;

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let config = Config::load(path)?;
            info!(path = %path.display(), "configuration loaded");
            Ok(config)
        }
        None => Ok(Config::default()),
    }
}

/// Pick the polynomial: flags first, then the config file, then preset p1.
fn resolve_polynomial(
    preset: Option<&str>,
    coeffs: Option<&str>,
    config: &Config,
) -> Result<(String, Polynomial, Option<Preset>)> {
    if let Some(csv) = coeffs {
        return Ok(("custom".to_string(), Polynomial::parse(csv)?, None));
    }
    if preset.is_none() {
        if let Some(csv) = config.search.coeffs.as_deref() {
            return Ok(("custom".to_string(), Polynomial::parse(csv)?, None));
        }
    }
    let name = preset
        .or(config.search.preset.as_deref())
        .unwrap_or("p1");
    let preset: Preset = name.parse()?;
    Ok((preset.name().to_string(), preset.polynomial(), Some(preset)))
}

// ── Search ──────────────────────────────────────────────────────

pub struct SearchArgs<'a> {
    pub preset: Option<&'a str>,
    pub coeffs: Option<&'a str>,
    pub target: Option<usize>,
    pub workers: Option<usize>,
    pub trace: bool,
    pub deadline_secs: Option<f64>,
    pub json: bool,
    pub progress_secs: u64,
}

pub fn run_search(config: &Config, args: &SearchArgs<'_>) -> Result<ExitCode> {
    let file = &config.search;
    let (name, poly, preset) = resolve_polynomial(args.preset, args.coeffs, config)?;
    let target = args.target.or(file.target).unwrap_or_else(|| poly.degree());
    let workers = args.workers.or(file.workers).unwrap_or(DEFAULT_WORKERS);
    if workers == 0 {
        bail!("--workers must be at least 1");
    }
    let trace = args.trace || file.trace.unwrap_or(false);
    let deadline_secs = args.deadline_secs.or(file.deadline_secs);
    let deadline = deadline_secs
        .map(|secs| seconds(secs, "--deadline-secs"))
        .transpose()?
        .map(Deadline::after);

    if deadline.is_none() && preset.is_some_and(|p| !p.terminates()) && target > 0 {
        warn!(
            preset = %name,
            "this polynomial has fewer integer roots than the target; the search will not terminate"
        );
    }

    let events = EventBus::new();
    let progress = Progress::new();
    let reporter = (args.progress_secs > 0)
        .then(|| progress.start_reporter(Duration::from_secs(args.progress_secs)));

    let mut options = SearchOptions::with_workers(workers)
        .events(&events)
        .progress(&progress)
        .trace(trace);
    if let Some(deadline) = deadline.as_ref() {
        options = options.stop(deadline);
    }

    events.emit(Event::SearchStarted {
        description: poly.to_string(),
        target,
        workers,
    });
    let outcome = search::run(&poly, target, &options)?;

    if let Some(reporter) = reporter {
        reporter.stop();
    }

    if args.json {
        let report = serde_json::json!({
            "polynomial": poly.to_string(),
            "name": name,
            "degree": poly.degree(),
            "target": target,
            "workers": workers,
            "roots": outcome.hits.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
            "complete": outcome.is_complete(),
            "tested": outcome.tested,
            "elapsed_secs": outcome.elapsed.as_secs_f64(),
            "events": events.history(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "Polynomial={} ({}) | degree={} | target={} | workers={}",
            name,
            poly,
            poly.degree(),
            target,
            workers
        );
        println!(
            "Roots found: {} | Time: {:.6}s",
            format_list(&outcome.hits),
            outcome.elapsed.as_secs_f64()
        );
        if outcome.cancelled() {
            println!(
                "Search cancelled after the deadline with {} of {} roots",
                outcome.hits.len(),
                target
            );
        }
    }

    if outcome.cancelled() {
        Ok(ExitCode::from(EXIT_CANCELLED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

// ── Presets ─────────────────────────────────────────────────────

pub fn run_presets() -> Result<ExitCode> {
    for preset in Preset::ALL {
        let poly = preset.polynomial();
        println!(
            "{}  degree={}  terminates={}  {}",
            preset.name(),
            poly.degree(),
            if preset.terminates() { "yes" } else { "no" },
            poly
        );
    }
    Ok(ExitCode::SUCCESS)
}

// ── Announce ────────────────────────────────────────────────────

pub fn run_announce(config: &Config, labels: &[String], duration: f64) -> Result<ExitCode> {
    let duration = seconds(duration, "--duration")?;
    let announcers: Vec<AnnouncerConfig> = if !labels.is_empty() {
        labels
            .iter()
            .map(|l| AnnouncerConfig::parse(l))
            .collect::<Result<_>>()?
    } else if !config.announcer.is_empty() {
        config.announcer.clone()
    } else {
        vec![
            AnnouncerConfig::parse("ROJO:3")?,
            AnnouncerConfig::parse("AZUL:5")?,
        ]
    };

    println!("Starting announcers...");
    let mut tickers = Vec::with_capacity(announcers.len());
    for a in &announcers {
        println!("  {} every {}s", a.label, a.period_secs);
        tickers.push(Ticker::spawn(a.label.clone(), a.period()?, |label, elapsed| {
            println!("{} {:02}", label, elapsed.as_secs());
        }));
    }

    thread::sleep(duration);

    for ticker in tickers {
        let label = ticker.label().to_string();
        let ticks = ticker.stop();
        info!(%label, ticks, "announcer stopped");
    }
    println!("Program finished");
    Ok(ExitCode::SUCCESS)
}

// ── Compare ─────────────────────────────────────────────────────

pub fn run_compare(
    preset: Option<&str>,
    coeffs: Option<&str>,
    count: u64,
    workers: usize,
) -> Result<ExitCode> {
    let (name, poly, _) = resolve_polynomial(preset, coeffs, &Config::default())?;
    let candidates: Vec<Integer> = (1..=count)
        .flat_map(|n| [Integer::from(n), -Integer::from(n)])
        .collect();
    println!(
        "Evaluating {} ({}) at {} candidates",
        name,
        poly,
        candidates.len()
    );

    let evaluate = |x: &Integer| -> Result<bool> { Ok(poly.is_root(x)) };

    let seq_start = Instant::now();
    let sequential = parallel::map_items_sequential(&candidates, evaluate);
    info!(elapsed_ms = seq_start.elapsed().as_millis() as u64, "sequential pass done");
    let par = parallel::map_items(&candidates, workers, evaluate)?;

    let roots = |hits: &[Result<bool>]| -> Vec<Integer> {
        candidates
            .iter()
            .zip(hits)
            .filter(|(_, hit)| matches!(hit, Ok(true)))
            .map(|(c, _)| c.clone())
            .collect()
    };
    let seq_roots = roots(&sequential.outcomes);
    let par_roots = roots(&par.outcomes);
    if seq_roots != par_roots {
        bail!(
            "sequential and parallel passes disagree: {} vs {}",
            format_list(&seq_roots),
            format_list(&par_roots)
        );
    }

    println!("Roots in range: {}", format_list(&par_roots));
    println!(
        "Sequential:  {:.4}s  ({} evaluated, {} errors)",
        sequential.wall.as_secs_f64(),
        sequential.processed,
        sequential.errors
    );
    println!(
        "Parallel:    {:.4}s  ({} workers)",
        par.wall.as_secs_f64(),
        workers
    );
    println!("Speedup:     {:.2}x", par.speedup_over(&sequential));
    println!("Efficiency:  {:.1}%", par.efficiency_over(&sequential));
    Ok(ExitCode::SUCCESS)
}
