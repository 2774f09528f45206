use anyhow::{Context, Result};
use clap::{Args, ColorChoice, CommandFactory, FromArgMatches, Parser, Subcommand};
use colored::Colorize;
use is_terminal::IsTerminal;
use markersense::config::{Config, ConfigError};
use markersense::engine::SkippedDetection;
use markersense::presenter::{LifecycleEvent, LifecycleKind, RecordingPresenter, VisualHandle};
use markersense::status::StatusPanel;
use markersense::{EvictionPolicy, MarkerRecord, ReconcileEngine, filter::MarkerTypes};
use markersense::{replay, schema};
use serde::Serialize;
use std::io::stdout;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(
    name = "markersense",
    about = "Turn marker tracker detections into persistent markers",
    arg_required_else_help = true
)]
struct Cli {
    /// Disable color
    #[arg(long = "no-color", global = true)]
    no_color: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded detection batches through the reconciliation engine
    Replay(ReplayArgs),
    /// Print the JSON Schema of a detection batch
    Schema,
    /// Show the effective configuration
    Config(ConfigArgs),
}

#[derive(Args, Clone)]
struct ReplayArgs {
    /// JSON-lines file of detection batches ("-" reads stdin)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Eviction policy: immediate or timeout
    #[arg(long, value_name = "POLICY")]
    policy: Option<String>,

    /// Seconds a marker may go unobserved under the timeout policy
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Comma-separated marker types to track: aruco,qr,ean13,upca or all
    #[arg(long, value_name = "list")]
    types: Option<String>,

    /// Read configuration from this file instead of the user config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    json: bool,

    /// Only print the final status
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Clone)]
struct ConfigArgs {
    /// Print the config file location instead of its contents
    #[arg(long)]
    path: bool,
}

#[derive(Serialize)]
struct TickEvent {
    tick: usize,
    #[serde(flatten)]
    event: LifecycleEvent,
}

#[derive(Serialize)]
struct TickSkip {
    tick: usize,
    #[serde(flatten)]
    skipped: SkippedDetection,
}

#[derive(Serialize)]
struct ReplayReport<'a> {
    version: &'static str,
    ticks: usize,
    events: Vec<TickEvent>,
    skipped: Vec<TickSkip>,
    records: Vec<&'a MarkerRecord<VisualHandle>>,
}

fn resolve_config(args: &ReplayArgs) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load(),
    };

    if let Some(policy) = &args.policy {
        config.tracking.eviction = policy.parse::<EvictionPolicy>()?;
    }
    if let Some(timeout) = args.timeout {
        config.tracking.timeout_secs = timeout;
    }
    if let Some(types) = &args.types {
        config.scanner.marker_types = MarkerTypes::parse_list(types)?.types();
    }
    config.validate()?;
    Ok(config)
}

fn event_line(tick: usize, event: &LifecycleEvent, color: bool) -> String {
    let (sign, label) = match event.event {
        LifecycleKind::Created => ("+", "created"),
        LifecycleKind::Updated => ("~", "updated"),
        LifecycleKind::Destroyed => ("-", "destroyed"),
    };
    let line = format!("[{tick:>4}] {sign} {} {} ({label})", event.key, event.visual);
    if !color {
        return line;
    }
    match event.event {
        LifecycleKind::Created => line.green().to_string(),
        LifecycleKind::Updated => line.dimmed().to_string(),
        LifecycleKind::Destroyed => line.red().to_string(),
    }
}

fn skip_line(tick: usize, skipped: &SkippedDetection, color: bool) -> String {
    let line = format!(
        "[{tick:>4}] ! detection {} skipped: {}",
        skipped.index, skipped.error
    );
    if color { line.yellow().to_string() } else { line }
}

fn run_replay(args: ReplayArgs, color: ColorChoice) -> Result<()> {
    let config = resolve_config(&args)?;
    let engine_config = config.tracking.engine_config()?;
    let enabled = config.scanner.enabled_types();
    let mut engine = ReconcileEngine::new(engine_config, RecordingPresenter::new());

    let want_color = !args.json
        && config.output.color
        && stdout().is_terminal()
        && !matches!(color, ColorChoice::Never)
        && supports_color::on(supports_color::Stream::Stdout).is_some();

    let mut events = Vec::new();
    let mut skipped = Vec::new();
    let mut ticks = 0;

    for batch in replay::open(&args.input)? {
        let batch = batch.with_context(|| format!("reading {}", args.input.display()))?;
        ticks += 1;
        let batch = enabled.filter(&batch);
        let report = engine.tick(Some(&batch), batch.time);

        for event in engine.presenter_mut().drain_events() {
            if !args.json && !args.quiet {
                println!("{}", event_line(ticks, &event, want_color));
            }
            events.push(TickEvent { tick: ticks, event });
        }
        for skip in report.skipped {
            if !args.json && !args.quiet {
                println!("{}", skip_line(ticks, &skip, want_color));
            }
            skipped.push(TickSkip {
                tick: ticks,
                skipped: skip,
            });
        }
    }
    tracing::info!(ticks, markers = engine.len(), "replay finished");

    let records = engine.sorted_records();
    if args.json {
        let report = ReplayReport {
            version: schema::SCHEMA_VERSION,
            ticks,
            events,
            skipped,
            records,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        let panel = StatusPanel {
            settings: &config.scanner,
            engine: engine.config(),
            show_settings: config.output.show_settings,
            color: want_color,
        };
        if !args.quiet && ticks > 0 {
            println!();
        }
        println!("{}", panel.render(&records));
    }
    Ok(())
}

fn run_schema() -> Result<()> {
    println!("{}", schema::batch_schema_json()?);
    Ok(())
}

fn run_config(args: ConfigArgs) -> Result<()> {
    if args.path {
        let path = Config::config_file_path().ok_or(ConfigError::NoConfigDir)?;
        println!("{}", path.display());
        return Ok(());
    }
    let config = Config::load();
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

fn detect_color_choice() -> ColorChoice {
    // Scan args before clap so help/errors honor `--no-color`.
    // Stop at `--`, which terminates flags.
    let mut args = std::env::args_os();
    args.next();
    let mut flag = false;
    for arg in args {
        if arg == "--" {
            break;
        }
        if arg == "--no-color" {
            flag = true;
            break;
        }
    }
    if flag || std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    }
}

fn init_logging(level: &str) {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let color = detect_color_choice();
    let matches = Cli::command().color(color).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());
    init_logging(&cli.log_level);

    let result = match cli.command {
        Some(Commands::Replay(args)) => run_replay(args, color),
        Some(Commands::Schema) => run_schema(),
        Some(Commands::Config(args)) => run_config(args),
        None => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(2);
    }
}
