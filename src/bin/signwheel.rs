use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use signwheel::tasks;
use signwheel::{
    HeadlessScreen, RunLoop, Scheduler, Screen, SignConfig, TaskRegistry, TerminalScreen,
};

#[derive(Parser, Debug)]
#[command(name = "signwheel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the task rotation against a screen.
    Run(RunArgs),
    /// List registered tasks with their budgets and flags.
    List,
    /// Record frame sequences for optimize-flagged tasks.
    Capture(CaptureArgs),
    /// Delete captured frame sequences.
    ClearCache(ClearCacheArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Configuration JSON; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Stop after this many frames instead of running forever.
    #[arg(long)]
    frames: Option<u64>,

    /// Override the frame cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Render optimize-flagged tasks live instead of from the cache.
    #[arg(long)]
    no_cache: bool,

    /// Screen to drive.
    #[arg(long, value_enum, default_value_t = ScreenChoice::Terminal)]
    screen: ScreenChoice,
}

#[derive(Parser, Debug)]
struct CaptureArgs {
    /// Configuration JSON; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the frame cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Capture only this task.
    #[arg(long)]
    task: Option<String>,

    /// Re-record even when a committed capture exists.
    #[arg(long)]
    force: bool,
}

#[derive(Parser, Debug)]
struct ClearCacheArgs {
    /// Configuration JSON; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the frame cache directory.
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Clear only this task's capture.
    #[arg(long)]
    task: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScreenChoice {
    /// ANSI truecolor half-blocks on stdout.
    Terminal,
    /// Discard output; for smoke tests and timing runs.
    Headless,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the terminal screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::List => cmd_list(),
        Command::Capture(args) => cmd_capture(args),
        Command::ClearCache(args) => cmd_clear_cache(args),
    }
}

fn load_config(
    path: Option<&Path>,
    fps: Option<u32>,
    cache_dir: Option<PathBuf>,
    no_cache: bool,
) -> anyhow::Result<SignConfig> {
    let mut config = match path {
        Some(path) => SignConfig::load(path)?,
        None => SignConfig::default(),
    };
    if let Some(fps) = fps {
        config.fps = fps;
    }
    if let Some(dir) = cache_dir {
        config.cache.root = dir;
    }
    if no_cache {
        config.cache.enabled = false;
    }
    config.validate()?;
    Ok(config)
}

fn builtin_registry() -> anyhow::Result<TaskRegistry> {
    let mut registry = TaskRegistry::new();
    tasks::install_builtin(&mut registry)?;
    Ok(registry)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let config = load_config(
        args.config.as_deref(),
        args.fps,
        args.cache_dir,
        args.no_cache,
    )?;
    let cache = config.frame_cache();
    let registry = builtin_registry()?;
    let scheduler = Scheduler::new(registry.into_slots(cache.as_ref()));

    let mut run = RunLoop::new(scheduler, config.width, config.height, config.fps);
    if let Some(frames) = args.frames {
        run = run.with_frame_limit(frames);
    }

    let mut screen: Box<dyn Screen> = match args.screen {
        ScreenChoice::Terminal => Box::new(TerminalScreen::new()),
        ScreenChoice::Headless => Box::new(HeadlessScreen),
    };
    run.run(screen.as_mut())?;
    Ok(())
}

fn cmd_list() -> anyhow::Result<()> {
    for task in builtin_registry()?.into_tasks() {
        let info = task.info();
        let budget = task.budget();
        let mut flags = String::new();
        if info.ignore {
            flags.push_str(" [ignored]");
        }
        if info.optimize {
            flags.push_str(" [cached]");
        }
        println!(
            "{:<12} {:<18} by {:<14} {:>3}s/{}s{}",
            info.name,
            info.title,
            info.artist,
            budget.suggested().as_secs(),
            budget.max().as_secs(),
            flags
        );
    }
    Ok(())
}

fn cmd_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), None, args.cache_dir, false)?;
    let cache = config
        .frame_cache()
        .context("frame cache is disabled in this configuration")?;

    let mut matched = 0usize;
    for mut task in builtin_registry()?.into_tasks() {
        let info = task.info();
        if !info.optimize {
            continue;
        }
        if let Some(only) = &args.task {
            if info.name != *only {
                continue;
            }
        }
        matched += 1;

        if args.force {
            cache.invalidate(info.name)?;
        }
        if let Some(frames) = cache.frame_count(info.name) {
            println!("{}: already captured ({frames} frames)", info.name);
            continue;
        }
        let summary = cache
            .capture(task.as_mut())
            .with_context(|| format!("capture '{}'", info.name))?;
        println!(
            "{}: {} frames covering {:.1}s",
            info.name,
            summary.frames,
            summary.elapsed.as_secs_f64()
        );
    }

    if matched == 0 {
        match args.task {
            Some(name) => anyhow::bail!("no optimize-flagged task named '{name}'"),
            None => println!("no optimize-flagged tasks registered"),
        }
    }
    Ok(())
}

fn cmd_clear_cache(args: ClearCacheArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref(), None, args.cache_dir, false)?;
    let cache = config
        .frame_cache()
        .context("frame cache is disabled in this configuration")?;

    match args.task {
        Some(name) => {
            cache.invalidate(&name)?;
            println!("cleared capture for '{name}'");
        }
        None => {
            cache.invalidate_all()?;
            println!("cleared cache root '{}'", cache.root().display());
        }
    }
    Ok(())
}
