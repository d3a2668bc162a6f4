mod logging;
mod terminal;

use std::collections::HashSet;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use dayframe_render::{CancelToken, Canvas, Config, FrameBuffer, Schedule};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use walkdir::WalkDir;

use logging::LogLevel;

#[derive(Parser, Debug)]
#[command(author, version, about = "Show time-of-day imagery and a clock on an LED panel preview")]
struct Cli {
    /// Configuration file (TOML); defaults are used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
    /// Minimum level of log messages written to stderr
    #[arg(long, value_enum, default_value = "warn", global = true)]
    log_level: LogLevel,
    /// Raise the log level by one step per occurrence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one composed frame to the terminal
    Preview(PreviewArgs),
    /// Load the frame set and print which frame is shown through the day
    Check,
    /// Drive the panel loop until the tick budget runs out or Enter is pressed
    ///
    /// The panel is cleared on either of those exits. Signals are not handled,
    /// so stopping with Ctrl+C leaves the last frame on the panel.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Time of day to render instead of the current time (HH:MM)
    #[arg(long, value_parser = parse_time_of_day)]
    at: Option<NaiveTime>,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,
    /// Override the configured frame rate
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log_level.to_filter(cli.verbose))
        .context("failed to install logger")?;

    let config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("failed to load config {:?}", path))?
        },
        None => Config::default(),
    };

    match cli.command {
        Commands::Preview(args) => preview(&config, args),
        Commands::Check => check(&config),
        Commands::Run(args) => run(config, args),
    }
}

fn preview(config: &Config, args: PreviewArgs) -> Result<()> {
    let schedule = load_schedule(config)?;
    let mut animator = config.animator(schedule)?;
    let mut canvas = panel(config);

    let now = match args.at {
        Some(time) => Local::now().date_naive().and_time(time),
        None => local_now(),
    };

    animator.render(&mut canvas, now, &CancelToken::new());
    if let Some(index) = animator.schedule().current_index() {
        info!("showing frame {index} for {}", now.format("%H:%M"));
    }

    terminal::render(&canvas, &mut io::stdout().lock()).context("failed to write preview")?;
    Ok(())
}

fn check(config: &Config) -> Result<()> {
    let mut schedule = load_schedule(config)?;
    report_stray_files(config);

    let (width, height) = (config.display.width as usize, config.display.height as usize);
    for (index, frame) in schedule.frames().iter().enumerate() {
        let surface = frame.surface();
        if surface.width() > width || surface.height() > height {
            warn!(
                "frame {index} is {}x{}, larger than the {}x{} panel",
                surface.width(),
                surface.height(),
                width,
                height
            );
        }
    }

    let today = Local::now().date_naive();
    println!("time   frame  anchor  match");
    for hour in 0..24 {
        for minute in [0, 30] {
            let Some(now) = today.and_hms_opt(hour, minute, 0) else {
                continue;
            };
            let matched = schedule.select_index(now).is_some();
            let index = schedule.refresh(now);
            let frame = &schedule.frames()[index];
            println!(
                "{:02}:{:02}  {:>5}  {:02}:{:02}   {}",
                hour,
                minute,
                index,
                frame.hour(),
                frame.minute(),
                if matched { "window" } else { "fallback" }
            );
        }
    }

    Ok(())
}

fn run(mut config: Config, args: RunArgs) -> Result<()> {
    let schedule = load_schedule(&config)?;
    let mut animator = config.animator(schedule)?;
    let mut canvas = panel(&config);

    if let Some(fps) = args.fps {
        config.animation.fps = fps.max(1);
    }
    let frame_interval = config.frame_interval();

    let cancel = CancelToken::new();
    watch_stdin(cancel.clone());

    let mut stdout = io::stdout().lock();
    terminal::clear_screen(&mut stdout)?;

    while !cancel.is_cancelled() {
        if args.ticks.is_some_and(|budget| animator.ticks() >= budget) {
            break;
        }

        let started = Instant::now();
        let tick = animator.tick(&mut canvas, local_now(), &cancel);
        if tick.status.is_cancelled() {
            break;
        }

        terminal::home(&mut stdout)?;
        terminal::render(&canvas, &mut stdout).context("failed to write frame")?;

        if let Some(remaining) = frame_interval.checked_sub(started.elapsed()) {
            thread::sleep(remaining);
        }
    }

    info!("stopping after {} ticks", animator.ticks());
    canvas.clear();
    terminal::home(&mut stdout)?;
    terminal::render(&canvas, &mut stdout)?;
    Ok(())
}

fn load_schedule(config: &Config) -> Result<Schedule> {
    let expected = if config.frames.entries.is_empty() {
        config.frames.count
    } else {
        config.frames.entries.len()
    };

    let progress = ProgressBar::new(expected as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} frames {msg}",
        )?
        .progress_chars("=> "),
    );

    let schedule = config
        .load_schedule(|_, path| {
            progress.set_message(path.display().to_string());
            progress.inc(1);
        })
        .with_context(|| format!("failed to load frames from {:?}", config.frames_directory()));
    progress.finish_and_clear();

    schedule
}

/// Warns about images next to the frame set that the schedule never shows.
fn report_stray_files(config: &Config) {
    let directory = config.frames_directory();
    let referenced: HashSet<PathBuf> = if config.frames.entries.is_empty() {
        config.frame_set().paths().collect()
    } else {
        config.frames.entries.iter().map(|entry| directory.join(&entry.file)).collect()
    };

    let stray = WalkDir::new(&directory)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, &config.frames.extension))
        .filter(|path| !referenced.contains(path));

    for path in stray {
        warn!("{} is not part of the schedule", path.display());
    }
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Cancels `token` once a line arrives on stdin. A closed stdin never cancels.
fn watch_stdin(token: CancelToken) {
    thread::spawn(move || {
        let mut line = String::new();
        if let Ok(read) = io::stdin().lock().read_line(&mut line) {
            if read > 0 {
                token.cancel();
            }
        }
    });
}

fn panel(config: &Config) -> FrameBuffer {
    FrameBuffer::new(config.display.width as usize, config.display.height as usize)
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn parse_time_of_day(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|err| format!("expected HH:MM: {err}"))
}
