// Surface and state APIs are broader than what the gallery itself drives
#![allow(dead_code)]

mod config;
mod control;
mod display;
mod effects;
mod error;
mod gallery;
mod geometry;
mod state;
mod tasks;
mod util;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sdl2::keyboard::Keycode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use config::GalleryConfig;
use control::{Command, Controller};
use display::{Display, InputEvent, RenderTarget, Surface, WindowOptions};
use error::GalleryResult;
use gallery::Gallery;
use state::{FixedStepClock, FrameClock, WallClock};
use util::FpsCounter;

/// Demoscene effects gallery
#[derive(Parser, Debug)]
#[command(name = "demogallery", version)]
struct Args {
    /// Gallery config JSON; defaults are used when the file is missing.
    #[arg(long, default_value = "gallery.json")]
    config: PathBuf,

    /// Override window width.
    #[arg(long, short = 'W')]
    width: Option<u32>,

    /// Override window height.
    #[arg(long, short = 'H')]
    height: Option<u32>,

    /// Disable VSync for an uncapped framerate.
    #[arg(long)]
    no_vsync: bool,

    /// Print the available effects and exit.
    #[arg(long)]
    list: bool,

    /// Run without a window on a fixed 60 Hz clock.
    #[arg(long)]
    headless: bool,

    /// Frames to run in headless mode.
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Write the effective configuration to this path and exit.
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn load_config(args: &Args) -> GalleryResult<GalleryConfig> {
    let mut config = GalleryConfig::load_or_default(&args.config)?;
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if args.no_vsync {
        config.vsync = false;
    }
    config.validate()?;
    Ok(config)
}

fn run_headless(gallery: &mut Gallery, config: &GalleryConfig, frames: u64) -> GalleryResult<()> {
    let mut screen = Surface::new(config.width, config.height)?;
    let mut clock = FixedStepClock::with_limit(1000.0 / 60.0, frames);

    while let Some(time) = clock.next_frame() {
        gallery.manager.tick(time, &mut screen);
        if gallery.manager.is_idle() {
            info!("playlist finished");
            break;
        }
    }

    info!(
        frames = gallery.manager.frames(),
        current = gallery.current().unwrap_or("-"),
        "headless run complete"
    );
    Ok(())
}

fn handle_command(gallery: &mut Gallery, cmd: Command) {
    match cmd {
        Command::Next => gallery.skip(),
        Command::Pause | Command::Resume => {
            // Only post what the current state can take
            let want_paused = cmd == Command::Pause;
            if want_paused != gallery.is_paused() {
                if let Some(event) = cmd.event() {
                    gallery.manager.post(event);
                }
            }
        },
        Command::Quit => {},
    }
}

fn run_windowed(gallery: &mut Gallery, config: &GalleryConfig) -> GalleryResult<()> {
    let (width, height) = (config.width, config.height);
    let (mut window, texture_creator) = Display::open(&WindowOptions {
        title: "demogallery",
        width,
        height,
        vsync: config.vsync,
    })?;
    let mut target = RenderTarget::with_size(&texture_creator, width, height)?;
    let mut screen = Surface::new(width, height)?;

    let controller = match Controller::new() {
        Ok(controller) => Some(controller),
        Err(e) => {
            warn!(error = %e, "remote control unavailable");
            None
        },
    };

    info!(width, height, vsync = config.vsync, "window open");
    info!("keys: Right = next, P = pause/resume, Escape = quit");

    let mut clock = WallClock::new();
    let mut fps = FpsCounter::new(60);
    let mut last_report = 0.0;
    let mut shown = String::new();

    'main: loop {
        for event in window.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'main,
                InputEvent::KeyDown(Keycode::Right) => gallery.skip(),
                InputEvent::KeyDown(Keycode::P) => gallery.toggle_pause(),
                InputEvent::KeyDown(_) => {},
            }
        }

        if let Some(controller) = &controller {
            for cmd in controller.poll() {
                if cmd == Command::Quit {
                    break 'main;
                }
                handle_command(gallery, cmd);
            }
        }

        let Some(time) = clock.next_frame() else {
            break;
        };
        gallery.manager.tick(time, &mut screen);
        if gallery.manager.is_idle() {
            info!("playlist finished");
            break;
        }

        window.present(&mut target, &screen)?;

        if let Some(current) = gallery.current() {
            if current != shown {
                shown = current.to_string();
                window.set_title(&format!("demogallery - {}", shown));
            }
        }

        let avg_fps = fps.tick();
        if time - last_report >= 5000.0 {
            let presented = window.presented();
            debug!(
                fps = avg_fps,
                frame_ms = fps.avg_frame_time_ms(),
                presented,
                task = gallery.current().unwrap_or("-"),
                "frame stats"
            );
            last_report = time;
        }
    }

    Ok(())
}

fn run(args: &Args) -> GalleryResult<()> {
    if args.list {
        for name in effects::names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let config = load_config(args)?;
    if let Some(path) = &args.write_config {
        config.save(path)?;
        info!(path = %path.display(), "config written");
        return Ok(());
    }

    let mut gallery = gallery::build(&config, config.width, config.height)?;
    gallery.start()?;

    if args.headless {
        run_headless(&mut gallery, &config, args.frames)
    } else {
        run_windowed(&mut gallery, &config)
    }
}

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "demogallery failed");
            ExitCode::FAILURE
        },
    }
}
