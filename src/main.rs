//! Firework demo runner.
//!
//! Opens a window whose title doubles as the display: particle count,
//! countdown and FPS. Keys: `N` toggles the firework mode, `M` mutes,
//! holding `0`-`5` fakes a hand with that many fingers at the cursor, a left
//! click launches a burst, `Esc` quits.
//!
//! `pyro --headless 30` runs the mode without a window for 30 simulated
//! seconds and logs what happened.

use anyhow::{Context, Result};
use clap::Parser;
use pyro::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const DEFAULT_CONFIG: &str = "pyro.toml";
const HEADLESS_STEP: f32 = 1.0 / 60.0;
const TITLE_REFRESH: f32 = 0.25;

#[derive(Parser, Debug)]
#[command(name = "pyro", version, about = "Firework particle display")]
struct Cli {
    /// Run without a window for this many simulated seconds
    #[arg(long, value_name = "SECONDS")]
    headless: Option<f32>,

    /// Engine config file [default: pyro.toml if present]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.headless {
        Some(seconds) => run_headless(&config, seconds),
        None => run_windowed(config),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<EngineConfig> {
    match explicit {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None if Path::new(DEFAULT_CONFIG).exists() => {
            EngineConfig::load(DEFAULT_CONFIG).context("loading pyro.toml")
        }
        None => Ok(EngineConfig::default()),
    }
}

/// Two handles onto the same preference storage, one for the audio gateway
/// and one for the mode.
fn preference_stores(config: &EngineConfig) -> (Box<dyn PreferenceStore>, Box<dyn PreferenceStore>) {
    match &config.preferences_path {
        Some(path) => {
            let prefs = FilePreferences::new(path);
            (Box::new(prefs.clone()), Box::new(prefs))
        }
        None => {
            let prefs = MemoryPreferences::new();
            (Box::new(prefs.clone()), Box::new(prefs))
        }
    }
}

fn build_mode(
    config: &EngineConfig,
    output: Box<dyn AudioOutput>,
) -> FireworkMode<HeadlessScene> {
    let (audio_prefs, mode_prefs) = preference_stores(config);
    let audio = EffectGateway::new(config.audio, output, audio_prefs);
    FireworkMode::new(config, HeadlessScene::new(), audio, mode_prefs)
}

#[cfg(feature = "audio")]
fn device_output(config: &EngineConfig) -> Box<dyn AudioOutput> {
    Box::new(pyro::audio::CpalOutput::new(config.audio.max_voices))
}

#[cfg(not(feature = "audio"))]
fn device_output(_config: &EngineConfig) -> Box<dyn AudioOutput> {
    Box::new(UnavailableOutput::new("built without the `audio` feature"))
}

// ========== Headless ==========

fn run_headless(config: &EngineConfig, seconds: f32) -> Result<()> {
    anyhow::ensure!(seconds > 0.0, "--headless needs a positive duration");

    let output = OfflineOutput::new(config.audio.sample_rate, config.audio.max_voices);
    let mut mode = build_mode(config, Box::new(output));
    mode.activate();

    let frames = (seconds / HEADLESS_STEP).ceil() as u64;
    let mut peak_particles = 0;
    for frame in 1..=frames {
        mode.update(HEADLESS_STEP);
        peak_particles = peak_particles.max(mode.pool().active_count());

        if frame % 60 == 0 {
            log::info!(
                "t={:>5.1}s particles={:>4} countdown={:>2} voices={}",
                mode.clock(),
                mode.pool().active_count(),
                mode.countdown().displayed_value(),
                mode.audio().active_voices(),
            );
        }
    }

    let stats = mode.stats();
    log::info!(
        "done: {} bursts ({} auto, {} finale), {} countdown finales, peak {} particles",
        mode.pool().total_bursts(),
        stats.auto_bursts,
        stats.finale_bursts,
        stats.countdown_finales,
        peak_particles,
    );
    Ok(())
}

// ========== Windowed ==========

fn run_windowed(config: EngineConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("creating event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(&config);
    event_loop.run_app(&mut app).context("running event loop")?;
    Ok(())
}

struct App {
    window: Option<Arc<Window>>,
    mode: FireworkMode<HeadlessScene>,
    input: Input,
    clock: FrameClock,
    fingers: FingerStabilizer,
    since_title: f32,
}

impl App {
    fn new(config: &EngineConfig) -> Self {
        Self {
            window: None,
            mode: build_mode(config, device_output(config)),
            input: Input::new(),
            clock: FrameClock::new(),
            fingers: FingerStabilizer::new(),
            since_title: TITLE_REFRESH,
        }
    }

    /// Run one frame. Returns `false` when the user asked to quit.
    fn frame(&mut self) -> bool {
        let dt = self.clock.update();

        if self.input.key_pressed(KeyCode::Escape) {
            return false;
        }
        if self.input.key_pressed(KeyCode::N) {
            self.mode.toggle();
        }
        if self.input.key_pressed(KeyCode::M) {
            let muted = self.mode.audio_mut().toggle_mute();
            log::info!("audio {}", if muted { "muted" } else { "unmuted" });
        }
        for click in self.input.clicks().to_vec() {
            self.mode.spawn_at_position(click.x, click.y);
        }

        let gesture = self.input.simulated_gesture().map(|frame| {
            let stable = self.fingers.update(frame.finger_count, dt);
            GestureFrame::new(stable as i32, frame.x, frame.y)
        });
        if gesture.is_none() {
            self.fingers.reset();
        }
        self.mode.apply_gesture(gesture, dt);
        self.mode.update(dt);
        self.input.begin_frame();

        self.since_title += dt;
        if self.since_title >= TITLE_REFRESH {
            self.since_title = 0.0;
            self.refresh_title();
        }
        true
    }

    fn refresh_title(&self) {
        let Some(window) = &self.window else {
            return;
        };
        let title = if self.mode.is_active() {
            format!(
                "pyro | {} particles | {} | {:.0} fps",
                self.mode.pool().active_count(),
                self.mode.countdown().displayed_value(),
                self.clock.fps(),
            )
        } else {
            format!("pyro | press N for fireworks | {:.0} fps", self.clock.fps())
        };
        window.set_title(&title);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attrs = Window::default_attributes()
            .with_title("pyro")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                let size = window.inner_size();
                self.input.set_window_size(size.width, size.height);
                self.mode.set_viewport(size.width as f32, size.height as f32);
                self.window = Some(Arc::new(window));

                // Activation needs a user gesture to unlock audio
                if self.mode.saved_preference() {
                    log::info!("firework mode was left on; press N to resume it");
                }
            }
            Err(err) => {
                log::error!("could not open window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                self.mode.set_viewport(size.width as f32, size.height as f32);
            }
            WindowEvent::RedrawRequested => {
                if !self.frame() {
                    event_loop.exit();
                    return;
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}
