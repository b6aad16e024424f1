//! Desktop simulator for the spectrum dancer: an 800x400 window driven at
//! ~60 Hz, fed by a demo spectrum, the microphone, or a WAV file.

mod scheduler;
mod source;

use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use embedded_graphics::{pixelcolor::Rgb888, prelude::*};
use embedded_graphics_simulator::{
    sdl2::Keycode, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window,
};

use dancer_dsp::AudioSession;
use dancer_viz::{DancingStyle, RenderLoop, SettingsError, SpectrumSource, VisualizerSettings};

use crate::scheduler::FixedRateScheduler;
use crate::source::DemoSource;

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 400;
const FRAME_PERIOD: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    /// Synthetic spectrum, no audio hardware needed.
    Demo,
    /// Default input device via cpal.
    Mic,
    /// WAV file feed (requires --file).
    File,
}

#[derive(Parser, Debug)]
#[command(about = "Audio spectrum visualizer simulator")]
struct Args {
    /// Layout style: bars, circle or spiral (keys 1/2/3 switch at runtime)
    #[arg(long, default_value = "bars", value_parser = parse_style)]
    style: DancingStyle,

    /// Number of visual slots drawn each frame
    #[arg(long, default_value_t = 64)]
    bars: usize,

    #[arg(long, default_value_t = 8.0)]
    bar_width: f32,

    #[arg(long, default_value_t = 2.0)]
    bar_spacing: f32,

    /// Comma-separated palette: hex (#rrggbb) or named colors
    #[arg(long)]
    palette: Option<String>,

    /// Peak cap hold duration in frames (bars style)
    #[arg(long, default_value_t = 30.0)]
    peak_hold: f32,

    /// Peak cap fall per frame, in magnitude units
    #[arg(long, default_value_t = 2.0)]
    peak_fall: f32,

    #[arg(long, value_enum, default_value_t = SourceKind::Demo)]
    source: SourceKind,

    /// WAV file to analyse when --source file
    #[arg(long)]
    file: Option<PathBuf>,
}

fn parse_style(s: &str) -> Result<DancingStyle, String> {
    s.parse().map_err(|e: SettingsError| e.to_string())
}

fn settings_from_args(args: &Args) -> Result<VisualizerSettings, SettingsError> {
    let mut settings = VisualizerSettings::default();
    settings.set_dancing_style(args.style);
    settings.set_bar_count(args.bars)?;
    settings.set_bar_width(args.bar_width)?;
    settings.set_bar_spacing(args.bar_spacing)?;
    settings.set_peak_hold_time(args.peak_hold)?;
    settings.set_peak_fall_speed(args.peak_fall)?;
    if let Some(palette) = &args.palette {
        settings.set_palette_text(palette)?;
    }
    Ok(settings)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    let mut settings = settings_from_args(&args)?;

    let mut display: SimulatorDisplay<Rgb888> =
        SimulatorDisplay::new(Size::new(WIDTH, HEIGHT));
    let mut window = Window::new(
        "Spectrum Dancer",
        &OutputSettingsBuilder::new().scale(1).build(),
    );

    let mut session = AudioSession::new();
    let mut render_loop: RenderLoop<Box<dyn SpectrumSource>, _> =
        RenderLoop::new(FixedRateScheduler::new(FRAME_PERIOD));

    match args.source {
        SourceKind::Demo => render_loop.start(Box::new(DemoSource::new())),
        SourceKind::Mic => match session.connect_microphone() {
            Ok(()) => render_loop.start(Box::new(session.sampler())),
            // Non-fatal: the visualizer stays off until M reconnects.
            Err(e) => log::warn!("microphone unavailable: {e}"),
        },
        SourceKind::File => {
            let path = args
                .file
                .as_deref()
                .ok_or("--source file requires --file <path>")?;
            session.connect_file(path)?;
            render_loop.start(Box::new(session.sampler()));
        }
    }

    'running: loop {
        render_loop.tick(&settings, &mut display)?;
        window.update(&display);

        for event in window.events() {
            match event {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, .. } => {
                    handle_key(keycode, &mut settings, &mut session, &mut render_loop)
                }
                _ => {}
            }
        }

        render_loop.scheduler_mut().wait_for_tick();
    }

    render_loop.stop();
    Ok(())
}

fn handle_key(
    keycode: Keycode,
    settings: &mut VisualizerSettings,
    session: &mut AudioSession,
    render_loop: &mut RenderLoop<Box<dyn SpectrumSource>, FixedRateScheduler>,
) {
    match keycode {
        Keycode::Num1 => settings.set_dancing_style(DancingStyle::Bars),
        Keycode::Num2 => settings.set_dancing_style(DancingStyle::Circle),
        Keycode::Num3 => settings.set_dancing_style(DancingStyle::Spiral),
        Keycode::M => {
            // Microphone toggle: release on, reacquire off.
            if session.is_connected() {
                session.disconnect();
                render_loop.stop();
                log::info!("microphone off");
            } else {
                match session.connect_microphone() {
                    Ok(()) => {
                        render_loop.start(Box::new(session.sampler()));
                        log::info!("microphone on");
                    }
                    Err(e) => log::warn!("microphone unavailable: {e}"),
                }
            }
        }
        _ => {}
    }
}
