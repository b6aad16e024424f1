use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::str::FromStr;

use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use thiserror::Error;

/// Rejected configuration updates. Bad input never reaches the layout math.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("color palette must not be empty")]
    EmptyPalette,
    #[error("unrecognized color `{0}`")]
    UnknownColor(String),
    #[error("{0} must be a positive finite number")]
    NonPositive(&'static str),
    #[error("{0} must be a finite non-negative number")]
    Negative(&'static str),
    #[error("bar count must be at least 1")]
    ZeroBarCount,
    #[error("unknown dancing style `{0}`")]
    UnknownStyle(String),
}

/// The three mutually exclusive rendering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DancingStyle {
    #[default]
    Bars,
    Circle,
    Spiral,
}

impl FromStr for DancingStyle {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bars" => Ok(DancingStyle::Bars),
            "circle" => Ok(DancingStyle::Circle),
            "spiral" => Ok(DancingStyle::Spiral),
            other => Err(SettingsError::UnknownStyle(other.to_string())),
        }
    }
}

const DEFAULT_PALETTE: [Rgb888; 10] = [
    Rgb888::new(0x1e, 0x00, 0x5e),
    Rgb888::new(0x2d, 0x00, 0x9e),
    Rgb888::new(0x3c, 0x1c, 0xd6),
    Rgb888::new(0x2a, 0x6b, 0xf2),
    Rgb888::new(0x00, 0xb4, 0xd8),
    Rgb888::new(0x00, 0xd6, 0x9a),
    Rgb888::new(0x7a, 0xe5, 0x3c),
    Rgb888::new(0xf5, 0xd4, 0x0c),
    Rgb888::new(0xf7, 0x8c, 0x1e),
    Rgb888::new(0xef, 0x23, 0x3c),
];

/// Mutable configuration read every frame by the layout engine.
///
/// Fields are private so the invariants (non-empty palette, finite positive
/// sizes) hold by construction; all mutation goes through validating setters.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualizerSettings {
    color_palette: Vec<Rgb888>,
    bar_count: usize,
    bar_width: f32,
    bar_spacing: f32,
    bar_height: f32,
    peak_hold_time: f32,
    peak_fall_speed: f32,
    dancing_style: DancingStyle,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            color_palette: DEFAULT_PALETTE.to_vec(),
            bar_count: 64,
            bar_width: 8.0,
            bar_spacing: 2.0,
            bar_height: 255.0,
            peak_hold_time: 30.0,
            peak_fall_speed: 2.0,
            dancing_style: DancingStyle::Bars,
        }
    }
}

impl VisualizerSettings {
    pub fn palette(&self) -> &[Rgb888] {
        &self.color_palette
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn bar_width(&self) -> f32 {
        self.bar_width
    }

    pub fn bar_spacing(&self) -> f32 {
        self.bar_spacing
    }

    /// Nominal max extent. The bars style uses the canvas height at render
    /// time instead; circle and spiral ignore it entirely.
    pub fn bar_height(&self) -> f32 {
        self.bar_height
    }

    /// Peak cap hold duration, counted in frames.
    pub fn peak_hold_time(&self) -> f32 {
        self.peak_hold_time
    }

    /// Magnitude units the peak cap falls per frame once the hold expires.
    pub fn peak_fall_speed(&self) -> f32 {
        self.peak_fall_speed
    }

    pub fn dancing_style(&self) -> DancingStyle {
        self.dancing_style
    }

    pub fn set_dancing_style(&mut self, style: DancingStyle) {
        if style != self.dancing_style {
            log::debug!("dancing style -> {:?}", style);
        }
        self.dancing_style = style;
    }

    pub fn set_bar_count(&mut self, count: usize) -> Result<(), SettingsError> {
        if count == 0 {
            return Err(SettingsError::ZeroBarCount);
        }
        self.bar_count = count;
        Ok(())
    }

    pub fn set_bar_width(&mut self, width: f32) -> Result<(), SettingsError> {
        self.bar_width = positive(width, "bar width")?;
        Ok(())
    }

    pub fn set_bar_spacing(&mut self, spacing: f32) -> Result<(), SettingsError> {
        self.bar_spacing = positive(spacing, "bar spacing")?;
        Ok(())
    }

    pub fn set_bar_height(&mut self, height: f32) -> Result<(), SettingsError> {
        self.bar_height = positive(height, "bar height")?;
        Ok(())
    }

    pub fn set_peak_hold_time(&mut self, frames: f32) -> Result<(), SettingsError> {
        self.peak_hold_time = non_negative(frames, "peak hold time")?;
        Ok(())
    }

    pub fn set_peak_fall_speed(&mut self, speed: f32) -> Result<(), SettingsError> {
        self.peak_fall_speed = non_negative(speed, "peak fall speed")?;
        Ok(())
    }

    pub fn set_palette(&mut self, palette: Vec<Rgb888>) -> Result<(), SettingsError> {
        if palette.is_empty() {
            return Err(SettingsError::EmptyPalette);
        }
        self.color_palette = palette;
        Ok(())
    }

    /// Applies a comma-separated palette text field edit.
    pub fn set_palette_text(&mut self, text: &str) -> Result<(), SettingsError> {
        self.set_palette(parse_palette(text)?)
    }
}

fn positive(value: f32, field: &'static str) -> Result<f32, SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        log::warn!("rejected {}: {}", field, value);
        Err(SettingsError::NonPositive(field))
    }
}

fn non_negative(value: f32, field: &'static str) -> Result<f32, SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        log::warn!("rejected {}: {}", field, value);
        Err(SettingsError::Negative(field))
    }
}

/// Parses a comma-separated palette. Entries are trimmed and empty segments
/// (trailing or doubled commas) are dropped; an input with no usable entries
/// is an error.
pub fn parse_palette(text: &str) -> Result<Vec<Rgb888>, SettingsError> {
    let mut palette = Vec::new();
    for entry in text.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        palette.push(parse_color(entry)?);
    }
    if palette.is_empty() {
        return Err(SettingsError::EmptyPalette);
    }
    Ok(palette)
}

/// Accepts `#rgb`, `#rrggbb`, or a small set of named colors.
pub fn parse_color(entry: &str) -> Result<Rgb888, SettingsError> {
    if let Some(hex) = entry.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| SettingsError::UnknownColor(entry.to_string()));
    }
    let named = match entry.to_ascii_lowercase().as_str() {
        "black" => Rgb888::BLACK,
        "white" => Rgb888::WHITE,
        "red" => Rgb888::RED,
        "green" => Rgb888::GREEN,
        "blue" => Rgb888::BLUE,
        "yellow" => Rgb888::YELLOW,
        "cyan" => Rgb888::CYAN,
        "magenta" => Rgb888::MAGENTA,
        "orange" => Rgb888::new(0xff, 0xa5, 0x00),
        "purple" => Rgb888::new(0x80, 0x00, 0x80),
        _ => return Err(SettingsError::UnknownColor(entry.to_string())),
    };
    Ok(named)
}

fn parse_hex(hex: &str) -> Option<Rgb888> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
            let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
            let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
            Some(Rgb888::new(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgb888::new(r, g, b))
        }
        _ => None,
    }
}
