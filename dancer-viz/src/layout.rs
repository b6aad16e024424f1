use core::f32::consts::PI;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{Point, Size},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
};
#[allow(unused_imports)]
use micromath::F32Ext;

use crate::color_map::highlight_index;
use crate::sample::{VisualSlot, MAGNITUDE_MAX};
use crate::settings::{DancingStyle, VisualizerSettings};

/// Base ring/spiral radius is `min(W, H)` divided by this. Not configurable.
pub const BASE_RADIUS_DIVISOR: f32 = 2.5;

/// Full turns the spiral makes across all slots.
const SPIRAL_TURNS: f32 = 5.0;

const PEAK_CAP_THICKNESS: u32 = 2;

/// Fraction of the full scale a magnitude represents, in [0, 1].
pub fn magnitude_fraction(magnitude: f32) -> f32 {
    (magnitude / MAGNITUDE_MAX as f32).clamp(0.0, 1.0)
}

/// Pixel height of a bar for the given magnitude. A magnitude of 255 reaches
/// the full canvas height exactly; no further clamping is applied.
pub fn pixel_height(magnitude: f32, canvas_height: f32) -> f32 {
    magnitude_fraction(magnitude) * canvas_height
}

/// Left edge of the first bar such that the whole block of
/// `count * (width + spacing) - spacing` pixels sits centered in the canvas.
pub fn bars_start_x(canvas_width: f32, count: usize, bar_width: f32, bar_spacing: f32) -> f32 {
    let unit = bar_width + bar_spacing;
    (canvas_width - (count as f32 * unit - bar_spacing)) / 2.0
}

pub fn base_radius(canvas_width: f32, canvas_height: f32) -> f32 {
    canvas_width.min(canvas_height) / BASE_RADIUS_DIVISOR
}

/// One two-circle node of the circle or spiral style, relative to the canvas
/// center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingNode {
    pub dx: f32,
    pub dy: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

/// Node geometry for the circle style: all slots sit on one ring of the base
/// radius, one full turn across the slot sequence.
pub fn circle_node(
    index: usize,
    count: usize,
    magnitude: u8,
    bar_width: f32,
    base_radius: f32,
) -> RingNode {
    let t = index as f32 / count as f32;
    let angle = t * 2.0 * PI;
    RingNode {
        dx: base_radius * angle.cos(),
        dy: base_radius * angle.sin(),
        inner_radius: bar_width,
        outer_radius: bar_width + magnitude_fraction(magnitude as f32) * (base_radius / 2.0),
    }
}

/// Node geometry for the spiral style: radius grows linearly with the slot
/// index while the angle winds `SPIRAL_TURNS` full turns.
pub fn spiral_node(
    index: usize,
    count: usize,
    magnitude: u8,
    bar_width: f32,
    max_radius: f32,
) -> RingNode {
    let t = index as f32 / count as f32;
    let angle = t * SPIRAL_TURNS * 2.0 * PI;
    let radius = t * max_radius;
    RingNode {
        dx: radius * angle.cos(),
        dy: radius * angle.sin(),
        inner_radius: bar_width,
        outer_radius: bar_width + magnitude_fraction(magnitude as f32) * (max_radius / 2.0),
    }
}

/// A style renderer turns the slot sequence into draw commands. All three
/// styles assume the target was cleared at the start of the frame.
pub trait StyleRenderer {
    fn render<D: DrawTarget<Color = Rgb888>>(
        &self,
        target: &mut D,
        slots: &[VisualSlot],
        peaks: &[f32],
        settings: &VisualizerSettings,
    ) -> Result<(), D::Error>;
}

pub struct BarsLayout;
pub struct CircleLayout;
pub struct SpiralLayout;

impl StyleRenderer for BarsLayout {
    fn render<D: DrawTarget<Color = Rgb888>>(
        &self,
        target: &mut D,
        slots: &[VisualSlot],
        peaks: &[f32],
        settings: &VisualizerSettings,
    ) -> Result<(), D::Error> {
        let palette = settings.palette();
        if slots.is_empty() || palette.is_empty() {
            return Ok(());
        }
        let size = target.bounding_box().size;
        let (w, h) = (size.width as f32, size.height as f32);
        let unit = settings.bar_width() + settings.bar_spacing();
        let start_x = bars_start_x(w, slots.len(), settings.bar_width(), settings.bar_spacing());
        let bar_w = settings.bar_width().max(1.0) as u32;

        for slot in slots {
            let x = (start_x + slot.index as f32 * unit) as i32;
            let color = palette[slot.color_index % palette.len()];
            let bar_h = pixel_height(slot.magnitude as f32, h);
            if bar_h >= 1.0 {
                Rectangle::new(Point::new(x, (h - bar_h) as i32), Size::new(bar_w, bar_h as u32))
                    .into_styled(PrimitiveStyle::with_fill(color))
                    .draw(target)?;
            }
            if let Some(&peak) = peaks.get(slot.index) {
                let peak_h = pixel_height(peak, h);
                if peak_h >= 1.0 {
                    let cap_y = ((h - peak_h) as i32 - PEAK_CAP_THICKNESS as i32).max(0);
                    Rectangle::new(Point::new(x, cap_y), Size::new(bar_w, PEAK_CAP_THICKNESS))
                        .into_styled(PrimitiveStyle::with_fill(color))
                        .draw(target)?;
                }
            }
        }
        Ok(())
    }
}

impl StyleRenderer for CircleLayout {
    fn render<D: DrawTarget<Color = Rgb888>>(
        &self,
        target: &mut D,
        slots: &[VisualSlot],
        _peaks: &[f32],
        settings: &VisualizerSettings,
    ) -> Result<(), D::Error> {
        let size = target.bounding_box().size;
        let base = base_radius(size.width as f32, size.height as f32);
        for slot in slots {
            let node = circle_node(
                slot.index,
                slots.len(),
                slot.magnitude,
                settings.bar_width(),
                base,
            );
            draw_ring_node(target, size, &node, slot, settings)?;
        }
        Ok(())
    }
}

impl StyleRenderer for SpiralLayout {
    fn render<D: DrawTarget<Color = Rgb888>>(
        &self,
        target: &mut D,
        slots: &[VisualSlot],
        _peaks: &[f32],
        settings: &VisualizerSettings,
    ) -> Result<(), D::Error> {
        let size = target.bounding_box().size;
        let max_radius = base_radius(size.width as f32, size.height as f32);
        for slot in slots {
            let node = spiral_node(
                slot.index,
                slots.len(),
                slot.magnitude,
                settings.bar_width(),
                max_radius,
            );
            draw_ring_node(target, size, &node, slot, settings)?;
        }
        Ok(())
    }
}

/// Draws the inner circle first, then the larger outer circle on top at the
/// same center. The outer fill covers the inner one entirely; the draw order
/// is kept that way on purpose.
fn draw_ring_node<D: DrawTarget<Color = Rgb888>>(
    target: &mut D,
    canvas: Size,
    node: &RingNode,
    slot: &VisualSlot,
    settings: &VisualizerSettings,
) -> Result<(), D::Error> {
    let palette = settings.palette();
    if palette.is_empty() {
        return Ok(());
    }
    let center = Point::new(
        (canvas.width as f32 / 2.0 + node.dx) as i32,
        (canvas.height as f32 / 2.0 + node.dy) as i32,
    );
    let inner = palette[slot.color_index % palette.len()];
    let outer = palette[highlight_index(slot.color_index % palette.len(), palette.len())];

    Circle::with_center(center, diameter(node.inner_radius))
        .into_styled(PrimitiveStyle::with_fill(inner))
        .draw(target)?;
    Circle::with_center(center, diameter(node.outer_radius))
        .into_styled(PrimitiveStyle::with_fill(outer))
        .draw(target)?;
    Ok(())
}

fn diameter(radius: f32) -> u32 {
    (radius.max(0.0) * 2.0) as u32
}

/// Dispatch over the active `DancingStyle`.
pub struct LayoutEngine;

impl LayoutEngine {
    pub fn render<D: DrawTarget<Color = Rgb888>>(
        style: DancingStyle,
        target: &mut D,
        slots: &[VisualSlot],
        peaks: &[f32],
        settings: &VisualizerSettings,
    ) -> Result<(), D::Error> {
        match style {
            DancingStyle::Bars => BarsLayout.render(target, slots, peaks, settings),
            DancingStyle::Circle => CircleLayout.render(target, slots, peaks, settings),
            DancingStyle::Spiral => SpiralLayout.render(target, slots, peaks, settings),
        }
    }
}
