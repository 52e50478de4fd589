use super::model::{State, WheelItem};
use super::{CENTER_CIRCLE_RADIUS, ICON_INACTIVE_ALPHA, ICON_SIZE, SLOT_RADIUS, TOP_SCALE};
use crate::gui::theme::ThemeColors;
use cairo::Context;
use gdk4::prelude::*;
use gdk_pixbuf::Pixbuf;
use palette::Srgba;
use rondo_wheel::SlotPosition;
use std::f64::consts::PI;

struct SlotRenderer<'a> {
    /// `None` renders the synthetic overflow slot.
    item: Option<&'a WheelItem>,
    geometry: SlotPosition,
    radius: f64,
    scale: f64,
}

impl<'a> SlotRenderer<'a> {
    fn new(item: Option<&'a WheelItem>, geometry: SlotPosition, scale_factor: f64) -> Self {
        // The anchored slot renders larger; the flag is advisory and only
        // ever set on one slot at a time.
        let scale = if geometry.is_top { TOP_SCALE } else { 1.0 };
        Self {
            item,
            geometry,
            radius: SLOT_RADIUS * scale_factor * scale,
            scale: scale_factor * scale,
        }
    }

    fn draw(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        self.draw_circle(cr, colors)?;
        self.draw_content(cr)?;
        Ok(())
    }

    fn draw_circle(&self, cr: &Context, colors: &ThemeColors) -> Result<(), cairo::Error> {
        let state = SlotVisual::resolve(self.item, self.geometry.is_top);
        let color = state.color(colors);
        let (r, g, b, a) = color.into_components();
        cr.set_source_rgba(r, g, b, a);
        cr.arc(
            self.geometry.center.x,
            self.geometry.center.y,
            self.radius,
            0.0,
            2.0 * PI,
        );
        cr.fill()
    }

    fn draw_content(&self, cr: &Context) -> Result<(), cairo::Error> {
        match self.item {
            Some(item) => {
                if let Some(pixbuf) = &item.pixbuf {
                    self.draw_icon(cr, pixbuf)
                } else {
                    self.draw_text(cr, item.label.as_ref())
                }
            }
            None => self.draw_text(cr, "\u{22ef}"),
        }
    }

    fn draw_icon(&self, cr: &Context, pixbuf: &Pixbuf) -> Result<(), cairo::Error> {
        // fit icon into slot
        let icon_scale = (self.radius * 2.0 * 0.75) / ICON_SIZE as f64;
        let (iw, ih) = (
            pixbuf.width() as f64 * icon_scale,
            pixbuf.height() as f64 * icon_scale,
        );
        // center icon in slot
        let (ix, iy) = (
            self.geometry.center.x - iw / 2.0,
            self.geometry.center.y - ih / 2.0,
        );

        cr.save()?;
        cr.translate(ix, iy);
        cr.scale(icon_scale, icon_scale);

        // dim icons away from the anchor
        if !self.geometry.is_top {
            cr.push_group();
            cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
            cr.paint()?;
            cr.pop_group_to_source()?;
            cr.paint_with_alpha(ICON_INACTIVE_ALPHA)?;
        } else {
            cr.set_source_pixbuf(pixbuf, 0.0, 0.0);
            cr.paint()?;
        }
        cr.restore()
    }

    fn draw_text(&self, cr: &Context, text: &str) -> Result<(), cairo::Error> {
        cr.set_source_rgb(1.0, 1.0, 1.0);
        cr.select_font_face("Sans", cairo::FontSlant::Normal, cairo::FontWeight::Bold);
        cr.set_font_size(12.0 * self.scale);
        if let Ok(ext) = cr.text_extents(text) {
            cr.move_to(
                self.geometry.center.x - ext.width() / 2.0,
                self.geometry.center.y + ext.height() / 2.0,
            );
            cr.show_text(text)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotVisual {
    Broken,
    Top,
    Idle,
}

impl SlotVisual {
    /// Visual priority: config errors, then the anchored slot, then idle.
    /// The overflow slot is never broken.
    fn resolve(item: Option<&WheelItem>, is_top: bool) -> Self {
        if item.is_some_and(|i| i.is_broken()) {
            Self::Broken
        } else if is_top {
            Self::Top
        } else {
            Self::Idle
        }
    }

    fn color(&self, colors: &ThemeColors) -> Srgba<f64> {
        match self {
            Self::Broken => colors.broken,
            Self::Top => colors.top,
            Self::Idle => colors.default,
        }
    }
}

pub fn draw(cr: &Context, state: &State, colors: &ThemeColors) -> Result<(), cairo::Error> {
    draw_center_circle(cr, state, colors)?;

    for index in 0..state.wheel.slot_count() {
        let geometry = state.slot_geometry(index);
        SlotRenderer::new(state.item_at(index), geometry, state.scale_factor)
            .draw(cr, colors)?;
    }
    Ok(())
}

fn draw_center_circle(
    cr: &Context,
    state: &State,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let (r, g, b, a) = colors.center_circle.into_components();
    cr.set_source_rgba(r, g, b, a);
    cr.arc(
        state.center.x,
        state.center.y,
        CENTER_CIRCLE_RADIUS * state.scale_factor,
        0.0,
        2.0 * PI,
    );
    cr.fill()
}
