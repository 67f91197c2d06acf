//! One-week bar chart of the gauge history as a PNG.
//!
//! Layout: 4 px per hour over the 7 days ending at the current reading,
//! 1 px per centimeter from the bottom edge. Day boundaries are black,
//! closure thresholds red, readings blue. Labels use a built-in 3×5 pixel font.

use std::io::Cursor;

use chrono::{NaiveDateTime, TimeDelta};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use tracing::debug;

use crate::contract::{Snapshot, TIME_LAYOUT};
use crate::error::ChartError;
use crate::message::LEVEL_THRESHOLDS;
use crate::pipeline::RECENT_DAYS;

pub const PX_PER_HOUR: i64 = 4;
pub const WIDTH: u32 = (RECENT_DAYS * 24 * PX_PER_HOUR) as u32;
pub const HEIGHT: u32 = 200;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
const RED: Rgb<u8> = Rgb([255, 0, 0]);

const GLYPH_W: i64 = 3;
const GLYPH_H: i64 = 5;

/// Rows of a 3×5 glyph, most significant of the low three bits is the left column.
fn glyph(c: char) -> [u8; 5] {
    match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        'c' => [0b000, 0b000, 0b111, 0b100, 0b111],
        'm' => [0b000, 0b000, 0b111, 0b111, 0b101],
        _ => [0; 5],
    }
}

struct Canvas {
    image: RgbImage,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    fn width(&self) -> i64 {
        self.image.width() as i64
    }

    fn height(&self) -> i64 {
        self.image.height() as i64
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if x >= 0 && y >= 0 && x < self.width() && y < self.height() {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.put(xx, yy, color);
            }
        }
    }

    /// Vertical line covering rows `y0..=y1`, clipped to the canvas.
    fn vline(&mut self, x: i64, y0: i64, y1: i64, color: Rgb<u8>) {
        let top = y0.min(y1).max(0);
        let bottom = y0.max(y1).min(self.height() - 1);
        for y in top..=bottom {
            self.put(x, y, color);
        }
    }

    fn hline(&mut self, y: i64, color: Rgb<u8>) {
        for x in 0..self.width() {
            self.put(x, y, color);
        }
    }

    fn measure(text: &str, scale: i64) -> (i64, i64) {
        let n = text.chars().count() as i64;
        let w = if n == 0 { 0 } else { (n * (GLYPH_W + 1) - 1) * scale };
        (w, GLYPH_H * scale)
    }

    fn text(&mut self, text: &str, x: i64, top: i64, scale: i64, color: Rgb<u8>) {
        for (i, c) in text.chars().enumerate() {
            let origin = x + i as i64 * (GLYPH_W + 1) * scale;
            for (row, bits) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_W {
                    if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                        self.fill_rect(
                            origin + col * scale,
                            top + row as i64 * scale,
                            scale,
                            scale,
                            color,
                        );
                    }
                }
            }
        }
    }

    /// Black text on a white box; `baseline` is the bottom edge of the text.
    fn boxed(&mut self, text: &str, x: i64, baseline: i64, center: bool, scale: i64) {
        let (w, h) = Self::measure(text, scale);
        let x = if center { x - w / 2 } else { x };
        self.fill_rect(x - 1, baseline - h - 1, w + 2, h + 2, WHITE);
        self.text(text, x, baseline - h, scale, BLACK);
    }

    fn encode_png(self) -> Result<Vec<u8>, ChartError> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(self.image).write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

fn x_for(timestamp: NaiveDateTime, origin: NaiveDateTime) -> i64 {
    (timestamp - origin).num_minutes() * PX_PER_HOUR / 60
}

/// Render the week ending at `snapshot.current` as PNG bytes.
pub fn render_chart(snapshot: &Snapshot) -> Result<Vec<u8>, ChartError> {
    if snapshot.recent.is_empty() {
        return Err(ChartError::Empty);
    }

    let mut canvas = Canvas::new(WIDTH, HEIGHT);
    let h = canvas.height();
    let current = snapshot.current;
    let origin = current.timestamp - TimeDelta::days(RECENT_DAYS);

    for m in &snapshot.recent {
        // The newest reading sits on the right edge; keep it visible.
        let x = x_for(m.timestamp, origin).min(canvas.width() - 1);
        if m.value > 0 {
            canvas.vline(x, h - 1, h - m.value, BLUE);
        }
    }

    let today = current.timestamp.date();
    for d in 0..RECENT_DAYS {
        let day = today - TimeDelta::days(d);
        let Some(midnight) = day.and_hms_opt(0, 0, 0) else {
            continue;
        };
        let x = x_for(midnight, origin);
        canvas.vline(x, 0, h - 1, BLACK);
        canvas.boxed(&day.format("%Y-%m-%d").to_string(), x, h - 2, true, 1);
    }

    for threshold in LEVEL_THRESHOLDS {
        canvas.hline(h - threshold, RED);
        canvas.boxed(&format!("{threshold}cm"), 1, h - threshold + 2, false, 1);
    }

    canvas.boxed(
        &format!(
            "{}cm ({})",
            current.value,
            current.timestamp.format(TIME_LAYOUT)
        ),
        1,
        14,
        false,
        2,
    );

    let png = canvas.encode_png()?;
    debug!(size = png.len(), points = snapshot.recent.len(), "Rendered chart");
    Ok(png)
}
