//! Per-subset bar charts of class instance counts.
//!
//! Charts are drawn straight into an `RgbImage`: one bar per class in label
//! map order, the count above each bar and the class name below it. Text uses
//! a small built-in 5x7 upper-case glyph set.

use image::{Rgb, RgbImage};

use crate::error::{ConvertError, Result};
use crate::label_map::ClassMap;
use crate::layout::DatasetLayout;
use crate::types::{ClassCounts, Subset, SubsetCounts};

const MARGIN_LEFT: u32 = 64;
const MARGIN_RIGHT: u32 = 24;
const MARGIN_TOP: u32 = 48;
const MARGIN_BOTTOM: u32 = 32;
const PLOT_HEIGHT: u32 = 320;
const MIN_SLOT_WIDTH: u32 = 36;
const MAX_LABEL_CHARS: usize = 14;
const Y_TICKS: usize = 4;

const GLYPH_W: u32 = 5;
const GLYPH_H: u32 = 7;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const BAR: Rgb<u8> = Rgb([31, 119, 180]);

/// Draw the class count chart of one subset.
pub fn render_class_counts(subset: Subset, class_map: &ClassMap, counts: &SubsetCounts) -> RgbImage {
    let names = class_map.names();
    let values: Vec<usize> = names.iter().map(|name| counts.get(name)).collect();
    let max_count = values.iter().copied().max().unwrap_or(0).max(1);

    let label_chars = names
        .iter()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_LABEL_CHARS) as u32;
    let slot = MIN_SLOT_WIDTH.max(label_chars * (GLYPH_W + 1) + 12);
    let slots = names.len().max(1) as u32;

    let width = MARGIN_LEFT + slots * slot + MARGIN_RIGHT;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
    let mut img = RgbImage::from_pixel(width, height, WHITE);

    let baseline = MARGIN_TOP + PLOT_HEIGHT;
    let title = format!("{} class counts", subset.name());
    draw_text(&mut img, MARGIN_LEFT, 14, &title, 2, BLACK);

    // y grid and tick labels
    for tick in 0..=Y_TICKS {
        let value = max_count * tick / Y_TICKS;
        let y = baseline - (value as f64 / max_count as f64 * PLOT_HEIGHT as f64).round() as u32;
        fill_rect(&mut img, MARGIN_LEFT, y, slots * slot, 1, GRID);
        let text = value.to_string();
        let x = MARGIN_LEFT.saturating_sub(text_width(&text, 1) + 6);
        draw_text(&mut img, x, y.saturating_sub(GLYPH_H / 2), &text, 1, BLACK);
    }

    let bar_width = slot * 3 / 5;
    for (i, (name, &count)) in names.iter().zip(values.iter()).enumerate() {
        let slot_x = MARGIN_LEFT + i as u32 * slot;
        let bar_height = (count as f64 / max_count as f64 * PLOT_HEIGHT as f64).round() as u32;
        let bar_x = slot_x + (slot - bar_width) / 2;
        let bar_top = baseline - bar_height;
        fill_rect(&mut img, bar_x, bar_top, bar_width, bar_height, BAR);

        let text = count.to_string();
        let text_x = slot_x + (slot.saturating_sub(text_width(&text, 1))) / 2;
        draw_text(&mut img, text_x, bar_top.saturating_sub(GLYPH_H + 3), &text, 1, BLACK);

        let label: String = name.chars().take(MAX_LABEL_CHARS).collect();
        let label_x = slot_x + (slot.saturating_sub(text_width(&label, 1))) / 2;
        draw_text(&mut img, label_x, baseline + 8, &label, 1, BLACK);
    }

    // axes
    fill_rect(&mut img, MARGIN_LEFT, MARGIN_TOP, 1, PLOT_HEIGHT + 1, BLACK);
    fill_rect(&mut img, MARGIN_LEFT, baseline, slots * slot, 1, BLACK);

    img
}

/// Render and save the chart of every subset in `counts`.
pub fn write_reports(layout: &DatasetLayout, class_map: &ClassMap, counts: &ClassCounts) -> Result<()> {
    for (subset, subset_counts) in counts.iter() {
        let path = layout.report_path(subset);
        render_class_counts(subset, class_map, subset_counts)
            .save(&path)
            .map_err(|source| ConvertError::Render {
                path: path.clone(),
                source,
            })?;
        log::info!("Wrote {} class count chart to {}", subset, path.display());
    }
    Ok(())
}

/// Log a per-class count table with one column per subset.
pub fn log_class_counts(class_map: &ClassMap, counts: &ClassCounts) {
    let name_width = class_map
        .names()
        .iter()
        .map(|name| name.len())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut header = format!("{:<width$}", "class", width = name_width);
    for (subset, _) in counts.iter() {
        header.push_str(&format!(" {:>8}", subset.name()));
    }
    log::info!("{}", header);

    for name in class_map.names() {
        let mut row = format!("{:<width$}", name, width = name_width);
        for (_, subset_counts) in counts.iter() {
            row.push_str(&format!(" {:>8}", subset_counts.get(name)));
        }
        log::info!("{}", row);
    }

    let mut totals = format!("{:<width$}", "total", width = name_width);
    for (_, subset_counts) in counts.iter() {
        totals.push_str(&format!(" {:>8}", subset_counts.total()));
    }
    log::info!("{}", totals);
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    let x_end = x.saturating_add(w).min(img.width());
    let y_end = y.saturating_add(h).min(img.height());
    for py in y..y_end {
        for px in x..x_end {
            img.put_pixel(px, py, color);
        }
    }
}

fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    (chars * (GLYPH_W + 1)).saturating_sub(1) * scale
}

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, scale: u32, color: Rgb<u8>) {
    let mut cursor = x;
    for c in text.chars() {
        let rows = glyph(c);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) != 0 {
                    fill_rect(
                        img,
                        cursor + col * scale,
                        y + row as u32 * scale,
                        scale,
                        scale,
                        color,
                    );
                }
            }
        }
        cursor += (GLYPH_W + 1) * scale;
    }
}

// 5x7 bitmaps, one byte per row, bit 4 is the leftmost column
const LETTERS: [[u8; 7]; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
    [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
    [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
];

const DIGITS: [[u8; 7]; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
];

fn glyph(c: char) -> [u8; 7] {
    let c = c.to_ascii_uppercase();
    match c {
        'A'..='Z' => LETTERS[(c as u8 - b'A') as usize],
        '0'..='9' => DIGITS[(c as u8 - b'0') as usize],
        ' ' => [0; 7],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '/' => [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}
