//! Poster artwork in the terminal.
//!
//! Truecolor terminals get half-block cells (two pixels per character); other
//! terminals fall back to an ASCII luminance ramp. `off` disables artwork.

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use image::DynamicImage;
use ratatui::{
  buffer::Buffer,
  layout::Rect,
  style::{Color, Style},
  widgets::Widget,
};
use reqwest::Client;

// --- Mode selection ---

/// Poster mode as requested on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CliPosterMode {
  /// Probe the terminal and pick the best supported mode.
  Auto,
  /// Truecolor half-block rendering.
  Blocks,
  /// Grayscale ASCII rendering.
  Ascii,
  /// No poster artwork.
  Off,
}

/// Poster mode actually in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PosterMode {
  Blocks,
  Ascii,
  Off,
}

impl PosterMode {
  pub fn label(&self) -> &'static str {
    match self {
      PosterMode::Blocks => "blocks",
      PosterMode::Ascii => "ascii",
      PosterMode::Off => "off",
    }
  }
}

/// Best mode the terminal advertises support for. COLORTERM is the only probe
/// that works without writing to the tty.
pub fn detect_poster_mode() -> PosterMode {
  let colorterm = std::env::var("COLORTERM").unwrap_or_default().to_lowercase();
  if colorterm.contains("truecolor") || colorterm.contains("24bit") {
    PosterMode::Blocks
  } else {
    PosterMode::Ascii
  }
}

pub fn resolve_poster_mode(cli: CliPosterMode) -> PosterMode {
  match cli {
    CliPosterMode::Auto => detect_poster_mode(),
    CliPosterMode::Blocks => PosterMode::Blocks,
    CliPosterMode::Ascii => PosterMode::Ascii,
    CliPosterMode::Off => PosterMode::Off,
  }
}

// --- Fetching ---

/// Downloads and decodes a poster image.
pub async fn fetch_poster(client: &Client, url: &str) -> Result<DynamicImage> {
  let response = client.get(url).send().await.context("poster request failed")?;
  if !response.status().is_success() {
    bail!("poster request returned {}", response.status());
  }
  let bytes = response.bytes().await.context("poster body unreadable")?;
  image::load_from_memory(&bytes).context("poster is not a decodable image")
}

// --- Poster widget ---

const ASCII_CHARS: [&str; 10] = [" ", ".", ":", "-", "=", "+", "*", "#", "%", "@"];

pub struct PosterWidget<'a> {
  pub image: &'a DynamicImage,
  pub mode: PosterMode,
}

impl Widget for PosterWidget<'_> {
  fn render(self, area: Rect, buf: &mut Buffer) {
    if area.is_empty() {
      return;
    }
    match self.mode {
      PosterMode::Blocks => render_blocks(self.image, area, buf),
      PosterMode::Ascii => render_ascii(self.image, area, buf),
      PosterMode::Off => {}
    }
  }
}

fn render_blocks(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  // Image is already resized by the caller; just convert to RGB8.
  let resized = image.to_rgb8();
  let img_w = resized.width().min(area.width as u32);
  let img_h = resized.height();
  let cell_h = img_h.div_ceil(2);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(cell_h) / 2;

  for y in 0..cell_h.min(area.height as u32) {
    for x in 0..img_w {
      let upper = resized.get_pixel(x, y * 2);
      let lower_y = y * 2 + 1;
      let fg = Color::Rgb(upper[0], upper[1], upper[2]);
      let bg = if lower_y < img_h {
        let lower = resized.get_pixel(x, lower_y);
        Color::Rgb(lower[0], lower[1], lower[2])
      } else {
        Color::Reset
      };
      buf.set_string(
        area.x.saturating_add((offset_x.min(u16::MAX as u32)) as u16).saturating_add((x.min(u16::MAX as u32)) as u16),
        area.y.saturating_add((offset_y.min(u16::MAX as u32)) as u16).saturating_add((y.min(u16::MAX as u32)) as u16),
        "▀",
        Style::default().fg(fg).bg(bg),
      );
    }
  }
}

fn render_ascii(image: &DynamicImage, area: Rect, buf: &mut Buffer) {
  // Image is already resized by the caller; just convert to grayscale.
  let resized = image.to_luma8();
  let img_w = resized.width().min(area.width as u32);
  let img_h = resized.height().min(area.height as u32);
  let offset_x = (area.width as u32).saturating_sub(img_w) / 2;
  let offset_y = (area.height as u32).saturating_sub(img_h) / 2;

  for y in 0..img_h {
    for x in 0..img_w {
      let pixel = resized.get_pixel(x, y)[0];
      let idx = ((pixel as f32 / 255.0) * (ASCII_CHARS.len() - 1) as f32).round() as usize;
      let idx = idx.min(ASCII_CHARS.len() - 1);
      buf.set_string(
        area.x.saturating_add((offset_x.min(u16::MAX as u32)) as u16).saturating_add((x.min(u16::MAX as u32)) as u16),
        area.y.saturating_add((offset_y.min(u16::MAX as u32)) as u16).saturating_add((y.min(u16::MAX as u32)) as u16),
        ASCII_CHARS[idx],
        Style::default(),
      );
    }
  }
}
