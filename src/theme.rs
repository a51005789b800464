//! Color palettes. Cycled at runtime with Ctrl+T; the pick persists in config.

use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub error: Color,
  pub status: Color,
  pub highlight_bg: Color,
  pub highlight_fg: Color,
  pub stripe_bg: Color,
  pub key_bg: Color,
  pub key_fg: Color,
}

pub static THEMES: &[Theme] = &[
  // Silver-screen grays with a marquee-gold accent.
  Theme {
    name: "noir",
    bg: Color::Rgb(16, 16, 20),
    fg: Color::Rgb(221, 221, 226),
    muted: Color::Rgb(122, 126, 137),
    accent: Color::Rgb(212, 175, 55),
    border: Color::Rgb(66, 70, 80),
    error: Color::Rgb(224, 108, 117),
    status: Color::Rgb(152, 195, 121),
    highlight_bg: Color::Rgb(45, 47, 57),
    highlight_fg: Color::Rgb(242, 242, 246),
    stripe_bg: Color::Rgb(22, 22, 27),
    key_bg: Color::Rgb(52, 56, 66),
    key_fg: Color::Rgb(212, 175, 55),
  },
  // Warm sepia daylight, like a matinee lobby card.
  Theme {
    name: "matinee",
    bg: Color::Rgb(246, 238, 222),
    fg: Color::Rgb(64, 50, 38),
    muted: Color::Rgb(150, 133, 112),
    accent: Color::Rgb(191, 84, 44),
    border: Color::Rgb(199, 182, 158),
    error: Color::Rgb(178, 52, 46),
    status: Color::Rgb(92, 199, 112),
    highlight_bg: Color::Rgb(226, 206, 172),
    highlight_fg: Color::Rgb(52, 38, 26),
    stripe_bg: Color::Rgb(239, 230, 211),
    key_bg: Color::Rgb(223, 210, 188),
    key_fg: Color::Rgb(140, 60, 30),
  },
  // Deep blue late show.
  Theme {
    name: "midnight",
    bg: Color::Rgb(13, 17, 30),
    fg: Color::Rgb(205, 214, 231),
    muted: Color::Rgb(94, 106, 132),
    accent: Color::Rgb(97, 175, 239),
    border: Color::Rgb(44, 52, 75),
    error: Color::Rgb(227, 112, 121),
    status: Color::Rgb(122, 202, 164),
    highlight_bg: Color::Rgb(30, 39, 63),
    highlight_fg: Color::Rgb(229, 236, 248),
    stripe_bg: Color::Rgb(17, 22, 38),
    key_bg: Color::Rgb(36, 45, 70),
    key_fg: Color::Rgb(140, 198, 255),
  },
  // Saturated three-strip color.
  Theme {
    name: "technicolor",
    bg: Color::Rgb(24, 16, 32),
    fg: Color::Rgb(240, 233, 244),
    muted: Color::Rgb(146, 128, 160),
    accent: Color::Rgb(255, 64, 129),
    border: Color::Rgb(82, 56, 104),
    error: Color::Rgb(255, 99, 99),
    status: Color::Rgb(64, 224, 178),
    highlight_bg: Color::Rgb(64, 36, 84),
    highlight_fg: Color::Rgb(255, 244, 250),
    stripe_bg: Color::Rgb(30, 21, 40),
    key_bg: Color::Rgb(58, 38, 78),
    key_fg: Color::Rgb(255, 170, 60),
  },
];
