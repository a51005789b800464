use chrono::{Local, TimeZone};
use image::imageops::FilterType;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode, View};
use crate::history::HistoryEntry;
use crate::omdb::{SearchItem, available};
use crate::poster::{PosterMode, PosterWidget};
use crate::theme::Theme;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

/// Epoch millis as local "YYYY-MM-DD HH:MM". Unrepresentable stamps render blank.
fn format_timestamp(millis: i64) -> String {
  match Local.timestamp_millis_opt(millis).single() {
    Some(when) => when.format("%Y-%m-%d %H:%M").to_string(),
    None => String::new(),
  }
}

/// Centered rectangle covering `percent_x` by `percent_y` of `area`.
fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
  let [_, mid, _] = Layout::vertical([
    Constraint::Percentage((100 - percent_y) / 2),
    Constraint::Percentage(percent_y),
    Constraint::Percentage((100 - percent_y) / 2),
  ])
  .areas(area);
  let [_, mid, _] = Layout::horizontal([
    Constraint::Percentage((100 - percent_x) / 2),
    Constraint::Percentage(percent_x),
    Constraint::Percentage((100 - percent_x) / 2),
  ])
  .areas(mid);
  mid
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  match app.view {
    View::Search => {
      let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(1),
      ])
      .areas(frame.area());

      render_header(frame, app, header_area);
      render_main(frame, app, main_area);
      render_status(frame, app, status_area);
      render_input(frame, app, input_area);
      render_footer(frame, app, footer_area);
    }
    View::Favorites | View::History => {
      let [header_area, main_area, status_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(1),
        Constraint::Length(1),
      ])
      .areas(frame.area());

      render_header(frame, app, header_area);
      render_main(frame, app, main_area);
      render_status(frame, app, status_area);
      render_footer(frame, app, footer_area);
    }
  }

  if app.detail.is_open() {
    render_detail_overlay(frame, app, frame.area());
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let mut spans = vec![Span::styled(" ◆ reel ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))];
  for view in View::ALL {
    spans.push(Span::raw(" "));
    let style = if view == app.view {
      Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD)
    } else {
      Style::default().fg(theme.muted)
    };
    spans.push(Span::styled(format!(" {} ", view.label()), style));
  }
  frame.render_widget(Line::from(spans), area);

  let version = format!("v{} ", env!("CARGO_PKG_VERSION"));
  let w = (version.len() as u16).min(area.width);
  let right = Line::from(Span::styled(&version, Style::default().fg(theme.muted)));
  frame.render_widget(right, Rect { x: area.x + area.width - w, width: w, ..area });
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  match app.view {
    View::Search => {
      if app.results.is_empty() {
        render_search_empty(frame, app, area);
      } else {
        render_results(frame, app, area);
      }
    }
    View::Favorites => render_favorites(frame, app, area),
    View::History => render_history(frame, app, area),
  }
}

fn render_search_empty(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border));

  if app.query.is_empty() {
    let text = vec![
      Line::from(""),
      Line::from(Span::styled("◆  Welcome to reel", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
      Line::from(""),
      Line::from(Span::styled("Search movies and series. Straight from the terminal.", Style::default().fg(theme.fg))),
      Line::from(""),
      Line::from(Span::styled("Type a title below and press Enter.", Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
  } else if app.loading {
    frame.render_widget(block, area);
  } else {
    // A fetched page can also end up empty after the kind filter narrows it.
    let message = if app.total_results > 0 {
      format!("Nothing on this page matches the {} filter.", app.kind_filter.label())
    } else {
      format!("No results for '{}'.", app.query)
    };
    let text = vec![Line::from(""), Line::from(Span::styled(message, Style::default().fg(theme.muted)))];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
  }
}

/// One row of a title list: star marker, title, then "kind  year" on the right.
fn title_row(
  theme: &Theme,
  entry: &SearchItem,
  starred: bool,
  selected: bool,
  striped: bool,
  inner_w: usize,
) -> ListItem<'static> {
  let fg = if selected { theme.highlight_fg } else { theme.fg };
  let bg = if selected {
    theme.highlight_bg
  } else if striped {
    theme.stripe_bg
  } else {
    theme.bg
  };

  let star = if starred { "★ " } else { "  " };
  let right = format!("{}  {}", entry.kind, entry.year);
  let right_w = right.chars().count();
  let title_max = inner_w.saturating_sub(2 + right_w + 2);
  let title = truncate_str(&entry.title, title_max);
  let title_w = title.chars().count();
  let gap = inner_w.saturating_sub(2 + title_w + right_w);

  let line = Line::from(vec![
    Span::styled(star, Style::default().fg(theme.accent)),
    Span::styled(title, Style::default().fg(fg)),
    Span::raw(" ".repeat(gap)),
    Span::styled(right, Style::default().fg(theme.muted)),
  ]);
  ListItem::new(line).bg(bg)
}

fn render_results(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .results
    .iter()
    .enumerate()
    .map(|(i, entry)| {
      let selected = Some(i) == app.list_state.selected();
      title_row(theme, entry, app.favorites.is_favorite(&entry.id), selected, i % 2 == 1, inner_w)
    })
    .collect();

  let title = format!(
    " Results — page {}/{} · {} matches · {} ",
    app.page,
    app.total_pages(),
    app.total_results,
    app.kind_filter.label()
  );

  let list = List::new(items)
    .block(
      Block::bordered()
        .title(title)
        .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
        .border_type(ratatui::widgets::BorderType::Rounded)
        .border_style(Style::default().fg(theme.border)),
    )
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_favorites(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(format!(" Favorites — {} ", app.favorites.len()))
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border));

  if app.favorites.is_empty() {
    let text = vec![
      Line::from(""),
      Line::from(Span::styled("No favorites yet.", Style::default().fg(theme.fg))),
      Line::from(""),
      Line::from(Span::styled("Press f on a result to star it.", Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
    return;
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = app
    .favorites
    .items()
    .iter()
    .enumerate()
    .map(|(i, entry)| {
      let selected = Some(i) == app.favorites_state.selected();
      title_row(theme, entry, true, selected, i % 2 == 1, inner_w)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.favorites_state);
}

fn render_history(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let block = Block::bordered()
    .title(format!(" History — {} entries ", app.history.len()))
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.border));

  if app.history.is_empty() {
    let text = vec![
      Line::from(""),
      Line::from(Span::styled("No history yet.", Style::default().fg(theme.fg))),
      Line::from(""),
      Line::from(Span::styled("Searches and opened titles land here.", Style::default().fg(theme.muted))),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center).block(block), area);
    return;
  }

  let inner_w = area.width.saturating_sub(4) as usize;
  let items: Vec<ListItem> = app
    .history
    .entries()
    .iter()
    .enumerate()
    .map(|(i, entry)| {
      let selected = Some(i) == app.history_state.selected();
      let fg = if selected { theme.highlight_fg } else { theme.fg };
      let bg = if selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let (icon, text) = match entry {
        HistoryEntry::Search { query, .. } => ("⌕ ", query.as_str()),
        HistoryEntry::Movie { title, .. } => ("▣ ", title.as_str()),
      };
      let right = format_timestamp(entry.timestamp());
      let right_w = right.chars().count();
      let text_max = inner_w.saturating_sub(2 + right_w + 2);
      let text = truncate_str(text, text_max);
      let text_w = text.chars().count();
      let gap = inner_w.saturating_sub(2 + text_w + right_w);

      let line = Line::from(vec![
        Span::styled(icon, Style::default().fg(theme.muted)),
        Span::styled(text, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.history_state);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if app.loading {
    (format!(" ⏳ Searching '{}'…", app.query), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if !app.query.is_empty() && app.total_results > 0 {
    (format!(" {} matches for '{}'", app.total_results, app.query), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let border_color = if app.mode == AppMode::Input { theme.accent } else { theme.border };
  let input_block = Block::bordered()
    .title(" Search titles ")
    .title_style(Style::default().fg(border_color))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&app.input, app.cursor_position);

  if cursor_col < app.input_scroll {
    app.input_scroll = cursor_col;
  } else if cursor_col >= app.input_scroll + inner_w {
    app.input_scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let visible: String = app
    .input
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= app.input_scroll)
    .take_while(|(start, _, _)| *start < app.input_scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(input_block);
  frame.render_widget(paragraph, area);

  if app.mode == AppMode::Input && !app.detail.is_open() && inner_w > 0 {
    let cursor_x = area.x + 2 + cursor_col.saturating_sub(app.input_scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = if app.detail.is_open() {
    vec![("Esc", "Close"), ("f", "Favorite"), ("^t", "Theme")]
  } else {
    match app.view {
      View::Search => match app.mode {
        AppMode::Input => {
          let mut k = vec![("Enter", "Search"), ("Tab", "View"), ("^t", "Theme")];
          if !app.results.is_empty() {
            k.push(("↓", "Results"));
            k.push(("Esc", "Results"));
          } else {
            k.push(("Esc", "Quit"));
          }
          k
        }
        AppMode::Results => vec![
          ("Enter", "Details"),
          ("f", "Favorite"),
          ("j/k", "Navigate"),
          ("←/→", "Page"),
          ("^f", "Filter"),
          ("Esc", "Back"),
        ],
      },
      View::Favorites => vec![("Enter", "Details"), ("f", "Unfavorite"), ("j/k", "Navigate"), ("Tab", "View")],
      View::History => vec![("Enter", "Open"), ("d", "Remove"), ("j/k", "Navigate"), ("Tab", "View")],
    }
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let right_label = format!("[{}] {} ", app.poster_mode.label(), theme.name);
  let w = (right_label.len() as u16).min(area.width);
  let right = Line::from(Span::styled(&right_label, Style::default().fg(theme.muted)));
  frame.render_widget(right, Rect { x: area.x + area.width - w, width: w, ..area });
}

// --- Detail overlay ---

fn render_detail_overlay(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  let popup = popup_area(area, 80, 80);
  frame.render_widget(Clear, popup);

  let title = match app.detail.detail.as_deref() {
    Some(detail) => format!(" {} ({}) ", detail.title, detail.year),
    None => " Details ".to_string(),
  };
  let block = Block::bordered()
    .title(title)
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .border_type(ratatui::widgets::BorderType::Rounded)
    .border_style(Style::default().fg(theme.accent))
    .padding(Padding::horizontal(1))
    .style(Style::default().bg(theme.bg));
  let inner = block.inner(popup);
  frame.render_widget(block, popup);

  if app.detail.loading {
    let text = vec![Line::from(""), Line::from(Span::styled("⏳ Loading details…", Style::default().fg(theme.status)))];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
    return;
  }
  if let Some(err) = &app.detail.error {
    let text = vec![Line::from(""), Line::from(Span::styled(format!("⚠  {}", err), Style::default().fg(theme.error)))];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
    return;
  }

  // Poster column on the left when there's artwork and room for it.
  let body_area = if app.poster_mode != PosterMode::Off && app.detail.poster.is_some() && inner.width > 40 {
    let poster_w = (inner.width / 3).min(26);
    let [poster_area, _, text_area] =
      Layout::horizontal([Constraint::Length(poster_w), Constraint::Length(2), Constraint::Min(10)]).areas(inner);
    render_poster(frame, app, poster_area);
    text_area
  } else {
    inner
  };

  let Some(detail) = app.detail.detail.as_deref() else { return };

  let mut lines: Vec<Line<'static>> = Vec::new();

  let subtitle: Vec<&str> = [detail.runtime.as_str(), detail.rated.as_str(), detail.kind.as_str()]
    .into_iter()
    .filter(|part| available(part))
    .collect();
  if !subtitle.is_empty() {
    lines.push(Line::from(Span::styled(subtitle.join("  ·  "), Style::default().fg(theme.muted))));
  }

  if available(&detail.imdb_rating) {
    let mut spans = vec![
      Span::styled("★ ", Style::default().fg(theme.accent)),
      Span::styled(format!("{} / 10", detail.imdb_rating), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD)),
    ];
    if available(&detail.imdb_votes) {
      spans.push(Span::styled(format!("  {} votes", detail.imdb_votes), Style::default().fg(theme.muted)));
    }
    lines.push(Line::from(spans));
  }

  if app.favorites.is_favorite(&detail.id) {
    lines.push(Line::from(Span::styled("★ In favorites", Style::default().fg(theme.accent))));
  }
  lines.push(Line::from(""));

  push_field(&mut lines, theme, "Genre", &detail.genre);
  push_field(&mut lines, theme, "Released", &detail.released);
  push_field(&mut lines, theme, "Director", &detail.director);
  push_field(&mut lines, theme, "Writer", &detail.writer);
  push_field(&mut lines, theme, "Actors", &detail.actors);
  push_field(&mut lines, theme, "Language", &detail.language);
  push_field(&mut lines, theme, "Country", &detail.country);
  push_field(&mut lines, theme, "Awards", &detail.awards);
  if let Some(ref box_office) = detail.box_office {
    push_field(&mut lines, theme, "Box office", box_office);
  }
  if let Some(ref production) = detail.production {
    push_field(&mut lines, theme, "Production", production);
  }

  if available(&detail.plot) {
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Plot", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))));
    lines.push(Line::from(Span::styled(detail.plot.clone(), Style::default().fg(theme.fg))));
  }

  frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), body_area);
}

fn push_field(lines: &mut Vec<Line<'static>>, theme: &Theme, label: &str, value: &str) {
  if !available(value) {
    return;
  }
  lines.push(Line::from(vec![
    Span::styled(format!("{:<12}", label), Style::default().fg(theme.muted)),
    Span::styled(value.to_string(), Style::default().fg(theme.fg)),
  ]));
}

fn render_poster(frame: &mut Frame, app: &mut App, area: Rect) {
  let Some(id) = app.detail.detail.as_deref().map(|d| d.id.clone()) else { return };
  let Some(ref image) = app.detail.poster else { return };

  let needs_resize = match &app.detail.resized_poster {
    Some((cached_id, w, h, _)) => *cached_id != id || *w != area.width || *h != area.height,
    None => true,
  };
  if needs_resize {
    // Half-block cells pack two pixel rows into one terminal row.
    let target_h = match app.poster_mode {
      PosterMode::Blocks => (area.height as u32) * 2,
      _ => area.height as u32,
    };
    let resized = image.resize_to_fill((area.width as u32).max(1), target_h.max(1), FilterType::Lanczos3);
    app.detail.resized_poster = Some((id, area.width, area.height, resized));
  }

  if let Some((_, _, _, ref resized)) = app.detail.resized_poster {
    frame.render_widget(PosterWidget { image: resized, mode: app.poster_mode }, area);
  }
}
