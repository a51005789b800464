use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode, View};
use crate::constants::constants;

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('f') {
    app.next_kind_filter();
    return;
  }

  // The overlay swallows everything else while it's up.
  if app.detail.is_open() {
    handle_detail_key(app, key);
    return;
  }

  match key.code {
    KeyCode::Tab => {
      app.show_view(app.view.next());
      return;
    }
    KeyCode::BackTab => {
      app.show_view(app.view.prev());
      return;
    }
    _ => {}
  }

  match app.view {
    View::Search => match app.mode {
      AppMode::Input => handle_input_key(app, key),
      AppMode::Results => handle_results_key(app, key),
    },
    View::Favorites => handle_favorites_key(app, key),
    View::History => handle_history_key(app, key),
  }
}

fn handle_detail_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Esc | KeyCode::Char('q') => {
      app.close_detail();
    }
    KeyCode::Char('f') => {
      app.toggle_favorite_detail();
    }
    _ => {}
  }
}

fn handle_input_key(app: &mut App, key: event::KeyEvent) {
  app.last_error = None;
  match key.code {
    KeyCode::Enter => {
      app.trigger_search();
    }
    KeyCode::Char(c) => {
      if app.input.chars().count() < constants().input_cap {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.insert(byte_idx, c);
        app.cursor_position += 1;
      }
    }
    KeyCode::Backspace => {
      if app.cursor_position > 0 {
        app.cursor_position -= 1;
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Delete => {
      if app.cursor_position < app.input.chars().count() {
        let byte_idx = char_to_byte_index(&app.input, app.cursor_position);
        app.input.remove(byte_idx);
      }
    }
    KeyCode::Left => {
      app.cursor_position = app.cursor_position.saturating_sub(1);
    }
    KeyCode::Right => {
      if app.cursor_position < app.input.chars().count() {
        app.cursor_position += 1;
      }
    }
    KeyCode::Home => {
      app.cursor_position = 0;
    }
    KeyCode::End => {
      app.cursor_position = app.input.chars().count();
    }
    KeyCode::Esc => {
      if !app.input.is_empty() {
        app.input.clear();
        app.cursor_position = 0;
        app.input_scroll = 0;
      } else if !app.results.is_empty() {
        app.mode = AppMode::Results;
      } else {
        app.should_quit = true;
      }
    }
    KeyCode::Down => {
      if !app.results.is_empty() {
        app.mode = AppMode::Results;
      }
    }
    _ => {}
  }
}

fn handle_results_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      app.trigger_detail();
    }
    KeyCode::Char('f') => {
      app.toggle_favorite();
    }
    KeyCode::Left | KeyCode::Char('h') => {
      app.change_page(app.page.saturating_sub(1));
    }
    KeyCode::Right | KeyCode::Char('l') => {
      app.change_page(app.page.saturating_add(1));
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.results.len();
      if count > 0 {
        let i = app.list_state.selected().map_or(0, |i| (i + 1) % count);
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.results.len();
      if count > 0 {
        let i =
          app.list_state.selected().map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.list_state.select(Some(i));
      }
    }
    KeyCode::Esc => {
      app.mode = AppMode::Input;
    }
    _ => {}
  }
}

fn handle_favorites_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      app.trigger_detail();
    }
    KeyCode::Char('f') => {
      app.toggle_favorite();
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.favorites.len();
      if count > 0 {
        let i = app.favorites_state.selected().map_or(0, |i| (i + 1) % count);
        app.favorites_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.favorites.len();
      if count > 0 {
        let i = app
          .favorites_state
          .selected()
          .map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.favorites_state.select(Some(i));
      }
    }
    KeyCode::Esc => {
      app.show_view(View::Search);
    }
    _ => {}
  }
}

fn handle_history_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      app.activate_history_entry();
    }
    KeyCode::Char('d') | KeyCode::Delete => {
      app.remove_history_entry();
    }
    KeyCode::Down | KeyCode::Char('j') => {
      let count = app.history.len();
      if count > 0 {
        let i = app.history_state.selected().map_or(0, |i| (i + 1) % count);
        app.history_state.select(Some(i));
      }
    }
    KeyCode::Up | KeyCode::Char('k') => {
      let count = app.history.len();
      if count > 0 {
        let i = app
          .history_state
          .selected()
          .map_or(0, |i| if i == 0 { count.saturating_sub(1) } else { i.saturating_sub(1) });
        app.history_state.select(Some(i));
      }
    }
    KeyCode::Esc => {
      app.show_view(View::Search);
    }
    _ => {}
  }
}
