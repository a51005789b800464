use anyhow::Result;
use image::DynamicImage;
use ratatui::widgets::ListState;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::config::Config;
use crate::constants::constants;
use crate::favorites::Favorites;
use crate::history::{History, HistoryEntry};
use crate::omdb::{
  DetailOutcome, NO_MATCH_ERROR, OmdbClient, PAGE_SIZE, SearchItem, SearchOutcome, TitleDetail, available,
};
use crate::poster::{PosterMode, fetch_poster};
use crate::storage::DiskStorage;
use crate::theme::{THEMES, Theme};

// --- Types ---

pub type DetailLoad = (DetailOutcome, Option<DynamicImage>);

/// Shown for any network-level failure; the cause goes to the log only.
pub const TRANSPORT_ERROR: &str = "Could not reach the movie database.";

/// Top-level screens, cycled with Tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
  Search,
  Favorites,
  History,
}

impl View {
  pub const ALL: [View; 3] = [View::Search, View::Favorites, View::History];

  pub fn label(self) -> &'static str {
    match self {
      View::Search => "Search",
      View::Favorites => "Favorites",
      View::History => "History",
    }
  }

  pub fn next(self) -> View {
    let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }

  pub fn prev(self) -> View {
    let idx = Self::ALL.iter().position(|v| *v == self).unwrap_or(0);
    Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
  }
}

/// Client-side narrowing of the visible page by media kind. Page math keeps
/// following the API's full match count; only the shown rows shrink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindFilter {
  All,
  Movie,
  Series,
}

impl KindFilter {
  pub const ALL: [KindFilter; 3] = [KindFilter::All, KindFilter::Movie, KindFilter::Series];

  pub fn label(self) -> &'static str {
    match self {
      KindFilter::All => "all",
      KindFilter::Movie => "movies",
      KindFilter::Series => "series",
    }
  }

  pub fn matches(self, item: &SearchItem) -> bool {
    match self {
      KindFilter::All => true,
      KindFilter::Movie => item.kind.eq_ignore_ascii_case("movie"),
      KindFilter::Series => item.kind.eq_ignore_ascii_case("series"),
    }
  }

  pub fn next(self) -> KindFilter {
    let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  Input,
  Results,
}

/// State of the title detail overlay.
#[derive(Default)]
pub struct DetailPane {
  pub detail: Option<Box<TitleDetail>>,
  pub loading: bool,
  pub error: Option<String>,
  pub poster: Option<DynamicImage>,
  /// Poster resized for the last layout, keyed by (id, cols, rows).
  pub resized_poster: Option<(String, u16, u16, DynamicImage)>,
}

impl DetailPane {
  /// True while the overlay should be drawn (loading, failed, or loaded).
  pub fn is_open(&self) -> bool {
    self.loading || self.error.is_some() || self.detail.is_some()
  }
}

/// In-flight async task receivers.
#[derive(Default)]
pub(crate) struct AsyncTasks {
  pub(crate) search_rx: Option<oneshot::Receiver<Result<SearchOutcome>>>,
  pub(crate) detail_rx: Option<oneshot::Receiver<Result<DetailLoad>>>,
}

pub struct App {
  pub input: String,
  pub cursor_position: usize,
  pub input_scroll: usize,
  pub view: View,
  pub mode: AppMode,
  pub theme_index: usize,
  pub poster_mode: PosterMode,
  /// The query the current results belong to, set when a search is submitted.
  pub query: String,
  pub page: u32,
  pub total_results: u32,
  pub kind_filter: KindFilter,
  /// Rows currently shown: the fetched page narrowed by `kind_filter`.
  pub results: Vec<SearchItem>,
  /// The fetched page as the API returned it.
  unfiltered: Vec<SearchItem>,
  pub loading: bool,
  pub last_error: Option<String>,
  pub should_quit: bool,
  pub list_state: ListState,
  pub favorites_state: ListState,
  pub history_state: ListState,
  pub detail: DetailPane,
  pub favorites: Favorites,
  pub history: History,
  pub(crate) tasks: AsyncTasks,
  client: OmdbClient,
  config: Config,
  /// Query whose history entry is owed once its search completes off-network.
  pending_history: Option<String>,
}

impl App {
  pub fn new(initial_query: String, api_key_flag: Option<String>, poster_mode: PosterMode) -> Self {
    let config = Config::load();
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name).unwrap_or(0) } else { 0 };
    let api_key = api_key_flag
      .or_else(|| std::env::var("OMDB_API_KEY").ok().filter(|key| !key.is_empty()))
      .or_else(|| config.api_key.clone())
      .unwrap_or_else(|| constants().demo_api_key.clone());
    // The startup query obeys the same length cap as typed input.
    let input: String = initial_query.chars().take(constants().input_cap).collect();
    let cursor_position = input.chars().count();

    Self {
      input,
      cursor_position,
      input_scroll: 0,
      view: View::Search,
      mode: AppMode::Input,
      theme_index,
      poster_mode,
      query: String::new(),
      page: 1,
      total_results: 0,
      kind_filter: KindFilter::All,
      results: Vec::new(),
      unfiltered: Vec::new(),
      loading: false,
      last_error: None,
      should_quit: false,
      list_state: ListState::default(),
      favorites_state: ListState::default(),
      history_state: ListState::default(),
      detail: DetailPane::default(),
      favorites: Favorites::load(Box::new(DiskStorage::new())),
      history: History::load(Box::new(DiskStorage::new())),
      tasks: AsyncTasks::default(),
      client: OmdbClient::new(api_key),
      config,
      pending_history: None,
    }
  }

  #[cfg(test)]
  pub(crate) fn with_stores(favorites: Favorites, history: History) -> Self {
    Self {
      input: String::new(),
      cursor_position: 0,
      input_scroll: 0,
      view: View::Search,
      mode: AppMode::Input,
      theme_index: 0,
      poster_mode: PosterMode::Off,
      query: String::new(),
      page: 1,
      total_results: 0,
      kind_filter: KindFilter::All,
      results: Vec::new(),
      unfiltered: Vec::new(),
      loading: false,
      last_error: None,
      should_quit: false,
      list_state: ListState::default(),
      favorites_state: ListState::default(),
      history_state: ListState::default(),
      detail: DetailPane::default(),
      favorites,
      history,
      tasks: AsyncTasks::default(),
      client: OmdbClient::new("test-key".to_string()),
      config: Config::default(),
      pending_history: None,
    }
  }

  pub fn theme(&self) -> &'static Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and clamped on initialization.
    &THEMES[self.theme_index]
  }

  fn save_config(&self) {
    let config = Config { theme_name: Some(self.theme().name.to_string()), api_key: self.config.api_key.clone() };
    config.save();
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  pub fn next_kind_filter(&mut self) {
    self.kind_filter = self.kind_filter.next();
    self.apply_filter();
  }

  /// Rebuild `results` from the fetched page and the current kind filter.
  /// Clamps the list selection to stay within the narrowed range.
  pub fn apply_filter(&mut self) {
    let filter = self.kind_filter;
    self.results = self.unfiltered.iter().filter(|item| filter.matches(item)).cloned().collect();
    if self.results.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      if sel >= self.results.len() {
        self.list_state.select(Some(self.results.len() - 1));
      }
    }
  }

  /// Pages the API reports for the current query, at 10 results per page.
  pub fn total_pages(&self) -> u32 {
    self.total_results.div_ceil(PAGE_SIZE)
  }

  /// Jump to `page` of the active query and refetch. Ignored while no query
  /// is active or when the target is out of range.
  pub fn change_page(&mut self, page: u32) {
    if self.query.is_empty() || page < 1 || page > self.total_pages() {
      return;
    }
    self.page = page;
    self.fetch_page();
  }

  pub fn trigger_search(&mut self) {
    let query = self.input.trim().to_string();
    if query.is_empty() {
      self.last_error = Some("Enter a search term.".to_string());
      return;
    }
    info!(query = %query, "search triggered");
    self.query = query.clone();
    self.page = 1;
    // The history entry is owed only once this search comes back off-network.
    self.pending_history = Some(query);
    self.fetch_page();
  }

  /// Fetch the current page of the active query. Replacing `search_rx` orphans
  /// any in-flight search, so a stale response can never land.
  fn fetch_page(&mut self) {
    self.tasks.search_rx = None;
    self.loading = true;
    self.last_error = None;
    let client = self.client.clone();
    let query = self.query.clone();
    let page = self.page;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(client.search(&query, page).await);
    });
    self.tasks.search_rx = Some(rx);
  }

  pub fn check_pending(&mut self) {
    if let Some(mut rx) = self.tasks.search_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.loading = false;
          match result {
            Ok(outcome) => {
              if let Some(query) = self.pending_history.take() {
                self.history.add_search(&query);
              }
              match outcome {
                SearchOutcome::Page { items, total_results } => {
                  self.unfiltered = items;
                  self.total_results = total_results;
                  self.last_error = None;
                  self.apply_filter();
                  if !self.results.is_empty() {
                    self.list_state.select(Some(0));
                    self.mode = AppMode::Results;
                  }
                }
                SearchOutcome::Failure(message) => {
                  self.unfiltered.clear();
                  self.total_results = 0;
                  self.apply_filter();
                  // "Nothing matched" is an ordinary outcome, not an error.
                  self.last_error = if message == NO_MATCH_ERROR { None } else { Some(message) };
                }
              }
            }
            Err(e) => {
              warn!(err = %e, "search: request failed");
              self.pending_history = None;
              self.last_error = Some(TRANSPORT_ERROR.to_string());
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.search_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.loading = false;
          self.pending_history = None;
          self.last_error = Some("Search task failed.".to_string());
        }
      }
    }

    if let Some(mut rx) = self.tasks.detail_rx.take() {
      match rx.try_recv() {
        Ok(result) => {
          self.detail.loading = false;
          match result {
            Ok((DetailOutcome::Detail(detail), poster)) => {
              self.detail.error = None;
              self.detail.poster = poster;
              self.detail.resized_poster = None;
              self.detail.detail = Some(detail);
            }
            Ok((DetailOutcome::Failure(message), _)) => {
              self.detail.error = Some(message);
            }
            Err(e) => {
              warn!(err = %e, "detail: request failed");
              self.detail.error = Some(TRANSPORT_ERROR.to_string());
            }
          }
        }
        Err(oneshot::error::TryRecvError::Empty) => {
          self.tasks.detail_rx = Some(rx);
        }
        Err(oneshot::error::TryRecvError::Closed) => {
          self.detail.loading = false;
          self.detail.error = Some("Lookup task failed.".to_string());
        }
      }
    }
  }

  /// The row under the cursor in whichever list the active view shows.
  pub fn selected_item(&self) -> Option<&SearchItem> {
    match self.view {
      View::Search => self.list_state.selected().and_then(|i| self.results.get(i)),
      View::Favorites => self.favorites_state.selected().and_then(|i| self.favorites.items().get(i)),
      View::History => None,
    }
  }

  /// Open the detail overlay for the selected row.
  pub fn trigger_detail(&mut self) {
    let Some(item) = self.selected_item() else { return };
    let (id, title) = (item.id.clone(), item.title.clone());
    self.trigger_detail_for(&id, &title);
  }

  pub fn trigger_detail_for(&mut self, id: &str, title: &str) {
    info!(id = %id, "detail requested");
    // Logged at selection time, before the lookup settles either way.
    self.history.add_movie(id, title);
    self.detail = DetailPane { loading: true, ..DetailPane::default() };
    self.tasks.detail_rx = None;
    let client = self.client.clone();
    let id = id.to_string();
    let want_poster = self.poster_mode != PosterMode::Off;

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let result: Result<DetailLoad> = async {
        let outcome = client.detail(&id).await?;
        let poster = match &outcome {
          DetailOutcome::Detail(detail) if want_poster && available(&detail.poster) => {
            fetch_poster(client.http(), &detail.poster).await.ok()
          }
          _ => None,
        };
        Ok((outcome, poster))
      }
      .await;
      let _ = tx.send(result);
    });
    self.tasks.detail_rx = Some(rx);
  }

  /// Dismiss the overlay. Any in-flight lookup is orphaned with it.
  pub fn close_detail(&mut self) {
    self.detail = DetailPane::default();
    self.tasks.detail_rx = None;
  }

  /// Star or unstar the selected row.
  pub fn toggle_favorite(&mut self) {
    if let Some(item) = self.selected_item().cloned() {
      self.favorites.toggle(&item);
      if self.view == View::Favorites {
        Self::clamp_selection(&mut self.favorites_state, self.favorites.len());
      }
    }
  }

  /// Star or unstar the title shown in the overlay.
  pub fn toggle_favorite_detail(&mut self) {
    if let Some(detail) = self.detail.detail.as_deref() {
      let item = detail.as_search_item();
      self.favorites.toggle(&item);
      if self.view == View::Favorites {
        Self::clamp_selection(&mut self.favorites_state, self.favorites.len());
      }
    }
  }

  /// Switch screens. Entering a list screen puts the cursor on its first row.
  pub fn show_view(&mut self, view: View) {
    if view == self.view {
      return;
    }
    self.close_detail();
    self.view = view;
    match view {
      View::Search => {}
      View::Favorites => {
        let len = self.favorites.len();
        self.favorites_state.select(if len == 0 { None } else { Some(0) });
      }
      View::History => {
        let len = self.history.len();
        self.history_state.select(if len == 0 { None } else { Some(0) });
      }
    }
  }

  /// Strike the selected history entry.
  pub fn remove_history_entry(&mut self) {
    let Some(idx) = self.history_state.selected() else { return };
    let Some(entry) = self.history.entries().get(idx) else { return };
    self.history.remove(entry.timestamp());
    Self::clamp_selection(&mut self.history_state, self.history.len());
  }

  /// Act on the selected history entry: searches rerun, titles reopen.
  pub fn activate_history_entry(&mut self) {
    let Some(idx) = self.history_state.selected() else { return };
    let Some(entry) = self.history.entries().get(idx).cloned() else { return };
    match entry {
      HistoryEntry::Search { query, .. } => {
        self.show_view(View::Search);
        self.input = query;
        self.cursor_position = self.input.chars().count();
        self.trigger_search();
      }
      HistoryEntry::Movie { id, title, .. } => {
        self.trigger_detail_for(&id, &title);
      }
    }
  }

  /// Keep `state` selecting a valid index for a list of `len` rows.
  fn clamp_selection(state: &mut ListState, len: usize) {
    if len == 0 {
      state.select(None);
    } else {
      let sel = state.selected().unwrap_or(0);
      if sel >= len {
        state.select(Some(len - 1));
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::storage::mem::MemStorage;
  use anyhow::anyhow;

  fn app() -> App {
    App::with_stores(
      Favorites::load(Box::new(MemStorage::default())),
      History::load(Box::new(MemStorage::default())),
    )
  }

  fn item(id: &str, title: &str, kind: &str) -> SearchItem {
    SearchItem {
      id: id.to_string(),
      title: title.to_string(),
      year: "1979".to_string(),
      kind: kind.to_string(),
      poster: "N/A".to_string(),
    }
  }

  fn page(items: Vec<SearchItem>, total_results: u32) -> Result<SearchOutcome> {
    Ok(SearchOutcome::Page { items, total_results })
  }

  fn detail_record(id: &str, title: &str) -> Box<TitleDetail> {
    Box::new(TitleDetail {
      id: id.to_string(),
      title: title.to_string(),
      year: "1982".to_string(),
      rated: "R".to_string(),
      released: "25 Jun 1982".to_string(),
      runtime: "117 min".to_string(),
      genre: "Sci-Fi".to_string(),
      director: "Ridley Scott".to_string(),
      writer: "Hampton Fancher".to_string(),
      actors: "Harrison Ford".to_string(),
      plot: "A blade runner hunts replicants.".to_string(),
      language: "English".to_string(),
      country: "United States".to_string(),
      awards: "N/A".to_string(),
      poster: "N/A".to_string(),
      imdb_rating: "8.1".to_string(),
      imdb_votes: "834,359".to_string(),
      kind: "movie".to_string(),
      box_office: None,
      production: None,
    })
  }

  /// Hands a settled search result to the app the same way a finished task would.
  fn deliver_search(app: &mut App, result: Result<SearchOutcome>) {
    let (tx, rx) = oneshot::channel();
    app.tasks.search_rx = Some(rx);
    let _ = tx.send(result);
    app.check_pending();
  }

  fn deliver_detail(app: &mut App, result: Result<DetailLoad>) {
    let (tx, rx) = oneshot::channel();
    app.tasks.detail_rx = Some(rx);
    let _ = tx.send(result);
    app.check_pending();
  }

  // --- Pagination math ---

  #[test]
  fn total_pages_rounds_up() {
    let mut app = app();
    app.total_results = 23;
    assert_eq!(app.total_pages(), 3);
    app.total_results = 10;
    assert_eq!(app.total_pages(), 1);
    app.total_results = 0;
    assert_eq!(app.total_pages(), 0);
  }

  // --- Search completion ---

  #[test]
  fn landed_page_selects_first_row_and_enters_results() {
    let mut app = app();
    deliver_search(&mut app, page(vec![item("tt1", "Alien", "movie"), item("tt2", "Aliens", "movie")], 23));

    assert!(!app.loading);
    assert_eq!(app.results.len(), 2);
    assert_eq!(app.total_results, 23);
    assert_eq!(app.list_state.selected(), Some(0));
    assert_eq!(app.mode, AppMode::Results);
    assert_eq!(app.last_error, None);
  }

  #[test]
  fn empty_page_shows_no_rows_and_no_error() {
    let mut app = app();
    deliver_search(&mut app, Ok(SearchOutcome::Failure(NO_MATCH_ERROR.to_string())));

    assert!(app.results.is_empty());
    assert_eq!(app.total_results, 0);
    assert_eq!(app.last_error, None);
    assert_eq!(app.mode, AppMode::Input);
  }

  #[test]
  fn api_failure_replaces_rows_with_its_message() {
    let mut app = app();
    deliver_search(&mut app, page(vec![item("tt1", "Alien", "movie")], 1));
    deliver_search(&mut app, Ok(SearchOutcome::Failure("Invalid API key!".to_string())));

    assert!(app.results.is_empty());
    assert_eq!(app.total_results, 0);
    assert_eq!(app.last_error.as_deref(), Some("Invalid API key!"));
  }

  #[test]
  fn transport_failure_keeps_rows_and_shows_a_generic_message() {
    let mut app = app();
    deliver_search(&mut app, page(vec![item("tt1", "Alien", "movie")], 23));
    deliver_search(&mut app, Err(anyhow!("connection refused")));

    assert_eq!(app.last_error.as_deref(), Some(TRANSPORT_ERROR));
    assert_eq!(app.results.len(), 1);
    assert_eq!(app.total_results, 23);
  }

  // --- History gating ---

  #[tokio::test]
  async fn completed_search_is_logged_once() {
    let mut app = app();
    app.input = "alien".to_string();
    app.trigger_search();
    deliver_search(&mut app, page(vec![item("tt1", "Alien", "movie")], 1));

    assert_eq!(app.history.len(), 1);
    assert!(matches!(&app.history.entries()[0], HistoryEntry::Search { query, .. } if query == "alien"));

    // A later delivery with no submit behind it adds nothing.
    deliver_search(&mut app, page(vec![item("tt2", "Aliens", "movie")], 1));
    assert_eq!(app.history.len(), 1);
  }

  #[tokio::test]
  async fn transport_failure_logs_nothing() {
    let mut app = app();
    app.input = "alien".to_string();
    app.trigger_search();
    deliver_search(&mut app, Err(anyhow!("dns error")));

    assert!(app.history.is_empty());
    assert_eq!(app.last_error.as_deref(), Some(TRANSPORT_ERROR));
  }

  #[tokio::test]
  async fn no_match_outcome_still_logs_the_search() {
    let mut app = app();
    app.input = "zzzzzz".to_string();
    app.trigger_search();
    deliver_search(&mut app, Ok(SearchOutcome::Failure(NO_MATCH_ERROR.to_string())));

    assert_eq!(app.history.len(), 1);
    assert_eq!(app.last_error, None);
  }

  #[test]
  fn blank_submit_is_rejected_inline() {
    let mut app = app();
    app.input = "   ".to_string();
    app.trigger_search();

    assert_eq!(app.last_error.as_deref(), Some("Enter a search term."));
    assert!(app.tasks.search_rx.is_none());
    assert!(app.history.is_empty());
  }

  // --- Kind filter ---

  #[test]
  fn kind_filter_narrows_rows_without_touching_page_math() {
    let mut app = app();
    deliver_search(
      &mut app,
      page(vec![item("tt1", "Alien", "movie"), item("tt2", "Alien Nation", "series"), item("tt3", "Aliens", "movie")], 23),
    );

    app.next_kind_filter();
    assert_eq!(app.kind_filter, KindFilter::Movie);
    assert_eq!(app.results.len(), 2);
    assert_eq!(app.total_pages(), 3);

    app.next_kind_filter();
    let ids: Vec<_> = app.results.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["tt2"]);

    app.next_kind_filter();
    assert_eq!(app.kind_filter, KindFilter::All);
    assert_eq!(app.results.len(), 3);
  }

  #[test]
  fn kind_matching_is_case_insensitive() {
    assert!(KindFilter::Movie.matches(&item("tt1", "Alien", "Movie")));
    assert!(KindFilter::Series.matches(&item("tt2", "Alien Nation", "SERIES")));
    assert!(!KindFilter::Movie.matches(&item("tt2", "Alien Nation", "series")));
  }

  #[test]
  fn narrowing_to_an_empty_page_clears_the_selection() {
    let mut app = app();
    deliver_search(&mut app, page(vec![item("tt1", "Alien Nation", "series")], 1));
    assert_eq!(app.list_state.selected(), Some(0));

    app.next_kind_filter();
    assert!(app.results.is_empty());
    assert_eq!(app.list_state.selected(), None);
  }

  // --- Page changes ---

  #[test]
  fn page_change_ignores_out_of_range_targets() {
    let mut app = app();
    app.query = "alien".to_string();
    app.total_results = 23;
    app.page = 3;

    app.change_page(4);
    app.change_page(0);

    assert_eq!(app.page, 3);
    assert!(app.tasks.search_rx.is_none());
  }

  #[test]
  fn page_change_without_a_query_is_ignored() {
    let mut app = app();
    app.change_page(1);

    assert!(!app.loading);
    assert!(app.tasks.search_rx.is_none());
  }

  #[tokio::test]
  async fn valid_page_change_starts_a_fetch() {
    let mut app = app();
    app.query = "alien".to_string();
    app.total_results = 23;

    app.change_page(2);

    assert_eq!(app.page, 2);
    assert!(app.loading);
    assert!(app.tasks.search_rx.is_some());
  }

  #[tokio::test]
  async fn new_fetch_orphans_the_previous_request() {
    let mut app = app();
    app.query = "alien".to_string();
    app.total_results = 23;
    let (tx, rx) = oneshot::channel();
    app.tasks.search_rx = Some(rx);

    app.change_page(2);

    // The replaced receiver is gone, so the stale response has nowhere to land.
    assert!(tx.send(page(vec![item("tt9", "Stale", "movie")], 1)).is_err());
    assert!(app.results.is_empty());
  }

  // --- check_pending mechanics ---

  #[test]
  fn pending_request_is_kept_while_undelivered() {
    let mut app = app();
    let (_tx, rx) = oneshot::channel();
    app.tasks.search_rx = Some(rx);
    app.loading = true;

    app.check_pending();

    assert!(app.tasks.search_rx.is_some());
    assert!(app.loading);
  }

  #[test]
  fn dropped_task_reports_a_failure_and_forgets_the_pending_entry() {
    let mut app = app();
    app.pending_history = Some("alien".to_string());
    let (tx, rx) = oneshot::channel::<Result<SearchOutcome>>();
    app.tasks.search_rx = Some(rx);
    drop(tx);

    app.check_pending();

    assert_eq!(app.last_error.as_deref(), Some("Search task failed."));
    assert!(app.tasks.search_rx.is_none());

    deliver_search(&mut app, page(vec![item("tt1", "Alien", "movie")], 1));
    assert!(app.history.is_empty());
  }

  // --- Detail overlay ---

  #[tokio::test]
  async fn opening_detail_logs_the_title_and_shows_loading() {
    let mut app = app();
    app.trigger_detail_for("tt0083658", "Blade Runner");

    assert!(app.detail.is_open());
    assert!(app.detail.loading);
    assert!(app.tasks.detail_rx.is_some());
    assert!(
      matches!(&app.history.entries()[0], HistoryEntry::Movie { id, .. } if id == "tt0083658")
    );
  }

  #[tokio::test]
  async fn reopening_a_title_does_not_duplicate_history() {
    let mut app = app();
    app.trigger_detail_for("tt0083658", "Blade Runner");
    app.trigger_detail_for("tt0083658", "Blade Runner");

    assert_eq!(app.history.len(), 1);
  }

  #[test]
  fn detail_failure_shows_the_api_message() {
    let mut app = app();
    app.detail = DetailPane { loading: true, ..DetailPane::default() };
    deliver_detail(&mut app, Ok((DetailOutcome::Failure("Incorrect IMDb ID.".to_string()), None)));

    assert!(!app.detail.loading);
    assert_eq!(app.detail.error.as_deref(), Some("Incorrect IMDb ID."));
    assert!(app.detail.is_open());
  }

  #[test]
  fn detail_transport_failure_is_generic() {
    let mut app = app();
    app.detail = DetailPane { loading: true, ..DetailPane::default() };
    deliver_detail(&mut app, Err(anyhow!("timed out")));

    assert_eq!(app.detail.error.as_deref(), Some(TRANSPORT_ERROR));
  }

  #[test]
  fn detail_success_replaces_an_earlier_error() {
    let mut app = app();
    app.detail = DetailPane { error: Some(TRANSPORT_ERROR.to_string()), ..DetailPane::default() };
    deliver_detail(&mut app, Ok((DetailOutcome::Detail(detail_record("tt0083658", "Blade Runner")), None)));

    assert_eq!(app.detail.error, None);
    assert_eq!(app.detail.detail.as_ref().map(|d| d.title.as_str()), Some("Blade Runner"));
  }

  #[test]
  fn closing_the_overlay_orphans_the_lookup() {
    let mut app = app();
    app.detail = DetailPane { loading: true, ..DetailPane::default() };
    let (tx, rx) = oneshot::channel::<Result<DetailLoad>>();
    app.tasks.detail_rx = Some(rx);

    app.close_detail();

    assert!(!app.detail.is_open());
    assert!(tx.send(Ok((DetailOutcome::Failure("stale".to_string()), None))).is_err());
  }

  // --- Views ---

  #[test]
  fn tab_cycles_views_in_both_directions() {
    assert_eq!(View::Search.next(), View::Favorites);
    assert_eq!(View::History.next(), View::Search);
    assert_eq!(View::Search.prev(), View::History);
    assert_eq!(View::Favorites.prev(), View::Search);
  }

  #[test]
  fn entering_a_list_view_selects_its_first_row() {
    let mut app = app();
    app.favorites.toggle(&item("tt1", "Alien", "movie"));

    app.show_view(View::Favorites);
    assert_eq!(app.favorites_state.selected(), Some(0));

    app.show_view(View::History);
    assert_eq!(app.history_state.selected(), None);
  }

  #[test]
  fn switching_views_closes_the_overlay() {
    let mut app = app();
    app.detail = DetailPane { loading: true, ..DetailPane::default() };

    app.show_view(View::Favorites);
    assert!(!app.detail.is_open());
  }

  // --- History interactions ---

  #[test]
  fn removing_history_entries_keeps_the_selection_in_range() {
    let mut app = app();
    app.history.add_search_at("alien", 100);
    app.history.add_search_at("dune", 200);
    app.show_view(View::History);
    assert_eq!(app.history_state.selected(), Some(0));

    app.remove_history_entry();
    assert_eq!(app.history.len(), 1);
    assert_eq!(app.history_state.selected(), Some(0));

    app.remove_history_entry();
    assert!(app.history.is_empty());
    assert_eq!(app.history_state.selected(), None);
  }

  #[tokio::test]
  async fn history_search_entry_reruns_the_query() {
    let mut app = app();
    app.history.add_search_at("alien", 100);
    app.show_view(View::History);

    app.activate_history_entry();

    assert_eq!(app.view, View::Search);
    assert_eq!(app.input, "alien");
    assert!(app.loading);

    deliver_search(&mut app, page(vec![item("tt1", "Alien", "movie")], 1));
    assert_eq!(app.history.len(), 1);
    assert!(matches!(&app.history.entries()[0], HistoryEntry::Search { query, .. } if query == "alien"));
  }

  #[tokio::test]
  async fn history_movie_entry_reopens_the_detail() {
    let mut app = app();
    app.history.add_movie_at("tt0083658", "Blade Runner", 100);
    app.show_view(View::History);

    app.activate_history_entry();

    assert!(app.detail.is_open());
    assert!(app.detail.loading);
    assert_eq!(app.history.len(), 1);
  }

  // --- Favorites interactions ---

  #[test]
  fn toggling_from_the_overlay_uses_the_detail_record() {
    let mut app = app();
    app.detail = DetailPane { detail: Some(detail_record("tt0083658", "Blade Runner")), ..DetailPane::default() };

    app.toggle_favorite_detail();
    assert!(app.favorites.is_favorite("tt0083658"));

    app.toggle_favorite_detail();
    assert!(!app.favorites.is_favorite("tt0083658"));
  }

  #[test]
  fn unfavoriting_in_the_favorites_view_clamps_the_selection() {
    let mut app = app();
    app.favorites.toggle(&item("tt1", "Alien", "movie"));
    app.favorites.toggle(&item("tt2", "Aliens", "movie"));
    app.show_view(View::Favorites);
    app.favorites_state.select(Some(1));

    app.toggle_favorite();

    assert_eq!(app.favorites.len(), 1);
    assert_eq!(app.favorites_state.selected(), Some(0));
  }
}
