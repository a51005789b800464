//! OMDb API client and response parsing.
//!
//! OMDb answers every request with HTTP 200 and signals failure in the body:
//! `Response: "False"` plus a human-readable `Error` string. Those domain
//! failures stay separate from transport errors (`anyhow::Error`) so callers
//! can show API messages verbatim while keeping network noise generic.

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use crate::constants::constants;

/// Fixed OMDb search page size; the API offers no way to change it.
pub const PAGE_SIZE: u32 = 10;

/// Sentinel `Error` string OMDb returns for a query with no matches.
pub const NO_MATCH_ERROR: &str = "Movie not found!";

/// Sentinel OMDb uses for fields it has no data for.
pub const NOT_AVAILABLE: &str = "N/A";

/// True when an OMDb field carries a real value (non-blank and not `"N/A"`).
pub fn available(value: &str) -> bool {
  let trimmed = value.trim();
  !trimmed.is_empty() && trimmed != NOT_AVAILABLE
}

// --- Wire types ---

/// One row of an OMDb search page. Serialized as-is into the favorites store,
/// so the wire field names are the persisted ones.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SearchItem {
  #[serde(rename = "imdbID")]
  pub id: String,
  #[serde(rename = "Title")]
  pub title: String,
  #[serde(rename = "Year")]
  pub year: String,
  #[serde(rename = "Type")]
  pub kind: String,
  #[serde(rename = "Poster")]
  pub poster: String,
}

/// Full record for one title (`i=` lookup). All fields are strings on the wire;
/// absent data is the `"N/A"` sentinel rather than a missing key, except
/// `BoxOffice` and `Production` which OMDb omits entirely for some titles and
/// `imdbVotes` which not every response carries.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct TitleDetail {
  #[serde(rename = "imdbID")]
  pub id: String,
  #[serde(rename = "Title")]
  pub title: String,
  #[serde(rename = "Year")]
  pub year: String,
  #[serde(rename = "Rated")]
  pub rated: String,
  #[serde(rename = "Released")]
  pub released: String,
  #[serde(rename = "Runtime")]
  pub runtime: String,
  #[serde(rename = "Genre")]
  pub genre: String,
  #[serde(rename = "Director")]
  pub director: String,
  #[serde(rename = "Writer")]
  pub writer: String,
  #[serde(rename = "Actors")]
  pub actors: String,
  #[serde(rename = "Plot")]
  pub plot: String,
  #[serde(rename = "Language")]
  pub language: String,
  #[serde(rename = "Country")]
  pub country: String,
  #[serde(rename = "Awards")]
  pub awards: String,
  #[serde(rename = "Poster")]
  pub poster: String,
  #[serde(rename = "imdbRating")]
  pub imdb_rating: String,
  #[serde(rename = "imdbVotes", default)]
  pub imdb_votes: String,
  #[serde(rename = "Type")]
  pub kind: String,
  #[serde(rename = "BoxOffice")]
  pub box_office: Option<String>,
  #[serde(rename = "Production")]
  pub production: Option<String>,
}

impl TitleDetail {
  /// Projects the record down to the row shape favorites are stored in.
  pub fn as_search_item(&self) -> SearchItem {
    SearchItem {
      id: self.id.clone(),
      title: self.title.clone(),
      year: self.year.clone(),
      kind: self.kind.clone(),
      poster: self.poster.clone(),
    }
  }
}

#[derive(Deserialize)]
struct SearchEnvelope {
  #[serde(rename = "Search", default)]
  items: Vec<SearchItem>,
  #[serde(rename = "totalResults")]
  total_results: Option<String>,
  #[serde(rename = "Response")]
  response: String,
  #[serde(rename = "Error")]
  error: Option<String>,
}

/// Just enough of a detail body to learn whether the lookup succeeded.
#[derive(Deserialize)]
struct ResponseProbe {
  #[serde(rename = "Response")]
  response: String,
  #[serde(rename = "Error")]
  error: Option<String>,
}

// --- Outcomes ---

/// What a well-formed search response means.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchOutcome {
  /// One page of matches plus the API's match count across all pages.
  Page { items: Vec<SearchItem>, total_results: u32 },
  /// The API answered with a domain failure message.
  Failure(String),
}

/// What a well-formed detail response means.
#[derive(Clone, Debug, PartialEq)]
pub enum DetailOutcome {
  Detail(Box<TitleDetail>),
  Failure(String),
}

// --- Parsing ---

pub fn parse_search_body(body: &str) -> Result<SearchOutcome> {
  let envelope: SearchEnvelope = serde_json::from_str(body).context("unexpected search response shape")?;
  if !envelope.response.eq_ignore_ascii_case("true") {
    return Ok(SearchOutcome::Failure(envelope.error.unwrap_or_else(|| "Unknown error.".to_string())));
  }
  let items = envelope.items;
  // The total arrives as a string; fall back to the page's own size if it's unusable.
  let total_results =
    envelope.total_results.as_deref().and_then(|raw| raw.trim().parse().ok()).unwrap_or(items.len() as u32);
  Ok(SearchOutcome::Page { items, total_results })
}

pub fn parse_detail_body(body: &str) -> Result<DetailOutcome> {
  let probe: ResponseProbe = serde_json::from_str(body).context("unexpected detail response shape")?;
  if !probe.response.eq_ignore_ascii_case("true") {
    return Ok(DetailOutcome::Failure(probe.error.unwrap_or_else(|| "Unknown error.".to_string())));
  }
  let detail: TitleDetail = serde_json::from_str(body).context("unexpected detail response shape")?;
  Ok(DetailOutcome::Detail(Box::new(detail)))
}

// --- Client ---

/// Thin async client over the OMDb HTTP API.
#[derive(Clone)]
pub struct OmdbClient {
  http: Client,
  base_url: String,
  api_key: String,
}

impl OmdbClient {
  pub fn new(api_key: String) -> Self {
    Self { http: Client::new(), base_url: constants().omdb_base_url.clone(), api_key }
  }

  /// The underlying HTTP client, shared with poster downloads.
  pub fn http(&self) -> &Client {
    &self.http
  }

  fn search_request(&self, query: &str, page: u32) -> RequestBuilder {
    let page = page.to_string();
    self.http.get(&self.base_url).query(&[("apikey", self.api_key.as_str()), ("s", query), ("page", page.as_str())])
  }

  fn detail_request(&self, id: &str) -> RequestBuilder {
    self
      .http
      .get(&self.base_url)
      .query(&[("apikey", self.api_key.as_str()), ("i", id), ("plot", constants().detail_plot.as_str())])
  }

  /// Fetches one page of search results for `query`.
  pub async fn search(&self, query: &str, page: u32) -> Result<SearchOutcome> {
    let body = self
      .search_request(query, page)
      .send()
      .await
      .context("search request failed")?
      .error_for_status()
      .context("search request rejected")?
      .text()
      .await
      .context("search response unreadable")?;
    parse_search_body(&body)
  }

  /// Fetches the full record for one title by IMDb id.
  pub async fn detail(&self, id: &str) -> Result<DetailOutcome> {
    let body = self
      .detail_request(id)
      .send()
      .await
      .context("detail request failed")?
      .error_for_status()
      .context("detail request rejected")?
      .text()
      .await
      .context("detail response unreadable")?;
    parse_detail_body(&body)
  }
}
