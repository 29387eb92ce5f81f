//! Filtered, searched, sorted, and paginated views over a tracker collection.
//!
//! The tab filter uses its own completion check: a tracker is available once
//! the clock passes its target. This ignores the author-set status and the
//! pause state, so a tracker manually marked `Available` ahead of time still
//! lists under `progress` even though its card shows it completed.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::Tracker;
use crate::types::ValidationError;

/// Default number of trackers revealed per page.
pub const PAGE_SIZE: usize = 10;

/// List filter tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterTab {
    #[default]
    All,
    Progress,
    Available,
}

impl FilterTab {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Progress => "progress",
            Self::Available => "available",
        }
    }

    /// Whether `tracker` belongs under this tab at `now`.
    pub fn admits(self, tracker: &Tracker, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Available => is_available_at(tracker, now),
            Self::Progress => !is_available_at(tracker, now),
        }
    }
}

impl fmt::Display for FilterTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FilterTab {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "progress" => Ok(Self::Progress),
            "available" => Ok(Self::Available),
            _ => Err(ValidationError::InvalidTab {
                value: s.to_string(),
            }),
        }
    }
}

/// Time-derived availability used by the list filter.
pub fn is_available_at(tracker: &Tracker, now: DateTime<Utc>) -> bool {
    now >= tracker.target_timestamp
}

/// Case-insensitive substring match against the title. An empty query matches
/// everything; whitespace is matched literally.
pub fn matches_search(tracker: &Tracker, query: &str) -> bool {
    query.is_empty() || tracker.title.to_lowercase().contains(&query.to_lowercase())
}

/// Applies the tab and search filters, then sorts by target ascending.
pub fn filter_and_sort<'a>(
    trackers: &'a [Tracker],
    tab: FilterTab,
    query: &str,
    now: DateTime<Utc>,
) -> Vec<&'a Tracker> {
    let mut matching: Vec<&Tracker> = trackers
        .iter()
        .filter(|t| matches_search(t, query))
        .filter(|t| tab.admits(t, now))
        .collect();
    matching.sort_by_key(|t| t.target_timestamp);
    matching
}

/// UI filter state: active tab, search text, and how many rows are revealed.
///
/// Changing the tab or the search text collapses the list back to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListState {
    tab: FilterTab,
    query: String,
    page_size: usize,
    visible: usize,
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl ListState {
    /// A zero page size is treated as one.
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            tab: FilterTab::All,
            query: String::new(),
            page_size,
            visible: page_size,
        }
    }

    pub const fn tab(&self) -> FilterTab {
        self.tab
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub const fn visible(&self) -> usize {
        self.visible
    }

    pub fn set_tab(&mut self, tab: FilterTab) {
        if self.tab != tab {
            self.tab = tab;
            self.visible = self.page_size;
        }
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if self.query != query {
            self.query = query;
            self.visible = self.page_size;
        }
    }

    /// Reveals one more page.
    pub const fn load_more(&mut self) {
        self.load_more_by(1);
    }

    /// Reveals `pages` more pages at once.
    pub const fn load_more_by(&mut self, pages: usize) {
        self.visible = self
            .visible
            .saturating_add(self.page_size.saturating_mul(pages));
    }

    /// Computes the visible slice of `trackers` at `now`.
    pub fn view<'a>(&self, trackers: &'a [Tracker], now: DateTime<Utc>) -> ListView<'a> {
        let mut items = filter_and_sort(trackers, self.tab, &self.query, now);
        let total = items.len();
        items.truncate(self.visible);
        ListView { items, total }
    }
}

/// One rendered page of the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView<'a> {
    /// Revealed trackers in target order.
    pub items: Vec<&'a Tracker>,
    /// Number of trackers matching the filters before pagination.
    pub total: usize,
}

impl ListView<'_> {
    /// Whether a "load more" affordance should be offered.
    pub fn has_more(&self) -> bool {
        self.items.len() < self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
