//! Filter state for article retrieval: category, date range, and sort order.
//!
//! `FilterOptions` is a plain value. Every edit produces a new value, and the
//! retrieval pipeline treats any change as a new filter session (page 1).

use chrono::{DateTime, Duration, Months, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Top-headlines category. `All` means no category constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Business,
    Entertainment,
    General,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::All,
        Category::Business,
        Category::Entertainment,
        Category::General,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    /// Value sent as the `category` query parameter (`None` for `All`).
    pub fn as_param(self) -> Option<&'static str> {
        match self {
            Category::All => None,
            Category::Business => Some("business"),
            Category::Entertainment => Some("entertainment"),
            Category::General => Some("general"),
            Category::Health => Some("health"),
            Category::Science => Some("science"),
            Category::Sports => Some("sports"),
            Category::Technology => Some("technology"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::General => "General",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

/// Publication window applied through the search endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    Week,
    Month,
}

/// Resolved `[from, to]` bounds for a date range, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateRange {
    pub const ALL: [DateRange; 4] = [
        DateRange::All,
        DateRange::Today,
        DateRange::Week,
        DateRange::Month,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DateRange::All => "Any time",
            DateRange::Today => "Today",
            DateRange::Week => "Past week",
            DateRange::Month => "Past month",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }

    /// Resolve the range against `now`.
    ///
    /// Calendar days are taken in `now`'s own time zone, so "today" starts at
    /// local midnight for a `Local` timestamp. The upper bound is always `now`.
    /// Returns `None` for `All`.
    pub fn resolve<Tz: TimeZone>(self, now: DateTime<Tz>) -> Option<DateBounds> {
        let anchor = match self {
            DateRange::All => return None,
            DateRange::Today => now.clone(),
            DateRange::Week => now.clone() - Duration::days(7),
            DateRange::Month => now
                .clone()
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now.clone() - Duration::days(30)),
        };
        Some(DateBounds {
            from: start_of_day(&anchor).with_timezone(&Utc),
            to: now.with_timezone(&Utc),
        })
    }
}

/// Midnight of `at`'s calendar day in its own time zone.
///
/// On days where midnight does not exist (DST gap) the earliest valid
/// instant of that day is not searched for; `at` itself is returned.
fn start_of_day<Tz: TimeZone>(at: &DateTime<Tz>) -> DateTime<Tz> {
    at.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| at.timezone().from_local_datetime(&midnight).earliest())
        .unwrap_or_else(|| at.clone())
}

/// Result ordering for the search endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortBy {
    #[default]
    #[serde(rename = "publishedAt")]
    PublishedAt,
    #[serde(rename = "relevancy")]
    Relevancy,
    #[serde(rename = "popularity")]
    Popularity,
}

impl SortBy {
    pub const ALL: [SortBy; 3] = [SortBy::PublishedAt, SortBy::Relevancy, SortBy::Popularity];

    /// Value sent as the `sortBy` query parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "publishedAt",
            SortBy::Relevancy => "relevancy",
            SortBy::Popularity => "popularity",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortBy::PublishedAt => "Newest",
            SortBy::Relevancy => "Relevance",
            SortBy::Popularity => "Popularity",
        }
    }

    pub fn next(self) -> Self {
        cycle(&Self::ALL, self, 1)
    }

    pub fn prev(self) -> Self {
        cycle(&Self::ALL, self, Self::ALL.len() - 1)
    }
}

fn cycle<T: Copy + PartialEq>(values: &[T], current: T, step: usize) -> T {
    let idx = values.iter().position(|v| *v == current).unwrap_or(0);
    values[(idx + step) % values.len()]
}

/// The active filter configuration. Any combination of fields is legal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterOptions {
    pub category: Category,
    pub date_range: DateRange,
    pub sort_by: SortBy,
}

impl FilterOptions {
    pub fn with_category(self, category: Category) -> Self {
        Self { category, ..self }
    }

    pub fn with_date_range(self, date_range: DateRange) -> Self {
        Self { date_range, ..self }
    }

    pub fn with_sort_by(self, sort_by: SortBy) -> Self {
        Self { sort_by, ..self }
    }

    /// Whether these filters require the search endpoint regardless of query.
    pub fn needs_search(&self) -> bool {
        self.date_range != DateRange::All
    }

    /// Short human-readable description for headers, e.g. `Sports · Past week · Newest`.
    pub fn summary(&self) -> String {
        format!(
            "{} · {} · {}",
            self.category.label(),
            self.date_range.label(),
            self.sort_by.label()
        )
    }
}
