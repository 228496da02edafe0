use std::{cmp::Ordering, fmt, time::SystemTime};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de::Error as _};
use time::Date;

/// Identifier assigned to a game by the storage backend that created it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum GameId {
    /// Sequential integer handed out by the in-memory store.
    Sequential(u64),
    /// Hex encoded document identifier (MongoDB ObjectId).
    Document(String),
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameId::Sequential(id) => write!(f, "{id}"),
            GameId::Document(id) => f.write_str(id),
        }
    }
}

const CENT_TOLERANCE: f64 = 1e-6;

/// Exact currency amount stored as a whole number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(i64);

impl Price {
    /// Smallest price accepted for a game (0.01).
    pub const MIN: Price = Price(1);
    /// Largest price accepted for a game (999.99).
    pub const MAX: Price = Price(99_999);

    /// Build a price from a number of cents.
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Number of cents represented by this price.
    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Round a floating point amount to the nearest cent.
    ///
    /// Returns `None` for non-finite values or amounts that do not fit in the
    /// cent representation.
    pub fn from_f64(amount: f64) -> Option<Self> {
        if !amount.is_finite() {
            return None;
        }
        let cents = (amount * 100.0).round();
        if cents < i64::MIN as f64 || cents > i64::MAX as f64 {
            return None;
        }
        Some(Self(cents as i64))
    }

    /// Convert an amount that must already be a whole number of cents.
    ///
    /// Returns `None` when the amount carries sub-cent digits, beyond the error
    /// inherent to binary floating point (9.99 is not exactly representable).
    pub fn from_exact_f64(amount: f64) -> Option<Self> {
        let price = Self::from_f64(amount)?;
        let drift = (amount * 100.0 - price.0 as f64).abs();
        (drift < CENT_TOLERANCE).then_some(price)
    }

    /// Amount as a floating point number, used for JSON output.
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Price::from_f64(amount).ok_or_else(|| D::Error::custom("price is out of range"))
    }
}

/// Game record as held by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameEntity {
    /// Backend assigned identifier.
    pub id: GameId,
    /// Display name of the game.
    pub name: String,
    /// Free-form genre label (e.g. "Football").
    pub genre: String,
    /// Retail price.
    pub price: Price,
    /// Calendar date the game was released.
    pub release_date: Date,
    /// Set once when the record is created.
    pub created_at: SystemTime,
    /// Refreshed on every successful update.
    pub updated_at: SystemTime,
}

/// Mutable fields supplied when creating or replacing a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameInput {
    /// Display name of the game.
    pub name: String,
    /// Genre label.
    pub genre: String,
    /// Retail price.
    pub price: Price,
    /// Release date.
    pub release_date: Date,
}

/// Optional constraints applied before sorting and pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameFilter {
    genre: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
}

impl GameFilter {
    /// Build a filter; a blank genre is treated as absent.
    pub fn new(genre: Option<String>, min_price: Option<Price>, max_price: Option<Price>) -> Self {
        Self {
            genre: genre.filter(|genre| !genre.trim().is_empty()),
            min_price,
            max_price,
        }
    }

    /// Genre constraint, matched exactly but ignoring case.
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    /// Whether `game` satisfies every present constraint.
    pub fn matches(&self, game: &GameEntity) -> bool {
        if let Some(genre) = self.genre() {
            if game.genre.to_lowercase() != genre.to_lowercase() {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| game.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| game.price > max) {
            return false;
        }
        true
    }
}

/// Field used to order list results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Order by name.
    Name,
    /// Order by price.
    Price,
    /// Order by release date.
    ReleaseDate,
    /// Order by genre.
    Genre,
    /// Creation order.
    #[default]
    Default,
}

impl SortKey {
    /// Map a `sortBy` query value onto a key; unknown values fall back to [`SortKey::Default`].
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::to_lowercase).as_deref() {
            Some("name") => SortKey::Name,
            Some("price") => SortKey::Price,
            Some("releasedate") => SortKey::ReleaseDate,
            Some("genre") => SortKey::Genre,
            _ => SortKey::Default,
        }
    }
}

/// Sort key plus direction. `descending` has no effect on [`SortKey::Default`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameSort {
    /// Field to sort on.
    pub key: SortKey,
    /// Reverse the order of `key`.
    pub descending: bool,
}

impl GameSort {
    /// Build a sort specification.
    pub fn new(key: SortKey, descending: bool) -> Self {
        Self { key, descending }
    }

    /// Compare two games according to this sort, `Equal` for ties.
    pub fn compare(&self, a: &GameEntity, b: &GameEntity) -> Ordering {
        let ordering = match self.key {
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::ReleaseDate => a.release_date.cmp(&b.release_date),
            SortKey::Genre => a.genre.cmp(&b.genre),
            SortKey::Default => return Ordering::Equal,
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Page window requested by a caller, already coerced into its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: u64,
    page_size: u64,
}

impl Pagination {
    /// Page size used when the caller does not provide one.
    pub const DEFAULT_PAGE_SIZE: u64 = 10;
    /// Largest page size a caller may request.
    pub const MAX_PAGE_SIZE: u64 = 100;

    /// Coerce raw values: pages below 1 become 1, page sizes are clamped into `1..=100`.
    pub fn new(page: Option<i64>, page_size: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1) as u64;
        let page_size = page_size
            .map(|size| size.clamp(1, Self::MAX_PAGE_SIZE as i64) as u64)
            .unwrap_or(Self::DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Number of items per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of matching records to skip before the page starts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Pages needed to show `total` records.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}
