//! Domain data structures for properties, bin schedules, and advisories.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::fallback;

/// Local hour assigned to collections that only carry a calendar date.
pub const COLLECTION_HOUR: u32 = 6;
const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a suburb/locality.
pub struct LocalityId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a street within a locality.
pub struct StreetId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
/// Identifier of a property; the key for schedule lookups.
pub struct PropertyId(pub i64);

impl fmt::Display for LocalityId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for StreetId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Suburb returned by the reference data source.
pub struct Locality {
    /// Unique identifier.
    pub id: LocalityId,
    /// Display name, not unique.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Street inside a locality.
pub struct Street {
    /// Unique identifier.
    pub id: StreetId,
    /// Display name, not unique across localities.
    pub name: String,
    /// Parent locality.
    pub locality_id: LocalityId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Property (house number) on a street.
pub struct Property {
    /// Unique identifier used for schedule requests.
    pub id: PropertyId,
    /// Display name, usually the house number.
    pub name: String,
    /// Parent street.
    pub street_id: StreetId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kerbside bins tracked by the engine.
pub enum BinKind {
    /// Food organics and garden organics (FOGO).
    Organic,
    /// Yellow-lid recycling.
    Recycling,
    /// Red-lid landfill/general waste.
    Landfill,
}

impl BinKind {
    /// Every kind, in display order.
    pub const ALL: [BinKind; 3] = [BinKind::Organic, BinKind::Recycling, BinKind::Landfill];

    /// Map a free-text upstream label to a bin kind.
    ///
    /// Matching is case-insensitive and ordered organic, recycling, landfill, so a label
    /// containing both "organics" and "waste" is organic. Unknown labels yield `None`.
    #[must_use]
    pub fn classify(label: &str) -> Option<Self> {
        let normalized = label.to_lowercase();

        if normalized.contains("fogo") || normalized.contains("organics") {
            Some(BinKind::Organic)
        } else if normalized.contains("recycling") {
            Some(BinKind::Recycling)
        } else if normalized.contains("landfill")
            || normalized.contains("garbage")
            || normalized.contains("waste")
        {
            Some(BinKind::Landfill)
        } else {
            None
        }
    }

    /// Short name used on dashboard cards.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            BinKind::Organic => "FOGO",
            BinKind::Recycling => "Recycling",
            BinKind::Landfill => "Landfill",
        }
    }
}

impl fmt::Display for BinKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            BinKind::Organic => "organic",
            BinKind::Recycling => "recycling",
            BinKind::Landfill => "landfill",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Next known collection for one bin.
pub struct NextCollection {
    /// Collection time including the municipality's UTC offset.
    pub date: DateTime<FixedOffset>,
}

impl NextCollection {
    /// Collection on `day` at [`COLLECTION_HOUR`] in `offset`.
    #[must_use]
    pub fn on(day: NaiveDate, offset: FixedOffset) -> Option<Self> {
        let local = day.and_hms_opt(COLLECTION_HOUR, 0, 0)?;
        let date = offset.from_local_datetime(&local).single()?;
        Some(Self { date })
    }

    /// Parse an upstream date: RFC 3339, or a bare `YYYY-MM-DD` placed in `offset`.
    #[must_use]
    pub fn parse(raw: &str, offset: FixedOffset) -> Option<Self> {
        let raw = raw.trim();
        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(Self { date });
        }
        NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .and_then(|day| Self::on(day, offset))
    }

    /// Calendar day of the collection in its own offset.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
/// Canonical per-bin schedule. A missing kind means "unknown", never "not collected".
pub struct BinSchedule {
    entries: BTreeMap<BinKind, NextCollection>,
}

impl BinSchedule {
    /// Empty schedule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the next collection for `kind`, returning the replaced one.
    pub fn insert(&mut self, kind: BinKind, next: NextCollection) -> Option<NextCollection> {
        self.entries.insert(kind, next)
    }

    /// Next collection for `kind`, if known.
    #[must_use]
    pub fn get(&self, kind: BinKind) -> Option<&NextCollection> {
        self.entries.get(&kind)
    }

    /// True when no bin has a known date.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of bins with a known date.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Known collections in [`BinKind::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (BinKind, &NextCollection)> {
        self.entries.iter().map(|(kind, next)| (*kind, next))
    }

    /// Earliest known collection across all bins.
    #[must_use]
    pub fn earliest(&self) -> Option<&NextCollection> {
        self.entries.values().min_by_key(|next| next.date)
    }
}

/// Per-property payload from the upstream schedule endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleResponse {
    /// Explicit per-bin entries; often empty.
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
    /// Weekly collection day, 1 = Monday .. 7 = Sunday.
    #[serde(default)]
    pub collection_day: Option<u32>,
}

/// One labelled collection entry from the upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionEntry {
    /// Free-text bin label such as "FOGO" or "Garbage".
    #[serde(rename = "type", default)]
    pub label: String,
    /// Wrapper around the next date.
    #[serde(default)]
    pub next: Option<CollectionDate>,
}

/// `{ "date": "..." }` wrapper used by the upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CollectionDate {
    /// Raw date string.
    #[serde(default)]
    pub date: Option<String>,
}

impl ScheduleResponse {
    /// Normalize into a [`BinSchedule`], synthesizing one from `collection_day` when the
    /// upstream lists no collections.
    #[must_use]
    pub fn into_schedule(self, today: NaiveDate, offset: FixedOffset) -> BinSchedule {
        if self.collections.is_empty() {
            return match self.collection_day {
                Some(day) => fallback::synthesize_at(day, today, offset).unwrap_or_else(|| {
                    debug!(day, "collection day out of range, no schedule synthesized");
                    BinSchedule::new()
                }),
                None => BinSchedule::new(),
            };
        }

        let mut schedule = BinSchedule::new();
        for entry in self.collections {
            let Some(kind) = BinKind::classify(&entry.label) else {
                debug!(label = %entry.label, "dropping unclassified collection");
                continue;
            };
            let Some(raw) = entry.next.and_then(|next| next.date) else {
                continue;
            };
            match NextCollection::parse(&raw, offset) {
                Some(next) => {
                    schedule.insert(kind, next);
                }
                None => debug!(%kind, raw = %raw, "dropping collection with unparseable date"),
            }
        }
        schedule
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Whole days until a collection, as shown on a bin card.
pub enum Countdown {
    /// No known date.
    Unknown,
    /// The date is behind us.
    Passed,
    /// Collection is today.
    Today,
    /// Collection is tomorrow.
    Tomorrow,
    /// Collection in the given number of days (at least two).
    InDays(i64),
}

impl Countdown {
    /// Countdown for `next` as seen at `now`.
    ///
    /// The collection's own calendar day is compared with the calendar day of `now` in
    /// `now`'s offset, so a collection stamped `+11:00` still counts correctly from `+10:00`.
    #[must_use]
    pub fn until(next: Option<&NextCollection>, now: DateTime<FixedOffset>) -> Self {
        let Some(next) = next else {
            return Countdown::Unknown;
        };
        match (next.day() - now.date_naive()).num_days() {
            days if days < 0 => Countdown::Passed,
            0 => Countdown::Today,
            1 => Countdown::Tomorrow,
            days => Countdown::InDays(days),
        }
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Unknown => write!(formatter, "no data"),
            Countdown::Passed => write!(formatter, "date passed"),
            Countdown::Today => write!(formatter, "TODAY"),
            Countdown::Tomorrow => write!(formatter, "1 day until collection"),
            Countdown::InDays(days) => write!(formatter, "{days} days until collection"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Disposal route for an A-Z guide material.
pub enum MaterialBin {
    /// Yellow recycling bin.
    Recycle,
    /// Green FOGO bin.
    Organic,
    /// Red landfill bin.
    Waste,
    /// Community Recycling Centre drop-off.
    Crc,
    /// Council clean-up service.
    CleanUp,
    /// Special disposal.
    Special,
    /// Waste drop-off facility.
    WasteDropOff,
    /// Route the engine does not know about.
    Other(String),
}

impl MaterialBin {
    /// Human-readable destination.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            MaterialBin::Recycle => "Yellow Recycling Bin",
            MaterialBin::Organic => "Green FOGO Bin",
            MaterialBin::Waste => "Red Landfill Bin",
            MaterialBin::Crc => "Community Recycling Centre",
            MaterialBin::CleanUp => "Council Clean-up",
            MaterialBin::Special => "Special Disposal",
            MaterialBin::WasteDropOff => "Waste Drop-off",
            MaterialBin::Other(_) => "Unknown",
        }
    }
}

impl From<String> for MaterialBin {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "recycle" => MaterialBin::Recycle,
            "organic" => MaterialBin::Organic,
            "waste" => MaterialBin::Waste,
            "crc" => MaterialBin::Crc,
            "clean_up" => MaterialBin::CleanUp,
            "special" => MaterialBin::Special,
            "waste_drop_off" => MaterialBin::WasteDropOff,
            _ => MaterialBin::Other(raw),
        }
    }
}

impl From<MaterialBin> for String {
    fn from(bin: MaterialBin) -> Self {
        match bin {
            MaterialBin::Recycle => "recycle".to_owned(),
            MaterialBin::Organic => "organic".to_owned(),
            MaterialBin::Waste => "waste".to_owned(),
            MaterialBin::Crc => "crc".to_owned(),
            MaterialBin::CleanUp => "clean_up".to_owned(),
            MaterialBin::Special => "special".to_owned(),
            MaterialBin::WasteDropOff => "waste_drop_off".to_owned(),
            MaterialBin::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Entry of the A-Z "which bin" guide.
pub struct Material {
    /// Item name, e.g. "Pizza box".
    pub title: String,
    /// Extra search terms.
    pub keywords: Option<String>,
    /// Where the item goes.
    pub bin: MaterialBin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Council event such as a clean-up day.
pub struct MunicipalEvent {
    /// Event title.
    pub title: String,
    /// First day of the event.
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Daily forecast values for the configured location.
pub struct WeatherSample {
    /// Forecast day.
    pub date: NaiveDate,
    /// Total precipitation in millimetres.
    pub rainfall_mm: f64,
    /// Maximum wind speed at 10 m in km/h.
    pub wind_kmh: f64,
    /// WMO weather code.
    pub weather_code: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// What an advisory is about.
pub enum AdvisoryKind {
    /// Bins may blow over.
    Wind,
    /// Wet weather expected.
    Rain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// How loudly an advisory should be shown.
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Weather advisory for the nearest collection day.
pub struct Advisory {
    /// Advisory category.
    pub kind: AdvisoryKind,
    /// Display severity.
    pub severity: Severity,
    /// Message shown to the user.
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Where a resolved schedule came from.
pub enum Freshness {
    /// Fetched from the upstream just now.
    Fresh,
    /// Loaded from the persisted cache.
    Cached,
    /// Neither remote nor cached data is available.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of resolving the schedule for a property.
pub struct Resolution {
    /// Resolved schedule; empty when unavailable.
    pub schedule: BinSchedule,
    /// Source of the schedule.
    pub freshness: Freshness,
    /// When the schedule was retrieved from the upstream.
    pub cached_at: Option<DateTime<FixedOffset>>,
}

impl Resolution {
    /// Resolution with no data at all.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            schedule: BinSchedule::new(),
            freshness: Freshness::Unavailable,
            cached_at: None,
        }
    }

    /// The condition the user must be told about, if any.
    #[must_use]
    pub fn error(&self) -> Option<EngineError> {
        (self.freshness == Freshness::Unavailable).then_some(EngineError::NoData)
    }
}
