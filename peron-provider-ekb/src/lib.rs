//! Schedule source for the Yekaterinburg metro timetable document.
//!
//! The document is a single static JSON file shaped as
//! `station -> direction -> day-type -> hour -> [minutes]`, fetched once at
//! startup either over HTTP or from the local filesystem. Structurally
//! invalid JSON is a terminal load error; individual out-of-range entries
//! are quarantined with a warning and the rest of the document is kept.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use peron_core::{
    model::{DirectionEntry, HourTable, StationEntry, Timetable},
    ports::{ScheduleSource, SourceError},
};

/// Where the schedule document lives when no location is given. Matches
/// the file the scraper drops next to the binary.
pub const DEFAULT_LOCATION: &str = "ekb_metro_schedule.json";

/// Raw hour table as found in the document: stringly-keyed hours, untyped
/// minute integers. Validated into a [`HourTable`] during the build.
type RawHourTable = BTreeMap<String, Vec<i64>>;
/// Direction as found in the document: day-type key to raw hour table.
type RawDirection = BTreeMap<String, RawHourTable>;
/// The whole document: station to direction to day tables.
type RawTimetable = BTreeMap<String, BTreeMap<String, RawDirection>>;

/// One-shot schedule source for the Yekaterinburg metro.
pub struct EkbScheduleSource {
    client: Client,
    location: String,
}

impl EkbScheduleSource {
    /// Create a source reading from the given location. Locations starting
    /// with `http://` or `https://` are fetched; anything else is treated
    /// as a filesystem path.
    #[must_use]
    pub fn new<L: Into<String>>(client: Client, location: L) -> Self {
        Self {
            client,
            location: location.into(),
        }
    }
}

#[async_trait]
impl ScheduleSource for EkbScheduleSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn load(&self) -> Result<Timetable, SourceError> {
        let raw: RawTimetable = if is_remote(&self.location) {
            fetch_json(self.client.get(&self.location)).await?
        } else {
            let text = std::fs::read_to_string(&self.location)?;
            serde_json::from_str(&text)?
        };

        Ok(build_timetable(raw))
    }
}

/// Build the schedule source, falling back to [`DEFAULT_LOCATION`].
#[must_use]
pub fn source(client: Client, location: Option<String>) -> EkbScheduleSource {
    EkbScheduleSource::new(
        client,
        location.unwrap_or_else(|| DEFAULT_LOCATION.to_owned()),
    )
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Validate the raw document into the typed model, quarantining malformed
/// entries (skip and warn, never include an invalid slot).
fn build_timetable(raw: RawTimetable) -> Timetable {
    let stations = raw
        .into_iter()
        .map(|(station, raw_directions)| {
            let mut directions = BTreeMap::new();
            for (direction, day_tables) in raw_directions {
                let mut entry = DirectionEntry::default();
                for (day_key, raw_table) in day_tables {
                    let slot = match day_key.as_str() {
                        "weekday" => &mut entry.weekday,
                        "weekend" => &mut entry.weekend,
                        other => {
                            log::warn!(
                                "{station}/{direction}: unknown day-type {other:?}, dropping its table"
                            );
                            continue;
                        }
                    };
                    *slot = Some(validate_hour_table(&station, &direction, &day_key, raw_table));
                }
                directions.insert(direction, entry);
            }
            (station, StationEntry { directions })
        })
        .collect();

    Timetable::new(stations)
}

fn validate_hour_table(
    station: &str,
    direction: &str,
    day_key: &str,
    raw: RawHourTable,
) -> HourTable {
    let mut hours = BTreeMap::new();

    for (hour_key, raw_minutes) in raw {
        let hour = match hour_key.parse::<u8>() {
            Ok(hour) if hour <= 23 => hour,
            _ => {
                log::warn!(
                    "{station}/{direction}/{day_key}: hour {hour_key:?} out of range, skipping"
                );
                continue;
            }
        };

        let mut minutes = Vec::with_capacity(raw_minutes.len());
        for raw_minute in raw_minutes {
            match u8::try_from(raw_minute) {
                Ok(minute @ 0..=59) => minutes.push(minute),
                _ => {
                    log::warn!(
                        "{station}/{direction}/{day_key}: minute {raw_minute} at hour {hour} out of range, skipping"
                    );
                }
            }
        }

        hours.insert(hour, minutes);
    }

    HourTable { hours }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, SourceError> {
    req.send()
        .await
        .map_err(SourceError::from)?
        .error_for_status()
        .map_err(SourceError::from)?
        .json()
        .await
        .map_err(SourceError::from)
}
