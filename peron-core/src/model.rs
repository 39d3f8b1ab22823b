//! Domain data structures for stations, timetables, and resolved departures.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Which of the two weekly timetables applies to a calendar date.
pub enum DayType {
    /// Monday through Friday service.
    Weekday,
    /// Saturday and Sunday service.
    Weekend,
}

impl fmt::Display for DayType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
        };
        write!(formatter, "{slug}")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// How the day-type is chosen: from the calendar, or pinned by the user.
pub enum DayTypePolicy {
    /// Saturday/Sunday map to [`DayType::Weekend`], everything else to
    /// [`DayType::Weekday`].
    #[default]
    Auto,
    /// Always use the weekday timetable.
    ForcedWeekday,
    /// Always use the weekend timetable.
    ForcedWeekend,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Sparse departure table for one day-type: hour of day to minutes within
/// that hour. Hours are 0–23 and minutes 0–59 by construction; the source
/// provider quarantines anything outside those ranges before building one
/// of these. Minute lists are not necessarily sorted and may repeat.
pub struct HourTable {
    /// Hour of day to departure minutes within that hour.
    pub hours: BTreeMap<u8, Vec<u8>>,
}

impl HourTable {
    /// True when no hour carries any departure minute.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hours.values().all(Vec::is_empty)
    }

    /// All `(hour, minute)` slots, hours ascending, minutes in stored order.
    pub fn slots(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.hours
            .iter()
            .flat_map(|(hour, minutes)| minutes.iter().map(|minute| (*hour, *minute)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Timetables for one direction of travel. Either day-type may be absent,
/// which means no service on that day-type at all.
pub struct DirectionEntry {
    /// Monday–Friday table, if the direction runs on weekdays.
    pub weekday: Option<HourTable>,
    /// Saturday/Sunday table, if the direction runs on weekends.
    pub weekend: Option<HourTable>,
}

impl DirectionEntry {
    /// Table for the given day-type, if present.
    #[must_use]
    pub fn table(&self, day_type: DayType) -> Option<&HourTable> {
        match day_type {
            DayType::Weekday => self.weekday.as_ref(),
            DayType::Weekend => self.weekend.as_ref(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Directions served from one station, keyed by direction key
/// (e.g. `to_north`). The key set is structurally open; display labels
/// are the presentation layer's concern.
pub struct StationEntry {
    /// Direction key to its timetables. May be empty.
    pub directions: BTreeMap<String, DirectionEntry>,
}

impl StationEntry {
    /// Direction keys in stable sorted order.
    pub fn direction_keys(&self) -> impl Iterator<Item = &str> {
        self.directions.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// The loaded weekly timetable for the whole network. Built once by the
/// schedule source at startup and never mutated afterwards.
pub struct Timetable {
    stations: BTreeMap<String, StationEntry>,
}

impl Timetable {
    /// Wrap a validated station map.
    #[must_use]
    pub fn new(stations: BTreeMap<String, StationEntry>) -> Self {
        Self { stations }
    }

    /// Station names in sorted order.
    pub fn station_names(&self) -> impl Iterator<Item = &str> {
        self.stations.keys().map(String::as_str)
    }

    /// Entry for a single station.
    #[must_use]
    pub fn station(&self, name: &str) -> Option<&StationEntry> {
        self.stations.get(name)
    }

    /// Timetables for one station/direction pair. `None` is the normal
    /// "no schedule for this pair" signal, not an error.
    #[must_use]
    pub fn lookup(&self, station: &str, direction: &str) -> Option<&DirectionEntry> {
        self.stations.get(station)?.directions.get(direction)
    }

    /// True when the document contained no stations at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// A resolved next departure.
pub struct Departure {
    /// The departure instant in Yekaterinburg time.
    pub departure: DateTime<FixedOffset>,
    /// Day-type of the table the departure was taken from. When
    /// `is_tomorrow` is set this is tomorrow's day-type, which may differ
    /// from today's.
    pub day_type: DayType,
    /// Whether the departure falls on the next calendar day.
    pub is_tomorrow: bool,
}
