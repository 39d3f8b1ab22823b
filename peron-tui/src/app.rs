use chrono::{DateTime, FixedOffset};
use peron_core::{
    model::{DayType, DayTypePolicy, Departure, HourTable, Timetable},
    resolve::resolve_day_type,
};

/// Application state. Selection and policy live here, never in globals,
/// and are mutated only from the event loop between ticks.
pub(crate) struct App {
    /// Loaded weekly timetable. `None` until the startup fetch resolves;
    /// every query renders "no data" until then.
    pub timetable: Option<Timetable>,
    /// Terminal load failure. Once set the board stays in this state.
    pub load_error: Option<String>,
    pub is_loading: bool,

    pub stations: Vec<String>,
    pub station_list_index: usize,
    pub selected_station: Option<String>,

    /// Direction keys available for the selected station.
    pub directions: Vec<String>,
    pub direction_index: usize,

    pub policy: DayTypePolicy,
}

impl App {
    pub(crate) fn new() -> Self {
        Self {
            timetable: None,
            load_error: None,
            is_loading: false,
            stations: Vec::new(),
            station_list_index: 0,
            selected_station: None,
            directions: Vec::new(),
            direction_index: 0,
            policy: DayTypePolicy::default(),
        }
    }

    /// Install the timetable after the one-shot startup load.
    pub(crate) fn set_timetable(&mut self, timetable: Timetable) {
        self.stations = timetable.station_names().map(str::to_owned).collect();
        self.timetable = Some(timetable);
        self.station_list_index = 0;
    }

    /// Record a terminal load failure; the UI shell keeps running.
    pub(crate) fn fail_load(&mut self, message: String) {
        self.load_error = Some(message);
    }

    /// Select the highlighted station and reset the direction to the first
    /// available one, since the previous direction is no longer valid.
    pub(crate) fn select_current_station(&mut self) {
        let Some(name) = self.stations.get(self.station_list_index).cloned() else {
            return;
        };

        self.directions = self
            .timetable
            .as_ref()
            .and_then(|timetable| timetable.station(&name))
            .map(|station| station.direction_keys().map(str::to_owned).collect())
            .unwrap_or_default();
        self.direction_index = 0;
        self.selected_station = Some(name);
    }

    pub(crate) fn selected_direction(&self) -> Option<&str> {
        self.directions
            .get(self.direction_index)
            .map(String::as_str)
    }

    pub(crate) fn next_direction(&mut self) {
        if !self.directions.is_empty() {
            self.direction_index = (self.direction_index + 1) % self.directions.len();
        }
    }

    pub(crate) fn previous_direction(&mut self) {
        if !self.directions.is_empty() {
            self.direction_index =
                (self.direction_index + self.directions.len() - 1) % self.directions.len();
        }
    }

    pub(crate) fn set_policy(&mut self, policy: DayTypePolicy) {
        self.policy = policy;
    }

    /// Next departure for the current selection at `now`, or `None` when
    /// the timetable is missing, the selection is incomplete, or there is
    /// no service today or tomorrow.
    pub(crate) fn next_departure(&self, now: DateTime<FixedOffset>) -> Option<Departure> {
        let timetable = self.timetable.as_ref()?;
        let station = self.selected_station.as_deref()?;
        let direction = self.selected_direction()?;
        timetable.next_departure(station, direction, now, self.policy)
    }

    /// The hour table shown in the table view: always today's day-type,
    /// even when the resolved departure belongs to tomorrow.
    pub(crate) fn displayed_table(&self, now: DateTime<FixedOffset>) -> Option<&HourTable> {
        let timetable = self.timetable.as_ref()?;
        let station = self.selected_station.as_deref()?;
        let direction = self.selected_direction()?;
        let entry = timetable.lookup(station, direction)?;
        entry.table(self.displayed_day_type(now))
    }

    pub(crate) fn displayed_day_type(&self, now: DateTime<FixedOffset>) -> DayType {
        resolve_day_type(now, self.policy)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::TimeZone;
    use peron_core::clock::target_offset;
    use peron_core::model::{DirectionEntry, HourTable, StationEntry, Timetable};

    use super::App;

    fn loaded_app() -> App {
        let table = HourTable {
            hours: BTreeMap::from([(8, vec![0, 30])]),
        };
        let entry = DirectionEntry {
            weekday: Some(table),
            weekend: None,
        };
        let station = StationEntry {
            directions: BTreeMap::from([
                ("to_north".to_owned(), entry.clone()),
                ("to_south".to_owned(), entry),
            ]),
        };
        let timetable = Timetable::new(BTreeMap::from([
            ("Botanicheskaya".to_owned(), station),
            ("Uralskaya".to_owned(), StationEntry::default()),
        ]));

        let mut app = App::new();
        app.set_timetable(timetable);
        app
    }

    #[test]
    fn selecting_a_station_defaults_to_its_first_direction() {
        let mut app = loaded_app();
        app.select_current_station();
        assert_eq!(app.selected_station.as_deref(), Some("Botanicheskaya"));
        assert_eq!(app.selected_direction(), Some("to_north"));
    }

    #[test]
    fn changing_station_resets_the_direction() {
        let mut app = loaded_app();
        app.select_current_station();
        app.next_direction();
        assert_eq!(app.selected_direction(), Some("to_south"));

        // Uralskaya has no directions; the stale one must not survive.
        app.station_list_index = 1;
        app.select_current_station();
        assert_eq!(app.selected_station.as_deref(), Some("Uralskaya"));
        assert_eq!(app.selected_direction(), None);
    }

    #[test]
    fn direction_cycling_wraps_both_ways() {
        let mut app = loaded_app();
        app.select_current_station();
        app.previous_direction();
        assert_eq!(app.selected_direction(), Some("to_south"));
        app.next_direction();
        assert_eq!(app.selected_direction(), Some("to_north"));
    }

    #[test]
    fn queries_report_no_data_before_the_load_resolves() {
        let app = App::new();
        let now = target_offset()
            .with_ymd_and_hms(2024, 1, 8, 8, 15, 0)
            .single()
            .expect("valid instant");
        assert!(app.next_departure(now).is_none());
        assert!(app.displayed_table(now).is_none());
    }

    #[test]
    fn next_departure_resolves_for_a_complete_selection() {
        let mut app = loaded_app();
        app.select_current_station();
        let now = target_offset()
            .with_ymd_and_hms(2024, 1, 8, 8, 15, 0)
            .single()
            .expect("valid instant");
        let departure = app.next_departure(now).expect("slot remains today");
        assert!(!departure.is_tomorrow);
        assert!(app.displayed_table(now).is_some());
    }
}
