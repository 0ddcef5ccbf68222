use std::collections::BTreeMap;
use std::fmt;
use serde::{Deserialize, Serialize};

use crate::event_loop::{report::ReportKey, settings::SettingsStore};

// ---------------------------------------------------------------------------
// Setting keys
// ---------------------------------------------------------------------------

/// Every per-track key the event loop understands, in directive order.
pub const SETTING_KEYS: [&str; 14] = [
    "disabled",
    "gamemode",
    "num_teams",
    "laps",
    "time_limit",
    "elimination_interval",
    "vehicle_damage",
    "car_class_restriction",
    "car_restriction",
    "special_vehicles_disabled",
    "car_reset_disabled",
    "car_reset_delay",
    "wrong_way_limiter_disabled",
    "weather",
];

/// Keys that only make sense for `racing` / `team race`.
pub const RACE_ONLY_KEYS: [&str; 4] = [
    "num_teams",
    "laps",
    "elimination_interval",
    "wrong_way_limiter_disabled",
];

/// Keys that only make sense for `derby` / `derby deathmatch`.
pub const DERBY_ONLY_KEYS: [&str; 1] = ["time_limit"];

pub const KEY_DISABLED: &str = "disabled";
pub const KEY_GAMEMODE: &str = "gamemode";
pub const KEY_SPECIAL_VEHICLES_DISABLED: &str = "special_vehicles_disabled";

pub fn is_setting_key(key: &str) -> bool {
    SETTING_KEYS.contains(&key)
}

// ---------------------------------------------------------------------------
// Track catalog
// ---------------------------------------------------------------------------

/// One selectable map layout from the track catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    /// Empty for derby-only arenas.
    pub race_type: String,
    pub area_type: String,
    pub id: String,
}

impl Track {
    pub fn new(
        name: impl Into<String>,
        race_type: impl Into<String>,
        area_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Track {
            name: name.into(),
            race_type: race_type.into(),
            area_type: area_type.into(),
            id: id.into(),
        }
    }

    /// Category used for anti-repetition: race type, else area type.
    pub fn kind(&self) -> &str {
        if self.race_type.is_empty() {
            &self.area_type
        } else {
            &self.race_type
        }
    }

    pub fn is_derby_only(&self) -> bool {
        self.race_type.is_empty()
    }

    /// Key of this track's report entry.
    pub fn report_key(&self) -> ReportKey {
        ReportKey::from(self)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.kind())
    }
}

// ---------------------------------------------------------------------------
// Game modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Racing,
    TeamRace,
    Derby,
    DerbyDeathmatch,
}

impl GameMode {
    /// Value written to `el_gamemode`.
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Racing          => "racing",
            GameMode::TeamRace        => "team race",
            GameMode::Derby           => "derby",
            GameMode::DerbyDeathmatch => "derby deathmatch",
        }
    }

    pub fn parse(value: &str) -> Option<GameMode> {
        match value.trim() {
            "racing"           => Some(GameMode::Racing),
            "team race"        => Some(GameMode::TeamRace),
            "derby"            => Some(GameMode::Derby),
            "derby deathmatch" => Some(GameMode::DerbyDeathmatch),
            _ => None,
        }
    }

    pub fn is_race(self) -> bool {
        matches!(self, GameMode::Racing | GameMode::TeamRace)
    }

    /// Whether `key` is meaningful in this mode.
    pub fn allows(self, key: &str) -> bool {
        if self.is_race() {
            !DERBY_ONLY_KEYS.contains(&key)
        } else {
            !RACE_ONLY_KEYS.contains(&key)
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Effective settings
// ---------------------------------------------------------------------------

/// Flattened property set for one track after all layers are applied.
///
/// Only keys from [`SETTING_KEYS`] are stored. Iteration follows the
/// `SETTING_KEYS` order, not insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackSettings {
    values: BTreeMap<String, String>,
}

impl TrackSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert a recognized key; anything else is rejected and returned.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), String> {
        if !is_setting_key(key) {
            return Err(key.to_string());
        }
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// `(key, value)` pairs in [`SETTING_KEYS`] order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        SETTING_KEYS
            .iter()
            .filter_map(move |&key| self.get(key).map(|value| (key, value)))
    }

    pub fn gamemode(&self) -> Option<&str> {
        self.get(KEY_GAMEMODE)
    }

    pub fn is_disabled(&self) -> bool {
        self.get(KEY_DISABLED).is_some_and(parse_flag)
    }

    /// Drop keys that the given mode does not use.
    pub fn retain_for(&mut self, mode: GameMode) {
        self.values.retain(|key, _| mode.allows(key));
    }
}

/// Boolean flags follow the `true`/anything-else convention of the
/// settings file: only a case-insensitive `true` is set.
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

// ---------------------------------------------------------------------------
// Run request / result
// ---------------------------------------------------------------------------

/// Everything one event loop run needs.
#[derive(Debug, Clone, Default)]
pub struct EventLoopRequest {
    pub tracks: Vec<Track>,
    /// Tool settings (`RandomMaps.properties`). Empty means "all defaults".
    pub settings: SettingsStore,
    /// Server defaults already present in the base config.
    pub base: SettingsStore,
    pub rng_seed: Option<u64>,
}

impl EventLoopRequest {
    /// Request with empty settings and an entropy seed.
    pub fn new(tracks: Vec<Track>) -> Self {
        EventLoopRequest {
            tracks,
            ..Self::default()
        }
    }

    pub fn with_settings(mut self, settings: SettingsStore) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_base(mut self, base: SettingsStore) -> Self {
        self.base = base;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// One emitted track with its final settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEntry {
    pub track: Track,
    pub settings: TrackSettings,
}

impl EventEntry {
    /// Final gamemode as written, including unrecognized overrides.
    pub fn gamemode(&self) -> &str {
        self.settings.gamemode().unwrap_or_default()
    }
}

impl fmt::Display for EventEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.track, self.gamemode())
    }
}
