//! Settings store and layered per-track resolution.
//!
//! ## Layers
//!
//! Effective settings for a track are merged from three maps, lowest to
//! highest precedence:
//!
//! 1. server defaults found in the base config (`laps=5`)
//! 2. global tool settings (`laps=3` in `RandomMaps.properties`)
//! 3. per-track overrides (`speedway1_oval.laps=8`)
//!
//! Each layer only overwrites the keys it defines. Only keys from
//! [`SETTING_KEYS`](crate::event_loop::models::SETTING_KEYS) take part.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::event_loop::{
    error::SettingsError,
    models::{is_setting_key, Track, TrackSettings, KEY_DISABLED},
};

pub const TEAM_MODE_THRESHOLD_KEY: &str = "RandomMaps.teamModeThreshold";
pub const DEATHMATCH_THRESHOLD_KEY: &str = "RandomMaps.deathmatchThreshold";
pub const DEFAULT_THRESHOLD: u8 = 1;

/// Flat string map with exact and prefix lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsStore {
    entries: BTreeMap<String, String>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse Java-style `.properties` text.
    ///
    /// Supports `#`/`!` comments, `=`, `:` or whitespace separators,
    /// backslash line continuation and the usual escapes. Later keys win.
    pub fn parse_properties(text: &str) -> Self {
        let mut store = SettingsStore::new();
        for line in logical_lines(text) {
            let (key, value) = split_entry(&line);
            store.insert(unescape(&key), unescape(&value));
        }
        store
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// All entries whose key starts with `prefix`, in key order.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.entries
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SettingsStore {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        SettingsStore {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// .properties syntax
// ---------------------------------------------------------------------------

/// Join continuation lines and drop comments / blanks.
fn logical_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut pending: Option<String> = None;

    for raw in text.lines() {
        let trimmed = raw.trim_start();
        let mut current = match pending.take() {
            Some(mut acc) => {
                acc.push_str(trimmed);
                acc
            }
            None => {
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('!') {
                    continue;
                }
                trimmed.to_string()
            }
        };
        if ends_with_continuation(&current) {
            current.pop();
            pending = Some(current);
        } else {
            lines.push(current);
        }
    }
    if let Some(rest) = pending {
        lines.push(rest);
    }
    lines
}

/// An odd number of trailing backslashes continues the line.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str) -> (String, String) {
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '=' | ':' => {
                return (line[..idx].to_string(), line[idx + 1..].trim_start().to_string());
            }
            c if c.is_whitespace() => {
                let rest = line[idx..].trim_start();
                let rest = rest
                    .strip_prefix('=')
                    .or_else(|| rest.strip_prefix(':'))
                    .unwrap_or(rest);
                return (line[..idx].to_string(), rest.trim_start().to_string());
            }
            _ => {}
        }
    }
    (line.to_string(), String::new())
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(decoded) => out.push(decoded),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Percent thresholds (0..=100) steering the random mode choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Chance of `team race` on race tracks.
    pub team_mode: u8,
    /// Chance of plain `derby` (instead of deathmatch) on derby arenas.
    pub deathmatch: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Thresholds {
            team_mode: DEFAULT_THRESHOLD,
            deathmatch: DEFAULT_THRESHOLD,
        }
    }
}

impl Thresholds {
    pub fn from_store(store: &SettingsStore) -> Result<Self, SettingsError> {
        Ok(Thresholds {
            team_mode: threshold(store, TEAM_MODE_THRESHOLD_KEY)?,
            deathmatch: threshold(store, DEATHMATCH_THRESHOLD_KEY)?,
        })
    }
}

fn threshold(store: &SettingsStore, key: &str) -> Result<u8, SettingsError> {
    let Some(raw) = store.get(key) else {
        return Ok(DEFAULT_THRESHOLD);
    };
    raw.trim()
        .parse::<u8>()
        .ok()
        .filter(|value| *value <= 100)
        .ok_or_else(|| SettingsError::InvalidThreshold {
            key: key.to_string(),
            value: raw.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Merges the three layers for a given track.
///
/// Borrowing both stores keeps resolution pure: the same track and stores
/// always produce the same map.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    base: &'a SettingsStore,
    settings: &'a SettingsStore,
}

impl<'a> Resolver<'a> {
    pub fn new(base: &'a SettingsStore, settings: &'a SettingsStore) -> Self {
        Resolver { base, settings }
    }

    /// Per-track overrides only (`<id>.<key>` with the prefix stripped).
    pub fn overrides(&self, track_id: &str) -> TrackSettings {
        let prefix = format!("{track_id}.");
        let mut out = TrackSettings::new();
        for (key, value) in self.settings.with_prefix(&prefix) {
            let property = &key[prefix.len()..];
            if out.set(property, value).is_err() {
                warn!("ignoring unrecognized setting '{key}'");
            }
        }
        out
    }

    /// Base, global and per-track layers merged in that order.
    pub fn resolve(&self, track: &Track) -> TrackSettings {
        self.layered(&self.overrides(&track.id))
    }

    /// Same as [`resolve`](Self::resolve) with the per-track layer supplied
    /// by the caller, so overrides are looked up once per track.
    pub fn layered(&self, overrides: &TrackSettings) -> TrackSettings {
        let mut out = TrackSettings::new();
        for (key, value) in self.base.iter().filter(|(k, _)| is_setting_key(k)) {
            let _ = out.set(key, value);
        }
        for (key, value) in self
            .settings
            .iter()
            .filter(|(k, _)| is_setting_key(k) && *k != KEY_DISABLED)
        {
            let _ = out.set(key, value);
        }
        for (key, value) in overrides.iter() {
            let _ = out.set(key, value);
        }
        out
    }
}
