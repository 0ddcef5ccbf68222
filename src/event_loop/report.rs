use std::collections::BTreeMap;
use std::fmt;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::event_loop::models::{GameMode, Track, TrackSettings, SETTING_KEYS};

/// Report map key, written as `name|kind|id`.
///
/// Ordering compares name, then kind, then id, so "Speedway" sorts before
/// "Speedway 2" even though `'|'` sorts after a space.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportKey {
    pub name: String,
    pub kind: String,
    pub id: String,
}

impl From<&Track> for ReportKey {
    fn from(track: &Track) -> Self {
        ReportKey {
            name: track.name.clone(),
            kind: track.kind().to_string(),
            id: track.id.clone(),
        }
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.name, self.kind, self.id)
    }
}

impl Serialize for ReportKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReportKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        // Ids and kinds never contain '|'; names might.
        let mut parts = raw.rsplitn(3, '|');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), Some(kind), Some(name)) => Ok(ReportKey {
                name: name.to_string(),
                kind: kind.to_string(),
                id: id.to_string(),
            }),
            _ => Err(de::Error::custom(format!("expected name|kind|id, got '{raw}'"))),
        }
    }
}

/// One key in a report entry. `value: None` means the server default applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportField {
    pub key: String,
    pub value: Option<String>,
}

/// Filtered settings view for one track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub fields: Vec<ReportField>,
}

impl ReportEntry {
    /// Every known key, set or not, minus those the mode does not use.
    pub fn new(settings: &TrackSettings, mode: Option<GameMode>) -> Self {
        let fields = SETTING_KEYS
            .iter()
            .filter(|key| mode.map_or(true, |m| m.allows(key)))
            .map(|&key| ReportField {
                key: key.to_string(),
                value: settings.get(key).map(str::to_string),
            })
            .collect();
        ReportEntry { fields }
    }

    pub fn get(&self, key: &str) -> Option<&ReportField> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Value of `key`, `None` if the key is unset or filtered out.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|f| f.value.as_deref())
    }
}

/// Summary of a run keyed by `name|kind|id`, ordered by name, kind, id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub entries: BTreeMap<ReportKey, ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, track: &Track, settings: &TrackSettings, mode: Option<GameMode>) {
        self.entries
            .insert(track.report_key(), ReportEntry::new(settings, mode));
    }

    pub fn get(&self, track: &Track) -> Option<&ReportEntry> {
        self.entries.get(&track.report_key())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, entry) in &self.entries {
            writeln!(f, "{key}")?;
            for field in &entry.fields {
                let value = field.value.as_deref().unwrap_or("<default>");
                writeln!(f, "    {} = {}", field.key, value)?;
            }
        }
        Ok(())
    }
}
