//! `el_*` lines appended to the server config.

use std::fmt;
use std::io::{self, Write};

use crate::event_loop::models::EventEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// `el_add=<track id>` starts a new event loop entry.
    Add(String),
    /// `el_<key>=<value>` applies to the most recent `el_add`.
    Set { key: String, value: String },
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Add(id) => write!(f, "el_add={id}"),
            Directive::Set { key, value } => write!(f, "el_{key}={value}"),
        }
    }
}

impl EventEntry {
    /// `el_add` followed by one line per setting, in key order.
    pub fn directives(&self) -> Vec<Directive> {
        std::iter::once(Directive::Add(self.track.id.clone()))
            .chain(self.settings.iter().map(|(key, value)| Directive::Set {
                key: key.to_string(),
                value: value.to_string(),
            }))
            .collect()
    }
}

/// Write each entry as a blank line plus its directives.
pub fn write_directives<W: Write>(out: &mut W, entries: &[EventEntry]) -> io::Result<()> {
    for entry in entries {
        writeln!(out)?;
        for directive in entry.directives() {
            writeln!(out, "{directive}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_loop::models::{Track, TrackSettings};

    fn entry() -> EventEntry {
        let mut settings = TrackSettings::new();
        settings.set("weather", "rain").unwrap();
        settings.set("gamemode", "racing").unwrap();
        settings.set("laps", "4").unwrap();
        EventEntry {
            track: Track::new("Alpha", "oval", "", "A1"),
            settings,
        }
    }

    #[test]
    fn add_comes_first_then_keys_in_known_order() {
        let lines: Vec<String> = entry().directives().iter().map(ToString::to_string).collect();
        assert_eq!(lines, ["el_add=A1", "el_gamemode=racing", "el_laps=4", "el_weather=rain"]);
    }

    #[test]
    fn writer_separates_entries_with_blank_lines() {
        let mut buf = Vec::new();
        write_directives(&mut buf, &[entry(), entry()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let block = "\nel_add=A1\nel_gamemode=racing\nel_laps=4\nel_weather=rain\n";
        assert_eq!(text, format!("{block}{block}"));
    }

    #[test]
    fn no_entries_writes_nothing() {
        let mut buf = Vec::new();
        write_directives(&mut buf, &[]).unwrap();
        assert!(buf.is_empty());
    }
}
