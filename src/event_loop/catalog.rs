//! Track catalog loader.
//!
//! The catalog is a tab-separated file with one layout per line:
//!
//! ```text
//! # name          race type   area type   id
//! Speedway        oval                    speedway1_oval
//!                 figure 8                speedway1_figure_8
//! Crash Canyon                derby       crash_canyon_arena
//! ```
//!
//! A blank name continues the previous named track (alternate layouts of the
//! same map). That state is carried explicitly through a fold, so records must
//! be processed in input order.

use std::collections::HashSet;

use csv::{Position, ReaderBuilder, StringRecord};

use crate::event_loop::{error::CatalogError, models::Track};

/// Fold state while walking the records.
#[derive(Default)]
struct Loader {
    last_name: Option<String>,
    seen_ids: HashSet<String>,
    tracks: Vec<Track>,
}

impl Loader {
    fn push(mut self, line: usize, record: &StringRecord) -> Result<Self, CatalogError> {
        let fields: Vec<&str> = record.iter().map(str::trim).collect();
        if fields.len() < 4 {
            return Err(CatalogError::MalformedRecord { line, fields: fields.len() });
        }
        let (name, race_type, area_type, id) = (fields[0], fields[1], fields[2], fields[3]);

        let name = if name.is_empty() {
            self.last_name
                .clone()
                .ok_or(CatalogError::OrphanContinuation { line })?
        } else {
            self.last_name = Some(name.to_string());
            name.to_string()
        };
        if race_type.is_empty() && area_type.is_empty() {
            return Err(CatalogError::MissingKind { line });
        }
        if id.is_empty() {
            return Err(CatalogError::MissingId { line });
        }
        if !self.seen_ids.insert(id.to_string()) {
            return Err(CatalogError::DuplicateId { line, id: id.to_string() });
        }

        self.tracks.push(Track::new(name, race_type, area_type, id));
        Ok(self)
    }
}

/// 1-based line of the record that starts at or after `pos`.
///
/// The reader reports where it resumed after the previous record, which sits
/// before any comment or empty lines it skipped.
fn record_line(text: &str, pos: &Position) -> usize {
    let skipped = text
        .get(pos.byte() as usize..)
        .unwrap_or_default()
        .split('\n')
        .take_while(|line| {
            let line = line.trim_end_matches('\r');
            line.is_empty() || line.starts_with('#')
        })
        .count();
    pos.line() as usize + skipped
}

/// Parse a whole catalog file.
///
/// Comment lines (`#` in the first column) and lines with nothing but
/// whitespace are skipped; line numbers in errors count every line.
pub fn parse_catalog(text: &str) -> Result<Vec<Track>, CatalogError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(text.as_bytes());

    reader
        .records()
        .try_fold(Loader::default(), |loader, result| {
            let record = result.map_err(|err| CatalogError::Unreadable {
                line: err.position().map_or(0, |pos| record_line(text, pos)),
                message: err.to_string(),
            })?;
            if record.iter().all(|field| field.trim().is_empty()) {
                return Ok(loader);
            }
            let line = record.position().map_or(0, |pos| record_line(text, pos));
            loader.push(line, &record)
        })
        .map(|loader| loader.tracks)
}

/// Parse raw records given one per element, in order.
pub fn parse_records<'a, I>(records: I) -> Result<Vec<Track>, CatalogError>
where
    I: IntoIterator<Item = &'a str>,
{
    let text = records.into_iter().collect::<Vec<_>>().join("\n");
    parse_catalog(&text)
}
