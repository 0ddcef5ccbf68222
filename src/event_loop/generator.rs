use std::collections::HashMap;

use log::{debug, info};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;

use crate::event_loop::{
    catalog::parse_catalog,
    error::Result,
    mode::{classify, classify_disabled},
    models::{EventEntry, EventLoopRequest, Track, TrackSettings},
    report::Report,
    selector::Selector,
    settings::{Resolver, SettingsStore, Thresholds},
};

/// Output of one run: the ordered entries to write and the summary report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventLoop {
    /// Enabled tracks in emission order.
    pub entries: Vec<EventEntry>,
    /// Every catalog track, disabled ones included.
    pub report: Report,
}

impl EventLoop {
    pub fn track_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.track.id.as_str())
    }
}

impl EventLoopRequest {
    /// Build a request from raw file contents.
    ///
    /// A missing settings file or base config (`None`) means "use defaults".
    pub fn from_sources(catalog: &str, settings: Option<&str>, base: Option<&str>) -> Result<Self> {
        Ok(EventLoopRequest {
            tracks: parse_catalog(catalog)?,
            settings: settings.map(SettingsStore::parse_properties).unwrap_or_default(),
            base: base.map(SettingsStore::parse_properties).unwrap_or_default(),
            rng_seed: None,
        })
    }
}

/// Run the generator with a fresh RNG seeded from the request.
pub fn generate_event_loop(request: EventLoopRequest) -> Result<EventLoop> {
    let thresholds = Thresholds::from_store(&request.settings)?;
    let mut rng: StdRng = match request.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    };
    Ok(generate_with_rng(
        request.tracks,
        &request.settings,
        &request.base,
        thresholds,
        &mut rng,
    ))
}

/// Core pass: one shared RNG drives both track selection and mode draws,
/// interleaved per emitted track.
pub fn generate_with_rng<R: Rng>(
    tracks: Vec<Track>,
    settings: &SettingsStore,
    base: &SettingsStore,
    thresholds: Thresholds,
    rng: &mut R,
) -> EventLoop {
    let resolver = Resolver::new(base, settings);
    let mut report = Report::new();

    let mut overrides: HashMap<String, TrackSettings> = tracks
        .iter()
        .map(|t| (t.id.clone(), resolver.overrides(&t.id)))
        .collect();

    let (disabled, pool): (Vec<Track>, Vec<Track>) = tracks
        .into_iter()
        .partition(|t| overrides.get(&t.id).is_some_and(TrackSettings::is_disabled));
    for track in &disabled {
        debug!("track '{}' is disabled", track.id);
        let own = overrides.remove(&track.id).unwrap_or_default();
        let classified = classify_disabled(track, resolver.layered(&own));
        report.record(track, &classified.settings, classified.mode);
    }
    info!("Tracks found: {} ({} disabled)", pool.len(), disabled.len());

    let mut selector = Selector::new(pool);
    let mut entries = Vec::with_capacity(selector.remaining());
    while let Some(track) = selector.next_track(rng) {
        let own = overrides.remove(&track.id).unwrap_or_default();
        let classified = classify(&track, resolver.layered(&own), &own, thresholds, rng);
        report.record(&track, &classified.settings, classified.mode);
        entries.push(EventEntry {
            track,
            settings: classified.settings,
        });
    }

    EventLoop { entries, report }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, Once};

    use crate::event_loop::error::{CatalogError, Error, SettingsError};

    #[test]
    fn from_sources_treats_missing_files_as_defaults() {
        let request = EventLoopRequest::from_sources("A\toval\t\tA1\n", None, None).unwrap();
        assert_eq!(request.tracks.len(), 1);
        assert!(request.settings.is_empty());
        assert!(request.base.is_empty());
    }

    #[test]
    fn malformed_catalog_aborts_before_generation() {
        let err = EventLoopRequest::from_sources("A\toval\n", None, None).unwrap_err();
        assert_eq!(err, Error::Catalog(CatalogError::MalformedRecord { line: 1, fields: 2 }));
    }

    #[test]
    fn invalid_threshold_is_fatal() {
        let request = EventLoopRequest::from_sources(
            "A\toval\t\tA1\n",
            Some("RandomMaps.teamModeThreshold=lots\n"),
            None,
        )
        .unwrap()
        .with_seed(1);
        assert!(matches!(
            generate_event_loop(request),
            Err(Error::Settings(SettingsError::InvalidThreshold { .. }))
        ));
    }

    #[test]
    fn entropy_seed_still_emits_everything() {
        let tracks = vec![
            Track::new("A", "oval", "", "a"),
            Track::new("B", "", "derby", "b"),
            Track::new("C", "circuit", "", "c"),
        ];
        let result = generate_event_loop(EventLoopRequest::new(tracks)).unwrap();
        let mut ids: Vec<&str> = result.track_ids().collect();
        ids.sort_unstable();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(result.report.len(), 3);
    }

    // Captures warnings so tests can count how often a message is logged.
    struct WarnCapture;

    static WARNINGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static CAPTURE: WarnCapture = WarnCapture;
    static INSTALL: Once = Once::new();

    impl log::Log for WarnCapture {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Warn
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                WARNINGS.lock().unwrap().push(record.args().to_string());
            }
        }

        fn flush(&self) {}
    }

    fn capture_warnings() {
        INSTALL.call_once(|| {
            log::set_logger(&CAPTURE).expect("no other logger in unit tests");
            log::set_max_level(log::LevelFilter::Warn);
        });
    }

    fn warnings_mentioning(needle: &str) -> usize {
        WARNINGS.lock().unwrap().iter().filter(|w| w.contains(needle)).count()
    }

    #[test]
    fn unrecognized_track_key_is_reported_once_per_track() {
        capture_warnings();
        let tracks = vec![
            Track::new("Warned", "oval", "", "warned_oval"),
            Track::new("Skipped", "", "derby", "warned_arena"),
        ];
        let settings: SettingsStore = [
            ("warned_oval.bots", "12"),
            ("warned_arena.bots", "8"),
            ("warned_arena.disabled", "true"),
        ]
        .into_iter()
        .collect();
        let mut rng = StdRng::seed_from_u64(6);
        let result = generate_with_rng(
            tracks,
            &settings,
            &SettingsStore::new(),
            Thresholds::default(),
            &mut rng,
        );
        assert_eq!(result.entries.len(), 1);
        assert_eq!(warnings_mentioning("warned_oval.bots"), 1);
        assert_eq!(warnings_mentioning("warned_arena.bots"), 1);
    }
}
