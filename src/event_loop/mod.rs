//! Event loop generation: catalog parsing, track selection, settings and
//! mode resolution.
//!
//! ## Module overview
//!
//! | Module       | Purpose |
//! |--------------|---------|
//! | `models`     | Shared types: tracks, game modes, effective settings, request |
//! | `catalog`    | Tab-separated track catalog parser |
//! | `settings`   | `.properties` store, thresholds and layered resolution |
//! | `selector`   | Anti-repetition track draw without replacement |
//! | `mode`       | Random game mode choice and mode-dependent key filtering |
//! | `report`     | Per-track summary keyed by `name\|kind\|id` |
//! | `directives` | `el_add` / `el_<key>` rendering |
//! | `generator`  | Single entry point `generate_event_loop()` |
//! | `error`      | Error types |

pub mod catalog;
pub mod directives;
pub mod error;
pub mod generator;
pub mod mode;
pub mod models;
pub mod report;
pub mod selector;
pub mod settings;

pub use catalog::parse_catalog;
pub use directives::{write_directives, Directive};
pub use error::{CatalogError, Error, Result, SettingsError};
pub use generator::{generate_event_loop, generate_with_rng, EventLoop};
pub use models::{EventEntry, EventLoopRequest, GameMode, Track, TrackSettings, SETTING_KEYS};
pub use report::{Report, ReportEntry, ReportField, ReportKey};
pub use selector::{select_order, Selector};
pub use settings::{Resolver, SettingsStore, Thresholds};
