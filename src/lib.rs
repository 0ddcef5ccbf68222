//! # wreckfest_loop_gen
//!
//! Randomised event loop generator for Wreckfest dedicated servers.
//!
//! The server plays the tracks listed as `el_add=<id>` entries in its config
//! file, in order. This library turns a catalog of tracks into a shuffled
//! event loop that avoids running the same kind of track twice in a row or
//! revisiting a map too soon, picks a game mode for every entry, and applies
//! per-track settings from a `.properties` file.
//!
//! ## How it works
//!
//! 1. Parse the tab-separated catalog with [`parse_catalog`] (or build an
//!    [`EventLoopRequest`] straight from file contents with
//!    [`EventLoopRequest::from_sources`]).
//! 2. Call [`generate_event_loop`]: disabled tracks are set aside, the rest
//!    are drawn one by one, and each drawn track gets a random game mode and
//!    its layered settings (server defaults → global → per-track).
//! 3. Write the returned [`EventLoop`] entries with [`write_directives`] and
//!    optionally print the [`Report`].
//!
//! ## Key features
//!
//! - **Deterministic**: pass `rng_seed: Some(u64)` to reproduce the exact
//!   same loop. Each run owns its own RNG.
//! - **Best-effort variety**: up to five draws per slot look for a track of a
//!   different kind whose name was not among the last five; otherwise the
//!   fifth draw is taken.
//! - **Mode thresholds**: `RandomMaps.teamModeThreshold` and
//!   `RandomMaps.deathmatchThreshold` (percent, default 1).
//!
//! ## Quick start
//!
//! ```rust
//! use wreckfest_loop_gen::{generate_event_loop, write_directives, EventLoopRequest};
//!
//! let catalog = "Speedway\toval\t\tspeedway1_oval\n\
//!                Crash Canyon\t\tderby\tcrash_canyon_arena\n";
//! let settings = "speedway1_oval.laps=6\n";
//!
//! let request = EventLoopRequest::from_sources(catalog, Some(settings), None)
//!     .unwrap()
//!     .with_seed(42);
//! let event_loop = generate_event_loop(request).unwrap();
//!
//! for entry in &event_loop.entries {
//!     println!("{entry}");
//! }
//!
//! let mut cfg = Vec::new();
//! write_directives(&mut cfg, &event_loop.entries).unwrap();
//! assert!(String::from_utf8(cfg).unwrap().contains("el_laps=6"));
//! ```

pub mod event_loop;

pub use event_loop::{
    generate_event_loop, generate_with_rng, parse_catalog, write_directives, CatalogError,
    Directive, Error, EventEntry, EventLoop, EventLoopRequest, GameMode, Report, ReportEntry,
    ReportField, ReportKey, Result, SettingsError, SettingsStore, Thresholds, Track, TrackSettings,
    SETTING_KEYS,
};
