//! Game mode selection for a single track.
//!
//! Race tracks become `team race` with probability `team_mode`% and
//! `racing` otherwise. Derby arenas become plain `derby` with probability
//! `deathmatch`% and `derby deathmatch` otherwise. Exactly one draw in
//! `0..100` is taken per enabled track; disabled tracks take none.

use log::warn;
use rand::Rng;

use crate::event_loop::{
    models::{GameMode, Track, TrackSettings, KEY_DISABLED, KEY_GAMEMODE, KEY_SPECIAL_VEHICLES_DISABLED},
    settings::Thresholds,
};

/// Draw the mode for an enabled track.
pub fn draw_mode<R: Rng>(track: &Track, thresholds: Thresholds, rng: &mut R) -> GameMode {
    let roll: u8 = rng.gen_range(0..100);
    if track.is_derby_only() {
        if roll < thresholds.deathmatch {
            GameMode::Derby
        } else {
            GameMode::DerbyDeathmatch
        }
    } else if roll < thresholds.team_mode {
        GameMode::TeamRace
    } else {
        GameMode::Racing
    }
}

/// Mode given to disabled tracks without touching the RNG.
pub fn fallback_mode(track: &Track) -> GameMode {
    if track.is_derby_only() {
        GameMode::Derby
    } else {
        GameMode::Racing
    }
}

/// Result of applying a mode to resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub settings: TrackSettings,
    /// `None` when an override set a gamemode this tool does not know.
    pub mode: Option<GameMode>,
}

/// Turn resolved settings into final settings for an enabled track.
///
/// The drawn mode fills `gamemode` unless a per-track override already set
/// one. `derby deathmatch` needs special vehicles, so it forces
/// `special_vehicles_disabled=0`. Keys the final mode does not use are
/// dropped; an unrecognized mode keeps every key.
pub fn classify<R: Rng>(
    track: &Track,
    resolved: TrackSettings,
    overrides: &TrackSettings,
    thresholds: Thresholds,
    rng: &mut R,
) -> Classified {
    let drawn = draw_mode(track, thresholds, rng);
    let mut settings = resolved;
    if !overrides.contains(KEY_GAMEMODE) {
        let _ = settings.set(KEY_GAMEMODE, drawn.as_str());
    }
    settings.remove(KEY_DISABLED);
    finish(track, settings)
}

/// Final settings for a disabled track: fixed mode, `disabled=true`.
pub fn classify_disabled(track: &Track, resolved: TrackSettings) -> Classified {
    let mut settings = resolved;
    let _ = settings.set(KEY_GAMEMODE, fallback_mode(track).as_str());
    let _ = settings.set(KEY_DISABLED, "true");
    finish(track, settings)
}

fn finish(track: &Track, mut settings: TrackSettings) -> Classified {
    let raw = settings.gamemode().unwrap_or_default().to_string();
    let mode = GameMode::parse(&raw);
    match mode {
        Some(mode) => {
            if mode == GameMode::DerbyDeathmatch {
                let _ = settings.set(KEY_SPECIAL_VEHICLES_DISABLED, "0");
            }
            settings.retain_for(mode);
        }
        None => warn!(
            "track '{}' has unrecognized gamemode '{raw}', keeping all settings",
            track.id
        ),
    }
    Classified { settings, mode }
}
