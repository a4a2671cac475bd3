//! Collision resolution and track-list normalization.
//!
//! Pure functions over the project model. The store calls them after every
//! geometric or structural edit; nothing here touches shared state.

use tracing::warn;

use crate::constants::{MAX_TRACKS, MIN_TRACKS};
use crate::state::{Clip, Track, TrackType};

/// True iff the half-open intervals `[start, end)` of `a` and `b` intersect
/// with positive measure. Touching edges do not overlap.
pub fn is_overlapping(a: &Clip, b: &Clip) -> bool {
    a.overlaps(b.start, b.end())
}

/// Reconcile `existing` clips with a clip that was just moved or resized.
///
/// The moving clip always wins. Each other clip is kept, trimmed or dropped:
/// - fully covered: dropped
/// - tail covered: trimmed to end at `moving.start`
/// - head covered: pushed to start at `moving.end`
/// - moving clip strictly inside it: trimmed to end at `moving.start`; the
///   right remainder is discarded (overwrite, not split)
///
/// Output keeps input order. An entry sharing the moving clip's id is left
/// out, the caller owns where the moving clip goes.
pub fn resolve_overlaps(moving: &Clip, existing: &[Clip]) -> Vec<Clip> {
    let moving_end = moving.end();

    existing
        .iter()
        .filter(|other| other.id != moving.id)
        .filter_map(|other| {
            if !is_overlapping(moving, other) {
                return Some(other.clone());
            }

            let other_end = other.end();
            let mut trimmed = other.clone();

            if moving.start <= other.start && moving_end >= other_end {
                return None;
            } else if other.start < moving.start && other_end <= moving_end {
                trimmed.duration = moving.start - other.start;
            } else if moving.start <= other.start && moving_end < other_end {
                trimmed.start = moving_end;
                trimmed.duration = other_end - moving_end;
            } else {
                // other.start < moving.start && moving_end < other_end
                trimmed.duration = moving.start - other.start;
            }

            (trimmed.duration > 0.0).then_some(trimmed)
        })
        .collect()
}

/// Canonicalize a track list after a structural change.
///
/// Non-empty tracks keep their relative order (highest zIndex first), one
/// empty track trails them as a drop target, and the list is padded to
/// [`MIN_TRACKS`]. zIndex values are reassigned densely from [`MAX_TRACKS`]
/// downwards and tracks are renamed after their position.
///
/// Existing empty tracks are reused before new ones are synthesized, which
/// makes the function idempotent.
///
/// When there are [`MAX_TRACKS`] or more non-empty tracks, the trailing empty
/// track is omitted and any tracks below the limit are truncated; the number
/// of clips lost that way is logged.
pub fn normalize_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut sorted = tracks;
    // Stable: equal zIndex keeps input order.
    sorted.sort_by(|a, b| b.z_index.cmp(&a.z_index));

    let (mut result, empty): (Vec<Track>, Vec<Track>) =
        sorted.into_iter().partition(|t| !t.is_empty());
    let mut spare_empty = empty.into_iter();

    if result.len() >= MAX_TRACKS {
        let overflow = result.split_off(MAX_TRACKS);
        if !overflow.is_empty() {
            let dropped_clips: usize = overflow.iter().map(|t| t.clips.len()).sum();
            warn!(
                dropped_tracks = overflow.len(),
                dropped_clips,
                max_tracks = MAX_TRACKS,
                "Track limit exceeded, truncating bottom tracks"
            );
        }
    } else {
        let trailing = spare_empty
            .next()
            .unwrap_or_else(|| Track::new("", TrackType::Video, 0));
        result.push(trailing);
    }

    while result.len() < MIN_TRACKS {
        let padding = spare_empty
            .next()
            .unwrap_or_else(|| Track::new("", TrackType::Video, 0));
        result.push(padding);
    }

    for (idx, track) in result.iter_mut().enumerate() {
        track.z_index = MAX_TRACKS as i64 - idx as i64;
        track.name = format!("Track {}", idx + 1);
    }

    result
}
