/// Slowest playback rate a clip is stretched to.
pub const MIN_PLAYBACK_RATE: f64 = 0.5;
/// Fastest playback rate a clip is squeezed to.
pub const MAX_PLAYBACK_RATE: f64 = 5.0;

/// Clip length used for resampling; an unknown length is taken to be the slot itself.
pub fn effective_clip_secs(clip_secs: Option<f64>, slot_secs: f64) -> f64 {
    clip_secs
        .filter(|d| d.is_finite() && *d > 0.0)
        .unwrap_or(slot_secs)
}

/// Speed at which a clip plays so that it fills its slot, clamped to `[0.5, 5]`.
pub fn playback_rate(clip_secs: Option<f64>, slot_secs: f64) -> f64 {
    if !slot_secs.is_finite() || slot_secs <= 0.0 {
        return 1.0;
    }
    let rate = effective_clip_secs(clip_secs, slot_secs) / slot_secs;
    if rate.is_finite() {
        rate.clamp(MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE)
    } else {
        MAX_PLAYBACK_RATE
    }
}

/// Source position shown at `frame` of the slot, wrapping around the clip length.
pub fn timelapse_position(frame: u64, fps: f64, rate: f64, clip_secs: f64) -> f64 {
    let t = frame as f64 / fps * rate;
    if clip_secs.is_finite() && clip_secs > 0.0 {
        t.rem_euclid(clip_secs)
    } else {
        t
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/timelapse.rs"]
mod tests;
