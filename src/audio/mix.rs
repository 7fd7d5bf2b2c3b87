use std::path::Path;

use crate::assets::media::AudioPcm;
use crate::foundation::error::{AftermovieError, AftermovieResult};

/// Length of the fade applied when a non-looping track outlasts the video.
pub(crate) const FADE_OUT_SECS: f64 = 2.0;

/// Render the soundtrack: exactly `total_secs` of interleaved PCM at the source rate.
///
/// Looping tracks are tiled. A short track is padded with silence. A longer, non-looping track
/// fades to zero over the final [`FADE_OUT_SECS`] and stops at the end of the video.
pub(crate) fn build_soundtrack(
    pcm: &AudioPcm,
    total_secs: f64,
    volume: f32,
    looped: bool,
) -> Vec<f32> {
    let channels = usize::from(pcm.channels.max(1));
    let rate = f64::from(pcm.sample_rate);
    let total_frames = (total_secs.max(0.0) * rate).round() as usize;
    let mut out = vec![0.0f32; total_frames * channels];

    let src_frames = pcm.frames();
    if src_frames == 0 || total_frames == 0 {
        return out;
    }

    let fade = !looped && src_frames > total_frames;
    let fade_frames = ((FADE_OUT_SECS * rate).round() as usize).clamp(1, total_frames);
    let fade_start = total_frames - fade_frames;

    for frame in 0..total_frames {
        let src_frame = if looped {
            frame % src_frames
        } else if frame < src_frames {
            frame
        } else {
            break;
        };

        let mut gain = volume;
        if fade && frame >= fade_start {
            gain *= (total_frames - frame) as f32 / fade_frames as f32;
        }

        let dst = frame * channels;
        let src = src_frame * channels;
        for c in 0..channels {
            out[dst + c] = (pcm.interleaved_f32[src + c] * gain).clamp(-1.0, 1.0);
        }
    }
    out
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(
    samples_interleaved: &[f32],
    out_path: &Path,
) -> AftermovieResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            AftermovieError::Other(anyhow::anyhow!(
                "failed to create audio directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        AftermovieError::Other(anyhow::anyhow!(
            "failed to write soundtrack '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
