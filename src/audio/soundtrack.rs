use std::path::{Path, PathBuf};

use crate::assets::media::{MIX_SAMPLE_RATE, decode_audio_f32_stereo};
use crate::audio::mix::{build_soundtrack, write_mix_to_f32le_file};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::cancel::CancelToken;
use crate::foundation::error::AftermovieResult;
use crate::model::AudioOptions;

/// Deletes a temporary file when dropped.
#[derive(Debug)]
pub(crate) struct TempFileGuard {
    path: PathBuf,
}

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path)
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to remove temp file");
        }
    }
}

fn temp_mix_path() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    std::env::temp_dir().join(format!(
        "aftermovie_audio_{}_{nanos}.f32le",
        std::process::id()
    ))
}

/// Mixed soundtrack on disk, ready to be handed to the encoder.
///
/// The backing file lives exactly as long as this value.
#[derive(Debug)]
pub(crate) struct Soundtrack {
    guard: TempFileGuard,
    input: AudioInputConfig,
}

impl Soundtrack {
    /// Decode, shape and store the soundtrack for a video of `total_secs`.
    #[tracing::instrument(level = "debug", skip(cancel))]
    pub(crate) fn prepare(
        audio: &AudioOptions,
        total_secs: f64,
        cancel: &CancelToken,
    ) -> AftermovieResult<Self> {
        cancel.check()?;
        let pcm = decode_audio_f32_stereo(&audio.path, MIX_SAMPLE_RATE)?;
        cancel.check()?;

        let mixed = build_soundtrack(&pcm, total_secs, audio.gain(), audio.looped);
        let guard = TempFileGuard::new(temp_mix_path());
        write_mix_to_f32le_file(&mixed, guard.path())?;
        cancel.check()?;

        tracing::debug!(
            samples = mixed.len(),
            path = %guard.path().display(),
            "soundtrack ready"
        );
        Ok(Self {
            input: AudioInputConfig {
                path: guard.path().to_path_buf(),
                sample_rate: pcm.sample_rate,
                channels: pcm.channels,
            },
            guard,
        })
    }

    pub(crate) fn input(&self) -> &AudioInputConfig {
        &self.input
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/soundtrack.rs"]
mod tests;
