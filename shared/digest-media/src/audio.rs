//! Locating retrieved audio artifacts

use crate::Result;
use digest_core::{ArtifactScanner, DataLayout};
use std::path::PathBuf;

/// Find the audio file the retrieval collaborator produced for an item.
///
/// Tries `<id>.<preferred_ext>` first. yt-dlp may keep a different codec or
/// extension, so the fallback is the first `<id>.*` file in the audio
/// directory. `None` means nothing could be found, which the caller records
/// as a null path rather than an error.
pub async fn locate_audio(
    layout: &DataLayout,
    video_id: &str,
    preferred_ext: &str,
) -> Result<Option<PathBuf>> {
    let expected = layout.audio_path(video_id, preferred_ext);
    if expected.exists() {
        return Ok(Some(expected));
    }

    let fallback = ArtifactScanner::find_by_prefix(layout.audio_dir(), video_id).await?;
    match &fallback {
        Some(path) => tracing::debug!(
            "Expected {} missing, using {}",
            expected.display(),
            path.display()
        ),
        None => tracing::debug!("No audio file found for {}", video_id),
    }
    Ok(fallback)
}
