//! Playback configuration documents.

use vx_ir::PlaybackConfig;

use crate::FormatError;

/// Parse a JSON playback configuration; absent fields take defaults.
pub fn parse_playback_config(json: &str) -> Result<PlaybackConfig, FormatError> {
    Ok(serde_json::from_str(json)?)
}
