use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::core::error::{TransformError, TransformResult};
use crate::core::profile::MediaProfile;

/// Reads a profile document. `.toml` files are parsed as TOML, everything else
/// as JSON.
pub fn load_profile(path: &Path) -> TransformResult<MediaProfile> {
    let text = fs::read_to_string(path)?;
    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let document: Value = if is_toml {
        toml::from_str(&text).map_err(|e| TransformError::ProfileShape {
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str(&text).map_err(|e| TransformError::ProfileShape {
            message: e.to_string(),
        })?
    };

    let profile = MediaProfile::from_value(&document)?;
    debug!(path = %path.display(), name = %profile.name, "loaded profile");
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn loads_json_profile() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"name": "web", "format": "mp4", "audio": {{"codec": "aac", "bitrate": "96k"}}}}"#
        )
        .unwrap();

        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.name, "web");
        assert_eq!(profile.audio[0].bitrate, Some(96_000));
    }

    #[test]
    fn loads_toml_profile() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            r#"
name = "archive"
format = "matroska"

[[video]]
codec = "libx265"
bitrate = "4000k"
frame_rate = 25.0

[[audio]]
codec = "flac"
sample_rate = "96k"
"#
        )
        .unwrap();

        let profile = load_profile(file.path()).unwrap();
        assert_eq!(profile.format.as_deref(), Some("matroska"));
        assert_eq!(profile.video[0].bitrate, Some(4_000_000));
        assert_eq!(profile.video[0].frame_rate, Some(25.0));
        assert_eq!(profile.audio[0].sample_rate, Some(96_000));
    }

    #[test]
    fn syntax_errors_are_shape_errors() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{ not json").unwrap();

        assert!(matches!(
            load_profile(file.path()),
            Err(TransformError::ProfileShape { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_profile(&dir.path().join("absent.json")),
            Err(TransformError::Io(_))
        ));
    }
}
