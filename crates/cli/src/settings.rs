//! Editor settings loader.
//!
//! Reads an optional TOML file into [`EditorConfig`]. Falls back to the
//! defaults when no file is given, or when it is missing or malformed.

use std::path::Path;

use editor::EditorConfig;

/// Load editor settings from `path`.
///
/// - `None`, or a file that does not exist, gives [`EditorConfig::default()`].
/// - A file that fails to read or parse logs a warning and gives the default.
pub async fn load_editor_config(path: Option<&Path>) -> EditorConfig {
    let Some(path) = path else {
        return EditorConfig::default();
    };

    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No settings file at {}, using defaults", path.display());
            return EditorConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return EditorConfig::default();
        }
    };

    match toml::from_str::<EditorConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor::{ActionOrdering, Position};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn missing_path_gives_defaults() {
        assert_eq!(load_editor_config(None).await, EditorConfig::default());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        assert_eq!(load_editor_config(Some(&path)).await, EditorConfig::default());
    }

    #[tokio::test]
    async fn partial_file_overrides_only_given_keys() {
        let file = settings_file("vertical-spacing = 200.0\nordering = \"vertical\"\n");
        let config = load_editor_config(Some(file.path())).await;

        assert_eq!(config.vertical_spacing, 200.0);
        assert_eq!(config.ordering, ActionOrdering::Vertical);
        assert_eq!(config.trigger_position, Position::new(250.0, 100.0));
    }

    #[tokio::test]
    async fn malformed_file_gives_defaults() {
        let file = settings_file("vertical-spacing = \"wide\"");
        assert_eq!(load_editor_config(Some(file.path())).await, EditorConfig::default());
    }
}
