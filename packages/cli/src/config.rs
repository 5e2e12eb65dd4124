use folio_editor::EditorOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Editor tuning (drag threshold, output name prefix)
    #[serde(default)]
    pub editor: EditorOptions,

    /// Directory for edited documents, relative to the working directory.
    /// Defaults to the directory of the source document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,

    /// Replace existing output files
    #[serde(default)]
    pub overwrite: bool,
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        Self::load_from(&PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME))
    }

    /// Load config from an explicit path, falling back to defaults if absent
    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Directory edited copies of `source` are written to
    pub fn get_out_dir(&self, cwd: &str, source: &Path) -> PathBuf {
        match &self.out_dir {
            Some(dir) => PathBuf::from(cwd).join(dir),
            None => source
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from(cwd)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "editor": { "dragThreshold": 12.0, "suggestedNamePrefix": "neu_" },
            "outDir": "edited",
            "overwrite": true
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.editor.drag_threshold, 12.0);
        assert_eq!(config.editor.suggested_name_prefix, "neu_");
        assert_eq!(config.out_dir, Some("edited".to_string()));
        assert!(config.overwrite);
        assert_eq!(
            config.get_out_dir("/work", Path::new("in/a.pdf")),
            PathBuf::from("/work/edited")
        );
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.editor, EditorOptions::default());
        assert!(!config.overwrite);
        assert_eq!(
            config.get_out_dir("/work", Path::new("scans/a.pdf")),
            PathBuf::from("scans")
        );
        assert_eq!(
            config.get_out_dir("/work", Path::new("a.pdf")),
            PathBuf::from("/work")
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().display().to_string()).unwrap();
        assert!(config.out_dir.is_none());
    }
}
