use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::drag::DEFAULT_DRAG_THRESHOLD;

pub const DEFAULT_NAME_PREFIX: &str = "edited_";

/// Editor tuning, usually read from the front end's config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorOptions {
    /// Pointer travel (px) before a press on a page becomes a drag
    pub drag_threshold: f32,

    /// Prepended to the source file name to suggest an output name
    pub suggested_name_prefix: String,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            suggested_name_prefix: DEFAULT_NAME_PREFIX.to_string(),
        }
    }
}

impl EditorOptions {
    /// Output name for a source, e.g. `edited_report.pdf`
    pub fn suggested_name(&self, source_name: &str) -> String {
        let file_name = Path::new(source_name)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| source_name.to_string());
        format!("{}{}", self.suggested_name_prefix, file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let json = r#"{ "dragThreshold": 4.5, "suggestedNamePrefix": "new-" }"#;
        let options: EditorOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.drag_threshold, 4.5);
        assert_eq!(options.suggested_name("in.pdf"), "new-in.pdf");
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let options: EditorOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, EditorOptions::default());
        assert_eq!(options.drag_threshold, 8.0);
    }

    #[test]
    fn test_suggested_name_drops_directories() {
        let options = EditorOptions::default();
        assert_eq!(options.suggested_name("/tmp/scans/report.pdf"), "edited_report.pdf");
    }
}
