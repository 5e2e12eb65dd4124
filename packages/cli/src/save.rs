use folio_editor::{SaveError, SaveOutcome, SaveTarget};
use std::fs;
use std::path::PathBuf;

/// Writes edited documents to disk
#[derive(Debug, Clone)]
pub struct FileSaveTarget {
    /// Directory for the suggested file name
    pub dir: PathBuf,
    /// Exact output path; takes precedence over `dir`
    pub output: Option<PathBuf>,
    pub overwrite: bool,
}

impl FileSaveTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            output: None,
            overwrite: false,
        }
    }

    fn path_for(&self, suggested_name: &str) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.dir.join(suggested_name))
    }
}

impl SaveTarget for FileSaveTarget {
    fn save(&mut self, bytes: &[u8], suggested_name: &str) -> Result<SaveOutcome, SaveError> {
        let path = self.path_for(suggested_name);
        if path.exists() && !self.overwrite {
            return Err(SaveError::AlreadyExists(path));
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote document");
        Ok(SaveOutcome::Persisted(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_suggested_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut target = FileSaveTarget::new(dir.path().join("out"));

        let outcome = target.save(b"%PDF", "edited_a.pdf").unwrap();
        let path = dir.path().join("out/edited_a.pdf");
        assert_eq!(outcome, SaveOutcome::Persisted(path.clone()));
        assert_eq!(fs::read(path).unwrap(), b"%PDF");
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("edited_a.pdf");
        fs::write(&existing, b"old").unwrap();

        let mut target = FileSaveTarget::new(dir.path());
        assert!(matches!(
            target.save(b"new", "edited_a.pdf"),
            Err(SaveError::AlreadyExists(p)) if p == existing
        ));
        assert_eq!(fs::read(&existing).unwrap(), b"old");

        target.overwrite = true;
        target.save(b"new", "edited_a.pdf").unwrap();
        assert_eq!(fs::read(&existing).unwrap(), b"new");
    }

    #[test]
    fn test_explicit_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.pdf");
        let mut target = FileSaveTarget {
            output: Some(output.clone()),
            ..FileSaveTarget::new(dir.path())
        };

        target.save(b"%PDF", "edited_a.pdf").unwrap();
        assert!(output.exists());
        assert!(!dir.path().join("edited_a.pdf").exists());
    }
}
