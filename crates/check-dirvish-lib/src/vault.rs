use std::path::{Path, PathBuf};

/// A named dirvish vault below a base path (the "bank").
///
/// The on-disk layout consumed is `<base>/<name>/dirvish/default.hist` for
/// the history log and `<base>/<name>/<image>/{tree,summary}` for the
/// individual backup images. Constructed once per check invocation and
/// read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vault {
    name: String,
    base_path: PathBuf,
}

impl Vault {
    pub fn new(name: impl Into<String>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            base_path: base_path.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Root directory of this vault.
    pub fn vault_path(&self) -> PathBuf {
        self.base_path.join(&self.name)
    }

    /// The append-only history log written by dirvish.
    pub fn history_file_path(&self) -> PathBuf {
        self.vault_path().join("dirvish").join("default.hist")
    }

    /// Directory of a single backup image.
    pub fn image_path(&self, image: &str) -> PathBuf {
        self.vault_path().join(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_paths() {
        let vault = Vault::new("mail", "/srv/backup");
        assert_eq!(vault.vault_path(), PathBuf::from("/srv/backup/mail"));
        assert_eq!(
            vault.history_file_path(),
            PathBuf::from("/srv/backup/mail/dirvish/default.hist")
        );
        assert_eq!(
            vault.image_path("2026-08-06_03-00"),
            PathBuf::from("/srv/backup/mail/2026-08-06_03-00")
        );
    }
}
