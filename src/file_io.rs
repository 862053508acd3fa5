use crate::error::{QuizError, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub fn read_import_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| QuizError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Where an export goes: blank input means `export_dir/default_name`, an
/// existing directory gets `default_name` appended, anything else is used as-is.
pub fn resolve_export_path(input: &str, export_dir: &Path, default_name: &str) -> PathBuf {
    let input = input.trim();
    if input.is_empty() {
        return export_dir.join(default_name);
    }
    let path = PathBuf::from(input);
    if path.is_dir() {
        path.join(default_name)
    } else {
        path
    }
}

pub fn write_export(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    tracing::info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let err = read_import_file(&missing).unwrap_err();
        assert!(matches!(&err, QuizError::FileRead { path, .. } if path == &missing));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bank.json");
        write_export(&path, b"{}").unwrap();
        assert_eq!(read_import_file(&path).unwrap(), "{}");
    }

    #[test]
    fn test_resolve_export_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_export_path("  ", dir.path(), "bank.json"),
            dir.path().join("bank.json")
        );
        let dir_input = dir.path().to_string_lossy().to_string();
        assert_eq!(
            resolve_export_path(&dir_input, Path::new("/unused"), "bank.json"),
            dir.path().join("bank.json")
        );
        assert_eq!(
            resolve_export_path("/tmp/custom.json", dir.path(), "bank.json"),
            PathBuf::from("/tmp/custom.json")
        );
    }
}
