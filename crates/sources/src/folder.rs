//! Local folder listing.

use std::path::Path;

use pipeline::{DocumentLocation, SourceError};

/// Lists the files directly inside `folder` whose name ends in `.pdf`,
/// ignoring case. Subdirectories are not descended into.
///
/// Entries come back in the order the filesystem lists them, which is not
/// stable across platforms.
pub async fn list_pdfs(folder: &Path) -> Result<Vec<DocumentLocation>, SourceError> {
    let io_error = |source| SourceError::Io {
        path: folder.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    let mut entries = tokio::fs::read_dir(folder).await.map_err(io_error)?;
    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        if !entry.file_type().await.map_err(io_error)?.is_file() {
            continue;
        }
        let name = entry.file_name();
        if has_pdf_extension(&name.to_string_lossy()) {
            found.push(DocumentLocation::new(entry.path()));
        }
    }
    Ok(found)
}

fn has_pdf_extension(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[tokio::test]
    async fn matches_pdf_extension_case_insensitively() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.PDF", "b.txt", "c.pdf"] {
            fs::write(dir.path().join(name), b"%PDF-1.4").unwrap();
        }

        let mut names: Vec<String> = list_pdfs(dir.path())
            .await
            .unwrap()
            .iter()
            .map(|l| l.as_path().file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();

        assert_eq!(names, vec!["a.PDF".to_string(), "c.pdf".to_string()]);
    }

    #[tokio::test]
    async fn does_not_descend_into_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested.pdf")).unwrap();
        fs::write(dir.path().join("nested.pdf").join("inner.pdf"), b"").unwrap();

        assert!(list_pdfs(dir.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_folder_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = list_pdfs(&dir.path().join("absent")).await.unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }

    #[test]
    fn extension_check_needs_the_dot() {
        assert!(has_pdf_extension("paper.Pdf"));
        assert!(!has_pdf_extension("notapdf"));
        assert!(!has_pdf_extension("archive.pdf.zip"));
    }
}
