use std::path::{Path as StdPath, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Resume,
    Photo,
    Spreadsheet,
}

impl UploadKind {
    fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            UploadKind::Resume => &["pdf", "doc", "docx", "txt", "rtf"],
            UploadKind::Photo => &["jpg", "jpeg", "png", "webp"],
            UploadKind::Spreadsheet => &["xlsx", "xls"],
        }
    }

    fn subdir(&self) -> &'static str {
        match self {
            UploadKind::Resume => "resumes",
            UploadKind::Photo => "photos",
            UploadKind::Spreadsheet => "imports",
        }
    }
}

pub fn file_extension(filename: &str) -> Option<String> {
    StdPath::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Checks the extension whitelist and, for formats with a signature, the
/// leading magic bytes.
pub fn check_upload(kind: UploadKind, filename: &str, data: &[u8]) -> Result<String> {
    if data.is_empty() {
        return Err(Error::BadRequest("Uploaded file is empty".into()));
    }
    let ext = file_extension(filename)
        .ok_or_else(|| Error::BadRequest("Uploaded file has no extension".into()))?;
    if !kind.allowed_extensions().contains(&ext.as_str()) {
        return Err(Error::BadRequest(format!("File type .{} is not allowed", ext)));
    }

    let signature_ok = match ext.as_str() {
        "pdf" => data.starts_with(b"%PDF"),
        "jpg" | "jpeg" => data.starts_with(&[0xFF, 0xD8]),
        "png" => data.starts_with(&[0x89, 0x50, 0x4E, 0x47]),
        "webp" => data.len() > 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP",
        "xlsx" | "docx" => data.starts_with(b"PK"),
        _ => true,
    };
    if !signature_ok {
        return Err(Error::BadRequest(format!("Invalid .{} file content", ext)));
    }
    Ok(ext)
}

/// Stores the upload under `<uploads_dir>/<kind>/<uuid>.<ext>` and returns the
/// public `/uploads/...` path.
pub async fn save_upload(
    uploads_dir: &str,
    kind: UploadKind,
    filename: &str,
    data: &[u8],
) -> Result<String> {
    let ext = check_upload(kind, filename, data)?;

    let dir: PathBuf = [uploads_dir, kind.subdir()].iter().collect();
    fs::create_dir_all(&dir).await?;

    let safe_filename = format!("{}.{}", uuid::Uuid::new_v4(), ext);
    let file_path = dir.join(&safe_filename);
    fs::write(&file_path, data).await.map_err(|e| {
        tracing::error!("Failed to write upload: {}", e);
        Error::Internal(format!("Failed to save file: {}", e))
    })?;

    Ok(format!("/uploads/{}/{}", kind.subdir(), safe_filename))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_disallowed_extension() {
        let err = check_upload(UploadKind::Resume, "resume.exe", b"MZ").unwrap_err();
        assert!(matches!(err, Error::BadRequest(msg) if msg.contains(".exe")));
    }

    #[test]
    fn rejects_spoofed_pdf() {
        let err = check_upload(UploadKind::Resume, "resume.pdf", b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn accepts_real_signatures() {
        assert_eq!(
            check_upload(UploadKind::Resume, "CV.PDF", b"%PDF-1.7 ...").unwrap(),
            "pdf"
        );
        assert_eq!(
            check_upload(UploadKind::Spreadsheet, "students.xlsx", b"PK\x03\x04").unwrap(),
            "xlsx"
        );
    }

    #[tokio::test]
    async fn saves_under_kind_subdirectory() {
        let dir = std::env::temp_dir().join(format!("jobboard-upload-{}", uuid::Uuid::new_v4()));
        let root = dir.to_string_lossy().to_string();
        let public = save_upload(&root, UploadKind::Photo, "me.png", &[0x89, 0x50, 0x4E, 0x47, 0])
            .await
            .unwrap();
        assert!(public.starts_with("/uploads/photos/"));
        let stored = dir.join("photos").join(public.rsplit('/').next().unwrap());
        assert!(stored.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
