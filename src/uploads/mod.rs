//! Product image storage.
//!
//! Uploaded files are written under a generated unique filename and referenced
//! by a URL built from the configured public base URL. Replaced images are not
//! deleted from disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Pick a file extension from the client filename, falling back to the
/// declared content type.
fn pick_extension(filename: Option<&str>, content_type: Option<&str>) -> String {
    if let Some(name) = filename {
        if let Some((_, ext)) = name.rsplit_once('.') {
            if !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
                return ext.to_ascii_lowercase();
            }
        }
    }

    content_type
        .and_then(|ct| mime_guess::get_mime_extensions_str(ct))
        .and_then(|exts| exts.first())
        .map(|ext| ext.to_string())
        .unwrap_or_else(|| "bin".to_string())
}

/// Persist uploaded bytes under a unique filename and return that filename.
pub async fn save_image(
    upload_dir: &Path,
    filename: Option<&str>,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<String> {
    tokio::fs::create_dir_all(upload_dir)
        .await
        .with_context(|| format!("Failed to create upload dir {}", upload_dir.display()))?;

    let stored_name = format!(
        "{}.{}",
        Uuid::new_v4(),
        pick_extension(filename, content_type)
    );
    let path: PathBuf = upload_dir.join(&stored_name);

    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write upload {}", path.display()))?;

    Ok(stored_name)
}

/// Build the public URL for a stored image.
pub fn image_url(base_url: &str, stored_name: &str) -> String {
    format!("{}/uploads/{}", base_url.trim_end_matches('/'), stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_image_uses_unique_names() {
        let dir = tempfile::tempdir().unwrap();

        let first = save_image(dir.path(), Some("photo.PNG"), None, b"one")
            .await
            .unwrap();
        let second = save_image(dir.path(), Some("photo.PNG"), None, b"two")
            .await
            .unwrap();

        assert_ne!(first, second);
        assert!(first.ends_with(".png"));

        let written = tokio::fs::read(dir.path().join(&first)).await.unwrap();
        assert_eq!(written, b"one");
    }

    #[tokio::test]
    async fn test_extension_falls_back_to_content_type() {
        let dir = tempfile::tempdir().unwrap();
        let name = save_image(dir.path(), None, Some("image/jpeg"), b"jpeg-bytes")
            .await
            .unwrap();
        // mime_guess may pick any registered jpeg extension
        let ext = name.rsplit_once('.').unwrap().1;
        assert!(["jpeg", "jpg", "jpe", "jfif"].contains(&ext), "got {}", ext);
    }

    #[tokio::test]
    async fn test_unknown_type_gets_bin_extension() {
        let dir = tempfile::tempdir().unwrap();
        let name = save_image(dir.path(), None, None, b"mystery").await.unwrap();
        assert!(name.ends_with(".bin"));
    }

    #[test]
    fn test_image_url_building() {
        assert_eq!(
            image_url("http://localhost:3000", "a.png"),
            "http://localhost:3000/uploads/a.png"
        );
        assert_eq!(
            image_url("https://shop.example.com/", "a.png"),
            "https://shop.example.com/uploads/a.png"
        );
    }
}
