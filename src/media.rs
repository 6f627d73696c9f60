//! Storage of uploaded post images.

use std::path::{Path, PathBuf};

use actix_multipart::form::tempfile::TempFile;
use chrono::Utc;
use thiserror::Error;

/// Sub-directory of the media root holding post images.
pub const POSTS_IMAGES_DIR: &str = "posts_images";

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Загружаемый файл должен быть изображением.")]
    NotAnImage,
    #[error("Failed to store uploaded file: {0}")]
    Io(#[from] std::io::Error),
}

fn extension_of(file_name: Option<&str>) -> Option<String> {
    let ext = Path::new(file_name?).extension()?.to_str()?;
    let ext = ext.to_ascii_lowercase();
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then_some(ext)
}

/// Move an uploaded image into `{media_root}/posts_images/` and return its
/// path relative to the media root.
pub fn store_post_image(media_root: &str, file: TempFile) -> Result<String, MediaError> {
    let is_image = file
        .content_type
        .as_ref()
        .is_some_and(|mime| mime.type_().as_str() == "image");
    if !is_image {
        return Err(MediaError::NotAnImage);
    }

    let dir: PathBuf = Path::new(media_root).join(POSTS_IMAGES_DIR);
    std::fs::create_dir_all(&dir)?;

    let stamp = Utc::now().format("%Y%m%d%H%M%S%f");
    let name = match extension_of(file.file_name.as_deref()) {
        Some(ext) => format!("{stamp}.{ext}"),
        None => stamp.to_string(),
    };

    let target = dir.join(&name);
    // persist() renames; fall back to copying when the temp dir is on another device.
    if let Err(err) = file.file.persist(&target) {
        std::fs::copy(err.file.path(), &target)?;
    }

    Ok(format!("{POSTS_IMAGES_DIR}/{name}"))
}

/// Remove a previously stored image, ignoring files that are already gone.
pub fn remove_post_image(media_root: &str, relative: &str) {
    let path = Path::new(media_root).join(relative);
    match std::fs::remove_file(&path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Failed to remove image {}: {e}", path.display()),
    }
}
