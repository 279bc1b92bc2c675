//! Product image upload.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use scentbox_storefront::api::{Access, ApiError};
use tracing::instrument;

use crate::{AdminClient, AdminError, UploadedImage};

/// Largest accepted image, 5 MiB.
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// Content type for an image file name, by extension.
///
/// # Errors
///
/// Returns `AdminError::UnsupportedImage` for anything other than jpg,
/// jpeg, png or webp.
pub fn image_content_type(file_name: &str) -> Result<&'static str, AdminError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        _ => Err(AdminError::UnsupportedImage(file_name.to_string())),
    }
}

impl AdminClient {
    /// Upload an image file and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the file type is unsupported, the file is over
    /// [`MAX_IMAGE_BYTES`] or unreadable, or the upload fails.
    #[instrument(skip(self), fields(path = %path.display()))]
    pub async fn upload_image(&self, path: &Path) -> Result<String, AdminError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AdminError::UnsupportedImage(path.display().to_string()))?;
        image_content_type(file_name)?;

        let size = tokio::fs::metadata(path).await?.len();
        check_size(size)?;

        let bytes = tokio::fs::read(path).await?;
        self.upload_image_bytes(file_name, bytes).await
    }

    /// Upload image bytes under `file_name` and return the public URL.
    ///
    /// # Errors
    ///
    /// Same as [`Self::upload_image`].
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, AdminError> {
        let content_type = image_content_type(file_name)?;
        check_size(u64::try_from(bytes.len()).unwrap_or(u64::MAX))?;

        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(content_type)
            .map_err(ApiError::from)?;
        let form = Form::new().part("image", part);

        let uploaded: UploadedImage = self
            .api()
            .post_multipart("/upload/product-image", form, Access::Authenticated)
            .await?;
        tracing::info!(url = %uploaded.url, "Image uploaded");
        Ok(uploaded.url)
    }
}

fn check_size(size: u64) -> Result<(), AdminError> {
    if size > MAX_IMAGE_BYTES {
        return Err(AdminError::ImageTooLarge {
            size,
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}
