//! Image intake and encoding utilities.
//!
//! Uploaded files are validated here before they reach the image-to-prompt
//! state, and both uploads and generated images are decoded into raw RGBA
//! for display.
//!
//! # Size Limit
//!
//! Files larger than [`MAX_UPLOAD_BYTES`] are rejected. When reading from
//! disk the check runs against file metadata, so an oversize file is never
//! read into memory.

use crate::error::{AppError, MAX_UPLOAD_BYTES, Result, ValidationError};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Detects the MIME type of an image from its leading bytes.
///
/// Returns `None` for anything that is not PNG, JPEG, GIF or WebP.
pub fn detect_image_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => None,
    }
}

/// Rejects sizes over [`MAX_UPLOAD_BYTES`].
pub fn check_upload_size(size: u64) -> Result<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::FileTooLarge { size }.into());
    }
    Ok(())
}

/// An image file selected for description.
///
/// Cheap to clone; the bytes are shared.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageUpload {
    file_name: String,
    mime_type: &'static str,
    bytes: Arc<[u8]>,
}

impl ImageUpload {
    /// Reads an image from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FileTooLarge`] without reading the file when
    /// its metadata reports more than [`MAX_UPLOAD_BYTES`], and
    /// [`ValidationError::UnsupportedImage`] when the content is not a
    /// recognised image format.
    pub fn from_path(path: &Path) -> Result<Self> {
        let size = fs::metadata(path)?.len();
        check_upload_size(size)?;

        let bytes = fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());

        Self::from_bytes(file_name, bytes)
    }

    /// Wraps bytes that are already in memory (e.g. a dropped file).
    ///
    /// The size limit is checked before the format, so an oversize file is
    /// reported as too large whatever it contains.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self> {
        check_upload_size(bytes.len() as u64)?;
        let mime_type = detect_image_mime(&bytes).ok_or(ValidationError::UnsupportedImage)?;
        Ok(Self {
            file_name: file_name.into(),
            mime_type,
            bytes: bytes.into(),
        })
    }

    /// Builds an upload without validation, for reducer tests that need an
    /// oversize file.
    #[cfg(test)]
    pub(crate) fn unchecked(file_name: &str, mime_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime_type,
            bytes: bytes.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Base64 payload for inline transmission.
    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// `data:` URL used as the preview source.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

/// Decoded RGBA pixels, ready for texture upload.
#[derive(Clone, Debug)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn size(&self) -> [usize; 2] {
        [self.width as usize, self.height as usize]
    }
}

pub struct ImageProcessor;

impl ImageProcessor {
    /// Decodes PNG/JPEG/GIF/WebP bytes into straight-alpha RGBA.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ImageProcessing`] if the bytes cannot be decoded.
    pub fn decode_rgba(bytes: &[u8]) -> Result<DecodedImage> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AppError::image(format!("Failed to decode image: {}", e)))?;

        let rgba = image.to_rgba8();
        Ok(DecodedImage {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 3, image::Rgba([255, 0, 0, 255]));
        let mut buffer = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
            .unwrap();
        buffer
    }

    #[test]
    fn test_detect_known_formats() {
        assert_eq!(detect_image_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(detect_image_mime(&PNG_MAGIC), Some("image/png"));
        assert_eq!(detect_image_mime(b"GIF89a"), Some("image/gif"));
        assert_eq!(
            detect_image_mime(&[0x52, 0x49, 0x46, 0x46, 0, 0, 0, 0, 0x57, 0x45, 0x42, 0x50]),
            Some("image/webp")
        );
        assert_eq!(detect_image_mime(b"%PDF-1.7"), None);
        assert_eq!(detect_image_mime(&[]), None);
    }

    #[test]
    fn test_size_limit_boundary() {
        assert!(check_upload_size(MAX_UPLOAD_BYTES).is_ok());
        let err = check_upload_size(MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::FileTooLarge { size }) if size == 4_194_305
        ));
    }

    #[test]
    fn test_from_bytes_rejects_non_images() {
        let err = ImageUpload::from_bytes("notes.txt", b"hello".to_vec()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::UnsupportedImage)
        ));
    }

    #[test]
    fn test_from_bytes_reports_size_before_format() {
        let oversize_text = vec![b'a'; MAX_UPLOAD_BYTES as usize + 1];
        let err = ImageUpload::from_bytes("notes.txt", oversize_text).unwrap_err();
        assert_eq!(err.to_string(), "Image size cannot exceed 4MB.");

        let mut oversize_png = PNG_MAGIC.to_vec();
        oversize_png.resize(MAX_UPLOAD_BYTES as usize + 1, 0);
        assert!(matches!(
            ImageUpload::from_bytes("big.png", oversize_png).unwrap_err(),
            AppError::Validation(ValidationError::FileTooLarge { .. })
        ));
    }

    #[test]
    fn test_data_url() {
        let upload = ImageUpload::from_bytes("a.png", PNG_MAGIC.to_vec()).unwrap();
        assert_eq!(upload.data_url(), "data:image/png;base64,iVBORw0KGgo=");
        assert_eq!(upload.size(), 8);
    }

    #[test]
    fn test_from_path_rejects_oversize_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&PNG_MAGIC).unwrap();
        file.as_file().set_len(MAX_UPLOAD_BYTES + 1).unwrap();

        let err = ImageUpload::from_path(file.path()).unwrap_err();
        assert_eq!(err.to_string(), "Image size cannot exceed 4MB.");
    }

    #[test]
    fn test_from_path_reads_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("red.png");
        fs::write(&path, tiny_png()).unwrap();

        let upload = ImageUpload::from_path(&path).unwrap();
        assert_eq!(upload.file_name(), "red.png");
        assert_eq!(upload.mime_type(), "image/png");
    }

    #[test]
    fn test_decode_rgba() {
        let decoded = ImageProcessor::decode_rgba(&tiny_png()).unwrap();
        assert_eq!(decoded.size(), [2, 3]);
        assert_eq!(decoded.pixels.len(), 2 * 3 * 4);
        assert_eq!(&decoded.pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = ImageProcessor::decode_rgba(&PNG_MAGIC).unwrap_err();
        assert!(matches!(err, AppError::ImageProcessing(_)));
    }
}
