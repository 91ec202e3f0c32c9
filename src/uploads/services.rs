use anyhow::Context;
use bytes::Bytes;
use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const PAYLOAD_TOO_LARGE: &str = "payload too large, maximum is 5 MiB";

/// Image types accepted by the gateway, detected from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }

    fn from_ext(ext: &str) -> Option<Self> {
        match ext {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// Magic-byte sniffing over the first 512 bytes.
pub fn sniff_image(data: &[u8]) -> Option<ImageKind> {
    let head = &data[..data.len().min(512)];
    if head.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some(ImageKind::Jpeg)
    } else if head.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some(ImageKind::Png)
    } else if head.starts_with(b"GIF87a") || head.starts_with(b"GIF89a") {
        Some(ImageKind::Gif)
    } else if head.len() >= 14 && head.starts_with(b"RIFF") && &head[8..14] == b"WEBPVP" {
        Some(ImageKind::Webp)
    } else {
        None
    }
}

/// Lowercased extension without the dot.
pub fn extension_of(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next()?;
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// `palpites/palpite_<unix-nanos>_<8 hex>.<ext>`
pub fn object_key(ext: &str) -> String {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("palpites/palpite_{}_{}.{}", nanos, &suffix[..8], ext)
}

/// Validates an image payload and hands it to storage. Returns the public URL.
pub async fn upload(
    st: &AppState,
    body: Bytes,
    filename: &str,
    declared_size: Option<u64>,
) -> AppResult<String> {
    if declared_size.is_some_and(|n| n > MAX_UPLOAD_BYTES as u64) || body.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation(PAYLOAD_TOO_LARGE));
    }

    let Some(kind) = sniff_image(&body) else {
        warn!(%filename, "upload rejected: unsupported content");
        return Err(AppError::validation(
            "unsupported file type, use JPEG, PNG, GIF or WebP",
        ));
    };

    let ext = extension_of(filename)
        .filter(|e| ImageKind::from_ext(e).is_some())
        .ok_or_else(|| AppError::validation("file extension not allowed"))?;
    if ImageKind::from_ext(&ext) != Some(kind) {
        warn!(%filename, sniffed = kind.mime(), "upload rejected: extension mismatch");
        return Err(AppError::validation(
            "file extension does not match file content",
        ));
    }

    let key = object_key(&ext);
    let size = body.len();
    let url = st
        .storage
        .put_object(&key, body, kind.mime())
        .await
        .with_context(|| format!("put_object {key}"))
        .map_err(AppError::Storage)?;

    info!(%key, size, content_type = kind.mime(), "image uploaded");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn sniffs_known_formats() {
        assert_eq!(sniff_image(JPEG), Some(ImageKind::Jpeg));
        assert_eq!(sniff_image(PNG), Some(ImageKind::Png));
        assert_eq!(sniff_image(b"GIF89a\x01\0"), Some(ImageKind::Gif));
        assert_eq!(sniff_image(b"RIFF\x24\0\0\0WEBPVP8 "), Some(ImageKind::Webp));
        assert_eq!(sniff_image(b"RIFF\x24\0\0\0WAVEfmt "), None);
        assert_eq!(sniff_image(b"%PDF-1.7"), None);
        assert_eq!(sniff_image(b""), None);
    }

    #[test]
    fn extension_parsing() {
        assert_eq!(extension_of("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("dir/archive.tar.png").as_deref(), Some("png"));
        assert_eq!(extension_of(".png"), None);
        assert_eq!(extension_of("noext"), None);
    }

    #[test]
    fn keys_keep_extension_and_differ() {
        let a = object_key("png");
        let b = object_key("png");
        assert!(a.starts_with("palpites/palpite_") && a.ends_with(".png"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn jpeg_bytes_with_txt_name_are_rejected() {
        let st = AppState::fake();
        let err = upload(&st, Bytes::from_static(JPEG), "pick.txt", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn jpeg_bytes_with_png_name_are_rejected() {
        let st = AppState::fake();
        let err = upload(&st, Bytes::from_static(JPEG), "pick.png", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn oversized_declared_payload_is_rejected_up_front() {
        let st = AppState::fake();
        let err = upload(&st, Bytes::from_static(PNG), "a.png", Some(6 * 1024 * 1024))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn valid_image_is_stored() {
        let st = AppState::fake();
        let url = upload(&st, Bytes::from_static(JPEG), "Pick.JPEG", Some(10)).await.unwrap();
        assert!(url.starts_with("https://fake.local/palpites/palpite_"));
        assert!(url.ends_with(".jpeg"));
    }
}
