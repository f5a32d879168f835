use crate::core::state::ImageData;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

pub fn encode_image(bytes: &[u8], mime_type: &str) -> ImageData {
    ImageData::new(STANDARD.encode(bytes), mime_type)
}

/// Splits `data:<mime>;base64,<payload>` as produced by browser file readers.
pub fn split_data_url(url: &str) -> Option<ImageData> {
    let rest = url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime_type = header.strip_suffix(";base64")?;
    if mime_type.is_empty() || payload.is_empty() {
        return None;
    }
    Some(ImageData::new(payload, mime_type))
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn load_image_file(path: &Path) -> anyhow::Result<ImageData> {
    use anyhow::Context;

    let mime_type = mime_type_for(path)
        .with_context(|| format!("Unsupported image type: {}", path.display()))?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(encode_image(&bytes, mime_type))
}
