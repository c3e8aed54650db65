//! Claude-backed [`LabelReader`] for the photo resolution path.

use ai_client::Claude;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use base64::Engine;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::traits::{LabelRead, LabelReader};

const LABEL_SYSTEM_PROMPT: &str = "You read supplement product photos. Report only what is \
    legible in the image: the UPC barcode digits if a barcode or its printed number is visible, \
    and the product title as printed on the front label. Never guess or invent either value; \
    omit a field entirely when it cannot be read.";

#[derive(Debug, Deserialize, JsonSchema)]
struct LabelSeen {
    /// 12-14 digit UPC read from the barcode, if legible.
    upc: Option<String>,
    /// Product name as printed on the label, if legible.
    title: Option<String>,
}

pub struct ClaudeLabelReader {
    claude: Claude,
}

impl ClaudeLabelReader {
    pub fn new(claude: Claude) -> Self {
        Self { claude }
    }
}

/// Media type from the decoded image's magic bytes. Also rejects payloads
/// that are not valid base64 before any API spend.
fn sniff_media_type(image_base64: &str) -> Result<&'static str> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(image_base64)
        .map_err(|e| anyhow!("image_base64 is not valid base64: {e}"))?;

    match bytes.as_slice() {
        [0xFF, 0xD8, 0xFF, ..] => Ok("image/jpeg"),
        [0x89, b'P', b'N', b'G', ..] => Ok("image/png"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Ok("image/webp"),
        [b'G', b'I', b'F', b'8', ..] => Ok("image/gif"),
        _ => Err(anyhow!("unrecognized image format")),
    }
}

#[async_trait]
impl LabelReader for ClaudeLabelReader {
    async fn read_label(&self, image_base64: &str) -> Result<LabelRead> {
        let media_type = sniff_media_type(image_base64)?;

        let (seen, tokens_used): (LabelSeen, u32) = self
            .claude
            .extract_from_image(
                image_base64,
                media_type,
                LABEL_SYSTEM_PROMPT,
                "Read the UPC and product title from this supplement photo.",
            )
            .await?;

        debug!(upc = ?seen.upc, title = ?seen.title, "Label read");

        // Keep only plausible barcode digit strings.
        let upc = seen
            .upc
            .filter(|u| (12..=14).contains(&u.len()) && u.chars().all(|c| c.is_ascii_digit()));

        Ok(LabelRead {
            upc,
            title: seen.title.filter(|t| !t.trim().is_empty()),
            tokens_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn sniffs_jpeg_and_png() {
        let jpeg = encode(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        assert_eq!(sniff_media_type(&jpeg).unwrap(), "image/jpeg");

        let png = encode(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
        assert_eq!(sniff_media_type(&png).unwrap(), "image/png");
    }

    #[test]
    fn rejects_garbage_and_unknown_formats() {
        assert!(sniff_media_type("not-base64!!!").is_err());
        assert!(sniff_media_type(&encode(b"plain text")).is_err());
    }
}
