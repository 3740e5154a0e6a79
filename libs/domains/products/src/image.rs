//! Image sniffing and content-addressed naming.

use sha2::{Digest, Sha256};

/// Storage prefix for product images
pub const IMAGE_PREFIX: &str = "products";

/// Raster formats recognised by their leading bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    WebP,
    Bmp,
}

impl ImageFormat {
    /// Detect the format from the file signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::WebP),
            [b'B', b'M', ..] if bytes.len() >= 26 => Some(Self::Bmp),
            _ => None,
        }
    }

    /// Whether uploads of this format are stored (`jpeg`, `jpg`, `png`)
    pub fn is_allowed_upload(&self) -> bool {
        matches!(self, Self::Png | Self::Jpeg)
    }

    pub fn canonical_extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::WebP => "webp",
            Self::Bmp => "bmp",
        }
    }

    fn accepts_extension(&self, ext: &str) -> bool {
        match self {
            Self::Png => ext == "png",
            Self::Jpeg => ext == "jpg" || ext == "jpeg",
            _ => false,
        }
    }

    /// Extension for the stored name.
    ///
    /// The uploaded file's own extension is kept when it agrees with the
    /// detected format (`photo.JPEG` stays `jpeg`); otherwise the canonical
    /// one is used.
    pub fn extension_for(&self, file_name: Option<&str>) -> String {
        file_name
            .and_then(|name| name.rsplit_once('.'))
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| self.accepts_extension(ext))
            .unwrap_or_else(|| self.canonical_extension().to_string())
    }
}

/// `<hex sha256 of bytes>.<extension>`
pub fn content_hash_name(bytes: &[u8], extension: &str) -> String {
    format!("{}.{}", hex::encode(Sha256::digest(bytes)), extension)
}

/// Storage key of a stored image name
pub fn image_key(name: &str) -> String {
    storage::join_key(IMAGE_PREFIX, name)
}

/// MIME type for a stored image name, by extension
pub fn content_type_for(name: &str) -> &'static str {
    let ext = name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_sniff_known_signatures() {
        assert_eq!(ImageFormat::sniff(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::WebP));

        let mut bmp = b"BM".to_vec();
        bmp.resize(54, 0);
        assert_eq!(ImageFormat::sniff(&bmp), Some(ImageFormat::Bmp));
    }

    #[test]
    fn test_sniff_rejects_non_images() {
        assert_eq!(ImageFormat::sniff(b""), None);
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::sniff(b"BM"), None);
        assert_eq!(ImageFormat::sniff(b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>"), None);
    }

    #[test]
    fn test_only_png_and_jpeg_are_allowed() {
        assert!(ImageFormat::Png.is_allowed_upload());
        assert!(ImageFormat::Jpeg.is_allowed_upload());
        assert!(!ImageFormat::Gif.is_allowed_upload());
        assert!(!ImageFormat::WebP.is_allowed_upload());
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(ImageFormat::Jpeg.extension_for(Some("photo.JPEG")), "jpeg");
        assert_eq!(ImageFormat::Jpeg.extension_for(Some("photo.jpg")), "jpg");
        assert_eq!(ImageFormat::Jpeg.extension_for(Some("photo.png")), "jpg");
        assert_eq!(ImageFormat::Png.extension_for(Some("no_extension")), "png");
        assert_eq!(ImageFormat::Png.extension_for(None), "png");
    }

    #[test]
    fn test_content_hash_name() {
        assert_eq!(
            content_hash_name(b"", "png"),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.png"
        );
    }

    #[test]
    fn test_image_key_and_content_type() {
        assert_eq!(image_key("abc.png"), "products/abc.png");
        assert_eq!(content_type_for("abc.png"), "image/png");
        assert_eq!(content_type_for("abc.JPG"), "image/jpeg");
        assert_eq!(content_type_for("abc"), "application/octet-stream");
    }
}
