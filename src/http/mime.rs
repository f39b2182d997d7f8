//! MIME type detection module
//!
//! Last-resort content type for an asset, guessed from its original file name.

/// Get MIME Content-Type for a media file extension (case-insensitive)
///
/// # Examples
/// ```
/// use gallery_relay::http::mime::get_content_type;
/// assert_eq!(get_content_type(Some("JPG")), "image/jpeg");
/// assert_eq!(get_content_type(Some("mp4")), "video/mp4");
/// assert_eq!(get_content_type(None), "application/octet-stream");
/// ```
pub fn get_content_type(extension: Option<&str>) -> &'static str {
    let extension = extension.map(str::to_ascii_lowercase);
    match extension.as_deref() {
        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("tif" | "tiff") => "image/tiff",
        Some("dng") => "image/x-adobe-dng",

        // Video
        Some("mp4" | "m4v") => "video/mp4",
        Some("webm") => "video/webm",
        Some("ogv") => "video/ogg",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        Some("mkv") => "video/x-matroska",
        Some("3gp") => "video/3gpp",
        Some("mts" | "m2ts") => "video/mp2t",

        // Default
        _ => "application/octet-stream",
    }
}

/// Guess the content type of a file name from its extension
pub fn content_type_for_file_name(file_name: &str) -> &'static str {
    let extension = file_name.rsplit_once('.').map(|(_, ext)| ext);
    get_content_type(extension)
}
