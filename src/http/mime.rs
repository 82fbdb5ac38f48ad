//! Media type detection module
//!
//! Maps file extensions to the Content-Type served for them.

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extract the extension of a file name
///
/// Returns the text after the last `.`, or an empty string when there is no
/// dot or the dot is the first or last character (`.profile`, `archive.`).
/// Casing is preserved.
///
/// # Examples
/// ```
/// use filebridge::http::mime::extension_of;
/// assert_eq!(extension_of("report.final.PDF"), "PDF");
/// assert_eq!(extension_of(".profile"), "");
/// ```
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() => &file_name[idx + 1..],
        _ => "",
    }
}

/// Get media type for a file extension (case-insensitive)
///
/// # Examples
/// ```
/// use filebridge::http::mime::media_type_for;
/// assert_eq!(media_type_for("JPEG"), "image/jpeg");
/// assert_eq!(media_type_for("docx"), "application/octet-stream");
/// ```
pub fn media_type_for(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "pdf" => "application/pdf",
        "txt" | "loc" => "text/plain",
        _ => OCTET_STREAM,
    }
}

/// Media type for a requested file name, looking only at its last path segment
pub fn media_type_for_name(name: &str) -> &'static str {
    let base = name.rsplit('/').next().unwrap_or(name);
    media_type_for(extension_of(base))
}
