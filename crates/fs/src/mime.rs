use crate::path::extname;

const DEFAULT_MIME: &str = "application/octet-stream";

const MIME_TABLE: &[(&str, &str)] = &[
    (".txt", "text/plain"),
    (".md", "text/markdown"),
    (".csv", "text/csv"),
    (".html", "text/html"),
    (".htm", "text/html"),
    (".css", "text/css"),
    (".xml", "text/xml"),
    (".rs", "text/x-rust"),
    (".c", "text/x-c"),
    (".h", "text/x-c"),
    (".py", "text/x-python"),
    (".sh", "application/x-sh"),
    (".js", "text/javascript"),
    (".mjs", "text/javascript"),
    (".cjs", "text/javascript"),
    (".ts", "video/mp2t"),
    (".json", "application/json"),
    (".toml", "application/toml"),
    (".yaml", "application/yaml"),
    (".yml", "application/yaml"),
    (".pdf", "application/pdf"),
    (".doc", "application/msword"),
    (
        ".docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    (".xls", "application/vnd.ms-excel"),
    (
        ".xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    (".exe", "application/x-msdownload"),
    (".zip", "application/zip"),
    (".tar", "application/x-tar"),
    (".gz", "application/gzip"),
    (".7z", "application/x-7z-compressed"),
    (".bz", "application/x-bzip"),
    (".xz", "application/x-xz"),
    (".png", "image/png"),
    (".jpg", "image/jpeg"),
    (".jpeg", "image/jpeg"),
    (".gif", "image/gif"),
    (".bmp", "image/bmp"),
    (".webp", "image/webp"),
    (".svg", "image/svg+xml"),
    (".ico", "image/x-icon"),
    (".mp3", "audio/mpeg"),
    (".wav", "audio/wav"),
    (".flac", "audio/flac"),
    (".ogg", "audio/ogg"),
    (".m4a", "audio/mp4"),
    (".mp4", "video/mp4"),
    (".mkv", "video/x-matroska"),
    (".webm", "video/webm"),
    (".avi", "video/x-msvideo"),
    (".mov", "video/quicktime"),
];

/// Mime type guessed from the extension of `path`.
pub fn guess(path: &str) -> &'static str {
    let ext = extname(path);
    if ext.is_empty() {
        return DEFAULT_MIME;
    }

    MIME_TABLE
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(DEFAULT_MIME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_is_case_insensitive_and_defaults() {
        assert_eq!(guess("/a/Song.MP3"), "audio/mpeg");
        assert_eq!(guess("/a/photo.jpeg"), "image/jpeg");
        assert_eq!(guess("/a/README"), DEFAULT_MIME);
        assert_eq!(guess("/a/blob.unknownext"), DEFAULT_MIME);
    }
}
