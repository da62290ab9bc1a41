//! Content-type inference from file extensions / 根据扩展名推断内容类型

/// Returned for unknown or missing extensions / 未知扩展名的默认类型
pub const FALLBACK_CONTENT_TYPE: &str = "text/html; charset=UTF-8";

/// Extension of the last path element, dot included ("" when there is none).
/// `archive.tar.gz` -> `.gz`, `.bashrc` -> `.bashrc`, `dir.d/file` -> ``.
pub fn extension(path: &str) -> &str {
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match name.rfind('.') {
        Some(pos) => &name[pos..],
        None => "",
    }
}

/// Resolve the content type of `path` from its extension.
pub fn resolve_content_type(path: &str) -> &'static str {
    content_type_for_extension(extension(path))
}

/// Static extension table, case-sensitive as written.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        ".aac" => "audio/aac",
        ".abw" => "application/x-abiword",
        ".arc" => "application/x-freearc",
        ".avi" => "video/x-msvideo",
        ".azw" => "application/vnd.amazon.ebook",
        ".bin" => "application/octet-stream",
        ".bmp" => "image/bmp",
        ".bz" => "application/x-bzip",
        ".bz2" => "application/x-bzip2",
        ".csh" => "application/x-csh",
        ".csv" => "text/csv",
        ".doc" => "application/msword",
        ".docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".eot" => "application/vnd.ms-fontobject",
        ".epub" => "application/epub+zip",
        ".gz" => "application/gzip",
        ".gif" => "image/gif",
        ".htm" | ".html" => "text/html",
        ".ico" => "image/vnd.microsoft.icon",
        ".ics" => "text/calendar",
        ".jar" => "application/java-archive",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".jsonld" => "application/ld+json",
        ".midi" | ".mid" => "audio/midi",
        ".mp3" => "audio/mpeg",
        ".mpeg" => "video/mpeg",
        ".mpkg" => "application/vnd.apple.installer+xml",
        ".odp" => "application/vnd.oasis.opendocument.presentation",
        ".ods" => "application/vnd.oasis.opendocument.spreadsheet",
        ".odt" => "application/vnd.oasis.opendocument.text",
        ".oga" => "audio/ogg",
        ".ogv" => "video/ogg",
        ".ogx" => "application/ogg",
        ".opus" => "audio/opus",
        ".otf" => "font/otf",
        ".png" => "image/png",
        ".pdf" => "application/pdf",
        ".php" => "application/x-httpd-php",
        ".ppt" => "application/vnd.ms-powerpoint",
        ".pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".rar" => "application/vnd.rar",
        ".rtf" => "application/rtf",
        ".sh" => "application/x-sh",
        ".svg" => "image/svg+xml",
        ".swf" => "application/x-shockwave-flash",
        ".tar" => "application/x-tar",
        ".tiff" | ".tif" => "image/tiff",
        ".ts" => "video/mp2t",
        ".ttf" => "font/ttf",
        ".vsd" => "application/vnd.visio",
        ".wav" => "audio/wav",
        ".weba" => "audio/webm",
        ".webm" => "video/webm",
        ".webp" => "image/webp",
        ".woff" => "font/woff",
        ".woff2" => "font/woff2",
        ".xhtml" => "application/xhtml+xml",
        ".xls" => "application/vnd.ms-excel",
        ".xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xml" => "application/xml",
        ".xul" => "application/vnd.mozilla.xul+xml",
        ".zip" => "application/zip",
        ".3gp" => "video/3gpp",
        ".3g2" => "video/3gpp2",
        ".7z" => "application/x-7z-compressed",
        ".js" | ".mjs" => "text/javascript; charset=UTF-8",
        ".css" => "text/css; charset=UTF-8",
        ".json" => "application/json; charset=UTF-8",
        ".txt" => "text/plain; charset=UTF-8",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension() {
        assert_eq!(extension("tests/test-0.txt"), ".txt");
        assert_eq!(extension("archive.tar.gz"), ".gz");
        assert_eq!(extension("/a.b/README"), "");
        assert_eq!(extension(".bashrc"), ".bashrc");
        assert_eq!(extension(""), "");
        assert_eq!(extension("dir\\photo.PNG"), ".PNG");
    }

    #[test]
    fn test_known_types() {
        assert_eq!(resolve_content_type("data.json"), "application/json; charset=UTF-8");
        assert_eq!(resolve_content_type("img/avatar.png"), "image/png");
        assert_eq!(resolve_content_type("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for_extension(".mjs"), "text/javascript; charset=UTF-8");
    }

    #[test]
    fn test_fallback_is_total() {
        for ext in ["", ".unknown", ".PNG", "png", "."] {
            let ct = content_type_for_extension(ext);
            assert!(!ct.is_empty());
            assert_eq!(ct, FALLBACK_CONTENT_TYPE);
        }
        assert_eq!(resolve_content_type("no-extension"), FALLBACK_CONTENT_TYPE);
    }
}
