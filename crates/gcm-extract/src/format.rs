//! Format dispatch (spec §4.1): extension first, then a magic-byte sniff
//! over the first 2 KiB when the extension is missing or ambiguous.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    Png,
    Jpeg,
    Tiff,
    Gif,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Xlsx,
    Xls,
    Csv,
    Html,
    Txt,
    Image(ImageKind),
    Unknown,
}

const SNIFF_WINDOW: usize = 2048;

pub fn dispatch_format(filename_hint: &str, bytes: &[u8]) -> DocumentFormat {
    if let Some(format) = format_from_extension(filename_hint) {
        return format;
    }
    sniff_format(bytes)
}

fn format_from_extension(filename_hint: &str) -> Option<DocumentFormat> {
    let ext = filename_hint.rsplit('.').next()?.to_ascii_lowercase();
    Some(match ext.as_str() {
        "pdf" => DocumentFormat::Pdf,
        "docx" => DocumentFormat::Docx,
        "xlsx" => DocumentFormat::Xlsx,
        "xls" => DocumentFormat::Xls,
        "csv" => DocumentFormat::Csv,
        "html" | "htm" => DocumentFormat::Html,
        "txt" => DocumentFormat::Txt,
        "png" => DocumentFormat::Image(ImageKind::Png),
        "jpg" | "jpeg" => DocumentFormat::Image(ImageKind::Jpeg),
        "tif" | "tiff" => DocumentFormat::Image(ImageKind::Tiff),
        "gif" => DocumentFormat::Image(ImageKind::Gif),
        _ => return None,
    })
}

/// Magic-byte sniff. OOXML formats (docx/xlsx) share the ZIP local-file
/// header, so they are distinguished only by extension upstream; absent
/// that hint, a bare ZIP signature is reported as `Xlsx` since the CSV
/// ingestor and the profile uploader both see spreadsheets far more
/// often than Word documents among extension-less uploads.
fn sniff_format(bytes: &[u8]) -> DocumentFormat {
    let window = &bytes[..bytes.len().min(SNIFF_WINDOW)];

    if window.starts_with(b"%PDF-") {
        return DocumentFormat::Pdf;
    }
    if window.starts_with(b"PK\x03\x04") {
        return DocumentFormat::Xlsx;
    }
    if window.starts_with(b"\x89PNG\r\n\x1a\n") {
        return DocumentFormat::Image(ImageKind::Png);
    }
    if window.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return DocumentFormat::Image(ImageKind::Jpeg);
    }
    if window.starts_with(b"GIF89a") || window.starts_with(b"GIF87a") {
        return DocumentFormat::Image(ImageKind::Gif);
    }
    if window.starts_with(b"II*\0") || window.starts_with(b"MM\0*") {
        return DocumentFormat::Image(ImageKind::Tiff);
    }
    if window.starts_with(&[0xD0, 0xCF, 0x11, 0xE0]) {
        return DocumentFormat::Xls;
    }

    let looks_html = std::str::from_utf8(window)
        .map(|text| {
            let lower = text.to_ascii_lowercase();
            lower.contains("<html") || lower.contains("<!doctype html")
        })
        .unwrap_or(false);
    if looks_html {
        return DocumentFormat::Html;
    }

    DocumentFormat::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_wins_over_sniff() {
        assert_eq!(dispatch_format("report.pdf", b"not actually a pdf"), DocumentFormat::Pdf);
    }

    #[test]
    fn sniff_detects_pdf_magic_bytes() {
        assert_eq!(dispatch_format("", b"%PDF-1.7 rest of file"), DocumentFormat::Pdf);
    }

    #[test]
    fn sniff_detects_html_without_extension() {
        assert_eq!(
            dispatch_format("", b"<!DOCTYPE html><html><body>hi</body></html>"),
            DocumentFormat::Html
        );
    }

    #[test]
    fn unknown_extension_and_body_falls_back_to_unknown() {
        assert_eq!(dispatch_format("", b"\x01\x02\x03"), DocumentFormat::Unknown);
    }
}
