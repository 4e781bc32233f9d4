//! Permissive decode cascade shared by the plain-text extractor and the
//! CSV ingestor: try strict utf-8, then utf-16, then the two common
//! legacy single-byte codepages, and finally fall back to utf-8 with
//! replacement characters rather than ever erroring out.

pub fn decode_permissive(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    if let Some(text) = decode_utf16(bytes) {
        return text;
    }

    // encoding_rs has no standalone latin-1 label (the WHATWG encoding
    // standard folds ISO-8859-1 into windows-1252); a single pass over
    // that superset covers both legacy codepages the spec names.
    let (text, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}

fn decode_utf16(bytes: &[u8]) -> Option<String> {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return None;
    }
    let (bom, rest, little_endian) = match bytes {
        [0xFF, 0xFE, rest @ ..] => (true, rest, true),
        [0xFE, 0xFF, rest @ ..] => (true, rest, false),
        _ => (false, bytes, true),
    };
    if !bom {
        return None;
    }

    let units: Vec<u16> = rest
        .chunks_exact(2)
        .map(|pair| {
            if little_endian {
                u16::from_le_bytes([pair[0], pair[1]])
            } else {
                u16::from_be_bytes([pair[0], pair[1]])
            }
        })
        .collect();
    String::from_utf16(&units).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_utf8_passes_through_unchanged() {
        assert_eq!(decode_permissive("héllo".as_bytes()), "héllo");
    }

    #[test]
    fn utf16_le_with_bom_decodes() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "hi".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_permissive(&bytes), "hi");
    }

    #[test]
    fn invalid_bytes_never_panic_and_produce_a_string() {
        let bytes = [0xC3, 0x28, 0xA0, 0xA1];
        let decoded = decode_permissive(&bytes);
        assert!(!decoded.is_empty());
    }
}
