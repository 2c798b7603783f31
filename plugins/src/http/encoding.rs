//! Response body decoding.
//!
//! Bodies are decoded by trying each configured encoding in order and keeping
//! the first one that decodes without errors. If none fits, the body is decoded
//! as lossy UTF-8 and a warning is logged.

use encoding_rs::Encoding;

/// Resolve WHATWG labels ("utf-8", "shift_jis", "windows-31j", ...). Unknown labels are skipped.
pub fn resolve_encodings<S: AsRef<str>>(labels: &[S]) -> Vec<&'static Encoding> {
    let mut out: Vec<&'static Encoding> = Vec::with_capacity(labels.len());
    for label in labels {
        let label = label.as_ref();
        match Encoding::for_label(label.trim().as_bytes()) {
            Some(enc) if !out.contains(&enc) => out.push(enc),
            Some(_) => {}
            None => tracing::warn!(encoding = label, "unknown encoding label ignored"),
        }
    }
    if out.is_empty() {
        out.push(encoding_rs::UTF_8);
    }
    out
}

pub fn decode_body(bytes: &[u8], encodings: &[&'static Encoding]) -> String {
    for enc in encodings {
        if let Some(text) = enc.decode_without_bom_handling_and_without_replacement(bytes) {
            return text.into_owned();
        }
    }

    tracing::warn!(
        bytes = bytes.len(),
        tried = ?encodings.iter().map(|e| e.name()).collect::<Vec<_>>(),
        "encoding is not supported, returning lossy text"
    );
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<&'static Encoding> {
        resolve_encodings(&["utf-8", "shift_jis", "euc-jp", "windows-31j"])
    }

    #[test]
    fn duplicate_and_unknown_labels_collapse() {
        // windows-31j is an alias of Shift_JIS
        let encs = defaults();
        assert_eq!(encs.len(), 3);
        assert_eq!(encs[0], encoding_rs::UTF_8);

        assert_eq!(resolve_encodings(&["klingon"]), vec![encoding_rs::UTF_8]);
    }

    #[test]
    fn utf8_wins_first() {
        assert_eq!(decode_body("{\"x\":1} ✓".as_bytes(), &defaults()), "{\"x\":1} ✓");
    }

    #[test]
    fn shift_jis_is_tried_after_utf8() {
        let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("日本語");
        assert!(std::str::from_utf8(&bytes).is_err());
        assert_eq!(decode_body(&bytes, &defaults()), "日本語");
    }

    #[test]
    fn undecodable_bytes_fall_back_to_lossy() {
        assert_eq!(decode_body(b"\xff\xff", &defaults()), "\u{fffd}\u{fffd}");
    }
}
