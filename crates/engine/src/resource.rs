// ABOUTME: Reads saved profile snapshots from disk and decodes them to UTF-8 text.
// ABOUTME: Charset comes from a BOM, then a <meta charset> declaration, then chardetng detection.

use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::error::ExtractError;

/// How far into the document a `<meta charset>` declaration is looked for.
const META_SNIFF_LEN: usize = 1024;

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?\s*([a-z0-9_:.\-]+)"#).unwrap()
});

/// Reads an HTML snapshot and decodes it to a String.
pub fn read_html(path: &Path) -> Result<String, ExtractError> {
    let bytes = fs::read(path).map_err(|e| {
        ExtractError::io(path.display().to_string(), "read html", Some(e.into()))
    })?;
    Ok(decode_html(&bytes))
}

/// Decodes raw HTML bytes, never failing; undecodable sequences become U+FFFD.
pub fn decode_html(body: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(body) {
        let (decoded, _) = encoding.decode_without_bom_handling(&body[bom_len..]);
        return decoded.into_owned();
    }

    if let Some(encoding) = extract_meta_charset(body) {
        let (decoded, _, _) = encoding.decode(body);
        return decoded.into_owned();
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

/// Finds a charset declared by a `<meta>` tag near the top of the document.
fn extract_meta_charset(body: &[u8]) -> Option<&'static Encoding> {
    let head = &body[..body.len().min(META_SNIFF_LEN)];
    let caps = META_CHARSET_RE.captures(head)?;
    Encoding::for_label(caps.get(1)?.as_bytes())
}
