//! `data:` URI encoding and decoding.

use crate::ResourceError;
use base64::{engine::general_purpose::STANDARD as BASE64_STD, Engine as _};

/// A decoded `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime: String,
    pub bytes: Vec<u8>,
}

pub fn encode(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, BASE64_STD.encode(bytes))
}

/// Parses `data:[<mime>][;base64],<data>`. Non-base64 payloads are taken verbatim.
pub fn parse(src: &str) -> Result<DataUri, ResourceError> {
    let rest = src
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| ResourceError::InvalidDataUri(preview(src)))?;
    let (header, data) = rest
        .split_once(',')
        .ok_or_else(|| ResourceError::InvalidDataUri(preview(src)))?;

    let mut params = header.split(';');
    let mime = match params.next() {
        Some(m) if !m.is_empty() => m.to_string(),
        _ => "text/plain".to_string(),
    };
    let is_base64 = params.any(|p| p.eq_ignore_ascii_case("base64"));

    let bytes = if is_base64 {
        let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
        BASE64_STD
            .decode(compact.as_bytes())
            .map_err(|e| ResourceError::InvalidDataUri(format!("{}: {}", preview(src), e)))?
    } else {
        data.as_bytes().to_vec()
    };

    Ok(DataUri { mime, bytes })
}

/// Content type for `bytes`: the reported one when it names a type,
/// otherwise sniffed from the image signature.
pub fn content_type(reported: Option<&str>, bytes: &[u8]) -> String {
    let reported = reported
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty() && *ct != "application/octet-stream");
    match reported {
        Some(ct) => ct.to_string(),
        None => image::guess_format(bytes)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string()),
    }
}

fn preview(src: &str) -> String {
    let head: String = src.chars().take(40).collect();
    if head.len() < src.len() { format!("{}...", head) } else { head }
}
