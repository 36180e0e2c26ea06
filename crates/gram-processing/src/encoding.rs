use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Read;
use std::path::Path;

use crate::ProcessingError;

/// `data:<mime>;base64,<payload>`
pub fn to_data_url(data: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Drains `reader` and encodes it. Read failures propagate.
pub fn read_to_data_url<R: Read>(mut reader: R, mime: &str) -> Result<String, ProcessingError> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(to_data_url(&buffer, mime))
}

pub async fn file_to_data_url(path: impl AsRef<Path>, mime: &str) -> Result<String, ProcessingError> {
    let data = tokio::fs::read(path.as_ref()).await?;
    Ok(to_data_url(&data, mime))
}

/// Splits a base64 data URL into its media type and decoded bytes
pub fn parse_data_url(url: &str) -> Option<(String, Vec<u8>)> {
    let rest = url.strip_prefix("data:")?;
    let (mime, payload) = rest.split_once(";base64,")?;
    let data = STANDARD.decode(payload).ok()?;
    Some((mime.to_string(), data))
}
