use crate::error::Error;
use log::debug;
use std::path::Path;

/// Resolve the subject text. Inline text wins over the input file, even when empty.
///
/// The result may be empty when the inline text or the file is empty. Invalid
/// UTF-8 in the file is replaced with U+FFFD.
pub async fn resolve_input(
    input_text: Option<&str>,
    input_file: Option<&Path>,
) -> Result<String, Error> {
    if let Some(text) = input_text {
        return Ok(text.to_string());
    }

    let Some(path) = input_file else {
        return Err(Error::MissingInput);
    };

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| Error::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
    debug!("read {} bytes from {path:?}", bytes.len());
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
