use uuid::Builder;

/// Generate a fresh 128-bit random identifier in UUID v4 text form.
///
/// Randomness comes from `getrandom`, which uses `crypto.getRandomValues`
/// in the browser (`js` feature) and the OS source natively.
pub fn new_id() -> Result<String, getrandom::Error> {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes)?;
    Ok(Builder::from_random_bytes(bytes)
        .into_uuid()
        .hyphenated()
        .to_string())
}

pub(crate) fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}
