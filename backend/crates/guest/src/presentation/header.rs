//! Device fingerprint request header
//!
//! The cached fingerprint travels with every quota API call so the server
//! can key guest counters on it.

use http::header::{HeaderMap, HeaderName, HeaderValue};

use crate::domain::value_objects::DeviceFingerprint;
use crate::error::{GuestError, GuestResult};

/// Default header name
pub const FINGERPRINT_HEADER: &str = "x-device-fingerprint";

/// Parse a configured header name
pub fn header_name(name: &str) -> GuestResult<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| GuestError::Config(format!("invalid fingerprint header {name:?}: {e}")))
}

/// Header pair carrying `fingerprint`
pub fn fingerprint_header(
    name: &HeaderName,
    fingerprint: &DeviceFingerprint,
) -> GuestResult<(HeaderName, HeaderValue)> {
    let value = HeaderValue::from_str(fingerprint.as_str())
        .map_err(|e| GuestError::InvalidFingerprint(e.to_string()))?;
    Ok((name.clone(), value))
}

/// Attach `fingerprint` to `headers`, replacing any previous value
pub fn insert_fingerprint(
    headers: &mut HeaderMap,
    name: &HeaderName,
    fingerprint: &DeviceFingerprint,
) -> GuestResult<()> {
    let (name, value) = fingerprint_header(name, fingerprint)?;
    headers.insert(name, value);
    Ok(())
}

/// Read a well-formed fingerprint back out of `headers`
pub fn extract_fingerprint(headers: &HeaderMap, name: &HeaderName) -> Option<DeviceFingerprint> {
    let value = headers.get(name)?.to_str().ok()?;
    DeviceFingerprint::parse(value.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_extract() {
        let name = header_name("X-Device-Fingerprint").unwrap();
        let fingerprint = DeviceFingerprint::parse("fp_1x2y_loyw3v28").unwrap();

        let mut headers = HeaderMap::new();
        insert_fingerprint(&mut headers, &name, &fingerprint).unwrap();

        assert_eq!(headers[FINGERPRINT_HEADER], "fp_1x2y_loyw3v28");
        assert_eq!(extract_fingerprint(&headers, &name), Some(fingerprint));
    }

    #[test]
    fn test_extract_rejects_garbage() {
        let name = HeaderName::from_static(FINGERPRINT_HEADER);
        let mut headers = HeaderMap::new();
        assert_eq!(extract_fingerprint(&headers, &name), None);

        headers.insert(name.clone(), HeaderValue::from_static("not-a-fingerprint"));
        assert_eq!(extract_fingerprint(&headers, &name), None);
    }

    #[test]
    fn test_invalid_header_name() {
        assert!(matches!(header_name("bad header"), Err(GuestError::Config(_))));
    }
}
