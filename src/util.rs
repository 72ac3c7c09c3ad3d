//! Shared text decoding helpers.

use std::borrow::Cow;

/// Decode raw file bytes to a string.
///
/// Tries UTF-8 first (handles BOM automatically via encoding_rs) and falls
/// back to Windows-1252, which covers the legacy exports still in
/// circulation. Uses `Cow<str>` to avoid allocation when the input is
/// already valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    let (result, _encoding, malformed) = encoding_rs::UTF_8.decode(bytes);

    if !malformed {
        return result;
    }

    let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    result
}

/// Strip a UTF-8 byte order mark, if present.
pub fn strip_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(&[0xEF, 0xBB, 0xBF]) {
        &data[3..]
    } else {
        data
    }
}
