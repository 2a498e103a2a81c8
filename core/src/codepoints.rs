//! Reading the hyphen-joined hex strings found in `unified` fields.

use crate::errors::{InvalidCodepointError, InvalidCodepointReason};

/// The width the index zero-pads `unified` values to.
pub const PADDED_WIDTH: usize = 8;

const SEPARATOR: char = '-';

/// Split `unified` into its hex tokens, checking each one is non-empty and
/// purely hexadecimal.
fn hex_tokens(
    unified: &str,
) -> impl Iterator<Item = Result<&str, InvalidCodepointError>> {
    unified.split(SEPARATOR).map(move |token| {
        if token.is_empty() {
            Err(InvalidCodepointError::new(
                unified,
                token,
                InvalidCodepointReason::Empty,
            ))
        } else if !token.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            Err(InvalidCodepointError::new(
                unified,
                token,
                InvalidCodepointReason::NotHex,
            ))
        } else {
            Ok(token)
        }
    })
}

/// Check that `unified` is one or more hyphen-separated hex tokens, without
/// interpreting them.
pub fn validate(unified: &str) -> Result<(), InvalidCodepointError> {
    hex_tokens(unified).try_for_each(|token| token.map(drop))
}

/// Iterate through the scalar values named by `unified`, in order.
///
/// ```
/// let chars = slackmoji::codepoints::chars("1F1E6-1F1FF")
///     .collect::<Result<Vec<_>, _>>()
///     .unwrap();
/// assert_eq!(chars, ['\u{1F1E6}', '\u{1F1FF}']);
/// ```
pub fn chars(
    unified: &str,
) -> impl Iterator<Item = Result<char, InvalidCodepointError>> {
    hex_tokens(unified).map(move |token| {
        let token = token?;
        // Overlong tokens overflow u32, which makes them out of range too
        u32::from_str_radix(token, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                InvalidCodepointError::new(
                    unified,
                    token,
                    InvalidCodepointReason::NotScalarValue,
                )
            })
    })
}

/// Decode `unified` into the glyph it names.
///
/// Multi-codepoint sequences (flags, keycaps, ZWJ sequences) come out as one
/// string with every scalar in token order.
pub fn decode(unified: &str) -> Result<String, InvalidCodepointError> {
    chars(unified).collect()
}

/// Left-pad `unified` with zeros to [`PADDED_WIDTH`] characters.
///
/// The padding is applied to the string as a whole, not to each token, so
/// anything already [`PADDED_WIDTH`] or longer (which includes nearly every
/// multi-codepoint sequence) is returned unchanged. Tokens must still be
/// hexadecimal, but aren't checked for being scalar values.
pub fn zero_pad(unified: &str) -> Result<String, InvalidCodepointError> {
    validate(unified)?;
    Ok(format!("{unified:0>PADDED_WIDTH$}"))
}
