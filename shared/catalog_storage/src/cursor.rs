//! Opaque cursor and record id codec
//!
//! Pagination cursors and client-facing record ids share one encoding: the
//! field values joined with `$` and base64-encoded. Field names are never
//! embedded, so encode and decode sides must agree on field order for a
//! given query shape. Issuing page cursors and issuing record ids are kept
//! as distinct operations even though they share the primitive.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Joins cursor fields; not expected to occur in key values
const CURSOR_DELIMITER: char = '$';

/// Errors that can occur while decoding a cursor or record id
#[derive(Error, Debug)]
pub enum CursorError {
    /// Token is not valid base64
    #[error("cursor is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// Token does not decode to UTF-8 text
    #[error("cursor is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// Token decodes to the wrong number of fields
    #[error("cursor has {actual} fields, expected {expected}")]
    FieldCountMismatch {
        /// Number of fields the query shape requires
        expected: usize,
        /// Number of fields the token actually carried
        actual: usize,
    },
}

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

/// Encodes an ordered sequence of field values into an opaque cursor
pub fn encode_cursor<I, S>(values: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = values
        .into_iter()
        .map(|v| v.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(&CURSOR_DELIMITER.to_string());

    STANDARD.encode(joined)
}

/// Decodes an opaque cursor back into its field values
///
/// # Errors
///
/// Returns `CursorError` if the token is not valid base64/UTF-8 or does not
/// split into exactly `expected_fields` values.
pub fn decode_cursor(token: &str, expected_fields: usize) -> CursorResult<Vec<String>> {
    let decoded = String::from_utf8(STANDARD.decode(token)?)?;
    let values: Vec<String> = decoded
        .split(CURSOR_DELIMITER)
        .map(ToString::to_string)
        .collect();

    if values.len() != expected_fields {
        return Err(CursorError::FieldCountMismatch {
            expected: expected_fields,
            actual: values.len(),
        });
    }

    Ok(values)
}

/// Issues the client-facing id for a record identified by its keys
#[must_use]
pub fn encode_record_id(pk: &str, sk: &str) -> String {
    encode_cursor([pk, sk])
}

/// Decodes a previously-issued record id back into `(Pk, Sk)`
///
/// Book ids double as input tokens for the book-scoped item routes, where
/// the run date is recovered from the decoded partition key.
///
/// # Errors
///
/// Returns `CursorError` if the token was not issued by [`encode_record_id`].
pub fn decode_record_id(token: &str) -> CursorResult<(String, String)> {
    let mut values = decode_cursor(token, 2)?.into_iter();
    // decode_cursor guarantees exactly two values here
    let pk = values.next().unwrap_or_default();
    let sk = values.next().unwrap_or_default();
    Ok((pk, sk))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips_ordered_fields() {
        let fields = ["BOOK#2024-03-14", "ITEM#DAIRY#ACME#MILK#1 GAL#4#123", "123"];
        let token = encode_cursor(fields);
        assert_eq!(decode_cursor(&token, 3).unwrap(), fields);
    }

    #[test]
    fn cursor_is_opaque_ascii() {
        let token = encode_cursor(["BOOK#2024-03-14", "BOOK#2024-03-14"]);
        assert!(token.is_ascii());
        assert!(!token.contains('#'));
    }

    #[test]
    fn decode_rejects_wrong_field_count() {
        let token = encode_cursor(["a", "b"]);
        let err = decode_cursor(&token, 3).unwrap_err();
        assert!(matches!(
            err,
            CursorError::FieldCountMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn decode_rejects_invalid_base64() {
        assert!(matches!(
            decode_cursor("not base64!!", 2),
            Err(CursorError::InvalidEncoding(_))
        ));
    }

    #[test]
    fn record_id_round_trips() {
        let token = encode_record_id("BOOK#2024-03-14", "BOOK#2024-03-14");
        let (pk, sk) = decode_record_id(&token).unwrap();
        assert_eq!(pk, "BOOK#2024-03-14");
        assert_eq!(sk, "BOOK#2024-03-14");
    }

    #[test]
    fn book_id_recovers_run_date() {
        let token = encode_record_id("BOOK#2024-03-14", "BOOK#2024-03-14");
        let (pk, _) = decode_record_id(&token).unwrap();
        assert_eq!(
            crate::record::run_date_from_partition_key(&pk),
            Some("2024-03-14")
        );
    }
}
