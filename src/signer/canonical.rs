//! Canonical JSON encoding of request payloads.
//!
//! The platform verifies `signature` against its own re-encoding of the
//! request body, so the bytes produced here must match that reference
//! encoding exactly:
//!
//! - keys in insertion order (`serde_json` is built with `preserve_order`)
//! - `", "` between items and `": "` between key and value
//! - every character outside printable ASCII escaped as `\uXXXX`,
//!   astral characters as a UTF-16 surrogate pair
//! - floats in shortest round-trip form, switching to exponent notation
//!   below `1e-4` and from `1e16` on (`1e-05`, `1e+16`), integral floats
//!   keeping a trailing `.0`

use std::io::{self, Write};

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::model::Payload;

/// `serde_json` formatter producing the platform's reference layout
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceFormatter;

impl Formatter for ReferenceFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        if fragment.bytes().all(|b| (b' '..=b'~').contains(&b)) {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for ch in fragment.chars() {
            if (' '..='~').contains(&ch) {
                writer.write_all(&[ch as u8])?;
            } else {
                for unit in ch.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }

    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + Write,
    {
        writer.write_all(format_float(value).as_bytes())
    }
}

/// Encodes a payload into its canonical string form
///
/// # Errors
///
/// Returns an error if a value in the payload cannot be serialized.
pub fn to_canonical_string(payload: &Payload) -> Result<String, serde_json::Error> {
    let mut out = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, ReferenceFormatter);
    payload.serialize(&mut serializer)?;
    // Every byte written is printable ASCII or an escape sequence.
    String::from_utf8(out).map_err(<serde_json::Error as serde::ser::Error>::custom)
}

/// Formats a finite float the way the reference encoder does
pub(crate) fn format_float(value: f64) -> String {
    // `{:e}` gives the shortest round-trip digits, e.g. "-1.2345e-5".
    let scientific = format!("{:e}", value);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if !(-4..16).contains(&exponent) {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{lead}{fraction}e{exp_sign}{:02}", exponent.abs())
    } else if exponent >= 0 {
        let point = exponent as usize + 1;
        if digits.len() <= point {
            format!("{digits}{}.0", "0".repeat(point - digits.len()))
        } else {
            let (int_part, frac_part) = digits.split_at(point);
            format!("{int_part}.{frac_part}")
        }
    } else {
        format!("0.{}{digits}", "0".repeat((-exponent - 1) as usize))
    };

    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test payload must be an object"),
        }
    }

    #[test]
    fn test_separators_and_insertion_order() {
        let p = payload(json!({
            "ton_address": "EQabc",
            "currency": "TON",
            "amount": 1.5,
            "query_id": 1u64 << 16
        }));

        assert_eq!(
            to_canonical_string(&p).unwrap(),
            r#"{"ton_address": "EQabc", "currency": "TON", "amount": 1.5, "query_id": 65536}"#
        );
    }

    #[test]
    fn test_nested_values_and_nulls() {
        let p = payload(json!({
            "groups_id": [1, 2],
            "personal_id": null,
            "meta": {"flag": true, "empty": {}, "list": []}
        }));

        assert_eq!(
            to_canonical_string(&p).unwrap(),
            r#"{"groups_id": [1, 2], "personal_id": null, "meta": {"flag": true, "empty": {}, "list": []}}"#
        );
    }

    #[test]
    fn test_empty_payload() {
        assert_eq!(to_canonical_string(&Payload::new()).unwrap(), "{}");
    }

    #[test]
    fn test_non_ascii_is_escaped() {
        let p = payload(json!({"description": "Café 🎁\u{7f}"}));

        assert_eq!(
            to_canonical_string(&p).unwrap(),
            r#"{"description": "Caf\u00e9 \ud83c\udf81\u007f"}"#
        );
    }

    #[test]
    fn test_control_characters_and_quotes() {
        let p = payload(json!({"note": "a\"b\\c\nd\u{1}"}));

        assert_eq!(
            to_canonical_string(&p).unwrap(),
            r#"{"note": "a\"b\\c\nd\u0001"}"#
        );
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(100.0), "100.0");
        assert_eq!(format_float(0.1), "0.1");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(123456.789), "123456.789");
        assert_eq!(format_float(1e15), "1000000000000000.0");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(-2.5e20), "-2.5e+20");
        assert_eq!(format_float(1e100), "1e+100");
    }

    #[test]
    fn test_integers_are_not_reformatted() {
        let p = payload(json!({"amount": 10, "limit": -3}));
        assert_eq!(
            to_canonical_string(&p).unwrap(),
            r#"{"amount": 10, "limit": -3}"#
        );
    }
}
