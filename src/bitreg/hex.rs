//! Hex words for flag values, as carried by the `cap_mask` and `state_hex`
//! fields of a module's control record.

use bitflags::Flags;

use crate::error::FlagParseError;

/// Formats `value` as `0x` followed by upper-case hex digits (`0x6`).
pub fn format_hex<F: Flags<Bits = u32>>(value: F) -> String {
    format!("0x{:X}", value.bits())
}

/// Parses a hex word into a flag value.
///
/// Surrounding whitespace and an optional `0x`/`0X` prefix are accepted.
/// Words carrying bits the vocabulary does not define are rejected.
pub fn parse_hex<F: Flags<Bits = u32>>(input: &str) -> Result<F, FlagParseError> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() || digits.starts_with('+') {
        return Err(FlagParseError::InvalidHex(input.to_string()));
    }
    let bits = u32::from_str_radix(digits, 16)
        .map_err(|_| FlagParseError::InvalidHex(input.to_string()))?;
    F::from_bits(bits).ok_or(FlagParseError::UnknownBits(bits & !F::all().bits()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::{JobFlag, SecFlag};

    #[test]
    fn format_uses_uppercase_with_prefix() {
        assert_eq!(format_hex(SecFlag::empty()), "0x0");
        assert_eq!(format_hex(SecFlag::AUTH | SecFlag::SANITIZE), "0x6");
        assert_eq!(format_hex(JobFlag::all()), "0x7F");
    }

    #[test]
    fn parse_accepts_prefix_and_whitespace() {
        assert_eq!(parse_hex::<SecFlag>("0x6"), Ok(SecFlag::AUTH | SecFlag::SANITIZE));
        assert_eq!(parse_hex::<SecFlag>(" 0X8 "), Ok(SecFlag::SANITIZE_BODY));
        assert_eq!(parse_hex::<JobFlag>("12"), Ok(JobFlag::RUNNING | JobFlag::COMPLETED));
        assert_eq!(parse_hex::<JobFlag>("7f"), Ok(JobFlag::all()));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(matches!(
            parse_hex::<SecFlag>("0x"),
            Err(FlagParseError::InvalidHex(_))
        ));
        assert!(matches!(
            parse_hex::<SecFlag>("zz"),
            Err(FlagParseError::InvalidHex(_))
        ));
        assert!(matches!(
            parse_hex::<SecFlag>("+6"),
            Err(FlagParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn parse_rejects_bits_outside_vocabulary() {
        assert_eq!(parse_hex::<SecFlag>("0x1"), Err(FlagParseError::UnknownBits(0x1)));
        assert_eq!(parse_hex::<JobFlag>("0x180"), Err(FlagParseError::UnknownBits(0x100 | 0x80)));
    }
}
