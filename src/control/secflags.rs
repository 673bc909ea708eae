use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;

use crate::bitreg::{Vocabulary, write_names};

bitflags! {
    /// Security capabilities a module requests for its handlers.
    ///
    /// Bit 0 is unassigned so the values line up with existing `cap_mask`
    /// words.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SecFlag: u32 {
        /// Authentication and authorization.
        const AUTH = 1 << 1;
        /// Sanitize query params and headers.
        const SANITIZE = 1 << 2;
        /// Sanitize the request body.
        const SANITIZE_BODY = 1 << 3;
    }
}

impl Default for SecFlag {
    fn default() -> Self {
        Self::empty()
    }
}

impl Vocabulary for SecFlag {
    const NAMES: &'static [(&'static str, Self)] = &[
        ("auth", SecFlag::AUTH),
        ("sanitize", SecFlag::SANITIZE),
        ("sanitize_body", SecFlag::SANITIZE_BODY),
    ];
}

impl fmt::Display for SecFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_names(*self, f)
    }
}

impl SecFlag {
    /// Normalizes a legacy boolean blob into capability flags.
    ///
    /// Recognized keys: `auth`, `sanitize`, `sanitize_body`,
    /// `validateAndSanitizeBody`, and the deprecated `validateAndSanitize`
    /// (read as `sanitize`). `None` yields no flags.
    pub fn from_legacy_map(map: Option<&HashMap<String, bool>>) -> Self {
        let Some(map) = map else {
            return Self::empty();
        };
        let on = |key: &str| map.get(key).copied().unwrap_or(false);

        let mut flags = Self::empty();
        if on("auth") {
            flags |= Self::AUTH;
        }
        if on("sanitize") {
            flags |= Self::SANITIZE;
        }
        if on("sanitize_body") || on("validateAndSanitizeBody") {
            flags |= Self::SANITIZE_BODY;
        }
        // deprecated alias
        if on("validateAndSanitize") {
            flags |= Self::SANITIZE;
        }
        flags
    }

    /// Canonical-key form of the flags, for echoing normalized config.
    pub fn to_legacy_map(self) -> HashMap<String, bool> {
        Self::NAMES
            .iter()
            .map(|(name, flag)| ((*name).to_string(), self.contains(*flag)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn legacy(pairs: &[(&str, bool)]) -> HashMap<String, bool> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), *v)).collect()
    }

    #[test]
    fn auth_only() {
        let m = legacy(&[("auth", true)]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), SecFlag::AUTH);
    }

    #[test]
    fn body_aliases() {
        let m = legacy(&[("validateAndSanitizeBody", true)]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), SecFlag::SANITIZE_BODY);

        let m = legacy(&[("sanitize_body", true)]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), SecFlag::SANITIZE_BODY);
    }

    #[test]
    fn deprecated_sanitize_alias() {
        let m = legacy(&[("validateAndSanitize", true)]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), SecFlag::SANITIZE);
    }

    #[test]
    fn missing_or_empty_map_is_none() {
        assert_eq!(SecFlag::from_legacy_map(None), SecFlag::empty());
        assert_eq!(SecFlag::from_legacy_map(Some(&HashMap::new())), SecFlag::empty());
    }

    #[test]
    fn false_and_unknown_keys_contribute_nothing() {
        let m = legacy(&[("auth", false), ("sanitize", false), ("cors", true)]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), SecFlag::empty());
    }

    #[test]
    fn everything_on() {
        let m = legacy(&[
            ("auth", true),
            ("validateAndSanitize", true),
            ("validateAndSanitizeBody", true),
        ]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), SecFlag::all());
    }

    #[test]
    fn display_follows_declared_order() {
        assert_eq!(SecFlag::empty().to_string(), "none");
        assert_eq!(
            (SecFlag::SANITIZE_BODY | SecFlag::AUTH).to_string(),
            "auth|sanitize_body"
        );
        assert_eq!(SecFlag::all().to_string(), "auth|sanitize|sanitize_body");
    }

    #[test]
    fn display_marks_unknown_words() {
        assert_eq!(SecFlag::from_bits_retain(0x1).to_string(), "unknown(0x1)");
        assert_eq!(SecFlag::from_bits_retain(0xF0).to_string(), "unknown(0xF0)");
    }

    #[test]
    fn legacy_map_roundtrips_through_canonical_keys() {
        let flags = SecFlag::AUTH | SecFlag::SANITIZE_BODY;
        let m = flags.to_legacy_map();
        assert_eq!(m.len(), 3);
        assert!(m["auth"]);
        assert!(!m["sanitize"]);
        assert_eq!(SecFlag::from_legacy_map(Some(&m)), flags);
    }
}
