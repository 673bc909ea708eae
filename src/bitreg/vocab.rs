use std::fmt;

use bitflags::Flags;

/// A closed set of named bits that a [`BitRegister`](super::BitRegister) can hold.
///
/// The name table drives human-readable rendering for logs and telemetry. It
/// is independent of the `bitflags` constant names and of bit positions.
pub trait Vocabulary: Flags<Bits = u32> + Copy + 'static {
    /// Display names in table order.
    const NAMES: &'static [(&'static str, Self)];

    /// When set, rendered names are sorted alphabetically instead of
    /// following [`Self::NAMES`] order.
    const SORTED: bool = false;
}

/// Writes the pipe-joined names of every known bit set in `value`.
///
/// Zero renders as `none`. A non-zero value with no known bits renders as
/// `unknown(0xNN)`; unknown bits mixed with known ones are omitted.
pub fn write_names<F: Vocabulary>(value: F, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let bits = value.bits();
    if bits == 0 {
        return f.write_str("none");
    }

    let mut names: Vec<&'static str> = F::NAMES
        .iter()
        .filter(|(_, flag)| {
            let mask = flag.bits();
            mask != 0 && bits & mask == mask
        })
        .map(|(name, _)| *name)
        .collect();

    if names.is_empty() {
        return write!(f, "unknown(0x{bits:X})");
    }
    if F::SORTED {
        names.sort_unstable();
    }
    f.write_str(&names.join("|"))
}
