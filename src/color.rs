//! Deterministic color assignment for channel namespaces.

use std::fmt;

// 256-color codes that stay readable on both light and dark terminals.
pub(crate) const PALETTE: [u8; 76] = [
    20, 21, 26, 27, 32, 33, 38, 39, 40, 41, 42, 43, 44, 45, 56, 57, 62, 63, 68, 69, 74, 75, 76,
    77, 78, 79, 80, 81, 92, 93, 98, 99, 112, 113, 128, 129, 134, 135, 148, 149, 160, 161, 162,
    163, 164, 165, 166, 167, 168, 169, 170, 171, 172, 173, 178, 179, 184, 185, 196, 197, 198,
    199, 200, 201, 202, 203, 204, 205, 206, 207, 208, 209, 214, 215, 220, 221,
];

/// Selects a color for a namespace.
///
/// The same namespace always hashes to the same palette entry. Distinct
/// namespaces may collide, which is acceptable.
pub(crate) fn select_color(namespace: &str) -> u8 {
    let mut hash: i32 = 0;
    for unit in namespace.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    PALETTE[hash.unsigned_abs() as usize % PALETTE.len()]
}

/// The SGR foreground prelude for a color code, without the trailing `m`.
///
/// Callers append either `;1m` for the bold namespace label or `m` for the
/// elapsed-time suffix, so both share one escape prefix.
pub(crate) struct ColorCode(pub(crate) u8);

impl fmt::Display for ColorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 < 8 {
            write!(f, "\u{1b}[3{}", self.0)
        } else {
            write!(f, "\u{1b}[38;5;{}", self.0)
        }
    }
}
