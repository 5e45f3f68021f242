//! Per-case gating flags.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask of case flags: `PARALLEL = 1`, `DEBUG = 2`, `SKIP = 4`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flags(u8);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Run the case concurrently with its parallel siblings.
    pub const PARALLEL: Flags = Flags(1);
    /// Focus: only debug cases run, and an introspected skip is ignored.
    pub const DEBUG: Flags = Flags(2);
    /// Always skip the case.
    pub const SKIP: Flags = Flags(4);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0b111)
    }

    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Flags> for Flags {
    fn from_iter<I: IntoIterator<Item = Flags>>(iter: I) -> Self {
        iter.into_iter().fold(Flags::NONE, BitOr::bitor)
    }
}

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = [(Flags::PARALLEL, "PARALLEL"), (Flags::DEBUG, "DEBUG"), (Flags::SKIP, "SKIP")]
            .into_iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| name)
            .collect();
        if names.is_empty() {
            f.write_str("Flags(NONE)")
        } else {
            write!(f, "Flags({})", names.join(" | "))
        }
    }
}
