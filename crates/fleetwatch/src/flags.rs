//! Per-user vessel flags.
//!
//! A flag is a lightweight annotation a user puts on a vessel, independent of
//! the computed status. Flags are stored per (vessel id, user id); setting a
//! flag to [`FlagColor::None`] removes it.

use std::collections::HashMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Flag color.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FlagColor {
    /// No flag.
    #[default]
    None,
    /// Green flag.
    Green,
    /// Yellow flag.
    Yellow,
    /// Red flag.
    Red,
}

impl FlagColor {
    /// All colors, `None` first.
    pub const ALL: [Self; 4] = [Self::None, Self::Green, Self::Yellow, Self::Red];

    /// Lower-case name, as stored.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
        }
    }

    /// Whether this color means "no flag".
    #[must_use]
    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl std::fmt::Display for FlagColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FlagColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "green" => Ok(Self::Green),
            "yellow" => Ok(Self::Yellow),
            "red" => Ok(Self::Red),
            _ => Err(Error::unknown_value("flag color", s)),
        }
    }
}

/// Identity of a stored flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlagKey {
    /// Flagged vessel.
    pub vessel_id: i64,
    /// Owning user.
    pub user_id: String,
}

impl FlagKey {
    /// Create a key.
    #[must_use]
    pub fn new(vessel_id: i64, user_id: impl Into<String>) -> Self {
        Self {
            vessel_id,
            user_id: user_id.into(),
        }
    }

    /// REST resource path for this flag, with the user id percent-encoded.
    #[must_use]
    pub fn resource_path(&self) -> String {
        format!(
            "/vessel-flags/{}/{}",
            self.vessel_id,
            encode_path_segment(&self.user_id)
        )
    }
}

/// The flags one user has set, keyed by vessel id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagSet {
    flags: HashMap<i64, FlagColor>,
}

impl FlagSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag color for a vessel; unflagged vessels are [`FlagColor::None`].
    #[must_use]
    pub fn get(&self, vessel_id: i64) -> FlagColor {
        self.flags.get(&vessel_id).copied().unwrap_or_default()
    }

    /// Set or clear a vessel's flag.
    pub fn set(&mut self, vessel_id: i64, color: FlagColor) {
        if color.is_none() {
            self.flags.remove(&vessel_id);
        } else {
            self.flags.insert(vessel_id, color);
        }
    }

    /// Number of flagged vessels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether no vessel is flagged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Flagged vessels, ordered by vessel id.
    #[must_use]
    pub fn sorted(&self) -> Vec<(i64, FlagColor)> {
        let mut entries: Vec<_> = self.flags.iter().map(|(id, c)| (*id, *c)).collect();
        entries.sort_unstable_by_key(|(id, _)| *id);
        entries
    }
}

impl FromIterator<(i64, FlagColor)> for FlagSet {
    fn from_iter<I: IntoIterator<Item = (i64, FlagColor)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (id, color) in iter {
            set.set(id, color);
        }
        set
    }
}

/// Percent-encode a string for use as a single URL path segment.
///
/// Unreserved characters (RFC 3986) pass through; everything else is
/// encoded byte-wise as UTF-8.
#[must_use]
pub fn encode_path_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}
