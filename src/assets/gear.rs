use std::fmt;
use std::str::FromStr;

use crate::foundation::error::GearError;

/// Bundled decorative overlays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GearKind {
    /// Golden crown.
    Crown,
    /// Blue saber-style blade.
    SaberBlue,
    /// Red saber-style blade.
    SaberRed,
}

impl GearKind {
    /// Every bundled gear, in menu order.
    pub const ALL: [GearKind; 3] = [GearKind::Crown, GearKind::SaberBlue, GearKind::SaberRed];

    /// Stable kebab-case name used in scripts and on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::Crown => "crown",
            Self::SaberBlue => "saber-blue",
            Self::SaberRed => "saber-red",
        }
    }

    /// Human-readable label of the "add" action.
    pub fn label(self) -> &'static str {
        match self {
            Self::Crown => "Add Crown",
            Self::SaberBlue => "Add Blue Saber",
            Self::SaberRed => "Add Red Saber",
        }
    }

    /// Embedded SVG source of this gear.
    pub fn svg_bytes(self) -> &'static [u8] {
        match self {
            Self::Crown => include_bytes!("../../assets/gear/crown.svg"),
            Self::SaberBlue => include_bytes!("../../assets/gear/saber-blue.svg"),
            Self::SaberRed => include_bytes!("../../assets/gear/saber-red.svg"),
        }
    }
}

impl fmt::Display for GearKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GearKind {
    type Err = GearError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|g| g.name() == needle)
            .ok_or_else(|| {
                GearError::validation(format!(
                    "unknown gear '{s}' (expected one of: crown, saber-blue, saber-red)"
                ))
            })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/gear.rs"]
mod tests;
