//! Sector color palette.
//!
//! Colors are stored as plain lowercase tags (`"red"`, `"cyan"`, ...) so that
//! persisted data and exported files stay readable. Tags outside the fixed
//! palette are preserved verbatim instead of being rejected.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Color tag of a sector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SectorColor {
    Red,
    Orange,
    Yellow,
    Cyan,
    Purple,
    Violet,
    Pink,
    Green,
    Black,
    /// A tag that is not part of the palette (kept as-is from loaded data).
    Other(String),
}

impl SectorColor {
    /// Colors offered by the panel and used for random assignment, in display order.
    pub const PALETTE: [SectorColor; 9] = [
        SectorColor::Red,
        SectorColor::Orange,
        SectorColor::Yellow,
        SectorColor::Cyan,
        SectorColor::Purple,
        SectorColor::Violet,
        SectorColor::Pink,
        SectorColor::Green,
        SectorColor::Black,
    ];

    /// The tag written to storage and export files.
    pub fn tag(&self) -> &str {
        match self {
            SectorColor::Red => "red",
            SectorColor::Orange => "orange",
            SectorColor::Yellow => "yellow",
            SectorColor::Cyan => "cyan",
            SectorColor::Purple => "purple",
            SectorColor::Violet => "violet",
            SectorColor::Pink => "pink",
            SectorColor::Green => "green",
            SectorColor::Black => "black",
            SectorColor::Other(tag) => tag,
        }
    }

    /// CSS color used to draw the shape and its swatch.
    ///
    /// Palette tags are valid CSS color names, so they map onto themselves.
    pub fn css(&self) -> &str {
        self.tag()
    }

    /// Whether this color is one of the fixed palette entries.
    pub fn is_palette(&self) -> bool {
        !matches!(self, SectorColor::Other(_))
    }

    /// Pick a palette color at random.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::PALETTE
            .choose(rng)
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for SectorColor {
    fn default() -> Self {
        SectorColor::Green
    }
}

impl From<String> for SectorColor {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "red" => SectorColor::Red,
            "orange" => SectorColor::Orange,
            "yellow" => SectorColor::Yellow,
            "cyan" => SectorColor::Cyan,
            "purple" => SectorColor::Purple,
            "violet" => SectorColor::Violet,
            "pink" => SectorColor::Pink,
            "green" => SectorColor::Green,
            "black" => SectorColor::Black,
            _ => SectorColor::Other(tag),
        }
    }
}

impl From<SectorColor> for String {
    fn from(color: SectorColor) -> Self {
        match color {
            SectorColor::Other(tag) => tag,
            known => known.tag().to_string(),
        }
    }
}

impl FromStr for SectorColor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(SectorColor::from(s.trim().to_lowercase()))
    }
}

impl fmt::Display for SectorColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
