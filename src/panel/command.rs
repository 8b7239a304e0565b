//! Commands the panel issues against the sector store.

use crate::model::{FrequencyField, SectorColor, SectorId};

/// A store-level action requested from the detail/list panel.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelCommand {
    /// Toggle selection of a list row
    Select(SectorId),
    Rename { id: SectorId, name: String },
    Recolor { id: SectorId, color: SectorColor },
    SetFrequency {
        id: SectorId,
        field: FrequencyField,
        value: u32,
    },
    /// Delete after confirmation
    Delete(SectorId),
    /// Restore the seed dataset after confirmation
    ResetToSeed,
    /// Download every sector as one file
    Export,
}

impl PanelCommand {
    /// Whether the command destroys data and needs the user's confirmation.
    pub fn is_destructive(&self) -> bool {
        matches!(self, PanelCommand::Delete(_) | PanelCommand::ResetToSeed)
    }
}

/// Parse a number typed into a frequency field.
///
/// Leading digits are read like an HTML number input would report them:
/// surrounding whitespace is ignored, trailing garbage is dropped, anything
/// non-numeric gives 0 and negative values clamp to 0.
pub fn parse_frequency_input(input: &str) -> u32 {
    let input = input.trim();
    let (negative, rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    let digits: &str = {
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        &rest[..end]
    };
    if negative || digits.is_empty() {
        return 0;
    }
    digits
        .parse::<u64>()
        .map_or(u32::MAX, |n| u32::try_from(n).unwrap_or(u32::MAX))
}
