//! Confirmation of destructive panel actions.

/// Prompt shown before a sector is deleted.
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this polygon?";

/// Prompt shown before the map is reset to the seed dataset.
pub const RESET_PROMPT: &str =
    "Are you sure you want to reset the map to the original state? All your changes will be lost.";

/// Asks the user to approve a destructive action.
pub trait Confirm {
    /// Return true to go ahead. Declining makes the action a no-op.
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Approves everything (scripted use, `--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        log::debug!("Auto-confirmed: {}", prompt);
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        log::debug!("Declined: {}", prompt);
        false
    }
}

