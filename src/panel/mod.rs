//! Detail/list panel logic: view state, view models and the commands it emits.

mod command;
mod confirm;
mod state;
mod view;

pub use command::{PanelCommand, parse_frequency_input};
pub use confirm::{AlwaysConfirm, Confirm, DELETE_PROMPT, NeverConfirm, RESET_PROMPT};
pub use state::{PanelMessage, PanelState};
pub use view::{
    ColorChoice, DetailView, EMPTY_HINT, EMPTY_TITLE, ListRow, PANEL_TITLE, PanelView,
};
