//! Modal dialog subsystem
//!
//! Two dialogs share the page: a yes/no confirmation and a free-text input.
//! The [`DialogManager`] owns their visibility and the page-wide inert state;
//! each flow owns its pending invocation in a [`HandlerSlot`], so repeated
//! opens replace the bound handler instead of stacking new ones.

pub mod confirm;
pub mod input;
pub mod keys;
pub mod manager;
pub mod registry;
pub mod slot;
pub mod types;

pub use confirm::{ConfirmationFlow, PendingAction};
pub use input::{InputFlow, PendingInput};
pub use keys::{InputAction, InputKeyMap, Key};
pub use manager::{DialogElements, DialogManager};
pub use registry::CallbackRegistry;
pub use slot::HandlerSlot;
pub use types::*;
