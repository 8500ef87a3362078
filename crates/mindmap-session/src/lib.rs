//! Keyboard-driven editing state for a single mind-map instance.
//!
//! Nothing here is global: each mind map on the canvas owns its own
//! [`MindMapSession`], so several instances can be edited side by side.

pub mod edit;
pub mod error;
pub mod keys;
pub mod navigation;
pub mod session;

pub use edit::{Committed, EditSession};
pub use error::KeyParseError;
pub use keys::{Arrow, Key};
pub use navigation::{NavOutcome, NavigationController, adjacent, split_side};
pub use session::{KeyOutcome, MindMapSession};
