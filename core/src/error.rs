//! Error types for selection-driven copies.

use thiserror::Error;

/// Errors raised while applying a [`SelectionTree`](crate::SelectionTree)
/// to an object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// The tree names a property the object's class does not declare.
    #[error("selection names unknown property `{property}` on class `{class}`")]
    InvalidSelection {
        /// Class the tree node was applied to.
        class: String,
        /// Offending property name.
        property: String,
    },
}

/// Convenience alias for results with [`SelectionError`].
pub type Result<T> = std::result::Result<T, SelectionError>;
