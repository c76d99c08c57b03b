//! Command identity.
//!
//! Commands are caller-defined enumerations. The core never constructs them;
//! it only needs their string form, which is the dispatch key.

use std::fmt;

/// A dispatchable command value.
///
/// Blanket-implemented for every `Display + Clone + Send + Sync + 'static`
/// type, so a plain enum with a `Display` impl is all a caller needs.
pub trait Command: fmt::Display + Clone + Send + Sync + 'static {
    /// Dispatch name of this command.
    fn name(&self) -> String {
        self.to_string()
    }
}

impl<T> Command for T where T: fmt::Display + Clone + Send + Sync + 'static {}

/// Normalise a command name or tag into its case-insensitive lookup key.
#[inline]
pub fn command_key(name: &str) -> String {
    name.to_uppercase()
}
