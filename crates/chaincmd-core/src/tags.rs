//! Capability tags: which command a handler type answers to.
//!
//! Tags are declared once per handler type, normally at process start, and
//! read once per handler instance when a chain's registry is built. A handler
//! without a tag is never dispatched; that is a valid state, not an error.
//!
//! ```ignore
//! chaincmd_core::handles! {
//!     EatHandler => HumanCommand::Eat,
//!     RunHandler => HumanCommand::Run,
//! }
//! ```

use crate::command::command_key;
use crate::handler::Tagged;
use dashmap::DashMap;
use lazy_static::lazy_static;
use std::any::TypeId;
use std::fmt;

lazy_static! {
    static ref TAGS: DashMap<TypeId, String> = DashMap::new();
}

/// Declare that handler type `H` handles `command`.
///
/// Declaring the same type again replaces its previous tag.
pub fn declare<H: ?Sized + 'static>(command: impl fmt::Display) {
    let name = command.to_string();
    tracing::trace!(
        handler = std::any::type_name::<H>(),
        command = %name,
        "Declared handler tag"
    );
    TAGS.insert(TypeId::of::<H>(), name);
}

/// Remove the declared tag of handler type `H`, returning it if present.
pub fn forget<H: ?Sized + 'static>() -> Option<String> {
    TAGS.remove(&TypeId::of::<H>()).map(|(_, name)| name)
}

/// Tag declared for handler type `H`, if any.
pub fn lookup<H: ?Sized + 'static>() -> Option<String> {
    TAGS.get(&TypeId::of::<H>()).map(|entry| entry.value().clone())
}

/// Resolve the tag of a handler instance; empty when untagged.
pub fn tag_of<H: ?Sized + Tagged>(handler: &H) -> String {
    handler.tag().unwrap_or_default()
}

/// Whether `tag` names `command`, ignoring case. An empty tag never matches.
pub fn matches(tag: &str, command: &impl fmt::Display) -> bool {
    !tag.is_empty() && command_key(tag) == command_key(&command.to_string())
}

/// Declare tags for several handler types at once.
#[macro_export]
macro_rules! handles {
    ($($handler:ty => $command:expr),+ $(,)?) => {{
        $( $crate::tags::declare::<$handler>($command); )+
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Declared;
    struct Redeclared;
    struct Never;

    impl Tagged for Declared {}
    impl Tagged for Never {}

    #[test]
    fn declare_and_lookup() {
        declare::<Declared>("Eat");
        assert_eq!(lookup::<Declared>().as_deref(), Some("Eat"));
        assert_eq!(tag_of(&Declared), "Eat");
    }

    #[test]
    fn undeclared_type_has_empty_tag() {
        assert_eq!(lookup::<Never>(), None);
        assert_eq!(tag_of(&Never), "");
    }

    #[test]
    fn redeclare_replaces() {
        handles!(Redeclared => "Run");
        handles!(Redeclared => "Walk");
        assert_eq!(lookup::<Redeclared>().as_deref(), Some("Walk"));
        assert_eq!(forget::<Redeclared>().as_deref(), Some("Walk"));
        assert_eq!(lookup::<Redeclared>(), None);
    }

    #[test]
    fn matching_ignores_case() {
        assert!(matches("eat", &"Eat"));
        assert!(matches("EAT", &"eat"));
        assert!(!matches("Eat", &"Run"));
        assert!(!matches("", &""));
    }
}
