//! Per-chain handler registry.
//!
//! Built once from a provider's candidate list by grouping handlers on their
//! tag. Candidates without a tag are dropped. After construction the
//! registry is read-only and resolves a command in O(1).

use crate::command::command_key;
use crate::handler::Tagged;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A handler paired with the tag it was registered under.
pub struct TaggedHandler<H: ?Sized> {
    tag: Arc<str>,
    handler: Arc<H>,
}

impl<H: ?Sized> TaggedHandler<H> {
    pub fn new(tag: impl Into<Arc<str>>, handler: Arc<H>) -> Self {
        Self {
            tag: tag.into(),
            handler,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }
}

impl<H: ?Sized> Clone for TaggedHandler<H> {
    fn clone(&self) -> Self {
        Self {
            tag: Arc::clone(&self.tag),
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: ?Sized + Tagged> fmt::Debug for TaggedHandler<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaggedHandler")
            .field("tag", &self.tag)
            .field("handler", &self.handler.handler_name())
            .finish()
    }
}

/// Handlers grouped by the command they declare.
pub struct HandlerRegistry<H: ?Sized> {
    groups: HashMap<String, Vec<TaggedHandler<H>>>,
    untagged: usize,
}

impl<H: ?Sized + Tagged> HandlerRegistry<H> {
    /// Group `candidates` by tag, preserving their order within each group.
    pub fn new(candidates: impl IntoIterator<Item = Arc<H>>) -> Self {
        let mut groups: HashMap<String, Vec<TaggedHandler<H>>> = HashMap::new();
        let mut untagged = 0;

        for handler in candidates {
            let tag = match handler.tag() {
                Some(tag) if !tag.is_empty() => tag,
                _ => {
                    debug!(
                        handler = handler.handler_name(),
                        "Skipping untagged handler"
                    );
                    untagged += 1;
                    continue;
                }
            };

            groups
                .entry(command_key(&tag))
                .or_default()
                .push(TaggedHandler::new(tag, handler));
        }

        Self { groups, untagged }
    }
}

impl<H: ?Sized> HandlerRegistry<H> {
    /// Handlers declaring `command`, in registration order. Empty when none
    /// did; that is not an error.
    pub fn resolve(&self, command: &impl fmt::Display) -> &[TaggedHandler<H>] {
        self.groups
            .get(&command_key(&command.to_string()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of handlers that were dispatchable.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of candidates dropped for having no tag.
    pub fn untagged(&self) -> usize {
        self.untagged
    }

    /// Declared command keys, sorted.
    pub fn commands(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.groups.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl<H: ?Sized> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("commands", &self.commands())
            .field("untagged", &self.untagged)
            .finish()
    }
}
