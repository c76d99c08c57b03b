//! Sample domain: humans and the activities commanded on them.

use chaincmd_core::command_key;
use parking_lot::RwLock;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Commands understood by the sample handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HumanCommand {
    Eat,
    Run,
    Sleep,
    Walk,
    Work,
}

impl HumanCommand {
    pub const ALL: [HumanCommand; 5] = [
        HumanCommand::Eat,
        HumanCommand::Run,
        HumanCommand::Sleep,
        HumanCommand::Walk,
        HumanCommand::Work,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HumanCommand::Eat => "Eat",
            HumanCommand::Run => "Run",
            HumanCommand::Sleep => "Sleep",
            HumanCommand::Walk => "Walk",
            HumanCommand::Work => "Work",
        }
    }
}

impl fmt::Display for HumanCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown command: {0}")]
pub struct UnknownCommand(pub String);

impl FromStr for HumanCommand {
    type Err = UnknownCommand;

    /// Case-insensitive, matching how commands are dispatched.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = command_key(s.trim());
        HumanCommand::ALL
            .into_iter()
            .find(|command| command_key(command.as_str()) == key)
            .ok_or_else(|| UnknownCommand(s.to_string()))
    }
}

/// Activity flags of a [`Human`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Activity {
    pub eating: bool,
    pub running: bool,
    pub sleeping: bool,
    pub walking: bool,
    pub working: bool,
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = [
            (self.eating, "eating"),
            (self.running, "running"),
            (self.sleeping, "sleeping"),
            (self.walking, "walking"),
            (self.working, "working"),
        ];
        let active: Vec<_> = flags
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, name)| *name)
            .collect();
        if active.is_empty() {
            f.write_str("idle")
        } else {
            f.write_str(&active.join(", "))
        }
    }
}

/// A subject of the sample chains. Handlers mutate its activity through a
/// lock, since subjects are shared across concurrent invocations.
#[derive(Debug)]
pub struct Human {
    name: String,
    activity: RwLock<Activity>,
}

impl Human {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            activity: RwLock::new(Activity::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Snapshot of the current activity.
    pub fn activity(&self) -> Activity {
        *self.activity.read()
    }

    pub fn update(&self, change: impl FnOnce(&mut Activity)) {
        change(&mut self.activity.write());
    }
}
