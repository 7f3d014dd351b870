//! Command descriptors and table resolution.
//!
//! A command table is an ordered slice of [`CommandSpec`] values owned by the
//! caller; the engine only borrows it. Each descriptor carries up to four
//! handler capabilities, one per command form. An absent slot means the form
//! is unsupported for that command and resolves to an unknown-command
//! failure, never a silent success.

use std::fmt;

use crate::classify::CommandKind;
use crate::engine::Context;

/// A registered command handler.
///
/// Handlers receive the cycle [`Context`] (command name, form, parameter
/// tokens, and the response sink) and return `true` for success or `false`
/// for failure. The boolean is the only result channel; `OK` or `ERROR` is
/// emitted by the engine accordingly.
pub type Handler = Box<dyn Fn(&mut Context<'_>) -> bool>;

/// Descriptor mapping a command name to its optional per-form handlers.
pub struct CommandSpec {
    name: &'static str,
    run: Option<Handler>,
    read: Option<Handler>,
    test: Option<Handler>,
    write: Option<Handler>,
}

impl CommandSpec {
    /// New descriptor with no handlers registered.
    pub fn new(name: &'static str) -> Self {
        CommandSpec {
            name,
            run: None,
            read: None,
            test: None,
            write: None,
        }
    }

    /// Register the RUN handler (`AT<name>`).
    pub fn on_run(mut self, handler: impl Fn(&mut Context<'_>) -> bool + 'static) -> Self {
        self.run = Some(Box::new(handler));
        self
    }

    /// Register the READ handler (`AT<name>?`).
    pub fn on_read(mut self, handler: impl Fn(&mut Context<'_>) -> bool + 'static) -> Self {
        self.read = Some(Box::new(handler));
        self
    }

    /// Register the TEST handler (`AT<name>=?`).
    pub fn on_test(mut self, handler: impl Fn(&mut Context<'_>) -> bool + 'static) -> Self {
        self.test = Some(Box::new(handler));
        self
    }

    /// Register the WRITE handler (`AT<name>=...`).
    pub fn on_write(mut self, handler: impl Fn(&mut Context<'_>) -> bool + 'static) -> Self {
        self.write = Some(Box::new(handler));
        self
    }

    /// The registered command name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The handler slot for a command form, if registered.
    pub(crate) fn handler(&self, kind: CommandKind) -> Option<&Handler> {
        match kind {
            CommandKind::Run => self.run.as_ref(),
            CommandKind::Read => self.read.as_ref(),
            CommandKind::Test => self.test.as_ref(),
            CommandKind::Write => self.write.as_ref(),
        }
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("run", &self.run.is_some())
            .field("read", &self.read.is_some())
            .field("test", &self.test.is_some())
            .field("write", &self.write.is_some())
            .finish()
    }
}

/// Exact, case-sensitive linear scan. First match wins.
pub(crate) fn resolve<'a>(table: &'a [CommandSpec], name: &str) -> Option<&'a CommandSpec> {
    table.iter().find(|spec| spec.name == name)
}
