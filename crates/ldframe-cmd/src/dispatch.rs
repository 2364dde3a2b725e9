use crate::error::{DispatchError, Result};

/// Maximum number of tokens taken from one line, command name included.
pub const DEFAULT_MAX_ARGS: usize = 8;

/// A command handler: receives the caller context and `argv` (with the
/// command name at index 0) and returns an integer result.
pub type Handler<C> = fn(&mut C, &[&str]) -> i32;

/// Split a line on single spaces, skipping empty tokens.
///
/// Tokens beyond `max_args` are dropped.
pub fn tokenize(line: &str, max_args: usize) -> Vec<&str> {
    line.split(' ')
        .filter(|token| !token.is_empty())
        .take(max_args)
        .collect()
}

/// Ordered name → handler table. The first entry with a matching name wins.
pub struct CommandTable<C> {
    entries: Vec<(&'static str, Handler<C>)>,
    max_args: usize,
}

impl<C> CommandTable<C> {
    /// Create an empty table with [`DEFAULT_MAX_ARGS`].
    pub fn new() -> Self {
        Self::with_max_args(DEFAULT_MAX_ARGS)
    }

    /// Create an empty table taking at most `max_args` tokens per line.
    pub fn with_max_args(max_args: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_args: max_args.max(1),
        }
    }

    /// Register a handler under `name`.
    pub fn register(&mut self, name: &'static str, handler: Handler<C>) -> &mut Self {
        self.entries.push((name, handler));
        self
    }

    /// Builder-style [`register`](Self::register).
    pub fn with(mut self, name: &'static str, handler: Handler<C>) -> Self {
        self.register(name, handler);
        self
    }

    /// Find the handler registered under `name`.
    pub fn find(&self, name: &str) -> Option<Handler<C>> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, handler)| *handler)
    }

    /// Registered command names, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    pub fn max_args(&self) -> usize {
        self.max_args
    }

    /// Tokenize `line` and run the matching handler.
    ///
    /// Returns the handler's result, or [`DispatchError::NoCommand`] for a
    /// blank line and [`DispatchError::Unknown`] when nothing matches.
    pub fn dispatch(&self, ctx: &mut C, line: &str) -> Result<i32> {
        let argv = tokenize(line.trim_end_matches(['\r', '\n']), self.max_args);
        let Some(&name) = argv.first() else {
            return Err(DispatchError::NoCommand);
        };

        let handler = self
            .find(name)
            .ok_or_else(|| DispatchError::Unknown(name.to_string()))?;

        tracing::debug!(command = name, argc = argv.len(), "dispatching command");
        Ok(handler(ctx, &argv))
    }
}

impl<C> Default for CommandTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
