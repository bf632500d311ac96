//! Command name lookup and message routing
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use std::collections::HashMap;
use std::sync::Arc;

use super::handler::{Invocation, TextCommandHandler};

/// A routed message: the parsed invocation and the handler that owns it
pub struct Route {
    pub invocation: Invocation,
    pub handler: Arc<dyn TextCommandHandler>,
}

/// Maps lowercase command names to handlers and routes prefixed messages.
///
/// One handler may own several names (`remind`, `reminders`, ...). Registering
/// a name twice keeps the later handler.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn TextCommandHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a handler list
    pub fn with_handlers(handlers: impl IntoIterator<Item = Arc<dyn TextCommandHandler>>) -> Self {
        let mut registry = Self::new();
        for handler in handlers {
            registry.register(handler);
        }
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn TextCommandHandler>) {
        for name in handler.command_names() {
            self.handlers.insert(name, Arc::clone(&handler));
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn TextCommandHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Parse `content` against `prefix` and find its handler.
    ///
    /// `None` for unprefixed text and for names nobody registered.
    pub fn route(&self, content: &str, prefix: &str) -> Option<Route> {
        let invocation = Invocation::parse(content, prefix)?;
        let handler = self.get(&invocation.name)?;
        Some(Route {
            invocation,
            handler,
        })
    }

    /// Number of registered names (not distinct handlers)
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registered names, sorted
    pub fn command_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::context::CommandContext;
    use anyhow::Result;
    use async_trait::async_trait;
    use serenity::model::channel::Message;
    use serenity::prelude::Context;

    struct StubHandler {
        names: &'static [&'static str],
    }

    #[async_trait]
    impl TextCommandHandler for StubHandler {
        fn command_names(&self) -> &'static [&'static str] {
            self.names
        }

        async fn handle(
            &self,
            _ctx: Arc<CommandContext>,
            _serenity_ctx: &Context,
            _msg: &Message,
            _invocation: &Invocation,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn stub(names: &'static [&'static str]) -> Arc<dyn TextCommandHandler> {
        Arc::new(StubHandler { names })
    }

    #[test]
    fn test_empty_registry_routes_nothing() {
        let registry = CommandRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.route(".help", ".").is_none());
    }

    #[test]
    fn test_one_handler_owns_several_names() {
        let registry =
            CommandRegistry::with_handlers([stub(&["remind", "reminders", "remove", "removeall"])]);

        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.command_names(),
            vec!["remind", "reminders", "remove", "removeall"]
        );
    }

    #[test]
    fn test_route_parses_and_resolves() {
        let registry = CommandRegistry::with_handlers([
            stub(&["remind", "reminders"]),
            stub(&["setday"]),
        ]);

        let route = registry.route(".SetDay viernes", ".").unwrap();
        assert_eq!(route.invocation.name, "setday");
        assert_eq!(route.invocation.args, "viernes");
        assert_eq!(route.handler.command_names(), &["setday"]);

        let route = registry.route("k!remind 5m tea", "k!").unwrap();
        assert_eq!(route.handler.command_names(), &["remind", "reminders"]);
    }

    #[test]
    fn test_route_ignores_unknown_and_wrong_prefix() {
        let registry = CommandRegistry::with_handlers([stub(&["help"])]);

        assert!(registry.route(".dance", ".").is_none());
        assert!(registry.route("!help", ".").is_none());
        assert!(registry.route("help", ".").is_none());
    }

    #[test]
    fn test_later_registration_wins() {
        let registry =
            CommandRegistry::with_handlers([stub(&["help"]), stub(&["help", "remind"])]);
        assert_eq!(registry.command_names(), vec!["help", "remind"]);
        assert_eq!(registry.get("help").unwrap().command_names().len(), 2);
    }
}
