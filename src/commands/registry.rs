use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::commands::handler::CommandHandler;
use crate::core::error::ScmdError;

/// Alias lookup table. Keys are case-folded aliases; `order` remembers
/// first-registration order of keys, with overwrites keeping their
/// original slot.
#[derive(Default)]
struct AliasTable {
    entries: HashMap<String, Arc<dyn CommandHandler>>,
    order: Vec<String>,
}

impl AliasTable {
    /// Insert under an already folded key. Reports whether the table
    /// changed: a new key, or an existing key re-pointed at a
    /// different handler instance.
    fn insert(&mut self, key: String, handler: Arc<dyn CommandHandler>) -> bool {
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                self.order.push(slot.key().clone());
                slot.insert(handler);
                true
            }
            Entry::Occupied(mut slot) => {
                let changed = !Arc::ptr_eq(slot.get(), &handler);
                slot.insert(handler);
                changed
            }
        }
    }

    fn resolve(&self, folded: &str) -> Option<Arc<dyn CommandHandler>> {
        self.entries.get(folded).cloned()
    }

    fn contains(&self, handler: &Arc<dyn CommandHandler>) -> bool {
        self.entries.values().any(|current| Arc::ptr_eq(current, handler))
    }

    /// Distinct handlers, ordered by their earliest surviving alias
    /// slot. Handlers reachable through several aliases appear once.
    fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        let mut distinct: Vec<Arc<dyn CommandHandler>> = Vec::new();
        for key in &self.order {
            let handler = &self.entries[key];
            if !distinct.iter().any(|known| Arc::ptr_eq(known, handler)) {
                distinct.push(Arc::clone(handler));
            }
        }
        distinct
    }

    fn remove_handler(&mut self, handler: &Arc<dyn CommandHandler>) -> bool {
        let before = self.entries.len();
        self.entries.retain(|_, current| !Arc::ptr_eq(current, handler));
        self.sync_order(before)
    }

    fn retain_handlers(&mut self, keep: &[Arc<dyn CommandHandler>]) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|_, current| keep.iter().any(|kept| Arc::ptr_eq(kept, current)));
        self.sync_order(before)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    /// Drop order slots whose key no longer resolves. Reports whether
    /// the entry count moved away from `before`.
    fn sync_order(&mut self, before: usize) -> bool {
        if self.entries.len() == before {
            return false;
        }
        let entries = &self.entries;
        self.order.retain(|key| entries.contains_key(key));
        true
    }
}

/// Shared, thread-safe mapping from alias text to command handlers.
///
/// Aliases are matched case-insensitively; handlers keep their display
/// casing. A handler is identified by instance, not by name, so two
/// handlers answering to the same alias text stay distinguishable and
/// the later registration shadows the earlier one alias by alias.
/// Clones share the same underlying table.
#[derive(Clone, Default)]
pub struct CommandRegistry {
    table: Arc<RwLock<AliasTable>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Mutation happens only after validation, so the table stays
    // consistent even if a writer panicked mid-call.
    fn read(&self) -> RwLockReadGuard<'_, AliasTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AliasTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler under every alias it declares.
    ///
    /// Rejects the whole handler, touching nothing, when the alias
    /// list is empty or contains a blank entry. Returns whether the
    /// table changed; re-adding the same instance is a no-op.
    pub fn add(&self, handler: Arc<dyn CommandHandler>) -> Result<bool, ScmdError> {
        let aliases = handler.aliases();
        validate_aliases(&aliases)?;

        let changed = {
            let mut table = self.write();
            let mut changed = false;
            for alias in &aliases {
                changed |= table.insert(alias.to_lowercase(), Arc::clone(&handler));
            }
            changed
        };

        if changed {
            info!(command = %aliases[0], aliases = aliases.len(), "command registered");
        }
        Ok(changed)
    }

    /// Register several handlers. Stops at the first rejected handler;
    /// registrations made before the rejection stay in place.
    pub fn add_all<I>(&self, handlers: I) -> Result<bool, ScmdError>
    where
        I: IntoIterator<Item = Arc<dyn CommandHandler>>,
    {
        let mut changed = false;
        for handler in handlers {
            changed |= self.add(handler)?;
        }
        Ok(changed)
    }

    /// Unregister a handler by instance, releasing every alias that
    /// still points at it. Another handler's aliases are never touched,
    /// even when the texts collide.
    pub fn remove(&self, handler: &Arc<dyn CommandHandler>) -> bool {
        let changed = self.write().remove_handler(handler);
        if changed {
            let primary = handler.aliases().into_iter().next().unwrap_or_default();
            info!(command = %primary, "command removed");
        }
        changed
    }

    pub fn remove_all(&self, handlers: &[Arc<dyn CommandHandler>]) -> bool {
        let mut changed = false;
        for handler in handlers {
            changed |= self.remove(handler);
        }
        changed
    }

    /// Keep only the given handlers, dropping every alias owned by any
    /// other instance.
    pub fn retain_all(&self, handlers: &[Arc<dyn CommandHandler>]) -> bool {
        let changed = self.write().retain_handlers(handlers);
        if changed {
            info!(retained = handlers.len(), "registry pruned");
        }
        changed
    }

    pub fn clear(&self) {
        self.write().clear();
    }

    /// Number of distinct registered handlers, not alias entries.
    pub fn len(&self) -> usize {
        self.read().handlers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Whether this exact handler instance holds at least one alias.
    pub fn contains(&self, handler: &Arc<dyn CommandHandler>) -> bool {
        self.read().contains(handler)
    }

    /// True when none of the given handlers is currently registered.
    /// An empty slice counts as none present.
    pub fn contains_none(&self, handlers: &[Arc<dyn CommandHandler>]) -> bool {
        let table = self.read();
        handlers.iter().all(|handler| !table.contains(handler))
    }

    /// Distinct handlers in registration order. A handler that
    /// overwrote another's alias keeps the slot position of that alias.
    pub fn handlers(&self) -> Vec<Arc<dyn CommandHandler>> {
        self.read().handlers()
    }

    /// Case-insensitive lookup of the handler answering to an alias.
    pub fn resolve(&self, alias: &str) -> Option<Arc<dyn CommandHandler>> {
        self.read().resolve(&alias.to_lowercase())
    }
}

impl fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.read();
        f.debug_struct("CommandRegistry")
            .field("aliases", &table.order)
            .finish()
    }
}

fn validate_aliases(aliases: &[String]) -> Result<(), ScmdError> {
    if aliases.is_empty() {
        return Err(ScmdError::InvalidAlias {
            reason: "handler declares no aliases".into(),
        });
    }
    if aliases.iter().any(|alias| alias.trim().is_empty()) {
        return Err(ScmdError::InvalidAlias {
            reason: format!("blank alias in {aliases:?}"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::commands::testkit::MockCommand;

    fn arc(mock: MockCommand) -> Arc<dyn CommandHandler> {
        Arc::new(mock)
    }

    #[test]
    fn resolves_aliases_case_insensitively() {
        let registry = CommandRegistry::new();
        let greet = arc(MockCommand::new(["Greet", "Welcome"]));
        assert!(registry.add(Arc::clone(&greet)).unwrap());

        for typed in ["greet", "GREET", "gReEt", "welcome", "WELCOME"] {
            let found = registry.resolve(typed).unwrap();
            assert!(Arc::ptr_eq(&found, &greet), "lookup failed for {typed:?}");
        }
        assert!(registry.resolve("gree").is_none());

        // The handler's own casing is untouched by folding.
        assert_eq!(greet.aliases(), vec!["Greet".to_string(), "Welcome".to_string()]);
    }

    #[test]
    fn add_reports_real_changes_only() {
        let registry = CommandRegistry::new();
        let first = arc(MockCommand::new(["go"]));
        let second = arc(MockCommand::new(["go"]));

        assert!(registry.add(Arc::clone(&first)).unwrap());
        assert!(!registry.add(Arc::clone(&first)).unwrap());
        assert!(registry.add(Arc::clone(&second)).unwrap());
        assert!(!registry.add(Arc::clone(&second)).unwrap());
    }

    #[test]
    fn rejected_handler_leaves_the_table_untouched() {
        let registry = CommandRegistry::new();

        let err = registry.add(arc(MockCommand::new(["good", "  "]))).unwrap_err();
        assert!(matches!(err, ScmdError::InvalidAlias { .. }));
        assert!(registry.resolve("good").is_none());
        assert!(registry.is_empty());

        let no_aliases: [&str; 0] = [];
        let err = registry.add(arc(MockCommand::new(no_aliases))).unwrap_err();
        assert!(matches!(err, ScmdError::InvalidAlias { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn add_all_keeps_registrations_made_before_a_rejection() {
        let registry = CommandRegistry::new();
        let valid = arc(MockCommand::new(["fine"]));
        let invalid = arc(MockCommand::new([""]));

        let err = registry
            .add_all([Arc::clone(&valid), Arc::clone(&invalid)])
            .unwrap_err();
        assert!(matches!(err, ScmdError::InvalidAlias { .. }));
        assert!(registry.contains(&valid));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_matches_instances_not_alias_text() {
        let registry = CommandRegistry::new();
        let registered = arc(MockCommand::new(["fly"]));
        let impostor = arc(MockCommand::new(["fly"]));
        registry.add(Arc::clone(&registered)).unwrap();

        assert!(!registry.remove(&impostor));
        assert!(registry.contains(&registered));

        assert!(registry.remove(&registered));
        assert!(!registry.remove(&registered));
        assert!(registry.resolve("fly").is_none());
    }

    #[test]
    fn later_registration_shadows_alias_by_alias() {
        let registry = CommandRegistry::new();
        let old = arc(MockCommand::new(["go", "g"]));
        let new = arc(MockCommand::new(["go"]));
        registry.add(Arc::clone(&old)).unwrap();
        registry.add(Arc::clone(&new)).unwrap();

        assert!(Arc::ptr_eq(&registry.resolve("go").unwrap(), &new));
        assert!(Arc::ptr_eq(&registry.resolve("g").unwrap(), &old));
        assert_eq!(registry.len(), 2);

        // "go" kept its original slot, so the shadowing handler
        // enumerates first.
        let handlers = registry.handlers();
        assert!(Arc::ptr_eq(&handlers[0], &new));
        assert!(Arc::ptr_eq(&handlers[1], &old));

        // Removing the shadowed handler releases only its surviving
        // alias.
        assert!(registry.remove(&old));
        assert!(Arc::ptr_eq(&registry.resolve("go").unwrap(), &new));
        assert!(registry.resolve("g").is_none());
    }

    #[test]
    fn len_counts_distinct_handlers_not_aliases() {
        let registry = CommandRegistry::new();
        registry.add(arc(MockCommand::new(["quit", "exit", "q"]))).unwrap();
        assert_eq!(registry.len(), 1);

        registry.add(arc(MockCommand::new(["help", "?"]))).unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn enumeration_follows_registration_order() {
        let registry = CommandRegistry::new();
        let a = arc(MockCommand::new(["alpha", "a"]));
        let b = arc(MockCommand::new(["beta"]));
        let c = arc(MockCommand::new(["gamma"]));
        registry
            .add_all([Arc::clone(&a), Arc::clone(&b), Arc::clone(&c)])
            .unwrap();

        let handlers = registry.handlers();
        assert_eq!(handlers.len(), 3);
        assert!(Arc::ptr_eq(&handlers[0], &a));
        assert!(Arc::ptr_eq(&handlers[1], &b));
        assert!(Arc::ptr_eq(&handlers[2], &c));
    }

    #[test]
    fn contains_none_is_true_only_without_any_hit() {
        let registry = CommandRegistry::new();
        let present = arc(MockCommand::new(["in"]));
        let absent = arc(MockCommand::new(["out"]));
        registry.add(Arc::clone(&present)).unwrap();

        assert!(registry.contains_none(&[Arc::clone(&absent)]));
        assert!(!registry.contains_none(&[Arc::clone(&present)]));
        assert!(!registry.contains_none(&[Arc::clone(&absent), Arc::clone(&present)]));
        assert!(registry.contains_none(&[]));
    }

    #[test]
    fn retain_all_prunes_everything_else() {
        let registry = CommandRegistry::new();
        let keep = arc(MockCommand::new(["keep"]));
        let drop_a = arc(MockCommand::new(["first"]));
        let drop_b = arc(MockCommand::new(["second", "2nd"]));
        registry
            .add_all([Arc::clone(&keep), Arc::clone(&drop_a), Arc::clone(&drop_b)])
            .unwrap();

        assert!(registry.retain_all(std::slice::from_ref(&keep)));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&keep));
        assert!(registry.resolve("first").is_none());
        assert!(registry.resolve("2nd").is_none());

        // A second pass with the same survivors has nothing to do.
        assert!(!registry.retain_all(std::slice::from_ref(&keep)));
    }

    #[test]
    fn remove_all_and_clear_empty_the_registry() {
        let registry = CommandRegistry::new();
        let a = arc(MockCommand::new(["one"]));
        let b = arc(MockCommand::new(["two"]));
        registry.add_all([Arc::clone(&a), Arc::clone(&b)]).unwrap();

        assert!(registry.remove_all(&[Arc::clone(&a), Arc::clone(&b)]));
        assert!(registry.is_empty());
        assert!(!registry.remove_all(&[a, b]));

        registry.add(arc(MockCommand::new(["again"]))).unwrap();
        registry.clear();
        assert!(registry.is_empty());
        assert!(registry.resolve("again").is_none());
    }

    #[test]
    fn clones_share_one_table() {
        let registry = CommandRegistry::new();
        let view = registry.clone();
        registry.add(arc(MockCommand::new(["shared"]))).unwrap();

        assert!(view.resolve("shared").is_some());
        view.clear();
        assert!(registry.is_empty());
    }
}
