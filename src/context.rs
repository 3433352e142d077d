//! The façade the rest of the application uses to ask the user something.
//!
//! A [`Context`] borrows the [`ProviderRegistry`] and remembers which record
//! is active.  Each call to [`selectinput`](Context::selectinput) runs one
//! selection to completion:
//!
//! ```text
//! Idle ──▶ Selecting ──▶ Resolved   (entry chosen / free text given)
//!              ▲    ├──▶ Aborted    (NoInput or I/O error, propagated)
//!              └────┴──  Retrying   (SelectionNotValid, same menu again)
//! ```
//!
//! Because a selection borrows the context immutably for its whole
//! duration, the active provider can only be changed between rounds.

use crate::menu::{Choice, Entry, Menu, MenuError};
use crate::provider::registry::{ProviderRecord, ProviderRegistry};
use crate::traits::MenuProvider;
use log::{debug, info};

/// Errors from choosing the active provider.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("no menu provider is registered")]
    NoProvider,
    #[error("unknown menu provider {name:?} (available: {available})")]
    UnknownProvider { name: String, available: String },
}

/// Drives selections through the active provider.
pub struct Context<'r> {
    registry: &'r ProviderRegistry,
    active: &'r ProviderRecord,
}

impl<'r> Context<'r> {
    /// Use the registry's highest-priority provider.
    pub fn new(registry: &'r ProviderRegistry) -> Result<Self, ContextError> {
        let active = registry.best().ok_or(ContextError::NoProvider)?;
        info!("using {} menu provider", active.name());
        Ok(Self { registry, active })
    }

    /// Use the provider registered as `name`.
    pub fn with_provider(registry: &'r ProviderRegistry, name: &str) -> Result<Self, ContextError> {
        let active = lookup(registry, name)?;
        info!("using {} menu provider", active.name());
        Ok(Self { registry, active })
    }

    /// Switch to the provider registered as `name` for subsequent rounds.
    pub fn set_active(&mut self, name: &str) -> Result<(), ContextError> {
        self.active = lookup(self.registry, name)?;
        debug!("switched to {} menu provider", name);
        Ok(())
    }

    pub fn active_name(&self) -> &str {
        self.active.name()
    }

    /// Let the user pick one entry of `menu` and return its value.
    ///
    /// `prompt` overrides the menu's own prompt.  `filter` hides entries for
    /// which it returns `false`; the menu itself is never modified.  Invalid
    /// answers are met with the same question again, for as long as it
    /// takes.  [`MenuError::NoInput`] is returned as soon as the user
    /// cancels.
    ///
    /// `Ok(None)` means no entry could be resolved, which only happens when
    /// there was nothing to choose from.
    pub fn selectinput<'m, T>(
        &self,
        menu: &'m Menu<T>,
        prompt: Option<&str>,
        filter: Option<&dyn Fn(&Entry<T>) -> bool>,
    ) -> Result<Option<&'m T>, MenuError> {
        let prompt = prompt.unwrap_or(menu.prompt());
        let mut attempt: u64 = 0;
        loop {
            let entries: Vec<&'m Entry<T>> = match filter {
                Some(f) => menu.filtered(f),
                None => menu.entries().iter().collect(),
            };
            attempt += 1;
            match self.active.provider().select(&entries, prompt) {
                Ok(Choice::Entry(i)) => return Ok(entries.get(i).copied().map(Entry::value)),
                Ok(Choice::Text(_)) => return Ok(None),
                Err(MenuError::SelectionNotValid(raw)) => {
                    debug!("invalid selection {:?} (attempt {}), asking again", raw, attempt);
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Ask for free text.  Returns `Ok(None)` for an empty answer.
    pub fn textinput(&self, prompt: Option<&str>) -> Result<Option<String>, MenuError> {
        let entries: [&Entry<()>; 0] = [];
        match self.active.provider().select(&entries, prompt.unwrap_or_default())? {
            Choice::Text(text) if !text.is_empty() => Ok(Some(text)),
            _ => Ok(None),
        }
    }
}

fn lookup<'r>(registry: &'r ProviderRegistry, name: &str) -> Result<&'r ProviderRecord, ContextError> {
    registry
        .get(name)
        .ok_or_else(|| ContextError::UnknownProvider {
            name: name.to_string(),
            available: registry.names().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::picker::{shell_quote, Dmenu, ExternalMenuProvider};
    use crate::provider::terminal::scripted::{terminal_provider, ScriptedTerminal};
    use crate::provider::terminal::ESC;
    use crate::provider::Provider;

    fn abc() -> Menu<&'static str> {
        Menu::with_entries(
            "Pick",
            vec![Entry::new("A", "A"), Entry::new("B", "B"), Entry::new("C", "C")],
        )
    }

    fn terminal_registry(term: ScriptedTerminal) -> ProviderRegistry {
        let mut registry = ProviderRegistry::new();
        registry
            .register("terminal", Provider::Terminal(terminal_provider(term)), 0)
            .unwrap();
        registry
    }

    fn script_picker(body: &str) -> Provider {
        Provider::Dmenu(ExternalMenuProvider::new(
            format!("sh -c {}", shell_quote(body)),
            Dmenu,
            "wmpick",
        ))
    }

    #[test]
    fn keystroke_resolves_value() {
        let registry = terminal_registry(ScriptedTerminal::keys("2"));
        let ctx = Context::new(&registry).unwrap();
        assert_eq!(ctx.selectinput(&abc(), None, None).unwrap(), Some(&"B"));
    }

    #[test]
    fn invalid_key_is_retried() {
        let menu = Menu::with_entries("Pick", vec![Entry::new("A", "A"), Entry::new("B", "B")]);
        let term = ScriptedTerminal::keys("91");
        let output = term.output();
        let registry = terminal_registry(term);
        let ctx = Context::new(&registry).unwrap();
        assert_eq!(ctx.selectinput(&menu, None, None).unwrap(), Some(&"A"));
        // Same prompt and same entries shown on both rounds.
        let out = output.borrow();
        assert_eq!(out.matches("Pick: ").count(), 2);
        assert_eq!(out.matches("[1-2] ").count(), 2);
    }

    #[test]
    fn retries_are_unbounded() {
        let keys = format!("{}3", "x".repeat(500));
        let registry = terminal_registry(ScriptedTerminal::keys(&keys));
        let ctx = Context::new(&registry).unwrap();
        assert_eq!(ctx.selectinput(&abc(), None, None).unwrap(), Some(&"C"));
    }

    #[test]
    fn cancel_is_not_retried() {
        let keys = format!("9{}1", ESC);
        let registry = terminal_registry(ScriptedTerminal::keys(&keys));
        let ctx = Context::new(&registry).unwrap();
        assert!(matches!(
            ctx.selectinput(&abc(), None, None),
            Err(MenuError::NoInput)
        ));
    }

    #[test]
    fn prompt_override_and_filter() {
        let term = ScriptedTerminal::keys("72");
        let output = term.output();
        let registry = terminal_registry(term);
        let ctx = Context::new(&registry).unwrap();
        let menu = abc();
        let not_b = |e: &Entry<&str>| *e.value() != "B";
        let picked = ctx
            .selectinput(&menu, Some("Other"), Some(&not_b))
            .unwrap();
        assert_eq!(picked, Some(&"C"));
        assert_eq!(menu.len(), 3);
        let out = output.borrow();
        assert_eq!(out.matches("Other: ").count(), 2);
        assert!(!out.contains("Pick"));
        assert!(!out.contains(": B"));
    }

    #[test]
    fn filter_removing_everything_resolves_nothing() {
        let registry = terminal_registry(ScriptedTerminal::lines(vec![Some("typed")]));
        let ctx = Context::new(&registry).unwrap();
        let none = |_: &Entry<&str>| false;
        assert_eq!(ctx.selectinput(&abc(), None, Some(&none)).unwrap(), None);
    }

    #[test]
    fn textinput_returns_text() {
        let registry = terminal_registry(ScriptedTerminal::lines(vec![Some("scratch\n")]));
        let ctx = Context::new(&registry).unwrap();
        assert_eq!(
            ctx.textinput(Some("Enter name")).unwrap().as_deref(),
            Some("scratch")
        );
    }

    #[test]
    fn textinput_empty_is_none() {
        let registry = terminal_registry(ScriptedTerminal::lines(vec![Some("\n")]));
        let ctx = Context::new(&registry).unwrap();
        assert_eq!(ctx.textinput(None).unwrap(), None);
    }

    #[test]
    fn textinput_interrupt_propagates() {
        let registry = terminal_registry(ScriptedTerminal::lines(vec![None, Some("late")]));
        let ctx = Context::new(&registry).unwrap();
        assert!(matches!(
            ctx.textinput(Some("Enter name")),
            Err(MenuError::NoInput)
        ));
    }

    #[test]
    fn picker_selection_through_context() {
        let mut registry = ProviderRegistry::new();
        registry
            .register("dmenu", script_picker("cat >/dev/null; printf '1: w1\\n'"), 20)
            .unwrap();
        let ctx = Context::new(&registry).unwrap();
        let menu = Menu::with_entries("Window", vec![Entry::new("w1", "w1"), Entry::new("w2", "w2")]);
        assert_eq!(ctx.selectinput(&menu, None, None).unwrap(), Some(&"w1"));
    }

    #[test]
    fn picker_cancel_propagates() {
        let mut registry = ProviderRegistry::new();
        registry.register("dmenu", script_picker("exit 1"), 20).unwrap();
        let ctx = Context::new(&registry).unwrap();
        assert!(matches!(
            ctx.selectinput(&abc(), None, None),
            Err(MenuError::NoInput)
        ));
    }

    #[test]
    fn best_provider_is_active() {
        let mut registry = terminal_registry(ScriptedTerminal::keys(""));
        registry.register("pickerA", script_picker("exit 1"), 20).unwrap();
        registry.register("pickerB", script_picker("exit 1"), 30).unwrap();
        let ctx = Context::new(&registry).unwrap();
        assert_eq!(ctx.active_name(), "pickerB");
    }

    #[test]
    fn explicit_provider_and_switching() {
        let mut registry = terminal_registry(ScriptedTerminal::keys("1"));
        registry.register("pickerB", script_picker("exit 1"), 30).unwrap();
        let mut ctx = Context::with_provider(&registry, "terminal").unwrap();
        assert_eq!(ctx.selectinput(&abc(), None, None).unwrap(), Some(&"A"));

        ctx.set_active("pickerB").unwrap();
        assert_eq!(ctx.active_name(), "pickerB");
        assert!(matches!(
            ctx.selectinput(&abc(), None, None),
            Err(MenuError::NoInput)
        ));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let registry = terminal_registry(ScriptedTerminal::keys(""));
        match Context::with_provider(&registry, "fzf") {
            Err(ContextError::UnknownProvider { name, available }) => {
                assert_eq!(name, "fzf");
                assert_eq!(available, "terminal");
            }
            _ => panic!("expected UnknownProvider"),
        }
        let mut ctx = Context::new(&registry).unwrap();
        assert!(ctx.set_active("fzf").is_err());
        assert_eq!(ctx.active_name(), "terminal");
    }

    #[test]
    fn empty_registry_has_no_context() {
        let registry = ProviderRegistry::new();
        assert!(matches!(Context::new(&registry), Err(ContextError::NoProvider)));
    }
}
