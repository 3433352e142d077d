//! Registered selection backends and their ranking.
//!
//! The registry is filled once at startup by [`ProviderRegistry::discover`]
//! and read-only afterwards.  Every record has a unique name and a priority;
//! the highest priority wins, and among equal priorities the provider
//! registered first wins.

use crate::config::MenuConfig;
use crate::provider::picker::{shell_quote, Dmenu, ExternalMenuProvider, Rofi};
use crate::provider::terminal::TerminalMenuProvider;
use crate::provider::Provider;
use log::{debug, info, warn};
use std::cmp::Reverse;
use std::path::PathBuf;

pub const TERMINAL: &str = "terminal";
pub const DMENU: &str = "dmenu";
pub const ROFI: &str = "rofi";

pub const DMENU_PRIORITY: i32 = 20;
pub const ROFI_PRIORITY: i32 = 30;

/// One registered provider.
pub struct ProviderRecord {
    name: String,
    provider: Provider,
    priority: i32,
}

impl ProviderRecord {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Errors from registering providers.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("provider {0:?} is already registered")]
    DuplicateName(String),
}

/// All constructed providers, keyed by name.
#[derive(Default)]
pub struct ProviderRegistry {
    records: Vec<ProviderRecord>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `provider` under `name`.  Names must be unique.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        provider: Provider,
        priority: i32,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(RegistryError::DuplicateName(name));
        }
        debug!("registered {} provider {:?} (priority {})", provider.kind(), name, priority);
        self.records.push(ProviderRecord {
            name,
            provider,
            priority,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ProviderRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Records in registration order.
    pub fn records(&self) -> &[ProviderRecord] {
        &self.records
    }

    /// Records from highest to lowest priority; ties keep registration order.
    pub fn ranked(&self) -> Vec<&ProviderRecord> {
        let mut ranked: Vec<&ProviderRecord> = self.records.iter().collect();
        ranked.sort_by_key(|r| Reverse(r.priority));
        ranked
    }

    /// The provider that should be active when nobody asks for a specific
    /// one.
    pub fn best(&self) -> Option<&ProviderRecord> {
        self.ranked().into_iter().next()
    }

    /// Names from highest to lowest priority.
    pub fn names(&self) -> Vec<&str> {
        self.ranked().into_iter().map(|r| r.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Register every picker found on `$PATH`, plus the terminal provider.
    pub fn discover(config: &MenuConfig) -> Self {
        Self::discover_with(config, |program| which::which(program).ok())
    }

    /// Like [`discover`](Self::discover), resolving programs with `lookup`.
    pub fn discover_with<L>(config: &MenuConfig, lookup: L) -> Self
    where
        L: Fn(&str) -> Option<PathBuf>,
    {
        let mut registry = Self::new();

        let pickers = [
            (DMENU, &config.dmenu, DMENU_PRIORITY),
            (ROFI, &config.rofi, ROFI_PRIORITY),
        ];
        for (name, picker, default_priority) in pickers {
            if picker.disabled {
                debug!("{} disabled by config", name);
                continue;
            }
            let program = picker.program.as_deref().unwrap_or(name);
            let Some(path) = lookup(program) else {
                debug!("{} not found on PATH", program);
                continue;
            };
            info!("found {} at {}", name, path.display());
            let program = shell_quote(&path.to_string_lossy());
            let provider = match name {
                DMENU => Provider::Dmenu(
                    ExternalMenuProvider::new(program, Dmenu, &config.title)
                        .with_extra_args(picker.args.clone()),
                ),
                _ => Provider::Rofi(
                    ExternalMenuProvider::new(program, Rofi, &config.title)
                        .with_extra_args(picker.args.clone()),
                ),
            };
            let priority = picker.priority.unwrap_or(default_priority);
            if let Err(e) = registry.register(name, provider, priority) {
                warn!("{}", e);
            }
        }

        let terminal = Provider::Terminal(TerminalMenuProvider::new(config.title.clone()));
        if let Err(e) = registry.register(TERMINAL, terminal, config.terminal_priority) {
            warn!("{}", e);
        }
        registry
    }
}
