use super::parser::{Action, FilterRule};
use crate::category::{Category, CategoryRegistry};
use crate::warning::{CapturedWarning, Warning};
use log::{debug, trace};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// A warning that hit an `error` filter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}: {}", .warning.category, .warning.message)]
pub struct EscalatedWarning {
    pub warning: Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RegistryKey {
    text: String,
    category: Category,
    lineno: u32,
}

/// Warnings already shown from one module, valid for one filter version.
#[derive(Debug, Clone, Default, PartialEq)]
struct ModuleRegistry {
    version: u64,
    seen: HashSet<RegistryKey>,
}

/// The ordered filter list plus the bookkeeping needed for the
/// `once`, `module` and `default` actions.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Checked front to back; the most recently installed rule is first
    filters: Vec<FilterRule>,
    default_action: Action,
    once_registry: HashSet<(String, Category)>,
    module_registries: HashMap<String, ModuleRegistry>,
    version: u64,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            default_action: Action::Default,
            once_registry: HashSet::new(),
            module_registries: HashMap::new(),
            version: 0,
        }
    }
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules in the order they are checked.
    pub fn filters(&self) -> &[FilterRule] {
        &self.filters
    }

    /// Install `rule` ahead of every existing rule. An equal rule already
    /// present is moved rather than duplicated.
    pub fn insert(&mut self, rule: FilterRule) {
        self.filters.retain(|existing| existing != &rule);
        self.filters.insert(0, rule);
        self.filters_mutated();
    }

    /// Install a rule matching every warning.
    pub fn simplefilter(&mut self, action: Action, registry: &CategoryRegistry) {
        self.insert(FilterRule::catch_all(action, registry));
    }

    fn filters_mutated(&mut self) {
        self.version += 1;
    }

    /// Open a capture scope over this state.
    ///
    /// Until the returned guard is dropped, warnings emitted through it are
    /// recorded instead of printed. Dropping it restores this state exactly
    /// as it was, registries included.
    pub fn catch_warnings(&mut self) -> WarningScope<'_> {
        let saved = self.clone();
        self.filters_mutated();
        debug!("warning capture scope opened ({} filters)", self.filters.len());
        WarningScope {
            state: self,
            saved: Some(saved),
            log: Vec::new(),
        }
    }

    /// Emit a warning outside any capture scope; survivors go to stderr.
    pub fn warn_explicit(&mut self, warning: Warning) -> Result<(), EscalatedWarning> {
        if let Some(shown) = self.filter(warning)? {
            eprint!("{}", CapturedWarning::from(shown).format());
        }
        Ok(())
    }

    /// Apply the filter list to one occurrence.
    ///
    /// `Ok(Some(_))` means the warning should be shown, `Ok(None)` that it
    /// was suppressed.
    fn filter(&mut self, warning: Warning) -> Result<Option<Warning>, EscalatedWarning> {
        let key = RegistryKey {
            text: warning.message.clone(),
            category: warning.category.clone(),
            lineno: warning.lineno,
        };

        let version = self.version;
        let registry = self
            .module_registries
            .entry(warning.module.clone())
            .or_default();
        if registry.version != version {
            registry.seen.clear();
            registry.version = version;
        }
        if registry.seen.contains(&key) {
            return Ok(None);
        }

        let action = self
            .filters
            .iter()
            .find(|rule| rule.matches(&warning))
            .map(|rule| rule.action)
            .unwrap_or(self.default_action);

        match action {
            Action::Ignore => return Ok(None),
            Action::Error => return Err(EscalatedWarning { warning }),
            Action::Once => {
                registry.seen.insert(key);
                let once_key = (warning.message.clone(), warning.category.clone());
                if !self.once_registry.insert(once_key) {
                    return Ok(None);
                }
            }
            Action::Always => {}
            Action::Module => {
                registry.seen.insert(key);
                let module_key = RegistryKey {
                    text: warning.message.clone(),
                    category: warning.category.clone(),
                    lineno: 0,
                };
                if !registry.seen.insert(module_key) {
                    return Ok(None);
                }
            }
            Action::Default => {
                registry.seen.insert(key);
            }
        }

        Ok(Some(warning))
    }
}

/// Exclusive capture scope over a [`FilterState`].
///
/// Dropping the scope, normally or while unwinding, puts the state back the
/// way it was when the scope was opened.
#[derive(Debug)]
pub struct WarningScope<'a> {
    state: &'a mut FilterState,
    saved: Option<FilterState>,
    log: Vec<CapturedWarning>,
}

impl WarningScope<'_> {
    /// Emit a warning attributed to the caller.
    #[track_caller]
    pub fn warn(
        &mut self,
        category: Category,
        message: impl Into<String>,
    ) -> Result<(), EscalatedWarning> {
        self.warn_explicit(Warning::new(category, message))
    }

    /// Emit a fully described warning.
    pub fn warn_explicit(&mut self, warning: Warning) -> Result<(), EscalatedWarning> {
        if let Some(shown) = self.state.filter(warning)? {
            trace!(
                "recorded {}: {} ({}:{})",
                shown.category, shown.message, shown.filename, shown.lineno
            );
            self.log.push(shown.into());
        }
        Ok(())
    }

    pub fn insert(&mut self, rule: FilterRule) {
        self.state.insert(rule);
    }

    pub fn simplefilter(&mut self, action: Action, registry: &CategoryRegistry) {
        self.state.simplefilter(action, registry);
    }

    pub fn state(&self) -> &FilterState {
        self.state
    }

    /// Warnings recorded so far, in emission order.
    pub fn log(&self) -> &[CapturedWarning] {
        &self.log
    }

    /// Close the scope and hand back what it recorded.
    pub fn finish(mut self) -> Vec<CapturedWarning> {
        std::mem::take(&mut self.log)
    }
}

impl Drop for WarningScope<'_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            *self.state = saved;
            debug!("warning capture scope closed");
        }
    }
}
