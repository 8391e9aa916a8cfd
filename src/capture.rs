//! Per-test warning capture
//!
//! [`WarningCapture::around`] wraps one test body: it opens a capture scope,
//! installs the configured filters, runs the body and reports every warning
//! recorded along the way to a [`ReportSink`].

use crate::category::{CategoryError, CategoryRegistry};
use crate::config::WarningsConfig;
use crate::filter::{Action, FilterRule, FilterSpecError, FilterState, WarningScope};
use crate::warning::CapturedWarning;
use log::debug;
use serde::Serialize;
use std::fmt::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use thiserror::Error;

/// Code attached to every warning submitted to the report sink.
pub const REPORT_CODE: &str = "W0";

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Filter(#[from] FilterSpecError),

    #[error("Failed to register warning category: {0}")]
    Category(#[from] CategoryError),
}

/// Identity of the test being run, as far as reporting needs it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestItem {
    pub nodeid: String,
    /// File and line of the test definition
    pub location: Option<(String, u32)>,
    pub fspath: Option<PathBuf>,
}

impl TestItem {
    pub fn new(nodeid: impl Into<String>) -> Self {
        Self {
            nodeid: nodeid.into(),
            ..Self::default()
        }
    }

    pub fn with_location(mut self, file: impl Into<String>, line: u32) -> Self {
        self.location = Some((file.into(), line));
        self
    }

    pub fn with_fspath(mut self, path: impl Into<PathBuf>) -> Self {
        self.fspath = Some(path.into());
        self
    }

    /// Header placed above each warning recorded while this test ran.
    pub fn location_annotation(&self) -> String {
        let place = match (&self.location, &self.fspath) {
            (Some((file, line)), _) => format!("{}:{}", file, line),
            (None, Some(path)) => path.display().to_string(),
            (None, None) => return String::new(),
        };
        format!("in {} the following warning was recorded:\n", place)
    }
}

/// Run-wide collector of diagnostic entries.
pub trait ReportSink {
    fn warn(&mut self, code: &str, message: &str, location: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub code: String,
    pub message: String,
    pub location: String,
}

/// In-memory [`ReportSink`] that keeps entries in submission order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WarningReport {
    entries: Vec<ReportEntry>,
}

impl ReportSink for WarningReport {
    fn warn(&mut self, code: &str, message: &str, location: &str) {
        self.entries.push(ReportEntry {
            code: code.to_string(),
            message: message.to_string(),
            location: location.to_string(),
        });
    }
}

impl WarningReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Plain text "warnings summary" section, empty when nothing was reported.
    pub fn render_summary(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let mut out = format!("{:=^80}\n", " warnings summary ");
        for entry in &self.entries {
            let _ = write!(out, "{}{}", entry.location, entry.message);
        }
        out
    }
}

/// Where a filter spec came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterOrigin {
    /// Repeatable `-W` command line option
    CommandLine,
    /// `filterwarnings` in the configuration file
    ConfigFile,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedFilter {
    pub origin: FilterOrigin,
    pub spec: String,
    pub rule: FilterRule,
}

/// Wraps test bodies with a warning capture scope.
#[derive(Debug, Clone, Default)]
pub struct WarningCapture {
    registry: CategoryRegistry,
    option_filters: Vec<String>,
    config_filters: Vec<String>,
}

impl WarningCapture {
    pub fn new(registry: CategoryRegistry) -> Self {
        Self {
            registry,
            option_filters: Vec::new(),
            config_filters: Vec::new(),
        }
    }

    /// Build from `-W` options plus a loaded configuration, registering the
    /// configuration's custom categories first.
    pub fn from_config(
        option_filters: Vec<String>,
        config: &WarningsConfig,
    ) -> Result<Self, CaptureError> {
        let mut registry = CategoryRegistry::with_builtins();
        for category in &config.categories {
            registry.register(&category.name, &category.parent)?;
        }
        Ok(Self::new(registry)
            .with_option_filters(option_filters)
            .with_config_filters(config.filterwarnings.lines().to_vec()))
    }

    pub fn with_option_filters(mut self, specs: Vec<String>) -> Self {
        self.option_filters = specs;
        self
    }

    pub fn with_config_filters(mut self, specs: Vec<String>) -> Self {
        self.config_filters = specs;
        self
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// Parse every configured spec, in installation order.
    ///
    /// Option specs are matched literally; config specs are used as
    /// regular expressions. Installation order means config filters end up
    /// checked before option filters.
    pub fn resolve_filters(&self) -> Result<Vec<ResolvedFilter>, FilterSpecError> {
        let options = self.option_filters.iter().map(|spec| {
            FilterRule::parse_option(spec, &self.registry).map(|rule| ResolvedFilter {
                origin: FilterOrigin::CommandLine,
                spec: spec.clone(),
                rule,
            })
        });
        let configured = self.config_filters.iter().map(|spec| {
            FilterRule::parse(spec, &self.registry).map(|rule| ResolvedFilter {
                origin: FilterOrigin::ConfigFile,
                spec: spec.clone(),
                rule,
            })
        });
        options.chain(configured).collect()
    }

    /// Reset `scope` to record-once and install the configured filters.
    pub fn install(&self, scope: &mut WarningScope<'_>) -> Result<(), FilterSpecError> {
        scope.simplefilter(Action::Once, &self.registry);
        for resolved in self.resolve_filters()? {
            debug!(
                "installing {:?} filter '{}'",
                resolved.origin, resolved.spec
            );
            scope.insert(resolved.rule);
        }
        Ok(())
    }

    /// Run `next` inside a fresh capture scope and report what it recorded.
    ///
    /// The body's own result is passed through untouched. A panic in the
    /// body still gets its warnings reported before it resumes. A bad filter
    /// spec fails before the body runs.
    pub fn around<T, F>(
        &self,
        state: &mut FilterState,
        item: &TestItem,
        sink: &mut dyn ReportSink,
        next: F,
    ) -> Result<T, CaptureError>
    where
        F: FnOnce(&mut WarningScope<'_>) -> T,
    {
        let (log, outcome) = {
            let mut scope = state.catch_warnings();
            self.install(&mut scope)?;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| next(&mut scope)));
            (scope.finish(), outcome)
        };

        report(item, &log, sink);

        match outcome {
            Ok(value) => Ok(value),
            Err(payload) => panic::resume_unwind(payload),
        }
    }
}

fn report(item: &TestItem, log: &[CapturedWarning], sink: &mut dyn ReportSink) {
    if log.is_empty() {
        return;
    }
    debug!("{} warning(s) recorded in {}", log.len(), item.nodeid);
    let location = item.location_annotation();
    for warning in log {
        sink.warn(REPORT_CODE, &warning.format(), &location);
    }
}
