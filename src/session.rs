use crate::capture::{CaptureError, TestItem, WarningCapture, WarningReport};
use crate::category::Category;
use crate::filter::{FilterState, WarningScope};

/// Runs tests one after another, each inside its own capture scope, and
/// collects the surviving warnings into a single report.
#[derive(Debug, Default)]
pub struct TestSession {
    state: FilterState,
    capture: WarningCapture,
    report: WarningReport,
}

impl TestSession {
    pub fn new(capture: WarningCapture) -> Self {
        Self {
            state: FilterState::new(),
            capture,
            report: WarningReport::new(),
        }
    }

    /// Start from an existing filter state, e.g. one with process-wide
    /// filters already installed.
    pub fn with_state(mut self, state: FilterState) -> Self {
        self.state = state;
        self
    }

    pub fn run<T, F>(&mut self, item: &TestItem, body: F) -> Result<T, CaptureError>
    where
        F: FnOnce(&mut WarningScope<'_>) -> T,
    {
        self.capture
            .around(&mut self.state, item, &mut self.report, body)
    }

    /// Resolve a category through the session's registry.
    pub fn category(&self, name: &str) -> Option<Category> {
        self.capture.registry().lookup(name)
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn report(&self) -> &WarningReport {
        &self.report
    }

    pub fn into_report(self) -> WarningReport {
        self.report
    }
}
