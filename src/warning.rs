use crate::category::Category;
use serde::Serialize;
use std::panic::Location;
use std::path::{Component, Path, PathBuf};

/// A warning as emitted by code under test, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    pub category: Category,
    pub filename: String,
    pub lineno: u32,
    /// Matched against module patterns of filters
    pub module: String,
    pub source_line: Option<String>,
}

impl Warning {
    /// A warning attributed to the caller's source location.
    #[track_caller]
    pub fn new(category: Category, message: impl Into<String>) -> Self {
        let caller = Location::caller();
        Self::at(category, message, caller.file(), caller.line())
    }

    /// A warning attributed to an explicit location.
    ///
    /// The module name defaults to the file name without its extension.
    pub fn at(
        category: Category,
        message: impl Into<String>,
        filename: impl Into<String>,
        lineno: u32,
    ) -> Self {
        let filename = filename.into();
        let module = module_from_filename(&filename);
        Self {
            message: message.into(),
            category,
            filename,
            lineno,
            module,
            source_line: None,
        }
    }

    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn with_source_line(mut self, line: impl Into<String>) -> Self {
        self.source_line = Some(line.into());
        self
    }
}

fn module_from_filename(filename: &str) -> String {
    if filename.is_empty() {
        return "<unknown>".to_string();
    }
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains(['/', '\\']) => stem.to_string(),
        _ => filename.to_string(),
    }
}

/// A warning that survived filtering inside a capture scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapturedWarning {
    pub message: String,
    pub category: Category,
    pub filename: String,
    pub lineno: u32,
    pub source_line: Option<String>,
}

impl From<Warning> for CapturedWarning {
    fn from(warning: Warning) -> Self {
        Self {
            message: warning.message,
            category: warning.category,
            filename: warning.filename,
            lineno: warning.lineno,
            source_line: warning.source_line,
        }
    }
}

impl CapturedWarning {
    /// Standard warning text with the file path made relative to the
    /// current directory.
    pub fn format(&self) -> String {
        format_warning(
            &self.message,
            &self.category,
            &relative_to_cwd(Path::new(&self.filename)),
            self.lineno,
            self.source_line.as_deref(),
        )
    }
}

/// `file:line: Category: message`, followed by the trimmed source line
/// when one is known.
pub fn format_warning(
    message: &str,
    category: &Category,
    filename: &str,
    lineno: u32,
    line: Option<&str>,
) -> String {
    let mut text = format!("{}:{}: {}: {}\n", filename, lineno, category, message);
    if let Some(line) = line.map(str::trim).filter(|l| !l.is_empty()) {
        text.push_str("  ");
        text.push_str(line);
        text.push('\n');
    }
    text
}

/// Express `path` relative to the current working directory.
pub fn relative_to_cwd(path: &Path) -> String {
    match std::env::current_dir() {
        Ok(cwd) => relative_to(path, &cwd).display().to_string(),
        Err(_) => path.display().to_string(),
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    if !path.is_absolute() {
        return normalize(path);
    }
    let path = normalize(path);
    let base = normalize(base);

    let path_parts: Vec<Component> = path.components().collect();
    let base_parts: Vec<Component> = base.components().collect();
    let common = path_parts
        .iter()
        .zip(&base_parts)
        .take_while(|(a, b)| a == b)
        .count();

    // Different roots (e.g. other drive): nothing to be relative to.
    if common == 0 {
        return path;
    }

    let mut relative = PathBuf::new();
    for _ in common..base_parts.len() {
        relative.push("..");
    }
    for part in &path_parts[common..] {
        relative.push(part.as_os_str());
    }
    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    relative
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                // `..` above the root is the root itself
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
