use super::error::FilterSpecError;
use crate::category::{Category, CategoryRegistry};
use regex::{Regex, RegexBuilder};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Maximum number of colon separated fields in a filter spec.
pub const MAX_FIELDS: usize = 5;

/// What happens to a warning matched by a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Escalate the warning into an error returned to the emitter
    Error,
    /// Drop the warning
    Ignore,
    /// Record every occurrence
    Always,
    /// Record once per (message, category, line) in each module
    Default,
    /// Record once per (message, category) in each module
    Module,
    /// Record once per (message, category), wherever it comes from
    Once,
}

impl Action {
    /// Keywords in resolution order; a prefix resolves to the first match.
    const KEYWORDS: [(&'static str, Action); 6] = [
        ("default", Action::Default),
        ("always", Action::Always),
        ("ignore", Action::Ignore),
        ("module", Action::Module),
        ("once", Action::Once),
        ("error", Action::Error),
    ];

    pub fn keyword(&self) -> &'static str {
        match self {
            Action::Error => "error",
            Action::Ignore => "ignore",
            Action::Always => "always",
            Action::Default => "default",
            Action::Module => "module",
            Action::Once => "once",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    /// Empty input means `default`; otherwise any prefix of a keyword is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(Action::Default);
        }
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| keyword.starts_with(s))
            .map(|(_, action)| *action)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A compiled message or module pattern that remembers its source text.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile `source` so it matches at the start of the subject only.
    pub fn new(source: &str, case_insensitive: bool) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&format!("^(?:{})", source))
            .case_insensitive(case_insensitive)
            .build()?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.regex.is_match(subject)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

/// A single warning filter: the parsed form of one filter spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterRule {
    pub action: Action,
    /// Case-insensitive, matched against the start of the warning text
    pub message: Option<Pattern>,
    pub category: Category,
    /// Case-sensitive, matched against the start of the module name
    pub module: Option<Pattern>,
    /// 0 matches every line
    pub lineno: u64,
}

impl FilterRule {
    /// A rule that matches every warning.
    pub fn catch_all(action: Action, registry: &CategoryRegistry) -> Self {
        FilterRule {
            action,
            message: None,
            category: registry.root(),
            module: None,
            lineno: 0,
        }
    }

    /// Parse an `action:message:category:module:lineno` spec.
    ///
    /// `message` and `module` are used as regular expressions exactly as
    /// written; callers wanting literal matches must escape them themselves.
    pub fn parse(spec: &str, registry: &CategoryRegistry) -> Result<Self, FilterSpecError> {
        let fields = SpecFields::split(spec)?;
        Self::build(spec, fields, registry, |s| s.to_string(), |s| s.to_string())
    }

    /// Parse a spec given on the command line.
    ///
    /// Unlike [`FilterRule::parse`], `message` and `module` are matched
    /// literally and the module must match in full.
    pub fn parse_option(spec: &str, registry: &CategoryRegistry) -> Result<Self, FilterSpecError> {
        let fields = SpecFields::split(spec)?;
        Self::build(spec, fields, registry, regex::escape, |s| {
            format!(r"{}\z", regex::escape(s))
        })
    }

    fn build(
        spec: &str,
        fields: SpecFields<'_>,
        registry: &CategoryRegistry,
        message_source: impl Fn(&str) -> String,
        module_source: impl Fn(&str) -> String,
    ) -> Result<Self, FilterSpecError> {
        let action: Action = fields
            .action
            .parse()
            .map_err(|action| FilterSpecError::InvalidAction {
                spec: spec.to_string(),
                action,
            })?;

        let category =
            registry
                .lookup(fields.category)
                .ok_or_else(|| FilterSpecError::UnknownCategory {
                    spec: spec.to_string(),
                    category: fields.category.to_string(),
                })?;

        let lineno = parse_lineno(fields.lineno).ok_or_else(|| FilterSpecError::InvalidLineno {
            spec: spec.to_string(),
            lineno: fields.lineno.to_string(),
        })?;

        let message = compile(spec, "message", fields.message, true, message_source)?;
        let module = compile(spec, "module", fields.module, false, module_source)?;

        Ok(FilterRule {
            action,
            message,
            category,
            module,
            lineno,
        })
    }
}

/// The five trimmed fields of a spec; missing trailing fields are empty.
#[derive(Debug, Default, PartialEq, Eq)]
struct SpecFields<'a> {
    action: &'a str,
    message: &'a str,
    category: &'a str,
    module: &'a str,
    lineno: &'a str,
}

impl<'a> SpecFields<'a> {
    fn split(spec: &'a str) -> Result<Self, FilterSpecError> {
        let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
        if parts.len() > MAX_FIELDS {
            return Err(FilterSpecError::TooManyFields {
                spec: spec.to_string(),
            });
        }
        let field = |idx: usize| parts.get(idx).copied().unwrap_or("");
        Ok(SpecFields {
            action: field(0),
            message: field(1),
            category: field(2),
            module: field(3),
            lineno: field(4),
        })
    }
}

/// Any base-10 integer that is not negative. Values too large for `u64`
/// saturate, which still matches no real line.
fn parse_lineno(raw: &str) -> Option<u64> {
    if raw.is_empty() {
        return Some(0);
    }
    let (negative, digits) = match raw.as_bytes()[0] {
        b'-' => (true, &raw[1..]),
        b'+' => (false, &raw[1..]),
        _ => (false, raw),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = digits
        .bytes()
        .try_fold(0u64, |acc, b| {
            acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
        })
        .unwrap_or(u64::MAX);
    if negative && value != 0 {
        return None;
    }
    Some(value)
}

fn compile(
    spec: &str,
    field: &'static str,
    raw: &str,
    case_insensitive: bool,
    source: impl Fn(&str) -> String,
) -> Result<Option<Pattern>, FilterSpecError> {
    if raw.is_empty() {
        return Ok(None);
    }
    Pattern::new(&source(raw), case_insensitive)
        .map(Some)
        .map_err(|e| FilterSpecError::InvalidPattern {
            spec: spec.to_string(),
            field,
            reason: e.to_string(),
        })
}
