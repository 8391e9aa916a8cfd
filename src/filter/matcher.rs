use super::parser::FilterRule;
use crate::warning::Warning;

impl FilterRule {
    /// Whether this rule applies to `warning`.
    ///
    /// Empty message/module patterns and a zero lineno match anything; the
    /// category matches itself and every descendant.
    pub fn matches(&self, warning: &Warning) -> bool {
        self.message
            .as_ref()
            .is_none_or(|pattern| pattern.is_match(&warning.message))
            && warning.category.is_subclass_of(&self.category)
            && self
                .module
                .as_ref()
                .is_none_or(|pattern| pattern.is_match(&warning.module))
            && (self.lineno == 0 || self.lineno == u64::from(warning.lineno))
    }
}
