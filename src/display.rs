use crate::capture::{FilterOrigin, ResolvedFilter};
use crate::category::CategoryRegistry;
use crate::filter::{Action, FilterRule};
use colored::Colorize;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use serde_json::json;
use std::fmt::Write as _;

/// One row of the effective filter list, highest precedence first.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRow<'a> {
    pub origin: Option<FilterOrigin>,
    pub spec: Option<&'a str>,
    pub rule: &'a FilterRule,
}

/// Order resolved filters the way they are checked at warning time:
/// last installed first, with the record-once baseline last.
pub fn precedence_order<'a>(
    resolved: &'a [ResolvedFilter],
    baseline: &'a FilterRule,
) -> Vec<FilterRow<'a>> {
    resolved
        .iter()
        .rev()
        .map(|filter| FilterRow {
            origin: Some(filter.origin),
            spec: Some(filter.spec.as_str()),
            rule: &filter.rule,
        })
        .chain(std::iter::once(FilterRow {
            origin: None,
            spec: None,
            rule: baseline,
        }))
        .collect()
}

pub fn create_styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.iter().map(|h| Cell::new(h.bold())));
    table
}

fn colored_action(action: Action) -> String {
    let keyword = action.keyword();
    match action {
        Action::Error => keyword.red().bold().to_string(),
        Action::Ignore => keyword.dimmed().to_string(),
        Action::Always => keyword.yellow().to_string(),
        Action::Default | Action::Module | Action::Once => keyword.cyan().to_string(),
    }
}

fn origin_label(origin: Option<FilterOrigin>) -> &'static str {
    match origin {
        Some(FilterOrigin::CommandLine) => "-W",
        Some(FilterOrigin::ConfigFile) => "config",
        None => "baseline",
    }
}

/// Text rendering of the effective filter list.
pub fn format_filters_text(rows: &[FilterRow<'_>]) -> String {
    let mut table = create_styled_table(&[
        "#", "Origin", "Action", "Message", "Category", "Module", "Line",
    ]);
    for (idx, row) in rows.iter().enumerate() {
        let rule = row.rule;
        table.add_row(vec![
            Cell::new(idx + 1),
            Cell::new(origin_label(row.origin)),
            Cell::new(colored_action(rule.action)),
            Cell::new(rule.message.as_ref().map_or("*", |p| p.as_str())),
            Cell::new(rule.category.name()),
            Cell::new(rule.module.as_ref().map_or("*", |p| p.as_str())),
            Cell::new(if rule.lineno == 0 {
                "*".to_string()
            } else {
                rule.lineno.to_string()
            }),
        ]);
    }

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Warning filters (checked top to bottom)".bold());
    let _ = writeln!(out, "{table}");
    out
}

pub fn format_filters_json(rows: &[FilterRow<'_>]) -> Result<String, serde_json::Error> {
    let filters: Vec<_> = rows
        .iter()
        .map(|row| {
            json!({
                "origin": row.origin.map(|o| origin_label(Some(o))),
                "spec": row.spec,
                "rule": row.rule,
            })
        })
        .collect();
    serde_json::to_string_pretty(&json!({ "filters": filters }))
}

pub fn format_categories_text(registry: &CategoryRegistry) -> String {
    let mut table = create_styled_table(&["Category", "Parent"]);
    for category in registry.iter() {
        table.add_row(vec![
            Cell::new(category.name()),
            Cell::new(category.parent().unwrap_or("-")),
        ]);
    }
    format!("{table}\n")
}

pub fn format_categories_json(
    registry: &CategoryRegistry,
) -> Result<String, serde_json::Error> {
    let categories: Vec<_> = registry
        .iter()
        .map(|category| json!({ "name": category.name(), "parent": category.parent() }))
        .collect();
    serde_json::to_string_pretty(&json!({ "categories": categories }))
}
