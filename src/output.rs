use tabled::settings::Style;
use tabled::{Table, Tabled};
use termtree::Tree;

use crate::tags::{KeyValueTags, TagDiff};

#[derive(Tabled)]
struct TagRow {
    #[tabled(rename = "KEY")]
    key: String,
    #[tabled(rename = "VALUE")]
    value: String,
}

pub fn tags_table(tags: &KeyValueTags) -> String {
    if tags.is_empty() {
        return "(no tags)".to_string();
    }

    let rows = tags.iter().map(|(key, value)| TagRow {
        key: key.to_string(),
        value: value.to_string(),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn tags_json(tags: &KeyValueTags) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tags)
}

/// Renders the pending calls for `identifier` as a tree, untag branch first.
pub fn plan_tree(identifier: &str, diff: &TagDiff) -> String {
    if diff.is_empty() {
        return format!("{}: no changes", identifier);
    }

    let mut root = Tree::new(identifier.to_string());

    if !diff.removed.is_empty() {
        root.push(Tree::new("untag".to_string()).with_leaves(diff.removed.iter().cloned()));
    }

    if !diff.updated.is_empty() {
        root.push(
            Tree::new("tag".to_string()).with_leaves(
                diff.updated
                    .iter()
                    .map(|(key, value)| format!("{} = {}", key, value)),
            ),
        );
    }

    root.to_string()
}
