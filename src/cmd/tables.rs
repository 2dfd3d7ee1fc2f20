//! Table / text rendering for resource groups, resources, locations and tags.

use chrono::{DateTime, Utc};

use crate::arm::{GenericResource, Location, ResourceGroup, Tags};
use crate::cmd::format::{StyleOptions, TableOpts, table};

pub fn groups_table(groups: &[ResourceGroup], style: &StyleOptions) -> String {
    let rows: Vec<Vec<String>> = groups
        .iter()
        .map(|g| {
            vec![
                g.name.clone(),
                g.location.clone(),
                g.tags.as_ref().map(format_tags).unwrap_or_default(),
            ]
        })
        .collect();
    table(&["Name", "Location", "Tags"], &rows, TableOpts::default(), style)
}

pub fn resources_table(resources: &[GenericResource], style: &StyleOptions) -> String {
    let rows: Vec<Vec<String>> = resources
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.kind.clone(),
                format_time(r.created_time.as_ref()),
                format_time(r.changed_time.as_ref()),
            ]
        })
        .collect();
    table(
        &["Name", "Type", "Created time", "Changed time"],
        &rows,
        TableOpts::default(),
        style,
    )
}

/// `westeurope, northeurope, ...`
pub fn locations_line(locations: &[Location]) -> String {
    locations
        .iter()
        .map(|l| l.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `{"env": "prod", "owner": "ops"}`; `{}` when empty.
pub fn format_tags(tags: &Tags) -> String {
    let body = tags
        .iter()
        .map(|(k, v)| format!("\"{k}\": \"{v}\""))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{body}}}")
}

fn format_time(t: Option<&DateTime<Utc>>) -> String {
    t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
