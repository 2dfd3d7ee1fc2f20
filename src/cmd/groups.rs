/*!
`groups.rs`

One-shot subcommands over the resource groups of the subscription:

  azrg groups     [--json]   list groups (Name | Location | Tags)
  azrg check NAME [--json]   name validity + whether the name is in use
  azrg locations  [--json]   locations available to the subscription

JSON Output Shapes:

  {"status":"ok","count":2,"groups":[{ <resource group> }, ...]}
  {"status":"ok","name":"rg-x","valid":true,"in_use":false}
  {"status":"ok","count":60,"locations":[{"name":"westeurope","displayName":"West Europe"}, ...]}
*/

use anyhow::Result;
use clap::Args;
use std::io::{self, Write};

use crate::arm::ResourceManager;
use crate::cmd::format::{Role, StyleOptions, box_header, color};
use crate::cmd::shared::{connect, print_json};
use crate::cmd::tables::{groups_table, locations_line};
use crate::config::Settings;
use crate::validate::is_valid_resource_group_name;

#[derive(Args, Debug)]
pub struct GroupsArgs {
    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Resource group name to check
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LocationsArgs {
    /// Output JSON instead of human-readable text
    #[arg(long)]
    pub json: bool,
}

pub fn execute_groups(args: GroupsArgs, settings: &Settings) -> Result<()> {
    let conn = connect(settings)?;
    render_groups(&conn.client, args.json, &StyleOptions::detect(), &mut io::stdout())
}

pub fn execute_check(args: CheckArgs, settings: &Settings) -> Result<()> {
    let conn = connect(settings)?;
    render_check(
        &conn.client,
        &args.name,
        args.json,
        &StyleOptions::detect(),
        &mut io::stdout(),
    )
}

pub fn execute_locations(args: LocationsArgs, settings: &Settings) -> Result<()> {
    let conn = connect(settings)?;
    render_locations(&conn.client, args.json, &mut io::stdout())
}

fn render_groups<M: ResourceManager>(
    mgr: &M,
    json: bool,
    style: &StyleOptions,
    out: &mut impl Write,
) -> Result<()> {
    let groups = mgr.list_groups()?;
    if json {
        return print_json(
            out,
            &serde_json::json!({
                "status": "ok",
                "count": groups.len(),
                "groups": groups,
            }),
        );
    }

    writeln!(
        out,
        "{}",
        box_header(format!("Resource groups ({})", groups.len()), None::<&str>, style)
    )?;
    if groups.is_empty() {
        writeln!(out, "{}", color(Role::Dim, "(none)", style))?;
    } else {
        writeln!(out, "{}", groups_table(&groups, style))?;
    }
    Ok(())
}

fn render_check<M: ResourceManager>(
    mgr: &M,
    name: &str,
    json: bool,
    style: &StyleOptions,
    out: &mut impl Write,
) -> Result<()> {
    let name = name.trim();
    let valid = is_valid_resource_group_name(name);
    // An invalid name can never be in use; skip the round trip.
    let in_use = valid && mgr.group_exists(name)?;

    if json {
        return print_json(
            out,
            &serde_json::json!({
                "status": "ok",
                "name": name,
                "valid": valid,
                "in_use": in_use,
            }),
        );
    }

    if !valid {
        writeln!(
            out,
            "{}",
            color(Role::Warning, format!(r#"> "{name}" is not a valid resource group name"#), style)
        )?;
    }
    let verdict = if in_use { "is in use" } else { "is not in use" };
    writeln!(
        out,
        r#"> Check result: resource group name "{name}" {verdict}"#
    )?;
    Ok(())
}

fn render_locations<M: ResourceManager>(mgr: &M, json: bool, out: &mut impl Write) -> Result<()> {
    let locations = mgr.list_locations()?;
    if json {
        return print_json(
            out,
            &serde_json::json!({
                "status": "ok",
                "count": locations.len(),
                "locations": locations,
            }),
        );
    }
    writeln!(out, "{}", locations_line(&locations))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::memory::InMemoryManager;

    fn capture(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn groups_json_shape() {
        let mgr = InMemoryManager::new().with_group("rg-a", "eastus", &[("env", "dev")]);
        let out = capture(|o| render_groups(&mgr, true, &StyleOptions::plain(100), o));
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["status"], "ok");
        assert_eq!(v["count"], 1);
        assert_eq!(v["groups"][0]["name"], "rg-a");
        assert_eq!(v["groups"][0]["tags"]["env"], "dev");
    }

    #[test]
    fn groups_human_output() {
        let mgr = InMemoryManager::new();
        let out = capture(|o| render_groups(&mgr, false, &StyleOptions::plain(100), o));
        assert!(out.contains("Resource groups (0)"));
        assert!(out.contains("(none)"));
    }

    #[test]
    fn check_skips_api_for_invalid_names() {
        let mgr = InMemoryManager::new().with_group("rg-a", "eastus", &[]);
        let out = capture(|o| render_check(&mgr, "bad name.", true, &StyleOptions::plain(100), o));
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["valid"], false);
        assert_eq!(v["in_use"], false);
        assert!(mgr.calls().is_empty());

        let out = capture(|o| render_check(&mgr, "rg-a", false, &StyleOptions::plain(100), o));
        assert!(out.contains(r#"> Check result: resource group name "rg-a" is in use"#));
    }

    #[test]
    fn locations_listing() {
        let mgr = InMemoryManager::new();
        let out = capture(|o| render_locations(&mgr, false, o));
        assert_eq!(out, "westeurope, northeurope, eastus\n");
    }
}
