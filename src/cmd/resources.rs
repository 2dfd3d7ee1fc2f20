/*!
`resources.rs`

  azrg resources GROUP [--json]

Lists the resources of one group (Name | Type | Created time | Changed time).
Fails when the group does not exist.

JSON Output Shape:
{
  "status": "ok",
  "group": "rg-app",
  "count": 2,
  "resources": [{ "name": "...", "type": "...", "createdTime": "...", "changedTime": "..." }]
}
*/

use anyhow::{Result, bail};
use clap::Args;
use std::io::{self, Write};

use crate::arm::ResourceManager;
use crate::cmd::format::{Role, StyleOptions, box_header, color};
use crate::cmd::shared::{connect, print_json};
use crate::cmd::tables::resources_table;
use crate::config::Settings;

#[derive(Args, Debug)]
pub struct ResourcesArgs {
    /// Resource group whose resources are listed
    #[arg(value_name = "GROUP")]
    pub group: String,

    /// Output JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub fn execute_resources(args: ResourcesArgs, settings: &Settings) -> Result<()> {
    let conn = connect(settings)?;
    render_resources(
        &conn.client,
        &args.group,
        args.json,
        &StyleOptions::detect(),
        &mut io::stdout(),
    )
}

fn render_resources<M: ResourceManager>(
    mgr: &M,
    group: &str,
    json: bool,
    style: &StyleOptions,
    out: &mut impl Write,
) -> Result<()> {
    let group = group.trim();
    if group.is_empty() || !mgr.group_exists(group)? {
        bail!("resource group \"{group}\" not found");
    }
    let resources = mgr.list_resources(group)?;

    if json {
        return print_json(
            out,
            &serde_json::json!({
                "status": "ok",
                "group": group,
                "count": resources.len(),
                "resources": resources,
            }),
        );
    }

    writeln!(
        out,
        "{}",
        box_header(
            format!("Resources ({})", resources.len()),
            Some(format!("group={group}")),
            style
        )
    )?;
    if resources.is_empty() {
        writeln!(out, "{}", color(Role::Dim, "(none)", style))?;
    } else {
        writeln!(out, "{}", resources_table(&resources, style))?;
    }
    Ok(())
}
