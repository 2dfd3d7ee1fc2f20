//! `list resources`: show the resources inside one group.

use std::io::{BufRead, Write};

use super::{Shell, ShellError};
use crate::arm::ResourceManager;
use crate::cmd::tables::resources_table;

impl<M, R, W> Shell<'_, M, R, W>
where
    M: ResourceManager,
    R: BufRead,
    W: Write,
{
    pub(super) fn list_resources(&mut self) -> Result<String, ShellError> {
        self.say("Here you can view a list of resources inside a resource group.")?;
        loop {
            let group = self.prompt(r#"Enter resource group name, "list" or "cancel": "#)?;
            match group.to_lowercase().as_str() {
                "" => continue,
                "list" => {
                    self.show_groups()?;
                    continue;
                }
                "cancel" => return Ok("> Cancelled listing resources".to_string()),
                _ => {}
            }
            if !self.manager.group_exists(&group)? {
                self.say(format!(
                    r#"> Could not find resource group "{group}". Enter an existing resource group name."#
                ))?;
                continue;
            }

            let resources = match self.manager.list_resources(&group) {
                Ok(r) => r,
                Err(e) => return Ok(format!("> An error occurred while listing resources: {e}")),
            };
            if resources.is_empty() {
                return Ok(format!(
                    r#"> Found no resources in resource group "{group}""#
                ));
            }
            let rendered = resources_table(&resources, &self.style);
            self.say(rendered)?;
            return Ok(format!(r#"> Printed resources in "{group}""#));
        }
    }
}
