//! `delete`: remove a resource group after explicit confirmation.

use std::io::{BufRead, Write};

use super::{Shell, ShellError};
use crate::arm::ResourceManager;
use crate::cmd::format::{Role, color};

impl<M, R, W> Shell<'_, M, R, W>
where
    M: ResourceManager,
    R: BufRead,
    W: Write,
{
    pub(super) fn delete_group(&mut self) -> Result<String, ShellError> {
        loop {
            self.say("Which group do you want to delete? List resource groups with 'list' or go back with 'cancel': ")?;
            let group = self.prompt("Enter name: ")?;
            match group.to_lowercase().as_str() {
                "" => continue,
                "cancel" => return Ok("> Cancelled deleting resource group.".to_string()),
                "list" => {
                    self.show_groups()?;
                    continue;
                }
                _ => {}
            }
            if !self.manager.group_exists(&group)? {
                self.say(format!(
                    r#"> Could not find resource group "{group}". Please enter an existing group name."#
                ))?;
                continue;
            }

            let question = color(
                Role::Warning,
                format!(
                    r#"Are you sure you want to delete resource group "{group}" and all of its resources? Deleting cannot be undone (y/n): "#
                ),
                &self.style,
            );
            let confirm = self.prompt(&question)?;
            if !confirm.eq_ignore_ascii_case("y") {
                return Ok(format!(
                    "> Cancelling... Did not delete the resource group {group}."
                ));
            }

            self.say(format!(
                r#"> Proceeding to delete resource group "{group}". This may take a while..."#
            ))?;
            return Ok(match self.manager.delete_group(&group) {
                Ok(()) => {
                    tracing::info!(%group, "resource group deleted");
                    format!(r#"> Deleted resource group "{group}" successfully."#)
                }
                Err(e) => format!("> An error occurred while deleting the resource group: {e}"),
            });
        }
    }
}
