//! `list groups`, `check existence` and `create`.

use std::io::{BufRead, Write};

use super::{Shell, ShellError};
use crate::arm::{Location, ResourceManager};
use crate::cmd::tables::locations_line;
use crate::validate::is_valid_resource_group_name;

const INVALID_NAME: &str = "> Invalid resource group name. Resource group name can be between 1 and 90 characters long, contain alphanumerics, underscores, parentheses, hyphens, periods, and can't end with period.";

impl<M, R, W> Shell<'_, M, R, W>
where
    M: ResourceManager,
    R: BufRead,
    W: Write,
{
    pub(super) fn list_groups(&mut self) -> Result<String, ShellError> {
        self.show_groups()?;
        Ok("> Printed resource groups in the subscription.".to_string())
    }

    pub(super) fn check_existence(&mut self) -> Result<String, ShellError> {
        loop {
            let name = self.prompt("Which resource group name do you want to check? ")?;
            if name.is_empty() {
                self.say("> Enter a resource group name.")?;
                continue;
            }
            return Ok(match self.manager.group_exists(&name) {
                Ok(true) => format!(r#"> Check result: resource group name "{name}" is in use"#),
                Ok(false) => {
                    format!(r#"> Check result: resource group name "{name}" is not in use"#)
                }
                Err(e) => format!("> An error occurred while checking the existence: {e}"),
            });
        }
    }

    pub(super) fn create_group(&mut self) -> Result<String, ShellError> {
        let locations = self.manager.list_locations()?;
        loop {
            let location = self
                .prompt(r#"Provide location for the resource group (to show a list of available locations, type "list", to go back type "cancel"): "#)?
                .to_lowercase();
            match location.as_str() {
                "cancel" => return Ok("> Cancelled creating resource group".to_string()),
                "list" => {
                    self.print_locations(&locations)?;
                    continue;
                }
                loc if !locations.iter().any(|l| l.name == loc) => {
                    self.say("> Location you entered is not available. Available locations (regions) for the subscription:")?;
                    self.print_locations(&locations)?;
                    continue;
                }
                _ => return self.create_in(&location),
            }
        }
    }

    fn create_in(&mut self, location: &str) -> Result<String, ShellError> {
        loop {
            self.say(r#"Provide name for the group. Recommended name format is "rg-<app or service name>-<subscription purpose>-<###>""#)?;
            let name = self.prompt("Enter name: ")?;
            if !is_valid_resource_group_name(&name) {
                self.say(INVALID_NAME)?;
                continue;
            }
            if self.manager.group_exists(&name)? {
                self.say(format!(
                    r#"> Resource group "{name}" already exists. Give another name."#
                ))?;
                continue;
            }
            return Ok(match self.manager.create_group(&name, location) {
                Ok(rg) => {
                    tracing::info!(
                        group = %rg.name,
                        location = %rg.location,
                        state = rg.provisioning_state().unwrap_or("unknown"),
                        "resource group created"
                    );
                    format!(r#"> Resource group "{name}" created successfully"#)
                }
                Err(e) => format!("> An error occurred while creating the resource group: {e}"),
            });
        }
    }

    fn print_locations(&mut self, locations: &[Location]) -> Result<(), ShellError> {
        self.say(locations_line(locations))?;
        self.say("-------------")
    }
}
