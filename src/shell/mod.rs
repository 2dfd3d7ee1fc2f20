/*!
Interactive resource group shell.

  Shell::run
    banner -> [menu -> "Enter a command: " -> operation -> log + print result]*

Each operation reads its own prompts and returns the result line that is
appended to the action log and echoed. End of input at any prompt ends the
session. Operations live in:

  groups.rs     list groups / check existence / create
  tags.rs       manage tags
  resources.rs  list resources
  delete.rs     delete
*/

pub mod command;
mod delete;
mod groups;
mod resources;
mod tags;

use std::io::{BufRead, Write};
use thiserror::Error;

use crate::actionlog::ActionLog;
use crate::arm::{ArmError, ResourceManager};
use crate::cmd::format::{Role, StyleOptions, color};
use crate::cmd::tables::groups_table;

pub use command::ShellCommand;

pub const BANNER: &str = "With this program you can manage Azure resource groups.";
pub const EXIT_MESSAGE: &str = "> See you again!";
pub const CLOSED_MESSAGE: &str = "Exiting program...";

#[derive(Error, Debug)]
pub enum ShellError {
    /// Input reached end of file (Ctrl+D).
    #[error("input closed")]
    InputClosed,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Arm(#[from] ArmError),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Exit,
    InputClosed,
}

pub struct Shell<'m, M, R, W> {
    manager: &'m M,
    input: R,
    out: W,
    log: Option<ActionLog>,
    style: StyleOptions,
}

impl<'m, M, R, W> Shell<'m, M, R, W>
where
    M: ResourceManager,
    R: BufRead,
    W: Write,
{
    pub fn new(manager: &'m M, input: R, out: W, style: StyleOptions) -> Self {
        Self {
            manager,
            input,
            out,
            log: None,
            style,
        }
    }

    pub fn with_log(mut self, log: ActionLog) -> Self {
        self.log = Some(log);
        self
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }

    pub fn run(&mut self) -> Result<SessionEnd, ShellError> {
        self.say(format!("\n{}", color(Role::Primary, BANNER, &self.style)))?;
        loop {
            self.say(format!("\nAvailable commands: {}", ShellCommand::menu()))?;
            let input = match self.prompt("Enter a command: ") {
                Ok(line) => line,
                Err(ShellError::InputClosed) => return self.closed(),
                Err(e) => return Err(e),
            };
            let Some(cmd) = ShellCommand::from_str_ci(&input) else {
                self.say("> Unknown command. Try again.")?;
                continue;
            };
            if cmd == ShellCommand::Exit {
                self.say(EXIT_MESSAGE)?;
                return Ok(SessionEnd::Exit);
            }

            let result = match self.dispatch(cmd) {
                Ok(message) => message,
                Err(ShellError::InputClosed) => return self.closed(),
                Err(ShellError::Arm(e)) => format!("> An error occurred: {e}"),
                Err(e) => return Err(e),
            };
            if cmd.is_mutating() {
                tracing::info!(command = %cmd, result = %result, "command finished");
            } else {
                tracing::debug!(command = %cmd, result = %result, "command finished");
            }
            if let Some(log) = &self.log {
                log.record(&result);
            }
            let role = if result.starts_with("> An error occurred") {
                Role::Error
            } else {
                Role::Success
            };
            let line = color(role, &result, &self.style);
            self.say(line)?;
        }
    }

    fn dispatch(&mut self, cmd: ShellCommand) -> Result<String, ShellError> {
        match cmd {
            ShellCommand::ListGroups => self.list_groups(),
            ShellCommand::CheckExistence => self.check_existence(),
            ShellCommand::Create => self.create_group(),
            ShellCommand::ManageTags => self.manage_tags(),
            ShellCommand::ListResources => self.list_resources(),
            ShellCommand::Delete => self.delete_group(),
            ShellCommand::Exit => Ok(EXIT_MESSAGE.to_string()),
        }
    }

    fn closed(&mut self) -> Result<SessionEnd, ShellError> {
        self.say(format!("\n{CLOSED_MESSAGE}"))?;
        Ok(SessionEnd::InputClosed)
    }

    /* ---- I/O helpers ---- */

    /// Write `text` without a newline and read one trimmed line.
    fn prompt(&mut self, text: &str) -> Result<String, ShellError> {
        write!(self.out, "{text}")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ShellError::InputClosed);
        }
        Ok(line.trim().to_string())
    }

    fn say(&mut self, text: impl AsRef<str>) -> Result<(), ShellError> {
        writeln!(self.out, "{}", text.as_ref())?;
        Ok(())
    }

    /// Print the group table (the `list` keyword inside other operations).
    fn show_groups(&mut self) -> Result<(), ShellError> {
        let groups = self.manager.list_groups()?;
        let rendered = groups_table(&groups, &self.style);
        self.say(rendered)
    }
}
