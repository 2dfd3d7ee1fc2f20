/*!
Shell commands (the interactive dispatch table).

Keywords, in menu order:
  list groups | check existence | create | manage tags | list resources | delete | exit
*/

use std::fmt;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ShellCommand {
    ListGroups,
    CheckExistence,
    Create,
    ManageTags,
    ListResources,
    Delete,
    Exit,
}

impl ShellCommand {
    /// All commands in menu order.
    pub const fn variants() -> &'static [ShellCommand] {
        &[
            ShellCommand::ListGroups,
            ShellCommand::CheckExistence,
            ShellCommand::Create,
            ShellCommand::ManageTags,
            ShellCommand::ListResources,
            ShellCommand::Delete,
            ShellCommand::Exit,
        ]
    }

    pub const fn keyword(&self) -> &'static str {
        match self {
            ShellCommand::ListGroups => "list groups",
            ShellCommand::CheckExistence => "check existence",
            ShellCommand::Create => "create",
            ShellCommand::ManageTags => "manage tags",
            ShellCommand::ListResources => "list resources",
            ShellCommand::Delete => "delete",
            ShellCommand::Exit => "exit",
        }
    }

    /// Case-insensitive lookup; surrounding whitespace is ignored.
    pub fn from_str_ci(s: &str) -> Option<Self> {
        let norm = s.trim().to_lowercase();
        Self::variants()
            .iter()
            .copied()
            .find(|c| c.keyword() == norm)
    }

    /// `list groups | check existence | ... | exit`
    pub fn menu() -> String {
        Self::variants()
            .iter()
            .map(|c| c.keyword())
            .collect::<Vec<_>>()
            .join(" | ")
    }

    /// Whether the command can change state in the subscription.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            ShellCommand::Create | ShellCommand::ManageTags | ShellCommand::Delete
        )
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}
