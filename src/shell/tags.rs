//! `manage tags`: add (Merge) or delete tags on a resource group.

use std::fmt;
use std::io::{BufRead, Write};

use super::{Shell, ShellError};
use crate::arm::{ResourceManager, Tags, TagsOperation, TagsPatch};
use crate::cmd::tables::format_tags;
use crate::validate::{is_valid_tag_name, is_valid_tag_value};

const CANCELLED: &str = "> Cancelled modifying tags";
const INVALID_TAG_NAME: &str = r"> Invalid tag name. Tag names cannot contain <, >, %, &, \, ?, / and should be at most 512 characters long.";
const INVALID_TAG_VALUE: &str = r"> Invalid tag value. Tag values cannot contain <, >, %, &, \, ?, / and should be between 1 and 256 characters long.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagMode {
    Add,
    Delete,
}

impl TagMode {
    fn operation(self) -> TagsOperation {
        match self {
            TagMode::Add => TagsOperation::Merge,
            TagMode::Delete => TagsOperation::Delete,
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            TagMode::Add => "Added",
            TagMode::Delete => "Deleted",
        }
    }
}

impl fmt::Display for TagMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagMode::Add => "add",
            TagMode::Delete => "delete",
        })
    }
}

impl<M, R, W> Shell<'_, M, R, W>
where
    M: ResourceManager,
    R: BufRead,
    W: Write,
{
    pub(super) fn manage_tags(&mut self) -> Result<String, ShellError> {
        loop {
            self.say("Which resource group's tags do you want to manage? List resource groups with 'list' or cancel with 'cancel'.")?;
            let group = self.prompt("Enter resource group: ")?;
            match group.as_str() {
                "" => continue,
                "list" => {
                    self.show_groups()?;
                    continue;
                }
                "cancel" => return Ok(CANCELLED.to_string()),
                _ => {}
            }
            if !self.manager.group_exists(&group)? {
                self.say(format!(r#"> Could not find resource group "{group}""#))?;
                continue;
            }
            return self.edit_tags(&group);
        }
    }

    fn edit_tags(&mut self, group: &str) -> Result<String, ShellError> {
        let mode = loop {
            let choice = self
                .prompt("Do you want to add or delete tags? ")?
                .to_lowercase();
            match choice.as_str() {
                "cancel" => return Ok(CANCELLED.to_string()),
                "add" => break TagMode::Add,
                "delete" => break TagMode::Delete,
                _ => self.say(r#"> Invalid command. Enter "add" or "delete". You can also "cancel""#)?,
            }
        };

        let scope = self.manager.get_group(group)?.id;
        let existing = self.manager.get_tags(&scope)?;
        let Some(edits) = self.collect_tags(group, mode, &existing)? else {
            return Ok(CANCELLED.to_string());
        };

        let patch = TagsPatch::new(mode.operation(), edits);
        tracing::debug!(%scope, operation = %patch.operation, "patching tags");
        Ok(match self.manager.patch_tags(&scope, &patch) {
            Ok(_) => format!(
                r#"> {} tags {} in resource group "{group}""#,
                mode.past_tense(),
                format_tags(patch.tags())
            ),
            Err(e) => format!("> An error occurred while trying to manage tags: {e}"),
        })
    }

    /// Prompt for tag names (and values when adding). `None` when cancelled.
    fn collect_tags(
        &mut self,
        group: &str,
        mode: TagMode,
        existing: &Tags,
    ) -> Result<Option<Tags>, ShellError> {
        let mut edits = Tags::new();
        loop {
            let name = self.prompt("Enter tag name: ")?;
            match name.as_str() {
                "taglist" => {
                    self.say(format!(
                        r#"> Tags in resource group "{group}": {}"#,
                        format_tags(existing)
                    ))?;
                    continue;
                }
                "cancel" => return Ok(None),
                _ => {}
            }
            if !is_valid_tag_name(&name) {
                self.say(INVALID_TAG_NAME)?;
                continue;
            }

            let value = match (mode, existing.get(&name)) {
                (TagMode::Add, current) => {
                    let question = match current {
                        Some(v) => format!(
                            r#"Tag "{name}" already exists with value "{v}". Update tag's value: "#
                        ),
                        None => "Enter tag value: ".to_string(),
                    };
                    let value = self.prompt(&question)?;
                    if !is_valid_tag_value(&value) {
                        self.say(INVALID_TAG_VALUE)?;
                        continue;
                    }
                    value
                }
                (TagMode::Delete, Some(current)) => current.clone(),
                (TagMode::Delete, None) => {
                    self.say(format!(
                        r#"> Tag "{name}" does not exist in resource group "{group}". Provide existing tag name. To show existing tags, type "taglist""#
                    ))?;
                    continue;
                }
            };
            edits.insert(name, value);

            let another = self
                .prompt(&format!("Do you want to {mode} another tag? (y/n) "))?
                .to_lowercase();
            if another != "y" {
                return Ok(Some(edits));
            }
        }
    }
}
