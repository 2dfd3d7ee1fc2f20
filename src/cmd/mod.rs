/*!
Subcommand layer.

  src/cmd/
    mod.rs        (this file: module declarations + re-exports)
    shell.rs      (ShellArgs     + execute_shell)      interactive loop, default command
    groups.rs     (GroupsArgs    + execute_groups,
                   CheckArgs     + execute_check,
                   LocationsArgs + execute_locations)
    resources.rs  (ResourcesArgs + execute_resources)
    shared.rs     (connect / print_json)
    format.rs     (colors, box header, rounded tables)
    tables.rs     (domain rows -> tables / text)

Conventions:
  - Each subcommand exposes one `execute_*(args, &Settings)` returning `anyhow::Result<()>`.
  - Rendering is split from connecting so it can run against any `ResourceManager`.
*/

pub mod format;
pub mod groups;
pub mod resources;
pub mod shared;
pub mod shell;
pub mod tables;

pub use groups::{CheckArgs, GroupsArgs, LocationsArgs, execute_check, execute_groups, execute_locations};
pub use resources::{ResourcesArgs, execute_resources};
pub use shell::{ShellArgs, execute_shell};
