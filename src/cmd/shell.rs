/*!
`shell.rs`

Implements the `shell` subcommand (also the default when no subcommand is
given): the interactive resource group loop on stdin/stdout.

  - Results are appended to the action log (`--log-file`, default `log_file.log`)
    unless `--no-log` is given.
  - Ctrl+D ends the session; Ctrl+C prints the same notice and exits with 130.
*/

use anyhow::{Context, Result};
use clap::Args;
use std::io;

use crate::actionlog::ActionLog;
use crate::cmd::format::StyleOptions;
use crate::cmd::shared::connect;
use crate::config::Settings;
use crate::shell::{CLOSED_MESSAGE, Shell};

#[derive(Args, Debug, Default)]
pub struct ShellArgs {
    /// Do not append results to the action log
    #[arg(long)]
    pub no_log: bool,
}

pub fn execute_shell(args: ShellArgs, settings: &Settings) -> Result<()> {
    let conn = connect(settings)?;

    conn.runtime.spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{CLOSED_MESSAGE}");
            std::process::exit(130);
        }
    });

    let mut shell = Shell::new(
        &conn.client,
        io::stdin().lock(),
        io::stdout().lock(),
        StyleOptions::detect(),
    );
    if !args.no_log {
        let log = ActionLog::new(&settings.log_file);
        tracing::debug!(path = %log.path().display(), "action log enabled");
        shell = shell.with_log(log);
    }

    let end = shell.run().context("shell session failed")?;
    tracing::debug!(?end, "session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: ShellArgs,
    }

    #[test]
    fn clap_parses_no_log() {
        let cli = TestCli::try_parse_from(["t", "--no-log"]).unwrap();
        assert!(cli.args.no_log);
        let cli = TestCli::try_parse_from(["t"]).unwrap();
        assert!(!cli.args.no_log);
    }
}
