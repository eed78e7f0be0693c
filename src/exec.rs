use std::process::Command;

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{cli::ExecArgs, config::GrouperConfig};

/// Runs an external program once for a group, with the group's file paths
/// appended to its arguments.
pub fn execute(args: &ExecArgs) -> Result<()> {
    let (program, leading) = args
        .command
        .split_first()
        .ok_or_else(|| anyhow!("No command given to run for group '{}'", args.group))?;
    let mut catalog = crate::load_catalog(&args.groupings, GrouperConfig::default())?;

    let program = program.clone();
    let leading = leading.to_vec();
    catalog.register_processor(&args.group, move |paths| {
        let status = Command::new(&program)
            .args(&leading)
            .args(paths)
            .status()
            .with_context(|| format!("Failed to spawn `{program}`"))?;
        if !status.success() {
            return Err(anyhow!("`{program}` exited with status {status}"));
        }
        Ok(())
    });

    info!(
        "Running `{}` over group '{}'",
        args.command.join(" "),
        args.group
    );
    catalog.process_group(&args.group)?;
    info!("Group '{}' processed successfully", args.group);
    Ok(())
}
