use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use modbump_registry::ModuleProxyClient;

use crate::render::TerminalRenderer;
use crate::runner::{run_upgrades, RunMode};
use crate::upgrade::GoGetUpgrader;
use crate::Cli;

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let renderer = TerminalRenderer::current(cli.color);
    let registry = ModuleProxyClient::new(&cli.proxy, Duration::from_secs(cli.timeout_secs))
        .with_context(|| format!("failed to set up module proxy client for {}", cli.proxy))?;
    let mut upgrader = GoGetUpgrader::new(&cli.go_binary, manifest_dir(&cli.modfile));

    let report = run_upgrades(
        &cli.modfile,
        run_mode(cli.check),
        &registry,
        &mut upgrader,
        |notice| renderer.print_notice(notice),
    )?;
    renderer.print_summary(&report);

    Ok(())
}

pub(crate) fn run_mode(check: bool) -> RunMode {
    if check {
        RunMode::CheckOnly
    } else {
        RunMode::Upgrade
    }
}

pub(crate) fn manifest_dir(modfile: &Path) -> Option<PathBuf> {
    modfile
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
