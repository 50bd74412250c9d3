use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const FLI_DOCKER_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const FLI_DOCKER_BEFORE_HELP: &str = concat!(
    "fli-docker ",
    env!("CARGO_PKG_VERSION"),
    " – Stateful volumes for compose applications\n\n",
    "\x1b[1;36mLifecycle\x1b[0m\n",
    "  provision        Clone manifest volumes from the hub and record them (alias: up).\n",
    "  snapshot         Snapshot every working volume; --push publishes them.\n\n",
    "\x1b[1;36mInspect & configure\x1b[0m\n",
    "  volumes          List the working volumes recorded by the last provision.\n",
    "  info             Show the pool, hub endpoint, and token file fli is using.\n",
    "  config           Point fli at a hub endpoint and/or token file.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "fli-docker",
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = FLI_DOCKER_BEFORE_HELP,
    help_template = FLI_DOCKER_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct FliDockerCli {
    #[arg(
        short,
        long,
        help = "Suppress human output (errors still print to stderr)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(
        about = "Sync, pull, and clone every manifest volume, then record the clones.",
        override_usage = "fli-docker provision [-f MANIFEST] [--endpoint URL] [--token-file PATH]",
        visible_alias = "up"
    )]
    Provision(ProvisionArgs),
    #[command(
        about = "Snapshot every working volume on its own branch; --push syncs and publishes.",
        override_usage = "fli-docker snapshot [--push]"
    )]
    Snapshot(SnapshotArgs),
    #[command(
        about = "Configure the hub endpoint and/or auth token file for fli.",
        override_usage = "fli-docker config [--endpoint URL] [--token-file PATH]"
    )]
    Config(ConfigArgs),
    #[command(about = "Show the pool, hub endpoint, and token file reported by fli.")]
    Info,
    #[command(about = "List the working volumes recorded by the last provision (read-only).")]
    Volumes,
}

#[derive(Args, Debug, Clone)]
pub struct HubArgs {
    #[arg(long, value_name = "URL", help = "Hub endpoint passed to `fli config -u`")]
    pub endpoint: Option<String>,
    #[arg(
        long = "token-file",
        value_name = "PATH",
        help = "Offline auth token file passed to `fli config -t`"
    )]
    pub token_file: Option<String>,
}

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    #[arg(
        short = 'f',
        long = "file",
        value_name = "MANIFEST",
        help = "Stateful application manifest [default: $FLI_DOCKER_MANIFEST or manifest.yml]"
    )]
    pub manifest: Option<PathBuf>,
    #[command(flatten)]
    pub hub: HubArgs,
}

#[derive(Args, Debug)]
pub struct SnapshotArgs {
    #[arg(long, help = "Sync the volume set and push each new snapshot")]
    pub push: bool,
}

#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("settings")
        .required(true)
        .multiple(true)
        .args(["endpoint", "token_file"])
))]
pub struct ConfigArgs {
    #[command(flatten)]
    pub hub: HubArgs,
}
