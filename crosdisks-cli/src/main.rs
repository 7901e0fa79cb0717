// SPDX-License-Identifier: GPL-3.0-only

//! Command line client for the cros-disks mount service

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use crosdisks_client::Session;
use crosdisks_types::{MountError, MountType};
use tokio::sync::mpsc;

mod config;
mod logging;
mod output;

use config::Config;

#[derive(Parser)]
#[command(name = "crosdisks")]
#[command(about = "Mount, unmount, format and inspect removable storage", long_about = None)]
struct Cli {
    /// Config file (defaults to $CROSDISKS_CONFIG when set)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum MountKind {
    Device,
    Archive,
    RemoteDocument,
    NetworkStorage,
}

impl From<MountKind> for MountType {
    fn from(kind: MountKind) -> Self {
        match kind {
            MountKind::Device => MountType::Device,
            MountKind::Archive => MountType::Archive,
            MountKind::RemoteDocument => MountType::RemoteDocument,
            MountKind::NetworkStorage => MountType::NetworkStorage,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Mount a device or archive
    Mount {
        /// Device path or archive file to mount
        source: String,
        #[arg(long = "type", value_enum, default_value = "device")]
        kind: MountKind,
        /// Wait for the service to report the mount result
        #[arg(long)]
        wait: bool,
    },
    /// Unmount a device
    Unmount {
        device_path: String,
    },
    /// List devices the service would mount automatically
    List,
    /// Format a device
    Format {
        device_path: String,
        /// Filesystem to create (e.g. vfat)
        filesystem: String,
    },
    /// Show the properties of a device
    Props {
        device_path: String,
    },
    /// Print service notifications until interrupted
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(cli.config.as_deref())?;
    let _log_guard = logging::init(&config.logging);

    tracing::debug!(?config, "Loaded configuration");

    let session = Session::connect(&config.client)
        .await
        .context("Failed to connect to the disk service")?;
    let client = session.client();

    match cli.command {
        Commands::Mount { source, kind, wait } => {
            let mount_type = MountType::from(kind);
            if !wait {
                client.mount(&source, mount_type).await?;
                println!("Mount of {} requested", source);
                return Ok(());
            }

            let (tx, mut rx) = mpsc::unbounded_channel();
            let expected = source.clone();
            session.events().set_up_connections(
                |_, _| {},
                move |error, source_path, mount_type, mount_path| {
                    if source_path == expected {
                        let _ = tx.send((error, source_path, mount_type, mount_path));
                    }
                },
            );

            client.mount(&source, mount_type).await?;
            let Some((error, source_path, mount_type, mount_path)) = rx.recv().await else {
                bail!("Notification stream closed before {} finished mounting", source);
            };
            output::mount_completed(cli.json, error, &source_path, mount_type, &mount_path)?;
            if error != MountError::None {
                bail!("Mounting {} failed: {}", source_path, error);
            }
        }
        Commands::Unmount { device_path } => {
            let path = client.unmount(&device_path).await?;
            println!("Unmounted {}", path);
        }
        Commands::List => {
            let devices = client.enumerate_auto_mountable_devices().await?;
            output::device_list(cli.json, &devices)?;
        }
        Commands::Format {
            device_path,
            filesystem,
        } => {
            let (path, succeeded) = client.format_device(&device_path, &filesystem).await?;
            if !succeeded {
                bail!("Formatting {} as {} failed", path, filesystem);
            }
            println!("Formatting {} as {} started", path, filesystem);
        }
        Commands::Props { device_path } => {
            let disk = client.get_device_properties(&device_path).await?;
            output::disk_info(cli.json, &disk)?;
        }
        Commands::Watch => {
            let json = cli.json;
            session.events().set_up_connections(
                move |event, device_path| output::lifecycle_event(json, event, &device_path),
                move |error, source_path, mount_type, mount_path| {
                    if let Err(e) =
                        output::mount_completed(json, error, &source_path, mount_type, &mount_path)
                    {
                        tracing::error!("Failed to print notification: {}", e);
                    }
                },
            );
            tracing::info!("Watching for disk service notifications");
            tokio::signal::ctrl_c().await?;
        }
    }

    Ok(())
}
