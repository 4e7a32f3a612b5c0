//! Shopkeep operator CLI
//!
//! Non-interactive maintenance of the encrypted store: key initialization,
//! admin accounts, license seeding and key backup. Secrets are always read
//! from files, never from arguments.
//!
//! Usage:
//!   shopkeep-admin init-key
//!   shopkeep-admin add-admin --admin-key K --username U --name N --password-file P
//!   shopkeep-admin issue-licenses --plan starter --count 10
//!
//! Settings not given as flags come from the `SHOPKEEP_*` environment.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shopkeep_types::Plan;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "shopkeep-admin")]
#[command(about = "Shopkeep operator CLI")]
struct Args {
    /// Data directory holding the encrypted tables
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Path to the store key file
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate the store key file (refuses to overwrite)
    InitKey,

    /// Add an admin account
    AddAdmin {
        #[arg(long)]
        admin_key: String,
        #[arg(long)]
        username: String,
        /// Display name
        #[arg(long)]
        name: String,
        #[arg(long)]
        password_file: PathBuf,
    },

    /// Change an admin password after checking the current one
    ChangeAdminPassword {
        #[arg(long)]
        admin_key: String,
        #[arg(long)]
        current_password_file: PathBuf,
        #[arg(long)]
        new_password_file: PathBuf,
    },

    /// Remove an admin account
    RemoveAdmin {
        #[arg(long)]
        admin_key: String,
    },

    /// List admin accounts
    ListAdmins,

    /// Generate license keys and print them to stdout
    IssueLicenses {
        #[arg(long)]
        plan: Plan,
        #[arg(long, default_value = "1")]
        count: usize,
    },

    /// List every license key with its redemption state
    ListLicenses,

    /// Copy the key file into a timestamped backup
    BackupKey {
        /// Destination directory
        #[arg(long)]
        dest: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = commands::load_config(args.data_dir, args.key_file)?;

    match args.command {
        Command::InitKey => commands::init_key(&config),
        Command::AddAdmin {
            admin_key,
            username,
            name,
            password_file,
        } => commands::add_admin(&config, &admin_key, &username, &name, &password_file),
        Command::ChangeAdminPassword {
            admin_key,
            current_password_file,
            new_password_file,
        } => commands::change_admin_password(
            &config,
            &admin_key,
            &current_password_file,
            &new_password_file,
        ),
        Command::RemoveAdmin { admin_key } => commands::remove_admin(&config, &admin_key),
        Command::ListAdmins => commands::list_admins(&config),
        Command::IssueLicenses { plan, count } => commands::issue_licenses(&config, plan, count),
        Command::ListLicenses => commands::list_licenses(&config),
        Command::BackupKey { dest } => commands::backup_key(&config, &dest).map(|_| ()),
    }
}
