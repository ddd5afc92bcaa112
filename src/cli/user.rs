//! User CLI commands

use clap::Subcommand;

use crate::display::format_user_list;
use crate::error::TrailResult;
use crate::models::Role;
use crate::services::{Actor, UserService};
use crate::storage::Storage;

/// User subcommands
#[derive(Subcommand)]
pub enum UserCommands {
    /// Add a user
    Add {
        /// Display name
        name: String,
        /// Email address (unique)
        email: String,
        /// Role (admin or member)
        #[arg(short, long, default_value = "member")]
        role: Role,
    },
    /// List users
    List,
    /// Delete a user; their tasks and history are kept, unassigned
    Delete {
        /// Email or ID
        user: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a user command
pub fn handle_user_command(storage: &Storage, actor: Actor<'_>, cmd: UserCommands) -> TrailResult<()> {
    let service = UserService::new(storage);

    match cmd {
        UserCommands::Add { name, email, role } => {
            let user = service.add(&name, &email, role, actor)?;
            println!("Added user: {} ({}, {})", user, user.role, user.id);
        }

        UserCommands::List => {
            println!("{}", format_user_list(&service.list()?));
        }

        UserCommands::Delete { user, force } => {
            let existing = service.require(&user)?;

            if !force {
                println!("About to delete user: {}", existing);
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let deleted = service.delete(&user, actor)?;
            println!("Deleted user: {}", deleted);
        }
    }

    Ok(())
}
