//! User administration commands.

use clap::{Subcommand, ValueEnum};
use salesdesk_client::DefaultAppState;
use salesdesk_core::{Capability, Role, UserFilter, UserId};

use super::{CliError, PageArgs, require};
use crate::output;

/// Roles an administrator can assign.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Cashier,
    Guest,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Cashier => Self::Cashier,
            RoleArg::Guest => Self::Guest,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum UserAction {
    /// List users
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
        #[arg(long)]
        active: Option<bool>,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Show one user
    Get { id: UserId },
    /// Change a user's role
    SetRole {
        id: UserId,
        #[arg(value_enum)]
        role: RoleArg,
    },
    /// Activate or deactivate a user
    SetActive {
        id: UserId,
        #[arg(action = clap::ArgAction::Set)]
        active: bool,
    },
    /// Delete a user
    Delete { id: UserId },
}

pub async fn run(state: &DefaultAppState, action: UserAction) -> Result<(), CliError> {
    let users = state.users();
    match action {
        UserAction::List {
            name,
            email,
            role,
            active,
            page,
        } => {
            require(state, Capability::ViewUsers).await?;
            let filter = UserFilter {
                name,
                email,
                role: role.map(Role::from),
                is_active: active,
            };
            let result = users.list(&filter, &page.into()).await?;
            output::page(&result, "No users found", output::user_row)?;
        }
        UserAction::Get { id } => {
            require(state, Capability::ViewUsers).await?;
            output::line(output::user_row(&users.get(id).await?))?;
        }
        UserAction::SetRole { id, role } => {
            require(state, Capability::EditUserRoles).await?;
            let current = users.get(id).await?;
            let updated = users.set_role(&current, role.into()).await?;
            output::line(output::user_row(&updated))?;
        }
        UserAction::SetActive { id, active } => {
            require(state, Capability::ToggleUserStatus).await?;
            let current = users.get(id).await?;
            let updated = users.set_active(&current, active).await?;
            output::line(output::user_row(&updated))?;
        }
        UserAction::Delete { id } => {
            require(state, Capability::DeleteUsers).await?;
            users.delete(id).await?;
            output::line(format!("Deleted user {id}"))?;
        }
    }
    Ok(())
}
