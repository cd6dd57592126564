//! Subcommand implementations.
//!
//! Every command takes the shared [`DefaultAppState`]; nothing builds its
//! own client.

pub mod chat;
pub mod endpoint;
pub mod products;
pub mod sales;
pub mod session;
pub mod users;

use clap::Args;
use salesdesk_client::{ClientError, ConfigError, DefaultAppState};
use salesdesk_core::{Capability, PageRequest};
use thiserror::Error;

/// Errors surfaced by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Client(#[from] ClientError),

    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// The signed-in role does not have the capability.
    #[error("Your role ({role}) is not allowed to {action}")]
    Forbidden { role: String, action: &'static str },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<salesdesk_client::TransportError> for CliError {
    fn from(err: salesdesk_client::TransportError) -> Self {
        Self::Client(err.into())
    }
}

impl From<salesdesk_client::StoreError> for CliError {
    fn from(err: salesdesk_client::StoreError) -> Self {
        Self::Client(err.into())
    }
}

/// Paging flags shared by every `list` command.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<u32>,

    /// Items per page
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Sort key, prefix with `-` for descending (e.g. `-created_at`)
    #[arg(long)]
    pub sort: Option<String>,
}

impl From<PageArgs> for PageRequest {
    fn from(args: PageArgs) -> Self {
        Self {
            page: args.page,
            page_size: args.page_size,
            sort: args.sort,
        }
    }
}

/// Fail early when the cached role cannot perform `capability`.
///
/// The server enforces the same rules; this only avoids a pointless round trip.
pub async fn require(state: &DefaultAppState, capability: Capability) -> Result<(), CliError> {
    if state.can(capability).await? {
        return Ok(());
    }
    let role = state
        .session()
        .current_role()
        .await?
        .map_or_else(|| "signed out".to_string(), |r| r.to_string());
    Err(CliError::Forbidden {
        role,
        action: action_name(capability),
    })
}

const fn action_name(capability: Capability) -> &'static str {
    match capability {
        Capability::ViewProducts => "view products",
        Capability::CreateProducts => "create products",
        Capability::EditProducts => "edit products",
        Capability::DeleteProducts => "delete products",
        Capability::ViewSales => "view sales",
        Capability::CreateSales => "record sales",
        Capability::EditSales => "edit sales",
        Capability::DeleteSales => "delete sales",
        Capability::ViewReports => "view reports",
        Capability::ViewUsers => "view users",
        Capability::DeleteUsers => "delete users",
        Capability::EditUserRoles => "change user roles",
        Capability::ToggleUserStatus => "activate or deactivate users",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_capability_has_an_action_name() {
        for capability in Capability::ALL {
            assert!(!action_name(capability).is_empty());
        }
    }

    #[test]
    fn test_page_args_convert() {
        let request: PageRequest = PageArgs {
            page: Some(3),
            page_size: None,
            sort: Some("name".to_string()),
        }
        .into();
        assert_eq!(request.page, Some(3));
        assert_eq!(request.sort.as_deref(), Some("name"));
    }
}
