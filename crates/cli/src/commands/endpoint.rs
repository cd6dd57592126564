//! Server address commands.
//!
//! ```bash
//! sd-cli endpoint show
//! sd-cli endpoint set 192.168.1.20 8080
//! ```

use clap::Subcommand;
use salesdesk_client::DefaultAppState;

use super::CliError;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum EndpointAction {
    /// Print the current server address
    Show,
    /// Change the server address (the stored session is kept)
    Set {
        /// IPv4 address or `localhost`
        host: String,
        /// Port between 1 and 65535
        port: String,
    },
}

pub async fn run(state: &DefaultAppState, action: EndpointAction) -> Result<(), CliError> {
    match action {
        EndpointAction::Show => {
            let endpoint = state.endpoint().await?;
            output::line(endpoint.origin())?;
        }
        EndpointAction::Set { host, port } => {
            let endpoint = state.update_endpoint(&host, &port).await?;
            output::line(format!("Server set to {}", endpoint.origin()))?;
            if state.store().token().await?.is_some() {
                tracing::warn!("Existing session kept; run `sd-cli logout` if it belongs to another server");
            }
        }
    }
    Ok(())
}
