//! Assistant chat command.

use clap::Args;
use salesdesk_client::DefaultAppState;

use super::CliError;
use crate::output;

#[derive(Debug, Args)]
pub struct ChatArgs {
    /// Message text; multiple words are joined with spaces
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

pub async fn run(state: &DefaultAppState, args: ChatArgs) -> Result<(), CliError> {
    let reply = state.chat().send(&args.message.join(" ")).await?;
    output::chat_reply(&reply)?;
    Ok(())
}
