//! Session commands: login, logout, whoami, register and activate.

use clap::Subcommand;
use salesdesk_client::{ClientError, DefaultAppState, Registration};
use salesdesk_core::Capability;
use secrecy::SecretString;

use super::CliError;
use crate::output;

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Sign in and store the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "SALESDESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Revoke the session and forget it locally
    Logout,
    /// Show the signed-in user and what their role allows
    Whoami,
    /// Create an account (it must be activated before signing in)
    Register {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "SALESDESK_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,
    },
    /// Activate an account with the token from the activation email
    Activate {
        token: String,
    },
}

pub async fn run(state: &DefaultAppState, command: SessionCommand) -> Result<(), CliError> {
    match command {
        SessionCommand::Login { email, password } => login(state, &email, password).await,
        SessionCommand::Logout => {
            state.session().logout().await;
            output::line("Signed out")?;
            Ok(())
        }
        SessionCommand::Whoami => whoami(state).await,
        SessionCommand::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let registration = Registration {
                email,
                password: SecretString::from(password),
                first_name,
                last_name,
            };
            let user = state.session().register(&registration).await?;
            let who = user.map_or_else(|| registration.email.clone(), |u| u.email);
            output::line(format!(
                "Registered {who}. Check your email for the activation token, then run `sd-cli activate <token>`."
            ))?;
            Ok(())
        }
        SessionCommand::Activate { token } => {
            state.session().activate(&token).await?;
            output::line("Account activated. You can now sign in.")?;
            Ok(())
        }
    }
}

async fn login(state: &DefaultAppState, email: &str, password: String) -> Result<(), CliError> {
    let password = SecretString::from(password);
    match state.session().login(email, &password).await {
        Ok(outcome) => {
            output::line(format!(
                "Signed in as {} ({})",
                outcome.user.full_name(),
                outcome.user.role
            ))?;
            Ok(())
        }
        Err(ClientError::ActivationRequired(message)) => {
            output::line(format!("{message}\nRun `sd-cli activate <token>` with the token from your activation email."))?;
            Err(ClientError::ActivationRequired(message).into())
        }
        Err(e) => Err(e.into()),
    }
}

async fn whoami(state: &DefaultAppState) -> Result<(), CliError> {
    if state.store().token().await?.is_none() {
        output::line("Not signed in")?;
        return Ok(());
    }

    let user = state.session().refresh_user_data().await?;
    output::line(format!(
        "{} <{}>, id {}, role {}",
        user.full_name(),
        user.email,
        user.id,
        user.role
    ))?;

    let allowed: Vec<String> = Capability::ALL
        .into_iter()
        .filter(|c| user.role.can(*c))
        .map(|c| format!("{c:?}"))
        .collect();
    output::line(format!("Allowed: {}", allowed.join(", ")))?;
    Ok(())
}
