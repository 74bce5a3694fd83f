use anyhow::{anyhow, Context};
use clap::Args;
use serde_json::json;

use super::print_output;
use crate::auth::secret::SharedSecretVerifier;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct IssueTokenArgs {
    #[arg(long, help = "Subject (user id) claim")]
    pub sub: String,

    #[arg(long, help = "Email claim")]
    pub email: String,

    #[arg(long, help = "Group membership, repeatable (e.g. --group admin)")]
    pub group: Vec<String>,

    #[arg(long, help = "Federated provider name, e.g. Google")]
    pub provider: Option<String>,
}

pub fn handle(args: IssueTokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    let secret = config
        .auth
        .jwt_secret
        .as_deref()
        .ok_or_else(|| anyhow!("JWT_SECRET is required to issue tokens"))?;

    let issuer = SharedSecretVerifier::new(secret, config.auth.jwt_expiry_hours)?;
    let token = issuer.issue(&args.sub, &args.email, args.group, args.provider.as_deref())?;

    print_output(output_format, json!({ "token": token }), &token);
    Ok(())
}
