use anyhow::{Context, bail};
use chrono::{TimeZone, Utc};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use awladna::awladna_auth::{ScopedTokenService, TokenCodec, TokenPurpose};
use awladna::awladna_config::{JwtConfig, LoginPolicyConfig, ScopedTokenConfig};
use awladna::awladna_core::password::hash_password_with_cost;
use awladna::awladna_core::{AuthError, system_clock};
use awladna::awladna_observability::init_tracing;
use awladna::state::{AppState, connect_sessions};

#[derive(Parser)]
#[command(name = "awladna-cli")]
#[command(about = "Awladna CLI - Operator tools for auth and sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Hash a password with bcrypt at the configured cost
    HashPassword {
        #[arg(short = 'p', long)]
        password: String,
    },
    /// Show the claims of a session token and whether it is still valid
    DecodeToken { token: String },
    /// Mint an email-verification or password-reset token
    IssueScoped {
        #[arg(short = 's', long)]
        subject: String,

        /// `email-verification` or `password-reset`
        #[arg(long)]
        purpose: TokenPurpose,
    },
    /// Check a scoped token and print its subject
    VerifyScoped {
        token: String,

        #[arg(long)]
        purpose: TokenPurpose,

        /// Override the configured max age in seconds
        #[arg(long)]
        max_age: Option<u64>,
    },
    /// Revoke a refresh token
    Revoke { token: String },
    /// Check the session store is reachable
    PingStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::HashPassword { password } => handle_hash_password(&password),
        Commands::DecodeToken { token } => handle_decode_token(&token),
        Commands::IssueScoped { subject, purpose } => handle_issue_scoped(&subject, purpose),
        Commands::VerifyScoped {
            token,
            purpose,
            max_age,
        } => handle_verify_scoped(&token, purpose, max_age),
        Commands::Revoke { token } => handle_revoke(&token).await,
        Commands::PingStore => handle_ping_store().await,
    }
}

fn handle_hash_password(password: &str) -> anyhow::Result<()> {
    let policy = LoginPolicyConfig::from_env();
    let digest = hash_password_with_cost(password, policy.bcrypt_cost)?;
    println!("{}", digest);
    Ok(())
}

fn handle_decode_token(token: &str) -> anyhow::Result<()> {
    let codec = TokenCodec::new(JwtConfig::from_env(), system_clock());

    let claims = codec
        .decode_unchecked_expiry(token)
        .context("Token signature or format is invalid")?;

    println!("{}", serde_json::to_string_pretty(&claims)?);

    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| claims.exp.to_string());

    match codec.decode(token) {
        Ok(_) => println!(
            "valid, expires {} ({}s remaining)",
            expires_at,
            codec.remaining_ttl(&claims).as_secs()
        ),
        Err(AuthError::TokenExpired) => println!("expired at {}", expires_at),
        Err(e) => println!("invalid: {}", e),
    }
    Ok(())
}

fn handle_issue_scoped(subject: &str, purpose: TokenPurpose) -> anyhow::Result<()> {
    let service = ScopedTokenService::new(ScopedTokenConfig::from_env(), system_clock());
    println!("{}", service.issue(subject, purpose)?);
    Ok(())
}

fn handle_verify_scoped(
    token: &str,
    purpose: TokenPurpose,
    max_age: Option<u64>,
) -> anyhow::Result<()> {
    let service = ScopedTokenService::new(ScopedTokenConfig::from_env(), system_clock());

    let subject = match max_age {
        Some(secs) => service.verify(token, purpose, std::time::Duration::from_secs(secs)),
        None => service.verify_default(token, purpose),
    };

    match subject {
        Some(subject) => {
            println!("{}", subject);
            Ok(())
        }
        None => bail!("Token is invalid, expired, or for a different purpose"),
    }
}

async fn handle_revoke(token: &str) -> anyhow::Result<()> {
    let state = AppState::init().await?;
    let result = state.manager.revoke(token).await;
    state.shutdown().await;

    result.context("Revocation failed")?;
    println!("✅ Token revoked");
    Ok(())
}

async fn handle_ping_store() -> anyhow::Result<()> {
    let store = connect_sessions(&system_clock()).await?;
    store.ping().await.context("Session store did not answer")?;
    println!("✅ Session store reachable");
    Ok(())
}
