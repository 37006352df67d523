//! deskclient - command line client for the service desk dashboard API.
//!
//! Signs in, keeps the auth token in the persistent or session scope
//! depending on `--remember`, and sends authenticated requests with the
//! token attached as `X-Auth-Token`.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use deskclient_core::api::{ApiClient, RequestOptions};
use deskclient_core::auth::AuthSession;
use deskclient_core::reqwest::{Method, Url};
use deskclient_core::state::{DashboardPeriod, PeriodType, ViewMode};
use deskclient_core::Config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable read instead of prompting for a password
const PASSWORD_ENV: &str = "DESKCLIENT_PASSWORD";

/// Command line client for the service desk dashboard API.
#[derive(Parser)]
#[command(name = "deskclient", version)]
#[command(about = "Command line client for the service desk dashboard API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the token.
    ///
    /// With --remember the token survives restarts; otherwise it lasts
    /// for the current login session only.
    Login {
        /// Username (defaults to the last one used)
        username: Option<String>,

        /// Keep the token across restarts
        #[arg(short, long)]
        remember: bool,
    },

    /// Forget the stored token
    Logout,

    /// Validate the stored token and print the signed-in user
    Whoami,

    /// Trade the stored token for a fresh one
    Refresh,

    /// Check a permission; exits non-zero when it is not granted
    Can {
        resource: String,
        action: String,
    },

    /// Send an authenticated request and print the response body.
    ///
    /// TARGET is either a full URL or an endpoint name, which expands to
    /// the API URL with `?endpoint=<name>`.
    Fetch {
        target: String,

        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Extra header, `Name: value` (repeatable)
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Request body
        #[arg(short, long)]
        data: Option<String>,

        /// Dashboard period filter: today, week, month, year or custom
        #[arg(long)]
        period: Option<PeriodType>,

        /// Start of a custom period (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// End of a custom period (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },

    /// Show or change the saved tickets view
    View {
        /// Switch layout
        #[arg(long)]
        mode: Option<ViewMode>,

        /// Toggle bulk selection mode
        #[arg(long, conflicts_with = "no_bulk")]
        toggle_bulk: bool,

        /// Turn bulk selection mode off
        #[arg(long)]
        no_bulk: bool,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load config")?;
    let storage = config.storage_context()?;
    let client = config.api_client(storage)?;

    match cli.command {
        Commands::Login { username, remember } => {
            let username = match username.or_else(|| config.last_username.clone()) {
                Some(u) => u,
                None => bail!("No username given and none remembered"),
            };
            let password = read_password()?;

            let mut session = AuthSession::new(client);
            let user = session.login(&username, &password, remember).await?;
            eprintln!("Signed in as {}", user.display_name());

            config.last_username = Some(username);
            config.save()?;
        }
        Commands::Logout => {
            AuthSession::new(client).logout()?;
            eprintln!("Signed out");
        }
        Commands::Whoami => {
            let mut session = AuthSession::new(client);
            match session.check_auth().await? {
                Some(user) => println!("{}", serde_json::to_string_pretty(user)?),
                None => {
                    eprintln!("Not signed in");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Refresh => {
            let mut session = AuthSession::new(client);
            if !session.refresh_token().await? {
                eprintln!("Token was not refreshed");
                return Ok(ExitCode::FAILURE);
            }
            eprintln!("Token refreshed");
        }
        Commands::Can { resource, action } => {
            let mut session = AuthSession::new(client);
            if session.check_auth().await?.is_none() {
                eprintln!("Not signed in");
                return Ok(ExitCode::FAILURE);
            }
            let allowed = session.has_permission(&resource, &action);
            println!("{}", if allowed { "allowed" } else { "denied" });
            if !allowed {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Fetch {
            target,
            method,
            headers,
            data,
            period,
            from,
            to,
        } => {
            let period = build_period(period, from, to);
            return fetch(&client, &target, &method, &headers, data, period).await;
        }
        Commands::View {
            mode,
            toggle_bulk,
            no_bulk,
        } => {
            let view = &mut config.tickets_view;
            if let Some(mode) = mode {
                view.set_view_mode(mode);
            }
            if toggle_bulk {
                view.toggle_bulk_mode();
            }
            if no_bulk {
                view.disable_bulk_mode();
            }
            println!("{}", serde_json::to_string_pretty(view)?);
            config.save()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_password() -> Result<String> {
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    rpassword::prompt_password("Password: ").context("Failed to read password")
}

/// A period filter when any period option was given
fn build_period(
    period: Option<PeriodType>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Option<DashboardPeriod> {
    if period.is_none() && from.is_none() && to.is_none() {
        return None;
    }
    let mut selection = DashboardPeriod::new();
    // Bare --from/--to imply a custom period
    selection.set_selected(period.unwrap_or(PeriodType::Custom));
    selection.set_date_from(from);
    selection.set_date_to(to);
    Some(selection)
}

async fn fetch(
    client: &ApiClient,
    target: &str,
    method: &str,
    headers: &[String],
    data: Option<String>,
    period: Option<DashboardPeriod>,
) -> Result<ExitCode> {
    let url = resolve_target(client, target, period.as_ref())?;

    let method: Method = method
        .to_ascii_uppercase()
        .parse()
        .with_context(|| format!("Invalid HTTP method '{}'", method))?;
    let mut options = RequestOptions::new().method(method);
    for header in headers {
        let (name, value) = header
            .split_once(':')
            .with_context(|| format!("Header '{}' is not in 'Name: value' form", header))?;
        options = options.header(name.trim(), value.trim());
    }
    if let Some(data) = data {
        options = options.body(data);
    }

    info!(url = %url, "Sending request");
    let response = client.fetch(url.as_str(), options).await?;
    let status = response.status();
    eprintln!("{}", status);

    let body = response.bytes().await.context("Failed to read response body")?;
    let mut stdout = io::stdout().lock();
    stdout.write_all(&body)?;
    if !body.ends_with(b"\n") {
        writeln!(stdout)?;
    }

    Ok(if status.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Expand an endpoint name to a URL and append period parameters
fn resolve_target(client: &ApiClient, target: &str, period: Option<&DashboardPeriod>) -> Result<Url> {
    let raw = if target.starts_with("http://") || target.starts_with("https://") {
        target.to_string()
    } else {
        client.endpoint_url(target)
    };
    let mut url = Url::parse(&raw).with_context(|| format!("Invalid URL '{}'", raw))?;

    if let Some(period) = period {
        let today = Local::now().date_naive();
        if period.is_custom_period() && period.date_range(today).is_none() {
            bail!("A custom period needs both --from and --to");
        }
        let mut query = url.query_pairs_mut();
        for (key, value) in period.query_pairs(today) {
            query.append_pair(key, &value);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskclient_core::StorageContext;

    fn client() -> ApiClient {
        ApiClient::new(StorageContext::in_memory())
            .unwrap()
            .with_api_url("https://desk.example.com/api")
    }

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_endpoint_name_expands() {
        let url = resolve_target(&client(), "tickets", None).unwrap();
        assert_eq!(url.as_str(), "https://desk.example.com/api?endpoint=tickets");
    }

    #[test]
    fn test_full_url_kept() {
        let url = resolve_target(&client(), "https://other.example.com/x?a=1", None).unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x?a=1");
    }

    #[test]
    fn test_custom_period_appended() {
        let period = build_period(
            None,
            NaiveDate::from_ymd_opt(2026, 9, 1),
            NaiveDate::from_ymd_opt(2026, 9, 30),
        );
        let url = resolve_target(&client(), "dashboard", period.as_ref()).unwrap();
        assert_eq!(
            url.as_str(),
            "https://desk.example.com/api?endpoint=dashboard&period=custom&date_from=2026-09-01&date_to=2026-09-30"
        );
    }

    #[test]
    fn test_incomplete_custom_period_rejected() {
        let period = build_period(Some(PeriodType::Custom), NaiveDate::from_ymd_opt(2026, 9, 1), None);
        assert!(resolve_target(&client(), "dashboard", period.as_ref()).is_err());
    }

    #[test]
    fn test_no_period_options() {
        assert!(build_period(None, None, None).is_none());
    }
}
