//! Sign-in commands and client construction: `kanban login`, `kanban logout`.

use std::io::BufRead;
use std::sync::Arc;

use anyhow::{Context, Result};
use kanban_sync::board::{BoardStore, HttpTaskGateway, MutationEngine, Session};
use kanban_sync::config::{ClientConfig, load_session_token, save_session_token};

use crate::Cli;

/// Resolve configuration: file → environment → CLI flags.
pub fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    Ok(config)
}

/// Session seeded from `KANBAN_TOKEN`, else from the session file.
fn restore_session(config: &ClientConfig) -> Result<Session> {
    let session = Session::new();
    if let Some(token) = &config.token {
        session.set_access(token.clone());
    } else if let Some(path) = &config.session_file
        && let Some(token) = load_session_token(path)?
    {
        session.set_access(token);
    }
    Ok(session)
}

/// Everything a board command needs.
pub struct Client {
    pub engine: MutationEngine,
}

impl Client {
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let session = restore_session(config)?;
        if !session.is_authenticated() {
            anyhow::bail!("Not logged in. Run 'kanban login <username>' first.");
        }
        let gateway = Arc::new(
            HttpTaskGateway::new(config, session).context("Failed to create API client")?,
        );
        let store = Arc::new(BoardStore::new());
        let engine = MutationEngine::new(store, gateway);
        Ok(Self { engine })
    }
}

pub async fn cmd_login(config: &ClientConfig, username: &str, password_stdin: bool) -> Result<()> {
    let password = if password_stdin {
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read password from stdin")?;
        line.trim_end_matches(['\r', '\n']).to_string()
    } else {
        dialoguer::Password::new()
            .with_prompt("Password")
            .interact()
            .context("Failed to read password")?
    };

    let gateway = HttpTaskGateway::new(config, Session::new())
        .context("Failed to create API client")?;
    gateway.login(username, &password).await?;

    if let (Some(path), Some(token)) = (&config.session_file, gateway.session().access()) {
        save_session_token(path, &token)?;
    }
    println!("{}", console::style(format!("Logged in as {}", username)).green());
    Ok(())
}

pub fn cmd_logout(config: &ClientConfig) -> Result<()> {
    if let Some(path) = &config.session_file
        && path.exists()
    {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove session file: {}", path.display()))?;
    }
    println!("Logged out.");
    Ok(())
}
