use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(version, about = "Kanban board client with optimistic updates")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Path to kanban.toml. Defaults to the user config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the board API. Overrides kanban.toml and KANBAN_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and remember the access token
    Login {
        username: String,
        /// Read the password from stdin instead of prompting
        #[arg(long)]
        password_stdin: bool,
    },
    /// Forget the stored access token
    Logout,
    /// List your boards
    Boards,
    /// Show a board's columns and tasks
    Show { board: i64 },
    /// Add a task to the top of a column
    Add {
        board: i64,
        column: i64,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Change a task's title
    Rename {
        board: i64,
        task: i64,
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },
    /// Delete a task
    Rm {
        board: i64,
        task: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a task, as if dragged onto another task or column
    Mv {
        board: i64,
        task: i64,
        /// Destination column
        #[arg(long)]
        to: i64,
        /// Task to drop onto; the task takes its place
        #[arg(long)]
        over: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    kanban_sync::logging::init(cli.verbose, cli.json_logs);

    let config = cmd::load_config(&cli)?;

    match &cli.command {
        Commands::Login {
            username,
            password_stdin,
        } => cmd::cmd_login(&config, username, *password_stdin).await?,
        Commands::Logout => cmd::cmd_logout(&config)?,
        Commands::Boards => cmd::cmd_boards(&config).await?,
        Commands::Show { board } => cmd::cmd_show(&config, *board).await?,
        Commands::Add {
            board,
            column,
            title,
        } => cmd::cmd_add(&config, *board, *column, &title.join(" ")).await?,
        Commands::Rename { board, task, title } => {
            cmd::cmd_rename(&config, *board, *task, &title.join(" ")).await?
        }
        Commands::Rm { board, task, yes } => cmd::cmd_rm(&config, *board, *task, *yes).await?,
        Commands::Mv {
            board,
            task,
            to,
            over,
        } => cmd::cmd_mv(&config, *board, *task, *to, *over).await?,
    }

    Ok(())
}
