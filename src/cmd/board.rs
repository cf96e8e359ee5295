//! Board listing and display: `kanban boards`, `kanban show`.

use anyhow::Result;
use console::style;
use kanban_sync::board::Board;
use kanban_sync::board::engine::is_speculative;
use kanban_sync::config::ClientConfig;

use super::session::Client;

pub async fn cmd_boards(config: &ClientConfig) -> Result<()> {
    let client = Client::connect(config)?;
    let boards = client.engine.list_boards().await?;

    println!();
    println!("{}", style("My Boards").bold());
    println!();
    if boards.is_empty() {
        println!("No boards yet.");
    }
    for board in &boards {
        println!("  {:>4}  {}", board.id, board.name);
    }
    println!();
    Ok(())
}

pub async fn cmd_show(config: &ClientConfig, board_id: i64) -> Result<()> {
    let client = Client::connect(config)?;
    let board = client.engine.load_board(board_id).await?;
    print_board(&board);
    Ok(())
}

pub fn print_board(board: &Board) {
    println!();
    println!("{}", style(&board.name).bold());
    for column in &board.columns {
        println!();
        println!("{} {}", style(&column.name).cyan().bold(), style(format!("#{}", column.id)).dim());
        if column.tasks.is_empty() {
            println!("  {}", style("No tasks").dim());
        }
        for task in &column.tasks {
            let id = if is_speculative(task.id) {
                "…".to_string()
            } else {
                task.id.to_string()
            };
            println!("  {:>2}. [{}] {}", task.position, id, task.title);
        }
    }
    println!();
}
