//! Task mutations: `kanban add`, `kanban rename`, `kanban rm`, `kanban mv`.
//!
//! Each command loads the board, runs one optimistic mutation and prints
//! the board the user is left with. A rolled-back mutation exits non-zero.

use anyhow::{Result, bail};
use console::style;
use dialoguer::Confirm;
use kanban_sync::board::{DragEvent, MutationOutcome};
use kanban_sync::config::ClientConfig;

use super::board::print_board;
use super::session::Client;

/// Print the outcome and the resulting board. Rollbacks become errors.
fn finish<T>(client: &Client, board_id: i64, outcome: MutationOutcome<T>) -> Result<Option<T>> {
    let value = match outcome {
        MutationOutcome::Committed(value) => Some(value),
        MutationOutcome::Skipped(reason) => {
            println!("{} {}", style("Nothing to do:").yellow(), reason);
            None
        }
        MutationOutcome::RolledBack(failure) => {
            eprintln!("{}", style(failure.to_string()).red().bold());
            if let Some(board) = client.engine.snapshot(board_id) {
                print_board(&board);
            }
            return Err(failure.into());
        }
    };
    if let Some(board) = client.engine.snapshot(board_id) {
        print_board(&board);
    }
    Ok(value)
}

pub async fn cmd_add(config: &ClientConfig, board_id: i64, column_id: i64, title: &str) -> Result<()> {
    let client = Client::connect(config)?;
    client.engine.load_board(board_id).await?;
    let outcome = client.engine.create_task(board_id, column_id, title).await;
    if let Some(task) = finish(&client, board_id, outcome)? {
        println!("{} task {}", style("Created").green(), task.id);
    }
    Ok(())
}

pub async fn cmd_rename(config: &ClientConfig, board_id: i64, task_id: i64, title: &str) -> Result<()> {
    let client = Client::connect(config)?;
    client.engine.load_board(board_id).await?;
    let outcome = client.engine.edit_title(board_id, task_id, title).await;
    finish(&client, board_id, outcome)?;
    Ok(())
}

pub async fn cmd_rm(config: &ClientConfig, board_id: i64, task_id: i64, yes: bool) -> Result<()> {
    let client = Client::connect(config)?;
    let board = client.engine.load_board(board_id).await?;
    let Some(task) = board.task(task_id) else {
        bail!("Task {} is not on board {}", task_id, board_id);
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete \"{}\"?", task.title))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = client.engine.delete_task(board_id, task_id).await;
    finish(&client, board_id, outcome)?;
    Ok(())
}

/// Move `task_id` as if it were dragged onto `over` (a task) or onto the
/// empty area of column `to`, which puts it at the head.
pub async fn cmd_mv(
    config: &ClientConfig,
    board_id: i64,
    task_id: i64,
    to: i64,
    over: Option<i64>,
) -> Result<()> {
    let client = Client::connect(config)?;
    let board = client.engine.load_board(board_id).await?;
    let Some(task) = board.task(task_id) else {
        bail!("Task {} is not on board {}", task_id, board_id);
    };

    let event = DragEvent {
        active_id: Some(task_id.to_string()),
        over_id: over.map(|id| id.to_string()),
        source_container: Some(task.column.to_string()),
        destination_container: Some(to.to_string()),
    };
    let outcome = client.engine.reorder(board_id, &event).await;
    finish(&client, board_id, outcome)?;
    Ok(())
}
