use std::path::PathBuf;

use clap::Parser;
use minesync::prelude::*;
use minesync::state::Board;
use tokio::io::{AsyncBufReadExt, BufReader};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// WebSocket endpoint of the game authority (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter, e.g. "info" or "minesync=debug" (overrides the config file)
    #[arg(short, long)]
    log: Option<String>,
}

const HELP: &str = "\
commands:
  r ROW COL          reveal a cell
  c ROW COL          chord a cell
  f ROW COL          toggle a flag
  n                  request a new board
  cfg W H MINES      propose the next board size
  q                  quit";

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn cell_char(entry: Entry) -> char {
    match entry {
        Entry::UNKNOWN => '.',
        Entry::FLAGGED => 'F',
        Entry::MINE => '*',
        Entry(0) => ' ',
        Entry(n @ 1..=9) => char::from(b'0' + n),
        Entry(_) => '?',
    }
}

fn render_board(board: &Board) -> String {
    let mut out = String::new();
    for row in board.entries().rows() {
        out.extend(row.iter().map(|&entry| cell_char(entry)));
        out.push('\n');
    }
    out
}

fn render(state: &StateStore) -> String {
    let info = state.board_info();
    let mut out = format!(
        "{}x{}  mines {}  flags {}  left {}  [{}]\n",
        info.width,
        info.height,
        info.mine_count,
        info.flag_count,
        info.mines_left,
        state.board_state(),
    );
    out.push_str(&render_board(state.board()));
    for row in state.scoreboard() {
        let marker = match (row.is_winner, row.is_loser) {
            (true, _) => "W",
            (_, true) => "L",
            _ => " ",
        };
        let me = if row.is_self { " (you)" } else { "" };
        out.push_str(&format!("{marker} {:>5}  {}{me}\n", row.score, row.name));
    }
    if let Some(next) = state.next_board_config() {
        out.push_str(&format!(
            "next round: {}x{} with {} mines\n",
            next.width, next.height, next.mine_count
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

fn parse_position(parts: &[&str]) -> Option<Position> {
    match parts {
        [row, col] => Some(Position::new(row.parse().ok()?, col.parse().ok()?)),
        _ => None,
    }
}

/// Handles one input line. Returns `false` when the user quits.
async fn handle_line(client: &MinesyncClient, line: &str) -> Result<bool, MinesyncError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&command, args)) = parts.split_first() else {
        return Ok(true);
    };

    match (command, parse_position(args)) {
        ("r", Some(pos)) => {
            client.primary_action(ActionMode::Reveal, pos, false).await?;
        }
        ("c", Some(pos)) => {
            client.primary_action(ActionMode::Reveal, pos, true).await?;
        }
        ("f", Some(pos)) => client.send(resolve_secondary(pos))?,
        ("n", _) if args.is_empty() => client.new_board()?,
        ("cfg", _) => {
            let numbers: Option<Vec<u64>> = args.iter().map(|a| a.parse().ok()).collect();
            match numbers.as_deref() {
                Some(&[width, height, mines]) => {
                    if let Err(err) = client.next_board_config(width, height, mines) {
                        println!("{err}");
                    }
                }
                _ => println!("usage: cfg W H MINES"),
            }
        }
        ("q", _) => return Ok(false),
        _ => println!("{HELP}"),
    }
    Ok(true)
}

fn load_config(args: &Args) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => ClientConfig::from_json_str(&std::fs::read_to_string(path)?)?,
        None => ClientConfig::default(),
    };
    if let Some(url) = &args.url {
        config.url = url.clone();
    }
    if let Some(filter) = &args.log {
        config.log_filter = filter.clone();
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(&args)?;
    minesync::init_tracing(&config.log_filter);

    tracing::info!(url = %config.url, "starting headless client");
    let (client, mut events) = MinesyncClient::builder().config(config).start_websocket()?;

    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ClientEvent::State(change)) => {
                    tracing::debug!(?change, "state changed");
                    print!("{}", render(&*client.state().await));
                }
                Some(ClientEvent::Disconnected { retry_in }) => {
                    println!("disconnected, retrying in {retry_in:?}");
                }
                Some(ClientEvent::PacketDropped(reason)) => {
                    tracing::warn!(%reason, "packet dropped");
                }
                Some(event) => tracing::info!(?event, "connection"),
                None => break,
            },
            line = lines.next_line() => match line? {
                Some(line) => {
                    if !handle_line(&client, &line).await? {
                        break;
                    }
                }
                None => break,
            },
        }
    }

    client.shutdown().await?;
    Ok(())
}
