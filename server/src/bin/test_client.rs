//! Scripted command-line client for poking a running server.
//!
//! Plays the given moves in order, acting for whichever side each notation
//! names, and prints every event the server sends back.

use clap::Parser;
use futures_util::{SinkExt, StreamExt};
use log::warn;
use shared::{ClientMessage, MoveNotation, ServerEvent, SessionSnapshot};
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server address
    #[clap(short, long, default_value = "127.0.0.1:8080")]
    server: String,
    /// How long to wait for replies after each move, in milliseconds
    #[clap(short, long, default_value = "300")]
    wait_ms: u64,
    /// Moves to play, e.g. A-H1:B B-H1:F
    moves: Vec<String>,
}

fn render(state: &SessionSnapshot) -> String {
    let mut out = String::new();
    for row in &state.board {
        for cell in row {
            match cell {
                Some(piece) => out.push_str(&format!("{:<6}", piece.to_string())),
                None => out.push_str(".     "),
            }
        }
        out.push('\n');
    }
    out.push_str(&format!("turn: {}", state.turn));
    out
}

fn print_event(event: &ServerEvent) {
    match event {
        ServerEvent::Init { state } => println!("[init]\n{}", render(state)),
        ServerEvent::Update { state } => println!("[update]\n{}", render(state)),
        ServerEvent::GameOver { winner } => println!("[gameOver] winner: {}", winner),
        ServerEvent::Invalid => println!("[invalid]"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let wait = Duration::from_millis(args.wait_ms);

    let (ws, _) = connect_async(format!("ws://{}", args.server)).await?;
    println!("Connected to {}", args.server);
    let (mut sink, mut source) = ws.split();

    // Initial sync, then replies to each move.
    let mut pending: Vec<Option<String>> = vec![None];
    pending.extend(args.moves.iter().cloned().map(Some));

    for step in pending {
        if let Some(raw) = step {
            let notation: MoveNotation = match raw.parse() {
                Ok(notation) => notation,
                Err(e) => {
                    warn!("Skipping {}: {}", raw, e);
                    continue;
                }
            };
            let message = ClientMessage::Move {
                player: notation.piece.owner,
                notation,
            };
            sink.send(Message::Text(serde_json::to_string(&message)?))
                .await?;
            println!("--> {}", raw);
        }

        while let Ok(Some(frame)) = timeout(wait, source.next()).await {
            match frame? {
                Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => print_event(&event),
                    Err(e) => warn!("Unrecognized event {}: {}", text, e),
                },
                Message::Close(_) => return Ok(()),
                _ => {}
            }
        }
    }

    sink.close().await?;
    Ok(())
}
