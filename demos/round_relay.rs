//! Round relay demo
//!
//! Run with: cargo run --example round_relay [ROUNDS]
//!
//! A producer task plays a quiz: every 500ms it emits a burst containing a
//! few round-start messages and several answers. The relay keeps the last
//! two round starts and the last answer of each burst and fans them out.
//!
//! ## Subscribers
//!
//! - scoreboard: round starts and answers on one channel
//! - announcer: round starts only
//! - sleeper: subscribes with a one-slot channel and never reads, so it is
//!   evicted on the first burst
//!
//! Set `RUST_LOG=round_relay=trace` to watch each pass.

use std::time::Duration;

use bytes::Bytes;
use round_relay::{ChannelSource, Message, MessageType, Relay, RelayConfig};
use tokio::sync::mpsc;

fn print_usage() {
    eprintln!("Usage: round_relay [ROUNDS]");
    eprintln!();
    eprintln!("  ROUNDS  number of rounds to play (default: 5)");
}

async fn play(input: mpsc::Sender<Message>, rounds: u32) {
    let mut ticker = tokio::time::interval(Duration::from_millis(500));

    for round in 1..=rounds {
        ticker.tick().await;

        // A burst: stale round starts, then a flurry of answers
        let mut burst = vec![
            Message::start_new_round(Bytes::from(format!("round {} (warmup)", round))),
            Message::start_new_round(Bytes::from(format!("round {}", round))),
        ];
        for player in ["ada", "brian", "grace"] {
            burst.push(Message::received_answer(Bytes::from(format!(
                "round {}: answer from {}",
                round, player
            ))));
        }
        burst.push(Message::start_new_round(Bytes::from(format!(
            "round {} (final call)",
            round
        ))));

        for message in burst {
            if input.send(message).await.is_err() {
                return;
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let rounds = match args.get(1) {
        Some(arg) if arg == "-h" || arg == "--help" => {
            print_usage();
            return Ok(());
        }
        Some(arg) => match arg.parse::<u32>() {
            Ok(n) => n,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => 5,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("round_relay=debug".parse()?),
        )
        .init();

    let (input, source) = ChannelSource::channel(256);
    let relay = Relay::new(source, RelayConfig::default())?;
    let handle = relay.handle();

    let (score_tx, mut score_rx) = mpsc::channel(16);
    handle.subscribe(MessageType::START_NEW_ROUND, score_tx.clone());
    handle.subscribe(MessageType::RECEIVED_ANSWER, score_tx);

    let (announce_tx, mut announce_rx) = mpsc::channel(16);
    handle.subscribe(MessageType::START_NEW_ROUND, announce_tx);

    let (sleeper_tx, _sleeper_rx) = mpsc::channel(1);
    handle.subscribe(MessageType::START_NEW_ROUND, sleeper_tx);

    let relay_task = relay.spawn();
    let producer = tokio::spawn(play(input, rounds));

    tokio::spawn(async move {
        while let Some(message) = announce_rx.recv().await {
            println!("[announcer] {}", String::from_utf8_lossy(&message.payload));
        }
    });

    let scoreboard = async {
        while let Some(message) = score_rx.recv().await {
            println!(
                "[scoreboard] {:<16} {}",
                message.message_type.to_string(),
                String::from_utf8_lossy(&message.payload)
            );
        }
    };

    tokio::select! {
        _ = scoreboard => {}
        _ = producer => {
            // Let the final burst flush
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    let stats = handle.stats();
    println!();
    println!(
        "Stats: passes={} buffered={} overwritten={} delivered={} evicted={}",
        stats.passes,
        stats.messages_buffered,
        stats.messages_overwritten,
        stats.messages_delivered,
        stats.subscribers_evicted,
    );

    relay_task.abort();
    Ok(())
}
