use std::time::Duration;

use clap::Parser;
use log::{info, warn};
use tokio::time::{interval, MissedTickBehavior};

use rutquery::error::UtQueryError;
use rutquery::info::{PlayerInfo, ServerInfo};
use rutquery::query::query;
use rutquery::table::FormattedTable;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Query address of the server, host:port (the game port + 1)
    server: String,

    /// Seconds between display refreshes
    #[arg(short, long, default_value = "5")]
    interval: u64,

    /// Seconds to wait for a response before giving up on a cycle
    #[arg(short, long, default_value = "3")]
    timeout: u64,

    /// Also list the server settings under the player table
    #[arg(short, long)]
    settings: bool,

    /// Query once, print, and exit instead of refreshing
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();

    if args.once {
        let mut table = player_table();
        refresh(&args, &mut table).await?;
        return Ok(());
    }

    info!("Monitoring {} every {}s", args.server, args.interval);

    tokio::select! {
        _ = monitor(&args) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}

/// Refreshes the display on a fixed cadence until cancelled.
///
/// A failed cycle keeps the previous screen up rather than wiping it
/// with empty data; the error goes to the log and the next tick tries
/// again.
async fn monitor(args: &Args) {
    let mut ticker = interval(Duration::from_secs(args.interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut table = player_table();
    loop {
        // first tick fires immediately
        ticker.tick().await;
        if let Err(err) = refresh(args, &mut table).await {
            warn!("query cycle failed: {err}");
            eprintln!("no update: {err}");
        }
    }
}

async fn refresh(args: &Args, table: &mut FormattedTable) -> Result<(), UtQueryError> {
    let timeout = Duration::from_secs(args.timeout);
    let (info, players) = query(&args.server, Some(timeout)).await?;
    render(args, table, &info, &players);
    Ok(())
}

fn player_table() -> FormattedTable {
    FormattedTable::new(["Name", "Score", "Ping", "Team", "ID"])
}

fn render(args: &Args, table: &mut FormattedTable, info: &ServerInfo, players: &[PlayerInfo]) {
    table.clear_rows();
    for player in players {
        table.add_row([
            player.name.clone(),
            player.score.to_string(),
            player.ping.to_string(),
            player.team.to_string(),
            player.id.to_string(),
        ]);
    }

    if !args.once {
        // clear screen, cursor home
        print!("\x1b[2J\x1b[H");
    }
    println!("SERVER: {}", info.name);
    println!(
        "MAP: {} Players: {} / {}",
        info.map, info.cur_players, info.max_players
    );
    println!("{table}");

    if args.settings {
        println!();
        println!("Server settings:");
        let mut settings: Vec<_> = info.settings.iter().collect();
        settings.sort();
        for (key, value) in settings {
            println!("{key}: {value}");
        }
    }
}
