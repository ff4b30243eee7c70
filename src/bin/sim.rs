use std::io::Write;
use std::time::Instant;

use clap::Parser;
use dog_engine::cli::{PlayerInstance, StatisticsAccumulator, create_player, print_player_help};
use dog_engine::engine::GameEngine;
use dog_engine::game::{Game, GameConfig, PLAYER_COUNT};
use dog_engine::game::state::TEAMS;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser, Clone)]
#[command(name = "dog-sim")]
#[command(about = "Dog simulator - play games between move-selection strategies")]
struct Args {
    /// Number of games to play
    #[arg(short = 'n', long, default_value_t = 5)]
    num: u32,

    /// Comma-separated player codes, one per seat (e.g. R,R,R,R)
    #[arg(long, default_value = "R,R,R,R")]
    players: String,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Show player codes and exit
    #[arg(long)]
    help_players: bool,

    /// Silence console output
    #[arg(long)]
    quiet: bool,

    /// Log every move (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,

    /// Print the board of the last game
    #[arg(long)]
    print_final: bool,

    /// Dump the final state of the last game as JSON
    #[arg(long)]
    dump_state: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.help_players {
        print_player_help();
        return;
    }

    let codes: Vec<&str> = args.players.split(',').map(str::trim).collect();
    if codes.len() != PLAYER_COUNT {
        eprintln!("Error: Must specify exactly {PLAYER_COUNT} players");
        std::process::exit(1);
    }

    let mut players: Vec<PlayerInstance> = Vec::with_capacity(PLAYER_COUNT);
    for (seat, code) in codes.iter().enumerate() {
        match create_player(code, Some(args.seed.wrapping_add(seat as u64 + 1))) {
            Some(player) => players.push(player),
            None => {
                eprintln!("Error: Unknown player code '{code}'");
                eprintln!("Use --help-players to see available codes");
                std::process::exit(1);
            }
        }
    }

    let mut stats = StatisticsAccumulator::new();
    let mut last_game = None;

    for game_idx in 0..args.num {
        let config = GameConfig {
            seed: args.seed + game_idx as u64,
            ..GameConfig::default()
        };

        let start = Instant::now();
        let mut game = Game::new(config);
        let winner = game.play(&players);
        let duration = start.elapsed();
        stats.after(&game, duration);

        if !args.quiet {
            let last_n = 10;
            if game_idx < last_n || game_idx >= args.num.saturating_sub(last_n) {
                let winner_str = winner
                    .map(|team| format!("{team:?}"))
                    .unwrap_or_else(|| "None".to_string());
                let rounds = game.state().map(|s| s.round).unwrap_or(0);
                println!(
                    "Game {:>4}: Winner={:>6}, Rounds={:>4}, Ticks={:>5}, Duration={:?}",
                    game_idx + 1,
                    winner_str,
                    rounds,
                    game.ticks,
                    duration
                );
            } else if (game_idx + 1) % 100 == 0 {
                print!(".");
                let _ = std::io::stdout().flush();
            }
        }
        last_game = Some(game);
    }

    if let Some(game) = &last_game {
        if args.print_final {
            if let Some(state) = game.state() {
                println!("\n{state}");
            }
        }
        if args.dump_state {
            match game.get_state().map(|state| serde_json::to_string_pretty(&state)) {
                Ok(Ok(json)) => println!("{json}"),
                Ok(Err(err)) => eprintln!("Error: could not serialize state: {err}"),
                Err(err) => eprintln!("Error: {err}"),
            }
        }
    }

    if !args.quiet {
        print_summary(&stats, &players);
    }
}

fn print_summary(stats: &StatisticsAccumulator, players: &[PlayerInstance]) {
    println!("\n{}", "=".repeat(80));
    println!("SIMULATION SUMMARY");
    println!("{}", "=".repeat(80));

    println!("\nTeam Summary:");
    println!("{:<30} {:<10} {:<12}", "Team", "Wins", "Win Rate");
    println!("{}", "-".repeat(50));
    for (idx, team) in TEAMS.iter().enumerate() {
        let wins = stats.stats.wins[idx];
        let win_rate = if stats.stats.games > 0 {
            (wins as f64 / stats.stats.games as f64) * 100.0
        } else {
            0.0
        };
        let members = team
            .iter()
            .map(|seat| format!("{} (seat {seat})", players[*seat].name()))
            .collect::<Vec<_>>()
            .join(" + ");
        println!("{:<30} {:<10} {:<11.1}%", members, wins, win_rate);
    }

    println!("\nGame Summary:");
    println!("  Total Games: {}", stats.stats.games);
    println!("  Unfinished: {}", stats.stats.unfinished);
    println!("  Avg Rounds: {:.2}", stats.stats.get_avg_rounds());
    println!("  Avg Ticks: {:.2}", stats.stats.get_avg_ticks());
    println!("  Avg Duration: {:.2?}", stats.stats.get_avg_duration());
}
