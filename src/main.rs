use snake_arcade::arcade::{Arcade, ArcadeEvent};
use snake_arcade::core::build_info;
use snake_arcade::core::constants::HOST_POLL_MS;
use snake_arcade::core::{ArcadeConfig, Clock, SystemClock};
use snake_arcade::economy::heart_bundles;
use snake_arcade::economy::level_cost;
use snake_arcade::game::{GameMode, GamePhase, Level, Position, SnakeGame};
use snake_arcade::remote::LeaderboardPeriod;
use snake_arcade::simulator::choose_direction;
use std::process::ExitCode;
use std::time::Duration;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("status");
    let rest = args.get(2..).unwrap_or(&[]);

    match command {
        "--version" | "-v" => {
            println!("{}", build_info::version_line());
            return ExitCode::SUCCESS;
        }
        "--help" | "-h" => {
            print_help();
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let mut arcade = Arcade::open(ArcadeConfig::load());
    if !arcade.storage().is_durable() {
        eprintln!("Warning: storage unavailable, progress will not be saved.");
    }

    let ok = match command {
        "status" => status(&arcade),
        "play" => play(&mut arcade, rest),
        "unlock" => unlock(&mut arcade, rest),
        "buy-hearts" => buy_hearts(&mut arcade, rest),
        "login" => login(&mut arcade, rest),
        "register" => register(&mut arcade, rest),
        "logout" => {
            arcade.logout();
            println!("Logged out.");
            true
        }
        "sync" => sync(&mut arcade),
        "leaderboard" => leaderboard(&arcade, rest),
        "stats" => stats(&arcade),
        "reset" => reset(&mut arcade, rest),
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'snake-arcade --help' for usage.");
            false
        }
    };

    // Let debounced changes reach the server before exiting.
    if arcade.sync().is_pending() {
        arcade.sync_now();
    }
    let _ = arcade.wait_for_sync();
    arcade.wait_for_uploads();
    arcade.shutdown();

    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_help() {
    println!("Snake Arcade\n");
    println!("Usage: snake-arcade [command] [args]\n");
    println!("Commands:");
    println!("  status                           Show gems, hearts, levels and high score");
    println!("  play [level] [mode] [--watch] [--use-hearts]");
    println!("                                   Autopilot game (level 1-3, easy/normal/hard);");
    println!("                                   --use-hearts spends hearts to continue");
    println!("  unlock <level>                   Spend gems to unlock level 2 or 3");
    println!("  buy-hearts <1|3|5>               Buy a heart bundle");
    println!("  login <email> <password>         Log in and sync progress");
    println!("  register <user> <email> <pass>   Create an account and sync progress");
    println!("  logout                           Forget the saved session");
    println!("  sync                             Sync progress now");
    println!("  leaderboard [period]             global, daily, weekly or monthly");
    println!("  stats                            Your account statistics");
    println!("  reset --yes                      Erase local progress");
    println!("  --version                        Show version information");
    println!("  --help                           Show this help message");
}

fn status(arcade: &Arcade) -> bool {
    let economy = arcade.economy().snapshot();
    println!("Gems:       {}", economy.gems);
    println!("Hearts:     {}", economy.hearts);
    println!("High score: {}", economy.high_score);
    println!("Levels:");
    for level in Level::ALL {
        let state = if economy.is_level_unlocked(level) {
            "unlocked".to_string()
        } else {
            format!("locked ({} gems)", level_cost(level))
        };
        println!("  {} {:<8} {}", level.number(), level.name(), state);
    }
    let last_sync = arcade.storage().get_game_data().last_sync;
    match (arcade.is_authenticated(), last_sync) {
        (true, Some(at)) => println!("Last sync:  {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
        (true, None) => println!("Last sync:  never"),
        (false, _) => println!("Not logged in."),
    }
    true
}

fn parse_level(arg: Option<&String>) -> Option<Level> {
    arg.and_then(|s| s.parse().ok()).and_then(Level::from_number)
}

fn unlock(arcade: &mut Arcade, args: &[String]) -> bool {
    let Some(level) = parse_level(args.first()) else {
        eprintln!("Usage: snake-arcade unlock <2|3>");
        return false;
    };
    if arcade.economy().is_level_unlocked(level) {
        println!("{} is already unlocked.", level.name());
        return true;
    }
    if arcade.unlock_level(level) {
        println!("Unlocked {}.", level.name());
        true
    } else {
        eprintln!(
            "Not enough gems: {} costs {}, you have {}.",
            level.name(),
            level_cost(level),
            arcade.economy().gems()
        );
        false
    }
}

fn buy_hearts(arcade: &mut Arcade, args: &[String]) -> bool {
    let Some(hearts) = args.first().and_then(|s| s.parse::<u32>().ok()) else {
        eprintln!("Usage: snake-arcade buy-hearts <count>");
        for bundle in heart_bundles() {
            eprintln!("  {} hearts for {} gems", bundle.hearts, bundle.cost);
        }
        return false;
    };
    if arcade.buy_hearts(hearts) {
        println!("Bought {} hearts. You now have {}.", hearts, arcade.economy().hearts());
        true
    } else {
        eprintln!("Purchase failed (unknown bundle or not enough gems).");
        false
    }
}

fn login(arcade: &mut Arcade, args: &[String]) -> bool {
    let [email, password, ..] = args else {
        eprintln!("Usage: snake-arcade login <email> <password>");
        return false;
    };
    match arcade.login(email, password) {
        Ok(user) => {
            println!("Logged in as {}.", user.username);
            true
        }
        Err(e) => {
            eprintln!("Login failed: {}", e);
            false
        }
    }
}

fn register(arcade: &mut Arcade, args: &[String]) -> bool {
    let [username, email, password, ..] = args else {
        eprintln!("Usage: snake-arcade register <username> <email> <password>");
        return false;
    };
    match arcade.register(username, email, password) {
        Ok(user) => {
            println!("Welcome, {}!", user.username);
            true
        }
        Err(e) => {
            eprintln!("Registration failed: {}", e);
            false
        }
    }
}

fn sync(arcade: &mut Arcade) -> bool {
    if !arcade.is_authenticated() {
        eprintln!("Log in first.");
        return false;
    }
    arcade.sync_now();
    match arcade.wait_for_sync() {
        Some(Ok(state)) => {
            println!(
                "Synced: {} gems, {} hearts, high score {}.",
                state.gems, state.hearts, state.high_score
            );
            true
        }
        Some(Err(e)) => {
            eprintln!("Sync failed: {}", e);
            false
        }
        None => false,
    }
}

fn leaderboard(arcade: &Arcade, args: &[String]) -> bool {
    let period = match args.first() {
        Some(s) => match LeaderboardPeriod::parse(s) {
            Some(p) => p,
            None => {
                eprintln!("Unknown period: {}", s);
                return false;
            }
        },
        None => LeaderboardPeriod::Global,
    };
    match arcade.leaderboard(period) {
        Ok(entries) => {
            println!("{} leaderboard", period.as_str());
            for entry in entries {
                println!(
                    "  {:>3}. {:<20} {:>6}  (level {})",
                    entry.rank, entry.username, entry.score, entry.level
                );
            }
            true
        }
        Err(e) => {
            eprintln!("Could not load leaderboard: {}", e);
            false
        }
    }
}

fn stats(arcade: &Arcade) -> bool {
    match arcade.user_stats() {
        Ok(stats) => {
            println!("Games played: {}", stats.games_played);
            println!("Total score:  {}", stats.total_score);
            println!("Best score:   {}", stats.best_score);
            println!("Fruits eaten: {}", stats.fruits_eaten);
            true
        }
        Err(e) => {
            eprintln!("Could not load stats: {}", e);
            false
        }
    }
}

fn reset(arcade: &mut Arcade, args: &[String]) -> bool {
    if !args.iter().any(|a| a == "--yes") {
        eprintln!("This erases all local progress. Re-run with --yes to confirm.");
        return false;
    }
    arcade.reset_progress();
    println!("Progress reset.");
    true
}

fn render(game: &SnakeGame) -> String {
    let mut out = String::new();
    for y in 0..game.grid.height {
        for x in 0..game.grid.width {
            let p = Position::new(x, y);
            let c = if p == game.head() {
                '@'
            } else if game.snake.contains(&p) {
                'o'
            } else if p == game.food.position {
                '*'
            } else if game.obstacles().contains(&p) {
                '#'
            } else {
                '.'
            };
            out.push(c);
        }
        out.push('\n');
    }
    out
}

/// Watch the autopilot play one game in real time.
fn play(arcade: &mut Arcade, args: &[String]) -> bool {
    let level = parse_level(args.first()).unwrap_or(Level::Classic);
    let mode = args.get(1).and_then(|s| GameMode::parse(s));
    let watch = args.iter().any(|a| a == "--watch");

    let clock = SystemClock::new();
    if let Err(e) = arcade.start_game(level, mode, clock.now_ms()) {
        eprintln!("{}", e);
        return false;
    }

    loop {
        let now = clock.now_ms();
        if let Some(dir) = arcade.game().and_then(choose_direction) {
            arcade.change_direction(dir);
        }

        for event in arcade.poll(now) {
            match event {
                ArcadeEvent::FoodEaten(eaten) => {
                    if eaten.gems > 0 {
                        println!("{} (+{} gems)", eaten.food_type.name(), eaten.gems);
                    } else if let Some(kind) = eaten.power_up {
                        println!("{}!", kind.name());
                    }
                }
                ArcadeEvent::GameOver {
                    cause,
                    score,
                    new_high_score,
                } => {
                    println!("Game over ({:?}). Score {}.", cause, score);
                    if new_high_score {
                        println!("New high score!");
                    }
                }
                ArcadeEvent::PowerUpExpired(_) => {}
                ArcadeEvent::Synced(_) | ArcadeEvent::SyncFailed(_) => {}
            }
        }

        if watch {
            if let Some(game) = arcade.game() {
                println!("\x1b[H\x1b[2J{}score {}", render(game), game.score);
            }
        }

        match arcade.game().map(|g| g.phase()) {
            Some(GamePhase::GameOver) => {
                let hearts = arcade.economy().hearts();
                if hearts > 0 && args.iter().any(|a| a == "--use-hearts") {
                    if let Ok(true) = arcade.continue_with_heart(clock.now_ms()) {
                        println!("Continuing ({} hearts left).", hearts - 1);
                        continue;
                    }
                }
                break;
            }
            Some(_) => {}
            None => break,
        }

        let wait = arcade
            .next_deadline()
            .map_or(HOST_POLL_MS, |at| at.saturating_sub(clock.now_ms()))
            .min(HOST_POLL_MS);
        std::thread::sleep(Duration::from_millis(wait));
    }

    arcade.end_session();
    true
}
