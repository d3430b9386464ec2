use anyhow::Context;
use flipcard_core::{
    BalanceStore, Catalog, Event, FlipTable, GameConfig, MemoryBalance, RevealOutcome, RngState,
    SharedBet,
};
use flipcard_data::{default_balance_path, load_catalog, load_game_config, FileBalanceStore};
use flipcard_sim::{run_simulation, write_json, write_text, SimConfig};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const MAX_WAIT_MS: u64 = 60_000;

type Table = FlipTable<Box<dyn BalanceStore>, SharedBet>;

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    sim: bool,
    seed: Option<u64>,
    rounds: Option<u32>,
    hand: Option<u32>,
    rtp: Option<f64>,
    assets: PathBuf,
    json: Option<PathBuf>,
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Play(u32),
    Flip(usize),
    Bet(f64),
    Wait(u64),
    Table,
    Status,
    Stats,
    Help,
    Quit,
}

fn parse_cli_options(args: &[String]) -> CliOptions {
    let mut options = CliOptions {
        sim: false,
        seed: None,
        rounds: None,
        hand: None,
        rtp: None,
        assets: PathBuf::from("assets"),
        json: None,
        report: None,
    };
    let mut idx = 0usize;
    while idx < args.len() {
        let value = args.get(idx + 1);
        match args[idx].as_str() {
            "--sim" => options.sim = true,
            "--seed" => {
                options.seed = value.and_then(|v| v.parse::<u64>().ok());
                idx += 1;
            }
            "--rounds" => {
                options.rounds = value.and_then(|v| v.parse::<u32>().ok());
                idx += 1;
            }
            "--hand" => {
                options.hand = value.and_then(|v| v.parse::<u32>().ok());
                idx += 1;
            }
            "--rtp" => {
                options.rtp = value.and_then(|v| v.parse::<f64>().ok());
                idx += 1;
            }
            "--assets" => {
                if let Some(v) = value {
                    options.assets = PathBuf::from(v);
                }
                idx += 1;
            }
            "--json" => {
                options.json = value.map(PathBuf::from);
                idx += 1;
            }
            "--report" => {
                options.report = value.map(PathBuf::from);
                idx += 1;
            }
            other => warn!(arg = other, "ignoring unknown argument"),
        }
        idx += 1;
    }
    options
}

fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    let command = match head.to_ascii_lowercase().as_str() {
        "play" | "p" => Command::Play(parse_arg(arg, "play <hand cards>")?),
        "flip" | "f" => Command::Flip(parse_arg(arg, "flip <slot>")?),
        "bet" | "b" => {
            let amount: f64 = parse_arg(arg, "bet <amount>")?;
            if !amount.is_finite() || amount < 0.0 {
                return Err(format!("invalid bet {amount}"));
            }
            Command::Bet(amount)
        }
        "wait" | "w" => Command::Wait(parse_arg(arg, "wait <ms>")?),
        "table" | "t" => Command::Table,
        "status" | "s" => Command::Status,
        "stats" => Command::Stats,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}', try 'help'")),
    };
    Ok(Some(command))
}

fn parse_arg<T: std::str::FromStr>(arg: Option<&str>, usage: &str) -> Result<T, String> {
    arg.and_then(|value| value.parse::<T>().ok())
        .ok_or_else(|| format!("usage: {usage}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = parse_cli_options(&args);
    let config = load_game_config(&options.assets)?;
    let catalog = load_catalog(&options.assets)?;
    if options.sim {
        return run_sim(&options, &config, &catalog);
    }
    run_interactive(&options, config, catalog)
}

fn run_sim(options: &CliOptions, config: &GameConfig, catalog: &Catalog) -> anyhow::Result<()> {
    let defaults = SimConfig::default();
    let sim = SimConfig {
        seed: options.seed.unwrap_or(defaults.seed),
        rounds: options.rounds.unwrap_or(defaults.rounds),
        hand_size: options.hand.unwrap_or(defaults.hand_size),
        target_rtp: options.rtp,
    };
    let result = run_simulation(&sim, config, catalog).context("simulation failed")?;
    println!("{}", result.to_summary_report());
    if let Some(path) = options.json.as_ref() {
        write_json(path, &result).with_context(|| format!("write {}", path.display()))?;
        println!("json: {}", path.display());
    }
    if let Some(path) = options.report.as_ref() {
        write_text(path, &result).with_context(|| format!("write {}", path.display()))?;
        println!("report: {}", path.display());
    }
    Ok(())
}

fn open_balance(starting_balance: f64) -> anyhow::Result<Box<dyn BalanceStore>> {
    match default_balance_path() {
        Some(path) => {
            let store = FileBalanceStore::open(&path, starting_balance)
                .with_context(|| format!("open balance {}", path.display()))?;
            info!(path = %path.display(), balance = store.balance(), "balance loaded");
            Ok(Box::new(store))
        }
        None => {
            warn!("no HOME or FLIPCARD_BALANCE, balance will not be saved");
            Ok(Box::new(MemoryBalance::new(starting_balance)))
        }
    }
}

fn run_interactive(options: &CliOptions, config: GameConfig, catalog: Catalog) -> anyhow::Result<()> {
    let balance = open_balance(config.round.starting_balance)?;
    let bet = SharedBet::new(config.round.base_bet);
    let rng = options
        .seed
        .map(RngState::from_seed)
        .unwrap_or_else(RngState::from_entropy);
    let mut table: Table = FlipTable::new(config, catalog, balance, bet, rng);
    if let Some(rtp) = options.rtp {
        table.set_target_rtp(rtp);
    }

    println!("flipcard: match table cards against your hand. type 'help' for commands.");
    print_status(&table);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        execute(&mut table, command)?;
        for event in table.drain_events() {
            if let Some(text) = render_event(&event) {
                println!("{text}");
            }
        }
    }
    table.stop_cycle();
    println!("final balance: ${:.2}", table.current_balance());
    Ok(())
}

fn execute(table: &mut Table, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Play(cards) => match table.start_round(cards) {
            Ok(()) => print_hand(table),
            Err(err) => println!("cannot start round: {err}"),
        },
        Command::Flip(slot) => match table.flip(slot) {
            Ok(Some(reveal)) => {
                if let Some(RevealOutcome::Hit { matches, .. }) = reveal.outcome {
                    info!(slot, matches, "hit");
                }
            }
            Ok(None) => println!("flip refused"),
            Err(err) => println!("flip failed: {err}"),
        },
        Command::Bet(amount) => {
            table.bet().set(amount);
            println!("bet: ${amount:.2} (from next round)");
        }
        Command::Wait(ms) => {
            let ms = ms.min(MAX_WAIT_MS);
            table.tick(Duration::from_millis(ms));
        }
        Command::Table => print_table(table),
        Command::Status => print_status(table),
        Command::Stats => println!("{}", serde_json::to_string_pretty(&table.stats())?),
        Command::Help => print_help(),
        Command::Quit => {}
    }
    Ok(())
}

fn render_event(event: &Event) -> Option<String> {
    match event {
        Event::RoundStarted {
            hand_cards,
            table_cards,
            bet,
            balance,
        } => Some(format!(
            "round started: {hand_cards} hand cards, {table_cards} on the table, bet ${bet:.2}, balance ${balance:.2}"
        )),
        Event::CardRevealed { slot, card } => Some(format!("slot {slot}: {}", card.name())),
        Event::RewardText { message, amount } => Some(format!("  {message}  {amount}")),
        Event::FlipText { text } => Some(text.clone()),
        Event::BalanceChanged { .. } => None,
        Event::RoundSettled {
            total_reward,
            balance,
        } => Some(format!(
            "round settled: won ${total_reward:.2}, balance ${balance:.2}"
        )),
    }
}

fn print_hand(table: &Table) {
    if let Some(hand) = table.hand().ready() {
        let names: Vec<String> = hand.cards().iter().map(|card| card.name()).collect();
        println!("hand: {}", names.join(", "));
    }
}

fn print_table(table: &Table) {
    if table.table().is_empty() {
        println!("table is empty, 'play N' to deal");
        return;
    }
    print_hand(table);
    for (index, slot) in table.table().iter().enumerate() {
        let face = if slot.face_up {
            slot.card.name()
        } else {
            "??".to_string()
        };
        println!("  [{index:>2}] {face}");
    }
}

fn print_status(table: &Table) {
    let stats = table.stats();
    println!(
        "balance ${:.2} | bet ${:.2} | {} | target rtp {:.0} | hit rate {:.1}% | rtp {:.1}%",
        table.current_balance(),
        table.current_bet(),
        table.flips().flip_text(),
        stats.target_rtp,
        stats.actual_hit_rate,
        stats.current_rtp
    );
}

fn print_help() {
    println!("commands:");
    println!("  play N    deal N hand cards and N*8 table cards, paying the current bet");
    println!("  flip I    reveal table slot I");
    println!("  bet X     set the bet used from the next round");
    println!("  wait MS   let the reward display run for MS milliseconds");
    println!("  table     show the hand and table");
    println!("  status    balance, bet, flips and rtp");
    println!("  stats     rtp statistics as json");
    println!("  quit      leave the table");
}
