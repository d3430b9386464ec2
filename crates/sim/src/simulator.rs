use crate::{RoundRecord, SimConfig, SimError, SimResult, SimStatus, SummaryStats};
use flipcard_core::{
    Catalog, DrawError, FlipTable, FlipUse, GameConfig, MemoryBalance, RevealOutcome, RngState,
    RoundError, StatsScope,
};
use std::time::Instant;
use tracing::{debug, info};

type SimTable = FlipTable<MemoryBalance, f64>;

/// Plays `config.rounds` rounds, always flipping the first hidden slot.
///
/// Hit statistics are kept for the whole run regardless of the configured
/// scope. The run stops early once the balance cannot cover the bet.
pub fn run_simulation(
    config: &SimConfig,
    game: &GameConfig,
    catalog: &Catalog,
) -> Result<SimResult, SimError> {
    let started_at = Instant::now();
    let mut game = game.clone();
    game.rtp.stats_scope = StatsScope::Process;
    if let Some(target) = config.target_rtp {
        game.rtp.target_rtp = target;
    }
    let starting_balance = game.round.starting_balance;
    let bet = game.round.base_bet;
    let mut table: SimTable = FlipTable::new(
        game,
        catalog.clone(),
        MemoryBalance::new(starting_balance),
        bet,
        RngState::from_seed(config.seed),
    );
    info!(
        seed = config.seed,
        rounds = config.rounds,
        hand = config.hand_size,
        target_rtp = table.rtp().target_rtp(),
        "simulation started"
    );

    let mut records = Vec::with_capacity(config.rounds as usize);
    let mut total_won = 0.0;
    let mut jokers = 0u64;
    let mut exhausted_rounds = 0u32;
    let mut unsettled_reward = 0.0;
    let mut status = SimStatus::Completed;

    for round in 0..config.rounds {
        match table.start_round(config.hand_size) {
            Ok(()) => {}
            Err(RoundError::InsufficientBalance { balance, bet }) => {
                info!(round, balance, bet, "balance exhausted");
                status = SimStatus::BalanceExhausted;
                break;
            }
            Err(err) => return Err(err.into()),
        }
        let record = play_round(&mut table, round)?;
        total_won += record.reward;
        jokers += u64::from(record.jokers);
        if !record.settled {
            exhausted_rounds += 1;
            unsettled_reward += record.unsettled_reward;
        }
        table.stop_cycle();
        table.drain_events();
        records.push(record);
    }

    let stats = table.stats();
    let result = SimResult {
        status,
        seed: config.seed,
        hand_size: config.hand_size,
        target_rtp: stats.target_rtp,
        total_bet: stats.total_bet,
        total_won,
        monetary_rtp: stats.current_rtp,
        hit_rate: stats.actual_hit_rate,
        final_balance: table.current_balance(),
        summary: SummaryStats {
            rounds_requested: config.rounds,
            rounds_played: records.len() as u32,
            exhausted_rounds,
            unsettled_reward,
            total_flips: stats.total_flips,
            total_hits: stats.total_hits,
            jokers,
            wall_time_ms: started_at.elapsed().as_millis() as u64,
        },
        rounds: records,
    };
    info!(
        rounds = result.summary.rounds_played,
        rtp = result.monetary_rtp,
        hit_rate = result.hit_rate,
        "simulation finished"
    );
    Ok(result)
}

fn play_round(table: &mut SimTable, round: u32) -> Result<RoundRecord, SimError> {
    let bet = table.current_bet();
    let mut record = RoundRecord {
        round,
        bet,
        reward: 0.0,
        flips: 0,
        hits: 0,
        jokers: 0,
        settled: false,
        unsettled_reward: 0.0,
        balance_after: table.current_balance(),
    };
    while table.can_flip() {
        let Some(slot) = table.face_down_slots().first().copied() else {
            break;
        };
        let reveal = match table.flip(slot) {
            Ok(Some(reveal)) => reveal,
            Ok(None) => break,
            Err(RoundError::Draw(DrawError::NoCardAvailable)) => break,
            Err(err) => return Err(err.into()),
        };
        record.flips += 1;
        match reveal.outcome {
            Some(RevealOutcome::Joker { .. }) => record.jokers += 1,
            Some(RevealOutcome::Hit { .. }) => record.hits += 1,
            _ => {}
        }
        if let FlipUse::Settled { payout } = reveal.flip {
            record.reward = payout;
            record.settled = true;
        }
    }
    record.unsettled_reward = table.ledger().uncredited_reward();
    if !record.settled {
        debug!(
            round,
            flips = record.flips,
            unpaid = record.unsettled_reward,
            "table ran out of hidden cards"
        );
    }
    record.balance_after = table.current_balance();
    Ok(record)
}
