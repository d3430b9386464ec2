use crate::SimError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SimStatus {
    Completed,
    BalanceExhausted,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundRecord {
    pub round: u32,
    pub bet: f64,
    pub reward: f64,
    pub flips: u32,
    pub hits: u32,
    pub jokers: u32,
    /// False when the table ran out of hidden cards before the flips did.
    pub settled: bool,
    /// Earned but never credited because the round did not settle.
    #[serde(default)]
    pub unsettled_reward: f64,
    pub balance_after: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub rounds_requested: u32,
    pub rounds_played: u32,
    pub exhausted_rounds: u32,
    #[serde(default)]
    pub unsettled_reward: f64,
    pub total_flips: u64,
    pub total_hits: u64,
    pub jokers: u64,
    pub wall_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimResult {
    pub status: SimStatus,
    pub seed: u64,
    pub hand_size: u32,
    pub target_rtp: f64,
    pub total_bet: f64,
    pub total_won: f64,
    pub monetary_rtp: f64,
    pub hit_rate: f64,
    pub final_balance: f64,
    pub summary: SummaryStats,
    #[serde(default)]
    pub rounds: Vec<RoundRecord>,
}

impl SimResult {
    pub fn to_summary_report(&self) -> String {
        self.summary_lines().join("\n")
    }

    pub fn to_text_report(&self) -> String {
        let mut lines = self.summary_lines();
        if !self.rounds.is_empty() {
            lines.push(String::new());
            lines.push("rounds:".to_string());
            for record in &self.rounds {
                let mark = if record.settled {
                    String::new()
                } else {
                    format!(" (exhausted, unpaid {:.2})", record.unsettled_reward)
                };
                lines.push(format!(
                    "  round {:>5} | bet {:.2} reward {:.2} flips {} hits {} jokers {} balance {:.2}{mark}",
                    record.round,
                    record.bet,
                    record.reward,
                    record.flips,
                    record.hits,
                    record.jokers,
                    record.balance_after
                ));
            }
        }
        lines.join("\n")
    }

    fn summary_lines(&self) -> Vec<String> {
        vec![
            format!("status: {}", status_label(self.status)),
            format!(
                "setup: seed={} hand={} target_rtp={:.2}",
                self.seed, self.hand_size, self.target_rtp
            ),
            format!(
                "money: bet={:.2} won={:.2} rtp={:.2}% final_balance={:.2}",
                self.total_bet, self.total_won, self.monetary_rtp, self.final_balance
            ),
            format!(
                "draws: flips={} hits={} hit_rate={:.2}% jokers={}",
                self.summary.total_flips,
                self.summary.total_hits,
                self.hit_rate,
                self.summary.jokers
            ),
            format!(
                "summary: rounds={}/{} exhausted={} unpaid={:.2} wall_ms={}",
                self.summary.rounds_played,
                self.summary.rounds_requested,
                self.summary.exhausted_rounds,
                self.summary.unsettled_reward,
                self.summary.wall_time_ms
            ),
        ]
    }
}

fn status_label(status: SimStatus) -> &'static str {
    match status {
        SimStatus::Completed => "Completed",
        SimStatus::BalanceExhausted => "BalanceExhausted",
    }
}

pub fn write_json(path: &Path, result: &SimResult) -> Result<(), SimError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(result)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, result: &SimResult) -> Result<(), SimError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, result.to_text_report())?;
    Ok(())
}
