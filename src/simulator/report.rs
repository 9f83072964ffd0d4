//! Aggregated series results and text rendering of simulation output.

use super::duel::{FightResult, Side, Winner};
use super::exchange_sim::ExchangeReport;
use crate::character::resolver::ProjectionTable;
use serde::Serialize;

const RULE: &str = "═══════════════════════════════════════════════════════════════\n";

fn header(report: &mut String, title: &str) {
    report.push_str(RULE);
    report.push_str(&format!("{:^63}\n", title));
    report.push_str(RULE);
    report.push('\n');
}

fn section(report: &mut String, title: &str) {
    let label = format!("── {title} ");
    let fill = 65usize.saturating_sub(label.chars().count());
    report.push_str(&label);
    report.push_str(&"─".repeat(fill));
    report.push('\n');
}

/// One fight of a series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuelSummary {
    pub run: u32,
    pub seed: Option<u64>,
    pub winner: Winner,
    pub rounds: u32,
    pub max_rounds_reached: bool,
    pub attacker_damage: f64,
    pub defender_damage: f64,
}

impl DuelSummary {
    pub fn from_fight(run: u32, seed: Option<u64>, fight: &FightResult) -> Self {
        Self {
            run,
            seed,
            winner: fight.winner,
            rounds: fight.rounds,
            max_rounds_reached: fight.max_rounds_reached,
            attacker_damage: fight.attacker.total_damage,
            defender_damage: fight.defender.total_damage,
        }
    }
}

/// Aggregated results from many fights between the same pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesReport {
    pub attacker: String,
    pub defender: String,
    pub runs: u32,
    pub attacker_wins: u32,
    pub defender_wins: u32,
    pub draws: u32,
    /// Draws caused by the round cap.
    pub capped: u32,
    pub avg_rounds: f64,
    pub avg_attacker_damage: f64,
    pub avg_defender_damage: f64,
    pub attacker_win_rate: f64,
    pub defender_win_rate: f64,
    pub summaries: Vec<DuelSummary>,
}

impl SeriesReport {
    pub fn from_runs(attacker: &str, defender: &str, summaries: Vec<DuelSummary>) -> Self {
        let runs = summaries.len() as u32;
        let n = runs.max(1) as f64;
        let count = |winner: Winner| summaries.iter().filter(|s| s.winner == winner).count() as u32;

        let attacker_wins = count(Winner::Attacker);
        let defender_wins = count(Winner::Defender);
        let draws = count(Winner::Draw);
        let capped = summaries.iter().filter(|s| s.max_rounds_reached).count() as u32;

        let avg_rounds = summaries.iter().map(|s| s.rounds as f64).sum::<f64>() / n;
        let avg_attacker_damage = summaries.iter().map(|s| s.attacker_damage).sum::<f64>() / n;
        let avg_defender_damage = summaries.iter().map(|s| s.defender_damage).sum::<f64>() / n;

        Self {
            attacker: attacker.to_string(),
            defender: defender.to_string(),
            runs,
            attacker_wins,
            defender_wins,
            draws,
            capped,
            avg_rounds,
            avg_attacker_damage,
            avg_defender_damage,
            attacker_win_rate: attacker_wins as f64 / n,
            defender_win_rate: defender_wins as f64 / n,
            summaries,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();
        header(&mut report, "DUEL SERIES REPORT");

        report.push_str(&format!(
            "{} vs {}: {} fights\n\n",
            self.attacker, self.defender, self.runs
        ));

        section(&mut report, "OUTCOMES");
        let bar = |rate: f64| "█".repeat((rate * 20.0) as usize);
        report.push_str(&format!(
            "  {:<20} {:>5} wins {:>5.1}% {}\n",
            self.attacker,
            self.attacker_wins,
            self.attacker_win_rate * 100.0,
            bar(self.attacker_win_rate)
        ));
        report.push_str(&format!(
            "  {:<20} {:>5} wins {:>5.1}% {}\n",
            self.defender,
            self.defender_wins,
            self.defender_win_rate * 100.0,
            bar(self.defender_win_rate)
        ));
        report.push_str(&format!(
            "  Draws:               {} ({} at round cap)\n\n",
            self.draws, self.capped
        ));

        section(&mut report, "PACING");
        report.push_str(&format!("  Avg Rounds:          {:.1}\n", self.avg_rounds));
        report.push_str(&format!(
            "  Avg Damage Dealt:    {:.1} / {:.1}\n\n",
            self.avg_attacker_damage, self.avg_defender_damage
        ));

        section(&mut report, "BALANCE ASSESSMENT");
        let gap = (self.attacker_win_rate - self.defender_win_rate).abs();
        let rating = if gap < 0.1 {
            "EVEN - Neither side dominates"
        } else if gap < 0.3 {
            "LEANING - One side has a clear edge"
        } else {
            "LOPSIDED - One side wins almost every fight"
        };
        report.push_str(&format!("  Win Gap:  {:.1}%\n", gap * 100.0));
        report.push_str(&format!("  Rating:   {rating}\n"));
        if self.capped > 0 {
            report.push_str("  ⚠️  Some fights hit the round cap - damage too low for health?\n");
        }

        report.push('\n');
        report.push_str(RULE);
        report
    }
}

impl FightResult {
    /// Generate a round-by-round text log.
    pub fn to_text(&self) -> String {
        let mut report = String::new();
        header(&mut report, "FIGHT TO THE DEATH");

        report.push_str(&format!(
            "{} ({:.0} HP) vs {} ({:.0} HP)\n\n",
            self.attacker.name,
            self.attacker.initial_health,
            self.defender.name,
            self.defender.initial_health
        ));

        section(&mut report, "ROUNDS");
        for round in &self.history {
            let first = match round.first_mover {
                Side::Attacker => &self.attacker.name,
                Side::Defender => &self.defender.name,
            };
            report.push_str(&format!("  Round {:>3}  {first} moves first\n", round.round));
            for (side, name) in [
                (Side::Attacker, &self.attacker.name),
                (Side::Defender, &self.defender.name),
            ] {
                let entry = round.side(side);
                if entry.regen > 0.0 {
                    report.push_str(&format!("    {name} regenerates {:.1}\n", entry.regen));
                }
                let action = match &entry.outcome {
                    None => "does not act".to_string(),
                    Some(outcome) if !outcome.is_hit => {
                        format!("misses, grazing for {:.1}", outcome.final_damage)
                    }
                    Some(outcome) if outcome.is_critical => {
                        format!("CRITS for {:.1}", outcome.final_damage)
                    }
                    Some(outcome) => format!("hits for {:.1}", outcome.final_damage),
                };
                report.push_str(&format!(
                    "    {name} {action} ({:.1} HP left)\n",
                    entry.health_after
                ));
            }
        }
        report.push('\n');

        section(&mut report, "RESULT");
        let verdict = match (&self.winner_name, self.max_rounds_reached) {
            (Some(name), _) => format!("{name} wins"),
            (None, true) => "Draw - round cap reached".to_string(),
            (None, false) => "Draw - both fell".to_string(),
        };
        report.push_str(&format!("  {verdict} after {} rounds\n\n", self.rounds));
        report.push_str("  Side                  Damage   Hits  Crits  Hit%   Crit%\n");
        report.push_str("  ────                  ──────   ────  ─────  ────   ─────\n");
        for summary in [&self.attacker, &self.defender] {
            report.push_str(&format!(
                "  {:<20} {:>7.1} {:>6} {:>6} {:>5.1}  {:>5.1}\n",
                summary.name,
                summary.total_damage,
                summary.hit_count,
                summary.crit_count,
                summary.hit_rate * 100.0,
                summary.crit_rate * 100.0
            ));
        }
        report.push('\n');
        report.push_str(RULE);
        report
    }
}

impl ExchangeReport {
    pub fn to_text(&self) -> String {
        let mut report = String::new();
        header(&mut report, "EXCHANGE SAMPLING");

        report.push_str(&format!(
            "{} attacks {} x{}\n\n",
            self.attacker, self.defender, self.samples
        ));

        section(&mut report, "REALIZED VS EXPECTED");
        report.push_str("                 Realized   Expected\n");
        report.push_str(&format!(
            "  Avg Damage:    {:>8.2}   {:>8.2}\n",
            self.average_damage, self.expected_damage
        ));
        report.push_str(&format!(
            "  Hit Rate:      {:>7.1}%   {:>7.1}%\n",
            self.hit_rate * 100.0,
            self.theoretical_hit_rate * 100.0
        ));
        report.push_str(&format!(
            "  Crit Rate:     {:>7.1}%   {:>7.1}%\n",
            self.crit_rate * 100.0,
            self.theoretical_crit_rate * 100.0
        ));
        report.push('\n');
        report.push_str(RULE);
        report
    }
}

impl ProjectionTable {
    /// One row per level, one column per attribute.
    pub fn to_text(&self) -> String {
        let mut report = String::new();
        let width = self
            .series
            .keys()
            .map(|name| name.chars().count())
            .max()
            .unwrap_or(0)
            .max(8);

        report.push_str(&format!("{:>5}", "Level"));
        for name in self.series.keys() {
            report.push_str(&format!(" {:>width$}", name));
        }
        report.push('\n');
        report.push_str(&format!("{:>5}", "─────"));
        for _ in self.series.keys() {
            report.push_str(&format!(" {:>width$}", "─".repeat(width)));
        }
        report.push('\n');

        for (row, level) in self.levels.iter().enumerate() {
            report.push_str(&format!("{:>5}", level));
            for column in self.series.values() {
                let value = column.get(row).copied().unwrap_or(0.0);
                report.push_str(&format!(" {:>width$.0}", value));
            }
            report.push('\n');
        }
        report
    }
}
