// crates/pinball-rs/src/modes/high_score.rs
use crate::game::GameContext;
use crate::hal::{HighScoreEntry, HighScoreStore};
use crate::mode::{Mode, ModeCore};
use crate::types::Lifecycle;
use log::{error, info};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

/// Maintains the persisted high-score table.
///
/// At every game end each player's score is checked against the table: it
/// qualifies when the table still has room, or when it is strictly greater
/// than the lowest kept entry. The table is kept sorted descending and
/// truncated before saving. A broken store costs only persistence; the
/// game keeps running.
pub struct HighScoreMode {
    core: ModeCore,
    store: Box<dyn HighScoreStore>,
    pub max_entries: usize,
    entries: Vec<HighScoreEntry>,
}

impl HighScoreMode {
    pub fn new(store: Box<dyn HighScoreStore>) -> Self {
        Self {
            core: ModeCore::new("high_score", 10, Lifecycle::System),
            store,
            max_entries: 10,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    fn qualifies(&self, score: i64) -> bool {
        if self.entries.len() < self.max_entries {
            return true;
        }
        match self.entries.last() {
            Some(lowest) => score > lowest.score,
            None => true,
        }
    }
}

impl Mode for HighScoreMode {
    fn core(&self) -> &ModeCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModeCore {
        &mut self.core
    }

    fn mode_started(&mut self, _cx: &mut GameContext) {
        match self.store.load() {
            Ok(entries) => {
                info!("[HISCORE] Loaded {} entries", entries.len());
                self.entries = entries;
            }
            Err(e) => {
                error!("[HISCORE] Load failed, starting empty: {}", e);
                self.entries = Vec::new();
            }
        }
    }

    fn game_ended(&mut self, cx: &mut GameContext) {
        let date = today_string();
        let mut changed = false;
        for player in &cx.players {
            if !self.qualifies(player.score) {
                continue;
            }
            info!(
                "[HISCORE] {} qualifies with {}",
                player.name, player.score
            );
            self.entries.push(HighScoreEntry {
                name: player.name.clone(),
                score: player.score,
                date: date.clone(),
            });
            self.entries.sort_by(|a, b| b.score.cmp(&a.score));
            self.entries.truncate(self.max_entries);
            changed = true;
        }
        if !changed {
            return;
        }
        if let Err(e) = self.store.save(&self.entries) {
            error!("[HISCORE] Save failed: {}", e);
        }
        let rows: Vec<_> = self
            .entries
            .iter()
            .map(|e| json!({ "name": e.name, "score": e.score, "date": e.date }))
            .collect();
        cx.post("high_score_updated", Some(json!({ "entries": rows })));
    }
}

/// Today as `YYYY-MM-DD` without pulling in a calendar crate. Good through
/// 2099.
fn today_string() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let mut days = secs / 86_400;
    let mut year = 1970u64;
    loop {
        let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
        let days_in_year = if leap { 366 } else { 365 };
        if days < days_in_year {
            break;
        }
        days -= days_in_year;
        year += 1;
    }
    let leap = year % 4 == 0 && (year % 100 != 0 || year % 400 == 0);
    let month_lengths = [
        31,
        if leap { 29 } else { 28 },
        31,
        30,
        31,
        30,
        31,
        31,
        30,
        31,
        30,
        31,
    ];
    let mut month = 1;
    for len in month_lengths {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }
    format!("{:04}-{:02}-{:02}", year, month, days + 1)
}
