/// Per-session records shown in the header and on the game-over screen.
///
/// Round time follows the frame timestamps the session is driven with, so it
/// only advances while the snake is actually moving.
#[derive(Debug, Clone, Default)]
pub struct GameMetrics {
    round_started_ms: Option<f64>,
    round_ms: f64,
    pub high_score: u32,
    pub most_apples: u32,
    pub games_played: u32,
    /// The last finished game set a new score or apple record
    pub new_record: bool,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a frame timestamp while the round is running. The first call
    /// after [`on_game_start`](Self::on_game_start) anchors the round timer.
    pub fn tick(&mut self, now_ms: f64) {
        let started = *self.round_started_ms.get_or_insert(now_ms);
        self.round_ms = (now_ms - started).max(0.0);
    }

    pub fn on_game_start(&mut self) {
        self.round_started_ms = None;
        self.round_ms = 0.0;
        self.new_record = false;
    }

    pub fn on_game_over(&mut self, final_score: u32, apples: u32) {
        self.games_played += 1;
        self.new_record = final_score > self.high_score || apples > self.most_apples;
        self.high_score = self.high_score.max(final_score);
        self.most_apples = self.most_apples.max(apples);
    }

    pub fn round_ms(&self) -> f64 {
        self.round_ms
    }

    /// Round time as `MM:SS`
    pub fn format_time(&self) -> String {
        let total_secs = (self.round_ms / 1000.0) as u64;
        format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
    }

    /// `score / apples` record line
    pub fn format_best(&self) -> String {
        format!("{} / {}", self.high_score, self.most_apples)
    }
}
