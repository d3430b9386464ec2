#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u64,
    pub rounds: u32,
    pub hand_size: u32,
    /// Overrides the game config's target when set.
    pub target_rtp: Option<f64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0xC0FFEE,
            rounds: 1000,
            hand_size: 3,
            target_rtp: None,
        }
    }
}
