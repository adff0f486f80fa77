/// Edge detector for the daily goal.
///
/// Fires once when the amount crosses from below the goal to at or above it
/// and stays silent until the amount drops below the goal again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GoalWatch {
    reached: bool,
}

impl GoalWatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current position without firing.
    pub fn prime(&mut self, amount_ml: u32, goal_ml: u32) {
        self.reached = amount_ml >= goal_ml;
    }

    /// Returns `true` only on a below-to-reached transition.
    pub fn observe(&mut self, amount_ml: u32, goal_ml: u32) -> bool {
        let reached = amount_ml >= goal_ml;
        let crossed = reached && !self.reached;
        self.reached = reached;
        crossed
    }

    pub fn is_reached(&self) -> bool {
        self.reached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_crossing() {
        let mut watch = GoalWatch::new();

        assert!(!watch.observe(2000, 2500));
        assert!(watch.observe(2500, 2500));
        assert!(!watch.observe(2500, 2500));
        assert!(!watch.observe(2600, 2500));

        // Dropping below re-arms.
        assert!(!watch.observe(0, 2500));
        assert!(watch.observe(2500, 2500));
    }

    #[test]
    fn test_prime_suppresses_initial_state() {
        let mut watch = GoalWatch::new();
        watch.prime(3000, 2500);
        assert!(watch.is_reached());
        assert!(!watch.observe(3000, 2500));
    }
}
