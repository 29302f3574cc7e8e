use screener_core::{DetachmentResult, DetachmentState};

/// Rising edge on the detached signal: touching yesterday, detached today.
pub fn is_rising_edge(yesterday: DetachmentState, today: DetachmentState) -> bool {
    yesterday == DetachmentState::Touching && today == DetachmentState::Detached
}

/// Whether two consecutive evaluations mark the day a close broke away from its EMA
pub fn just_detached(yesterday: &DetachmentResult, today: &DetachmentResult) -> bool {
    is_rising_edge(yesterday.state, today.state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use DetachmentState::*;

    #[test]
    fn test_rising_edge_truth_table() {
        assert!(is_rising_edge(Touching, Detached));
        assert!(!is_rising_edge(Detached, Detached));
        assert!(!is_rising_edge(Touching, Touching));
        assert!(!is_rising_edge(Detached, Touching));
    }
}
