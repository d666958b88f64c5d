//! Property-based tests for refresh sequencing

use proptest::prelude::*;

use chatsync::client::sync::RefreshSequencer;

proptest! {
    #[test]
    fn test_only_last_ticket_is_current(count in 1usize..50) {
        let sequencer = RefreshSequencer::new();
        let tickets: Vec<_> = (0..count).map(|_| sequencer.issue()).collect();

        let (last, earlier) = tickets.split_last().unwrap();
        prop_assert!(sequencer.is_current(*last));
        for ticket in earlier {
            prop_assert!(!sequencer.is_current(*ticket));
        }
        prop_assert!(tickets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_nothing_current_after_teardown(before in 0usize..20, after in 0usize..20) {
        let sequencer = RefreshSequencer::new();
        let mut tickets: Vec<_> = (0..before).map(|_| sequencer.issue()).collect();
        sequencer.tear_down();
        tickets.extend((0..after).map(|_| sequencer.issue()));

        prop_assert!(tickets.iter().all(|t| !sequencer.is_current(*t)));
    }
}
