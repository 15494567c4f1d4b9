// Property-based tests: life-point arithmetic and attribute histories must
// survive any forward/backward round trip.
use duel_replay::board::DuelBoard;
use duel_replay::message::{LpChange, LpChangeKind};
use duel_replay::timeline::Timeline;
use duel_replay::Information;
use proptest::prelude::*;

proptest! {
    #[test]
    fn lp_sequences_round_trip(changes in prop::collection::vec((0u32..4, 0u32..20_000), 1..40)) {
        let mut board: DuelBoard = DuelBoard::new();
        board.set_lp(0, 8000).expect("seed lp");
        for (kind, amount) in &changes {
            board.append(Information::LpChange(LpChange {
                player: 0,
                change: LpChangeKind::try_from(*kind).expect("kind in range"),
                amount: *amount,
            }));
        }
        for _ in 0..changes.len() {
            board.forward().expect("forward");
        }
        for _ in 0..changes.len() {
            board.backward().expect("backward");
        }
        prop_assert_eq!(board.lp(0), 8000);
        prop_assert_eq!(board.current_state(), 0);
        prop_assert_eq!(board.processed_states(), changes.len());
    }

    #[test]
    fn damage_never_underflows(amounts in prop::collection::vec(0u32..60_000, 1..20)) {
        let mut board: DuelBoard = DuelBoard::new();
        board.set_lp(1, 8000).expect("seed lp");
        for amount in &amounts {
            board.append(Information::LpChange(LpChange {
                player: 1,
                change: LpChangeKind::Damage,
                amount: *amount,
            }));
        }
        let mut previous = board.lp(1);
        for _ in 0..amounts.len() {
            board.forward().expect("forward");
            let lp = board.lp(1);
            prop_assert!(lp <= previous);
            previous = lp;
        }
    }

    #[test]
    fn timeline_round_trips(values in prop::collection::vec(any::<u32>(), 1..50)) {
        let mut cell: Timeline<u32> = Timeline::default();
        for value in &values {
            cell.advance(true, *value);
        }
        prop_assert_eq!(*cell.current(), *values.last().expect("non-empty"));
        for _ in 0..values.len() {
            cell.retreat();
        }
        prop_assert!(cell.at_sentinel());

        // Re-walking reproduces the recorded values in order.
        for value in &values {
            cell.advance(false, 0);
            prop_assert_eq!(*cell.current(), *value);
        }
    }
}
