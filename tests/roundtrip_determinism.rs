//! Randomized walk tests: any run of forwards followed by the same number
//! of backwards must land on an observably identical board, and the
//! processed-state high-water mark only ever grows.

use duel_replay::board::{BoardSnapshot, DuelBoard};
use duel_replay::message::{
    AddCard, CardInfo, Counter, CounterChange, CounterChangeKind, DisableZones, Draw, LpChange,
    LpChangeKind, NewPhase, NewTurn, RemoveCard, SwapCards, UpdateCard, UpdateReason,
};
use duel_replay::place::{location, position, Place};
use duel_replay::Information;
use rand::RngCore;
use rand::SeedableRng;
use rand_pcg::Lcg64Xsh32;

fn card_info(controller: u32, loc: u32, sequence: u32, code: u32, pos: u32) -> CardInfo {
    CardInfo {
        controller,
        location: loc,
        sequence,
        overlay_sequence: -1,
        code,
        position: pos,
    }
}

fn move_card(previous: CardInfo, current: CardInfo) -> Information {
    Information::UpdateCard(UpdateCard {
        reason: UpdateReason::Move,
        previous,
        current,
    })
}

/// A board seeded like a real duel start, with a full-turn message script
/// already appended: draws, summons, counters, zone disablement, life-point
/// swings, a token appearing and leaving, a swap, and a hidden shuffle.
fn scripted_board() -> DuelBoard {
    let mut board: DuelBoard = DuelBoard::new();
    board.fill_pile(0, location::MAIN_DECK, 40).expect("deck 0");
    board.fill_pile(1, location::MAIN_DECK, 40).expect("deck 1");
    board.set_lp(0, 8000).expect("lp 0");
    board.set_lp(1, 8000).expect("lp 1");

    let monster = Place::zone(0, location::MONSTER_ZONE, 2);
    board.append(Information::NewTurn(NewTurn { turn_player: 0 }));
    board.append(Information::NewPhase(NewPhase { phase: 0x01 }));
    board.append(Information::Draw(Draw {
        player: 0,
        cards: vec![
            card_info(0, location::HAND, 0, 100, position::FACE_UP),
            card_info(0, location::HAND, 1, 101, position::FACE_UP),
        ],
    }));
    board.append(move_card(
        card_info(0, location::HAND, 0, 100, position::FACE_UP),
        card_info(0, location::MONSTER_ZONE, 2, 100, position::FACE_UP_ATTACK),
    ));
    board.append(Information::CounterChange(CounterChange {
        place: monster,
        counter: Counter { kind: 7, count: 2 },
        change: CounterChangeKind::Add,
    }));
    board.append(Information::CounterChange(CounterChange {
        place: monster,
        counter: Counter { kind: 9, count: 1 },
        change: CounterChangeKind::Add,
    }));
    board.append(Information::DisableZones(DisableZones {
        places: vec![
            Place::zone(0, location::MONSTER_ZONE, 1),
            Place::zone(1, location::SPELL_ZONE, 0),
        ],
    }));
    board.append(Information::LpChange(LpChange {
        player: 1,
        change: LpChangeKind::Damage,
        amount: 2000,
    }));
    board.append(move_card(
        card_info(0, location::HAND, 0, 101, position::FACE_UP),
        card_info(0, location::SPELL_ZONE, 1, 101, position::FACE_DOWN),
    ));
    board.append(Information::Draw(Draw {
        player: 1,
        cards: vec![card_info(1, location::HAND, 0, 200, position::FACE_UP)],
    }));
    board.append(move_card(
        card_info(0, location::MONSTER_ZONE, 2, 100, position::FACE_UP_ATTACK),
        card_info(0, location::GRAVEYARD, 0, 100, position::FACE_UP),
    ));
    board.append(Information::RemoveCard(RemoveCard {
        card: card_info(0, location::SPELL_ZONE, 1, 101, position::FACE_DOWN),
    }));
    board.append(Information::AddCard(AddCard {
        card: card_info(0, location::MONSTER_ZONE, 5, 300, position::FACE_UP_ATTACK),
    }));
    board.append(Information::SwapCards(SwapCards {
        card1: card_info(1, location::HAND, 0, 200, position::FACE_UP),
        card2: card_info(0, location::MONSTER_ZONE, 5, 300, position::FACE_UP_ATTACK),
    }));
    board.append(Information::ShuffleLocation(
        duel_replay::message::ShuffleLocation {
            player: 0,
            location: location::MAIN_DECK,
            shuffled_cards: Vec::new(),
        },
    ));
    board.append(Information::NewPhase(NewPhase { phase: 0x80 }));
    board.append(Information::LpChange(LpChange {
        player: 0,
        change: LpChangeKind::Recover,
        amount: 500,
    }));
    board.append(Information::NewTurn(NewTurn { turn_player: 1 }));
    board.append(Information::DisableZones(DisableZones { places: Vec::new() }));
    board.append(Information::Hint {
        player: 0,
        hint: 1,
        value: 2,
    });
    board
}

/// Snapshot at every state from 0 to the tail, recorded on the first
/// (realtime) pass.
fn record_states(board: &mut DuelBoard) -> Vec<BoardSnapshot> {
    let mut states = vec![board.snapshot()];
    for _ in 0..board.total_states() {
        board.forward().expect("first pass");
        states.push(board.snapshot());
    }
    states
}

#[test]
fn full_rewind_replays_identically() {
    let _ = env_logger::try_init();
    let mut board = scripted_board();
    let states = record_states(&mut board);
    let total = board.total_states();
    assert_eq!(board.processed_states(), total);

    for state in (0..total).rev() {
        board.backward().expect("rewind");
        assert_eq!(board.current_state(), state);
        assert_eq!(board.snapshot(), states[state], "mismatch at state {state}");
    }
    assert_eq!(board.processed_states(), total);

    for state in 1..=total {
        board.forward().expect("re-walk");
        assert_eq!(board.snapshot(), states[state], "mismatch at state {state}");
    }
}

#[test]
fn random_walk_matches_recorded_states() {
    let mut board = scripted_board();
    let states = record_states(&mut board);
    let total = board.total_states();

    let mut rng = Lcg64Xsh32::from_seed([42u8; 16]);
    for _ in 0..400 {
        if rng.next_u64() % 2 == 0 {
            board.forward().expect("walk forward");
        } else {
            board.backward().expect("walk backward");
        }
        let state = board.current_state();
        assert!(state <= total);
        assert!(state <= board.processed_states());
        assert_eq!(board.processed_states(), total);
        assert_eq!(board.snapshot(), states[state], "mismatch at state {state}");
    }
}

#[test]
fn processed_state_only_grows() {
    let mut board = scripted_board();
    let total = board.total_states();
    let mut high_water = 0;
    let mut rng = Lcg64Xsh32::from_seed([7u8; 16]);

    for _ in 0..300 {
        if rng.next_u64() % 3 > 0 {
            board.forward().expect("walk forward");
        } else {
            board.backward().expect("walk backward");
        }
        assert!(board.processed_states() >= high_water);
        high_water = high_water.max(board.processed_states());
        assert_eq!(board.processed_states(), board.current_state().max(high_water));
        assert!(board.processed_states() <= total);
    }
}

#[test]
fn appending_while_rewound_keeps_history() {
    let mut board: DuelBoard = DuelBoard::new();
    board.set_lp(0, 8000).expect("lp");
    for amount in [1000, 2000, 3000] {
        board.append(Information::LpChange(LpChange {
            player: 0,
            change: LpChangeKind::Damage,
            amount,
        }));
    }
    for _ in 0..3 {
        board.forward().expect("forward");
    }
    assert_eq!(board.lp(0), 2000);

    for _ in 0..3 {
        board.backward().expect("backward");
    }
    board.append(Information::LpChange(LpChange {
        player: 0,
        change: LpChangeKind::Recover,
        amount: 500,
    }));
    assert_eq!(board.lp(0), 8000);

    // Re-walk the recorded prefix, then step onto the live tail.
    for _ in 0..4 {
        board.forward().expect("forward");
    }
    assert_eq!(board.lp(0), 2500);
    assert_eq!(board.processed_states(), 4);
    assert!(board.is_realtime());
}
