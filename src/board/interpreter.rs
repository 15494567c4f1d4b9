//! Message handlers: one forward and one backward branch per critical kind.
//!
//! Both branches of a handler take the same message and are exact inverses
//! with respect to all board data. The `realtime` flag decides whether a
//! temporal mutation appends a new history entry (live tail) or merely
//! advances the cursor over an entry recorded earlier (re-walk). Handlers
//! validate everything they are about to touch before the first mutation,
//! so an error never leaves the board half-stepped.

use std::collections::btree_map::Entry;
use std::collections::BTreeSet;

use log::{debug, trace};

use super::{player_index, AsCard, Card, DuelBoard};
use crate::errors::BoardError;
use crate::message::{
    AddCard, AnyMessage, CounterChange, CounterChangeKind, DisableZones, Draw, Information,
    LpChange, LpChangeKind, NewPhase, NewTurn, RemoveCard, ShuffleLocation, ShuffleSetCards,
    SwapCards, UpdateCard, UpdateReason,
};
use crate::place::Place;
use crate::timeline::Timeline;

/// Step every counter history on `card` by one in the given direction,
/// recording a zero when appending. Keeps counter cursors in lockstep with
/// the rest of the card when it crosses the pile/field boundary.
fn shift_counters(card: &mut Card, advancing: bool, realtime: bool) {
    if advancing {
        for cell in card.counters.values_mut() {
            cell.advance(realtime, 0);
        }
    } else {
        for cell in card.counters.values_mut() {
            cell.retreat();
        }
    }
}

impl<C: AsCard> DuelBoard<C> {
    pub(super) fn interpret(&mut self, index: usize) -> Result<(), BoardError> {
        let AnyMessage::Information(info) = self.msgs[index].clone();
        if !info.is_critical() {
            debug!("ignoring non-critical message {}", info.kind_name());
            return Ok(());
        }
        trace!(
            "{} {} at state {}",
            if self.advancing { "applying" } else { "reverting" },
            info.kind_name(),
            index
        );
        match info {
            Information::UpdateCard(msg) => self.handle_update_card(msg),
            Information::AddCard(msg) => self.handle_add_card(msg),
            Information::RemoveCard(msg) => self.handle_remove_card(msg),
            Information::Draw(msg) => self.handle_draw(msg),
            Information::SwapCards(msg) => self.handle_swap_cards(msg),
            Information::ShuffleLocation(msg) => self.handle_shuffle_location(msg),
            Information::ShuffleSetCards(msg) => self.handle_shuffle_set_cards(msg),
            Information::CounterChange(msg) => self.handle_counter_change(msg),
            Information::DisableZones(msg) => self.handle_disable_zones(msg),
            Information::LpChange(msg) => self.handle_lp_change(msg),
            Information::NewTurn(msg) => self.handle_new_turn(msg),
            Information::NewPhase(msg) => self.handle_new_phase(msg),
            _ => Ok(()),
        }
    }

    /// Key under which a card removed by the message at the current cursor
    /// is parked: the destination state of the removing step. Forward
    /// interprets the message at `state` and lands on `state + 1`; backward
    /// decrements `state` first, so both directions agree on the key.
    fn removal_key(&self, place: Place) -> (u32, Place) {
        (self.state as u32 + 1, place)
    }

    // Moves a single card from one place to another, rebalancing overlay
    // stacks and stepping counter histories on pile/field crossings. Does
    // not touch the card's code or position history.
    pub(super) fn move_single(&mut self, from: Place, to: Place) -> Result<&mut C, BoardError> {
        if from == to {
            return Err(BoardError::IllegalMove(from));
        }
        let advancing = self.advancing;
        let realtime = self.realtime;
        match (from.is_pile(), to.is_pile()) {
            (true, true) => {
                let from_idx = from.sequence as usize;
                let to_idx = to.sequence as usize;
                let same_pile = (from.controller, from.location) == (to.controller, to.location);
                let src_len = self.pile(from.controller, from.location)?.len();
                if from_idx >= src_len {
                    return Err(BoardError::MissingCard(from));
                }
                let dst_len = if same_pile {
                    src_len - 1
                } else {
                    self.pile(to.controller, to.location)?.len()
                };
                if to_idx > dst_len {
                    return Err(BoardError::MalformedMessage(format!(
                        "insert position {to_idx} beyond pile of {dst_len}"
                    )));
                }
                let card = self.pile_mut(from.controller, from.location)?.remove(from_idx);
                let dst = self.pile_mut(to.controller, to.location)?;
                dst.insert(to_idx, card);
                Ok(&mut dst[to_idx])
            }
            (true, false) => {
                let from_idx = from.sequence as usize;
                if from_idx >= self.pile(from.controller, from.location)?.len() {
                    return Err(BoardError::MissingCard(from));
                }
                if !to.is_overlay() && self.field_zones.contains_key(&to) {
                    return Err(BoardError::MalformedMessage(format!(
                        "field slot {to:?} already occupied"
                    )));
                }
                let mut card = self.pile_mut(from.controller, from.location)?.remove(from_idx);
                shift_counters(card.card_mut(), advancing, realtime);
                if to.is_overlay() {
                    self.open_overlay_gap(to);
                }
                Ok(self.field_zones.entry(to).or_insert(card))
            }
            (false, true) => {
                let to_idx = to.sequence as usize;
                if to_idx > self.pile(to.controller, to.location)?.len() {
                    return Err(BoardError::MalformedMessage(format!(
                        "insert position {to_idx} beyond pile"
                    )));
                }
                let mut card = self
                    .field_zones
                    .remove(&from)
                    .ok_or(BoardError::MissingCard(from))?;
                if from.is_overlay() {
                    self.close_overlay_gap(from);
                }
                shift_counters(card.card_mut(), advancing, realtime);
                let dst = self.pile_mut(to.controller, to.location)?;
                dst.insert(to_idx, card);
                Ok(&mut dst[to_idx])
            }
            (false, false) => {
                if !to.is_overlay() && self.field_zones.contains_key(&to) {
                    return Err(BoardError::MalformedMessage(format!(
                        "field slot {to:?} already occupied"
                    )));
                }
                let card = self
                    .field_zones
                    .remove(&from)
                    .ok_or(BoardError::MissingCard(from))?;
                if from.is_overlay() {
                    self.close_overlay_gap(from);
                }
                if to.is_overlay() {
                    self.open_overlay_gap(to);
                }
                Ok(self.field_zones.entry(to).or_insert(card))
            }
        }
    }

    // Shift every overlay above the vacated index down by one, keeping the
    // host's stack contiguous.
    fn close_overlay_gap(&mut self, removed: Place) {
        let host = removed.host();
        let mut seq = removed.overlay_sequence + 1;
        while let Some(card) = self.field_zones.remove(&Place {
            overlay_sequence: seq,
            ..host
        }) {
            self.field_zones.insert(
                Place {
                    overlay_sequence: seq - 1,
                    ..host
                },
                card,
            );
            seq += 1;
        }
    }

    // Shift every overlay at or above the insertion index up by one, top
    // first, leaving the slot at `at` vacant.
    fn open_overlay_gap(&mut self, at: Place) {
        let host = at.host();
        let mut vacant = at.overlay_sequence;
        while self.field_zones.contains_key(&Place {
            overlay_sequence: vacant,
            ..host
        }) {
            vacant += 1;
        }
        while vacant > at.overlay_sequence {
            let below = Place {
                overlay_sequence: vacant - 1,
                ..host
            };
            if let Some(card) = self.field_zones.remove(&below) {
                self.field_zones.insert(
                    Place {
                        overlay_sequence: vacant,
                        ..host
                    },
                    card,
                );
            }
            vacant -= 1;
        }
    }

    fn handle_update_card(&mut self, msg: UpdateCard) -> Result<(), BoardError> {
        let realtime = self.realtime;
        let previous = msg.previous.place();
        let current = msg.current.place();
        if self.advancing {
            match msg.reason {
                UpdateReason::DeckTop => {
                    let offset = msg.previous.sequence as usize;
                    let pile = self.pile_mut(msg.previous.controller, msg.previous.location)?;
                    let index = pile
                        .len()
                        .checked_sub(offset + 1)
                        .ok_or(BoardError::MissingCard(previous))?;
                    pile[index].card_mut().code.advance(realtime, msg.current.code);
                }
                UpdateReason::Move => {
                    let card = self.move_single(previous, current)?.card_mut();
                    card.code.advance(realtime, msg.current.code);
                    card.position.advance(realtime, msg.current.position);
                }
                UpdateReason::PosChange | UpdateReason::Set => {
                    let card = self.card_mut(previous)?.card_mut();
                    card.code.advance(realtime, msg.current.code);
                    card.position.advance(realtime, msg.current.position);
                }
            }
        } else {
            match msg.reason {
                UpdateReason::DeckTop => {
                    let offset = msg.previous.sequence as usize;
                    let pile = self.pile_mut(msg.previous.controller, msg.previous.location)?;
                    let index = pile
                        .len()
                        .checked_sub(offset + 1)
                        .ok_or(BoardError::MissingCard(previous))?;
                    pile[index].card_mut().code.retreat();
                }
                UpdateReason::Move => {
                    let card = self.move_single(current, previous)?.card_mut();
                    card.code.retreat();
                    card.position.retreat();
                }
                UpdateReason::PosChange | UpdateReason::Set => {
                    let card = self.card_mut(previous)?.card_mut();
                    card.code.retreat();
                    card.position.retreat();
                }
            }
        }
        Ok(())
    }

    fn handle_add_card(&mut self, msg: AddCard) -> Result<(), BoardError> {
        let place = msg.card.place();
        let realtime = self.realtime;
        let key = self.removal_key(place);
        if self.advancing {
            if place.is_pile() {
                let index = place.sequence as usize;
                if index > self.pile(place.controller, place.location)?.len() {
                    return Err(BoardError::MalformedMessage(format!(
                        "insert position {index} beyond pile"
                    )));
                }
                let card = if realtime {
                    C::default()
                } else {
                    self.removed_cards.remove(&key).ok_or_else(|| {
                        BoardError::MalformedMessage(format!("no removed card recorded for {place:?}"))
                    })?
                };
                let pile = self.pile_mut(place.controller, place.location)?;
                pile.insert(index, card);
                let card = pile[index].card_mut();
                card.code.advance(realtime, msg.card.code);
                card.position.advance(realtime, msg.card.position);
            } else {
                if self.field_zones.contains_key(&place) {
                    return Err(BoardError::MalformedMessage(format!(
                        "field slot {place:?} already occupied"
                    )));
                }
                let card = if realtime {
                    C::default()
                } else {
                    self.removed_cards.remove(&key).ok_or_else(|| {
                        BoardError::MalformedMessage(format!("no removed card recorded for {place:?}"))
                    })?
                };
                let card = self.field_zones.entry(place).or_insert(card).card_mut();
                card.code.advance(realtime, msg.card.code);
                card.position.advance(realtime, msg.card.position);
            }
        } else {
            debug_assert!(
                !self.removed_cards.contains_key(&key),
                "removed-card slot reused at the same state"
            );
            let card = {
                let record = self.card_mut(place)?.card_mut();
                record.code.retreat();
                record.position.retreat();
                self.detach(place)?
            };
            self.removed_cards.insert(key, card);
        }
        Ok(())
    }

    fn handle_remove_card(&mut self, msg: RemoveCard) -> Result<(), BoardError> {
        let place = msg.card.place();
        let key = self.removal_key(place);
        if self.advancing {
            debug_assert!(
                !self.removed_cards.contains_key(&key),
                "removed-card slot reused at the same state"
            );
            let card = self.detach(place)?;
            self.removed_cards.insert(key, card);
        } else {
            if place.is_pile() {
                let index = place.sequence as usize;
                if index > self.pile(place.controller, place.location)?.len() {
                    return Err(BoardError::MalformedMessage(format!(
                        "insert position {index} beyond pile"
                    )));
                }
            } else if self.field_zones.contains_key(&place) {
                return Err(BoardError::MalformedMessage(format!(
                    "field slot {place:?} already occupied"
                )));
            }
            let card = self.removed_cards.remove(&key).ok_or_else(|| {
                BoardError::MalformedMessage(format!("no removed card recorded for {place:?}"))
            })?;
            self.attach(place, card)?;
        }
        Ok(())
    }

    fn handle_draw(&mut self, msg: Draw) -> Result<(), BoardError> {
        let player = player_index(msg.player)?;
        let count = msg.cards.len();
        let realtime = self.realtime;
        if self.advancing {
            if self.deck[player].len() < count {
                return Err(BoardError::MalformedMessage(format!(
                    "drew {count} cards from a deck of {}",
                    self.deck[player].len()
                )));
            }
            let hand_size = self.hand[player].len();
            for _ in 0..count {
                if let Some(card) = self.deck[player].pop() {
                    self.hand[player].push(card);
                }
            }
            for (i, info) in msg.cards.iter().enumerate() {
                self.hand[player][hand_size + i]
                    .card_mut()
                    .code
                    .advance(realtime, info.code);
            }
        } else {
            let hand_size = self.hand[player].len();
            if hand_size < count {
                return Err(BoardError::MalformedMessage(format!(
                    "undrew {count} cards from a hand of {hand_size}"
                )));
            }
            for i in 0..count {
                self.hand[player][hand_size - 1 - i].card_mut().code.retreat();
            }
            for _ in 0..count {
                if let Some(card) = self.hand[player].pop() {
                    self.deck[player].push(card);
                }
            }
        }
        Ok(())
    }

    // A swap never changes container sizes, so both cards are exchanged in
    // place and no stack rebalancing is needed; no history on either card
    // moves. Running the same exchange again is its own inverse.
    fn handle_swap_cards(&mut self, msg: SwapCards) -> Result<(), BoardError> {
        let first = msg.card1.place();
        let second = msg.card2.place();
        if first == second {
            return Err(BoardError::IllegalMove(first));
        }
        self.card(first)?;
        self.card(second)?;
        match (first.is_pile(), second.is_pile()) {
            (true, true) => {
                if (first.controller, first.location) == (second.controller, second.location) {
                    let pile = self.pile_mut(first.controller, first.location)?;
                    pile.swap(first.sequence as usize, second.sequence as usize);
                } else {
                    let card1 = {
                        let pile = self.pile_mut(first.controller, first.location)?;
                        std::mem::replace(&mut pile[first.sequence as usize], C::default())
                    };
                    let card2 = {
                        let pile = self.pile_mut(second.controller, second.location)?;
                        std::mem::replace(&mut pile[second.sequence as usize], card1)
                    };
                    self.pile_mut(first.controller, first.location)?[first.sequence as usize] =
                        card2;
                }
            }
            (false, false) => {
                let card1 = self
                    .field_zones
                    .remove(&first)
                    .ok_or(BoardError::MissingCard(first))?;
                let card2 = match self.field_zones.remove(&second) {
                    Some(card) => card,
                    None => {
                        self.field_zones.insert(first, card1);
                        return Err(BoardError::MissingCard(second));
                    }
                };
                self.field_zones.insert(first, card2);
                self.field_zones.insert(second, card1);
            }
            _ => {
                let (pile_place, field_place) = if first.is_pile() {
                    (first, second)
                } else {
                    (second, first)
                };
                let field_card = self
                    .field_zones
                    .remove(&field_place)
                    .ok_or(BoardError::MissingCard(field_place))?;
                let pile_card = {
                    let pile = self.pile_mut(pile_place.controller, pile_place.location)?;
                    std::mem::replace(&mut pile[pile_place.sequence as usize], field_card)
                };
                self.field_zones.insert(field_place, pile_card);
            }
        }
        Ok(())
    }

    fn handle_shuffle_location(&mut self, msg: ShuffleLocation) -> Result<(), BoardError> {
        let advancing = self.advancing;
        let realtime = self.realtime;
        let pile = self.pile_mut(msg.player, msg.location)?;
        if advancing {
            if !msg.shuffled_cards.is_empty() && msg.shuffled_cards.len() != pile.len() {
                return Err(BoardError::MalformedMessage(format!(
                    "shuffle of {} codes against a pile of {}",
                    msg.shuffled_cards.len(),
                    pile.len()
                )));
            }
            for (i, card) in pile.iter_mut().enumerate() {
                let code = msg.shuffled_cards.get(i).map_or(0, |info| info.code);
                card.card_mut().code.advance(realtime, code);
            }
        } else {
            for card in pile.iter_mut() {
                card.card_mut().code.retreat();
            }
        }
        Ok(())
    }

    fn handle_shuffle_set_cards(&mut self, msg: ShuffleSetCards) -> Result<(), BoardError> {
        let realtime = self.realtime;
        if !msg.current.is_empty() && msg.current.len() != msg.previous.len() {
            return Err(BoardError::MalformedMessage(format!(
                "set-card shuffle with {} previous but {} current entries",
                msg.previous.len(),
                msg.current.len()
            )));
        }
        for info in &msg.previous {
            let place = info.place();
            if place.is_pile() {
                return Err(BoardError::MalformedMessage(format!(
                    "set-card shuffle names pile place {place:?}"
                )));
            }
            self.card(place)?;
        }
        if self.advancing {
            for (i, info) in msg.previous.iter().enumerate() {
                let card = self.card_mut(info.place())?.card_mut();
                match msg.current.get(i) {
                    Some(current) => {
                        card.code.advance(realtime, current.code);
                        card.position.advance(realtime, current.position);
                    }
                    None => {
                        card.code.advance(realtime, 0);
                        card.position.advance(realtime, info.position);
                    }
                }
            }
        } else {
            for info in &msg.previous {
                let card = self.card_mut(info.place())?.card_mut();
                card.code.retreat();
                card.position.retreat();
            }
        }
        Ok(())
    }

    fn handle_counter_change(&mut self, msg: CounterChange) -> Result<(), BoardError> {
        let advancing = self.advancing;
        let realtime = self.realtime;
        let card = self.card_mut(msg.place)?.card_mut();
        if advancing {
            match card.counters.entry(msg.counter.kind) {
                Entry::Occupied(slot) => {
                    let cell = slot.into_mut();
                    let next = match msg.change {
                        CounterChangeKind::Add => cell.current() + msg.counter.count,
                        CounterChangeKind::Remove => {
                            cell.current().saturating_sub(msg.counter.count)
                        }
                    };
                    cell.advance(realtime, next);
                }
                Entry::Vacant(slot) => {
                    if msg.change == CounterChangeKind::Remove {
                        return Err(BoardError::CursorBounds);
                    }
                    if !realtime {
                        // Re-walking, yet no history exists for this counter.
                        return Err(BoardError::CursorBounds);
                    }
                    slot.insert(Timeline::default()).advance(true, msg.counter.count);
                }
            }
        } else {
            let cell = card
                .counters
                .get_mut(&msg.counter.kind)
                .ok_or(BoardError::CursorBounds)?;
            if cell.at_sentinel() {
                return Err(BoardError::CursorBounds);
            }
            cell.retreat();
        }
        Ok(())
    }

    fn handle_disable_zones(&mut self, msg: DisableZones) -> Result<(), BoardError> {
        if self.advancing {
            if self.realtime {
                let targets: BTreeSet<Place> = msg.places.iter().copied().collect();
                for (place, cell) in self.disabled_zones.cells_mut() {
                    cell.advance(true, targets.contains(place));
                }
            } else {
                // Sync pass: the flags for this state were recorded the
                // first time through; step every cell onto them.
                for (_, cell) in self.disabled_zones.cells_mut() {
                    cell.advance(false, false);
                }
            }
        } else {
            for (_, cell) in self.disabled_zones.cells_mut() {
                cell.retreat();
            }
        }
        Ok(())
    }

    fn handle_lp_change(&mut self, msg: LpChange) -> Result<(), BoardError> {
        let player = player_index(msg.player)?;
        let realtime = self.realtime;
        let cell = &mut self.player_lp[player];
        if self.advancing {
            let current = *cell.current();
            let next = match msg.change {
                LpChangeKind::Damage | LpChangeKind::Pay => current.saturating_sub(msg.amount),
                LpChangeKind::Recover => current.saturating_add(msg.amount),
                LpChangeKind::Become => msg.amount,
            };
            cell.advance(realtime, next);
        } else {
            cell.retreat();
        }
        Ok(())
    }

    fn handle_new_turn(&mut self, msg: NewTurn) -> Result<(), BoardError> {
        if self.advancing {
            self.turn += 1;
            self.turn_player.advance(self.realtime, msg.turn_player);
        } else {
            self.turn_player.retreat();
            self.turn -= 1;
        }
        Ok(())
    }

    fn handle_new_phase(&mut self, msg: NewPhase) -> Result<(), BoardError> {
        if self.advancing {
            self.phase.advance(self.realtime, msg.phase);
        } else {
            self.phase.retreat();
        }
        Ok(())
    }

    // Take the card at `place` out of its container, rebalancing an overlay
    // stack it leaves behind.
    fn detach(&mut self, place: Place) -> Result<C, BoardError> {
        if place.is_pile() {
            let index = place.sequence as usize;
            let pile = self.pile_mut(place.controller, place.location)?;
            if index >= pile.len() {
                return Err(BoardError::MissingCard(place));
            }
            Ok(pile.remove(index))
        } else {
            let card = self
                .field_zones
                .remove(&place)
                .ok_or(BoardError::MissingCard(place))?;
            if place.is_overlay() {
                self.close_overlay_gap(place);
            }
            Ok(card)
        }
    }

    // Put a card into the container `place` names, opening an overlay gap
    // when inserting into a stack.
    fn attach(&mut self, place: Place, card: C) -> Result<(), BoardError> {
        if place.is_pile() {
            let index = place.sequence as usize;
            let pile = self.pile_mut(place.controller, place.location)?;
            if index > pile.len() {
                return Err(BoardError::MalformedMessage(format!(
                    "insert position {index} beyond pile"
                )));
            }
            pile.insert(index, card);
        } else {
            if place.is_overlay() {
                self.open_overlay_gap(place);
            } else if self.field_zones.contains_key(&place) {
                return Err(BoardError::MalformedMessage(format!(
                    "field slot {place:?} already occupied"
                )));
            }
            self.field_zones.insert(place, card);
        }
        Ok(())
    }
}
