//! The explorable duel board.
//!
//! [`DuelBoard`] owns every container a duel observer needs: the ten piles,
//! the field-slot map (overlay stacks included), the fixed-domain
//! disabled-zone flags, the per-player scalars, and the message log with its
//! two cursors. `append` enqueues what the simulator said; `forward` and
//! `backward` walk the cursor over it, appending to attribute histories when
//! on the live tail and re-walking them otherwise.

mod card;
mod interpreter;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::errors::BoardError;
use crate::message::AnyMessage;
use crate::place::{location, position, Place};
use crate::timeline::Timeline;

pub use card::{AsCard, Card};

/// A linear run of cards addressed by index. Index 0 is the pile bottom,
/// except for the hand where index 0 is the leftmost card.
pub type Pile<C> = Vec<C>;

/// Key for cards that left existence: the state the removing step produced,
/// plus the place the card vacated.
pub type RemovalKey = (u32, Place);

/// Disablement flags for every zone a card effect can block.
///
/// The domain is fixed at construction (both controllers, monster zones
/// 0..=6, spell zones 0..=5, pendulum zones 0..=1) and the keyset never
/// changes afterwards. Stored as a sorted flat vector so the
/// sweep in the interpreter touches every cell exactly once per message.
#[derive(Debug, Clone)]
pub struct DisabledZones {
    cells: Vec<(Place, Timeline<bool>)>,
}

impl DisabledZones {
    fn new() -> Self {
        let mut cells = Vec::new();
        for controller in 0..2u32 {
            for (loc, last) in [
                (location::MONSTER_ZONE, 6u32),
                (location::SPELL_ZONE, 5),
                (location::PENDULUM_ZONE, 1),
            ] {
                for sequence in 0..=last {
                    cells.push((Place::zone(controller, loc, sequence), Timeline::default()));
                }
            }
        }
        cells.sort_by_key(|(place, _)| *place);
        DisabledZones { cells }
    }

    /// Current flag for `place`; false for places outside the domain.
    pub fn is_disabled(&self, place: Place) -> bool {
        self.cells
            .binary_search_by(|(key, _)| key.cmp(&place))
            .map(|i| *self.cells[i].1.current())
            .unwrap_or(false)
    }

    /// Current flags for the whole domain, in place order.
    pub fn iter(&self) -> impl Iterator<Item = (Place, bool)> + '_ {
        self.cells
            .iter()
            .map(|(place, cell)| (*place, *cell.current()))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut (Place, Timeline<bool>)> {
        self.cells.iter_mut()
    }
}

/// Code, position, and counters of one card as currently observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub code: u32,
    pub position: u32,
    pub counters: Vec<(u32, u32)>,
}

impl CardView {
    fn of(card: &Card) -> Self {
        CardView {
            code: *card.code.current(),
            position: *card.position.current(),
            counters: card
                .counters
                .iter()
                .map(|(kind, cell)| (*kind, *cell.current()))
                .collect(),
        }
    }
}

/// One pile's current contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PileView {
    pub controller: u32,
    pub location: u32,
    pub cards: Vec<CardView>,
}

/// Pure-data summary of everything currently observable on the board.
/// Two snapshots compare equal iff an observer could not tell the two
/// board states apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub piles: Vec<PileView>,
    pub field: Vec<(Place, CardView)>,
    pub disabled: Vec<(Place, bool)>,
    pub lp: [u32; 2],
    pub turn: u32,
    pub turn_player: u32,
    pub phase: u32,
}

const PILE_LOCATIONS: [u32; 5] = [
    location::MAIN_DECK,
    location::HAND,
    location::GRAVEYARD,
    location::BANISHED,
    location::EXTRA_DECK,
];

/// The board container and replay cursor. Generic over the stored card type
/// so embedders can carry presentation data; defaults to the bare [`Card`].
#[derive(Debug)]
pub struct DuelBoard<C: AsCard = Card> {
    turn: u32,
    player_lp: [Timeline<u32>; 2],
    turn_player: Timeline<u32>,
    phase: Timeline<u32>,
    deck: [Pile<C>; 2],
    hand: [Pile<C>; 2],
    grave: [Pile<C>; 2],
    banished: [Pile<C>; 2],
    extra: [Pile<C>; 2],
    field_zones: BTreeMap<Place, C>,
    disabled_zones: DisabledZones,
    removed_cards: BTreeMap<RemovalKey, C>,
    realtime: bool,
    advancing: bool,
    state: usize,
    processed_state: usize,
    msgs: Vec<AnyMessage>,
}

impl<C: AsCard> Default for DuelBoard<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: AsCard> DuelBoard<C> {
    pub fn new() -> Self {
        DuelBoard {
            turn: 0,
            player_lp: Default::default(),
            turn_player: Timeline::default(),
            phase: Timeline::default(),
            deck: Default::default(),
            hand: Default::default(),
            grave: Default::default(),
            banished: Default::default(),
            extra: Default::default(),
            field_zones: BTreeMap::new(),
            disabled_zones: DisabledZones::new(),
            removed_cards: BTreeMap::new(),
            realtime: false,
            advancing: false,
            state: 0,
            processed_state: 0,
            msgs: Vec::new(),
        }
    }

    /// Number of messages in the log.
    pub fn total_states(&self) -> usize {
        self.msgs.len()
    }

    /// High-water mark of forward progress.
    pub fn processed_states(&self) -> usize {
        self.processed_state
    }

    /// Index of the next message `forward` would interpret.
    pub fn current_state(&self) -> usize {
        self.state
    }

    /// True when the cursor sits on the live tail, so the next forward step
    /// appends new history instead of re-walking it.
    pub fn is_realtime(&self) -> bool {
        self.state == self.processed_state
    }

    /// Add a message at the end of the log. Never moves the cursor.
    pub fn append(&mut self, msg: impl Into<AnyMessage>) {
        self.msgs.push(msg.into());
    }

    /// Advance the duel state once. A no-op at the log tail. On error the
    /// board and both cursors are left untouched.
    pub fn forward(&mut self) -> Result<(), BoardError> {
        if self.msgs.is_empty() || self.state >= self.msgs.len() {
            return Ok(());
        }
        let realtime = self.is_realtime();
        self.realtime = realtime;
        self.advancing = true;
        self.interpret(self.state)?;
        if realtime {
            self.processed_state += 1;
        }
        self.state += 1;
        Ok(())
    }

    /// Regress the duel state once. A no-op at state 0. On error the board
    /// and the cursor are left untouched.
    pub fn backward(&mut self) -> Result<(), BoardError> {
        if self.state == 0 {
            return Ok(());
        }
        self.realtime = false;
        self.advancing = false;
        self.state -= 1;
        if let Err(err) = self.interpret(self.state) {
            self.state += 1;
            return Err(err);
        }
        Ok(())
    }

    /// Seed a pile with `count` face-down cards. Used before the first
    /// forward step.
    pub fn fill_pile(&mut self, controller: u32, loc: u32, count: usize) -> Result<(), BoardError> {
        let pile = self.pile_mut(controller, loc)?;
        pile.resize_with(count, C::default);
        for card in pile.iter_mut() {
            card.card_mut().position.advance(true, position::FACE_DOWN);
        }
        Ok(())
    }

    /// Seed a player's starting life points. Used before the first forward
    /// step.
    pub fn set_lp(&mut self, controller: u32, lp: u32) -> Result<(), BoardError> {
        let index = player_index(controller)?;
        self.player_lp[index].advance(true, lp);
        Ok(())
    }

    /// The pile for one of the five pile locations.
    pub fn pile(&self, controller: u32, loc: u32) -> Result<&[C], BoardError> {
        let index = player_index(controller)?;
        let pile = match loc {
            location::MAIN_DECK => &self.deck[index],
            location::HAND => &self.hand[index],
            location::GRAVEYARD => &self.grave[index],
            location::BANISHED => &self.banished[index],
            location::EXTRA_DECK => &self.extra[index],
            other => return Err(BoardError::UnknownLocation(other)),
        };
        Ok(pile)
    }

    pub(crate) fn pile_mut(&mut self, controller: u32, loc: u32) -> Result<&mut Pile<C>, BoardError> {
        let index = player_index(controller)?;
        let pile = match loc {
            location::MAIN_DECK => &mut self.deck[index],
            location::HAND => &mut self.hand[index],
            location::GRAVEYARD => &mut self.grave[index],
            location::BANISHED => &mut self.banished[index],
            location::EXTRA_DECK => &mut self.extra[index],
            other => return Err(BoardError::UnknownLocation(other)),
        };
        Ok(pile)
    }

    /// The card at `place`, wherever it lives.
    pub fn card(&self, place: Place) -> Result<&C, BoardError> {
        if place.is_pile() {
            self.pile(place.controller, place.location)?
                .get(place.sequence as usize)
                .ok_or(BoardError::MissingCard(place))
        } else {
            self.field_zones
                .get(&place)
                .ok_or(BoardError::MissingCard(place))
        }
    }

    pub(crate) fn card_mut(&mut self, place: Place) -> Result<&mut C, BoardError> {
        if place.is_pile() {
            self.pile_mut(place.controller, place.location)?
                .get_mut(place.sequence as usize)
                .ok_or(BoardError::MissingCard(place))
        } else {
            self.field_zones
                .get_mut(&place)
                .ok_or(BoardError::MissingCard(place))
        }
    }

    /// Every occupied field slot, overlay stacks included.
    pub fn field_zones(&self) -> &BTreeMap<Place, C> {
        &self.field_zones
    }

    /// The fixed-domain zone disablement flags.
    pub fn disabled_zones(&self) -> &DisabledZones {
        &self.disabled_zones
    }

    /// A card that left existence at `state`, if still parked there.
    pub fn removed_card(&self, state: usize, place: Place) -> Option<&C> {
        self.removed_cards.get(&(state as u32, place))
    }

    /// Current life points for player 0 or 1.
    pub fn lp(&self, player: u32) -> u32 {
        *self.player_lp[player as usize].current()
    }

    /// Current turn number.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Player taking the current turn.
    pub fn turn_player(&self) -> u32 {
        *self.turn_player.current()
    }

    /// Current phase value as announced by the simulator.
    pub fn phase(&self) -> u32 {
        *self.phase.current()
    }

    /// Pure-data summary of the currently observable board.
    pub fn snapshot(&self) -> BoardSnapshot {
        let mut piles = Vec::with_capacity(PILE_LOCATIONS.len() * 2);
        for controller in 0..2u32 {
            for loc in PILE_LOCATIONS {
                let cards = match self.pile(controller, loc) {
                    Ok(pile) => pile.iter().map(|c| CardView::of(c.card())).collect(),
                    Err(_) => Vec::new(),
                };
                piles.push(PileView {
                    controller,
                    location: loc,
                    cards,
                });
            }
        }
        BoardSnapshot {
            piles,
            field: self
                .field_zones
                .iter()
                .map(|(place, card)| (*place, CardView::of(card.card())))
                .collect(),
            disabled: self.disabled_zones.iter().collect(),
            lp: [self.lp(0), self.lp(1)],
            turn: self.turn,
            turn_player: self.turn_player(),
            phase: self.phase(),
        }
    }
}

pub(crate) fn player_index(controller: u32) -> Result<usize, BoardError> {
    if controller < 2 {
        Ok(controller as usize)
    } else {
        Err(BoardError::MalformedMessage(format!(
            "controller {controller} out of range"
        )))
    }
}
