//! The message alphabet the simulator speaks.
//!
//! Messages arrive already decoded from the wire. Critical kinds mutate the
//! board and must be perfectly reversible; non-critical kinds are visual or
//! informational cues the stepping logic ignores. [`Information::is_critical`]
//! is the classification predicate.

use serde::{Deserialize, Serialize};

use crate::errors::BoardError;
use crate::place::{location, Place};

/// Card coordinates plus the revealed attributes a message carries.
///
/// `overlay_sequence` is only meaningful when `location` has the overlay
/// bit; [`CardInfo::place`] applies that rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInfo {
    pub controller: u32,
    pub location: u32,
    pub sequence: u32,
    pub overlay_sequence: i32,
    pub code: u32,
    pub position: u32,
}

impl CardInfo {
    pub fn place(&self) -> Place {
        Place {
            controller: self.controller,
            location: self.location,
            sequence: self.sequence,
            overlay_sequence: if self.location & location::OVERLAY != 0 {
                self.overlay_sequence
            } else {
                -1
            },
        }
    }
}

/// A typed counter amount attached to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub kind: u32,
    pub count: u32,
}

/// Why an UpdateCard message was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum UpdateReason {
    DeckTop = 0,
    Move = 1,
    PosChange = 2,
    Set = 3,
}

impl TryFrom<u32> for UpdateReason {
    type Error = BoardError;

    fn try_from(value: u32) -> Result<Self, BoardError> {
        match value {
            0 => Ok(UpdateReason::DeckTop),
            1 => Ok(UpdateReason::Move),
            2 => Ok(UpdateReason::PosChange),
            3 => Ok(UpdateReason::Set),
            other => Err(BoardError::MalformedMessage(format!(
                "unknown update reason {other}"
            ))),
        }
    }
}

/// Direction of a counter change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum CounterChangeKind {
    Add = 0,
    Remove = 1,
}

impl TryFrom<u32> for CounterChangeKind {
    type Error = BoardError;

    fn try_from(value: u32) -> Result<Self, BoardError> {
        match value {
            0 => Ok(CounterChangeKind::Add),
            1 => Ok(CounterChangeKind::Remove),
            other => Err(BoardError::MalformedMessage(format!(
                "unknown counter change kind {other}"
            ))),
        }
    }
}

/// How a life-point change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u32)]
pub enum LpChangeKind {
    Damage = 0,
    Pay = 1,
    Recover = 2,
    Become = 3,
}

impl TryFrom<u32> for LpChangeKind {
    type Error = BoardError;

    fn try_from(value: u32) -> Result<Self, BoardError> {
        match value {
            0 => Ok(LpChangeKind::Damage),
            1 => Ok(LpChangeKind::Pay),
            2 => Ok(LpChangeKind::Recover),
            3 => Ok(LpChangeKind::Become),
            other => Err(BoardError::MalformedMessage(format!(
                "unknown lp change kind {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCard {
    pub reason: UpdateReason,
    pub previous: CardInfo,
    pub current: CardInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddCard {
    pub card: CardInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveCard {
    pub card: CardInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub player: u32,
    pub cards: Vec<CardInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCards {
    pub card1: CardInfo,
    pub card2: CardInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleLocation {
    pub player: u32,
    pub location: u32,
    /// Empty when the shuffle hides the codes from the observer.
    pub shuffled_cards: Vec<CardInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShuffleSetCards {
    pub previous: Vec<CardInfo>,
    /// Empty when the resulting codes are hidden.
    pub current: Vec<CardInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterChange {
    pub place: Place,
    pub counter: Counter,
    pub change: CounterChangeKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableZones {
    pub places: Vec<Place>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LpChange {
    pub player: u32,
    pub change: LpChangeKind,
    pub amount: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTurn {
    pub turn_player: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPhase {
    pub phase: u32,
}

/// One simulator notification.
///
/// Critical variants mutate the board; the rest are surfaced to caller
/// diagnostics and ignored by the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Information {
    UpdateCard(UpdateCard),
    AddCard(AddCard),
    RemoveCard(RemoveCard),
    Draw(Draw),
    SwapCards(SwapCards),
    ShuffleLocation(ShuffleLocation),
    ShuffleSetCards(ShuffleSetCards),
    CounterChange(CounterChange),
    DisableZones(DisableZones),
    LpChange(LpChange),
    NewTurn(NewTurn),
    NewPhase(NewPhase),
    // Non-critical notifications.
    MatchKiller { card_code: u32 },
    MatchResult { winner: u32 },
    Hint { player: u32, hint: u32, value: u64 },
    Win { player: u32, reason: u32 },
    ConfirmCards { player: u32, cards: Vec<CardInfo> },
    SummonCard { card: CardInfo },
    SelectedCards { player: u32, cards: Vec<CardInfo> },
    OnAttack { attacker: Place, target: Option<Place> },
    CardHint { place: Place, hint: u32, value: u64 },
    PlayerHint { player: u32, hint: u32, value: u64 },
}

impl Information {
    /// True for the message kinds that mutate board state when stepped.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Information::UpdateCard(_)
                | Information::AddCard(_)
                | Information::RemoveCard(_)
                | Information::Draw(_)
                | Information::SwapCards(_)
                | Information::ShuffleLocation(_)
                | Information::ShuffleSetCards(_)
                | Information::CounterChange(_)
                | Information::DisableZones(_)
                | Information::LpChange(_)
                | Information::NewTurn(_)
                | Information::NewPhase(_)
        )
    }

    /// Short name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Information::UpdateCard(_) => "UpdateCard",
            Information::AddCard(_) => "AddCard",
            Information::RemoveCard(_) => "RemoveCard",
            Information::Draw(_) => "Draw",
            Information::SwapCards(_) => "SwapCards",
            Information::ShuffleLocation(_) => "ShuffleLocation",
            Information::ShuffleSetCards(_) => "ShuffleSetCards",
            Information::CounterChange(_) => "CounterChange",
            Information::DisableZones(_) => "DisableZones",
            Information::LpChange(_) => "LpChange",
            Information::NewTurn(_) => "NewTurn",
            Information::NewPhase(_) => "NewPhase",
            Information::MatchKiller { .. } => "MatchKiller",
            Information::MatchResult { .. } => "MatchResult",
            Information::Hint { .. } => "Hint",
            Information::Win { .. } => "Win",
            Information::ConfirmCards { .. } => "ConfirmCards",
            Information::SummonCard { .. } => "SummonCard",
            Information::SelectedCards { .. } => "SelectedCards",
            Information::OnAttack { .. } => "OnAttack",
            Information::CardHint { .. } => "CardHint",
            Information::PlayerHint { .. } => "PlayerHint",
        }
    }
}

/// Top-level tagged union delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "msg")]
pub enum AnyMessage {
    Information(Information),
}

impl From<Information> for AnyMessage {
    fn from(info: Information) -> Self {
        AnyMessage::Information(info)
    }
}
