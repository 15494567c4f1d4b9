//! Zone coordinates and their classification.
//!
//! Every card lives at a [`Place`]. Locations split into *piles* (ordered
//! sequences: decks, hand, graveyard, banished) and *field slots*
//! (addressable cells, possibly hosting overlay stacks); [`is_pile`] is the
//! sole source of truth for that distinction.

use serde::{Deserialize, Serialize};

/// Location bitmask values, matching the simulator's wire constants.
pub mod location {
    pub const MAIN_DECK: u32 = 0x01;
    pub const HAND: u32 = 0x02;
    pub const MONSTER_ZONE: u32 = 0x04;
    pub const SPELL_ZONE: u32 = 0x08;
    pub const GRAVEYARD: u32 = 0x10;
    pub const BANISHED: u32 = 0x20;
    pub const EXTRA_DECK: u32 = 0x40;
    pub const OVERLAY: u32 = 0x80;
    pub const ON_FIELD: u32 = 0x0C;
    pub const FIELD_ZONE: u32 = 0x100;
    pub const PENDULUM_ZONE: u32 = 0x200;

    /// Any of these bits makes a location a field location.
    pub const FIELD_MASK: u32 =
        MONSTER_ZONE | SPELL_ZONE | OVERLAY | ON_FIELD | FIELD_ZONE | PENDULUM_ZONE;
}

/// Card position flags, matching the simulator's wire constants.
pub mod position {
    pub const FACE_UP_ATTACK: u32 = 0x1;
    pub const FACE_DOWN_ATTACK: u32 = 0x2;
    pub const FACE_UP_DEFENSE: u32 = 0x4;
    pub const FACE_DOWN_DEFENSE: u32 = 0x8;
    pub const FACE_UP: u32 = 0x5;
    pub const FACE_DOWN: u32 = 0xA;
}

/// True iff `location` names a pile (deck, hand, graveyard, banished,
/// extra deck) rather than a field slot.
pub fn is_pile(location: u32) -> bool {
    location & location::FIELD_MASK == 0
}

/// Where a card lives.
///
/// `overlay_sequence` is negative for everything that is not an overlay
/// slot; for overlays it is the index within the host's stack, 0 being the
/// bottom. The derived `Ord` is lexicographic over the fields in declaration
/// order, which is what the field-slot map keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Place {
    pub controller: u32,
    pub location: u32,
    pub sequence: u32,
    pub overlay_sequence: i32,
}

impl Place {
    /// A non-overlay place.
    pub fn zone(controller: u32, location: u32, sequence: u32) -> Self {
        Place {
            controller,
            location,
            sequence,
            overlay_sequence: -1,
        }
    }

    /// An overlay slot under the zone at `sequence`.
    pub fn overlay(controller: u32, location: u32, sequence: u32, overlay_sequence: i32) -> Self {
        Place {
            controller,
            location,
            sequence,
            overlay_sequence,
        }
    }

    pub fn is_pile(&self) -> bool {
        is_pile(self.location)
    }

    /// True iff this place addresses a slot inside an overlay stack.
    pub fn is_overlay(&self) -> bool {
        self.location & location::OVERLAY != 0 && self.overlay_sequence >= 0
    }

    /// The field slot hosting this overlay stack, i.e. this place with the
    /// stack index stripped.
    pub fn host(&self) -> Place {
        Place {
            overlay_sequence: -1,
            ..*self
        }
    }
}
