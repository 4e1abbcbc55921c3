//! Meeple tokens and the ledger of claimed features.
//!
//! This module contains:
//! - `PlayerColor`, including the `Gray` sentinel for unclaimed candidates
//! - `MeepleData`, one token on the board
//! - `MeepleLedger`, the map from feature slots to tokens with the claim and
//!   payout rules

use crate::board::Board;
use crate::feature::{FeatureFlags, FeatureKind, MeepleKind, Slot};
use crate::graph::{connected_component, TileFeatureKey};
use crate::tile::TileId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Owner color of a meeple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerColor {
    /// Unclaimed candidate offered to the current player
    Gray,
    Red,
    Blue,
    Yellow,
    Green,
}

impl PlayerColor {
    /// Colors handed to seats, in order
    pub const SEATS: [PlayerColor; 4] = [
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Yellow,
        PlayerColor::Green,
    ];

    /// Color for a seat index
    pub fn for_seat(seat: usize) -> Self {
        Self::SEATS[seat % Self::SEATS.len()]
    }

    pub fn is_gray(&self) -> bool {
        matches!(self, PlayerColor::Gray)
    }
}

/// Unique id of a meeple within one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeepleId(pub u32);

impl std::fmt::Display for MeepleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A meeple token on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeepleData {
    pub id: MeepleId,
    pub color: PlayerColor,
    pub kind: MeepleKind,
}

impl MeepleData {
    pub fn is_candidate(&self) -> bool {
        self.color.is_gray()
    }
}

/// A ledger entry paired with the slot it sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedMeeple {
    pub key: TileFeatureKey,
    pub meeple: MeepleData,
}

/// Which feature slots carry a meeple, gray candidates included
#[derive(Debug, Clone, Default)]
pub struct MeepleLedger {
    entries: HashMap<TileFeatureKey, MeepleData>,
    next_id: u32,
}

impl MeepleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &TileFeatureKey) -> Option<&MeepleData> {
        self.entries.get(key)
    }

    /// Find a meeple and its slot by id
    pub fn find(&self, id: MeepleId) -> Option<PlacedMeeple> {
        self.entries
            .iter()
            .find(|(_, meeple)| meeple.id == id)
            .map(|(key, meeple)| PlacedMeeple {
                key: *key,
                meeple: *meeple,
            })
    }

    /// Whether a meeple may claim `kind` on this slot.
    ///
    /// The slot must offer a claimable kind, the center only takes a
    /// monastery, and nothing in the connected feature may already hold a
    /// meeple. Gray candidates count as holders, so only one candidate is
    /// ever offered per feature.
    pub fn can_place(&self, board: &Board, tile: TileId, kind: FeatureFlags, slot: Slot) -> bool {
        if !kind.intersects(FeatureFlags::CLAIMABLE) {
            return false;
        }
        if slot.is_center() && !kind.contains(FeatureFlags::MONASTERY) {
            return false;
        }
        let Ok(feature) = FeatureKind::try_from(kind) else {
            return false;
        };

        let start = TileFeatureKey::new(tile, kind, slot);
        let component = self.component(board, start, feature);
        !component.iter().any(|key| self.holds(key, feature))
    }

    /// Register a gray candidate on a slot.
    ///
    /// Returns `None` if the slot already holds a meeple or `kind` has no
    /// meeple shape.
    pub fn place_candidate(
        &mut self,
        tile: TileId,
        kind: FeatureFlags,
        slot: Slot,
    ) -> Option<MeepleData> {
        let key = TileFeatureKey::new(tile, kind, slot);
        if self.entries.contains_key(&key) {
            debug!(%tile, ?slot, "Slot already holds a meeple");
            return None;
        }
        let feature = FeatureKind::try_from(kind).ok()?;

        let meeple = MeepleData {
            id: MeepleId(self.next_id),
            color: PlayerColor::Gray,
            kind: MeepleKind::from(feature),
        };
        self.next_id += 1;
        self.entries.insert(key, meeple);
        Some(meeple)
    }

    /// Hand a meeple to a color
    pub fn promote(&mut self, id: MeepleId, color: PlayerColor) -> Option<MeepleData> {
        let meeple = self.entries.values_mut().find(|meeple| meeple.id == id)?;
        meeple.color = color;
        Some(*meeple)
    }

    /// Take a meeple off the board; the caller returns it to its owner
    pub fn remove(&mut self, id: MeepleId) -> Option<MeepleData> {
        let key = self
            .entries
            .iter()
            .find(|(_, meeple)| meeple.id == id)
            .map(|(key, _)| *key)?;
        self.entries.remove(&key)
    }

    /// Drop every gray candidate, returning how many there were
    pub fn discard_candidates(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, meeple| !meeple.is_candidate());
        before - self.entries.len()
    }

    /// Gray candidates, ordered by slot
    pub fn candidates(&self) -> Vec<PlacedMeeple> {
        self.collect(|meeple| meeple.is_candidate())
    }

    /// Claimed meeples, ordered by slot
    pub fn claimed(&self) -> Vec<PlacedMeeple> {
        self.collect(|meeple| !meeple.is_candidate())
    }

    /// Claimed meeples of `kind` inside a component, ordered by slot.
    ///
    /// A shared center slot belongs to every feature crossing it, so a bishop
    /// there never counts towards the road or city passing through.
    pub fn meeples_in(
        &self,
        component: &HashSet<TileFeatureKey>,
        kind: FeatureKind,
    ) -> Vec<PlacedMeeple> {
        let mut found: Vec<PlacedMeeple> = component
            .iter()
            .filter_map(|key| {
                self.entries
                    .get(key)
                    .filter(|meeple| !meeple.is_candidate())
                    .filter(|meeple| FeatureKind::from(meeple.kind) == kind)
                    .map(|meeple| PlacedMeeple {
                        key: *key,
                        meeple: *meeple,
                    })
            })
            .collect();
        found.sort_by_key(|placed| placed.key);
        found
    }

    /// Colors that score the feature containing a slot: all tied at the top
    pub fn scoring_owners(
        &self,
        board: &Board,
        tile: TileId,
        kind: FeatureFlags,
        slot: Slot,
    ) -> BTreeSet<PlayerColor> {
        let Ok(feature) = FeatureKind::try_from(kind) else {
            return BTreeSet::new();
        };
        let component = self.component(board, TileFeatureKey::new(tile, kind, slot), feature);
        self.owners_in(&component, feature)
    }

    /// Colors tied at the highest count of `kind` meeples within a component
    pub fn owners_in(
        &self,
        component: &HashSet<TileFeatureKey>,
        kind: FeatureKind,
    ) -> BTreeSet<PlayerColor> {
        let mut counts: BTreeMap<PlayerColor, u32> = BTreeMap::new();
        for placed in self.meeples_in(component, kind) {
            *counts.entry(placed.meeple.color).or_default() += 1;
        }

        let Some(&top) = counts.values().max() else {
            return BTreeSet::new();
        };
        counts
            .into_iter()
            .filter(|&(_, count)| count == top)
            .map(|(color, _)| color)
            .collect()
    }

    /// Every entry, ordered by slot
    pub fn entries(&self) -> Vec<PlacedMeeple> {
        self.collect(|_| true)
    }

    fn collect(&self, keep: impl Fn(&MeepleData) -> bool) -> Vec<PlacedMeeple> {
        let mut found: Vec<PlacedMeeple> = self
            .entries
            .iter()
            .filter(|(_, meeple)| keep(meeple))
            .map(|(key, meeple)| PlacedMeeple {
                key: *key,
                meeple: *meeple,
            })
            .collect();
        found.sort_by_key(|placed| placed.key);
        found
    }

    /// Whether a slot holds a meeple, gray or claimed, of `kind`
    fn holds(&self, key: &TileFeatureKey, kind: FeatureKind) -> bool {
        self.entries
            .get(key)
            .is_some_and(|meeple| FeatureKind::from(meeple.kind) == kind)
    }

    /// The feature a slot belongs to, walked with the kind's own flag so a
    /// road reached through an end slot is still one road
    fn component(
        &self,
        board: &Board,
        start: TileFeatureKey,
        kind: FeatureKind,
    ) -> HashSet<TileFeatureKey> {
        match kind {
            FeatureKind::Monastery => HashSet::from([start]),
            FeatureKind::Road | FeatureKind::City => {
                connected_component(board, start, kind.flag())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridPos;
    use crate::tile::{Rotation, TileTemplate};

    const F: FeatureFlags = FeatureFlags::FIELD;
    const C: FeatureFlags = FeatureFlags::CITY;
    const M: FeatureFlags = FeatureFlags::MONASTERY;
    const R: FeatureFlags = FeatureFlags::ROAD;

    /// Starter city cap with a second cap closing it from the north
    fn two_tile_city() -> (Board, TileId, TileId) {
        let cap = TileTemplate::new("city-cap", F, [C, F, F, F]);
        let mut board = Board::new();
        let south = board.place_starter(cap.clone()).unwrap();
        let north = board
            .place(GridPos::new(0, 1), Some(cap), Rotation::new(2).unwrap())
            .unwrap();
        (board, south, north)
    }

    fn city_ring() -> (Board, [TileId; 4]) {
        let corner = TileTemplate::new("city-corner", C, [C, C, F, F]);
        let mut board = Board::new();
        let a = board.place_starter(corner.clone()).unwrap();
        let mut put = |x, y, turns, template: &TileTemplate| {
            board
                .place(GridPos::new(x, y), Some(template.clone()), Rotation::new(turns).unwrap())
                .unwrap()
        };
        let b = put(1, 0, 3, &corner);
        let c = put(0, 1, 1, &corner);
        let d = put(1, 1, 2, &corner);
        (board, [a, b, c, d])
    }

    #[test]
    fn test_only_claimable_kinds() {
        let (board, south, _) = two_tile_city();
        let ledger = MeepleLedger::new();
        assert!(ledger.can_place(&board, south, C, Slot::North));
        assert!(!ledger.can_place(&board, south, F, Slot::East));
        assert!(!ledger.can_place(&board, south, FeatureFlags::empty(), Slot::East));
    }

    #[test]
    fn test_center_is_monastery_only() {
        let mut board = Board::new();
        let id = board.place_starter(TileTemplate::new("monastery", M, [F, F, F, F])).unwrap();
        let ledger = MeepleLedger::new();
        assert!(ledger.can_place(&board, id, M, Slot::Center));
        assert!(!ledger.can_place(&board, id, C, Slot::Center));
        assert!(!ledger.can_place(&board, id, FeatureFlags::ROAD, Slot::Center));
    }

    #[test]
    fn test_connected_city_rejects_second_claim() {
        let (board, south, north) = two_tile_city();
        let mut ledger = MeepleLedger::new();

        let meeple = ledger.place_candidate(south, C, Slot::North).unwrap();
        ledger.promote(meeple.id, PlayerColor::Red).unwrap();

        assert!(!ledger.can_place(&board, north, C, Slot::South));
    }

    #[test]
    fn test_gray_candidate_blocks_its_feature() {
        let (board, south, north) = two_tile_city();
        let mut ledger = MeepleLedger::new();
        ledger.place_candidate(south, C, Slot::North).unwrap();
        assert!(!ledger.can_place(&board, north, C, Slot::South));

        assert_eq!(ledger.discard_candidates(), 1);
        assert!(ledger.can_place(&board, north, C, Slot::South));
    }

    #[test]
    fn test_candidate_rejects_occupied_slot_and_unclaimable_kind() {
        let mut ledger = MeepleLedger::new();
        let first = ledger.place_candidate(TileId(0), C, Slot::North).unwrap();
        assert_eq!(first.color, PlayerColor::Gray);
        assert_eq!(first.kind, MeepleKind::Knight);
        assert!(ledger.place_candidate(TileId(0), C | FeatureFlags::SHIELD, Slot::North).is_none());
        assert!(ledger.place_candidate(TileId(0), F, Slot::East).is_none());

        let second = ledger.place_candidate(TileId(0), FeatureFlags::ROAD, Slot::East).unwrap();
        assert_ne!(first.id, second.id);
        assert_eq!(second.kind, MeepleKind::Road);
    }

    #[test]
    fn test_promote_and_remove() {
        let mut ledger = MeepleLedger::new();
        let meeple = ledger.place_candidate(TileId(2), M, Slot::Center).unwrap();

        let promoted = ledger.promote(meeple.id, PlayerColor::Blue).unwrap();
        assert_eq!(promoted.color, PlayerColor::Blue);
        assert_eq!(ledger.claimed().len(), 1);
        assert!(ledger.candidates().is_empty());

        assert_eq!(ledger.remove(meeple.id), Some(promoted));
        assert!(ledger.remove(meeple.id).is_none());
        assert!(ledger.promote(meeple.id, PlayerColor::Red).is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_tied_owners_all_score() {
        let (board, [a, b, c, d]) = city_ring();
        let mut ledger = MeepleLedger::new();
        let claims = [
            (a, Slot::North, PlayerColor::Red),
            (b, Slot::North, PlayerColor::Red),
            (c, Slot::East, PlayerColor::Blue),
            (d, Slot::South, PlayerColor::Blue),
        ];
        for (tile, slot, color) in claims {
            let meeple = ledger.place_candidate(tile, C, slot).unwrap();
            ledger.promote(meeple.id, color).unwrap();
        }

        let owners = ledger.scoring_owners(&board, a, C, Slot::East);
        assert_eq!(owners, BTreeSet::from([PlayerColor::Red, PlayerColor::Blue]));
    }

    #[test]
    fn test_majority_wins_and_candidates_do_not_count() {
        let (board, [a, b, c, _]) = city_ring();
        let mut ledger = MeepleLedger::new();
        for (tile, slot) in [(a, Slot::North), (b, Slot::North)] {
            let meeple = ledger.place_candidate(tile, C, slot).unwrap();
            ledger.promote(meeple.id, PlayerColor::Green).unwrap();
        }
        let meeple = ledger.place_candidate(c, C, Slot::East).unwrap();
        ledger.promote(meeple.id, PlayerColor::Yellow).unwrap();
        ledger.place_candidate(c, C, Slot::South).unwrap();

        let owners = ledger.scoring_owners(&board, c, C, Slot::South);
        assert_eq!(owners, BTreeSet::from([PlayerColor::Green]));
    }

    #[test]
    fn test_unclaimed_feature_has_no_owners() {
        let (board, south, _) = two_tile_city();
        let ledger = MeepleLedger::new();
        assert!(ledger.scoring_owners(&board, south, C, Slot::North).is_empty());
    }

    /// Monastery whose road leaves south, with a straight road below it
    fn monastery_with_road() -> (Board, TileId, TileId) {
        let mut board = Board::new();
        let monastery = board
            .place_starter(TileTemplate::new("monastery-road", M | R, [F, F, R, F]))
            .unwrap();
        let road = board
            .place(
                GridPos::new(0, -1),
                Some(TileTemplate::new("road-straight", R, [R, F, R, F])),
                Rotation::NONE,
            )
            .unwrap();
        (board, monastery, road)
    }

    #[test]
    fn test_bishop_stays_out_of_road_through_its_center() {
        let (board, monastery, road) = monastery_with_road();
        let mut ledger = MeepleLedger::new();
        let bishop = ledger.place_candidate(monastery, M | R, Slot::Center).unwrap();
        assert_eq!(bishop.kind, MeepleKind::Bishop);
        ledger.promote(bishop.id, PlayerColor::Red).unwrap();

        let road_key = TileFeatureKey::new(road, R, Slot::North);
        let component = connected_component(&board, road_key, R);
        assert!(component.contains(&TileFeatureKey::new(monastery, M | R, Slot::Center)));

        assert!(ledger.can_place(&board, road, R, Slot::North));
        assert!(ledger.meeples_in(&component, FeatureKind::Road).is_empty());
        assert!(ledger.scoring_owners(&board, road, R, Slot::North).is_empty());
        assert_eq!(
            ledger.scoring_owners(&board, monastery, M | R, Slot::Center),
            BTreeSet::from([PlayerColor::Red])
        );

        let highwayman = ledger.place_candidate(road, R, Slot::South).unwrap();
        ledger.promote(highwayman.id, PlayerColor::Blue).unwrap();
        assert_eq!(
            ledger.scoring_owners(&board, monastery, FeatureFlags::ROAD, Slot::South),
            BTreeSet::from([PlayerColor::Blue])
        );
        let road_meeples = ledger.meeples_in(&component, FeatureKind::Road);
        assert_eq!(road_meeples.len(), 1);
        assert_eq!(road_meeples[0].meeple.kind, MeepleKind::Road);
    }

    #[test]
    fn test_seat_colors() {
        assert_eq!(PlayerColor::for_seat(0), PlayerColor::Red);
        assert_eq!(PlayerColor::for_seat(3), PlayerColor::Green);
        assert!(PlayerColor::SEATS.iter().all(|c| !c.is_gray()));
    }
}
