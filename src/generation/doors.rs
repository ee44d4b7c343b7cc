//! # Doors
//!
//! A door is a directional marker on a room's perimeter. It stores the label
//! of its room rather than a reference, so rooms and doors never own each
//! other. Doors are created transiently during connection attempts; only
//! those that survive validation are queued on the map and carved at the end
//! of planning.

use crate::{DelveError, DelveResult, Direction, Position, Room};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A candidate doorway on a room's wall.
///
/// The cell must lie on the room's perimeter and must not be a corner;
/// corners face diagonally and cannot hold a door. `facing` is derived from
/// the wall the cell sits on, and the *closet* is the single tile directly
/// outside that wall.
///
/// # Examples
///
/// ```
/// use delve::{Direction, Door, Position, Room};
///
/// let room = Room::new(2, 2, 5, 5).unwrap();
/// let door = Door::new(&room, Position::new(4, 2)).unwrap();
/// assert_eq!(door.facing, Direction::North);
/// assert_eq!(door.closet(), Position::new(4, 1));
/// assert!(Door::new(&room, Position::new(2, 2)).is_err()); // corner
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Door {
    /// Label of the room this door belongs to
    pub room: usize,
    pub x: i32,
    pub y: i32,
    /// Outward direction of the wall the door sits on
    pub facing: Direction,
}

impl Door {
    /// Creates a door on `room`'s perimeter at `pos`.
    pub fn new(room: &Room, pos: Position) -> DelveResult<Self> {
        let facing = room.direction_facing(pos.x, pos.y).ok_or_else(|| {
            DelveError::InvalidState(format!(
                "({}, {}) is not a doorable cell of room {}",
                pos.x, pos.y, room.label
            ))
        })?;
        Ok(Self {
            room: room.label,
            x: pos.x,
            y: pos.y,
            facing,
        })
    }

    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// The tile directly outside the wall in the facing direction.
    pub fn closet(&self) -> Position {
        self.position() + self.facing.to_delta()
    }

    /// Whether this door and `other` face each other: opposite facings,
    /// colinear on the perpendicular axis, and each on the side the other
    /// points toward. Colinear pairs facing away from each other are not
    /// matches; rooms whose walls only avert like that get connected through
    /// the pathfinding tunnel fallback instead.
    pub fn facing_other(&self, other: &Door) -> bool {
        if self.facing.opposite() != other.facing {
            return false;
        }
        match self.facing {
            Direction::North => self.x == other.x && other.y < self.y,
            Direction::South => self.x == other.x && other.y > self.y,
            Direction::East => self.y == other.y && other.x > self.x,
            Direction::West => self.y == other.y && other.x < self.x,
        }
    }
}

/// All pairs of doors between two rooms whose facings match.
pub fn match_facing_doors(room1: &Room, room2: &Room) -> Vec<(Door, Door)> {
    let doors1 = all_possible_doors(room1);
    let doors2 = all_possible_doors(room2);

    let mut matches = Vec::new();
    for a in &doors1 {
        for b in &doors2 {
            if a.facing_other(b) {
                matches.push((*a, *b));
            }
        }
    }
    matches
}

/// Every door the room's perimeter can hold, in scan order.
pub fn all_possible_doors(room: &Room) -> Vec<Door> {
    room.door_candidates()
        .into_iter()
        .filter_map(|pos| Door::new(room, pos).ok())
        .collect()
}

/// The facing pair whose door cells are closest by Euclidean distance.
/// Ties keep the first minimum found.
pub fn closest_door_pair(matches: &[(Door, Door)]) -> Option<(Door, Door)> {
    let mut closest: Option<(Door, Door)> = None;
    let mut record = i64::MAX;
    for &(d1, d2) in matches {
        let dist = d1.position().distance_squared(d2.position());
        if dist < record {
            record = dist;
            closest = Some((d1, d2));
        }
    }
    closest
}

/// Samples facing pairs without replacement until one passes the offset
/// check, draining `matches` on exhaustion.
///
/// A pair is rejected when its doors sit one step apart along the facing
/// axis but misaligned on the other: the two closets would then overlap
/// diagonally instead of lining up into a corridor.
pub fn sample_valid_pair(matches: &mut Vec<(Door, Door)>, rng: &mut StdRng) -> Option<(Door, Door)> {
    while !matches.is_empty() {
        let pair = matches.swap_remove(rng.gen_range(0..matches.len()));
        if pair_offsets_are_valid(&pair.0, &pair.1) {
            return Some(pair);
        }
    }
    None
}

fn pair_offsets_are_valid(d1: &Door, d2: &Door) -> bool {
    let x_diff = (d1.x - d2.x).abs();
    let y_diff = (d1.y - d2.y).abs();
    match d1.facing {
        Direction::North | Direction::South => !(y_diff == 1 && x_diff != 0),
        Direction::East | Direction::West => !(x_diff == 1 && y_diff != 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn room_at(x: i32, y: i32) -> Room {
        Room::new(x, y, 5, 5).unwrap()
    }

    #[test]
    fn test_door_rejects_corners_and_interior() {
        let room = room_at(0, 0);
        assert!(Door::new(&room, Position::new(0, 0)).is_err());
        assert!(Door::new(&room, Position::new(4, 4)).is_err());
        assert!(Door::new(&room, Position::new(2, 2)).is_err());
        assert!(Door::new(&room, Position::new(2, 0)).is_ok());
    }

    #[test]
    fn test_closet_is_outside_the_wall() {
        let room = room_at(3, 3); // spans (3,3)..=(7,7)
        let north = Door::new(&room, Position::new(5, 3)).unwrap();
        let south = Door::new(&room, Position::new(5, 7)).unwrap();
        let west = Door::new(&room, Position::new(3, 5)).unwrap();
        let east = Door::new(&room, Position::new(7, 5)).unwrap();
        assert_eq!(north.closet(), Position::new(5, 2));
        assert_eq!(south.closet(), Position::new(5, 8));
        assert_eq!(west.closet(), Position::new(2, 5));
        assert_eq!(east.closet(), Position::new(8, 5));
        for d in [north, south, west, east] {
            assert!(!room.contains(d.closet()));
        }
    }

    #[test]
    fn test_facing_other_is_symmetric() {
        // One room above the other, doors aligned on x = 2.
        let top = room_at(0, 0);
        let bottom = room_at(0, 8);
        let d1 = Door::new(&top, Position::new(2, 4)).unwrap(); // south wall
        let d2 = Door::new(&bottom, Position::new(2, 8)).unwrap(); // north wall
        assert!(d1.facing_other(&d2));
        assert!(d2.facing_other(&d1));
    }

    #[test]
    fn test_facing_other_rejects_misaligned_and_averted() {
        let top = room_at(0, 0);
        let bottom = room_at(0, 8);
        let south = Door::new(&top, Position::new(2, 4)).unwrap();
        let north_offset = Door::new(&bottom, Position::new(3, 8)).unwrap();
        // Opposite facings but not colinear.
        assert!(!south.facing_other(&north_offset));

        // Same facing never matches.
        let south2 = Door::new(&bottom, Position::new(2, 12)).unwrap();
        assert_eq!(south2.facing, Direction::South);
        assert!(!south.facing_other(&south2));

        // Opposite facings pointing away from each other.
        let north_above = Door::new(&top, Position::new(2, 0)).unwrap();
        let south_below = Door::new(&bottom, Position::new(2, 12)).unwrap();
        assert_eq!(north_above.facing, Direction::North);
        assert!(!north_above.facing_other(&south_below));
    }

    #[test]
    fn test_match_facing_doors_between_stacked_rooms() {
        let top = room_at(0, 0);
        let bottom = room_at(0, 8);
        let matches = match_facing_doors(&top, &bottom);
        // Columns 1..=3 of the facing walls line up: 3 pairs.
        assert_eq!(matches.len(), 3);
        for (a, b) in &matches {
            assert_eq!(a.facing, Direction::South);
            assert_eq!(b.facing, Direction::North);
            assert_eq!(a.x, b.x);
        }
    }

    #[test]
    fn test_closest_pair_picks_minimum() {
        let left = room_at(0, 0);
        let right = room_at(10, 2);
        let matches = match_facing_doors(&left, &right);
        let (d1, d2) = closest_door_pair(&matches).unwrap();
        let best = matches
            .iter()
            .map(|(a, b)| a.position().distance_squared(b.position()))
            .min()
            .unwrap();
        assert_eq!(d1.position().distance_squared(d2.position()), best);
    }

    #[test]
    fn test_sample_valid_pair_drains_matches() {
        let top = room_at(0, 0);
        let bottom = room_at(0, 8);
        let mut matches = match_facing_doors(&top, &bottom);
        let total = matches.len();
        let mut rng = StdRng::seed_from_u64(5);
        let picked = sample_valid_pair(&mut matches, &mut rng);
        assert!(picked.is_some());
        assert_eq!(matches.len(), total - 1);
    }
}
