//! # Rooms
//!
//! The rectangular room primitive and randomized room placement with
//! collision rejection.

use crate::{DelveError, DelveResult, Direction, GameMap, Position, TileKind};
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A rectangular room with closed integer bounds.
///
/// `(x1, y1)` is the top-left wall cell and `(x2, y2)` the bottom-right,
/// both inclusive. A room is at least 3x3 so it always has walls, corners,
/// and at least one open interior cell; smaller dimensions are rejected at
/// construction.
///
/// Geometry is immutable after construction. `label` is the room's index in
/// the map's room arena and `connections` records the labels of rooms this
/// one has been linked to; both are maintained by the connectivity planner.
///
/// # Examples
///
/// ```
/// use delve::{Position, Room};
///
/// let room = Room::new(2, 3, 5, 4).unwrap();
/// assert_eq!(room.x2, 6);
/// assert_eq!(room.y2, 6);
/// assert_eq!(room.center(), Position::new(4, 4));
/// assert!(Room::new(0, 0, 2, 5).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    pub width: i32,
    pub height: i32,
    /// Index of this room in the map's room arena, assigned at insertion
    pub label: usize,
    /// Labels of rooms this one has been connected to
    pub connections: Vec<usize>,
}

impl Room {
    /// Creates a room from its top-left corner and dimensions.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> DelveResult<Self> {
        if width < 3 || height < 3 {
            return Err(DelveError::InvalidRoom(format!(
                "room dimensions must be at least 3x3, got {width}x{height}"
            )));
        }
        Ok(Self {
            x1: x,
            y1: y,
            x2: x + width - 1,
            y2: y + height - 1,
            width,
            height,
            label: 0,
            connections: Vec::new(),
        })
    }

    /// The center cell, midpoints truncated toward the origin.
    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    pub fn nw_corner(&self) -> Position {
        Position::new(self.x1, self.y1)
    }

    pub fn ne_corner(&self) -> Position {
        Position::new(self.x2, self.y1)
    }

    pub fn sw_corner(&self) -> Position {
        Position::new(self.x1, self.y2)
    }

    pub fn se_corner(&self) -> Position {
        Position::new(self.x2, self.y2)
    }

    /// The four corner cells.
    pub fn corners(&self) -> HashSet<Position> {
        HashSet::from([
            self.nw_corner(),
            self.ne_corner(),
            self.sw_corner(),
            self.se_corner(),
        ])
    }

    /// The top and bottom wall rows, corners included.
    pub fn horz_walls(&self) -> HashSet<Position> {
        let mut walls = HashSet::new();
        for x in self.x1..=self.x2 {
            walls.insert(Position::new(x, self.y1));
            walls.insert(Position::new(x, self.y2));
        }
        walls
    }

    /// The left and right wall columns, corners included.
    pub fn vert_walls(&self) -> HashSet<Position> {
        let mut walls = HashSet::new();
        for y in self.y1..=self.y2 {
            walls.insert(Position::new(self.x1, y));
            walls.insert(Position::new(self.x2, y));
        }
        walls
    }

    /// Every boundary cell of the room.
    pub fn perimeter(&self) -> HashSet<Position> {
        let mut p = self.horz_walls();
        p.extend(self.vert_walls());
        p
    }

    /// The open interior, perimeter excluded.
    pub fn inner(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for y in (self.y1 + 1)..self.y2 {
            for x in (self.x1 + 1)..self.x2 {
                cells.push(Position::new(x, y));
            }
        }
        cells
    }

    /// Every cell covered by the room, walls included.
    pub fn all_coords(&self) -> Vec<Position> {
        let mut cells = Vec::with_capacity((self.width * self.height) as usize);
        for y in self.y1..=self.y2 {
            for x in self.x1..=self.x2 {
                cells.push(Position::new(x, y));
            }
        }
        cells
    }

    /// Non-corner perimeter cells in a fixed scan order, so seeded draws
    /// replay identically.
    pub fn door_candidates(&self) -> Vec<Position> {
        let mut cells = Vec::new();
        for x in (self.x1 + 1)..self.x2 {
            cells.push(Position::new(x, self.y1));
        }
        for x in (self.x1 + 1)..self.x2 {
            cells.push(Position::new(x, self.y2));
        }
        for y in (self.y1 + 1)..self.y2 {
            cells.push(Position::new(self.x1, y));
        }
        for y in (self.y1 + 1)..self.y2 {
            cells.push(Position::new(self.x2, y));
        }
        cells
    }

    /// Returns true if the position lies within the room, walls included.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    /// Closed-interval overlap test against another room.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// A uniformly random interior cell.
    pub fn random_point_inside(&self, rng: &mut StdRng) -> Position {
        let x = rng.gen_range(self.x1 + 1..self.x2);
        let y = rng.gen_range(self.y1 + 1..self.y2);
        Position::new(x, y)
    }

    /// A uniformly random non-corner perimeter cell.
    pub fn random_door_loc(&self, rng: &mut StdRng) -> Position {
        let candidates = self.door_candidates();
        candidates[rng.gen_range(0..candidates.len())]
    }

    /// Whether `(x, y)` is a perimeter cell that is not a corner.
    pub fn valid_door_loc(&self, x: i32, y: i32) -> bool {
        let pos = Position::new(x, y);
        self.perimeter().contains(&pos) && !self.corners().contains(&pos)
    }

    /// The outward direction of the wall `(x, y)` sits on. Corners face
    /// diagonally and have no facing.
    pub fn direction_facing(&self, x: i32, y: i32) -> Option<Direction> {
        if self.corners().contains(&Position::new(x, y)) {
            return None;
        }
        if x == self.x1 {
            Some(Direction::West)
        } else if x == self.x2 {
            Some(Direction::East)
        } else if y == self.y1 {
            Some(Direction::North)
        } else if y == self.y2 {
            Some(Direction::South)
        } else {
            None
        }
    }

    /// Records a connection to another room, without duplicates.
    pub fn add_connection(&mut self, label: usize) {
        if !self.connections.contains(&label) {
            self.connections.push(label);
        }
    }

    pub fn is_connected_to(&self, label: usize) -> bool {
        self.connections.contains(&label)
    }
}

/// Attempts up to `max_rooms` room placements on the map.
///
/// Each attempt samples a size in `[min_size, max_size]` and a top-left
/// position that keeps the room in bounds. Candidates intersecting an
/// accepted room are discarded without a retry, so fewer than `max_rooms`
/// rooms may result. Accepted rooms are carved into the grid and appended to
/// the arena with `label` equal to their index.
pub fn generate_rooms(
    map: &mut GameMap,
    rng: &mut StdRng,
    max_rooms: u32,
    min_size: i32,
    max_size: i32,
) -> DelveResult<()> {
    for _ in 0..max_rooms {
        let new_room = mk_room(map, rng, min_size, max_size)?;

        if map.rooms.iter().any(|other| new_room.intersects(other)) {
            continue;
        }

        carve_room(map, &new_room)?;

        let mut new_room = new_room;
        new_room.label = map.rooms.len();
        map.rooms.push(new_room);
    }
    Ok(())
}

/// Samples a random room candidate that fits within the map bounds.
fn mk_room(map: &GameMap, rng: &mut StdRng, min_size: i32, max_size: i32) -> DelveResult<Room> {
    let width = rng.gen_range(min_size..=max_size);
    let height = rng.gen_range(min_size..=max_size);
    let x = rng.gen_range(0..map.width - width);
    let y = rng.gen_range(0..map.height - height);
    Room::new(x, y, width, height)
}

/// Carves a room's tiles: interior first, then wall segments, then corners.
/// Corners go last so the corner kind wins the cells shared with walls.
fn carve_room(map: &mut GameMap, room: &Room) -> DelveResult<()> {
    for pos in room.inner() {
        map.set_tile(pos, TileKind::RoomFloor)?;
    }

    for pos in room.horz_walls() {
        let kind = if pos.y == room.y1 {
            TileKind::RoomWallNorth
        } else {
            TileKind::RoomWallSouth
        };
        map.set_tile(pos, kind)?;
    }
    for pos in room.vert_walls() {
        let kind = if pos.x == room.x1 {
            TileKind::RoomWallWest
        } else {
            TileKind::RoomWallEast
        };
        map.set_tile(pos, kind)?;
    }

    map.set_tile(room.ne_corner(), TileKind::CornerNe)?;
    map.set_tile(room.nw_corner(), TileKind::CornerNw)?;
    map.set_tile(room.se_corner(), TileKind::CornerSe)?;
    map.set_tile(room.sw_corner(), TileKind::CornerSw)?;

    Ok(())
}
