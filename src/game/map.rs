//! # Game Map
//!
//! The 2D tile grid for a single dungeon floor, together with the room arena,
//! the finalized door list, visibility bookkeeping, and the entities placed
//! on the floor.

use crate::{DelveError, DelveResult, Direction, Door, Entity, Position, Room, TileKind};
use std::collections::{HashMap, HashSet, VecDeque};

/// A single dungeon floor.
///
/// The grid is eagerly filled with [`TileKind::Wall`]; no cell is ever
/// uninitialized. Rooms live in an arena ordered by insertion, and their
/// index in that arena is their `label`: doors and connection bookkeeping
/// refer to rooms by label only.
#[derive(Debug, Clone)]
pub struct GameMap {
    pub width: i32,
    pub height: i32,
    /// Tile grid, row-major: `tiles[y][x]`
    pub tiles: Vec<Vec<TileKind>>,
    /// Tiles currently in the player's field of view (owned by rendering)
    pub visible: Vec<Vec<bool>>,
    /// Tiles the player has seen before (owned by rendering)
    pub explored: Vec<Vec<bool>>,
    /// Room arena; insertion order is label order
    pub rooms: Vec<Room>,
    /// Doors queued during connection planning, finalized in place last
    pub doors: Vec<Door>,
    /// Entities spawned onto this floor
    pub entities: Vec<Entity>,
    /// Location of the up staircase, `(-1, -1)` until placed
    pub upstairs_location: Position,
    /// Location of the down staircase, `(-1, -1)` until placed
    pub downstairs_location: Position,
    room_coords: HashMap<Position, usize>,
}

impl GameMap {
    /// Creates a new map with every cell filled with wall.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![TileKind::Wall; width as usize]; height as usize],
            visible: vec![vec![false; width as usize]; height as usize],
            explored: vec![vec![false; width as usize]; height as usize],
            rooms: Vec::new(),
            doors: Vec::new(),
            entities: Vec::new(),
            upstairs_location: Position::new(-1, -1),
            downstairs_location: Position::new(-1, -1),
            room_coords: HashMap::new(),
        }
    }

    /// Returns true if `(x, y)` is inside the bounds of this map.
    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    /// Gets the tile at a position, or `None` when out of bounds.
    pub fn get_tile(&self, pos: Position) -> Option<TileKind> {
        if self.in_bounds(pos.x, pos.y) {
            Some(self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Sets the tile at a position. Out-of-bounds writes are an error.
    pub fn set_tile(&mut self, pos: Position, kind: TileKind) -> DelveResult<()> {
        if !self.in_bounds(pos.x, pos.y) {
            return Err(DelveError::InvalidState(format!(
                "tile write out of bounds at ({}, {})",
                pos.x, pos.y
            )));
        }
        self.tiles[pos.y as usize][pos.x as usize] = kind;
        Ok(())
    }

    /// Whether the tile at `(x, y)` can be walked on.
    pub fn walkable(&self, x: i32, y: i32) -> bool {
        self.get_tile(Position::new(x, y))
            .map_or(false, TileKind::walkable)
    }

    /// Whether the tile at `(x, y)` blocks line of sight.
    pub fn is_opaque(&self, x: i32, y: i32) -> bool {
        self.get_tile(Position::new(x, y))
            .map_or(true, |k| !k.transparent())
    }

    /// Sets tile visibility; visible tiles also become explored.
    pub fn set_visible(&mut self, x: i32, y: i32, visible: bool) {
        if self.in_bounds(x, y) {
            self.visible[y as usize][x as usize] = visible;
            if visible {
                self.explored[y as usize][x as usize] = true;
            }
        }
    }

    /// Clears all visibility before a field-of-view recalculation.
    pub fn clear_visibility(&mut self) {
        for row in &mut self.visible {
            row.fill(false);
        }
    }

    /// Iterates over this map's living actors.
    pub fn actors(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind.is_monster())
    }

    /// Iterates over this map's items.
    pub fn items(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(|e| e.kind.is_item())
    }

    /// Items stacked at a cell. Items place without collision rejection, so
    /// there can be more than one.
    pub fn get_items_at(&self, x: i32, y: i32) -> Vec<&Entity> {
        self.items().filter(|e| e.x == x && e.y == y).collect()
    }

    /// The entity blocking movement at a cell, if any.
    pub fn blocking_entity_at(&self, x: i32, y: i32) -> Option<&Entity> {
        self.entities
            .iter()
            .find(|e| e.blocks_movement() && e.x == x && e.y == y)
    }

    /// The actor standing at a cell, if any.
    pub fn get_actor_at(&self, x: i32, y: i32) -> Option<&Entity> {
        self.actors().find(|a| a.x == x && a.y == y)
    }

    /// Rebuilds the coordinate-to-room index. Call after room placement.
    pub fn rebuild_room_coords(&mut self) {
        self.room_coords = self
            .rooms
            .iter()
            .flat_map(|r| r.all_coords().into_iter().map(move |p| (p, r.label)))
            .collect();
    }

    /// Mapping from every coordinate covered by a room (walls included) to
    /// that room's label.
    pub fn room_coordinates(&self) -> &HashMap<Position, usize> {
        &self.room_coords
    }

    /// The room covering a position, if any.
    pub fn room_at(&self, pos: Position) -> Option<&Room> {
        self.room_coords.get(&pos).map(|&label| &self.rooms[label])
    }

    /// The perimeter of a square ring of the given radius around `(x, y)`.
    ///
    /// Radius 1 yields the 8 Moore-neighborhood cells. The center is never
    /// included, and a radius of 0 is an error. Cells are not bounds-checked;
    /// callers filter as needed.
    pub fn tiles_around(x: i32, y: i32, radius: i32) -> DelveResult<HashSet<Position>> {
        if radius <= 0 {
            return Err(DelveError::InvalidState(format!(
                "tiles_around requires a positive radius, got {radius}"
            )));
        }
        let (x1, y1) = (x - radius, y - radius);
        let (x2, y2) = (x + radius, y + radius);
        let mut ring = HashSet::new();
        for cx in x1..=x2 {
            ring.insert(Position::new(cx, y1));
            ring.insert(Position::new(cx, y2));
        }
        for cy in y1..=y2 {
            ring.insert(Position::new(x1, cy));
            ring.insert(Position::new(x2, cy));
        }
        Ok(ring)
    }

    /// Checks whether `(x, y)` on `room`'s perimeter can hold a door.
    ///
    /// The cell must sit on a wall flanked on both perpendicular sides by
    /// room wall tiles, and the tile directly outside must still be undug
    /// wall, which keeps doors from opening into another room or an already
    /// carved corridor. Returns the closet cell outside the door on success.
    pub fn valid_door_location(&self, room: &Room, x: i32, y: i32) -> Option<Position> {
        if !room.valid_door_loc(x, y) {
            return None;
        }
        let facing = room.direction_facing(x, y)?;

        let flank_dirs = match facing {
            Direction::North | Direction::South => [Direction::East, Direction::West],
            Direction::East | Direction::West => [Direction::North, Direction::South],
        };
        for dir in flank_dirs {
            let flank = Position::new(x, y) + dir.to_delta();
            match self.get_tile(flank) {
                Some(kind) if kind.is_room_wall() => {}
                _ => return None,
            }
        }

        let closet = Position::new(x, y) + facing.to_delta();
        match self.get_tile(closet) {
            Some(TileKind::Wall) => Some(closet),
            _ => None,
        }
    }

    /// Labels of rooms whose centers a walkable flood fill from room `from`'s
    /// center cannot reach. An empty result means the floor is fully
    /// connected.
    pub fn unreachable_rooms(&self, from: usize) -> Vec<usize> {
        let Some(start_room) = self.rooms.get(from) else {
            return self.rooms.iter().map(|r| r.label).collect();
        };

        let start = start_room.center();
        let mut visited: HashSet<Position> = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(pos) = queue.pop_front() {
            for next in pos.cardinal_adjacent_positions() {
                if visited.contains(&next) {
                    continue;
                }
                if self.walkable(next.x, next.y) {
                    visited.insert(next);
                    queue.push_back(next);
                }
            }
        }

        self.rooms
            .iter()
            .filter(|r| !visited.contains(&r.center()))
            .map(|r| r.label)
            .collect()
    }

    /// Renders the tile grid as glyph rows, for debug output and tests.
    pub fn to_debug_string(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for row in &self.tiles {
            for kind in row {
                out.push(kind.glyph());
            }
            out.push('\n');
        }
        out
    }
}
