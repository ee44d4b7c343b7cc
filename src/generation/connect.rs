//! # Connectivity Planner
//!
//! Links the placed rooms into one navigable floor. A minimum spanning tree
//! over room centers guarantees a baseline of connectivity, extra random
//! links add loops, and each link is attempted first through matched facing
//! doors with an L-shaped carve, then through randomized door pairs joined
//! by A* tunnels. Doors queued by successful connections are carved into the
//! grid only after every edge has been attempted, so a fresh door is never
//! mistaken mid-process for a pre-existing obstacle.

use crate::{
    carve_astar_tunnel, carve_l_tunnel, closest_door_pair, generate_rooms, match_facing_doors,
    sample_valid_pair, DelveError, DelveResult, Direction, Door, GameMap, GenerationConfig,
    Generator, Position, Room, TileKind,
};
use log::{debug, warn};
use rand::rngs::StdRng;
use rand::Rng;

/// Why a room pair ended up without a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnconnectedReason {
    /// Every carve strategy failed within the retry budget
    RetriesExhausted,
    /// The ring search found no unconnected room to link to
    NoCandidateRoom,
}

/// Result of one connection attempt between two rooms.
///
/// An unconnected pair is a generation-quality failure, not a fatal one: the
/// planner reports it and moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    Connected,
    Unconnected(UnconnectedReason),
}

/// First ring radius of the nearest-unconnected-room search.
const NEAREST_ROOM_MIN_RADIUS: i32 = 3;

/// The floor generator: room placement, connectivity planning, door
/// finalization, and stairs.
#[derive(Debug, Clone)]
pub struct DungeonGenerator {
    /// Retry budget for the randomized-door A* fallback. Bounded so a
    /// pathological layout cannot loop forever.
    pub max_tunnel_retries: u32,
}

impl DungeonGenerator {
    pub fn new() -> Self {
        Self {
            max_tunnel_retries: crate::config::DEFAULT_TUNNEL_RETRIES,
        }
    }

    /// Connects all rooms: MST edges first, then extra random links, then
    /// door carving last.
    fn connect_rooms(&self, map: &mut GameMap, rng: &mut StdRng) -> DelveResult<()> {
        let edges = minimum_spanning_tree(&map.rooms);
        for (room1, room2) in edges {
            self.connect_room_pair(map, rng, room1, room2)?;
        }

        let extra_connections = map.rooms.len() / 2;
        for _ in 0..extra_connections {
            let room1 = rng.gen_range(0..map.rooms.len());
            match nearest_unconnected_room(map, room1)? {
                Some(room2) => {
                    self.connect_room_pair(map, rng, room1, room2)?;
                }
                None => {
                    debug!("room {room1} has no unconnected room in search range");
                }
            }
        }

        finalize_doors(map)
    }

    /// Attempts to connect two rooms, preferring matched facing doors and an
    /// L-shaped tunnel, falling back to randomized door pairs joined by A*.
    ///
    /// Doors whose cells end up adjacent carve to plain floor instead; doors
    /// only mean something when a corridor separates the rooms. Successful
    /// connections are recorded symmetrically in both rooms.
    pub fn connect_room_pair(
        &self,
        map: &mut GameMap,
        rng: &mut StdRng,
        room1: usize,
        room2: usize,
    ) -> DelveResult<ConnectionOutcome> {
        let mut connected: Option<(Door, Door)> = None;

        let mut matches = match_facing_doors(&map.rooms[room1], &map.rooms[room2]);
        if !matches.is_empty() {
            let closest = closest_door_pair(&matches);
            let pair = sample_valid_pair(&mut matches, rng).or(closest);
            if let Some((door1, door2)) = pair {
                if carve_l_tunnel(map, rng, &door1, &door2)? {
                    debug!("facing pair {room1}->{room2}");
                    connected = Some((door1, door2));
                }
            }
        }

        if connected.is_none() {
            // No facing doors, or the L-carve was rejected.
            debug!("pathfinding tunnel {room1}->{room2}");
            for _try in 0..self.max_tunnel_retries {
                let loc1 = map.rooms[room1].random_door_loc(rng);
                let loc2 = map.rooms[room2].random_door_loc(rng);
                if map
                    .valid_door_location(&map.rooms[room1], loc1.x, loc1.y)
                    .is_none()
                {
                    continue;
                }
                if map
                    .valid_door_location(&map.rooms[room2], loc2.x, loc2.y)
                    .is_none()
                {
                    continue;
                }

                let door1 = Door::new(&map.rooms[room1], loc1)?;
                let door2 = Door::new(&map.rooms[room2], loc2)?;
                if carve_astar_tunnel(map, &door1, &door2)? {
                    connected = Some((door1, door2));
                    break;
                }
            }
        }

        match connected {
            Some((door1, door2)) => {
                if door1.position().distance_squared(door2.position()) == 1 {
                    // Adjacent doorways merge into a single opening.
                    map.set_tile(door1.position(), TileKind::Floor)?;
                    map.set_tile(door2.position(), TileKind::Floor)?;
                } else {
                    map.doors.push(door1);
                    map.doors.push(door2);
                }

                map.rooms[room1].add_connection(room2);
                map.rooms[room2].add_connection(room1);
                Ok(ConnectionOutcome::Connected)
            }
            None => {
                warn!("could not connect rooms {room1} and {room2}");
                Ok(ConnectionOutcome::Unconnected(
                    UnconnectedReason::RetriesExhausted,
                ))
            }
        }
    }
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator<GameMap> for DungeonGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> DelveResult<GameMap> {
        config.validate()?;

        let mut map = GameMap::new(config.map_width as i32, config.map_height as i32);
        generate_rooms(
            &mut map,
            rng,
            config.max_rooms,
            config.room_min_size as i32,
            config.room_max_size as i32,
        )?;
        if map.rooms.is_empty() {
            return Err(DelveError::GenerationFailed(
                "failed to place any rooms".to_string(),
            ));
        }

        map.rebuild_room_coords();
        self.connect_rooms(&mut map, rng)?;

        // Stairs: up in the first room generated, down in the last.
        let upstairs = map.rooms[0].center();
        map.set_tile(upstairs, TileKind::StairsUp)?;
        map.upstairs_location = upstairs;

        let downstairs = map.rooms[map.rooms.len() - 1].center();
        map.set_tile(downstairs, TileKind::StairsDown)?;
        map.downstairs_location = downstairs;

        let unreached = map.unreachable_rooms(0);
        if !unreached.is_empty() {
            warn!("floor generated with unreachable rooms: {unreached:?}");
        }

        Ok(map)
    }

    fn validate(&self, map: &GameMap, _config: &GenerationConfig) -> DelveResult<()> {
        if map.rooms.is_empty() {
            return Err(DelveError::GenerationFailed(
                "map has no rooms".to_string(),
            ));
        }
        if map.upstairs_location == Position::new(-1, -1)
            || map.downstairs_location == Position::new(-1, -1)
        {
            return Err(DelveError::GenerationFailed(
                "stairs were not placed".to_string(),
            ));
        }
        let unreached = map.unreachable_rooms(0);
        if !unreached.is_empty() {
            return Err(DelveError::GenerationFailed(format!(
                "rooms {unreached:?} are not reachable from room 0"
            )));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DungeonGenerator"
    }
}

/// Spans all rooms with Prim's algorithm over center-to-center Euclidean
/// distance, starting from room 0. Ties keep the first minimum found, so a
/// given room list always yields the same tree.
pub fn minimum_spanning_tree(rooms: &[Room]) -> Vec<(usize, usize)> {
    let mut edges = Vec::new();
    if rooms.is_empty() {
        return edges;
    }

    let mut visited = vec![rooms[0].label];
    let mut unvisited: Vec<usize> = rooms.iter().skip(1).map(|r| r.label).collect();

    while !unvisited.is_empty() {
        let mut record = i64::MAX;
        let mut best: Option<(usize, usize)> = None;

        for &v in &visited {
            for &u in &unvisited {
                let dist = rooms[v].center().distance_squared(rooms[u].center());
                if dist < record {
                    record = dist;
                    best = Some((v, u));
                }
            }
        }

        // Both lists are non-empty here, so a minimum always exists.
        if let Some((v, u)) = best {
            edges.push((v, u));
            visited.push(u);
            unvisited.retain(|&label| label != u);
        }
    }

    edges
}

/// Finds the nearest room not yet connected to `room`, by expanding square
/// rings outward from its center.
///
/// The first ring has radius 3; rings grow until one contains a cell
/// belonging to a qualifying room (not this room, not already connected) or
/// the radius reaches the map height. Cells within a ring are scanned in
/// row-major order so the result is deterministic.
pub fn nearest_unconnected_room(map: &GameMap, room: usize) -> DelveResult<Option<usize>> {
    let center = map.rooms[room].center();

    for radius in NEAREST_ROOM_MIN_RADIUS..map.height {
        let ring = GameMap::tiles_around(center.x, center.y, radius)?;
        let mut cells: Vec<Position> = ring.into_iter().collect();
        cells.sort_by_key(|p| (p.y, p.x));

        for cell in cells {
            let Some(found) = map.room_coordinates().get(&cell) else {
                continue;
            };
            if *found == room {
                continue;
            }
            if map.rooms[room].is_connected_to(*found) {
                continue;
            }
            return Ok(Some(*found));
        }
    }

    Ok(None)
}

/// Carves the queued doors into the grid, keeping only the ones that
/// survive.
///
/// A door with another door on any cardinal neighbor is dropped, since
/// adjacent doors would merge into a double-wide opening. A placed door's
/// closet is dug out if it is still wall, so a door always opens onto floor.
pub fn finalize_doors(map: &mut GameMap) -> DelveResult<()> {
    let queued = std::mem::take(&mut map.doors);
    let mut placed = Vec::with_capacity(queued.len());

    for door in queued {
        let has_adjacent_door = Direction::cardinal().iter().any(|dir| {
            map.get_tile(door.position() + dir.to_delta()) == Some(TileKind::Door)
        });
        if has_adjacent_door {
            warn!(
                "skipping door at ({}, {}): adjacent to an existing door",
                door.x, door.y
            );
            continue;
        }

        map.set_tile(door.position(), TileKind::Door)?;
        if map.get_tile(door.closet()) == Some(TileKind::Wall) {
            map.set_tile(door.closet(), TileKind::Floor)?;
        }
        placed.push(door);
    }

    map.doors = placed;
    Ok(())
}
