//! # Tunnel Carvers
//!
//! Two interchangeable strategies for producing the cells of a corridor
//! between two door closets: an L-shaped carve built from Bresenham line
//! segments with a random bend order, and an A* search over diggable tiles.
//!
//! Both strategies validate the entire path before mutating a single tile: a
//! rejected carve leaves the map untouched.

use crate::{DelveResult, Door, GameMap, Position, TileKind};
use pathfinding::prelude::astar;
use rand::rngs::StdRng;
use rand::Rng;

/// Integer line from `start` to `end`, both endpoints included.
pub fn bresenham_line(start: Position, end: Position) -> Vec<Position> {
    let mut cells = Vec::new();
    let (mut x, mut y) = (start.x, start.y);
    let dx = (end.x - start.x).abs();
    let dy = -(end.y - start.y).abs();
    let sx = if start.x < end.x { 1 } else { -1 };
    let sy = if start.y < end.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        cells.push(Position::new(x, y));
        if x == end.x && y == end.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    cells
}

/// The cells of an L-shaped tunnel between two points.
///
/// The bend is either `(end.x, start.y)` or `(start.x, end.y)`, chosen by a
/// 50/50 draw. When the points already share an axis the bend degenerates
/// and the result is a straight line. The duplicate bend cell where the two
/// segments meet is dropped.
pub fn l_tunnel_path(rng: &mut StdRng, start: Position, end: Position) -> Vec<Position> {
    let bend = if rng.gen_bool(0.5) {
        Position::new(end.x, start.y) // horizontally, then vertically
    } else {
        Position::new(start.x, end.y) // vertically, then horizontally
    };

    let mut cells = bresenham_line(start, bend);
    cells.extend(bresenham_line(bend, end).into_iter().skip(1));
    cells
}

/// Carves an L-shaped tunnel between the closets of two doors.
///
/// The whole path is validated first: a cell that is a room corner or open
/// room interior (or out of bounds) rejects the carve with no mutation,
/// since corridors must not cut through rooms. Returns whether the tunnel
/// was carved.
pub fn carve_l_tunnel(
    map: &mut GameMap,
    rng: &mut StdRng,
    door1: &Door,
    door2: &Door,
) -> DelveResult<bool> {
    let path = l_tunnel_path(rng, door1.closet(), door2.closet());

    for &cell in &path {
        match map.get_tile(cell) {
            Some(kind) if kind.is_room_corner() || kind == TileKind::RoomFloor => {
                return Ok(false)
            }
            Some(_) => {}
            None => return Ok(false),
        }
    }

    for cell in path {
        map.set_tile(cell, TileKind::Floor)?;
    }
    Ok(true)
}

/// Carves a tunnel between the closets of two doors by shortest path over
/// diggable tiles.
///
/// The search moves in the four cardinal directions only, each diggable step
/// costing 1; non-diggable tiles are impassable. No path, or a path that
/// degenerates to a single cell, rejects the carve. A found path is still
/// rejected if it crosses any room wall tile. Returns whether the tunnel was
/// carved.
pub fn carve_astar_tunnel(map: &mut GameMap, door1: &Door, door2: &Door) -> DelveResult<bool> {
    let start = door1.closet();
    let goal = door2.closet();

    let found = astar(
        &start,
        |p| {
            p.cardinal_adjacent_positions()
                .into_iter()
                .filter(|next| map.get_tile(*next).map_or(false, TileKind::diggable))
                .map(|next| (next, 1u32))
                .collect::<Vec<_>>()
        },
        |p| p.manhattan_distance(goal),
        |p| *p == goal,
    );

    let Some((path, _cost)) = found else {
        return Ok(false);
    };
    if path.len() <= 1 {
        return Ok(false);
    }

    if path
        .iter()
        .any(|cell| map.get_tile(*cell).map_or(true, TileKind::is_room_wall))
    {
        return Ok(false);
    }

    for cell in path {
        map.set_tile(cell, TileKind::Floor)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Room;
    use rand::SeedableRng;

    #[test]
    fn test_bresenham_straight_lines() {
        let line = bresenham_line(Position::new(2, 3), Position::new(6, 3));
        assert_eq!(
            line,
            vec![
                Position::new(2, 3),
                Position::new(3, 3),
                Position::new(4, 3),
                Position::new(5, 3),
                Position::new(6, 3),
            ]
        );

        let single = bresenham_line(Position::new(4, 4), Position::new(4, 4));
        assert_eq!(single, vec![Position::new(4, 4)]);
    }

    #[test]
    fn test_bresenham_diagonal_endpoints() {
        let line = bresenham_line(Position::new(0, 0), Position::new(3, 3));
        assert_eq!(line.first(), Some(&Position::new(0, 0)));
        assert_eq!(line.last(), Some(&Position::new(3, 3)));
        assert_eq!(line.len(), 4);
    }

    #[test]
    fn test_l_tunnel_endpoints_and_no_duplicate_bend() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..20 {
            let path = l_tunnel_path(&mut rng, Position::new(1, 1), Position::new(7, 5));
            assert_eq!(path.first(), Some(&Position::new(1, 1)));
            assert_eq!(path.last(), Some(&Position::new(7, 5)));
            // Axis-aligned L: |dx| + |dy| + 1 unique cells.
            assert_eq!(path.len(), 6 + 4 + 1);
            let unique: std::collections::HashSet<_> = path.iter().collect();
            assert_eq!(unique.len(), path.len());
        }
    }

    /// Carve a room the way the generator would, so tunnel validation sees
    /// real room tiles.
    fn put_room(map: &mut GameMap, x: i32, y: i32, w: i32, h: i32) -> Room {
        let mut room = Room::new(x, y, w, h).unwrap();
        room.label = map.rooms.len();
        for pos in room.inner() {
            map.set_tile(pos, TileKind::RoomFloor).unwrap();
        }
        for pos in room.perimeter() {
            map.set_tile(pos, TileKind::RoomWallNorth).unwrap();
        }
        map.set_tile(room.ne_corner(), TileKind::CornerNe).unwrap();
        map.set_tile(room.nw_corner(), TileKind::CornerNw).unwrap();
        map.set_tile(room.se_corner(), TileKind::CornerSe).unwrap();
        map.set_tile(room.sw_corner(), TileKind::CornerSw).unwrap();
        map.rooms.push(room.clone());
        room
    }

    #[test]
    fn test_l_tunnel_rejection_leaves_map_untouched() {
        let mut map = GameMap::new(20, 20);
        let left = put_room(&mut map, 0, 0, 5, 5);
        let right = put_room(&mut map, 10, 0, 5, 5);
        // A room square in the middle of the only straight path.
        put_room(&mut map, 5, 3, 5, 5);

        let d1 = Door::new(&left, Position::new(4, 2)).unwrap();
        let d2 = Door::new(&right, Position::new(10, 2)).unwrap();

        let before = map.tiles.clone();
        let mut rng = StdRng::seed_from_u64(11);
        // Either bend order crosses the blocking room's floor or corners.
        for _ in 0..10 {
            let carved = carve_l_tunnel(&mut map, &mut rng, &d1, &d2).unwrap();
            assert!(!carved);
            assert_eq!(map.tiles, before, "rejected carve must not mutate");
        }
    }

    #[test]
    fn test_l_tunnel_carves_between_facing_doors() {
        let mut map = GameMap::new(20, 20);
        let left = put_room(&mut map, 0, 0, 5, 5);
        let right = put_room(&mut map, 10, 0, 5, 5);

        let d1 = Door::new(&left, Position::new(4, 2)).unwrap();
        let d2 = Door::new(&right, Position::new(10, 2)).unwrap();

        let mut rng = StdRng::seed_from_u64(11);
        assert!(carve_l_tunnel(&mut map, &mut rng, &d1, &d2).unwrap());
        for x in 5..10 {
            assert_eq!(map.get_tile(Position::new(x, 2)), Some(TileKind::Floor));
        }
    }

    #[test]
    fn test_astar_tunnel_goes_around_rooms() {
        let mut map = GameMap::new(24, 24);
        let left = put_room(&mut map, 0, 8, 5, 5);
        let right = put_room(&mut map, 14, 8, 5, 5);
        // A blocker forces the path off the straight line.
        put_room(&mut map, 6, 6, 7, 9);

        let d1 = Door::new(&left, Position::new(4, 10)).unwrap();
        let d2 = Door::new(&right, Position::new(14, 10)).unwrap();

        assert!(carve_astar_tunnel(&mut map, &d1, &d2).unwrap());
        // The closets are floor and no room tile was overwritten.
        assert_eq!(map.get_tile(d1.closet()), Some(TileKind::Floor));
        assert_eq!(map.get_tile(d2.closet()), Some(TileKind::Floor));
        for room in &map.rooms {
            for pos in room.inner() {
                assert_eq!(map.get_tile(pos), Some(TileKind::RoomFloor));
            }
        }
    }

    #[test]
    fn test_astar_tunnel_rejects_when_walled_off() {
        let mut map = GameMap::new(20, 10);
        let left = put_room(&mut map, 0, 2, 5, 5);
        let right = put_room(&mut map, 12, 2, 5, 5);
        // A full-height band of room wall splits the map in two.
        for y in 0..10 {
            map.set_tile(Position::new(9, y), TileKind::RoomWallNorth)
                .unwrap();
        }

        let d1 = Door::new(&left, Position::new(4, 4)).unwrap();
        let d2 = Door::new(&right, Position::new(12, 4)).unwrap();

        let before = map.tiles.clone();
        assert!(!carve_astar_tunnel(&mut map, &d1, &d2).unwrap());
        assert_eq!(map.tiles, before);
    }
}
