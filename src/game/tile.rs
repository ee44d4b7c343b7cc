//! # Tile Catalog
//!
//! The closed set of tile kinds a grid cell can hold, with their precomputed
//! movement, digging, and sight attributes. Carve logic dispatches on these
//! variants rather than comparing glyphs or names.

use serde::{Deserialize, Serialize};

/// The kind of terrain occupying a single grid cell.
///
/// Every cell of a [`crate::GameMap`] holds exactly one `TileKind` at all
/// times; grids are eagerly filled with [`TileKind::Wall`] at creation.
/// Room walls and corners carry their orientation so door placement can
/// reason about which way a wall faces.
///
/// # Examples
///
/// ```
/// use delve::TileKind;
///
/// assert!(TileKind::RoomFloor.walkable());
/// assert!(TileKind::Wall.diggable());
/// assert!(!TileKind::CornerNe.diggable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Undug rock between rooms; tunnels carve through it
    Wall,
    /// Corridor floor carved by a tunnel
    Floor,
    /// Open floor inside a room
    RoomFloor,
    /// Room wall facing north (the room's top edge)
    RoomWallNorth,
    /// Room wall facing south (the room's bottom edge)
    RoomWallSouth,
    /// Room wall facing east (the room's right edge)
    RoomWallEast,
    /// Room wall facing west (the room's left edge)
    RoomWallWest,
    /// North-east room corner
    CornerNe,
    /// North-west room corner
    CornerNw,
    /// South-east room corner
    CornerSe,
    /// South-west room corner
    CornerSw,
    /// A doorway between a room and a corridor
    Door,
    /// Staircase leading up a floor
    StairsUp,
    /// Staircase leading down a floor
    StairsDown,
}

impl TileKind {
    /// Whether entities can stand on and move through this tile.
    pub fn walkable(self) -> bool {
        matches!(
            self,
            TileKind::Floor
                | TileKind::RoomFloor
                | TileKind::Door
                | TileKind::StairsUp
                | TileKind::StairsDown
        )
    }

    /// Whether a tunnel carver may convert this tile to corridor floor.
    ///
    /// Plain wall digs freely; existing corridor floor re-digs at no cost so
    /// tunnels can merge. Room structure never digs.
    pub fn diggable(self) -> bool {
        matches!(self, TileKind::Wall | TileKind::Floor)
    }

    /// Whether sight passes through this tile. Closed doors block sight.
    pub fn transparent(self) -> bool {
        matches!(
            self,
            TileKind::Floor | TileKind::RoomFloor | TileKind::StairsUp | TileKind::StairsDown
        )
    }

    /// True for every wall segment or corner belonging to a room.
    pub fn is_room_wall(self) -> bool {
        matches!(
            self,
            TileKind::RoomWallNorth
                | TileKind::RoomWallSouth
                | TileKind::RoomWallEast
                | TileKind::RoomWallWest
        ) || self.is_room_corner()
    }

    /// True for the four room corner kinds.
    pub fn is_room_corner(self) -> bool {
        matches!(
            self,
            TileKind::CornerNe | TileKind::CornerNw | TileKind::CornerSe | TileKind::CornerSw
        )
    }

    /// Display glyph, used by debug dumps and tests.
    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => ' ',
            TileKind::Floor => '.',
            TileKind::RoomFloor => ',',
            TileKind::RoomWallNorth | TileKind::RoomWallSouth => '-',
            TileKind::RoomWallEast | TileKind::RoomWallWest => '|',
            TileKind::CornerNe | TileKind::CornerNw | TileKind::CornerSe | TileKind::CornerSw => {
                '+'
            }
            TileKind::Door => 'd',
            TileKind::StairsUp => '<',
            TileKind::StairsDown => '>',
        }
    }
}
