//! # Entities
//!
//! A minimal entity record: enough for the generator to spawn monsters and
//! items onto a map and for occupancy queries to work. Combat stats, AI, and
//! inventories live with the game systems that consume the finished map.

use crate::{new_entity_id, EntityId, GameMap};
use serde::{Deserialize, Serialize};

/// The catalog of spawnable entity kinds.
///
/// Kinds act as spawn templates: [`EntityKind::spawn`] stamps out a live
/// instance without mutating anything, so the same kind can be spawned any
/// number of times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Orc,
    Troll,
    HealthPotion,
    ConfusionScroll,
    LightningScroll,
    FireballScroll,
    Sword,
    ChainMail,
}

impl EntityKind {
    /// Display name for messages and debug output.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::Orc => "orc",
            EntityKind::Troll => "troll",
            EntityKind::HealthPotion => "health potion",
            EntityKind::ConfusionScroll => "confusion scroll",
            EntityKind::LightningScroll => "lightning scroll",
            EntityKind::FireballScroll => "fireball scroll",
            EntityKind::Sword => "sword",
            EntityKind::ChainMail => "chain mail",
        }
    }

    /// True for kinds that act on their own turn.
    pub fn is_monster(self) -> bool {
        matches!(self, EntityKind::Orc | EntityKind::Troll)
    }

    /// True for kinds that can be picked up.
    pub fn is_item(self) -> bool {
        !self.is_monster()
    }

    /// Monsters occupy their cell; items can be walked over and stacked.
    pub fn blocks_movement(self) -> bool {
        self.is_monster()
    }

    /// Produces a live instance at `(x, y)` and registers it on the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{EntityKind, GameMap};
    ///
    /// let mut map = GameMap::new(10, 10);
    /// let id = EntityKind::Orc.spawn(&mut map, 3, 4);
    /// assert!(map.get_actor_at(3, 4).is_some());
    /// assert_eq!(map.entities[0].id, id);
    /// ```
    pub fn spawn(self, map: &mut GameMap, x: i32, y: i32) -> EntityId {
        let entity = Entity {
            id: new_entity_id(),
            kind: self,
            x,
            y,
        };
        let id = entity.id;
        map.entities.push(entity);
        id
    }
}

/// A live entity placed on a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub x: i32,
    pub y: i32,
}

impl Entity {
    pub fn blocks_movement(&self) -> bool {
        self.kind.blocks_movement()
    }
}
