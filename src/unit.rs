use crate::location::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum UnitKind {
    Wall,
    Support,
    Turret,
    Scout,
    Demolisher,
    Interceptor,
}

impl UnitKind {
    /// Position in the engine's `unitInformation` array.
    pub fn index(self) -> usize {
        match self {
            UnitKind::Wall => 0,
            UnitKind::Support => 1,
            UnitKind::Turret => 2,
            UnitKind::Scout => 3,
            UnitKind::Demolisher => 4,
            UnitKind::Interceptor => 5,
        }
    }

    pub fn is_stationary(self) -> bool {
        matches!(self, UnitKind::Wall | UnitKind::Support | UnitKind::Turret)
    }

    /// Which currency pays for this unit.
    pub fn resource(self) -> Resource {
        if self.is_stationary() {
            Resource::Structure
        } else {
            Resource::Mobile
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Player {
    Me,
    Enemy,
}

impl Player {
    pub fn opponent(self) -> Player {
        match self {
            Player::Me => Player::Enemy,
            Player::Enemy => Player::Me,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::Me => 0,
            Player::Enemy => 1,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Resource {
    /// Spent on walls, supports and turrets.
    Structure,
    /// Spent on scouts, demolishers and interceptors.
    Mobile,
}

impl Resource {
    pub fn index(self) -> usize {
        match self {
            Resource::Structure => 0,
            Resource::Mobile => 1,
        }
    }
}

/// Read-only snapshot of a stationary structure as reported by the oracle.
#[derive(Copy, Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct StructureHandle {
    pub kind: UnitKind,
    pub health: f64,
    pub damage: f64,
    pub range: f64,
    pub position: Location,
    pub owner: Player,
}

impl StructureHandle {
    pub fn deals_damage(&self) -> bool {
        self.damage > 0.0
    }

    pub fn is_wall(&self) -> bool {
        self.kind == UnitKind::Wall
    }

    pub fn can_reach(&self, target: Location) -> bool {
        self.position.distance_to(target) <= self.range
    }
}
