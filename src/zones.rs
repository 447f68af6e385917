//! Zone Model: the front line split into four contiguous column ranges.
//!
//! Stats are scanned from the turret row and the wall row directly behind it.
//! Damage potential is `damage * range` per damage-dealing structure; health
//! sums every structure, with walls weighted up as damage absorbers.

use crate::config::*;
use crate::constants::*;
use crate::location::*;
use crate::oracle::*;
use crate::unit::*;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Zone {
    LeftLeft,
    LeftMid,
    RightMid,
    RightRight,
}

impl Zone {
    pub const ALL: [Zone; ZONE_COUNT] = [
        Zone::LeftLeft,
        Zone::LeftMid,
        Zone::RightMid,
        Zone::RightRight,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Zone {
        Zone::ALL[index.min(ZONE_COUNT - 1)]
    }
}

/// Column layout of the four zones.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ZoneLayout {
    pub min_x: i8,
    pub width: i8,
}

impl ZoneLayout {
    pub fn from_config(config: &StrategyConfig) -> Self {
        ZoneLayout {
            min_x: config.zone_min_x,
            width: config.zone_width.max(1),
        }
    }

    /// Zone owning column `x`; columns outside the layout clamp to the end zones.
    pub fn zone_of(&self, x: i8) -> Zone {
        let offset = (x as i32 - self.min_x as i32).max(0);
        Zone::from_index((offset / self.width as i32) as usize)
    }

    /// Columns `[start, end)` covered by `zone`.
    pub fn columns(&self, zone: Zone) -> std::ops::Range<i8> {
        let start = self.min_x + self.width * zone.index() as i8;
        start..start + self.width
    }

    /// All columns covered by the layout.
    pub fn span(&self) -> std::ops::Range<i8> {
        self.min_x..self.min_x + self.width * ZONE_COUNT as i8
    }

    /// The zone across the nearest boundary when `x` sits within `margin`
    /// columns of it; `None` in the interior and at the outer ends.
    pub fn boundary_neighbor(&self, x: i8, margin: i8) -> Option<Zone> {
        let zone = self.zone_of(x);
        let offset = x as i32 - self.columns(zone).start as i32;
        let margin = margin as i32;
        if offset < 0 || offset >= self.width as i32 {
            return None;
        }
        if offset < margin && zone.index() > 0 {
            Some(Zone::from_index(zone.index() - 1))
        } else if offset >= self.width as i32 - margin && zone.index() + 1 < ZONE_COUNT {
            Some(Zone::from_index(zone.index() + 1))
        } else {
            None
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ZoneStat {
    pub total_structure_health: f64,
    pub total_damage_potential: f64,
}

pub type ZoneStats = [ZoneStat; ZONE_COUNT];

/// Aggregate our front-line structures per zone.
pub fn zone_stats(oracle: &dyn BoardOracle, config: &StrategyConfig) -> ZoneStats {
    let layout = ZoneLayout::from_config(config);
    let rows = [config.geometry.turret_row(), config.geometry.wall_row()];
    let mut stats = ZoneStats::default();

    for x in layout.span() {
        let stat = &mut stats[layout.zone_of(x).index()];
        for &y in &rows {
            let unit = match oracle.stationary_unit(Location::new(x, y)) {
                Some(unit) if unit.owner == Player::Me => unit,
                _ => continue,
            };
            if unit.deals_damage() {
                stat.total_damage_potential += unit.damage * unit.range;
            }
            stat.total_structure_health += if unit.is_wall() {
                config.wall_health_weight * unit.health
            } else {
                unit.health
            };
        }
    }

    stats
}
