use crate::location::*;
use crate::unit::*;

/// Board state, pathfinding and mutation requests provided by the game engine.
///
/// Every `attempt_*` call is best effort: invalid, occupied or unaffordable
/// requests are dropped and the returned count says how many took effect.
/// The planner never inspects those counts to retry within a turn.
pub trait BoardOracle {
    fn turn_number(&self) -> u32;

    fn health(&self, player: Player) -> f64;

    fn resource(&self, kind: Resource, player: Player) -> f64;

    /// The stationary structure on `location`, if any.
    fn stationary_unit(&self, location: Location) -> Option<StructureHandle>;

    /// Cells a mobile unit launched from `start` walks through, start first.
    /// Empty or short when the unit cannot get anywhere.
    fn find_path_to_edge(&self, start: Location) -> Vec<Location>;

    /// Damage-dealing structures that can hit a unit of `player` on `location`.
    fn attackers(&self, location: Location, player: Player) -> Vec<StructureHandle>;

    fn locations_in_range(&self, center: Location, radius: f64) -> Vec<Location>;

    /// `count` of `None` spawns as many as can be afforded at each location.
    fn attempt_spawn(&mut self, kind: UnitKind, locations: &[Location], count: Option<u32>) -> u32;

    fn attempt_upgrade(&mut self, locations: &[Location]) -> u32;

    fn attempt_remove(&mut self, locations: &[Location]) -> u32;

    fn submit_turn(&mut self);
}

/// A single request issued against the oracle, in issue order.
#[derive(Clone, Debug, PartialEq)]
pub enum BoardRequest {
    Spawn {
        kind: UnitKind,
        location: Location,
        count: Option<u32>,
    },
    Upgrade {
        location: Location,
    },
    Remove {
        location: Location,
    },
    Submit,
}

/// Unoccupied cells among `locations`, order preserved.
pub fn filter_blocked_locations(oracle: &dyn BoardOracle, locations: &[Location]) -> Vec<Location> {
    locations
        .iter()
        .copied()
        .filter(|loc| oracle.stationary_unit(*loc).is_none())
        .collect()
}
