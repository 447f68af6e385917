//! In-memory board used for offline runs and tests.
//!
//! `GridBoard` implements [`BoardOracle`] with simplified engine rules:
//! stationary structures block movement, mobile units walk the shortest
//! 4-connected path to the edge opposite their launch edge, and a unit that
//! cannot reach that edge walks to the reachable cell that gets furthest
//! towards it. Every request is recorded in issue order so callers can
//! inspect what a planner asked for, independent of what was affordable.

use crate::config::*;
use crate::geometry::*;
use crate::location::*;
use crate::oracle::*;
use crate::unit::*;
use fnv::FnvHashMap;
use log::*;
use pathfinding::directed::bfs::{bfs, bfs_reach};
use std::cmp::Reverse;

#[derive(Clone, Debug)]
struct PlacedStructure {
    handle: StructureHandle,
    upgraded: bool,
    pending_removal: bool,
}

/// A mobile spawn that went through.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MobileSpawn {
    pub kind: UnitKind,
    pub location: Location,
    pub count: u32,
}

#[derive(Clone, Debug)]
pub struct GridBoard {
    geometry: BoardGeometry,
    catalog: UnitCatalog,
    structures: FnvHashMap<Location, PlacedStructure>,
    resources: [[f64; 2]; 2],
    health: [f64; 2],
    turn: u32,
    requests: Vec<BoardRequest>,
    mobile_spawns: Vec<MobileSpawn>,
}

impl GridBoard {
    pub fn new(geometry: BoardGeometry, catalog: UnitCatalog) -> Self {
        GridBoard {
            geometry,
            catalog,
            structures: FnvHashMap::default(),
            resources: [[0.0; 2]; 2],
            health: [30.0; 2],
            turn: 0,
            requests: Vec::new(),
            mobile_spawns: Vec::new(),
        }
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn set_resource(&mut self, kind: Resource, player: Player, amount: f64) -> &mut Self {
        self.resources[player.index()][kind.index()] = amount;
        self
    }

    pub fn set_health(&mut self, player: Player, health: f64) -> &mut Self {
        self.health[player.index()] = health;
        self
    }

    pub fn set_turn(&mut self, turn: u32) -> &mut Self {
        self.turn = turn;
        self
    }

    /// Put a structure on the board for free, replacing whatever was there.
    /// Off-arena locations are ignored.
    pub fn place(&mut self, kind: UnitKind, owner: Player, location: Location) -> &mut Self {
        let health = self.catalog.get(kind).health;
        self.place_with_health(kind, owner, location, health)
    }

    pub fn place_with_health(
        &mut self,
        kind: UnitKind,
        owner: Player,
        location: Location,
        health: f64,
    ) -> &mut Self {
        if self.geometry.in_arena(location) {
            let handle = self.make_handle(kind, owner, location, health);
            self.structures.insert(
                location,
                PlacedStructure {
                    handle,
                    upgraded: false,
                    pending_removal: false,
                },
            );
        }
        self
    }

    pub fn requests(&self) -> &[BoardRequest] {
        &self.requests
    }

    pub fn mobile_spawns(&self) -> &[MobileSpawn] {
        &self.mobile_spawns
    }

    pub fn is_upgraded(&self, location: Location) -> bool {
        self.structures
            .get(&location)
            .map(|s| s.upgraded)
            .unwrap_or(false)
    }

    pub fn is_pending_removal(&self, location: Location) -> bool {
        self.structures
            .get(&location)
            .map(|s| s.pending_removal)
            .unwrap_or(false)
    }

    fn make_handle(
        &self,
        kind: UnitKind,
        owner: Player,
        position: Location,
        health: f64,
    ) -> StructureHandle {
        let info = self.catalog.get(kind);
        StructureHandle {
            kind,
            health,
            damage: info.damage,
            range: info.range,
            position,
            owner,
        }
    }

    fn is_blocked(&self, location: Location) -> bool {
        self.structures.contains_key(&location)
    }

    fn try_spend(&mut self, kind: Resource, amount: f64) -> bool {
        let pool = &mut self.resources[Player::Me.index()][kind.index()];
        if *pool >= amount {
            *pool -= amount;
            true
        } else {
            false
        }
    }

    fn spawn_stationary(&mut self, kind: UnitKind, location: Location) -> u32 {
        if !self.geometry.is_own_half(location) || self.is_blocked(location) {
            return 0;
        }
        if !self.try_spend(Resource::Structure, self.catalog.cost(kind)) {
            return 0;
        }
        self.place(kind, Player::Me, location);
        1
    }

    fn spawn_mobile(&mut self, kind: UnitKind, location: Location, count: Option<u32>) -> u32 {
        let on_bottom_edge = self.geometry.edges_of(location).intersects(Edges::BOTTOM);
        if !on_bottom_edge || self.is_blocked(location) {
            return 0;
        }
        let cost = self.catalog.cost(kind);
        if cost <= 0.0 {
            return 0;
        }
        let pool = self.resources[Player::Me.index()][Resource::Mobile.index()];
        let affordable = (pool / cost).floor() as u32;
        let spawned = count.map(|c| c.min(affordable)).unwrap_or(affordable);
        if spawned == 0 {
            return 0;
        }
        self.resources[Player::Me.index()][Resource::Mobile.index()] -= cost * spawned as f64;
        self.mobile_spawns.push(MobileSpawn {
            kind,
            location,
            count: spawned,
        });
        spawned
    }

    /// Edge a unit launched from `start` heads for.
    fn target_edge(&self, start: Location) -> Edges {
        let edges = self.geometry.edges_of(start);
        if !edges.is_empty() {
            return edges.opposite();
        }
        let left = start.x() < self.geometry.half();
        match (start.y() < self.geometry.half(), left) {
            (true, true) => Edges::TOP_RIGHT,
            (true, false) => Edges::TOP_LEFT,
            (false, true) => Edges::BOTTOM_RIGHT,
            (false, false) => Edges::BOTTOM_LEFT,
        }
    }

    fn successors(&self, location: &Location) -> Vec<Location> {
        self.geometry
            .neighbors(*location)
            .filter(|n| !self.is_blocked(*n))
            .collect()
    }
}

impl BoardOracle for GridBoard {
    fn turn_number(&self) -> u32 {
        self.turn
    }

    fn health(&self, player: Player) -> f64 {
        self.health[player.index()]
    }

    fn resource(&self, kind: Resource, player: Player) -> f64 {
        self.resources[player.index()][kind.index()]
    }

    fn stationary_unit(&self, location: Location) -> Option<StructureHandle> {
        self.structures.get(&location).map(|s| s.handle)
    }

    fn find_path_to_edge(&self, start: Location) -> Vec<Location> {
        if !self.geometry.in_arena(start) || self.is_blocked(start) {
            return Vec::new();
        }
        let target = self.target_edge(start);
        let geometry = self.geometry;

        if let Some(path) = bfs(
            &start,
            |loc| self.successors(loc),
            |loc| geometry.edges_of(*loc).intersects(target),
        ) {
            return path;
        }

        // Edge unreachable: head for the reachable cell deepest towards it.
        let upwards = target.intersects(Edges::TOP);
        let deepest = bfs_reach(start, |loc| self.successors(loc))
            .min_by_key(|loc| Reverse(if upwards { loc.y() } else { -loc.y() }));
        match deepest {
            Some(goal) => bfs(&start, |loc| self.successors(loc), |loc| *loc == goal)
                .unwrap_or_else(|| vec![start]),
            None => vec![start],
        }
    }

    fn attackers(&self, location: Location, player: Player) -> Vec<StructureHandle> {
        self.structures
            .values()
            .map(|s| s.handle)
            .filter(|h| h.owner == player.opponent() && h.deals_damage() && h.can_reach(location))
            .collect()
    }

    fn locations_in_range(&self, center: Location, radius: f64) -> Vec<Location> {
        self.geometry.locations_in_range(center, radius)
    }

    fn attempt_spawn(&mut self, kind: UnitKind, locations: &[Location], count: Option<u32>) -> u32 {
        let mut spawned = 0;
        for &location in locations {
            self.requests.push(BoardRequest::Spawn {
                kind,
                location,
                count,
            });
            spawned += if kind.is_stationary() {
                self.spawn_stationary(kind, location)
            } else {
                self.spawn_mobile(kind, location, count)
            };
        }
        spawned
    }

    fn attempt_upgrade(&mut self, locations: &[Location]) -> u32 {
        let mut upgraded = 0;
        for &location in locations {
            self.requests.push(BoardRequest::Upgrade { location });
            let (kind, owner, already) = match self.structures.get(&location) {
                Some(s) => (s.handle.kind, s.handle.owner, s.upgraded),
                None => continue,
            };
            if owner != Player::Me || already {
                continue;
            }
            if !self.try_spend(Resource::Structure, self.catalog.cost(kind)) {
                continue;
            }
            if let Some(s) = self.structures.get_mut(&location) {
                s.upgraded = true;
                s.handle.health *= 2.0;
                upgraded += 1;
            }
        }
        upgraded
    }

    fn attempt_remove(&mut self, locations: &[Location]) -> u32 {
        let mut removed = 0;
        for &location in locations {
            self.requests.push(BoardRequest::Remove { location });
            if let Some(s) = self.structures.get_mut(&location) {
                if s.handle.owner == Player::Me && !s.pending_removal {
                    s.pending_removal = true;
                    removed += 1;
                }
            }
        }
        removed
    }

    fn submit_turn(&mut self) {
        debug!(
            "Turn {} submitted with {} requests",
            self.turn,
            self.requests.len()
        );
        self.requests.push(BoardRequest::Submit);
    }
}
