//! Path Risk Estimator.
//!
//! For a candidate launch cell, asks the oracle for the path a mobile unit
//! would walk and sums the damage the structures covering that path could
//! deal. Paths shorter than the viable minimum score infinite risk and are
//! never selected. Among finite scores the lowest wins; ties go to the
//! candidate listed first.

use crate::config::*;
use crate::location::*;
use crate::oracle::*;
use crate::unit::*;
use fnv::FnvHashMap;
use log::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Whose units walk the candidate paths.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Perspective {
    /// Our units from our edges; the launch cell is the answer.
    Own,
    /// Opponent units from their edges; the path's last cell is the answer,
    /// which is the goal on our side they can reach most safely.
    Opponent,
}

impl Perspective {
    pub fn walker(self) -> Player {
        match self {
            Perspective::Own => Player::Me,
            Perspective::Opponent => Player::Enemy,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum RiskModel {
    /// Number of covering attackers times base turret damage, per cell.
    ExposureCount,
    /// Base turret damage scaled by how hard each attacker is to remove:
    /// its health plus a share of the walls shielding it, clamped.
    HealthWeighted,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct RiskChoice {
    pub location: Location,
    pub risk: f64,
}

pub struct PathRiskEstimator<'a> {
    config: &'a StrategyConfig,
    turret_damage: f64,
    wall_cache: RefCell<FnvHashMap<Location, f64>>,
}

impl<'a> PathRiskEstimator<'a> {
    pub fn new(config: &'a StrategyConfig, catalog: &UnitCatalog) -> Self {
        PathRiskEstimator {
            config,
            turret_damage: catalog.turret_damage(),
            wall_cache: RefCell::new(FnvHashMap::default()),
        }
    }

    /// Total health of the attacker's own walls within the reinforcement
    /// radius, counting only rows at or below the attacker's.
    pub fn surrounding_wall_health(
        &self,
        oracle: &dyn BoardOracle,
        attacker: &StructureHandle,
    ) -> f64 {
        if let Some(cached) = self.wall_cache.borrow().get(&attacker.position) {
            return *cached;
        }
        let health = oracle
            .locations_in_range(attacker.position, self.config.wall_reinforcement_radius)
            .into_iter()
            .filter(|loc| loc.y() <= attacker.position.y())
            .filter_map(|loc| oracle.stationary_unit(loc))
            .filter(|unit| unit.is_wall() && unit.owner == attacker.owner)
            .map(|unit| unit.health)
            .sum();
        self.wall_cache.borrow_mut().insert(attacker.position, health);
        health
    }

    fn attacker_weight(
        &self,
        oracle: &dyn BoardOracle,
        attacker: &StructureHandle,
        model: RiskModel,
    ) -> f64 {
        match model {
            RiskModel::ExposureCount => self.turret_damage,
            RiskModel::HealthWeighted => {
                let walls = self.surrounding_wall_health(oracle, attacker);
                let shielded = attacker.health + self.config.wall_reinforcement * walls;
                let clamped = shielded
                    .max(self.config.risk_health_floor)
                    .min(self.config.risk_health_ceiling);
                self.turret_damage * clamped
            }
        }
    }

    /// Risk of walking `path` as `walker`; infinite when the path is too short.
    pub fn path_risk(
        &self,
        oracle: &dyn BoardOracle,
        path: &[Location],
        walker: Player,
        model: RiskModel,
    ) -> f64 {
        if path.len() < self.config.min_viable_path {
            return f64::INFINITY;
        }
        path.iter()
            .flat_map(|cell| oracle.attackers(*cell, walker))
            .map(|attacker| self.attacker_weight(oracle, &attacker, model))
            .sum()
    }

    /// Lowest-risk candidate with its score, or `None` when every candidate
    /// is blocked or the list is empty.
    pub fn least_damage_location_scored(
        &self,
        oracle: &dyn BoardOracle,
        candidates: &[Location],
        perspective: Perspective,
        model: RiskModel,
    ) -> Option<RiskChoice> {
        self.wall_cache.borrow_mut().clear();

        let mut best: Option<RiskChoice> = None;
        for &candidate in candidates {
            let path = oracle.find_path_to_edge(candidate);
            let risk = self.path_risk(oracle, &path, perspective.walker(), model);
            debug!(
                "Candidate {} path length {} risk {}",
                candidate,
                path.len(),
                risk
            );
            if !risk.is_finite() {
                continue;
            }
            if best.map(|b| risk < b.risk).unwrap_or(true) {
                let location = match perspective {
                    Perspective::Own => candidate,
                    Perspective::Opponent => match path.last() {
                        Some(last) => *last,
                        None => continue,
                    },
                };
                best = Some(RiskChoice { location, risk });
            }
        }

        if best.is_none() {
            warn!(
                "No viable candidate among {} locations ({:?})",
                candidates.len(),
                perspective
            );
        }
        best
    }

    pub fn least_damage_location(
        &self,
        oracle: &dyn BoardOracle,
        candidates: &[Location],
        perspective: Perspective,
        model: RiskModel,
    ) -> Option<Location> {
        self.least_damage_location_scored(oracle, candidates, perspective, model)
            .map(|choice| choice.location)
    }
}
