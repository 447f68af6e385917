//! Tuning knobs and the unit catalog.
//!
//! `StrategyConfig::default()` is the adaptive strategy (interceptor response,
//! scaling attack threshold, crisis reordering). `StrategyConfig::steady()` is
//! the earlier fixed-threshold strategy.

use crate::constants::*;
use crate::error::*;
use crate::geometry::*;
use crate::unit::*;
use serde::{Deserialize, Serialize};

/// Stats for one unit type, as read from the engine's `unitInformation`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitInfo {
    #[serde(default)]
    pub shorthand: String,
    #[serde(default, rename = "attackDamageWalker")]
    pub damage: f64,
    #[serde(default, rename = "attackRange")]
    pub range: f64,
    #[serde(default, rename = "startHealth")]
    pub health: f64,
    #[serde(default, rename = "cost1")]
    pub structure_cost: f64,
    #[serde(default, rename = "cost2")]
    pub mobile_cost: f64,
}

impl UnitInfo {
    fn new(
        shorthand: &str,
        damage: f64,
        range: f64,
        health: f64,
        structure_cost: f64,
        mobile_cost: f64,
    ) -> Self {
        UnitInfo {
            shorthand: shorthand.to_string(),
            damage,
            range,
            health,
            structure_cost,
            mobile_cost,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnitCatalog {
    units: Vec<UnitInfo>,
}

#[derive(Deserialize)]
struct GameConfig {
    #[serde(rename = "unitInformation")]
    unit_information: Vec<UnitInfo>,
}

impl Default for UnitCatalog {
    fn default() -> Self {
        UnitCatalog {
            units: vec![
                UnitInfo::new("FF", 0.0, 0.0, 60.0, 1.0, 0.0),
                UnitInfo::new("EF", 0.0, 3.5, 30.0, 4.0, 0.0),
                UnitInfo::new("DF", 6.0, 2.5, 75.0, 2.0, 0.0),
                UnitInfo::new("PI", 2.0, 3.5, 15.0, 0.0, 1.0),
                UnitInfo::new("EI", 8.0, 4.5, 5.0, 0.0, 3.0),
                UnitInfo::new("SI", 20.0, 4.5, 40.0, 0.0, 1.0),
            ],
        }
    }
}

impl UnitCatalog {
    /// Read the catalog from the config document the engine sends at game start.
    pub fn from_game_config(json: &str) -> Result<Self> {
        let config: GameConfig = serde_json::from_str(json)?;
        if config.unit_information.len() < UNIT_ORDER_LEN {
            return Err(StrategyError::MissingUnit {
                index: config.unit_information.len(),
            });
        }
        Ok(UnitCatalog {
            units: config.unit_information,
        })
    }

    pub fn get(&self, kind: UnitKind) -> &UnitInfo {
        &self.units[kind.index()]
    }

    pub fn cost(&self, kind: UnitKind) -> f64 {
        let info = self.get(kind);
        match kind.resource() {
            Resource::Structure => info.structure_cost,
            Resource::Mobile => info.mobile_cost,
        }
    }

    /// Damage of an unupgraded turret; the unit of path risk.
    pub fn turret_damage(&self) -> f64 {
        self.get(UnitKind::Turret).damage
    }
}

/// Temporary support placed next to the launch point for one turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupportPlacement {
    pub enabled: bool,
    /// Number of stacked cells, starting two rows above the launch point.
    pub depth: u8,
    pub upgrade: bool,
}

impl Default for SupportPlacement {
    fn default() -> Self {
        SupportPlacement {
            enabled: true,
            depth: 1,
            upgrade: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub geometry: BoardGeometry,

    pub zone_min_x: i8,
    pub zone_width: i8,
    pub zone_boundary_margin: i8,
    pub urgency_baseline: f64,
    pub wall_health_weight: f64,
    /// Keep only the most recent breaches; `None` keeps the whole match.
    pub breach_window: Option<usize>,

    pub min_viable_path: usize,
    pub risk_health_floor: f64,
    pub risk_health_ceiling: f64,
    pub wall_reinforcement: f64,
    pub wall_reinforcement_radius: f64,

    pub attack_threshold: f64,
    /// Raise the attack threshold by one every this many turns.
    pub attack_threshold_step_turns: Option<u32>,
    /// Opponent mobile resource above which an interceptor is sent.
    pub intercept_threshold: Option<f64>,
    /// Own health below which reactive defense is built first.
    pub crisis_health: Option<f64>,
    pub edge_wall_threshold: f64,
    pub support: SupportPlacement,

    pub baseline_turret_columns: Vec<i8>,
    pub baseline_wall_columns: Vec<i8>,
    pub front_turret_columns: Vec<i8>,
    pub front_edge_wall_columns: Vec<i8>,
    pub predictive_placement: bool,

    /// Spend leftover structure resource zone by zone, weighted by allocation.
    pub distributed_build: bool,
    /// Preference-ordered turret columns for each zone.
    pub zone_turret_columns: [Vec<i8>; ZONE_COUNT],
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            geometry: BoardGeometry::default(),
            zone_min_x: ZONE_MIN_X,
            zone_width: ZONE_WIDTH,
            zone_boundary_margin: ZONE_BOUNDARY_MARGIN,
            urgency_baseline: URGENCY_BASELINE,
            wall_health_weight: WALL_HEALTH_WEIGHT,
            breach_window: None,
            min_viable_path: MIN_VIABLE_PATH,
            risk_health_floor: RISK_HEALTH_FLOOR,
            risk_health_ceiling: RISK_HEALTH_CEILING,
            wall_reinforcement: WALL_REINFORCEMENT,
            wall_reinforcement_radius: WALL_REINFORCEMENT_RADIUS,
            attack_threshold: ATTACK_THRESHOLD,
            attack_threshold_step_turns: Some(ATTACK_THRESHOLD_STEP_TURNS),
            intercept_threshold: Some(INTERCEPT_THRESHOLD),
            crisis_health: Some(CRISIS_HEALTH),
            edge_wall_threshold: EDGE_WALL_THRESHOLD,
            support: SupportPlacement::default(),
            baseline_turret_columns: vec![4, 23, 10, 17, 3, 24],
            baseline_wall_columns: vec![10, 23, 17, 4],
            front_turret_columns: vec![3, 24, 9, 18],
            front_edge_wall_columns: vec![0, 1, 2, 8, 11, 16, 19, 25, 26, 27],
            predictive_placement: true,
            distributed_build: false,
            zone_turret_columns: [
                vec![4, 3, 5, 2, 6, 1, 7],
                vec![10, 9, 11, 8, 12, 13],
                vec![17, 18, 16, 19, 15, 14],
                vec![23, 24, 22, 25, 21, 26, 20],
            ],
        }
    }
}

impl StrategyConfig {
    /// Fixed thresholds, no interceptor response, no crisis reordering, a
    /// two-cell upgraded support and a health-only risk term.
    pub fn steady() -> Self {
        StrategyConfig {
            attack_threshold_step_turns: None,
            intercept_threshold: None,
            crisis_health: None,
            edge_wall_threshold: 10.0,
            support: SupportPlacement {
                enabled: true,
                depth: 2,
                upgrade: true,
            },
            wall_reinforcement: 0.0,
            risk_health_ceiling: f64::INFINITY,
            ..StrategyConfig::default()
        }
    }

    /// Parse overrides on top of the defaults and validate them.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: StrategyConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(StrategyError::InvalidConfig(msg));

        let size = self.geometry.size();
        if !(4..=MAX_BOARD_SIZE).contains(&size) || size % 2 != 0 {
            return invalid(format!(
                "board size {} must be even and within 4..={}",
                size, MAX_BOARD_SIZE
            ));
        }
        if self.zone_width <= 0 {
            return invalid(format!("zone width must be positive, got {}", self.zone_width));
        }
        let zones_end = self.zone_min_x as i32 + self.zone_width as i32 * ZONE_COUNT as i32;
        if self.zone_min_x < 0 || zones_end > size as i32 {
            return invalid(format!(
                "zones from column {} at width {} run past the board",
                self.zone_min_x, self.zone_width
            ));
        }
        if self.zone_boundary_margin < 0
            || self.zone_boundary_margin as i32 * 2 > self.zone_width as i32
        {
            return invalid(format!(
                "zone boundary margin {} does not fit zone width {}",
                self.zone_boundary_margin, self.zone_width
            ));
        }
        if !(self.urgency_baseline.is_finite() && self.urgency_baseline > 0.0) {
            return invalid("urgency baseline must be positive".to_string());
        }
        if self.risk_health_floor > self.risk_health_ceiling {
            return invalid("risk health floor is above the ceiling".to_string());
        }
        if !(1..=2).contains(&self.support.depth) {
            return invalid(format!("support depth must be 1 or 2, got {}", self.support.depth));
        }
        let thresholds = [
            self.attack_threshold,
            self.edge_wall_threshold,
            self.intercept_threshold.unwrap_or(0.0),
            self.crisis_health.unwrap_or(0.0),
        ];
        if thresholds.iter().any(|t| !t.is_finite()) {
            return invalid("thresholds must be finite".to_string());
        }
        if self.attack_threshold_step_turns == Some(0) {
            return invalid("attack threshold step must be at least one turn".to_string());
        }

        let columns = self
            .baseline_turret_columns
            .iter()
            .chain(&self.baseline_wall_columns)
            .chain(&self.front_turret_columns)
            .chain(&self.front_edge_wall_columns)
            .chain(self.zone_turret_columns.iter().flatten());
        for &x in columns {
            if !(0..size).contains(&x) {
                return invalid(format!("column {} is outside the board", x));
            }
        }

        Ok(())
    }

    /// Attack threshold for the given turn.
    pub fn attack_threshold_at(&self, turn: u32) -> f64 {
        let extra = self
            .attack_threshold_step_turns
            .map(|step| (turn / step.max(1)) as f64)
            .unwrap_or(0.0);
        self.attack_threshold + extra
    }
}
