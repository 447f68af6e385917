//! Placement Policy: the per-turn decision sequence.
//!
//! A turn runs interceptor response, the offense gate with its temporary
//! support, then defensive construction, and finally submits. Everything the
//! policy asks for goes through the oracle as best-effort requests; what the
//! oracle rejects is never retried within the turn.

use crate::allocation::*;
use crate::config::*;
use crate::error::*;
use crate::geometry::*;
use crate::location::*;
use crate::oracle::*;
use crate::risk::*;
use crate::unit::*;
use crate::urgency::*;
use crate::zones::*;
use itertools::Itertools;
use log::*;
use serde::Deserialize;

/// Wall offsets tried behind each front turret, in order.
const FRONT_WALL_OFFSETS: [i8; 3] = [0, 1, -1];

#[derive(Deserialize)]
struct ActionFrame {
    #[serde(default)]
    events: FrameEvents,
}

#[derive(Deserialize, Default)]
struct FrameEvents {
    #[serde(default)]
    breach: Vec<BreachEvent>,
}

/// What the planner decided this turn.
#[derive(Clone, Debug, PartialEq)]
pub struct TurnReport {
    pub turn: u32,
    pub intercept: Option<Location>,
    pub attack: Option<RiskChoice>,
    pub support: Option<Location>,
    pub crisis: bool,
    pub urgency: UrgencyVector,
    pub allocation: AllocationDistribution,
    pub predicted: Vec<Location>,
}

/// Project turret candidates from past breaches.
///
/// A breach at `(x, y)` mirrors towards the center by its distance from the
/// wall row, and each projected column is bracketed by its two neighbors.
/// Duplicates keep their first position.
pub fn predict_turret_locations<I>(breaches: I, geometry: &BoardGeometry) -> Vec<Location>
where
    I: IntoIterator<Item = Location>,
{
    let center = geometry.center_x();
    let front = geometry.wall_row();
    let row = geometry.turret_row();

    breaches
        .into_iter()
        .flat_map(|breach| {
            let shift = front - breach.y();
            let x = if breach.x() <= center {
                breach.x().saturating_add(shift)
            } else {
                breach.x().saturating_sub(shift)
            };
            [
                Location::new(x, row),
                Location::new(x.saturating_add(1), row),
                Location::new(x.saturating_sub(1), row),
            ]
        })
        .unique()
        .collect()
}

pub struct TurnPlanner {
    config: StrategyConfig,
    catalog: UnitCatalog,
    breaches: BreachRecord,
}

impl TurnPlanner {
    pub fn new(config: StrategyConfig, catalog: UnitCatalog) -> Self {
        let breaches = BreachRecord::with_window(config.breach_window);
        TurnPlanner {
            config,
            catalog,
            breaches,
        }
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn breaches(&self) -> &BreachRecord {
        &self.breaches
    }

    /// Record a breach if it was scored against us. Returns whether it was kept.
    pub fn on_breach(&mut self, event: BreachEvent) -> bool {
        if !event.against_us() {
            return false;
        }
        debug!("Breached at {}", event.location);
        self.breaches.push(event.location);
        true
    }

    /// Feed one engine action frame; returns how many breaches were recorded.
    pub fn on_action_frame(&mut self, frame: &str) -> Result<usize> {
        let frame: ActionFrame = serde_json::from_str(frame).map_err(|err| {
            warn!("Malformed action frame: {}", err);
            err
        })?;
        Ok(frame
            .events
            .breach
            .into_iter()
            .filter(|event| self.on_breach(*event))
            .count())
    }

    pub fn predictive_turret_locations(&self) -> Vec<Location> {
        predict_turret_locations(self.breaches.iter(), &self.config.geometry)
    }

    /// Plan the turn, issue every request and submit.
    pub fn on_turn(&self, oracle: &mut dyn BoardOracle) -> TurnReport {
        let report = self.plan_turn(oracle);
        oracle.submit_turn();
        report
    }

    /// Issue this turn's requests without submitting.
    pub fn plan_turn(&self, oracle: &mut dyn BoardOracle) -> TurnReport {
        let turn = oracle.turn_number();

        let urgency = urgency(&self.breaches, &self.config);
        let stats = zone_stats(oracle, &self.config);
        let allocation = allocate(&stats, &urgency);
        info!(
            "Turn {}: urgency {:?} allocation {:?} over {} breaches",
            turn,
            urgency,
            allocation,
            self.breaches.len()
        );

        let intercept = self.respond_to_threat(oracle);

        let mut attack = None;
        let mut support = None;
        let threshold = self.config.attack_threshold_at(turn);
        let mobile = oracle.resource(Resource::Mobile, Player::Me);
        if mobile >= threshold {
            attack = self.launch_attack(oracle);
            if let Some(choice) = attack {
                if self.config.support.enabled {
                    support = self.place_support(oracle, choice.location);
                }
            }
        } else {
            debug!("Holding attack: {} mobile below {}", mobile, threshold);
        }

        let crisis = self
            .config
            .crisis_health
            .map(|limit| oracle.health(Player::Me) < limit)
            .unwrap_or(false);
        let predicted = if self.config.predictive_placement {
            self.predictive_turret_locations()
        } else {
            Vec::new()
        };

        if crisis {
            info!("Crisis at {} health, reinforcing the front first", oracle.health(Player::Me));
            self.build_front_reactive(oracle, &predicted);
            self.build_defences(oracle);
        } else {
            self.build_defences(oracle);
            self.build_front_reactive(oracle, &predicted);
        }

        if self.config.distributed_build {
            self.build_distributed(oracle, &allocation);
        }

        TurnReport {
            turn,
            intercept,
            attack,
            support,
            crisis,
            urgency,
            allocation,
            predicted,
        }
    }

    /// Send one interceptor to our most exposed goal when the opponent can
    /// afford a large push.
    fn respond_to_threat(&self, oracle: &mut dyn BoardOracle) -> Option<Location> {
        let limit = self.config.intercept_threshold?;
        let enemy_mobile = oracle.resource(Resource::Mobile, Player::Enemy);
        if enemy_mobile <= limit {
            return None;
        }

        let edges = self.config.geometry.edge_locations(Edges::TOP);
        let candidates = filter_blocked_locations(oracle, &edges);
        let estimator = PathRiskEstimator::new(&self.config, &self.catalog);
        let goal = estimator.least_damage_location(
            oracle,
            &candidates,
            Perspective::Opponent,
            RiskModel::ExposureCount,
        )?;

        info!("Opponent holds {} mobile, intercepting at {}", enemy_mobile, goal);
        oracle.attempt_spawn(UnitKind::Interceptor, &[goal], Some(1));
        Some(goal)
    }

    fn launch_attack(&self, oracle: &mut dyn BoardOracle) -> Option<RiskChoice> {
        let edges = self.config.geometry.edge_locations(Edges::BOTTOM);
        let candidates = filter_blocked_locations(oracle, &edges);
        let estimator = PathRiskEstimator::new(&self.config, &self.catalog);
        let choice = estimator.least_damage_location_scored(
            oracle,
            &candidates,
            Perspective::Own,
            RiskModel::HealthWeighted,
        )?;

        info!("Attacking from {} at risk {}", choice.location, choice.risk);
        oracle.attempt_spawn(UnitKind::Scout, &[choice.location], None);
        Some(choice)
    }

    /// Cells for the temporary support, starting two rows above `launch` and
    /// walking sideways, away from the near side, while a non-support
    /// structure is in the way. Stacked cells walk at double stride.
    fn support_cells(&self, oracle: &dyn BoardOracle, launch: Location) -> Option<Vec<Location>> {
        let geometry = &self.config.geometry;
        let step: i8 = if launch.x() <= geometry.center_x() { 1 } else { -1 };
        let depth = self.config.support.depth.max(1) as i8;

        let mut cells: Vec<Location> = (0..depth).map(|d| launch.offset(0, 2 + d)).collect();
        for _ in 0..geometry.size() {
            if !cells.iter().all(|cell| geometry.in_arena(*cell)) {
                break;
            }
            let taken = cells.iter().any(|cell| {
                oracle
                    .stationary_unit(*cell)
                    .map(|unit| unit.kind != UnitKind::Support)
                    .unwrap_or(false)
            });
            if !taken {
                return Some(cells);
            }
            debug!("Support cells {:?} taken", cells);
            for (d, cell) in cells.iter_mut().enumerate() {
                *cell = cell.offset(step * (d as i8 + 1), 0);
            }
        }

        warn!("No room for a support next to {}", launch);
        None
    }

    fn place_support(&self, oracle: &mut dyn BoardOracle, launch: Location) -> Option<Location> {
        let cells = self.support_cells(oracle, launch)?;
        oracle.attempt_spawn(UnitKind::Support, &cells, None);
        if self.config.support.upgrade {
            oracle.attempt_upgrade(&cells);
        }
        oracle.attempt_remove(&cells);
        cells.first().copied()
    }

    fn row(&self, columns: &[i8], y: i8) -> Vec<Location> {
        columns.iter().map(|&x| Location::new(x, y)).collect()
    }

    /// Fixed turret and wall layout, spawned then upgraded.
    pub fn build_defences(&self, oracle: &mut dyn BoardOracle) {
        let geometry = &self.config.geometry;
        let turrets = self.row(&self.config.baseline_turret_columns, geometry.turret_row());
        let walls = self.row(&self.config.baseline_wall_columns, geometry.wall_row());

        oracle.attempt_spawn(UnitKind::Turret, &turrets, None);
        oracle.attempt_spawn(UnitKind::Wall, &walls, None);
        oracle.attempt_upgrade(&turrets);
        oracle.attempt_upgrade(&walls);
    }

    /// Predicted and fixed front turrets, each with a wall behind it, then
    /// the edge walls once there is structure resource to spare.
    pub fn build_front_reactive(&self, oracle: &mut dyn BoardOracle, predicted: &[Location]) {
        let geometry = &self.config.geometry;
        let behind = geometry.wall_row() - geometry.turret_row();

        let mut turrets = predicted.to_vec();
        turrets.extend(self.row(&self.config.front_turret_columns, geometry.turret_row()));

        for dx in FRONT_WALL_OFFSETS {
            for &turret in &turrets {
                let wall = turret.offset(dx, behind);
                oracle.attempt_spawn(UnitKind::Turret, &[turret], None);
                oracle.attempt_upgrade(&[turret]);
                oracle.attempt_spawn(UnitKind::Wall, &[wall], None);
                oracle.attempt_upgrade(&[wall]);
            }
        }

        let structure = oracle.resource(Resource::Structure, Player::Me);
        if structure > self.config.edge_wall_threshold {
            debug!("Reinforcing edge walls with {} structure", structure);
            let walls = self.row(&self.config.front_edge_wall_columns, geometry.wall_row());
            oracle.attempt_spawn(UnitKind::Wall, &walls, None);
            oracle.attempt_upgrade(&walls);
        }
    }

    /// Split what structure resource is left across zones by `allocation` and
    /// spend each share on that zone's preferred turret columns.
    pub fn build_distributed(
        &self,
        oracle: &mut dyn BoardOracle,
        allocation: &AllocationDistribution,
    ) {
        let geometry = &self.config.geometry;
        let behind = geometry.wall_row() - geometry.turret_row();
        let turret_cost = self.catalog.cost(UnitKind::Turret);
        let wall_cost = self.catalog.cost(UnitKind::Wall);
        let budgets = zone_budgets(oracle.resource(Resource::Structure, Player::Me), allocation);

        for zone in Zone::ALL {
            let mut budget = budgets[zone.index()];
            for &x in &self.config.zone_turret_columns[zone.index()] {
                if budget < turret_cost {
                    break;
                }
                let turret = Location::new(x, geometry.turret_row());
                if oracle.stationary_unit(turret).is_some() {
                    continue;
                }
                oracle.attempt_spawn(UnitKind::Turret, &[turret], None);
                budget -= turret_cost;

                let wall = turret.offset(0, behind);
                if budget >= wall_cost && oracle.stationary_unit(wall).is_none() {
                    oracle.attempt_spawn(UnitKind::Wall, &[wall], None);
                    budget -= wall_cost;
                }
            }
            debug!("Zone {:?} left {} unspent", zone, budget);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::*;

    fn planner(config: StrategyConfig) -> TurnPlanner {
        TurnPlanner::new(config, UnitCatalog::default())
    }

    fn board() -> GridBoard {
        GridBoard::new(BoardGeometry::default(), UnitCatalog::default())
    }

    fn spawns_of(board: &GridBoard, kind: UnitKind) -> Vec<Location> {
        board
            .requests()
            .iter()
            .filter_map(|r| match r {
                BoardRequest::Spawn { kind: k, location, .. } if *k == kind => Some(*location),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn prediction_mirrors_towards_center() {
        let geometry = BoardGeometry::default();
        let left = predict_turret_locations([Location::new(2, 11)], &geometry);
        assert_eq!(
            left,
            vec![Location::new(4, 12), Location::new(5, 12), Location::new(3, 12)]
        );
        let right = predict_turret_locations([Location::new(25, 10)], &geometry);
        assert_eq!(
            right,
            vec![Location::new(22, 12), Location::new(23, 12), Location::new(21, 12)]
        );
    }

    #[test]
    fn prediction_drops_duplicates() {
        let geometry = BoardGeometry::default();
        let out = predict_turret_locations([Location::new(2, 11), Location::new(3, 12)], &geometry);
        assert_eq!(
            out,
            vec![Location::new(4, 12), Location::new(5, 12), Location::new(3, 12)]
        );
    }

    #[test]
    fn action_frame_records_breaches_against_us() {
        let mut planner = planner(StrategyConfig::default());
        let frame = r#"{
            "turnInfo": [1, 3, 12],
            "events": {
                "breach": [
                    [[2, 11], 1, 3, "7", 2],
                    [[20, 21], 1, 3, "8", 1],
                    [[25, 11], 2, 4, "9", 2]
                ],
                "damage": []
            }
        }"#;
        assert_eq!(planner.on_action_frame(frame).unwrap(), 2);
        assert_eq!(
            planner.breaches().as_slice(),
            &[Location::new(2, 11), Location::new(25, 11)]
        );
        assert_eq!(planner.on_action_frame(r#"{"turnInfo": [0]}"#).unwrap(), 0);
        assert!(planner.on_action_frame("not json").is_err());
        assert_eq!(planner.breaches().len(), 2);
    }

    #[test]
    fn breach_window_bounds_history() {
        let config = StrategyConfig {
            breach_window: Some(1),
            ..StrategyConfig::default()
        };
        let mut planner = planner(config);
        for x in [2, 9, 20] {
            planner.on_breach(BreachEvent {
                location: Location::new(x, 11),
                scorer: Player::Enemy,
            });
        }
        assert_eq!(planner.breaches().as_slice(), &[Location::new(20, 11)]);
    }

    #[test]
    fn support_walks_inwards_past_structures() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        board
            .place(UnitKind::Wall, Player::Me, Location::new(5, 10))
            .place(UnitKind::Wall, Player::Me, Location::new(6, 10));
        let cells = planner.support_cells(&board, Location::new(5, 8));
        assert_eq!(cells, Some(vec![Location::new(7, 10)]));

        board.place(UnitKind::Turret, Player::Me, Location::new(21, 10));
        let cells = planner.support_cells(&board, Location::new(21, 7)).unwrap();
        assert_eq!(cells, vec![Location::new(21, 9)]);
        let cells = planner.support_cells(&board, Location::new(21, 8)).unwrap();
        assert_eq!(cells, vec![Location::new(20, 10)]);
    }

    #[test]
    fn support_reuses_existing_support_cell() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        board.place(UnitKind::Support, Player::Me, Location::new(5, 10));
        assert_eq!(
            planner.support_cells(&board, Location::new(5, 8)),
            Some(vec![Location::new(5, 10)])
        );
    }

    #[test]
    fn stacked_support_steps_at_double_stride() {
        let planner = planner(StrategyConfig::steady());
        let mut board = board();
        board.place(UnitKind::Wall, Player::Me, Location::new(5, 11));
        let cells = planner.support_cells(&board, Location::new(5, 8)).unwrap();
        assert_eq!(cells, vec![Location::new(6, 10), Location::new(7, 11)]);
    }

    #[test]
    fn support_search_stops_at_arena_edge() {
        let planner = planner(StrategyConfig::default());
        let board = board();
        // (0, 15) is off the diamond.
        assert_eq!(planner.support_cells(&board, Location::new(0, 13)), None);
    }

    #[test]
    fn baseline_spawns_then_upgrades() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        planner.build_defences(&mut board);
        let requests = board.requests();
        assert_eq!(requests.len(), 6 + 4 + 6 + 4);
        assert_eq!(
            requests[0],
            BoardRequest::Spawn {
                kind: UnitKind::Turret,
                location: Location::new(4, 12),
                count: None
            }
        );
        assert_eq!(
            requests[6],
            BoardRequest::Spawn {
                kind: UnitKind::Wall,
                location: Location::new(10, 13),
                count: None
            }
        );
        assert_eq!(requests[10], BoardRequest::Upgrade { location: Location::new(4, 12) });
        assert_eq!(requests[16], BoardRequest::Upgrade { location: Location::new(10, 13) });
    }

    #[test]
    fn front_reactive_walls_cycle_offsets_outermost() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        planner.build_front_reactive(&mut board, &[]);
        let walls = spawns_of(&board, UnitKind::Wall);
        assert_eq!(walls.len(), 12);
        assert_eq!(&walls[..4], &[
            Location::new(3, 13),
            Location::new(24, 13),
            Location::new(9, 13),
            Location::new(18, 13)
        ]);
        assert_eq!(walls[4], Location::new(4, 13));
        assert_eq!(walls[8], Location::new(2, 13));
    }

    #[test]
    fn edge_walls_need_spare_structure() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        board.set_resource(Resource::Structure, Player::Me, 20.0);
        planner.build_front_reactive(&mut board, &[]);
        assert_eq!(spawns_of(&board, UnitKind::Wall).len(), 12);

        let mut board = self::board();
        board.set_resource(Resource::Structure, Player::Me, 200.0);
        planner.build_front_reactive(&mut board, &[]);
        let walls = spawns_of(&board, UnitKind::Wall);
        assert_eq!(walls.len(), 12 + 10);
        assert_eq!(walls[12], Location::new(0, 13));
    }

    #[test]
    fn distributed_build_follows_allocation() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        board.set_resource(Resource::Structure, Player::Me, 12.0);
        board.place(UnitKind::Turret, Player::Me, Location::new(4, 12));
        planner.build_distributed(&mut board, &[1.0, 0.0, 0.0, 0.0]);
        // Turret 2 + wall 1 per slot; 12 buys four slots, skipping the taken column.
        let turrets = spawns_of(&board, UnitKind::Turret);
        assert_eq!(
            turrets,
            vec![
                Location::new(3, 12),
                Location::new(5, 12),
                Location::new(2, 12),
                Location::new(6, 12)
            ]
        );
        assert_eq!(spawns_of(&board, UnitKind::Wall).len(), 4);
    }

    #[test]
    fn interceptor_answers_a_large_enemy_bank() {
        let planner = planner(StrategyConfig::default());
        let mut board = board();
        board.set_resource(Resource::Mobile, Player::Enemy, 15.0);
        let report = planner.on_turn(&mut board);
        let goal = report.intercept.unwrap();
        assert!(board.geometry().edges_of(goal).intersects(Edges::BOTTOM));
        assert_eq!(spawns_of(&board, UnitKind::Interceptor), vec![goal]);
        assert_eq!(board.requests().last(), Some(&BoardRequest::Submit));

        let steady = self::planner(StrategyConfig::steady());
        let mut board = self::board();
        board.set_resource(Resource::Mobile, Player::Enemy, 30.0);
        assert_eq!(steady.on_turn(&mut board).intercept, None);
    }
}
