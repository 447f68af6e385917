//! Urgency Tracker.
//!
//! Each recorded breach adds a recency weight `index / len` to the zone it
//! landed in, so the oldest breach counts for nothing and the newest for
//! almost one. Breaches next to a zone boundary split that weight evenly
//! with the neighboring zone. Every zone starts from the same baseline, and
//! the result is rescaled so the most urgent zone reads 1.0.

use crate::config::*;
use crate::constants::*;
use crate::location::*;
use crate::unit::*;
use crate::zones::*;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

pub type UrgencyVector = [f64; ZONE_COUNT];

/// Where we were breached, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BreachRecord {
    breaches: Vec<Location>,
    window: Option<usize>,
}

impl BreachRecord {
    pub fn new() -> Self {
        BreachRecord::default()
    }

    /// Keep at most `window` of the most recent breaches.
    pub fn with_window(window: Option<usize>) -> Self {
        BreachRecord {
            breaches: Vec::new(),
            window,
        }
    }

    pub fn push(&mut self, location: Location) {
        self.breaches.push(location);
        if let Some(window) = self.window {
            if self.breaches.len() > window {
                let excess = self.breaches.len() - window;
                self.breaches.drain(..excess);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.breaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breaches.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Location> + '_ {
        self.breaches.iter().copied()
    }

    pub fn as_slice(&self) -> &[Location] {
        &self.breaches
    }
}

impl FromIterator<Location> for BreachRecord {
    fn from_iter<I: IntoIterator<Item = Location>>(iter: I) -> Self {
        let mut record = BreachRecord::new();
        for location in iter {
            record.push(location);
        }
        record
    }
}

/// One breach notification from the engine.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct BreachEvent {
    pub location: Location,
    /// Owner of the unit that scored.
    pub scorer: Player,
}

impl BreachEvent {
    pub fn against_us(&self) -> bool {
        self.scorer == Player::Enemy
    }
}

/// Frames encode a breach as `[[x, y], damage, unit_type, id, owner]`
/// where owner 1 is us.
impl<'de> Deserialize<'de> for BreachEvent {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        type Entry = (Location, f64, IgnoredAny, IgnoredAny, u8);
        let (location, _damage, _unit_type, _id, owner) = Entry::deserialize(deserializer)?;
        let scorer = if owner == 1 { Player::Me } else { Player::Enemy };
        Ok(BreachEvent { location, scorer })
    }
}

pub fn urgency(record: &BreachRecord, config: &StrategyConfig) -> UrgencyVector {
    let layout = ZoneLayout::from_config(config);
    let mut urgency = [config.urgency_baseline; ZONE_COUNT];
    let len = record.len() as f64;

    for (index, location) in record.iter().enumerate() {
        let weight = index as f64 / len;
        let zone = layout.zone_of(location.x());
        match layout.boundary_neighbor(location.x(), config.zone_boundary_margin) {
            Some(neighbor) => {
                urgency[zone.index()] += weight * 0.5;
                urgency[neighbor.index()] += weight * 0.5;
            }
            None => urgency[zone.index()] += weight,
        }
    }

    let max = urgency.iter().copied().fold(f64::MIN_POSITIVE, f64::max);
    for value in urgency.iter_mut() {
        *value /= max;
    }
    urgency
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(xs: &[i8]) -> BreachRecord {
        xs.iter().map(|&x| Location::new(x, 13 - x.min(13))).collect()
    }

    #[test]
    fn empty_record_is_uniform() {
        let config = StrategyConfig::default();
        assert_eq!(urgency(&BreachRecord::new(), &config), [1.0; ZONE_COUNT]);
    }

    #[test]
    fn recent_breaches_weigh_more() {
        let config = StrategyConfig::default();
        // First breach carries zero weight.
        let u = urgency(&record(&[24]), &config);
        assert_eq!(u, [1.0; ZONE_COUNT]);

        let u = urgency(&record(&[24, 3]), &config);
        assert_eq!(u[Zone::LeftLeft.index()], 1.0);
        assert!(u[Zone::RightRight.index()] < 1.0);
    }

    #[test]
    fn boundary_breach_splits_between_zones() {
        let config = StrategyConfig::default();
        let u = urgency(&record(&[3, 7, 3]), &config);
        let ll = u[Zone::LeftLeft.index()];
        let lm = u[Zone::LeftMid.index()];
        assert_eq!(ll, 1.0);
        assert!(lm > u[Zone::RightMid.index()]);
        assert!(lm < 1.0);
    }

    #[test]
    fn breach_event_from_frame_entry() {
        let event: BreachEvent = serde_json::from_str(r#"[[2, 11], 1, 3, "42", 2]"#).unwrap();
        assert_eq!(event.location, Location::new(2, 11));
        assert!(event.against_us());
        let ours: BreachEvent = serde_json::from_str(r#"[[20, 21], 1.0, 3, "43", 1]"#).unwrap();
        assert!(!ours.against_us());
    }

    #[test]
    fn window_drops_oldest() {
        let mut record = BreachRecord::with_window(Some(2));
        record.push(Location::new(1, 12));
        record.push(Location::new(5, 8));
        record.push(Location::new(20, 6));
        assert_eq!(record.as_slice(), &[Location::new(5, 8), Location::new(20, 6)]);
    }

    proptest! {
        #[test]
        fn prop_max_is_one(xs in prop::collection::vec(0i8..28, 0..60)) {
            let config = StrategyConfig::default();
            let u = urgency(&record(&xs), &config);
            let max = u.iter().copied().fold(f64::MIN, f64::max);
            prop_assert!((max - 1.0).abs() < 1e-12);
            prop_assert!(u.iter().sum::<f64>() > 0.0);
            prop_assert!(u.iter().all(|v| *v > 0.0));
        }

        #[test]
        fn prop_new_breach_never_lowers_its_zone(
            xs in prop::collection::vec(0i8..28, 0..60),
            x in 0i8..28,
        ) {
            let config = StrategyConfig::default();
            let layout = ZoneLayout::from_config(&config);
            let before = urgency(&record(&xs), &config);
            let mut extended = xs.clone();
            extended.push(x);
            let after = urgency(&record(&extended), &config);
            let zone = layout.zone_of(x).index();
            prop_assert!(after[zone] + 1e-9 >= before[zone]);
        }

        #[test]
        fn prop_urgency_is_pure(xs in prop::collection::vec(0i8..28, 0..30)) {
            let config = StrategyConfig::default();
            let record = record(&xs);
            prop_assert_eq!(urgency(&record, &config), urgency(&record, &config));
        }
    }
}
