use serde::*;
use std::fmt;

/// Signed board coordinate. Off-board values are legal so that projected
/// placements can be handed to the oracle, which rejects them.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
pub struct Location {
    x: i8,
    y: i8,
}

impl Location {
    pub const fn new(x: i8, y: i8) -> Self {
        Location { x, y }
    }

    #[inline]
    pub fn x(self) -> i8 {
        self.x
    }

    #[inline]
    pub fn y(self) -> i8 {
        self.y
    }

    /// Euclidean distance, which is what attack and support ranges use.
    pub fn distance_to(self, other: Self) -> f64 {
        let dx = (self.x as f64) - (other.x as f64);
        let dy = (self.y as f64) - (other.y as f64);
        dx.hypot(dy)
    }

    pub fn offset(self, dx: i8, dy: i8) -> Self {
        Location {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl std::ops::Add<(i8, i8)> for Location {
    type Output = Self;
    fn add(self, other: (i8, i8)) -> Self {
        self.offset(other.0, other.1)
    }
}

impl From<[i8; 2]> for Location {
    fn from(xy: [i8; 2]) -> Self {
        Location::new(xy[0], xy[1])
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Serialized as the engine's `[x, y]` pair.
impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [self.x, self.y].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        <[i8; 2]>::deserialize(deserializer).map(Location::from)
    }
}
