use serde::{Deserialize, Serialize};

/// Identifier of a landmark on the exhibit map.
///
/// Ids are assigned monotonically and never reused within a session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkId(u32);

impl LandmarkId {
    pub const fn new(n: u32) -> Self {
        LandmarkId(n)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for LandmarkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic id source.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    /// Starts handing out ids at `first`.
    pub fn starting_at(first: u32) -> Self {
        Self { next: first }
    }

    pub fn allocate(&mut self) -> LandmarkId {
        let id = LandmarkId(self.next);
        self.next = self.next.saturating_add(1);
        id
    }

    pub fn peek(&self) -> LandmarkId {
        LandmarkId(self.next)
    }
}
