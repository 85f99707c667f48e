use foundation::LandmarkId;
use serde::{Deserialize, Serialize};

/// What the pointer currently does. Exactly one holds at a time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "id", rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Idle,
    /// A ghost follows the pointer; a click places a new landmark.
    Placing,
    /// A ghost follows the pointer; a click relocates this landmark.
    Moving(LandmarkId),
    /// The camera orbits this landmark; no pointer preview.
    Visiting(LandmarkId),
}

impl InteractionMode {
    /// Placing and moving share the ghost preview.
    pub fn is_previewing(&self) -> bool {
        matches!(self, InteractionMode::Placing | InteractionMode::Moving(_))
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionMode::Idle)
    }
}

impl std::fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InteractionMode::Idle => write!(f, "idle"),
            InteractionMode::Placing => write!(f, "placing"),
            InteractionMode::Moving(id) => write!(f, "moving {id}"),
            InteractionMode::Visiting(id) => write!(f, "visiting {id}"),
        }
    }
}

/// A user request, as named in transition errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Request {
    Place,
    Move(LandmarkId),
    Visit(LandmarkId),
    ExitVisit,
    Cancel,
    Remove(LandmarkId),
    Postcard,
}

impl std::fmt::Display for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Place => write!(f, "place"),
            Request::Move(id) => write!(f, "move {id}"),
            Request::Visit(id) => write!(f, "visit {id}"),
            Request::ExitVisit => write!(f, "exit visit"),
            Request::Cancel => write!(f, "cancel"),
            Request::Remove(id) => write!(f, "remove {id}"),
            Request::Postcard => write!(f, "make a postcard"),
        }
    }
}
