use serde::{Deserialize, Serialize};

/// Rooms and roommates are fixed at three for every allocation cycle.
pub const ROOM_COUNT: usize = 3;
pub const PARTICIPANT_COUNT: usize = 3;

pub const DEFAULT_TOTAL_RENT: f64 = 2380.0;

pub const DEFAULT_ROOM_LABELS: [&str; ROOM_COUNT] =
    ["Backyard Window Room", "Small Room", "Middle Room"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomId {
    Room1,
    Room2,
    Room3,
}

impl RoomId {
    pub const ALL: [RoomId; ROOM_COUNT] = [RoomId::Room1, RoomId::Room2, RoomId::Room3];

    pub fn index(self) -> usize {
        match self {
            RoomId::Room1 => 0,
            RoomId::Room2 => 1,
            RoomId::Room3 => 2,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parses the one-based room number used on the command line (`1`, `2`, `3`)
    /// as well as the form field names (`room1` .. `room3`).
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        let digits = raw.strip_prefix("room").unwrap_or(&raw);
        match digits {
            "1" => Some(RoomId::Room1),
            "2" => Some(RoomId::Room2),
            "3" => Some(RoomId::Room3),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoomId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "room{}", self.index() + 1)
    }
}

/// Display labels for the three rooms, indexed by [`RoomId::index`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomLabels(pub [String; ROOM_COUNT]);

impl RoomLabels {
    pub fn label(&self, room: RoomId) -> &str {
        &self.0[room.index()]
    }
}

impl Default for RoomLabels {
    fn default() -> Self {
        Self(DEFAULT_ROOM_LABELS.map(String::from))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomValuation {
    pub room: RoomId,
    pub amount: f64,
}

/// A participant's submission as reported back by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<f64>>,
    /// Kept verbatim; servers disagree on whether an offset is included.
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub person: String,
    pub room: String,
    pub valuation: f64,
    pub rent: f64,
}

/// Rounds a currency amount to whole cents.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

pub fn format_amount(amount: f64) -> String {
    let rounded = round_cents(amount);
    // Avoid rendering "-0.00".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.2}")
}

/// Allocation methods the calculation endpoint is known to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMethod {
    LinearProgramming,
    LastDiminisher,
}

impl AllocationMethod {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "linear_programming" => Some(Self::LinearProgramming),
            "last_diminisher" => Some(Self::LastDiminisher),
            _ => None,
        }
    }

    pub fn explanation(self) -> &'static str {
        match self {
            Self::LinearProgramming => {
                "Rents were found by linear programming so that nobody envies another \
                 room: at the assigned rents each roommate values their own room at least \
                 as much as any other, and the rents add up to the total."
            }
            Self::LastDiminisher => {
                "No envy-free rents existed, so rooms were handed out in turn: the first \
                 roommate claims their favourite room at their own valuation, the second \
                 may take it over if they value it more, and the last roommate gets the \
                 remaining room for whatever rent is left."
            }
        }
    }
}
