//! Keeps the three room fields consistent with the total rent.
//!
//! Two policies exist. [`ReconcilePolicy::AutoBalance`] rewrites the fields the
//! user has not pinned so the three always add up to the total.
//! [`ReconcilePolicy::RemainingDisplay`] never touches other fields and only
//! reports how much of the total is still unassigned.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shared::domain::{format_amount, round_cents, RoomId, ROOM_COUNT};

/// Differences smaller than a cent count as balanced.
pub const BALANCE_EPSILON: f64 = 0.01;

/// Auto-balance derives one field from the two most recent user edits.
pub const MAX_ANCHORS: usize = ROOM_COUNT - 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconcilePolicy {
    #[default]
    AutoBalance,
    RemainingDisplay,
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "auto_balance" | "auto" => Ok(Self::AutoBalance),
            "remaining_display" | "remaining" => Ok(Self::RemainingDisplay),
            other => Err(format!(
                "unknown policy '{other}' (expected auto_balance or remaining_display)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceState {
    OverAllocated,
    Balanced,
    InProgress,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Remaining {
    pub amount: f64,
    pub state: BalanceState,
}

impl Remaining {
    pub fn new(total: f64, entered: impl IntoIterator<Item = Option<f64>>) -> Self {
        let sum: f64 = entered.into_iter().map(|value| value.unwrap_or(0.0)).sum();
        let amount = total - sum;
        let state = if amount.abs() < BALANCE_EPSILON {
            BalanceState::Balanced
        } else if amount < 0.0 {
            BalanceState::OverAllocated
        } else {
            BalanceState::InProgress
        };
        Self { amount, state }
    }
}

impl std::fmt::Display for Remaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let note = match self.state {
            BalanceState::OverAllocated => "over-allocated",
            BalanceState::Balanced => "balanced",
            BalanceState::InProgress => "in progress",
        };
        write!(f, "remaining {} ({note})", format_amount(self.amount))
    }
}

/// Parses a field's text; empty, unparsable and non-finite input counts as absent.
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Negative entries are replaced by `0` as soon as they are typed.
pub fn clamp_input(text: &str) -> String {
    match parse_amount(text) {
        Some(value) if value < 0.0 => "0".to_string(),
        _ => text.to_string(),
    }
}

pub fn equal_split(total: f64) -> f64 {
    total / ROOM_COUNT as f64
}

/// Derived values for every room that is not pinned, in whole cents.
///
/// `pinned` holds at most [`MAX_ANCHORS`] rooms with their values; extra
/// entries beyond that are ignored. Pinned rooms map to `None`. The share left
/// over by rounding goes to the last derived room, so the derived cents plus
/// the pinned values add up to `total`.
pub fn auto_balance(total: f64, pinned: &[(RoomId, f64)]) -> [Option<f64>; ROOM_COUNT] {
    let pinned = &pinned[..pinned.len().min(MAX_ANCHORS)];
    let is_pinned = |room: RoomId| pinned.iter().any(|(anchor, _)| *anchor == room);
    let free: Vec<RoomId> = RoomId::ALL
        .into_iter()
        .filter(|room| !is_pinned(*room))
        .collect();

    let remainder = total - pinned.iter().map(|(_, value)| value).sum::<f64>();
    let share = round_cents(remainder / free.len() as f64);

    let mut derived = [None; ROOM_COUNT];
    let mut assigned = 0.0;
    for (position, room) in free.iter().enumerate() {
        let value = if position + 1 == free.len() {
            round_cents(remainder - assigned)
        } else {
            share
        };
        assigned += value;
        derived[room.index()] = Some(value);
    }
    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOTAL: f64 = 2380.0;

    fn cents(value: f64) -> i64 {
        (value * 100.0).round() as i64
    }

    fn formatted(derived: [Option<f64>; ROOM_COUNT]) -> [String; ROOM_COUNT] {
        derived.map(|value| value.map(format_amount).unwrap_or_default())
    }

    #[test]
    fn no_pinned_rooms_split_equally_with_the_odd_cent_last() {
        let derived = auto_balance(TOTAL, &[]);
        assert_eq!(formatted(derived), ["793.33", "793.33", "793.34"]);

        let sum: i64 = derived.iter().flatten().map(|value| cents(*value)).sum();
        assert_eq!(sum, cents(TOTAL));
    }

    #[test]
    fn one_pinned_room_splits_remainder_across_the_other_two() {
        for v in [0.0, 1.0, 690.5, 1000.0, 2380.0] {
            let derived = auto_balance(TOTAL, &[(RoomId::Room2, v)]);
            assert_eq!(derived[RoomId::Room2.index()], None);
            let half = format_amount((TOTAL - v) / 2.0);
            assert_eq!(formatted(derived), [half.clone(), String::new(), half]);
        }
    }

    #[test]
    fn odd_cent_remainder_still_adds_up_to_total() {
        for v in [1000.01, 0.01, 1234.57, 2379.99] {
            let derived = auto_balance(TOTAL, &[(RoomId::Room1, v)]);
            let derived_cents: i64 = derived.iter().flatten().map(|value| cents(*value)).sum();
            assert_eq!(derived_cents + cents(v), cents(TOTAL), "anchor {v}");

            let [_, second, third] = derived.map(|value| value.map(cents).unwrap_or_default());
            assert!((second - third).abs() <= 1, "anchor {v}: {second} vs {third}");
        }
    }

    #[test]
    fn two_pinned_rooms_force_the_third_to_the_remainder() {
        for (a, b) in [(0.0, 0.0), (1000.0, 800.0), (793.33, 793.33), (1190.0, 1190.0)] {
            let derived = auto_balance(TOTAL, &[(RoomId::Room1, a), (RoomId::Room3, b)]);
            assert_eq!(derived[0], None);
            assert_eq!(derived[2], None);
            let third = derived[1].expect("derived");
            assert_eq!(format_amount(third), format_amount(TOTAL - a - b));
        }
    }

    #[test]
    fn remaining_reports_state() {
        let over = Remaining::new(TOTAL, [Some(2000.0), Some(500.0), None]);
        assert_eq!(over.amount, -120.0);
        assert_eq!(over.state, BalanceState::OverAllocated);

        let balanced = Remaining::new(TOTAL, [Some(793.33), Some(793.33), Some(793.34)]);
        assert!(balanced.amount.abs() < BALANCE_EPSILON);
        assert_eq!(balanced.state, BalanceState::Balanced);

        let barely_over = Remaining::new(TOTAL, [Some(2380.005), None, None]);
        assert!(barely_over.amount < 0.0);
        assert_eq!(barely_over.state, BalanceState::Balanced);

        let partial = Remaining::new(TOTAL, [Some(1000.0), None, None]);
        assert_eq!(partial.amount, 1380.0);
        assert_eq!(partial.state, BalanceState::InProgress);

        let empty = Remaining::new(TOTAL, [None, None, None]);
        assert_eq!(empty.amount, TOTAL);
        assert_eq!(empty.state, BalanceState::InProgress);
    }

    #[test]
    fn clamps_negative_input_to_zero() {
        assert_eq!(clamp_input("-5"), "0");
        assert_eq!(clamp_input("-0.01"), "0");
        assert_eq!(clamp_input("12.5"), "12.5");
        assert_eq!(clamp_input(""), "");
        assert_eq!(clamp_input("abc"), "abc");
    }

    #[test]
    fn parses_policy_names() {
        assert_eq!("auto_balance".parse(), Ok(ReconcilePolicy::AutoBalance));
        assert_eq!(
            "remaining-display".parse(),
            Ok(ReconcilePolicy::RemainingDisplay)
        );
        assert!("manual".parse::<ReconcilePolicy>().is_err());
    }
}
