//! In-memory state of the valuation form: participant name, the three room
//! fields as typed text, and which fields the user has pinned.

use shared::{
    domain::{format_amount, RoomId, RoomValuation, ROOM_COUNT},
    protocol::SubmitRequest,
};

use crate::{
    error::ClientError,
    reconcile::{self, ReconcilePolicy, Remaining, MAX_ANCHORS},
};

/// Character range selected in a field, as produced by focusing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
pub struct ValuationForm {
    total_rent: f64,
    policy: ReconcilePolicy,
    name: String,
    fields: [String; ROOM_COUNT],
    /// User-edited rooms holding a value, oldest first.
    anchors: Vec<RoomId>,
    focused: Option<RoomId>,
}

impl ValuationForm {
    pub fn new(total_rent: f64, policy: ReconcilePolicy) -> Self {
        Self {
            total_rent,
            policy,
            name: String::new(),
            fields: initial_fields(total_rent, policy),
            anchors: Vec::new(),
            focused: None,
        }
    }

    pub fn total_rent(&self) -> f64 {
        self.total_rent
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn field(&self, room: RoomId) -> &str {
        &self.fields[room.index()]
    }

    pub fn fields(&self) -> &[String; ROOM_COUNT] {
        &self.fields
    }

    pub fn value(&self, room: RoomId) -> Option<f64> {
        reconcile::parse_amount(self.field(room))
    }

    /// Rooms whose field currently holds a number.
    pub fn valuations(&self) -> Vec<RoomValuation> {
        RoomId::ALL
            .into_iter()
            .filter_map(|room| self.value(room).map(|amount| RoomValuation { room, amount }))
            .collect()
    }

    pub fn anchors(&self) -> &[RoomId] {
        &self.anchors
    }

    pub fn focused(&self) -> Option<RoomId> {
        self.focused
    }

    pub fn remaining(&self) -> Remaining {
        Remaining::new(self.total_rent, RoomId::ALL.map(|room| self.value(room)))
    }

    /// Applies one input event to a room field and reconciles the others.
    pub fn edit(&mut self, room: RoomId, text: &str) {
        self.fields[room.index()] = reconcile::clamp_input(text);

        if self.policy == ReconcilePolicy::RemainingDisplay {
            return;
        }

        self.anchors.retain(|anchor| *anchor != room);
        if self.value(room).is_some() {
            self.anchors.push(room);
        }
        if self.anchors.len() > MAX_ANCHORS {
            let excess = self.anchors.len() - MAX_ANCHORS;
            self.anchors.drain(..excess);
        }
        self.rebalance();
    }

    /// Focusing a field selects all of its text for overwriting.
    pub fn focus(&mut self, room: RoomId) -> TextSelection {
        self.focused = Some(room);
        TextSelection {
            start: 0,
            end: self.field(room).chars().count(),
        }
    }

    /// Back to the state of a freshly loaded page.
    pub fn clear(&mut self) {
        self.name.clear();
        self.fields = initial_fields(self.total_rent, self.policy);
        self.anchors.clear();
        self.focused = None;
    }

    pub fn submit_request(&self) -> Result<SubmitRequest, ClientError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ClientError::Validation("Please enter your name".to_string()));
        }
        Ok(SubmitRequest {
            name: name.to_string(),
            values: RoomId::ALL.map(|room| self.value(room)),
        })
    }

    fn rebalance(&mut self) {
        let pinned: Vec<(RoomId, f64)> = self
            .anchors
            .iter()
            .filter_map(|room| self.value(*room).map(|value| (*room, value)))
            .collect();

        let derived = reconcile::auto_balance(self.total_rent, &pinned);
        for room in RoomId::ALL {
            if let Some(value) = derived[room.index()] {
                self.fields[room.index()] = format_amount(value);
            }
        }
    }
}

fn initial_fields(total_rent: f64, policy: ReconcilePolicy) -> [String; ROOM_COUNT] {
    match policy {
        ReconcilePolicy::AutoBalance => reconcile::auto_balance(total_rent, &[])
            .map(|share| share.map(format_amount).unwrap_or_default()),
        ReconcilePolicy::RemainingDisplay => Default::default(),
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
