//! Render models for the progress indicator and the results section.

use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime};
use shared::domain::{format_amount, Assignment, Submission, PARTICIPANT_COUNT};

const TIMESTAMP_DISPLAY: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEntry {
    pub name: String,
    pub submitted: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressView {
    pub count: usize,
    pub entries: Vec<SubmissionEntry>,
}

impl ProgressView {
    pub fn from_submissions(submissions: &[Submission]) -> Self {
        Self {
            count: submissions.len(),
            entries: submissions
                .iter()
                .map(|submission| SubmissionEntry {
                    name: submission.name.clone(),
                    submitted: human_timestamp(&submission.timestamp),
                })
                .collect(),
        }
    }

    /// Width of the progress bar in percent.
    pub fn bar_percent(&self) -> f64 {
        self.count.min(PARTICIPANT_COUNT) as f64 / PARTICIPANT_COUNT as f64 * 100.0
    }

    pub fn label(&self) -> String {
        format!("{}/{}", self.count, PARTICIPANT_COUNT)
    }

    pub fn list_visible(&self) -> bool {
        self.count > 0
    }

    pub fn is_complete(&self) -> bool {
        self.count == PARTICIPANT_COUNT
    }
}

impl fmt::Display for ProgressView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const BAR_WIDTH: usize = 30;
        let filled = (self.bar_percent() / 100.0 * BAR_WIDTH as f64).round() as usize;
        writeln!(
            f,
            "[{}{}] {} submitted",
            "#".repeat(filled),
            "-".repeat(BAR_WIDTH - filled),
            self.label()
        )?;
        if self.list_visible() {
            for entry in &self.entries {
                writeln!(f, "  {} (submitted {})", entry.name, entry.submitted)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentCard {
    pub person: String,
    pub room: String,
    pub valuation: String,
    pub rent: String,
}

impl From<&Assignment> for AssignmentCard {
    fn from(assignment: &Assignment) -> Self {
        Self {
            person: assignment.person.clone(),
            room: assignment.room.clone(),
            valuation: format_amount(assignment.valuation),
            rent: format_amount(assignment.rent),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultsView {
    pub visible: bool,
    pub method: String,
    pub explanation: String,
    pub cards: Vec<AssignmentCard>,
    pub reset_visible: bool,
}

impl ResultsView {
    pub fn shown(method: String, explanation: String, assignments: &[Assignment]) -> Self {
        Self {
            visible: true,
            method,
            explanation,
            cards: assignments.iter().map(AssignmentCard::from).collect(),
            reset_visible: true,
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.visible {
            return Ok(());
        }
        writeln!(f, "Method: {}", self.method)?;
        if !self.explanation.is_empty() {
            writeln!(f, "{}", self.explanation)?;
        }
        for card in &self.cards {
            writeln!(f)?;
            writeln!(f, "{}", card.person)?;
            writeln!(f, "  Assigned to: {}", card.room)?;
            writeln!(f, "  Valuation: ${}", card.valuation)?;
            writeln!(f, "  Rent: ${}", card.rent)?;
        }
        Ok(())
    }
}

/// Renders a server timestamp for people. Zoned timestamps are shown in local
/// time; naive ones are shown as given; anything else is passed through.
pub fn human_timestamp(raw: &str) -> String {
    if let Ok(zoned) = DateTime::parse_from_rfc3339(raw) {
        return zoned
            .with_timezone(&Local)
            .format(TIMESTAMP_DISPLAY)
            .to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive.format(TIMESTAMP_DISPLAY).to_string(),
        Err(_) => raw.to_string(),
    }
}
