use serde::{Deserialize, Serialize};

use crate::cooldown::NotificationChannel;

/// What produced a candidate event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Actor,
    HealthCritical,
    HealthLow,
    Drowning,
    Environmental,
    Resource,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Actor => "actor",
            EventKind::HealthCritical => "health_critical",
            EventKind::HealthLow => "health_low",
            EventKind::Drowning => "drowning",
            EventKind::Environmental => "environmental",
            EventKind::Resource => "resource",
        }
    }

    pub fn channel(&self) -> NotificationChannel {
        match self {
            EventKind::Resource => NotificationChannel::Resource,
            _ => NotificationChannel::Threat,
        }
    }
}

/// Candidate notification produced by a scan pass. Higher priority is more urgent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredEvent {
    pub kind: EventKind,
    pub priority: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Identifier of the actor kind or terrain that triggered the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ScoredEvent {
    pub fn new(kind: EventKind, priority: i32, message: impl Into<String>) -> Self {
        Self {
            kind,
            priority,
            message: message.into(),
            distance: None,
            source: None,
        }
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

/// Stable sort, most urgent first. Equal priorities keep discovery order.
pub fn sort_by_priority(events: &mut [ScoredEvent]) {
    events.sort_by(|left, right| right.priority.cmp(&left.priority));
}
