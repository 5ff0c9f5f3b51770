use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Mentee,
    Mentor,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Mentee => write!(f, "mentee"),
            UserRole::Mentor => write!(f, "mentor"),
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mentee" => Ok(UserRole::Mentee),
            "mentor" => Ok(UserRole::Mentor),
            other => Err(format!("unknown user role: {other}")),
        }
    }
}

/// Session lifecycle states. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl SessionStatus {
    /// Legal edges of the lifecycle graph:
    /// pending -> confirmed | cancelled, confirmed -> completed | cancelled.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Cancelled)
    }

    /// Listing order: pending < confirmed < completed < cancelled.
    pub fn priority(self) -> u8 {
        match self {
            SessionStatus::Pending => 1,
            SessionStatus::Confirmed => 2,
            SessionStatus::Completed => 3,
            SessionStatus::Cancelled => 4,
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStatus::Pending => write!(f, "pending"),
            SessionStatus::Confirmed => write!(f, "confirmed"),
            SessionStatus::Completed => write!(f, "completed"),
            SessionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for SessionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SessionStatus::Pending),
            "confirmed" => Ok(SessionStatus::Confirmed),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            other => Err(format!("unknown session status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SessionCreated,
    SessionConfirmed,
    SessionCancelled,
    SessionCompleted,
    FeedbackReceived,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::SessionCreated => write!(f, "session_created"),
            NotificationKind::SessionConfirmed => write!(f, "session_confirmed"),
            NotificationKind::SessionCancelled => write!(f, "session_cancelled"),
            NotificationKind::SessionCompleted => write!(f, "session_completed"),
            NotificationKind::FeedbackReceived => write!(f, "feedback_received"),
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session_created" => Ok(NotificationKind::SessionCreated),
            "session_confirmed" => Ok(NotificationKind::SessionConfirmed),
            "session_cancelled" => Ok(NotificationKind::SessionCancelled),
            "session_completed" => Ok(NotificationKind::SessionCompleted),
            "feedback_received" => Ok(NotificationKind::FeedbackReceived),
            other => Err(format!("unknown notification kind: {other}")),
        }
    }
}

/// A mentor's recurring weekly template of bookable windows.
///
/// Index 0 is Sunday through index 6 Saturday. A day with no windows means
/// nothing has been declared for that day; an explicit window with
/// `available == false` is a declared-but-closed slot, which is a different
/// thing for the booking UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySlots {
    pub days: [DaySchedule; 7],
}

impl WeeklySlots {
    pub fn for_weekday(&self, weekday: Weekday) -> &DaySchedule {
        &self.days[weekday.num_days_from_sunday() as usize]
    }

    pub fn for_weekday_mut(&mut self, weekday: Weekday) -> &mut DaySchedule {
        &mut self.days[weekday.num_days_from_sunday() as usize]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub slots: Vec<SlotWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
    pub available: bool,
}

impl SlotWindow {
    /// Display label of the window, e.g. `"18:00-19:00"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// `"HH:MM"` wire format for slot boundaries.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&raw, "%H:%M").map_err(de::Error::custom)
    }
}

// Common response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_graph_allows_only_legal_edges() {
        use SessionStatus::*;

        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(Confirmed.can_transition_to(Cancelled));

        // Completing straight from pending is rejected.
        assert!(!Pending.can_transition_to(Completed));

        // Terminal states have no outgoing edges.
        for next in [Pending, Confirmed, Completed, Cancelled] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }

        // Nothing transitions back into pending.
        for from in [Pending, Confirmed, Completed, Cancelled] {
            assert!(!from.can_transition_to(Pending));
        }
    }

    #[test]
    fn status_priority_orders_listing() {
        use SessionStatus::*;
        assert!(Pending.priority() < Confirmed.priority());
        assert!(Confirmed.priority() < Completed.priority());
        assert!(Completed.priority() < Cancelled.priority());
    }

    #[test]
    fn status_round_trips_through_storage_strings() {
        for status in [
            SessionStatus::Pending,
            SessionStatus::Confirmed,
            SessionStatus::Completed,
            SessionStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<SessionStatus>(), Ok(status));
        }
        assert!("rescheduled".parse::<SessionStatus>().is_err());
    }

    #[test]
    fn notification_kind_round_trips() {
        for kind in [
            NotificationKind::SessionCreated,
            NotificationKind::SessionConfirmed,
            NotificationKind::SessionCancelled,
            NotificationKind::SessionCompleted,
            NotificationKind::FeedbackReceived,
        ] {
            assert_eq!(kind.to_string().parse::<NotificationKind>(), Ok(kind));
        }
    }

    #[test]
    fn weekly_slots_serialize_with_hhmm_times() {
        let mut slots = WeeklySlots::default();
        slots.for_weekday_mut(Weekday::Mon).slots.push(SlotWindow {
            start: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            available: true,
        });

        let json = serde_json::to_value(&slots).unwrap();
        let monday = &json["days"][1]["slots"][0];
        assert_eq!(monday["start"], "18:00");
        assert_eq!(monday["end"], "19:00");
        assert_eq!(monday["available"], true);

        let back: WeeklySlots = serde_json::from_value(json).unwrap();
        assert_eq!(back, slots);
        assert_eq!(back.for_weekday(Weekday::Mon).slots[0].label(), "18:00-19:00");
    }

    #[test]
    fn empty_day_is_distinct_from_unavailable_window() {
        let mut slots = WeeklySlots::default();
        slots.for_weekday_mut(Weekday::Tue).slots.push(SlotWindow {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            available: false,
        });

        assert!(slots.for_weekday(Weekday::Mon).slots.is_empty());
        assert_eq!(slots.for_weekday(Weekday::Tue).slots.len(), 1);
        assert!(!slots.for_weekday(Weekday::Tue).slots[0].available);
    }
}
