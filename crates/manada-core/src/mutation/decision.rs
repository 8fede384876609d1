//! Toggle decision - turns a user intent plus the current marker into add/change/remove

use serde::Serialize;

use crate::entities::NotificationEvent;
use crate::value_objects::ReactionKind;

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleIntent {
    /// Flip: add if absent, remove if present (or switch kind on palettes)
    Toggle(ReactionKind),
    /// Ensure a marker of this kind exists
    Set(ReactionKind),
    /// Ensure no marker exists
    Clear,
}

impl ToggleIntent {
    pub fn kind(&self) -> Option<&ReactionKind> {
        match self {
            Self::Toggle(kind) | Self::Set(kind) => Some(kind),
            Self::Clear => None,
        }
    }
}

/// Resolved mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ToggleDecision {
    Add { kind: ReactionKind },
    ChangeKind { from: ReactionKind, to: ReactionKind },
    Remove { kind: ReactionKind },
    Noop,
}

impl ToggleDecision {
    /// Decide from the marker as seen at decision time.
    ///
    /// A `Clear` without a marker is a no-op, so a counter is never
    /// decremented for a reaction that was never counted.
    pub fn decide(
        existing: Option<&ReactionKind>,
        intent: &ToggleIntent,
        allows_kind_change: bool,
    ) -> Self {
        match (existing, intent) {
            (None, ToggleIntent::Toggle(kind) | ToggleIntent::Set(kind)) => {
                Self::Add { kind: kind.clone() }
            }
            (None, ToggleIntent::Clear) => Self::Noop,
            (Some(current), ToggleIntent::Toggle(kind)) => {
                if allows_kind_change && current != kind {
                    Self::ChangeKind {
                        from: current.clone(),
                        to: kind.clone(),
                    }
                } else {
                    Self::Remove {
                        kind: current.clone(),
                    }
                }
            }
            (Some(current), ToggleIntent::Set(kind)) => {
                if allows_kind_change && current != kind {
                    Self::ChangeKind {
                        from: current.clone(),
                        to: kind.clone(),
                    }
                } else {
                    Self::Noop
                }
            }
            (Some(current), ToggleIntent::Clear) => Self::Remove {
                kind: current.clone(),
            },
        }
    }

    /// Counter delta implied by the decision
    pub fn counter_delta(&self) -> i64 {
        match self {
            Self::Add { .. } => 1,
            Self::Remove { .. } => -1,
            Self::ChangeKind { .. } | Self::Noop => 0,
        }
    }

    /// Marker kind after the decision is applied
    pub fn resulting_kind(&self, existing: Option<&ReactionKind>) -> Option<ReactionKind> {
        match self {
            Self::Add { kind } | Self::ChangeKind { to: kind, .. } => Some(kind.clone()),
            Self::Remove { .. } => None,
            Self::Noop => existing.cloned(),
        }
    }

    #[inline]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::ChangeKind { .. } => "change_kind",
            Self::Remove { .. } => "remove",
            Self::Noop => "noop",
        }
    }
}

/// Result of a persisted toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub decision: ToggleDecision,
    /// Authoritative counter value after the write
    pub count: i64,
    /// The user's marker kind after the write
    pub kind: Option<ReactionKind>,
    pub notification: Option<NotificationEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(s: &str) -> ReactionKind {
        ReactionKind::parse(s).unwrap()
    }

    #[test]
    fn test_toggle_without_marker_adds() {
        let d = ToggleDecision::decide(None, &ToggleIntent::Toggle(kind("like")), false);
        assert_eq!(d, ToggleDecision::Add { kind: kind("like") });
        assert_eq!(d.counter_delta(), 1);
    }

    #[test]
    fn test_toggle_with_marker_removes() {
        let like = kind("like");
        let d = ToggleDecision::decide(Some(&like), &ToggleIntent::Toggle(like.clone()), false);
        assert_eq!(d, ToggleDecision::Remove { kind: like });
        assert_eq!(d.counter_delta(), -1);
        assert_eq!(d.resulting_kind(None), None);
    }

    #[test]
    fn test_palette_switch_changes_kind_only() {
        let heart = kind("❤️");
        let paw = kind("🐾");
        let d = ToggleDecision::decide(Some(&heart), &ToggleIntent::Toggle(paw.clone()), true);
        assert_eq!(
            d,
            ToggleDecision::ChangeKind {
                from: heart.clone(),
                to: paw.clone()
            }
        );
        assert_eq!(d.counter_delta(), 0);
        assert_eq!(d.resulting_kind(Some(&heart)), Some(paw));
    }

    #[test]
    fn test_non_palette_never_changes_kind() {
        let like = kind("like");
        let other = kind("other");
        let d = ToggleDecision::decide(Some(&like), &ToggleIntent::Toggle(other.clone()), false);
        assert_eq!(d, ToggleDecision::Remove { kind: like.clone() });

        let d = ToggleDecision::decide(Some(&like), &ToggleIntent::Set(other), false);
        assert!(d.is_noop());
    }

    #[test]
    fn test_clear_without_marker_is_noop() {
        let d = ToggleDecision::decide(None, &ToggleIntent::Clear, false);
        assert!(d.is_noop());
        assert_eq!(d.counter_delta(), 0);
    }

    #[test]
    fn test_set_is_idempotent() {
        let like = kind("like");
        let d = ToggleDecision::decide(Some(&like), &ToggleIntent::Set(like.clone()), true);
        assert!(d.is_noop());
        assert_eq!(d.resulting_kind(Some(&like)), Some(like));
    }

    #[test]
    fn test_decision_serializes_tagged() {
        let d = ToggleDecision::Add { kind: kind("like") };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["decision"], "add");
        assert_eq!(json["kind"], "like");
    }
}
