//! Moment entity - ephemeral story content with a fixed 24h lifetime

use chrono::{DateTime, Duration, Utc};

use crate::value_objects::DocId;

pub const MOMENT_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moment {
    pub id: DocId,
    pub author_id: DocId,
    pub media_url: Option<String>,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Moment {
    pub fn new(
        author_id: DocId,
        media_url: Option<String>,
        caption: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DocId::generate(),
            author_id,
            media_url,
            caption,
            created_at: now,
            expires_at: now + Self::ttl(),
        }
    }

    #[inline]
    pub fn ttl() -> Duration {
        Duration::hours(MOMENT_TTL_HOURS)
    }

    /// Expired moments are hidden from reads once `expires_at <= now`
    #[inline]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> String {
        moment_time_remaining(self.expires_at, now)
    }

    pub fn progress(&self, now: DateTime<Utc>) -> f64 {
        moment_progress(self.created_at, self.expires_at, now)
    }
}

/// Human-readable remaining lifetime: `"5h 12m"`, `"42m"`, `"<1m"` or `"expired"`
pub fn moment_time_remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = expires_at - now;
    if left <= Duration::zero() {
        return "expired".to_string();
    }
    let hours = left.num_hours();
    let minutes = left.num_minutes() % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m")
    } else {
        "<1m".to_string()
    }
}

/// Elapsed fraction of the lifetime, clamped to `[0, 1]`
pub fn moment_progress(created_at: DateTime<Utc>, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let total = (expires_at - created_at).num_milliseconds();
    if total <= 0 {
        return 1.0;
    }
    let elapsed = (now - created_at).num_milliseconds();
    (elapsed as f64 / total as f64).clamp(0.0, 1.0)
}
