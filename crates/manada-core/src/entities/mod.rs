//! Domain entities - core business objects

mod ad;
mod analytics;
mod document;
mod marker;
mod moment;
mod notification;

pub use ad::{Ad, AdAction, AdStatus, AdUpdate};
pub use analytics::AnalyticsEvent;
pub use document::Document;
pub use marker::UserMarker;
pub use moment::{moment_progress, moment_time_remaining, Moment, MOMENT_TTL_HOURS};
pub use notification::NotificationEvent;
