//! Route definitions
//!
//! Domain routes are mounted under /api; health probes sit at the root.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::handlers::{ads, analytics, comments, health, moments, notifications, posts, reactions};
use crate::state::AppState;

/// Main API router (health routes are separate so they bypass rate limiting)
pub fn create_router() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

/// Liveness and readiness probes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(ad_routes())
        .merge(analytics_routes())
        .merge(reaction_routes())
        .merge(post_routes())
        .merge(moment_routes())
        .merge(notification_routes())
}

fn ad_routes() -> Router<AppState> {
    Router::new()
        .route("/ads", get(ads::list_ads).post(ads::create_ad))
        .route(
            "/ads/:ad_id",
            get(ads::get_ad)
                .put(ads::update_ad)
                .delete(ads::delete_ad)
                .patch(ads::apply_ad_action),
        )
}

fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/analytics/events",
            get(analytics::list_events).post(analytics::track_event),
        )
        .route("/analytics/summary", get(analytics::summary))
}

fn reaction_routes() -> Router<AppState> {
    Router::new()
        .route("/reactions/:target/:parent_id", get(reactions::get_reactions))
        .route(
            "/reactions/:target/:parent_id/@me",
            put(reactions::set_reaction).delete(reactions::clear_reaction),
        )
        .route(
            "/reactions/:target/:parent_id/@me/toggle",
            post(reactions::toggle_reaction),
        )
}

fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/:post_id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/comments/:comment_id", delete(comments::delete_comment))
}

fn moment_routes() -> Router<AppState> {
    Router::new()
        .route("/moments", get(moments::list_moments).post(moments::create_moment))
        .route("/moments/:moment_id", get(moments::get_moment))
}

fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(notifications::list_notifications))
        .route(
            "/notifications/:notification_id/read",
            post(notifications::mark_read),
        )
}
