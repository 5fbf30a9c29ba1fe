pub mod comments;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod likes;
pub mod playlists;
pub mod response;
pub mod subscriptions;
pub mod users;
pub mod videos;

use actix_web::web;
use uuid::Uuid;

use crate::error::ApiError;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(users::configure)
            .configure(videos::configure)
            .configure(comments::configure)
            .configure(likes::configure)
            .configure(subscriptions::configure)
            .configure(playlists::configure)
            .configure(dashboard::configure)
            .configure(health::configure),
    );
}

/// Path identifiers come in as text; a malformed one is a `BadRequest`,
/// never a store lookup.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {what} id")))
}
