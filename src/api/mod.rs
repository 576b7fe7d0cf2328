//! All API endpoint setup

use axum::Router;
use axum::routing::get;
use axum::routing::post;

pub use request::NoteForm;
pub use request::NoteIdentifier;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Success;

mod notes;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router() -> Router {
    let notes = Router::new()
        .route("/", post(notes::create))
        .route("/{note}", get(notes::single));

    Router::new().nest("/notes", notes)
}

/// Anything that is not an API route
pub async fn not_found() -> Error {
    Error::not_found("Not found")
}
