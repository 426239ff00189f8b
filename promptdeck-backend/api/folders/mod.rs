pub mod handlers;

use axum::routing::{get, put};
use axum::Router;

use crate::api::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/folders", get(handlers::list_folders).post(handlers::create_folder))
        .route(
            "/folders/{id}",
            put(handlers::rename_folder)
                .get(handlers::get_folder)
                .delete(handlers::delete_folder),
        )
}
