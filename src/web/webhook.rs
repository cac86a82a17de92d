use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::debug;

use crate::{bot::telegram::Update, web::AppBot};

pub async fn route(State(bot): State<AppBot>, Json(update): Json<Update>) -> impl IntoResponse {
    match bot.handle_update(update).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        None => {
            debug!("nothing to reply to");
            StatusCode::OK.into_response()
        }
    }
}
