use axum::{http::header, response::IntoResponse};

pub async fn route() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "cinemabot is running",
    )
}
