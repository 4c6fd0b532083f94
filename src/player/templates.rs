use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use crate::error::PlayerError;

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub title: String,
    pub song_count: usize,
    pub listener_count: usize,
}

/// Makes returning IndexTemplate returnable as an axum response
impl IntoResponse for IndexTemplate {
    fn into_response(self) -> Response {
        match self.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => PlayerError::from(e).into_response(),
        }
    }
}
