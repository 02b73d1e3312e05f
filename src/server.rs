use std::sync::Arc;

use axum::Router;
use axum::extract::{Form, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;

use crate::pipeline::{PageView, Pipeline};
use crate::render::render_page;

#[derive(Debug, Default, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub url: String,
}

/// The one route: GET shows the form, POST summarizes the submitted URL
pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new().route("/", get(index).post(submit)).with_state(pipeline)
}

async fn index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

async fn submit(State(pipeline): State<Arc<Pipeline>>, Form(form): Form<SubmitForm>) -> Html<String> {
    let view = pipeline.handle_submission(&form.url).await;
    Html(render_page(&view))
}
