use crate::present::{ChatReply, ListingView, SearchPage};
use actix_cors::Cors;
use actix_files::Files;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use estately_core::{Error, HybridResolver, SearchOutcome};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    limit: Option<usize>,
}

#[derive(Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

/// Where to listen and what to serve besides the API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            static_dir: None,
        }
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(resolver: Arc<HybridResolver>, config: ApiConfig) -> std::io::Result<()> {
        let static_dir = config.static_dir.clone();

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            let resolver = resolver.clone();
            let static_dir = static_dir.clone();
            App::new()
                .wrap(cors)
                .configure(move |cfg| configure(cfg, resolver, static_dir))
        })
        .bind((config.host.as_str(), config.port))?
        .run()
        .await
    }
}

/// Register routes and shared state on an app
pub fn configure(
    cfg: &mut web::ServiceConfig,
    resolver: Arc<HybridResolver>,
    static_dir: Option<PathBuf>,
) {
    cfg.app_data(web::Data::new(resolver))
        .route("/", web::get().to(index))
        .route("/search", web::get().to(search))
        .route("/api/chat", web::post().to(chat));

    if let Some(dir) = static_dir {
        cfg.service(Files::new("/static", dir));
    }
}

fn error_response(err: &Error) -> HttpResponse {
    let message = match err {
        Error::EmptyInput(message) => message.clone(),
        other => other.to_string(),
    };

    if err.is_client_error() {
        HttpResponse::BadRequest().json(serde_json::json!({ "error": message }))
    } else {
        error!("request failed: {}", err);
        HttpResponse::InternalServerError().json(serde_json::json!({ "error": message }))
    }
}

fn search_page<'a>(resolver: &'a HybridResolver, outcome: &SearchOutcome) -> SearchPage<'a> {
    SearchPage {
        query: outcome.query.clone(),
        strategy: outcome.strategy,
        count: outcome.len(),
        properties: outcome
            .hits
            .iter()
            .map(|hit| ListingView {
                listing: resolver.listing(hit),
                score: hit.score,
            })
            .collect(),
    }
}

async fn index(resolver: web::Data<Arc<HybridResolver>>) -> ActixResult<HttpResponse> {
    let outcome = resolver.browse(resolver.config().default_limit);
    let page = search_page(&resolver, &outcome);
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "properties": page.properties
    })))
}

async fn search(
    resolver: web::Data<Arc<HybridResolver>>,
    params: web::Query<SearchParams>,
) -> ActixResult<HttpResponse> {
    let SearchParams { q, limit } = params.into_inner();
    let limit = limit.unwrap_or(resolver.config().default_limit);

    // query encoding blocks
    let engine = resolver.get_ref().clone();
    let outcome = web::block(move || engine.search(&q, limit)).await?;

    match outcome {
        Ok(outcome) => Ok(HttpResponse::Ok().json(search_page(&resolver, &outcome))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn chat(
    resolver: web::Data<Arc<HybridResolver>>,
    req: Option<web::Json<ChatRequest>>,
) -> ActixResult<HttpResponse> {
    let message = req.map(|r| r.into_inner().message).unwrap_or_default();

    let engine = resolver.get_ref().clone();
    let outcome = web::block(move || engine.chat(&message)).await?;

    match outcome {
        Ok(outcome) => Ok(HttpResponse::Ok().json(ChatReply::new(
            &outcome.query,
            resolver.listings(&outcome),
        ))),
        Err(e) => Ok(error_response(&e)),
    }
}
