use crate::{
    config::Config,
    generate::{GenerateError, SentenceGenerator},
    recommend::{RecommendError, RecommendService},
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
struct SharedState {
    service: Arc<RecommendService>,
    generator: Arc<SentenceGenerator>,
    default_k: usize,
}

/// Build the API router over a ready (index built) recommendation service.
pub fn app(
    service: Arc<RecommendService>,
    generator: Arc<SentenceGenerator>,
    default_k: usize,
) -> Router {
    let shared_state = Arc::new(SharedState {
        service,
        generator,
        default_k,
    });

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/initial-words", get(initial_words))
        .route("/api/recommend", post(recommend))
        .route("/api/generate", post(generate))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(shared_state)
}

async fn start_app(service: RecommendService, generator: SentenceGenerator, config: Config) {
    let app = app(
        Arc::new(service),
        Arc::new(generator),
        config.recommend.default_k,
    );

    let listener = tokio::net::TcpListener::bind(&config.server.listen)
        .await
        .unwrap();
    log::info!("listening on {}", config.server.listen);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

pub fn start_daemon(service: RecommendService, generator: SentenceGenerator, config: Config) {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async { start_app(service, generator, config).await });
}

// Wrapper so `?` converts service errors into HTTP responses.
#[derive(Debug)]
enum HttpError {
    Recommend(RecommendError),
    Generate(GenerateError),
}

impl From<RecommendError> for HttpError {
    fn from(err: RecommendError) -> Self {
        Self::Recommend(err)
    }
}

impl From<GenerateError> for HttpError {
    fn from(err: GenerateError) -> Self {
        Self::Generate(err)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        match self {
            HttpError::Recommend(err @ RecommendError::InvalidRequest(_)) => (
                axum::http::StatusCode::BAD_REQUEST,
                json!({"error": err.to_string()}).to_string(),
            ),
            HttpError::Recommend(err @ RecommendError::Embedding(_)) => {
                log::error!("{err:?}");
                (
                    axum::http::StatusCode::SERVICE_UNAVAILABLE,
                    json!({"error": err.to_string()}).to_string(),
                )
            }
            HttpError::Recommend(err) => {
                log::error!("{err:?}");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": err.to_string()}).to_string(),
                )
            }
            HttpError::Generate(err @ GenerateError::EmptyWords) => (
                axum::http::StatusCode::BAD_REQUEST,
                json!({"error": err.to_string()}).to_string(),
            ),
            HttpError::Generate(err @ GenerateError::Unreachable { .. }) => {
                log::error!("{err:?}");
                (
                    axum::http::StatusCode::SERVICE_UNAVAILABLE,
                    json!({"error": err.to_string()}).to_string(),
                )
            }
            HttpError::Generate(err) => {
                log::error!("{err:?}");
                (
                    axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                    json!({"error": err.to_string()}).to_string(),
                )
            }
        }
        .into_response()
    }
}

async fn root(State(state): State<Arc<SharedState>>) -> Json<serde_json::Value> {
    Json(json!({
        "service": "wordcue",
        "status": "running",
        "vocabulary_size": state.service.vocabulary().len(),
        "index_ready": state.service.is_built(),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy"}))
}

#[derive(Debug, Serialize)]
struct InitialWordsResponse {
    words: Vec<String>,
}

async fn initial_words(
    State(state): State<Arc<SharedState>>,
) -> Result<Json<InitialWordsResponse>, HttpError> {
    Ok(Json(InitialWordsResponse {
        words: state.service.initial_words(state.default_k),
    }))
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendRequest {
    pub word: String,

    /// Words already accepted into the sentence, oldest first.
    #[serde(default)]
    pub context: Vec<String>,

    /// Additional words to keep out of the result.
    #[serde(default)]
    pub exclude_words: Vec<String>,

    pub k: Option<usize>,

    /// The sentence is crossing a topic boundary; sample across categories
    /// instead of running the similarity funnel.
    #[serde(default)]
    pub diverse: bool,
}

#[derive(Debug, Serialize)]
struct RecommendResponse {
    recommendations: Vec<String>,
}

async fn recommend(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, HttpError> {
    log::debug!("payload: {payload:?}");

    let service = state.service.clone();
    let default_k = state.default_k;

    tokio::task::block_in_place(move || {
        let k = payload.k.unwrap_or(default_k);

        let recommendations = if payload.diverse {
            service.recommend_diverse(k, &payload.exclude_words, &mut rand::rng())?
        } else if !service.word_exists(&payload.word) {
            // Unknown words cannot seed the funnel; offer starters instead.
            service.initial_words(k)
        } else {
            service.recommend(
                &payload.word,
                k,
                &payload.context,
                &payload.exclude_words,
                &mut rand::rng(),
            )?
        };

        Ok(Json(RecommendResponse { recommendations }))
    })
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub words: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GenerateResponse {
    sentence: String,
}

async fn generate(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, HttpError> {
    log::debug!("generate payload: {:?}", payload.words);

    let generator = state.generator.clone();

    tokio::task::block_in_place(move || {
        let sentence = generator.generate_sentence(&payload.words)?;
        Ok(Json(GenerateResponse { sentence }))
    })
}
