use anyhow::Result;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use engine::catalog::load_catalog;
use engine::{PreferenceQuery, RecommendConfig, Recommender, SimilarityConfig, VehicleView};
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub const SEATING_CHOICES: [u32; 3] = [4, 5, 7];
pub const ENGINE_CHOICES: [&str; 5] = ["Petrol", "Diesel", "Hybrid", "Electric", "Any"];

/// Raw form fields; absent fields fall back to the form defaults.
#[derive(Debug, Default, Deserialize)]
pub struct RecommendParams {
    pub budget: Option<f64>,
    pub seating: Option<u32>,
    pub mileage: Option<f64>,
    pub engine_type: Option<String>,
}

impl RecommendParams {
    fn is_empty(&self) -> bool {
        self.budget.is_none() && self.seating.is_none() && self.mileage.is_none() && self.engine_type.is_none()
    }

    /// Checks the form ranges and maps "Any" to the empty engine filter.
    pub fn validate(&self) -> Result<PreferenceQuery, String> {
        let budget = self.budget.unwrap_or(15.0);
        let seating = self.seating.unwrap_or(SEATING_CHOICES[0]);
        let mileage = self.mileage.unwrap_or(15.0);
        let engine = self.engine_type.as_deref().unwrap_or(ENGINE_CHOICES[0]);

        if !(5.0..=50.0).contains(&budget) {
            return Err(format!("budget must be between 5 and 50, got {budget}"));
        }
        if !SEATING_CHOICES.contains(&seating) {
            return Err(format!("seating must be one of {SEATING_CHOICES:?}, got {seating}"));
        }
        if !(10.0..=30.0).contains(&mileage) {
            return Err(format!("mileage must be between 10 and 30, got {mileage}"));
        }
        let engine = ENGINE_CHOICES
            .iter()
            .find(|e| e.eq_ignore_ascii_case(engine))
            .ok_or_else(|| format!("engine_type must be one of {ENGINE_CHOICES:?}, got {engine:?}"))?;
        let engine = if *engine == "Any" { "" } else { engine };
        Ok(PreferenceQuery::new(budget, seating, mileage, engine))
    }
}

#[derive(Serialize)]
pub struct RecommendResponse {
    pub query: PreferenceQuery,
    pub total_matches: usize,
    pub took_s: f64,
    pub results: Vec<VehicleView>,
}

#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
}

impl AppState {
    /// Loads and normalizes the catalog once; handlers only read it.
    pub fn load<P: AsRef<std::path::Path>>(catalog: P) -> Result<Self> {
        let records = load_catalog(catalog)?;
        let recommender = Recommender::build(records, RecommendConfig::default(), SimilarityConfig::default());
        Ok(Self { recommender: Arc::new(recommender) })
    }

    pub fn num_models(&self) -> usize {
        self.recommender.catalog().len()
    }
}

pub fn build_app<P: AsRef<std::path::Path>>(catalog: P) -> Result<Router> {
    Ok(router(AppState::load(catalog)?))
}

pub fn router(app_state: AppState) -> Router {

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val.split(',').filter_map(|s| s.trim().parse().ok()).collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    let app = Router::new()
        .route("/", get(form_handler))
        .route("/health", get(|| async { "ok" }))
        .route("/recommend", get(recommend_handler))
        .route("/vehicle/:index", get(vehicle_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());
    app
}

fn rank(rec: &Recommender, query: PreferenceQuery) -> RecommendResponse {
    let start = std::time::Instant::now();
    let mut rng = rand::thread_rng();
    let (total_matches, ranked) = rec.recommend_with_total(&query, &mut rng);
    let results: Vec<VehicleView> = ranked.iter().map(VehicleView::from).collect();
    let took_s = start.elapsed().as_secs_f64();
    tracing::debug!(?query, total_matches, returned = results.len(), took_s, "recommend");
    RecommendResponse { query, total_matches, took_s, results }
}

pub async fn recommend_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> Result<Json<RecommendResponse>, (StatusCode, String)> {
    let query = params.validate().map_err(|msg| (StatusCode::BAD_REQUEST, msg))?;
    Ok(Json(rank(&state.recommender, query)))
}

pub async fn vehicle_handler(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<VehicleView>, (StatusCode, String)> {
    state
        .recommender
        .vehicle(index)
        .map(|v| Json(VehicleView::from_record(v).with_index(index)))
        .ok_or((StatusCode::NOT_FOUND, format!("no vehicle {index}")))
}

pub async fn form_handler(
    State(state): State<AppState>,
    Query(params): Query<RecommendParams>,
) -> (StatusCode, Html<String>) {
    if params.is_empty() {
        return (StatusCode::OK, Html(render_page(&params, None)));
    }
    match params.validate() {
        Ok(query) => {
            let response = rank(&state.recommender, query);
            (StatusCode::OK, Html(render_page(&params, Some(Ok(&response.results)))))
        }
        Err(msg) => (StatusCode::BAD_REQUEST, Html(render_page(&params, Some(Err(msg))))),
    }
}

fn render_page(params: &RecommendParams, outcome: Option<Result<&Vec<VehicleView>, String>>) -> String {
    let mut page = String::from(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>Car Recommendation System</title></head><body>\n\
         <h1>Car Recommendation System</h1>\n<h3>Find the perfect model for you!</h3>\n",
    );
    let budget = params.budget.unwrap_or(15.0);
    let mileage = params.mileage.unwrap_or(15.0);
    let seating = params.seating.unwrap_or(SEATING_CHOICES[0]);
    let engine = params.engine_type.as_deref().unwrap_or(ENGINE_CHOICES[0]);

    page.push_str("<form method=\"get\" action=\"/\">\n");
    let _ = writeln!(page, "<label>Budget <input type=\"number\" name=\"budget\" min=\"5\" max=\"50\" value=\"{budget}\"></label>");
    page.push_str("<label>Seating Capacity <select name=\"seating\">");
    for s in SEATING_CHOICES {
        let selected = if s == seating { " selected" } else { "" };
        let _ = write!(page, "<option{selected}>{s}</option>");
    }
    page.push_str("</select></label>\n");
    let _ = writeln!(page, "<label>Minimum Mileage <input type=\"number\" name=\"mileage\" min=\"10\" max=\"30\" value=\"{mileage}\"></label>");
    page.push_str("<label>Preferred Engine Type <select name=\"engine_type\">");
    for e in ENGINE_CHOICES {
        let selected = if e.eq_ignore_ascii_case(engine) { " selected" } else { "" };
        let _ = write!(page, "<option{selected}>{e}</option>");
    }
    page.push_str("</select></label>\n<button type=\"submit\">Recommend</button>\n</form>\n");

    match outcome {
        None => {}
        Some(Err(msg)) => {
            let _ = writeln!(page, "<p class=\"error\">{}</p>", escape_html(&msg));
        }
        Some(Ok(results)) if results.is_empty() => {
            page.push_str("<p class=\"warning\">No matching cars found. Try adjusting your preferences.</p>\n");
        }
        Some(Ok(results)) => {
            for v in results {
                let _ = writeln!(page, "<h2>{}</h2>", escape_html(&v.model_name));
                let _ = writeln!(page, "<p><b>Price:</b> {:.2}</p>", v.price);
                let _ = writeln!(page, "<p><b>Mileage:</b> {:.1}</p>", v.mileage);
                let _ = writeln!(page, "<p><b>Seating:</b> {}</p>", v.seating);
                let _ = writeln!(page, "<p><b>Engine Type:</b> {}</p>", escape_html(&v.engine_type));
                let _ = writeln!(page, "<p><b>Features:</b> {}</p>\n<hr>", escape_html(&v.features));
            }
        }
    }
    page.push_str("</body></html>\n");
    page
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
