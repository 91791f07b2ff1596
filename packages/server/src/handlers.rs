//! HTTP handler functions for the SASV API.
//!
//! Every handler that touches the dataset runs its work through
//! [`web::block`], since loading, hashing and training are synchronous and
//! can take seconds on the full file.

use actix_web::http::header;
use actix_web::{HttpResponse, web};
use sasv_analytics::AnalyticsError;
use sasv_analytics_models::{DistributionColumn, ExploreFilter, ExploreResult, HeatmapFilter};
use sasv_dataset::CleanTable;
use sasv_incident_models::NewIncident;
use sasv_predict_models::PredictionInput;
use sasv_server_models::{
    ApiError, ApiHealth, ApiPredictOptions, ApiPrediction, ApiProvinces, ApiRegistered,
    DistributionQueryParams, ExploreQueryParams, ExportFormat, HeatmapQueryParams, parse_months,
    split_list,
};
use sasv_session::{Session, SessionError};

use crate::AppState;

/// Maps a session failure to a status code and a message without internals.
fn session_error(e: &SessionError) -> HttpResponse {
    match e {
        SessionError::Dataset(e) => {
            log::error!("Dataset unavailable: {e}");
            HttpResponse::ServiceUnavailable().json(ApiError::new(format!("Dataset unavailable: {e}")))
        }
        SessionError::Train(e) => {
            log::warn!("Prediction unavailable: {e}");
            HttpResponse::Conflict().json(ApiError::new(format!("Prediction unavailable: {e}")))
        }
        SessionError::Analytics(AnalyticsError::Csv(_) | AnalyticsError::Io(_)) => {
            log::error!("Failed to build export: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to build export"))
        }
        SessionError::Predict(_) | SessionError::Analytics(_) | SessionError::Registration(_) => {
            HttpResponse::BadRequest().json(ApiError::new(e.to_string()))
        }
    }
}

/// Runs `f` against the session on the blocking pool.
async fn with_session<T, F>(state: &web::Data<AppState>, f: F) -> Result<T, HttpResponse>
where
    T: Send + 'static,
    F: FnOnce(&Session) -> Result<T, SessionError> + Send + 'static,
{
    let session = state.session.clone();
    match web::block(move || f(&session)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(session_error(&e)),
        Err(e) => {
            log::error!("Blocking task failed: {e}");
            Err(HttpResponse::InternalServerError().json(ApiError::new("Internal error")))
        }
    }
}

/// Year range from the request, defaulting to the data's bounds.
fn resolve_years(table: &CleanTable, from: Option<i32>, to: Option<i32>) -> (i32, i32) {
    let (min, max) = sasv_analytics::year_bounds(table).map_or((0, 0), |b| (b.min, b.max));
    (from.unwrap_or(min), to.unwrap_or(max))
}

fn csv_attachment(filename: &str, body: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ))
        .body(body)
}

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/provinces`
///
/// Lists the provinces in the data and the years it covers.
pub async fn provinces(state: web::Data<AppState>) -> HttpResponse {
    let result = with_session(&state, |session| {
        let table = session.table()?;
        Ok(ApiProvinces {
            provinces: sasv_analytics::provinces(&table),
            years: sasv_analytics::year_bounds(&table),
        })
    })
    .await;

    match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(response) => response,
    }
}

/// `GET /api/provinces/{name}/summary`
pub async fn province_summary(state: web::Data<AppState>, name: web::Path<String>) -> HttpResponse {
    let name = name.into_inner();
    let province = name.clone();
    let result = with_session(&state, move |session| {
        let table = session.table()?;
        Ok(sasv_analytics::province_summary(&table, &province))
    })
    .await;

    match result {
        Ok(Some(summary)) => HttpResponse::Ok().json(summary),
        Ok(None) => HttpResponse::NotFound().json(ApiError::new(format!("No records for province '{name}'"))),
        Err(response) => response,
    }
}

/// `GET /api/comparison`
pub async fn comparison(state: web::Data<AppState>) -> HttpResponse {
    let result = with_session(&state, |session| {
        let table = session.table()?;
        Ok(sasv_analytics::province_comparison(&table))
    })
    .await;

    match result {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(response) => response,
    }
}

/// `GET /api/markers`
pub async fn markers(state: web::Data<AppState>) -> HttpResponse {
    let result = with_session(&state, |session| {
        let table = session.table()?;
        Ok(sasv_analytics::province_markers(&table))
    })
    .await;

    match result {
        Ok(markers) => HttpResponse::Ok().json(markers),
        Err(response) => response,
    }
}

/// `GET /api/heatmap`
///
/// Returns `[lat, lon]` pairs for the selected years and months.
pub async fn heatmap(
    state: web::Data<AppState>,
    params: web::Query<HeatmapQueryParams>,
) -> HttpResponse {
    let months = match params.months.as_deref().map(parse_months) {
        None => (1..=12).collect(),
        Some(Ok(months)) => months,
        Some(Err(bad)) => {
            return HttpResponse::BadRequest().json(ApiError::new(format!("Invalid month '{bad}'")));
        }
    };
    let params = params.into_inner();

    let result = with_session(&state, move |session| {
        let table = session.table()?;
        let (year_from, year_to) = resolve_years(&table, params.year_from, params.year_to);
        let filter = HeatmapFilter {
            year_from,
            year_to,
            months,
        };
        Ok(sasv_analytics::heatmap_points(&table, &filter)?)
    })
    .await;

    match result {
        Ok(points) => HttpResponse::Ok().json(points),
        Err(response) => response,
    }
}

/// `GET /api/distribution/{column}`
///
/// Counts the values of one categorical column, optionally for a single
/// province. `format=csv` returns the counts as an attachment.
pub async fn distribution(
    state: web::Data<AppState>,
    column: web::Path<String>,
    params: web::Query<DistributionQueryParams>,
) -> HttpResponse {
    let Ok(column) = column.parse::<DistributionColumn>() else {
        return HttpResponse::NotFound().json(ApiError::new(format!("Unknown column '{column}'")));
    };
    let params = params.into_inner();
    let format = params.format;

    let result = with_session(&state, move |session| {
        let table = session.table()?;
        let mut distribution =
            sasv_analytics::category_distribution(&table, column, params.province.as_deref());
        if let Some(n) = params.top {
            distribution = distribution.top(n);
        }
        let csv = match format {
            ExportFormat::Csv => Some(sasv_analytics::distribution_csv(&distribution)?),
            ExportFormat::Json => None,
        };
        Ok((distribution, csv))
    })
    .await;

    match result {
        Ok((_, Some(csv))) => csv_attachment(&format!("distribucion_{column}.csv"), csv),
        Ok((distribution, None)) => HttpResponse::Ok().json(distribution),
        Err(response) => response,
    }
}

enum Explored {
    Json(ExploreResult),
    Csv(Vec<u8>),
}

/// `GET /api/explore`
///
/// Filters records by year range and provinces. JSON returns the match
/// count and a preview; `format=csv` returns every match.
pub async fn explore(
    state: web::Data<AppState>,
    params: web::Query<ExploreQueryParams>,
) -> HttpResponse {
    let params = params.into_inner();
    let format = params.format;

    let result = with_session(&state, move |session| {
        let table = session.table()?;
        let (year_from, year_to) = resolve_years(&table, params.year_from, params.year_to);
        let provinces = params
            .provinces
            .as_deref()
            .map_or_else(|| sasv_analytics::provinces(&table), split_list);
        let filter = ExploreFilter {
            year_from,
            year_to,
            provinces,
        };

        Ok(match format {
            ExportFormat::Csv => Explored::Csv(sasv_analytics::explore_csv(&table, &filter)?),
            ExportFormat::Json => Explored::Json(sasv_analytics::explore(&table, &filter)?),
        })
    })
    .await;

    match result {
        Ok(Explored::Json(explored)) => HttpResponse::Ok().json(explored),
        Ok(Explored::Csv(csv)) => csv_attachment("muertes_viales_filtrado.csv", csv),
        Err(response) => response,
    }
}

/// `GET /api/predict/options`
pub async fn predict_options(state: web::Data<AppState>) -> HttpResponse {
    let result = with_session(&state, |session| {
        let table = session.table()?;
        Ok(ApiPredictOptions::new(
            sasv_analytics::provinces(&table),
            sasv_analytics::place_types(&table),
        ))
    })
    .await;

    match result {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(response) => response,
    }
}

/// `POST /api/predict`
///
/// Ranks the most probable streets for the submitted conditions. Trains
/// the model on first use.
pub async fn predict(state: web::Data<AppState>, input: web::Json<PredictionInput>) -> HttpResponse {
    let input = input.into_inner();

    let result = with_session(&state, move |session| {
        let predictor = session.predictor()?;
        Ok(ApiPrediction {
            streets: predictor.predict(&input)?,
            model: predictor.summary().clone(),
        })
    })
    .await;

    match result {
        Ok(prediction) => HttpResponse::Ok().json(prediction),
        Err(response) => response,
    }
}

/// `GET /api/incidents/options`
pub async fn registration_options(state: web::Data<AppState>) -> HttpResponse {
    let result = with_session(&state, |session| Ok(session.registration_options())).await;

    match result {
        Ok(options) => HttpResponse::Ok().json(options),
        Err(response) => response,
    }
}

/// `POST /api/incidents`
///
/// Validates and appends a new incident to the dataset file.
pub async fn register(state: web::Data<AppState>, incident: web::Json<NewIncident>) -> HttpResponse {
    let incident = incident.into_inner();
    let session = state.session.clone();

    match web::block(move || session.register(&incident)).await {
        Ok(Ok(id)) => HttpResponse::Created().json(ApiRegistered { id }),
        Ok(Err(SessionError::Dataset(e))) => {
            log::error!("Failed to save incident: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to save incident"))
        }
        Ok(Err(e)) => session_error(&e),
        Err(e) => {
            log::error!("Blocking task failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Internal error"))
        }
    }
}
