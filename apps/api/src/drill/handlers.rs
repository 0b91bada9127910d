//! Axum route handlers for the Drill API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::drill::answers::AnswerEntry;
use crate::drill::difficulty::{Difficulty, DrillStyle, Operator};
use crate::drill::question::{QuestionSet, RngSource};
use crate::drill::worksheet::{generate_worksheet, DrillSpec, Worksheet};
use crate::errors::AppError;
use crate::render::pdf::{render_pdf, DocumentInfo};
use crate::state::AppState;

const MAX_GRID: u32 = 10;
const SEED_HEADER: &str = "x-drill-seed";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DrillQuery {
    pub operation: Option<String>,
    pub difficulty: Option<String>,
    pub pages: Option<u32>,
    pub first_digits: Option<u8>,
    pub second_digits: Option<u8>,
    pub rows: Option<u32>,
    pub columns: Option<u32>,
    /// Replays a previous drill. The PDF endpoint reports the seed it used.
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DrillAnswersResponse {
    pub drill_id: Uuid,
    pub seed: u64,
    pub spec: DrillSpec,
    pub questions: QuestionSet,
    pub answers: Vec<AnswerEntry>,
    pub page_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/drills/:style
///
/// Generates a worksheet and returns it as an inline PDF.
pub async fn handle_drill_pdf(
    State(state): State<AppState>,
    Path(style): Path<String>,
    Query(query): Query<DrillQuery>,
) -> Result<Response, AppError> {
    let spec = resolve_spec(&style, &query, state.config.max_drill_pages)?;
    let filename = format!(
        "{style}-{}-{}.pdf",
        spec.operator.name_eng(),
        spec.difficulty.slug()
    );

    let seed = query.seed.unwrap_or_else(rand::random);
    let assets = Arc::clone(&state.assets);
    let geometry = state.geometry;
    let settings = state.worksheet_settings();
    let (worksheet, pdf) = tokio::task::spawn_blocking(move || -> Result<_, AppError> {
        let mut source = seeded_source(seed);
        let worksheet =
            generate_worksheet(&spec, &geometry, &settings, assets.as_ref(), &mut source)?;
        let info = DocumentInfo {
            title: format!("{} Worksheet", spec.style.title()),
            subject: format!(
                "{} ({} level)",
                spec.operator.name_eng(),
                spec.difficulty.label_eng()
            ),
        };
        let pdf = render_pdf(&worksheet.commands, &geometry, &info)?;
        Ok((worksheet, pdf))
    })
    .await
    .map_err(|e| {
        AppError::Internal(anyhow::anyhow!("spawn_blocking failed in drill render: {e}"))
    })??;

    info!(
        "Drill {} (seed {seed}) served: {} questions, {} pages, {} bytes",
        worksheet.id,
        worksheet.questions.len(),
        worksheet.page_count,
        pdf.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{filename}\""),
            ),
            (HeaderName::from_static(SEED_HEADER), seed.to_string()),
        ],
        Bytes::from(pdf),
    )
        .into_response())
}

/// GET /api/v1/drills/:style/answers
///
/// Same configuration as the PDF endpoint, returned as data. With the seed
/// from a PDF response, the questions and answers match that document.
pub async fn handle_drill_answers(
    State(state): State<AppState>,
    Path(style): Path<String>,
    Query(query): Query<DrillQuery>,
) -> Result<Json<DrillAnswersResponse>, AppError> {
    let spec = resolve_spec(&style, &query, state.config.max_drill_pages)?;

    let assets = Arc::clone(&state.assets);
    let geometry = state.geometry;
    let settings = state.worksheet_settings();
    let response_spec = spec.clone();
    let seed = query.seed.unwrap_or_else(rand::random);
    let worksheet: Worksheet = tokio::task::spawn_blocking(move || {
        let mut source = seeded_source(seed);
        generate_worksheet(&spec, &geometry, &settings, assets.as_ref(), &mut source)
    })
    .await
    .map_err(|e| {
        AppError::Internal(anyhow::anyhow!("spawn_blocking failed in drill generation: {e}"))
    })??;

    Ok(Json(DrillAnswersResponse {
        drill_id: worksheet.id,
        seed,
        spec: response_spec,
        questions: worksheet.questions,
        answers: worksheet.answers,
        page_count: worksheet.page_count,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Request resolution
// ────────────────────────────────────────────────────────────────────────────

fn seeded_source(seed: u64) -> RngSource<StdRng> {
    RngSource(StdRng::seed_from_u64(seed))
}

/// Maps the path segment to a style and, for the fixed-operator routes, its operator.
fn parse_style(style: &str) -> Option<(DrillStyle, Option<Operator>)> {
    match style {
        "column-method" => Some((DrillStyle::ColumnMethod, None)),
        "long-division" => Some((DrillStyle::LongDivision, Some(Operator::Divide))),
        "addition" => Some((DrillStyle::ColumnMethod, Some(Operator::Add))),
        "multiplication" => Some((DrillStyle::ColumnMethod, Some(Operator::Multiply))),
        _ => None,
    }
}

/// Builds a validated `DrillSpec` from the route and its query overrides.
pub fn resolve_spec(
    style: &str,
    query: &DrillQuery,
    max_pages: u32,
) -> Result<DrillSpec, AppError> {
    let (style_kind, fixed) = parse_style(style)
        .ok_or_else(|| AppError::NotFound(format!("Unknown drill style '{style}'")))?;

    let requested = query
        .operation
        .as_deref()
        .map(str::parse::<Operator>)
        .transpose()
        .map_err(AppError::Validation)?;
    let operator = match (fixed, requested) {
        (Some(fixed), Some(requested)) if fixed != requested => {
            return Err(AppError::Validation(format!(
                "The {style} drill only supports {}",
                fixed.name_eng()
            )));
        }
        (Some(fixed), _) => fixed,
        (None, Some(requested)) => requested,
        (None, None) => Operator::Add,
    };

    let difficulty = query
        .difficulty
        .as_deref()
        .map(str::parse::<Difficulty>)
        .transpose()
        .map_err(AppError::Validation)?
        .unwrap_or_default();

    let mut spec = DrillSpec::new(style_kind, operator, difficulty);

    if let Some(digits) = query.first_digits {
        spec.digits_a = check_range("first_digits", digits, 1, 3)?;
    }
    if let Some(digits) = query.second_digits {
        spec.digits_b = check_range("second_digits", digits, 1, 3)?;
    }
    if let Some(rows) = query.rows {
        spec.rows = check_range("rows", rows, 1, MAX_GRID)?;
    }
    if let Some(columns) = query.columns {
        spec.columns = check_range("columns", columns, 1, MAX_GRID)?;
    }
    if let Some(pages) = query.pages {
        spec.pages = check_range("pages", pages, 1, max_pages)?;
    }

    spec.validate()?;
    Ok(spec)
}

fn check_range<T>(name: &str, value: T, min: T, max: T) -> Result<T, AppError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < min || value > max {
        return Err(AppError::Validation(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(value)
}
