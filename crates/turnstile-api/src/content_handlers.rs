//! Content lookup handlers.
//!
//! Input is validated before the corpus is touched; every failure becomes
//! an `{ error, status }` body with the matching HTTP status.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use turnstile_core::{ContentRecord, Corpus, DateKey, SelectionError};

use crate::handlers::error_response;

fn selection_error(e: &SelectionError) -> Response {
    let status = match e {
        SelectionError::EmptyCorpus => {
            error!("content requested but corpus is empty");
            StatusCode::INTERNAL_SERVER_ERROR
        }
        SelectionError::InvalidKeyFormat(_) => StatusCode::BAD_REQUEST,
        SelectionError::NotFound(_) => StatusCode::NOT_FOUND,
    };
    error_response(&e.to_string(), status)
}

fn bad_query(rejection: &QueryRejection) -> Response {
    error_response(&rejection.body_text(), StatusCode::BAD_REQUEST)
}

// ── Daily ──────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct DailyQuery {
    pub date: Option<String>,
}

/// A record together with the date it was selected for.
#[derive(Debug, Serialize, Deserialize)]
pub struct DailyVerse {
    pub date: String,
    #[serde(flatten)]
    pub record: ContentRecord,
}

/// GET /api/verse/daily?date=YYYY-MM-DD
///
/// Without `date`, today's UTC date is used.
pub async fn daily_verse(
    State(corpus): State<Corpus>,
    query: Result<Query<DailyQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return bad_query(&rejection),
    };
    let date = match query.date.as_deref() {
        Some(raw) => match DateKey::parse(raw) {
            Ok(date) => date,
            Err(e) => return selection_error(&e),
        },
        None => DateKey::today(),
    };

    match corpus.daily(&date) {
        Ok(record) => {
            debug!(%date, ref_key = %record.ref_key, "daily record selected");
            Json(DailyVerse {
                date: date.to_string(),
                record: record.clone(),
            })
            .into_response()
        }
        Err(e) => selection_error(&e),
    }
}

// ── Explicit lookup ────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    #[serde(rename = "ref")]
    pub ref_key: Option<String>,
    pub book: Option<String>,
    pub chapter: Option<String>,
    pub verse: Option<String>,
}

/// GET /api/verse?ref=… or ?book=…&chapter=…&verse=…
pub async fn lookup_verse(
    State(corpus): State<Corpus>,
    query: Result<Query<LookupQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return bad_query(&rejection),
    };

    let found = match (&query.ref_key, &query.book, &query.chapter, &query.verse) {
        (Some(ref_key), _, _, _) => corpus.by_ref(ref_key),
        (None, Some(book), Some(chapter), Some(verse)) => {
            let (chapter, verse) = match (parse_number("chapter", chapter), parse_number("verse", verse)) {
                (Ok(c), Ok(v)) => (c, v),
                (Err(e), _) | (_, Err(e)) => return selection_error(&e),
            };
            corpus.by_reference(book, chapter, verse)
        }
        _ => {
            return error_response(
                "expected either ref or book, chapter and verse",
                StatusCode::BAD_REQUEST,
            );
        }
    };

    match found {
        Ok(record) => Json(record.clone()).into_response(),
        Err(e) => selection_error(&e),
    }
}

fn parse_number(field: &str, raw: &str) -> Result<u32, SelectionError> {
    match raw.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(SelectionError::InvalidKeyFormat(format!(
            "{field} must be a positive integer, got {raw:?}"
        ))),
    }
}
