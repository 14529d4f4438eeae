//! Narrow client for the generative AI collaborator.
//!
//! Everything here is an untrusted, latency-bearing oracle: suggestions,
//! extraction, tips, translation, and exchange rates all come back as plain
//! typed documents and are decoded field-by-field, never splatted into state.
//! Each call site has its own named fallback; only itinerary generation
//! propagates failure to its caller.

use serde::{Deserialize, Serialize};
use trip_utils::{PlaceDraft, text_cleanup};

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("backend returned HTTP {0}")]
    Status(u16),
    #[error("response parsing failed: {0}")]
    Parse(String),
}

fn backend_url() -> &'static str {
    if cfg!(feature = "local-backend") {
        "http://localhost:8080"
    } else {
        "https://arkiv-ai-backend.fly.dev"
    }
}

async fn hit_ai_server(
    path: &str,
    request: &impl Serialize,
) -> Result<fetch_happen::Response, AiError> {
    let client = fetch_happen::Client;
    let response = client
        .post(format!("{}{path}", backend_url()))
        .json(request)
        .map_err(|e| AiError::Request(format!("{e:?}")))?
        .send()
        .await
        .map_err(|e| AiError::Request(format!("{e:?}")))?;

    if !response.ok() {
        return Err(AiError::Status(response.status()));
    }
    Ok(response)
}

#[derive(Serialize)]
struct SuggestRequest<'a> {
    destination: &'a str,
    day: u32,
}

/// Asks for a handful of iconic places for one day. No fallback: the error
/// propagates, and the caller decides how (or whether) to surface it.
pub async fn suggest_itinerary(destination: &str, day: u32) -> Result<Vec<PlaceDraft>, AiError> {
    let response = hit_ai_server("/suggest-itinerary", &SuggestRequest { destination, day }).await?;
    let drafts: Vec<PlaceDraft> = response
        .json()
        .await
        .map_err(|e| AiError::Parse(format!("{e:?}")))?;
    Ok(drafts.into_iter().map(PlaceDraft::scrubbed).collect())
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    input: &'a str,
}

/// Extracts structured place info from pasted free text. On any failure the
/// result degrades to a draft whose name is the text before the first "http".
pub async fn extract_place_info(input: &str) -> PlaceDraft {
    let attempt: Result<PlaceDraft, AiError> = async {
        let response = hit_ai_server("/extract-place", &ExtractRequest { input }).await?;
        response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("{e:?}")))
    }
    .await;

    match attempt {
        Ok(draft) => draft,
        Err(e) => {
            log::warn!("Place extraction failed, falling back to raw name: {e}");
            PlaceDraft::named(text_cleanup::fallback_place_name(input))
        }
    }
}

#[derive(Serialize)]
struct RateRequest<'a> {
    from: &'a str,
    to: &'a str,
}

#[derive(Deserialize)]
struct RateResponse {
    rate: f64,
}

/// Live exchange rate between two currency codes. A failed lookup substitutes
/// a rate of 1, which keeps the receipt total computable (if wrong).
pub async fn exchange_rate(from: &str, to: &str) -> f64 {
    let attempt: Result<f64, AiError> = async {
        let response = hit_ai_server("/exchange-rate", &RateRequest { from, to }).await?;
        let body: RateResponse = response
            .json()
            .await
            .map_err(|e| AiError::Parse(format!("{e:?}")))?;
        Ok(body.rate)
    }
    .await;

    attempt.unwrap_or_else(|e| {
        log::warn!("Exchange rate {from}->{to} failed, substituting 1: {e}");
        1.0
    })
}

#[derive(Serialize)]
struct TipRequest<'a> {
    place_name: &'a str,
}

#[derive(Deserialize)]
struct TipResponse {
    tip: String,
}

/// One-sentence travel tip for a place. The caller leaves the description
/// unchanged on failure.
pub async fn quick_tip(place_name: &str) -> Result<String, AiError> {
    let response = hit_ai_server("/quick-tip", &TipRequest { place_name }).await?;
    let body: TipResponse = response
        .json()
        .await
        .map_err(|e| AiError::Parse(format!("{e:?}")))?;
    Ok(body.tip)
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    translation: String,
}

/// Translates a note into the trip's home language. Blank input short-circuits
/// to blank output without a round trip.
pub async fn translate(text: &str) -> Result<String, AiError> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    let response = hit_ai_server("/translate", &TranslateRequest { text }).await?;
    let body: TranslateResponse = response
        .json()
        .await
        .map_err(|e| AiError::Parse(format!("{e:?}")))?;
    Ok(body.translation)
}

/// A tip is appended to the existing description, separated by a blank line.
pub fn with_tip(description: &str, tip: &str) -> String {
    format!("{description}\n\n✨ TIP: {tip}").trim().to_string()
}
