use actix_web::{web, HttpResponse};
use std::sync::Arc;
use tracing::debug;

use crate::AppState;
use surebet::core::extraction;
use surebet::error::{validate_commission, validate_line_count, validate_non_negative, AppError};
use surebet::ledger::build_ledger_url;
use surebet::models::{
    AumentadaRequest, CalculateResponse, DutchingRequest, LedgerUrlRequest, LedgerUrlResponse,
    LimitationRequest,
};
use surebet::{Calculator, ExtractionInput, Lines};

/// Dutching: equal return for a total investment
pub async fn calculate_dutching(
    state: web::Data<Arc<AppState>>,
    req: web::Json<DutchingRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    validate_line_count(req.lines.len())?;
    validate_non_negative("total_stake", req.total_stake)?;
    for line in &req.lines {
        validate_non_negative("odds", line.odds)?;
        validate_non_negative("stake", line.stake)?;
    }

    let calc = Calculator::from_lines(Lines::Dutching(req.lines), req.total_stake);
    Ok(HttpResponse::Ok().json(respond(&state, &calc)))
}

/// Odds boost, optionally around a fixed line
pub async fn calculate_aumentada(
    state: web::Data<Arc<AppState>>,
    req: web::Json<AumentadaRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    validate_line_count(req.lines.len())?;
    validate_non_negative("total_stake", req.total_stake)?;
    for line in &req.lines {
        validate_non_negative("odds", line.line.odds)?;
        validate_non_negative("stake", line.line.stake)?;
        validate_non_negative("increase", line.increase)?;
    }
    if req.lines.iter().filter(|l| l.is_fixed).count() > 1 {
        return Err(AppError::ValidationError(
            "At most one line can have a fixed stake".to_string(),
        ));
    }

    let calc = Calculator::from_lines(Lines::Aumentada(req.lines), req.total_stake);
    Ok(HttpResponse::Ok().json(respond(&state, &calc)))
}

/// Back/lay hedging
pub async fn calculate_limitation(
    state: web::Data<Arc<AppState>>,
    req: web::Json<LimitationRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    validate_line_count(req.lines.len())?;
    for line in &req.lines {
        validate_non_negative("odds", line.line.odds)?;
        validate_non_negative("stake", line.line.stake)?;
        validate_non_negative("lay_odd", line.lay_odd)?;
    }
    if req.lines.iter().filter(|l| l.is_lay()).count() > 1 {
        return Err(AppError::ValidationError(
            "At most one line can be a lay bet".to_string(),
        ));
    }
    if req.lines.iter().filter(|l| l.is_editing).count() > 1 {
        return Err(AppError::ValidationError(
            "At most one line can drive the recomputation".to_string(),
        ));
    }

    let calc = Calculator::with_recompute_mode(
        Lines::Limitation(req.lines),
        0.0,
        req.recompute_mode,
    );
    Ok(HttpResponse::Ok().json(respond(&state, &calc)))
}

/// Freebet / bonus extraction
pub async fn calculate_extraction(
    state: web::Data<Arc<AppState>>,
    req: web::Json<ExtractionInput>,
) -> Result<HttpResponse, AppError> {
    let input = req.into_inner();
    validate_non_negative("stake", input.stake)?;
    validate_non_negative("back_odd", input.back_odd)?;
    validate_non_negative("lay_odd", input.lay_odd)?;
    validate_commission(input.commission)?;

    let calc = Calculator::from_lines(Lines::Extraction(input), 0.0);
    Ok(HttpResponse::Ok().json(respond(&state, &calc)))
}

/// Bet-entry form URL prefilled with the given lines
pub async fn ledger_url(
    state: web::Data<Arc<AppState>>,
    req: web::Json<LedgerUrlRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    if !matches!(req.lines, Lines::Extraction(_)) {
        validate_line_count(req.lines.len())?;
    }

    let base = req.base_url.as_deref().unwrap_or(&state.ledger_base_url);
    let url = build_ledger_url(base, &req.lines);
    Ok(HttpResponse::Ok().json(LedgerUrlResponse { url }))
}

fn respond(state: &AppState, calc: &Calculator) -> CalculateResponse {
    let result = calc.result().clone();
    debug!(
        mode = %calc.mode(),
        profit = result.profit,
        roi = %result.roi,
        "calculated"
    );

    let extraction = match calc.lines() {
        Lines::Extraction(input) => Some(extraction::calculate(input)),
        _ => None,
    };

    CalculateResponse {
        mode: calc.mode(),
        lines: calc.lines().clone(),
        total_stake: calc.total_stake(),
        result,
        extraction,
        ledger_url: build_ledger_url(&state.ledger_base_url, calc.lines()),
    }
}
