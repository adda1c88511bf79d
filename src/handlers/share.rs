use actix_web::{web, HttpResponse};
use chrono::Utc;
use std::sync::Arc;

use crate::AppState;
use surebet::error::{validate_line_count, AppError};
use surebet::models::{ShareRequest, ShareResponse};
use surebet::Lines;

/// Create a share link for a calculator configuration
pub async fn create_share(
    state: web::Data<Arc<AppState>>,
    req: web::Json<ShareRequest>,
) -> Result<HttpResponse, AppError> {
    let req = req.into_inner();
    if !matches!(req.lines, Lines::Extraction(_)) {
        validate_line_count(req.lines.len())?;
    }

    let now = Utc::now();
    let code = state
        .codec
        .create_share_at(&req.lines, req.total_stake, now)
        .await?;

    Ok(HttpResponse::Created().json(ShareResponse {
        code,
        expires_at: state.codec.config().expires_at(now),
    }))
}

/// Restore a shared configuration
pub async fn get_share(
    state: web::Data<Arc<AppState>>,
    code: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let shared = state.codec.get_share(&code).await?;
    Ok(HttpResponse::Ok().json(shared))
}
