use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};

use reviewdb_core::InvalidRatingPolicy;
use reviewdb_db::PgReviewSink;
use reviewdb_import::{
    audit_csv, run_import, validate_upload, ImportAudit, ImportError, ImportReport,
    ImportRequest, Upload, TEMPLATE_CSV, TEMPLATE_FILE_NAME,
};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

/// Fields accepted on the import form. Unknown fields are ignored.
#[derive(Debug, Default)]
struct ImportForm {
    shop: Option<String>,
    upload: Option<Upload>,
    on_invalid_rating: Option<InvalidRatingPolicy>,
    dry_run: bool,
}

async fn read_import_form(
    request_id: &str,
    multipart: &mut Multipart,
) -> Result<ImportForm, ApiError> {
    let mut form = ImportForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| map_multipart_error(request_id, &e))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| map_multipart_error(request_id, &e))?;
                form.upload = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            "shop" | "on_invalid_rating" | "dry_run" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| map_multipart_error(request_id, &e))?;
                match name.as_str() {
                    "shop" => form.shop = Some(value),
                    "on_invalid_rating" => {
                        let policy = value.parse::<InvalidRatingPolicy>().map_err(|reason| {
                            ApiError::new(request_id, "validation_error", reason)
                        })?;
                        form.on_invalid_rating = Some(policy);
                    }
                    _ => form.dry_run = matches!(value.trim(), "true" | "1"),
                }
            }
            other => tracing::debug!(field = other, "ignoring unknown multipart field"),
        }
    }

    Ok(form)
}

fn map_multipart_error(request_id: &str, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(request_id, "payload_too_large", error.body_text());
    }
    ApiError::new(request_id, "validation_error", error.body_text())
}

fn map_import_error(request_id: &str, error: &ImportError) -> ApiError {
    match error {
        ImportError::FileTooLarge { .. } => {
            ApiError::new(request_id, "payload_too_large", error.to_string())
        }
        e if e.is_input_rejection() => {
            tracing::info!(request_id, reason = %e, "import rejected");
            ApiError::new(request_id, "validation_error", e.to_string())
        }
        e => {
            tracing::error!(request_id, error = %e, "import failed; nothing was stored");
            ApiError::new(
                request_id,
                "internal_error",
                "Import failed. No reviews were saved.",
            )
        }
    }
}

pub(super) async fn create_import(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    let form = read_import_form(&req_id.0, &mut multipart).await?;

    let mut settings = state.settings;
    if let Some(policy) = form.on_invalid_rating {
        settings.on_invalid_rating = policy;
    }
    settings.dry_run = form.dry_run;

    let request = ImportRequest {
        shop: form.shop.unwrap_or_default(),
        upload: form.upload,
    };
    let sink = PgReviewSink::new(state.pool.clone());

    let report = run_import(state.resolver.as_ref(), &sink, &request, &settings)
        .await
        .map_err(|e| map_import_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse {
        data: report,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn preview_import(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ImportAudit>>, ApiError> {
    let form = read_import_form(&req_id.0, &mut multipart).await?;
    let text = validate_upload(form.upload.as_ref(), state.settings.max_bytes)
        .map_err(|e| map_import_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse {
        data: audit_csv(text),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn download_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\""),
            ),
        ],
        TEMPLATE_CSV,
    )
}
