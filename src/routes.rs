use std::collections::HashMap;

use csvshift::{ConversionResult, TargetFormat};
use serde::Serialize;
use url::Url;
use worker::{Context, Env, Request, Response, Result, RouteContext, Router};

use crate::conversion::{self, DEFAULT_CSV_FILE_NAME, DEFAULT_PDF_FILE_NAME};
use crate::error::ApiError;
use crate::google_oauth::{self, CallbackOutcome};
use crate::models::{AuthUrlResponse, DEFAULT_RETURN_PATH, UploadRequest, UploadResponse};
use crate::sheets_client;

#[derive(Debug, Clone)]
pub struct AppState {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub return_path: String,
}

impl AppState {
    pub fn from_env(env: &Env) -> Self {
        let client_id = env
            .var("GOOGLE_CLIENT_ID")
            .map(|value| value.to_string())
            .ok()
            .filter(|value| !value.is_empty());
        let client_secret = env
            .secret("GOOGLE_CLIENT_SECRET")
            .map(|value| value.to_string())
            .or_else(|_| env.var("GOOGLE_CLIENT_SECRET").map(|value| value.to_string()))
            .ok()
            .filter(|value| !value.is_empty());
        let return_path = env
            .var("SHEETS_RETURN_PATH")
            .map(|value| value.to_string())
            .unwrap_or_else(|_| DEFAULT_RETURN_PATH.to_string());

        Self {
            client_id,
            client_secret,
            return_path,
        }
    }
}

pub async fn handle(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    let state = AppState::from_env(&env);

    Router::with_data(state)
        .get_async("/api/google-sheets/auth", auth_route)
        .get_async("/api/google-sheets/callback", callback_route)
        .post_async("/api/google-sheets/upload", upload_route)
        .post_async("/api/v1/convert/xlsx", convert_xlsx_route)
        .post_async("/api/v1/convert/json", convert_json_route)
        .post_async("/api/v1/convert/pdf", convert_pdf_route)
        .post_async("/api/v1/pdf-to-csv", pdf_to_csv_route)
        .run(req, env)
        .await
}

async fn auth_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match auth_response(&req, &ctx.data) {
        Ok(response) => json_response(&response),
        Err(error) => error.into_response(),
    }
}

async fn callback_route(req: Request, ctx: RouteContext<AppState>) -> Result<Response> {
    match callback_response(&req, &ctx.data).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn upload_route(mut req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    match upload_response(&mut req).await {
        Ok(response) => Ok(response),
        Err(error) => {
            worker::console_error!("sheets upload failed: {error}");
            error.into_response()
        }
    }
}

async fn convert_xlsx_route(mut req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    convert_route(&mut req, TargetFormat::Xlsx).await
}

async fn convert_json_route(mut req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    convert_route(&mut req, TargetFormat::Json).await
}

async fn convert_pdf_route(mut req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    convert_route(&mut req, TargetFormat::Pdf).await
}

async fn pdf_to_csv_route(mut req: Request, _ctx: RouteContext<AppState>) -> Result<Response> {
    match pdf_to_csv_response(&mut req).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

async fn convert_route(req: &mut Request, format: TargetFormat) -> Result<Response> {
    match convert_response(req, format).await {
        Ok(response) => Ok(response),
        Err(error) => error.into_response(),
    }
}

fn auth_response(req: &Request, state: &AppState) -> Result<AuthUrlResponse, ApiError> {
    let client_id = state
        .client_id
        .as_deref()
        .ok_or_else(|| ApiError::Internal("Google Client ID not configured".to_string()))?;
    let origin = request_origin(&req.url()?)?;
    let auth_url = google_oauth::build_auth_url(client_id, &origin)?;

    Ok(AuthUrlResponse {
        auth_url: auth_url.to_string(),
    })
}

async fn callback_response(req: &Request, state: &AppState) -> Result<Response, ApiError> {
    let origin = request_origin(&req.url()?)?;
    let query = parse_query(req)?;

    let outcome = if let Some(error) = non_empty_param(&query, "error") {
        CallbackOutcome::Denied(error.to_string())
    } else if let Some(code) = non_empty_param(&query, "code") {
        match (state.client_id.as_deref(), state.client_secret.as_deref()) {
            (Some(client_id), Some(client_secret)) => {
                let redirect_uri = google_oauth::callback_redirect_uri(&origin)?;
                google_oauth::exchange_code(code, client_id, client_secret, &redirect_uri).await
            }
            _ => {
                worker::console_error!("oauth callback reached without client credentials");
                CallbackOutcome::ExchangeFailed
            }
        }
    } else {
        CallbackOutcome::MissingCode
    };

    let location = google_oauth::return_url(&origin, &state.return_path, &outcome)?;
    Ok(Response::redirect(location)?)
}

async fn upload_response(req: &mut Request) -> Result<Response, ApiError> {
    let options = conversion::options_from_query(&parse_query(req)?)?;
    let body = req.bytes().await?;
    let request = serde_json::from_slice::<UploadRequest>(&body)
        .map_err(|error| ApiError::BadRequest(format!("invalid upload body: {error}")))?;
    let plan = sheets_client::plan_upload(request, &options)?;
    let result = sheets_client::upload(&plan).await?;
    Ok(result_response(result, plan.values.len())?)
}

async fn convert_response(req: &mut Request, format: TargetFormat) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let options = conversion::options_from_query(&query)?;
    let file_name = conversion::input_file_name(&query, DEFAULT_CSV_FILE_NAME);
    let bytes = req.bytes().await?;

    let converted = conversion::convert_csv_bytes(bytes, file_name, format, &options)?;
    Ok(result_response(converted.result, converted.row_count)?)
}

async fn pdf_to_csv_response(req: &mut Request) -> Result<Response, ApiError> {
    let query = parse_query(req)?;
    let delimiter = conversion::delimiter_from_query(&query)?;
    let file_name = conversion::input_file_name(&query, DEFAULT_PDF_FILE_NAME);
    let bytes = req.bytes().await?;

    let converted = conversion::convert_pdf_bytes(bytes, file_name, delimiter)?;
    Ok(result_response(converted.result, converted.row_count)?)
}

fn result_response(result: ConversionResult, row_count: usize) -> Result<Response> {
    match result {
        ConversionResult::Download(artifact) => conversion::artifact_response(artifact, row_count),
        ConversionResult::Remote { resource_id, url } => json_response(&UploadResponse {
            success: true,
            spreadsheet_id: resource_id,
            spreadsheet_url: url,
        }),
    }
}

fn json_response<T>(payload: &T) -> Result<Response>
where
    T: Serialize,
{
    let mut response = Response::from_json(payload)?;
    response.headers_mut().set("Cache-Control", "no-store")?;
    Ok(response)
}

/// Scheme, host and port of the incoming request, as a joinable base URL.
pub fn request_origin(url: &Url) -> Result<Url, ApiError> {
    Ok(Url::parse(&url.origin().ascii_serialization())?)
}

fn parse_query(req: &Request) -> Result<HashMap<String, String>, ApiError> {
    let url = req.url()?;
    let query = url
        .query_pairs()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect::<HashMap<_, _>>();
    Ok(query)
}

fn non_empty_param<'a>(query: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    query
        .get(key)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}
