use csvshift::{ConversionOptions, ConversionResult};
use serde::Serialize;
use serde_json::Value;
use worker::wasm_bindgen::JsValue;
use worker::{Fetch, Headers, Method, Request, RequestInit};

use crate::error::ApiError;
use crate::models::{
    CreateSpreadsheetRequest, CreateSpreadsheetResponse, DEFAULT_SPREADSHEET_TITLE,
    SHEETS_API_BASE, SPREADSHEET_URL_BASE, SheetSpec, TitleProperties, UploadRequest, ValueRange,
};

const UPLOAD_FAILED: &str = "Failed to upload to Google Sheets";

/// A validated upload: who is writing, where, and what.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPlan {
    pub access_token: String,
    pub title: String,
    pub sheet_name: String,
    pub values: Vec<Vec<Value>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Checks the upload body. A missing sheet name falls back to `options.sheet_name`.
pub fn plan_upload(request: UploadRequest, options: &ConversionOptions) -> Result<UploadPlan, ApiError> {
    let (Some(access_token), Some(values)) = (non_empty(request.access_token), request.data) else {
        return Err(ApiError::BadRequest(
            "Missing required parameters".to_string(),
        ));
    };

    Ok(UploadPlan {
        access_token,
        title: non_empty(request.file_name)
            .unwrap_or_else(|| DEFAULT_SPREADSHEET_TITLE.to_string()),
        sheet_name: non_empty(request.sheet_name).unwrap_or_else(|| options.sheet_name.clone()),
        values,
    })
}

/// `Sheet1!A1`, or `'Q3 Sales'!A1` when the name needs quoting.
pub fn a1_range(sheet_name: &str) -> String {
    if sheet_name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_') {
        format!("{sheet_name}!A1")
    } else {
        format!("'{}'!A1", sheet_name.replace('\'', "''"))
    }
}

pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("{SPREADSHEET_URL_BASE}{spreadsheet_id}")
}

pub fn create_request(plan: &UploadPlan) -> CreateSpreadsheetRequest {
    CreateSpreadsheetRequest {
        properties: TitleProperties {
            title: plan.title.clone(),
        },
        sheets: vec![SheetSpec {
            properties: TitleProperties {
                title: plan.sheet_name.clone(),
            },
        }],
    }
}

pub fn values_update_url(spreadsheet_id: &str, range: &str) -> String {
    format!(
        "{SHEETS_API_BASE}/{}/values/{}?valueInputOption=RAW",
        urlencoding::encode(spreadsheet_id),
        urlencoding::encode(range)
    )
}

/// Turns a non-2xx Sheets API body into an error that keeps the provider's wording.
pub fn provider_error(status: u16, body: &str) -> ApiError {
    let details = serde_json::from_str::<Value>(body).ok();
    let message = details
        .as_ref()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .or_else(|| value.get("error"))
                .and_then(Value::as_str)
        })
        .map_or_else(
            || format!("{UPLOAD_FAILED} (status {status})"),
            str::to_string,
        );

    ApiError::Provider { message, details }
}

async fn send_json<B>(method: Method, url: &str, access_token: &str, body: &B) -> Result<String, ApiError>
where
    B: Serialize,
{
    let payload = serde_json::to_string(body)?;

    let mut headers = Headers::new();
    headers.set("Authorization", &format!("Bearer {access_token}"))?;
    headers.set("Content-Type", "application/json")?;

    let mut init = RequestInit::new();
    init.with_method(method)
        .with_headers(headers)
        .with_body(Some(JsValue::from_str(&payload)));

    let request = Request::new_with_init(url, &init)?;
    let mut response = Fetch::Request(request)
        .send()
        .await
        .map_err(|error| ApiError::Upstream(format!("{UPLOAD_FAILED}: {error}")))?;

    let status = response.status_code();
    let text = response.text().await?;
    if !(200..300).contains(&status) {
        return Err(provider_error(status, &text));
    }
    Ok(text)
}

/// Creates a spreadsheet with one named sheet and writes the rows from A1.
///
/// Two sequential calls, no retry. A failure in the second leaves the empty
/// spreadsheet behind in the user's Drive.
pub async fn upload(plan: &UploadPlan) -> Result<ConversionResult, ApiError> {
    let created = send_json(
        Method::Post,
        SHEETS_API_BASE,
        &plan.access_token,
        &create_request(plan),
    )
    .await?;
    let spreadsheet_id = serde_json::from_str::<CreateSpreadsheetResponse>(&created)?
        .spreadsheet_id
        .ok_or_else(|| ApiError::Internal("Failed to create spreadsheet".to_string()))?;

    let range = a1_range(&plan.sheet_name);
    let values = ValueRange {
        range: range.clone(),
        major_dimension: "ROWS".to_string(),
        values: plan.values.clone(),
    };
    send_json(
        Method::Put,
        &values_update_url(&spreadsheet_id, &range),
        &plan.access_token,
        &values,
    )
    .await?;

    worker::console_log!(
        "sheets upload completed: spreadsheet={spreadsheet_id}, rows={}",
        plan.values.len()
    );

    Ok(ConversionResult::Remote {
        url: spreadsheet_url(&spreadsheet_id),
        resource_id: spreadsheet_id,
    })
}
