use url::Url;
use url::form_urlencoded::Serializer;
use worker::wasm_bindgen::JsValue;
use worker::{Fetch, Headers, Method, Request, RequestInit};

use crate::error::ApiError;
use crate::models::{CALLBACK_PATH, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, SPREADSHEETS_SCOPE, TokenResponse};

/// Where the identity provider sends the browser back to, on the worker's own origin.
pub fn callback_redirect_uri(origin: &Url) -> Result<Url, ApiError> {
    Ok(origin.join(CALLBACK_PATH)?)
}

pub fn build_auth_url(client_id: &str, origin: &Url) -> Result<Url, ApiError> {
    let redirect_uri = callback_redirect_uri(origin)?;
    let url = Url::parse_with_params(
        GOOGLE_AUTH_URL,
        &[
            ("client_id", client_id),
            ("redirect_uri", redirect_uri.as_str()),
            ("response_type", "code"),
            ("scope", SPREADSHEETS_SCOPE),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ],
    )?;
    Ok(url)
}

/// How a visit to the callback endpoint ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The provider redirected with `error=...`, usually `access_denied`.
    Denied(String),
    MissingCode,
    /// The token endpoint answered non-2xx; carries its `error` field if any.
    TokenRejected(Option<String>),
    /// The token endpoint could not be reached or replied with garbage.
    ExchangeFailed,
    Authorized {
        access_token: String,
        refresh_token: Option<String>,
    },
}

impl CallbackOutcome {
    pub fn query(&self) -> String {
        match self {
            Self::Denied(error) => format!("error={}", urlencoding::encode(error)),
            Self::MissingCode => "error=no_code".to_string(),
            Self::TokenRejected(error) => format!(
                "error={}",
                urlencoding::encode(error.as_deref().unwrap_or("token_error"))
            ),
            Self::ExchangeFailed => "error=token_exchange_failed".to_string(),
            Self::Authorized {
                access_token,
                refresh_token,
            } => format!(
                "token={}&refresh={}",
                urlencoding::encode(access_token),
                urlencoding::encode(refresh_token.as_deref().unwrap_or(""))
            ),
        }
    }
}

/// Page the browser lands on after the callback, with the outcome in its query.
///
/// Tokens travel in the query string; they are not stored server-side.
pub fn return_url(origin: &Url, return_path: &str, outcome: &CallbackOutcome) -> Result<Url, ApiError> {
    let mut url = origin.join(return_path)?;
    url.set_query(Some(&outcome.query()));
    Ok(url)
}

pub fn token_request_body(
    code: &str,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &Url,
) -> String {
    Serializer::new(String::new())
        .append_pair("code", code)
        .append_pair("client_id", client_id)
        .append_pair("client_secret", client_secret)
        .append_pair("redirect_uri", redirect_uri.as_str())
        .append_pair("grant_type", "authorization_code")
        .finish()
}

pub fn outcome_from_token_response(status: u16, tokens: TokenResponse) -> CallbackOutcome {
    if !(200..300).contains(&status) {
        return CallbackOutcome::TokenRejected(tokens.error);
    }
    match tokens.access_token {
        Some(access_token) => CallbackOutcome::Authorized {
            access_token,
            refresh_token: tokens.refresh_token,
        },
        None => CallbackOutcome::TokenRejected(tokens.error),
    }
}

/// Trades an authorization code for tokens. Never fails; failures become outcomes.
pub async fn exchange_code(
    code: &str,
    client_id: &str,
    client_secret: &str,
    redirect_uri: &Url,
) -> CallbackOutcome {
    let body = token_request_body(code, client_id, client_secret, redirect_uri);
    match request_tokens(body).await {
        Ok((status, tokens)) => {
            if !(200..300).contains(&status) {
                worker::console_error!(
                    "token endpoint rejected code: status {status}, error {:?}",
                    tokens.error
                );
            }
            outcome_from_token_response(status, tokens)
        }
        Err(error) => {
            worker::console_error!("token exchange error: {error}");
            CallbackOutcome::ExchangeFailed
        }
    }
}

async fn request_tokens(body: String) -> Result<(u16, TokenResponse), ApiError> {
    let mut headers = Headers::new();
    headers.set("Content-Type", "application/x-www-form-urlencoded")?;

    let mut init = RequestInit::new();
    init.with_method(Method::Post)
        .with_headers(headers)
        .with_body(Some(JsValue::from_str(&body)));

    let request = Request::new_with_init(GOOGLE_TOKEN_URL, &init)?;
    let mut response = Fetch::Request(request).send().await?;
    let status = response.status_code();
    let tokens = response.json::<TokenResponse>().await?;
    Ok((status, tokens))
}
