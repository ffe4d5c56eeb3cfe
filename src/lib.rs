pub mod conversion;
pub mod error;
pub mod google_oauth;
pub mod models;
pub mod routes;
pub mod sheets_client;

use worker::{Context, Env, Request, Response, Result, event};

#[event(fetch)]
async fn fetch(req: Request, env: Env, ctx: Context) -> Result<Response> {
    routes::handle(req, env, ctx).await
}
