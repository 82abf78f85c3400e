/// Lookup Dispatcher - the `/pks` endpoints
///
/// Parses the inbound request, routes by operation, drives the resolver,
/// and picks the response format. All network I/O happens behind the
/// resolver; this layer only reads the request and writes the response.
use crate::{
    context::AppContext,
    error::{GatewayError, GatewayResult},
    hkp::{render, LookupParams, LookupRequest, Operation},
};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use tracing::error;

/// `GET /pks/lookup` - the only functional endpoint
async fn lookup(
    State(ctx): State<AppContext>,
    Query(params): Query<LookupParams>,
) -> GatewayResult<Response> {
    let lookup = LookupRequest::from_params(params)?;

    match &lookup.op {
        Operation::Get | Operation::HashGet => get_flow(&ctx, &lookup).await,
        Operation::Index | Operation::VIndex => index_flow(&ctx, &lookup).await,
        Operation::Stats => Err(GatewayError::NotImplemented("operation stats")),
        Operation::Other(op) => Err(GatewayError::UnsupportedOperation(op.clone())),
    }
}

/// `/pks/add` - key submission is explicitly unsupported, for any method
async fn add() -> GatewayError {
    GatewayError::NotImplemented("key submission")
}

/// Get flow: resolve, then stream the keys as armored blocks
async fn get_flow(ctx: &AppContext, lookup: &LookupRequest) -> GatewayResult<Response> {
    let keys = ctx.resolver.resolve_and_fetch(&lookup.search).await?;
    if keys.is_empty() {
        return Err(GatewayError::NotFound);
    }

    let mut body = Vec::new();
    if let Err(e) = render::write_armored(&keys, &mut body) {
        // The armored stream has started by the time a key fails to
        // serialize; log it and let the partial body stand.
        error!(search = %lookup.search, %e, "error writing armored keys");
    }

    Ok(([(header::CONTENT_TYPE, "text/plain")], body).into_response())
}

/// Index flow: resolve, then render exactly one of the two index formats
async fn index_flow(ctx: &AppContext, lookup: &LookupRequest) -> GatewayResult<Response> {
    let keys = ctx.resolver.resolve_and_fetch(&lookup.search).await?;
    if keys.is_empty() {
        return Err(GatewayError::NotFound);
    }

    let response = if lookup.options.json {
        let body = render::json_index(&keys)?;
        ([(header::CONTENT_TYPE, "application/json")], body).into_response()
    } else {
        let body = render::machine_readable_index(&keys);
        ([(header::CONTENT_TYPE, "text/plain")], body).into_response()
    };

    Ok(response)
}

/// Build the `/pks` routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/pks/lookup", get(lookup))
        .route("/pks/add", any(add))
}
