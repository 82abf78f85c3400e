/// HKP lookup request model and query parsing
pub mod render;

use crate::error::{GatewayError, GatewayResult};
use serde::Deserialize;

/// HKP operation codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Get,
    HashGet,
    Index,
    VIndex,
    Stats,
    /// Anything else the client sent; rejected at dispatch, not at parse
    Other(String),
}

impl Operation {
    fn parse(op: &str) -> Self {
        match op.to_ascii_lowercase().as_str() {
            "get" => Operation::Get,
            "hget" => Operation::HashGet,
            "index" => Operation::Index,
            "vindex" => Operation::VIndex,
            "stats" => Operation::Stats,
            _ => Operation::Other(op.to_string()),
        }
    }
}

/// Option flags from the comma-separated `options` parameter
///
/// Unknown tokens are ignored, per the protocol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LookupOptions {
    pub machine_readable: bool,
    pub json: bool,
}

impl LookupOptions {
    fn parse(options: &str) -> Self {
        let mut parsed = LookupOptions::default();
        for token in options.split(',') {
            match token.trim().to_ascii_lowercase().as_str() {
                "mr" => parsed.machine_readable = true,
                "json" => parsed.json = true,
                _ => {}
            }
        }
        parsed
    }
}

/// Raw query parameters of `/pks/lookup`
#[derive(Debug, Deserialize)]
pub struct LookupParams {
    pub op: Option<String>,
    pub search: Option<String>,
    pub options: Option<String>,
}

/// A parsed lookup request, immutable for the life of the request
#[derive(Debug, Clone)]
pub struct LookupRequest {
    pub op: Operation,
    pub search: String,
    pub options: LookupOptions,
}

impl LookupRequest {
    /// Parse raw query parameters; `op` and a non-empty `search` are required
    pub fn from_params(params: LookupParams) -> GatewayResult<Self> {
        let op = params
            .op
            .filter(|op| !op.is_empty())
            .ok_or_else(|| GatewayError::BadRequest("missing required parameter: op".to_string()))?;
        let search = params.search.filter(|search| !search.is_empty()).ok_or_else(|| {
            GatewayError::BadRequest("missing required parameter: search".to_string())
        })?;

        Ok(LookupRequest {
            op: Operation::parse(&op),
            search,
            options: params
                .options
                .as_deref()
                .map(LookupOptions::parse)
                .unwrap_or_default(),
        })
    }
}
