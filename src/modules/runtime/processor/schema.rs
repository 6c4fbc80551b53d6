//! Query processor backed by an `async-graphql` schema

use std::collections::BTreeMap;

use async_graphql::parser::parse_query;
use async_graphql::parser::types::{DocumentOperations, OperationType};
use async_graphql::{ObjectType, Request, Schema, ServerError, SubscriptionType, Variables};
use async_trait::async_trait;
use axum::http::Method;
use serde_json::{json, Map, Value};
use tracing::debug;
use trellis_core::{GraphQLOptions, HttpQueryError, TrellisError};
use trellis_types::{FormattedError, GraphQLPayload};

use super::{HttpQueryProcessor, HttpQueryRequest, HttpQueryResponse};

/// Per-request values made available to resolvers through `Context::data`
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub context: Option<Value>,
    pub root_value: Option<Value>,
}

/// Runs HTTP GraphQL requests against an `async-graphql` schema
pub struct SchemaProcessor<Q, M, S> {
    schema: Schema<Q, M, S>,
}

struct ExecutionResult {
    body: Value,
    /// False when the document failed to parse or validate
    executed: bool,
    errors: Vec<FormattedError>,
}

impl<Q, M, S> SchemaProcessor<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    pub fn new(schema: Schema<Q, M, S>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema<Q, M, S> {
        &self.schema
    }

    async fn execute_one(
        &self,
        item: Value,
        is_get: bool,
        request: &HttpQueryRequest,
    ) -> Result<ExecutionResult, TrellisError> {
        let payload: GraphQLPayload = serde_json::from_value(item)
            .map_err(|_| TrellisError::http_query(400, "GraphQL queries must be JSON objects."))?;

        let query = match payload.query {
            Some(query) if !query.trim().is_empty() => query,
            _ => return Err(TrellisError::http_query(400, "Must provide query string.")),
        };
        let variables = decode_json_field(payload.variables, "Variables are invalid JSON.")?;
        let extensions = decode_json_field(payload.extensions, "Extensions are invalid JSON.")?;

        if is_get {
            if let Some(ty) = operation_type(&query, payload.operation_name.as_deref()) {
                if ty != OperationType::Query {
                    return Err(HttpQueryError::new(405, "GET supports only query operation")
                        .with_header("Allow", "POST")
                        .into());
                }
            }
        }

        let options = &request.options;
        let mut gql = Request::new(query);
        if let Some(variables) = variables {
            gql = gql.variables(Variables::from_json(variables));
        }
        if let Some(name) = payload.operation_name {
            gql = gql.operation_name(name);
        }
        if let Some(Value::Object(extensions)) = extensions {
            for (key, value) in extensions {
                let value = async_graphql::Value::from_json(value)?;
                gql.extensions.insert(key, value);
            }
        }
        if !options.introspection {
            gql = gql.disable_introspection();
        }
        gql = gql.data(RequestContext {
            context: options.context.clone(),
            root_value: options.root_value.clone(),
        });
        if let Some(files) = &request.uploads {
            gql = gql.data(files.clone());
        }

        let response = self.schema.execute(gql).await;

        let data = serde_json::to_value(&response.data)?;
        let errors = response
            .errors
            .iter()
            .map(|err| format_server_error(err, options))
            .collect::<Result<Vec<_>, _>>()?;

        // Resolver errors carry a path; `data` stays in the response even when
        // a non-null root field nulled it
        let executed = !data.is_null() || response.errors.iter().any(|err| !err.path.is_empty());
        let mut body = Map::new();
        if executed || errors.is_empty() {
            body.insert("data".to_string(), data);
        }
        if !errors.is_empty() {
            body.insert("errors".to_string(), serde_json::to_value(&errors)?);
        }
        if !response.extensions.is_empty() {
            body.insert(
                "extensions".to_string(),
                serde_json::to_value(&response.extensions)?,
            );
        }

        Ok(ExecutionResult {
            body: Value::Object(body),
            executed,
            errors,
        })
    }
}

#[async_trait]
impl<Q, M, S> HttpQueryProcessor for SchemaProcessor<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    async fn run_http_query(
        &self,
        request: HttpQueryRequest,
    ) -> Result<HttpQueryResponse, TrellisError> {
        let is_get = match request.method {
            Method::GET => true,
            Method::POST => false,
            _ => {
                return Err(HttpQueryError::new(405, "Trellis supports only GET/POST requests.")
                    .with_header("Allow", "GET, POST")
                    .into())
            }
        };

        let payload = match request.query.clone() {
            Some(payload) if !is_empty_payload(&payload) => payload,
            _ if is_get => return Err(TrellisError::http_query(400, "GET query missing.")),
            _ => {
                return Err(TrellisError::http_query(
                    500,
                    "POST body missing. Did you forget use body-parser middleware?",
                ))
            }
        };

        let (items, is_batch) = match payload {
            Value::Array(items) if !is_get => (items, true),
            other => (vec![other], false),
        };
        debug!("Processing {} GraphQL operation(s)", items.len());

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            results.push(self.execute_one(item, is_get, &request).await?);
        }

        let body = if is_batch {
            Value::Array(results.into_iter().map(|r| r.body).collect())
        } else {
            let result = results
                .pop()
                .ok_or_else(|| TrellisError::Internal("No GraphQL result produced".to_string()))?;
            if !result.executed && !result.errors.is_empty() {
                let body = serde_json::to_string(&json!({ "errors": result.errors }))?;
                return Err(HttpQueryError::graphql(400, body).into());
            }
            result.body
        };

        let graphql_response = serde_json::to_string(&body)?;
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert(
            "Content-Length".to_string(),
            graphql_response.len().to_string(),
        );

        Ok(HttpQueryResponse {
            graphql_response,
            headers,
        })
    }
}

fn is_empty_payload(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Decode a field that GET requests send as a JSON string
fn decode_json_field(
    value: Option<Value>,
    message: &'static str,
) -> Result<Option<Value>, TrellisError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) if raw.trim().is_empty() => Ok(None),
        Some(Value::String(raw)) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|_| TrellisError::http_query(400, message)),
        Some(other) => Ok(Some(other)),
    }
}

/// Type of the operation that would run, if the document parses
fn operation_type(query: &str, operation_name: Option<&str>) -> Option<OperationType> {
    let document = parse_query(query).ok()?;
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(op), _) => Some(op.node.ty),
        (DocumentOperations::Multiple(ops), Some(name)) => ops.get(name).map(|op| op.node.ty),
        (DocumentOperations::Multiple(_), None) => None,
    }
}

fn format_server_error(
    err: &ServerError,
    options: &GraphQLOptions,
) -> Result<FormattedError, TrellisError> {
    let formatted: FormattedError = serde_json::from_value(serde_json::to_value(err)?)?;
    Ok(options.format(formatted))
}
