//! Generic request handler: decode, validate, call the service, map the outcome through the status table.
//! One `GenericHandler` serves one resource; axum handlers below are instantiated per model and filter type.

use crate::config::{ActionConfig, AppConfig, StatusTable};
use crate::error::{AppError, ConfigError};
use crate::mask::Masker;
use crate::model::{to_object, Model, OutcomeKind, WriteOutcome};
use crate::search::{SearchFilter, SearchResult, Searcher};
use crate::service::{CrudService, Validator};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Per-resource settings: status table, action names, validator, log masking.
pub struct Params {
    pub resource: String,
    pub status: StatusTable,
    pub action: ActionConfig,
    pub validator: Validator,
    pub masker: Masker,
}

impl Params {
    /// Global status overrides apply first, then the resource's own.
    pub fn new(resource: &str, config: &AppConfig, validator: Validator) -> Result<Self, ConfigError> {
        let mut status = StatusTable::default().with_overrides(&config.status)?;
        if let Some(r) = config.resources.get(resource) {
            status = status.with_overrides(&r.status)?;
        }
        Ok(Params {
            resource: resource.to_string(),
            status,
            action: config.action.clone(),
            validator,
            masker: Masker::new(&config.middleware.masks, config.middleware.mask.clone()),
        })
    }

    /// Terminal step of every request: pick the status, write the audit line, build the response.
    pub fn finish<T: Serialize>(&self, action: &str, result: Result<(OutcomeKind, T), AppError>) -> Response {
        let (kind, body) = match result.and_then(|(kind, body)| Ok((kind, serde_json::to_value(body)?))) {
            Ok(ok) => ok,
            Err(err) => return self.fail(action, err),
        };
        let status = self.status.status(kind);
        self.audit(action, status, body.clone());
        (status, Json(body)).into_response()
    }

    fn fail(&self, action: &str, err: AppError) -> Response {
        let kind = err.kind();
        if kind == OutcomeKind::Error {
            tracing::error!(resource = %self.resource, action, error = %err, "request failed");
        }
        let status = self.status.status(kind);
        let body = err.body();
        self.audit(action, status, serde_json::to_value(&body).unwrap_or_default());
        (status, Json(body)).into_response()
    }

    fn audit(&self, action: &str, status: StatusCode, mut payload: Value) {
        self.masker.mask_value(&mut payload);
        tracing::info!(
            resource = %self.resource,
            action,
            status = status.as_u16(),
            payload = %payload,
            "audit"
        );
    }
}

pub struct GenericHandler<M: Model, F> {
    service: Arc<dyn CrudService<M>>,
    searcher: Arc<dyn Searcher<M, F>>,
    params: Params,
}

fn decode_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(m)) => Ok(m),
        Ok(_) => Err(AppError::Decode("body must be a JSON object".into())),
        Err(e) => Err(AppError::Decode(e.to_string())),
    }
}

fn decode_as<T: DeserializeOwned>(body: Map<String, Value>) -> Result<T, AppError> {
    serde_json::from_value(Value::Object(body)).map_err(|e| AppError::Decode(e.to_string()))
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::BadRequest("id is required".into()));
    }
    Ok(id)
}

fn applied(outcome: WriteOutcome, id: &str) -> Result<u64, AppError> {
    match outcome {
        WriteOutcome::Applied(n) => Ok(n),
        WriteOutcome::NotFound => Err(AppError::NotFound(id.to_string())),
        WriteOutcome::Conflict => Err(AppError::Conflict(id.to_string())),
        WriteOutcome::Invalid(errors) => Err(AppError::Validation(errors)),
    }
}

impl<M: Model, F: SearchFilter> GenericHandler<M, F> {
    pub fn new(service: Arc<dyn CrudService<M>>, searcher: Arc<dyn Searcher<M, F>>, params: Params) -> Self {
        GenericHandler {
            service,
            searcher,
            params,
        }
    }

    async fn load_one(&self, id: &str) -> Result<M, AppError> {
        self.stored(require_id(id)?).await
    }

    /// Reads back the row after a write.
    async fn stored(&self, id: &str) -> Result<M, AppError> {
        self.service
            .load(id)
            .await?
            .ok_or_else(|| AppError::NotFound(id.to_string()))
    }

    /// Answers with the stored row, so managed timestamps come from the database.
    async fn create_one(&self, body: &[u8]) -> Result<M, AppError> {
        let mut model: M = decode_as(decode_object(body)?)?;
        if model.key().trim().is_empty() {
            model.set_key(uuid::Uuid::new_v4().to_string());
        }
        self.params.validator.validate(&to_object(&model)?)?;
        applied(self.service.create(&model).await?, model.key())?;
        self.stored(model.key()).await
    }

    async fn update_one(&self, id: &str, body: &[u8]) -> Result<M, AppError> {
        let id = require_id(id)?;
        let mut model: M = decode_as(decode_object(body)?)?;
        let body_key = model.key().to_string();
        if body_key.trim().is_empty() {
            model.set_key(id.to_string());
        } else if body_key != id {
            return Err(AppError::IdentityMismatch {
                path: id.to_string(),
                body: body_key,
            });
        }
        self.params.validator.validate(&to_object(&model)?)?;
        applied(self.service.update(&model).await?, id)?;
        self.stored(id).await
    }

    /// Writes the present fields, then answers with the merged entity as stored.
    async fn patch_one(&self, id: &str, body: &[u8]) -> Result<M, AppError> {
        let id = require_id(id)?;
        let mut patch: M::Patch = decode_as(decode_object(body)?)?;
        match M::patch_key(&patch).map(str::to_string) {
            None => M::set_patch_key(&mut patch, id.to_string()),
            Some(k) if k != id => {
                return Err(AppError::IdentityMismatch {
                    path: id.to_string(),
                    body: k,
                })
            }
            Some(_) => {}
        }
        self.params.validator.validate_partial(&to_object(&patch)?)?;
        applied(self.service.patch(&patch).await?, id)?;
        self.stored(id).await
    }

    async fn delete_one(&self, id: &str) -> Result<u64, AppError> {
        let id = require_id(id)?;
        applied(self.service.delete(id).await?, id)
    }

    async fn search_body(&self, body: &[u8]) -> Result<SearchResult<M>, AppError> {
        let filter = if body.iter().all(u8::is_ascii_whitespace) {
            F::default()
        } else {
            serde_json::from_slice::<F>(body).map_err(|e| AppError::Decode(e.to_string()))?
        };
        self.searcher.search(&filter).await
    }
}

fn ok<T>(kind: OutcomeKind) -> impl FnOnce(T) -> (OutcomeKind, T) {
    move |body| (kind, body)
}

pub async fn all<M: Model, F: SearchFilter>(State(h): State<Arc<GenericHandler<M, F>>>) -> Response {
    let result = h.service.all().await.map(ok(OutcomeKind::Success));
    h.params.finish(&h.params.action.all, result)
}

pub async fn load<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    Path(id): Path<String>,
) -> Response {
    let result = h.load_one(&id).await.map(ok(OutcomeKind::Success));
    h.params.finish(&h.params.action.load, result)
}

/// GET search: the filter comes from query parameters.
pub async fn search<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    query: Result<Query<F>, QueryRejection>,
) -> Response {
    let result = match query {
        Ok(Query(filter)) => h.searcher.search(&filter).await,
        Err(rejection) => Err(AppError::Decode(rejection.body_text())),
    };
    h.params.finish(&h.params.action.search, result.map(ok(OutcomeKind::Success)))
}

/// POST search: the filter is the JSON body; an empty body means no criteria.
pub async fn search_by_body<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    body: Bytes,
) -> Response {
    let result = h.search_body(&body).await.map(ok(OutcomeKind::Success));
    h.params.finish(&h.params.action.search, result)
}

pub async fn create<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    body: Bytes,
) -> Response {
    let result = h.create_one(&body).await.map(ok(OutcomeKind::Created));
    h.params.finish(&h.params.action.create, result)
}

pub async fn update<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let result = h.update_one(&id, &body).await.map(ok(OutcomeKind::Success));
    h.params.finish(&h.params.action.update, result)
}

pub async fn patch<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let result = h.patch_one(&id, &body).await.map(ok(OutcomeKind::Success));
    h.params.finish(&h.params.action.patch, result)
}

pub async fn delete<M: Model, F: SearchFilter>(
    State(h): State<Arc<GenericHandler<M, F>>>,
    Path(id): Path<String>,
) -> Response {
    let result = h.delete_one(&id).await.map(ok(OutcomeKind::Success));
    h.params.finish(&h.params.action.delete, result)
}
