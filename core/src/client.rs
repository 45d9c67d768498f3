//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only a `base_url`. Collection operations are built
//! from it; item operations take the item's own `url`, since the API never
//! exposes ids. Each operation is a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, ReplaceTodo, Todo, UpdateTodo};

#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
}

impl TodoClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        request(HttpMethod::Get, self.collection_url())
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Post, self.collection_url(), input)
    }

    /// Removes every todo on the server.
    pub fn build_delete_all_todos(&self) -> HttpRequest {
        request(HttpMethod::Delete, self.collection_url())
    }

    pub fn build_get_todo(&self, url: &str) -> HttpRequest {
        request(HttpMethod::Get, url.to_string())
    }

    /// PATCH with only the fields set in `input`.
    pub fn build_update_todo(&self, url: &str, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Patch, url.to_string(), input)
    }

    /// PUT every writable field of `input`.
    pub fn build_replace_todo(&self, url: &str, input: &ReplaceTodo) -> Result<HttpRequest, ApiError> {
        json_request(HttpMethod::Put, url.to_string(), input)
    }

    pub fn build_delete_todo(&self, url: &str) -> HttpRequest {
        request(HttpMethod::Delete, url.to_string())
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 201)?;
        parse_body(&response)
    }

    /// Parses the response to either an update or a replace.
    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response, 200)?;
        parse_body(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }

    pub fn parse_delete_all_todos(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 204)
    }
}

fn request(method: HttpMethod, url: String) -> HttpRequest {
    HttpRequest {
        method,
        url,
        headers: Vec::new(),
        body: None,
    }
}

fn json_request<T: Serialize>(
    method: HttpMethod,
    url: String,
    input: &T,
) -> Result<HttpRequest, ApiError> {
    let body =
        serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    Ok(HttpRequest {
        method,
        url,
        headers: vec![("content-type".to_string(), "application/json".to_string())],
        body: Some(body),
    })
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        status if status == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        400 => Err(ApiError::Validation(field_errors(&response.body))),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

/// Pull the `errors` map out of a problem body, falling back to its
/// `detail` (or the raw body) under `non_field_errors`.
fn field_errors(body: &str) -> BTreeMap<String, Vec<String>> {
    #[derive(serde::Deserialize)]
    struct Problem {
        #[serde(default)]
        errors: Option<BTreeMap<String, Vec<String>>>,
        #[serde(default)]
        detail: Option<String>,
    }

    match serde_json::from_str::<Problem>(body) {
        Ok(Problem {
            errors: Some(errors),
            ..
        }) => errors,
        Ok(Problem {
            detail: Some(detail),
            ..
        }) => BTreeMap::from([("non_field_errors".to_string(), vec![detail])]),
        _ => BTreeMap::from([("non_field_errors".to_string(), vec![body.to_string()])]),
    }
}
