#![allow(clippy::new_without_default)]

use serde::Serialize;
use serde_json::{Map, Value};
use std::{convert::TryFrom, fmt::Display, str::FromStr};

#[macro_use]
extern crate log;

pub use methods::*;

pub mod access;
pub mod update;

mod methods;

mod operation_names {
    pub const GET_LISTS: &str = "get_lists";
    pub const CREATE_LIST: &str = "create_list";
    pub const GET_LIST: &str = "get_list";
    pub const RENAME_LIST: &str = "rename_list";
    pub const DELETE_LIST: &str = "delete_list";

    pub const ADD_ITEM: &str = "add_item";
    pub const RENAME_ITEM: &str = "rename_item";
    pub const MARK_ITEM: &str = "mark_item";
    pub const REMOVE_ITEM: &str = "remove_item";

    pub const ADD_CONTRIBUTOR: &str = "add_contributor";
    pub const REMOVE_CONTRIBUTOR: &str = "remove_contributor";

    pub const ADD_USER: &str = "add_user";
    pub const GET_TOKEN: &str = "get_token";
}

pub mod error_codes {
    pub const INVALID_REQUEST: i32 = 1000;
    pub const INVALID_PARAMS: i32 = 1001;
    pub const UNAUTHENTICATED: i32 = 1002;
    pub const FORBIDDEN: i32 = 1003;
    pub const NOT_FOUND: i32 = 1004;
    pub const STORE_FAILURE: i32 = 1005;
    pub const INTERNAL_ERROR: i32 = 1006;
}

/// A logical operation on the shopping list resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Get all lists owned by the caller
    GetLists,
    /// Create a list owned by the caller
    CreateList,
    /// Get a list by id
    GetList,
    /// Rename a list
    RenameList,
    /// Delete a list and everything in it
    DeleteList,

    /// Append an item to a list
    AddItem,
    /// Rename an item in a list
    RenameItem,
    /// Mark an item in a list as checked
    MarkItem,
    /// Remove an item from a list
    RemoveItem,

    /// Share a list with another user
    AddContributor,
    /// Stop sharing a list with a user
    RemoveContributor,

    /// Register a user
    AddUser,
    /// Get a JWT
    GetToken,
}

impl Operation {
    /// Whether the caller must present a valid token to perform this operation.
    pub fn requires_authentication(self) -> bool {
        !matches!(self, Operation::AddUser | Operation::GetToken)
    }
}

impl FromStr for Operation {
    type Err = (); // any failure means the operation simply doesn't exist
    fn from_str(s: &str) -> Result<Operation, Self::Err> {
        use operation_names::*;
        use Operation::*;
        match s {
            GET_LISTS => Ok(GetLists),
            CREATE_LIST => Ok(CreateList),
            GET_LIST => Ok(GetList),
            RENAME_LIST => Ok(RenameList),
            DELETE_LIST => Ok(DeleteList),
            ADD_ITEM => Ok(AddItem),
            RENAME_ITEM => Ok(RenameItem),
            MARK_ITEM => Ok(MarkItem),
            REMOVE_ITEM => Ok(RemoveItem),
            ADD_CONTRIBUTOR => Ok(AddContributor),
            REMOVE_CONTRIBUTOR => Ok(RemoveContributor),
            ADD_USER => Ok(AddUser),
            GET_TOKEN => Ok(GetToken),
            _ => Err(()),
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use operation_names::*;
        use Operation::*;
        let output = match self {
            GetLists => GET_LISTS,
            CreateList => CREATE_LIST,
            GetList => GET_LIST,
            RenameList => RENAME_LIST,
            DeleteList => DELETE_LIST,
            AddItem => ADD_ITEM,
            RenameItem => RENAME_ITEM,
            MarkItem => MARK_ITEM,
            RemoveItem => REMOVE_ITEM,
            AddContributor => ADD_CONTRIBUTOR,
            RemoveContributor => REMOVE_CONTRIBUTOR,
            AddUser => ADD_USER,
            GetToken => GET_TOKEN,
        };
        write!(f, "{}", output)
    }
}

/// An incoming call, after the transport layer has resolved which operation it targets.
///
/// `params` holds the request body merged with any identifiers bound from the path.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ApiRequest {
    pub operation: Operation,
    pub params: Value,
}

impl ApiRequest {
    pub fn new<T>(operation: Operation, params: T) -> Self
    where
        T: Serialize,
    {
        let params = serde_json::to_value(params).unwrap_or_else(|e| {
            error!("failed to serialize params of '{}': '{}'", operation, e);
            Value::Object(Map::new())
        });

        Self { operation, params }
    }

    /// Set a single parameter, replacing anything the body carried under the same name.
    ///
    /// A non-object body is left as is, parsing it into `Params` will report the error.
    pub fn with_param(mut self, name: &str, value: String) -> Self {
        if let Value::Object(map) = &mut self.params {
            map.insert(name.to_owned(), Value::String(value));
        }
        self
    }
}

/// Outcome category of a response.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Empty,
    Created,
    Updated,
    Deleted,
    Error,
}

impl Status {
    /// HTTP status code for a response carrying this status.
    ///
    /// `Error` has no single code, see [`ErrorCode::http_status`].
    pub fn http_status(self) -> u16 {
        match self {
            Status::Created => 201,
            Status::Error => 500,
            _ => 200,
        }
    }
}

/// Response envelope for every operation.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct ApiResponse {
    pub status: Status,
    pub data: Value,
    pub errors: Vec<ApiError>,
}

impl ApiResponse {
    /// Create a response carrying `data` (not an error).
    ///
    /// Data that fails to serialize gives an internal error response instead.
    pub fn new<T: Serialize>(status: Status, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                status,
                data,
                errors: Vec::new(),
            },
            Err(e) => {
                error!("failed to serialize response data: '{}'", e);
                Self::error(ApiError::internal_error())
            }
        }
    }

    /// Create a response with a single error.
    pub fn error(error: ApiError) -> Self {
        Self {
            status: Status::Error,
            data: Value::Null,
            errors: vec![error],
        }
    }

    /// HTTP status code to send this response with.
    pub fn http_status(&self) -> u16 {
        match self.errors.first() {
            Some(error) if self.status == Status::Error => error.code.http_status(),
            _ => self.status.http_status(),
        }
    }
}

/// Error descriptor returned in an `ApiResponse` if something failed.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone)]
#[non_exhaustive]
pub struct ApiError {
    /// Error code.
    pub code: ErrorCode,
    /// Short description of what went wrong.
    pub message: String,
}

impl ApiError {
    fn new(code: ErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_owned(),
        }
    }

    /// Set the `message` property on `self`.
    pub fn with_message<T>(mut self, message: T) -> Self
    where
        T: Into<String>,
    {
        self.message = message.into();
        self
    }

    /// The request was not well formed (bad JSON, non-object body, unknown route).
    pub fn invalid_request() -> Self {
        Self::new(ErrorCode::InvalidRequest, "invalid request")
    }

    /// A required field was missing or had an invalid value.
    pub fn invalid_params() -> Self {
        Self::new(ErrorCode::InvalidParams, "invalid params")
    }

    /// No valid token was presented for an operation that needs one.
    pub fn unauthenticated() -> Self {
        Self::new(ErrorCode::Unauthenticated, "unauthenticated")
    }

    /// The target exists but the caller lacks the required capability.
    pub fn forbidden() -> Self {
        Self::new(ErrorCode::Forbidden, "forbidden")
    }

    /// The target does not exist.
    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound, "not found")
    }

    /// The persistent store failed.
    pub fn store_failure() -> Self {
        Self::new(ErrorCode::StoreFailure, "store failure")
    }

    pub fn internal_error() -> Self {
        Self::new(ErrorCode::InternalError, "internal error")
    }
}

/// Code identifying which type of error has occurred.
#[derive(serde::Serialize, serde::Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(into = "i32", try_from = "i32")]
pub enum ErrorCode {
    InvalidRequest,
    InvalidParams,
    Unauthenticated,
    Forbidden,
    NotFound,
    StoreFailure,
    InternalError,
}

impl ErrorCode {
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::InvalidRequest | ErrorCode::InvalidParams => 400,
            ErrorCode::Unauthenticated => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::StoreFailure | ErrorCode::InternalError => 500,
        }
    }
}

impl From<ErrorCode> for i32 {
    fn from(error_code: ErrorCode) -> Self {
        match error_code {
            ErrorCode::InvalidRequest => error_codes::INVALID_REQUEST,
            ErrorCode::InvalidParams => error_codes::INVALID_PARAMS,
            ErrorCode::Unauthenticated => error_codes::UNAUTHENTICATED,
            ErrorCode::Forbidden => error_codes::FORBIDDEN,
            ErrorCode::NotFound => error_codes::NOT_FOUND,
            ErrorCode::StoreFailure => error_codes::STORE_FAILURE,
            ErrorCode::InternalError => error_codes::INTERNAL_ERROR,
        }
    }
}

impl TryFrom<i32> for ErrorCode {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Ok(match value {
            error_codes::INVALID_REQUEST => ErrorCode::InvalidRequest,
            error_codes::INVALID_PARAMS => ErrorCode::InvalidParams,
            error_codes::UNAUTHENTICATED => ErrorCode::Unauthenticated,
            error_codes::FORBIDDEN => ErrorCode::Forbidden,
            error_codes::NOT_FOUND => ErrorCode::NotFound,
            error_codes::STORE_FAILURE => ErrorCode::StoreFailure,
            error_codes::INTERNAL_ERROR => ErrorCode::InternalError,
            unknown => return Err(format!("unknown error code: {}", unknown)),
        })
    }
}

/// Trim `value`, `None` if nothing is left.
pub(crate) fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else if trimmed.len() == value.len() {
        Some(value)
    } else {
        Some(trimmed.to_owned())
    }
}

fn invalid_params_serde_message(err: &serde_json::Error) -> String {
    format!("invalid format of params object: '{}'", err)
}

fn generic_invalid_value_message(param_name: &str) -> String {
    format!("invalid value of '{}'", param_name)
}

fn invalid_value_because_message(param_name: &str, clarification: String) -> String {
    format!(
        "{}, {}",
        generic_invalid_value_message(param_name),
        clarification
    )
}

fn empty_value_message(param_name: &str) -> String {
    invalid_value_because_message(param_name, "must not be empty".to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_names_test() {
        let all = [
            Operation::GetLists,
            Operation::CreateList,
            Operation::GetList,
            Operation::RenameList,
            Operation::DeleteList,
            Operation::AddItem,
            Operation::RenameItem,
            Operation::MarkItem,
            Operation::RemoveItem,
            Operation::AddContributor,
            Operation::RemoveContributor,
            Operation::AddUser,
            Operation::GetToken,
        ];
        for operation in &all {
            assert_eq!(Operation::from_str(&operation.to_string()), Ok(*operation));
        }
        assert!(Operation::from_str("transfer_ownership").is_err());
    }

    #[test]
    fn error_response_test() {
        let response = ApiResponse::error(ApiError::forbidden());
        assert_eq!(response.http_status(), 403);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["errors"][0]["code"], error_codes::FORBIDDEN);
        assert!(json["data"].is_null());
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(serde::ser::Error::custom("not representable"))
        }
    }

    #[test]
    fn unserializable_data_is_an_internal_error_test() {
        let response = ApiResponse::new(Status::Success, Unserializable);
        assert_eq!(response.status, Status::Error);
        assert_eq!(response.errors[0].code, ErrorCode::InternalError);
        assert_eq!(response.http_status(), 500);

        let response = ApiResponse::new(Status::Created, serde_json::json!({ "id": 1 }));
        assert_eq!(response.status, Status::Created);
        assert!(response.errors.is_empty());
    }

    #[test]
    fn with_param_overrides_body_test() {
        let request = ApiRequest::new(
            Operation::RenameList,
            serde_json::json!({ "id": "from body", "name": "Trip" }),
        )
        .with_param("id", "from path".to_owned());

        assert_eq!(request.params["id"], "from path");
        assert_eq!(request.params["name"], "Trip");
    }

    #[test]
    fn non_blank_test() {
        assert_eq!(non_blank("  ".to_owned()), None);
        assert_eq!(non_blank(" Milk ".to_owned()), Some("Milk".to_owned()));
        assert_eq!(non_blank("Milk".to_owned()), Some("Milk".to_owned()));
    }
}
