//! Binding of HTTP method and path to an [`Operation`].

use hyper::Method;
use model::{list::ListId, ApiRequest, Operation};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// An operation together with the identifiers captured from the path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub operation: Operation,
    bindings: Vec<(&'static str, String)>,
}

impl Route {
    fn new(operation: Operation) -> Self {
        Self {
            operation,
            bindings: Vec::new(),
        }
    }

    fn bind(mut self, name: &'static str, value: String) -> Self {
        self.bindings.push((name, value));
        self
    }

    pub fn binding(&self, name: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, value)| value.as_str())
    }

    /// Build the request for this route, path identifiers take precedence over the body.
    pub fn into_request(self, body: JsonValue) -> ApiRequest {
        let request = ApiRequest::new(self.operation, body);
        self.bindings
            .into_iter()
            .fold(request, |request, (name, value)| {
                request.with_param(name, value)
            })
    }
}

/// Resolve `path` (without query and trailing slash) requested with `method`.
///
/// `None` if no route matches, including a list id that is not a UUID.
pub fn resolve(method: &Method, path: &str) -> Option<Route> {
    use Operation::*;

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let route = match (method, segments.as_slice()) {
        (&Method::GET, ["api", "lists"]) => Route::new(GetLists),
        (&Method::POST, ["api", "lists"]) => Route::new(CreateList),
        (&Method::GET, ["api", "lists", id]) => list_route(GetList, id)?,
        (&Method::PUT, ["api", "lists", id]) => list_route(RenameList, id)?,
        (&Method::DELETE, ["api", "lists", id]) => list_route(DeleteList, id)?,
        (&Method::POST, ["api", "lists", id, "items"]) => list_route(AddItem, id)?,
        (&Method::PUT, ["api", "lists", id, "items", item_id]) => {
            list_route(RenameItem, id)?.bind("item_id", decode(item_id)?)
        }
        (&Method::DELETE, ["api", "lists", id, "items", item_id]) => {
            list_route(RemoveItem, id)?.bind("item_id", decode(item_id)?)
        }
        (&Method::POST, ["api", "lists", id, "items", item_id, "mark"])
        | (&Method::GET, ["api", "lists", id, "items", item_id, "mark"]) => {
            list_route(MarkItem, id)?.bind("item_id", decode(item_id)?)
        }
        (&Method::POST, ["api", "lists", id, "contributors"]) => list_route(AddContributor, id)?,
        (&Method::DELETE, ["api", "lists", id, "contributors", user_id]) => {
            list_route(RemoveContributor, id)?.bind("user_id", decode(user_id)?)
        }
        (&Method::POST, ["api", "users"]) => Route::new(AddUser),
        (&Method::POST, ["api", "token"]) => Route::new(GetToken),
        _ => return None,
    };

    Some(route)
}

fn list_route(operation: Operation, id: &str) -> Option<Route> {
    let id = ListId::from_str(&decode(id)?).ok()?;
    Some(Route::new(operation).bind("id", id.to_string()))
}

fn decode(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|d| d.to_string())
}
