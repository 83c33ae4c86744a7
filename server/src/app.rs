use crate::{
    auth::{Claims, TokenHandler},
    controller::{ListController, UserController},
    AppSettings,
};
use database::{Database, DatabaseError, DatabaseResult, ListStore, MemoryStore, UserDatabase};
use jsonwebtoken::errors::Error as JwtError;
use model::{list::ShoppingList, user::UserId, *};
use std::{
    error::Error,
    fmt::{Debug, Display},
    sync::Arc,
};

pub type AppResult<T> = Result<T, AppError>;

pub struct App {
    list_controller: ListController,
    user_controller: UserController,
}

impl App {
    pub fn new(
        list_store: Arc<dyn ListStore>,
        user_db: Option<Arc<UserDatabase>>,
        token_handler: TokenHandler,
        token_ttl_s: i64,
    ) -> Self {
        Self {
            list_controller: ListController::new(list_store),
            user_controller: UserController::new(user_db, token_handler, token_ttl_s),
        }
    }

    /// Connect to the configured database, or keep everything in memory if there is none.
    pub async fn from_settings(
        settings: &AppSettings,
        token_handler: TokenHandler,
    ) -> DatabaseResult<Self> {
        let (list_store, user_db): (Arc<dyn ListStore>, _) = match &settings.database_addr {
            Some(addr) => {
                let list_db = Database::<ShoppingList>::new(addr).await?;
                let user_db: Arc<UserDatabase> = Arc::new(list_db.share());
                (Arc::new(list_db), Some(user_db))
            }
            None => {
                warn!("no database configured, lists are kept in memory and users are disabled");
                (Arc::new(MemoryStore::new()), None)
            }
        };

        Ok(Self::new(
            list_store,
            user_db,
            token_handler,
            settings.token_ttl_s,
        ))
    }

    /// Handle a single request
    pub async fn handle_single(&self, request: ApiRequest, claims: &Option<Claims>) -> ApiResponse {
        let timer = std::time::Instant::now();
        let operation = request.operation;
        info!("handling request with operation: '{}'", operation);
        trace!("request: {:?}", request);

        let result = match crate::auth::authenticate(operation, claims) {
            Ok(user) => self.dispatch(request, user).await,
            Err(err) => Err(err),
        };

        info!(
            "handled request with operation: '{}' in {:?}",
            operation,
            timer.elapsed()
        );

        match result {
            Ok(response) => response,
            Err(err) => {
                match &err.context {
                    Some(context) => error!("error with context: {:?}", context),
                    None => info!("request failed: {}", err),
                }
                ApiResponse::error(err.api_error)
            }
        }
    }

    async fn dispatch(&self, request: ApiRequest, user: Option<UserId>) -> AppResult<ApiResponse> {
        let operation = request.operation;
        if !operation.requires_authentication() {
            return match operation {
                Operation::AddUser => self.user_controller.add_user(request).await.map(|result| {
                    let status = if result.success {
                        Status::Created
                    } else {
                        Status::Success
                    };
                    ApiResponse::new(status, result)
                }),
                Operation::GetToken => self
                    .user_controller
                    .get_token(request)
                    .await
                    .map(|result| ApiResponse::new(Status::Success, result)),
                _ => Err(AppError::internal_error()),
            };
        }

        let user = user.ok_or_else(AppError::unauthenticated)?;
        let lists = &self.list_controller;
        match operation {
            Operation::GetLists => lists.get_lists(&user, request).await.map(|result| {
                let status = if result.is_empty() {
                    Status::Empty
                } else {
                    Status::Success
                };
                ApiResponse::new(status, result)
            }),
            Operation::CreateList => lists
                .create_list(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Created, result)),
            Operation::GetList => lists
                .get_list(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Success, result)),
            Operation::RenameList => lists
                .rename_list(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Updated, result)),
            Operation::DeleteList => lists
                .delete_list(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Deleted, result)),
            Operation::AddItem => lists
                .add_item(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Created, result)),
            Operation::RenameItem => lists
                .rename_item(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Updated, result)),
            Operation::MarkItem => lists
                .mark_item(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Updated, result)),
            Operation::RemoveItem => lists
                .remove_item(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Deleted, result)),
            Operation::AddContributor => lists
                .add_contributor(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Updated, result)),
            Operation::RemoveContributor => lists
                .remove_contributor(&user, request)
                .await
                .map(|result| ApiResponse::new(Status::Updated, result)),
            Operation::AddUser | Operation::GetToken => Err(AppError::internal_error()),
        }
    }
}

#[derive(Debug)]
pub struct AppError {
    pub api_error: ApiError,
    pub context: Option<String>,
}

impl AppError {
    pub fn with_context<T>(mut self, value: &T) -> Self
    where
        T: Debug,
    {
        self.context = Some(format!("{:?}", value));
        self
    }

    pub fn with_message(mut self, message: &str) -> Self {
        self.api_error.message = message.to_owned();
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.api_error.code
    }

    pub fn invalid_request() -> Self {
        Self::from(ApiError::invalid_request())
    }

    pub fn invalid_params() -> Self {
        Self::from(ApiError::invalid_params())
    }

    pub fn unauthenticated() -> Self {
        Self::from(ApiError::unauthenticated())
    }

    pub fn forbidden() -> Self {
        Self::from(ApiError::forbidden())
    }

    pub fn not_found() -> Self {
        Self::from(ApiError::not_found())
    }

    pub fn store_failure() -> Self {
        Self::from(ApiError::store_failure())
    }

    pub fn internal_error() -> Self {
        Self::from(ApiError::internal_error())
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_error.message)
    }
}

impl Error for AppError {}

impl From<ApiError> for AppError {
    fn from(api_error: ApiError) -> Self {
        Self {
            api_error,
            context: None,
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(db_error: DatabaseError) -> Self {
        AppError::store_failure().with_context(&db_error)
    }
}

impl From<JwtError> for AppError {
    fn from(e: JwtError) -> Self {
        AppError::internal_error().with_context(&e)
    }
}

impl From<hyper::Error> for AppError {
    fn from(e: hyper::Error) -> Self {
        AppError::invalid_request().with_context(&e)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::invalid_request()
            .with_message(&format!("invalid json: '{}'", e))
            .with_context(&e)
    }
}

/// Marker for the `InvalidParams` errors of the request contracts.
pub trait ParamsError: Error {}

impl<T> From<T> for AppError
where
    T: ParamsError,
{
    fn from(err: T) -> Self {
        AppError::invalid_params()
            .with_message(&err.to_string())
            .with_context(&err)
    }
}
