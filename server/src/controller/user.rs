use crate::{
    app::{AppError, AppResult, ParamsError},
    auth::TokenHandler,
};
use database::{InsertionResult, UserDatabase};
use model::{
    user::{add_user, get_token, UserId},
    ApiRequest,
};
use std::{convert::TryFrom, sync::Arc};
use uuid::Uuid;

pub struct UserController {
    user_db: Option<Arc<UserDatabase>>,
    token_handler: TokenHandler,
    token_ttl_s: i64,
}

impl UserController {
    pub fn new(
        user_db: Option<Arc<UserDatabase>>,
        token_handler: TokenHandler,
        token_ttl_s: i64,
    ) -> Self {
        Self {
            user_db,
            token_handler,
            token_ttl_s,
        }
    }

    pub async fn add_user(&self, request: ApiRequest) -> AppResult<add_user::MethodResult> {
        use add_user::{MethodResult, Params};
        let params = Params::try_from(request)?;
        let user_db = self.user_db()?;

        let id = Uuid::new_v4().to_string();

        let result = user_db
            .insert_user(&id, &params.username, &params.password)
            .await?;

        match result {
            InsertionResult::Inserted => {
                info!("registered user '{}' with id '{}'", params.username, id);
                Ok(MethodResult::success(UserId::from(id)))
            }
            InsertionResult::AlreadyExists => Ok(MethodResult::failure()),
        }
    }

    pub async fn get_token(&self, request: ApiRequest) -> AppResult<get_token::MethodResult> {
        use get_token::{MethodResult, Params};
        let params = Params::try_from(request)?;
        let user_db = self.user_db()?;

        match user_db
            .validate_user(&params.username, &params.password)
            .await?
        {
            Some(user) => {
                info!("{} successfully logged in", user.id);
                let token = self
                    .token_handler
                    .issue_token(&UserId::from(user.id), self.token_ttl_s)?;
                Ok(MethodResult::new(token))
            }
            None => {
                Err(AppError::unauthenticated().with_message("invalid username or password"))
            }
        }
    }

    fn user_db(&self) -> AppResult<&UserDatabase> {
        self.user_db
            .as_deref()
            .ok_or_else(|| AppError::store_failure().with_message("user store not configured"))
    }
}

impl ParamsError for add_user::InvalidParams {}
impl ParamsError for get_token::InvalidParams {}
