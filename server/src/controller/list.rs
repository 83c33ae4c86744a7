use crate::app::{AppError, AppResult, ParamsError};
use database::{InsertionResult, ListStore};
use model::{
    access::{Access, Capability},
    list::*,
    update::ListUpdate,
    user::UserId,
    ApiRequest, Operation,
};
use std::{convert::TryFrom, sync::Arc};

/// Authorizes and applies every operation on shopping lists.
///
/// A list is always loaded and the caller classified before anything is
/// written, and every operation issues at most one write to the store.
pub struct ListController {
    store: Arc<dyn ListStore>,
}

impl ListController {
    pub fn new(store: Arc<dyn ListStore>) -> Self {
        Self { store }
    }

    pub async fn get_lists(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<get_lists::MethodResult> {
        use get_lists::{MethodResult, Params};
        let _params = Params::try_from(request)?;

        let lists = self.store.find_lists_by_owner(user).await?;

        Ok(MethodResult::new(lists))
    }

    pub async fn create_list(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<create_list::MethodResult> {
        use create_list::{MethodResult, Params};
        let params = Params::try_from(request)?;

        let list = params.into_list(user.clone());

        match self.store.create_list(&list).await? {
            InsertionResult::Inserted => {
                info!("'{}' created list '{}'", user, list.id);
                Ok(MethodResult::new(list))
            }
            InsertionResult::AlreadyExists => Err(AppError::internal_error()
                .with_context(&format!("generated list id '{}' already in use", list.id))),
        }
    }

    pub async fn get_list(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<get_list::MethodResult> {
        use get_list::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let list = self.authorize(&params.id, user, operation).await?;

        Ok(MethodResult::new(list))
    }

    pub async fn rename_list(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<rename_list::MethodResult> {
        use rename_list::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        self.apply(
            &params.id,
            user,
            operation,
            ListUpdate::Rename {
                name: params.name.clone(),
            },
        )
        .await?;

        Ok(MethodResult::new(params.id, params.name))
    }

    pub async fn delete_list(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<delete_list::MethodResult> {
        use delete_list::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        self.authorize(&params.id, user, operation).await?;

        info!("'{}' deleting list '{}'", user, params.id);

        if self.store.delete_list(&params.id).await? {
            Ok(MethodResult::new(params.id))
        } else {
            Err(list_not_found(&params.id))
        }
    }

    pub async fn add_item(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<add_item::MethodResult> {
        use add_item::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let item = params.item.into_item();

        let added = self
            .apply(&params.id, user, operation, ListUpdate::PushItem(item.clone()))
            .await?;

        if added {
            Ok(MethodResult::new(params.id, item))
        } else {
            Err(AppError::invalid_params().with_message(&format!(
                "list '{}' already has an item with id '{}'",
                params.id, item.id
            )))
        }
    }

    pub async fn rename_item(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<rename_item::MethodResult> {
        use rename_item::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let matched = self
            .apply(
                &params.id,
                user,
                operation,
                ListUpdate::SetItemName {
                    item_id: params.item_id,
                    name: params.name.clone(),
                },
            )
            .await?;

        Ok(MethodResult::new(
            params.id,
            params.item_id,
            params.name,
            matched,
        ))
    }

    pub async fn mark_item(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<mark_item::MethodResult> {
        use mark_item::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let matched = self
            .apply(
                &params.id,
                user,
                operation,
                ListUpdate::CheckItem {
                    item_id: params.item_id,
                },
            )
            .await?;

        Ok(MethodResult::new(params.id, params.item_id, matched))
    }

    pub async fn remove_item(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<remove_item::MethodResult> {
        use remove_item::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let matched = self
            .apply(
                &params.id,
                user,
                operation,
                ListUpdate::PullItem {
                    item_id: params.item_id,
                },
            )
            .await?;

        Ok(MethodResult::new(params.id, params.item_id, matched))
    }

    pub async fn add_contributor(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<add_contributor::MethodResult> {
        use add_contributor::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let matched = self
            .apply(
                &params.id,
                user,
                operation,
                ListUpdate::AddContributor(params.user_id.clone()),
            )
            .await?;

        Ok(MethodResult::new(params.id, params.user_id, matched))
    }

    pub async fn remove_contributor(
        &self,
        user: &UserId,
        request: ApiRequest,
    ) -> AppResult<remove_contributor::MethodResult> {
        use remove_contributor::{MethodResult, Params};
        let operation = request.operation;
        let params = Params::try_from(request)?;

        let matched = self
            .apply(
                &params.id,
                user,
                operation,
                ListUpdate::PullContributor(params.user_id.clone()),
            )
            .await?;

        Ok(MethodResult::new(params.id, params.user_id, matched))
    }

    /// Load list `id` and check that `user` holds the capability `operation` requires.
    async fn authorize(
        &self,
        id: &ListId,
        user: &UserId,
        operation: Operation,
    ) -> AppResult<ShoppingList> {
        let capability = Capability::required_by(operation).ok_or_else(|| {
            AppError::internal_error()
                .with_context(&format!("'{}' does not address a list", operation))
        })?;

        let list = self
            .store
            .find_list(id)
            .await?
            .ok_or_else(|| list_not_found(id))?;

        let access = Access::classify(&list, user);
        if access.allows(capability) {
            Ok(list)
        } else {
            info!(
                "'{}' ({:?}) lacks {:?} on list '{}'",
                user, access, capability, id
            );
            Err(AppError::forbidden().with_message(&format!(
                "not permitted to perform this operation on list '{}'",
                id
            )))
        }
    }

    /// Authorize `operation`, then hand `update` to the store.
    ///
    /// Returns whether an element matched.
    async fn apply(
        &self,
        id: &ListId,
        user: &UserId,
        operation: Operation,
        update: ListUpdate,
    ) -> AppResult<bool> {
        self.authorize(id, user, operation).await?;

        let effect = self.store.update_list(id, &update).await?;

        // the list may have been deleted since it was authorized
        effect.matched().ok_or_else(|| list_not_found(id))
    }
}

fn list_not_found(id: &ListId) -> AppError {
    AppError::not_found().with_message(&format!("no list with id '{}'", id))
}

impl ParamsError for get_lists::InvalidParams {}
impl ParamsError for create_list::InvalidParams {}
impl ParamsError for get_list::InvalidParams {}
impl ParamsError for rename_list::InvalidParams {}
impl ParamsError for delete_list::InvalidParams {}
impl ParamsError for add_item::InvalidParams {}
impl ParamsError for rename_item::InvalidParams {}
impl ParamsError for mark_item::InvalidParams {}
impl ParamsError for remove_item::InvalidParams {}
impl ParamsError for add_contributor::InvalidParams {}
impl ParamsError for remove_contributor::InvalidParams {}
