use super::models::{Category, CategoryInput, Operation, OperationInput, User};
use anyhow::Result;
use std::sync::Arc;
use uuid::Uuid;

/// Abstraction for relational persistence of users, categories and operations.
///
/// Every category/operation method is scoped by the owning user id, so a
/// caller can never touch another user's rows by guessing an id.
#[async_trait::async_trait]
pub trait Repository: Send + Sync {
    // ---
    /// Cheap connectivity check used by the full health check.
    async fn ping(&self) -> Result<()>;

    /// Persist a user built by [`User::new`]. Fails if the email is taken.
    async fn create_user(&self, user: &User) -> Result<()>;

    /// Get user by email.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn create_category(&self, category: &Category) -> Result<()>;

    async fn get_category(&self, user_id: Uuid, id: Uuid) -> Result<Option<Category>>;

    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>>;

    /// Returns the updated row, or `None` if the user owns no such category.
    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Option<Category>>;

    /// Returns `false` if nothing was deleted.
    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<bool>;

    async fn create_operation(&self, operation: &Operation) -> Result<()>;

    async fn get_operations(&self, user_id: Uuid) -> Result<Vec<Operation>>;

    /// Returns the updated row, or `None` if the user owns no such operation.
    async fn update_operation(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: OperationInput,
    ) -> Result<Option<Operation>>;

    /// Returns `false` if nothing was deleted.
    async fn delete_operation(&self, user_id: Uuid, id: Uuid) -> Result<bool>;
}

/// Type alias for any backend that implements Repository.
pub type RepositoryPtr = Arc<dyn Repository>;
