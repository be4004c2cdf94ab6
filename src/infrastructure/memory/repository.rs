use crate::domain::{
    Category, CategoryInput, Operation, OperationInput, Repository, User,
};
use anyhow::{bail, Result};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    categories: HashMap<Uuid, Category>,
    operations: HashMap<Uuid, Operation>,
}

/// Repository enforcing the same ownership and uniqueness rules as the SQL schema.
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl Repository for MemoryRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        // ---
        let mut tables = self.tables.write();
        if tables.users.values().any(|u| u.email == user.email) {
            bail!("email already registered");
        }
        if tables.users.contains_key(&user.id) {
            bail!("user id already exists");
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // ---
        Ok(self
            .tables
            .read()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn create_category(&self, category: &Category) -> Result<()> {
        // ---
        let mut tables = self.tables.write();
        if !tables.users.contains_key(&category.user_id) {
            bail!("unknown user {}", category.user_id);
        }
        tables.categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn get_category(&self, user_id: Uuid, id: Uuid) -> Result<Option<Category>> {
        // ---
        Ok(self
            .tables
            .read()
            .categories
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>> {
        // ---
        let mut categories: Vec<Category> = self
            .tables
            .read()
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by_key(|c| c.created_at);
        Ok(categories)
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Option<Category>> {
        // ---
        let mut tables = self.tables.write();
        let Some(category) = tables
            .categories
            .get_mut(&id)
            .filter(|c| c.user_id == user_id)
        else {
            return Ok(None);
        };

        category.name = input.name;
        category.kind = input.kind;
        category.color = input.color;
        category.icon = input.icon;
        category.updated_at = Utc::now();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        // ---
        let mut tables = self.tables.write();
        let owned = tables
            .categories
            .get(&id)
            .is_some_and(|c| c.user_id == user_id);
        if !owned {
            return Ok(false);
        }

        tables.categories.remove(&id);
        tables.operations.retain(|_, op| op.category_id != id);
        Ok(true)
    }

    async fn create_operation(&self, operation: &Operation) -> Result<()> {
        // ---
        let mut tables = self.tables.write();
        if !tables.categories.contains_key(&operation.category_id) {
            bail!("unknown category {}", operation.category_id);
        }
        tables.operations.insert(operation.id, operation.clone());
        Ok(())
    }

    async fn get_operations(&self, user_id: Uuid) -> Result<Vec<Operation>> {
        // ---
        let mut operations: Vec<Operation> = self
            .tables
            .read()
            .operations
            .values()
            .filter(|op| op.user_id == user_id)
            .cloned()
            .collect();
        operations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(operations)
    }

    async fn update_operation(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: OperationInput,
    ) -> Result<Option<Operation>> {
        // ---
        let mut tables = self.tables.write();
        if !tables.categories.contains_key(&input.category_id) {
            bail!("unknown category {}", input.category_id);
        }
        let Some(operation) = tables
            .operations
            .get_mut(&id)
            .filter(|op| op.user_id == user_id)
        else {
            return Ok(None);
        };

        operation.category_id = input.category_id;
        operation.amount = input.amount;
        operation.currency = input.currency;
        operation.name = input.name;
        operation.comment = input.comment;
        operation.kind = input.kind;
        operation.updated_at = Utc::now();
        Ok(Some(operation.clone()))
    }

    async fn delete_operation(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        // ---
        let mut tables = self.tables.write();
        let owned = tables
            .operations
            .get(&id)
            .is_some_and(|op| op.user_id == user_id);
        if owned {
            tables.operations.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryKind;

    fn category_input(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            kind: EntryKind::Expense,
            color: None,
            icon: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_rejected() {
        // ---
        let repo = MemoryRepository::new();
        repo.create_user(&User::new("a@b.io".to_string(), None)).await.unwrap();
        assert!(repo.create_user(&User::new("a@b.io".to_string(), None)).await.is_err());
    }

    #[tokio::test]
    async fn categories_are_owner_scoped() {
        // ---
        let repo = MemoryRepository::new();
        let owner = User::new("owner@b.io".to_string(), None);
        let other = User::new("other@b.io".to_string(), None);
        repo.create_user(&owner).await.unwrap();
        repo.create_user(&other).await.unwrap();

        let category = Category::new(owner.id, category_input("Rent"));
        repo.create_category(&category).await.unwrap();

        assert!(repo.get_categories(other.id).await.unwrap().is_empty());
        assert!(repo
            .update_category(other.id, category.id, category_input("Hijacked"))
            .await
            .unwrap()
            .is_none());
        assert!(!repo.delete_category(other.id, category.id).await.unwrap());
        assert_eq!(repo.get_categories(owner.id).await.unwrap()[0].name, "Rent");
    }

    #[tokio::test]
    async fn deleting_category_cascades_to_operations() {
        // ---
        let repo = MemoryRepository::new();
        let owner = User::new("owner@b.io".to_string(), None);
        repo.create_user(&owner).await.unwrap();
        let category = Category::new(owner.id, category_input("Food"));
        repo.create_category(&category).await.unwrap();

        let operation = Operation::new(
            owner.id,
            OperationInput {
                category_id: category.id,
                amount: 499,
                currency: "USD".to_string(),
                name: "Lunch".to_string(),
                comment: None,
                kind: EntryKind::Expense,
            },
        );
        repo.create_operation(&operation).await.unwrap();
        assert_eq!(repo.get_operations(owner.id).await.unwrap().len(), 1);

        assert!(repo.delete_category(owner.id, category.id).await.unwrap());
        assert!(repo.get_operations(owner.id).await.unwrap().is_empty());
    }
}
