use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Category, CategoryInput, Operation, OperationInput, Repository, RepositoryPtr, User,
};

const CATEGORY_COLUMNS: &str = "id, user_id, name, kind, color, icon, created_at, updated_at";
const OPERATION_COLUMNS: &str =
    "id, user_id, category_id, amount, currency, name, comment, kind, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    user_id: Uuid,
    name: String,
    kind: String,
    color: Option<String>,
    icon: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = anyhow::Error;

    fn try_from(r: CategoryRow) -> Result<Self> {
        Ok(Category {
            id: r.id,
            user_id: r.user_id,
            name: r.name,
            kind: r.kind.parse()?,
            color: r.color,
            icon: r.icon,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OperationRow {
    id: Uuid,
    user_id: Uuid,
    category_id: Uuid,
    amount: i64,
    currency: String,
    name: String,
    comment: Option<String>,
    kind: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OperationRow> for Operation {
    type Error = anyhow::Error;

    fn try_from(r: OperationRow) -> Result<Self> {
        Ok(Operation {
            id: r.id,
            user_id: r.user_id,
            category_id: r.category_id,
            amount: r.amount,
            currency: r.currency,
            name: r.name,
            comment: r.comment,
            kind: r.kind.parse()?,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

pub fn create_postgres_repository(pool: PgPool) -> RepositoryPtr {
    // ---
    Arc::new(PostgresRepository::new(pool))
}

pub struct PostgresRepository {
    // ---
    pool: PgPool,
}

impl PostgresRepository {
    // ---
    pub fn new(pool: PgPool) -> Self {
        // ---
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Repository for PostgresRepository {
    // ---
    async fn ping(&self) -> Result<()> {
        // ---
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_user(&self, user: &User) -> Result<()> {
        // ---
        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        // ---
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn create_category(&self, category: &Category) -> Result<()> {
        // ---
        sqlx::query(
            "INSERT INTO categories (id, user_id, name, kind, color, icon, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(category.id)
        .bind(category.user_id)
        .bind(&category.name)
        .bind(category.kind.as_str())
        .bind(&category.color)
        .bind(&category.icon)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_category(&self, user_id: Uuid, id: Uuid) -> Result<Option<Category>> {
        // ---
        let sql =
            format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1 AND user_id = $2");
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Category::try_from).transpose()
    }

    async fn get_categories(&self, user_id: Uuid) -> Result<Vec<Category>> {
        // ---
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE user_id = $1 ORDER BY created_at"
        );
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Category::try_from).collect()
    }

    async fn update_category(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: CategoryInput,
    ) -> Result<Option<Category>> {
        // ---
        let sql = format!(
            "UPDATE categories SET name = $1, kind = $2, color = $3, icon = $4, updated_at = $5
             WHERE id = $6 AND user_id = $7
             RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(&input.name)
            .bind(input.kind.as_str())
            .bind(&input.color)
            .bind(&input.icon)
            .bind(Utc::now())
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Category::try_from).transpose()
    }

    async fn delete_category(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        // ---
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_operation(&self, operation: &Operation) -> Result<()> {
        // ---
        sqlx::query(
            "INSERT INTO operations
               (id, user_id, category_id, amount, currency, name, comment, kind,
                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(operation.id)
        .bind(operation.user_id)
        .bind(operation.category_id)
        .bind(operation.amount)
        .bind(&operation.currency)
        .bind(&operation.name)
        .bind(&operation.comment)
        .bind(operation.kind.as_str())
        .bind(operation.created_at)
        .bind(operation.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_operations(&self, user_id: Uuid) -> Result<Vec<Operation>> {
        // ---
        let sql = format!(
            "SELECT {OPERATION_COLUMNS} FROM operations WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OperationRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Operation::try_from).collect()
    }

    async fn update_operation(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: OperationInput,
    ) -> Result<Option<Operation>> {
        // ---
        let sql = format!(
            "UPDATE operations
             SET category_id = $1, amount = $2, currency = $3, name = $4, comment = $5,
                 kind = $6, updated_at = $7
             WHERE id = $8 AND user_id = $9
             RETURNING {OPERATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OperationRow>(&sql)
            .bind(input.category_id)
            .bind(input.amount)
            .bind(&input.currency)
            .bind(&input.name)
            .bind(&input.comment)
            .bind(input.kind.as_str())
            .bind(Utc::now())
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Operation::try_from).transpose()
    }

    async fn delete_operation(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        // ---
        let result = sqlx::query("DELETE FROM operations WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
