use crate::models::{Category, CategoryCreate, CategoryUpdate};
use crate::repositories::user_repository::{
    classify_write_error, RepositoryError, RepositoryResult,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const CATEGORY_COLUMNS: &str =
    "id, name, description, difficulty_multiplier, is_active, created_at, updated_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, category: CategoryCreate) -> RepositoryResult<Category>;
    /// Inserts every category or none of them.
    async fn create_many(&self, categories: Vec<CategoryCreate>) -> RepositoryResult<Vec<Category>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Category>>;
    async fn find_existing_names(&self, names: Vec<String>) -> RepositoryResult<Vec<String>>;
    async fn list_active(&self) -> RepositoryResult<Vec<Category>>;
    async fn update(&self, id: i64, changes: CategoryUpdate) -> RepositoryResult<Category>;
}

pub struct SqliteCategoryRepository {
    pool: SqlitePool,
}

impl SqliteCategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

async fn insert_category<'e, E>(executor: E, category: &CategoryCreate) -> RepositoryResult<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO categories (name, description, difficulty_multiplier, is_active, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.name)
    .bind(&category.description)
    .bind(category.difficulty_multiplier)
    .bind(category.is_active)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await
    .map_err(classify_write_error)?;

    Ok(result.last_insert_rowid())
}

#[async_trait]
impl CategoryRepository for SqliteCategoryRepository {
    async fn create(&self, category: CategoryCreate) -> RepositoryResult<Category> {
        let id = insert_category(&self.pool, &category).await?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn create_many(&self, categories: Vec<CategoryCreate>) -> RepositoryResult<Vec<Category>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(categories.len());

        for category in &categories {
            let id = insert_category(&mut *tx, category).await?;
            let row = sqlx::query_as::<_, Category>(&format!(
                "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"
            ))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_by_name(&self, name: &str) -> RepositoryResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_existing_names(&self, names: Vec<String>) -> RepositoryResult<Vec<String>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT name FROM categories WHERE name IN (");
        let mut separated = builder.separated(", ");
        for name in &names {
            separated.push_bind(name);
        }
        separated.push_unseparated(") ORDER BY name");

        let existing: Vec<(String,)> = builder.build_query_as().fetch_all(&self.pool).await?;

        Ok(existing.into_iter().map(|(name,)| name).collect())
    }

    async fn list_active(&self) -> RepositoryResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE is_active = TRUE ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn update(&self, id: i64, changes: CategoryUpdate) -> RepositoryResult<Category> {
        let current = self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)?;

        sqlx::query(
            r#"
            UPDATE categories
            SET name = ?, description = ?, difficulty_multiplier = ?, is_active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(changes.name.unwrap_or(current.name))
        .bind(changes.description.unwrap_or(current.description))
        .bind(
            changes
                .difficulty_multiplier
                .unwrap_or(current.difficulty_multiplier),
        )
        .bind(changes.is_active.unwrap_or(current.is_active))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(classify_write_error)?;

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }
}
