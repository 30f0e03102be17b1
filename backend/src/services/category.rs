//! Category service
//!
//! Categories are stored flat and assembled into a forest on read; the
//! parent-selector options exclude a category and its descendants so a
//! node can never become its own ancestor.

use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{build_category_tree, descendant_ids, parent_options, Category, CategoryNode};

/// Category service
#[derive(Clone)]
pub struct CategoryService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    parent_id: Option<Uuid>,
    name: String,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            parent_id: row.parent_id,
            name: row.name,
        }
    }
}

/// Input for creating or updating a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub parent_id: Option<Uuid>,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// List all categories flat
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, parent_id, name FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Assemble the category forest for display
    pub async fn category_tree(&self) -> AppResult<Vec<CategoryNode>> {
        let categories = self.list_categories().await?;
        Ok(build_category_tree(&categories))
    }

    /// Categories selectable as `category_id`'s new parent
    pub async fn parent_options(&self, category_id: Uuid) -> AppResult<Vec<Category>> {
        let categories = self.list_categories().await?;
        if !categories.iter().any(|c| c.id == category_id) {
            return Err(AppError::NotFound("Category".to_string()));
        }
        Ok(parent_options(&categories, category_id))
    }

    /// Create a category
    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
            });
        }

        if let Some(parent_id) = input.parent_id {
            let exists =
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE id = $1")
                    .bind(parent_id)
                    .fetch_one(&self.db)
                    .await?;
            if exists == 0 {
                return Err(AppError::NotFound("Parent category".to_string()));
            }
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            INSERT INTO categories (name, parent_id)
            VALUES ($1, $2)
            RETURNING id, parent_id, name
            "#,
        )
        .bind(input.name.trim())
        .bind(input.parent_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Rename or re-parent a category. A category cannot be moved under
    /// itself or one of its descendants.
    pub async fn update_category(
        &self,
        category_id: Uuid,
        input: CategoryInput,
    ) -> AppResult<Category> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Category name is required".to_string(),
            });
        }

        let categories = self.list_categories().await?;
        if !categories.iter().any(|c| c.id == category_id) {
            return Err(AppError::NotFound("Category".to_string()));
        }

        if let Some(parent_id) = input.parent_id {
            if parent_id == category_id
                || descendant_ids(&categories, category_id).contains(&parent_id)
            {
                return Err(AppError::Validation {
                    field: "parent_id".to_string(),
                    message: "A category cannot be its own ancestor".to_string(),
                });
            }
            if !categories.iter().any(|c| c.id == parent_id) {
                return Err(AppError::NotFound("Parent category".to_string()));
            }
        }

        let row = sqlx::query_as::<_, CategoryRow>(
            r#"
            UPDATE categories SET name = $1, parent_id = $2
            WHERE id = $3
            RETURNING id, parent_id, name
            "#,
        )
        .bind(input.name.trim())
        .bind(input.parent_id)
        .bind(category_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    /// Delete a leaf category
    pub async fn delete_category(&self, category_id: Uuid) -> AppResult<()> {
        let children =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM categories WHERE parent_id = $1")
                .bind(category_id)
                .fetch_one(&self.db)
                .await?;
        if children > 0 {
            return Err(AppError::Conflict(
                "Delete or move the subcategories first".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(category_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }
}
