//! Recipe service
//!
//! One recipe per production order, attached during the review phase and
//! frozen once production starts.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{ProductionOrderStatus, Recipe, RecipeLine};
use shared::validation::validate_recipe;

/// Recipe service
#[derive(Clone)]
pub struct RecipeService {
    db: PgPool,
}

/// Database row for a recipe
#[derive(Debug, sqlx::FromRow)]
struct RecipeRow {
    id: Uuid,
    production_order_id: Uuid,
    raw_materials: serde_json::Value,
    by_product: Option<serde_json::Value>,
    chemicals: Option<String>,
    additive: Option<String>,
    device: Option<String>,
    lot_number: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl RecipeRow {
    fn into_recipe(self) -> AppResult<Recipe> {
        let raw_materials: Vec<RecipeLine> = serde_json::from_value(self.raw_materials)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let by_product: Option<RecipeLine> = match self.by_product {
            Some(value) => {
                Some(serde_json::from_value(value).map_err(|e| AppError::Internal(e.to_string()))?)
            }
            None => None,
        };

        Ok(Recipe {
            id: self.id,
            production_order_id: self.production_order_id,
            raw_materials,
            by_product,
            chemicals: self.chemicals,
            additive: self.additive,
            device: self.device,
            lot_number: self.lot_number,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Input for attaching a recipe to an order
#[derive(Debug, Deserialize)]
pub struct CreateRecipeInput {
    pub production_order_id: Uuid,
    pub raw_materials: Vec<RecipeLine>,
    pub by_product: Option<RecipeLine>,
    pub chemicals: Option<String>,
    pub additive: Option<String>,
    pub device: Option<String>,
    pub lot_number: String,
}

/// Input for editing a recipe before production starts
#[derive(Debug, Deserialize)]
pub struct UpdateRecipeInput {
    pub raw_materials: Vec<RecipeLine>,
    pub by_product: Option<RecipeLine>,
    pub chemicals: Option<String>,
    pub additive: Option<String>,
    pub device: Option<String>,
    pub lot_number: String,
}

impl RecipeService {
    /// Create a new RecipeService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Attach a recipe to a production order
    pub async fn create_recipe(&self, input: CreateRecipeInput) -> AppResult<Recipe> {
        let status = self.order_status(input.production_order_id).await?;
        if status.production_started() {
            return Err(AppError::Conflict(format!(
                "Recipes cannot be attached once production has started (status: {})",
                status
            )));
        }

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM recipes WHERE production_order_id = $1",
        )
        .bind(input.production_order_id)
        .fetch_one(&self.db)
        .await?;
        if existing > 0 {
            return Err(AppError::Conflict(
                "A recipe already exists for this order".to_string(),
            ));
        }

        let recipe = self.build_recipe(
            Uuid::new_v4(),
            input.production_order_id,
            input.raw_materials,
            input.by_product,
            input.chemicals,
            input.additive,
            input.device,
            input.lot_number,
        )?;

        let raw_materials = serde_json::to_value(&recipe.raw_materials)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let by_product = match &recipe.by_product {
            Some(line) => {
                Some(serde_json::to_value(line).map_err(|e| AppError::Internal(e.to_string()))?)
            }
            None => None,
        };

        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            INSERT INTO recipes
                (production_order_id, raw_materials, by_product, chemicals,
                 additive, device, lot_number)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, production_order_id, raw_materials, by_product,
                      chemicals, additive, device, lot_number, created_at, updated_at
            "#,
        )
        .bind(recipe.production_order_id)
        .bind(&raw_materials)
        .bind(&by_product)
        .bind(&recipe.chemicals)
        .bind(&recipe.additive)
        .bind(&recipe.device)
        .bind(&recipe.lot_number)
        .fetch_one(&self.db)
        .await?;

        row.into_recipe()
    }

    /// Get a recipe by ID
    pub async fn get_recipe(&self, recipe_id: Uuid) -> AppResult<Recipe> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, production_order_id, raw_materials, by_product,
                   chemicals, additive, device, lot_number, created_at, updated_at
            FROM recipes
            WHERE id = $1
            "#,
        )
        .bind(recipe_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Recipe".to_string()))?;

        row.into_recipe()
    }

    /// Get the recipe attached to an order, if any
    pub async fn get_recipe_by_order(&self, order_id: Uuid) -> AppResult<Option<Recipe>> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, production_order_id, raw_materials, by_product,
                   chemicals, additive, device, lot_number, created_at, updated_at
            FROM recipes
            WHERE production_order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(RecipeRow::into_recipe).transpose()
    }

    /// Edit a recipe before its order enters production
    pub async fn update_recipe(
        &self,
        recipe_id: Uuid,
        input: UpdateRecipeInput,
    ) -> AppResult<Recipe> {
        let current = self.get_recipe(recipe_id).await?;
        let status = self.order_status(current.production_order_id).await?;
        if status.production_started() {
            return Err(AppError::Conflict(format!(
                "Recipes are frozen once production has started (status: {})",
                status
            )));
        }

        let recipe = self.build_recipe(
            recipe_id,
            current.production_order_id,
            input.raw_materials,
            input.by_product,
            input.chemicals,
            input.additive,
            input.device,
            input.lot_number,
        )?;

        let raw_materials = serde_json::to_value(&recipe.raw_materials)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let by_product = match &recipe.by_product {
            Some(line) => {
                Some(serde_json::to_value(line).map_err(|e| AppError::Internal(e.to_string()))?)
            }
            None => None,
        };

        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            UPDATE recipes
            SET raw_materials = $1, by_product = $2, chemicals = $3,
                additive = $4, device = $5, lot_number = $6, updated_at = NOW()
            WHERE id = $7
            RETURNING id, production_order_id, raw_materials, by_product,
                      chemicals, additive, device, lot_number, created_at, updated_at
            "#,
        )
        .bind(&raw_materials)
        .bind(&by_product)
        .bind(&recipe.chemicals)
        .bind(&recipe.additive)
        .bind(&recipe.device)
        .bind(&recipe.lot_number)
        .bind(recipe_id)
        .fetch_one(&self.db)
        .await?;

        row.into_recipe()
    }

    /// Delete a recipe before its order enters production
    pub async fn delete_recipe(&self, recipe_id: Uuid) -> AppResult<()> {
        let current = self.get_recipe(recipe_id).await?;
        let status = self.order_status(current.production_order_id).await?;
        if status.production_started() {
            return Err(AppError::Conflict(
                "Recipes cannot be removed once production has started".to_string(),
            ));
        }

        sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn build_recipe(
        &self,
        id: Uuid,
        production_order_id: Uuid,
        raw_materials: Vec<RecipeLine>,
        by_product: Option<RecipeLine>,
        chemicals: Option<String>,
        additive: Option<String>,
        device: Option<String>,
        lot_number: String,
    ) -> AppResult<Recipe> {
        let now = Utc::now();
        let recipe = Recipe {
            id,
            production_order_id,
            raw_materials,
            by_product,
            chemicals,
            additive,
            device,
            lot_number,
            created_at: now,
            updated_at: now,
        };
        validate_recipe(&recipe).map_err(|msg| AppError::ValidationError(msg.to_string()))?;
        Ok(recipe)
    }

    async fn order_status(&self, order_id: Uuid) -> AppResult<ProductionOrderStatus> {
        let status =
            sqlx::query_scalar::<_, String>("SELECT status FROM production_orders WHERE id = $1")
                .bind(order_id)
                .fetch_optional(&self.db)
                .await?
                .ok_or_else(|| AppError::NotFound("Production order".to_string()))?;

        ProductionOrderStatus::from_str(&status).map_err(AppError::Internal)
    }
}
