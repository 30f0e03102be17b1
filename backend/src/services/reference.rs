//! Reference data service: marks, units, bag types, currencies, geography

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{BagType, City, Country, Currency, Mark, UnitType};

/// Reference data service
#[derive(Clone)]
pub struct ReferenceService {
    db: PgPool,
}

#[derive(Debug, Deserialize)]
pub struct MarkInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NameInput {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BagTypeInput {
    pub name: String,
    pub capacity_kg: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct CurrencyInput {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CityInput {
    pub country_id: Uuid,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct MarkRow {
    id: Uuid,
    name: String,
    description: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct NameRow {
    id: Uuid,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct BagTypeRow {
    id: Uuid,
    name: String,
    capacity_kg: Option<Decimal>,
}

#[derive(Debug, sqlx::FromRow)]
struct CurrencyRow {
    id: Uuid,
    code: String,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CityRow {
    id: Uuid,
    country_id: Uuid,
    name: String,
}

fn require_name(name: &str) -> AppResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    Ok(trimmed)
}

impl ReferenceService {
    /// Create a new ReferenceService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Marks
    // ------------------------------------------------------------------

    pub async fn list_marks(&self) -> AppResult<Vec<Mark>> {
        let rows = sqlx::query_as::<_, MarkRow>(
            "SELECT id, name, description FROM marks ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Mark {
                id: r.id,
                name: r.name,
                description: r.description,
            })
            .collect())
    }

    pub async fn create_mark(&self, input: MarkInput) -> AppResult<Mark> {
        let name = require_name(&input.name)?;
        let row = sqlx::query_as::<_, MarkRow>(
            "INSERT INTO marks (name, description) VALUES ($1, $2) \
             RETURNING id, name, description",
        )
        .bind(name)
        .bind(&input.description)
        .fetch_one(&self.db)
        .await?;

        Ok(Mark {
            id: row.id,
            name: row.name,
            description: row.description,
        })
    }

    // ------------------------------------------------------------------
    // Unit types
    // ------------------------------------------------------------------

    pub async fn list_unit_types(&self) -> AppResult<Vec<UnitType>> {
        let rows =
            sqlx::query_as::<_, NameRow>("SELECT id, name FROM unit_types ORDER BY name")
                .fetch_all(&self.db)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| UnitType { id: r.id, name: r.name })
            .collect())
    }

    pub async fn create_unit_type(&self, input: NameInput) -> AppResult<UnitType> {
        let name = require_name(&input.name)?;
        let row = sqlx::query_as::<_, NameRow>(
            "INSERT INTO unit_types (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(UnitType { id: row.id, name: row.name })
    }

    // ------------------------------------------------------------------
    // Bag types
    // ------------------------------------------------------------------

    pub async fn list_bag_types(&self) -> AppResult<Vec<BagType>> {
        let rows = sqlx::query_as::<_, BagTypeRow>(
            "SELECT id, name, capacity_kg FROM bag_types ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| BagType {
                id: r.id,
                name: r.name,
                capacity_kg: r.capacity_kg,
            })
            .collect())
    }

    pub async fn create_bag_type(&self, input: BagTypeInput) -> AppResult<BagType> {
        let name = require_name(&input.name)?;
        if let Some(capacity) = input.capacity_kg {
            if capacity <= Decimal::ZERO {
                return Err(AppError::Validation {
                    field: "capacity_kg".to_string(),
                    message: "Capacity must be positive".to_string(),
                });
            }
        }
        let row = sqlx::query_as::<_, BagTypeRow>(
            "INSERT INTO bag_types (name, capacity_kg) VALUES ($1, $2) \
             RETURNING id, name, capacity_kg",
        )
        .bind(name)
        .bind(input.capacity_kg)
        .fetch_one(&self.db)
        .await?;

        Ok(BagType {
            id: row.id,
            name: row.name,
            capacity_kg: row.capacity_kg,
        })
    }

    // ------------------------------------------------------------------
    // Currencies
    // ------------------------------------------------------------------

    pub async fn list_currencies(&self) -> AppResult<Vec<Currency>> {
        let rows = sqlx::query_as::<_, CurrencyRow>(
            "SELECT id, code, name FROM currencies ORDER BY code",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Currency {
                id: r.id,
                code: r.code,
                name: r.name,
            })
            .collect())
    }

    pub async fn create_currency(&self, input: CurrencyInput) -> AppResult<Currency> {
        let name = require_name(&input.name)?;
        let code = input.code.trim().to_uppercase();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::Validation {
                field: "code".to_string(),
                message: "Currency code must be a 3-letter ISO 4217 code".to_string(),
            });
        }
        let row = sqlx::query_as::<_, CurrencyRow>(
            "INSERT INTO currencies (code, name) VALUES ($1, $2) \
             RETURNING id, code, name",
        )
        .bind(&code)
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(Currency {
            id: row.id,
            code: row.code,
            name: row.name,
        })
    }

    // ------------------------------------------------------------------
    // Geography
    // ------------------------------------------------------------------

    pub async fn list_countries(&self) -> AppResult<Vec<Country>> {
        let rows =
            sqlx::query_as::<_, NameRow>("SELECT id, name FROM countries ORDER BY name")
                .fetch_all(&self.db)
                .await?;

        Ok(rows
            .into_iter()
            .map(|r| Country { id: r.id, name: r.name })
            .collect())
    }

    pub async fn create_country(&self, input: NameInput) -> AppResult<Country> {
        let name = require_name(&input.name)?;
        let row = sqlx::query_as::<_, NameRow>(
            "INSERT INTO countries (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(Country { id: row.id, name: row.name })
    }

    /// List cities, optionally filtered to a single country
    pub async fn list_cities(&self, country_id: Option<Uuid>) -> AppResult<Vec<City>> {
        let rows = match country_id {
            Some(country_id) => {
                sqlx::query_as::<_, CityRow>(
                    "SELECT id, country_id, name FROM cities \
                     WHERE country_id = $1 ORDER BY name",
                )
                .bind(country_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, CityRow>(
                    "SELECT id, country_id, name FROM cities ORDER BY name",
                )
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(rows
            .into_iter()
            .map(|r| City {
                id: r.id,
                country_id: r.country_id,
                name: r.name,
            })
            .collect())
    }

    pub async fn create_city(&self, input: CityInput) -> AppResult<City> {
        let name = require_name(&input.name)?;
        let country = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM countries WHERE id = $1",
        )
        .bind(input.country_id)
        .fetch_one(&self.db)
        .await?;
        if country == 0 {
            return Err(AppError::NotFound("Country".to_string()));
        }

        let row = sqlx::query_as::<_, CityRow>(
            "INSERT INTO cities (country_id, name) VALUES ($1, $2) \
             RETURNING id, country_id, name",
        )
        .bind(input.country_id)
        .bind(name)
        .fetch_one(&self.db)
        .await?;

        Ok(City {
            id: row.id,
            country_id: row.country_id,
            name: row.name,
        })
    }
}
