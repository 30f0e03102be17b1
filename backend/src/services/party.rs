//! Client and supplier directory service

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use shared::models::{Client, Supplier};
use shared::validation::validate_email;

/// Client and supplier directory service
#[derive(Clone)]
pub struct PartyService {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    country_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Client {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            country_id: row.country_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SupplierRow {
    id: Uuid,
    name: String,
    contact_person: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SupplierRow> for Supplier {
    fn from(row: SupplierRow) -> Self {
        Supplier {
            id: row.id,
            name: row.name,
            contact_person: row.contact_person,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Input for creating or updating a client
#[derive(Debug, Deserialize)]
pub struct ClientInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub country_id: Option<Uuid>,
}

/// Input for creating or updating a supplier
#[derive(Debug, Deserialize)]
pub struct SupplierInput {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

fn check_party_fields(name: &str, email: Option<&str>) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Validation {
            field: "name".to_string(),
            message: "Name is required".to_string(),
        });
    }
    if let Some(email) = email {
        validate_email(email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
    }
    Ok(())
}

impl PartyService {
    /// Create a new PartyService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    pub async fn list_clients(&self) -> AppResult<Vec<Client>> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, contact_person, phone, email, country_id,
                   created_at, updated_at
            FROM clients
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_client(&self, client_id: Uuid) -> AppResult<Client> {
        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            SELECT id, name, contact_person, phone, email, country_id,
                   created_at, updated_at
            FROM clients
            WHERE id = $1
            "#,
        )
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(row.into())
    }

    pub async fn create_client(&self, input: ClientInput) -> AppResult<Client> {
        check_party_fields(&input.name, input.email.as_deref())?;

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            INSERT INTO clients (name, contact_person, phone, email, country_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, contact_person, phone, email, country_id,
                      created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.country_id)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn update_client(&self, client_id: Uuid, input: ClientInput) -> AppResult<Client> {
        check_party_fields(&input.name, input.email.as_deref())?;

        let row = sqlx::query_as::<_, ClientRow>(
            r#"
            UPDATE clients
            SET name = $1, contact_person = $2, phone = $3, email = $4,
                country_id = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING id, name, contact_person, phone, email, country_id,
                      created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(input.country_id)
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Client".to_string()))?;

        Ok(row.into())
    }

    pub async fn delete_client(&self, client_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM production_orders WHERE buyer_id = $1 OR consignee_id = $1",
        )
        .bind(client_id)
        .fetch_one(&self.db)
        .await?;
        if referenced > 0 {
            return Err(AppError::Conflict(
                "Client is referenced by production orders".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(client_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Client".to_string()));
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Suppliers
    // ------------------------------------------------------------------

    pub async fn list_suppliers(&self) -> AppResult<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, contact_person, phone, email, created_at, updated_at
            FROM suppliers
            ORDER BY name
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn get_supplier(&self, supplier_id: Uuid) -> AppResult<Supplier> {
        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            SELECT id, name, contact_person, phone, email, created_at, updated_at
            FROM suppliers
            WHERE id = $1
            "#,
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(row.into())
    }

    pub async fn create_supplier(&self, input: SupplierInput) -> AppResult<Supplier> {
        check_party_fields(&input.name, input.email.as_deref())?;

        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            INSERT INTO suppliers (name, contact_person, phone, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, contact_person, phone, email, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;

        Ok(row.into())
    }

    pub async fn update_supplier(
        &self,
        supplier_id: Uuid,
        input: SupplierInput,
    ) -> AppResult<Supplier> {
        check_party_fields(&input.name, input.email.as_deref())?;

        let row = sqlx::query_as::<_, SupplierRow>(
            r#"
            UPDATE suppliers
            SET name = $1, contact_person = $2, phone = $3, email = $4,
                updated_at = NOW()
            WHERE id = $5
            RETURNING id, name, contact_person, phone, email, created_at, updated_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        Ok(row.into())
    }

    pub async fn delete_supplier(&self, supplier_id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM purchases WHERE supplier_id = $1",
        )
        .bind(supplier_id)
        .fetch_one(&self.db)
        .await?;
        if referenced > 0 {
            return Err(AppError::Conflict(
                "Supplier is referenced by purchases".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(supplier_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}
