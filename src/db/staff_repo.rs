// src/db/staff_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::staff::{Employee, EmployeePayload, Payment, PaymentListEntry, PaymentPayload},
};

#[derive(Clone, Copy, Default)]
pub struct StaffRepository;

impl StaffRepository {
    pub fn new() -> Self {
        Self
    }

    // =========================================================================
    //  FUNCIONÁRIOS
    // =========================================================================

    pub async fn list_employees<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(employees)
    }

    pub async fn find_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            "SELECT * FROM employees WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(employee)
    }

    pub async fn create_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &EmployeePayload,
    ) -> Result<Employee, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            INSERT INTO employees (id, tenant_id, name, tax_id, phone, role, base_salary)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(&payload.name)
        .bind(&payload.tax_id)
        .bind(&payload.phone)
        .bind(&payload.role)
        .bind(payload.base_salary)
        .fetch_one(executor)
        .await?;

        Ok(employee)
    }

    pub async fn update_employee<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        payload: &EmployeePayload,
    ) -> Result<Option<Employee>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let employee = sqlx::query_as::<_, Employee>(
            r#"
            UPDATE employees
            SET name = $3, tax_id = $4, phone = $5, role = $6, base_salary = $7, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(id)
        .bind(&payload.name)
        .bind(&payload.tax_id)
        .bind(&payload.phone)
        .bind(&payload.role)
        .bind(payload.base_salary)
        .fetch_optional(executor)
        .await?;

        Ok(employee)
    }

    // Funcionário com pagamentos dispara violação de FK (23503).
    pub async fn delete_employee<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM employees WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }

    // =========================================================================
    //  PAGAMENTOS (folha)
    // =========================================================================

    pub async fn list_payments<'e, E>(&self, executor: E, tenant_id: Uuid) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE tenant_id = $1 ORDER BY date DESC, created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(payments)
    }

    /// Listagem da tela de pagamentos, já com o nome do funcionário.
    pub async fn list_payment_entries<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<PaymentListEntry>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entries = sqlx::query_as::<_, PaymentListEntry>(
            r#"
            SELECT p.id, p.date, p.description, p.gross_value, p.discounts, p.net_value,
                   p.employee_id, e.name AS employee_name
            FROM payments p
            JOIN employees e ON e.tenant_id = p.tenant_id AND e.id = p.employee_id
            WHERE p.tenant_id = $1
            ORDER BY p.date DESC, p.created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(entries)
    }

    pub async fn find_payment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(payment)
    }

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        payload: &PaymentPayload,
        net_value: Decimal,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (id, tenant_id, employee_id, date, description, gross_value, discounts, net_value)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(payload.employee_id)
        .bind(payload.date)
        .bind(&payload.description)
        .bind(payload.gross_value)
        .bind(payload.discounts)
        .bind(net_value)
        .fetch_one(executor)
        .await?;

        Ok(payment)
    }

    pub async fn delete_payment<'e, E>(&self, executor: E, tenant_id: Uuid, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM payments WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
