// src/services/staff_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    cache::{CacheScope, CacheTag, InvalidationBus, TaggedCache},
    common::{db_utils::begin_tenant_tx, error::AppError},
    db::StaffRepository,
    models::staff::{
        Employee, EmployeePayload, Payment, PaymentDetail, PaymentListEntry, PaymentPayload,
    },
};

#[derive(Clone)]
pub struct StaffService {
    pool: PgPool,
    staff_repo: StaffRepository,
    cache: TaggedCache,
}

impl StaffService {
    pub fn new(pool: PgPool, staff_repo: StaffRepository, cache: TaggedCache) -> Self {
        Self { pool, staff_repo, cache }
    }

    // --- FUNCIONÁRIOS ---

    pub async fn list_employees(&self, tenant_id: Uuid) -> Result<Vec<Employee>, AppError> {
        let tag = CacheTag::new(CacheScope::Employees, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let employees = self.staff_repo.list_employees(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(employees)
            })
            .await
    }

    pub async fn create_employee(&self, tenant_id: Uuid, payload: EmployeePayload) -> Result<Employee, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let employee = self.staff_repo.create_employee(&mut *tx, tenant_id, &payload).await?;
        tx.commit().await?;

        self.cache
            .invalidate_all(tenant_id, &[CacheScope::Employees, CacheScope::BackupSummary]);
        Ok(employee)
    }

    pub async fn update_employee(
        &self,
        tenant_id: Uuid,
        id: Uuid,
        payload: EmployeePayload,
    ) -> Result<Employee, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let employee = self
            .staff_repo
            .update_employee(&mut *tx, tenant_id, id, &payload)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;
        tx.commit().await?;

        // A lista de pagamentos mostra o nome do funcionário.
        self.cache.invalidate_all(
            tenant_id,
            &[CacheScope::Employees, CacheScope::Payments, CacheScope::BackupSummary],
        );
        Ok(employee)
    }

    pub async fn delete_employee(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let deleted = self
            .staff_repo
            .delete_employee(&mut *tx, tenant_id, id)
            .await
            .map_err(|e| {
                AppError::from_delete(
                    e,
                    "Não é possível excluir este funcionário pois existem pagamentos associados a ele",
                )
            })?;
        if deleted == 0 {
            return Err(AppError::NotFound("Funcionário"));
        }
        tx.commit().await?;

        self.cache
            .invalidate_all(tenant_id, &[CacheScope::Employees, CacheScope::BackupSummary]);
        Ok(())
    }

    // --- PAGAMENTOS ---

    pub async fn list_payments(&self, tenant_id: Uuid) -> Result<Vec<PaymentListEntry>, AppError> {
        let tag = CacheTag::new(CacheScope::Payments, tenant_id);
        self.cache
            .get_or_load(tag, || async {
                let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
                let entries = self.staff_repo.list_payment_entries(&mut *tx, tenant_id).await?;
                tx.commit().await?;
                Ok(entries)
            })
            .await
    }

    /// Pagamento com o funcionário completo (recibo).
    pub async fn get_payment(&self, tenant_id: Uuid, id: Uuid) -> Result<PaymentDetail, AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        let payment = self
            .staff_repo
            .find_payment(&mut *tx, tenant_id, id)
            .await?
            .ok_or(AppError::NotFound("Pagamento"))?;
        let employee = self
            .staff_repo
            .find_employee(&mut *tx, tenant_id, payment.employee_id)
            .await?
            .ok_or(AppError::NotFound("Funcionário"))?;
        tx.commit().await?;

        Ok(PaymentDetail { payment, employee })
    }

    pub async fn create_payment(&self, tenant_id: Uuid, payload: PaymentPayload) -> Result<Payment, AppError> {
        let net_value = Payment::compute_net_value(payload.gross_value, payload.discounts);

        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        if self
            .staff_repo
            .find_employee(&mut *tx, tenant_id, payload.employee_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Funcionário"));
        }
        let payment = self
            .staff_repo
            .create_payment(&mut *tx, tenant_id, &payload, net_value)
            .await?;
        tx.commit().await?;

        self.cache
            .invalidate_all(tenant_id, &[CacheScope::Payments, CacheScope::BackupSummary]);
        Ok(payment)
    }

    pub async fn delete_payment(&self, tenant_id: Uuid, id: Uuid) -> Result<(), AppError> {
        let mut tx = begin_tenant_tx(&self.pool, tenant_id).await?;
        if self.staff_repo.delete_payment(&mut *tx, tenant_id, id).await? == 0 {
            return Err(AppError::NotFound("Pagamento"));
        }
        tx.commit().await?;

        self.cache
            .invalidate_all(tenant_id, &[CacheScope::Payments, CacheScope::BackupSummary]);
        Ok(())
    }
}
