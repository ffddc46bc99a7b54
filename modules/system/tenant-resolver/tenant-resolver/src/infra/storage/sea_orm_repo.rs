use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};
use tenant_resolver_sdk::{Organization, OrganizationId};

use crate::domain::repo::OrganizationRepository;

use super::entity::{Column, Entity as OrganizationEntity};
use super::mapper::organization_to_active_model;

pub struct SeaOrmOrganizationRepository {
    db: DatabaseConnection,
}

impl SeaOrmOrganizationRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_one(&self, condition: Condition) -> anyhow::Result<Option<Organization>> {
        let model = OrganizationEntity::find()
            .filter(condition)
            .one(&self.db)
            .await?;
        Ok(model.map(Into::into))
    }
}

#[async_trait]
impl OrganizationRepository for SeaOrmOrganizationRepository {
    async fn find_by_id(&self, id: OrganizationId) -> anyhow::Result<Option<Organization>> {
        let model = OrganizationEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn find_by_slug(&self, slug: &str) -> anyhow::Result<Option<Organization>> {
        self.find_one(Condition::all().add(Column::Slug.eq(slug)))
            .await
    }

    async fn find_by_custom_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>> {
        self.find_one(Condition::all().add(Column::CustomDomain.eq(domain)))
            .await
    }

    async fn find_serving_domain(&self, domain: &str) -> anyhow::Result<Option<Organization>> {
        self.find_one(
            Condition::all().add(Column::CustomDomain.eq(domain)).add(
                Condition::any()
                    .add(Column::CustomDomainVerified.eq(true))
                    .add(Column::CustomDomainBypassVerification.eq(true)),
            ),
        )
        .await
    }

    async fn create(&self, org: Organization) -> anyhow::Result<Organization> {
        let active_model =
            organization_to_active_model(&org, chrono::Utc::now().timestamp_millis());
        OrganizationEntity::insert(active_model)
            .exec_without_returning(&self.db)
            .await?;
        Ok(org)
    }

    async fn set_domain_claim(
        &self,
        id: OrganizationId,
        domain: &str,
        txt_value: &str,
    ) -> anyhow::Result<bool> {
        let result = OrganizationEntity::update_many()
            .col_expr(Column::CustomDomain, Expr::value(domain))
            .col_expr(Column::CustomDomainTxtValue, Expr::value(txt_value))
            .col_expr(Column::CustomDomainVerified, Expr::value(false))
            .col_expr(Column::CustomDomainBypassVerification, Expr::value(false))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_domain_verified(&self, id: OrganizationId) -> anyhow::Result<bool> {
        let result = OrganizationEntity::update_many()
            .col_expr(Column::CustomDomainVerified, Expr::value(true))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear_custom_domain(&self, id: OrganizationId) -> anyhow::Result<bool> {
        let result = OrganizationEntity::update_many()
            .col_expr(Column::CustomDomain, Expr::value(Option::<String>::None))
            .col_expr(
                Column::CustomDomainTxtValue,
                Expr::value(Option::<String>::None),
            )
            .col_expr(Column::CustomDomainVerified, Expr::value(false))
            .col_expr(Column::CustomDomainBypassVerification, Expr::value(false))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
