//! Entity to domain model mappers.

use tenant_resolver_sdk::{Organization, SubscriptionTier};

use super::entity;

impl From<entity::Model> for Organization {
    fn from(model: entity::Model) -> Self {
        Self {
            id: model.id,
            slug: model.slug,
            name: model.name,
            subscription_tier: SubscriptionTier::from_stored(&model.subscription_tier),
            custom_domain: model.custom_domain,
            custom_domain_verified: model.custom_domain_verified,
            custom_domain_bypass_verification: model.custom_domain_bypass_verification,
            custom_domain_txt_value: model.custom_domain_txt_value,
        }
    }
}

/// Convert a new organization to an insertable active model.
pub fn organization_to_active_model(org: &Organization, created_at: i64) -> entity::ActiveModel {
    use sea_orm::ActiveValue::Set;

    entity::ActiveModel {
        id: Set(org.id),
        slug: Set(org.slug.clone()),
        name: Set(org.name.clone()),
        subscription_tier: Set(org.subscription_tier.as_str().to_owned()),
        custom_domain: Set(org.custom_domain.clone()),
        custom_domain_verified: Set(org.custom_domain_verified),
        custom_domain_bypass_verification: Set(org.custom_domain_bypass_verification),
        custom_domain_txt_value: Set(org.custom_domain_txt_value.clone()),
        created_at: Set(created_at),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use sea_orm::ActiveValue;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn model_maps_tier_and_domain_fields() {
        let model = entity::Model {
            id: Uuid::new_v4(),
            slug: "acme".to_owned(),
            name: "Acme".to_owned(),
            subscription_tier: "enterprise".to_owned(),
            custom_domain: Some("acme.com".to_owned()),
            custom_domain_verified: true,
            custom_domain_bypass_verification: false,
            custom_domain_txt_value: Some("durj-verify=00".to_owned()),
            created_at: 0,
        };
        let org: Organization = model.clone().into();
        assert_eq!(org.subscription_tier, SubscriptionTier::Enterprise);
        assert_eq!(org.custom_domain, model.custom_domain);
        assert!(org.serves_custom_domain());
    }

    #[test]
    fn active_model_stores_tier_string() {
        let mut org = Organization::new(Uuid::new_v4(), "acme", "Acme");
        org.subscription_tier = SubscriptionTier::Starter;
        let am = organization_to_active_model(&org, 42);
        assert!(matches!(am.subscription_tier, ActiveValue::Set(ref t) if t == "starter"));
        assert!(matches!(am.created_at, ActiveValue::Set(42)));
    }
}
