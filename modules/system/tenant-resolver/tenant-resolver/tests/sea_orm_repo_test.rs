//! SeaORM organization repository against in-memory SQLite.

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tenant_resolver::domain::repo::OrganizationRepository;
use tenant_resolver::infra::storage::{Migrator, SeaOrmOrganizationRepository};
use tenant_resolver_sdk::{Organization, SubscriptionTier};
use uuid::Uuid;

async fn setup() -> (DatabaseConnection, SeaOrmOrganizationRepository) {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    (db.clone(), SeaOrmOrganizationRepository::new(db))
}

#[tokio::test]
async fn create_and_find_by_slug_and_id() {
    let (_db, repo) = setup().await;
    let mut org = Organization::new(Uuid::new_v4(), "acme", "Acme Inc");
    org.subscription_tier = SubscriptionTier::Professional;
    repo.create(org.clone()).await.unwrap();

    assert_eq!(repo.find_by_slug("acme").await.unwrap(), Some(org.clone()));
    assert_eq!(repo.find_by_id(org.id).await.unwrap(), Some(org));
    assert_eq!(repo.find_by_slug("globex").await.unwrap(), None);
}

#[tokio::test]
async fn duplicate_slug_is_rejected_by_schema() {
    let (_db, repo) = setup().await;
    repo.create(Organization::new(Uuid::new_v4(), "acme", "Acme"))
        .await
        .unwrap();
    assert!(
        repo.create(Organization::new(Uuid::new_v4(), "acme", "Other"))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn domain_claim_lifecycle() {
    let (_db, repo) = setup().await;
    let org = Organization::new(Uuid::new_v4(), "acme", "Acme");
    repo.create(org.clone()).await.unwrap();

    assert!(
        repo.set_domain_claim(org.id, "portal.acme.com", "durj-verify=abc")
            .await
            .unwrap()
    );
    let pending = repo
        .find_by_custom_domain("portal.acme.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pending.custom_domain_txt_value.as_deref(), Some("durj-verify=abc"));
    assert!(!pending.custom_domain_verified);
    assert!(
        repo.find_serving_domain("portal.acme.com")
            .await
            .unwrap()
            .is_none()
    );

    assert!(repo.mark_domain_verified(org.id).await.unwrap());
    let serving = repo
        .find_serving_domain("portal.acme.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(serving.id, org.id);

    assert!(repo.clear_custom_domain(org.id).await.unwrap());
    let cleared = repo.find_by_id(org.id).await.unwrap().unwrap();
    assert_eq!(cleared.custom_domain, None);
    assert_eq!(cleared.custom_domain_txt_value, None);
    assert!(!cleared.custom_domain_verified);
}

#[tokio::test]
async fn bypass_serves_unverified_domain() {
    let (_db, repo) = setup().await;
    let mut org = Organization::new(Uuid::new_v4(), "globex", "Globex");
    org.custom_domain = Some("globex.io".to_owned());
    org.custom_domain_bypass_verification = true;
    repo.create(org.clone()).await.unwrap();

    let serving = repo.find_serving_domain("globex.io").await.unwrap();
    assert_eq!(serving.map(|o| o.id), Some(org.id));
}

#[tokio::test]
async fn new_claim_clears_bypass() {
    let (_db, repo) = setup().await;
    let mut org = Organization::new(Uuid::new_v4(), "globex", "Globex");
    org.custom_domain = Some("globex.io".to_owned());
    org.custom_domain_bypass_verification = true;
    repo.create(org.clone()).await.unwrap();

    assert!(
        repo.set_domain_claim(org.id, "globex-brand.com", "durj-verify=new")
            .await
            .unwrap()
    );

    let stored = repo.find_by_id(org.id).await.unwrap().unwrap();
    assert!(!stored.custom_domain_verified);
    assert!(!stored.custom_domain_bypass_verification);
    assert!(
        repo.find_serving_domain("globex-brand.com")
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn custom_domain_is_unique() {
    let (_db, repo) = setup().await;
    let a = Organization::new(Uuid::new_v4(), "acme", "Acme");
    let b = Organization::new(Uuid::new_v4(), "globex", "Globex");
    repo.create(a.clone()).await.unwrap();
    repo.create(b.clone()).await.unwrap();

    repo.set_domain_claim(a.id, "shared.com", "t1").await.unwrap();
    assert!(repo.set_domain_claim(b.id, "shared.com", "t2").await.is_err());
}

#[tokio::test]
async fn updates_on_missing_org_report_false() {
    let (_db, repo) = setup().await;
    let missing = Uuid::new_v4();
    assert!(!repo.set_domain_claim(missing, "x.com", "t").await.unwrap());
    assert!(!repo.mark_domain_verified(missing).await.unwrap());
    assert!(!repo.clear_custom_domain(missing).await.unwrap());
}
