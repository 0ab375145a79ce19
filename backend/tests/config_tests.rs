//! Configuration and repository selection from files and the environment.

mod support;

use std::io::Write;
use std::str::FromStr;

use slotbook::config::ServiceConfig;
use slotbook::db::{BookingRepository, RepositoryConfig, RepositoryFactory, RepositoryType};
use slotbook::models::{ConflictPolicy, HostId};

#[test]
fn test_repository_type_from_str() {
    assert_eq!(RepositoryType::from_str("POSTGRES").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("pg").unwrap(), RepositoryType::Postgres);
    assert_eq!(RepositoryType::from_str("memory").unwrap(), RepositoryType::Local);

    let err = RepositoryType::from_str("sqlite").unwrap_err();
    assert!(err.contains("Unknown repository type"));
}

#[test]
fn test_repository_type_from_env_default() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", None),
            ("PG_DATABASE_URL", None),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[test]
fn test_repository_type_from_env_with_database_url() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", None),
            ("DATABASE_URL", Some("postgres://localhost/slotbook")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Postgres),
    );
}

#[test]
fn test_repository_type_from_env_invalid_defaults_to_local() {
    support::with_scoped_env(
        &[
            ("REPOSITORY_TYPE", Some("invalid")),
            ("DATABASE_URL", Some("postgres://localhost/slotbook")),
        ],
        || assert_eq!(RepositoryType::from_env(), RepositoryType::Local),
    );
}

#[tokio::test]
async fn test_create_local_via_factory() {
    let repo = RepositoryFactory::create(RepositoryType::Local, None)
        .await
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[cfg(not(feature = "postgres-repo"))]
#[tokio::test]
async fn test_create_postgres_without_feature_fails() {
    let config = slotbook::db::PostgresConfig::default();
    let err = RepositoryFactory::create(RepositoryType::Postgres, Some(&config))
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("feature not enabled"));
}

#[tokio::test]
async fn test_create_postgres_without_config_fails() {
    let err = RepositoryFactory::create(RepositoryType::Postgres, None)
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("requires PostgresConfig"));
}

#[tokio::test]
async fn test_factory_from_local_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let config = RepositoryConfig::from_file(file.path()).unwrap();
    assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    assert!(config.to_postgres_config().unwrap().is_none());

    let repo = RepositoryFactory::from_config_file(file.path()).await.unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[test]
fn test_missing_repository_config_file() {
    assert!(RepositoryConfig::from_file("/nonexistent/repository.toml").is_err());
}

#[test]
fn test_service_config_load_from_named_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[server]\nport = 3000\n\n[booking]\nhost_id = 4\nconflict_policy = \"confirmed_only\""
    )
    .unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let env = [
        ("SLOTBOOK_CONFIG", Some(path.as_str())),
        ("HOST", None),
        ("PORT", None),
        ("BOOKING_HOST_ID", None),
        ("BOOKING_CONFLICT_POLICY", None),
    ];

    let config = support::with_scoped_env(&env, ServiceConfig::load).unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.booking.host_id, HostId(4));
    assert_eq!(config.booking.conflict_policy, ConflictPolicy::ConfirmedOnly);
}

#[test]
fn test_service_config_env_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nport = 3000").unwrap();
    let path = file.path().to_string_lossy().into_owned();

    let env = [
        ("SLOTBOOK_CONFIG", Some(path.as_str())),
        ("HOST", Some("127.0.0.1")),
        ("PORT", Some("4000")),
        ("BOOKING_HOST_ID", None),
        ("BOOKING_CONFLICT_POLICY", Some("include_rescheduled")),
    ];

    let config = support::with_scoped_env(&env, ServiceConfig::load).unwrap();
    assert_eq!(config.bind_address(), "127.0.0.1:4000");
    assert_eq!(config.booking.conflict_policy, ConflictPolicy::IncludeRescheduled);
}

#[test]
fn test_service_config_unreadable_file_is_an_error() {
    let env = [("SLOTBOOK_CONFIG", Some("/nonexistent/slotbook.toml"))];
    let err = support::with_scoped_env(&env, ServiceConfig::load).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}
