//! Loading configuration from the process environment.

use crate::test_helpers::ScopedEnv;
use opsdesk::config::{
    CONFIG_PATH_ENV, ConfigError, DATABASE_URL_ENV, LOG_FILTER_ENV, OpsdeskConfig,
};
use rstest::rstest;
use std::time::Duration;
use uuid::Uuid;

#[rstest]
fn file_named_by_environment_is_loaded_and_overridden() -> eyre::Result<()> {
    let path = std::env::temp_dir().join(format!("opsdesk-{}.toml", Uuid::new_v4()));
    std::fs::write(
        &path,
        r#"
        log_filter = "opsdesk=debug"

        [database]
        url = "postgres://file/opsdesk"

        [scheduler]
        sla_scan_interval_secs = 0
        workflow_interval_secs = 900
        "#,
    )?;
    let path_text = path.to_string_lossy().into_owned();
    let _env = ScopedEnv::apply(&[
        (CONFIG_PATH_ENV, Some(path_text.as_str())),
        (DATABASE_URL_ENV, Some("postgres://env/opsdesk")),
        (LOG_FILTER_ENV, None),
    ]);

    let loaded = OpsdeskConfig::load();
    std::fs::remove_file(&path)?;
    let config = loaded?;

    eyre::ensure!(config.database.url.as_deref() == Some("postgres://env/opsdesk"));
    eyre::ensure!(config.log_filter == "opsdesk=debug");
    eyre::ensure!(config.scheduler.workflow_interval() == Duration::from_secs(900));
    eyre::ensure!(
        config.scheduler.sla_scan_interval() == Duration::from_secs(1),
        "a zero interval is raised to one second"
    );
    Ok(())
}

#[rstest]
fn missing_file_is_reported() -> eyre::Result<()> {
    let missing = std::env::temp_dir().join(format!("opsdesk-missing-{}.toml", Uuid::new_v4()));
    let missing_text = missing.to_string_lossy().into_owned();
    let _env = ScopedEnv::apply(&[(CONFIG_PATH_ENV, Some(missing_text.as_str()))]);

    let result = OpsdeskConfig::load();

    eyre::ensure!(
        matches!(&result, Err(ConfigError::Read { path, .. }) if *path == missing),
        "expected a read error, got {result:?}"
    );
    Ok(())
}

#[rstest]
fn defaults_apply_without_a_file() -> eyre::Result<()> {
    let _env = ScopedEnv::apply(&[
        (CONFIG_PATH_ENV, None),
        (DATABASE_URL_ENV, None),
        (LOG_FILTER_ENV, Some("warn")),
    ]);

    let config = OpsdeskConfig::load()?;

    eyre::ensure!(config.database.url.is_none());
    eyre::ensure!(config.log_filter == "warn");
    eyre::ensure!(config.automation == OpsdeskConfig::default().automation);
    Ok(())
}
