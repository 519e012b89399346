//! Integration tests proving `.env` values flow through `NormaConfig::load`'s
//! full provider chain (dotenv -> defaults -> project file -> env).
//!
//! Uses `figment::Jail` to sandbox the current directory and environment so
//! these tests don't depend on (or pollute) any real `.env`/config file.

use figment::Jail;
use norma_config::NormaConfig;

#[test]
fn dotenv_file_values_become_env_overrides() {
    Jail::expect_with(|jail| {
        jail.create_file(
            ".env",
            r#"
NORMA_CHUNK__SIZE=1750
NORMA_EMBEDDINGS__MODEL=text-embedding-3-large
"#,
        )?;

        let config = NormaConfig::load().expect("config loads");
        assert_eq!(config.chunk.size, 1_750);
        assert_eq!(config.embeddings.model, "text-embedding-3-large");
        Ok(())
    });
}

#[test]
fn project_config_file_is_picked_up_relative_to_cwd() {
    Jail::expect_with(|jail| {
        jail.create_file(
            ".norma/config.toml",
            r#"
[pipeline]
sync_concurrency = 12
"#,
        )?;

        let config = NormaConfig::load().expect("config loads");
        assert_eq!(config.pipeline.sync_concurrency, 12);
        Ok(())
    });
}

#[test]
fn env_wins_over_project_config_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            ".norma/config.toml",
            r#"
[chunk]
size = 500
"#,
        )?;
        jail.set_env("NORMA_CHUNK__SIZE", "800");

        let config = NormaConfig::load().expect("config loads");
        assert_eq!(config.chunk.size, 800);
        Ok(())
    });
}

#[test]
fn no_config_present_falls_back_to_defaults() {
    Jail::expect_with(|_jail| {
        let config = NormaConfig::load().expect("config loads");
        assert_eq!(config.chunk.size, 1_000);
        assert_eq!(config.pipeline.sync_concurrency, 4);
        Ok(())
    });
}
