//! Integration tests for TOML configuration loading.
//!
//! Uses `figment::Jail` for sandboxed files and env vars.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use judge_config::{ConfigError, JudgeConfig};

fn layered() -> Figment {
    Figment::from(Serialized::defaults(JudgeConfig::default()))
        .merge(Toml::file("config.toml"))
        .merge(Env::prefixed("JUDGE_").split("__"))
}

#[test]
fn loads_every_section_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[ranking]
epsilon = 0.1
timeout_minutes = 2.5
min_views = 3

[priors]
mu = 0.5
sigma_sq = 2.0
alpha = 4.0
beta = 2.0

[database]
path = "data/judging.db"
max_attempts = 3
base_delay_ms = 5
max_delay_ms = 50
"#,
        )?;

        let config = JudgeConfig::from_figment(&layered()).expect("config should load");

        let params = config.ranking.params();
        assert!((params.epsilon - 0.1).abs() < f64::EPSILON);
        assert_eq!(params.timeout.num_seconds(), 150);
        assert_eq!(params.min_views, 3);

        let priors = config.priors.priors();
        assert!((priors.sigma_sq - 2.0).abs() < f64::EPSILON);
        assert!((priors.reliability().mean() - 4.0 / 6.0).abs() < 1e-12);

        assert_eq!(config.database.path, "data/judging.db");
        assert_eq!(config.database.max_attempts, 3);
        Ok(())
    });
}

#[test]
fn partial_toml_keeps_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[ranking]\nmin_views = 5\n")?;

        let config = JudgeConfig::from_figment(&layered()).expect("config should load");
        assert_eq!(config.ranking.min_views, 5);
        assert!((config.ranking.epsilon - 0.25).abs() < f64::EPSILON);
        assert_eq!(config.database.path, ".judge/judge.db");
        Ok(())
    });
}

#[test]
fn env_wins_over_toml() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[priors]\nalpha = 3.0\n")?;
        jail.set_env("JUDGE_PRIORS__ALPHA", "7.0");

        let config = JudgeConfig::from_figment(&layered()).expect("config should load");
        assert!((config.priors.alpha - 7.0).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn out_of_range_toml_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[priors]\nsigma_sq = -1.0\n")?;

        let result = JudgeConfig::from_figment(&layered());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        Ok(())
    });
}

#[test]
fn memory_database_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[database]\npath = \":memory:\"\n")?;

        assert!(JudgeConfig::from_figment(&layered()).is_err());
        Ok(())
    });
}
