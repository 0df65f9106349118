//! Service layer wrapping the database with ranking configuration.
//!
//! `JudgeService` owns the database handle plus the explicit parameters every
//! operation needs (selection knobs, priors, retry policy). Repository and
//! coordinator methods are implemented as `impl JudgeService` blocks.

use judge_config::JudgeConfig;
use judge_core::model::{Priors, RankingParams};

use crate::JudgeDb;
use crate::error::DatabaseError;
use crate::retry::RetryConfig;

pub struct JudgeService {
    db: JudgeDb,
    params: RankingParams,
    priors: Priors,
    retry: RetryConfig,
}

impl JudgeService {
    /// Open the database named in `config` with its ranking settings.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn open(config: &JudgeConfig) -> Result<Self, DatabaseError> {
        let db = JudgeDb::open_local(&config.database.path).await?;
        Ok(Self::from_db(
            db,
            config.ranking.params(),
            config.priors.priors(),
            RetryConfig::from(&config.database),
        ))
    }

    /// Create from an existing `JudgeDb`.
    #[must_use]
    pub const fn from_db(
        db: JudgeDb,
        params: RankingParams,
        priors: Priors,
        retry: RetryConfig,
    ) -> Self {
        Self {
            db,
            params,
            priors,
            retry,
        }
    }

    #[must_use]
    pub const fn db(&self) -> &JudgeDb {
        &self.db
    }

    #[must_use]
    pub const fn params(&self) -> &RankingParams {
        &self.params
    }

    #[must_use]
    pub const fn priors(&self) -> &Priors {
        &self.priors
    }

    #[must_use]
    pub const fn retry(&self) -> &RetryConfig {
        &self.retry
    }
}
