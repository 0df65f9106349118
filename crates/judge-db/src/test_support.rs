//! Shared test utilities for judge-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use std::ops::Deref;
    use std::time::Duration;

    use judge_core::model::{Priors, RankingParams};
    use tempfile::TempDir;

    use crate::JudgeDb;
    use crate::retry::RetryConfig;
    use crate::service::JudgeService;

    /// Temporary directory holding a database file.
    pub struct TestDir {
        dir: TempDir,
    }

    impl TestDir {
        pub fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        pub fn db_path(&self) -> String {
            self.dir.path().join("judge.db").to_string_lossy().into_owned()
        }
    }

    /// A service whose database file lives as long as the value.
    pub struct TestService {
        svc: JudgeService,
        _dir: TestDir,
    }

    impl Deref for TestService {
        type Target = JudgeService;

        fn deref(&self) -> &JudgeService {
            &self.svc
        }
    }

    pub fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_attempts: 20,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(20),
        }
    }

    /// Service with default ranking parameters and priors.
    pub async fn test_service() -> TestService {
        test_service_with(RankingParams::default(), Priors::default()).await
    }

    pub async fn test_service_with(params: RankingParams, priors: Priors) -> TestService {
        let dir = TestDir::new();
        let db = JudgeDb::open_local(&dir.db_path()).await.unwrap();
        TestService {
            svc: JudgeService::from_db(db, params, priors, fast_retry()),
            _dir: dir,
        }
    }
}
