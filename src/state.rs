use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use sqlx::PgPool;

use crate::config::Config;
use crate::service::pool::PoolGenerator;
use crate::service::session::SessionOrchestrator;
use crate::store::{MemoryPoolCache, PgAttemptStore, PgQuestionBank};

/// Wires the production stores, the process-wide pool cache, and an
/// entropy-seeded RNG into the two services. One instance per process.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionOrchestrator>,
    pub pools: Arc<PoolGenerator>,
    pub config: Config,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        let bank: Arc<PgQuestionBank> = Arc::new(PgQuestionBank::new(pool.clone()));
        let attempts = Arc::new(PgAttemptStore::new(pool));
        let cache = Arc::new(MemoryPoolCache::new());

        let pools = Arc::new(PoolGenerator::new(
            bank.clone(),
            cache,
            Box::new(StdRng::from_entropy()),
            config.pool_cache_ttl,
        ));

        let sessions = Arc::new(SessionOrchestrator::new(attempts, bank, pools.clone()));

        Self {
            sessions,
            pools,
            config,
        }
    }
}
