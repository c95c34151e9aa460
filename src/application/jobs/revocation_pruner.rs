//! Periodic pruning of the token revocation set.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::tokens::TokenService;
use crate::domain::foundation::DomainError;

use super::{PeriodicJob, RunOutcome};

pub struct RevocationPruner {
    tokens: Arc<TokenService>,
}

impl RevocationPruner {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

#[async_trait]
impl PeriodicJob for RevocationPruner {
    fn name(&self) -> &'static str {
        "revocation_prune"
    }

    async fn run(&self) -> Result<RunOutcome, DomainError> {
        Ok(RunOutcome::Completed(self.tokens.prune_revocations()))
    }
}
