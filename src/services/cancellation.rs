// src/services/cancellation.rs
//
// One-shot cooperative cancel flag shared between the interactive side and
// the render worker. The worker polls it at card boundaries only.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent; there is no way to reset a token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// `Err(AppError::Cancelled)` once cancellation has been requested.
    pub fn check(&self) -> AppResult<()> {
        if self.is_cancelled() {
            Err(AppError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancellationToken::new();
        let worker_side = token.clone();
        assert!(worker_side.check().is_ok());

        token.cancel();
        assert!(worker_side.is_cancelled());
        assert!(matches!(worker_side.check(), Err(AppError::Cancelled)));
    }
}
