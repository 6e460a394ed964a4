use crate::utils::error::{DashboardError, Result};
use std::future::Future;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::Notify;

/// 視圖生命週期的取消訊號，clone 後傳到每個 fetch
///
/// 一旦取消就永遠維持取消狀態。
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let was_cancelled = self.cancelled.swap(true, Ordering::SeqCst);
        if !was_cancelled {
            self.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// 先建立 `notified()` 再檢查狀態，避免漏接通知
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }

    /// 讓 future 與取消訊號競速，取消時丟棄 future
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(DashboardError::Cancelled);
        }
        tokio::select! {
            _ = self.cancelled() => Err(DashboardError::Cancelled),
            res = fut => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = token.run(async { Ok::<_, DashboardError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_cancel_aborts_pending_future() {
        let token = CancellationToken::new();
        let canceller = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let result = token
            .run(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, DashboardError>(())
            })
            .await;

        assert!(matches!(result, Err(DashboardError::Cancelled)));
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_already_cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();

        let result = tokio_test::block_on(token.run(async { Ok::<_, DashboardError>(1) }));
        assert!(matches!(result, Err(DashboardError::Cancelled)));
    }
}
