use std::future::Future;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Error;

#[async_trait(?Send)]
pub trait Refresh {
    async fn refresh(&self) -> Result<(), Error>;
}

/// Runs a mutating call and then refreshes `target` exactly once. A failed
/// refresh is recorded by the target itself and does not undo the fact that
/// the mutation went through.
pub async fn reflect<T, F>(action: F, target: &dyn Refresh) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    let value = action.await?;

    if let Err(err) = target.refresh().await {
        warn!(%err, "refresh after mutation failed");
    }

    Ok(value)
}

#[cfg(test)]
pub mod test {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    pub struct CountingRefresh {
        pub count: Cell<usize>,
        pub fail: Cell<bool>,
    }

    #[async_trait(?Send)]
    impl Refresh for CountingRefresh {
        async fn refresh(&self) -> Result<(), Error> {
            self.count.set(self.count.get() + 1);
            if self.fail.get() {
                return Err(Error::BackendRejected {
                    status: 503,
                    message: "unavailable".into(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn refreshes_once_after_success() {
        let target = CountingRefresh::default();
        let value = reflect(async { Ok::<_, Error>(7) }, &target).await.unwrap();
        assert_eq!(value, 7);
        assert_eq!(target.count.get(), 1);
    }

    #[tokio::test]
    async fn does_not_refresh_after_failure() {
        let target = CountingRefresh::default();
        let result = reflect(
            async { Err::<(), _>(Error::MissingField { field: "title" }) },
            &target,
        )
        .await;
        assert_eq!(result.unwrap_err(), Error::MissingField { field: "title" });
        assert_eq!(target.count.get(), 0);
    }

    #[tokio::test]
    async fn refresh_failure_does_not_fail_action() {
        let target = CountingRefresh::default();
        target.fail.set(true);
        assert!(reflect(async { Ok::<_, Error>(()) }, &target).await.is_ok());
        assert_eq!(target.count.get(), 1);
    }
}
