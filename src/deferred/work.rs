//! Normalisation of map-function results
//!
//! A map function may hand back nothing, a plain value, an already-failed
//! value, an arbitrary future or another [`Deferred`]. [`IntoWork`] turns all
//! of these into a [`Work`] the coordinator knows how to track.

use super::{Deferred, Outcome};
use futures::future::{BoxFuture, FutureExt};
use std::fmt;
use std::future::Future;

/// One unit of mapped work
pub enum Work<V, E> {
    /// The key produced no asynchronous work
    Skip,
    /// Work that is already settled
    Ready(Result<V, E>),
    /// Work that settles later
    Pending(BoxFuture<'static, Result<V, E>>),
}

impl<V, E> Work<V, E> {
    pub fn skip() -> Self {
        Self::Skip
    }

    /// A plain value, treated as work that succeeded immediately
    pub fn value(value: V) -> Self {
        Self::Ready(Ok(value))
    }

    /// Work that failed immediately
    pub fn failed(error: E) -> Self {
        Self::Ready(Err(error))
    }

    pub fn ready(result: Result<V, E>) -> Self {
        Self::Ready(result)
    }

    pub fn future<F>(future: F) -> Self
    where
        F: Future<Output = Result<V, E>> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

impl<V, E> fmt::Debug for Work<V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "Skip"),
            Self::Ready(Ok(_)) => write!(f, "Ready(Ok(..))"),
            Self::Ready(Err(_)) => write!(f, "Ready(Err(..))"),
            Self::Pending(_) => write!(f, "Pending(<future>)"),
        }
    }
}

/// Conversion into [`Work`], applied to every map-function result
pub trait IntoWork<V, E> {
    fn into_work(self) -> Work<V, E>;
}

impl<V, E> IntoWork<V, E> for Work<V, E> {
    fn into_work(self) -> Work<V, E> {
        self
    }
}

/// `None` means the key produced no work
impl<V, E, W> IntoWork<V, E> for Option<W>
where
    W: IntoWork<V, E>,
{
    fn into_work(self) -> Work<V, E> {
        self.map_or(Work::Skip, IntoWork::into_work)
    }
}

impl<V, E> IntoWork<V, E> for Result<V, E> {
    fn into_work(self) -> Work<V, E> {
        Work::Ready(self)
    }
}

/// A deferred passes through: its settlement becomes the work's settlement
impl<V, E> IntoWork<V, E> for Deferred<V, E>
where
    V: Clone + Send + 'static,
    E: Clone + Send + 'static,
{
    fn into_work(self) -> Work<V, E> {
        match self.outcome() {
            Some(outcome) => Work::Ready(outcome.into_result()),
            None => Work::future(async move { self.settled().await.into_result() }),
        }
    }
}

impl<V, E> From<Outcome<V, E>> for Work<V, E> {
    fn from(outcome: Outcome<V, E>) -> Self {
        Work::Ready(outcome.into_result())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_none_is_skip() {
        let work: Work<u32, ()> = None::<Work<u32, ()>>.into_work();
        assert!(work.is_skip());

        let work: Work<u32, ()> = Some(Ok(3)).into_work();
        assert!(matches!(work, Work::Ready(Ok(3))));
    }

    #[test]
    fn test_settled_deferred_is_ready() {
        let work = Deferred::<u32, String>::rejected("nope".to_string()).into_work();
        assert!(matches!(work, Work::Ready(Err(ref e)) if e == "nope"));
    }

    #[tokio::test]
    async fn test_pending_deferred_follows_settlement() {
        let deferred: Deferred<u32, String> = Deferred::new();
        let future = match deferred.clone().into_work() {
            Work::Pending(future) => future,
            other => panic!("expected pending work, got {:?}", other),
        };

        deferred.resolve(11);
        assert_eq!(future.await, Ok(11));
    }

    #[tokio::test]
    async fn test_future_work() {
        let work: Work<u32, ()> = Work::future(async { Ok(5) });
        match work {
            Work::Pending(future) => assert_eq!(future.await, Ok(5)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_outcome_conversion() {
        let work: Work<u8, u8> = Outcome::Rejected(4).into();
        assert!(matches!(work, Work::Ready(Err(4))));
        assert_eq!(format!("{:?}", Work::<u8, u8>::value(1)), "Ready(Ok(..))");
    }
}
