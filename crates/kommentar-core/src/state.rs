use crate::error::FetchError;
use crate::link::Link;

/// Lifecycle of the latest fetch run.
///
/// A run starts as `Pending` and moves exactly once to `Complete` or `Failed`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FetchState {
    #[default]
    Pending,
    Complete(Vec<Link>),
    Failed(FetchError),
}

impl FetchState {
    pub fn is_pending(&self) -> bool {
        matches!(self, FetchState::Pending)
    }

    pub fn links(&self) -> Option<&[Link]> {
        match self {
            FetchState::Complete(links) => Some(links),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match self {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<Result<Vec<Link>, FetchError>> for FetchState {
    fn from(result: Result<Vec<Link>, FetchError>) -> Self {
        match result {
            Ok(links) => FetchState::Complete(links),
            Err(e) => FetchState::Failed(e),
        }
    }
}
