use crate::error::Failure;

/// Lifecycle of one use-case invocation as seen by the UI.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResultState<T> {
    Loading,
    Success(T),
    Error(Failure),
}

impl<T> ResultState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// `Success` or `Error`.
    pub fn is_terminal(&self) -> bool {
        !self.is_loading()
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<Failure> {
        match self {
            Self::Error(f) => Some(*f),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultState<U> {
        match self {
            Self::Loading => ResultState::Loading,
            Self::Success(v) => ResultState::Success(f(v)),
            Self::Error(e) => ResultState::Error(e),
        }
    }
}

impl<T> From<Result<T, Failure>> for ResultState<T> {
    fn from(r: Result<T, Failure>) -> Self {
        match r {
            Ok(v) => Self::Success(v),
            Err(e) => Self::Error(e),
        }
    }
}
