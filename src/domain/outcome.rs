//! best-effort 연산의 결과 타입.
//! 원격 호출 실패는 호출자에게 전파하지 않고, 안전한 기본값과 실패 사유를 함께 돌려준다.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    /// 실패가 로그로 기록되었고 `value`는 기본값 또는 부분 결과다.
    Recovered { value: T, reason: String },
}

impl<T> Outcome<T> {
    pub fn recovered(value: T, reason: impl Into<String>) -> Self {
        Self::Recovered {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Done(value) | Self::Recovered { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Done(value) | Self::Recovered { value, .. } => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Done(value) => Outcome::Done(f(value)),
            Self::Recovered { value, reason } => Outcome::Recovered {
                value: f(value),
                reason,
            },
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Done(_) => None,
            Self::Recovered { reason, .. } => Some(reason),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// 기본값으로 복구된 결과.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self::recovered(T::default(), reason)
    }
}
