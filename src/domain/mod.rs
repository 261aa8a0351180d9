//! Domain layer
//! 코멘트/태그/스레드/커밋 추적 규칙을 외부 의존성 없이 표현한다.

pub mod comment;
pub mod commit_ids;
pub mod outcome;
pub mod route;
pub mod tags;
pub mod target;
pub mod thread;
