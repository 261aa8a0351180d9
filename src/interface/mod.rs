//! Interface layer
//! 명령행 입력을 유스케이스 요청으로 바꾸고 실행 조합을 제공한다.

pub mod cli;
