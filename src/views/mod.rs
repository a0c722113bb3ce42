//! 화면마다 자기 상태를 가진다. 화면끼리 공유하는 전역 상태는 없다.

pub mod flashcards;
pub mod question_form;
pub mod questions;
pub mod quiz_start;
pub mod search;
pub mod selection;
pub mod tags;

use handle_errors::{Error, user_message};

/// 한 번의 비동기 요청의 진행 상태
#[derive(Debug, Clone, PartialEq)]
pub enum Status<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

/// `Loadable::begin`이 돌려주는 표. 더 새로운 요청이 시작되었거나 화면이
/// 초기화되면 낡은 표가 되어 결과가 버려진다.
///
/// 이 크레이트의 화면들은 `&mut self`를 await 너머까지 잡고 있으므로 한 화면의
/// 요청은 빌림 규칙만으로 차례대로 끝난다. 표는 `begin`과 `settle` 사이에
/// 요청을 다른 태스크로 넘기는 호출자를 위한 것이다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Loadable<T> {
    status: Status<T>,
    generation: u64,
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable {
            status: Status::Idle,
            generation: 0,
        }
    }
}

impl<T> Loadable<T> {
    pub fn status(&self) -> &Status<T> {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, Status::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match &self.status {
            Status::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.status = Status::Loading;
        Ticket(self.generation)
    }

    /// 요청 결과를 반영한다. 표가 낡았으면 아무것도 바꾸지 않고 `false`를 돌려준다.
    ///
    /// 실패하면 원래 에러는 로그로 남기고 `action`으로 만든 메시지만 보관한다.
    pub fn settle(&mut self, ticket: Ticket, result: Result<T, Error>, action: &str) -> bool {
        if ticket.0 != self.generation {
            tracing::debug!(action, "dropping stale response");
            return false;
        }
        self.status = match result {
            Ok(value) => Status::Ready(value),
            Err(e) => Status::Failed(user_message(action, &e)),
        };
        true
    }

    /// 진행 중인 요청을 무효화하고 처음 상태로 돌아간다.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.status = Status::Idle;
    }

    /// 요청을 보내기 전에 거부된 조회를 에러 상태로 바꾼다.
    /// 진행 중인 요청도 함께 무효화된다. 변경 요청의 실패에는 쓰지 않는다.
    pub fn fail(&mut self, message: String) {
        self.generation += 1;
        self.status = Status::Failed(message);
    }
}
