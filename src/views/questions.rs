use tracing::instrument;

use handle_errors::user_message;

use crate::client::ApiClient;
use crate::filter::{DifficultyFilter, filter_by_difficulty};
use crate::types::question::{Question, QuestionId};
use crate::views::Loadable;

/// 질문 목록 화면. 전체 목록을 태그와 함께 받아 오고 난이도는 로컬에서 거른다.
#[derive(Debug)]
pub struct QuestionsView {
    client: ApiClient,
    questions: Loadable<Vec<Question>>,
    filter: DifficultyFilter,
    mutation_error: Option<String>,
}

impl QuestionsView {
    pub fn new(client: ApiClient) -> Self {
        QuestionsView {
            client,
            questions: Loadable::default(),
            filter: DifficultyFilter::All,
            mutation_error: None,
        }
    }

    pub fn state(&self) -> &Loadable<Vec<Question>> {
        &self.questions
    }

    /// 삭제 실패 메시지. 목록은 그대로 남는다.
    pub fn mutation_error(&self) -> Option<&str> {
        self.mutation_error.as_deref()
    }

    pub fn filter(&self) -> DifficultyFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: DifficultyFilter) {
        self.filter = filter;
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.questions.begin();
        let result = self.client.get_questions(true).await;
        self.questions.settle(ticket, result, "load questions");
    }

    /// "Try Again"
    pub async fn retry(&mut self) {
        self.load().await;
    }

    /// 삭제한 뒤 목록 전체를 다시 받아 온다.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: QuestionId) {
        match self.client.delete_question(id).await {
            Ok(()) => {
                self.mutation_error = None;
                self.load().await;
            }
            Err(e) => self.mutation_error = Some(user_message("delete question", &e)),
        }
    }

    /// 현재 난이도 선택을 적용한 목록
    pub fn visible(&self) -> Vec<&Question> {
        match self.questions.value() {
            Some(questions) => filter_by_difficulty(questions, self.filter),
            None => Vec::new(),
        }
    }

    pub fn count_label(&self) -> String {
        let count = self.visible().len();
        format!("{} question{}", count, if count == 1 { "" } else { "s" })
    }

    pub fn empty_message(&self) -> String {
        match self.filter {
            DifficultyFilter::All => {
                "No questions found. Create your first question to get started!".to_string()
            }
            DifficultyFilter::Only(difficulty) => format!(
                "No {} questions found.",
                difficulty.as_str().to_lowercase()
            ),
        }
    }
}
