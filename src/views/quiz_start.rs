use rand::Rng;
use tracing::{Level, event, instrument};

use handle_errors::{Error, user_message};

use crate::client::ApiClient;
use crate::filter::shuffle;
use crate::types::tag::Tag;
use crate::views::{Loadable, flashcards::Flashcards, selection::TagSelection};

/// 퀴즈 시작 화면: 태그 선택 → 질문 가져오기 → 플래시카드
#[derive(Debug)]
pub struct QuizStart {
    client: ApiClient,
    tags: Loadable<Vec<Tag>>,
    selected: TagSelection,
    error: Option<String>,
}

impl QuizStart {
    pub fn new(client: ApiClient) -> Self {
        QuizStart {
            client,
            tags: Loadable::default(),
            selected: TagSelection::new(),
            error: None,
        }
    }

    pub fn tags(&self) -> &Loadable<Vec<Tag>> {
        &self.tags
    }

    pub fn selected(&self) -> &TagSelection {
        &self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// 선택한 태그가 없으면 시작할 수 없다. `start`는 `&mut self`를 잡으므로
    /// 요청 중에 다시 시작할 수는 없다.
    pub fn can_start(&self) -> bool {
        !self.selected.is_empty()
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.tags.begin();
        let result = self.client.get_tags(false).await;
        self.tags.settle(ticket, result, "load tags");
    }

    pub fn toggle(&mut self, name: &str) -> bool {
        self.selected.toggle(name)
    }

    /// 선택한 태그 중 하나라도 가진 질문을 가져와 균등하게 섞은 카드 묶음을 만든다.
    #[instrument(skip(self, rng))]
    pub async fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Flashcards, Error> {
        if self.selected.is_empty() {
            return Err(Error::NoTagsSelected);
        }

        self.error = None;
        let result = self
            .client
            .get_questions_by_tags(self.selected.names())
            .await;

        match result {
            Ok(mut questions) => {
                shuffle(&mut questions, rng);
                event!(Level::INFO, cards = questions.len(), "quiz ready");
                Ok(Flashcards::new(questions))
            }
            Err(e) => {
                self.error = Some(user_message("fetch questions for selected tags", &e));
                Err(e)
            }
        }
    }
}
