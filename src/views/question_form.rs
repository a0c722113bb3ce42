use tracing::{Level, event, instrument};

use handle_errors::{Error, user_message};

use crate::client::ApiClient;
use crate::types::{
    difficulty::Difficulty,
    question::{NewQuestion, Question, QuestionId},
    tag::{NewTag, Tag, find_by_name},
};
use crate::views::{Loadable, selection::TagSelection, tags::TagOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    New,
    Edit(QuestionId),
}

/// 질문 생성/수정 폼
#[derive(Debug)]
pub struct QuestionForm {
    client: ApiClient,
    mode: FormMode,
    draft: NewQuestion,
    available_tags: Loadable<Vec<Tag>>,
    selected: TagSelection,
    error: Option<String>,
}

impl QuestionForm {
    pub fn new(client: ApiClient, mode: FormMode) -> Self {
        QuestionForm {
            client,
            mode,
            draft: NewQuestion::default(),
            available_tags: Loadable::default(),
            selected: TagSelection::new(),
            error: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn draft(&self) -> &NewQuestion {
        &self.draft
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn selected_tags(&self) -> &[String] {
        self.selected.names()
    }

    pub fn available_tags(&self) -> &[Tag] {
        self.available_tags
            .value()
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 아직 선택하지 않은 태그 (선택지로 보여 줄 목록)
    pub fn unselected_tags(&self) -> Vec<&Tag> {
        self.available_tags()
            .iter()
            .filter(|tag| !self.selected.contains(&tag.name))
            .collect()
    }

    pub fn set_text(&mut self, text: &str) {
        self.draft.question_text = text.to_string();
    }

    pub fn set_answer(&mut self, answer: &str) {
        self.draft.question_answer = answer.to_string();
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.draft.difficulty = difficulty;
    }

    /// 태그 선택지를 불러오고, 수정 모드라면 기존 질문과 태그도 채운다.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.available_tags.begin();
        let result = self.client.get_tags(false).await;
        self.available_tags.settle(ticket, result, "load tags");

        if let FormMode::Edit(id) = self.mode {
            match self.client.get_question(id, true).await {
                Ok(question) => {
                    self.draft = NewQuestion::from(&question);
                    self.selected = question.tag_names().into_iter().collect();
                }
                Err(e) => self.error = Some(user_message("load question", &e)),
            }
        }
    }

    pub fn select_tag(&mut self, name: &str) -> bool {
        self.selected.insert(name)
    }

    pub fn remove_tag(&mut self, name: &str) -> bool {
        self.selected.remove(name)
    }

    /// 빈 이름은 무시한다. 불러온 태그 중 대소문자만 다른 것이 있으면 그것을 선택하고,
    /// 없으면 원격에 새로 만든 뒤 선택한다. 태그 목록을 불러오지 못했으면 만들지 않는다.
    #[instrument(skip(self))]
    pub async fn add_tag(&mut self, name: &str) -> Result<Option<TagOutcome>, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        match self.find_or_create_tag(name).await {
            Ok(outcome) => {
                self.selected.insert(&outcome.tag().name);
                Ok(Some(outcome))
            }
            Err(e) => {
                self.error = Some(user_message("add tag", &e));
                Err(e)
            }
        }
    }

    async fn find_or_create_tag(&mut self, name: &str) -> Result<TagOutcome, Error> {
        let Some(tags) = self.available_tags.value() else {
            return Err(Error::TagsUnavailable);
        };
        if let Some(existing) = find_by_name(tags, name) {
            return Ok(TagOutcome::Existing(existing.clone()));
        }

        let new_tag = NewTag {
            name: name.to_string(),
        };
        let tag = self.client.add_tag(&new_tag).await?;
        event!(Level::INFO, tag = %tag.name, "created tag from form");
        let ticket = self.available_tags.begin();
        let result = self.client.get_tags(false).await;
        self.available_tags.settle(ticket, result, "load tags");
        Ok(TagOutcome::Created(tag))
    }

    /// `load` 때 태그 목록 요청의 상태
    pub fn tags_state(&self) -> &Loadable<Vec<Tag>> {
        &self.available_tags
    }

    /// 필수 항목을 확인하고 질문을 저장한 뒤 태그 목록을 별도 요청으로 설정한다.
    ///
    /// 두 요청은 원자적이지 않다. 질문 저장은 성공하고 태그 설정만 실패할 수 있다.
    #[instrument(skip(self))]
    pub async fn submit(&mut self) -> Result<Question, Error> {
        if self.draft.question_text.trim().is_empty() || self.draft.question_answer.trim().is_empty()
        {
            let err = Error::MissingFields;
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.error = None;

        let action = match self.mode {
            FormMode::New => "create question",
            FormMode::Edit(_) => "update question",
        };
        match self.save().await {
            Ok(question) => Ok(question),
            Err(e) => {
                self.error = Some(user_message(action, &e));
                Err(e)
            }
        }
    }

    async fn save(&self) -> Result<Question, Error> {
        let question = match self.mode {
            FormMode::New => self.client.add_question(&self.draft).await?,
            FormMode::Edit(id) => self.client.update_question(id, &self.draft).await?,
        };

        // 새 질문은 태그가 있을 때만, 수정은 비운 경우까지 항상 반영한다.
        let tags_changed = matches!(self.mode, FormMode::Edit(_)) || !self.selected.is_empty();
        if tags_changed {
            self.client
                .set_question_tags(question.id, self.selected.names())
                .await?;
        }
        Ok(question)
    }
}
