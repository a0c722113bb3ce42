use tracing::{Level, event, instrument};

use handle_errors::{Error, user_message};

use crate::client::ApiClient;
use crate::types::tag::{NewTag, Tag, TagId, find_by_name};
use crate::views::Loadable;

/// 새 태그를 만들었는지, 이미 있던 태그를 골랐는지
#[derive(Debug, Clone, PartialEq)]
pub enum TagOutcome {
    Created(Tag),
    Existing(Tag),
}

impl TagOutcome {
    pub fn tag(&self) -> &Tag {
        match self {
            TagOutcome::Created(tag) | TagOutcome::Existing(tag) => tag,
        }
    }
}

/// 태그 관리 화면. 태그마다 질문 수를 함께 보여 준다.
///
/// 만들기/이름 바꾸기/지우기가 실패해도 불러온 목록은 그대로 두고
/// 에러는 `mutation_error`에 따로 보관한다.
#[derive(Debug)]
pub struct TagsView {
    client: ApiClient,
    tags: Loadable<Vec<Tag>>,
    mutation_error: Option<String>,
}

impl TagsView {
    pub fn new(client: ApiClient) -> Self {
        TagsView {
            client,
            tags: Loadable::default(),
            mutation_error: None,
        }
    }

    pub fn state(&self) -> &Loadable<Vec<Tag>> {
        &self.tags
    }

    pub fn tags(&self) -> &[Tag] {
        self.tags.value().map(Vec::as_slice).unwrap_or(&[])
    }

    /// 마지막 변경 요청의 실패 메시지
    pub fn mutation_error(&self) -> Option<&str> {
        self.mutation_error.as_deref()
    }

    pub fn count_label(&self) -> String {
        let count = self.tags().len();
        format!("{} tag{}", count, if count == 1 { "" } else { "s" })
    }

    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        let ticket = self.tags.begin();
        let result = self.client.tags_with_question_counts().await;
        if let Ok(tags) = &result {
            for tag in tags {
                event!(Level::DEBUG, tag = %tag.name, questions = tag.question_count());
            }
        }
        self.tags.settle(ticket, result, "load tags");
    }

    pub async fn retry(&mut self) {
        self.load().await;
    }

    /// 이름을 다듬은 뒤, 대소문자만 다른 태그가 이미 있으면 만들지 않고 그 태그를 돌려준다.
    /// 목록을 불러오지 못했으면 중복을 확인할 수 없으므로 만들지 않는다.
    #[instrument(skip(self))]
    pub async fn create(&mut self, name: &str) -> Result<TagOutcome, Error> {
        let result = self.try_create(name).await;
        self.record("create tag", result)
    }

    async fn try_create(&mut self, name: &str) -> Result<TagOutcome, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyTagName);
        }
        let Some(tags) = self.tags.value() else {
            return Err(Error::TagsUnavailable);
        };
        if let Some(existing) = find_by_name(tags, name) {
            event!(Level::INFO, tag = %existing.name, "tag already exists");
            return Ok(TagOutcome::Existing(existing.clone()));
        }

        let new_tag = NewTag {
            name: name.to_string(),
        };
        let tag = self.client.add_tag(&new_tag).await?;
        self.load().await;
        Ok(TagOutcome::Created(tag))
    }

    #[instrument(skip(self))]
    pub async fn rename(&mut self, id: TagId, name: &str) -> Result<Tag, Error> {
        let result = self.try_rename(id, name).await;
        self.record("update tag", result)
    }

    async fn try_rename(&mut self, id: TagId, name: &str) -> Result<Tag, Error> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::EmptyTagName);
        }
        let tag = NewTag {
            name: name.to_string(),
        };
        let updated = self.client.update_tag(id, &tag).await?;
        self.load().await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: TagId) -> Result<(), Error> {
        let result = self.client.delete_tag(id).await;
        if result.is_ok() {
            self.load().await;
        }
        self.record("delete tag", result)
    }

    fn record<T>(&mut self, action: &str, result: Result<T, Error>) -> Result<T, Error> {
        self.mutation_error = result.as_ref().err().map(|e| user_message(action, e));
        result
    }
}
