use tracing::{Level, event, instrument};

use handle_errors::{Error, user_message};

use crate::client::ApiClient;
use crate::filter::{retain_any_tag, retain_difficulty};
use crate::types::{
    difficulty::Difficulty,
    query::QuestionQuery,
    question::{Question, QuestionId},
    tag::Tag,
};
use crate::views::{Loadable, selection::TagSelection};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub keyword: String,
    pub difficulty: Option<Difficulty>,
    pub tags: TagSelection,
}

/// 서버에 보낼 검색 요청 하나. 키워드 > 태그 > 난이도 순으로 고른다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPlan {
    Keyword(String),
    Tags(Vec<String>),
    Difficulty(Difficulty),
}

impl SearchPlan {
    pub fn query(&self) -> QuestionQuery {
        match self {
            SearchPlan::Keyword(keyword) => QuestionQuery::Keyword(keyword.clone()),
            SearchPlan::Tags(names) => QuestionQuery::AnyTag(names.clone()),
            SearchPlan::Difficulty(difficulty) => QuestionQuery::ByDifficulty(*difficulty),
        }
    }
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        self.keyword.trim().is_empty() && self.difficulty.is_none() && self.tags.is_empty()
    }

    pub fn plan(&self) -> Result<SearchPlan, Error> {
        let keyword = self.keyword.trim();
        if !keyword.is_empty() {
            Ok(SearchPlan::Keyword(keyword.to_string()))
        } else if !self.tags.is_empty() {
            Ok(SearchPlan::Tags(self.tags.names().to_vec()))
        } else if let Some(difficulty) = self.difficulty {
            Ok(SearchPlan::Difficulty(difficulty))
        } else {
            Err(Error::MissingSearchCriteria)
        }
    }

    /// 서버 요청에 쓰지 않은 나머지 조건을 로컬에서 적용한다.
    pub fn refine(&self, plan: &SearchPlan, results: &mut Vec<Question>) {
        match self.difficulty {
            Some(difficulty) if !matches!(plan, SearchPlan::Difficulty(_)) => {
                retain_difficulty(results, difficulty)
            }
            _ => {}
        }
        if !self.tags.is_empty() && !matches!(plan, SearchPlan::Tags(_)) {
            retain_any_tag(results, self.tags.names());
        }
    }
}

/// 검색 화면
#[derive(Debug)]
pub struct SearchView {
    client: ApiClient,
    criteria: SearchCriteria,
    all_tags: Loadable<Vec<Tag>>,
    results: Loadable<Vec<Question>>,
    has_searched: bool,
    mutation_error: Option<String>,
}

impl SearchView {
    pub fn new(client: ApiClient) -> Self {
        SearchView {
            client,
            criteria: SearchCriteria::default(),
            all_tags: Loadable::default(),
            results: Loadable::default(),
            has_searched: false,
            mutation_error: None,
        }
    }

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn results(&self) -> &Loadable<Vec<Question>> {
        &self.results
    }

    pub fn all_tags(&self) -> &Loadable<Vec<Tag>> {
        &self.all_tags
    }

    /// 결과 목록에서 삭제하다 실패한 경우의 메시지. 결과는 그대로 남는다.
    pub fn mutation_error(&self) -> Option<&str> {
        self.mutation_error.as_deref()
    }

    pub fn has_searched(&self) -> bool {
        self.has_searched
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.criteria.keyword = keyword.to_string();
    }

    pub fn set_difficulty(&mut self, difficulty: Option<Difficulty>) {
        self.criteria.difficulty = difficulty;
    }

    pub fn add_tag(&mut self, name: &str) -> bool {
        self.criteria.tags.insert(name)
    }

    pub fn remove_tag(&mut self, name: &str) -> bool {
        self.criteria.tags.remove(name)
    }

    /// 태그 선택지를 불러온다. 실패해도 검색은 계속 쓸 수 있다.
    #[instrument(skip(self))]
    pub async fn load_tags(&mut self) {
        let ticket = self.all_tags.begin();
        let result = self.client.get_tags(false).await;
        self.all_tags.settle(ticket, result, "load tags");
    }

    /// 검색을 실행한다. 조건이 하나도 없으면 요청을 보내지 않고 거부한다.
    #[instrument(skip(self))]
    pub async fn search(&mut self) {
        let plan = match self.criteria.plan() {
            Ok(plan) => plan,
            Err(e) => {
                self.results.fail(user_message("search questions", &e));
                return;
            }
        };
        event!(Level::DEBUG, ?plan, "searching questions");

        let ticket = self.results.begin();
        self.has_searched = true;
        let result = self
            .client
            .query_questions(&plan.query())
            .await
            .map(|mut questions| {
                self.criteria.refine(&plan, &mut questions);
                questions
            });
        self.results.settle(ticket, result, "search questions");
    }

    /// 검색 결과에서 질문을 지우고 같은 검색을 다시 실행한다.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: QuestionId) {
        match self.client.delete_question(id).await {
            Ok(()) => {
                self.mutation_error = None;
                self.search().await;
            }
            Err(e) => self.mutation_error = Some(user_message("delete question", &e)),
        }
    }

    pub fn clear(&mut self) {
        self.criteria = SearchCriteria::default();
        self.results.reset();
        self.has_searched = false;
        self.mutation_error = None;
    }
}
