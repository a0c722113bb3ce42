use crate::types::difficulty::Difficulty;

/// 질문 목록을 가져오는 방법. 각 값은 정확히 하나의 요청 모양에 대응한다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionQuery {
    /// `GET /questions?includeTags=`
    All { include_tags: bool },
    /// `GET /questions/difficulty/{level}`
    ByDifficulty(Difficulty),
    /// `GET /questions/search?keyword=`
    Keyword(String),
    /// `GET /questions/tag/{name}`
    Tag(String),
    /// `GET /questions/tags?tagNames=a,b` (태그 중 하나라도 가진 질문)
    AnyTag(Vec<String>),
}

/// 태그 목록을 가져오는 방법
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagQuery {
    /// `GET /tags?includeQuestions=`
    All { include_questions: bool },
    /// `GET /tags/search?keyword=`
    Keyword(String),
    /// `GET /tags/with-questions`
    WithQuestions,
    /// `GET /tags/without-questions`
    WithoutQuestions,
}

/// 기본 URL 뒤에 붙는 경로 조각과 쿼리 매개변수
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub segments: Vec<String>,
    pub params: Vec<(&'static str, String)>,
}

impl Endpoint {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Endpoint {
            segments: segments.into_iter().map(Into::into).collect(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.params.push((key, value.to_string()));
        self
    }
}

impl QuestionQuery {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            QuestionQuery::All { include_tags } => {
                Endpoint::new(["questions"]).param("includeTags", include_tags)
            }
            QuestionQuery::ByDifficulty(difficulty) => {
                Endpoint::new(["questions", "difficulty", difficulty.as_str()])
            }
            QuestionQuery::Keyword(keyword) => {
                Endpoint::new(["questions", "search"]).param("keyword", keyword)
            }
            QuestionQuery::Tag(name) => Endpoint::new(["questions", "tag", name.as_str()]),
            QuestionQuery::AnyTag(names) => {
                Endpoint::new(["questions", "tags"]).param("tagNames", names.join(","))
            }
        }
    }
}

impl TagQuery {
    pub fn endpoint(&self) -> Endpoint {
        match self {
            TagQuery::All { include_questions } => {
                Endpoint::new(["tags"]).param("includeQuestions", include_questions)
            }
            TagQuery::Keyword(keyword) => Endpoint::new(["tags", "search"]).param("keyword", keyword),
            TagQuery::WithQuestions => Endpoint::new(["tags", "with-questions"]),
            TagQuery::WithoutQuestions => Endpoint::new(["tags", "without-questions"]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn any_tag_query_joins_names_with_commas() {
        let endpoint = QuestionQuery::AnyTag(vec!["concurrency".into(), "go".into()]).endpoint();
        assert_eq!(endpoint.segments, vec!["questions", "tags"]);
        assert_eq!(endpoint.params, vec![("tagNames", "concurrency,go".to_string())]);
    }

    #[test]
    fn difficulty_goes_in_the_path() {
        let endpoint = QuestionQuery::ByDifficulty(Difficulty::Hard).endpoint();
        assert_eq!(endpoint.segments, vec!["questions", "difficulty", "HARD"]);
        assert!(endpoint.params.is_empty());
    }

    #[test]
    fn include_flags_are_explicit() {
        let endpoint = TagQuery::All {
            include_questions: false,
        }
        .endpoint();
        assert_eq!(endpoint.params, vec![("includeQuestions", "false".to_string())]);

        let endpoint = QuestionQuery::All { include_tags: true }.endpoint();
        assert_eq!(endpoint.params, vec![("includeTags", "true".to_string())]);
    }
}
