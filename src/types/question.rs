use serde::{Deserialize, Serialize};

use crate::types::difficulty::Difficulty;
use crate::types::tag::Tag;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub question_text: String,
    pub question_answer: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

#[derive(Serialize, Debug, Clone, Copy, Eq, Hash, Deserialize, PartialEq, PartialOrd, Ord)]
pub struct QuestionId(pub i32);

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 생성과 수정 요청 본문. 원격 API는 두 요청에 같은 모양을 받는다.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewQuestion {
    pub question_text: String,
    pub question_answer: String,
    pub difficulty: Difficulty,
}

pub type UpdateQuestion = NewQuestion;

impl Question {
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags
            .iter()
            .flatten()
            .map(|tag| tag.name.as_str())
            .collect()
    }

    pub fn has_any_tag(&self, names: &[String]) -> bool {
        self.tags
            .iter()
            .flatten()
            .any(|tag| names.iter().any(|name| *name == tag.name))
    }

    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.question_text.to_lowercase().contains(&keyword)
            || self.question_answer.to_lowercase().contains(&keyword)
    }
}

impl From<&Question> for NewQuestion {
    fn from(question: &Question) -> Self {
        NewQuestion {
            question_text: question.question_text.clone(),
            question_answer: question.question_answer.clone(),
            difficulty: question.difficulty,
        }
    }
}
