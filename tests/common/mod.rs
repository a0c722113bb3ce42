#![allow(dead_code)]

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use warp::http::{Method, StatusCode};
use warp::hyper::body::Bytes;
use warp::path::FullPath;
use warp::reply::Response;
use warp::{Filter, Reply};

use interview_deck::ApiClient;
use interview_deck::types::{
    difficulty::Difficulty,
    question::{NewQuestion, Question, QuestionId},
    tag::{NewTag, Tag, TagId},
};

#[derive(Debug, Clone)]
struct StoredQuestion {
    text: String,
    answer: String,
    difficulty: Difficulty,
    tag_ids: Vec<i32>,
}

#[derive(Debug, Default)]
struct State {
    questions: BTreeMap<i32, StoredQuestion>,
    tags: BTreeMap<i32, String>,
    next_id: i32,
    failing_tags: HashSet<String>,
}

/// 테스트용 원격 카탈로그. 메모리에 질문과 태그를 두고 warp로 REST API를 흉내 낸다.
#[derive(Clone, Default)]
pub struct Catalog {
    state: Arc<RwLock<State>>,
    hits: Arc<AtomicUsize>,
    down: Arc<AtomicBool>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 카탈로그를 임의 포트에서 띄우고 그 주소를 가리키는 클라이언트를 돌려준다.
    pub async fn serve(&self) -> ApiClient {
        let catalog = self.clone();
        let catalog_filter = warp::any().map(move || catalog.clone());

        let routes = warp::method()
            .and(warp::path::full())
            .and(warp::query::<HashMap<String, String>>())
            .and(warp::body::bytes())
            .and(catalog_filter)
            .and_then(dispatch);

        let (addr, server) = warp::serve(routes).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        ApiClient::new(&format!("http://{}/api", addr), 0).expect("valid test url")
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// 모든 요청에 500을 돌려준다.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    /// `GET /questions/tag/{name}`만 500으로 실패시킨다.
    pub async fn fail_tag(&self, name: &str) {
        self.state.write().await.failing_tags.insert(name.to_string());
    }

    pub async fn seed_tag(&self, name: &str) -> TagId {
        let mut state = self.state.write().await;
        TagId(state.insert_tag(name))
    }

    pub async fn seed_question(
        &self,
        text: &str,
        answer: &str,
        difficulty: Difficulty,
        tags: &[&str],
    ) -> QuestionId {
        let mut state = self.state.write().await;
        let tag_ids = tags.iter().map(|name| state.tag_id_or_insert(name)).collect();
        state.next_id += 1;
        let id = state.next_id;
        state.questions.insert(
            id,
            StoredQuestion {
                text: text.to_string(),
                answer: answer.to_string(),
                difficulty,
                tag_ids,
            },
        );
        QuestionId(id)
    }

    pub async fn tag_names_of(&self, id: QuestionId) -> Vec<String> {
        let state = self.state.read().await;
        state
            .questions
            .get(&id.0)
            .map(|q| q.tag_ids.iter().filter_map(|t| state.tags.get(t).cloned()).collect())
            .unwrap_or_default()
    }

    pub async fn tag_count(&self) -> usize {
        self.state.read().await.tags.len()
    }
}

async fn dispatch(
    method: Method,
    path: FullPath,
    params: HashMap<String, String>,
    body: Bytes,
    catalog: Catalog,
) -> Result<Response, Infallible> {
    catalog.hits.fetch_add(1, Ordering::SeqCst);
    if catalog.down.load(Ordering::SeqCst) {
        return Ok(status(StatusCode::INTERNAL_SERVER_ERROR, "catalog is down"));
    }

    let segments: Vec<&str> = path
        .as_str()
        .trim_matches('/')
        .split('/')
        .skip(1) // "api"
        .collect();
    let mut state = catalog.state.write().await;
    Ok(state.route(&method, &segments, &params, &body))
}

fn json<T: Serialize>(value: &T) -> Response {
    warp::reply::json(value).into_response()
}

fn status(code: StatusCode, message: &str) -> Response {
    warp::reply::with_status(message.to_string(), code).into_response()
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Option<T> {
    serde_json::from_slice(body).ok()
}

impl State {
    fn insert_tag(&mut self, name: &str) -> i32 {
        self.next_id += 1;
        self.tags.insert(self.next_id, name.to_string());
        self.next_id
    }

    fn tag_id_or_insert(&mut self, name: &str) -> i32 {
        match self.tags.iter().find(|(_, n)| n.as_str() == name) {
            Some((id, _)) => *id,
            None => self.insert_tag(name),
        }
    }

    fn tag(&self, id: i32, include_questions: bool) -> Option<Tag> {
        let name = self.tags.get(&id)?;
        let questions = include_questions.then(|| {
            self.questions
                .iter()
                .filter(|(_, q)| q.tag_ids.contains(&id))
                .map(|(qid, _)| self.question(*qid, false).expect("stored question"))
                .collect()
        });
        Some(Tag {
            id: TagId(id),
            name: name.clone(),
            questions,
        })
    }

    fn all_tags(&self, include_questions: bool) -> Vec<Tag> {
        self.tags
            .keys()
            .filter_map(|id| self.tag(*id, include_questions))
            .collect()
    }

    fn question(&self, id: i32, include_tags: bool) -> Option<Question> {
        let stored = self.questions.get(&id)?;
        let tags = include_tags.then(|| {
            stored
                .tag_ids
                .iter()
                .filter_map(|t| self.tag(*t, false))
                .collect()
        });
        Some(Question {
            id: QuestionId(id),
            question_text: stored.text.clone(),
            question_answer: stored.answer.clone(),
            difficulty: stored.difficulty,
            tags,
        })
    }

    fn questions_where(&self, keep: impl Fn(&Question) -> bool) -> Vec<Question> {
        self.questions
            .keys()
            .filter_map(|id| self.question(*id, true))
            .filter(|q| keep(q))
            .collect()
    }

    fn write_question(&mut self, id: i32, body: NewQuestion) -> Question {
        let tag_ids = self
            .questions
            .get(&id)
            .map(|q| q.tag_ids.clone())
            .unwrap_or_default();
        self.questions.insert(
            id,
            StoredQuestion {
                text: body.question_text,
                answer: body.question_answer,
                difficulty: body.difficulty,
                tag_ids,
            },
        );
        self.question(id, true).expect("just written")
    }

    fn route(
        &mut self,
        method: &Method,
        segments: &[&str],
        params: &HashMap<String, String>,
        body: &[u8],
    ) -> Response {
        let flag = |key: &str| params.get(key).is_some_and(|v| v == "true");
        let keyword = params.get("keyword").map(|k| k.to_lowercase()).unwrap_or_default();

        match (method.as_str(), segments) {
            ("GET", ["questions"]) => {
                let include_tags = flag("includeTags");
                let questions: Vec<Question> = self
                    .questions
                    .keys()
                    .filter_map(|id| self.question(*id, include_tags))
                    .collect();
                json(&questions)
            }
            ("POST", ["questions"]) => match parse::<NewQuestion>(body) {
                Some(new) => {
                    self.next_id += 1;
                    let id = self.next_id;
                    json(&self.write_question(id, new))
                }
                None => status(StatusCode::BAD_REQUEST, "invalid question"),
            },
            ("GET", ["questions", "search"]) => {
                json(&self.questions_where(|q| q.matches_keyword(&keyword)))
            }
            ("GET", ["questions", "difficulty", level]) => match level.parse::<Difficulty>() {
                Ok(d) => json(&self.questions_where(|q| q.difficulty == d)),
                Err(_) => status(StatusCode::BAD_REQUEST, "unknown difficulty"),
            },
            ("GET", ["questions", "tag", name]) => {
                if self.failing_tags.contains(*name) {
                    return status(StatusCode::INTERNAL_SERVER_ERROR, "tag lookup failed");
                }
                let names = vec![name.to_string()];
                json(&self.questions_where(|q| q.has_any_tag(&names)))
            }
            ("GET", ["questions", "tags"]) => {
                let names: Vec<String> = params
                    .get("tagNames")
                    .map(|csv| {
                        csv.split(',')
                            .filter(|s| !s.is_empty())
                            .map(String::from)
                            .collect()
                    })
                    .unwrap_or_default();
                json(&self.questions_where(|q| q.has_any_tag(&names)))
            }
            ("GET", ["questions", id]) => match id.parse().ok().and_then(|id| self.question(id, flag("includeTags"))) {
                Some(question) => json(&question),
                None => status(StatusCode::NOT_FOUND, "question not found"),
            },
            ("PUT", ["questions", id]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                match (self.questions.contains_key(&id), parse::<NewQuestion>(body)) {
                    (true, Some(update)) => json(&self.write_question(id, update)),
                    (false, _) => status(StatusCode::NOT_FOUND, "question not found"),
                    (true, None) => status(StatusCode::BAD_REQUEST, "invalid question"),
                }
            }
            ("DELETE", ["questions", id]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                match self.questions.remove(&id) {
                    Some(_) => status(StatusCode::OK, "deleted"),
                    None => status(StatusCode::NOT_FOUND, "question not found"),
                }
            }
            ("PUT", ["questions", id, "tags"]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                let Some(names) = parse::<Vec<String>>(body) else {
                    return status(StatusCode::BAD_REQUEST, "invalid tag list");
                };
                if !self.questions.contains_key(&id) {
                    return status(StatusCode::NOT_FOUND, "question not found");
                }
                let tag_ids = names.iter().map(|n| self.tag_id_or_insert(n)).collect();
                if let Some(q) = self.questions.get_mut(&id) {
                    q.tag_ids = tag_ids;
                }
                status(StatusCode::OK, "tags set")
            }
            ("POST", ["questions", id, "tags", name]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                let tag_id = self.tags.iter().find(|(_, n)| n == name).map(|(t, _)| *t);
                match (self.questions.get_mut(&id), tag_id) {
                    (Some(q), Some(tag_id)) => {
                        if !q.tag_ids.contains(&tag_id) {
                            q.tag_ids.push(tag_id);
                        }
                        status(StatusCode::OK, "tag added")
                    }
                    _ => status(StatusCode::NOT_FOUND, "question or tag not found"),
                }
            }
            ("DELETE", ["questions", id, "tags", name]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                let tag_id = self.tags.iter().find(|(_, n)| n == name).map(|(t, _)| *t);
                match (self.questions.get_mut(&id), tag_id) {
                    (Some(q), Some(tag_id)) => {
                        q.tag_ids.retain(|t| *t != tag_id);
                        status(StatusCode::OK, "tag removed")
                    }
                    _ => status(StatusCode::NOT_FOUND, "question or tag not found"),
                }
            }
            ("GET", ["tags"]) => json(&self.all_tags(flag("includeQuestions"))),
            ("POST", ["tags"]) => match parse::<NewTag>(body) {
                Some(new) if self.tags.values().any(|n| *n == new.name) => {
                    status(StatusCode::CONFLICT, "tag already exists")
                }
                Some(new) => {
                    let id = self.insert_tag(&new.name);
                    json(&self.tag(id, false))
                }
                None => status(StatusCode::BAD_REQUEST, "invalid tag"),
            },
            ("GET", ["tags", "search"]) => {
                let tags: Vec<Tag> = self
                    .all_tags(false)
                    .into_iter()
                    .filter(|t| t.name.to_lowercase().contains(&keyword))
                    .collect();
                json(&tags)
            }
            ("GET", ["tags", "with-questions"]) => {
                let tags: Vec<Tag> = self
                    .all_tags(true)
                    .into_iter()
                    .filter(|t| t.question_count() > 0)
                    .collect();
                json(&tags)
            }
            ("GET", ["tags", "without-questions"]) => {
                let tags: Vec<Tag> = self
                    .all_tags(true)
                    .into_iter()
                    .filter(|t| t.question_count() == 0)
                    .collect();
                json(&tags)
            }
            ("GET", ["tags", "name", name]) => {
                match self.tags.iter().find(|(_, n)| n == name).map(|(id, _)| *id) {
                    Some(id) => json(&self.tag(id, false)),
                    None => status(StatusCode::NOT_FOUND, "tag not found"),
                }
            }
            ("GET", ["tags", id]) => match id.parse().ok().and_then(|id| self.tag(id, false)) {
                Some(tag) => json(&tag),
                None => status(StatusCode::NOT_FOUND, "tag not found"),
            },
            ("PUT", ["tags", id]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                match (self.tags.contains_key(&id), parse::<NewTag>(body)) {
                    (true, Some(update)) => {
                        self.tags.insert(id, update.name);
                        json(&self.tag(id, false))
                    }
                    (false, _) => status(StatusCode::NOT_FOUND, "tag not found"),
                    (true, None) => status(StatusCode::BAD_REQUEST, "invalid tag"),
                }
            }
            ("DELETE", ["tags", id]) => {
                let id: i32 = id.parse().unwrap_or(-1);
                if self.tags.remove(&id).is_none() {
                    return status(StatusCode::NOT_FOUND, "tag not found");
                }
                for question in self.questions.values_mut() {
                    question.tag_ids.retain(|t| *t != id);
                }
                status(StatusCode::OK, "deleted")
            }
            _ => status(StatusCode::NOT_FOUND, "route not found"),
        }
    }
}
