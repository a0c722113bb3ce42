use reqwest::Url;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Level, event, instrument};

use handle_errors::{APILayerError, Error};

use crate::types::{
    difficulty::Difficulty,
    query::{Endpoint, QuestionQuery, TagQuery},
    question::{NewQuestion, Question, QuestionId, UpdateQuestion},
    tag::{NewTag, Tag, TagId},
};

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// 원격 질문/태그 서비스에 대한 얇은 HTTP 래퍼.
///
/// 메서드 하나가 요청 하나를 보낸다. 캐시나 일괄 처리는 하지 않으며
/// 전송 에러는 해석하지 않고 그대로 돌려준다.
#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    http: ClientWithMiddleware,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .finish()
    }
}

impl ApiClient {
    /// `retries`가 0이면 재시도 미들웨어를 붙이지 않는다.
    pub fn new(base_url: &str, retries: u32) -> Result<Self, Error> {
        let base = Url::parse(base_url)
            .map_err(|e| Error::InvalidBaseUrl(format!("{} ({})", base_url, e)))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(Error::InvalidBaseUrl(base_url.to_string()));
        }

        let mut builder = ClientBuilder::new(reqwest::Client::new());
        if retries > 0 {
            let retry_policy = ExponentialBackoff::builder().build_with_max_retries(retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(retry_policy));
        }

        Ok(ApiClient {
            base,
            http: builder.build(),
        })
    }

    fn url(&self, endpoint: &Endpoint) -> Result<Url, Error> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(&endpoint.segments);
        if !endpoint.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(endpoint.params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    // Questions

    #[instrument(skip(self))]
    pub async fn query_questions(&self, query: &QuestionQuery) -> Result<Vec<Question>, Error> {
        let url = self.url(&query.endpoint())?;
        fetch(self.http.get(url)).await
    }

    pub async fn get_questions(&self, include_tags: bool) -> Result<Vec<Question>, Error> {
        self.query_questions(&QuestionQuery::All { include_tags }).await
    }

    #[instrument(skip(self))]
    pub async fn get_question(&self, id: QuestionId, include_tags: bool) -> Result<Question, Error> {
        let endpoint =
            Endpoint::new(["questions".to_string(), id.to_string()]).param("includeTags", include_tags);
        fetch(self.http.get(self.url(&endpoint)?)).await
    }

    #[instrument(skip(self))]
    pub async fn add_question(&self, new_question: &NewQuestion) -> Result<Question, Error> {
        let url = self.url(&Endpoint::new(["questions"]))?;
        fetch(with_json(self.http.post(url), new_question)?).await
    }

    #[instrument(skip(self))]
    pub async fn update_question(
        &self,
        id: QuestionId,
        question: &UpdateQuestion,
    ) -> Result<Question, Error> {
        let url = self.url(&Endpoint::new(["questions".to_string(), id.to_string()]))?;
        fetch(with_json(self.http.put(url), question)?).await
    }

    #[instrument(skip(self))]
    pub async fn delete_question(&self, id: QuestionId) -> Result<(), Error> {
        let url = self.url(&Endpoint::new(["questions".to_string(), id.to_string()]))?;
        execute(self.http.delete(url)).await.map(|_| ())
    }

    pub async fn get_questions_by_difficulty(
        &self,
        difficulty: Difficulty,
    ) -> Result<Vec<Question>, Error> {
        self.query_questions(&QuestionQuery::ByDifficulty(difficulty))
            .await
    }

    pub async fn search_questions(&self, keyword: &str) -> Result<Vec<Question>, Error> {
        self.query_questions(&QuestionQuery::Keyword(keyword.to_string()))
            .await
    }

    pub async fn get_questions_by_tag(&self, tag_name: &str) -> Result<Vec<Question>, Error> {
        self.query_questions(&QuestionQuery::Tag(tag_name.to_string()))
            .await
    }

    pub async fn get_questions_by_tags(&self, tag_names: &[String]) -> Result<Vec<Question>, Error> {
        self.query_questions(&QuestionQuery::AnyTag(tag_names.to_vec()))
            .await
    }

    #[instrument(skip(self))]
    pub async fn add_tag_to_question(&self, id: QuestionId, tag_name: &str) -> Result<(), Error> {
        let url = self.url(&question_tag_endpoint(id, Some(tag_name)))?;
        execute(self.http.post(url)).await.map(|_| ())
    }

    #[instrument(skip(self))]
    pub async fn remove_tag_from_question(
        &self,
        id: QuestionId,
        tag_name: &str,
    ) -> Result<(), Error> {
        let url = self.url(&question_tag_endpoint(id, Some(tag_name)))?;
        execute(self.http.delete(url)).await.map(|_| ())
    }

    /// 질문의 태그 목록 전체를 주어진 이름들로 바꾼다.
    #[instrument(skip(self))]
    pub async fn set_question_tags(&self, id: QuestionId, tag_names: &[String]) -> Result<(), Error> {
        let url = self.url(&question_tag_endpoint(id, None))?;
        execute(with_json(self.http.put(url), tag_names)?)
            .await
            .map(|_| ())
    }

    // Tags

    #[instrument(skip(self))]
    pub async fn query_tags(&self, query: &TagQuery) -> Result<Vec<Tag>, Error> {
        let url = self.url(&query.endpoint())?;
        fetch(self.http.get(url)).await
    }

    pub async fn get_tags(&self, include_questions: bool) -> Result<Vec<Tag>, Error> {
        self.query_tags(&TagQuery::All { include_questions }).await
    }

    #[instrument(skip(self))]
    pub async fn get_tag(&self, id: TagId) -> Result<Tag, Error> {
        let url = self.url(&Endpoint::new(["tags".to_string(), id.to_string()]))?;
        fetch(self.http.get(url)).await
    }

    #[instrument(skip(self))]
    pub async fn get_tag_by_name(&self, name: &str) -> Result<Tag, Error> {
        let url = self.url(&Endpoint::new(["tags", "name", name]))?;
        fetch(self.http.get(url)).await
    }

    #[instrument(skip(self))]
    pub async fn add_tag(&self, new_tag: &NewTag) -> Result<Tag, Error> {
        let url = self.url(&Endpoint::new(["tags"]))?;
        fetch(with_json(self.http.post(url), new_tag)?).await
    }

    #[instrument(skip(self))]
    pub async fn update_tag(&self, id: TagId, tag: &NewTag) -> Result<Tag, Error> {
        let url = self.url(&Endpoint::new(["tags".to_string(), id.to_string()]))?;
        fetch(with_json(self.http.put(url), tag)?).await
    }

    #[instrument(skip(self))]
    pub async fn delete_tag(&self, id: TagId) -> Result<(), Error> {
        let url = self.url(&Endpoint::new(["tags".to_string(), id.to_string()]))?;
        execute(self.http.delete(url)).await.map(|_| ())
    }

    pub async fn search_tags(&self, keyword: &str) -> Result<Vec<Tag>, Error> {
        self.query_tags(&TagQuery::Keyword(keyword.to_string())).await
    }

    pub async fn get_tags_with_questions(&self) -> Result<Vec<Tag>, Error> {
        self.query_tags(&TagQuery::WithQuestions).await
    }

    pub async fn get_tags_without_questions(&self) -> Result<Vec<Tag>, Error> {
        self.query_tags(&TagQuery::WithoutQuestions).await
    }

    /// 태그 목록을 가져온 뒤 태그마다 질문 목록을 따로 가져와 채운다 (N+1 요청).
    ///
    /// 태그별 요청이 실패하면 해당 태그는 빈 질문 목록으로 보고한다.
    /// 처음의 태그 목록 요청이 실패할 때만 전체가 실패한다.
    #[instrument(skip(self))]
    pub async fn tags_with_question_counts(&self) -> Result<Vec<Tag>, Error> {
        let tags = self.get_tags(false).await?;

        // 태그별 요청은 동시에 보내고, 결과는 태그 순서대로 모은다.
        let handles: Vec<_> = tags
            .iter()
            .map(|tag| {
                let client = self.clone();
                let name = tag.name.clone();
                tokio::spawn(async move { client.get_questions_by_tag(&name).await })
            })
            .collect();

        let mut counted = Vec::with_capacity(tags.len());
        for (mut tag, handle) in tags.into_iter().zip(handles) {
            let questions = match handle.await {
                Ok(Ok(questions)) => questions,
                Ok(Err(e)) => {
                    event!(Level::WARN, tag = %tag.name, "failed to get questions for tag: {}", e);
                    Vec::new()
                }
                Err(e) => {
                    event!(Level::WARN, tag = %tag.name, "question count task failed: {}", e);
                    Vec::new()
                }
            };
            tag.questions = Some(questions);
            counted.push(tag);
        }

        event!(Level::DEBUG, tags = counted.len(), "aggregated question counts");
        Ok(counted)
    }
}

fn question_tag_endpoint(id: QuestionId, tag_name: Option<&str>) -> Endpoint {
    let mut segments = vec!["questions".to_string(), id.to_string(), "tags".to_string()];
    if let Some(name) = tag_name {
        segments.push(name.to_string());
    }
    Endpoint::new(segments)
}

fn with_json<B: Serialize + ?Sized>(request: RequestBuilder, body: &B) -> Result<RequestBuilder, Error> {
    let body = serde_json::to_vec(body).map_err(Error::SerializationError)?;
    Ok(request.header(CONTENT_TYPE, "application/json").body(body))
}

async fn fetch<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
    // 로그는 화면에서 메시지로 바꿀 때 한 번만 남긴다.
    let res = execute(request).await?;
    res.json::<T>().await.map_err(Error::ReqwestAPIError)
}

async fn execute(request: RequestBuilder) -> Result<reqwest::Response, Error> {
    let res = request
        .send()
        .await
        .map_err(Error::MiddlewareReqwestAPIError)?;

    if !res.status().is_success() {
        if res.status().is_client_error() {
            let err = transform_error(res).await;
            return Err(Error::ClientError(err));
        } else {
            let err = transform_error(res).await;
            return Err(Error::ServerError(err));
        }
    }
    Ok(res)
}

async fn transform_error(res: reqwest::Response) -> APILayerError {
    APILayerError {
        status: res.status().as_u16(),
        message: res.text().await.unwrap_or_default(),
    }
}
