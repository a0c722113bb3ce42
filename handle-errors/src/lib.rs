use config::ConfigError;
use reqwest::Error as ReqwestError;
use reqwest_middleware::Error as MiddlewareReqwestError;

use tracing::{Level, event, instrument};

#[derive(Debug)]
pub enum Error {
    ParseError(std::num::ParseIntError),
    ConfigError(ConfigError),
    InvalidBaseUrl(String),
    UnknownDifficulty(String),
    MissingSearchCriteria, // 키워드, 난이도, 태그가 모두 비어 있으면 네트워크 호출 없이 거부한다.
    MissingFields,
    EmptyTagName,
    NoTagsSelected,
    TagsUnavailable, // 태그 목록을 불러오지 못해 이름 중복을 확인할 수 없다.
    ReqwestAPIError(ReqwestError),
    MiddlewareReqwestAPIError(MiddlewareReqwestError),
    ClientError(APILayerError), // 원격 API가 4xx를 반환한 경우
    ServerError(APILayerError), // 원격 API가 5xx를 반환한 경우
    SerializationError(serde_json::Error),
    Io(std::io::Error),
}

#[derive(Debug, Clone)]
pub struct APILayerError {
    pub status: u16,
    pub message: String,
}

impl std::fmt::Display for APILayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Status: {}, Message: {}", self.status, self.message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::ParseError(err) => {
                write!(f, "Cannot parse parameter: {}", err)
            }
            Error::ConfigError(err) => {
                write!(f, "Cannot read configuration: {}", err)
            }
            Error::InvalidBaseUrl(url) => {
                write!(f, "Invalid API base URL: {}", url)
            }
            Error::UnknownDifficulty(value) => {
                write!(f, "Unknown difficulty '{}', expected EASY, MEDIUM or HARD", value)
            }
            Error::MissingSearchCriteria => {
                write!(f, "Please enter a search keyword or select filters")
            }
            Error::MissingFields => {
                write!(f, "Question text and answer are required")
            }
            Error::EmptyTagName => {
                write!(f, "Tag name is required")
            }
            Error::NoTagsSelected => {
                write!(f, "Select at least one tag to start a quiz")
            }
            Error::TagsUnavailable => {
                write!(f, "Tags could not be loaded, so no new tag was created")
            }
            Error::ReqwestAPIError(err) => {
                write!(f, "External API error: {}", err)
            }
            Error::MiddlewareReqwestAPIError(err) => {
                write!(f, "External API error: {}", err)
            }
            Error::ClientError(err) => {
                write!(f, "External Client error: {}", err)
            }
            Error::ServerError(err) => {
                write!(f, "External Server error: {}", err)
            }
            Error::SerializationError(err) => {
                write!(f, "Cannot encode request body: {}", err)
            }
            Error::Io(err) => {
                write!(f, "Terminal I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::ConfigError(err)
    }
}

impl Error {
    /// 네트워크 호출 전에 로컬에서 걸러진 에러인지 여부
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::MissingSearchCriteria
                | Error::MissingFields
                | Error::EmptyTagName
                | Error::NoTagsSelected
                | Error::TagsUnavailable
        )
    }
}

/// 사용자 동작 하나가 실패했을 때 화면에 보여 줄 메시지를 만든다.
///
/// 검증 에러는 그대로 보여 주고, 전송/서버 에러는 내부 내용을 로그로만 남기고
/// "Failed to ..." 형태의 일반 메시지로 바꾼다. 4xx와 5xx는 구분하지 않는다.
#[instrument(level = "debug")]
pub fn user_message(action: &str, err: &Error) -> String {
    if err.is_validation() {
        event!(Level::DEBUG, "validation rejected: {}", err);
        return err.to_string();
    }
    event!(Level::ERROR, "{:?}", err);
    format!("Failed to {}", action)
}
