use serde::Deserialize;
use std::env;

use handle_errors::Error;

use crate::client::DEFAULT_API_URL;

/// 모든 명령에 공통인 연결 옵션
#[derive(clap::Args, Debug, Default, Clone, PartialEq)]
pub struct ConnectionArgs {
    /// Base URL of the question catalog API
    #[clap(long, global = true)]
    pub api_url: Option<String>,
    /// Log level for this crate (error, warn, info, debug, trace)
    #[clap(long, global = true)]
    pub log_level: Option<String>,
    /// Transient-failure retries in the HTTP layer (0 disables retrying)
    #[clap(long, global = true)]
    pub retries: Option<u32>,
}

/// `setup.toml` (선택 사항)의 내용. 모든 항목이 비어 있을 수 있다.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub log_level: Option<String>,
    pub retries: Option<u32>,
}

impl FileConfig {
    pub fn load(name: &str) -> Result<FileConfig, Error> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(name).required(false))
            .build()?;
        Ok(settings.try_deserialize::<FileConfig>()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: String,
    pub log_level: String,
    pub retries: u32,
}

impl Config {
    /// 명령줄 > 환경 변수(`.env` 포함) > `setup.toml` > 기본값 순으로 합친다.
    pub fn new(args: &ConnectionArgs) -> Result<Config, Error> {
        dotenv::dotenv().ok();
        let file = FileConfig::load("setup")?;
        Config::resolve(args, file, |key| env::var(key).ok())
    }

    pub fn resolve<F>(args: &ConnectionArgs, file: FileConfig, env: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = args
            .api_url
            .clone()
            .or_else(|| env("API_URL"))
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let log_level = args
            .log_level
            .clone()
            .or_else(|| env("LOG_LEVEL"))
            .or(file.log_level)
            .unwrap_or_else(|| "warn".to_string());

        let retries = match args.retries {
            Some(retries) => retries,
            None => match env("API_RETRIES") {
                Some(value) => value.trim().parse::<u32>().map_err(Error::ParseError)?,
                None => file.retries.unwrap_or(0),
            },
        };

        Ok(Config {
            api_url,
            log_level,
            retries,
        })
    }

    /// `tracing_subscriber::EnvFilter`에 넘길 필터 문자열
    pub fn log_filter(&self) -> String {
        format!(
            "interview_deck={level},handle_errors={level},reqwest=warn",
            level = self.log_level
        )
    }
}
