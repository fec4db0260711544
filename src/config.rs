use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 生成服务的根地址（curate-topics / generate-single-topic / delete-vector-files）
    pub api_base_url: String,
    /// 相邻两个课题生成请求之间的等待秒数
    pub topic_delay_secs: u64,
    /// 单次 HTTP 请求超时秒数
    pub request_timeout_secs: u64,
    /// 会话存储目录，每个会话一个 JSON 文件
    pub store_dir: String,
    /// 当前学习者会话ID
    pub session_id: String,
    /// 测评答卷 TOML 文件
    pub assessment_file: String,
    /// 会话里没有记录科目时使用的科目
    pub default_subject: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            topic_delay_secs: 2,
            request_timeout_secs: 120,
            store_dir: "sessions".to_string(),
            session_id: "default".to_string(),
            assessment_file: "assessment.toml".to_string(),
            default_subject: "Biology".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 使用自定义查找函数加载配置（便于测试）
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let config = Self {
            api_base_url: lookup("CRAMPLAN_API_BASE_URL").unwrap_or(default.api_base_url),
            topic_delay_secs: parse_var(&lookup, "TOPIC_DELAY_SECS", "u64")?
                .unwrap_or(default.topic_delay_secs),
            request_timeout_secs: parse_var(&lookup, "REQUEST_TIMEOUT_SECS", "u64")?
                .unwrap_or(default.request_timeout_secs),
            store_dir: lookup("STORE_DIR").unwrap_or(default.store_dir),
            session_id: lookup("SESSION_ID").unwrap_or(default.session_id),
            assessment_file: lookup("ASSESSMENT_FILE").unwrap_or(default.assessment_file),
            default_subject: lookup("DEFAULT_SUBJECT").unwrap_or(default.default_subject),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(invalid("CRAMPLAN_API_BASE_URL", "不能为空"));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("REQUEST_TIMEOUT_SECS", "必须大于 0"));
        }
        if self.session_id.trim().is_empty() {
            return Err(invalid("SESSION_ID", "不能为空"));
        }
        Ok(())
    }

    /// 流水线使用的配置
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            topic_delay: Duration::from_secs(self.topic_delay_secs),
            default_subject: self.default_subject.clone(),
        }
    }

    /// 当前会话的存储文件路径
    pub fn session_store_path(&self) -> PathBuf {
        PathBuf::from(&self.store_dir).join(format!("{}.json", self.session_id))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// 流水线编排配置
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// 相邻两次内容生成请求之间的固定间隔（限流用）
    pub topic_delay: Duration,
    /// 会话中缺少科目时的兜底科目
    pub default_subject: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Config::default().pipeline()
    }
}

fn invalid(name: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<F, T>(
    lookup: &F,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
