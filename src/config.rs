//! 配置管理模块
//!
//! 提供TOML配置文件的读取、写入和自动发现功能，以及API密钥的查找。
//! 配置在进程启动时加载一次，之后以不可变的 [`AppConfig`] 传递给各组件。

use crate::error::{ReaderError, Result};
use crate::types::{PricingConfig, ProviderConfig, RateLimitConfig, ServerConfig, StorageConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 存放API密钥的环境变量
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
/// 覆盖模型标识的环境变量
pub const MODEL_VAR: &str = "OPENAI_MODEL";
/// 项目根目录标记文件
pub const PROJECT_MARKER: &str = "Cargo.toml";
/// 项目根目录下的本地环境文件
pub const ENV_LOCAL_FILE: &str = ".env.local";

const MAX_ROOT_SEARCH_DEPTH: usize = 20;

/// 阅读助手配置结构
///
/// 包含所有可调整的配置选项，支持从TOML文件加载和保存。
///
/// # 示例
///
/// ```rust
/// use word_reader::ReaderLibConfig;
///
/// let config: ReaderLibConfig = toml::from_str(r#"
///     [provider]
///     model = "gpt-4o"
///
///     [rate_limit]
///     max_requests = 30
/// "#).unwrap();
///
/// assert_eq!(config.provider.model, "gpt-4o");
/// assert_eq!(config.rate_limit.max_requests, 30);
/// assert_eq!(config.rate_limit.window_ms, 60_000);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderLibConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl ReaderLibConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ReaderError::Config(e.to_string()))
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ReaderError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration from multiple possible locations
    pub fn load_from_default_locations() -> Self {
        let possible_paths = ["word-reader.toml", "config.toml", ".word-reader.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        info!("Loaded configuration from: {}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config from {}: {}", path, e);
                    }
                }
            }
        }

        info!("No configuration file found, using defaults");
        Self::default()
    }

    /// Generate example configuration file
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> Result<()> {
        Self::default().save_to_file(path)
    }
}

/// 密钥查找情况（不包含密钥本身）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialReport {
    pub cwd: PathBuf,
    pub project_root: Option<PathBuf>,
    pub env_local_path: Option<PathBuf>,
    pub env_local_exists: bool,
    pub has_key: bool,
}

/// 已解析的服务凭据
///
/// 没有密钥是正常状态，各组件据此走回退路径。
#[derive(Clone)]
pub struct Credentials {
    api_key: Option<String>,
    report: CredentialReport,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("has_key", &self.api_key.is_some())
            .field("report", &self.report)
            .finish()
    }
}

impl Credentials {
    /// 从当前进程环境和工作目录查找密钥
    pub fn resolve() -> Self {
        let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve_from(&cwd, env::var(API_KEY_VAR).ok())
    }

    /// 先用环境变量中的值，否则向上查找项目根目录下的 `.env.local`
    pub fn resolve_from(cwd: &Path, env_value: Option<String>) -> Self {
        let project_root = find_project_root(cwd);
        let env_local_path = project_root.as_ref().map(|root| root.join(ENV_LOCAL_FILE));
        let env_local_exists = env_local_path.as_ref().is_some_and(|p| p.exists());

        let api_key = non_empty(env_value).or_else(|| {
            env_local_path
                .as_deref()
                .filter(|_| env_local_exists)
                .and_then(read_key_from_env_file)
        });

        let report = CredentialReport {
            cwd: cwd.to_path_buf(),
            project_root,
            env_local_path,
            env_local_exists,
            has_key: api_key.is_some(),
        };

        Self { api_key, report }
    }

    /// 没有密钥的凭据，测试和离线运行时使用
    pub fn none() -> Self {
        Self {
            api_key: None,
            report: CredentialReport {
                cwd: PathBuf::from("."),
                project_root: None,
                env_local_path: None,
                env_local_exists: false,
                has_key: false,
            },
        }
    }

    /// 直接给定密钥
    pub fn with_key(key: impl Into<String>) -> Self {
        let mut credentials = Self::none();
        credentials.api_key = non_empty(Some(key.into()));
        credentials.report.has_key = credentials.api_key.is_some();
        credentials
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn report(&self) -> &CredentialReport {
        &self.report
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// 从 `start` 开始逐级向上，返回第一个包含标记文件的目录
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .take(MAX_ROOT_SEARCH_DEPTH)
        .find(|dir| dir.join(PROJECT_MARKER).exists())
        .map(Path::to_path_buf)
}

fn read_key_from_env_file(path: &Path) -> Option<String> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    for entry in entries {
        match entry {
            Ok((name, value)) if name == API_KEY_VAR => {
                debug!("Found {} in {}", API_KEY_VAR, path.display());
                return non_empty(Some(value));
            }
            Ok(_) => {}
            Err(e) => debug!("Skipping unreadable line in {}: {}", path.display(), e),
        }
    }
    None
}

/// 进程级不可变配置
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub settings: ReaderLibConfig,
    pub credentials: Credentials,
}

impl AppConfig {
    pub fn new(settings: ReaderLibConfig, credentials: Credentials) -> Self {
        Self {
            settings,
            credentials,
        }
    }

    /// 加载配置文件（显式路径或默认位置）、应用环境变量覆盖并解析凭据
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => ReaderLibConfig::from_file(path)?,
            None => ReaderLibConfig::load_from_default_locations(),
        };

        if let Some(model) = non_empty(env::var(MODEL_VAR).ok()) {
            settings.provider.model = model;
        }

        let credentials = Credentials::resolve();
        if credentials.api_key().is_none() {
            info!(
                "{} is missing or empty, provider-backed features will use fallbacks",
                API_KEY_VAR
            );
        }

        Ok(Self::new(settings, credentials))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project_with_env_file(contents: &str) -> (TempDir, PathBuf) {
        let root = tempfile::tempdir().unwrap();
        fs::write(root.path().join(PROJECT_MARKER), "[package]\n").unwrap();
        fs::write(root.path().join(ENV_LOCAL_FILE), contents).unwrap();
        let nested = root.path().join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();
        (root, nested)
    }

    #[test]
    fn environment_value_wins() {
        let (_root, nested) = project_with_env_file("OPENAI_API_KEY=from-file\n");
        let credentials = Credentials::resolve_from(&nested, Some("  from-env  ".into()));
        assert_eq!(credentials.api_key(), Some("from-env"));
    }

    #[test]
    fn env_local_found_by_walking_upward() {
        let (root, nested) = project_with_env_file("OTHER=1\nOPENAI_API_KEY=\"sk-test\"\n");
        let credentials = Credentials::resolve_from(&nested, None);
        assert_eq!(credentials.api_key(), Some("sk-test"));

        let report = credentials.report();
        assert_eq!(report.project_root.as_deref(), Some(root.path()));
        assert!(report.env_local_exists);
        assert!(report.has_key);
    }

    #[test]
    fn blank_values_mean_no_key() {
        let (_root, nested) = project_with_env_file("OPENAI_API_KEY=   \n");
        let credentials = Credentials::resolve_from(&nested, Some("".into()));
        assert_eq!(credentials.api_key(), None);
        assert!(!credentials.report().has_key);
    }

    #[test]
    fn debug_output_hides_key() {
        let rendered = format!("{:?}", Credentials::with_key("sk-secret"));
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("has_key: true"));
    }

    #[test]
    fn config_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("word-reader.toml");
        ReaderLibConfig::generate_example_config(&path).unwrap();

        let loaded = ReaderLibConfig::from_file(&path).unwrap();
        assert_eq!(loaded.provider.model, "gpt-4o-mini");
        assert_eq!(loaded.rate_limit.max_requests, 15);
        assert_eq!(loaded.server.port, 3000);
    }
}
