//! 설정 관리 — stagehand.toml 파싱 및 런타임 설정
//!
//! [`HarnessConfig`]는 하네스 실행에 필요한 모든 설정을 담는 최상위 구조체입니다.
//! 테스트가 읽는 서비스 설정 파일(`tests/Eludris.toml`)의 내용은 해석하지 않고
//! 경로만 전달합니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`STAGEHAND_WORKSPACE_CARGO=cross` 형식, `INSTANCE_URL`)
//! 2. 설정 파일 (`stagehand.toml`, 없으면 건너뜀)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), stagehand_core::error::HarnessError> {
//! use stagehand_core::config::HarnessConfig;
//!
//! // 파일이 없으면 기본값 + 환경변수 오버라이드
//! let config = HarnessConfig::load_or_default("stagehand.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = HarnessConfig::parse("[services]\nlaunch = true")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::component::{Component, components};
use crate::env::INSTANCE_URL_VAR;
use crate::error::{ConfigError, HarnessError};

/// 기본 설정 파일 이름
pub const DEFAULT_CONFIG_FILE: &str = "stagehand.toml";

/// 설정 파일 경로를 지정하는 환경변수
pub const CONFIG_PATH_VAR: &str = "STAGEHAND_CONFIG";

/// 기본 대상 배포 URL
pub const DEFAULT_INSTANCE_URL: &str = "http://0.0.0.0:7159";

/// stagehand 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// 일반 설정 (하네스 자체 로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// 워크스페이스 설정 (빌드/테스트 대상)
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// 서비스 실행 설정
    #[serde(default)]
    pub services: ServicesConfig,
}

impl HarnessConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 파일이 없으면 기본값에서 시작해 환경변수 오버라이드를 적용합니다.
    ///
    /// 사용자가 명시한 경로에는 쓰지 마세요. 그 경우 파일이 없으면
    /// [`load`](Self::load)처럼 에러가 되어야 합니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        match Self::load(path).await {
            Err(HarnessError::Config(ConfigError::FileNotFound { .. })) => {
                let mut config = Self::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                HarnessError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                HarnessError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, HarnessError> {
        toml::from_str(toml_str).map_err(|e| {
            HarnessError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `STAGEHAND_{SECTION}_{FIELD}`.
    /// `INSTANCE_URL`은 서비스들과 공유하는 이름이므로 그대로 읽되,
    /// `STAGEHAND_WORKSPACE_INSTANCE_URL`이 더 우선합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "STAGEHAND_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "STAGEHAND_GENERAL_LOG_FORMAT");

        // Workspace
        override_string(&mut self.workspace.root, "STAGEHAND_WORKSPACE_ROOT");
        override_string(&mut self.workspace.cargo, "STAGEHAND_WORKSPACE_CARGO");
        override_components(
            &mut self.workspace.components,
            "STAGEHAND_WORKSPACE_COMPONENTS",
        );
        override_string(
            &mut self.workspace.config_env_var,
            "STAGEHAND_WORKSPACE_CONFIG_ENV_VAR",
        );
        override_string(
            &mut self.workspace.test_config_path,
            "STAGEHAND_WORKSPACE_TEST_CONFIG_PATH",
        );
        override_non_empty(&mut self.workspace.instance_url, INSTANCE_URL_VAR);
        override_string(
            &mut self.workspace.instance_url,
            "STAGEHAND_WORKSPACE_INSTANCE_URL",
        );

        // Services
        override_bool(&mut self.services.launch, "STAGEHAND_SERVICES_LAUNCH");
        override_u64(
            &mut self.services.startup_grace_ms,
            "STAGEHAND_SERVICES_STARTUP_GRACE_MS",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["compact", "pretty", "json"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.workspace.cargo.trim().is_empty() {
            return Err(invalid("workspace.cargo", "must not be empty".to_owned()));
        }

        if self.workspace.components.is_empty() {
            return Err(invalid(
                "workspace.components",
                "must name at least one component".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for component in &self.workspace.components {
            if component.name().trim().is_empty() {
                return Err(invalid(
                    "workspace.components",
                    "component names must not be empty".to_owned(),
                ));
            }
            if !seen.insert(component.name()) {
                return Err(invalid(
                    "workspace.components",
                    format!("duplicate component '{component}'"),
                ));
            }
        }

        if self.workspace.config_env_var.trim().is_empty() {
            return Err(invalid(
                "workspace.config_env_var",
                "must not be empty".to_owned(),
            ));
        }

        if Path::new(&self.workspace.test_config_path).is_absolute() {
            return Err(invalid(
                "workspace.test_config_path",
                "must be relative to the workspace root".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> HarnessError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 하네스 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (compact, pretty, json)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "compact".to_owned(),
        }
    }
}

/// 워크스페이스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// 자식 명령의 작업 디렉토리
    pub root: String,
    /// 빌드 도구 프로그램
    pub cargo: String,
    /// 빌드 순서대로 나열한 컴포넌트
    pub components: Vec<Component>,
    /// 테스트 설정 파일 경로를 전달할 환경변수 이름
    pub config_env_var: String,
    /// 워크스페이스 기준 테스트 설정 파일 경로
    pub test_config_path: String,
    /// 대상 배포 URL (자식에게 `INSTANCE_URL`로 전달)
    pub instance_url: String,
}

impl WorkspaceConfig {
    /// 작업 디렉토리 경로
    pub fn root_path(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: ".".to_owned(),
            cargo: "cargo".to_owned(),
            components: components(["oprish", "pandemonium", "effis"]),
            config_env_var: "ELUDRIS_CONF".to_owned(),
            test_config_path: "tests/Eludris.toml".to_owned(),
            instance_url: DEFAULT_INSTANCE_URL.to_owned(),
        }
    }
}

/// 서비스 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// 빌드 후 서비스를 직접 실행할지 여부
    pub launch: bool,
    /// 서비스 실행 후 테스트 시작까지 대기 시간 (밀리초)
    pub startup_grace_ms: u64,
}

impl ServicesConfig {
    /// 대기 시간
    pub fn startup_grace(&self) -> Duration {
        Duration::from_millis(self.startup_grace_ms)
    }
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            launch: false,
            startup_grace_ms: 2000,
        }
    }
}

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_non_empty(target: &mut String, env_key: &str) {
    match std::env::var(env_key) {
        Ok(val) if !val.is_empty() => *target = val,
        _ => {}
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_components(target: &mut Vec<Component>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Component::new)
            .collect();
    }
}
