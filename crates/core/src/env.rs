//! 실행 환경 구성 — 자식 프로세스에 전달할 환경변수 계산
//!
//! 전역 환경을 직접 수정하지 않고, 단계마다 새로운 [`RunEnvironment`]를
//! 만들어 러너에 참조로 전달합니다. 한 번 만들어진 값은 변경되지 않습니다.
//!
//! # 로그 레벨 정책
//! | 출력 모드 | 상속된 `RUST_LOG` | 결과 |
//! |-----------|-------------------|------|
//! | Quiet     | 있음              | 제거 |
//! | Quiet     | 없음              | `DEBUG` 주입 |
//! | Inherit   | 무관              | 그대로 |

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use crate::command::OutputMode;

/// 자식 프로세스의 로그 레벨 환경변수
pub const LOG_OVERRIDE_VAR: &str = "RUST_LOG";

/// 출력을 버리는 모드에서 주입하는 로그 레벨
pub const INJECTED_LOG_LEVEL: &str = "DEBUG";

/// 대상 배포의 기본 URL 환경변수
pub const INSTANCE_URL_VAR: &str = "INSTANCE_URL";

/// 로그 레벨 오버라이드 상태
///
/// 상태를 직접 추적하므로 정책을 여러 번 적용해도 결과가 같습니다.
/// 값은 UTF-8이 아닐 수 있으므로 `OsString`으로 보관합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOverride {
    /// 상속 환경에 없음
    Absent,
    /// 호출자가 지정한 값
    Inherited(OsString),
    /// Quiet 모드에서 제거됨
    Stripped,
    /// Quiet 모드에서 주입됨
    Injected,
}

impl LogOverride {
    /// 상속 환경의 값에서 초기 상태를 만듭니다.
    pub fn from_inherited(value: Option<OsString>) -> Self {
        match value {
            Some(v) => Self::Inherited(v),
            None => Self::Absent,
        }
    }

    /// 출력 모드에 따른 정책을 적용합니다.
    pub fn apply(self, output: OutputMode) -> Self {
        match output {
            OutputMode::Inherit => self,
            OutputMode::Quiet => match self {
                Self::Absent | Self::Injected => Self::Injected,
                Self::Inherited(_) | Self::Stripped => Self::Stripped,
            },
        }
    }

    /// 자식에게 전달할 값. `None`이면 변수를 설정하지 않습니다.
    pub fn value(&self) -> Option<&OsStr> {
        match self {
            Self::Inherited(v) => Some(v),
            Self::Injected => Some(OsStr::new(INJECTED_LOG_LEVEL)),
            Self::Absent | Self::Stripped => None,
        }
    }
}

/// 자식 프로세스에 전달되는 환경변수 전체
///
/// 자식은 이 매핑만 받습니다 (부모 환경을 추가로 상속하지 않음).
/// 이름과 값은 OS 문자열 그대로 보관되어 UTF-8이 아닌 변수도 유지됩니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunEnvironment {
    vars: BTreeMap<OsString, OsString>,
}

impl RunEnvironment {
    /// 변수 값을 조회합니다.
    pub fn get(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.vars.get(key.as_ref()).map(OsString::as_os_str)
    }

    /// 변수가 존재하는지 확인합니다.
    pub fn contains(&self, key: impl AsRef<OsStr>) -> bool {
        self.vars.contains_key(key.as_ref())
    }

    /// 이름 순으로 모든 변수를 순회합니다.
    pub fn iter(&self) -> impl Iterator<Item = (&OsStr, &OsStr)> {
        self.vars.iter().map(|(k, v)| (k.as_os_str(), v.as_os_str()))
    }

    /// 변수 개수
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for RunEnvironment
where
    K: Into<OsString>,
    V: Into<OsString>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// 고정된 테스트 설정 파일 경로 항목
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConfigEntry {
    /// 환경변수 이름 (예: `ELUDRIS_CONF`)
    pub var: OsString,
    /// 저장소 기준 상대 경로 (예: `tests/Eludris.toml`)
    pub path: PathBuf,
}

/// 단계별 [`RunEnvironment`]를 만드는 구성기
///
/// 시작 시 한 번 생성되며, 이후 빌드/테스트 단계마다
/// [`build_env`](Self::build_env) / [`test_env`](Self::test_env)로
/// 새 값을 만들어 냅니다.
#[derive(Debug, Clone)]
pub struct EnvironmentConfigurator {
    base: BTreeMap<OsString, OsString>,
    log_override: LogOverride,
    test_config: Option<TestConfigEntry>,
}

impl EnvironmentConfigurator {
    /// 상속 환경과 출력 모드로 구성기를 생성합니다.
    ///
    /// 보통 `std::env::vars_os()`를 그대로 넘깁니다.
    pub fn new<I, K, V>(inherited: I, output: OutputMode) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut base: BTreeMap<OsString, OsString> = inherited
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let log_override =
            LogOverride::from_inherited(base.remove(OsStr::new(LOG_OVERRIDE_VAR))).apply(output);

        Self {
            base,
            log_override,
            test_config: None,
        }
    }

    /// 모든 자식에게 전달할 변수를 추가합니다.
    pub fn with_var(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        let key = key.into();
        if key.as_os_str() == OsStr::new(LOG_OVERRIDE_VAR) {
            tracing::warn!(
                key = LOG_OVERRIDE_VAR,
                "log override is managed by output mode, ignoring explicit value"
            );
            return self;
        }
        self.base.insert(key, value.into());
        self
    }

    /// 테스트 단계에서 설정할 설정 파일 경로 항목을 지정합니다.
    pub fn with_test_config(mut self, var: impl Into<OsString>, path: impl AsRef<Path>) -> Self {
        self.test_config = Some(TestConfigEntry {
            var: var.into(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// 로그 레벨 오버라이드 상태
    pub fn log_override(&self) -> &LogOverride {
        &self.log_override
    }

    /// 빌드 단계용 환경
    pub fn build_env(&self) -> RunEnvironment {
        let mut vars = self.base.clone();
        if let Some(level) = self.log_override.value() {
            vars.insert(LOG_OVERRIDE_VAR.into(), level.to_os_string());
        }
        RunEnvironment { vars }
    }

    /// 테스트 단계용 환경
    ///
    /// 호출자가 같은 이름의 변수를 갖고 있어도 고정 경로로 덮어씁니다.
    pub fn test_env(&self) -> RunEnvironment {
        let mut env = self.build_env();
        if let Some(entry) = &self.test_config {
            env.vars
                .insert(entry.var.clone(), entry.path.as_os_str().to_os_string());
        }
        env
    }
}
