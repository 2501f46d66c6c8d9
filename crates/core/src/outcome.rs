//! 실행 결과 — 성공, 또는 실패한 단계와 종료 상태

use std::fmt;

use crate::component::Component;

/// 실패가 발생한 단계
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stage {
    /// 특정 컴포넌트 빌드
    Build(Component),
    /// 특정 서비스 실행
    Launch(Component),
    /// 워크스페이스 테스트
    Tests,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Build(c) => write!(f, "build:{c}"),
            Self::Launch(c) => write!(f, "launch:{c}"),
            Self::Tests => f.write_str("tests"),
        }
    }
}

/// 단계 실패 — 실패한 단계와 명령의 종료 상태
///
/// 실행 실패(명령 없음)는 [`LAUNCH_FAILURE_STATUS`](crate::command::LAUNCH_FAILURE_STATUS)로
/// 보고되며 그 외에는 일반 종료와 구분하지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageFailure {
    /// 빌드 실패
    #[error("failed to compile {component} with error code {status}")]
    Build { component: Component, status: i32 },

    /// 서비스 실행 실패
    #[error("failed to launch {component} with error code {status}")]
    Launch { component: Component, status: i32 },

    /// 테스트 실패
    #[error("workspace tests failed with code {status}")]
    Tests { status: i32 },
}

impl StageFailure {
    /// 실패한 단계
    pub fn stage(&self) -> Stage {
        match self {
            Self::Build { component, .. } => Stage::Build(component.clone()),
            Self::Launch { component, .. } => Stage::Launch(component.clone()),
            Self::Tests { .. } => Stage::Tests,
        }
    }

    /// 하위 명령의 종료 상태
    pub fn status(&self) -> i32 {
        match self {
            Self::Build { status, .. } | Self::Launch { status, .. } | Self::Tests { status } => {
                *status
            }
        }
    }
}

/// 전체 실행의 최종 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// 모든 단계 성공
    Success,
    /// 특정 단계에서 실패
    Failed(StageFailure),
}

impl RunOutcome {
    /// 성공 여부
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    /// 실패 정보
    pub fn failure(&self) -> Option<&StageFailure> {
        match self {
            Self::Success => None,
            Self::Failed(f) => Some(f),
        }
    }

    /// 프로세스 종료 코드 (성공 0, 실패 1)
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failed(_) => 1,
        }
    }
}

impl From<Result<(), StageFailure>> for RunOutcome {
    fn from(result: Result<(), StageFailure>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(f) => Self::Failed(f),
        }
    }
}
