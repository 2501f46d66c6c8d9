//! 에러 타입 — 도메인별 에러 정의
//!
//! 단계 실패(빌드/실행/테스트)는 에러가 아니라 실행 결과이므로
//! [`StageFailure`](crate::outcome::StageFailure)로 따로 표현합니다.

/// stagehand 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
