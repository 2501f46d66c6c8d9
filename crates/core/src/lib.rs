//! stagehand 공통 크레이트
//!
//! 빌드/테스트 파이프라인이 공유하는 타입, 설정, 에러, 실행 환경 구성을 정의합니다.
//! 프로세스 실행과 생명주기 관리는 `stagehand-pipeline`이 담당합니다.

pub mod command;
pub mod component;
pub mod config;
pub mod env;
pub mod error;
pub mod outcome;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, HarnessError};

// 설정
pub use config::HarnessConfig;

// 도메인 타입
pub use command::{Invocation, LAUNCH_FAILURE_STATUS, OutputMode};
pub use component::Component;
pub use env::{EnvironmentConfigurator, LogOverride, RunEnvironment};
pub use outcome::{RunOutcome, Stage, StageFailure};
