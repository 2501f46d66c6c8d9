//! 외부 명령 — 빌드/테스트/서비스 실행 명령과 출력 표시 모드

use std::fmt;

use crate::component::Component;

/// 실행 자체가 실패했을 때(명령을 찾을 수 없음 등) 보고하는 예약 상태 코드
///
/// 실제 종료 코드는 0..=255, 시그널 종료는 `128 + signo`이므로 겹치지 않습니다.
pub const LAUNCH_FAILURE_STATUS: i32 = -1;

/// 시그널로 종료된 자식의 상태 코드 오프셋 (셸 관례)
pub const SIGNAL_STATUS_OFFSET: i32 = 128;

/// 자식 프로세스의 stdout/stderr 처리 방식
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// 출력을 버림 (기본값)
    #[default]
    Quiet,
    /// 부모의 stdout/stderr를 그대로 상속
    Inherit,
}

impl OutputMode {
    /// `--logs` 플래그 값에서 모드를 결정합니다.
    pub fn from_verbose(verbose: bool) -> Self {
        if verbose { Self::Inherit } else { Self::Quiet }
    }

    /// 출력이 보이는 모드인지 여부
    pub fn is_verbose(self) -> bool {
        matches!(self, Self::Inherit)
    }
}

/// 프로그램과 순서 있는 인자 목록
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// 실행할 프로그램
    pub program: String,
    /// 인자 목록
    pub args: Vec<String>,
}

impl Invocation {
    /// 임의의 명령을 생성합니다.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// `cargo build -p <component>`
    pub fn build(cargo: &str, component: &Component) -> Self {
        Self::new(cargo, ["build", "-p", component.name()])
    }

    /// `cargo test`
    pub fn test(cargo: &str) -> Self {
        Self::new(cargo, ["test"])
    }

    /// `cargo run -p <component>`
    pub fn launch(cargo: &str, component: &Component) -> Self {
        Self::new(cargo, ["run", "-p", component.name()])
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_invocation_targets_one_package() {
        let inv = Invocation::build("cargo", &Component::new("oprish"));
        assert_eq!(inv.program, "cargo");
        assert_eq!(inv.args, vec!["build", "-p", "oprish"]);
        assert_eq!(inv.to_string(), "cargo build -p oprish");
    }

    #[test]
    fn test_invocation_runs_whole_workspace() {
        assert_eq!(Invocation::test("cargo").to_string(), "cargo test");
    }

    #[test]
    fn launch_invocation_runs_package() {
        let inv = Invocation::launch("cargo", &Component::new("effis"));
        assert_eq!(inv.args, vec!["run", "-p", "effis"]);
    }

    #[test]
    fn output_mode_defaults_to_quiet() {
        assert_eq!(OutputMode::default(), OutputMode::Quiet);
        assert_eq!(OutputMode::from_verbose(false), OutputMode::Quiet);
        assert!(OutputMode::from_verbose(true).is_verbose());
    }

    #[test]
    fn launch_sentinel_is_outside_exit_code_range() {
        assert!(!(0..=255).contains(&LAUNCH_FAILURE_STATUS));
    }
}
