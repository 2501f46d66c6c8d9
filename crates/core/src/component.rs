//! 컴포넌트 — 독립적으로 빌드 가능한 서비스 단위

use std::fmt;

use serde::{Deserialize, Serialize};

/// 빌드 순서 목록에 포함된 서비스 하나의 이름
///
/// 실행 중에는 생성/삭제되지 않으며, 설정에서 읽은 순서 그대로 빌드됩니다.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Component(String);

impl Component {
    /// 이름으로 컴포넌트를 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// 컴포넌트 이름 (`cargo -p` 인자로 그대로 사용)
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Component {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// 이름 목록을 컴포넌트 목록으로 변환합니다.
pub fn components<I, S>(names: I) -> Vec<Component>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Component::new).collect()
}
