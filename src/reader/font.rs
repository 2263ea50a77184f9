use serde::{Deserialize, Serialize};

/// 阅读界面可选字体，按 id 持久化到偏好设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReaderFont {
    #[default]
    System,
    Serif,
    Cursive,
    SansSerif,
    Inter,
}

impl ReaderFont {
    pub const ALL: [Self; 5] = [
        Self::System,
        Self::Serif,
        Self::Cursive,
        Self::SansSerif,
        Self::Inter,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Serif => "serif",
            Self::Cursive => "cursive",
            Self::SansSerif => "sans-serif",
            Self::Inter => "inter",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::System => "System Default",
            Self::Serif => "Serif Font",
            Self::Cursive => "Cursive Font",
            Self::SansSerif => "SansSerif Font",
            Self::Inter => "Inter Font",
        }
    }

    /// 交给渲染层的 font-family
    pub const fn typeface(self) -> &'static str {
        match self {
            Self::System => "system-ui",
            Self::Serif => "serif",
            Self::Cursive => "cursive",
            Self::SansSerif => "sans-serif",
            Self::Inter => "Inter",
        }
    }

    pub fn all() -> &'static [Self] {
        &Self::ALL
    }

    /// 未知 id 回退到系统字体
    pub fn by_id(id: &str) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|font| font.id() == id)
            .unwrap_or(Self::System)
    }
}
