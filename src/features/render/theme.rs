//! 角色主题注册表与好感度情绪分档。

use std::fmt;

/// 装饰图标样式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecorationKind {
    Hearts,
    Flower,
    Leaf,
}

/// 角色配色与装饰
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub bar_color: &'static str,
    pub bar_stroke_color: &'static str,
    pub text_color: &'static str,
    pub text_stroke_color: &'static str,
    pub accent_color: &'static str,
    pub decoration: DecorationKind,
}

/// 已登记的角色键（图片文件名前缀同样使用该键）
pub const SISTER: &str = "여동생";
pub const ELDER_SISTER: &str = "누나";
pub const MOTHER: &str = "엄마";

/// 主题表：声明顺序即回退优先级，首项为默认主题
const THEMES: [(&str, Theme); 3] = [
    (
        SISTER,
        Theme {
            bar_color: "#f9d24a",
            bar_stroke_color: "#d5a718",
            text_color: "#f28eb2",
            text_stroke_color: "#d86b94",
            accent_color: "#f59fb5",
            decoration: DecorationKind::Hearts,
        },
    ),
    (
        ELDER_SISTER,
        Theme {
            bar_color: "#e1e5ea",
            bar_stroke_color: "#b6bdc7",
            text_color: "#9aa1ac",
            text_stroke_color: "#7d838d",
            accent_color: "#bcc2cc",
            decoration: DecorationKind::Flower,
        },
    ),
    (
        MOTHER,
        Theme {
            bar_color: "#2f2824",
            bar_stroke_color: "#4a3f38",
            text_color: "#c8a07a",
            text_stroke_color: "#a57852",
            accent_color: "#c49a71",
            decoration: DecorationKind::Leaf,
        },
    ),
];

/// 按角色键查找主题；未知角色使用首个声明的主题
pub fn theme_for(key: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, t)| t)
        .unwrap_or(&THEMES[0].1)
}

/// 面板中的一个固定角色位
#[derive(Debug, Clone, Copy)]
pub struct CharacterSlot {
    /// 分数参数名（同时是路径段的位置含义）
    pub score_key: &'static str,
    /// 关系文本参数名
    pub relation_key: &'static str,
    /// 面板显示名
    pub label: &'static str,
    /// 图片与主题键
    pub character: &'static str,
}

/// 渲染顺序固定
pub const ROSTER: [CharacterSlot; 3] = [
    CharacterSlot {
        score_key: "y1",
        relation_key: "s1",
        label: "이서아",
        character: SISTER,
    },
    CharacterSlot {
        score_key: "y2",
        relation_key: "s2",
        label: "이서혜",
        character: ELDER_SISTER,
    },
    CharacterSlot {
        score_key: "y3",
        relation_key: "m",
        label: "이서희",
        character: MOTHER,
    },
];

/// 好感度分档（决定使用哪张表情图）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mood {
    Neutral,
    Liking,
    Love,
}

impl Mood {
    pub const LOVE_THRESHOLD: f64 = 80.0;
    pub const LIKING_THRESHOLD: f64 = 40.0;

    /// 分档下界包含在内：[80,100] 爱慕，[40,80) 好感，其余为无表情
    pub fn from_score(score: f64) -> Self {
        if score >= Self::LOVE_THRESHOLD {
            Mood::Love
        } else if score >= Self::LIKING_THRESHOLD {
            Mood::Liking
        } else {
            Mood::Neutral
        }
    }

    /// 图片文件名中使用的标签
    pub fn label(self) -> &'static str {
        match self {
            Mood::Love => "사랑",
            Mood::Liking => "호감",
            Mood::Neutral => "무표정",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mood_tiers_are_lower_bound_inclusive() {
        assert_eq!(Mood::from_score(0.0), Mood::Neutral);
        assert_eq!(Mood::from_score(39.99), Mood::Neutral);
        assert_eq!(Mood::from_score(40.0), Mood::Liking);
        assert_eq!(Mood::from_score(79.5), Mood::Liking);
        assert_eq!(Mood::from_score(80.0), Mood::Love);
        assert_eq!(Mood::from_score(100.0), Mood::Love);
    }

    #[test]
    fn unknown_character_falls_back_to_first_theme() {
        assert_eq!(theme_for("unknown"), theme_for(SISTER));
        assert_eq!(theme_for(MOTHER).decoration, DecorationKind::Leaf);
        assert_eq!(theme_for(ELDER_SISTER).decoration, DecorationKind::Flower);
    }

    #[test]
    fn roster_characters_all_have_themes() {
        for slot in ROSTER {
            assert!(THEMES.iter().any(|(k, _)| *k == slot.character));
        }
        assert_eq!(ROSTER.map(|s| s.score_key), ["y1", "y2", "y3"]);
    }
}
