//! SVG 文档组装。
//!
//! 三种渲染器都是纯函数：输入相同（包括图片解析结果）时输出逐字节一致。
//! 所有自由文本在这里才转义，长度限制按转义前的码点计算。

mod affinity;
mod decor;
mod profile;
mod status;

pub use affinity::{AffinityCard, AffinityEntry, fill_height, render_affinity_svg};
pub use profile::{ProfileCard, ProfileEntry, render_profile_svg};
pub use status::render_status_svg;

use std::fmt::Write;

use super::assets::{FontAsset, GENERIC_FONT_STACK};
use super::layout::{Canvas, MIN_FONT_SIZE, fit_font_size};
use super::params::{UserFields, clean_text, escape_xml};
use crate::error::AppError;

pub const USER_NAME_LIMIT: usize = 12;
pub const USER_AGE_LIMIT: usize = 3;
pub const USER_JOB_LIMIT: usize = 10;
pub const STATUS_LIMIT: usize = 20;
pub const RELATION_LIMIT: usize = 3;

const TEXT_COLOR: &str = "#111827";

pub(crate) fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::Internal(format!("SVG formatting error: {e}"))
}

/// 文档字体：可选的 `@font-face` 块与字体族声明
#[derive(Debug, Clone)]
pub struct Typography {
    face_style: String,
    family: String,
}

impl Typography {
    pub fn new(font: Option<&FontAsset>) -> Self {
        match font {
            Some(font) => Self {
                face_style: font.font_face_style(),
                family: font.font_family(),
            },
            None => Self::default(),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn face_style(&self) -> &str {
        &self.face_style
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            face_style: String::new(),
            family: GENERIC_FONT_STACK.to_string(),
        }
    }
}

/// 页眉中的用户信息（已清洗，尚未转义）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub name: String,
    pub age: String,
    pub job: String,
}

impl UserInfo {
    /// 各字段独立截断与兜底
    pub fn from_fields(fields: &UserFields<'_>) -> Self {
        Self {
            name: clean_text(fields.name, USER_NAME_LIMIT, "유저"),
            age: clean_text(fields.age, USER_AGE_LIMIT, "??"),
            job: clean_text(fields.job, USER_JOB_LIMIT, "미상"),
        }
    }

    pub fn header_text(&self) -> String {
        format!(
            "유저 이름: {} | 유저 나이: {} | 유저 직업: {}",
            self.name, self.age, self.job
        )
    }
}

/// 页脚的"现在状况"文本（已清洗，尚未转义）
pub fn situation_text(status: Option<&str>) -> String {
    format!("현재 상황 : {}", clean_text(status, STATUS_LIMIT, "없음"))
}

/// XML 声明与根元素开标签
fn write_document_start(
    svg: &mut String,
    canvas: Canvas,
    aria_label: &str,
    with_xlink: bool,
) -> std::fmt::Result {
    writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    let xlink = if with_xlink {
        r#" xmlns:xlink="http://www.w3.org/1999/xlink""#
    } else {
        ""
    };
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg"{xlink} width="{}" height="{}" viewBox="0 0 {} {}" role="img" aria-label="{}">"#,
        canvas.width,
        canvas.height,
        canvas.view_width,
        canvas.view_height,
        escape_xml(aria_label)
    )
}

/// 按估算宽度自动缩小字号的单行文本；`raw` 为未转义文本
fn write_fitted_text(
    svg: &mut String,
    x: u32,
    y: u32,
    base_size: u32,
    available_width: u32,
    family: &str,
    raw: &str,
) -> std::fmt::Result {
    let size = fit_font_size(raw.chars().count(), base_size, available_width, MIN_FONT_SIZE);
    writeln!(
        svg,
        r#"  <text x="{x}" y="{y}" font-size="{size}" font-family="{family}" fill="{TEXT_COLOR}">{}</text>"#,
        escape_xml(raw)
    )
}

/// 图片或缺图占位框
#[derive(Debug, Clone, Copy)]
struct ImageBox {
    x: u32,
    y: u32,
    size: u32,
    placeholder_radius: u32,
    placeholder_font_size: u32,
}

impl ImageBox {
    fn write(
        &self,
        svg: &mut String,
        href: Option<&str>,
        family: &str,
        filter: Option<&str>,
    ) -> std::fmt::Result {
        let Self { x, y, size, .. } = *self;
        match href {
            Some(href) => {
                let href = escape_xml(href);
                let filter = filter
                    .map(|id| format!(r#" filter="url(#{id})""#))
                    .unwrap_or_default();
                writeln!(
                    svg,
                    r#"    <image x="{x}" y="{y}" width="{size}" height="{size}" href="{href}" xlink:href="{href}" preserveAspectRatio="xMidYMin meet"{filter}/>"#
                )
            }
            None => {
                writeln!(svg, "    <g>")?;
                writeln!(
                    svg,
                    r##"      <rect x="{x}" y="{y}" width="{size}" height="{size}" rx="{}" fill="#f3f4f6" stroke="#d1d5db" stroke-width="3"/>"##,
                    self.placeholder_radius
                )?;
                writeln!(
                    svg,
                    r##"      <text x="{}" y="{}" font-size="{}" text-anchor="middle" font-family="{family}" fill="#9ca3af">Missing image</text>"##,
                    x + size / 2,
                    y + size / 2,
                    self.placeholder_font_size
                )?;
                writeln!(svg, "    </g>")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::render::assets::ImageSource;
    use crate::features::render::layout::{AFFINITY_LAYOUT, PROFILE_LAYOUT};
    use crate::features::render::theme::Mood;
    use std::path::PathBuf;
    use std::sync::Arc;

    #[test]
    fn user_info_defaults_and_limits_are_independent() {
        let info = UserInfo::from_fields(&UserFields {
            name: Some("가나다라마바사아자차카타파하"),
            age: None,
            job: Some("  "),
        });
        assert_eq!(info.name.chars().count(), USER_NAME_LIMIT);
        assert_eq!(info.age, "??");
        assert_eq!(info.job, "미상");
        assert_eq!(
            info.header_text(),
            "유저 이름: 가나다라마바사아자차카타 | 유저 나이: ?? | 유저 직업: 미상"
        );
    }

    #[test]
    fn situation_falls_back_when_missing() {
        assert_eq!(situation_text(None), "현재 상황 : 없음");
        assert_eq!(situation_text(Some(" 휴식 ")), "현재 상황 : 휴식");
    }

    #[test]
    fn generic_typography_has_no_font_face() {
        let t = Typography::new(None);
        assert!(t.face_style().is_empty());
        assert_eq!(t.family(), GENERIC_FONT_STACK);
    }

    struct NoImages;

    impl ImageSource for NoImages {
        fn image_href(&self, _character: &str, _mood: Mood) -> Option<String> {
            None
        }
    }

    #[test]
    fn loaded_font_is_embedded_in_every_document() {
        let font = FontAsset {
            name: "TestFace".to_string(),
            path: PathBuf::from("fonts/test.ttf"),
            base64: Arc::from("AAEC"),
        };
        let typography = Typography::new(Some(&font));
        let user = UserInfo::from_fields(&UserFields::default());

        let affinity = render_affinity_svg(
            &AffinityCard {
                entries: vec![],
                user: user.clone(),
                situation: situation_text(None),
            },
            Canvas::native(AFFINITY_LAYOUT.width, AFFINITY_LAYOUT.height),
            &typography,
            &NoImages,
        )
        .expect("affinity");
        let profile = render_profile_svg(
            &ProfileCard {
                entries: vec![ProfileEntry {
                    character_name: "여동생".to_string(),
                    relation_text: None,
                }],
                user,
                situation: situation_text(None),
            },
            Canvas::native(PROFILE_LAYOUT.width, PROFILE_LAYOUT.height),
            &typography,
            &NoImages,
        )
        .expect("profile");
        let status = render_status_svg(Some("Friends"), None, &typography).expect("status");

        for svg in [&affinity, &profile, &status] {
            assert!(svg.contains("@font-face"));
            assert!(svg.contains("font-family: 'TestFace';"));
            assert!(svg.contains("base64,AAEC"));
            assert!(svg.contains(r#"font-family="'TestFace', "#));
        }
    }

    #[test]
    fn fitted_text_is_escaped_and_shrunk() {
        let mut svg = String::new();
        let long = "<".repeat(100);
        write_fitted_text(&mut svg, 10, 20, 72, 1800, "f", &long).expect("write");
        assert!(svg.contains("&lt;&lt;"));
        assert!(!svg.contains("font-size=\"72\""));
    }

    #[test]
    fn placeholder_is_drawn_without_href() {
        let bx = ImageBox {
            x: 80,
            y: 320,
            size: 260,
            placeholder_radius: 24,
            placeholder_font_size: 24,
        };
        let mut svg = String::new();
        bx.write(&mut svg, None, "f", None).expect("write");
        assert!(svg.contains("Missing image"));
        assert!(svg.contains(r#"x="210" y="450""#));

        let mut svg = String::new();
        bx.write(&mut svg, Some("http://h/img/a.png?x=1&y=2"), "f", Some("shadow"))
            .expect("write");
        assert!(svg.contains(r#"href="http://h/img/a.png?x=1&amp;y=2""#));
        assert!(svg.contains(r#"filter="url(#shadow)""#));
    }
}
