use std::fmt::Write;

use super::decor::write_decor;
use super::{
    ImageBox, RELATION_LIMIT, Typography, UserInfo, fmt_err, write_document_start,
    write_fitted_text,
};
use crate::error::AppError;
use crate::features::render::assets::ImageSource;
use crate::features::render::layout::{AFFINITY_LAYOUT, Canvas};
use crate::features::render::params::{clamp_score, clean_text, escape_xml};
use crate::features::render::theme::{Mood, theme_for};

const SHADOW_FILTER_ID: &str = "panelShadow";

/// 单个角色面板的输入（每次请求构造，不持久化）
#[derive(Debug, Clone, PartialEq)]
pub struct AffinityEntry {
    pub label: String,
    pub image_key: String,
    pub theme_key: String,
    pub relation_text: Option<String>,
    pub score: f64,
}

/// 好感度文档的全部输入
#[derive(Debug, Clone)]
pub struct AffinityCard {
    pub entries: Vec<AffinityEntry>,
    pub user: UserInfo,
    /// 页脚文本（已清洗，未转义）
    pub situation: String,
}

/// 条形填充高度，自底部向上
pub fn fill_height(score: f64) -> u32 {
    let score = clamp_score(Some(score));
    (f64::from(AFFINITY_LAYOUT.bar_height) * score / 100.0).round() as u32
}

pub fn render_affinity_svg(
    card: &AffinityCard,
    canvas: Canvas,
    typography: &Typography,
    images: &dyn ImageSource,
) -> Result<String, AppError> {
    let l = AFFINITY_LAYOUT;
    let family = typography.family();
    let mut svg = String::with_capacity(16 * 1024 + typography.face_style().len());

    write_document_start(&mut svg, canvas, "Affinity summary", true).map_err(fmt_err)?;
    writeln!(svg, "  <defs>").map_err(fmt_err)?;
    if !typography.face_style().is_empty() {
        writeln!(svg, "{}", typography.face_style()).map_err(fmt_err)?;
    }
    writeln!(
        svg,
        r#"    <filter id="{SHADOW_FILTER_ID}" x="-20%" y="-20%" width="140%" height="140%">"#
    )
    .map_err(fmt_err)?;
    writeln!(
        svg,
        r##"      <feDropShadow dx="0" dy="12" stdDeviation="14" flood-color="#000000" flood-opacity="0.18"/>"##
    )
    .map_err(fmt_err)?;
    writeln!(svg, "    </filter>\n  </defs>").map_err(fmt_err)?;
    writeln!(
        svg,
        r##"  <rect width="{}" height="{}" fill="#ffffff"/>"##,
        l.width, l.height
    )
    .map_err(fmt_err)?;

    let text_width = l.width - l.header_x * 2;
    write_fitted_text(
        &mut svg,
        l.header_x,
        l.header_y,
        l.header_size,
        text_width,
        family,
        &card.user.header_text(),
    )
    .map_err(fmt_err)?;

    for (index, entry) in card.entries.iter().enumerate() {
        write_panel(&mut svg, index as u32, entry, family, images).map_err(fmt_err)?;
    }

    write_fitted_text(
        &mut svg,
        l.header_x,
        l.footer_y,
        l.footer_size,
        text_width,
        family,
        &card.situation,
    )
    .map_err(fmt_err)?;
    write!(svg, "</svg>").map_err(fmt_err)?;
    Ok(svg)
}

fn write_panel(
    svg: &mut String,
    index: u32,
    entry: &AffinityEntry,
    family: &str,
    images: &dyn ImageSource,
) -> std::fmt::Result {
    let l = AFFINITY_LAYOUT;
    let theme = theme_for(&entry.theme_key);
    let score = clamp_score(Some(entry.score));
    // 显示值与表情分档使用同一个取整后的分数
    let shown = score.round() as u32;
    let mood = Mood::from_score(f64::from(shown));

    let fill = fill_height(score);
    let fill_y = l.bar_y + (l.bar_height - fill);
    let radius = l.bar_width / 2;
    let center_x = l.bar_x + l.bar_width / 2;
    let clip_id = format!("barClip-{index}");

    writeln!(
        svg,
        r#"  <g transform="translate({} {})">"#,
        index * l.column_width,
        l.panel_offset_y
    )?;
    writeln!(svg, r#"    <defs><clipPath id="{clip_id}">"#)?;
    writeln!(
        svg,
        r#"      <rect x="{}" y="{}" width="{}" height="{}" rx="{radius}"/>"#,
        l.bar_x, l.bar_y, l.bar_width, l.bar_height
    )?;
    writeln!(svg, "    </clipPath></defs>")?;
    writeln!(
        svg,
        r##"    <rect x="{}" y="{}" width="{}" height="{}" rx="{radius}" fill="#ffffff" stroke="{}" stroke-width="6"/>"##,
        l.bar_x, l.bar_y, l.bar_width, l.bar_height, theme.bar_stroke_color
    )?;
    writeln!(
        svg,
        r#"    <rect x="{}" y="{fill_y}" width="{}" height="{fill}" fill="{}" clip-path="url(#{clip_id})"/>"#,
        l.bar_x, l.bar_width, theme.bar_color
    )?;

    write_decor(
        svg,
        theme.decoration,
        center_x,
        l.bar_y + l.decor_inset,
        theme.accent_color,
    )?;
    write_decor(
        svg,
        theme.decoration,
        center_x,
        l.bar_y + l.bar_height - l.decor_inset,
        theme.accent_color,
    )?;

    let image = ImageBox {
        x: l.image_x,
        y: l.image_y,
        size: l.image_size,
        placeholder_radius: 28,
        placeholder_font_size: 28,
    };
    let href = images.image_href(&entry.image_key, mood);
    image.write(svg, href.as_deref(), family, Some(SHADOW_FILTER_ID))?;

    let relation = clean_text(entry.relation_text.as_deref(), RELATION_LIMIT, "미정");
    writeln!(
        svg,
        r#"    <text x="{}" y="{}" font-size="{}" font-family="{family}" fill="{}">관계 : {}</text>"#,
        l.label_x,
        l.relation_y,
        l.relation_size,
        theme.text_stroke_color,
        escape_xml(&relation)
    )?;
    writeln!(
        svg,
        r#"    <text x="{}" y="{}" font-size="{}" font-family="{family}" fill="{}" stroke="{}" stroke-width="8" paint-order="stroke fill" letter-spacing="1">{}</text>"#,
        l.label_x,
        l.label_y,
        l.label_size,
        theme.text_color,
        theme.text_stroke_color,
        escape_xml(&entry.label)
    )?;
    writeln!(
        svg,
        r#"    <text x="{}" y="{}" font-size="{}" font-family="{family}" fill="{}" stroke="{}" stroke-width="10" paint-order="stroke fill">{}%</text>"#,
        l.label_x,
        l.score_y,
        l.score_size,
        theme.text_color,
        theme.text_stroke_color,
        shown
    )?;
    writeln!(svg, "  </g>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::render::composer::situation_text;
    use crate::features::render::params::UserFields;
    use crate::features::render::theme::ROSTER;
    use std::cell::RefCell;

    /// 记录被请求的图片，仅 `available` 中的角色返回 href
    struct FakeImages {
        available: Vec<&'static str>,
        requested: RefCell<Vec<(String, Mood)>>,
    }

    impl ImageSource for FakeImages {
        fn image_href(&self, character: &str, mood: Mood) -> Option<String> {
            self.requested
                .borrow_mut()
                .push((character.to_string(), mood));
            self.available
                .contains(&character)
                .then(|| format!("http://h/img/{character}-{mood}.png"))
        }
    }

    fn card(scores: [f64; 3]) -> AffinityCard {
        AffinityCard {
            entries: ROSTER
                .iter()
                .zip(scores)
                .map(|(slot, score)| AffinityEntry {
                    label: slot.label.to_string(),
                    image_key: slot.character.to_string(),
                    theme_key: slot.character.to_string(),
                    relation_text: None,
                    score,
                })
                .collect(),
            user: UserInfo::from_fields(&UserFields::default()),
            situation: situation_text(None),
        }
    }

    fn render(card: &AffinityCard, images: &FakeImages) -> String {
        render_affinity_svg(
            card,
            Canvas::native(AFFINITY_LAYOUT.width, AFFINITY_LAYOUT.height),
            &Typography::default(),
            images,
        )
        .expect("render")
    }

    fn no_images() -> FakeImages {
        FakeImages {
            available: vec![],
            requested: RefCell::new(vec![]),
        }
    }

    #[test]
    fn fill_height_follows_rounded_formula() {
        assert_eq!(fill_height(0.0), 0);
        assert_eq!(fill_height(100.0), 820);
        assert_eq!(fill_height(30.0), 246);
        // 820 × 0.125 = 102.5 → 103
        assert_eq!(fill_height(12.5), 103);
        assert_eq!(fill_height(150.0), 820);
        assert_eq!(fill_height(-10.0), 0);
    }

    #[test]
    fn panels_are_laid_out_in_roster_order() {
        let svg = render(&card([30.0, 70.0, 95.0]), &no_images());
        let p30 = svg.find(">30%<").expect("30%");
        let p70 = svg.find(">70%<").expect("70%");
        let p95 = svg.find(">95%<").expect("95%");
        assert!(p30 < p70 && p70 < p95);
        assert!(svg.contains(r#"translate(0 110)"#));
        assert!(svg.contains(r#"translate(640 110)"#));
        assert!(svg.contains(r#"translate(1280 110)"#));
        for i in 0..3 {
            assert!(svg.contains(&format!(r#"clip-path="url(#barClip-{i})""#)));
        }
    }

    #[test]
    fn mood_selects_image_variant() {
        let images = no_images();
        render(&card([10.0, 40.0, 80.0]), &images);
        let moods: Vec<Mood> = images.requested.borrow().iter().map(|(_, m)| *m).collect();
        assert_eq!(moods, vec![Mood::Neutral, Mood::Liking, Mood::Love]);
    }

    #[test]
    fn displayed_score_and_mood_agree_after_rounding() {
        let images = FakeImages {
            available: vec!["여동생"],
            requested: RefCell::new(vec![]),
        };
        let svg = render(&card([39.6, 79.4, 0.0]), &images);
        assert!(svg.contains(">40%<"));
        assert!(svg.contains(">79%<"));
        assert!(svg.contains(r#"href="http://h/img/여동생-호감.png""#));
        let moods: Vec<Mood> = images.requested.borrow().iter().map(|(_, m)| *m).collect();
        assert_eq!(moods, vec![Mood::Liking, Mood::Liking, Mood::Neutral]);
    }

    #[test]
    fn missing_images_become_placeholders() {
        let images = FakeImages {
            available: vec!["누나"],
            requested: RefCell::new(vec![]),
        };
        let svg = render(&card([50.0, 50.0, 50.0]), &images);
        assert_eq!(svg.matches("Missing image").count(), 2);
        assert!(svg.contains(r#"href="http://h/img/누나-호감.png""#));
        assert!(svg.contains(r#"filter="url(#panelShadow)""#));
    }

    #[test]
    fn document_is_complete_and_deterministic() {
        let c = card([1.0, 2.0, 3.0]);
        let a = render(&c, &no_images());
        let b = render(&c, &no_images());
        assert_eq!(a, b);
        assert!(a.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(a.contains(r#"viewBox="0 0 1920 1280""#));
        assert!(a.ends_with("</svg>"));
        assert!(a.contains("유저 이름: 유저 | 유저 나이: ?? | 유저 직업: 미상"));
        assert!(a.contains("현재 상황 : 없음"));
        assert!(a.contains("관계 : 미정"));
    }

    #[test]
    fn labels_and_relations_are_escaped() {
        let mut c = card([0.0, 0.0, 0.0]);
        c.entries[0].label = "<b>".into();
        c.entries[0].relation_text = Some("&\"'".into());
        let svg = render(&c, &no_images());
        assert!(svg.contains("&lt;b&gt;"));
        assert!(svg.contains("관계 : &amp;&quot;&apos;"));
    }

    #[test]
    fn canvas_override_changes_pixels_only() {
        let c = card([0.0, 0.0, 0.0]);
        let canvas = Canvas::native(AFFINITY_LAYOUT.width, AFFINITY_LAYOUT.height)
            .with_pixel_width(Some(960));
        let svg = render_affinity_svg(&c, canvas, &Typography::default(), &no_images())
            .expect("render");
        assert!(svg.contains(r#"width="960" height="640" viewBox="0 0 1920 1280""#));
    }
}
