use std::fmt::Write;

use super::{
    ImageBox, RELATION_LIMIT, TEXT_COLOR, Typography, UserInfo, fmt_err, write_document_start,
    write_fitted_text,
};
use crate::error::AppError;
use crate::features::render::assets::ImageSource;
use crate::features::render::layout::{Canvas, PROFILE_LAYOUT};
use crate::features::render::params::{clean_text, escape_xml};
use crate::features::render::theme::Mood;

/// 资料卡中的一个角色
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileEntry {
    pub character_name: String,
    pub relation_text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ProfileCard {
    pub entries: Vec<ProfileEntry>,
    pub user: UserInfo,
    pub situation: String,
}

/// 资料卡固定使用无表情立绘
pub fn render_profile_svg(
    card: &ProfileCard,
    canvas: Canvas,
    typography: &Typography,
    images: &dyn ImageSource,
) -> Result<String, AppError> {
    let l = PROFILE_LAYOUT;
    let family = typography.family();
    let header = card.user.header_text();
    let mut svg = String::with_capacity(8 * 1024 + typography.face_style().len());

    write_document_start(&mut svg, canvas, &header, true).map_err(fmt_err)?;
    writeln!(svg, "  <defs>").map_err(fmt_err)?;
    if !typography.face_style().is_empty() {
        writeln!(svg, "{}", typography.face_style()).map_err(fmt_err)?;
    }
    writeln!(svg, "  </defs>").map_err(fmt_err)?;
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
        &header,
    )
    .map_err(fmt_err)?;

    for (index, entry) in card.entries.iter().enumerate() {
        write_entry(&mut svg, index as u32, entry, family, images).map_err(fmt_err)?;
    }

    write_fitted_text(
        &mut svg,
        l.status_x,
        l.status_y,
        l.status_size,
        l.width - l.status_x * 2,
        family,
        &card.situation,
    )
    .map_err(fmt_err)?;
    write!(svg, "</svg>").map_err(fmt_err)?;
    Ok(svg)
}

fn write_entry(
    svg: &mut String,
    index: u32,
    entry: &ProfileEntry,
    family: &str,
    images: &dyn ImageSource,
) -> std::fmt::Result {
    let l = PROFILE_LAYOUT;
    let relation = clean_text(entry.relation_text.as_deref(), RELATION_LIMIT, "미정");
    let relation_x = l.image_x + l.image_size + l.relation_offset_x;
    let relation_y = l.image_y + l.image_size.div_ceil(2) + l.relation_offset_y;

    writeln!(
        svg,
        r#"  <g transform="translate({} 0)">"#,
        index * l.column_width
    )?;
    let image = ImageBox {
        x: l.image_x,
        y: l.image_y,
        size: l.image_size,
        placeholder_radius: 24,
        placeholder_font_size: 24,
    };
    let href = images.image_href(&entry.character_name, Mood::Neutral);
    image.write(svg, href.as_deref(), family, None)?;
    writeln!(
        svg,
        r#"    <text x="{relation_x}" y="{relation_y}" font-size="{}" font-family="{family}" fill="{TEXT_COLOR}">: {}</text>"#,
        l.relation_size,
        escape_xml(&relation)
    )?;
    writeln!(svg, "  </g>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::render::composer::situation_text;
    use crate::features::render::params::UserFields;
    use crate::features::render::theme::ROSTER;

    struct NeutralOnly;

    impl ImageSource for NeutralOnly {
        fn image_href(&self, character: &str, mood: Mood) -> Option<String> {
            (mood == Mood::Neutral && character == "엄마")
                .then(|| format!("data:image/png;base64,{character}"))
        }
    }

    fn card() -> ProfileCard {
        ProfileCard {
            entries: ROSTER
                .iter()
                .map(|slot| ProfileEntry {
                    character_name: slot.character.to_string(),
                    relation_text: Some("가족입니다".to_string()),
                })
                .collect(),
            user: UserInfo::from_fields(&UserFields {
                name: Some("A&B"),
                age: Some("21"),
                job: Some("학생"),
            }),
            situation: situation_text(Some("<휴식>")),
        }
    }

    fn render(card: &ProfileCard) -> String {
        render_profile_svg(
            card,
            Canvas::native(PROFILE_LAYOUT.width, PROFILE_LAYOUT.height),
            &Typography::default(),
            &NeutralOnly,
        )
        .expect("render")
    }

    #[test]
    fn relation_text_is_truncated_and_placed_beside_image() {
        let svg = render(&card());
        assert_eq!(svg.matches(">: 가족입</text>").count(), 3);
        // 80 + 260 + 24, 320 + 130 + 60
        assert!(svg.contains(r#"x="364" y="510""#));
    }

    #[test]
    fn header_and_status_are_escaped() {
        let svg = render(&card());
        assert!(svg.contains("유저 이름: A&amp;B | 유저 나이: 21 | 유저 직업: 학생"));
        assert!(svg.contains(r#"aria-label="유저 이름: A&amp;B"#));
        assert!(svg.contains("현재 상황 : &lt;휴식&gt;"));
    }

    #[test]
    fn only_existing_neutral_images_are_embedded() {
        let svg = render(&card());
        assert_eq!(svg.matches("Missing image").count(), 2);
        assert!(svg.contains("data:image/png;base64,엄마"));
        assert!(svg.contains(r#"translate(1280 0)"#));
    }
}
