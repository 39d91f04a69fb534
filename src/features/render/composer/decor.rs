use std::fmt::Write;

use crate::features::render::theme::DecorationKind;

/// 以 (x, y) 为锚点绘制一个装饰图标
pub(super) fn write_decor(
    svg: &mut String,
    kind: DecorationKind,
    x: u32,
    y: u32,
    color: &str,
) -> std::fmt::Result {
    writeln!(svg, r#"    <g transform="translate({x} {y})" fill="{color}">"#)?;
    match kind {
        DecorationKind::Hearts => {
            writeln!(
                svg,
                r#"      <path d="M 0 -12 C -10 -22 -28 -8 -16 8 C -8 22 0 28 0 36 C 0 28 8 22 16 8 C 28 -8 10 -22 0 -12 Z"/>"#
            )?;
            writeln!(svg, r#"      <circle cx="-18" cy="22" r="4" opacity="0.6"/>"#)?;
            writeln!(svg, r#"      <circle cx="18" cy="26" r="5" opacity="0.6"/>"#)?;
        }
        DecorationKind::Flower => {
            for (cx, cy) in [(0, -16), (14, -6), (12, 12), (-12, 12), (-14, -6)] {
                writeln!(svg, r#"      <circle cx="{cx}" cy="{cy}" r="8"/>"#)?;
            }
            writeln!(
                svg,
                r##"      <circle cx="0" cy="0" r="6" fill="#ffffff" opacity="0.7"/>"##
            )?;
        }
        DecorationKind::Leaf => {
            writeln!(
                svg,
                r#"      <path d="M 0 -20 C 12 -18 22 -6 12 8 C 6 18 2 24 0 32 C -2 24 -6 18 -12 8 C -22 -6 -12 -18 0 -20 Z"/>"#
            )?;
            writeln!(svg, r#"      <rect x="-12" y="32" width="24" height="10" rx="4"/>"#)?;
        }
    }
    writeln!(svg, "    </g>")
}
