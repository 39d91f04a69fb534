use std::fmt::Write;

use super::{Typography, fmt_err, write_document_start};
use crate::error::AppError;
use crate::features::render::layout::{Canvas, STATUS_HEIGHT, STATUS_WIDTH};
use crate::features::render::params::{clean_text, escape_xml};

const STATUS_TEXT_LIMIT: usize = 40;

/// 状态横幅（只输出 SVG）
pub fn render_status_svg(
    relationship: Option<&str>,
    situation: Option<&str>,
    typography: &Typography,
) -> Result<String, AppError> {
    let rel_raw = clean_text(relationship, STATUS_TEXT_LIMIT, "Relationship");
    let sit_raw = clean_text(situation, STATUS_TEXT_LIMIT, "Current status");
    let family = typography.family();
    let (w, h) = (STATUS_WIDTH, STATUS_HEIGHT);

    let mut svg = String::with_capacity(4 * 1024 + typography.face_style().len());
    // aria-label 在 write_document_start 中转义
    write_document_start(
        &mut svg,
        Canvas::native(w, h),
        &format!("{rel_raw} {sit_raw}"),
        false,
    )
    .map_err(fmt_err)?;

    let rel = escape_xml(&rel_raw);
    let sit = escape_xml(&sit_raw);

    let body = format!(
        r##"  <defs>
{face}
    <linearGradient id="bg2" x1="0" y1="0" x2="1" y2="1">
      <stop offset="0%" stop-color="#ffe8d6"/>
      <stop offset="60%" stop-color="#fef6e4"/>
      <stop offset="100%" stop-color="#dbeafe"/>
    </linearGradient>
    <linearGradient id="stroke2" x1="0" y1="0" x2="1" y2="0">
      <stop offset="0%" stop-color="#ff7a7a"/>
      <stop offset="100%" stop-color="#60a5fa"/>
    </linearGradient>
  </defs>
  <rect width="{w}" height="{h}" rx="26" fill="url(#bg2)"/>
  <g opacity="0.25">
    <path d="M 40 260 C 140 180 260 180 360 260" stroke="#f59e0b" stroke-width="14" fill="none" stroke-linecap="round"/>
    <path d="M 520 50 C 620 130 740 130 840 50" stroke="#3b82f6" stroke-width="14" fill="none" stroke-linecap="round"/>
  </g>
  <rect x="48" y="70" width="804" height="160" rx="22" fill="#ffffff" opacity="0.85"/>
  <text x="90" y="130" font-size="32" font-family="{family}" fill="#0f172a">{rel}</text>
  <text x="90" y="190" font-size="44" font-family="{family}" fill="#111827">{sit}</text>
  <line x1="90" y1="210" x2="820" y2="210" stroke="url(#stroke2)" stroke-width="4" stroke-linecap="round"/>
</svg>"##,
        face = typography.face_style()
    );
    svg.write_str(&body).map_err(fmt_err)?;
    Ok(svg)
}
