/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 独立 SVG（图片以 URL 引用）
    Svg,
    /// 栅格化 PNG（图片内联）
    Png,
}

impl OutputFormat {
    /// 解析 `format` 参数（大小写不敏感）；无法识别返回 None
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("svg") {
            Some(OutputFormat::Svg)
        } else if raw.eq_ignore_ascii_case("png") {
            Some(OutputFormat::Png)
        } else {
            None
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            OutputFormat::Svg => "image/svg+xml; charset=utf-8",
            OutputFormat::Png => "image/png",
        }
    }
}

/// 拆分路径最后一段的格式后缀（`95.svg` → (`95`, Some(Svg))）
pub fn split_format_suffix(segment: &str) -> (&str, Option<OutputFormat>) {
    if let Some((stem, ext)) = segment.rsplit_once('.') {
        if let Some(format) = OutputFormat::parse(ext) {
            return (stem, Some(format));
        }
    }
    (segment, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_split_only_when_recognized() {
        assert_eq!(split_format_suffix("95.svg"), ("95", Some(OutputFormat::Svg)));
        assert_eq!(split_format_suffix("95.PNG"), ("95", Some(OutputFormat::Png)));
        assert_eq!(split_format_suffix("95"), ("95", None));
        // 小数点不是格式后缀
        assert_eq!(split_format_suffix("95.5"), ("95.5", None));
        assert_eq!(split_format_suffix("95.5.png"), ("95.5", Some(OutputFormat::Png)));
    }

    #[test]
    fn format_parsing() {
        assert_eq!(OutputFormat::parse(" Svg "), Some(OutputFormat::Svg));
        assert_eq!(OutputFormat::parse("jpeg"), None);
        assert_eq!(OutputFormat::Png.content_type(), "image/png");
    }
}
