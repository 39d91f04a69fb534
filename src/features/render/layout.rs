//! 固定布局坐标表与字号自适应。

/// 好感度面板布局（坐标均位于 viewBox 空间）
#[derive(Debug, Clone, Copy)]
pub struct AffinityLayout {
    pub width: u32,
    pub height: u32,
    pub column_width: u32,
    /// 面板整体下移，为页眉腾出空间
    pub panel_offset_y: u32,
    pub bar_x: u32,
    pub bar_y: u32,
    pub bar_width: u32,
    pub bar_height: u32,
    /// 装饰图标相对条形上下端的内缩距离
    pub decor_inset: u32,
    pub image_x: u32,
    pub image_y: u32,
    pub image_size: u32,
    pub label_x: u32,
    pub relation_y: u32,
    pub relation_size: u32,
    pub label_y: u32,
    pub label_size: u32,
    pub score_y: u32,
    pub score_size: u32,
    pub header_x: u32,
    pub header_y: u32,
    pub header_size: u32,
    pub footer_y: u32,
    pub footer_size: u32,
}

pub const AFFINITY_LAYOUT: AffinityLayout = AffinityLayout {
    width: 1920,
    height: 1280,
    column_width: 640,
    panel_offset_y: 110,
    bar_x: 60,
    bar_y: 130,
    bar_width: 70,
    bar_height: 820,
    decor_inset: 90,
    image_x: 160,
    image_y: 80,
    image_size: 480,
    label_x: 160,
    relation_y: 650,
    relation_size: 56,
    label_y: 760,
    label_size: 84,
    score_y: 930,
    score_size: 128,
    header_x: 60,
    header_y: 110,
    header_size: 72,
    footer_y: 1230,
    footer_size: 72,
};

/// 人物资料卡布局
#[derive(Debug, Clone, Copy)]
pub struct ProfileLayout {
    pub width: u32,
    pub height: u32,
    pub header_x: u32,
    pub header_y: u32,
    pub header_size: u32,
    pub column_width: u32,
    pub image_x: u32,
    pub image_y: u32,
    pub image_size: u32,
    pub relation_offset_x: u32,
    pub relation_offset_y: u32,
    pub relation_size: u32,
    pub status_x: u32,
    pub status_y: u32,
    pub status_size: u32,
}

pub const PROFILE_LAYOUT: ProfileLayout = ProfileLayout {
    width: 1920,
    height: 1080,
    header_x: 60,
    header_y: 140,
    header_size: 96,
    column_width: 640,
    image_x: 80,
    image_y: 320,
    image_size: 260,
    relation_offset_x: 24,
    relation_offset_y: 60,
    relation_size: 96,
    status_x: 60,
    status_y: 756,
    status_size: 96,
};

/// 状态横幅尺寸
pub const STATUS_WIDTH: u32 = 900;
pub const STATUS_HEIGHT: u32 = 300;

/// 估算字宽与字号之比（近似值，混排文字可能略有溢出）
pub const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// 自适应后允许的最小字号
pub const MIN_FONT_SIZE: u32 = 28;

/// 估算宽度 = 字符数 × 字号 × [`GLYPH_WIDTH_RATIO`]；超出可用宽度时按比例缩小，下限为 `min_size`
pub fn fit_font_size(char_count: usize, base_size: u32, available_width: u32, min_size: u32) -> u32 {
    let estimated = char_count as f64 * f64::from(base_size) * GLYPH_WIDTH_RATIO;
    if estimated <= f64::from(available_width) {
        return base_size;
    }
    let scaled = (f64::from(base_size) * f64::from(available_width) / estimated).floor() as u32;
    scaled.max(min_size).min(base_size)
}

/// 输出画布：像素尺寸可独立于 viewBox 调整
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub view_width: u32,
    pub view_height: u32,
}

impl Canvas {
    /// 像素尺寸与 viewBox 一致
    pub fn native(view_width: u32, view_height: u32) -> Self {
        Self {
            width: view_width,
            height: view_height,
            view_width,
            view_height,
        }
    }

    /// 按目标像素宽度等比缩放（viewBox 不变）
    pub fn with_pixel_width(self, width: Option<u32>) -> Self {
        let Some(width) = width.filter(|w| *w > 0) else {
            return self;
        };
        let height = (f64::from(self.view_height) * f64::from(width) / f64::from(self.view_width))
            .round()
            .max(1.0) as u32;
        Self {
            width,
            height,
            ..self
        }
    }
}
