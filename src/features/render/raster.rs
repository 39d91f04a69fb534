//! SVG → PNG 栅格化。

use resvg::render;
use resvg::usvg::{self, Options as UsvgOptions, fontdb};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tiny_skia::{Pixmap, Transform};

use crate::error::RasterError;

/// 未加载任何字体时 usvg 使用的默认字体族
const FALLBACK_FAMILY: &str = "sans-serif";

/// 栅格化器：字体库在构造时建立一次，之后只读共享
pub struct Rasterizer {
    fontdb: Arc<fontdb::Database>,
    default_family: String,
    optimize_speed: bool,
}

impl Rasterizer {
    /// 传入字体文件时只使用这些字体（不扫描系统字体），所有通用字体族都映射到首个字体；
    /// 否则扫描系统字体。
    pub fn new(font_files: &[PathBuf], optimize_speed: bool) -> Self {
        let t0 = Instant::now();
        let mut db = fontdb::Database::new();
        for path in font_files {
            if let Err(e) = db.load_font_file(path) {
                tracing::error!("加载字体文件失败 '{}': {}", path.display(), e);
            }
        }

        let embedded_family = db
            .faces()
            .next()
            .and_then(|face| face.families.first().map(|(name, _)| name.clone()));

        let default_family = match embedded_family {
            Some(family) => {
                db.set_sans_serif_family(family.clone());
                db.set_serif_family(family.clone());
                db.set_monospace_family(family.clone());
                db.set_cursive_family(family.clone());
                db.set_fantasy_family(family.clone());
                family
            }
            None => {
                if !font_files.is_empty() {
                    tracing::warn!("嵌入字体均加载失败，回退到系统字体");
                }
                db.load_system_fonts();
                FALLBACK_FAMILY.to_string()
            }
        };

        tracing::info!(
            "字体库就绪: {} 个字体, 默认字体族 '{}', 耗时 {:?}",
            db.len(),
            default_family,
            t0.elapsed()
        );

        Self {
            fontdb: Arc::new(db),
            default_family,
            optimize_speed,
        }
    }

    #[cfg(test)]
    fn default_family(&self) -> &str {
        &self.default_family
    }

    fn options(&self) -> UsvgOptions<'static> {
        let speed = self.optimize_speed;
        UsvgOptions {
            fontdb: self.fontdb.clone(),
            font_family: self.default_family.clone(),
            font_size: 16.0,
            languages: vec!["ko".to_string(), "en".to_string()],
            shape_rendering: if speed {
                usvg::ShapeRendering::OptimizeSpeed
            } else {
                usvg::ShapeRendering::GeometricPrecision
            },
            text_rendering: if speed {
                usvg::TextRendering::OptimizeSpeed
            } else {
                usvg::TextRendering::OptimizeLegibility
            },
            image_rendering: if speed {
                usvg::ImageRendering::OptimizeSpeed
            } else {
                usvg::ImageRendering::OptimizeQuality
            },
            ..Default::default()
        }
    }

    /// 输出像素尺寸取自 SVG 根元素的 width/height
    pub fn render_png(&self, svg: &str) -> Result<Vec<u8>, RasterError> {
        let t0 = Instant::now();
        let opts = self.options();

        let tree = usvg::Tree::from_data(svg.as_bytes(), &opts)
            .map_err(|e| RasterError::Parse(e.to_string()))?;
        let t_parse = t0.elapsed();

        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());
        let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::Pixmap { width, height })?;
        render(&tree, Transform::default(), &mut pixmap.as_mut());
        let t_raster = t0.elapsed();

        let mut out = Vec::with_capacity((width * height) as usize);
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            if self.optimize_speed {
                encoder.set_compression(png::Compression::Fast);
                encoder.set_filter(png::FilterType::NoFilter);
            } else {
                encoder.set_compression(png::Compression::Default);
                encoder.set_filter(png::FilterType::Paeth);
            }
            let mut writer = encoder
                .write_header()
                .map_err(|e| RasterError::Encode(format!("write_header: {e}")))?;
            writer
                .write_image_data(pixmap.data())
                .map_err(|e| RasterError::Encode(format!("write_image_data: {e}")))?;
            writer
                .finish()
                .map_err(|e| RasterError::Encode(format!("finish: {e}")))?;
        }
        let t_encode = t0.elapsed();

        tracing::info!(
            "PNG渲染内部分段: 解析={:?}, 栅格化={:?}, 编码={:?}, 总计={:?}",
            t_parse,
            t_raster - t_parse,
            t_encode - t_raster,
            t_encode
        );

        Ok(out)
    }
}
