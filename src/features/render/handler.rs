use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
    routing::get,
};
use std::time::Instant;

use super::assets::{ImageEmbedding, external_base_url};
use super::composer::{
    AffinityCard, AffinityEntry, ProfileCard, ProfileEntry, UserInfo, render_affinity_svg,
    render_profile_svg, render_status_svg, situation_text,
};
use super::layout::{AFFINITY_LAYOUT, Canvas, PROFILE_LAYOUT};
use super::params::{QueryParams, parse_path_score, read_score, read_user_fields};
use super::theme::ROSTER;
use super::types::{OutputFormat, split_format_suffix};
use crate::error::AppError;
use crate::state::AppState;

/// 自定义输出宽度的下限
pub const MIN_CANVAS_WIDTH: u32 = 64;

type RawQuery = Query<Vec<(String, String)>>;

/// 待渲染的文档
enum Document {
    Affinity(AffinityCard),
    Profile(ProfileCard),
}

impl Document {
    fn native_canvas(&self) -> Canvas {
        match self {
            Document::Affinity(_) => Canvas::native(AFFINITY_LAYOUT.width, AFFINITY_LAYOUT.height),
            Document::Profile(_) => Canvas::native(PROFILE_LAYOUT.width, PROFILE_LAYOUT.height),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Document::Affinity(_) => "affinity",
            Document::Profile(_) => "profile",
        }
    }
}

/// 查询参数 `format`；缺失或无法识别时为 None
fn query_format(params: &QueryParams) -> Option<OutputFormat> {
    params.get("format").and_then(OutputFormat::parse)
}

/// 查询参数 `width`；非法值忽略，合法值限制在 [MIN_CANVAS_WIDTH, max]
fn requested_width(params: &QueryParams, max_width: u32) -> Option<u32> {
    params
        .get("width")
        .and_then(|raw| raw.trim().parse::<u32>().ok())
        .filter(|w| *w > 0)
        .map(|w| w.clamp(MIN_CANVAS_WIDTH, max_width.max(MIN_CANVAS_WIDTH)))
}

fn build_affinity_card(params: &QueryParams, scores: [f64; 3]) -> AffinityCard {
    let entries = ROSTER
        .iter()
        .zip(scores)
        .map(|(slot, score)| AffinityEntry {
            label: slot.label.to_string(),
            image_key: slot.character.to_string(),
            theme_key: slot.character.to_string(),
            relation_text: params.get(slot.relation_key).map(str::to_string),
            score,
        })
        .collect();
    AffinityCard {
        entries,
        user: UserInfo::from_fields(&read_user_fields(params)),
        situation: situation_text(params.get("status")),
    }
}

fn build_profile_card(params: &QueryParams) -> ProfileCard {
    let entries = ROSTER
        .iter()
        .map(|slot| ProfileEntry {
            character_name: slot.character.to_string(),
            relation_text: params.get(slot.relation_key).map(str::to_string),
        })
        .collect();
    ProfileCard {
        entries,
        user: UserInfo::from_fields(&read_user_fields(params)),
        situation: situation_text(params.get("status")),
    }
}

/// 动态生成的图片禁止缓存
fn image_response(format: OutputFormat, body: Bytes) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(format.content_type()),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (headers, body).into_response()
}

/// 组装 SVG，按需栅格化
async fn render_document(
    state: &AppState,
    doc: Document,
    format: OutputFormat,
    width: Option<u32>,
    headers: &HeaderMap,
) -> Result<Response, AppError> {
    let kind = doc.kind();
    let canvas = doc.native_canvas().with_pixel_width(width);
    let embedding = match format {
        OutputFormat::Svg => ImageEmbedding::Link {
            base_url: external_base_url(headers),
        },
        OutputFormat::Png => ImageEmbedding::Inline,
    };

    let t_svg = Instant::now();
    // 图片存在性检查与读取属于阻塞 IO，移出 tokio worker
    let resolver = state.resolver.clone();
    let typography = state.typography.clone();
    let svg = tokio::task::spawn_blocking(move || {
        let images = resolver.with_embedding(embedding);
        match &doc {
            Document::Affinity(card) => render_affinity_svg(card, canvas, &typography, &images),
            Document::Profile(card) => render_profile_svg(card, canvas, &typography, &images),
        }
    })
    .await
    .map_err(|e| AppError::Internal(format!("阻塞 SVG 生成任务执行失败: {e}")))??;
    tracing::debug!(
        "{} SVG 生成完成: {} 字节, 耗时 {:?}",
        kind,
        svg.len(),
        t_svg.elapsed()
    );

    let body = match format {
        OutputFormat::Svg => Bytes::from(svg.into_bytes()),
        OutputFormat::Png => {
            let t_wait = Instant::now();
            let _permit = state
                .render_semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| AppError::Internal(format!("获取渲染信号量失败: {e}")))?;
            let wait = t_wait.elapsed();

            let rasterizer = state.rasterizer.clone();
            let png = tokio::task::spawn_blocking(move || rasterizer.render_png(&svg))
                .await
                .map_err(|e| AppError::Internal(format!("阻塞渲染任务执行失败: {e}")))??;
            tracing::info!(
                "{} PNG 渲染完成: {}x{}, {} 字节, 信号量等待 {:?}",
                kind,
                canvas.width,
                canvas.height,
                png.len(),
                wait
            );
            Bytes::from(png)
        }
    };

    Ok(image_response(format, body))
}

/// GET /api/affinity
async fn affinity_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): RawQuery,
) -> Result<Response, AppError> {
    let params = QueryParams::new(query);
    let scores = ROSTER.map(|slot| read_score(&params, &[slot.score_key]));
    let format = query_format(&params).unwrap_or(OutputFormat::Svg);
    let width = requested_width(&params, state.max_canvas_width);
    let doc = Document::Affinity(build_affinity_card(&params, scores));
    render_document(&state, doc, format, width, &headers).await
}

/// GET /api/affinity/{y1}/{y2}/{y3}[.svg|.png]
async fn affinity_path(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((y1, y2, y3)): Path<(String, String, String)>,
    Query(query): RawQuery,
) -> Result<Response, AppError> {
    let params = QueryParams::new(query);
    let (y3, suffix) = split_format_suffix(&y3);
    let scores = [y1.as_str(), y2.as_str(), y3].map(parse_path_score);
    let format = suffix
        .or_else(|| query_format(&params))
        .unwrap_or(OutputFormat::Png);
    let width = requested_width(&params, state.max_canvas_width);
    let doc = Document::Affinity(build_affinity_card(&params, scores));
    render_document(&state, doc, format, width, &headers).await
}

/// GET /api/profile
async fn profile_query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): RawQuery,
) -> Result<Response, AppError> {
    let params = QueryParams::new(query);
    let format = query_format(&params).unwrap_or(OutputFormat::Svg);
    let width = requested_width(&params, state.max_canvas_width);
    let doc = Document::Profile(build_profile_card(&params));
    render_document(&state, doc, format, width, &headers).await
}

/// GET /api/profile/{name}/{age}/{job}/{s1}/{s2}/{m}/{status}[.svg|.png]
async fn profile_path(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((name, age, job, s1, s2, m, status)): Path<(
        String,
        String,
        String,
        String,
        String,
        String,
        String,
    )>,
    Query(query): RawQuery,
) -> Result<Response, AppError> {
    let (status, suffix) = split_format_suffix(&status);
    let leading = vec![
        ("u".to_string(), name),
        ("u".to_string(), age),
        ("u".to_string(), job),
        ("s1".to_string(), s1),
        ("s2".to_string(), s2),
        ("m".to_string(), m),
        ("status".to_string(), status.to_string()),
    ];
    let params = QueryParams::new(query).with_leading(leading);
    let format = suffix
        .or_else(|| query_format(&params))
        .unwrap_or(OutputFormat::Png);
    let width = requested_width(&params, state.max_canvas_width);
    let doc = Document::Profile(build_profile_card(&params));
    render_document(&state, doc, format, width, &headers).await
}

/// GET /api/status（只输出 SVG）
async fn status_query(
    State(state): State<AppState>,
    Query(query): RawQuery,
) -> Result<Response, AppError> {
    let params = QueryParams::new(query);
    let svg = render_status_svg(
        params.get("relationship"),
        params.get("situation"),
        &state.typography,
    )?;
    Ok(image_response(OutputFormat::Svg, Bytes::from(svg.into_bytes())))
}

/// GET /api/status/{relationship}/{situation}[.svg]
async fn status_path(
    State(state): State<AppState>,
    Path((relationship, situation)): Path<(String, String)>,
) -> Result<Response, AppError> {
    // 横幅没有栅格化版本，任何可识别的后缀都只被剥离
    let (situation, _) = split_format_suffix(&situation);
    let svg = render_status_svg(Some(&relationship), Some(situation), &state.typography)?;
    Ok(image_response(OutputFormat::Svg, Bytes::from(svg.into_bytes())))
}

pub fn create_render_router() -> Router<AppState> {
    Router::new()
        .route("/api/affinity", get(affinity_query))
        .route("/api/affinity/:y1/:y2/:y3", get(affinity_path))
        .route("/api/profile", get(profile_query))
        .route(
            "/api/profile/:name/:age/:job/:s1/:s2/:m/:status",
            get(profile_path),
        )
        .route("/api/status", get(status_query))
        .route("/api/status/:relationship/:situation", get(status_path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn width_is_clamped_and_invalid_values_ignored() {
        assert_eq!(requested_width(&params(&[("width", "960")]), 3840), Some(960));
        assert_eq!(requested_width(&params(&[("width", "10")]), 3840), Some(64));
        assert_eq!(requested_width(&params(&[("width", "99999")]), 3840), Some(3840));
        assert_eq!(requested_width(&params(&[("width", "abc")]), 3840), None);
        assert_eq!(requested_width(&params(&[("width", "0")]), 3840), None);
        assert_eq!(requested_width(&params(&[]), 3840), None);
    }

    #[test]
    fn affinity_card_reads_relations_and_user_fields() {
        let p = params(&[("s1", "동생"), ("m", "엄마"), ("u", "철수"), ("status", "휴식")]);
        let card = build_affinity_card(&p, [1.0, 2.0, 3.0]);
        assert_eq!(card.entries.len(), 3);
        assert_eq!(card.entries[0].relation_text.as_deref(), Some("동생"));
        assert_eq!(card.entries[1].relation_text, None);
        assert_eq!(card.entries[2].relation_text.as_deref(), Some("엄마"));
        assert_eq!(card.entries[2].score, 3.0);
        assert_eq!(card.user.name, "철수");
        assert_eq!(card.situation, "현재 상황 : 휴식");
    }

    #[test]
    fn query_format_is_optional() {
        assert_eq!(query_format(&params(&[("format", "PNG")])), Some(OutputFormat::Png));
        assert_eq!(query_format(&params(&[("format", "gif")])), None);
    }
}
