//! 请求参数读取与清洗。
//!
//! 所有读取函数都不会失败：缺失或非法输入统一降级为默认值。

/// 多值参数源（查询字符串或由路径段合成），保留原始顺序
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    /// 在现有参数之前插入高优先级参数（路径段优先于同名查询参数）
    pub fn with_leading(mut self, leading: Vec<(String, String)>) -> Self {
        let mut pairs = leading;
        pairs.append(&mut self.pairs);
        self.pairs = pairs;
        self
    }

    /// 同名参数的第一个值
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// 同名参数的全部值（按出现顺序）
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

impl FromIterator<(String, String)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// 转义 XML 的五个保留字符
pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// 解析百分数字符串（允许末尾 `%`）；空串或非数字返回 None
pub fn parse_percent(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    let cleaned = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// 将分数限制到 [0,100]；缺失时为 0
pub fn clamp_score(value: Option<f64>) -> f64 {
    match value {
        Some(v) if !v.is_nan() => v.clamp(0.0, 100.0),
        _ => 0.0,
    }
}

/// 按候选键顺序读取分数：取第一个出现的键（即便其值非法也不再继续查找）
pub fn read_score(params: &QueryParams, keys: &[&str]) -> f64 {
    keys.iter()
        .find_map(|key| params.get(key))
        .map(|raw| clamp_score(parse_percent(Some(raw))))
        .unwrap_or(0.0)
}

/// 解析路径段中的定点数/整数；解析失败为 0
pub fn parse_path_score(segment: &str) -> f64 {
    let s = segment.trim();
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let int_ok = int_part.bytes().all(|b| b.is_ascii_digit());
    let frac_ok = frac_part.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
    if int_part.is_empty() && frac_part.is_none() || !int_ok || !frac_ok {
        return 0.0;
    }
    clamp_score(s.parse::<f64>().ok())
}

/// 清洗自由文本：去首尾空白；为空时使用兜底值；否则按 Unicode 码点截断
///
/// 返回未转义文本，写入 SVG 时再经 [`escape_xml`] 处理。
pub fn clean_text(value: Option<&str>, max_chars: usize, fallback: &str) -> String {
    let trimmed = value.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.chars().take(max_chars).collect()
}

/// 按顺序返回第一个非空候选
pub fn first_non_empty<'a, I>(candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|v| !v.trim().is_empty())
}

/// 用户信息原始字段（尚未截断/转义）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFields<'a> {
    pub name: Option<&'a str>,
    pub age: Option<&'a str>,
    pub job: Option<&'a str>,
}

/// 读取用户信息：重复参数 `u` 的第 N 个值 > 编号参数 `uN` > 描述性参数名
pub fn read_user_fields(params: &QueryParams) -> UserFields<'_> {
    let repeated = params.get_all("u");
    let field = |index: usize, indexed: &str, named: &str| {
        first_non_empty([
            repeated.get(index).copied(),
            params.get(indexed),
            params.get(named),
        ])
    };
    UserFields {
        name: field(0, "u1", "name"),
        age: field(1, "u2", "age"),
        job: field(2, "u3", "job"),
    }
}
