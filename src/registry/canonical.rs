//! # 统一模型标识与规范名
//!
//! 统一ID用于精确路由；规范名仅用于跨提供商分组，绝不参与精确匹配

use regex::Regex;
use std::sync::LazyLock;

/// 匹配模型名末尾的日期后缀：`-YYYYMMDD` 或 `-YYYY-MM-DD`
static DATE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d{8}|\d{4}-\d{2}-\d{2})$").expect("valid date suffix regex"));

/// 生成统一模型标识：`{provider}:{provider_model_id}`
#[must_use]
pub fn unified_model_id(provider_name: &str, provider_model_id: &str) -> String {
    format!("{provider_name}:{provider_model_id}")
}

/// 解析统一模型标识，返回 (提供商名, 提供商原生模型ID)
///
/// 提供商名中不允许出现 `:`，模型ID中允许
#[must_use]
pub fn parse_unified_id(unified_id: &str) -> Option<(&str, &str)> {
    unified_id
        .split_once(':')
        .filter(|(provider, model)| !provider.is_empty() && !model.is_empty())
}

/// 从提供商原生模型ID推导规范名
///
/// 依次剥离一个 `-latest` 后缀和一个日期后缀，空串映射为空串
#[must_use]
pub fn canonical_model_name(provider_model_id: &str) -> String {
    let without_latest = provider_model_id
        .strip_suffix("-latest")
        .unwrap_or(provider_model_id);

    DATE_SUFFIX.replace(without_latest, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("gpt-4", "gpt-4")]
    #[case("gpt-4-turbo", "gpt-4-turbo")]
    #[case("claude-3-5-sonnet-20241022", "claude-3-5-sonnet")]
    #[case("claude-3-5-sonnet-latest", "claude-3-5-sonnet")]
    #[case("gemini-1.5-pro-latest", "gemini-1.5-pro")]
    #[case("gpt-4o-2024-05-13", "gpt-4o")]
    #[case("", "")]
    #[case("-latest", "")]
    #[case("20240229", "20240229")]
    fn canonical_name_extraction(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(canonical_model_name(input), expected);
    }

    #[test]
    fn canonical_name_strips_at_most_one_date() {
        // 只剥离一个日期后缀
        assert_eq!(
            canonical_model_name("model-2024-01-01-2024-02-02"),
            "model-2024-01-01"
        );
    }

    #[test]
    fn canonical_name_latest_then_date() {
        // 两次剥离相互独立：先 -latest 再日期
        assert_eq!(canonical_model_name("m-20240101-latest"), "m");
    }

    #[rstest]
    #[case("openai", "gpt-4")]
    #[case("anthropic", "claude-3-5-sonnet-20241022")]
    #[case("azure", "deployment:with:colons")]
    fn unified_id_round_trip(#[case] provider: &str, #[case] model: &str) {
        let unified = unified_model_id(provider, model);
        let (parsed_provider, parsed_model) = parse_unified_id(&unified).expect("parse back");
        assert_eq!(parsed_provider, provider);
        assert_eq!(parsed_model, model);
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        assert_eq!(parse_unified_id("no-colon"), None);
        assert_eq!(parse_unified_id(":model"), None);
        assert_eq!(parse_unified_id("provider:"), None);
        assert_eq!(parse_unified_id(""), None);
    }
}
