use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::chapter::ChapterId;

// 阅读页脚本里形如 vm.CurPathName = "host" 的赋值携带图片所在主机。
static CUR_PATH_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"vm\.CurPathName\s*=\s*"([^"]+)""#).expect("正则表达式编译失败"));

/// 从某一章阅读页解析出的图片主机地址。
/// 各章的主机可能不同，因此只对解析它的那一章有效，不跨章复用。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAddress(String);

impl ResolvedAddress {
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    pub fn image_url(&self, slug: &str, chapter: &ChapterId, page: u32) -> String {
        format!(
            "https://{}/manga/{}/{}-{:03}.png",
            self.0, slug, chapter, page
        )
    }
}

pub struct Parser;

impl Parser {
    /// 取第一处匹配；页面没有该赋值时返回 None。
    pub fn extract_address(html: &str) -> Option<ResolvedAddress> {
        let host = CUR_PATH_NAME
            .captures(html)
            .map(|caps| caps[1].to_owned())?;
        debug!("解析到图片主机: {}", host);
        Some(ResolvedAddress(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_assignment() {
        let html = r#"
            <script>
                vm.CurChapter = {"Chapter":"100010"};
                vm.CurPathName = "scans.example-cdn.net";
                vm.CurPathName = "other.example-cdn.net";
            </script>
        "#;
        assert_eq!(
            Parser::extract_address(html),
            Some(ResolvedAddress::new("scans.example-cdn.net"))
        );
    }

    #[test]
    fn tolerates_spacing_variants() {
        let html = r#"vm.CurPathName="scans.example-cdn.net""#;
        assert_eq!(
            Parser::extract_address(html),
            Some(ResolvedAddress::new("scans.example-cdn.net"))
        );
    }

    #[test]
    fn missing_assignment_is_none() {
        assert_eq!(Parser::extract_address("<html></html>"), None);
        assert_eq!(Parser::extract_address(r#"vm.CurChapter = "x""#), None);
    }

    #[test]
    fn builds_image_urls() {
        let address = ResolvedAddress::new("scans.example-cdn.net");
        let chapter = "7".parse::<ChapterId>().unwrap();
        assert_eq!(
            address.image_url("Test-Manga", &chapter, 2),
            "https://scans.example-cdn.net/manga/Test-Manga/0007-002.png"
        );
        let half = "7.5".parse::<ChapterId>().unwrap();
        assert_eq!(
            address.image_url("Test-Manga", &half, 12),
            "https://scans.example-cdn.net/manga/Test-Manga/0007.5-012.png"
        );
    }
}
