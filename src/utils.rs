use std::io::{self, Write};
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("正则表达式编译失败"));

pub fn get_user_input() -> Result<(String, String)> {
    let name = prompt("请输入漫画名称: ")?;
    if name.is_empty() {
        anyhow::bail!("漫画名称不能为空");
    }
    let chapters = prompt("请输入章节编号(如 1,2-5): ")?;
    debug!("用户输入: {} / {}", name, chapters);
    Ok((name, chapters))
}

pub fn confirm(message: &str) -> Result<bool> {
    let answer = prompt(message)?;
    Ok(answer.eq_ignore_ascii_case("y"))
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_owned())
}

/// 根据配置决定漫画名的大小写处理：原样保留、全大写或逐词首字母大写。
pub fn apply_naming(name: &str, uppercase: bool, keep_raw_name: bool) -> String {
    if keep_raw_name {
        name.to_owned()
    } else if uppercase {
        name.to_uppercase()
    } else {
        title_case(name)
    }
}

/// 逐词首字母大写，其余小写。词边界为任意非字母字符。
pub fn title_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }
    result
}

/// 空白替换为连字符，用于 URL 和文件夹名。
pub fn slugify(name: &str) -> String {
    WHITESPACE.replace_all(name.trim(), "-").into_owned()
}

pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms >= 60000 {
        let mins = total_ms / 60000;
        let secs = (total_ms % 60000) / 1000;
        let ms = total_ms % 1000;
        if ms > 0 {
            format!("{}分{}秒{}毫秒", mins, secs, ms)
        } else {
            format!("{}分{}秒", mins, secs)
        }
    } else if total_ms >= 1000 {
        let secs = total_ms / 1000;
        let ms = total_ms % 1000;
        if ms > 0 {
            format!("{}秒{}毫秒", secs, ms)
        } else {
            format!("{}秒", secs)
        }
    } else {
        format!("{}毫秒", total_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_per_word() {
        assert_eq!(title_case("one piece"), "One Piece");
        assert_eq!(title_case("BLEACH"), "Bleach");
        assert_eq!(title_case("dr. stone"), "Dr. Stone");
    }

    #[test]
    fn naming_policy() {
        assert_eq!(apply_naming("test manga", false, false), "Test Manga");
        assert_eq!(apply_naming("test manga", true, false), "TEST MANGA");
        assert_eq!(apply_naming("tEsT mAnGa", false, true), "tEsT mAnGa");
    }

    #[test]
    fn slugify_collapses_whitespace() {
        assert_eq!(slugify("Test Manga"), "Test-Manga");
        assert_eq!(slugify("  a\t b  "), "a-b");
    }

    #[test]
    fn duration_tiers() {
        assert_eq!(format_duration(Duration::from_millis(900)), "900毫秒");
        assert_eq!(format_duration(Duration::from_millis(2300)), "2秒300毫秒");
        assert_eq!(format_duration(Duration::from_secs(5)), "5秒");
        assert_eq!(format_duration(Duration::from_millis(61001)), "1分1秒1毫秒");
        assert_eq!(format_duration(Duration::from_secs(120)), "2分0秒");
    }
}
