use std::fmt;
use std::str::FromStr;

use anyhow::Result;

/// 章节编号，整数或带小数部分（如 7.5 的"半章"）。
/// 小数部分按输入原样保留，格式化时整数部分补齐 4 位。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChapterId {
    integer: u32,
    fraction: Option<String>,
}

impl ChapterId {
    pub fn from_int(integer: u32) -> Self {
        Self {
            integer,
            fraction: None,
        }
    }
}

impl FromStr for ChapterId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s.split_once('.') {
            Some((integer, fraction)) => {
                if fraction.is_empty() || !fraction.chars().all(|c| c.is_ascii_digit()) {
                    anyhow::bail!("无效的章节编号: {}", s);
                }
                let integer = integer
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("无效的章节编号: {}", s))?;
                Ok(Self {
                    integer,
                    fraction: Some(fraction.to_owned()),
                })
            }
            None => {
                let integer = s
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("无效的章节编号: {}", s))?;
                Ok(Self::from_int(integer))
            }
        }
    }
}

impl fmt::Display for ChapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.integer)?;
        if let Some(fraction) = &self.fraction {
            write!(f, ".{}", fraction)?;
        }
        Ok(())
    }
}

/// 展开章节表达式，如 "1,3-5,9" -> [1, 3, 4, 5, 9]。
/// 区间只接受整数且必须递增；单个编号允许小数。
/// 保留输入顺序，不去重。
pub fn parse_chapters(expr: &str) -> Result<Vec<ChapterId>> {
    let mut chapters = Vec::new();

    for token in expr.split(',') {
        let token = token.trim();
        if token.is_empty() {
            anyhow::bail!("章节表达式中存在空项: {}", expr);
        }

        match token.split_once('-') {
            Some((start, end)) => {
                let start = start
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("无效的章节区间: {}", token))?;
                let end = end
                    .trim()
                    .parse::<u32>()
                    .map_err(|_| anyhow::anyhow!("无效的章节区间: {}", token))?;
                if end < start {
                    anyhow::bail!("章节区间不能倒序: {}", token);
                }
                for number in start..=end {
                    chapters.push(ChapterId::from_int(number));
                }
            }
            None => chapters.push(token.parse()?),
        }
    }

    if chapters.is_empty() {
        anyhow::bail!("章节表达式为空");
    }
    Ok(chapters)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(chapters: &[ChapterId]) -> Vec<String> {
        chapters.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn formats_with_zero_padding() {
        assert_eq!("7".parse::<ChapterId>().unwrap().to_string(), "0007");
        assert_eq!("7.5".parse::<ChapterId>().unwrap().to_string(), "0007.5");
        assert_eq!("12.10".parse::<ChapterId>().unwrap().to_string(), "0012.10");
    }

    #[test]
    fn fraction_is_kept_verbatim() {
        // "12.10" 不等于 "12.1"
        let a = "12.10".parse::<ChapterId>().unwrap();
        let b = "12.1".parse::<ChapterId>().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("".parse::<ChapterId>().is_err());
        assert!("7.".parse::<ChapterId>().is_err());
        assert!("7.x".parse::<ChapterId>().is_err());
        assert!("-3".parse::<ChapterId>().is_err());
        assert!("abc".parse::<ChapterId>().is_err());
    }

    #[test]
    fn expands_ranges_in_input_order() {
        let chapters = parse_chapters("1,3-5,9").unwrap();
        assert_eq!(render(&chapters), ["0001", "0003", "0004", "0005", "0009"]);
    }

    #[test]
    fn keeps_duplicates() {
        let chapters = parse_chapters("2,2,1-2").unwrap();
        assert_eq!(render(&chapters), ["0002", "0002", "0001", "0002"]);
    }

    #[test]
    fn accepts_fractional_single_tokens() {
        let chapters = parse_chapters("7.5,8").unwrap();
        assert_eq!(render(&chapters), ["0007.5", "0008"]);
    }

    #[test]
    fn rejects_bad_expressions() {
        assert!(parse_chapters("").is_err());
        assert!(parse_chapters("1,,3").is_err());
        assert!(parse_chapters("5-3").is_err());
        assert!(parse_chapters("1-2.5").is_err());
    }
}
