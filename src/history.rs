use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::Result;
use tokio::fs;
use tracing::{debug, info};

/// 下载历史，按行存储漫画名，精确匹配去重。
pub struct History {
    path: PathBuf,
}

impl History {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.read_lines().await?.iter().any(|line| line == name))
    }

    /// 追加一条记录；已存在时不做任何写入。
    pub async fn append(&self, name: &str) -> Result<()> {
        let mut lines = self.read_lines().await?;
        if lines.iter().any(|line| line == name) {
            debug!("{} 已在下载历史中", name);
            return Ok(());
        }
        lines.push(name.to_owned());
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&self.path, content).await?;
        info!("已将 {} 记入下载历史", name);
        Ok(())
    }

    pub async fn load(&self) -> Result<Vec<String>> {
        self.read_lines().await
    }

    async fn read_lines(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(content.lines().map(|line| line.to_owned()).collect())
    }
}
