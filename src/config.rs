use std::sync::Arc;

use anyhow::Result;
use serde::Deserialize;

use crate::crawler::counter::{PageCounter, ParallelProbe, SequentialProbe};

#[derive(Deserialize)]
pub struct Config {
    /// 阅读页所在站点。
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 下载阶段全局并发连接上限。
    #[serde(default = "default_concurrency_limit")]
    pub concurrency_limit: usize,
    #[serde(default)]
    pub probe: ProbeStrategy,
    /// parallel 探测的页数上限，超过该页数的页面不会被计数。
    #[serde(default = "default_probe_upper_bound")]
    pub probe_upper_bound: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub uppercase: bool,
    #[serde(default)]
    pub keep_raw_name: bool,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

#[derive(Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStrategy {
    /// 逐页探测到第一个缺页为止，不依赖页码连续之外的假设。
    #[default]
    Sequential,
    /// 并发探测 1..=probe_upper_bound，统计存在的页数。
    Parallel,
}

#[derive(Deserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 每章一个图片文件夹。
    #[default]
    Folder,
    /// 每章打包为一个 CBZ 压缩文件。
    Cbz,
}

impl Config {
    pub fn load() -> Result<Self> {
        config::Config::builder()
            .add_source(
                config::File::with_name("config")
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .build()?
            .try_deserialize()
            .map_err(|e| anyhow::anyhow!("配置文件反序列化失败: {}", e))
    }

    pub fn counter(&self) -> Arc<dyn PageCounter> {
        match self.probe {
            ProbeStrategy::Sequential => Arc::new(SequentialProbe),
            ProbeStrategy::Parallel => Arc::new(ParallelProbe {
                upper_bound: self.probe_upper_bound,
            }),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            concurrency_limit: default_concurrency_limit(),
            probe: ProbeStrategy::default(),
            probe_upper_bound: default_probe_upper_bound(),
            output_dir: default_output_dir(),
            format: OutputFormat::default(),
            uppercase: false,
            keep_raw_name: false,
            history_file: default_history_file(),
        }
    }
}

fn default_base_url() -> String {
    "https://manga4life.com".to_owned()
}

fn default_concurrency_limit() -> usize {
    10
}

fn default_probe_upper_bound() -> u32 {
    100
}

fn default_output_dir() -> String {
    "Mangas".to_owned()
}

fn default_history_file() -> String {
    "download_history.txt".to_owned()
}
