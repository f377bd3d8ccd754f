use anyhow::{Context, Result};
use tokio::task::JoinSet;

/// JoinSet 的薄封装：批量派发任务并一次性收集全部结果。
/// 完成顺序不保证，调用方自带索引时需要自行归位。
pub struct TaskManager<R: Send + 'static> {
    tasks: JoinSet<R>,
}

impl<R: Send + 'static> TaskManager<R> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
        }
    }

    pub fn spawn<F>(&mut self, future: F)
    where
        F: std::future::Future<Output = R> + Send + 'static,
    {
        self.tasks.spawn(future);
    }

    pub async fn wait(&mut self) -> Result<Vec<R>> {
        let mut results = Vec::new();
        while let Some(result) = self.tasks.join_next().await {
            results.push(result.context("任务执行失败")?);
        }
        Ok(results)
    }
}

impl<R: Send + 'static> Default for TaskManager<R> {
    fn default() -> Self {
        Self::new()
    }
}
