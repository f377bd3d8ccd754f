//! 任务级下载进度条。分母在统计阶段固定，之后只增不减。

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub struct Progress {
    total: usize,
    bar: ProgressBar,
    tint: Option<&'static str>,
}

impl Progress {
    /// 调用方保证 total > 0，零页任务不渲染进度。
    pub fn new(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::stderr())
    }

    pub fn hidden(total: usize) -> Self {
        Self::with_target(total, ProgressDrawTarget::hidden())
    }

    fn with_target(total: usize, target: ProgressDrawTarget) -> Self {
        debug_assert!(total > 0);
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        let mut progress = Self {
            total,
            bar,
            tint: None,
        };
        progress.report(0);
        progress
    }

    /// completed 超出总数时按总数截断；相同输入总是产生相同输出。
    pub fn report(&mut self, completed: usize) {
        let completed = completed.min(self.total);
        let percent = completed as f64 * 100.0 / self.total as f64;
        let tint = tint_for(percent);
        if self.tint != Some(tint) {
            self.bar.set_style(bar_style(tint));
            self.tint = Some(tint);
        }
        self.bar.set_position(completed as u64);
        self.bar.set_message(format!("{:.2}%", percent));
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish();
    }
}

fn bar_style(tint: &str) -> ProgressStyle {
    ProgressStyle::with_template(&format!("[{{bar:50.{}}}] {{msg}}", tint))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

fn tint_for(percent: f64) -> &'static str {
    if percent < 50.0 {
        "red"
    } else if percent < 80.0 {
        "yellow"
    } else {
        "green"
    }
}
