use std::io::{self, Write};
use std::time::Instant;

use anyhow::Result;
use tracing::{info, warn};

use m4l_fetch::{Config, History, MangaCrawler, get_user_input, logger, parse_chapters, utils};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logger::init();
    let config = Config::load()?;
    let history = History::new(&config.history_file);

    loop {
        println!("\n=== m4l-fetch ===");
        if let Err(e) = run_job(&config, &history).await {
            println!("任务失败: {}", e);
        }

        print!("\n是否继续下载其他漫画? (y/n): ");
        io::stdout().flush()?;
        let mut continue_choice = String::new();
        io::stdin().read_line(&mut continue_choice)?;
        if continue_choice.trim().to_lowercase() != "y" {
            break;
        }
    }

    println!("程序结束。");
    Ok(())
}

async fn run_job(config: &Config, history: &History) -> Result<()> {
    let (name, expr) = get_user_input()?;
    let chapters = parse_chapters(&expr)?;
    let crawler = MangaCrawler::new(config, &name)?;

    info!("共 {} 个章节待下载", chapters.len());
    let start = Instant::now();

    let sizing = crawler.size_chapters(&chapters).await?;
    for (chapter, count) in chapters.iter().zip(sizing.counts()) {
        info!("章节 {} 共 {} 页", chapter, count);
    }
    info!("总计 {} 页", sizing.total_pages());
    if sizing.total_pages() == 0 {
        warn!("未找到任何可下载的页面");
        return Ok(());
    }

    if history.has(crawler.manga_name()).await? {
        info!("{} 已在下载历史中", crawler.manga_name());
    }
    if !utils::confirm("是否开始下载? (y/n): ")? {
        info!("下载已取消");
        return Ok(());
    }

    crawler.download(&chapters, &sizing).await?;
    history.append(crawler.manga_name()).await?;
    info!(
        "✅ 下载完成！耗时: {}",
        utils::format_duration(start.elapsed())
    );
    Ok(())
}
