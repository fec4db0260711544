use anyhow::{bail, Result};
use cramplan::utils::logging;
use cramplan::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let app = App::initialize(config).await?;

    match args.first().map(String::as_str) {
        None | Some("run") => app.run().await?,
        Some("prepare") => {
            let subject = args[1..].join(" ");
            if subject.trim().is_empty() {
                bail!("用法: cramplan prepare <科目>");
            }
            app.prepare(subject.trim()).await?;
        }
        Some(other) => bail!("未知命令: {}（可用: run, prepare <科目>）", other),
    }

    Ok(())
}
