use queue_engine::{BackgroundTasks, EngineState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment();

    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir,
        "Queue engine starting..."
    );

    // 2. 初始化引擎状态
    let state = EngineState::initialize(&config);

    // 3. 启动后台任务
    let mut tasks = BackgroundTasks::new();
    state.start_background_tasks(&mut tasks);

    // 4. 等待退出信号
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    tasks.shutdown().await;
    tracing::info!("Queue engine stopped");
    Ok(())
}
