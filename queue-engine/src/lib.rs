//! Queue Engine - 餐厅排队与桌型分配引擎
//!
//! # 架构概述
//!
//! - **排队** (`waitlist`): 入队、状态流转、位置重排、远程签到、超时取消
//! - **分桌** (`waitlist::allocator`): first_fit / best_fit / optimize_turnover
//! - **估算** (`waitlist::estimator`): 队列深度 + 桌型可用性 + 历史信号
//! - **存储** (`db`): CRUD trait 与内存实现
//! - **协作者** (`services`): 通知、入座分析、历史信号
//!
//! # 模块结构
//!
//! ```text
//! queue-engine/src/
//! ├── core/          # 配置、状态、后台任务
//! ├── db/            # 存储 trait 与内存实现
//! ├── services/      # 外部协作者
//! ├── utils/         # 日志、时钟、时区
//! └── waitlist/      # 排队核心
//! ```

pub mod core;
pub mod db;
pub mod services;
pub mod utils;
pub mod waitlist;

// Re-export 公共类型
pub use core::{BackgroundTasks, Config, EngineState, TaskKind};
pub use db::{MemoryStore, StoreError, WaitlistStore};
pub use utils::{AppError, AppResult};
pub use waitlist::{
    AllocationStrategy, CapacityPrediction, CapacityPredictor, CheckInResult, ManagerError,
    ManagerResult, QueueManager, QueueSettings, RemoteCheckInHandler, TransitionExtra,
};

// Re-export unified error types from shared
pub use utils::ErrorCode;

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境：加载 .env，初始化日志
pub fn setup_environment() -> Config {
    if let Err(e) = dotenv::dotenv() {
        // .env 可选
        eprintln!("No .env loaded: {}", e);
    }
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());
    config
}
