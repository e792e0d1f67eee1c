use clap::Parser;
use small_setup::utils::{logger, validation::Validate};
use small_setup::{
    CliConfig, EnvFileStep, InstallStep, SetupEngine, StepSequence, SystemRunner, VenvStep,
    VerifyStep,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting small-setup CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    // 組裝步驟序列
    let project_dir = std::env::current_dir()?;
    let execution_id = format!("setup_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let runner = SystemRunner::new();

    let mut sequence = StepSequence::new(execution_id, &project_dir);
    sequence.add_step(Box::new(EnvFileStep::new(
        &config.env_example,
        &config.env_file,
        !config.preserve_env,
    )));
    sequence.add_step(Box::new(VenvStep::new(
        &config.venv_dir,
        config.python.clone(),
        config.force,
        runner.clone(),
    )));
    sequence.add_step(Box::new(
        InstallStep::new(&config.venv_dir, &config.requirements, runner.clone())
            .with_index_url(config.index_url.clone())
            .with_upgrade_pip(config.upgrade_pip),
    ));
    if !config.no_verify {
        sequence.add_step(Box::new(
            VerifyStep::new(
                &config.env_example,
                &config.env_file,
                &config.venv_dir,
                &config.requirements,
                runner,
            )
            .with_expect_identical(!config.preserve_env),
        ));
    }

    // 創建引擎並運行
    let mut engine = SetupEngine::new_with_monitoring(sequence, monitor_enabled);

    match engine.run().await {
        Ok(results) => {
            let summary = StepSequence::get_execution_summary(&results);
            tracing::debug!("Execution summary: {:?}", summary);

            tracing::info!("✅ Environment setup completed successfully!");
            println!("✅ Environment setup completed successfully!");
            println!("🐍 Environment ready at: {}", config.venv_dir);
            println!("📄 Environment file: {}", config.env_file);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ Setup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                small_setup::utils::error::ErrorSeverity::Low => 0, // 警告，但成功
                small_setup::utils::error::ErrorSeverity::Medium => 2, // 重試錯誤
                small_setup::utils::error::ErrorSeverity::High => 1, // 處理錯誤
                small_setup::utils::error::ErrorSeverity::Critical => 3, // 系統錯誤
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
