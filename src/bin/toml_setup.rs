use clap::Parser;
use small_setup::config::toml_config::TomlConfig;
use small_setup::core::requirements;
use small_setup::utils::{logger, validation::Validate};
use small_setup::{
    EnvFileStep, InstallStep, SetupContext, SetupEngine, StepSequence, SystemRunner, VenvStep,
    VerifyStep,
};
use std::path::Path;

#[derive(Parser)]
#[command(name = "toml-setup")]
#[command(about = "Project bootstrap tool with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "setup-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Override forced venv recreation from config
    #[arg(long)]
    force: Option<bool>,

    /// Dry run - show what would be done without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based setup tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(force) = args.force {
        config.venv.force = Some(force);
        tracing::info!("🔧 Forced recreation overridden to: {}", force);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No actual changes will be made");
        perform_dry_run(&config)?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());

    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let project_dir = std::env::current_dir()?;
    let execution_id = format!("setup_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let runner = SystemRunner::with_envs(config.command_environment());

    let mut sequence = StepSequence::new(execution_id.clone(), &project_dir);
    sequence.add_step(Box::new(EnvFileStep::new(
        &config.env_file.example,
        &config.env_file.target,
        config.overwrite_env(),
    )));
    sequence.add_step(Box::new(VenvStep::new(
        &config.venv.dir,
        config.venv.python.clone(),
        config.force_recreate(),
        runner.clone(),
    )));
    sequence.add_step(Box::new(
        InstallStep::new(&config.venv.dir, &config.install.requirements, runner.clone())
            .with_index_url(config.install.index_url.clone())
            .with_upgrade_pip(config.upgrade_pip_enabled())
            .with_extra_packages(config.extra_packages().to_vec()),
    ));

    let mut engine = SetupEngine::new_with_monitoring(sequence, monitor_enabled);

    match engine.run().await {
        Ok(_) => {
            tracing::info!("✅ Setup completed successfully!");
            println!("✅ Setup completed successfully!");
            println!("🐍 Environment ready at: {}", config.venv.dir);
        }
        Err(e) => {
            tracing::error!(
                "❌ Setup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                small_setup::utils::error::ErrorSeverity::Low => 0,
                small_setup::utils::error::ErrorSeverity::Medium => 2,
                small_setup::utils::error::ErrorSeverity::High => 1,
                small_setup::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    // 設定啟用時執行收尾驗證
    if config.verify_enabled() {
        let context = SetupContext::new(execution_id, project_dir);
        let verify = VerifyStep::new(
            &config.env_file.example,
            &config.env_file.target,
            &config.venv.dir,
            &config.install.requirements,
            SystemRunner::with_envs(config.command_environment()),
        )
        .with_expect_identical(config.overwrite_env())
        .with_check_packages(config.check_packages());

        let outcomes = verify.run_checks(&context).await;
        let mut failed = 0;
        for outcome in &outcomes {
            if outcome.passed {
                println!("  ✅ {}: {}", outcome.name, outcome.detail);
            } else {
                failed += 1;
                println!("  ❌ {}: {}", outcome.name, outcome.detail);
            }
        }

        if failed > 0 {
            if config.on_verify_failure() == "warn" {
                tracing::warn!("⚠️ {} verification check(s) failed (policy: warn)", failed);
            } else {
                eprintln!("❌ {} verification check(s) failed", failed);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    println!(
        "  Project: {} v{}",
        config.project.name, config.project.version
    );
    println!(
        "  Env file: {} -> {} (overwrite: {})",
        config.env_file.example,
        config.env_file.target,
        config.overwrite_env()
    );
    println!("  Venv: {}", config.venv.dir);

    if let Some(python) = &config.venv.python {
        println!("  Python: {}", python);
    }

    println!("  Requirements: {}", config.install.requirements);

    if let Some(index_url) = &config.install.index_url {
        println!("  Index URL: {}", index_url);
    }

    println!("  Upgrade pip: {}", config.upgrade_pip_enabled());
    println!("  Verify: {}", config.verify_enabled());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Dry Run Analysis:");
    println!();

    // 環境檔案分析
    println!("📄 Env File Step:");
    let example = Path::new(&config.env_file.example);
    println!(
        "  {} {} -> {}",
        if example.exists() { "✅" } else { "⚠️" },
        config.env_file.example,
        config.env_file.target
    );
    if !example.exists() {
        println!("  ⚠️ Example file does not exist yet - the run would fail");
    }
    if Path::new(&config.env_file.target).exists() {
        if config.overwrite_env() {
            println!("  💾 Existing target would be backed up and overwritten");
        } else {
            println!("  ⏭️ Existing target would be kept (overwrite = false)");
        }
    }

    // venv 分析
    println!();
    println!("🐍 Venv Step:");
    println!("  Directory: {}", config.venv.dir);
    println!(
        "  Interpreter: {}",
        config.venv.python.as_deref().unwrap_or("python3 (auto)")
    );
    if config.force_recreate() {
        println!("  🧹 Existing environment would be removed first");
    }

    // 安裝分析
    println!();
    println!("📦 Install Step:");
    match requirements::load_requirements(Path::new(&config.install.requirements)) {
        Ok(specs) => {
            println!("  {} packages from {}", specs.len(), config.install.requirements);
            for spec in specs.iter().take(10) {
                println!("    - {}", spec);
            }
            if specs.len() > 10 {
                println!("    ... and {} more", specs.len() - 10);
            }
        }
        Err(e) => println!("  ⚠️ Cannot read requirements: {}", e),
    }
    if !config.extra_packages().is_empty() {
        println!("  Extra packages: {}", config.extra_packages().join(", "));
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");

    Ok(())
}
