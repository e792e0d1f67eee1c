use anyhow::Context;
use clap::Parser;
use small_setup::utils::logger;
use small_setup::{SetupContext, SystemRunner, VerifyStep};

#[derive(Parser)]
#[command(name = "setup-doctor")]
#[command(about = "Check an already-bootstrapped Python project environment")]
struct Args {
    #[arg(long, default_value = ".env.example")]
    env_example: String,

    #[arg(long, default_value = ".env")]
    env_file: String,

    #[arg(long, default_value = "venv")]
    venv_dir: String,

    #[arg(long, default_value = "requirements.txt")]
    requirements: String,

    /// Do not require .env to be byte-identical to the example
    #[arg(long)]
    allow_env_drift: bool,

    /// Skip the per-package installation checks
    #[arg(long)]
    skip_packages: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let project_dir = std::env::current_dir().context("Resolve current directory")?;
    let execution_id = format!("doctor_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let context = SetupContext::new(execution_id, project_dir);

    let verify = VerifyStep::new(
        &args.env_example,
        &args.env_file,
        &args.venv_dir,
        &args.requirements,
        SystemRunner::new(),
    )
    .with_expect_identical(!args.allow_env_drift)
    .with_check_packages(!args.skip_packages);

    println!("🩺 Checking project environment...");
    println!();

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

    println!();
    if failed > 0 {
        println!("❌ {} of {} checks failed", failed, outcomes.len());
        println!("💡 Re-run small-setup to repair the environment");
        std::process::exit(1);
    }

    println!("✅ All {} checks passed", outcomes.len());
    Ok(())
}
