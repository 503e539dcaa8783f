use account_book::{config::Config, db::init_db, workflow, AppError, Repository};

#[tokio::main]
async fn main() {
    // Initialize tracing; stdout is reserved for the report
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let pool = init_db(&config.database_path).await?;
    let repo = Repository::new(pool);

    let report = workflow::run(&repo, &config).await?;
    for line in report.lines() {
        println!("{}", line);
    }
    Ok(())
}
