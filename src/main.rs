use clap::Parser;
use colissimo_client::utils::error::{ColissimoError, ErrorCategory};
use colissimo_client::utils::{logger, validation::Validate};
use colissimo_client::{CliConfig, Command, DeliveryChoice};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::debug!("Command: {:?}", cli.command);

    if let Err(e) = run(&cli).await {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Transport | ErrorCategory::Remote | ErrorCategory::Decode => 2,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: &CliConfig) -> Result<(), ColissimoError> {
    let config = cli.resolve()?;
    config.validate()?;

    let service = DeliveryChoice::from_config(&config)?;
    let shipping_date = cli.command.shipping_date();
    let extra_options = cli.command.extra_options();

    let output = match &cli.command {
        Command::Find {
            city,
            zip_code,
            country_code,
            ..
        } => {
            tracing::info!("Searching pickup points near {} {} ({})", zip_code, city, country_code);
            let points = service
                .find_pickup_points(city, zip_code, country_code, &shipping_date, extra_options)
                .await?;
            serde_json::to_string_pretty(&points)?
        }
        Command::Get { id, .. } => {
            tracing::info!("Fetching pickup point {}", id);
            let point = service
                .find_pickup_point_by_id(*id, &shipping_date, extra_options)
                .await?;
            serde_json::to_string_pretty(&point)?
        }
    };

    println!("{}", output);
    Ok(())
}
