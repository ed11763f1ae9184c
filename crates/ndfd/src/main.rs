use anyhow::{anyhow, Context};
use ndfd::{
    get_config_info, setup_logger, wide_to_long, Cli, Command, ForecastService, LocalArgs,
    NdfdForecast, SummaryArgs, SummaryRequest, Timestamp, VariableType, XmlFetcher,
};
use slog::{error, info, Logger};
use std::io;
use std::sync::Arc;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = match get_config_info() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("Error loading configuration: {:#}", err);
            std::process::exit(2);
        }
    };
    let logger = setup_logger(&cli);

    if let Err(err) = run(&cli, &logger).await {
        error!(logger, "forecast run failed: {:#}", err);
        eprintln!("Error retrieving forecast: {:#}", err);
        // let the async drain flush before exiting
        drop(logger);
        std::process::exit(2);
    }
}

async fn run(cli: &Cli, logger: &Logger) -> Result<(), anyhow::Error> {
    match &cli.command {
        Some(Command::Summary(args)) => summary(cli, logger, args).await,
        Some(Command::Local(args)) => local(cli, logger, args),
        None => Err(anyhow!("no command given")),
    }
}

async fn summary(cli: &Cli, logger: &Logger, args: &SummaryArgs) -> Result<(), anyhow::Error> {
    let fetcher = XmlFetcher::new(logger.clone(), cli.user_agent())?;
    info!(logger, "user agent: {}", fetcher.user_agent());

    let service = ForecastService::new(logger.clone(), Arc::new(fetcher));
    let summary = service
        .daily_summary(&SummaryRequest::from(args))
        .await?;

    summary.write_csv(io::stdout().lock())?;
    Ok(())
}

fn local(cli: &Cli, logger: &Logger, args: &LocalArgs) -> Result<(), anyhow::Error> {
    let ndfd_dir = cli
        .ndfd_dir(args)
        .ok_or_else(|| anyhow!("an NDFD directory is required (--ndfd-dir or ndfd_dir in config)"))?;
    let timezone = cli.timezone();
    let variable: VariableType = args.variable.parse()?;

    let mut forecast = NdfdForecast::preset(logger.clone(), &ndfd_dir, variable, &timezone)?;
    let local_ts = args
        .time
        .as_deref()
        .map(|time| time.parse::<Timestamp>())
        .transpose()?;
    let rows = forecast.read(local_ts.as_ref(), args.station.as_slice())?;
    if let Some(last_read) = &forecast.last_read {
        info!(
            logger,
            "{} of {} rows kept from {}",
            rows.len(),
            last_read.rows.len(),
            last_read.path.display()
        );
    }

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    if args.long {
        writer.write_record(["station", "forecast_date", "variable", "value"])?;
        for record in wide_to_long(&rows, variable)? {
            writer.write_record([
                record.station,
                record.forecast_date.format("%Y-%m-%d").to_string(),
                record.variable.to_string(),
                record.value.map(|v| v.to_string()).unwrap_or_default(),
            ])?;
        }
    } else if let Some(first) = rows.first() {
        writer.write_record(first.columns())?;
        for row in &rows {
            writer.write_record(row.iter().map(|(_, value)| value))?;
        }
    }
    writer
        .flush()
        .context("unable to write forecast rows to stdout")?;
    Ok(())
}
