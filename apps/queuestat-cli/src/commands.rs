//! Subcommand implementations

use queuestat_core::{
    dimensioning_sweeps, finite_variance_check, loss_report, warmup_curve, AnalysisConfig, AnalysisResult,
    DimensioningSweeps, Exporter, LossReport, OccupancyAnalysis, ResponseTimeAnalysis,
};
use queuestat_erlang::{Float64Backend, LossEngine, NumericBackend};
use queuestat_io::{IngestOptions, ScenarioTable};
use tracing::info;

use crate::table::{loss_table, summary_table};
use crate::{Cli, Commands, OccupancyMetric, ResponseMetric};

/// Maximum loss probability used to report the smallest adequate sweep capacity
const TARGET_LOSS: f64 = 0.01;

pub fn run(cli: &Cli) -> AnalysisResult<()> {
    if let Commands::InitConfig = cli.command {
        println!("{}", AnalysisConfig::default().to_toml()?);
        return Ok(());
    }

    let config = load_config(cli)?;
    let exporter = Exporter::new(&config.general.export_directory);

    match &cli.command {
        Commands::Response { metric, no_ci } => response(&config, &exporter, *metric, *no_ci),
        Commands::Occupancy { metric } => occupancy(&config, &exporter, *metric),
        Commands::Dimension { sweeps, float } => {
            if *float {
                dimension(&LossEngine::new(Float64Backend), &config, &exporter, *sweeps)
            } else {
                dimension(&LossEngine::exact(), &config, &exporter, *sweeps)
            }
        }
        Commands::Warmup { statistic } => {
            let table = ScenarioTable::load(&config.general.working_csv, &IngestOptions::repetitions_only())?;
            let curve = warmup_curve(&table, statistic)?;
            exporter.json("warmup_throughput", &curve)?;
            Ok(())
        }
        Commands::Variance { statistic, cashier } => {
            let table = ScenarioTable::load(&config.general.working_csv, &config.analysis.cashier_ingest())?;
            let series = finite_variance_check(&table, statistic, cashier)?;
            exporter.json("partial_variance", &series)?;
            Ok(())
        }
        Commands::InitConfig => Ok(()),
    }
}

fn load_config(cli: &Cli) -> AnalysisResult<AnalysisConfig> {
    let mut config = AnalysisConfig::load(&cli.config)?;
    if let Some(input) = &cli.input {
        config.general.working_csv = input.clone();
    }
    if let Some(output) = &cli.output {
        config.general.export_directory = output.clone();
    }
    info!(config = %cli.config.display(), input = %config.general.working_csv.display(), "Loaded configuration");
    Ok(config)
}

fn response(config: &AnalysisConfig, exporter: &Exporter, metric: ResponseMetric, no_ci: bool) -> AnalysisResult<()> {
    let settings = &config.analysis;
    let table = ScenarioTable::load(&config.general.working_csv, &settings.cashier_ingest())?;
    let analysis = ResponseTimeAnalysis::from_settings(&table, settings);
    let wants = |m: ResponseMetric| metric == m || metric == ResponseMetric::All;

    if wants(ResponseMetric::Ecdf) {
        let level = (!no_ci).then_some(settings.confidence_level);
        exporter.json("ecdf", &analysis.ecdf(level)?)?;
    }
    if wants(ResponseMetric::Lorenz) {
        exporter.json("lorenz", &analysis.lorenz()?)?;
    }
    if wants(ResponseMetric::Histogram) {
        exporter.json("histogram", &analysis.histogram(settings.histogram_bins)?)?;
    }
    if wants(ResponseMetric::Mean) {
        let means = analysis.sample_mean(settings.confidence_level)?;
        println!("{}", summary_table("Sample mean", &means));
        exporter.json("mean", &means)?;
    }
    if wants(ResponseMetric::Median) {
        let medians = analysis.sample_median(settings.confidence_level)?;
        println!("{}", summary_table("Sample median", &medians));
        exporter.json("median", &medians)?;
    }
    if wants(ResponseMetric::Cov) {
        exporter.json("coefficient_of_variation", &analysis.coefficient_of_variation()?)?;
    }
    if wants(ResponseMetric::Qq) {
        exporter.json("qq", &analysis.qq(&settings.reference)?)?;
    }
    Ok(())
}

fn occupancy(config: &AnalysisConfig, exporter: &Exporter, metric: OccupancyMetric) -> AnalysisResult<()> {
    let settings = &config.analysis;
    let table = ScenarioTable::load(&config.general.working_csv, &settings.customer_ingest())?;
    let analysis = OccupancyAnalysis::from_settings(&table, settings);
    let wants = |m: OccupancyMetric| metric == m || metric == OccupancyMetric::All;

    if wants(OccupancyMetric::Mean) {
        let means = analysis.sample_mean(settings.confidence_level)?;
        println!("{}", summary_table("Time-averaged occupancy", &means));
        exporter.json("occupancy_mean", &means)?;
    }
    if wants(OccupancyMetric::Iod) {
        exporter.json("index_of_dispersion", &analysis.index_of_dispersion()?)?;
    }
    if wants(OccupancyMetric::Quantile) {
        let quantiles = analysis.sample_quantile(settings.quantile, settings.confidence_level)?;
        println!("{}", summary_table("Sample quantile", &quantiles));
        exporter.json("occupancy_quantile", &quantiles)?;
    }
    if wants(OccupancyMetric::Histogram) {
        exporter.json("occupancy_histogram", &analysis.histogram(settings.histogram_bins)?)?;
    }
    if wants(OccupancyMetric::Qq) {
        exporter.json("occupancy_qq", &analysis.qq(&settings.occupancy_reference)?)?;
    }
    Ok(())
}

fn dimension<B: NumericBackend>(
    engine: &LossEngine<B>,
    config: &AnalysisConfig,
    exporter: &Exporter,
    sweeps: bool,
) -> AnalysisResult<()> {
    let LossReport { offered_load, rows, .. } = loss_report(engine, config)?;
    println!("Offered load u = {offered_load:.4} Erlang ({} backend)", engine.backend().name());
    println!("{}", loss_table(&rows));
    exporter.loss_table("loss_probability", &rows)?;

    if sweeps {
        let result = dimensioning_sweeps(engine, config)?;
        print_sweeps(&result);
        exporter.loss_table("sweep_more_seats", &result.more_seats)?;
        exporter.loss_table("sweep_more_queue", &result.more_queue)?;
    }
    Ok(())
}

fn print_sweeps(sweeps: &DimensioningSweeps) {
    println!("Increasing number of seats");
    println!("{}", loss_table(&sweeps.more_seats));
    println!("Increasing queue length");
    println!("{}", loss_table(&sweeps.more_queue));

    let (seats, queue) = sweeps.minimum_capacities(TARGET_LOSS);
    for (name, row) in [("seats", seats), ("queue", queue)] {
        match row {
            Some(row) => println!(
                "Smallest capacity with loss <= {:.0}% ({name}): K = {}",
                TARGET_LOSS * 100.0,
                row.capacity
            ),
            None => println!(
                "No capacity in the {name} sweep reaches loss <= {:.0}%",
                TARGET_LOSS * 100.0
            ),
        }
    }
}
