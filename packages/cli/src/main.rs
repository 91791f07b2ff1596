#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line entry point for the SASV road-fatality toolkit.
//!
//! Each subcommand mirrors one API endpoint and runs it against a local
//! [`Session`]; `serve` starts the HTTP server itself.
//!
//! Uses `indicatif-log-bridge` (via [`sasv_cli_utils::init_logger`]) to
//! route `log` output through `indicatif::MultiProgress` so that log lines
//! and the training progress bar never fight for the terminal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sasv_analytics_models::{DistributionColumn, ExploreFilter, HeatmapFilter};
use sasv_cli_utils::IndicatifProgress;
use sasv_incident_models::{NewIncident, TimeBucket, Weekday};
use sasv_predict::progress::null_progress;
use sasv_predict_models::PredictionInput;
use sasv_session::{Session, SessionConfig};

#[derive(Parser)]
#[command(name = "sasv", about = "Road-fatality statistics and street-risk prediction")]
struct Cli {
    /// TOML config file (overridden by `SASV_DATA_PATH`, `BIND_ADDR`, `PORT`)
    #[arg(long, env = "SASV_CONFIG")]
    config: Option<PathBuf>,
    /// Dataset path, overriding config and environment
    #[arg(long)]
    data: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List provinces and the years covered by the data
    Provinces,
    /// Detailed statistics for one province
    Summary {
        /// Province name as spelled in the dataset
        province: String,
    },
    /// Compare totals and mean ages across provinces
    Compare,
    /// Province markers with severity tiers
    Markers,
    /// Heatmap points as JSON
    Heatmap {
        /// First year, inclusive (defaults to the earliest year)
        #[arg(long)]
        from: Option<i32>,
        /// Last year, inclusive (defaults to the latest year)
        #[arg(long)]
        to: Option<i32>,
        /// Comma-separated month numbers (defaults to all)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        months: Option<Vec<u32>>,
    },
    /// Value counts of a categorical column
    Distribution {
        /// One of `tipo_lugar`, `victima_vehiculo`, `inculpado_vehiculo`,
        /// `modo_produccion_hecho`
        #[arg(value_parser = parse_column)]
        column: DistributionColumn,
        /// Restrict to one province
        #[arg(long)]
        province: Option<String>,
        /// Keep only the most frequent values
        #[arg(long)]
        top: Option<usize>,
        /// Write the counts as CSV to this file instead of printing
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Filter records by year range and provinces
    Explore {
        /// First year, inclusive (defaults to the earliest year)
        #[arg(long)]
        from: Option<i32>,
        /// Last year, inclusive (defaults to the latest year)
        #[arg(long)]
        to: Option<i32>,
        /// Comma-separated provinces (defaults to all)
        #[arg(long, value_delimiter = ',', num_args = 1..)]
        provinces: Option<Vec<String>>,
        /// Write every match as CSV to this file instead of printing
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Train the predictor and report its holdout accuracy
    Train,
    /// Rank the most probable streets for a set of conditions
    Predict {
        /// Province name as spelled in the dataset
        #[arg(long)]
        province: String,
        /// Month number (1-12)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: u32,
        /// Segment of the day (`Madrugada`, `Mañana`, `Tarde`, `Noche`)
        #[arg(long, value_parser = parse_time_bucket)]
        time_bucket: TimeBucket,
        /// Day of the week in English (`Monday` ... `Sunday`)
        #[arg(long, value_parser = parse_weekday)]
        weekday: Weekday,
        /// Place type as spelled in the dataset
        #[arg(long)]
        place_type: String,
    },
    /// Append a new incident to the dataset
    Register {
        /// Date of the incident (`YYYY-MM-DD`)
        #[arg(long)]
        date: NaiveDate,
        /// Province
        #[arg(long)]
        province: String,
        /// Locality
        #[arg(long, default_value = "")]
        locality: String,
        /// Latitude (defaults to the province centroid)
        #[arg(long, allow_negative_numbers = true)]
        latitude: Option<f64>,
        /// Longitude (defaults to the province centroid)
        #[arg(long, allow_negative_numbers = true)]
        longitude: Option<f64>,
        /// Place type
        #[arg(long)]
        place_type: String,
        /// Victim age in years
        #[arg(long)]
        victim_age: u32,
        /// Victim sex
        #[arg(long)]
        victim_sex: String,
        /// How the incident happened
        #[arg(long)]
        production_mode: String,
        /// Vehicle the victim was using
        #[arg(long)]
        victim_vehicle: String,
        /// Vehicle of the accused party
        #[arg(long)]
        accused_vehicle: String,
    },
    /// Print the registration form choices as JSON
    RegistrationOptions,
    /// Start the HTTP API server
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
}

fn parse_column(s: &str) -> Result<DistributionColumn, String> {
    s.parse().map_err(|_| format!("unknown column '{s}'"))
}

fn parse_time_bucket(s: &str) -> Result<TimeBucket, String> {
    s.parse().map_err(|_| format!("unknown time bucket '{s}'"))
}

fn parse_weekday(s: &str) -> Result<Weekday, String> {
    s.parse().map_err(|_| format!("unknown weekday '{s}'"))
}

fn load_config(path: Option<&Path>, data: Option<PathBuf>) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = SessionConfig::load(path)?;
    if let Some(data) = data {
        config.data_path = data;
    }
    Ok(config)
}

fn year_range(session: &Session, from: Option<i32>, to: Option<i32>) -> Result<(i32, i32), Box<dyn std::error::Error>> {
    let bounds = sasv_analytics::year_bounds(&*session.table()?);
    let (min, max) = bounds.map_or((0, 0), |b| (b.min, b.max));
    Ok((from.unwrap_or(min), to.unwrap_or(max)))
}

fn write_csv(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::write(path, bytes)?;
    log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn serve(
    mut config: SessionConfig,
    bind: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(bind) = bind {
        config.bind_addr = bind;
    }
    if let Some(port) = port {
        config.port = port;
    }
    let session = Arc::new(Session::new(config));
    actix_web::rt::System::new().block_on(sasv_server::run_server(session))?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = sasv_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.data)?;
    let progress = match cli.command {
        Commands::Train | Commands::Predict { .. } => {
            IndicatifProgress::training_bar(&multi, "Training street-risk model")
        }
        _ => null_progress(),
    };
    let session = Session::with_progress(config, progress);

    run(&session, cli.command)
}

#[allow(clippy::too_many_lines)]
fn run(session: &Session, command: Commands) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Provinces => {
            let table = session.table()?;
            let years = sasv_analytics::year_bounds(&table)
                .map_or_else(|| "-".to_string(), |b| format!("{}-{}", b.min, b.max));
            println!("{} records, years {years}", table.len());
            for province in sasv_analytics::provinces(&table) {
                println!("  {province}");
            }
        }
        Commands::Summary { province } => {
            let summary = sasv_analytics::province_summary(&*session.table()?, &province)
                .ok_or_else(|| format!("No records for province '{province}'"))?;

            println!("{}", summary.province);
            println!("{}", "-".repeat(50));
            println!("Total deaths:    {}", summary.total_deaths);
            println!("Mean age:        {:.1}", summary.mean_age);
            println!("Period:          {}-{}", summary.first_year, summary.last_year);
            println!("Deaths per year: {:.1}", summary.deaths_per_year);
            println!();
            println!("{:<8} DEATHS", "YEAR");
            for year in &summary.yearly {
                println!("{:<8} {}", year.year, year.deaths);
            }
            println!();
            println!("{:<8} DEATHS", "MONTH");
            for month in &summary.monthly {
                println!("{:<8} {}", month.label, month.deaths);
            }
            println!();
            println!("{:<30} DEATHS", "LOCALITY");
            for locality in &summary.top_localities {
                println!("{:<30} {}", locality.locality, locality.deaths);
            }
        }
        Commands::Compare => {
            println!("{:<35} {:>8} {:>9} {:>6}", "PROVINCE", "DEATHS", "MEAN AGE", "YEARS");
            println!("{}", "-".repeat(61));
            for row in sasv_analytics::province_comparison(&*session.table()?) {
                println!(
                    "{:<35} {:>8} {:>9.2} {:>6}",
                    row.province, row.total_deaths, row.mean_age, row.years_with_data
                );
            }
        }
        Commands::Markers => {
            println!("{:<35} {:>8} {:>9} TIER", "PROVINCE", "DEATHS", "PER YEAR");
            println!("{}", "-".repeat(64));
            for marker in sasv_analytics::province_markers(&*session.table()?) {
                println!(
                    "{:<35} {:>8} {:>9.1} {}",
                    marker.province, marker.total_deaths, marker.average_per_year, marker.tier
                );
            }
        }
        Commands::Heatmap { from, to, months } => {
            let (year_from, year_to) = year_range(session, from, to)?;
            let filter = HeatmapFilter {
                year_from,
                year_to,
                months: months.unwrap_or_else(|| (1..=12).collect()),
            };
            let points = sasv_analytics::heatmap_points(&*session.table()?, &filter)?;
            println!("{}", serde_json::to_string(&points)?);
        }
        Commands::Distribution {
            column,
            province,
            top,
            csv,
        } => {
            let mut distribution =
                sasv_analytics::category_distribution(&*session.table()?, column, province.as_deref());
            if let Some(n) = top {
                distribution = distribution.top(n);
            }

            if let Some(path) = csv {
                write_csv(&path, &sasv_analytics::distribution_csv(&distribution)?)?;
            } else {
                println!("{column}: {} records", distribution.total);
                println!("{}", "-".repeat(50));
                for entry in &distribution.entries {
                    println!("{:<35} {:>7} {:>6.2}%", entry.value, entry.count, entry.percentage);
                }
            }
        }
        Commands::Explore {
            from,
            to,
            provinces,
            csv,
        } => {
            let table = session.table()?;
            let (year_from, year_to) = year_range(session, from, to)?;
            let filter = ExploreFilter {
                year_from,
                year_to,
                provinces: provinces.unwrap_or_else(|| sasv_analytics::provinces(&table)),
            };

            if let Some(path) = csv {
                write_csv(&path, &sasv_analytics::explore_csv(&table, &filter)?)?;
            } else {
                let result = sasv_analytics::explore(&table, &filter)?;
                println!("{} matching records", result.total);
                for record in &result.preview {
                    println!(
                        "  {} {} {}",
                        record.incident_date.as_deref().unwrap_or("-"),
                        record.province_name,
                        record.street_name.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Train => {
            let predictor = session.predictor()?;
            let summary = predictor.summary();
            let percent = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0));

            println!("Usable rows:       {}", summary.usable_rows);
            println!("Qualifying rows:   {}", summary.qualifying_rows);
            println!("Streets:           {}", summary.classes);
            println!("Train / holdout:   {} / {}", summary.train_rows, summary.holdout_rows);
            println!("Encoded columns:   {}", summary.encoded_columns);
            println!("Holdout top-1:     {}", percent(summary.holdout_accuracy));
            println!("Holdout top-k:     {}", percent(summary.holdout_top_k_accuracy));
        }
        Commands::Predict {
            province,
            month,
            time_bucket,
            weekday,
            place_type,
        } => {
            let ranked = session.predict(&PredictionInput {
                province,
                month,
                time_bucket,
                weekday,
                place_type,
            })?;

            println!("{:<40} PROBABILITY", "STREET");
            println!("{}", "-".repeat(52));
            for street in ranked {
                println!("{:<40} {:>10.2}%", street.street, street.probability * 100.0);
            }
        }
        Commands::Register {
            date,
            province,
            locality,
            latitude,
            longitude,
            place_type,
            victim_age,
            victim_sex,
            production_mode,
            victim_vehicle,
            accused_vehicle,
        } => {
            let id = session.register(&NewIncident {
                date,
                province,
                locality,
                latitude,
                longitude,
                place_type,
                victim_age,
                victim_sex,
                production_mode,
                victim_vehicle,
                accused_vehicle,
            })?;
            println!("Registered incident {id}");
        }
        Commands::RegistrationOptions => {
            println!(
                "{}",
                serde_json::to_string_pretty(&session.registration_options())?
            );
        }
        Commands::Serve { bind, port } => serve(session.config().clone(), bind, port)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_prediction_arguments() {
        let cli = Cli::try_parse_from([
            "sasv",
            "predict",
            "--province",
            "Salta",
            "--month",
            "7",
            "--time-bucket",
            "Mañana",
            "--weekday",
            "Saturday",
            "--place-type",
            "Ruta",
        ])
        .unwrap();

        assert!(matches!(
            cli.command,
            Commands::Predict {
                month: 7,
                time_bucket: TimeBucket::Manana,
                weekday: Weekday::Saturday,
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_month() {
        assert!(
            Cli::try_parse_from([
                "sasv",
                "predict",
                "--province",
                "Salta",
                "--month",
                "13",
                "--time-bucket",
                "Noche",
                "--weekday",
                "Monday",
                "--place-type",
                "Ruta",
            ])
            .is_err()
        );
    }

    #[test]
    fn parses_negative_coordinates_and_lists() {
        let cli = Cli::try_parse_from([
            "sasv",
            "--data",
            "/tmp/muertes.csv",
            "register",
            "--date",
            "2024-05-17",
            "--province",
            "Salta",
            "--latitude",
            "-24.5",
            "--longitude",
            "-65.1",
            "--place-type",
            "Ruta",
            "--victim-age",
            "30",
            "--victim-sex",
            "Femenino",
            "--production-mode",
            "Vuelco",
            "--victim-vehicle",
            "Moto",
            "--accused-vehicle",
            "Auto",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("/tmp/muertes.csv")));
        assert!(matches!(
            cli.command,
            Commands::Register { latitude: Some(lat), .. } if (lat + 24.5).abs() < 1e-9
        ));

        let cli = Cli::try_parse_from(["sasv", "heatmap", "--months", "1,2,12"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Heatmap { months: Some(ref m), .. } if m == &[1, 2, 12]
        ));
    }
}
