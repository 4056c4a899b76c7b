//! CLI integration tests for argument parsing and command dispatch.
//!
//! Tests cover:
//! - Argument parsing (global flags, per-command overrides)
//! - Settings loading and command-line precedence
//! - pick / graph / records against real files on disk
//! - Exit codes for each error category

mod common;

use clap::Parser;
use common::*;
use realprices::cli::{self, Cli, Command, EpochArgs, GraphOverrides};
use realprices::domain::chart::SeriesSpec;
use realprices::domain::epoch::EpochParams;
use realprices::domain::error::RealPricesError;
use realprices::domain::settings::Settings;
use realprices::domain::token_log::PoolType;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

// ExitCode doesn't implement PartialEq, so compare via Debug output
fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::from(expected)));
}

fn run_args(args: &[&str]) -> ExitCode {
    let mut full = vec!["realprices"];
    full.extend_from_slice(args);
    cli::run(Cli::try_parse_from(full).unwrap())
}

fn path_str(path: &Path) -> &str {
    path.to_str().unwrap()
}

const FULL_INI: &str = r#"
[epochs]
epoch_length = 1800
mewt = 5

[files]
price_data = prices.json
token_log = sim.log
price_list = out.sol
chart = out.html

[chart]
title = Pool drift
series = diff, short:1
eth_epoch_limit = 399

[fetch]
coin = bitcoin
vs_currency = eur
days = 30
"#;

mod parsing {
    use super::*;

    #[test]
    fn pick_defaults() {
        let cli = Cli::try_parse_from(["realprices", "pick"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        match cli.command {
            Command::Pick {
                input,
                output,
                array_name,
                epochs,
            } => {
                assert!(input.is_none());
                assert!(output.is_none());
                assert_eq!(array_name, "prices");
                assert!(epochs.epoch_length.is_none());
                assert!(epochs.mewt.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["realprices", "graph", "-v", "-c", "run.ini"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("run.ini")));
    }

    #[test]
    fn graph_overrides() {
        let cli = Cli::try_parse_from([
            "realprices",
            "graph",
            "--series",
            "diff,long:0",
            "--eth-limit",
            "12",
            "--strict",
            "--epoch-length",
            "60",
            "--mewt",
            "0",
        ])
        .unwrap();
        match cli.command {
            Command::Graph {
                series,
                eth_limit,
                strict,
                epochs,
                ..
            } => {
                assert_eq!(series.as_deref(), Some("diff,long:0"));
                assert_eq!(eth_limit, Some(12));
                assert!(strict);
                assert_eq!(epochs.epoch_length, Some(60));
                assert_eq!(epochs.mewt, Some(0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_subcommand_is_rejected() {
        assert!(Cli::try_parse_from(["realprices", "plot"]).is_err());
    }

    #[test]
    fn zero_eth_limit_is_rejected() {
        assert!(Cli::try_parse_from(["realprices", "graph", "--eth-limit", "0"]).is_err());
        assert!(Cli::try_parse_from(["realprices", "graph", "--eth-limit", "-3"]).is_err());
        assert!(Cli::try_parse_from(["realprices", "graph", "--eth-limit", "1"]).is_ok());
    }

    #[test]
    fn non_numeric_epoch_length_is_rejected() {
        assert!(Cli::try_parse_from(["realprices", "pick", "--epoch-length", "hour"]).is_err());
    }
}

mod settings_loading {
    use super::*;

    #[test]
    fn no_config_gives_defaults() {
        let settings = cli::load_settings(None).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn full_config_is_applied() {
        let file = write_temp(FULL_INI, ".ini");
        let settings = cli::load_settings(Some(&file.path().to_path_buf())).unwrap();

        assert_eq!(
            settings.epochs,
            EpochParams {
                epoch_length: 1800,
                mewt: 5
            }
        );
        assert_eq!(settings.files.token_log, PathBuf::from("sim.log"));
        assert_eq!(settings.chart.title, "Pool drift");
        assert_eq!(
            settings.chart.series,
            vec![
                SeriesSpec::Diff,
                SeriesSpec::Pool {
                    pool: PoolType::Short,
                    tier: 1
                }
            ]
        );
        assert_eq!(settings.chart.eth_epoch_limit, Some(399));
        assert_eq!(settings.fetch.coin, "bitcoin");
        assert_eq!(settings.fetch.days, 30);
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let err = cli::load_settings(Some(&PathBuf::from("/nonexistent/run.ini"))).unwrap_err();
        assert!(matches!(err, RealPricesError::ConfigParse { .. }));
    }

    #[test]
    fn epoch_args_override_settings() {
        let args = EpochArgs {
            epoch_length: Some(600),
            mewt: None,
        };
        let params = cli::resolve_epochs(EpochParams::default(), &args).unwrap();
        assert_eq!(params.epoch_length, 600);
        assert_eq!(params.mewt, 10);
    }

    #[test]
    fn epoch_args_are_validated() {
        let args = EpochArgs {
            epoch_length: Some(0),
            mewt: None,
        };
        let err = cli::resolve_epochs(EpochParams::default(), &args).unwrap_err();
        assert!(matches!(err, RealPricesError::ConfigInvalid { .. }));
    }

    #[test]
    fn graph_overrides_replace_settings() {
        let overrides = GraphOverrides {
            log: Some(PathBuf::from("other.log")),
            series: Some("float:0".into()),
            title: Some("Float drift".into()),
            eth_limit: Some(7),
            ..Default::default()
        };
        let settings = overrides.apply(Settings::default()).unwrap();

        assert_eq!(settings.files.token_log, PathBuf::from("other.log"));
        assert_eq!(settings.files.price_data, PathBuf::from("eth_data.json"));
        assert_eq!(
            settings.chart.series,
            vec![SeriesSpec::Pool {
                pool: PoolType::Float,
                tier: 0
            }]
        );
        assert_eq!(settings.chart.title, "Float drift");
        assert_eq!(settings.chart.eth_epoch_limit, Some(7));
    }

    #[test]
    fn bad_series_override_is_config_error() {
        let overrides = GraphOverrides {
            series: Some("sideways:1".into()),
            ..Default::default()
        };
        let err = overrides.apply(Settings::default()).unwrap_err();
        assert!(matches!(err, RealPricesError::ConfigInvalid { key, .. } if key == "series"));
    }
}

mod commands {
    use super::*;

    #[test]
    fn pick_writes_price_list() {
        let prices = write_temp(&market_chart_json(&hourly_samples(4, 2.0)), ".json");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("eth_price_list.txt");

        let code = run_args(&[
            "pick",
            "-i",
            path_str(prices.path()),
            "-o",
            path_str(&output),
            "--array-name",
            "ethPrices",
        ]);
        assert_exit(code, 0);

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 4);
        assert!(text.starts_with("ethPrices[0] = 2000000000000000000;\n"));
        assert!(text.ends_with("ethPrices[3] = 5000000000000000000;\n"));
    }

    #[test]
    fn pick_honours_epoch_length() {
        let prices = write_temp(&market_chart_json(&hourly_samples(4, 2.0)), ".json");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("list.txt");

        // two-hour epochs keep every other hourly sample
        let code = run_args(&[
            "pick",
            "-i",
            path_str(prices.path()),
            "-o",
            path_str(&output),
            "--epoch-length",
            "7200",
        ]);
        assert_exit(code, 0);

        let text = std::fs::read_to_string(&output).unwrap();
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn graph_writes_html_chart() {
        let prices = write_temp(&market_chart_json(&hourly_samples(6, 1900.0)), ".json");
        let log = write_temp(&sample_log(5), ".txt");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("charts").join("token_price_chart.html");

        let code = run_args(&[
            "graph",
            "--prices",
            path_str(prices.path()),
            "--log",
            path_str(log.path()),
            "-o",
            path_str(&output),
            "--series",
            "diff,short:0",
            "--title",
            "Short pool check",
        ]);
        assert_exit(code, 0);

        let html = std::fs::read_to_string(&output).unwrap();
        assert!(html.contains("Short pool check"));
        assert!(html.contains("short tier 0"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn graph_reads_paths_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let prices = dir.path().join("prices.json");
        let log = dir.path().join("sim.log");
        let chart = dir.path().join("out.html");
        std::fs::write(&prices, market_chart_json(&hourly_samples(3, 1900.0))).unwrap();
        std::fs::write(&log, sample_log(2)).unwrap();
        let ini = format!(
            "[files]\nprice_data = {}\ntoken_log = {}\nchart = {}\n",
            prices.display(),
            log.display(),
            chart.display()
        );
        let config = write_temp(&ini, ".ini");

        let code = run_args(&["-c", path_str(config.path()), "graph"]);
        assert_exit(code, 0);
        assert!(chart.exists());
    }

    #[test]
    fn records_writes_csv() {
        let prices = write_temp(&market_chart_json(&hourly_samples(3, 1900.0)), ".json");
        let log = write_temp(&sample_log(2), ".txt");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("records.csv");

        let code = run_args(&[
            "records",
            "--prices",
            path_str(prices.path()),
            "--log",
            path_str(log.path()),
            "-o",
            path_str(&output),
        ]);
        assert_exit(code, 0);

        let csv = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "epoch,timestamp,pool,tier,price,diff");
        // four pool/tier rows per epoch
        assert_eq!(lines.len(), 1 + 2 * 4);
        assert_eq!(lines[1], format!("0,{T0},short,0,1,0"));
        assert_eq!(lines[8], format!("1,{},float,0,1,10", T0 + HOUR));
    }
}

mod exit_codes {
    use super::*;

    #[test]
    fn missing_price_file_exits_3() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let output = dir.path().join("list.txt");

        let code = run_args(&["pick", "-i", path_str(&missing), "-o", path_str(&output)]);
        assert_exit(code, 3);
        assert!(!output.exists());
    }

    #[test]
    fn empty_price_series_exits_3() {
        let prices = write_temp(r#"{"prices": []}"#, ".json");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("list.txt");

        let code = run_args(&["pick", "-i", path_str(prices.path()), "-o", path_str(&output)]);
        assert_exit(code, 3);
    }

    #[test]
    fn bad_config_exits_2() {
        let config = write_temp("[epochs]\nepoch_length = hourly\n", ".ini");
        let code = run_args(&["-c", path_str(config.path()), "pick"]);
        assert_exit(code, 2);
    }

    #[test]
    fn strict_malformed_log_exits_4() {
        let prices = write_temp(&market_chart_json(&hourly_samples(3, 1900.0)), ".json");
        let mut text = sample_log(2);
        text.push_str("long price: 1 zero 1000\n");
        let log = write_temp(&text, ".txt");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("records.csv");

        let args = [
            "records",
            "--prices",
            path_str(prices.path()),
            "--log",
            path_str(log.path()),
            "-o",
            path_str(&output),
        ];
        assert_exit(run_args(&args), 0);

        let mut strict = args.to_vec();
        strict.push("--strict");
        assert_exit(run_args(&strict), 4);
    }

    #[test]
    fn missing_series_exits_5() {
        let prices = write_temp(&market_chart_json(&hourly_samples(3, 1900.0)), ".json");
        let log = write_temp(&sample_log(2), ".txt");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.html");

        let code = run_args(&[
            "graph",
            "--prices",
            path_str(prices.path()),
            "--log",
            path_str(log.path()),
            "-o",
            path_str(&output),
            "--series",
            "long:1",
        ]);
        assert_exit(code, 5);
        assert!(!output.exists());
    }

    #[test]
    fn missing_log_exits_1() {
        let prices = write_temp(&market_chart_json(&hourly_samples(3, 1900.0)), ".json");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("chart.html");

        let code = run_args(&[
            "graph",
            "--prices",
            path_str(prices.path()),
            "--log",
            path_str(&dir.path().join("absent.log")),
            "-o",
            path_str(&output),
        ]);
        assert_exit(code, 1);
    }

    #[cfg(not(feature = "fetch"))]
    #[test]
    fn fetch_without_feature_exits_6() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("eth_data.json");
        let code = run_args(&["fetch", "-o", path_str(&output)]);
        assert_exit(code, 6);
    }

    #[test]
    fn overflowing_mewt_exits_2() {
        let prices = write_temp(&market_chart_json(&hourly_samples(2, 2.0)), ".json");
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("list.txt");

        let code = run_args(&[
            "pick",
            "-i",
            path_str(prices.path()),
            "-o",
            path_str(&output),
            "--mewt",
            "9223372036854775807",
        ]);
        assert_exit(code, 2);
        assert!(!output.exists());
    }

    #[test]
    fn non_positive_fetch_days_exits_2() {
        let code = run_args(&["fetch", "--days", "0"]);
        assert_exit(code, 2);
    }
}
