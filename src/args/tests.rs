use std::time::Duration;

use clap::Parser;

use super::HarnessArgs;
use super::parsers::parse_duration_arg;

fn parse_args(args: &[&str]) -> Result<HarnessArgs, String> {
    let mut full = vec!["trackload"];
    full.extend_from_slice(args);
    HarnessArgs::try_parse_from(full).map_err(|err| format!("parse failed: {}", err))
}

#[test]
fn defaults_match_documented_surface() -> Result<(), String> {
    let args = parse_args(&["-u", "http://localhost:8080"])?;
    if args.target_url != "http://localhost:8080" {
        return Err(format!("unexpected target url: {}", args.target_url));
    }
    if args.events.get() != 1 || args.movers_per_event != 10 || args.watchers_per_event != 0 {
        return Err("unexpected population defaults".to_owned());
    }
    if args.update_interval != Duration::from_secs(3) {
        return Err(format!("unexpected interval: {:?}", args.update_interval));
    }
    if args.buffer_size.get() != 1000 {
        return Err(format!("unexpected buffer size: {}", args.buffer_size));
    }
    if args.mover_metrics_file != "mover-metrics.csv"
        || args.watcher_metrics_file != "watcher-metrics.csv"
    {
        return Err("unexpected metrics file defaults".to_owned());
    }
    if args.duration.is_some() || !args.event_ids.is_empty() || args.verbose {
        return Err("unexpected optional defaults".to_owned());
    }
    Ok(())
}

#[test]
fn event_ids_split_on_commas() -> Result<(), String> {
    let args = parse_args(&[
        "-u",
        "http://localhost:8080",
        "--events",
        "2",
        "--event-ids",
        "alpha, beta",
    ])?;
    if args.event_ids != vec!["alpha".to_owned(), " beta".to_owned()] {
        return Err(format!("unexpected event ids: {:?}", args.event_ids));
    }
    Ok(())
}

#[test]
fn target_url_is_required() -> Result<(), String> {
    if parse_args(&["--events", "2"]).is_ok() {
        return Err("missing --target-url accepted".to_owned());
    }
    Ok(())
}

#[test]
fn zero_events_rejected() -> Result<(), String> {
    if parse_args(&["-u", "http://localhost:8080", "--events", "0"]).is_ok() {
        return Err("--events 0 accepted".to_owned());
    }
    Ok(())
}

#[test]
fn duration_units_parse() -> Result<(), String> {
    let cases = [
        ("500ms", Duration::from_millis(500)),
        ("3s", Duration::from_secs(3)),
        ("45", Duration::from_secs(45)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed =
            parse_duration_arg(input).map_err(|err| format!("parse {} failed: {}", input, err))?;
        if parsed != expected {
            return Err(format!("{} parsed as {:?}", input, parsed));
        }
    }
    Ok(())
}

#[test]
fn bad_durations_rejected() -> Result<(), String> {
    for input in ["", "abc", "10x", "0s", "0"] {
        if parse_duration_arg(input).is_ok() {
            return Err(format!("invalid duration '{}' accepted", input));
        }
    }
    Ok(())
}
