// tests/pipeline_integration.rs

use chrono::NaiveDate;
use demand_planner::io::demand::{demo_dataset, write_sales_csv};
use demand_planner::io::loader::{load_table_file, parse_table};
use demand_planner::io::reporting::{render_order_report, run_report_json};
use demand_planner::{
    AbcClass, DailySeries, Forecast, ForecastModel, ModelKind, PlannerConfig, PlannerError,
    PlanningPipeline, Result, SafetyStockPolicy, ServiceLevel,
};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// `days` rows of `qty` for `item`, dated dd/mm/YYYY from `from`.
fn rows(item: &str, from: NaiveDate, days: usize, qty: u32) -> String {
    from.iter_days()
        .take(days)
        .map(|d| format!("{},{},{},4.5\n", d.format("%d/%m/%Y"), item, qty))
        .collect()
}

fn steady_csv() -> String {
    let mut text = String::from("Order Date,Product Name,Units Sold,Unit Price\n");
    text.push_str(&rows("WIDGET-1", start(), 90, 10));
    text.push_str(&rows("NEW-4", start() + chrono::Duration::days(87), 3, 6));
    text
}

#[test]
fn steady_seller_gets_a_tight_error_based_order() {
    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let outcome = pipeline
        .run(parse_table(&steady_csv()).unwrap(), Some("WIDGET-1"))
        .unwrap();
    let run = &outcome.run;

    assert_eq!(outcome.mapping.date_col, "Order Date");
    assert_eq!(outcome.mapping.item_col, "Product Name");
    assert_eq!(outcome.mapping.sales_col, "Units Sold");

    assert_eq!(run.series.len(), 90);
    assert!(run.series.values().iter().all(|v| *v == 10.0));
    let forecast = run.forecast.as_ref().unwrap();
    assert_eq!(forecast.horizon_len(), 30);
    assert_eq!(forecast.points().len(), 120);
    for p in forecast.points() {
        assert!((p.predicted - 10.0).abs() < 1e-6, "{} -> {}", p.date, p.predicted);
    }
    assert!(run.reliability.has_data);
    assert!(run.reliability.score > 99.0);
    assert_eq!(run.plan.policy, SafetyStockPolicy::ErrorBased);
    assert!((run.plan.horizon_demand - 300.0).abs() < 1e-3);
    assert!(run.plan.safety_stock.abs() < 1e-3);
}

#[test]
fn brand_new_item_falls_back_to_the_flat_buffer() {
    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let outcome = pipeline
        .run(parse_table(&steady_csv()).unwrap(), Some("NEW-4"))
        .unwrap();
    let run = &outcome.run;

    assert!(run.forecast.is_none());
    assert!(!run.reliability.has_data);
    assert_eq!(run.plan.policy, SafetyStockPolicy::FlatBuffer);
    assert!((run.plan.horizon_demand - 180.0).abs() < 1e-9);
    assert!((run.plan.safety_stock - 0.5 * run.plan.horizon_demand).abs() < 1e-9);
    assert!((run.plan.order_quantity - 270.0).abs() < 1e-9);

    let text = render_order_report(run, 30, start());
    assert!(text.contains("N/A (insufficient history)"));
    assert!(text.contains("RECOMMENDED ORDER: 270 units"));
}

#[test]
fn off_menu_service_level_is_a_config_error() {
    assert!(matches!(
        ServiceLevel::try_from(0.77),
        Err(PlannerError::Config(_))
    ));
    let parsed = serde_json::from_str::<PlannerConfig>(r#"{"service_level": 0.77}"#);
    assert!(parsed.is_err());
}

#[test]
fn higher_service_level_never_orders_less() {
    let table = parse_table(&steady_csv()).unwrap();
    let mut last = 0.0;
    for level in ServiceLevel::ALL {
        let config = PlannerConfig {
            service_level: level,
            ..Default::default()
        };
        let pipeline = PlanningPipeline::new(config).unwrap();
        let outcome = pipeline.run(table.clone(), Some("WIDGET-1")).unwrap();
        assert!(outcome.run.plan.order_quantity >= last);
        last = outcome.run.plan.order_quantity;
    }
}

#[test]
fn repeated_runs_are_identical() {
    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let table = parse_table(&steady_csv()).unwrap();
    let a = pipeline.run(table.clone(), Some("WIDGET-1")).unwrap();
    let b = pipeline.run(table, Some("WIDGET-1")).unwrap();
    assert_eq!(a.abc, b.abc);
    assert_eq!(a.items, b.items);
    assert_eq!(a.mapping, b.mapping);
    assert_eq!(a.run.series, b.run.series);
    assert_eq!(a.run.plan, b.run.plan);
    assert_eq!(a.run.forecast, b.run.forecast);
    assert_eq!(a.run.reliability, b.run.reliability);
}

#[test]
fn unreadable_dates_stop_the_run() {
    let text = "Date,Product,Qty\nsoon,A,1\nlater,A,2\n";
    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let err = pipeline.run(parse_table(text).unwrap(), None).unwrap_err();
    match err {
        PlannerError::DateParse { column, rows, failed } => {
            assert_eq!(column, "Date");
            assert_eq!(rows, 2);
            assert_eq!(failed, 2);
        }
        other => panic!("expected a date error, got {other:?}"),
    }
}

/// Echoes the history as its fit and projects a flat 5 per day.
#[derive(Debug)]
struct EchoModel;

impl ForecastModel for EchoModel {
    fn name(&self) -> &str {
        "echo"
    }

    fn fit_and_forecast(&self, series: &DailySeries, horizon: usize) -> Result<Forecast> {
        let mut values = series.values();
        values.extend(std::iter::repeat(5.0).take(horizon));
        Ok(Forecast::new(
            series.item.clone(),
            self.name(),
            series.first_date().unwrap_or_default(),
            series.len(),
            &values,
        ))
    }
}

#[test]
fn injected_model_drives_the_plan() {
    let pipeline =
        PlanningPipeline::with_model(PlannerConfig::default(), Box::new(EchoModel)).unwrap();
    let outcome = pipeline
        .run(parse_table(&steady_csv()).unwrap(), Some("WIDGET-1"))
        .unwrap();
    let run = &outcome.run;

    assert_eq!(run.forecast.as_ref().unwrap().model, "echo");
    assert_eq!(run.reliability.score, 100.0);
    assert_eq!(run.reliability.rmse, 0.0);
    assert_eq!(run.plan.horizon_demand, 150.0);
    assert_eq!(run.plan.safety_stock, 0.0);
    assert_eq!(run.plan.order_quantity, 150.0);
}

#[test]
fn demo_file_round_trips_through_the_pipeline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo_sales.csv");
    write_sales_csv(&path, &demo_dataset(start(), 42).unwrap()).unwrap();

    let config = PlannerConfig {
        model: ModelKind::Mean,
        ..Default::default()
    };
    let pipeline = PlanningPipeline::new(config).unwrap();
    let dataset = pipeline.prepare(load_table_file(&path).unwrap()).unwrap();
    assert_eq!(dataset.items, vec!["WIDGET-1", "GADGET-2", "GIZMO-3", "NEW-4"]);
    assert_eq!(dataset.abc.class_of("NEW-4"), AbcClass::C);
    assert_eq!(dataset.abc.len(), 4);

    let steady = pipeline.plan_item(&dataset, "WIDGET-1").unwrap();
    assert!((steady.plan.horizon_demand - 300.0).abs() < 1e-9);

    let newcomer = pipeline.plan_item(&dataset, "NEW-4").unwrap();
    assert_eq!(newcomer.plan.policy, SafetyStockPolicy::FlatBuffer);
    assert!((newcomer.plan.horizon_demand - 130.0).abs() < 1e-9);
}

#[test]
fn default_model_keeps_demo_items_near_their_run_rate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo_sales.csv");
    write_sales_csv(&path, &demo_dataset(start(), 42).unwrap()).unwrap();

    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let dataset = pipeline.prepare(load_table_file(&path).unwrap()).unwrap();
    for item in ["GADGET-2", "GIZMO-3"] {
        let run = pipeline.plan_item(&dataset, item).unwrap();
        let expected = run.series.mean() * 30.0;
        assert!(run.forecast.is_some());
        assert!(
            (run.plan.horizon_demand - expected).abs() <= 0.25 * expected,
            "{}: horizon {} vs mean x 30 = {}",
            item,
            run.plan.horizon_demand,
            expected
        );
    }
}

#[test]
fn item_without_numeric_sales_plans_zero() {
    let mut text = steady_csv();
    text.push_str("02/01/2024,GHOST-9,,4.5\n03/01/2024,GHOST-9,,4.5\n");
    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let outcome = pipeline.run(parse_table(&text).unwrap(), Some("GHOST-9")).unwrap();

    assert_eq!(outcome.run.series.values(), vec![0.0, 0.0]);
    assert_eq!(outcome.run.plan.policy, SafetyStockPolicy::FlatBuffer);
    assert_eq!(outcome.run.plan.order_quantity, 0.0);
    assert_eq!(outcome.abc.class_of("GHOST-9"), AbcClass::C);
}

#[test]
fn json_report_carries_summary_and_raw_numbers() {
    let pipeline = PlanningPipeline::new(PlannerConfig::default()).unwrap();
    let outcome = pipeline
        .run(parse_table(&steady_csv()).unwrap(), Some("NEW-4"))
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&run_report_json(&outcome).unwrap()).unwrap();

    assert_eq!(json["summary"]["item"], "NEW-4");
    assert_eq!(json["summary"]["order_quantity"], 270);
    assert!(json["summary"]["mae"].is_null());
    assert_eq!(json["outcome"]["run"]["plan"]["service_level"], 0.95);
    assert_eq!(json["outcome"]["items"][0], "WIDGET-1");
}
