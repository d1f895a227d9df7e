// src/simulation/engine.rs

use crate::analysis::abc::{classify_items, AbcAssignment, AbcClass};
use crate::analysis::dates::{parse_date_column, DateParseSummary, DatedTable};
use crate::analysis::schema::infer_mapping;
use crate::analysis::series::{build_daily_series, list_items};
use crate::error::{PlannerError, Result};
use crate::model::forecast::Forecast;
use crate::model::plan::{ReliabilityReport, ReplenishmentPlan};
use crate::model::series::DailySeries;
use crate::model::table::{ColumnMapping, RawTable};
use crate::simulation::config::{ModelKind, PlannerConfig};
use crate::strategy::engine::ForecastEngine;
use crate::strategy::implementations::{MeanModel, SeasonalTrendModel};
use crate::strategy::optimization::{DemandBasis, ReplenishmentCalculator};
use crate::strategy::reliability::score_forecast;
use crate::strategy::traits::ForecastModel;
use serde::Serialize;
use tracing::info;

/// A dataset with column roles bound, dates parsed and items classified.
///
/// Built once per upload; every item run reads from it without changing it.
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    pub mapping: ColumnMapping,
    /// Mapping guessed before any override was applied.
    pub inferred: ColumnMapping,
    pub numeric_columns: Vec<String>,
    pub dated: DatedTable,
    pub abc: AbcAssignment,
    /// Item ids in order of first appearance.
    pub items: Vec<String>,
}

/// Everything computed for one item in one run.
#[derive(Debug, Clone, Serialize)]
pub struct ItemRun {
    pub item: String,
    pub abc_class: AbcClass,
    pub series: DailySeries,
    /// `None` when the history was too short to fit a model.
    pub forecast: Option<Forecast>,
    pub reliability: ReliabilityReport,
    pub plan: ReplenishmentPlan,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub mapping: ColumnMapping,
    pub dates: DateParseSummary,
    pub items: Vec<String>,
    pub abc: AbcAssignment,
    pub run: ItemRun,
}

fn build_model(kind: ModelKind) -> Box<dyn ForecastModel> {
    match kind {
        ModelKind::Seasonal => Box::new(SeasonalTrendModel::new()),
        ModelKind::Mean => Box::new(MeanModel::new()),
    }
}

/// Runs the stages in order: schema -> dates -> ABC -> series -> forecast
/// -> reliability -> replenishment. Each stage hands an immutable value to
/// the next.
#[derive(Debug)]
pub struct PlanningPipeline {
    config: PlannerConfig,
    engine: ForecastEngine,
    calculator: ReplenishmentCalculator,
}

impl PlanningPipeline {
    /// Pipeline backed by the model named in `config`.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let model = build_model(config.model);
        Self::with_model(config, model)
    }

    /// Pipeline backed by an injected model.
    pub fn with_model(config: PlannerConfig, model: Box<dyn ForecastModel>) -> Result<Self> {
        config.validate()?;
        let engine = ForecastEngine::new(model, config.horizon_days, config.min_history_days);
        let calculator = ReplenishmentCalculator::new(config.service_level, config.fallback_buffer);
        Ok(Self {
            config,
            engine,
            calculator,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Binds column roles, parses dates and classifies items.
    ///
    /// Schema and date failures end here, before any forecasting.
    pub fn prepare(&self, table: RawTable) -> Result<PreparedDataset> {
        // =================================================================
        // PHASE 1: SCHEMA
        // =================================================================
        let numeric_columns = table.numeric_columns();
        let inferred = infer_mapping(&table.headers, &numeric_columns)?;
        let mapping = inferred.with_overrides(&self.config.columns, &table.headers, &numeric_columns)?;
        info!(
            date = %mapping.date_col,
            item = %mapping.item_col,
            sales = %mapping.sales_col,
            overridden = !self.config.columns.is_empty(),
            "column mapping"
        );

        // =================================================================
        // PHASE 2: DATES
        // =================================================================
        let dated = parse_date_column(table, &mapping.date_col, self.config.date_failure_threshold)?;
        info!(
            pass = ?dated.summary.pass,
            rows = dated.table.len(),
            dropped = dated.summary.dropped_rows,
            "dates parsed"
        );

        // =================================================================
        // PHASE 3: ITEMS + ABC
        // =================================================================
        let abc = classify_items(&dated.table, &mapping.item_col, &mapping.sales_col)?;
        let items = list_items(&dated, &mapping.item_col)?;
        if items.is_empty() {
            return Err(PlannerError::Schema(format!(
                "item column '{}' is empty in all {} rows",
                mapping.item_col,
                dated.table.len()
            )));
        }

        Ok(PreparedDataset {
            mapping,
            inferred,
            numeric_columns,
            dated,
            abc,
            items,
        })
    }

    /// Forecasts one item and sizes its order.
    pub fn plan_item(&self, dataset: &PreparedDataset, item: &str) -> Result<ItemRun> {
        if !dataset.items.iter().any(|i| i == item) {
            return Err(PlannerError::Schema(format!(
                "item '{}' not found in column '{}'",
                item, dataset.mapping.item_col
            )));
        }

        // =================================================================
        // PHASE 4: SERIES
        // =================================================================
        let series = build_daily_series(
            &dataset.dated,
            &dataset.mapping.item_col,
            &dataset.mapping.sales_col,
            item,
        )?;

        // =================================================================
        // PHASE 5: FORECAST + RELIABILITY
        // Short history is absorbed here by the calculator and nowhere else.
        // =================================================================
        let forecast = self.calculator.recover(self.engine.run(&series))?;
        let reliability = match &forecast {
            Some(f) => score_forecast(f, &series, self.config.min_scorable_points),
            None => ReliabilityReport::no_forecast(),
        };

        // =================================================================
        // PHASE 6: REPLENISHMENT
        // =================================================================
        let basis = match &forecast {
            Some(forecast) => DemandBasis::Forecast {
                forecast,
                reliability: &reliability,
            },
            None => DemandBasis::History {
                series: &series,
                horizon: self.engine.horizon(),
            },
        };
        let plan = self.calculator.plan(basis);

        Ok(ItemRun {
            item: item.to_string(),
            abc_class: dataset.abc.class_of(item),
            series,
            forecast,
            reliability,
            plan,
        })
    }

    /// Full run for one item, or for the first item in the file when none is given.
    pub fn run(&self, table: RawTable, item: Option<&str>) -> Result<RunOutcome> {
        let dataset = self.prepare(table)?;
        let item = match item {
            Some(item) => item.to_string(),
            None => dataset.items[0].clone(),
        };
        let run = self.plan_item(&dataset, &item)?;

        Ok(RunOutcome {
            mapping: dataset.mapping,
            dates: dataset.dated.summary,
            items: dataset.items,
            abc: dataset.abc,
            run,
        })
    }
}
