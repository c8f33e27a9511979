//! Explicit aggregation plans: which rule(s) apply to which column when a frame is grouped.

use crate::processing::error::ProcessingError;
use crate::types::columns::{aggregated_column, neighbor_column, neighbor_precip_column};
use crate::types::observation::Indicator;
use polars::prelude::{col, Expr, SortOptions};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a group of values collapses to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationRule {
    Mean,
    Min,
    Max,
    /// Most frequent non-null value. Ties resolve to the smallest value in the column's
    /// natural sort order.
    Mode,
}

impl AggregationRule {
    pub fn suffix(&self) -> &'static str {
        match self {
            AggregationRule::Mean => "mean",
            AggregationRule::Min => "min",
            AggregationRule::Max => "max",
            AggregationRule::Mode => "mode",
        }
    }

    /// The aggregation expression over `column`, to be used inside `agg`.
    pub fn expr(&self, column: &str) -> Expr {
        match self {
            AggregationRule::Mean => col(column).mean(),
            AggregationRule::Min => col(column).min(),
            AggregationRule::Max => col(column).max(),
            AggregationRule::Mode => col(column)
                .drop_nulls()
                .mode()
                .sort(SortOptions::default())
                .first(),
        }
    }
}

impl fmt::Display for AggregationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// Output column naming of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnNaming {
    /// Aggregated columns keep the input name. Only one rule per column is allowed.
    Keep,
    /// Aggregated columns are named `<column>_<rule>`.
    Suffixed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAggregation {
    pub column: String,
    pub rules: Vec<AggregationRule>,
}

/// An ordered mapping of column name to aggregation rules.
///
/// Output columns appear in plan order, and within a column in rule order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationPlan {
    naming: ColumnNaming,
    columns: Vec<ColumnAggregation>,
}

impl AggregationPlan {
    pub fn new(naming: ColumnNaming) -> Self {
        Self {
            naming,
            columns: Vec::new(),
        }
    }

    /// Adds (or replaces) the rules for `column`.
    pub fn with(mut self, column: impl Into<String>, rules: &[AggregationRule]) -> Self {
        let column = column.into();
        let rules = rules.to_vec();
        match self.columns.iter_mut().find(|c| c.column == column) {
            Some(existing) => existing.rules = rules,
            None => self.columns.push(ColumnAggregation { column, rules }),
        }
        self
    }

    /// The cell/hour plan: mean of every indicator, mode of every neighbor id slot.
    pub fn hourly(neighbor_slots: usize) -> Self {
        let plan = Indicator::ALL
            .iter()
            .fold(Self::new(ColumnNaming::Keep), |plan, indicator| {
                plan.with(indicator.column(), &[AggregationRule::Mean])
            });
        (0..neighbor_slots).fold(plan, |plan, slot| {
            plan.with(neighbor_column(slot), &[AggregationRule::Mode])
        })
    }

    /// The cell/date plan: min, max and mean of precipitation, mean of every other
    /// indicator and of every neighbor precipitation column.
    pub fn daily(neighbor_slots: usize) -> Self {
        let plan = Indicator::ALL
            .iter()
            .fold(Self::new(ColumnNaming::Suffixed), |plan, indicator| {
                let rules: &[AggregationRule] = match indicator {
                    Indicator::Precipitation => &[
                        AggregationRule::Min,
                        AggregationRule::Max,
                        AggregationRule::Mean,
                    ],
                    _ => &[AggregationRule::Mean],
                };
                plan.with(indicator.column(), rules)
            });
        (0..neighbor_slots).fold(plan, |plan, slot| {
            plan.with(neighbor_precip_column(slot), &[AggregationRule::Mean])
        })
    }

    pub fn naming(&self) -> ColumnNaming {
        self.naming
    }

    pub fn columns(&self) -> &[ColumnAggregation] {
        &self.columns
    }

    /// Input columns the plan aggregates with `rule`.
    pub fn columns_with(&self, rule: AggregationRule) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.rules.contains(&rule))
            .map(|c| c.column.as_str())
            .collect()
    }

    /// Output column name for `rule` applied to `column`.
    pub fn output_name(&self, column: &str, rule: AggregationRule) -> String {
        match self.naming {
            ColumnNaming::Keep => column.to_string(),
            ColumnNaming::Suffixed => aggregated_column(column, rule.suffix()),
        }
    }

    /// All output column names in plan order.
    pub fn output_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .flat_map(|c| c.rules.iter().map(|rule| self.output_name(&c.column, *rule)))
            .collect()
    }

    /// Builds the aggregation expressions, validating the plan first.
    pub fn exprs(&self) -> Result<Vec<Expr>, ProcessingError> {
        if self.columns.iter().all(|c| c.rules.is_empty()) {
            return Err(ProcessingError::EmptyAggregation);
        }
        if self.naming == ColumnNaming::Keep {
            if let Some(ambiguous) = self.columns.iter().find(|c| c.rules.len() > 1) {
                return Err(ProcessingError::AmbiguousAggregation {
                    column: ambiguous.column.clone(),
                });
            }
        }
        Ok(self
            .columns
            .iter()
            .flat_map(|c| {
                c.rules.iter().map(|rule| {
                    rule.expr(&c.column)
                        .alias(self.output_name(&c.column, *rule).as_str())
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_plan_output_names() {
        let names = AggregationPlan::daily(3).output_names();
        assert_eq!(&names[..2], &["wind_direction_mean", "wind_speed_mean"]);
        assert!(names.contains(&"precipitation_min".to_string()));
        assert!(names.contains(&"precipitation_max".to_string()));
        assert!(names.contains(&"precipitation_mean".to_string()));
        assert!(names.contains(&"neighbor_2_precip_mean".to_string()));
        assert_eq!(names.len(), 6 + 3 + 3);
    }

    #[test]
    fn test_hourly_plan_keeps_names() {
        let plan = AggregationPlan::hourly(2);
        assert_eq!(plan.columns_with(AggregationRule::Mode), vec!["neighbor_0", "neighbor_1"]);
        assert_eq!(plan.output_name("precipitation", AggregationRule::Mean), "precipitation");
        assert!(plan.exprs().is_ok());
    }

    #[test]
    fn test_keep_naming_rejects_multiple_rules() {
        let plan = AggregationPlan::new(ColumnNaming::Keep)
            .with("precipitation", &[AggregationRule::Min, AggregationRule::Max]);
        assert!(matches!(
            plan.exprs(),
            Err(ProcessingError::AmbiguousAggregation { column }) if column == "precipitation"
        ));
    }

    #[test]
    fn test_with_replaces_existing_rules() {
        let plan = AggregationPlan::new(ColumnNaming::Suffixed)
            .with("temperature", &[AggregationRule::Mean])
            .with("temperature", &[AggregationRule::Max]);
        assert_eq!(plan.output_names(), vec!["temperature_max"]);
    }

    #[test]
    fn test_empty_plan_is_rejected() {
        let plan = AggregationPlan::new(ColumnNaming::Suffixed);
        assert!(matches!(plan.exprs(), Err(ProcessingError::EmptyAggregation)));
    }
}
