//! Multi-touch attribution summaries over the pixel-derived tables.
//!
//! These read the parsed tables as loaded, since source, store and referrer
//! labels are free text that numeric coercion would discard.

use std::collections::{BTreeMap, BTreeSet};

use super::{label, numeric};
use crate::data::model::Dataset;

pub const SOURCE: &str = "ATTRIBUTION_SOURCE";
pub const MONTH: &str = "MONTH";
pub const ORDERS: &str = "ATTRIBUTED_ORDERS";
pub const REVENUE: &str = "ATTRIBUTED_REVENUE";
pub const REFERRER: &str = "PAGEREFERRER";
pub const TOUCHPOINT_STEP: &str = "TOUCHPOINT_STEP";
pub const ORDER_ID: &str = "SHOPIFYORDERID";

/// Touchpoint steps at or beyond this are left out of the funnel.
pub const MAX_FUNNEL_STEP: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttributionMetric {
    #[default]
    Orders,
    Revenue,
}

impl AttributionMetric {
    pub fn column(self) -> &'static str {
        match self {
            AttributionMetric::Orders => ORDERS,
            AttributionMetric::Revenue => REVENUE,
        }
    }
}

/// Series keyed by x label, then by series name.
pub type StackedSeries = BTreeMap<String, BTreeMap<String, f64>>;

fn stacked(ds: &Dataset, x_col: &str, series_col: &str, value_col: &str) -> StackedSeries {
    let mut out = StackedSeries::new();
    let idx = |c: &str| ds.column_index(c);
    let (Some(x), Some(s), Some(v)) = (idx(x_col), idx(series_col), idx(value_col)) else {
        return out;
    };
    for row in &ds.rows {
        let (Some(xk), Some(sk)) = (label(&row[x]), label(&row[s])) else {
            continue;
        };
        *out.entry(xk).or_default().entry(sk).or_insert(0.0) += numeric(&row[v]).unwrap_or(0.0);
    }
    out
}

/// Order count per month, split by store.
pub fn orders_per_month_store(orders: &Dataset) -> StackedSeries {
    stacked(orders, MONTH, "STORE", "ORDER_COUNT")
}

/// Attributed orders or revenue per month, split by source.
pub fn monthly_by_source(model: &Dataset, metric: AttributionMetric) -> StackedSeries {
    stacked(model, MONTH, SOURCE, metric.column())
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceShare {
    pub source: String,
    pub orders: f64,
    pub pct: f64,
}

/// Each source's share of attributed orders, largest first.
pub fn source_shares(model: &Dataset) -> Vec<SourceShare> {
    let sums = super::group_sum(model, SOURCE, ORDERS);
    let total: f64 = sums.values().sum();
    let mut out: Vec<SourceShare> = sums
        .into_iter()
        .map(|(source, orders)| SourceShare {
            source,
            orders,
            pct: if total > 0.0 { orders / total * 100.0 } else { 0.0 },
        })
        .collect();
    out.sort_by(|a, b| b.orders.total_cmp(&a.orders).then_with(|| a.source.cmp(&b.source)));
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferrerTotals {
    pub referrer: String,
    pub orders: f64,
    pub revenue: f64,
}

/// Orders and revenue per page referrer, by orders then revenue, descending.
pub fn referrer_contribution(model: &Dataset) -> Vec<ReferrerTotals> {
    let orders = super::group_sum(model, REFERRER, ORDERS);
    let revenue = super::group_sum(model, REFERRER, REVENUE);
    let mut out: Vec<ReferrerTotals> = orders
        .into_iter()
        .map(|(referrer, orders)| {
            let revenue = revenue.get(&referrer).copied().unwrap_or(0.0);
            ReferrerTotals {
                referrer,
                orders,
                revenue,
            }
        })
        .collect();
    out.sort_by(|a, b| {
        b.orders
            .total_cmp(&a.orders)
            .then_with(|| b.revenue.total_cmp(&a.revenue))
    });
    out
}

fn step_of(value: &crate::data::model::Value) -> Option<i64> {
    numeric(value).filter(|v| v.fract() == 0.0).map(|v| v as i64)
}

/// Distinct orders per (touchpoint step, source).
pub fn touchpoint_orders(cjm: &Dataset) -> BTreeMap<i64, BTreeMap<String, usize>> {
    let mut sets: BTreeMap<i64, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();
    let idx = |c: &str| cjm.column_index(c);
    let (Some(st), Some(src), Some(id)) = (idx(TOUCHPOINT_STEP), idx(SOURCE), idx(ORDER_ID)) else {
        return BTreeMap::new();
    };
    for row in &cjm.rows {
        let (Some(step), Some(source), Some(order)) = (step_of(&row[st]), label(&row[src]), label(&row[id])) else {
            continue;
        };
        sets.entry(step)
            .or_default()
            .entry(source)
            .or_default()
            .insert(order);
    }
    sets.into_iter()
        .map(|(step, by_source)| {
            let counts = by_source.into_iter().map(|(s, ids)| (s, ids.len())).collect();
            (step, counts)
        })
        .collect()
}

/// Distinct orders reaching each touchpoint step below [`MAX_FUNNEL_STEP`]
/// for one source.
pub fn touchpoint_funnel(cjm: &Dataset, source: &str) -> Vec<(i64, usize)> {
    touchpoint_orders(cjm)
        .into_iter()
        .filter(|(step, _)| *step < MAX_FUNNEL_STEP)
        .filter_map(|(step, by_source)| by_source.get(source).map(|n| (step, *n)))
        .collect()
}

/// Distinct attribution sources present in a table, sorted.
pub fn sources(ds: &Dataset) -> Vec<String> {
    ds.column_values(SOURCE)
        .map(|cells| cells.filter_map(label).collect::<BTreeSet<_>>().into_iter().collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Value;

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    fn model() -> Dataset {
        let row = |m: &str, s: &str, r: &str, o: i64, rev: f64| {
            vec![text(m), text(s), text(r), Value::Integer(o), Value::Float(rev)]
        };
        Dataset::new(
            "attribution_model_90",
            vec![MONTH.into(), SOURCE.into(), REFERRER.into(), ORDERS.into(), REVENUE.into()],
            vec![
                row("2022-11-01", "direct", "/home", 30, 900.0),
                row("2022-11-01", "referral", "/home", 50, 1000.0),
                row("2022-12-01", "referral", "/blog", 20, 800.0),
            ],
        )
    }

    #[test]
    fn shares_sum_to_hundred() {
        let shares = source_shares(&model());
        assert_eq!(shares[0].source, "referral");
        assert_eq!(shares[0].pct, 70.0);
        assert_eq!(shares.iter().map(|s| s.pct).sum::<f64>(), 100.0);
    }

    #[test]
    fn monthly_revenue_by_source() {
        let series = monthly_by_source(&model(), AttributionMetric::Revenue);
        assert_eq!(series["2022-11-01"]["direct"], 900.0);
        assert_eq!(series["2022-12-01"].len(), 1);
    }

    #[test]
    fn referrers_sorted_by_orders() {
        let refs = referrer_contribution(&model());
        assert_eq!(refs[0].referrer, "/home");
        assert_eq!(refs[0].orders, 80.0);
        assert_eq!(refs[0].revenue, 1900.0);
    }

    #[test]
    fn touchpoints_count_distinct_orders() {
        let row = |step: i64, s: &str, id: Option<&str>| {
            vec![Value::Integer(step), text(s), id.map(text).unwrap_or(Value::Null)]
        };
        let cjm = Dataset::new(
            "attribution_cjm",
            vec![TOUCHPOINT_STEP.into(), SOURCE.into(), ORDER_ID.into()],
            vec![
                row(1, "direct", Some("A")),
                row(1, "direct", Some("A")),
                row(1, "direct", Some("B")),
                row(2, "direct", Some("A")),
                row(1, "google", None),
                row(12, "direct", Some("C")),
            ],
        );
        let by_step = touchpoint_orders(&cjm);
        assert_eq!(by_step[&1]["direct"], 2);
        assert!(!by_step[&1].contains_key("google"));

        assert_eq!(touchpoint_funnel(&cjm, "direct"), vec![(1, 2), (2, 1)]);
        assert_eq!(sources(&cjm), vec!["direct".to_string(), "google".to_string()]);
    }
}
