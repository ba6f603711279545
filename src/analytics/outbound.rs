//! Outbound campaign sizing: ARR concentration, addressable market and the
//! outreach funnel.

use std::collections::BTreeMap;

use super::{label, mean, numeric, numeric_column};
use crate::data::model::Dataset;

pub const NEW_ARR: &str = "NEW_ARR_FROM_OB_ALL_TIME";
pub const CAMPAIGN_GROUP: &str = "CAMPAIGN_GROUP";
pub const POLAR_ARR: &str = "POLAR ARR ($)";

/// Share of total new ARR that defines the "top" campaigns.
pub const PARETO_THRESHOLD: f64 = 0.8;

const FUNNEL_STAGES: &[(&str, &str)] = &[
    ("Contacts Touched", "NB_CONTACTS_TOUCHED"),
    ("Companies Touched", "NB_COMPANIES_TOUCHED"),
    ("ICP Companies Touched", "NB_COMPANIES_TOUCHED_ICP"),
    ("ICP Companies Clicked", "NB_COMPANIES_CLICKED_ICP"),
    ("ICP Companies Replied", "NB_COMPANIES_REPLIED_ICP"),
    ("ICP Positive Replies", "NB_COMPANIES_REPLIED_POSITIVE_ICP"),
];

// ---------------------------------------------------------------------------
// ARR concentration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ParetoEntry {
    pub campaign: String,
    pub arr: Option<f64>,
    pub cumulative: f64,
    /// Within the campaigns making up the first 80 % of new ARR.
    pub top: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParetoSummary {
    /// Campaigns sorted by new ARR, largest first; missing ARR last.
    pub entries: Vec<ParetoEntry>,
    pub total: f64,
    pub top_count: usize,
    /// `top_count` as a percentage of all campaigns.
    pub top_share_pct: f64,
}

pub fn arr_pareto(outbound: &Dataset) -> ParetoSummary {
    let (Some(g), Some(a)) = (outbound.column_index(CAMPAIGN_GROUP), outbound.column_index(NEW_ARR)) else {
        return ParetoSummary {
            entries: Vec::new(),
            total: 0.0,
            top_count: 0,
            top_share_pct: 0.0,
        };
    };

    let mut rows: Vec<(String, Option<f64>)> = outbound
        .rows
        .iter()
        .map(|row| (label(&row[g]).unwrap_or_default(), numeric(&row[a])))
        .collect();
    rows.sort_by(|x, y| match (x.1, y.1) {
        (Some(p), Some(q)) => q.total_cmp(&p),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let total: f64 = rows.iter().filter_map(|r| r.1).sum();
    let threshold = PARETO_THRESHOLD * total;
    let mut cumulative = 0.0;
    let entries: Vec<ParetoEntry> = rows
        .into_iter()
        .map(|(campaign, arr)| {
            cumulative += arr.unwrap_or(0.0);
            ParetoEntry {
                campaign,
                arr,
                cumulative,
                top: arr.is_some() && cumulative <= threshold,
            }
        })
        .collect();

    let top_count = entries.iter().filter(|e| e.top).count();
    let top_share_pct = if entries.is_empty() {
        0.0
    } else {
        top_count as f64 / entries.len() as f64 * 100.0
    };
    ParetoSummary {
        entries,
        total,
        top_count,
        top_share_pct,
    }
}

// ---------------------------------------------------------------------------
// Addressable market
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TamSummary {
    /// Potential ARR across qualifying Shopify merchants.
    pub total: f64,
    pub us_total: f64,
    pub us_share_pct: f64,
    /// Potential ARR per (GMV category, country).
    pub by_segment: BTreeMap<(String, String), f64>,
}

/// Potential ARR over Shopify merchants above the smallest GMV band.
pub fn tam_potential(market: &Dataset) -> TamSummary {
    let mut summary = TamSummary {
        total: 0.0,
        us_total: 0.0,
        us_share_pct: 0.0,
        by_segment: BTreeMap::new(),
    };
    let idx = |c: &str| market.column_index(c);
    let (Some(p), Some(g), Some(c), Some(a)) = (idx("PLATFORM"), idx("GMV_CATEGORY"), idx("COUNTRY"), idx(POLAR_ARR))
    else {
        return summary;
    };

    for row in &market.rows {
        let platform = row[p].as_text();
        let category = row[g].as_text();
        let Some(arr) = numeric(&row[a]).filter(|v| *v > 0.0) else {
            continue;
        };
        if platform != Some("Shopify") || category == Some("a) < $1M") {
            continue;
        }
        let country = label(&row[c]).unwrap_or_default();
        summary.total += arr;
        if country == "United States" {
            summary.us_total += arr;
        }
        *summary
            .by_segment
            .entry((label(&row[g]).unwrap_or_default(), country))
            .or_insert(0.0) += arr;
    }
    if summary.total > 0.0 {
        summary.us_share_pct = summary.us_total / summary.total * 100.0;
    }
    summary
}

// ---------------------------------------------------------------------------
// Funnel and ICP conversion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FunnelStage {
    pub label: &'static str,
    pub count: f64,
}

pub fn outreach_funnel(outbound: &Dataset) -> Vec<FunnelStage> {
    FUNNEL_STAGES
        .iter()
        .map(|&(stage, column)| FunnelStage {
            label: stage,
            count: numeric_column(outbound, column).into_iter().flatten().sum(),
        })
        .collect()
}

/// Mean per-campaign conversion of ICP companies touched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IcpRates {
    pub click_through: Option<f64>,
    pub reply: Option<f64>,
    pub positive_reply: Option<f64>,
    pub icp_touched: f64,
    pub companies_touched: f64,
}

pub fn icp_rates(outbound: &Dataset) -> IcpRates {
    let touched = numeric_column(outbound, "NB_COMPANIES_TOUCHED_ICP");
    let rate = |column: &str| {
        let num = numeric_column(outbound, column);
        mean(
            num.iter()
                .zip(&touched)
                .filter_map(|(n, d)| Some((*n)? / (*d)?)),
        )
    };
    IcpRates {
        click_through: rate("NB_COMPANIES_CLICKED_ICP"),
        reply: rate("NB_COMPANIES_REPLIED_ICP"),
        positive_reply: rate("NB_COMPANIES_REPLIED_POSITIVE_ICP"),
        icp_touched: touched.iter().flatten().sum(),
        companies_touched: numeric_column(outbound, "NB_COMPANIES_TOUCHED")
            .into_iter()
            .flatten()
            .sum(),
    }
}

/// Human-readable limitations triggered by low ICP conversion or reach.
pub fn limitations(rates: &IcpRates) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(r) = rates.click_through.filter(|r| *r < 0.2) {
        out.push(format!("Low click-through rate for ICP contacts ({r:.2})"));
    }
    if let Some(r) = rates.reply.filter(|r| *r < 0.1) {
        out.push(format!("Low reply rate from ICP contacts ({r:.2})"));
    }
    if let Some(r) = rates.positive_reply.filter(|r| *r < 0.05) {
        out.push(format!("Low positive reply rate from ICP contacts ({r:.2})"));
    }
    if rates.icp_touched < 1000.0 {
        out.push("Limited ICP data: not enough ICP companies are being contacted".to_string());
    }
    out
}

/// New outbound ARR as a percentage of the addressable market.
pub fn contribution_pct(outbound: &Dataset, tam: &TamSummary) -> Option<f64> {
    let arr: f64 = numeric_column(outbound, NEW_ARR).into_iter().flatten().sum();
    (tam.total > 0.0).then(|| arr / tam.total * 100.0)
}
