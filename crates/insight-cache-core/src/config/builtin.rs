use super::{FieldKind, FieldSpec, TableSpec};

pub const MAIN_PAGE_CACHE: &str = "MAIN_PAGE_CACHE";
pub const AI_INSIGHTS_CACHE: &str = "AI_INSIGHTS_CACHE";
pub const CUSTOMER_PROFILE_CACHE: &str = "CUSTOMER_PROFILE_CACHE";
pub const EXECUTIVE_SUMMARY_CACHE: &str = "EXECUTIVE_SUMMARY_CACHE";
pub const PREDICTIVE_ANALYTICS_CACHE: &str = "PREDICTIVE_ANALYTICS_CACHE";

use super::FieldKind::{Integer, Real, Text};

pub fn tables() -> Vec<TableSpec> {
    vec![
        table(MAIN_PAGE_CACHE, &[("report_type", Text)], &[]),
        table(
            AI_INSIGHTS_CACHE,
            &[
                ("report_type", Text),
                ("sub_type", Text),
                ("time_horizon", Text),
                ("category", Text),
                ("urgency_level", Text),
            ],
            &[("metric", Text), ("customers_analyzed", Integer)],
        ),
        table(
            CUSTOMER_PROFILE_CACHE,
            &[
                ("customer_id", Text),
                ("analysis_type", Text),
                ("recommendation_type", Text),
            ],
            &[
                ("ticket_count", Integer),
                ("avg_sentiment", Real),
                ("risk_score", Real),
            ],
        ),
        table(
            EXECUTIVE_SUMMARY_CACHE,
            &[
                ("report_type", Text),
                ("analysis_period", Text),
                ("financial_focus", Text),
                ("opportunity_scope", Text),
                ("time_horizon", Text),
                ("risk_category", Text),
            ],
            &[
                ("total_towers", Integer),
                ("total_customers", Integer),
                ("network_health_score", Real),
                ("customer_satisfaction", Real),
            ],
        ),
        table(
            PREDICTIVE_ANALYTICS_CACHE,
            &[
                ("analysis_type", Text),
                ("forecast_metric", Text),
                ("forecast_horizon", Text),
                ("anomaly_focus", Text),
                ("sensitivity_level", Text),
                ("maintenance_focus", Text),
                ("maintenance_window", Text),
                ("behavior_metric", Text),
                ("customer_segment", Text),
            ],
            &[("data_quality", Real), ("prediction_accuracy", Real)],
        ),
    ]
}

fn table(name: &str, identity: &[(&str, FieldKind)], metadata: &[(&str, FieldKind)]) -> TableSpec {
    let fields = identity
        .iter()
        .map(|(n, k)| FieldSpec::identity(n, *k))
        .chain(metadata.iter().map(|(n, k)| FieldSpec::metadata(n, *k)))
        .collect();
    TableSpec {
        name: name.to_string(),
        fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_fields_are_not_identity() {
        let tables = tables();
        let profile = tables
            .iter()
            .find(|t| t.name == CUSTOMER_PROFILE_CACHE)
            .unwrap();
        let identity: Vec<_> = profile.identity_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(
            identity,
            vec!["customer_id", "analysis_type", "recommendation_type"]
        );
        assert!(!profile.field("risk_score").unwrap().identity);
    }
}
