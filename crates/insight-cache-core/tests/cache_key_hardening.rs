use insight_cache_core::cache::key::{filter_identity_params, generate_key};
use insight_cache_core::config::builtin::{
    AI_INSIGHTS_CACHE, CUSTOMER_PROFILE_CACHE, EXECUTIVE_SUMMARY_CACHE, MAIN_PAGE_CACHE,
};
use insight_cache_core::{CacheConfig, ParamValue, Params};

#[test]
fn test_key_ignores_order_and_extra_params() {
    let cfg = CacheConfig::builtin();

    let a: Params = vec![
        ("report_type", ParamValue::from("executive_report")),
        ("time_horizon", ParamValue::from("30d")),
        ("sub_type", ParamValue::Null),
    ]
    .into_iter()
    .collect();

    let b: Params = vec![
        ("sub_type", ParamValue::Null),
        ("customers_analyzed", ParamValue::from(812i64)),
        ("time_horizon", ParamValue::from("30d")),
        ("page", ParamValue::from("insights")),
        ("report_type", ParamValue::from("executive_report")),
    ]
    .into_iter()
    .collect();

    assert_eq!(
        generate_key(&cfg, AI_INSIGHTS_CACHE, &a),
        generate_key(&cfg, AI_INSIGHTS_CACHE, &b),
        "non-identity params must not affect the key"
    );
}

#[test]
fn test_key_sensitive_to_each_identity_field() {
    let cfg = CacheConfig::builtin();
    let table = cfg.table(EXECUTIVE_SUMMARY_CACHE).unwrap();

    let base: Params = table
        .identity_fields()
        .map(|f| (f.name.clone(), ParamValue::from("base")))
        .collect();
    let base_key = generate_key(&cfg, EXECUTIVE_SUMMARY_CACHE, &base);

    for field in table.identity_fields() {
        let changed = base.clone().with(field.name.clone(), "changed");
        assert_ne!(
            generate_key(&cfg, EXECUTIVE_SUMMARY_CACHE, &changed),
            base_key,
            "changing {} must change the key",
            field.name
        );
    }
}

#[test]
fn test_null_distinct_from_empty_and_absent_equal_to_nothing() {
    let cfg = CacheConfig::builtin();
    let null = Params::new().with("report_type", ParamValue::Null);
    let empty = Params::new().with("report_type", "");
    let absent = Params::new();

    let k_null = generate_key(&cfg, MAIN_PAGE_CACHE, &null);
    let k_empty = generate_key(&cfg, MAIN_PAGE_CACHE, &empty);
    let k_absent = generate_key(&cfg, MAIN_PAGE_CACHE, &absent);

    assert_ne!(k_null, k_empty);
    assert_ne!(k_null, k_absent);
    assert_ne!(k_empty, k_absent);
}

#[test]
fn test_value_types_are_stable() {
    let cfg = CacheConfig::builtin();
    let text = Params::new().with("customer_id", "1001");
    let int = Params::new().with("customer_id", 1001i64);
    assert_ne!(
        generate_key(&cfg, CUSTOMER_PROFILE_CACHE, &text),
        generate_key(&cfg, CUSTOMER_PROFILE_CACHE, &int)
    );
    assert_eq!(
        generate_key(&cfg, CUSTOMER_PROFILE_CACHE, &int),
        generate_key(&cfg, CUSTOMER_PROFILE_CACHE, &int.clone())
    );
}

#[test]
fn test_same_params_different_tables_share_identity_subset() {
    // Keys are per table; the same identity subset hashes identically,
    // but rows live in separate tables so they never collide.
    let cfg = CacheConfig::builtin();
    let p = Params::new().with("report_type", "executive_report");
    let main = filter_identity_params(&cfg, MAIN_PAGE_CACHE, &p);
    let insights = filter_identity_params(&cfg, AI_INSIGHTS_CACHE, &p);
    assert_eq!(main, insights);
}

#[test]
fn test_unrecognized_table_collapses_to_single_key() {
    let cfg = CacheConfig::builtin();
    let a = Params::new().with("a", 1i64).with("b", 2i64);
    let c = Params::new().with("c", 3i64);
    assert!(filter_identity_params(&cfg, "NOT_A_REAL_TABLE", &a).is_empty());
    assert_eq!(
        generate_key(&cfg, "NOT_A_REAL_TABLE", &a),
        generate_key(&cfg, "NOT_A_REAL_TABLE", &c)
    );
}
