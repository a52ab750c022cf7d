use crate::config::{CacheConfig, PAYLOAD_PARAMS};
use crate::errors::CacheError;
use crate::model::{ParamValue, Params};
use std::collections::BTreeMap;

/// Selects the parameters that identify an entry of `table`.
///
/// Unknown tables have no identity fields, so every call against them
/// filters down to the empty map.
pub fn filter_identity_params<'a>(
    config: &CacheConfig,
    table: &str,
    params: &'a Params,
) -> BTreeMap<&'a str, &'a ParamValue> {
    let Some(spec) = config.table(table) else {
        return BTreeMap::new();
    };
    params
        .iter()
        .filter(|(name, _)| !PAYLOAD_PARAMS.contains(name))
        .filter(|(name, _)| spec.identity_fields().any(|f| f.name == *name))
        .collect()
}

/// JSON has no spelling for NaN or infinity; serde_json writes them as
/// `null`, which would hash them onto the "not specified" key.
pub fn ensure_finite_identity(
    config: &CacheConfig,
    table: &str,
    params: &Params,
) -> Result<(), CacheError> {
    for (name, value) in filter_identity_params(config, table, params) {
        if let ParamValue::Float(v) = value {
            if !v.is_finite() {
                return Err(CacheError::NonFiniteParam {
                    field: name.to_string(),
                    value: *v,
                });
            }
        }
    }
    Ok(())
}

/// Canonical text form of the identity subset: compact JSON, keys sorted.
pub fn canonical_identity(config: &CacheConfig, table: &str, params: &Params) -> String {
    let filtered = filter_identity_params(config, table, params);
    // BTreeMap<&str, &ParamValue> serialises infallibly.
    serde_json::to_string(&filtered).unwrap_or_default()
}

/// 32-char lowercase hex digest identifying one cache row.
pub fn generate_key(config: &CacheConfig, table: &str, params: &Params) -> String {
    let canonical = canonical_identity(config, table, params);
    format!("{:x}", md5::compute(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::builtin::{AI_INSIGHTS_CACHE, CUSTOMER_PROFILE_CACHE, MAIN_PAGE_CACHE};

    #[test]
    fn canonical_form_sorts_and_drops_extras() {
        let cfg = CacheConfig::builtin();
        let p = Params::new()
            .with("urgency_level", "high")
            .with("report_type", "executive")
            .with("customers_analyzed", 120i64)
            .with("sub_type", ParamValue::Null);
        assert_eq!(
            canonical_identity(&cfg, AI_INSIGHTS_CACHE, &p),
            r#"{"report_type":"executive","sub_type":null,"urgency_level":"high"}"#
        );
    }

    #[test]
    fn key_is_fixed_length_lower_hex() {
        let cfg = CacheConfig::builtin();
        let key = generate_key(&cfg, MAIN_PAGE_CACHE, &Params::new().with("report_type", "x"));
        assert_eq!(key.len(), 32);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn empty_identity_hashes_empty_object() {
        let cfg = CacheConfig::builtin();
        let key = generate_key(&cfg, "NOT_A_REAL_TABLE", &Params::new());
        assert_eq!(key, format!("{:x}", md5::compute(b"{}")));
    }

    #[test]
    fn non_finite_identity_floats_are_rejected() {
        let cfg = CacheConfig::builtin();
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let p = Params::new().with("customer_id", "C-1").with("risk_score", bad);
            // risk_score is metadata on this table, so it never reaches the key.
            assert!(ensure_finite_identity(&cfg, CUSTOMER_PROFILE_CACHE, &p).is_ok());

            let p = Params::new().with("report_type", bad);
            let err = ensure_finite_identity(&cfg, MAIN_PAGE_CACHE, &p).unwrap_err();
            assert!(err.to_string().contains("report_type"), "{}", err);
        }
        let ok = Params::new().with("report_type", 0.5);
        assert!(ensure_finite_identity(&cfg, MAIN_PAGE_CACHE, &ok).is_ok());
    }

    #[test]
    fn payload_names_never_enter_identity() {
        let mut cfg = CacheConfig::builtin();
        // Bypass validation on purpose: a hand-built table that lists a payload name.
        cfg.tables[0]
            .fields
            .push(crate::config::FieldSpec::identity("ai_model", crate::config::FieldKind::Text));
        let a = Params::new().with("report_type", "r").with("ai_model", "m1");
        let b = Params::new().with("report_type", "r").with("ai_model", "m2");
        assert_eq!(
            generate_key(&cfg, MAIN_PAGE_CACHE, &a),
            generate_key(&cfg, MAIN_PAGE_CACHE, &b)
        );
    }
}
