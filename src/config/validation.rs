//! Config validation: unknown-key detection with Levenshtein suggestions
//! and operating-range warnings.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::RBIConfig;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Tables whose children are free-form map keys (equipment / service names).
///
/// Anything below these prefixes is accepted without a typo check.
pub const MAP_TABLES: &[&str] = &[
    "level1.equipment_multipliers",
    "service_risk",
    "equipment_consequence",
];

/// Returns the complete set of valid dotted key paths for RBIConfig.
///
/// Maintained manually to match the struct hierarchy in rbi_config.rs.
/// Array-of-table entries (`risk_categories`, `*_bands`) are listed by
/// their array key only; their contents are checked by serde.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [intervals]
        "intervals",
        "intervals.min_interval_months",
        "intervals.max_interval_months",
        // [level1]
        "level1",
        "level1.base_interval_months",
        "level1.confidence",
        "level1.risk_categories",
        "level1.equipment_multipliers",
        // [level2]
        "level2",
        "level2.base_interval_months",
        "level2.confidence",
        "level2.risk_categories",
        "level2.coating_weight",
        "level2.damage_weight",
        "level2.age_weight",
        "level2.damage_score_per_mechanism",
        "level2.age_bands",
        "level2.default_age_years",
        // [level3]
        "level3",
        "level3.base_interval_months",
        "level3.confidence",
        "level3.risk_categories",
        "level3.remaining_life_bands",
        "level3.remaining_life_fraction",
        // [level4]
        "level4",
        "level4.base_interval_months",
        "level4.confidence",
        "level4.risk_categories",
        "level4.criticality_multipliers",
        "level4.criticality_multipliers.low",
        "level4.criticality_multipliers.medium",
        "level4.criticality_multipliers.high",
        "level4.criticality_multipliers.critical",
        // [fallback]
        "fallback",
        "fallback.adjustment_factor",
        "fallback.confidence_reduction",
        "fallback.confidence_floor",
        "fallback.interval_multiplier_floor",
        // [corrosion]
        "corrosion",
        "corrosion.min_corrosion_rate_mm_per_year",
        // [data_quality]
        "data_quality",
        "data_quality.staleness_threshold_days",
        "data_quality.staleness_penalty",
        "data_quality.weights",
        "data_quality.weights.equipment_type",
        "data_quality.weights.service_type",
        "data_quality.weights.installation_date",
        "data_quality.weights.design_data",
        "data_quality.weights.material",
        "data_quality.weights.criticality_level",
        "data_quality.weights.thickness_measurements",
        "data_quality.weights.corrosion_rate",
        "data_quality.weights.coating_condition",
        "data_quality.weights.damage_mechanisms",
        "data_quality.weights.inspection_quality",
        "data_quality.weights.last_inspection_date",
        // [service_risk.*], [equipment_consequence]
        "service_risk",
        "equipment_consequence",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

fn is_under_map_table(key: &str) -> bool {
    MAP_TABLES.iter().any(|table| {
        key.strip_prefix(table)
            .is_some_and(|rest| rest.starts_with('.'))
    })
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Compute the Levenshtein edit distance between two strings.
fn levenshtein(a: &str, b: &str) -> usize {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0; b_len + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.chars().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;
    for &k in known {
        let dist = levenshtein(unknown, k);
        if dist > 3 {
            continue;
        }
        // Ties broken lexically so suggestions are stable across runs
        let better = match best {
            None => true,
            Some((best_key, best_dist)) => dist < best_dist || (dist == best_dist && k < best_key),
        };
        if better {
            best = Some((k, dist));
        }
    }
    best.map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys, it only warns. Existing configs
/// always continue to work.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if known.contains(key.as_str()) || is_under_map_table(&key) {
            continue;
        }
        let suggestion = suggest_correction(&key, &known);
        warnings.push(ValidationWarning {
            message: format!("Unknown config key '{key}'"),
            field: key,
            suggestion,
        });
    }

    warnings
}

// ============================================================================
// Operating Range Warnings
// ============================================================================

/// Flag legal but unusual values on a parsed RBIConfig.
///
/// Hard errors live in `RBIConfig::validate()`; these only warn.
pub fn validate_operating_ranges(config: &RBIConfig) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Intervals beyond 20 years are unusual for pressure equipment
    if config.intervals.max_interval_months > 240.0 {
        warnings.push(ValidationWarning {
            field: "intervals.max_interval_months".to_string(),
            message: format!(
                "max_interval_months = {:.0} exceeds typical maximum (240 months)",
                config.intervals.max_interval_months
            ),
            suggestion: None,
        });
    }

    // A factor close to 1.0 makes fallback almost free
    if config.fallback.adjustment_factor > 0.95 {
        warnings.push(ValidationWarning {
            field: "fallback.adjustment_factor".to_string(),
            message: format!(
                "adjustment_factor = {:.2} applies almost no conservatism on fallback",
                config.fallback.adjustment_factor
            ),
            suggestion: None,
        });
    }

    // Derived rates above 1 mm/year as a floor would dominate every Level 3 result
    if config.corrosion.min_corrosion_rate_mm_per_year > 1.0 {
        warnings.push(ValidationWarning {
            field: "corrosion.min_corrosion_rate_mm_per_year".to_string(),
            message: format!(
                "min_corrosion_rate_mm_per_year = {:.2} is outside typical range (0.001-1.0)",
                config.corrosion.min_corrosion_rate_mm_per_year
            ),
            suggestion: None,
        });
    }

    if config.data_quality.staleness_threshold_days > 3650 {
        warnings.push(ValidationWarning {
            field: "data_quality.staleness_threshold_days".to_string(),
            message: format!(
                "staleness_threshold_days = {} treats decade-old measurements as current",
                config.data_quality.staleness_threshold_days
            ),
            suggestion: None,
        });
    }

    warnings
}

// ============================================================================
// Tests
// ============================================================================
