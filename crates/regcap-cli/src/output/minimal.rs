use serde_json::Value;

use super::cell;

/// Headline field of each calculator, in lookup order.
const HEADLINE_KEYS: [&str; 11] = [
    "risk_weight",
    "optimal_approach",
    "leverage_ratio",
    "rwa",
    "lcr_percent",
    "nsfr_percent",
    "mrel_ratio_rwa",
    "total_cva_capital",
    "breaches_count",
    "worst_delta_eve",
    "total_concentration",
];

/// Print just the headline value from the output, falling back to the first
/// field of the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", headline(value));
}

fn headline(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let Value::Object(map) = result else {
        return cell(result);
    };

    HEADLINE_KEYS
        .iter()
        .find_map(|key| map.get(*key).filter(|v| !v.is_null()).map(cell))
        .or_else(|| map.iter().next().map(|(key, val)| format!("{}: {}", key, cell(val))))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lcr_headline_is_percent() {
        let out = json!({"result": {"lcr": null, "lcr_percent": "inf%"}});
        assert_eq!(headline(&out), "inf%");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        let out = json!({"result": {"alpha": "1"}});
        assert_eq!(headline(&out), "alpha: 1");
    }
}
