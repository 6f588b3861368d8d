//! Elastigroup configuration normalization.

use serde_json::{Value, json};

const LOAD_BALANCERS_CONFIG: &str = "/compute/launchSpecification/loadBalancersConfig";
const TARGET_GROUP_ARNS: &str = "targetGroupARNs";
const LOAD_BALANCERS: &str = "loadBalancers";

/// Migrates the deprecated `targetGroupARNs` list into the canonical
/// `loadBalancers` shape. Pure; the input is cloned.
///
/// Each ARN not already present (by `arn`) in
/// `compute.launchSpecification.loadBalancersConfig.loadBalancers` is
/// appended as `{name, arn, type: "TARGET_GROUP"}`, where `name` is the
/// target-group segment of the ARN. The resulting list is only written back
/// when non-empty, and the deprecated field is removed from the result.
pub fn normalize_group_config(config: &Value) -> Value {
    let mut normalized = config.clone();

    if let Some(lb_config) = normalized
        .pointer_mut(LOAD_BALANCERS_CONFIG)
        .and_then(Value::as_object_mut)
    {
        let target_group_arns = lb_config
            .get(TARGET_GROUP_ARNS)
            .filter(|arns| !arns.is_null())
            .cloned();

        if let Some(target_group_arns) = target_group_arns {
            let mut load_balancers = lb_config
                .get(LOAD_BALANCERS)
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();

            for arn in target_group_arns
                .as_array()
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
            {
                let already_known = load_balancers.iter().any(|load_balancer| {
                    load_balancer.get("arn").and_then(Value::as_str) == Some(arn)
                });
                if already_known {
                    continue;
                }

                tracing::debug!(arn, "migrating target group ARN into loadBalancers");
                load_balancers.push(json!({
                    "name": target_group_name(arn),
                    "arn": arn,
                    "type": "TARGET_GROUP",
                }));
            }

            if !load_balancers.is_empty() {
                lb_config.insert(LOAD_BALANCERS.to_owned(), Value::Array(load_balancers));
            }
            lb_config.remove(TARGET_GROUP_ARNS);
        }
    }

    normalized
}

/// The target-group name segment of `…:targetgroup/<name>/<hash>`, falling
/// back to the whole string for ARNs without a `/`.
fn target_group_name(arn: &str) -> &str {
    arn.split('/').nth(1).unwrap_or(arn)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TG_ARN: &str =
        "arn:aws:elasticloadbalancing:us-east-1:123456789012:targetgroup/my-tg/73e2d6bc24d8a067";

    #[test]
    fn target_group_arns_become_load_balancer_entries() {
        let config = json!({
            "compute": {"launchSpecification": {"loadBalancersConfig": {
                "targetGroupARNs": [TG_ARN],
            }}},
        });

        let normalized = normalize_group_config(&config);
        assert_eq!(
            normalized,
            json!({
                "compute": {"launchSpecification": {"loadBalancersConfig": {
                    "loadBalancers": [
                        {"name": "my-tg", "arn": TG_ARN, "type": "TARGET_GROUP"},
                    ],
                }}},
            })
        );
    }

    #[test]
    fn arns_already_represented_are_not_duplicated() {
        let config = json!({
            "compute": {"launchSpecification": {"loadBalancersConfig": {
                "targetGroupARNs": [TG_ARN],
                "loadBalancers": [
                    {"name": "my-tg", "arn": TG_ARN, "type": "TARGET_GROUP"},
                ],
            }}},
        });

        let normalized = normalize_group_config(&config);
        let load_balancers = normalized
            .pointer("/compute/launchSpecification/loadBalancersConfig/loadBalancers")
            .and_then(Value::as_array)
            .expect("loadBalancers must be present");
        assert_eq!(load_balancers.len(), 1);
        assert_eq!(
            normalized.pointer("/compute/launchSpecification/loadBalancersConfig/targetGroupARNs"),
            None
        );
    }

    #[test]
    fn existing_load_balancers_are_kept_alongside_migrated_entries() {
        let config = json!({
            "compute": {"launchSpecification": {"loadBalancersConfig": {
                "targetGroupARNs": [TG_ARN],
                "loadBalancers": [
                    {"name": "classic", "type": "CLASSIC"},
                ],
            }}},
        });

        let normalized = normalize_group_config(&config);
        assert_eq!(
            normalized.pointer("/compute/launchSpecification/loadBalancersConfig/loadBalancers"),
            Some(&json!([
                {"name": "classic", "type": "CLASSIC"},
                {"name": "my-tg", "arn": TG_ARN, "type": "TARGET_GROUP"},
            ]))
        );
    }

    #[test]
    fn configs_without_the_deprecated_field_pass_through_unchanged() {
        let config = json!({
            "compute": {"launchSpecification": {"loadBalancersConfig": {
                "loadBalancers": [{"name": "classic", "type": "CLASSIC"}],
            }}},
        });

        assert_eq!(normalize_group_config(&config), config);
    }

    #[test]
    fn empty_arn_list_removes_the_field_without_writing_load_balancers() {
        let config = json!({
            "compute": {"launchSpecification": {"loadBalancersConfig": {
                "targetGroupARNs": [],
            }}},
        });

        let normalized = normalize_group_config(&config);
        assert_eq!(
            normalized,
            json!({
                "compute": {"launchSpecification": {"loadBalancersConfig": {}}},
            })
        );
    }

    #[test]
    fn arn_without_separators_falls_back_to_the_full_string() {
        assert_eq!(target_group_name("not-an-arn"), "not-an-arn");
        assert_eq!(target_group_name(TG_ARN), "my-tg");
    }
}
