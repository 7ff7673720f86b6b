//! Every registered rule against its own documented sample

use glint_rules::RuleRegistry;
use glint_test::{VerificationError, verify_rule_sample};

#[test]
fn all_rule_samples_verify() {
    let registry = RuleRegistry::with_builtin_rules();
    let failures: Vec<VerificationError> = registry
        .iter()
        .filter_map(|rule| verify_rule_sample(*rule).err())
        .collect();
    assert!(
        failures.is_empty(),
        "{}",
        failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n\n")
    );
}

#[test]
fn fixed_samples_are_clean_for_every_rule() {
    let registry = RuleRegistry::with_builtin_rules();
    for fixed in registry.iter().filter_map(|rule| rule.sample_fixed) {
        for rule in registry.iter() {
            // Samples stay inside their own rule's territory
            if let Err(error) = glint_test::verify_no_diagnostics(*rule, fixed) {
                panic!("{error}");
            }
        }
    }
}

#[test]
fn rule_table_listing() {
    let registry = RuleRegistry::with_builtin_rules();
    insta::assert_snapshot!(registry.render_table(), @r"
    ID       NAME                           CATEGORY SEVERITY ENABLED  FIX
    GL1001   redundant-to-array             usage    warning  yes      yes
    GL1002   materialize-before-linq        usage    warning  yes      yes
    GL1003   to-list-for-each               usage    warning  yes      yes
    GL1004   single-element-concat          usage    info     yes      yes
    GL1005   unique-non-set-collection      usage    info     no       yes
    GL1006   discard-unused-out-variable    usage    warning  yes      yes
    GL1007   redundant-spread-element       usage    info     yes      yes
    GL2001   verbose-linq-chain             style    info     yes      yes
    GL2002   inline-single-use-out-variable style    info     yes      yes
    GL2003   trailing-binary-operator       style    info     no       yes
    GL2004   negated-ternary-condition      style    info     yes      yes
    ");
}

#[test]
fn rule_table_serializes() {
    let table = RuleRegistry::with_builtin_rules().table();
    let json = serde_json::to_value(&table).unwrap();
    assert_eq!(json[0]["id"], "GL1001");
    assert_eq!(json[0]["category"], "usage");
    assert_eq!(json[4]["enabled"], false);
}
