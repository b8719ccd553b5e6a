//! Integration tests for zt-agent
//!
//! These tests verify the interaction between different modules.

use zt_agent::config::{Config, NetworkDeclaration, TomlConfig};
use zt_agent::reconcile::{plan, Action};
use zt_agent::report::{Outcome, RunReport};

fn declaration() -> NetworkDeclaration {
    NetworkDeclaration {
        api_key: Some("token".to_string()),
        ..NetworkDeclaration::default()
    }
}

#[test]
fn test_config_integration() {
    // Test that a declaration set can be created and validated
    let mut config = Config::new();
    config.add_network("8056c2e21c000001".to_string(), declaration());

    assert_eq!(config.networks.len(), 1);
    assert!(config.get_network("8056c2e21c000001").is_some());
    assert!(config.validate().is_ok());
}

#[test]
fn test_toml_to_plan_integration() {
    // A parsed declarations file drives the plan directly
    let toml = r#"
        [networks.8056c2e21c000001]
        api_key = "token"

        [networks.8056c2e21c000001.config]
        authorized = true

        [networks.aaaaaaaaaaaaaaaa]
        enabled = false
    "#;

    let config: Config = TomlConfig::parse(toml).unwrap().try_into().unwrap();
    config.validate().unwrap();

    // Host is currently a member of the disabled network only
    let joined = vec!["aaaaaaaaaaaaaaaa".to_string()];
    let steps = plan(&config, &joined);

    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].network, "aaaaaaaaaaaaaaaa");
    assert_eq!(steps[0].action, Action::Leave);
    assert_eq!(steps[1].network, "8056c2e21c000001");
    assert_eq!(steps[1].action, Action::Join);
    assert_eq!(steps[2].action, Action::Sync);
}

#[test]
fn test_report_integration() {
    // Outcomes roll up into the operator-facing summary
    let mut report = RunReport::new();
    report.record("8056c2e21c000001", Outcome::JoinedAndUpdated);
    report.record("aaaaaaaaaaaaaaaa", Outcome::Left);

    assert!(report.changed());
    assert!(!report.failed());

    let text = report.to_string();
    assert!(text.contains("8056c2e21c000001: joined+updated"));
    assert!(text.contains("aaaaaaaaaaaaaaaa: left"));
    assert!(text.ends_with("result: changed"));
}

#[test]
fn test_converged_host_plans_only_syncs() {
    let mut config = Config::new();
    config.add_network("8056c2e21c000001".to_string(), declaration());
    config.add_network("bbbbbbbbbbbbbbbb".to_string(), declaration());

    let joined = vec![
        "8056c2e21c000001".to_string(),
        "bbbbbbbbbbbbbbbb".to_string(),
    ];
    let steps = plan(&config, &joined);

    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|s| s.action == Action::Sync));
}
