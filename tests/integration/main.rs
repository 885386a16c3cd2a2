//! Integration tests for Strata

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary isolated from any user configuration
    fn strata(dir: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("strata");
        cmd.env("STRATA_CONFIG", dir.path().join("config.toml"))
            .env_remove("ARTIFACTORY");
        cmd
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("dependency-aware"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("strata"));
    }

    #[test]
    fn packages_lists_catalog() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .arg("packages")
            .assert()
            .success()
            .stdout(predicate::str::contains("docker.io/pkgs/istio: 1.7.0"))
            .stdout(predicate::str::contains("docker.io/pkgs/cloud-foundry-environment"));
    }

    #[test]
    fn apply_prints_backend_commands() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["apply", "cluster"])
            .assert()
            .success()
            .stdout(predicate::str::contains("helm upgrade -i -n default --version 1.0.1"))
            .stdout(predicate::str::contains("cluster.hana-ondemand.com"));
    }

    #[test]
    fn apply_with_teardown_deletes_everything() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["apply", "kyma", "-n", "kyma-system", "--teardown"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"istio {"pilot":{"instances":3}}"#))
            .stdout(predicate::str::contains("helm delete -n kyma-system"))
            .stdout(predicate::str::contains("helm delete -n istio-system"))
            .stdout(predicate::str::contains("still cached").not());
    }

    #[test]
    fn apply_unknown_package_fails() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["apply", "nope"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("docker.io/pkgs/nope not found"))
            .stderr(predicate::str::contains("strata packages"));
    }

    #[test]
    fn apply_unsatisfiable_version_fails() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["apply", "istio", "--version", ">=2.0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("constraints"));
    }

    #[test]
    fn apply_rejects_invalid_parameter() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["apply", "istio", "--parameter", "{not json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid JSON"));
    }

    #[test]
    fn environment_needs_artifactory_secret() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["apply", "cloud-foundry-environment"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Missing environment variable ARTIFACTORY"));
    }

    #[test]
    fn environment_reads_secret_from_environment() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .env("ARTIFACTORY", r#"{"repository":"artifactory.example.com"}"#)
            .args(["apply", "cloud-foundry-environment"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cf create org"))
            .stdout(predicate::str::contains(r#""IMAGE_REPOSITORY":"artifactory.example.com""#));
    }

    #[test]
    fn secrets_use_configured_prefix() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[secrets]\nenv_prefix = \"STRATA_TEST_\"\n",
        )
        .unwrap();
        strata(&dir)
            .env("STRATA_TEST_ARTIFACTORY", r#"{"repository":"prefixed.example.com"}"#)
            .args(["apply", "cloud-foundry-environment"])
            .assert()
            .success()
            .stdout(predicate::str::contains("prefixed.example.com"));
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        strata(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[kubernetes]"))
            .stdout(predicate::str::contains("gardener.canary.hana-ondemand.com"));
    }

    #[test]
    fn config_init_writes_defaults() {
        let dir = TempDir::new().unwrap();
        strata(&dir).args(["config", "init"]).assert().success();
        assert!(dir.path().join("config.toml").exists());

        strata(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--force"));
    }

    #[test]
    fn config_flag_overrides_environment() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[kubernetes]\nnamespace = \"team-a\"\n").unwrap();
        strata(&dir)
            .args(["-c", path.to_str().unwrap(), "apply", "cluster"])
            .assert()
            .success()
            .stdout(predicate::str::contains("helm upgrade -i -n team-a"));
    }

    #[test]
    fn invalid_config_fails() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[general]\nlog_format = \"xml\"\n",
        )
        .unwrap();
        strata(&dir)
            .arg("packages")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}

mod scenario_tests {
    use semver::VersionReq;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use strata::landscape::plugins::{
        cloud_foundry, cloud_foundry_environment, kyma, service_manager_agent,
    };
    use strata::landscape::{self, KubernetesConfig, Landscape, RecordingTargetFactory, TargetFactory};
    use strata::secrets::StaticSecrets;
    use strata::PackageManager;

    struct Scenario {
        manager: PackageManager<Landscape>,
        factory: Arc<RecordingTargetFactory>,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl Scenario {
        fn new() -> Self {
            let (factory, journal) = RecordingTargetFactory::journal();
            let factory = Arc::new(factory);
            let secrets = StaticSecrets::new().with(
                service_manager_agent::ARTIFACTORY,
                json!({"repository": "artifactory.example.com"}),
            );
            let manager =
                PackageManager::with_secrets(landscape::catalog(factory.clone()), secrets);
            Self {
                manager,
                factory,
                journal,
            }
        }

        fn namespace(&self, namespace: &str) -> Landscape {
            let config = KubernetesConfig {
                url: landscape::DEFAULT_KUBERNETES_URL.to_string(),
            };
            Landscape::Kubernetes(self.factory.kubernetes(namespace, &config))
        }

        /// Commands recorded since the last call
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.journal.lock().unwrap())
        }
    }

    fn assert_prefixes(commands: &[String], prefixes: &[&str]) {
        assert_eq!(commands.len(), prefixes.len(), "commands: {:#?}", commands);
        for (command, prefix) in commands.iter().zip(prefixes) {
            assert!(command.starts_with(prefix), "{} should start with {}", command, prefix);
        }
    }

    #[test]
    fn environment_installs_in_dependency_order() {
        let mut scenario = Scenario::new();
        let target = scenario.namespace("default");

        scenario
            .manager
            .apply(&target, cloud_foundry_environment::PACKAGE, &VersionReq::STAR, None)
            .unwrap();

        assert_prefixes(
            &scenario.take(),
            &[
                "helm upgrade -i -n default --version 1.0.1",
                "helm upgrade -i -n istio-system --version 1.7.0",
                "kapp deploy -n cf-system",
                "cf create org",
                "helm upgrade -i -n service-agent-manager --version 1.0.0",
            ],
        );
        assert_eq!(scenario.manager.len(), 6);
    }

    #[test]
    fn environment_tears_down_in_reverse_order() {
        let mut scenario = Scenario::new();
        let target = scenario.namespace("default");
        scenario
            .manager
            .apply(&target, cloud_foundry_environment::PACKAGE, &VersionReq::STAR, None)
            .unwrap();
        scenario.take();

        scenario
            .manager
            .delete(&target, cloud_foundry_environment::PACKAGE)
            .unwrap();

        assert_prefixes(
            &scenario.take(),
            &[
                "helm delete -n service-agent-manager",
                "cf delete org",
                "kapp delete -n cf-system",
                "helm delete -n istio-system",
                "helm delete -n default",
            ],
        );
        assert!(scenario.manager.is_empty());
    }

    #[test]
    fn shared_istio_follows_its_requesters() {
        let mut scenario = Scenario::new();
        let cf = scenario.namespace(cloud_foundry::NAMESPACE);
        let kyma_target = scenario.namespace("kyma-system");

        scenario
            .manager
            .apply(&cf, cloud_foundry::PACKAGE, &VersionReq::STAR, None)
            .unwrap();
        let commands = scenario.take();
        assert_prefixes(&commands, &["helm upgrade -i -n istio-system", "kapp deploy -n cf-system"]);
        assert!(commands[0].ends_with(r#"{"pilot":{"instances":1}}"#));

        // Kyma needs a bigger pilot; istio is re-applied with the merged size
        scenario
            .manager
            .apply(&kyma_target, kyma::PACKAGE, &VersionReq::STAR, None)
            .unwrap();
        let commands = scenario.take();
        assert_prefixes(
            &commands,
            &["helm upgrade -i -n istio-system", "helm upgrade -i -n kyma-system"],
        );
        assert!(commands[0].ends_with(r#"{"pilot":{"instances":3}}"#));

        scenario.manager.delete(&cf, cloud_foundry::PACKAGE).unwrap();
        assert_prefixes(&scenario.take(), &["kapp delete -n cf-system"]);
        assert_eq!(scenario.manager.len(), 2);

        scenario.manager.delete(&kyma_target, kyma::PACKAGE).unwrap();
        assert_prefixes(
            &scenario.take(),
            &["helm delete -n kyma-system", "helm delete -n istio-system"],
        );
        assert!(scenario.manager.is_empty());
    }

    #[test]
    fn reapplying_is_a_no_op() {
        let mut scenario = Scenario::new();
        let target = scenario.namespace("kyma-system");

        let first = scenario
            .manager
            .apply(&target, kyma::PACKAGE, &VersionReq::STAR, None)
            .unwrap()
            .digest
            .clone();
        scenario.take();

        let second = scenario
            .manager
            .apply(&target, kyma::PACKAGE, &VersionReq::STAR, None)
            .unwrap()
            .digest
            .clone();

        assert_eq!(first, second);
        assert!(scenario.take().is_empty());
    }
}
