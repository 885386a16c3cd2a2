//! Dry-run backends
//!
//! Every target created by [`RecordingTargetFactory`] reports the command it
//! would run to a sink instead of running it.

use super::target::{
    CloudFoundryConfig, CloudFoundryTarget, Helm, Kapp, KubernetesConfig, KubernetesTarget,
    TargetFactory,
};
use crate::error::StrataResult;
use semver::Version;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::debug;

type Sink = Arc<dyn Fn(String) + Send + Sync>;

#[derive(Clone)]
struct Recorder(Sink);

impl Recorder {
    fn record(&self, command: String) {
        debug!("Recorded: {}", command);
        (self.0)(command);
    }
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Recorder")
    }
}

/// Target factory whose backends only report commands
#[derive(Debug, Clone)]
pub struct RecordingTargetFactory {
    recorder: Recorder,
}

impl RecordingTargetFactory {
    pub fn new(sink: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            recorder: Recorder(Arc::new(sink)),
        }
    }

    /// Factory collecting commands into a shared list
    pub fn journal() -> (Self, Arc<Mutex<Vec<String>>>) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&journal);
        let factory = Self::new(move |command| {
            if let Ok(mut commands) = sink.lock() {
                commands.push(command);
            }
        });
        (factory, journal)
    }
}

impl TargetFactory for RecordingTargetFactory {
    fn kubernetes(&self, namespace: &str, config: &KubernetesConfig) -> Arc<dyn KubernetesTarget> {
        Arc::new(RecordingKubernetes {
            namespace: namespace.to_string(),
            config: config.clone(),
            helm: RecordingHelm {
                namespace: namespace.to_string(),
                recorder: self.recorder.clone(),
            },
            kapp: RecordingKapp {
                namespace: namespace.to_string(),
                recorder: self.recorder.clone(),
            },
        })
    }

    fn cloud_foundry(&self, config: &CloudFoundryConfig) -> Arc<dyn CloudFoundryTarget> {
        Arc::new(RecordingCloudFoundry {
            config: config.clone(),
            recorder: self.recorder.clone(),
        })
    }
}

#[derive(Debug)]
struct RecordingKubernetes {
    namespace: String,
    config: KubernetesConfig,
    helm: RecordingHelm,
    kapp: RecordingKapp,
}

impl KubernetesTarget for RecordingKubernetes {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn config(&self) -> &KubernetesConfig {
        &self.config
    }

    fn helm(&self) -> &dyn Helm {
        &self.helm
    }

    fn kapp(&self) -> &dyn Kapp {
        &self.kapp
    }
}

#[derive(Debug)]
struct RecordingHelm {
    namespace: String,
    recorder: Recorder,
}

impl Helm for RecordingHelm {
    fn apply(&self, name: &str, chart: &str, version: &Version, parameter: Option<&Value>) -> StrataResult<()> {
        self.recorder.record(with_parameter(
            format!("helm upgrade -i -n {} --version {} {} {}", self.namespace, version, name, chart),
            parameter,
        ));
        Ok(())
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.recorder
            .record(format!("helm delete -n {} {}", self.namespace, name));
        Ok(())
    }
}

#[derive(Debug)]
struct RecordingKapp {
    namespace: String,
    recorder: Recorder,
}

impl Kapp for RecordingKapp {
    fn apply(&self, name: &str, app: &str, _version: &Version, parameter: Option<&Value>) -> StrataResult<()> {
        self.recorder.record(with_parameter(
            format!("kapp deploy -n {} -a {} {}", self.namespace, name, app),
            parameter,
        ));
        Ok(())
    }

    fn delete(&self, name: &str) -> StrataResult<()> {
        self.recorder
            .record(format!("kapp delete -n {} -a {}", self.namespace, name));
        Ok(())
    }
}

#[derive(Debug)]
struct RecordingCloudFoundry {
    config: CloudFoundryConfig,
    recorder: Recorder,
}

impl CloudFoundryTarget for RecordingCloudFoundry {
    fn config(&self) -> &CloudFoundryConfig {
        &self.config
    }

    fn create_org(&self, name: &str, user: &str) -> StrataResult<()> {
        debug!("Creating org {} for {}", name, user);
        self.recorder.record(format!("cf create org {}", name));
        Ok(())
    }

    fn delete_org(&self, name: &str) -> StrataResult<()> {
        self.recorder.record(format!("cf delete org {}", name));
        Ok(())
    }
}

fn with_parameter(command: String, parameter: Option<&Value>) -> String {
    match parameter {
        Some(parameter) => format!("{} {}", command, parameter),
        None => command,
    }
}
