use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Closed set of controllers a process can run.
///
/// Every consumer that maps a kind to a concrete processor matches on this enum,
/// so a new variant is a compile error until each catalog handles it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    GitRepository,
    ServiceDeployment,
    Cluster,
    GlobalService,
    Pipeline,
    Stack,
    NotificationSink,
    Project,
}

impl ControllerKind {
    /// All kinds in registration order.
    pub const ALL: [ControllerKind; 8] = [
        ControllerKind::GitRepository,
        ControllerKind::ServiceDeployment,
        ControllerKind::Cluster,
        ControllerKind::GlobalService,
        ControllerKind::Pipeline,
        ControllerKind::Stack,
        ControllerKind::NotificationSink,
        ControllerKind::Project,
    ];

    /// Canonical lowercase name, used in logs, metrics and config.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControllerKind::GitRepository => "gitrepository",
            ControllerKind::ServiceDeployment => "servicedeployment",
            ControllerKind::Cluster => "cluster",
            ControllerKind::GlobalService => "globalservice",
            ControllerKind::Pipeline => "pipeline",
            ControllerKind::Stack => "stack",
            ControllerKind::NotificationSink => "notificationsink",
            ControllerKind::Project => "project",
        }
    }
}

impl FromStr for ControllerKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        let norm = s.trim().to_ascii_lowercase();
        ControllerKind::ALL
            .into_iter()
            .find(|k| k.as_str() == norm)
            .ok_or_else(|| ModelError::UnknownControllerKind(s.trim().to_string()))
    }
}

impl fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma separated controller list such as `"cluster,pipeline"`.
///
/// Fails on an empty list and on the first unknown name. Duplicates are kept;
/// callers that build processors deduplicate.
pub fn parse_kind_list(s: &str) -> ModelResult<Vec<ControllerKind>> {
    if s.trim().is_empty() {
        return Err(ModelError::EmptyControllerList);
    }
    s.split(',').map(ControllerKind::from_str).collect()
}
