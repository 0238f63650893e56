//! Kind to resource-name dictionary
//!
//! A cluster API addresses collections by plural resource name (`deployments`)
//! while manifests carry the kind (`Deployment`). The fetch layer that reads
//! live state uses a [`ResourceDictionary`] to translate one into the other;
//! the diff computation itself never consults it.
//!
//! The set of valid kinds depends on the cluster and its installed extensions,
//! so [`KindTable`] ships a built-in table and accepts an overlay that extends
//! or overrides it. Construct one table at startup and pass it to whatever
//! needs it.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::suggestions::find_similar;

/// Resolves a resource kind to its plural resource name.
pub trait ResourceDictionary {
    /// Look up the resource name for `kind`, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownKind`] when the kind has no entry.
    fn kind_to_resource(&self, kind: &str) -> Result<String>;
}

/// Built-in kinds, keyed by lowercase kind.
const BUILTIN_KINDS: &[(&str, &str)] = &[
    // core and apps
    ("configmap", "configmaps"),
    ("endpoints", "endpoints"),
    ("event", "events"),
    ("limitrange", "limitranges"),
    ("namespace", "namespaces"),
    ("node", "nodes"),
    ("persistentvolume", "persistentvolumes"),
    ("persistentvolumeclaim", "persistentvolumeclaims"),
    ("pod", "pods"),
    ("resourcequota", "resourcequotas"),
    ("secret", "secrets"),
    ("service", "services"),
    ("serviceaccount", "serviceaccounts"),
    ("controllerrevision", "controllerrevisions"),
    ("daemonset", "daemonsets"),
    ("deployment", "deployments"),
    ("replicaset", "replicasets"),
    ("statefulset", "statefulsets"),
    ("cronjob", "cronjobs"),
    ("job", "jobs"),
    ("horizontalpodautoscaler", "horizontalpodautoscalers"),
    ("poddisruptionbudget", "poddisruptionbudgets"),
    // networking
    ("endpointslice", "endpointslices"),
    ("ingress", "ingresses"),
    ("ingressclass", "ingressclasses"),
    ("networkpolicy", "networkpolicies"),
    // rbac
    ("clusterrole", "clusterroles"),
    ("clusterrolebinding", "clusterrolebindings"),
    ("role", "roles"),
    ("rolebinding", "rolebindings"),
    // cluster configuration
    ("apiservice", "apiservices"),
    ("csidriver", "csidrivers"),
    ("customresourcedefinition", "customresourcedefinitions"),
    ("lease", "leases"),
    ("mutatingwebhookconfiguration", "mutatingwebhookconfigurations"),
    ("priorityclass", "priorityclasses"),
    ("storageclass", "storageclasses"),
    ("validatingwebhookconfiguration", "validatingwebhookconfigurations"),
    ("volumeattachment", "volumeattachments"),
    // cert-manager
    ("certificate", "certificates"),
    ("certificaterequest", "certificaterequests"),
    ("challenge", "challenges"),
    ("clusterissuer", "clusterissuers"),
    ("issuer", "issuers"),
    ("order", "orders"),
    // cilium
    ("ciliumendpoint", "ciliumendpoints"),
    ("ciliumnetworkpolicy", "ciliumnetworkpolicies"),
    // chaos-mesh
    ("dnschaos", "dnschaos"),
    ("httpchaos", "httpchaos"),
    ("iochaos", "iochaos"),
    ("jvmchaos", "jvmchaos"),
    ("networkchaos", "networkchaos"),
    ("podchaos", "podchaos"),
    ("podnetworkchaos", "podnetworkchaos"),
    ("schedule", "schedules"),
    ("stresschaos", "stresschaos"),
    ("timechaos", "timechaos"),
    ("workflow", "workflows"),
    // kong
    ("kongconsumer", "kongconsumers"),
    ("kongingress", "kongingresses"),
    ("kongplugin", "kongplugins"),
    // prometheus-operator
    ("podmonitor", "podmonitors"),
    ("prometheusrule", "prometheusrules"),
    ("servicemonitor", "servicemonitors"),
    // misc
    ("natgateway", "natgateways"),
    ("sealedsecret", "sealedsecrets"),
    ("uapdaemon", "uapdaemons"),
    ("uapdeployment", "uapdeployments"),
    ("uapservice", "uapservices"),
    ("workloadpool", "workloadpools"),
];

/// Table-backed [`ResourceDictionary`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KindTable {
    entries: BTreeMap<String, String>,
}

impl KindTable {
    /// The built-in table of common kinds.
    pub fn builtin() -> Self {
        Self {
            entries: BUILTIN_KINDS
                .iter()
                .map(|(kind, resource)| (kind.to_string(), resource.to_string()))
                .collect(),
        }
    }

    /// A table with no entries.
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Merge `overlay` into this table. Overlay entries replace existing
    /// entries for the same kind (compared case-insensitively).
    pub fn with_overlay<I, K, V>(mut self, overlay: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (kind, resource) in overlay {
            self.entries
                .insert(kind.as_ref().to_ascii_lowercase(), resource.into());
        }
        self
    }

    /// Number of known kinds.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(lowercase kind, resource)` pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ResourceDictionary for KindTable {
    fn kind_to_resource(&self, kind: &str) -> Result<String> {
        let key = kind.to_ascii_lowercase();
        if let Some(resource) = self.entries.get(&key) {
            return Ok(resource.clone());
        }

        let known: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        Err(Error::UnknownKind {
            kind: kind.to_string(),
            suggestion: find_similar(&key, &known).map(str::to_string),
        })
    }
}
