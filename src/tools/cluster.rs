//! Cluster inspection tools backed by `oc` and `kube-health`
//!
//! Information Hiding:
//! - Exact command lines hidden behind tool names
//! - Kubernetes name/kind validation keeps arguments from becoming flags
//! - Output is whatever the binary printed on stdout

use super::shell::CommandRunner;
use super::{Tool, ToolMetadata, ToolResult};
use crate::config::ToolsConfig;
use crate::{tool_metadata, validate_optional_string, validate_required_string};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

const NON_RUNNING_SELECTOR: &str = "status.phase!=Running";
const NAMESPACE_NAME_COLUMNS: &str =
    "custom-columns=NAMESPACE:.metadata.namespace,NAME:.metadata.name";

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9.]{0,251}[a-z0-9])?$").expect("valid name regex")
});

static KIND_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9.\-]{0,62}$").expect("valid kind regex"));

fn check_name(param: &str, value: &str) -> Result<()> {
    if NAME_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(anyhow::anyhow!(
            "'{}' must be a Kubernetes object name, got '{}'",
            param,
            value
        ))
    }
}

fn check_kind(value: &str) -> Result<()> {
    if KIND_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(anyhow::anyhow!("'kind' must be a resource kind, got '{}'", value))
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}

/// Fetch the list of all namespaces in the cluster
pub struct ListNamespacesTool {
    oc: CommandRunner,
}

impl ListNamespacesTool {
    pub fn new(oc: CommandRunner) -> Self {
        Self { oc }
    }
}

#[async_trait]
impl Tool for ListNamespacesTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "list_namespaces",
            description: "Fetch the list of all namespaces in the cluster",
            parameters: []
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult> {
        Ok(self.oc.run(&owned(&["get", "namespaces"])).await)
    }
}

/// List objects of one kind, in a namespace or across all of them
pub struct ListObjectsTool {
    oc: CommandRunner,
}

impl ListObjectsTool {
    pub fn new(oc: CommandRunner) -> Self {
        Self { oc }
    }

    fn command_args(args: &Value) -> Result<Vec<String>> {
        let kind = validate_required_string!(args, "kind");
        let mut command = owned(&["get", kind]);
        match validate_optional_string!(args, "namespace") {
            Some(namespace) => command.extend(owned(&["-n", namespace])),
            None => command.push("-A".to_string()),
        }
        command.extend(owned(&["-o", "name"]));
        Ok(command)
    }
}

#[async_trait]
impl Tool for ListObjectsTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "list_objects",
            description: "Fetch the names of all objects of a kind (pods, deployments, services, ...). \
                          Omit the namespace to search the whole cluster.",
            parameters: [
                {
                    name: "kind",
                    type: "string",
                    description: "Resource kind, e.g. pods or deployments",
                    required: true
                },
                {
                    name: "namespace",
                    type: "string",
                    description: "Namespace to list; omit for all namespaces",
                    required: false
                }
            ]
        }
    }

    fn validate(&self, args: &Value) -> Result<()> {
        check_kind(validate_required_string!(args, "kind"))?;
        if let Some(namespace) = validate_optional_string!(args, "namespace") {
            check_name("namespace", namespace)?;
        }
        Ok(())
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        self.validate(&args)?;
        Ok(self.oc.run(&Self::command_args(&args)?).await)
    }
}

/// Pods whose phase is anything other than Running
pub struct ListNonRunningPodsTool {
    oc: CommandRunner,
}

impl ListNonRunningPodsTool {
    pub fn new(oc: CommandRunner) -> Self {
        Self { oc }
    }
}

#[async_trait]
impl Tool for ListNonRunningPodsTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "list_non_running_pods",
            description: "Fetch a list of pods that are not currently running, with their namespaces",
            parameters: []
        }
    }

    async fn execute(&self, _args: Value) -> Result<ToolResult> {
        let args = owned(&[
            "get",
            "pods",
            "-A",
            "--field-selector",
            NON_RUNNING_SELECTOR,
            "-o",
            NAMESPACE_NAME_COLUMNS,
        ]);
        Ok(self.oc.run(&args).await)
    }
}

/// Full YAML of a single object
pub struct GetObjectDetailsTool {
    oc: CommandRunner,
}

impl GetObjectDetailsTool {
    pub fn new(oc: CommandRunner) -> Self {
        Self { oc }
    }

    fn command_args(args: &Value) -> Result<Vec<String>> {
        let kind = validate_required_string!(args, "kind");
        let name = validate_required_string!(args, "name");
        let mut command = owned(&["get", kind, name]);
        if let Some(namespace) = validate_optional_string!(args, "namespace") {
            command.extend(owned(&["-n", namespace]));
        }
        command.extend(owned(&["-o", "yaml"]));
        Ok(command)
    }
}

#[async_trait]
impl Tool for GetObjectDetailsTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "get_object_details",
            description: "Fetch the full YAML definition and status of a single, specific object",
            parameters: [
                {
                    name: "kind",
                    type: "string",
                    description: "Resource kind, e.g. pod or deployment",
                    required: true
                },
                {
                    name: "name",
                    type: "string",
                    description: "Name of the object",
                    required: true
                },
                {
                    name: "namespace",
                    type: "string",
                    description: "Namespace of the object; omit for cluster-scoped kinds",
                    required: false
                }
            ]
        }
    }

    fn validate(&self, args: &Value) -> Result<()> {
        check_kind(validate_required_string!(args, "kind"))?;
        check_name("name", validate_required_string!(args, "name"))?;
        if let Some(namespace) = validate_optional_string!(args, "namespace") {
            check_name("namespace", namespace)?;
        }
        Ok(())
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        self.validate(&args)?;
        Ok(self.oc.run(&Self::command_args(&args)?).await)
    }
}

/// One-line status table for a pod
pub struct GetPodStatusTool {
    oc: CommandRunner,
}

impl GetPodStatusTool {
    pub fn new(oc: CommandRunner) -> Self {
        Self { oc }
    }
}

#[async_trait]
impl Tool for GetPodStatusTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "get_pod_status",
            description: "Fetch the readiness, phase and restart count of a single pod",
            parameters: [
                {
                    name: "namespace",
                    type: "string",
                    description: "Namespace of the pod",
                    required: true
                },
                {
                    name: "pod",
                    type: "string",
                    description: "Name of the pod",
                    required: true
                }
            ]
        }
    }

    fn validate(&self, args: &Value) -> Result<()> {
        check_name("namespace", validate_required_string!(args, "namespace"))?;
        check_name("pod", validate_required_string!(args, "pod"))?;
        Ok(())
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        self.validate(&args)?;
        let namespace = validate_required_string!(args, "namespace");
        let pod = validate_required_string!(args, "pod");
        Ok(self
            .oc
            .run(&owned(&["get", "pod", pod, "-n", namespace, "-o", "wide"]))
            .await)
    }
}

/// Health summary from `kube-health`
pub struct GetObjectHealthTool {
    kube_health: CommandRunner,
}

impl GetObjectHealthTool {
    pub fn new(kube_health: CommandRunner) -> Self {
        Self { kube_health }
    }

    fn command_args(args: &Value) -> Result<Vec<String>> {
        let kind = validate_required_string!(args, "kind");
        let name = validate_required_string!(args, "name");
        let mut command = vec![format!("{}/{}", kind, name)];
        if let Some(namespace) = validate_optional_string!(args, "namespace") {
            command.extend(owned(&["-n", namespace]));
        }
        Ok(command)
    }
}

#[async_trait]
impl Tool for GetObjectHealthTool {
    fn metadata(&self) -> ToolMetadata {
        tool_metadata! {
            name: "get_object_health",
            description: "Summarize the health of an object and the objects it owns. \
                          The namespace may be omitted for cluster-scoped objects.",
            parameters: [
                {
                    name: "kind",
                    type: "string",
                    description: "Resource kind, e.g. deployment or node",
                    required: true
                },
                {
                    name: "name",
                    type: "string",
                    description: "Name of the object",
                    required: true
                },
                {
                    name: "namespace",
                    type: "string",
                    description: "Namespace of the object; omit for cluster-scoped kinds",
                    required: false
                }
            ]
        }
    }

    fn validate(&self, args: &Value) -> Result<()> {
        check_kind(validate_required_string!(args, "kind"))?;
        check_name("name", validate_required_string!(args, "name"))?;
        if let Some(namespace) = validate_optional_string!(args, "namespace") {
            check_name("namespace", namespace)?;
        }
        Ok(())
    }

    async fn execute(&self, args: Value) -> Result<ToolResult> {
        self.validate(&args)?;
        Ok(self.kube_health.run(&Self::command_args(&args)?).await)
    }
}

/// Every cluster tool, wired to the binaries named in `config`
pub fn cluster_tools(config: &ToolsConfig) -> Vec<Arc<dyn Tool>> {
    let oc = CommandRunner::new(config.binary_path(&config.oc_binary), config.timeout_ms);
    let kube_health = CommandRunner::new(
        config.binary_path(&config.kube_health_binary),
        config.timeout_ms,
    );

    vec![
        Arc::new(ListNamespacesTool::new(oc.clone())),
        Arc::new(ListObjectsTool::new(oc.clone())),
        Arc::new(ListNonRunningPodsTool::new(oc.clone())),
        Arc::new(GetObjectDetailsTool::new(oc.clone())),
        Arc::new(GetPodStatusTool::new(oc)),
        Arc::new(GetObjectHealthTool::new(kube_health)),
    ]
}
