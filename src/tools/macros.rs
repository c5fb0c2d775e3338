//! Tool Definition Macros
//!
//! Simplifies tool creation by reducing boilerplate

/// Define tool metadata using a declarative syntax
///
/// # Example
/// ```ignore
/// tool_metadata! {
///     name: "get_pod_status",
///     description: "Fetch the status block of one pod",
///     parameters: [
///         {
///             name: "namespace",
///             type: "string",
///             description: "Namespace of the pod",
///             required: true
///         }
///     ]
/// }
/// ```
#[macro_export]
macro_rules! tool_metadata {
    (
        name: $name:expr,
        description: $description:expr,
        parameters: [
            $(
                {
                    name: $param_name:expr,
                    type: $param_type:expr,
                    description: $param_desc:expr,
                    required: $param_required:expr
                }
            ),* $(,)?
        ]
    ) => {
        $crate::tools::ToolMetadata {
            name: $name.to_string(),
            description: $description.to_string(),
            parameters: vec![
                $(
                    $crate::tools::ToolParameter {
                        name: $param_name.to_string(),
                        param_type: $param_type.to_string(),
                        description: $param_desc.to_string(),
                        required: $param_required,
                    }
                ),*
            ],
        }
    };
}

/// Validate required string parameter
#[macro_export]
macro_rules! validate_required_string {
    ($args:expr, $param:expr) => {
        $args[$param].as_str().ok_or_else(|| {
            anyhow::anyhow!("'{}' parameter is required and must be a string", $param)
        })?
    };
}

/// Optional string parameter; empty strings count as absent
#[macro_export]
macro_rules! validate_optional_string {
    ($args:expr, $param:expr) => {
        $args[$param].as_str().filter(|value| !value.is_empty())
    };
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    #[test]
    fn test_tool_metadata_macro() {
        let metadata = tool_metadata! {
            name: "test_tool",
            description: "A test tool",
            parameters: [
                {
                    name: "kind",
                    type: "string",
                    description: "Object kind",
                    required: true
                },
                {
                    name: "namespace",
                    type: "string",
                    description: "Namespace",
                    required: false
                }
            ]
        };

        assert_eq!(metadata.name, "test_tool");
        assert_eq!(metadata.parameters.len(), 2);
        assert!(metadata.parameters[0].required);
        assert!(!metadata.parameters[1].required);
    }

    #[test]
    fn test_optional_string_treats_empty_as_absent() {
        let args = json!({"namespace": "", "kind": "pod"});
        assert_eq!(validate_optional_string!(args, "namespace"), None);
        assert_eq!(validate_optional_string!(args, "kind"), Some("pod"));
        assert_eq!(validate_optional_string!(args, "missing"), None);
    }

    #[test]
    fn test_required_string_rejects_missing() {
        fn read(args: serde_json::Value) -> anyhow::Result<String> {
            let value = validate_required_string!(args, "name");
            Ok(value.to_string())
        }

        assert_eq!(read(json!({"name": "web"})).unwrap(), "web");
        assert!(read(json!({})).is_err());
        assert!(read(json!({"name": 3})).is_err());
    }
}
