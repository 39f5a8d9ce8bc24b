use neotx_derive::Error;

/// A name or code that is not part of a closed lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    /// Interop service name not present in the registry.
    #[error("interop service not found: {0}")]
    InteropService(String),
    /// Interop code not produced by any registered service.
    #[error("interop code not found: {0:08x}")]
    InteropCode(u32),
    /// Enum display name not present in its table.
    #[error("unknown {kind} name: {name}")]
    EnumName { kind: &'static str, name: String },
}

/// A contract parameter whose value does not fit its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("{param_type} parameter cannot hold {value}")]
    TypeMismatch {
        param_type: &'static str,
        value: String,
    },
    #[error("malformed contract parameter json: {0}")]
    MalformedJson(String),
}
