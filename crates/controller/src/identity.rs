use nats_provider_apis::ObjectMeta;
use thiserror::Error;

/// Annotation carrying the broker-side name of a resource.
pub const EXTERNAL_NAME_ANNOTATION: &str = "crossplane.io/external-name";

/// The external name annotation is absent or empty.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("external name annotation not found for {kind} {name}")]
pub struct MissingExternalName {
    /// Resource kind.
    pub kind: &'static str,

    /// Resource document name.
    pub name: String,
}

/// Reads the broker-side name of a resource from its metadata.
///
/// The name is never derived from the spec, so editing the spec cannot
/// rename the broker object.
///
/// # Errors
///
/// Returns [`MissingExternalName`] if the annotation is absent or empty.
pub fn external_name<'a>(
    kind: &'static str,
    metadata: &'a ObjectMeta,
) -> Result<&'a str, MissingExternalName> {
    metadata
        .annotations
        .get(EXTERNAL_NAME_ANNOTATION)
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| MissingExternalName {
            kind,
            name: metadata.name.clone(),
        })
}
