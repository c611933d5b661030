use serde::Serialize;

/// Serializes a native configuration into its canonical byte form.
///
/// Struct fields serialize in declaration order and the native types hold
/// no maps, so equal configurations always yield equal bytes. Fields the
/// native types do not model (server-assigned data, keys added by newer
/// servers) never reach the output.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn canonical<T: Serialize>(config: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(config)
}

/// Whether the observed configuration matches the desired one.
///
/// Any difference in a managed field, including presence of an optional
/// nested structure, counts as drift.
///
/// # Errors
///
/// Returns an error if either configuration cannot be serialized.
pub fn is_up_to_date<T: Serialize>(observed: &T, desired: &T) -> Result<bool, serde_json::Error> {
    Ok(canonical(observed)? == canonical(desired)?)
}
