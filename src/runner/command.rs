//! Argument construction for the measurement tool

use crate::models::MeasurementConfig;

/// Flags every invocation carries: the tool refuses to run unattended
/// without the license and GDPR acknowledgements.
pub const BASE_ARGS: [&str; 4] = ["--accept-license", "--accept-gdpr", "--format", "json"];

/// Build the tool arguments for a configuration
///
/// The order is fixed, so the same configuration always yields the same
/// argument list.
pub fn build_args(config: &MeasurementConfig) -> Vec<String> {
    let mut args: Vec<String> = BASE_ARGS.iter().map(|arg| arg.to_string()).collect();

    if let Some(server_id) = config.server_id() {
        args.push("--server-id".to_string());
        args.push(server_id.to_string());
    }

    if let Some(source_address) = config.source_address() {
        args.push("--ip".to_string());
        args.push(source_address.to_string());
    }

    args
}
