//! Endpoint selection for Nomad services.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Endpoint, EndpointRecord};
use crate::error::{Error, Result};

/// Picks one endpoint exposing `port`, uniformly at random.
///
/// Spreading connections over all running instances is intended; callers
/// must not replace this with "first match".
pub fn select_endpoint<R: Rng + ?Sized>(
    service: &str,
    records: &[EndpointRecord],
    port: &str,
    rng: &mut R,
) -> Result<Endpoint> {
    let no_endpoints = || Error::NoEndpoints {
        service: service.to_string(),
        port: port.to_string(),
    };

    let candidates: Vec<&String> = records.iter().filter_map(|r| r.get(port)).collect();
    let selected = candidates.choose(rng).ok_or_else(no_endpoints)?;

    Endpoint::from_host_port(selected)
}
