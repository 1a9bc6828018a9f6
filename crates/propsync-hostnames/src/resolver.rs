use std::collections::BTreeMap;
use std::sync::Arc;

use propsync_lifecycle::{spawn_status_poll, PollConfig};
use propsync_model::{
    EdgeHostname, IpVersion, LifecycleStatus, Property, PropertySpec, EDGE_HOSTNAME_SUFFIX,
};
use propsync_plane::{EdgeHostnameStore, HostnameStore, NewEdgeHostname, PlaneError};

// ---------------------------------------------------------------------------
// build_hostname_map
// ---------------------------------------------------------------------------

/// Resolve every declared hostname to an edge hostname.
///
/// Returns `Ok(None)` when resolution is skipped entirely: the property
/// already has bindings and no explicit override was declared, so existing
/// state is left untouched.
///
/// Resolution order:
/// 1. An explicit override that matches an existing edge hostname pins the
///    assignment to that one record.
/// 2. An override that matches nothing is provisioned as a new edge
///    hostname and used the same way.
/// 3. Otherwise declared hostnames are matched 1:1 by convention
///    (`h` ↔ `h.edgesuite.net`); the first convention match becomes the
///    fallback for hostnames that match nothing, or the first existing edge
///    hostname when there is no convention match at all.
/// 4. A contract/group with no edge hostnames gets exactly one provisioned
///    from the first declared hostname, and everything maps to it.
///
/// Known gap, kept for compatibility with state already written by earlier
/// releases: the override branches bind only the FIRST declared hostname
/// before returning. `scenario_override_maps_only_first_hostname` pins the
/// behavior.
pub async fn build_hostname_map(
    edge_store: &Arc<dyn EdgeHostnameStore>,
    hostname_store: &dyn HostnameStore,
    property: &Property,
    spec: &PropertySpec,
    config: &PollConfig,
) -> Result<Option<BTreeMap<String, EdgeHostname>>, PlaneError> {
    if spec.edge_hostname.is_none() {
        let bound = hostname_store.bindings(property)?;
        if !bound.is_empty() {
            tracing::debug!(
                property_id = %property.property_id,
                bindings = bound.len(),
                "property already has hostname bindings; skipping resolution"
            );
            return Ok(None);
        }
    }

    let declared = &spec.hostnames;
    let existing = edge_store.list(&property.contract_id, &property.group_id)?;
    tracing::debug!(
        existing = existing.len(),
        declared = declared.len(),
        "resolving hostname assignment"
    );

    let mut map = BTreeMap::new();

    if let Some(override_domain) = &spec.edge_hostname {
        let pinned = match existing
            .iter()
            .find(|e| &e.edge_hostname_domain == override_domain)
        {
            Some(found) => found.clone(),
            None => {
                create_edge_hostname(edge_store, spec, property, override_domain, config).await?
            }
        };

        for hostname in declared {
            if !map.contains_key(hostname) {
                map.insert(hostname.clone(), pinned.clone());
                return Ok(Some(map));
            }
        }
    }

    if !existing.is_empty() {
        return Ok(Some(convention_assignment(&existing, declared)));
    }

    // Nothing to match against: provision a single edge hostname from the
    // first declared hostname and point everything at it.
    let first = declared.first().ok_or_else(|| {
        PlaneError::precondition("at least one hostname must be declared to provision an edge hostname")
    })?;
    let created = create_edge_hostname(edge_store, spec, property, first, config).await?;
    tracing::debug!(domain = %created.edge_hostname_domain, "edge hostname created");
    for hostname in declared {
        map.insert(hostname.clone(), created.clone());
    }
    Ok(Some(map))
}

// ---------------------------------------------------------------------------
// Convention matching
// ---------------------------------------------------------------------------

/// Map declared hostnames onto an existing (non-empty) edge hostname set:
/// 1:1 convention matches first, then the fallback default for the rest.
pub fn convention_assignment(
    existing: &[EdgeHostname],
    declared: &[String],
) -> BTreeMap<String, EdgeHostname> {
    let by_domain: BTreeMap<&str, &EdgeHostname> = existing
        .iter()
        .map(|e| (e.edge_hostname_domain.as_str(), e))
        .collect();

    let mut map = BTreeMap::new();
    let mut default = None;
    for hostname in declared {
        let conventional = format!("{hostname}.{EDGE_HOSTNAME_SUFFIX}");
        if let Some(edge) = by_domain.get(conventional.as_str()) {
            map.insert(hostname.clone(), (*edge).clone());
            // The first convention match overrides the fallback default.
            if default.is_none() {
                default = Some((*edge).clone());
            }
        }
    }

    if map.len() < declared.len() {
        let default = default.unwrap_or_else(|| existing[0].clone());
        tracing::debug!(
            mapped = map.len(),
            declared = declared.len(),
            default = %default.edge_hostname_domain,
            "binding unmatched hostnames to the default edge hostname"
        );
        for hostname in declared {
            map.entry(hostname.clone())
                .or_insert_with(|| default.clone());
        }
    }

    map
}

// ---------------------------------------------------------------------------
// create_edge_hostname
// ---------------------------------------------------------------------------

/// Submit an edge hostname creation and wait for it to go active.
///
/// Creation is asynchronous on the remote side: a background poll watches
/// the new record and the call blocks on its feed. Exceeding the deadline is
/// a hard error naming the hostname under construction; nothing downstream
/// can proceed without it.
pub async fn create_edge_hostname(
    store: &Arc<dyn EdgeHostnameStore>,
    spec: &PropertySpec,
    property: &Property,
    domain: &str,
    config: &PollConfig,
) -> Result<EdgeHostname, PlaneError> {
    let product_id = spec
        .product_id
        .clone()
        .or_else(|| property.product_id.clone())
        .ok_or_else(|| {
            PlaneError::precondition("product_id must be specified to create an edge hostname")
        })?;

    let request = NewEdgeHostname {
        domain: domain.to_string(),
        product_id,
        ip_version: if spec.ipv6 {
            IpVersion::V6Compliance
        } else {
            IpVersion::V4
        },
    };
    let mut edge = store.create(&request)?;
    tracing::debug!(
        domain = %edge.edge_hostname_domain,
        status = %edge.status,
        "edge hostname creation submitted"
    );

    if edge.status == LifecycleStatus::Active {
        return Ok(edge);
    }

    let id = edge.edge_hostname_id.clone();
    let poll_store = Arc::clone(store);
    let mut feed = spawn_status_poll(
        format!("edge hostname {}", edge.edge_hostname_domain),
        config.poll_interval,
        move || poll_store.status(&id),
    );

    while edge.status != LifecycleStatus::Active {
        match tokio::time::timeout(config.edge_hostname_deadline, feed.recv()).await {
            Ok(Some(event)) => {
                edge.status = event.status;
                if event.status == LifecycleStatus::Active {
                    break;
                }
                if !event.keep_polling {
                    return Err(PlaneError::operation(
                        format!("edge hostname {}", edge.edge_hostname_domain),
                        format!("status feed stopped at {} before activation", event.status),
                    ));
                }
            }
            Ok(None) => {
                return Err(PlaneError::operation(
                    format!("edge hostname {}", edge.edge_hostname_domain),
                    "status feed closed before activation".to_string(),
                ));
            }
            Err(_elapsed) => {
                feed.stop();
                return Err(PlaneError::timeout(
                    format!(
                        "edge hostname \"{}.{}\" to be created",
                        edge.domain_prefix(),
                        edge.domain_suffix()
                    ),
                    config.edge_hostname_deadline,
                ));
            }
        }
    }

    Ok(edge)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
