use std::collections::BTreeMap;

use propsync_model::{EdgeHostname, HostnameBinding, Property};
use propsync_plane::{HostnameStore, PlaneError};

/// Persist a resolved hostname map as the property's binding list and return
/// the echo map reported back to the caller.
///
/// `None` means resolution was skipped; nothing is written, but the current
/// remote bindings are still read back so callers always see actual state.
/// The binding list replaces whatever the property held before; bindings are
/// never merged.
///
/// Echo map keys are the bound hostnames with dots replaced by dashes, the
/// form the orchestration layer uses for its keyed attributes.
pub fn apply_bindings(
    store: &dyn HostnameStore,
    property: &Property,
    map: Option<&BTreeMap<String, EdgeHostname>>,
) -> Result<BTreeMap<String, String>, PlaneError> {
    if let Some(map) = map {
        let bindings: Vec<HostnameBinding> = map
            .iter()
            .map(|(hostname, edge)| HostnameBinding::to_edge_hostname(hostname.clone(), edge))
            .collect();
        tracing::debug!(
            property_id = %property.property_id,
            count = bindings.len(),
            "replacing hostname bindings"
        );
        store.save(property, &bindings)?;
    }

    let current = store.bindings(property)?;
    Ok(current
        .into_iter()
        .map(|b| (b.cname_from.replace('.', "-"), b.cname_to))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use propsync_model::{IpVersion, LifecycleStatus};
    use propsync_testkit::InMemoryPlane;

    fn edge(id: &str, domain: &str) -> EdgeHostname {
        EdgeHostname {
            edge_hostname_id: id.to_string(),
            edge_hostname_domain: domain.to_string(),
            ip_version_behavior: IpVersion::V4,
            product_id: None,
            status: LifecycleStatus::Active,
        }
    }

    #[test]
    fn bindings_are_replaced_wholesale_and_echoed_dash_keyed() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");

        let stale = edge("ehn_9", "stale.example.edgesuite.net");
        HostnameStore::save(
            &plane,
            &property,
            &[HostnameBinding::to_edge_hostname("old.example.com", &stale)],
        )
        .unwrap();

        let mut map = BTreeMap::new();
        map.insert(
            "www.example.com".to_string(),
            edge("ehn_1", "www.example.com.edgesuite.net"),
        );

        let echo = apply_bindings(&plane, &property, Some(&map)).unwrap();

        let stored = plane.recorded_bindings(&property.property_id);
        assert_eq!(stored.len(), 1, "old bindings must not survive");
        assert_eq!(stored[0].cname_from, "www.example.com");
        assert_eq!(stored[0].cname_to, "www.example.com.edgesuite.net");
        assert_eq!(stored[0].edge_hostname_id, "ehn_1");

        assert_eq!(
            echo.get("www-example-com"),
            Some(&"www.example.com.edgesuite.net".to_string())
        );
    }

    #[test]
    fn skipped_resolution_reads_back_existing_state() {
        let plane = InMemoryPlane::new();
        let property = plane.seed_property("www.example.com");
        let existing = edge("ehn_1", "www.example.com.edgesuite.net");
        HostnameStore::save(
            &plane,
            &property,
            &[HostnameBinding::to_edge_hostname(
                "www.example.com",
                &existing,
            )],
        )
        .unwrap();

        let echo = apply_bindings(&plane, &property, None).unwrap();
        assert_eq!(echo.len(), 1);
        assert_eq!(
            echo.get("www-example-com"),
            Some(&"www.example.com.edgesuite.net".to_string())
        );
    }
}
