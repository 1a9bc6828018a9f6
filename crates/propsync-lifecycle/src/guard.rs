use propsync_model::Property;
use propsync_plane::{PlaneError, PropertyStore};

/// Guarantee the property's latest version is editable before any mutation.
///
/// The remote plane freezes a version the moment an activation touches it on
/// either network. When the latest version reports anything other than
/// `INACTIVE` on staging or production, a fresh unlocked version is cloned
/// from it and persisted, and a refreshed property snapshot is returned.
/// A still-inactive latest version comes back unchanged.
///
/// This check is advisory, not a lock: two reconcilers racing the same
/// property can both see an editable version. Callers serialize externally;
/// the remote plane's own versioning is the authoritative arbiter.
pub fn ensure_editable(
    store: &dyn PropertyStore,
    property: &Property,
) -> Result<Property, PlaneError> {
    let latest = store.latest_version(&property.property_id)?;
    if latest.is_editable() {
        return Ok(property.clone());
    }

    tracing::debug!(
        property_id = %property.property_id,
        frozen_version = latest.property_version,
        "latest version frozen by a prior activation; creating a new version"
    );
    store.new_version_from(&property.property_id, latest.property_version, false)?;
    store.find(&property.property_id)
}
