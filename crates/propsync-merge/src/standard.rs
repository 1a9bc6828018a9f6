//! Standard behaviors every property must carry, plus the sureRoute fixup.

use propsync_model::{Behavior, CpCode, OptionBag, OptionValue, OriginSpec, Rule};

use crate::tree::{find_behavior_mut, merge_behavior, merge_options};

/// Fixed path of the performance behavior the fixup targets.
pub const SURE_ROUTE_PATH: &str = "/Performance/sureRoute";

// ---------------------------------------------------------------------------
// Standard behaviors
// ---------------------------------------------------------------------------

/// Merge the synthetic `cpCode` and `origin` behaviors into the root rule.
/// Runs before any user-declared rules so that every property ends up with
/// both regardless of what the declaration contains.
pub fn apply_standard_behaviors(
    root: &mut Rule,
    cp_code: Option<&CpCode>,
    origin: Option<&OptionBag>,
) {
    if let Some(cp_code) = cp_code {
        let mut id = OptionBag::new();
        id.insert("id".to_string(), OptionValue::Int(cp_code.numeric_id()));
        let mut options = OptionBag::new();
        options.insert("value".to_string(), OptionValue::Map(id));
        merge_behavior(root, Behavior::new("cpCode", options));
    }

    if let Some(origin) = origin {
        merge_behavior(root, Behavior::new("origin", origin.clone()));
    }
}

/// Expand a declared origin block into the `origin` behavior's option bag.
pub fn origin_options(origin: &OriginSpec) -> OptionBag {
    let mut bag = OptionBag::new();
    bag.insert("originType".to_string(), OptionValue::text("CUSTOMER"));
    bag.insert(
        "hostname".to_string(),
        OptionValue::text(origin.hostname.clone()),
    );
    bag.insert("httpPort".to_string(), OptionValue::Int(origin.port));
    bag.insert("httpsPort".to_string(), OptionValue::Int(origin.https_port));
    bag.insert(
        "cacheKeyHostname".to_string(),
        OptionValue::text(origin.cache_key_hostname.clone()),
    );
    bag.insert("compress".to_string(), OptionValue::Bool(origin.compress));
    bag.insert(
        "enableTrueClientIp".to_string(),
        OptionValue::Bool(origin.enable_true_client_ip),
    );
    bag.insert(
        "trueClientIpHeader".to_string(),
        OptionValue::text(origin.true_client_ip_header.clone()),
    );
    bag.insert(
        "trueClientIpClientSetting".to_string(),
        OptionValue::Bool(origin.true_client_ip_client_setting),
    );

    match origin.forward_hostname.as_str() {
        "ORIGIN_HOSTNAME" | "REQUEST_HOST_HEADER" => {
            bag.insert(
                "forwardHostHeader".to_string(),
                OptionValue::text(origin.forward_hostname.clone()),
            );
        }
        _ => {
            // The remote client sends the CUSTOM sentinel in both fields for
            // a custom forward hostname. Kept as-is for wire compatibility.
            bag.insert("forwardHostHeader".to_string(), OptionValue::text("CUSTOM"));
            bag.insert(
                "customForwardHostHeader".to_string(),
                OptionValue::text("CUSTOM"),
            );
        }
    }

    bag
}

// ---------------------------------------------------------------------------
// sureRoute fixup
// ---------------------------------------------------------------------------

/// Patch a `sureRoute` behavior that lacks a `testObjectUrl`.
///
/// The remote plane rejects a tree whose sureRoute behavior has no test
/// object configured. When the behavior exists at its fixed path with an
/// unset/empty `testObjectUrl`, exactly three keys are injected: a
/// placeholder test object URL and the two disabled flags. A behavior that
/// is absent or already configured is left untouched.
pub fn fixup_performance_behaviors(root: &mut Rule) {
    let Some(behavior) = find_behavior_mut(root, SURE_ROUTE_PATH) else {
        return;
    };
    match behavior.options.get("testObjectUrl") {
        Some(OptionValue::Text(url)) if url.is_empty() => {}
        None => {}
        Some(_) => return,
    }

    tracing::debug!("patching sureRoute behavior with disabled test object");
    let mut patch = OptionBag::new();
    patch.insert(
        "testObjectUrl".to_string(),
        OptionValue::text("/akamai/sureroute-testobject.html"),
    );
    patch.insert("enableCustomKey".to_string(), OptionValue::Bool(false));
    patch.insert("enabled".to_string(), OptionValue::Bool(false));
    merge_options(behavior, patch);
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
