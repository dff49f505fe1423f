//! Request line -> route.

/// Every endpoint the server answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    Upload,
    Confirm,
    Shipments { company_id: Option<String> },
    History { shipment_id: String },
    Companies,
}

/// Why a request matched no route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMiss {
    NotFound,
    MethodNotAllowed,
}

/// Resolve a method and request target (path plus optional query).
///
/// # Errors
///
/// `RouteMiss::NotFound` for unknown paths, `RouteMiss::MethodNotAllowed`
/// for known paths requested with the wrong method.
pub fn resolve(method: &str, url: &str) -> Result<Route, RouteMiss> {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let (expected, route) = match segments.as_slice() {
        ["health"] => ("GET", Route::Health),
        ["api", "invoices", "upload"] => ("POST", Route::Upload),
        ["api", "invoices", "confirm"] => ("POST", Route::Confirm),
        ["api", "shipments"] => (
            "GET",
            Route::Shipments {
                company_id: query_param(query, "companyId").filter(|v| !v.is_empty()),
            },
        ),
        ["api", "shipments", id, "history"] => (
            "GET",
            Route::History {
                shipment_id: decode(id),
            },
        ),
        ["api", "companies"] => ("GET", Route::Companies),
        _ => return Err(RouteMiss::NotFound),
    };

    if method.eq_ignore_ascii_case(expected) {
        Ok(route)
    } else {
        Err(RouteMiss::MethodNotAllowed)
    }
}

/// First value of `name` in a `k=v&k=v` query string, percent-decoded.
fn query_param(query: &str, name: &str) -> Option<String> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| decode(value))
}

/// Percent-decode a URL component, treating `+` as a space. Invalid UTF-8
/// falls back to the raw text.
fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced).map_or(spaced.clone(), std::borrow::Cow::into_owned)
}
