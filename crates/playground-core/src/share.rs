//! Share links: a [`SourceSet`] carried in three URL query parameters.
//!
//! Values use `application/x-www-form-urlencoded` percent-encoding. Decoding
//! is all-or-nothing: unless all three parameters are present the caller
//! keeps its defaults.

use url::Url;
use url::form_urlencoded;

use crate::config::ShareParams;
use crate::error::Result;
use crate::source::SourceSet;

/// Set the three parameters on `base_url`, replacing earlier values and
/// keeping unrelated parameters in order.
pub fn encode_share_link(
    base_url: &str,
    sources: &SourceSet,
    params: &ShareParams,
) -> Result<String> {
    let mut url = Url::parse(base_url)?;
    let names = params.names();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !names.contains(&&**k))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut query = url.query_pairs_mut();
        query.clear();
        for (k, v) in &kept {
            query.append_pair(k, v);
        }
        query
            .append_pair(&params.markup, &sources.markup)
            .append_pair(&params.style, &sources.style)
            .append_pair(&params.script, &sources.script);
    }
    Ok(url.into())
}

/// Decode a full URL. `Ok(None)` when any of the three parameters is missing.
pub fn decode_share_link(url: &str, params: &ShareParams) -> Result<Option<SourceSet>> {
    let url = Url::parse(url)?;
    Ok(decode_query(url.query().unwrap_or(""), params))
}

/// Decode a raw query string (with or without a leading `?`).
#[must_use]
pub fn decode_query(query: &str, params: &ShareParams) -> Option<SourceSet> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let (mut markup, mut style, mut script) = (None, None, None);
    for (k, v) in form_urlencoded::parse(query.as_bytes()) {
        let slot = if k == params.markup.as_str() {
            &mut markup
        } else if k == params.style.as_str() {
            &mut style
        } else if k == params.script.as_str() {
            &mut script
        } else {
            continue;
        };
        *slot = Some(v.into_owned());
    }
    Some(SourceSet::new(markup?, style?, script?))
}
