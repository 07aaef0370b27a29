//! Cache-defeating query parameters
//!
//! Content navigation always wants the current document, never an
//! intermediary's copy, so each request carries a unique query value.

use url::Url;

/// `url` with `param=nonce` set, replacing any earlier value of `param`
pub fn cache_busted(url: &Url, param: &str, nonce: &str) -> Url {
    let mut busted = without_param(url, param);
    busted.query_pairs_mut().append_pair(param, nonce);
    busted
}

/// `url` with every occurrence of `param` removed from the query
pub fn without_param(url: &Url, param: &str) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != param)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut clean = url.clone();
    if kept.is_empty() {
        clean.set_query(None);
    } else {
        clean.query_pairs_mut().clear().extend_pairs(kept);
    }
    clean
}
