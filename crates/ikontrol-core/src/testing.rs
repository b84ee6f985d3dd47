//! In-memory transport for unit tests.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use url::Url;

use crate::ikontrol::{ApiBase, IKontrolClient, Transport};

const MENU_ITEMS: &str = "/1/key/MenuItem/GetAll";

/// Serves canned bodies keyed by `path?query` and records every request.
/// Unknown routes fail like a 404 would.
#[derive(Default)]
pub(crate) struct FakeTransport {
    routes: HashMap<String, Vec<u8>>,
    calls: RefCell<Vec<String>>,
}

impl FakeTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn json(self, route: &str, body: Value) -> Self {
        self.raw(route, body.to_string().into_bytes())
    }

    pub(crate) fn raw(mut self, route: &str, body: Vec<u8>) -> Self {
        self.routes.insert(route.to_string(), body);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for FakeTransport {
    fn get(&self, url: &Url) -> Result<Vec<u8>> {
        let route = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };
        self.calls.borrow_mut().push(route.clone());
        self.routes
            .get(&route)
            .cloned()
            .with_context(|| format!("GET {route} returned HTTP 404"))
    }
}

/// Client against `http://ikontrol.test/1/key` with a 1970-01-01 cutoff.
/// Without a menu-item route the task cache starts empty.
pub(crate) fn client_with(fake: FakeTransport) -> IKontrolClient<FakeTransport> {
    let fake = if fake.routes.contains_key(MENU_ITEMS) {
        fake
    } else {
        fake.raw(MENU_ITEMS, b"[]".to_vec())
    };
    IKontrolClient::new(
        fake,
        ApiBase::new("http://ikontrol.test", "1", "key"),
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
    )
    .unwrap()
}
