//! Shared helpers for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::fetch::{FetchError, FetchResponse, MarkupFetcher};

/// In-memory transport that replays scripted responses per URL.
///
/// Each URL owns a queue; the last response repeats once the queue is down to
/// one entry. Unscripted URLs answer 404.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, VecDeque<FetchResponse>>>,
    failing: Mutex<HashSet<String>>,
    gets: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends responses for `url`.
    pub fn script(&self, url: &str, responses: &[(u16, &str)]) {
        let mut all = self.responses.lock().unwrap();
        let queue = all.entry(url.to_string()).or_default();
        queue.extend(
            responses
                .iter()
                .map(|(status, body)| FetchResponse::new(*status, *body)),
        );
    }

    /// Makes every request to `url` fail with a timeout.
    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    /// Number of GETs issued against `url`.
    pub fn get_count(&self, url: &str) -> usize {
        self.gets.lock().unwrap().iter().filter(|u| *u == url).count()
    }

    /// Form bodies of every POST, in request order.
    pub fn form_posts(&self) -> Vec<Vec<(String, String)>> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, fields)| fields.clone())
            .collect()
    }

    fn answer(&self, url: &str) -> Result<FetchResponse, FetchError> {
        if self.failing.lock().unwrap().contains(url) {
            return Err(FetchError::timeout(url));
        }
        let mut all = self.responses.lock().unwrap();
        let Some(queue) = all.get_mut(url) else {
            return Ok(FetchResponse::new(404, "not scripted"));
        };
        let response = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or_else(|| FetchResponse::new(404, ""))
        };
        Ok(response)
    }
}

#[async_trait]
impl MarkupFetcher for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse, FetchError> {
        self.gets.lock().unwrap().push(url.to_string());
        self.answer(url)
    }

    async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> Result<FetchResponse, FetchError> {
        let fields = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.posts.lock().unwrap().push((url.to_string(), fields));
        self.answer(url)
    }
}

/// Family document naming `PF00270` "DEAD".
pub const FAMILY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pfam xmlns="http://pfam.xfam.org/" release="27.0">
  <entry entry_type="Pfam" accession="PF00270" id="DEAD">
    <description>DEAD/DEAH box helicase</description>
  </entry>
</pfam>"#;

/// Listing with two qualifying rows (one with an accessor each), one
/// singleton row and one row without a heading.
pub const LISTING_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Domain graphics</title></head><body>
<div id="graphics">
  <div class="graphicRow odd" id="rowQ9XYZ1">
    <h3>There are 24 sequences with the following
        architecture: DEAD, Helicase_C</h3>
    <span class="graphic"></span>
  </div>
  <div class="graphicRow even" id="rowP00001">
    <h3>There is 1 sequence with the following architecture: DEAD</h3>
  </div>
  <div class="graphicRow odd" id="rowR77777">
    <h3>There are 3 sequences with the following architecture: DEAD x 2</h3>
  </div>
  <div class="graphicRow even" id="rowBAD1"><p>no heading</p></div>
</div>
<script type="text/javascript">
  var rows = {};
  rows["rowQ9XYZ1"] = $("rowQ9XYZ1");
  rows["rowQ9XYZ1"].store( "arch", "10010 20020" );
  rows["rowP00001"] = $("rowP00001");
  rows["rowP00001"].store( "arch", "30030" );
  var layout = [ { "rowR77777": 1 } ];
</script>
</body></html>"#;

/// Detail view with two member blocks, an empty block, a non-`div` child
/// and a malformed block.
pub const DETAIL_PAGE: &str = r#"<html><body>
<div id="members">
  <div>P12345 <span>[Escherichia coli]</span>
       DNA helicase (320 residues)</div>
  <div>Q67890 [Bacillus subtilis] ATP-dependent RNA helicase (455 residues)</div>
  <div>   </div>
  <p>P99999 [Ignored] paragraph (1 residues)</p>
  <div>not a member block</div>
</div>
</body></html>"#;

/// A PubSEED search result page; `None` renders a page without hits.
pub fn pubseed_page(fig_id: Option<&str>) -> String {
    let value = fig_id.map_or_else(
        || "No matching features".to_string(),
        |id| {
            format!(
                "&lt;a href=&quot;?page=Annotation&amp;feature={id}&quot;&gt;{id}&lt;/a&gt;@~Escherichia coli"
            )
        },
    );
    format!(
        r#"<html><body><form><input type="hidden" id="table_data_0" value="{value}"/></form></body></html>"#
    )
}
