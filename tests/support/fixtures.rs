//! Mock Pfam and PubSEED services.

use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FAMILY: &str = "PF00270";
pub const ACCESSOR: &str = "777";

/// Sequence of the query whose job succeeds.
pub const GOOD_SEQUENCE: &str = "MKVAAAGL";
/// Sequence of the query whose job fails upstream.
pub const BAD_SEQUENCE: &str = "MLLLLPRT";

pub const FASTA: &str = ">orf1 putative helicase\nMKVA\nAAGL\n\n>orf2 hypothetical protein\nMLLLLPRT\n";

pub const FAMILY_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pfam release="27.0"><entry entry_type="Pfam" accession="PF00270" id="DEAD"/></pfam>"#;

pub const RESULT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<pfam><results><matches><protein><database id="pfam">
  <match accession="PF00270" id="DEAD" type="Pfam-A" class="Domain"><location start="10" end="170"/></match>
</database></protein></matches></results></pfam>"#;

pub const LISTING_HTML: &str = r#"<html><body>
<div class="graphicRow odd" id="rowQ9XYZ1">
  <h3>There are 24 sequences with the following architecture: DEAD, Helicase_C</h3>
</div>
<div class="graphicRow even" id="rowP00001">
  <h3>There is 1 sequence with the following architecture: DEAD</h3>
</div>
<script type="text/javascript">
  rows["rowQ9XYZ1"] = $("rowQ9XYZ1");
  rows["rowQ9XYZ1"].store( "arch", "777" );
  rows["rowP00001"] = $("rowP00001");
  rows["rowP00001"].store( "arch", "888" );
  var layout = [];
</script>
</body></html>"#;

pub const DETAIL_HTML: &str = r#"<html><body><div>
  <div>P12345 [Escherichia coli] DNA helicase (320 residues)</div>
</div></body></html>"#;

pub const PUBSEED_HIT: &str = r#"<html><body><input type="hidden" id="table_data_0" value="&lt;a href=&quot;?page=Annotation&amp;feature=fig|83333.1.peg.4&quot;&gt;fig|83333.1.peg.4&lt;/a&gt;"/></body></html>"#;

fn search_ack(job: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?><jobs><job job_id=\"{job}\"><result_url>/search/sequence/resultset/{job}?output=xml</result_url></job></jobs>"
    )
}

/// Mounts the two-identifier scenario: `orf1` succeeds with one family
/// carrying one fused architecture with one member; `orf2` fails with 502.
pub async fn mount_two_job_scenario(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/search/sequence"))
        .and(body_string_contains(GOOD_SEQUENCE))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_ack("JOB1")))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/search/sequence"))
        .and(body_string_contains(BAD_SEQUENCE))
        .respond_with(ResponseTemplate::new(200).set_body_string(search_ack("JOB2")))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/JOB1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(RESULT_XML))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/JOB2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(server)
        .await;

    mount_family(server).await;
    mount_pubseed(server, PUBSEED_HIT).await;
}

/// Mounts the family name, listing and detail pages of [`FAMILY`].
///
/// The detail page is mounted at priority 2 so a test can override it.
pub async fn mount_family(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/family/{FAMILY}")))
        .and(query_param("output", "xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FAMILY_XML))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/domaingraphics/{FAMILY}")))
        .and(query_param("arch", ACCESSOR))
        .respond_with(ResponseTemplate::new(200).set_body_string(DETAIL_HTML))
        .with_priority(2)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/domaingraphics/{FAMILY}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING_HTML))
        .mount(server)
        .await;
}

/// Mounts the PubSEED search form under `/seed`.
pub async fn mount_pubseed(server: &MockServer, body: &str) {
    Mock::given(method("POST"))
        .and(path("/seed"))
        .and(body_string_contains("act=do_search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
        .mount(server)
        .await;
}
