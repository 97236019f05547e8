//! Integration tests for a full run against mock Pfam and PubSEED services.

use std::sync::Arc;
use std::time::Duration;

use pfam_fusions::report::{DETAILS_HEADER, SUMMARY_HEADER};
use pfam_fusions::{
    Endpoints, HttpFetcher, HttpTimeouts, MissPolicy, PipelineError, PollSettings, Settings, run,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::fixtures::{FASTA, mount_family, mount_pubseed, mount_two_job_scenario};
use support::socket_guard::start_mock_server_or_skip;

fn settings(server: &MockServer, dir: &TempDir, fasta: &str) -> Settings {
    let input = dir.path().join("input.fasta");
    std::fs::write(&input, fasta).unwrap();
    let mut settings = Settings::new(
        input,
        dir.path().join("summary.tsv"),
        dir.path().join("details.tsv"),
    );
    settings.endpoints =
        Endpoints::new(&server.uri(), &format!("{}/seed", server.uri())).unwrap();
    settings.poll = PollSettings {
        interval: Duration::ZERO,
        max_cycles: None,
    };
    settings.submit_delay = Duration::ZERO;
    settings
}

fn fetcher() -> Arc<HttpFetcher> {
    let timeouts = HttpTimeouts {
        connect_secs: 5,
        read_secs: 10,
    };
    Arc::new(HttpFetcher::new(timeouts).unwrap())
}

#[tokio::test]
async fn test_two_identifiers_one_failed_job() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_two_job_scenario(&server).await;
    let dir = TempDir::new().unwrap();
    let settings = settings(&server, &dir, FASTA);

    let summary = run(&settings, fetcher()).await.unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(summary.submitted, 2);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.architectures, 1);
    assert_eq!(summary.members, 1);

    let uri = server.uri();
    let summary_tsv = std::fs::read_to_string(&settings.summary).unwrap();
    let lines: Vec<_> = summary_tsv.lines().collect();
    assert_eq!(lines.len(), 2, "expected header and one row:\n{summary_tsv}");
    assert_eq!(lines[0], SUMMARY_HEADER);
    assert_eq!(
        lines[1],
        format!(
            "orf1\tputative helicase\tDEAD (PF00270)\t24\t\
             =HYPERLINK(\"{uri}/protein/P12345\",\"P12345\")\t\
             =HYPERLINK(\"{uri}/seed?page=Annotation&feature=fig|83333.1.peg.4\",\"fig|83333.1.peg.4\")\t\
             DEAD\tHelicase_C"
        )
    );

    let details_tsv = std::fs::read_to_string(&settings.details).unwrap();
    let lines: Vec<_> = details_tsv.lines().collect();
    assert_eq!(lines[0], DETAILS_HEADER);
    assert_eq!(
        lines[1],
        format!(
            "orf1\tputative helicase\tDEAD (PF00270)\t\
             There are 24 sequences with the following architecture: DEAD, Helicase_C\t\
             =HYPERLINK(\"{uri}/protein/P12345\",\"P12345\")\t\
             DNA helicase\t320\tEscherichia coli"
        )
    );
}

#[tokio::test]
async fn test_pending_job_is_polled_until_done() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/search/sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<jobs><job><result_url>/search/sequence/resultset/SLOW?output=xml</result_url></job></jobs>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/SLOW"))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/SLOW"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<pfam><results/></pfam>"))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let settings = settings(&server, &dir, ">orf1\nMKV\n");

    let summary = run(&settings, fetcher()).await.unwrap();

    assert_eq!(summary.succeeded, 1);
    assert_eq!(summary.families, 0);
    let polls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/search/sequence/resultset/SLOW")
        .count();
    assert_eq!(polls, 3);
}

#[tokio::test]
async fn test_poll_cap_abandons_pending_job() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/search/sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<jobs><job><result_url>/search/sequence/resultset/STUCK?output=xml</result_url></job></jobs>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/STUCK"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings(&server, &dir, ">orf1\nMKV\n");
    settings.poll.max_cycles = Some(2);

    let summary = run(&settings, fetcher()).await.unwrap();

    assert_eq!(summary.abandoned, 1);
    assert_eq!(summary.architectures, 0);
}

#[tokio::test]
async fn test_listing_server_error_ends_run_without_reports() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/search/sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<jobs><job><result_url>/search/sequence/resultset/J?output=xml</result_url></job></jobs>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/J"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<pfam><match accession="PF00270"/></pfam>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/family/PF00270"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    let settings = settings(&server, &dir, ">orf1\nMKV\n");

    let err = run(&settings, fetcher()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Transport(_)), "{err}");
    assert!(err.to_string().contains("503"));
    assert!(!settings.summary.exists());
}

#[tokio::test]
async fn test_fail_policy_surfaces_malformed_member() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("POST"))
        .and(path("/search/sequence"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<jobs><job><result_url>/search/sequence/resultset/J?output=xml</result_url></job></jobs>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search/sequence/resultset/J"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"<pfam><match accession="PF00270"/></pfam>"#),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/domaingraphics/PF00270"))
        .and(wiremock::matchers::query_param("arch", "777"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><div><div>garbled block</div></div></body></html>"),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    mount_family(&server).await;
    mount_pubseed(&server, "<html></html>").await;
    let dir = TempDir::new().unwrap();
    let mut settings = settings(&server, &dir, ">orf1\nMKV\n");
    settings.miss_policy = MissPolicy::Fail;

    let err = run(&settings, fetcher()).await.unwrap_err();

    assert!(matches!(err, PipelineError::Extraction(_)), "{err}");
    assert!(err.to_string().contains("garbled block"));
}
