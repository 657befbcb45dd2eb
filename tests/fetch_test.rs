//! HTTP fetching: status handling, decoding and headers.

mod common;

use common::{Route, TestOrigin, closed_port_url};
use steamguide::fetch::BROWSER_USER_AGENT;
use steamguide::{Error, Fetcher, ImageSource};

#[test]
fn test_fetch_page_sends_browser_user_agent() {
    let origin = TestOrigin::start(vec![Route::new("/", "text/html", "<p>ok</p>")]);

    let body = Fetcher::new().unwrap().fetch_page(&origin.url("/")).unwrap();

    assert_eq!(body, "<p>ok</p>");
    let requests = origin.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].user_agent.as_deref(), Some(BROWSER_USER_AGENT));
}

#[test]
fn test_fetch_page_uses_declared_charset() {
    // "Grüße" in ISO-8859-1
    let bytes: Vec<u8> = vec![0x47, 0x72, 0xFC, 0xDF, 0x65];
    let origin = TestOrigin::start(vec![Route::new(
        "/latin1",
        "text/html; charset=ISO-8859-1",
        bytes,
    )]);

    let body = Fetcher::new()
        .unwrap()
        .fetch_page(&origin.url("/latin1"))
        .unwrap();

    assert_eq!(body, "Grüße");
}

#[test]
fn test_non_success_status_is_network_error() {
    let origin = TestOrigin::start(vec![
        Route::new("/gone", "text/html", "gone").with_status(410),
        Route::new("/broken", "text/html", "oops").with_status(500),
    ]);
    let fetcher = Fetcher::new().unwrap();

    for path in ["/gone", "/broken", "/unknown"] {
        let err = fetcher.fetch_page(&origin.url(path)).unwrap_err();
        assert!(matches!(err, Error::Network { .. }), "{path}: got {err:?}");
    }
}

#[test]
fn test_connection_refused_is_network_error() {
    let err = Fetcher::new()
        .unwrap()
        .fetch_page(&closed_port_url())
        .unwrap_err();

    match err {
        Error::Network { url, .. } => assert!(url.starts_with("http://127.0.0.1:")),
        other => panic!("expected network error, got {other:?}"),
    }
}

#[test]
fn test_image_source_reports_image_download_errors() {
    let origin = TestOrigin::start(vec![Route::new("/a.png", "image/png", vec![1u8, 2, 3])]);
    let fetcher = Fetcher::new().unwrap();

    assert_eq!(fetcher.fetch_image(&origin.url("/a.png")).unwrap(), [1, 2, 3]);

    let err = fetcher.fetch_image(&origin.url("/b.png")).unwrap_err();
    match err {
        Error::ImageDownload { url, .. } => assert!(url.ends_with("/b.png")),
        other => panic!("expected image download error, got {other:?}"),
    }
}
