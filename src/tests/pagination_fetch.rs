#[cfg(test)]
mod test {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use chrono::TimeDelta;
    use httpmock::MockServer;

    use crate::cache::credential::Credential;
    use crate::error::FetchError;
    use crate::tests::common::{
        build_client, items, listing, ok, spawn_axum, spawn_listing_server, start_time, test_settings,
        LISTING_PATH, USER_AGENT,
    };

    fn credential() -> Credential {
        Credential::new("bearer-abc".into(), start_time() + TimeDelta::hours(1))
    }

    #[tokio::test]
    async fn three_pages_are_collected_in_order() {
        let mut pages = HashMap::new();
        pages.insert(None, ok(listing(items("p1", 100), Some("page1"))));
        pages.insert(Some("page1".to_owned()), ok(listing(items("p2", 100), Some("page2"))));
        pages.insert(Some("page2".to_owned()), ok(listing(items("p3", 37), None)));
        let (handle, addr, seen) = spawn_listing_server(pages).await;
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, format!("http://{addr}"), &test_settings(100, 10));

        let walk = client.fetch_all(LISTING_PATH, &credential()).await.unwrap();

        assert_eq!(walk.items.len(), 237);
        assert_eq!(walk.pages, 3);
        assert_eq!(walk.items[0]["title"], "p1-0");
        assert_eq!(walk.items[99]["title"], "p1-99");
        assert_eq!(walk.items[100]["title"], "p2-0");
        assert_eq!(walk.items[236]["title"], "p3-36");

        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        let cursors: Vec<Option<String>> = seen.iter().map(|r| r.after.clone()).collect();
        assert_eq!(cursors, vec![None, Some("page1".to_owned()), Some("page2".to_owned())]);
        for request in &seen {
            assert_eq!(request.limit.as_deref(), Some("100"));
            assert_eq!(request.authorization.as_deref(), Some("Bearer bearer-abc"));
            assert_eq!(request.user_agent.as_deref(), Some(USER_AGENT));
        }
        handle.abort();
    }

    #[tokio::test]
    async fn failing_second_page_discards_everything() {
        let mut pages = HashMap::new();
        pages.insert(None, ok(listing(items("p1", 100), Some("page1"))));
        pages.insert(Some("page1".to_owned()), (StatusCode::SERVICE_UNAVAILABLE, "busy".to_owned()));
        let (handle, addr, seen) = spawn_listing_server(pages).await;
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, format!("http://{addr}"), &test_settings(100, 10));

        let result = client.fetch_all(LISTING_PATH, &credential()).await;

        match result {
            Err(FetchError::Rejected { status, .. }) => assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE),
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(seen.lock().unwrap().len(), 2);
        handle.abort();
    }

    #[tokio::test]
    async fn empty_first_page_is_an_empty_result() {
        let mut pages = HashMap::new();
        pages.insert(None, ok(listing(vec![], None)));
        let (handle, addr, _) = spawn_listing_server(pages).await;
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, format!("http://{addr}"), &test_settings(25, 10));

        let walk = client.fetch_all(LISTING_PATH, &credential()).await.unwrap();

        assert!(walk.items.is_empty());
        assert_eq!(walk.pages, 1);
        handle.abort();
    }

    #[tokio::test]
    async fn endless_cursor_hits_page_limit() {
        let mut pages = HashMap::new();
        pages.insert(None, ok(listing(items("a", 2), Some("loop"))));
        pages.insert(Some("loop".to_owned()), ok(listing(items("b", 2), Some("loop"))));
        let (handle, addr, seen) = spawn_listing_server(pages).await;
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, format!("http://{addr}"), &test_settings(2, 2));

        let err = client.fetch_all(LISTING_PATH, &credential()).await.unwrap_err();

        assert!(matches!(err, FetchError::PaginationLimitExceeded { max_pages: 2 }), "got {err:?}");
        assert_eq!(seen.lock().unwrap().len(), 2);
        handle.abort();
    }

    #[tokio::test]
    async fn last_allowed_page_without_cursor_succeeds() {
        let mut pages = HashMap::new();
        pages.insert(None, ok(listing(items("a", 2), Some("next"))));
        pages.insert(Some("next".to_owned()), ok(listing(items("b", 1), None)));
        let (handle, addr, _) = spawn_listing_server(pages).await;
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, format!("http://{addr}"), &test_settings(2, 2));

        let walk = client.fetch_all(LISTING_PATH, &credential()).await.unwrap();

        assert_eq!(walk.items.len(), 3);
        handle.abort();
    }

    #[tokio::test]
    async fn body_without_children_is_malformed() {
        let mut pages = HashMap::new();
        pages.insert(None, ok(r#"{"data":{"after":null}}"#.to_owned()));
        let (handle, addr, _) = spawn_listing_server(pages).await;
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, format!("http://{addr}"), &test_settings(100, 10));

        let err = client.fetch_all(LISTING_PATH, &credential()).await.unwrap_err();

        assert!(matches!(err, FetchError::MalformedEnvelope(_)), "got {err:?}");
        handle.abort();
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        let token_server = MockServer::start_async().await;
        let client = build_client(&token_server, "http://127.0.0.1:1".to_owned(), &test_settings(100, 10));

        let err = client.fetch_all(LISTING_PATH, &credential()).await.unwrap_err();

        assert!(matches!(err, FetchError::Unavailable(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn slow_provider_times_out_as_unavailable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let router = Router::new().route(
            LISTING_PATH,
            get(move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    listing(items("late", 1), None)
                }
            }),
        );
        let (handle, addr) = spawn_axum(router).await;
        let token_server = MockServer::start_async().await;
        let mut settings = test_settings(100, 10);
        settings.http.timeout_ms = 100;
        let client = build_client(&token_server, format!("http://{addr}"), &settings);

        let err = client.fetch_all(LISTING_PATH, &credential()).await.unwrap_err();

        match &err {
            FetchError::Unavailable(e) => assert!(e.is_timeout(), "expected timeout, got {e:?}"),
            other => panic!("expected unavailable, got {other:?}"),
        }
        // timeouts are transport failures, so every attempt is used
        assert_eq!(calls.load(Ordering::SeqCst), settings.retry.attempts as usize);
        handle.abort();
    }
}
