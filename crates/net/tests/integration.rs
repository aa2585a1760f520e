//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use provaudit_net::*;
    use std::time::Duration;

    fn fast_client() -> NetClient {
        NetClient::new(NetConfig {
            retry_count: 0,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_bytes() {
        let server = MockServer::start();

        let content = b"PK\x03\x04 not really a zip";
        let mock = server.mock(|when, then| {
            when.method(GET).path("/archive.zip");
            then.status(200)
                .header("content-length", content.len().to_string())
                .body(content);
        });

        let client = fast_client();
        let bytes = fetch_bytes(&client, &server.url("/archive.zip"))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(bytes, content);
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/pypi/pkg/json");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(serde_json::json!({ "info": { "name": "pkg" } }));
        });

        let client = fast_client();
        let value: serde_json::Value = fetch_json(&client, &server.url("/pypi/pkg/json"))
            .await
            .unwrap();
        assert_eq!(value["info"]["name"], "pkg");
    }

    #[tokio::test]
    async fn test_http_error_handling() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/404");
            then.status(404).body("Not Found");
        });

        let client = fast_client();
        let error = fetch_bytes(&client, &server.url("/404")).await.unwrap_err();
        assert!(matches!(
            error,
            provaudit_errors::Error::Network(provaudit_errors::NetworkError::HttpError {
                status: 404,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(GET).path("/slow-down");
            then.status(429).header("retry-after", "7");
        });

        let client = fast_client();
        let error = fetch_bytes(&client, &server.url("/slow-down"))
            .await
            .unwrap_err();
        assert!(matches!(
            error,
            provaudit_errors::Error::Network(provaudit_errors::NetworkError::RateLimited {
                seconds: 7
            })
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/hang");
            then.status(200).delay(Duration::from_millis(500)).body("late");
        });

        let client = NetClient::new(NetConfig {
            timeout: Duration::from_millis(50),
            retry_count: 3,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        })
        .unwrap();

        let error = fetch_bytes(&client, &server.url("/hang")).await.unwrap_err();
        assert!(matches!(
            error,
            provaudit_errors::Error::Network(provaudit_errors::NetworkError::Timeout { .. })
        ));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_default_config_does_not_retry() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/down");
            then.status(502);
        });

        let client = NetClient::with_defaults().unwrap();
        assert!(fetch_bytes(&client, &server.url("/down")).await.is_err());
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });

        let client = NetClient::new(NetConfig {
            retry_count: 2,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        })
        .unwrap();

        let error = fetch_bytes(&client, &server.url("/flaky")).await.unwrap_err();
        assert!(matches!(
            error,
            provaudit_errors::Error::Network(provaudit_errors::NetworkError::HttpError {
                status: 503,
                ..
            })
        ));
        mock.assert_hits(3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let client = NetClient::new(NetConfig {
            retry_count: 3,
            retry_delay: Duration::from_millis(1),
            ..NetConfig::default()
        })
        .unwrap();

        assert!(fetch_bytes(&client, &server.url("/missing")).await.is_err());
        mock.assert_hits(1);
    }
}
