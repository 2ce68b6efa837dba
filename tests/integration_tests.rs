use std::sync::Arc;

use mockito::{Matcher, Server};
use url::Url;
use wordpress_xmlrpc::xmlrpc::{encode_fault, encode_response, structure};
use wordpress_xmlrpc::*;

#[cfg(test)]
mod tests {
    use super::*;

    struct TestData;
    impl TestData {
        const USERNAME: &'static str = "admin";
        const PASSWORD: &'static str = "secret";
        const TOKEN: &'static str = "oauth-token";
    }

    fn transport() -> Arc<HttpTransport> {
        Arc::new(HttpTransport::new().unwrap())
    }

    fn endpoint_of(server: &Server) -> Url {
        Url::parse(&format!("{}/xmlrpc.php", server.url())).unwrap()
    }

    fn password_client(server: &Server) -> ApiClient {
        ApiClient::with_password(
            endpoint_of(server),
            TestData::USERNAME,
            TestData::PASSWORD,
            transport(),
        )
    }

    #[tokio::test]
    async fn test_discovery_prefers_conventional_path() {
        let mut server = Server::new_async().await;
        let probe = server
            .mock("POST", "/xmlrpc.php")
            .match_body(Matcher::Regex("system\\.listMethods".to_string()))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(encode_response(&Value::Array(vec![])))
            .create_async()
            .await;

        let transport = transport();
        let found = ApiClient::resolve_endpoint(&server.url(), transport.clone(), transport)
            .await
            .unwrap();

        assert_eq!(found.site, server.url());
        assert_eq!(found.endpoint, endpoint_of(&server));
        probe.assert_async().await;
    }

    #[tokio::test]
    async fn test_discovery_uses_site_address_when_it_is_the_endpoint() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/custom/rpc")
            .with_status(200)
            .with_body(encode_fault(-32601, "server error. requested method not found"))
            .create_async()
            .await;

        let site = format!("{}/custom/rpc", server.url());
        let transport = transport();
        let found = ApiClient::resolve_endpoint(&site, transport.clone(), transport)
            .await
            .unwrap();
        assert_eq!(found.endpoint.as_str(), site);
    }

    #[tokio::test]
    async fn test_discovery_falls_back_to_edit_uri() {
        let mut server = Server::new_async().await;
        let html = format!(
            r#"<!DOCTYPE html><html><head>
<link rel="EditURI" type="application/rsd+xml" title="RSD" href="{}/wp/xmlrpc.php?rsd" />
</head><body>Hello</body></html>"#,
            server.url()
        );
        let page = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(html)
            .create_async()
            .await;
        server
            .mock("POST", "/xmlrpc.php")
            .with_status(404)
            .create_async()
            .await;

        let transport = transport();
        let found = ApiClient::resolve_endpoint(&server.url(), transport.clone(), transport)
            .await
            .unwrap();

        assert_eq!(
            found.endpoint,
            Url::parse(&format!("{}/wp/xmlrpc.php", server.url())).unwrap()
        );
        page.assert_async().await;
    }

    #[tokio::test]
    async fn test_discovery_failure_reports_only_the_site() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(200)
            .with_body("<html><head><title>No RPC here</title></head></html>")
            .create_async()
            .await;

        let transport = transport();
        let err = ApiClient::resolve_endpoint(&server.url(), transport.clone(), transport)
            .await
            .unwrap_err();
        assert_eq!(err.site, server.url());
    }

    #[tokio::test]
    async fn test_publish_over_http() {
        let mut server = Server::new_async().await;
        let new_post = server
            .mock("POST", "/xmlrpc.php")
            .match_header("content-type", "text/xml")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("<methodName>wp\\.newPost</methodName>".to_string()),
                Matcher::Regex("<string>Hi</string>".to_string()),
                Matcher::Regex("<string>world</string>".to_string()),
                Matcher::Regex("<string>secret</string>".to_string()),
            ]))
            .with_status(200)
            .with_body(encode_response(&Value::from("42")))
            .expect(1)
            .create_async()
            .await;

        let client = password_client(&server);
        let result = client
            .publish(&Post::new(Some("Hi"), Some("world")))
            .await
            .unwrap();

        assert_eq!(result.id, 42);
        assert_eq!(result.address, format!("{}/?p=42", server.url()));
        new_post.assert_async().await;
    }

    #[tokio::test]
    async fn test_publish_with_gallery_sends_shortcode_first() {
        let mut server = Server::new_async().await;
        let new_post = server
            .mock("POST", "/xmlrpc.php")
            .match_body(Matcher::Regex(
                r#"\[gallery ids="1,2"\]\n\nOur trip"#.to_string(),
            ))
            .with_status(200)
            .with_body(encode_response(&structure([
                ("post_id", Value::from("9")),
                ("short_url", Value::from("https://wp.me/p9")),
            ])))
            .create_async()
            .await;

        let gallery = Attachment::Gallery(vec![
            MediaItem {
                id: 1,
                url: "https://example.com/1.jpg".to_string(),
            },
            MediaItem {
                id: 2,
                url: "https://example.com/2.jpg".to_string(),
            },
        ]);
        let post = Post::new(Some("Trip"), Some("Our trip")).with_attachment(gallery);
        let result = password_client(&server).publish(&post).await.unwrap();

        assert_eq!(result.address, "https://wp.me/p9");
        new_post.assert_async().await;
    }

    #[tokio::test]
    async fn test_check_credentials_over_http() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/xmlrpc.php")
            .match_body(Matcher::Regex("wp\\.getUsersBlogs".to_string()))
            .with_status(200)
            .with_body(encode_fault(403, "Incorrect username or password."))
            .create_async()
            .await;

        let valid = password_client(&server).check_credentials().await;
        assert_eq!(valid, Ok(false));
    }

    #[tokio::test]
    async fn test_check_credentials_server_error_is_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/xmlrpc.php")
            .with_status(503)
            .create_async()
            .await;

        let err = password_client(&server).check_credentials().await.unwrap_err();
        assert_eq!(err.domain, ErrorDomain::Transport);
        assert_eq!(err.code, 503);
    }

    #[tokio::test]
    async fn test_check_credentials_unreachable_host() {
        let client = ApiClient::with_password(
            Url::parse("http://127.0.0.1:1/xmlrpc.php").unwrap(),
            TestData::USERNAME,
            TestData::PASSWORD,
            transport(),
        );
        let err = client.check_credentials().await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_html_answer_is_response_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/xmlrpc.php")
            .with_status(200)
            .with_body("<html><body>XML-RPC server accepts POST requests only.</body></html>")
            .create_async()
            .await;

        let err = password_client(&server).recent_posts(3).await.unwrap_err();
        assert_eq!(err.domain, ErrorDomain::Response);
    }

    #[tokio::test]
    async fn test_recent_posts_with_token() {
        let mut server = Server::new_async().await;
        let list = server
            .mock("POST", "/xmlrpc.php")
            .match_header("authorization", "Bearer oauth-token")
            .match_body(Matcher::Regex("wp\\.getPosts".to_string()))
            .with_status(200)
            .with_body(encode_response(&Value::Array(vec![
                structure([
                    ("post_id", Value::from("8")),
                    ("post_title", Value::from("Second")),
                    ("post_content", Value::from("<p>two</p>")),
                ]),
                structure([
                    ("post_id", Value::from("5")),
                    ("post_title", Value::from("First")),
                    ("post_content", Value::from("<p>one</p>")),
                ]),
            ])))
            .create_async()
            .await;

        let client = ApiClient::with_token(endpoint_of(&server), TestData::TOKEN, transport());
        let posts = client.recent_posts(2).await.unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Second");
        assert_eq!(posts[1].content, "<p>one</p>");
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_delegated_callback_builds_working_client() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/xmlrpc.php")
            .match_header("authorization", "Bearer oauth-token")
            .with_status(200)
            .with_body(encode_response(&Value::Array(vec![])))
            .create_async()
            .await;

        let locator = format!(
            "myapp://wordpress-sso?xmlrpc={}&token={}",
            url::form_urlencoded::byte_serialize(endpoint_of(&server).as_str().as_bytes())
                .collect::<String>(),
            TestData::TOKEN
        );
        let auth = CallbackParser::new("myapp").parse(&locator).unwrap();
        let client = auth.into_client(transport()).unwrap();

        assert_eq!(client.endpoint(), &endpoint_of(&server));
        assert_eq!(client.check_credentials().await, Ok(true));
    }

    #[tokio::test]
    async fn test_transport_from_configured_client() {
        let mut server = Server::new_async().await;
        let check = server
            .mock("POST", "/xmlrpc.php")
            .match_header("x-site-key", "abc")
            .with_status(200)
            .with_body(encode_response(&Value::Array(vec![])))
            .expect(1)
            .create_async()
            .await;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("x-site-key", reqwest::header::HeaderValue::from_static("abc"));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .unwrap();
        let transport = Arc::new(HttpTransport::from_client(client));

        let api = ApiClient::with_password(
            endpoint_of(&server),
            TestData::USERNAME,
            TestData::PASSWORD,
            transport,
        );
        assert_eq!(api.check_credentials().await, Ok(true));
        check.assert_async().await;
    }

    #[tokio::test]
    async fn test_spawned_operation_delivers_one_outcome() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/xmlrpc.php")
            .with_status(200)
            .with_body(encode_response(&Value::from("3")))
            .create_async()
            .await;

        let client = password_client(&server);
        let pending = spawn_on(&tokio::runtime::Handle::current(), async move {
            client.publish(&Post::new(Some("Bg"), None)).await
        });

        let result = pending.await.unwrap();
        assert_eq!(result.id, 3);
    }
}
