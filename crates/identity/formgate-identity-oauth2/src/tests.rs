//! Integration tests for the OAuth2 login flow against a mock provider.

#[cfg(test)]
mod integration_tests {
    use crate::{OAuth2Client, OAuth2Config, OAuth2Error, OAuth2Service};
    use formgate_identity_accounts::{InMemoryUserStore, StoreAccountResolver, UserStore};
    use formgate_identity_core::IdentityError;
    use std::sync::Arc;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn setup_mock_provider() -> (MockServer, OAuth2Config) {
        let mock_server = MockServer::start().await;

        let config = OAuth2Config {
            authorization_url: format!("{}/authorize", mock_server.uri()),
            token_url: format!("{}/token", mock_server.uri()),
            userinfo_url: format!("{}/userinfo", mock_server.uri()),
            callback_url: "http://localhost:3000/auth/oauth2/callback".to_string(),
            client_id: "mock_client_id".to_string(),
            client_secret: "mock_secret".to_string(),
            scope: "openid email profile".to_string(),
            ..OAuth2Config::default()
        };

        (mock_server, config)
    }

    fn service_with_store(config: OAuth2Config, store: Arc<InMemoryUserStore>) -> OAuth2Service {
        let client = OAuth2Client::new(config).unwrap();
        OAuth2Service::new(client, Arc::new(StoreAccountResolver::new(store)))
    }

    async fn mount_token_endpoint(mock_server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("client_id=mock_client_id"))
            .and(body_string_contains("client_secret=mock_secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "mock_access_token",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(mock_server)
            .await;
    }

    #[tokio::test]
    async fn test_full_login_flow_creates_account() {
        let (mock_server, config) = setup_mock_provider().await;

        mount_token_endpoint(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .and(header("Authorization", "Bearer mock_access_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "12345",
                "email": "test@example.com",
                "name": "Test User",
                "picture": "https://example.com/photo.jpg"
            })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store.clone());

        let user_id = service.authenticate_user("mock_auth_code").await.unwrap();

        let user = store
            .find_by_email("test@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, user_id);
        assert_eq!(user.name, "Test User");
        assert_eq!(user.avatar.as_deref(), Some("https://example.com/photo.jpg"));
        assert!(user.email_verified);
    }

    #[tokio::test]
    async fn test_repeat_login_is_idempotent() {
        let (mock_server, config) = setup_mock_provider().await;

        mount_token_endpoint(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "12345",
                "email": "test@example.com",
                "name": "Test User"
            })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store);

        let first = service.authenticate_user("mock_auth_code").await.unwrap();
        let second = service.authenticate_user("mock_auth_code").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_token_endpoint_error_creates_no_account() {
        let (mock_server, config) = setup_mock_provider().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store.clone());

        let result = service.authenticate_user("mock_auth_code").await;
        assert!(matches!(result, Err(OAuth2Error::TokenExchangeFailed(_))));

        assert!(
            store
                .find_by_email("test@example.com")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_missing_access_token_is_exchange_failure() {
        let (mock_server, config) = setup_mock_provider().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "token_type": "Bearer"
            })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store);

        let result = service.authenticate_user("mock_auth_code").await;
        assert!(matches!(result, Err(OAuth2Error::TokenExchangeFailed(_))));
    }

    #[tokio::test]
    async fn test_userinfo_without_id_field_fails() {
        let (mock_server, config) = setup_mock_provider().await;

        mount_token_endpoint(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "email": "test@example.com"
            })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store);

        let result = service.authenticate_user("mock_auth_code").await;
        assert!(matches!(result, Err(OAuth2Error::UserInfoFailed(_))));
    }

    #[tokio::test]
    async fn test_profile_without_email_is_rejected() {
        let (mock_server, config) = setup_mock_provider().await;

        mount_token_endpoint(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sub": "12345",
                "name": "No Email"
            })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store.clone());

        let result = service.authenticate_user("mock_auth_code").await;
        assert!(matches!(
            result,
            Err(OAuth2Error::IdentityError(IdentityError::EmailRequired))
        ));

        // No partial account may exist after the failure.
        assert!(store.find_by_id("12345").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_custom_userinfo_field_mapping() {
        let (mock_server, mut config) = setup_mock_provider().await;
        config.user_id_field = "id".to_string();
        config.user_email_field = "mail".to_string();
        config.user_name_field = "displayName".to_string();
        config.user_avatar_field = "avatarUrl".to_string();

        mount_token_endpoint(&mock_server).await;

        Mock::given(method("GET"))
            .and(path("/userinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "gh-987",
                "mail": "dev@example.com",
                "displayName": "Dev User",
                "avatarUrl": "https://example.com/avatar.png"
            })))
            .mount(&mock_server)
            .await;

        let store = Arc::new(InMemoryUserStore::new());
        let service = service_with_store(config, store.clone());

        service.authenticate_user("mock_auth_code").await.unwrap();

        let user = store
            .find_by_email("dev@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.name, "Dev User");
        assert_eq!(user.avatar.as_deref(), Some("https://example.com/avatar.png"));
    }
}
