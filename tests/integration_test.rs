//! Integration tests for the Currencycloud client
//!
//! Each test runs the client against a wiremock server that answers with the
//! recorded API responses in tests/fixtures.

use currencycloud::types::{Beneficiary, BeneficiaryDetails, PaymentType};
use currencycloud::{
    cancellable, with_retry, BalanceFilter, BeneficiaryFilter, BeneficiaryUpdate, ClientConfig,
    CurrencyCloudClient, Error, NewBeneficiary, PageRequest, RetryConfig, SortOrder,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "4df5b3e5882a412f148dcd08fa4e5b73";
const BENEFICIARY_ID: &str = "081596c9-02de-483e-9f2a-4cf55dcdf98c";

fn fixture(name: &str) -> String {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("missing fixture {}: {}", path.display(), e))
}

fn ok_fixture(name: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(fixture(name), "application/json")
}

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

/// Mock server plus a client that already holds a token
async fn setup() -> (MockServer, CurrencyCloudClient) {
    let server = MockServer::start().await;
    let client = CurrencyCloudClient::new(server.uri()).unwrap();
    client.set_auth_token(TOKEN);
    (server, client)
}

fn gb_details() -> BeneficiaryDetails {
    BeneficiaryDetails {
        beneficiary_country: Some("GB".to_string()),
        account_number: Some("12345678".to_string()),
        routing_code_type_1: Some("sort_code".to_string()),
        routing_code_value_1: Some("123456".to_string()),
        payment_types: vec![PaymentType::Regular],
        ..BeneficiaryDetails::new("GB", "GBP")
    }
}

mod beneficiary_tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_fills_in_bank_details() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/beneficiaries/validate"))
            .and(header("X-Auth-Token", TOKEN))
            .and(body_partial_json(json!({
                "bank_country": "GB",
                "currency": "GBP",
                "account_number": "12345678",
                "payment_types": ["regular"]
            })))
            .respond_with(ok_fixture("beneficiary_validate.json"))
            .expect(1)
            .mount(&server)
            .await;

        let validated = client.validate_beneficiary(&gb_details()).await.unwrap();

        assert!(!validated.is_persisted());
        assert_eq!(validated.bank_name.as_deref(), Some("HSBC BANK PLC"));
        assert_eq!(
            validated.bank_address,
            vec!["5 Wimbledon Hill Rd", "Wimbledon", "London"]
        );
        assert!(validated.beneficiary_address.is_empty());
        assert!(validated.accepts(PaymentType::Regular));
        assert!(!validated.accepts(PaymentType::Priority));
        assert_eq!(validated.created_at, None);
    }

    #[tokio::test]
    async fn test_validate_sends_address_as_json_array() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/beneficiaries/validate"))
            .and(body_partial_json(json!({
                "beneficiary_address": ["12 Steward St", "London"]
            })))
            .respond_with(ok_fixture("beneficiary_validate.json"))
            .expect(1)
            .mount(&server)
            .await;

        let details = BeneficiaryDetails {
            beneficiary_address: vec!["12 Steward St".to_string(), "London".to_string()],
            ..gb_details()
        };
        client.validate_beneficiary(&details).await.unwrap();
    }

    #[tokio::test]
    async fn test_create_then_retrieve() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/beneficiaries/create"))
            .and(body_partial_json(json!({
                "bank_account_holder_name": "Test User",
                "name": "Test User Nickname",
                "bank_country": "GB",
                "currency": "GBP"
            })))
            .respond_with(ok_fixture("beneficiary.json"))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path(format!("/v2/beneficiaries/{}", BENEFICIARY_ID)))
            .respond_with(ok_fixture("beneficiary.json"))
            .expect(1)
            .mount(&server)
            .await;

        let new = NewBeneficiary::new("Test User", "GB", "GBP", "Test User Nickname")
            .with_details(|d| *d = gb_details());
        let created = client.create_beneficiary(&new).await.unwrap();

        assert_eq!(created.id.as_deref(), Some(BENEFICIARY_ID));
        assert_eq!(created.created_at, Some(ts("2015-04-25T09:21:00+00:00")));
        assert_eq!(created.updated_at, Some(ts("2015-04-25T09:21:00+00:00")));
        assert_eq!(created.default_beneficiary, Some(false));

        let retrieved = client.retrieve_beneficiary(BENEFICIARY_ID).await.unwrap();
        assert_eq!(retrieved, created);
    }

    #[tokio::test]
    async fn test_first_asks_for_a_single_result() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/beneficiaries/find"))
            .and(query_param("bank_account_holder_name", "Test User"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "1"))
            .respond_with(ok_fixture("beneficiaries_first.json"))
            .expect(1)
            .mount(&server)
            .await;

        let first = client
            .first_beneficiary(&BeneficiaryFilter::holder_name("Test User"))
            .await
            .unwrap();

        assert_eq!(first.id.as_deref(), Some(BENEFICIARY_ID));
        assert_eq!(first.updated_at, Some(ts("2015-04-25T10:58:21+00:00")));
    }

    #[tokio::test]
    async fn test_first_with_no_match_is_not_found() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/beneficiaries/find"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "beneficiaries": [],
                "pagination": {
                    "total_entries": 0, "total_pages": 0, "current_page": 1, "per_page": 1,
                    "previous_page": -1, "next_page": -1,
                    "order": "created_at", "order_asc_desc": "asc"
                }
            })))
            .mount(&server)
            .await;

        let err = client
            .first_beneficiary(&BeneficiaryFilter::holder_name("Nobody"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_find_returns_pagination() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/beneficiaries/find"))
            .and(query_param("payment_types[]", "regular"))
            .and(query_param("order", "created_at"))
            .and(query_param("order_asc_desc", "asc"))
            .respond_with(ok_fixture("beneficiaries_find.json"))
            .expect(1)
            .mount(&server)
            .await;

        let filter = BeneficiaryFilter {
            payment_types: vec![PaymentType::Regular],
            ..Default::default()
        };
        let page = PageRequest::default().with_order("created_at", SortOrder::Asc);
        let found = client.find_beneficiaries(&filter, &page).await.unwrap();

        assert_eq!(found.beneficiaries.len(), 1);
        let pagination = &found.pagination;
        assert_eq!(pagination.total_entries, 1);
        assert_eq!(pagination.total_pages, 1);
        assert_eq!(pagination.current_page, 1);
        assert_eq!(pagination.per_page, 25);
        assert_eq!(pagination.previous_page, None);
        assert_eq!(pagination.next_page, None);
        assert_eq!(pagination.order, "created_at");
        assert_eq!(pagination.order_asc_desc, SortOrder::Asc);
        assert!(pagination.next_request().is_none());
    }

    #[tokio::test]
    async fn test_find_rejects_inconsistent_pagination() {
        let (server, client) = setup().await;

        let mut body: serde_json::Value =
            serde_json::from_str(&fixture("beneficiaries_find.json")).unwrap();
        body["pagination"]["total_entries"] = json!(0);

        Mock::given(method("GET"))
            .and(path("/v2/beneficiaries/find"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let err = client
            .find_beneficiaries(&BeneficiaryFilter::default(), &PageRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnexpectedServer { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path(format!("/v2/beneficiaries/{}", BENEFICIARY_ID)))
            .and(body_json(json!({ "bank_account_holder_name": "Test User 2" })))
            .respond_with(ok_fixture("beneficiary_updated.json"))
            .expect(1)
            .mount(&server)
            .await;

        let update = BeneficiaryUpdate {
            bank_account_holder_name: Some("Test User 2".to_string()),
            ..Default::default()
        };
        let updated = client
            .update_beneficiary(BENEFICIARY_ID, &update)
            .await
            .unwrap();

        assert_eq!(updated.bank_account_holder_name.as_deref(), Some("Test User 2"));
        assert_eq!(updated.updated_at, Some(ts("2015-04-25T11:06:27+00:00")));

        // Everything not in the update keeps its created value
        let before: Beneficiary = serde_json::from_str(&fixture("beneficiary.json")).unwrap();
        assert_eq!(updated.id, before.id);
        assert_eq!(updated.payment_types, before.payment_types);
        assert_eq!(updated.bank_name, before.bank_name);
        assert_eq!(updated.account_number, before.account_number);
        assert_eq!(updated.bank_address, before.bank_address);
        assert_eq!(updated.created_at, before.created_at);
        assert_ne!(
            updated.bank_account_holder_name,
            before.bank_account_holder_name
        );
    }

    #[tokio::test]
    async fn test_update_can_clear_a_field() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path(format!("/v2/beneficiaries/{}", BENEFICIARY_ID)))
            .and(body_json(json!({ "email": null })))
            .respond_with(ok_fixture("beneficiary_updated.json"))
            .expect(1)
            .mount(&server)
            .await;

        let update = BeneficiaryUpdate {
            email: Some(None),
            ..Default::default()
        };
        client
            .update_beneficiary(BENEFICIARY_ID, &update)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_returns_last_state() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path(format!("/v2/beneficiaries/{}/delete", BENEFICIARY_ID)))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ok_fixture("beneficiary_deleted.json"))
            .expect(1)
            .mount(&server)
            .await;

        let deleted = client.delete_beneficiary(BENEFICIARY_ID).await.unwrap();
        assert_eq!(deleted.id.as_deref(), Some(BENEFICIARY_ID));
        assert_eq!(deleted.bank_account_holder_name.as_deref(), Some("Test User 2"));
        assert_eq!(deleted.updated_at, Some(ts("2015-04-25T11:06:27+00:00")));
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected_locally() {
        let (server, client) = setup().await;

        let err = client.retrieve_beneficiary("  ").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod account_balance_tests {
    use super::*;

    #[tokio::test]
    async fn test_current_account() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ok_fixture("account.json"))
            .expect(1)
            .mount(&server)
            .await;

        let account = client.current_account().await.unwrap();
        assert_eq!(account.id, "8ec3a69b-02d1-4f09-9a6b-6bd54a61b3a8");
        assert_eq!(account.postal_code, None);
        assert_eq!(account.created_at, ts("2015-04-24T15:57:55+00:00"));
        assert_eq!(account.updated_at, ts("2015-04-24T15:57:55+00:00"));
    }

    #[tokio::test]
    async fn test_balance_amount_is_exact() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/balances/GBP"))
            .respond_with(ok_fixture("balance.json"))
            .expect(1)
            .mount(&server)
            .await;

        let balance = client.find_balance("gbp").await.unwrap();
        assert_eq!(balance.id, "5a998e06-3eb7-46d6-ba58-f749864159ce");
        assert_eq!(balance.currency.as_deref(), Some("GBP"));
        assert_eq!(balance.amount, Decimal::from_str("999866.78").unwrap());
        assert_eq!(balance.amount.to_string(), "999866.78");
        assert_eq!(balance.created_at, ts("2014-12-04T09:50:35+00:00"));
        assert_eq!(balance.updated_at, ts("2015-03-23T14:33:37+00:00"));
    }

    #[tokio::test]
    async fn test_find_balances_with_amount_range() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/balances/find"))
            .and(query_param("amount_from", "100.00"))
            .respond_with(ok_fixture("balances_find.json"))
            .expect(1)
            .mount(&server)
            .await;

        let filter = BalanceFilter {
            amount_from: Some(Decimal::from_str("100.00").unwrap()),
            ..Default::default()
        };
        let balances = client
            .find_balances(&filter, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(balances.balances.len(), 1);
        assert!(balances.pagination.is_last_page());
    }

    #[tokio::test]
    async fn test_bad_currency_is_rejected_locally() {
        let (server, client) = setup().await;

        let err = client.find_balance("POUNDS").await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}

mod session_tests {
    use super::*;

    #[tokio::test]
    async fn test_authenticate_stores_token() {
        let server = MockServer::start().await;
        let client = CurrencyCloudClient::new(server.uri()).unwrap();

        Mock::given(method("POST"))
            .and(path("/v2/authenticate/api"))
            .and(body_json(json!({
                "login_id": "development@currencycloud.com",
                "api_key": "deadbeef"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "auth_token": TOKEN })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ok_fixture("account.json"))
            .expect(1)
            .mount(&server)
            .await;

        let token = client
            .authenticate("development@currencycloud.com", "deadbeef")
            .await
            .unwrap();
        assert_eq!(token, TOKEN);
        assert!(client.is_authenticated());

        // Clones share the session
        let clone = client.clone();
        clone.current_account().await.unwrap();
    }

    #[tokio::test]
    async fn test_authenticate_rejected() {
        let server = MockServer::start().await;
        let client = CurrencyCloudClient::new(server.uri()).unwrap();

        Mock::given(method("POST"))
            .and(path("/v2/authenticate/api"))
            .respond_with(
                ResponseTemplate::new(401).set_body_raw(fixture("auth_error.json"), "application/json"),
            )
            .mount(&server)
            .await;

        let err = client
            .authenticate("development@currencycloud.com", "wrong")
            .await
            .unwrap_err();
        match err {
            Error::Authentication(details) => {
                assert_eq!(details.error_code, "auth_failed");
                assert_eq!(details.status, 401);
                assert_eq!(
                    details.field("username")[0].code,
                    "invalid_supplied_credentials"
                );
            }
            other => panic!("expected Authentication, got {:?}", other),
        }
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_end_session_forgets_token() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/authenticate/close_session"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        client.end_session().await.unwrap();
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_end_session_honours_retry_after() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/authenticate/close_session"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client.end_session().await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(7)), "got {:?}", err);
        // A failed close keeps the session
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let server = MockServer::start().await;
        let client = CurrencyCloudClient::new(server.uri()).unwrap();

        let err = client.current_account().await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_client_from_config_file() {
        let server = MockServer::start().await;
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        std::env::set_var("CCLOUD_IT_TOKEN", TOKEN);
        let config = ClientConfig {
            base_url: Some(server.uri()),
            auth_token_env: Some("$CCLOUD_IT_TOKEN".to_string()),
            ..ClientConfig::default()
        };
        config.save(&config_path).unwrap();

        Mock::given(method("GET"))
            .and(path("/v2/balances/GBP"))
            .and(header("X-Auth-Token", TOKEN))
            .respond_with(ok_fixture("balance.json"))
            .expect(1)
            .mount(&server)
            .await;

        let loaded = ClientConfig::load(&config_path).unwrap();
        currencycloud::config::validate_config_result(&loaded).unwrap();
        let client = CurrencyCloudClient::from_config(&loaded).unwrap();
        client.find_balance("GBP").await.unwrap();
        std::env::remove_var("CCLOUD_IT_TOKEN");
    }
}

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_status_codes_map_to_error_kinds() {
        let (server, client) = setup().await;

        Mock::given(method("POST"))
            .and(path("/v2/beneficiaries/create"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("X-Request-Id", "2775253392756800903")
                    .set_body_raw(fixture("validation_error.json"), "application/json"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/beneficiaries/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error_code": "beneficiary_not_found",
                "error_messages": {"id": [{"code": "beneficiary_not_found", "message": "Beneficiary was not found for this id", "params": {}}]}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/balances/GBP"))
            .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/balances/EUR"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error_code": "permission_denied",
                "error_messages": {}
            })))
            .mount(&server)
            .await;

        let new = NewBeneficiary::new("Test User", "GB", "GBP", "Nick");
        match client.create_beneficiary(&new).await.unwrap_err() {
            Error::Validation(details) => {
                assert_eq!(details.error_code, "beneficiary_create_failed");
                assert_eq!(details.request_id.as_deref(), Some("2775253392756800903"));
                assert_eq!(
                    details.field("account_number")[0].code,
                    "account_number_is_required"
                );
            }
            other => panic!("expected Validation, got {:?}", other),
        }

        let err = client.retrieve_beneficiary("missing").await.unwrap_err();
        assert!(err.is_not_found());

        let err = client.current_account().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedServer { status: 500, .. }));

        let err = client.find_balance("GBP").await.unwrap_err();
        assert!(matches!(err, Error::RateLimited(7)));

        let err = client.find_balance("EUR").await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_malformed_success_body() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let err = client.current_account().await.unwrap_err();
        assert!(matches!(err, Error::UnexpectedServer { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_timeout_is_a_transport_error() {
        let server = MockServer::start().await;
        let client =
            CurrencyCloudClient::with_timeout(server.uri(), Duration::from_millis(100)).unwrap();
        client.set_auth_token(TOKEN);

        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .respond_with(ok_fixture("account.json").set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = client.current_account().await.unwrap_err();
        assert!(matches!(err, Error::Transport(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_cancelled_call_leaves_client_usable() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .respond_with(ok_fixture("account.json").set_delay(Duration::from_secs(5)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/accounts/current"))
            .respond_with(ok_fixture("account.json"))
            .mount(&server)
            .await;

        let result = cancellable(
            client.current_account(),
            tokio::time::sleep(Duration::from_millis(50)),
        )
        .await;
        assert!(matches!(result, Err(Error::Cancelled)));

        let account = client.current_account().await.unwrap();
        assert_eq!(account.id, "8ec3a69b-02d1-4f09-9a6b-6bd54a61b3a8");
    }

    #[tokio::test]
    async fn test_retry_recovers_from_server_errors() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/balances/GBP"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/balances/GBP"))
            .respond_with(ok_fixture("balance.json"))
            .mount(&server)
            .await;

        let config = RetryConfig {
            base_delay: Duration::from_millis(1),
            jitter: false,
            ..Default::default()
        };
        let balance = with_retry(&config, "find_balance", || client.find_balance("GBP"))
            .await
            .unwrap();
        assert_eq!(balance.currency.as_deref(), Some("GBP"));
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_retry_does_not_repeat_validation_errors() {
        let (server, client) = setup().await;

        Mock::given(method("GET"))
            .and(path("/v2/balances/GBP"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error_code": "currency_is_in_invalid_format",
                "error_messages": {}
            })))
            .mount(&server)
            .await;

        let result = with_retry(&RetryConfig::default(), "find_balance", || {
            client.find_balance("GBP")
        })
        .await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }
}
