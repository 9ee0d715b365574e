use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use office_cell::services::directory::OfficeDirectory;
use shared_config::AppConfig;
use shared_database::StoreError;

fn office_row(id: Uuid, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "address": "22 Harbor Rd",
        "phone": "555-0101",
        "email": "service@example.com",
        "hours": [
            {
                "day_of_week": 1,
                "opens_at": "09:00:00",
                "closes_at": "18:00:00",
                "slot_minutes": 30
            }
        ]
    })
}

#[tokio::test]
async fn list_offices_preserves_registry_order() {
    let mock_server = MockServer::start().await;
    let (id_a, id_b) = (Uuid::new_v4(), Uuid::new_v4());

    Mock::given(method("GET"))
        .and(path("/rest/v1/offices"))
        .and(query_param("order", "name.asc,id.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            office_row(id_a, "Airport Branch"),
            office_row(id_b, "Downtown Branch"),
        ])))
        .mount(&mock_server)
        .await;

    let config = AppConfig::for_store(mock_server.uri(), "test-key");
    let directory = OfficeDirectory::new(&config);

    let offices = directory.list_offices().await.unwrap();

    assert_eq!(offices.len(), 2);
    assert_eq!(offices[0].id, id_a);
    assert_eq!(offices[1].id, id_b);
    assert_eq!(offices[0].hours.len(), 1);
    assert_eq!(offices[0].hours[0].slot_minutes, 30);
}

#[tokio::test]
async fn get_office_maps_missing_row_to_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/offices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = AppConfig::for_store(mock_server.uri(), "test-key");
    let directory = OfficeDirectory::new(&config);

    let err = directory.get_office(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn store_outage_surfaces_as_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/offices"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = AppConfig::for_store(mock_server.uri(), "test-key");
    let directory = OfficeDirectory::new(&config);

    let err = directory.list_offices().await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}
