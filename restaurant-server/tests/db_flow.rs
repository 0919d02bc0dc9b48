// restaurant-server/tests/db_flow.rs
// End-to-end flows against PostgreSQL.
// Needs DATABASE_URL pointing at a server where the test user may create databases:
//   cargo test -p restaurant-server --test db_flow -- --ignored

use axum::body::Body;
use http::{Request, StatusCode};
use http_body_util::BodyExt;
use restaurant_server::{AppState, api};
use serde_json::{Value, json};
use shared::ServiceHours;
use sqlx::PgPool;
use tower::ServiceExt;

async fn send(pool: &PgPool, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let app = api::create_router(AppState::with_pool(pool.clone(), ServiceHours::default()));
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_reservation(pool: &PgPool, mobile_number: &str, time: &str, people: i64) -> i64 {
    let (status, body) = send(
        pool,
        "POST",
        "/reservations",
        Some(json!({ "data": {
            "first_name": "Rick",
            "last_name": "Sanchez",
            "mobile_number": mobile_number,
            "reservation_date": "2099-01-07",
            "reservation_time": time,
            "people": people
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "booked");
    body["data"]["reservation_id"].as_i64().unwrap()
}

async fn create_table(pool: &PgPool, name: &str, capacity: i64) -> i64 {
    let (status, body) = send(
        pool,
        "POST",
        "/tables",
        Some(json!({ "data": { "table_name": name, "capacity": capacity } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["table_id"].as_i64().unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_table_round_trip(pool: PgPool) {
    let id = create_table(&pool, "A1", 4).await;
    let (status, body) = send(&pool, "GET", &format!("/tables/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["table_name"], "A1");
    assert_eq!(body["data"]["capacity"], 4);
    assert_eq!(body["data"]["status"], "free");
    assert_eq!(body["data"]["reservation_id"], Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_tables_listed_by_name(pool: PgPool) {
    create_table(&pool, "Bar #2", 2).await;
    create_table(&pool, "#1", 6).await;
    create_table(&pool, "Bar #1", 2).await;

    let (status, body) = send(&pool, "GET", "/tables", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["table_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["#1", "Bar #1", "Bar #2"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_seat_and_finish(pool: PgPool) {
    let table_id = create_table(&pool, "Bar #1", 4).await;
    let reservation_id = create_reservation(&pool, "202-555-0164", "19:00", 3).await;

    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/tables/{table_id}/seat"),
        Some(json!({ "data": { "reservation_id": reservation_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "occupied");
    assert_eq!(body["data"]["reservation_id"], reservation_id);

    let (_, body) = send(&pool, "GET", &format!("/reservations/{reservation_id}"), None).await;
    assert_eq!(body["data"]["status"], "seated");

    // A second seat attempt for the same reservation is a conflict
    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/tables/{table_id}/seat"),
        Some(json!({ "data": { "reservation_id": reservation_id } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4003);

    // Occupied tables cannot be deleted
    let (status, body) = send(&pool, "DELETE", &format!("/tables/{table_id}"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7002);

    let (status, body) = send(&pool, "DELETE", &format!("/tables/{table_id}/seat"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "free");
    assert_eq!(body["data"]["reservation_id"], Value::Null);

    let (_, body) = send(&pool, "GET", &format!("/reservations/{reservation_id}"), None).await;
    assert_eq!(body["data"]["status"], "finished");

    // Finished reservations drop out of the daily list
    let (_, body) = send(&pool, "GET", "/reservations?date=2099-01-07", None).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = send(&pool, "DELETE", &format!("/tables/{table_id}/seat"), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 7003);

    let (status, body) = send(&pool, "DELETE", &format!("/tables/{table_id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_seat_rejections(pool: PgPool) {
    let small = create_table(&pool, "Bar #1", 2).await;
    let large = create_table(&pool, "#1", 8).await;
    let party_of_three = create_reservation(&pool, "202-555-0164", "19:00", 3).await;
    let party_of_two = create_reservation(&pool, "202-555-0199", "19:30", 2).await;

    let seat = |table_id: i64, reservation_id: Value| {
        let pool = pool.clone();
        async move {
            send(
                &pool,
                "PUT",
                &format!("/tables/{table_id}/seat"),
                Some(json!({ "data": { "reservation_id": reservation_id } })),
            )
            .await
        }
    };

    let (status, body) = seat(small, json!(party_of_three)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7004);

    let (status, body) = seat(small, Value::Null).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "reservation_id");

    let (status, body) = seat(small, json!(999_999)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4001);

    let (status, _) = seat(999_999, json!(party_of_two)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = seat(large, json!(party_of_three)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = seat(large, json!(party_of_two)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7002);

    // Cancelled reservations cannot be seated
    let (status, _) = send(
        &pool,
        "PUT",
        &format!("/reservations/{party_of_two}/status"),
        Some(json!({ "data": { "status": "cancelled" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = seat(small, json!(party_of_two)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4004);

    // The seated party keeps the large table from shrinking below it
    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/tables/{large}"),
        Some(json!({ "data": { "capacity": 2 } })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 7004);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_reset_to_booked_cannot_take_second_table(pool: PgPool) {
    let first = create_table(&pool, "Bar #1", 4).await;
    let second = create_table(&pool, "Bar #2", 4).await;
    let reservation_id = create_reservation(&pool, "202-555-0164", "19:00", 2).await;
    let seat_body = json!({ "data": { "reservation_id": reservation_id } });

    let (status, _) = send(
        &pool,
        "PUT",
        &format!("/tables/{first}/seat"),
        Some(seat_body.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &pool,
        "PUT",
        &format!("/reservations/{reservation_id}/status"),
        Some(json!({ "data": { "status": "booked" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/tables/{second}/seat"),
        Some(seat_body),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{body}");
    assert_eq!(body["code"], 4003);

    let (_, body) = send(&pool, "GET", &format!("/tables/{second}"), None).await;
    assert_eq!(body["data"]["status"], "free");

    // The original table can still be finished
    let (status, _) = send(&pool, "DELETE", &format!("/tables/{first}/seat"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_phone_search_ignores_formatting(pool: PgPool) {
    create_reservation(&pool, "(555) 123-4567", "18:00", 2).await;
    create_reservation(&pool, "555.987.6543", "12:00", 4).await;

    let (_, formatted) = send(
        &pool,
        "GET",
        "/reservations?mobile_number=(555)%20123-4567",
        None,
    )
    .await;
    let (_, digits) = send(&pool, "GET", "/reservations?mobile_number=5551234567", None).await;
    assert_eq!(formatted["data"], digits["data"]);
    assert_eq!(digits["data"].as_array().unwrap().len(), 1);

    let (_, partial) = send(&pool, "GET", "/reservations?mobile_number=555", None).await;
    assert_eq!(partial["data"].as_array().unwrap().len(), 2);

    let (_, none) = send(&pool, "GET", "/reservations?mobile_number=000", None).await;
    assert_eq!(none["data"], json!([]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_daily_list_ordered_by_time(pool: PgPool) {
    create_reservation(&pool, "202-555-0101", "20:00", 2).await;
    create_reservation(&pool, "202-555-0102", "11:00", 2).await;
    create_reservation(&pool, "202-555-0103", "15:45", 2).await;

    let (status, body) = send(&pool, "GET", "/reservations?date=2099-01-07", None).await;
    assert_eq!(status, StatusCode::OK);
    let times: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["reservation_time"].as_str().unwrap())
        .collect();
    assert_eq!(times, ["11:00", "15:45", "20:00"]);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_finished_reservation_is_frozen(pool: PgPool) {
    let id = create_reservation(&pool, "202-555-0164", "19:00", 2).await;

    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/reservations/{id}/status"),
        Some(json!({ "data": { "status": "finished" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "finished");

    // Even an invalid payload reports the finished state first
    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/reservations/{id}"),
        Some(json!({ "data": { "people": "many" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);
    assert_eq!(body["error"], "Cannot update finished reservation");

    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/reservations/{id}/status"),
        Some(json!({ "data": { "status": "booked" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn test_full_edit_replaces_fields(pool: PgPool) {
    let id = create_reservation(&pool, "202-555-0164", "19:00", 2).await;

    let (status, body) = send(
        &pool,
        "PUT",
        &format!("/reservations/{id}"),
        Some(json!({ "data": {
            "reservation_id": id,
            "status": "booked",
            "first_name": "Morty",
            "last_name": "Smith",
            "mobile_number": "202-555-0111",
            "reservation_date": "2099-01-08",
            "reservation_time": "12:15",
            "people": 5
        }})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["first_name"], "Morty");
    assert_eq!(body["data"]["reservation_date"], "2099-01-08");
    assert_eq!(body["data"]["reservation_time"], "12:15");
    assert_eq!(body["data"]["people"], 5);
    assert_eq!(body["data"]["status"], "booked");

    let (status, _) = send(&pool, "GET", "/reservations/999999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
