use super::*;
use axum::body::Body;
use tower::ServiceExt;

fn query() -> ListQuery {
    ListQuery::default()
}

#[test]
fn test_list_defaults_to_id_descending() {
    let simulator = Simulator::new();
    let page = simulator.list_players(&query()).unwrap();

    assert_eq!(page.pagination.total, 6);
    assert_eq!(page.pagination.page, 1);
    assert_eq!(page.pagination.limit, DEFAULT_PAGE_SIZE);
    assert!(!page.pagination.has_next);
    let ids: Vec<u64> = page.players.iter().map(|player| player.id).collect();
    assert_eq!(ids, vec![6, 5, 4, 3, 2, 1]);
    assert_eq!(
        page.sort,
        Some(SortInfo {
            field: "id".to_string(),
            order: SortOrder::Desc
        })
    );
}

#[test]
fn test_list_filters_and_pages() {
    let simulator = Simulator::new();

    let page = simulator
        .list_players(&ListQuery {
            status: Some("active".to_string()),
            sort: Some("balance".to_string()),
            order: Some("asc".to_string()),
            page: Some(1),
            limit: Some(2),
            ..query()
        })
        .unwrap();
    assert_eq!(page.pagination.total, 3);
    assert_eq!(page.pagination.total_pages, 2);
    assert!(page.pagination.has_next);
    let names: Vec<&str> = page.players.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["shadow_bet", "testuser123"]);
    assert_eq!(page.filters.status, "active");

    // Search is case-insensitive over username, email and real name
    let page = simulator
        .list_players(&ListQuery {
            search: Some("CHEN".to_string()),
            ..query()
        })
        .unwrap();
    assert_eq!(page.players.len(), 1);
    assert_eq!(page.players[0].player_id, "P002");

    let page = simulator
        .list_players(&ListQuery {
            min_balance: Some(10_000.0),
            max_balance: Some(100_000.0),
            ..query()
        })
        .unwrap();
    assert_eq!(page.pagination.total, 2);

    // Seeded players are created 30 days apart starting 2024-01-01
    let page = simulator
        .list_players(&ListQuery {
            start_date: Some("2024-01-15".to_string()),
            end_date: Some("2024-03-01".to_string()),
            ..query()
        })
        .unwrap();
    let ids: Vec<&str> = page.players.iter().map(|p| p.player_id.as_str()).collect();
    assert_eq!(ids, vec!["P003", "P002"]);
}

#[test]
fn test_list_rejects_bad_queries() {
    let simulator = Simulator::new();

    let err = simulator
        .list_players(&ListQuery {
            sort: Some("password".to_string()),
            ..query()
        })
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, "VALIDATION_FAILED");

    let err = simulator
        .list_players(&ListQuery {
            status: Some("banned".to_string()),
            ..query()
        })
        .unwrap_err();
    assert_eq!(err.message, "unknown player status: banned");

    let err = simulator
        .list_players(&ListQuery {
            start_date: Some("yesterday".to_string()),
            ..query()
        })
        .unwrap_err();
    assert_eq!(err.code, "VALIDATION_FAILED");
}

#[test]
fn test_list_clamps_limit() {
    let simulator = Simulator::new();
    let page = simulator
        .list_players(&ListQuery {
            limit: Some(10_000),
            page: Some(0),
            ..query()
        })
        .unwrap();
    assert_eq!(page.pagination.limit, MAX_PAGE_SIZE);
    assert_eq!(page.pagination.page, 1);
}

#[test]
fn test_pages_past_the_end_are_empty() {
    let simulator = Simulator::new();
    let page = simulator
        .list_players(&ListQuery {
            page: Some(u32::MAX),
            limit: Some(MAX_PAGE_SIZE),
            ..query()
        })
        .unwrap();
    assert!(page.players.is_empty());
    assert_eq!(page.pagination.page, u32::MAX);
    assert_eq!(page.pagination.total, 6);
    assert!(!page.pagination.has_next);

    let history = simulator
        .game_history(
            "P001",
            &HistoryQuery {
                page: Some(u32::MAX),
                limit: Some(MAX_PAGE_SIZE),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(history["records"].as_array().unwrap().len(), 0);
}

#[test]
fn test_adjust_balance() {
    let simulator = Simulator::new();
    let result = simulator
        .adjust_balance(
            "P001",
            &BalanceAdjustment {
                amount: 500.0,
                kind: AdjustmentType::Add,
                reason: "Event bonus".to_string(),
            },
        )
        .unwrap();
    assert_eq!(result["balance_before"], 12_500.0);
    assert_eq!(result["balance_after"], 13_000.0);
    assert_eq!(simulator.player("P001").unwrap().balance, 13_000.0);

    let err = simulator
        .adjust_balance(
            "P001",
            &BalanceAdjustment {
                amount: 1_000_000.0,
                kind: AdjustmentType::Subtract,
                reason: "Correction".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.code, "INSUFFICIENT_BALANCE");

    let err = simulator
        .adjust_balance(
            "P001",
            &BalanceAdjustment {
                amount: 0.0,
                kind: AdjustmentType::Add,
                reason: "Correction".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.message, "amount must be greater than 0");

    let err = simulator
        .adjust_balance(
            "P404",
            &BalanceAdjustment {
                amount: 1.0,
                kind: AdjustmentType::Add,
                reason: "Correction".to_string(),
            },
        )
        .unwrap_err();
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}

#[test]
fn test_status_and_limits() {
    let simulator = Simulator::new();
    let result = simulator
        .update_status("P001", PlayerStatus::Suspended)
        .unwrap();
    assert_eq!(result["old_status"], "active");
    assert_eq!(result["new_status"], "suspended");
    assert_eq!(
        simulator.player("P001").unwrap().status,
        PlayerStatus::Suspended
    );

    let err = simulator
        .update_status("P006", PlayerStatus::Active)
        .unwrap_err();
    assert_eq!(err.status, StatusCode::BAD_REQUEST);

    let limits = PlayerLimits {
        daily_bet_limit: Some(5_000.0),
        ..Default::default()
    };
    simulator.set_limits("P001", limits.clone()).unwrap();
    assert_eq!(simulator.limits("P001"), Some(limits));

    let err = simulator
        .set_limits(
            "P001",
            PlayerLimits {
                loss_limit: Some(-1.0),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.code, "VALIDATION_FAILED");
}

#[test]
fn test_game_history_is_paginated() {
    let simulator = Simulator::new();
    // P004 has id 4, so 3 + 4 % 5 = 7 rounds
    let history = simulator
        .game_history(
            "P004",
            &HistoryQuery {
                page: Some(2),
                limit: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(history["pagination"]["total"], 7);
    assert_eq!(history["records"].as_array().unwrap().len(), 2);
    assert_eq!(history["records"][1]["round_id"], "P004-R001");
}

#[test]
fn test_analytics() {
    let simulator = Simulator::new();

    let behavior = simulator.behavior_analysis("P001").unwrap();
    assert_eq!(behavior["activity_level"], "low");

    let spending = simulator.spending_habits("P002").unwrap();
    assert_eq!(spending["spending_level"], "high_value");
    let spending = simulator.spending_habits("P005").unwrap();
    assert_eq!(spending["spending_level"], "low_value");

    let preference = simulator.game_preference("P001").unwrap();
    assert_eq!(preference["total_games"], 4);

    let score = simulator
        .value_score("P002", ScoreWeights::default())
        .unwrap();
    let overall = score["overall_score"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&overall));
    assert_eq!(score["weights"]["activity_weight"], 0.25);

    // Only loyalty counts: vip 4 scores 80
    let score = simulator
        .value_score(
            "P002",
            ScoreWeights {
                activity_weight: 0.0,
                loyalty_weight: 1.0,
                spending_weight: 0.0,
                risk_weight: 0.0,
                profitability_weight: 0.0,
            },
        )
        .unwrap();
    assert_eq!(score["overall_score"], 80.0);
    assert_eq!(score["value_category"], "VIP");
}

#[test]
fn test_login_refresh_logout() {
    let simulator = Simulator::new();
    let err = simulator
        .login(&Credentials {
            username: ADMIN_USERNAME.to_string(),
            password: "wrong".to_string(),
        })
        .unwrap_err();
    assert_eq!(err.status, StatusCode::UNAUTHORIZED);

    let login = simulator
        .login(&Credentials {
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .unwrap();
    assert!(simulator.is_token_valid(&login.token));
    assert_eq!(login.user["role"], "admin");

    let refreshed = simulator.refresh(Some(&login.token)).unwrap();
    assert!(!simulator.is_token_valid(&login.token));
    assert!(simulator.is_token_valid(&refreshed.token));
    assert!(simulator.refresh(Some(&login.token)).is_err());
    assert!(simulator.refresh(None).is_err());

    simulator.logout(Some(&refreshed.token));
    assert!(!simulator.is_token_valid(&refreshed.token));
}

async fn call(router: Router, request: axum::http::Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_router_wraps_responses_in_envelope() {
    let simulator = Arc::new(Simulator::new());
    let router = Api::new(simulator.clone()).router();

    let request = axum::http::Request::builder()
        .uri("/api/v1/players/P001")
        .header(header::AUTHORIZATION, "Bearer abc")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["username"], "testuser123");
    assert!(body["timestamp"].is_string());
    assert_eq!(simulator.last_authorization().as_deref(), Some("Bearer abc"));

    let request = axum::http::Request::builder()
        .uri("/api/v1/players/P404")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router.clone(), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PLAYER_NOT_FOUND");
    assert!(simulator.last_authorization().is_none());

    // Listing outage answers 200 with success: false
    simulator.set_listing_outage(true);
    let request = axum::http::Request::builder()
        .uri("/api/v1/players/?page=1")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn test_router_injected_failures_and_value_score_body() {
    let simulator = Arc::new(Simulator::new());
    let router = Api::new(simulator.clone()).router();

    simulator.fail_endpoint("/spending-habits");
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/players/P001/spending-habits")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(router.clone(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    simulator.restore_endpoint("/spending-habits");
    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/players/P001/spending-habits")
        .body(Body::empty())
        .unwrap();
    let (status, _) = call(router.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/api/v1/players/P001/value-score")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"risk_weight":1.0,"activity_weight":0,"loyalty_weight":0,"spending_weight":0,"profitability_weight":0}"#,
        ))
        .unwrap();
    let (status, body) = call(router, request).await;
    assert_eq!(status, StatusCode::OK);
    // Low risk scores 10, inverted to 90
    assert_eq!(body["data"]["overall_score"], 90.0);

    let record = simulator.last_request().unwrap();
    assert_eq!(record.method, "POST");
    assert_eq!(record.path, "/api/v1/players/P001/value-score");
    assert_eq!(record.content_type.as_deref(), Some("application/json"));
    assert!(record.body_len > 0);
}

#[tokio::test]
async fn test_router_huge_page_number() {
    let simulator = Arc::new(Simulator::new());
    let router = Api::new(simulator).router();

    let request = axum::http::Request::builder()
        .uri("/api/v1/players/?page=4294967295&limit=100")
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["players"].as_array().unwrap().len(), 0);
}
