mod integration_tests {
    use crate::handlers::users::CreateUserRequest;
    use crate::schemas::ApiResponse;
    use crate::test_utils::{
        create_test_user, init_test_tracing, setup_test_app, setup_test_server, token_header,
    };
    use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
    use axum::http::{HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    async fn category_id(server: &TestServer, auth: &HeaderValue, name: &str, kind: &str) -> i64 {
        let response = server
            .get(&format!("/api/v1/categories?type={}", kind))
            .add_header(AUTHORIZATION, auth.clone())
            .await;
        response.assert_status(StatusCode::OK);
        let body: ApiResponse<Vec<Value>> = response.json();
        body.data
            .iter()
            .find(|c| c["name"] == name)
            .and_then(|c| c["id"].as_i64())
            .expect("category should be listed")
    }

    async fn create_expense(
        server: &TestServer,
        auth: &HeaderValue,
        title: &str,
        amount: &str,
        date: &str,
        category: Option<i64>,
    ) -> Value {
        let response = server
            .post("/api/v1/expenses")
            .add_header(AUTHORIZATION, auth.clone())
            .json(&json!({
                "title": title,
                "amount": amount,
                "date": date,
                "category": category,
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        body.data
    }

    #[tokio::test]
    async fn test_health_check() {
        let _guard = init_test_tracing();
        let app = setup_test_app().await;
        let server = TestServer::new(app).unwrap();

        let response = server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_create_user_and_authenticate() {
        let (server, _state) = setup_test_server().await;

        let response = server
            .post("/api/v1/users")
            .json(&CreateUserRequest {
                username: "alice".to_string(),
            })
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        assert_eq!(body.message, "User created successfully");
        let token = body.data["api_token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 32);

        let me = server
            .get("/api/v1/users/me")
            .add_header(AUTHORIZATION, token_header(&token))
            .await;
        me.assert_status(StatusCode::OK);
        let me: ApiResponse<Value> = me.json();
        assert_eq!(me.data["username"], "alice");
        assert!(me.data.get("api_token").is_none());

        let duplicate = server
            .post("/api/v1/users")
            .json(&json!({"username": "alice"}))
            .await;
        duplicate.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = duplicate.json();
        assert_eq!(error["field"], "username");
    }

    #[tokio::test]
    async fn test_requests_without_valid_token_are_rejected() {
        let (server, _state) = setup_test_server().await;

        let missing = server.get("/api/v1/expenses").await;
        missing.assert_status(StatusCode::UNAUTHORIZED);
        let body: Value = missing.json();
        assert_eq!(body["code"], "UNAUTHORIZED");
        assert_eq!(body["success"], false);

        let unknown = server
            .get("/api/v1/summary")
            .add_header(AUTHORIZATION, token_header("not-a-real-token"))
            .await;
        unknown.assert_status(StatusCode::UNAUTHORIZED);

        let malformed = server
            .get("/api/v1/budgets")
            .add_header(AUTHORIZATION, HeaderValue::from_static("Basic abc"))
            .await;
        malformed.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_categories_shared_and_personal() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        let bob = create_test_user(&state, "bob").await;

        let created = server
            .post("/api/v1/categories")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"name": "Coffee", "transaction_type": "EXPENSE"}))
            .await;
        created.assert_status(StatusCode::CREATED);
        let created: ApiResponse<Value> = created.json();
        assert_eq!(created.data["shared"], false);
        let coffee_id = created.data["id"].as_i64().unwrap();

        let duplicate = server
            .post("/api/v1/categories")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"name": "Coffee", "transaction_type": "EXPENSE"}))
            .await;
        duplicate.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = duplicate.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");
        assert_eq!(error["field"], "name");

        let incomes = server
            .get("/api/v1/categories?type=INCOME")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        incomes.assert_status(StatusCode::OK);
        let incomes: ApiResponse<Vec<Value>> = incomes.json();
        assert!(incomes.data.iter().all(|c| c["transaction_type"] == "INCOME"));
        assert!(incomes.data.iter().any(|c| c["name"] == "Salary"));

        // Bob sees the shared ones but not Alice's
        let bobs = server
            .get("/api/v1/categories")
            .add_header(AUTHORIZATION, bob.clone())
            .await;
        let bobs: ApiResponse<Vec<Value>> = bobs.json();
        assert!(bobs.data.iter().any(|c| c["name"] == "Food"));
        assert!(!bobs.data.iter().any(|c| c["id"] == coffee_id));

        let steal = server
            .put(&format!("/api/v1/categories/{}", coffee_id))
            .add_header(AUTHORIZATION, bob.clone())
            .json(&json!({"name": "Mine"}))
            .await;
        steal.assert_status(StatusCode::NOT_FOUND);

        let food = category_id(&server, &alice, "Food", "EXPENSE").await;
        let shared_delete = server
            .delete(&format!("/api/v1/categories/{}", food))
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        shared_delete.assert_status(StatusCode::NOT_FOUND);

        let renamed = server
            .put(&format!("/api/v1/categories/{}", coffee_id))
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"name": "Coffee & Tea"}))
            .await;
        renamed.assert_status(StatusCode::OK);
        let renamed: ApiResponse<Value> = renamed.json();
        assert_eq!(renamed.data["name"], "Coffee & Tea");
        assert_eq!(renamed.data["transaction_type"], "EXPENSE");
    }

    #[tokio::test]
    async fn test_expense_crud() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        let food = category_id(&server, &alice, "Food", "EXPENSE").await;

        let expense = create_expense(&server, &alice, "Lunch", "12.5", "2024-03-04", Some(food)).await;
        let id = expense["id"].as_i64().unwrap();
        assert_eq!(expense["amount"], "12.50");
        assert_eq!(expense["category"], food);
        assert_eq!(expense["category_name"], "Food");

        let fetched = server
            .get(&format!("/api/v1/expenses/{}", id))
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        fetched.assert_status(StatusCode::OK);

        let updated = server
            .put(&format!("/api/v1/expenses/{}", id))
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "Big lunch", "category": null}))
            .await;
        updated.assert_status(StatusCode::OK);
        let updated: ApiResponse<Value> = updated.json();
        assert_eq!(updated.data["title"], "Big lunch");
        assert_eq!(updated.data["amount"], "12.50");
        assert!(updated.data["category"].is_null());
        assert!(updated.data["category_name"].is_null());

        let deleted = server
            .delete(&format!("/api/v1/expenses/{}", id))
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        deleted.assert_status(StatusCode::NO_CONTENT);

        let gone = server
            .get(&format!("/api/v1/expenses/{}", id))
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        gone.assert_status(StatusCode::NOT_FOUND);
        let error: Value = gone.json();
        assert_eq!(error["error"], "Not found");
    }

    #[tokio::test]
    async fn test_expense_rejects_income_category_and_bad_amount() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        let salary = category_id(&server, &alice, "Salary", "INCOME").await;

        let wrong_type = server
            .post("/api/v1/expenses")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "Oops", "amount": "10", "date": "2024-03-01", "category": salary}))
            .await;
        wrong_type.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = wrong_type.json();
        assert_eq!(error["field"], "category");

        let too_precise = server
            .post("/api/v1/expenses")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "Oops", "amount": "1.234", "date": "2024-03-01"}))
            .await;
        too_precise.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = too_precise.json();
        assert_eq!(error["field"], "amount");

        let income = server
            .post("/api/v1/incomes")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "Pay", "amount": "2500", "date": "2024-03-01", "category": salary}))
            .await;
        income.assert_status(StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_users_cannot_see_each_others_data() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        let bob = create_test_user(&state, "bob").await;

        let expense = create_expense(&server, &alice, "Rent", "900", "2024-03-01", None).await;
        let id = expense["id"].as_i64().unwrap();

        let list = server
            .get("/api/v1/expenses")
            .add_header(AUTHORIZATION, bob.clone())
            .await;
        let list: ApiResponse<Vec<Value>> = list.json();
        assert!(list.data.is_empty());

        let total = server
            .get("/api/v1/expenses/total")
            .add_header(AUTHORIZATION, bob.clone())
            .await;
        let total: ApiResponse<Value> = total.json();
        assert_eq!(total.data["total_expenses"], "0.00");

        let summary = server
            .get("/api/v1/summary")
            .add_header(AUTHORIZATION, bob.clone())
            .await;
        let summary: ApiResponse<Value> = summary.json();
        assert_eq!(summary.data["total_expense"], "0.00");

        let export = server
            .get("/api/v1/expenses/export")
            .add_header(AUTHORIZATION, bob.clone())
            .await;
        assert_eq!(export.text(), "Date,Title,Category,Amount\n");

        for response in [
            server
                .get(&format!("/api/v1/expenses/{}", id))
                .add_header(AUTHORIZATION, bob.clone())
                .await,
            server
                .put(&format!("/api/v1/expenses/{}", id))
                .add_header(AUTHORIZATION, bob.clone())
                .json(&json!({"title": "Mine"}))
                .await,
            server
                .delete(&format!("/api/v1/expenses/{}", id))
                .add_header(AUTHORIZATION, bob.clone())
                .await,
            // An expense is not reachable through the income routes either
            server
                .get(&format!("/api/v1/incomes/{}", id))
                .add_header(AUTHORIZATION, alice.clone())
                .await,
        ] {
            response.assert_status(StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_date_range() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        create_expense(&server, &alice, "Feb", "1", "2024-02-28", None).await;
        create_expense(&server, &alice, "Mar 1", "2", "2024-03-01", None).await;
        create_expense(&server, &alice, "Mar 15", "3", "2024-03-15", None).await;

        let march = server
            .get("/api/v1/expenses?start_date=2024-03-01&end_date=2024-03-31")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        march.assert_status(StatusCode::OK);
        let march: ApiResponse<Vec<Value>> = march.json();
        let titles: Vec<&str> = march.data.iter().map(|e| e["title"].as_str().unwrap()).collect();
        assert_eq!(titles, vec!["Mar 15", "Mar 1"]);

        let inverted = server
            .get("/api/v1/expenses?start_date=2024-03-31&end_date=2024-03-01")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        inverted.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = inverted.json();
        assert_eq!(error["field"], "start_date");
    }

    #[tokio::test]
    async fn test_csv_export() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        let food = category_id(&server, &alice, "Food", "EXPENSE").await;
        create_expense(&server, &alice, "Coffee", "4.50", "2024-03-01", Some(food)).await;

        let response = server
            .get("/api/v1/expenses/export")
            .add_header(AUTHORIZATION, alice.clone())
            .await;

        response.assert_status(StatusCode::OK);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), "text/csv");
        assert_eq!(
            response.headers().get(CONTENT_DISPOSITION).unwrap(),
            "attachment; filename=\"expenses.csv\""
        );
        assert_eq!(
            response.text(),
            "Date,Title,Category,Amount\n2024-03-01,Coffee,Food,4.50\n"
        );
    }

    #[tokio::test]
    async fn test_summary_and_totals() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;

        let empty = server
            .get("/api/v1/summary")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        let empty: ApiResponse<Value> = empty.json();
        assert_eq!(
            empty.data,
            json!({"total_income": "0.00", "total_expense": "0.00", "net_income": "0.00"})
        );

        create_expense(&server, &alice, "Rent", "1200", "2024-03-01", None).await;
        create_expense(&server, &alice, "Snack", "0.30", "2024-03-02", None).await;
        server
            .post("/api/v1/incomes")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "Pay", "amount": "2500.10", "date": "2024-03-01"}))
            .await
            .assert_status(StatusCode::CREATED);

        let summary = server
            .get("/api/v1/summary")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        let summary: ApiResponse<Value> = summary.json();
        assert_eq!(summary.data["total_income"], "2500.10");
        assert_eq!(summary.data["total_expense"], "1200.30");
        assert_eq!(summary.data["net_income"], "1299.80");

        let incomes = server
            .get("/api/v1/incomes/total")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        let incomes: ApiResponse<Value> = incomes.json();
        assert_eq!(incomes.data["total_incomes"], "2500.10");
    }

    #[tokio::test]
    async fn test_analytics_and_summary_stats() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;

        let empty = server
            .get("/api/v1/expenses/summary-stats")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        empty.assert_status(StatusCode::OK);
        let empty: ApiResponse<Value> = empty.json();
        assert_eq!(
            empty.data,
            json!({"total": "0.00", "count": 0, "average": "0.00", "by_category": []})
        );

        let food = category_id(&server, &alice, "Food", "EXPENSE").await;
        let transport = category_id(&server, &alice, "Transport", "EXPENSE").await;
        create_expense(&server, &alice, "Groceries", "40", "2024-02-10", Some(food)).await;
        create_expense(&server, &alice, "Lunch", "20", "2024-03-10", Some(food)).await;
        create_expense(&server, &alice, "Bus", "10", "2024-03-11", Some(transport)).await;

        let analytics = server
            .get("/api/v1/expenses/analytics")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        analytics.assert_status(StatusCode::OK);
        let analytics: ApiResponse<Value> = analytics.json();
        assert_eq!(
            analytics.data["by_category"],
            json!([
                {"category": "Food", "total": "60.00"},
                {"category": "Transport", "total": "10.00"},
            ])
        );
        assert_eq!(
            analytics.data["by_month"],
            json!([
                {"year": 2024, "month": 2, "total": "40.00"},
                {"year": 2024, "month": 3, "total": "30.00"},
            ])
        );

        let march = server
            .get("/api/v1/expenses/summary-stats?start_date=2024-03-01&end_date=2024-03-31")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        let march: ApiResponse<Value> = march.json();
        assert_eq!(march.data["total"], "30.00");
        assert_eq!(march.data["count"], 2);
        assert_eq!(march.data["average"], "15.00");
    }

    #[tokio::test]
    async fn test_budget_upsert_and_progress() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;
        let food = category_id(&server, &alice, "Food", "EXPENSE").await;
        let salary = category_id(&server, &alice, "Salary", "INCOME").await;

        let first = server
            .post("/api/v1/budgets")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"category": food, "amount": "100"}))
            .await;
        first.assert_status(StatusCode::CREATED);

        let second = server
            .post("/api/v1/budgets")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"category": food, "amount": "500"}))
            .await;
        second.assert_status(StatusCode::OK);

        let income_budget = server
            .post("/api/v1/budgets")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"category": salary, "amount": "10"}))
            .await;
        income_budget.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = income_budget.json();
        assert_eq!(error["field"], "category");

        let budgets = server
            .get("/api/v1/budgets")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        let budgets: ApiResponse<Vec<Value>> = budgets.json();
        assert_eq!(budgets.data.len(), 1);
        assert_eq!(budgets.data[0]["amount"], "500.00");

        create_expense(&server, &alice, "Groceries", "100", "2024-03-05", Some(food)).await;
        create_expense(&server, &alice, "Dinner", "50", "2024-03-20", Some(food)).await;
        create_expense(&server, &alice, "April", "999", "2024-04-01", Some(food)).await;

        let progress = server
            .get("/api/v1/budgets/progress?year=2024&month=3")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        progress.assert_status(StatusCode::OK);
        let progress: ApiResponse<Vec<Value>> = progress.json();
        assert_eq!(progress.data.len(), 1);
        let entry = &progress.data[0];
        assert_eq!(entry["category"], "Food");
        assert_eq!(entry["budget_limit"], "500.00");
        assert_eq!(entry["actual_limit"], "150.00");
        assert_eq!(entry["remaining"], "350.00");
        assert_eq!(entry["percent"], 30.0);

        let bad_month = server
            .get("/api/v1/budgets/progress?year=2024&month=13")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        bad_month.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = bad_month.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");
        assert_eq!(error["field"], "month");
        assert_eq!(error["success"], false);

        let budget_id = budgets.data[0]["id"].as_i64().unwrap();
        server
            .delete(&format!("/api/v1/budgets/{}", budget_id))
            .add_header(AUTHORIZATION, alice.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_deleting_category_keeps_expenses() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;

        let created = server
            .post("/api/v1/categories")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"name": "Hobbies", "transaction_type": "EXPENSE"}))
            .await;
        let created: ApiResponse<Value> = created.json();
        let hobbies = created.data["id"].as_i64().unwrap();

        let expense = create_expense(&server, &alice, "Paint", "15", "2024-03-01", Some(hobbies)).await;
        server
            .post("/api/v1/budgets")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"category": hobbies, "amount": "50"}))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .delete(&format!("/api/v1/categories/{}", hobbies))
            .add_header(AUTHORIZATION, alice.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let after = server
            .get(&format!("/api/v1/expenses/{}", expense["id"]))
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        after.assert_status(StatusCode::OK);
        let after: ApiResponse<Value> = after.json();
        assert!(after.data["category"].is_null());

        let budgets = server
            .get("/api/v1/budgets")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        let budgets: ApiResponse<Vec<Value>> = budgets.json();
        assert!(budgets.data.is_empty());
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let (server, _state) = setup_test_server().await;

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status(StatusCode::OK);
        let doc: Value = response.json();
        assert!(doc["paths"].get("/api/v1/budgets/progress").is_some());
        assert!(doc["paths"].get("/api/v1/expenses/export").is_some());
    }

    #[tokio::test]
    async fn test_request_rejections_use_error_envelope() {
        let (server, state) = setup_test_server().await;
        let alice = create_test_user(&state, "alice").await;

        let blank_title = server
            .post("/api/v1/expenses")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "", "amount": "1", "date": "2024-03-01"}))
            .await;
        blank_title.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = blank_title.json();
        assert_eq!(error["code"], "VALIDATION_ERROR");
        assert_eq!(error["field"], "title");

        let missing_amount = server
            .post("/api/v1/expenses")
            .add_header(AUTHORIZATION, alice.clone())
            .json(&json!({"title": "Lunch", "date": "2024-03-01"}))
            .await;
        missing_amount.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let error: Value = missing_amount.json();
        assert_eq!(error["code"], "INVALID_REQUEST");
        assert_eq!(error["success"], false);

        let bad_date = server
            .get("/api/v1/expenses?start_date=yesterday")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        bad_date.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = bad_date.json();
        assert_eq!(error["code"], "INVALID_REQUEST");

        let bad_type = server
            .get("/api/v1/categories?type=SAVINGS")
            .add_header(AUTHORIZATION, alice.clone())
            .await;
        bad_type.assert_status(StatusCode::BAD_REQUEST);
        let error: Value = bad_type.json();
        assert_eq!(error["code"], "INVALID_REQUEST");
    }
}
