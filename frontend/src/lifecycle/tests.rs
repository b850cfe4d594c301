use super::*;
use crate::api::ApiConfig;
use crate::http::MockHttpClient;
use crate::session::tests::MockSession;
use serde_json::json;

// =========================================================
// 辅助函数
// =========================================================

const BASE: &str = "http://api.test";

fn create_flow(
    session: MockSession,
    client: MockHttpClient,
) -> RideFlow<MockSession, MockHttpClient> {
    RideFlow::new(session, RideApi::new(ApiConfig::new(BASE), client))
}

fn test_user() -> User {
    User {
        user_id: "u1".to_string(),
        name: "Ann".to_string(),
        email: "a@x.com".to_string(),
    }
}

fn test_request() -> RideRequest {
    RideRequest {
        id: "r1".to_string(),
        user_id: "u1".to_string(),
        pickup_location: GeoPoint::new(37.7749, -122.4194),
        dropoff_location: GeoPoint::new(37.8044, -122.2712),
        max_wait_time: 1800,
        payment_method: PaymentMethod::Card,
        status: RideStatus::Pending,
        route_id: None,
    }
}

fn valid_draft() -> RideDraft {
    RideDraft {
        pickup: "37.7749, -122.4194".to_string(),
        dropoff: "37.8044, -122.2712".to_string(),
        max_wait_minutes: "30".to_string(),
        payment_method: PaymentMethod::Card,
    }
}

fn created_request_body() -> serde_json::Value {
    json!({
        "id": "r1",
        "user_id": "u1",
        "pickup_location": {"latitude": 37.7749, "longitude": -122.4194},
        "dropoff_location": {"latitude": 37.8044, "longitude": -122.2712},
        "max_wait_time": 1800,
        "payment_method": "card",
        "status": "PENDING"
    })
}

// =========================================================
// restore 测试（启动恢复）
// =========================================================

#[test]
fn test_restore_empty_session_is_unauthenticated() {
    let flow = create_flow(MockSession::new(), MockHttpClient::new());
    assert_eq!(flow.restore(), RidePhase::Unauthenticated);
}

#[test]
fn test_restore_with_user_awaits_ride_request() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    let flow = create_flow(session, MockHttpClient::new());

    assert_eq!(flow.restore(), RidePhase::AwaitingRideRequest);
}

#[test]
fn test_restore_with_pending_request_resumes_confirmation() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    session.save(KEY_RIDE_REQUEST, &test_request());
    let flow = create_flow(session, MockHttpClient::new());

    assert_eq!(
        flow.restore(),
        RidePhase::AwaitingConfirmation {
            request_id: "r1".to_string()
        }
    );
    // 恢复绝不触网：不会重复提交 POST /ride-requests
    assert!(flow.api.http().sent().is_empty());
}

#[test]
fn test_restore_with_confirmed_request_goes_straight_to_route() {
    let session = MockSession::new();
    let mut request = test_request();
    request.status = RideStatus::Confirmed;
    request.route_id = Some("b7".to_string());
    session.save(KEY_RIDE_REQUEST, &request);
    let flow = create_flow(session, MockHttpClient::new());

    assert_eq!(
        flow.restore(),
        RidePhase::RouteConfirmed {
            request_id: "r1".to_string(),
            route_id: "b7".to_string()
        }
    );
}

#[test]
fn test_restore_confirmed_without_route_id_keeps_polling() {
    // 状态已确认但缺 route_id：继续轮询，由状态查询补齐
    let session = MockSession::new();
    let mut request = test_request();
    request.status = RideStatus::Confirmed;
    session.save(KEY_RIDE_REQUEST, &request);
    let flow = create_flow(session, MockHttpClient::new());

    assert_eq!(
        flow.restore(),
        RidePhase::AwaitingConfirmation {
            request_id: "r1".to_string()
        }
    );
}

#[test]
fn test_restore_with_malformed_request_falls_back_to_user() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    session.poison(KEY_RIDE_REQUEST, "###corrupt###");
    let flow = create_flow(session, MockHttpClient::new());

    // 损坏的槽位按不存在处理 (fail open)
    assert_eq!(flow.restore(), RidePhase::AwaitingRideRequest);
}

#[test]
fn test_restore_with_malformed_user_is_unauthenticated() {
    let session = MockSession::new();
    session.poison(KEY_USER, "{\"unexpected\": true}");
    let flow = create_flow(session, MockHttpClient::new());

    assert_eq!(flow.restore(), RidePhase::Unauthenticated);
}

#[test]
fn test_restore_is_idempotent() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    session.save(KEY_RIDE_REQUEST, &test_request());
    let flow = create_flow(session, MockHttpClient::new());

    let first = flow.restore();
    let second = flow.restore();
    assert_eq!(first, second);
    assert!(flow.api.http().sent().is_empty());
}

// =========================================================
// 表单校验测试
// =========================================================

#[test]
fn test_wait_time_bounds_are_inclusive() {
    let mut draft = valid_draft();

    draft.max_wait_minutes = "10".to_string();
    assert_eq!(draft.validate().unwrap().max_wait_minutes, 10);

    draft.max_wait_minutes = "120".to_string();
    assert_eq!(draft.validate().unwrap().max_wait_minutes, 120);

    draft.max_wait_minutes = "9".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidWaitTime));

    draft.max_wait_minutes = "121".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidWaitTime));
}

#[test]
fn test_non_numeric_wait_time_is_rejected() {
    let mut draft = valid_draft();

    draft.max_wait_minutes = "soon".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidWaitTime));

    draft.max_wait_minutes = "-5".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidWaitTime));

    draft.max_wait_minutes = "12.5".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidWaitTime));
}

#[test]
fn test_empty_fields_are_rejected() {
    let mut draft = valid_draft();
    draft.pickup = "   ".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::EmptyField));

    let mut draft = valid_draft();
    draft.dropoff = String::new();
    assert_eq!(draft.validate(), Err(ValidationError::EmptyField));

    let mut draft = valid_draft();
    draft.max_wait_minutes = String::new();
    assert_eq!(draft.validate(), Err(ValidationError::EmptyField));
}

#[test]
fn test_unparseable_coordinates_are_rejected() {
    let mut draft = valid_draft();
    draft.pickup = "Market St & 5th".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidPickup));

    let mut draft = valid_draft();
    draft.dropoff = "91.0, 0.0".to_string();
    assert_eq!(draft.validate(), Err(ValidationError::InvalidDropoff));
}

#[test]
fn test_validation_messages_match_the_form_copy() {
    assert_eq!(
        ValidationError::EmptyField.message(),
        "All fields are required."
    );
    assert_eq!(
        ValidationError::InvalidWaitTime.message(),
        "Maximum wait time should be between 10 and 120 minutes."
    );
}

// =========================================================
// register 测试
// =========================================================

#[tokio::test]
async fn test_register_persists_user() {
    let client = MockHttpClient::new();
    client.mock_response(
        "http://api.test/users",
        201,
        json!({"user_id": "u1", "name": "Ann", "email": "a@x.com"}),
    );
    let flow = create_flow(MockSession::new(), client);

    let user = flow.register("Ann", "a@x.com").await.unwrap();
    assert_eq!(user, test_user());

    // 用户已持久化，刷新后直接进入乘车表单
    assert_eq!(flow.session.load::<User>(KEY_USER), Some(test_user()));
    assert_eq!(flow.restore(), RidePhase::AwaitingRideRequest);
}

#[tokio::test]
async fn test_register_rejects_empty_fields_locally() {
    let flow = create_flow(MockSession::new(), MockHttpClient::new());

    let result = flow.register("", "a@x.com").await;
    assert_eq!(
        result,
        Err(SubmitError::Validation(ValidationError::EmptyField))
    );
    let result = flow.register("Ann", "   ").await;
    assert_eq!(
        result,
        Err(SubmitError::Validation(ValidationError::EmptyField))
    );

    // 本地校验失败绝不触网
    assert!(flow.api.http().sent().is_empty());
}

#[tokio::test]
async fn test_register_trims_whitespace() {
    let client = MockHttpClient::new();
    client.mock_response(
        "http://api.test/users",
        201,
        json!({"user_id": "u1", "name": "Ann", "email": "a@x.com"}),
    );
    let flow = create_flow(MockSession::new(), client);

    flow.register("  Ann  ", " a@x.com ").await.unwrap();

    let requests = flow.api.http().requests.borrow();
    let body: serde_json::Value = serde_json::from_str(requests[0].2.as_ref().unwrap()).unwrap();
    assert_eq!(body, json!({"name": "Ann", "email": "a@x.com"}));
}

#[tokio::test]
async fn test_register_missing_user_id_is_a_decode_error() {
    let client = MockHttpClient::new();
    client.mock_response(
        "http://api.test/users",
        200,
        json!({"name": "Ann", "email": "a@x.com"}),
    );
    let flow = create_flow(MockSession::new(), client);

    let result = flow.register("Ann", "a@x.com").await;
    assert!(matches!(
        result,
        Err(SubmitError::Api(ApiError::Decode(_)))
    ));
    // 失败的注册不留下半个用户
    assert_eq!(flow.session.load::<User>(KEY_USER), None);
}

// =========================================================
// submit_request 测试
// =========================================================

#[tokio::test]
async fn test_submit_never_calls_api_on_invalid_draft() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    let flow = create_flow(session, MockHttpClient::new());

    let mut draft = valid_draft();
    draft.dropoff = String::new();
    let result = flow.submit_request(&draft).await;

    assert_eq!(
        result,
        Err(SubmitError::Validation(ValidationError::EmptyField))
    );
    assert!(flow.api.http().sent().is_empty());

    let mut draft = valid_draft();
    draft.pickup = "somewhere downtown".to_string();
    let result = flow.submit_request(&draft).await;

    assert_eq!(
        result,
        Err(SubmitError::Validation(ValidationError::InvalidPickup))
    );
    assert!(flow.api.http().sent().is_empty());
}

#[tokio::test]
async fn test_submit_without_user_is_a_local_error() {
    let flow = create_flow(MockSession::new(), MockHttpClient::new());

    let result = flow.submit_request(&valid_draft()).await;
    assert_eq!(
        result,
        Err(SubmitError::Validation(ValidationError::MissingUser))
    );
    assert!(flow.api.http().sent().is_empty());
}

#[tokio::test]
async fn test_submit_success_persists_the_created_request() {
    let client = MockHttpClient::new();
    client.mock_response("http://api.test/ride-requests", 201, created_request_body());
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    let flow = create_flow(session, client);

    let request = flow.submit_request(&valid_draft()).await.unwrap();
    assert_eq!(request.id, "r1");

    // 请求体携带已注册用户和换算成秒的等待时间
    let body: serde_json::Value = {
        let requests = flow.api.http().requests.borrow();
        serde_json::from_str(requests[0].2.as_ref().unwrap()).unwrap()
    };
    assert_eq!(body["user_id"], "u1");
    assert_eq!(body["max_wait_time"], 1800);

    // 在途请求已持久化，刷新后恢复轮询
    assert_eq!(
        flow.session.load::<RideRequest>(KEY_RIDE_REQUEST),
        Some(test_request())
    );
    assert_eq!(
        flow.restore(),
        RidePhase::AwaitingConfirmation {
            request_id: "r1".to_string()
        }
    );
}

#[tokio::test]
async fn test_submit_server_rejection_leaves_no_pending_request() {
    let client = MockHttpClient::new();
    client.mock_response(
        "http://api.test/ride-requests",
        409,
        json!({"message": "no drivers available in your area"}),
    );
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    let flow = create_flow(session, client);

    let result = flow.submit_request(&valid_draft()).await;
    match result {
        Err(SubmitError::Api(ApiError::Status { status, message })) => {
            assert_eq!(status, 409);
            assert_eq!(message, "no drivers available in your area");
        }
        other => panic!("expected server rejection, got {:?}", other),
    }

    assert_eq!(flow.session.load::<RideRequest>(KEY_RIDE_REQUEST), None);
    assert_eq!(flow.restore(), RidePhase::AwaitingRideRequest);
}

// =========================================================
// 确认与清理测试
// =========================================================

#[test]
fn test_record_confirmation_repersists_with_route_id() {
    let session = MockSession::new();
    session.save(KEY_RIDE_REQUEST, &test_request());
    let flow = create_flow(session, MockHttpClient::new());

    flow.record_confirmation("b7");

    let stored: RideRequest = flow.session.load(KEY_RIDE_REQUEST).unwrap();
    assert_eq!(stored.status, RideStatus::Confirmed);
    assert_eq!(stored.route_id, Some("b7".to_string()));

    // 刷新后直达确认路线页
    assert_eq!(
        flow.restore(),
        RidePhase::RouteConfirmed {
            request_id: "r1".to_string(),
            route_id: "b7".to_string()
        }
    );
}

#[test]
fn test_record_confirmation_without_pending_request_is_a_noop() {
    let flow = create_flow(MockSession::new(), MockHttpClient::new());
    flow.record_confirmation("b7");
    assert_eq!(flow.session.load::<RideRequest>(KEY_RIDE_REQUEST), None);
}

#[test]
fn test_cancel_clears_the_pending_request() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    session.save(KEY_RIDE_REQUEST, &test_request());
    let flow = create_flow(session, MockHttpClient::new());

    flow.cancel_request();

    assert_eq!(flow.session.load::<RideRequest>(KEY_RIDE_REQUEST), None);
    // 用户仍在，回到乘车表单
    assert_eq!(flow.restore(), RidePhase::AwaitingRideRequest);
}

#[test]
fn test_clear_finished_request_removes_the_slot() {
    let session = MockSession::new();
    session.save(KEY_USER, &test_user());
    let mut confirmed = test_request();
    confirmed.status = RideStatus::Confirmed;
    confirmed.route_id = Some("b7".to_string());
    session.save(KEY_RIDE_REQUEST, &confirmed);
    let flow = create_flow(session, MockHttpClient::new());

    flow.clear_finished_request();

    assert_eq!(flow.session.load::<RideRequest>(KEY_RIDE_REQUEST), None);
    assert_eq!(flow.restore(), RidePhase::AwaitingRideRequest);
}
