use tutorbook_api::middleware::error_handling::map_error;
use tutorbook_core::errors::BookingError;
use tutorbook_core::validation::RejectionReason;

#[tokio::test]
async fn test_error_handling_rejection() {
    // A rejection is an expected outcome: 409 with the reason code
    let error = BookingError::Rejected(RejectionReason::BufferConflict);

    let response = map_error(error);

    assert_eq!(response.status(), axum::http::StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_error_handling_not_found() {
    // Create a not found error
    let error = BookingError::NotFound("Booking request not found".to_string());

    // Map the error to a response
    let response = map_error(error);

    // Assert the response has the correct status code
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_handling_permission_denied() {
    let error = BookingError::PermissionDenied("Not a participant".to_string());

    let response = map_error(error);

    assert_eq!(response.status(), axum::http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_error_handling_validation() {
    // Create a validation error
    let error = BookingError::Validation("Invalid input".to_string());

    // Map the error to a response
    let response = map_error(error);

    // Assert the response has the correct status code
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_handling_invariant() {
    let error = BookingError::Invariant("slot_length_minutes must be positive".to_string());

    let response = map_error(error);

    assert_eq!(
        response.status(),
        axum::http::StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[tokio::test]
async fn test_error_handling_store() {
    // Store failures are retryable: 503, not 500
    let error = BookingError::Store(eyre::eyre!("Database connection failed"));

    let response = map_error(error);

    assert_eq!(
        response.status(),
        axum::http::StatusCode::SERVICE_UNAVAILABLE
    );
}
