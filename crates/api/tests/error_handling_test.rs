use axum::http::StatusCode;
use bizagent_api::middleware::error_handling::map_error;
use bizagent_core::errors::BizError;
use rstest::rstest;

#[rstest]
#[case(BizError::NotFound("campaign".to_string()), StatusCode::NOT_FOUND)]
#[case(BizError::Validation("bad".to_string()), StatusCode::BAD_REQUEST)]
#[case(BizError::Authentication("denied".to_string()), StatusCode::UNAUTHORIZED)]
#[case(BizError::Conflict("run in progress".to_string()), StatusCode::CONFLICT)]
#[case(BizError::External("mailjet down".to_string()), StatusCode::BAD_GATEWAY)]
#[case(BizError::Database(eyre::eyre!("connection reset")), StatusCode::INTERNAL_SERVER_ERROR)]
fn test_error_status_mapping(#[case] error: BizError, #[case] expected: StatusCode) {
    assert_eq!(map_error(error).status(), expected);
}

#[test]
fn test_internal_error_maps_to_500() {
    let error = BizError::Internal(Box::new(std::io::Error::other("Internal error")));
    assert_eq!(map_error(error).status(), StatusCode::INTERNAL_SERVER_ERROR);
}
