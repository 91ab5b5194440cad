use std::str::FromStr;

use bizagent_core::models::{
    campaign::{CampaignStatus, DeliveryEvent},
    contact::ContactInfo,
    email::SendResult,
};
use bizagent_core::response::{ApiResponse, Placeholder};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, to_value};

#[rstest]
#[case("DRAFT", CampaignStatus::Draft)]
#[case("active", CampaignStatus::Active)]
#[case(" Paused ", CampaignStatus::Paused)]
#[case("COMPLETED", CampaignStatus::Completed)]
#[case("cancelled", CampaignStatus::Cancelled)]
fn test_campaign_status_parse(#[case] input: &str, #[case] expected: CampaignStatus) {
    assert_eq!(CampaignStatus::from_str(input).unwrap(), expected);
}

#[test]
fn test_campaign_status_rejects_unknown() {
    assert!(CampaignStatus::from_str("ARCHIVED").is_err());
}

#[test]
fn test_campaign_status_serializes_upper_case() {
    assert_eq!(to_value(CampaignStatus::Active).unwrap(), json!("ACTIVE"));
    assert_eq!(CampaignStatus::Draft.to_string(), "DRAFT");
}

#[rstest]
#[case("sent", DeliveryEvent::Delivered)]
#[case("open", DeliveryEvent::Opened)]
#[case("click", DeliveryEvent::Clicked)]
#[case("bounce", DeliveryEvent::Bounced)]
#[case("blocked", DeliveryEvent::Bounced)]
fn test_delivery_event_from_mailjet_name(#[case] input: &str, #[case] expected: DeliveryEvent) {
    assert_eq!(DeliveryEvent::from_str(input).unwrap(), expected);
}

#[test]
fn test_api_response_ok_omits_error() {
    let response = ApiResponse::ok(Placeholder::coming_soon());

    assert_eq!(
        to_value(&response).unwrap(),
        json!({ "success": true, "data": { "message": "coming soon" } })
    );
}

#[test]
fn test_api_response_failure_omits_data() {
    let response: ApiResponse<()> = ApiResponse::failure("boom");

    assert_eq!(
        to_value(&response).unwrap(),
        json!({ "success": false, "error": "boom" })
    );
}

#[test]
fn test_send_result_constructors() {
    let ok = SendResult::sent("msg-1");
    assert!(ok.success);
    assert_eq!(ok.message_id.as_deref(), Some("msg-1"));

    let failed = SendResult::failed("rejected");
    assert!(!failed.success);
    assert_eq!(failed.error.as_deref(), Some("rejected"));
    assert_eq!(to_value(&failed).unwrap(), json!({ "success": false, "error": "rejected" }));
}

#[test]
fn test_contact_info_picks_first_sorted_value() {
    let mut info = ContactInfo::default();
    assert!(info.is_empty());

    info.emails.insert("sales@acme.io".to_string());
    info.emails.insert("info@acme.io".to_string());
    info.contact_person = Some("Jane Doe".to_string());

    let update = info.to_contact_update();
    assert_eq!(update.email.as_deref(), Some("info@acme.io"));
    assert_eq!(update.phone, None);
    assert_eq!(update.contact_person.as_deref(), Some("Jane Doe"));
}
