use super::*;

#[test]
fn notice_class_distinguishes_errors() {
    assert_eq!(notice_class(&Notice::Error("x".to_owned())), "notice notice--error");
    assert_eq!(notice_class(&Notice::Confirmation("x".to_owned())), "notice notice--confirmation");
}

#[test]
fn notice_role_uses_alert_for_errors() {
    assert_eq!(notice_role(&Notice::Error("x".to_owned())), "alert");
    assert_eq!(notice_role(&Notice::Confirmation("x".to_owned())), "status");
}
