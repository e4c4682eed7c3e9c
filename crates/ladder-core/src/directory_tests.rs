use super::*;

#[test]
fn test_weights_within_tolerance() {
    assert!(validate_weight_sum(&[0.5, 0.3, 0.2]).is_ok());
    assert!(validate_weight_sum(&[0.5, 0.3, 0.209]).is_ok());
    assert!(validate_weight_sum(&[0.5, 0.3, 0.191]).is_ok());
}

#[test]
fn test_weights_outside_tolerance() {
    assert!(validate_weight_sum(&[0.5, 0.3, 0.22]).is_err());
    assert!(validate_weight_sum(&[0.5, 0.3]).is_err());
    assert!(validate_weight_sum(std::iter::empty()).is_err());
}

#[test]
fn test_negative_weight_rejected() {
    assert!(validate_weight_sum(&[1.5, -0.5]).is_err());
    assert!(validate_weight_sum(&[f64::NAN, 1.0]).is_err());
}

#[test]
fn test_stat_field_violations() {
    let field = StatField::bounded(0.0, 100.0);
    assert_eq!(field.violation(&StatValue::Number(42.0)), None);
    assert!(field.violation(&StatValue::Number(-1.0)).is_some());
    assert!(field.violation(&StatValue::Number(100.5)).is_some());
    assert!(field.violation(&StatValue::Number(f64::INFINITY)).is_some());
    assert!(field.violation(&StatValue::from("headshot")).is_some());

    let text = StatField {
        kind: StatKind::Text,
        min: None,
        max: None,
    };
    assert_eq!(text.violation(&StatValue::from("awp")), None);
    assert!(text.violation(&StatValue::Number(1.0)).is_some());
}

#[test]
fn test_tournament_status_round_trip_names() {
    for status in [
        TournamentStatus::Draft,
        TournamentStatus::Registration,
        TournamentStatus::Active,
        TournamentStatus::Completed,
        TournamentStatus::Cancelled,
    ] {
        assert_eq!(TournamentStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(TournamentStatus::parse("paused"), None);
}
