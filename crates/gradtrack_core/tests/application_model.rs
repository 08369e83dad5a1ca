use chrono::{NaiveDate, TimeZone, Utc};
use gradtrack_core::{Application, ChecklistStep, EtatSet, NewApplication, Status};
use uuid::Uuid;

fn sample() -> Application {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut fields = NewApplication::new("Paris-Saclay", "M2 Info", Status::Pending);
    fields.ville = "Orsay".to_string();
    fields.date_applied = NaiveDate::from_ymd_opt(2025, 1, 15);
    fields.checklist.push(ChecklistStep::new("Pay fees"));
    fields.into_application(id, Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap())
}

#[test]
fn serialization_uses_camel_case_wire_fields() {
    let app = sample();
    let json = serde_json::to_value(&app).unwrap();

    assert_eq!(json["id"], "11111111-2222-4333-8444-555555555555");
    assert_eq!(json["dateApplied"], "2025-01-15");
    assert_eq!(json["createdAt"], "2025-01-15T12:00:00Z");
    assert_eq!(json["etat"], serde_json::json!(["En attente"]));
    assert_eq!(json["checklist"][0]["done"], false);
    assert!(json.get("date_applied").is_none());
    assert!(json.get("deadline").is_none());

    let decoded: Application = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, app);
}

#[test]
fn missing_free_text_fields_default_to_empty() {
    let json = serde_json::json!({
        "id": Uuid::new_v4().to_string(),
        "uni": "Bordeaux",
        "formation": "M1",
        "etat": ["Envoyée", "Campus"],
        "createdAt": "2025-02-01T00:00:00Z",
        "deadline": null
    });

    let app: Application = serde_json::from_value(json).unwrap();
    assert_eq!(app.mail, "");
    assert_eq!(app.notes, "");
    assert_eq!(app.deadline, None);
    assert_eq!(
        app.etat,
        [Status::Submitted, Status::Interview].into_iter().collect::<EtatSet>()
    );
    assert!(app.validate().is_ok());
}

#[test]
fn every_status_round_trips_through_its_label() {
    for status in Status::ALL {
        let encoded = serde_json::to_string(&status).unwrap();
        assert_eq!(encoded, format!("\"{}\"", status.label()));
        assert_eq!(status.label().parse::<Status>().unwrap(), status);
    }
}
