use serde_json::{json, Value};
use uuid::Uuid;

pub fn doctor_json(
    id: Uuid,
    available: bool,
    booked_slots: Value,
    slot_version: i64,
) -> Value {
    json!({
        "id": id,
        "name": "Dr. Asha Rao",
        "email": "asha.rao@example.com",
        "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
        "speciality": "Dermatology",
        "degree": "MBBS",
        "experience": 6,
        "about": "Skin specialist",
        "fees": 500,
        "image": null,
        "available": available,
        "address": { "line1": "12 Clinic Road", "line2": "Floor 2" },
        "booked_slots": booked_slots,
        "slot_version": slot_version,
        "created_at": "2025-01-15T09:00:00Z",
        "updated_at": "2025-01-15T09:00:00Z"
    })
}

pub fn patient_json(id: Uuid) -> Value {
    json!({
        "id": id,
        "name": "Jane Doe",
        "email": "jane.doe@example.com",
        "password_hash": "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2g",
        "phone": "5551234567",
        "address": { "line1": "4 Elm Street", "line2": "" },
        "dob": "1990-07-21",
        "gender": "female",
        "image": null,
        "created_at": "2025-02-01T10:00:00Z",
        "updated_at": "2025-02-01T10:00:00Z"
    })
}

pub fn appointment_json(
    id: Uuid,
    user_id: Uuid,
    doc_id: Uuid,
    status: &str,
    slot_date: &str,
    slot_time: &str,
    created_at: &str,
) -> Value {
    json!({
        "id": id,
        "user_id": user_id,
        "doc_id": doc_id,
        "slot_date": slot_date,
        "slot_time": slot_time,
        "user_data": {
            "id": user_id,
            "name": "Jane Doe",
            "email": "jane.doe@example.com",
            "phone": "5551234567",
            "address": { "line1": "4 Elm Street", "line2": "" },
            "dob": "1990-07-21",
            "gender": "female",
            "image": null
        },
        "doc_data": {
            "id": doc_id,
            "name": "Dr. Asha Rao",
            "email": "asha.rao@example.com",
            "speciality": "Dermatology",
            "degree": "MBBS",
            "experience": 6,
            "fees": 500,
            "image": null,
            "address": { "line1": "12 Clinic Road", "line2": "Floor 2" }
        },
        "amount": 500,
        "status": status,
        "payment": false,
        "created_at": created_at,
        "updated_at": created_at
    })
}
