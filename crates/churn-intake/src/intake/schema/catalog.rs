//! Field declarations for the two churn forms.
//!
//! Names and option spellings must match what the prediction backend reads from the
//! request body; the backend one-hot encodes select values by exact string comparison.

use super::{FieldSchema, FormId, FormSchema};

const GENDERS: &[&str] = &["Male", "Female"];

const BANK_SERVICE_FLAGS: &[&str] = &[
    "paperless_billing",
    "senior_citizen",
    "streaming_tv",
    "streaming_movies",
    "multiple_lines",
    "phone_service",
    "device_protection",
    "online_backup",
    "partner",
    "dependents",
    "tech_support",
    "online_security",
];

pub(super) fn bank_form() -> FormSchema {
    let mut fields = vec![
        FieldSchema::number("tenure", Some(0.0), Some(72.0)),
        FieldSchema::number("monthly_charges", Some(0.0), Some(200.0)),
        FieldSchema::number("total_charges", Some(0.0), Some(10_000.0)),
    ];
    fields.extend(BANK_SERVICE_FLAGS.iter().map(|name| FieldSchema::boolean(name)));
    fields.extend([
        FieldSchema::select("gender", GENDERS),
        FieldSchema::select("contract", &["Month-to-month", "One year", "Two year"]),
        FieldSchema::select("internet_service", &["Fiber optic", "DSL", "No"]),
        FieldSchema::select(
            "payment_method",
            &[
                "Electronic check",
                "Mailed check",
                "Bank transfer (automatic)",
                "Credit card (automatic)",
            ],
        ),
    ]);

    FormSchema::new(FormId::Bank, fields)
}

pub(super) fn telecom_form() -> FormSchema {
    FormSchema::new(
        FormId::Telecom,
        vec![
            FieldSchema::number("credit_score", Some(300.0), Some(850.0)),
            FieldSchema::number("age", Some(18.0), Some(100.0)),
            FieldSchema::number("tenure", Some(0.0), Some(10.0)),
            FieldSchema::number("balance", Some(0.0), None),
            FieldSchema::number("num_of_products", Some(1.0), Some(4.0)),
            FieldSchema::boolean("has_cr_card"),
            FieldSchema::boolean("is_active_member"),
            FieldSchema::number("estimated_salary", Some(0.0), None),
            FieldSchema::number("satisfaction_score", Some(1.0), Some(5.0)),
            FieldSchema::number("point_earned", Some(0.0), Some(1000.0)),
            FieldSchema::select("geography", &["France", "Germany", "Spain"]),
            FieldSchema::select("gender", GENDERS),
            FieldSchema::select("card_type", &["DIAMOND", "GOLD", "SILVER", "PLATINUM"]),
        ],
    )
}
