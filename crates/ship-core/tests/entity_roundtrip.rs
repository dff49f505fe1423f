//! Serde roundtrip and JsonSchema validation tests for entity and view types.

use chrono::{TimeZone, Utc};
use schemars::schema_for;
use ship_core::batch::{Batch, InvoiceRecord, ShipmentRecord};
use ship_core::entities::*;
use ship_core::enums::*;
use ship_core::responses::*;

/// Validate a JSON value against a schemars-generated schema.
fn validate_against_schema(
    schema: &serde_json::Value,
    instance: &serde_json::Value,
) -> Vec<String> {
    let validator = jsonschema::validator_for(schema).expect("schema should be valid");
    validator
        .iter_errors(instance)
        .map(|e| format!("{e}"))
        .collect()
}

macro_rules! roundtrip_and_validate {
    ($name:ident, $ty:ty, $instance:expr) => {
        #[test]
        fn $name() {
            let val: $ty = $instance;

            let json_str = serde_json::to_string_pretty(&val).unwrap();
            let recovered: $ty = serde_json::from_str(&json_str).unwrap();
            assert_eq!(
                recovered,
                val,
                "serde roundtrip failed for {}",
                stringify!($ty)
            );

            let schema = serde_json::to_value(schema_for!($ty)).unwrap();
            let instance = serde_json::to_value(&val).unwrap();
            let errors = validate_against_schema(&schema, &instance);
            assert!(
                errors.is_empty(),
                "Schema validation failed for {}: {:?}",
                stringify!($ty),
                errors
            );
        }
    };
}

fn acme() -> Company {
    Company {
        id: "c1".into(),
        name: "Acme".into(),
    }
}

roundtrip_and_validate!(company_roundtrip, Company, acme());

roundtrip_and_validate!(
    shipment_roundtrip,
    Shipment,
    Shipment {
        id: "sh1".into(),
        company_id: "c1".into(),
        tracking_number: "TRK1".into(),
        provider: Provider::Ups,
        mode: Mode::Export,
        origin_country: "CZ".into(),
        destination_country: "AT".into(),
        created_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        latest_invoice_id: Some("inv1".into()),
    }
);

roundtrip_and_validate!(
    invoice_roundtrip,
    Invoice,
    Invoice {
        id: "inv1".into(),
        shipment_id: "sh1".into(),
        invoiced_weight: 2.5,
        invoiced_price: 99.9,
        uploaded_at: Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
    }
);

roundtrip_and_validate!(
    batch_roundtrip,
    Batch,
    Batch::new(vec![InvoiceRecord {
        id: "inv1".into(),
        shipment: ShipmentRecord {
            id: "sh1".into(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            tracking_number: "TRK1".into(),
            company: acme(),
            provider: Provider::FedEx,
            mode: Mode::Import,
            origin_country: "US".into(),
            destination_country: "CZ".into(),
        },
        invoiced_weight: 10.5,
        invoiced_price: 250.0,
    }])
);

roundtrip_and_validate!(
    shipment_view_roundtrip,
    ShipmentView,
    ShipmentView {
        id: "sh1".into(),
        tracking_number: "TRK1".into(),
        provider: Provider::Ppl,
        mode: Mode::Export,
        origin_country: "CZ".into(),
        destination_country: "SK".into(),
        created_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        company: acme(),
        latest_invoice: Some(InvoiceView {
            id: "inv1".into(),
            invoiced_price: 120.0,
            invoiced_weight: 3.0,
            uploaded_at: Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
        }),
    }
);

roundtrip_and_validate!(
    upload_stats_roundtrip,
    UploadStats,
    UploadStats {
        companies_created: 1,
        shipments_created: 2,
        shipments_updated: 3,
        invoices_created: 4,
    }
);

#[test]
fn batch_schema_rejects_short_country_code() {
    let schema = serde_json::to_value(schema_for!(Batch)).unwrap();
    let instance = serde_json::json!([{
        "id": "inv1",
        "shipment": {
            "id": "sh1",
            "createdAt": "2024-01-01",
            "trackingNumber": "TRK1",
            "company": {"id": "c1", "name": "Acme"},
            "provider": "DPD",
            "mode": "EXPORT",
            "originCountry": "CZE",
            "destinationCountry": "DE"
        },
        "invoicedWeight": 1.0,
        "invoicedPrice": 1.0
    }]);
    let errors = validate_against_schema(&schema, &instance);
    assert_eq!(errors.len(), 1, "expected one violation: {errors:?}");
}
