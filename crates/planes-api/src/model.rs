// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Plane entity model and JSON wire format.
//!
//! Wire field names are the exact PascalCase names used by the server
//! (`PlaneId`, `Name`, `Year`, `MadeBy`, `Picture`, `NumOfSeats1/2/3`).
//! `PlaneId` also accepts the legacy `FlightId` name emitted by the older
//! `/flights` API variant.

use serde::{Deserialize, Serialize};

/// A single plane as tracked by the inventory.
///
/// `id` is server-assigned on creation and is `None` for a record that has
/// not been saved yet. Once assigned it never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneRecord {
    /// Server-assigned identifier, unique across the collection.
    #[serde(
        rename = "PlaneId",
        alias = "FlightId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<i64>,

    /// Display name (e.g. "737 MAX").
    #[serde(rename = "Name")]
    pub name: String,

    /// Year of manufacture.
    #[serde(rename = "Year")]
    pub year: i32,

    /// Manufacturer name.
    #[serde(rename = "MadeBy")]
    pub manufacturer: String,

    /// Photo reference: an HTTP(S) URL or a local file path.
    /// `None` means "show the fallback icon".
    #[serde(rename = "Picture", default)]
    pub image_ref: Option<String>,

    /// First-class seat count.
    #[serde(rename = "NumOfSeats1")]
    pub seats_class_a: u32,

    /// Business-class seat count.
    #[serde(rename = "NumOfSeats2")]
    pub seats_class_b: u32,

    /// Economy-class seat count.
    #[serde(rename = "NumOfSeats3")]
    pub seats_class_c: u32,
}

impl PlaneRecord {
    /// Total seats across all three classes.
    #[must_use]
    pub fn total_seats(&self) -> u32 {
        self.seats_class_a + self.seats_class_b + self.seats_class_c
    }

    /// The editable fields of this record, without the id.
    #[must_use]
    pub fn fields(&self) -> PlaneFields {
        PlaneFields {
            name: self.name.clone(),
            year: self.year,
            manufacturer: self.manufacturer.clone(),
            image_ref: self.image_ref.clone(),
            seats_class_a: self.seats_class_a,
            seats_class_b: self.seats_class_b,
            seats_class_c: self.seats_class_c,
        }
    }
}

/// Create/update payload: a [`PlaneRecord`] minus the id.
///
/// POST and PUT bodies must never carry a `PlaneId`; the server assigns ids
/// on creation and takes the id from the URL path on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneFields {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Year")]
    pub year: i32,

    #[serde(rename = "MadeBy")]
    pub manufacturer: String,

    #[serde(rename = "Picture", default)]
    pub image_ref: Option<String>,

    #[serde(rename = "NumOfSeats1")]
    pub seats_class_a: u32,

    #[serde(rename = "NumOfSeats2")]
    pub seats_class_b: u32,

    #[serde(rename = "NumOfSeats3")]
    pub seats_class_c: u32,
}

impl PlaneFields {
    /// Combine these fields with a server-assigned id into a full record.
    #[must_use]
    pub fn into_record(self, id: i64) -> PlaneRecord {
        PlaneRecord {
            id: Some(id),
            name: self.name,
            year: self.year,
            manufacturer: self.manufacturer,
            image_ref: self.image_ref,
            seats_class_a: self.seats_class_a,
            seats_class_b: self.seats_class_b,
            seats_class_c: self.seats_class_c,
        }
    }
}

/// Server response to a DELETE request.
///
/// The current backend returns `{detail, deleted_plane}`; the older
/// `/flights` variant returned only `{detail}`, so the snapshot is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteReceipt {
    /// Human-readable confirmation message.
    pub detail: String,

    /// Field snapshot of the record as it was before deletion.
    #[serde(default)]
    pub deleted_plane: Option<PlaneRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "PlaneId": 7,
            "Name": "A320neo",
            "Year": 2016,
            "MadeBy": "Airbus",
            "Picture": "https://example.com/a320.jpg",
            "NumOfSeats1": 8,
            "NumOfSeats2": 24,
            "NumOfSeats3": 132
        }"#
    }

    #[test]
    fn test_deserialize_wire_names() {
        let plane: PlaneRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(plane.id, Some(7));
        assert_eq!(plane.name, "A320neo");
        assert_eq!(plane.year, 2016);
        assert_eq!(plane.manufacturer, "Airbus");
        assert_eq!(plane.image_ref.as_deref(), Some("https://example.com/a320.jpg"));
        assert_eq!(plane.total_seats(), 164);
    }

    #[test]
    fn test_deserialize_legacy_flight_id() {
        let json = r#"{"FlightId": 3, "Name": "DC-3", "Year": 1936, "MadeBy": "Douglas",
                       "NumOfSeats1": 0, "NumOfSeats2": 0, "NumOfSeats3": 21}"#;
        let plane: PlaneRecord = serde_json::from_str(json).unwrap();
        assert_eq!(plane.id, Some(3));
        assert!(plane.image_ref.is_none());
    }

    #[test]
    fn test_serialize_round_trip() {
        let plane: PlaneRecord = serde_json::from_str(sample_json()).unwrap();
        let json = serde_json::to_string(&plane).unwrap();
        assert!(json.contains("\"PlaneId\":7"));
        assert!(json.contains("\"MadeBy\":\"Airbus\""));
        assert!(json.contains("\"NumOfSeats3\":132"));
        let back: PlaneRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, plane);
    }

    #[test]
    fn test_fields_payload_has_no_id() {
        let plane: PlaneRecord = serde_json::from_str(sample_json()).unwrap();
        let payload = serde_json::to_string(&plane.fields()).unwrap();
        assert!(!payload.contains("PlaneId"));
        assert!(!payload.contains("FlightId"));
        assert!(payload.contains("\"Name\":\"A320neo\""));
    }

    #[test]
    fn test_unsaved_record_serializes_without_id() {
        let fields = PlaneFields {
            name: "737".to_string(),
            year: 2005,
            manufacturer: "Boeing".to_string(),
            ..Default::default()
        };
        let record = fields.clone().into_record(1);
        assert_eq!(record.id, Some(1));
        assert_eq!(record.fields(), fields);
    }

    #[test]
    fn test_delete_receipt_optional_snapshot() {
        let full: DeleteReceipt = serde_json::from_str(&format!(
            r#"{{"detail": "Plane deleted", "deleted_plane": {}}}"#,
            sample_json()
        ))
        .unwrap();
        assert_eq!(full.detail, "Plane deleted");
        assert_eq!(full.deleted_plane.unwrap().id, Some(7));

        let bare: DeleteReceipt = serde_json::from_str(r#"{"detail": "Flight deleted"}"#).unwrap();
        assert!(bare.deleted_plane.is_none());
    }
}
