// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Workbook export read back with calamine.

use calamine::{open_workbook, Data, Reader, Xlsx};
use serde_json::{json, Value};
use systems_data_core::{
    group_by_classification, GroupingOptions, ObjectRecord, DEFAULT_CLASSIFICATION_PARAMETER,
};
use systems_data_export::{export_tables, MAX_SHEET_NAME_CHARS};

fn record(id: &str, classification: &str, extra: Value) -> ObjectRecord {
    let mut parameters = json!({
        "CLASS": {
            "name": DEFAULT_CLASSIFICATION_PARAMETER,
            "value": classification,
            "units": null
        }
    });
    if let Value::Object(extra) = extra {
        for (key, value) in extra {
            parameters[key] = value;
        }
    }

    let data = json!({"id": id, "speckle_type": "Base", "parameters": parameters});
    ObjectRecord::new(
        "https://app.speckle.systems/projects/p1",
        "root",
        id,
        data.as_object().unwrap().clone(),
    )
}

#[test]
fn each_classification_gets_its_own_sheet() {
    let records = vec![
        record(
            "a",
            "Ss_40_15_75 Space heating and cooling systems",
            json!({
                "LEN": {"name": "Length", "value": 12.5, "units": "m"},
                "FIRE": {"name": "Fire Rated", "value": true, "units": null},
                "TAGS": {"name": "Tags", "value": ["a", "b"], "units": null}
            }),
        ),
        record("b", "Drainage", json!({"MARK": {"name": "Mark", "value": "P-1", "units": null}})),
        record("c", "Drainage", json!({"MARK": {"name": "Mark", "value": null, "units": null}})),
    ];
    let groups = group_by_classification(&records, &GroupingOptions::default());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("systems_data.xlsx");
    let summary = export_tables(&groups, &path).unwrap();

    assert_eq!(summary.sheets.len(), 2);
    assert_eq!(summary.total_rows(), 3);
    assert_eq!(summary.sheets[0].sheet_name.chars().count(), MAX_SHEET_NAME_CHARS);
    assert_eq!(summary.sheets[0].sheet_name, "Ss_40_15_75 Space heating and c");

    let mut workbook: Xlsx<_> = open_workbook(&path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        vec!["Ss_40_15_75 Space heating and c".to_string(), "Drainage".to_string()]
    );

    let heating = workbook.worksheet_range("Ss_40_15_75 Space heating and c").unwrap();
    assert_eq!(heating.get_value((0, 0)), Some(&Data::String("Model URL".into())));
    assert_eq!(heating.get_value((0, 3)), Some(&Data::String("Length (m)".into())));
    assert_eq!(heating.get_value((1, 2)), Some(&Data::String("a".into())));
    assert_eq!(heating.get_value((1, 3)), Some(&Data::Float(12.5)));
    assert_eq!(heating.get_value((1, 4)), Some(&Data::Bool(true)));
    assert_eq!(heating.get_value((1, 5)), Some(&Data::String("[\"a\",\"b\"]".into())));
    assert_eq!(
        heating.get_value((1, 6)),
        Some(&Data::String("Ss_40_15_75 Space heating and cooling systems".into()))
    );

    let drainage = workbook.worksheet_range("Drainage").unwrap();
    assert_eq!(drainage.get_size(), (3, 5));
    assert_eq!(drainage.get_value((1, 3)), Some(&Data::String("P-1".into())));
    assert!(matches!(drainage.get_value((2, 3)), None | Some(Data::Empty)));
}
