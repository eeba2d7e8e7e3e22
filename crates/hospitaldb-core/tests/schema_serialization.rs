use hospitaldb_core::{Entity, hospital_schema};

#[test]
fn serializes_schema_deterministically() {
    let schema = hospital_schema();
    let first = serde_json::to_string_pretty(&schema).expect("serialize schema");
    let second = serde_json::to_string_pretty(&hospital_schema()).expect("serialize schema");
    assert_eq!(first, second);

    let value: serde_json::Value = serde_json::from_str(&first).expect("parse schema json");
    assert_eq!(value["engine"], "sqlite");
    assert_eq!(value["tables"].as_array().map(Vec::len), Some(6));

    let machine = &value["tables"][3];
    assert_eq!(machine["name"], Entity::MachineInventory.table_name());
    let fk = machine["constraints"]
        .as_array()
        .expect("constraints array")
        .iter()
        .find(|constraint| constraint["kind"] == "foreign_key")
        .expect("machine inventory foreign key");
    assert_eq!(fk["referenced_table"], "Inventory");
    assert_eq!(fk["columns"][0], "inventory_id");
}

#[test]
fn schema_round_trips_through_json() {
    let json = serde_json::to_string(&hospital_schema()).expect("serialize schema");
    let parsed: hospitaldb_core::DatabaseSchema =
        serde_json::from_str(&json).expect("deserialize schema");
    hospitaldb_core::validate_schema(&parsed).expect("parsed schema is valid");
}
