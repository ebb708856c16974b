//! Settings loaded from TOML files


use fixtures::*;
use reinhardt_tables::prelude::*;
use rstest::*;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn settings_file(contents: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(contents.as_bytes()).unwrap();
	file.flush().unwrap();
	file
}

#[test]
fn test_table_uses_file_settings() {
	let file = settings_file(
		r#"
		per_page = 2
		default_sort_column = "name"
		default_sort_direction = "asc"
		empty_state_heading = "Nobody here"
		"#,
	);
	let settings = TableSettings::from_toml_file(file.path()).unwrap();
	let table = Table::with_settings(settings).query(|| Box::new(people_query()));

	let records = table.get_records(&RequestParams::new()).unwrap();
	assert_eq!(ids(&records), [json!(1), json!(2)]);
	assert_eq!(records.pagination.unwrap().last_page, 2);

	let props = table.to_props(&RequestParams::new()).unwrap();
	assert_eq!(props.empty_state.heading, "Nobody here");
	assert_eq!(props.per_page, 2);
}

#[test]
fn test_grouped_page_size_from_file() {
	let file = settings_file("grouped_per_page = 1\n");
	let settings = TableSettings::from_toml_file(file.path()).unwrap();
	let table = Table::with_settings(settings)
		.group(Group::make("team"))
		.query(|| Box::new(people_query()));

	let records = table
		.get_records(&RequestParams::new().with_group("team"))
		.unwrap();
	assert_eq!(records.records.len(), 1);
	assert_eq!(records.pagination.unwrap().per_page, 1);
}

#[test]
fn test_sort_fallbacks_from_file() {
	let file = settings_file(
		r#"
		[sort_fallbacks]
		surname = "last_name"
		"#,
	);
	let settings = TableSettings::from_toml_file(file.path()).unwrap();
	assert!(!settings.sort_fallbacks.contains_key("full_name"));

	let table = Table::with_settings(settings).query(|| Box::new(people_query()));
	let records = table
		.get_records(&RequestParams::new().with_sort("owner.surname", "desc"))
		.unwrap();
	assert_eq!(ids(&records), [json!(2), json!(3), json!(1)]);
}

#[rstest]
#[case("per_page = \"many\"")]
#[case("default_sort_direction = \"sideways\"")]
#[case("per_page = ")]
fn test_invalid_settings_file(#[case] contents: &str) {
	let file = settings_file(contents);
	let error = TableSettings::from_toml_file(file.path()).unwrap_err();
	assert!(matches!(error, TableError::Settings(_)));
}

#[test]
fn test_missing_settings_file() {
	let dir = tempfile::tempdir().unwrap();
	let error = TableSettings::from_toml_file(dir.path().join("tables.toml")).unwrap_err();
	assert!(matches!(error, TableError::Settings(message) if message.contains("tables.toml")));
}
