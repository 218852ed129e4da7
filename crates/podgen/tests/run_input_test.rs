use podgen::cli::read_job_input;
use serde_json::json;
use std::io::Write;

#[test]
fn test_inline_input() {
    let value = read_job_input(r#"{"prompt": "Hello"}"#).unwrap();
    assert_eq!(value, json!({"prompt": "Hello"}));
}

#[test]
fn test_job_record_is_unwrapped() {
    let value = read_job_input(r#"{"input": {"messages": []}}"#).unwrap();
    assert_eq!(value, json!({"messages": []}));
}

#[test]
fn test_job_record_with_id_is_unwrapped() {
    let value = read_job_input(r#"{"id": "x", "input": {"prompt": "hi"}}"#).unwrap();
    assert_eq!(value, json!({"prompt": "hi"}));
}

#[test]
fn test_non_object_input_key_is_kept() {
    let value = read_job_input(r#"{"input": "raw", "prompt": "hi"}"#).unwrap();
    assert_eq!(value, json!({"input": "raw", "prompt": "hi"}));
}

#[test]
fn test_input_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"prompt": "from file", "sampling_params": {{"n": 2}}}}"#).unwrap();

    let value = read_job_input(&format!("@{}", file.path().display())).unwrap();
    assert_eq!(value["prompt"], "from file");
    assert_eq!(value["sampling_params"]["n"], 2);
}

#[test]
fn test_invalid_json_is_an_error() {
    let err = read_job_input("prompt: hello").unwrap_err();
    assert!(err.to_string().contains("not valid JSON"));
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(read_job_input("@/nonexistent/podgen/job.json").is_err());
}
