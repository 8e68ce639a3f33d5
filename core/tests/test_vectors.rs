//! Verify request building and response parsing against JSON test vectors
//! stored in `test-vectors/`.
//!
//! Each request vector names an endpoint, its inputs and the expected method
//! and path. Response vectors describe a simulated response and either the
//! decoded JSON or the expected error variant.

use imagga_core::{
    ApiError, ColorOptions, HttpMethod, HttpRequest, HttpResponse, ImageRef, ImaggaClient,
    OneOrMore, Resolution,
};
use serde_json::Value;

const BASE_URL: &str = "http://api.imagga.com/v1";

fn client() -> ImaggaClient {
    ImaggaClient::new("K", "S")
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn images(input: &Value) -> OneOrMore<ImageRef> {
    let raw = input["images"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string());
    OneOrMore::try_collect(raw).unwrap()
}

fn resolutions(input: &Value) -> OneOrMore<Resolution> {
    let parsed = input["resolutions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().parse::<Resolution>().unwrap());
    OneOrMore::try_collect(parsed).unwrap()
}

fn build(c: &ImaggaClient, endpoint: &str, input: &Value) -> HttpRequest {
    match endpoint {
        "usage" => c.build_usage(),
        "tags" => c.build_tags(images(input)),
        "categorize" => c.build_categorize(input["category"].as_str().unwrap(), images(input)),
        "categories" => c.build_categories(),
        "crop" => c.build_crop(
            images(input),
            resolutions(input),
            input["allow_scale"].as_bool().unwrap(),
        ),
        "colors" => c.build_colors(
            images(input),
            ColorOptions {
                extract_overall_colors: input["extract_overall_colors"].as_bool().unwrap(),
                extract_object_colors: input["extract_object_colors"].as_bool().unwrap(),
            },
        ),
        "delete" => c.build_delete(input["content_id"].as_str().unwrap()),
        other => panic!("unknown endpoint: {other}"),
    }
    .unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let endpoint = case["endpoint"].as_str().unwrap();
        let expected_req = &case["expected_request"];

        let req = build(&c, endpoint, &case["input"]);
        assert_eq!(req.method, parse_method(expected_req["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected_req["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.header("authorization"), Some("Basic SzpT"), "{name}: auth");
        assert!(req.body.is_none(), "{name}: body should be None");
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["simulated_response"];
        let response = HttpResponse::new(
            sim["status"].as_u64().unwrap() as u16,
            sim["body"].as_str().unwrap(),
        );
        let result = c.parse_response(response);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            let matched = match expected_error.as_str().unwrap() {
                "Remote" => matches!(err, ApiError::Remote { .. }),
                "MalformedErrorBody" => matches!(err, ApiError::MalformedErrorBody { .. }),
                "Http" => matches!(err, ApiError::Http { .. }),
                "Decode" => matches!(err, ApiError::Decode(_)),
                other => panic!("{name}: unknown expected_error: {other}"),
            };
            assert!(matched, "{name}: got {err:?}");
            if let Some(message) = case.get("expected_message") {
                assert_eq!(err.to_string(), message.as_str().unwrap(), "{name}: message");
            }
        } else {
            assert_eq!(result.unwrap(), case["expected_result"], "{name}: parsed result");
        }
    }
}
