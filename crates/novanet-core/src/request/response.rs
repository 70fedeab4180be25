//! Successful response returned to the caller.

use serde::de::DeserializeOwned;

use crate::classify::Failure;

#[derive(Debug, Clone)]
pub struct Response {
    pub data: Vec<u8>,
    pub status: u16,
    pub status_text: String,
    /// Header pairs from the final response (after redirects), in wire order.
    pub headers: Vec<(String, String)>,
    pub ok: bool,
}

impl Response {
    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }

    /// Decode the body as JSON. Decode failures classify as `Parse`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Failure> {
        serde_json::from_slice(&self.data).map_err(Failure::Parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn response(body: &str) -> Response {
        Response {
            data: body.as_bytes().to_vec(),
            status: 200,
            status_text: "OK".to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            ok: true,
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Todo {
        id: u32,
        done: bool,
    }

    #[test]
    fn header_lookup_ignores_case() {
        let r = response("{}");
        assert_eq!(r.header("content-type"), Some("application/json"));
        assert!(r.header("etag").is_none());
    }

    #[test]
    fn json_decodes_body() {
        let r = response(r#"{"id": 7, "done": true}"#);
        assert_eq!(r.json::<Todo>().unwrap(), Todo { id: 7, done: true });
    }

    #[test]
    fn json_failure_is_parse_variant() {
        let r = response("<html>");
        assert!(matches!(r.json::<Todo>(), Err(Failure::Parse(_))));
    }
}
