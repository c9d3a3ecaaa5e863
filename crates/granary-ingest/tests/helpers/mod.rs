//! Request builders shared by the integration tests
#![allow(dead_code)]

use axum::body::Body;
use axum::extract::Request;

pub const BOUNDARY: &str = "granary-test-boundary";

/// One section of a hand-built multipart body.
pub struct Part {
    pub name: &'static str,
    pub file_name: Option<&'static str>,
    pub content_type: Option<&'static str>,
    pub content_encoding: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn file(file_name: &'static str, data: impl Into<Vec<u8>>) -> Part {
        Part {
            name: "file",
            file_name: Some(file_name),
            content_type: None,
            content_encoding: None,
            data: data.into(),
        }
    }

    pub fn field(name: &'static str, data: impl Into<Vec<u8>>) -> Part {
        Part {
            name,
            file_name: None,
            content_type: None,
            content_encoding: None,
            data: data.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: &'static str) -> Part {
        self.content_type = Some(content_type);
        self
    }

    pub fn with_content_encoding(mut self, content_encoding: &'static str) -> Part {
        self.content_encoding = Some(content_encoding);
        self
    }
}

pub fn put_request(uri: &str, headers: &[(&str, &str)], body: impl Into<Vec<u8>>) -> Request {
    let mut builder = Request::builder().method("PUT").uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.into())).unwrap()
}

pub fn multipart_request(uri: &str, headers: &[(&str, &str)], parts: &[Part]) -> Request {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        "content-type",
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

/// A POST that claims multipart but carries arbitrary bytes.
pub fn raw_post_request(uri: &str, body: impl Into<Vec<u8>>) -> Request {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body.into()))
        .unwrap()
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        disposition.push_str("\r\n");
        body.extend_from_slice(disposition.as_bytes());
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        if let Some(content_encoding) = part.content_encoding {
            body.extend_from_slice(format!("Content-Encoding: {content_encoding}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
