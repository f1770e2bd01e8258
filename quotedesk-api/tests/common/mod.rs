#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use quotedesk_api::{app, middleware::Claims, AppState, AuthConfig};
use quotedesk_catalog::PricingCalculator;
use quotedesk_export::ExportTemplate;
use quotedesk_store::DbClient;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

// 1x1 transparent PNG
pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0x64, 0x60, 0xF8, 0x5F,
    0x0F, 0x00, 0x02, 0x87, 0x01, 0x80, 0xEB, 0x47, 0xBA, 0x92, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
    0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

pub struct TestApp {
    pub router: Router,
    // dropped with the app
    pub dir: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(true).await
}

/// `with_logo = false` points the exporter at a logo that does not exist.
pub async fn spawn_app_with(with_logo: bool) -> TestApp {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("spot.png"), PNG).unwrap();
    if with_logo {
        std::fs::write(dir.path().join("logo.png"), PNG).unwrap();
    }

    let db = DbClient::in_memory().await.unwrap();
    db.migrate().await.unwrap();

    let template = ExportTemplate {
        company_name: "Brightline Lighting".to_string(),
        company_address: Some("12 MG Road, Bengaluru".to_string()),
        logo_path: dir.path().join("logo.png"),
        image_dir: Some(dir.path().to_path_buf()),
        currency_symbol: "₹".to_string(),
    };

    let state = AppState::new(
        &db,
        PricingCalculator::default(),
        template,
        AuthConfig {
            secret: SECRET.to_string(),
        },
    );

    TestApp {
        router: app(state),
        dir,
    }
}

pub fn token(username: &str, role: &str) -> String {
    let claims = Claims {
        sub: username.to_string(),
        role: role.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn admin() -> String {
    token("root", "admin")
}

pub fn user() -> String {
    token("meera", "user")
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec();
        TestResponse { status, headers, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, Body::empty(), None)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.send(request(Method::DELETE, uri, Some(token), Body::empty(), None)).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(request(
            Method::POST,
            uri,
            Some(token),
            Body::from(body.to_string()),
            Some("application/json"),
        ))
        .await
    }

    pub async fn put_json(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.send(request(
            Method::PUT,
            uri,
            Some(token),
            Body::from(body.to_string()),
            Some("application/json"),
        ))
        .await
    }

    pub async fn post_bytes(&self, uri: &str, token: &str, bytes: Vec<u8>) -> TestResponse {
        self.send(request(
            Method::POST,
            uri,
            Some(token),
            Body::from(bytes),
            Some("application/octet-stream"),
        ))
        .await
    }
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap()
}

/// Supplier sheet: ten valid rows plus two malformed ones at rows 6 and 13.
pub fn catalog_sheet() -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, title) in ["MODEL", "PRICE", "PICTURE", "WATT"].iter().enumerate() {
        sheet.write_string(0, col as u16, *title).unwrap();
    }

    let mut row = 1;
    for i in 1..=10 {
        let (name, price) = match i {
            1 => ("Widget A".to_string(), 100.0),
            2 => ("Widget B".to_string(), 250.0),
            n => (format!("Spot {}", n), 99.5),
        };
        sheet.write_string(row, 0, name).unwrap();
        sheet.write_number(row, 1, price).unwrap();
        sheet.write_string(row, 2, "spot.png").unwrap();
        sheet.write_number(row, 3, 12).unwrap();
        row += 1;
        if i == 4 {
            sheet.write_string(row, 0, "Broken").unwrap();
            sheet.write_string(row, 1, "call us").unwrap();
            row += 1;
        }
    }
    sheet.write_number(row, 1, 45).unwrap();

    workbook.save_to_buffer().unwrap()
}
