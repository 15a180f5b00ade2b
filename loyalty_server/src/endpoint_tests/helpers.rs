use actix_web::{
    http::{header::ContentType, StatusCode},
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use chrono::{DateTime, TimeZone, Utc};
use log::debug;

use crate::{auth::TokenIssuer, config::AuthConfig};

// Signs every token used by the endpoint tests. DO NOT re-use this secret anywhere.
pub const TEST_SECRET: &str = "c6f1a0e85ab3d1c7b5ef0d52c1e8e9d33a0ae6b7a1d2c35c4f8e0b7e1a6d9f20";

pub fn token_issuer() -> TokenIssuer {
    TokenIssuer::new(&AuthConfig::new(TEST_SECRET))
}

pub fn issue_token(user: &str) -> String {
    token_issuer().issue_token(user).expect("Failed to sign token")
}

pub fn timestamp(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

/// How the session token is attached to a request.
#[derive(Clone, Copy)]
pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    Cookie(&'a str),
}

impl<'a> Auth<'a> {
    fn apply(self, req: TestRequest) -> TestRequest {
        match self {
            Auth::None => req,
            Auth::Bearer(token) => req.insert_header(("Authorization", format!("Bearer {token}"))),
            Auth::Cookie(token) => req.cookie(actix_web::cookie::Cookie::new(crate::auth::TOKEN_COOKIE, token.to_string())),
        }
    }
}

pub async fn get_request<F>(auth: Auth<'_>, path: &str, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let req = auth.apply(TestRequest::get().uri(path));
    send(req, configure).await
}

pub async fn post_request<F>(
    auth: Auth<'_>,
    path: &str,
    body: &str,
    content_type: ContentType,
    configure: F,
) -> Result<(StatusCode, String), String>
where
    F: FnOnce(&mut ServiceConfig),
{
    let req = auth.apply(TestRequest::post().uri(path)).insert_header(content_type).set_payload(body.to_string());
    send(req, configure).await
}

async fn send<F>(req: TestRequest, configure: F) -> Result<(StatusCode, String), String>
where F: FnOnce(&mut ServiceConfig) {
    let app = App::new().app_data(web::Data::new(token_issuer())).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let res = test::try_call_service(&service, req.to_request()).await.map_err(|e| e.to_string())?;
    let status = res.status();
    let body = test::read_body(res).await;
    Ok((status, String::from_utf8_lossy(&body).into_owned()))
}
