use axum::{http::StatusCode, response::Html};

const WELCOME_PAGE: &str = "\
<h1>Welcome to the Fruit Supply Project!</h1>
<p>Your go-to solution for managing and enhancing fruit supply chain operations.</p>
";

pub async fn welcome() -> Html<&'static str> {
    Html(WELCOME_PAGE)
}

pub async fn health() -> StatusCode {
    StatusCode::OK
}
