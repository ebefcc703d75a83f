use axum::{Extension, extract::Query, response::Html};

use crate::{
    server::CallbackContext, spotify, types::CallbackParams, utils, warning,
};

const SUCCESS_PAGE: &str = "<h2>Authentication successful.</h2><p>You can close this window.</p>";

pub async fn callback(
    Query(params): Query<CallbackParams>,
    Extension(context): Extension<CallbackContext>,
) -> Html<&'static str> {
    let mut lock = context.auth_state.lock().await;
    let Some(auth_state) = lock.as_mut() else {
        return Html("<h4>No authorization in progress.</h4>");
    };

    // a reload after success must not overwrite the token
    if auth_state.token.is_some() {
        return Html(SUCCESS_PAGE);
    }

    let code = match utils::validate_callback(&params, &auth_state.state) {
        Ok(code) => code,
        Err(e) => {
            warning!("{}", e);
            auth_state.error = Some(e.to_string());
            return Html("<h4>Login failed.</h4>");
        }
    };

    match spotify::auth::exchange_code(&context.config, &code).await {
        Ok(token) => {
            auth_state.token = Some(token);
            Html(SUCCESS_PAGE)
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            auth_state.error = Some(format!("token exchange failed: {}", e));
            Html("<h4>Login failed.</h4>")
        }
    }
}
