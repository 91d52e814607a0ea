//! The standalone sign-in/sign-up service. Its envelopes differ from the
//! rest of the API: `message`/`error`/`success` fields, and failures are
//! answered with 200 just like the service it stands in for.

use serde::{Deserialize, Serialize};
use spin_sdk::http::{Request, Response};

use crate::config::ADMIN_KEY;
use crate::core::helpers::{hash_password, json_response, new_id, verify_password};
use crate::core::store::{JsonStore, KeyValueStore};
use crate::models::models::AdminAccount;

/// An account as echoed back to the caller.
#[derive(Serialize, Debug, Clone)]
pub struct AccountValues {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&AdminAccount> for AccountValues {
    fn from(account: &AdminAccount) -> Self {
        AccountValues {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
        }
    }
}

fn accounts(store: &dyn KeyValueStore) -> anyhow::Result<Vec<AdminAccount>> {
    Ok(store.get_json(ADMIN_KEY)?.unwrap_or_default())
}

pub fn index() -> anyhow::Result<Response> {
    json_response(200, &"SERVER IS RUNNING SUCCESSFULLY")
}

#[derive(Deserialize)]
struct SignIn {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn sign_in(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Ok(body) = serde_json::from_slice::<SignIn>(req.body()) else {
        return json_response(400, &serde_json::json!({ "error": "Invalid request body" }));
    };

    let accounts = accounts(store)?;
    match accounts.iter().find(|a| a.email == body.email.trim()) {
        Some(account) if verify_password(&body.password, &account.password) => json_response(
            200,
            &serde_json::json!({
                "message": "Login Successfull",
                "values": AccountValues::from(account),
            }),
        ),
        _ => json_response(200, &serde_json::json!({ "error": "User not found. Try signing up" })),
    }
}

#[derive(Deserialize)]
struct SignUp {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    phone: Option<String>,
}

pub fn sign_up(store: &dyn KeyValueStore, req: &Request) -> anyhow::Result<Response> {
    let Ok(body) = serde_json::from_slice::<SignUp>(req.body()) else {
        return json_response(
            400,
            &serde_json::json!({ "success": false, "error": "Invalid request body" }),
        );
    };
    let email = body.email.trim().to_string();
    if email.is_empty() || body.password.is_empty() {
        return json_response(
            400,
            &serde_json::json!({ "success": false, "error": "Email and password are required" }),
        );
    }

    let mut accounts = accounts(store)?;
    if accounts.iter().any(|a| a.email == email) {
        return json_response(
            200,
            &serde_json::json!({ "success": false, "error": "Email already exists. Please sign in." }),
        );
    }

    let password = match hash_password(&body.password) {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(error = %e, "signup failed");
            return json_response(
                500,
                &serde_json::json!({ "success": false, "error": "Failed to sign up" }),
            );
        }
    };

    let account = AdminAccount {
        id: new_id(),
        name: body.name,
        email,
        password,
        phone: body.phone,
    };
    accounts.push(account.clone());

    if let Err(e) = store.set_json(ADMIN_KEY, &accounts) {
        tracing::error!(error = %e, "signup failed");
        return json_response(
            200,
            &serde_json::json!({ "success": false, "error": "An error occurred during signup" }),
        );
    }

    json_response(
        201,
        &serde_json::json!({
            "success": true,
            "message": "Signup successful",
            "values": AccountValues::from(&account),
        }),
    )
}
