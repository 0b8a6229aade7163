pub fn default_api_base_url() -> String {
    "https://aiva-backend-woad.vercel.app/api".to_string()
}

pub fn default_request_timeout() -> u64 {
    30
}

pub fn default_auth_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

pub fn default_token_endpoint() -> String {
    "https://securetoken.googleapis.com/v1".to_string()
}
