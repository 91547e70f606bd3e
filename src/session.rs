pub const USERNAME: &str = "username";
pub const RETURN_URL: &str = "return_url";
/// One-shot message shown on the next page that asks for it.
pub const FLASH: &str = "flash";
