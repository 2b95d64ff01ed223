//! Selectors and text markers rendered by the Fachowiec Pro front-end

pub const NAME_FIELD: &str = "#name";
pub const TITLE_FIELD: &str = "#title";
pub const COMPANY_NAME_FIELD: &str = "#companyName";
pub const NIP_FIELD: &str = "#nip";
pub const ADDRESS_FIELD: &str = "#address";
pub const PHONE_FIELD: &str = "#phone";
pub const BANK_ACCOUNT_FIELD: &str = "#bankAccount";

pub const SAVE_BUTTON_TEXT: &str = "Zapisz zmiany";
pub const EDIT_BUTTON_TITLE: &str = "Edytuj";

pub const PROFILE_SECTION: &str = "Dane firmy / użytkownika";
pub const SETTINGS_HEADER: &str = "Ustawienia firmy";
pub const SETTINGS_SAVED_TOAST: &str = "Ustawienia zapisane";
pub const EDIT_ESTIMATE_HEADER: &str = "Edytuj kosztorys";

/// `text=` engine selector
pub fn text(marker: &str) -> String {
    format!("text={}", marker)
}

/// `tag:has-text('...')` selector
pub fn has_text(tag: &str, marker: &str) -> String {
    format!("{}:has-text('{}')", tag, marker.replace('\'', "\\'"))
}

pub fn save_button() -> String {
    has_text("button", SAVE_BUTTON_TEXT)
}

pub fn settings_header() -> String {
    has_text("h1", SETTINGS_HEADER)
}
